//! Taxonomia de erros do pipeline de aquisição e exportação.
//!
//! Erros por linha ([`TransportError`]) ficam contidos no loop de aquisição;
//! os fatais ([`AcquisitionError`], [`ExportError`], [`SyncError`]) sobem
//! para quem chamou a operação correspondente.

use std::path::PathBuf;

/// Falhas fatais do `start()` da aquisição.
#[derive(Debug, thiserror::Error)]
pub enum AcquisitionError {
    #[error("Não foi possível abrir {target}: {detail}")]
    Connection { target: String, detail: String },

    #[error("Falha ao criar thread de aquisição: {0}")]
    Spawn(#[source] std::io::Error),
}

/// Falha de uma única tentativa de leitura (transiente, nunca fatal).
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Erro ao ler dados da porta: {0}")]
    Io(#[from] std::io::Error),

    #[error("Erro da porta serial: {0}")]
    Serial(#[from] serialport::Error),

    #[error("Transporte desconectado")]
    Disconnected,
}

/// Falhas de exportação. O store nunca é drenado quando isto ocorre.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Nenhuma leitura para exportar")]
    NothingToExport,

    #[error("Erro de I/O em {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Erro ao gravar planilha: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("Erro ao ler planilha existente {path}: {detail}")]
    WorkbookRead { path: PathBuf, detail: String },

    #[error("Erro ao gravar planilha {path}: {detail}")]
    WorkbookWrite { path: PathBuf, detail: String },

    #[error("Erro ao gravar CSV: {0}")]
    Csv(#[from] csv::Error),
}

impl ExportError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ExportError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Falhas do push remoto. O export local já está durável.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("Sincronização remota não configurada")]
    NotConfigured,

    #[error("Falha ao executar `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` terminou com {status}:\n{output}")]
    CommandFailed {
        command: String,
        status: String,
        output: String,
    },

    #[error("Repositório local inacessível {path}: {source}")]
    Repository {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Falha ao copiar {path} para o repositório: {source}")]
    Copy {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Erros de leitura/gravação da configuração.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Erro de I/O: {0}")]
    Io(#[from] std::io::Error),

    #[error("Erro ao serializar TOML: {0}")]
    Serialize(#[from] toml::ser::Error),
}
