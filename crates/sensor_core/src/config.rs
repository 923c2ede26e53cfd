//! Configuração unificada via TOML.
//!
//! Porta serial, layout do frame, política de exportação e sincronização
//! remota ficam num único `config.toml` ao lado do executável.

use crate::error::ConfigError;
use crate::protocol::FieldRule;
use crate::types::Field;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Origem das linhas de texto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportKind {
    /// Arduino real numa porta serial
    #[default]
    Serial,
    /// Gerador de frames para demonstração sem hardware
    Simulated,
}

/// Seleção do transporte.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    pub kind: TransportKind,
    /// Período entre frames simulados (ms)
    pub simulated_period_ms: u64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            kind: TransportKind::Serial,
            simulated_period_ms: 1000,
        }
    }
}

/// Configuração da porta serial.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialConfig {
    /// Identificador da porta ("COM6", "/dev/ttyACM0"…)
    pub port: String,
    pub baud_rate: u32,
    /// Timeout de leitura (ms)
    pub timeout_ms: u64,
    /// Espera após abrir a porta; o Arduino reinicia ao conectar (ms)
    pub settle_ms: u64,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: "COM6".into(),
            baud_rate: 9600,
            timeout_ms: 1000,
            settle_ms: 2000,
        }
    }
}

impl SerialConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}

/// Layout do frame e regras de parsing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameConfig {
    /// Substring que identifica a primeira linha do frame
    pub marker: String,
    /// Número de linhas por frame (N), marcador incluído
    pub line_count: usize,
    /// Separador entre rótulo e valor
    pub separator: char,
    /// Esquema de campos deste deployment (ordem das colunas)
    pub fields: Vec<Field>,
    /// Intervalo entre polls da porta (ms)
    pub poll_interval_ms: u64,
    /// Aviso de "sem dados" após este tempo sem frames (0 = desligado)
    pub idle_timeout_secs: u64,
    /// Máximo de linhas lidas por iteração do loop
    pub max_lines_per_tick: usize,
    /// Tabela ordenada rótulo → campo
    pub rules: Vec<FieldRule>,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            marker: "LM35".into(),
            line_count: 4,
            separator: ':',
            fields: vec![
                Field::TemperatureLm35,
                Field::TemperatureDht,
                Field::Humidity,
                Field::Distance,
            ],
            poll_interval_ms: 100,
            idle_timeout_secs: 10,
            max_lines_per_tick: 64,
            rules: FieldRule::default_table(),
        }
    }
}

impl FrameConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn idle_timeout(&self) -> Option<Duration> {
        (self.idle_timeout_secs > 0).then(|| Duration::from_secs(self.idle_timeout_secs))
    }
}

/// Política de exportação.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportPolicy {
    /// Um único arquivo que ganha uma nova aba a cada exportação
    #[default]
    AppendSection,
    /// Um arquivo novo (xlsx + csv opcional) por exportação
    FreshFile,
}

/// Configuração de exportação.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub policy: ExportPolicy,
    /// Diretório de saída
    pub directory: PathBuf,
    /// Nome do arquivo evolutivo (política `append_section`)
    pub file_name: String,
    /// Prefixo das abas (`Medicion_YYYYMMDD_HHMMSS`)
    pub section_prefix: String,
    /// Prefixo dos arquivos novos (política `fresh_file`)
    pub fresh_prefix: String,
    /// Gera também o `.csv` irmão na política `fresh_file`
    pub write_csv: bool,
    /// Remove do store as leituras exportadas com sucesso
    pub clear_after_export: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            policy: ExportPolicy::AppendSection,
            directory: PathBuf::from("."),
            file_name: "datos_sensores.xlsx".into(),
            section_prefix: "Medicion".into(),
            fresh_prefix: "datos_sensores".into(),
            write_csv: true,
            clear_after_export: true,
        }
    }
}

/// Sincronização remota do artefato exportado.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub enabled: bool,
    /// Repositório local já existente
    pub repo_dir: PathBuf,
    /// Sequência de comandos; `{path}` e `{name}` são substituídos
    pub commands: Vec<Vec<String>>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        let cmd = |args: &[&str]| args.iter().map(|a| a.to_string()).collect::<Vec<_>>();
        Self {
            enabled: false,
            repo_dir: PathBuf::new(),
            commands: vec![
                cmd(&["git", "add", "{path}"]),
                cmd(&["git", "commit", "-m", "Datos {name}"]),
                cmd(&["git", "push"]),
            ],
        }
    }
}

/// Thresholds de alerta para o display.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertThresholds {
    pub temp_warning: f32,
    pub temp_critical: f32,
    pub humidity_warning: f32,
    pub humidity_critical: f32,
    /// Proximidade: abaixo disto é alerta
    pub distance_warning: f32,
    pub distance_critical: f32,
    pub sound_warning: f32,
    pub sound_critical: f32,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            temp_warning: 30.0,
            temp_critical: 40.0,
            humidity_warning: 70.0,
            humidity_critical: 85.0,
            distance_warning: 20.0,
            distance_critical: 10.0,
            sound_warning: 600.0,
            sound_critical: 850.0,
        }
    }
}

/// Configuração do recorder headless.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecorderConfig {
    /// Exporta a cada N segundos (0 = só ao final)
    pub autosave_secs: u64,
    /// Duração total da gravação (0 = indefinida)
    pub run_secs: u64,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            autosave_secs: 300,
            run_secs: 0,
        }
    }
}

/// Configuração raiz do aplicativo.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub transport: TransportConfig,
    pub serial: SerialConfig,
    pub frame: FrameConfig,
    pub export: ExportConfig,
    pub sync: SyncConfig,
    pub alerts: AlertThresholds,
    pub recorder: RecorderConfig,
}

impl AppConfig {
    /// Carrega configuração de um arquivo TOML.
    pub fn load(path: &Path) -> Self {
        if path.exists() {
            match std::fs::read_to_string(path) {
                Ok(content) => match toml::from_str::<AppConfig>(&content) {
                    Ok(config) => {
                        info!("Configuração carregada de {}", path.display());
                        return config;
                    }
                    Err(e) => {
                        warn!("Erro ao parsear {}: {}", path.display(), e);
                    }
                },
                Err(e) => {
                    warn!("Erro ao ler {}: {}", path.display(), e);
                }
            }
        }

        info!("Usando configuração padrão");
        AppConfig::default()
    }

    /// Salva configuração em arquivo TOML.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Configuração salva em {}", path.display());
        Ok(())
    }

    /// Retorna o caminho padrão do config.toml.
    pub fn default_path() -> PathBuf {
        let exe_dir = std::env::current_exe()
            .map(|p| p.parent().unwrap_or(Path::new(".")).to_path_buf())
            .unwrap_or_else(|_| PathBuf::from("."));
        exe_dir.join("config.toml")
    }

    /// Valida a configuração e retorna lista de erros.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let frame = &self.frame;

        if self.transport.kind == TransportKind::Serial && self.serial.port.trim().is_empty() {
            errors.push("Porta serial não pode ser vazia".into());
        }
        if self.serial.baud_rate == 0 {
            errors.push("Baud rate não pode ser 0".into());
        }
        if frame.marker.trim().is_empty() {
            errors.push("Marcador do frame não pode ser vazio".into());
        }
        if frame.line_count == 0 {
            errors.push("Frame precisa ter pelo menos 1 linha".into());
        }
        if frame.fields.is_empty() {
            errors.push("Esquema de campos vazio".into());
        }
        if frame.poll_interval_ms < 10 || frame.poll_interval_ms > 1000 {
            errors.push(format!(
                "Intervalo de poll inválido: {} ms (10–1000)",
                frame.poll_interval_ms
            ));
        }
        if frame.max_lines_per_tick == 0 {
            errors.push("max_lines_per_tick não pode ser 0".into());
        }
        for rule in &frame.rules {
            if rule.label.is_empty() {
                errors.push(format!("Regra sem rótulo para o campo {}", rule.field));
            } else if !frame.fields.contains(&rule.field) {
                warn!("Regra '{}' aponta para {} fora do esquema", rule.label, rule.field);
            }
        }
        if self.export.file_name.trim().is_empty() {
            errors.push("Nome do arquivo de exportação vazio".into());
        }
        if self.sync.enabled {
            if self.export.policy != ExportPolicy::FreshFile {
                errors.push("Sincronização remota requer a política fresh_file".into());
            }
            if self.sync.repo_dir.as_os_str().is_empty() {
                errors.push("Sincronização habilitada sem repo_dir".into());
            }
            if self.sync.commands.iter().any(|c| c.is_empty()) {
                errors.push("Comando de sincronização vazio".into());
            }
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        let errors = config.validate();
        assert!(errors.is_empty(), "Erros: {:?}", errors);
    }

    #[test]
    fn roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(config.serial.port, parsed.serial.port);
        assert_eq!(config.frame.fields, parsed.frame.fields);
        assert_eq!(config.frame.rules, parsed.frame.rules);
        assert_eq!(config.export.policy, parsed.export.policy);
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let partial = r#"
[serial]
port = "/dev/ttyACM0"

[frame]
line_count = 6
fields = ["temperature_lm35", "temperature_dht", "humidity", "distance", "sound_level"]

[export]
policy = "fresh_file"
"#;
        let config: AppConfig = toml::from_str(partial).unwrap();
        assert_eq!(config.serial.port, "/dev/ttyACM0");
        assert_eq!(config.frame.line_count, 6);
        assert_eq!(config.frame.fields.len(), 5);
        assert_eq!(config.export.policy, ExportPolicy::FreshFile);
        // Outros campos devem ter valor padrão
        assert_eq!(config.serial.baud_rate, 9600);
        assert_eq!(config.frame.marker, "LM35");
        assert_eq!(config.frame.poll_interval_ms, 100);
    }

    #[test]
    fn rejects_zero_line_frame() {
        let mut config = AppConfig::default();
        config.frame.line_count = 0;
        config.frame.marker = " ".into();
        let errors = config.validate();
        assert_eq!(errors.len(), 2, "Erros: {:?}", errors);
    }

    #[test]
    fn sync_requires_fresh_file() {
        let mut config = AppConfig::default();
        config.sync.enabled = true;
        config.sync.repo_dir = PathBuf::from("/tmp/repo");
        assert_eq!(config.validate().len(), 1);
        config.export.policy = ExportPolicy::FreshFile;
        assert!(config.validate().is_empty());
    }

    #[test]
    fn idle_timeout_zero_disables() {
        let mut frame = FrameConfig::default();
        assert_eq!(frame.idle_timeout(), Some(Duration::from_secs(10)));
        frame.idle_timeout_secs = 0;
        assert_eq!(frame.idle_timeout(), None);
    }
}
