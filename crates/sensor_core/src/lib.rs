//! # Sensor Core
//!
//! Pipeline de aquisição do Monitor de Sensores: lê linhas de texto de um
//! Arduino pela serial, sincroniza frames pelo marcador, converte em
//! leituras tipadas, acumula em memória e exporta para planilha.
//!
//! ## Módulos
//! - [`types`] – Frame, Reading, campos e valores
//! - [`transport`] – Porta serial (`serialport`) e transporte simulado
//! - [`protocol`] – Sincronizador de frames e parser de campos
//! - [`acquisition`] – Thread de aquisição com start/pause
//! - [`store`] – Leituras desde a última exportação
//! - [`export`] – xlsx com abas por exportação, ou xlsx + csv novos
//! - [`sync`] – Push remoto do artefato exportado
//! - [`monitor`] – Superfície de controle start/pause/export
//! - [`config`] – Configuração unificada via TOML
//! - [`alerts`] – Thresholds e níveis de alerta

pub mod acquisition;
pub mod alerts;
pub mod config;
pub mod error;
pub mod export;
pub mod monitor;
pub mod protocol;
pub mod store;
pub mod sync;
pub mod transport;
pub mod types;

// Re-exports convenientes
pub use acquisition::{AcquisitionEvent, AcquisitionManager, StartOutcome};
pub use config::AppConfig;
pub use monitor::{ExportOutcome, Monitor};
pub use types::{Field, FieldValue, Frame, Reading};
