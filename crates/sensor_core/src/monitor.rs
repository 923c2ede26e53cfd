//! Superfície de controle: `start()`, `pause()` e `export()`.
//!
//! Junta aquisição, exportação e sincronização remota para o display
//! (dashboard) ou para o recorder headless.

use crate::acquisition::{AcquisitionEvent, AcquisitionManager, LoopSettings, StartOutcome};
use crate::config::{AppConfig, ExportPolicy, TransportKind};
use crate::error::{AcquisitionError, ExportError, SyncError};
use crate::export::{ExportArtifact, Exporter};
use crate::store::ReadingStore;
use crate::sync::{CommandSync, RemoteSync, SyncReport};
use crate::transport::{Connector, SerialConnector, SimulatedConnector};
use crate::types::Reading;
use crossbeam_channel::{Receiver, bounded};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Capacidade do channel aquisição → display.
const DISPLAY_CHANNEL_CAPACITY: usize = 64;

/// Resultado de `export()`: o artefato local e, se houve, cada push remoto.
#[derive(Debug)]
pub struct ExportOutcome {
    pub artifact: ExportArtifact,
    pub sync: Vec<Result<SyncReport, SyncError>>,
}

impl ExportOutcome {
    pub fn sync_failures(&self) -> impl Iterator<Item = &SyncError> {
        self.sync.iter().filter_map(|r| r.as_ref().err())
    }
}

/// Controle da aquisição e da exportação.
pub struct Monitor {
    acquisition: AcquisitionManager,
    exporter: Exporter,
    remote: Option<Box<dyn RemoteSync>>,
    events: Receiver<AcquisitionEvent>,
}

impl Monitor {
    /// Monta o pipeline completo a partir da configuração.
    pub fn new(config: &AppConfig) -> Self {
        let connector: Box<dyn Connector> = match config.transport.kind {
            TransportKind::Serial => Box::new(SerialConnector::new(config.serial.clone())),
            TransportKind::Simulated => Box::new(SimulatedConnector::new(
                config.frame.clone(),
                Duration::from_millis(config.transport.simulated_period_ms),
            )),
        };
        let remote = CommandSync::from_config(&config.sync).map(|s| Box::new(s) as Box<dyn RemoteSync>);
        let exporter = Exporter::new(config.export.clone(), config.frame.fields.clone());

        info!(
            "Pipeline: {} | frame de {} linhas (marcador '{}') | export {:?}",
            connector.describe(),
            config.frame.line_count,
            config.frame.marker,
            config.export.policy
        );
        Self::with_parts(connector, LoopSettings::from_config(&config.frame), exporter, remote)
    }

    pub fn with_parts(
        connector: Box<dyn Connector>,
        settings: LoopSettings,
        exporter: Exporter,
        remote: Option<Box<dyn RemoteSync>>,
    ) -> Self {
        let (tx, events) = bounded(DISPLAY_CHANNEL_CAPACITY);
        let store = Arc::new(ReadingStore::new());
        Self {
            acquisition: AcquisitionManager::new(connector, settings, store, tx),
            exporter,
            remote,
            events,
        }
    }

    pub fn start(&mut self) -> Result<StartOutcome, AcquisitionError> {
        self.acquisition.start()
    }

    pub fn pause(&mut self) -> bool {
        self.acquisition.pause()
    }

    pub fn is_running(&self) -> bool {
        self.acquisition.is_running()
    }

    /// Eventos para o display (leituras, sem dados, erros de leitura).
    pub fn events(&self) -> &Receiver<AcquisitionEvent> {
        &self.events
    }

    pub fn store(&self) -> Arc<ReadingStore> {
        self.acquisition.store()
    }

    pub fn snapshot(&self) -> Vec<Reading> {
        self.acquisition.store().snapshot()
    }

    pub fn exporter(&self) -> &Exporter {
        &self.exporter
    }

    /// Exporta o store; com `fresh_file` e sync configurado, publica cada
    /// arquivo produzido. Falhas do push não desfazem o export local.
    pub fn export(&self) -> Result<ExportOutcome, ExportError> {
        let artifact = self.exporter.export_store(&self.acquisition.store())?;

        let sync = match (&self.remote, self.exporter.config().policy) {
            (Some(remote), ExportPolicy::FreshFile) => {
                artifact.files().into_iter().map(|file| remote.push(file)).collect()
            }
            _ => Vec::new(),
        };

        Ok(ExportOutcome { artifact, sync })
    }

    pub fn shutdown(&mut self) {
        self.acquisition.shutdown();
    }
}
