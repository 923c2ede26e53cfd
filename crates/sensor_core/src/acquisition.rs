//! Loop de aquisição em background com controle start/pause.
//!
//! O [`AcquisitionManager`] é o único dono do transporte: enquanto a worker
//! roda, ela possui o transporte e o devolve pelo `JoinHandle` ao sair.
//! Assim um `start()` após `pause()` reutiliza a mesma conexão e nunca há
//! duas workers lendo do mesmo transporte.
//!
//! O sinal de parada é um channel cujo sender é descartado no `pause()`;
//! a worker observa o fechamento no topo de cada iteração e durante a
//! espera entre polls.

use crate::config::FrameConfig;
use crate::error::AcquisitionError;
use crate::protocol::{FrameSynchronizer, ReadingParser};
use crate::store::ReadingStore;
use crate::transport::{Connector, Transport};
use crate::types::Reading;
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError, bounded};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Eventos enviados ao display.
#[derive(Debug, Clone)]
pub enum AcquisitionEvent {
    /// Nova leitura completa
    Reading(Reading),
    /// Nenhum frame completo há `idle`
    NoData { idle: Duration },
    /// Falha transiente de leitura (a aquisição continua)
    ReadError(String),
}

/// Resultado de um `start()` bem-sucedido.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    AlreadyRunning,
}

/// Parâmetros do loop derivados da configuração.
#[derive(Debug, Clone)]
pub struct LoopSettings {
    pub marker: String,
    pub frame_len: usize,
    pub parser: ReadingParser,
    pub poll_interval: Duration,
    pub idle_timeout: Option<Duration>,
    pub max_lines_per_tick: usize,
}

impl LoopSettings {
    pub fn from_config(frame: &FrameConfig) -> Self {
        Self {
            marker: frame.marker.clone(),
            frame_len: frame.line_count,
            parser: ReadingParser::new(frame.rules.clone(), frame.fields.clone(), frame.separator),
            poll_interval: frame.poll_interval(),
            idle_timeout: frame.idle_timeout(),
            max_lines_per_tick: frame.max_lines_per_tick.max(1),
        }
    }
}

struct Worker {
    /// `None` depois do `pause()`
    stop: Option<Sender<()>>,
    handle: JoinHandle<Box<dyn Transport>>,
}

/// Dono do transporte, da worker, do sinal de parada e do store.
pub struct AcquisitionManager {
    connector: Box<dyn Connector>,
    settings: LoopSettings,
    store: Arc<ReadingStore>,
    sink: Sender<AcquisitionEvent>,
    transport: Option<Box<dyn Transport>>,
    worker: Option<Worker>,
}

impl AcquisitionManager {
    pub fn new(
        connector: Box<dyn Connector>,
        settings: LoopSettings,
        store: Arc<ReadingStore>,
        sink: Sender<AcquisitionEvent>,
    ) -> Self {
        Self {
            connector,
            settings,
            store,
            sink,
            transport: None,
            worker: None,
        }
    }

    /// Inicia a aquisição em background.
    ///
    /// Abre o transporte se necessário; em caso de falha nada é iniciado e
    /// um novo `start()` tenta abrir de novo.
    pub fn start(&mut self) -> Result<StartOutcome, AcquisitionError> {
        if self.is_running() {
            debug!("start() ignorado: aquisição já em andamento");
            return Ok(StartOutcome::AlreadyRunning);
        }
        self.reclaim_worker();

        let (transport, settle) = match self.transport.take() {
            Some(t) => (t, None),
            None => {
                let t = self.connector.open()?;
                (t, Some(self.connector.settle_delay()))
            }
        };

        let (stop_tx, stop_rx) = bounded::<()>(1);
        let ctx = WorkerContext {
            settings: self.settings.clone(),
            store: Arc::clone(&self.store),
            sink: self.sink.clone(),
            stop: stop_rx,
        };
        let description = transport.describe();

        let handle = std::thread::Builder::new()
            .name("serial-acquisition".into())
            .spawn(move || ctx.run(transport, settle))
            .map_err(AcquisitionError::Spawn)?;

        info!("Aquisição iniciada em {description}");
        self.worker = Some(Worker {
            stop: Some(stop_tx),
            handle,
        });
        Ok(StartOutcome::Started)
    }

    /// Sinaliza parada cooperativa. Não bloqueia; a worker sai em até um
    /// intervalo de poll. Retorna `true` se havia uma worker ativa.
    pub fn pause(&mut self) -> bool {
        match self.worker.as_mut().and_then(|w| w.stop.take()) {
            Some(stop) => {
                drop(stop);
                info!("Aquisição pausada");
                true
            }
            None => false,
        }
    }

    /// `true` se existe worker sem sinal de parada e ainda viva.
    pub fn is_running(&self) -> bool {
        self.worker
            .as_ref()
            .is_some_and(|w| w.stop.is_some() && !w.handle.is_finished())
    }

    /// `true` se há um transporte aberto (ocioso ou em uso pela worker).
    pub fn transport_open(&self) -> bool {
        self.transport.is_some() || self.worker.is_some()
    }

    pub fn store(&self) -> Arc<ReadingStore> {
        Arc::clone(&self.store)
    }

    /// Para a worker e espera ela devolver o transporte.
    pub fn shutdown(&mut self) {
        self.pause();
        self.reclaim_worker();
    }

    /// Faz join da worker anterior e recupera o transporte.
    fn reclaim_worker(&mut self) {
        let Some(mut worker) = self.worker.take() else {
            return;
        };
        // Fecha o channel caso a worker tenha saído sozinha
        worker.stop.take();
        match worker.handle.join() {
            Ok(transport) => self.transport = Some(transport),
            Err(_) => {
                error!("Thread de aquisição terminou em pânico; transporte será reaberto");
                self.transport = None;
            }
        }
    }
}

impl Drop for AcquisitionManager {
    fn drop(&mut self) {
        self.shutdown();
    }
}

// ──────────────────────────────────────────────
// Worker
// ──────────────────────────────────────────────

struct WorkerContext {
    settings: LoopSettings,
    store: Arc<ReadingStore>,
    sink: Sender<AcquisitionEvent>,
    stop: Receiver<()>,
}

impl WorkerContext {
    /// Sender descartado (ou mensagem) significa parar.
    fn stop_requested(&self) -> bool {
        !matches!(self.stop.try_recv(), Err(TryRecvError::Empty))
    }

    /// Espera `timeout` ou até o sinal de parada. Retorna `true` se parou.
    fn wait_or_stop(&self, timeout: Duration) -> bool {
        !matches!(self.stop.recv_timeout(timeout), Err(RecvTimeoutError::Timeout))
    }

    fn run(self, mut transport: Box<dyn Transport>, settle: Option<Duration>) -> Box<dyn Transport> {
        if let Some(settle) = settle.filter(|d| !d.is_zero()) {
            debug!("Aguardando {} ms para o dispositivo reiniciar", settle.as_millis());
            if self.wait_or_stop(settle) {
                return transport;
            }
        }

        let s = &self.settings;
        let mut sync = FrameSynchronizer::new(s.marker.clone(), s.frame_len);
        let mut last_frame = Instant::now();
        let mut idle_reported = false;
        // Erro repetido (ex: porta desconectada) é reportado uma vez só
        let mut last_error: Option<String> = None;

        loop {
            if self.stop_requested() {
                break;
            }

            for _ in 0..s.max_lines_per_tick {
                match transport.read_line() {
                    Ok(Some(line)) => {
                        if last_error.take().is_some() {
                            info!("Leitura restabelecida");
                        }
                        if let Some(frame) = sync.push(&line) {
                            debug!("Frame completo: {:?}", frame.lines());
                            let reading = s.parser.parse(&frame);
                            self.publish(reading);
                            last_frame = Instant::now();
                            idle_reported = false;
                        }
                    }
                    Ok(None) => break,
                    Err(e) => {
                        // Bytes perdidos: o frame parcial não é confiável
                        sync.reset();
                        let text = e.to_string();
                        if last_error.as_deref() != Some(text.as_str()) {
                            warn!("{text}");
                            let _ = self.sink.try_send(AcquisitionEvent::ReadError(text.clone()));
                            last_error = Some(text);
                        }
                        break;
                    }
                }
            }

            if let Some(limit) = s.idle_timeout {
                let idle = last_frame.elapsed();
                if !idle_reported && idle >= limit {
                    warn!("Nenhum frame recebido há {} s", idle.as_secs());
                    let _ = self.sink.try_send(AcquisitionEvent::NoData { idle });
                    idle_reported = true;
                }
            }

            if self.wait_or_stop(s.poll_interval) {
                break;
            }
        }

        debug!(
            "Worker encerrada: {} frames, {} descartados",
            sync.frames_emitted(),
            sync.frames_discarded()
        );
        transport
    }

    /// Store primeiro (cópia durável), depois display sem bloquear.
    fn publish(&self, reading: Reading) {
        self.store.append(reading.clone());
        if self.sink.try_send(AcquisitionEvent::Reading(reading)).is_err() {
            debug!("Channel do display cheio, descartando evento");
        }
    }
}
