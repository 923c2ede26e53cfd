//! # Sensor Recorder
//!
//! Aquisição headless: lê os frames do Arduino, registra cada leitura no
//! log e exporta periodicamente conforme `[recorder]` no `config.toml`.
//!
//! ## Uso
//! ```bash
//! sensor_recorder                # usa config.toml ao lado do executável
//! sensor_recorder outro.toml     # config explícito
//! ```

use crossbeam_channel::RecvTimeoutError;
use sensor_core::config::AppConfig;
use sensor_core::{AcquisitionEvent, Monitor, Reading};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

fn main() -> ExitCode {
    // ── Logging ──
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    // ── Carregar config ──
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(AppConfig::default_path);
    let config = AppConfig::load(&config_path);

    // Salva config padrão se não existir
    if !config_path.exists() {
        if let Err(e) = config.save(&config_path) {
            warn!("Não foi possível salvar config padrão: {e}");
        }
    }

    let errors = config.validate();
    if !errors.is_empty() {
        for e in &errors {
            error!("Config inválida: {e}");
        }
        return ExitCode::FAILURE;
    }

    let autosave = (config.recorder.autosave_secs > 0)
        .then(|| Duration::from_secs(config.recorder.autosave_secs));
    let run_for = (config.recorder.run_secs > 0).then(|| Duration::from_secs(config.recorder.run_secs));

    // ── Banner ──
    println!();
    println!("══════════════════════════════════════════════");
    println!("   📟 MONITOR DE SENSORES – RECORDER");
    println!("══════════════════════════════════════════════");
    println!("  Porta:     {} @ {}", config.serial.port, config.serial.baud_rate);
    println!("  Frame:     {} linhas (marcador '{}')", config.frame.line_count, config.frame.marker);
    println!("  Export:    {:?} → {}", config.export.policy, config.export.directory.display());
    match autosave {
        Some(d) => println!("  Autosave:  a cada {}s", d.as_secs()),
        None => println!("  Autosave:  só ao final"),
    }
    println!("══════════════════════════════════════════════");
    println!();

    let mut monitor = Monitor::new(&config);
    if let Err(e) = monitor.start() {
        error!("Aquisição não iniciada: {e}");
        return ExitCode::FAILURE;
    }

    // ── Loop principal ──
    let started = Instant::now();
    let mut last_save = Instant::now();
    loop {
        match monitor.events().recv_timeout(Duration::from_secs(1)) {
            Ok(AcquisitionEvent::Reading(reading)) => log_reading(&reading),
            Ok(AcquisitionEvent::NoData { idle }) => {
                warn!("Sem dados do Arduino há {}s – verifique o cabo/porta", idle.as_secs());
            }
            Ok(AcquisitionEvent::ReadError(e)) => warn!("Leitura falhou: {e}"),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }

        if autosave.is_some_and(|d| last_save.elapsed() >= d) {
            save(&monitor);
            last_save = Instant::now();
        }
        if run_for.is_some_and(|d| started.elapsed() >= d) {
            info!("Duração de {}s atingida", started.elapsed().as_secs());
            break;
        }
    }

    monitor.shutdown();
    if !monitor.store().is_empty() {
        save(&monitor);
    }
    ExitCode::SUCCESS
}

fn log_reading(reading: &Reading) {
    let fields: Vec<String> = reading
        .fields()
        .map(|(field, value)| format!("{} {}", field.display_label(), value))
        .collect();
    info!("[{}] {}", reading.timestamp_text(), fields.join(" | "));
}

fn save(monitor: &Monitor) {
    match monitor.export() {
        Ok(outcome) => {
            let a = &outcome.artifact;
            info!("Guardado: {} linhas em '{}' [{}]", a.rows, a.path.display(), a.section);
            if let Some(csv) = &a.companion {
                info!("CSV: {}", csv.display());
            }
            for result in &outcome.sync {
                match result {
                    Ok(report) => info!("Sincronizado: {}", report.artifact.display()),
                    Err(e) => error!("Sincronização remota falhou: {e}"),
                }
            }
        }
        Err(sensor_core::error::ExportError::NothingToExport) => {}
        Err(e) => error!("Não foi possível guardar: {e}"),
    }
}
