//! # Sensor Dashboard
//!
//! Display e controle do Monitor de Sensores via eframe/egui: última
//! leitura por campo, gráficos de histórico e os botões Iniciar, Pausar
//! e Guardar.
//!
//! ## Atalhos
//! - `Espaço`: Iniciar/Pausar
//! - `Ctrl+S`: Guardar
//! - `G`: Toggle gráficos
//! - `T`: Alternar tema
//! - `F11`: Fullscreen
//! - `Q` / `Esc`: Sair

mod dashboard;
mod panels;
mod theme_egui;

use dashboard::SensorDashboard;
use sensor_core::config::AppConfig;
use tracing::warn;

fn main() -> eframe::Result<()> {
    // ── Logging ──
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    // ── Config ──
    let config_path = AppConfig::default_path();
    let config = AppConfig::load(&config_path);

    if !config_path.exists() {
        if let Err(e) = config.save(&config_path) {
            warn!("Não foi possível salvar config padrão: {e}");
        }
    }

    // ── Janela eframe ──
    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_title("📟 Monitor de Sensores")
            .with_inner_size([1024.0, 640.0])
            .with_min_inner_size([800.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Monitor de Sensores",
        options,
        Box::new(move |cc| Ok(Box::new(SensorDashboard::new(cc, config)))),
    )
}
