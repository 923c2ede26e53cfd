//! Dashboard principal – App eframe/egui.

use crate::panels;
use crate::theme_egui::{self, EguiTheme};
use egui::{Color32, RichText};
use egui_plot::{Line, Plot, PlotPoints};
use sensor_core::alerts::AlertLevel;
use sensor_core::config::AppConfig;
use sensor_core::error::ExportError;
use sensor_core::{AcquisitionEvent, ExportOutcome, Field, Monitor, Reading, StartOutcome};
use std::collections::{BTreeMap, VecDeque};
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

const HISTORY_SIZE: usize = 120; // 2 minutos a 1 leitura/s
const NOTICE_SECS: u64 = 8;

/// Mensagem temporária no rodapé.
struct Notice {
    text: String,
    color: Color32,
    at: Instant,
}

/// Estado do dashboard.
pub struct SensorDashboard {
    config: AppConfig,
    monitor: Monitor,
    theme: EguiTheme,
    theme_index: usize,
    all_themes: Vec<EguiTheme>,

    // Dados
    latest: Option<Reading>,
    no_data: Option<Duration>,
    history: BTreeMap<Field, VecDeque<f64>>,

    // UI state
    notice: Option<Notice>,
    show_graphs: bool,
    is_fullscreen: bool,
}

impl SensorDashboard {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: AppConfig) -> Self {
        let monitor = Monitor::new(&config);
        let all_themes = theme_egui::all_themes();
        let theme = all_themes[0].clone();

        let mut dashboard = Self {
            config,
            monitor,
            theme,
            theme_index: 0,
            all_themes,
            latest: None,
            no_data: None,
            history: BTreeMap::new(),
            notice: None,
            show_graphs: true,
            is_fullscreen: false,
        };
        for problem in dashboard.config.validate() {
            dashboard.notify(format!("Config inválida: {problem}"), true);
        }
        dashboard
    }

    /// Drena os eventos pendentes da aquisição, fica com a leitura mais recente.
    fn poll_events(&mut self) {
        while let Ok(event) = self.monitor.events().try_recv() {
            match event {
                AcquisitionEvent::Reading(reading) => {
                    self.push_history(&reading);
                    self.latest = Some(reading);
                    self.no_data = None;
                }
                AcquisitionEvent::NoData { idle } => self.no_data = Some(idle),
                AcquisitionEvent::ReadError(e) => self.notify(format!("Leitura falhou: {e}"), true),
            }
        }
    }

    fn push_history(&mut self, reading: &Reading) {
        for (field, value) in reading.fields() {
            let Some(v) = value.numeric() else { continue };
            let deque = self
                .history
                .entry(field)
                .or_insert_with(|| VecDeque::with_capacity(HISTORY_SIZE));
            if deque.len() >= HISTORY_SIZE {
                deque.pop_front();
            }
            deque.push_back(v as f64);
        }
    }

    fn notify(&mut self, text: String, is_error: bool) {
        let color = if is_error { self.theme.critical } else { self.theme.ok };
        self.notice = Some(Notice {
            text,
            color,
            at: Instant::now(),
        });
    }

    // ── Ações ──

    fn start(&mut self) {
        match self.monitor.start() {
            Ok(StartOutcome::Started) => self.notify("Aquisição iniciada".into(), false),
            Ok(StartOutcome::AlreadyRunning) => {}
            Err(e) => {
                error!("{e}");
                self.notify(e.to_string(), true);
            }
        }
    }

    fn pause(&mut self) {
        if self.monitor.pause() {
            self.notify("Aquisição pausada".into(), false);
        }
    }

    fn save(&mut self) {
        match self.monitor.export() {
            Ok(outcome) => self.report_export(&outcome),
            Err(ExportError::NothingToExport) => self.notify("Nada para guardar".into(), true),
            Err(e) => {
                error!("Não foi possível guardar: {e}");
                self.notify(format!("Não foi possível guardar: {e}"), true);
            }
        }
    }

    fn report_export(&mut self, outcome: &ExportOutcome) {
        let a = &outcome.artifact;
        info!("Guardado: {} linhas em '{}' [{}]", a.rows, a.path.display(), a.section);
        let mut text = format!("Dados guardados em {} ({} linhas)", a.path.display(), a.rows);

        let failures: Vec<String> = outcome.sync_failures().map(|e| e.to_string()).collect();
        if !failures.is_empty() {
            for f in &failures {
                warn!("Sincronização remota falhou: {f}");
            }
            text.push_str(&format!(" | sync falhou: {}", failures.join("; ")));
            self.notify(text, true);
        } else {
            if !outcome.sync.is_empty() {
                text.push_str(" | sincronizado");
            }
            self.notify(text, false);
        }
    }

    /// Renderiza os gráficos de histórico.
    fn render_graphs(&self, ui: &mut egui::Ui) {
        let schema = self.monitor.exporter().schema();
        let plot_height = 120.0;
        let w = (ui.available_width() / schema.len().max(1) as f32) - 8.0;

        ui.horizontal_wrapped(|ui: &mut egui::Ui| {
            for field in schema {
                let empty = VecDeque::new();
                let data = self.history.get(field).unwrap_or(&empty);
                ui.vertical(|ui: &mut egui::Ui| {
                    self.mini_plot(ui, field.display_label(), data, self.theme.field_color(*field), w, plot_height);
                });
            }
        });
    }

    fn mini_plot(
        &self,
        ui: &mut egui::Ui,
        label: &str,
        data: &VecDeque<f64>,
        color: Color32,
        width: f32,
        height: f32,
    ) {
        ui.label(RichText::new(label).color(color).monospace().size(11.0));

        let points: PlotPoints = data
            .iter()
            .enumerate()
            .map(|(i, &v)| [i as f64, v])
            .collect();

        let line = Line::new(points).color(color).width(1.5);

        Plot::new(format!("plot_{label}"))
            .height(height)
            .width(width)
            .show_axes(false)
            .show_grid(false)
            .allow_drag(false)
            .allow_zoom(false)
            .allow_scroll(false)
            .allow_boxed_zoom(false)
            .include_y(0.0)
            .show(ui, |plot_ui| {
                plot_ui.line(line);
            });
    }

    fn render_controls(&mut self, ui: &mut egui::Ui) {
        let running = self.monitor.is_running();
        ui.horizontal(|ui: &mut egui::Ui| {
            if ui.add_enabled(!running, egui::Button::new("▶ Iniciar")).clicked() {
                self.start();
            }
            if ui.add_enabled(running, egui::Button::new("⏸ Pausar")).clicked() {
                self.pause();
            }
            if ui.button("💾 Guardar").clicked() {
                self.save();
            }
        });
    }
}

impl eframe::App for SensorDashboard {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ── Poll aquisição ──
        self.poll_events();

        ctx.request_repaint_after(Duration::from_millis(100));

        // ── Configurar estilo visual baseado no tema ──
        let mut visuals = if self.theme.name == "light" {
            egui::Visuals::light()
        } else {
            egui::Visuals::dark()
        };
        visuals.panel_fill = self.theme.bg;
        visuals.window_fill = self.theme.panel;
        visuals.override_text_color = Some(self.theme.text);
        ctx.set_visuals(visuals);

        // ── Atalhos de teclado ──
        let (mut start, mut pause, mut save) = (false, false, false);
        let (mut quit, mut toggle_fullscreen) = (false, false);
        ctx.input(|i: &egui::InputState| {
            if i.key_pressed(egui::Key::G) {
                self.show_graphs = !self.show_graphs;
            }
            if i.key_pressed(egui::Key::T) {
                self.theme_index = (self.theme_index + 1) % self.all_themes.len();
                self.theme = self.all_themes[self.theme_index].clone();
                info!("Tema: {}", self.theme.name);
            }
            if i.key_pressed(egui::Key::Space) {
                if self.monitor.is_running() {
                    pause = true;
                } else {
                    start = true;
                }
            }
            save = i.modifiers.command && i.key_pressed(egui::Key::S);
            quit = i.key_pressed(egui::Key::Q) || i.key_pressed(egui::Key::Escape);
            toggle_fullscreen = i.key_pressed(egui::Key::F11);
        });
        // Comandos de viewport fora do lock de input
        if quit {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }
        if toggle_fullscreen {
            self.is_fullscreen = !self.is_fullscreen;
            ctx.send_viewport_cmd(egui::ViewportCommand::Fullscreen(self.is_fullscreen));
        }
        if start {
            self.start();
        }
        if pause {
            self.pause();
        }
        if save {
            self.save();
        }

        if self
            .notice
            .as_ref()
            .is_some_and(|n| n.at.elapsed() >= Duration::from_secs(NOTICE_SECS))
        {
            self.notice = None;
        }

        // ── Painel central ──
        egui::CentralPanel::default().show(ctx, |ui: &mut egui::Ui| {
            // ── Título ──
            ui.vertical_centered(|ui: &mut egui::Ui| {
                let title_color = match self.latest.as_ref().map(|r| panels::worst_level(r, &self.config.alerts)) {
                    Some(AlertLevel::Critical) => self.theme.critical,
                    Some(AlertLevel::Warning) => self.theme.warning,
                    _ => self.theme.title,
                };
                ui.label(
                    RichText::new("📟 MONITOR DE SENSORES")
                        .color(title_color)
                        .size(22.0)
                        .strong()
                        .monospace(),
                );
            });

            ui.vertical_centered(|ui: &mut egui::Ui| {
                self.render_controls(ui);
            });

            // ── Sem dados ──
            if let Some(idle) = self.no_data.filter(|_| self.monitor.is_running()) {
                ui.vertical_centered(|ui: &mut egui::Ui| {
                    ui.label(
                        RichText::new(format!(
                            "⚠ Sem dados há {}s em {}",
                            idle.as_secs(),
                            self.config.serial.port
                        ))
                        .color(self.theme.warning)
                        .monospace(),
                    );
                });
            }

            ui.add_space(8.0);

            let th = &self.config.alerts;
            let schema = self.monitor.exporter().schema();
            let latest = self.latest.as_ref();
            ui.columns(panels::PANELS.len() + 1, |cols| {
                panels::render_acquisition(
                    &mut cols[0],
                    self.monitor.is_running(),
                    self.monitor.store().len(),
                    latest,
                    &self.theme,
                );
                for (col, (title, fields)) in cols[1..].iter_mut().zip(panels::PANELS) {
                    panels::render_fields(col, title, fields, schema, latest, &self.theme, th);
                }
            });

            // ── Gráficos ──
            if self.show_graphs {
                ui.add_space(8.0);
                ui.separator();
                self.render_graphs(ui);
            }

            // ── Help bar (fundo) ──
            ui.with_layout(egui::Layout::bottom_up(egui::Align::Center), |ui: &mut egui::Ui| {
                ui.label(
                    RichText::new("[Espaço] Iniciar/Pausar | [Ctrl+S] Guardar | [G] Gráficos | [T] Tema | [Q/Esc] Sair")
                        .color(self.theme.dim)
                        .monospace()
                        .size(10.0),
                );
                if let Some(notice) = &self.notice {
                    ui.label(RichText::new(&notice.text).color(notice.color).monospace());
                }
            });
        });
    }
}

impl Drop for SensorDashboard {
    fn drop(&mut self) {
        self.monitor.shutdown();
    }
}
