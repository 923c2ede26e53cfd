//! Painéis da última leitura renderizados com egui.

use crate::theme_egui::EguiTheme;
use egui::{Color32, RichText, Ui};
use sensor_core::alerts::{AlertLevel, level_for_field};
use sensor_core::config::AlertThresholds;
use sensor_core::{Field, FieldValue, Reading};

/// Agrupamento dos campos em painéis.
pub const PANELS: [(&str, &[Field]); 3] = [
    ("TEMPERATURA", &[Field::TemperatureLm35, Field::TemperatureDht]),
    ("AMBIENTE", &[Field::Humidity, Field::SoundLevel]),
    ("PROXIMIDADE", &[Field::Distance]),
];

// ──────────────────────────────────────────
// Helpers
// ──────────────────────────────────────────

pub fn metric_row(ui: &mut Ui, label: &str, value: &str, color: Color32, dim: Color32) {
    ui.horizontal(|ui: &mut Ui| {
        ui.label(RichText::new(format!("{label}:")).color(dim).monospace());
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui: &mut Ui| {
            ui.label(RichText::new(value).color(color).monospace().strong());
        });
    });
}

pub fn panel_frame(
    ui: &mut Ui,
    title: &str,
    accent: Color32,
    theme: &EguiTheme,
    add_body: impl FnOnce(&mut Ui),
) {
    egui::Frame::new()
        .fill(theme.panel)
        .stroke(egui::Stroke::new(2.0, accent))
        .corner_radius(4.0)
        .inner_margin(8.0)
        .show(ui, |ui: &mut Ui| {
            ui.vertical_centered(|ui: &mut Ui| {
                ui.label(
                    RichText::new(format!("── {title} ──"))
                        .color(accent)
                        .strong()
                        .monospace()
                        .size(13.0),
                );
            });
            ui.add_space(4.0);
            add_body(ui);
        });
}

/// Cor do valor: indisponível fica apagado, numérico segue o alerta.
fn value_color(field: Field, value: &FieldValue, theme: &EguiTheme, th: &AlertThresholds) -> Color32 {
    match value.numeric() {
        Some(v) => theme.value_color(level_for_field(field, v, th)),
        None if value.is_available() => theme.text,
        None => theme.dim,
    }
}

// ──────────────────────────────────────────
// Painéis
// ──────────────────────────────────────────

/// Um painel com os campos de `fields` presentes no schema.
///
/// Sem leitura ainda, todos aparecem como indisponíveis.
pub fn render_fields(
    ui: &mut Ui,
    title: &str,
    fields: &[Field],
    schema: &[Field],
    reading: Option<&Reading>,
    theme: &EguiTheme,
    th: &AlertThresholds,
) {
    let accent = fields.first().map_or(theme.title, |f| theme.field_color(*f));
    panel_frame(ui, title, accent, theme, |ui: &mut Ui| {
        let mut shown = 0;
        for field in fields.iter().filter(|f| schema.contains(f)) {
            let unavailable = FieldValue::Unavailable;
            let value = reading.map_or(&unavailable, |r| r.get(*field));
            metric_row(
                ui,
                field.display_label(),
                value.as_text(),
                value_color(*field, value, theme, th),
                theme.dim,
            );
            shown += 1;
        }
        if shown == 0 {
            ui.label(RichText::new("Fora do schema").color(theme.dim).monospace());
        }
    });
}

/// Estado da aquisição: rodando/pausado, pendentes de exportação, última leitura.
pub fn render_acquisition(
    ui: &mut Ui,
    running: bool,
    pending: usize,
    reading: Option<&Reading>,
    theme: &EguiTheme,
) {
    panel_frame(ui, "AQUISIÇÃO", theme.title, theme, |ui: &mut Ui| {
        let (state, color) = if running {
            ("● Recebendo", theme.ok)
        } else {
            ("○ Pausado", theme.warning)
        };
        metric_row(ui, "Estado", state, color, theme.dim);
        metric_row(ui, "Pendentes", &pending.to_string(), theme.text, theme.dim);
        let last = reading.map_or_else(|| "---".to_string(), Reading::timestamp_text);
        metric_row(ui, "Última", &last, theme.text, theme.dim);
    });
}

/// Nível mais grave da leitura, para o cabeçalho.
pub fn worst_level(reading: &Reading, th: &AlertThresholds) -> AlertLevel {
    sensor_core::alerts::evaluate_alerts(reading, th)
        .into_iter()
        .map(|a| a.level)
        .max()
        .unwrap_or(AlertLevel::Normal)
}
