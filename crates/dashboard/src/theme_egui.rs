//! Paletas do dashboard em `egui::Color32`.

use egui::Color32;
use sensor_core::Field;
use sensor_core::alerts::AlertLevel;

/// Tema visual.
#[derive(Clone)]
pub struct EguiTheme {
    pub name: &'static str,
    pub bg: Color32,
    pub panel: Color32,
    pub text: Color32,
    pub dim: Color32,
    pub title: Color32,
    pub ok: Color32,
    pub temperature: Color32,
    pub humidity: Color32,
    pub distance: Color32,
    pub sound: Color32,
    pub warning: Color32,
    pub critical: Color32,
}

impl EguiTheme {
    pub fn dark() -> Self {
        Self {
            name: "dark",
            bg: Color32::from_rgb(0x1a, 0x1a, 0x1a),
            panel: Color32::from_rgb(0x25, 0x25, 0x25),
            text: Color32::WHITE,
            dim: Color32::from_rgb(0x66, 0x66, 0x66),
            title: Color32::from_rgb(0x00, 0xd9, 0xff),
            ok: Color32::from_rgb(0x00, 0xff, 0x88),
            temperature: Color32::from_rgb(0xff, 0x6b, 0x6b),
            humidity: Color32::from_rgb(0x00, 0xd9, 0xff),
            distance: Color32::from_rgb(0xff, 0xa5, 0x00),
            sound: Color32::from_rgb(0xc7, 0x7d, 0xff),
            warning: Color32::from_rgb(0xff, 0xa5, 0x00),
            critical: Color32::from_rgb(0xff, 0x33, 0x33),
        }
    }

    pub fn light() -> Self {
        Self {
            name: "light",
            bg: Color32::from_rgb(0xf0, 0xf0, 0xf0),
            panel: Color32::WHITE,
            text: Color32::from_rgb(0x1a, 0x1a, 0x1a),
            dim: Color32::from_rgb(0x88, 0x88, 0x88),
            title: Color32::from_rgb(0x00, 0x66, 0xcc),
            ok: Color32::from_rgb(0x00, 0x99, 0x55),
            temperature: Color32::from_rgb(0xcc, 0x33, 0x33),
            humidity: Color32::from_rgb(0x00, 0x66, 0xcc),
            distance: Color32::from_rgb(0xcc, 0x77, 0x00),
            sound: Color32::from_rgb(0x77, 0x33, 0xaa),
            warning: Color32::from_rgb(0xcc, 0x77, 0x00),
            critical: Color32::from_rgb(0xcc, 0x00, 0x00),
        }
    }

    /// Cor de destaque de um campo.
    pub fn field_color(&self, field: Field) -> Color32 {
        match field {
            Field::TemperatureLm35 | Field::TemperatureDht => self.temperature,
            Field::Humidity => self.humidity,
            Field::Distance => self.distance,
            Field::SoundLevel => self.sound,
        }
    }

    /// Cor do valor conforme o nível de alerta.
    pub fn value_color(&self, level: AlertLevel) -> Color32 {
        match level {
            AlertLevel::Normal => self.text,
            AlertLevel::Warning => self.warning,
            AlertLevel::Critical => self.critical,
        }
    }
}

/// Temas disponíveis; o primeiro é o padrão.
pub fn all_themes() -> Vec<EguiTheme> {
    vec![EguiTheme::dark(), EguiTheme::light()]
}
