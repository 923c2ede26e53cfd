//! Sistema de alertas – níveis e avaliação de thresholds por campo.

use crate::config::AlertThresholds;
use crate::types::{Field, Reading};
use serde::{Deserialize, Serialize};

/// Nível de alerta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AlertLevel {
    Normal,
    Warning,
    Critical,
}

/// Um alerta disparado.
#[derive(Debug, Clone)]
pub struct Alert {
    pub field: Field,
    pub value: f32,
    pub level: AlertLevel,
}

/// Avalia uma leitura contra os thresholds e retorna alertas.
///
/// Campos indisponíveis ou não numéricos não geram alerta.
pub fn evaluate_alerts(reading: &Reading, thresholds: &AlertThresholds) -> Vec<Alert> {
    reading
        .fields()
        .filter_map(|(field, value)| {
            let value = value.numeric()?;
            let level = level_for_field(field, value, thresholds);
            (level != AlertLevel::Normal).then_some(Alert { field, value, level })
        })
        .collect()
}

/// Nível para um campo; distância é proximidade (menor = pior).
pub fn level_for_field(field: Field, value: f32, th: &AlertThresholds) -> AlertLevel {
    match field {
        Field::TemperatureLm35 | Field::TemperatureDht => {
            level_for_value(value, th.temp_warning, th.temp_critical)
        }
        Field::Humidity => level_for_value(value, th.humidity_warning, th.humidity_critical),
        Field::SoundLevel => level_for_value(value, th.sound_warning, th.sound_critical),
        Field::Distance => {
            if value <= th.distance_critical {
                AlertLevel::Critical
            } else if value <= th.distance_warning {
                AlertLevel::Warning
            } else {
                AlertLevel::Normal
            }
        }
    }
}

/// Retorna o [`AlertLevel`] para um valor dado thresholds.
pub fn level_for_value(value: f32, warn: f32, crit: f32) -> AlertLevel {
    if value >= crit {
        AlertLevel::Critical
    } else if value >= warn {
        AlertLevel::Warning
    } else {
        AlertLevel::Normal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FieldValue;
    use chrono::NaiveDate;

    fn reading(values: &[(Field, &str)]) -> Reading {
        let at = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        let schema: Vec<Field> = Field::ALL.to_vec();
        let mut r = Reading::empty(&schema, at);
        for (f, v) in values {
            r.set(*f, FieldValue::Value((*v).into()));
        }
        r
    }

    #[test]
    fn no_alerts_for_normal_values() {
        let r = reading(&[(Field::TemperatureLm35, "25.3"), (Field::Humidity, "55"), (Field::Distance, "30")]);
        assert!(evaluate_alerts(&r, &AlertThresholds::default()).is_empty());
    }

    #[test]
    fn critical_temperature_triggers_alert() {
        let r = reading(&[(Field::TemperatureDht, "41.0 °C")]);
        let alerts = evaluate_alerts(&r, &AlertThresholds::default());
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].field, Field::TemperatureDht);
        assert_eq!(alerts[0].level, AlertLevel::Critical);
    }

    #[test]
    fn close_object_is_critical() {
        let th = AlertThresholds::default();
        assert_eq!(level_for_field(Field::Distance, 5.0, &th), AlertLevel::Critical);
        assert_eq!(level_for_field(Field::Distance, 15.0, &th), AlertLevel::Warning);
        assert_eq!(level_for_field(Field::Distance, 80.0, &th), AlertLevel::Normal);
    }

    #[test]
    fn warning_level() {
        assert_eq!(level_for_value(75.0, 70.0, 85.0), AlertLevel::Warning);
        assert_eq!(level_for_value(90.0, 70.0, 85.0), AlertLevel::Critical);
        assert_eq!(level_for_value(50.0, 70.0, 85.0), AlertLevel::Normal);
    }
}
