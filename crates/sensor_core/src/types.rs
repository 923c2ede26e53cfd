//! Definição de tipos das leituras de sensores.
//!
//! Um [`Frame`] é o grupo bruto de linhas vindo da serial; uma [`Reading`]
//! é o resultado tipado do parsing desse frame.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Formato de timestamp usado nas linhas exportadas e no display.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Texto gravado/mostrado para um campo sem valor.
pub const UNAVAILABLE_TEXT: &str = "---";

// ──────────────────────────────────────────────
// Campos
// ──────────────────────────────────────────────

/// Campos conhecidos do esquema de leitura.
///
/// O esquema é um superconjunto; cada deployment popula apenas o
/// subconjunto que o layout do seu frame fornece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    TemperatureLm35,
    TemperatureDht,
    Humidity,
    Distance,
    SoundLevel,
}

impl Field {
    pub const ALL: [Field; 5] = [
        Field::TemperatureLm35,
        Field::TemperatureDht,
        Field::Humidity,
        Field::Distance,
        Field::SoundLevel,
    ];

    /// Nome da coluna nos artefatos exportados.
    pub fn column_name(self) -> &'static str {
        match self {
            Field::TemperatureLm35 => "Temperature_LM35",
            Field::TemperatureDht => "Temperature_DHT",
            Field::Humidity => "Humidity",
            Field::Distance => "Distance",
            Field::SoundLevel => "SoundLevel",
        }
    }

    /// Rótulo curto para o display.
    pub fn display_label(self) -> &'static str {
        match self {
            Field::TemperatureLm35 => "LM35 (°C)",
            Field::TemperatureDht => "DHT11 Temp (°C)",
            Field::Humidity => "Humedad (%)",
            Field::Distance => "Distancia (cm)",
            Field::SoundLevel => "Nivel de sonido",
        }
    }

    /// Busca o campo pelo nome da coluna exportada.
    pub fn from_column_name(name: &str) -> Option<Field> {
        Field::ALL.into_iter().find(|f| f.column_name() == name)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

// ──────────────────────────────────────────────
// Valores
// ──────────────────────────────────────────────

/// Valor de um campo: texto livre (unidades preservadas) ou sentinela.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldValue {
    Value(String),
    #[default]
    Unavailable,
}

impl FieldValue {
    /// Converte o texto de uma célula/linha exportada de volta em valor.
    pub fn from_text(text: &str) -> Self {
        if text == UNAVAILABLE_TEXT {
            FieldValue::Unavailable
        } else {
            FieldValue::Value(text.to_string())
        }
    }

    pub fn as_text(&self) -> &str {
        match self {
            FieldValue::Value(v) => v,
            FieldValue::Unavailable => UNAVAILABLE_TEXT,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, FieldValue::Value(_))
    }

    /// Número no início do texto (ex: `"25.3 °C"` → `25.3`).
    pub fn numeric(&self) -> Option<f32> {
        match self {
            FieldValue::Value(v) => leading_number(v),
            FieldValue::Unavailable => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_text())
    }
}

fn leading_number(text: &str) -> Option<f32> {
    let text = text.trim_start();
    let end = text
        .char_indices()
        .take_while(|(i, c)| c.is_ascii_digit() || *c == '.' || (*i == 0 && (*c == '-' || *c == '+')))
        .map(|(i, c)| i + c.len_utf8())
        .last()?;
    text[..end].parse().ok()
}

// ──────────────────────────────────────────────
// Frame
// ──────────────────────────────────────────────

/// Grupo bruto de exatamente N linhas, a primeira contendo o marcador.
///
/// Só é construído pelo [`FrameSynchronizer`](crate::protocol::FrameSynchronizer).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    lines: Vec<String>,
}

impl Frame {
    pub(crate) fn new(lines: Vec<String>) -> Self {
        Self { lines }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Nunca zero: o sincronizador só emite frames com N >= 1 linhas.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.lines.len()
    }
}

// ──────────────────────────────────────────────
// Reading
// ──────────────────────────────────────────────

/// Leitura tipada de um frame, com timestamp de captura.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reading {
    pub captured_at: NaiveDateTime,
    values: BTreeMap<Field, FieldValue>,
}

impl Reading {
    /// Cria uma leitura com todos os campos do esquema indisponíveis.
    pub fn empty(schema: &[Field], captured_at: NaiveDateTime) -> Self {
        Self {
            captured_at,
            values: schema.iter().map(|f| (*f, FieldValue::Unavailable)).collect(),
        }
    }

    /// Valor de um campo; campos fora do esquema são indisponíveis.
    pub fn get(&self, field: Field) -> &FieldValue {
        const UNAVAILABLE: &FieldValue = &FieldValue::Unavailable;
        self.values.get(&field).unwrap_or(UNAVAILABLE)
    }

    /// Define o valor de um campo do esquema. Retorna `false` se o campo
    /// não pertence ao esquema desta leitura.
    pub fn set(&mut self, field: Field, value: FieldValue) -> bool {
        match self.values.get_mut(&field) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    pub fn fields(&self) -> impl Iterator<Item = (Field, &FieldValue)> {
        self.values.iter().map(|(f, v)| (*f, v))
    }

    pub fn timestamp_text(&self) -> String {
        self.captured_at.format(TIMESTAMP_FORMAT).to_string()
    }

    /// Linha tabular: timestamp seguido dos valores na ordem do esquema.
    pub fn to_row(&self, schema: &[Field]) -> Vec<String> {
        let mut row = Vec::with_capacity(schema.len() + 1);
        row.push(self.timestamp_text());
        row.extend(schema.iter().map(|f| self.get(*f).as_text().to_string()));
        row
    }
}

// ──────────────────────────────────────────────
// Testes
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 17)
            .unwrap()
            .and_hms_opt(14, 3, 9)
            .unwrap()
    }

    #[test]
    fn empty_reading_is_unavailable() {
        let r = Reading::empty(&[Field::Humidity, Field::Distance], at());
        assert_eq!(r.get(Field::Humidity), &FieldValue::Unavailable);
        assert_eq!(r.get(Field::SoundLevel), &FieldValue::Unavailable);
        assert_eq!(r.fields().count(), 2);
    }

    #[test]
    fn set_outside_schema_is_rejected() {
        let mut r = Reading::empty(&[Field::Humidity], at());
        assert!(!r.set(Field::Distance, FieldValue::Value("30".into())));
        assert!(r.set(Field::Humidity, FieldValue::Value("55".into())));
        assert_eq!(r.get(Field::Humidity).as_text(), "55");
    }

    #[test]
    fn row_follows_schema_order() {
        let schema = [Field::Distance, Field::TemperatureLm35];
        let mut r = Reading::empty(&schema, at());
        r.set(Field::TemperatureLm35, FieldValue::Value("25.3".into()));
        assert_eq!(r.to_row(&schema), vec!["2024-05-17 14:03:09", "---", "25.3"]);
    }

    #[test]
    fn numeric_prefix() {
        assert_eq!(FieldValue::Value("25.3 °C".into()).numeric(), Some(25.3));
        assert_eq!(FieldValue::Value("-4".into()).numeric(), Some(-4.0));
        assert_eq!(FieldValue::Value("n/a".into()).numeric(), None);
        assert_eq!(FieldValue::Unavailable.numeric(), None);
    }

    #[test]
    fn sentinel_text_roundtrip() {
        assert_eq!(FieldValue::from_text("---"), FieldValue::Unavailable);
        assert_eq!(FieldValue::from_text("55 %"), FieldValue::Value("55 %".into()));
        assert_eq!(Field::from_column_name("SoundLevel"), Some(Field::SoundLevel));
    }
}
