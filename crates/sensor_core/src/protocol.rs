//! Protocolo textual do Arduino: sincronização de frames e parsing.
//!
//! Cada medição chega como N linhas consecutivas, a primeira contendo o
//! marcador:
//!
//! ```text
//! LM35: 25.3          ← marcador (linha 0)
//! DHT11 Temp: 24.1
//! Humedad: 55
//! Distancia: 30
//! ```
//!
//! - [`FrameSynchronizer`] agrupa as linhas em [`Frame`]s de exatamente N linhas
//! - [`ReadingParser`] converte um frame em [`Reading`] via tabela de regras

use crate::types::{Field, FieldValue, Frame, Reading};
use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

// ──────────────────────────────────────────────
// Sincronização
// ──────────────────────────────────────────────

/// Estado observável do sincronizador.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// Descartando linhas até ver o marcador
    Seeking,
    /// Coletando; contém o número de linhas já no buffer
    Collecting(usize),
}

/// Máquina de estados SEEKING/COLLECTING.
///
/// Um novo marcador durante a coleta sempre reinicia o buffer: o frame
/// parcial é descartado.
#[derive(Debug)]
pub struct FrameSynchronizer {
    marker: String,
    frame_len: usize,
    buffer: Option<Vec<String>>,
    emitted: u64,
    discarded: u64,
}

impl FrameSynchronizer {
    /// `frame_len` inclui a linha do marcador; valores < 1 viram 1.
    pub fn new(marker: impl Into<String>, frame_len: usize) -> Self {
        Self {
            marker: marker.into(),
            frame_len: frame_len.max(1),
            buffer: None,
            emitted: 0,
            discarded: 0,
        }
    }

    /// Alimenta uma linha; retorna o frame quando ele fica completo.
    pub fn push(&mut self, line: &str) -> Option<Frame> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        if line.contains(self.marker.as_str()) {
            if let Some(partial) = self.buffer.take() {
                self.discarded += 1;
                debug!(
                    "Novo marcador com frame incompleto ({}/{} linhas), ressincronizando",
                    partial.len(),
                    self.frame_len
                );
            }
            let mut buffer = Vec::with_capacity(self.frame_len);
            buffer.push(line.to_string());
            self.buffer = Some(buffer);
        } else {
            match self.buffer.as_mut() {
                Some(buffer) => buffer.push(line.to_string()),
                None => {
                    trace!("Descartando linha fora de frame: {line}");
                    return None;
                }
            }
        }

        let complete = self
            .buffer
            .as_ref()
            .is_some_and(|b| b.len() == self.frame_len);
        if !complete {
            return None;
        }

        let lines = self.buffer.take()?;
        self.emitted += 1;
        Some(Frame::new(lines))
    }

    pub fn state(&self) -> SyncState {
        match &self.buffer {
            Some(b) => SyncState::Collecting(b.len()),
            None => SyncState::Seeking,
        }
    }

    /// Volta para SEEKING descartando qualquer frame parcial.
    pub fn reset(&mut self) {
        if self.buffer.take().is_some() {
            self.discarded += 1;
        }
    }

    pub fn frames_emitted(&self) -> u64 {
        self.emitted
    }

    pub fn frames_discarded(&self) -> u64 {
        self.discarded
    }
}

// ──────────────────────────────────────────────
// Parsing
// ──────────────────────────────────────────────

/// Regra `rótulo contido na linha → campo`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRule {
    pub label: String,
    pub field: Field,
}

impl FieldRule {
    pub fn new(label: impl Into<String>, field: Field) -> Self {
        Self {
            label: label.into(),
            field,
        }
    }

    /// Rótulos emitidos pelo firmware do Arduino.
    pub fn default_table() -> Vec<FieldRule> {
        vec![
            FieldRule::new("LM35", Field::TemperatureLm35),
            FieldRule::new("DHT11 Temp", Field::TemperatureDht),
            FieldRule::new("Humedad", Field::Humidity),
            FieldRule::new("Distancia", Field::Distance),
            FieldRule::new("Nivel de sonido", Field::SoundLevel),
        ]
    }
}

/// Converte frames em leituras tipadas.
#[derive(Debug, Clone)]
pub struct ReadingParser {
    rules: Vec<FieldRule>,
    schema: Vec<Field>,
    separator: char,
}

impl ReadingParser {
    pub fn new(rules: Vec<FieldRule>, schema: Vec<Field>, separator: char) -> Self {
        Self {
            rules,
            schema,
            separator,
        }
    }

    pub fn schema(&self) -> &[Field] {
        &self.schema
    }

    /// Converte um frame; campos sem linha correspondente ficam indisponíveis.
    ///
    /// A primeira regra (na ordem declarada) que casa com a linha define o
    /// campo; linhas sem regra são ignoradas.
    pub fn parse(&self, frame: &Frame) -> Reading {
        let mut values: Vec<(Field, String)> = Vec::with_capacity(frame.len());
        for line in frame.lines() {
            let Some(rule) = self.rules.iter().find(|r| line.contains(r.label.as_str())) else {
                trace!("Linha sem regra: {line}");
                continue;
            };
            match self.value_of(line) {
                Some(value) => values.push((rule.field, value.to_string())),
                None => trace!("Linha sem valor: {line}"),
            }
        }

        let mut reading = Reading::empty(&self.schema, Local::now().naive_local());
        for (field, value) in values {
            reading.set(field, FieldValue::Value(value));
        }
        reading
    }

    fn value_of<'a>(&self, line: &'a str) -> Option<&'a str> {
        let (_, value) = line.split_once(self.separator)?;
        let value = value.trim();
        (!value.is_empty()).then_some(value)
    }
}

// ──────────────────────────────────────────────
// Testes
// ──────────────────────────────────────────────
