//! Store em memória das leituras desde a última exportação.

use crate::types::Reading;
use std::sync::{Mutex, MutexGuard};

/// Sequência ordenada (por inserção) de leituras, compartilhada entre a
/// thread de aquisição (escrita) e o controle/exportação (leitura).
///
/// Todas as operações são mutuamente exclusivas sob um único lock.
#[derive(Debug, Default)]
pub struct ReadingStore {
    readings: Mutex<Vec<Reading>>,
}

impl ReadingStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Reading>> {
        // Lock envenenado ainda contém só leituras completas.
        self.readings.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn append(&self, reading: Reading) {
        self.lock().push(reading);
    }

    /// Retorna todas as leituras e esvazia o store atomicamente.
    pub fn drain(&self) -> Vec<Reading> {
        std::mem::take(&mut *self.lock())
    }

    /// Cópia das leituras atuais, sem limpar.
    pub fn snapshot(&self) -> Vec<Reading> {
        self.lock().clone()
    }

    /// Remove exatamente as `count` leituras mais antigas.
    ///
    /// Usado após uma exportação bem-sucedida de um snapshot: leituras
    /// adicionadas durante a exportação permanecem para a próxima.
    pub fn discard_front(&self, count: usize) {
        let mut readings = self.lock();
        let count = count.min(readings.len());
        readings.drain(..count);
    }

    pub fn latest(&self) -> Option<Reading> {
        self.lock().last().cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Field, FieldValue};
    use chrono::NaiveDate;
    use std::sync::Arc;

    fn reading(humidity: &str) -> Reading {
        let at = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let mut r = Reading::empty(&[Field::Humidity], at);
        r.set(Field::Humidity, FieldValue::Value(humidity.into()));
        r
    }

    #[test]
    fn drain_returns_in_order_and_clears() {
        let store = ReadingStore::new();
        store.append(reading("1"));
        store.append(reading("2"));
        // Timestamps duplicados são permitidos
        store.append(reading("3"));

        let snap = store.snapshot();
        assert_eq!(snap.len(), 3);
        assert_eq!(store.len(), 3);

        let drained = store.drain();
        let values: Vec<_> = drained.iter().map(|r| r.get(Field::Humidity).as_text().to_string()).collect();
        assert_eq!(values, ["1", "2", "3"]);
        assert!(store.is_empty());
    }

    #[test]
    fn discard_front_keeps_newer_readings() {
        let store = ReadingStore::new();
        store.append(reading("a"));
        store.append(reading("b"));
        let exported = store.snapshot();
        store.append(reading("c"));

        store.discard_front(exported.len());
        assert_eq!(store.len(), 1);
        assert_eq!(store.latest().unwrap().get(Field::Humidity).as_text(), "c");

        store.discard_front(10);
        assert!(store.is_empty());
    }

    #[test]
    fn concurrent_appends_are_not_lost() {
        let store = Arc::new(ReadingStore::new());
        let writers: Vec<_> = (0..4)
            .map(|_| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for i in 0..250 {
                        store.append(reading(&i.to_string()));
                    }
                })
            })
            .collect();
        let mut drained = 0;
        for w in writers {
            w.join().unwrap();
            drained += store.drain().len();
        }
        drained += store.drain().len();
        assert_eq!(drained, 1000);
    }
}
