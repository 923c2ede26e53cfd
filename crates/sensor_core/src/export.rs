//! Exportação das leituras para planilha (xlsx) e CSV.
//!
//! Duas políticas:
//! - `append_section` – um único `datos_sensores.xlsx` que ganha uma aba
//!   `Medicion_YYYYMMDD_HHMMSS` por exportação; o workbook é aberto para
//!   edição e as abas anteriores ficam como estavam.
//! - `fresh_file` – `datos_sensores_YYYYMMDD_HHMMSS.xlsx` (+ `.csv`) novos.
//!
//! Todo arquivo é gravado num temporário irmão e renomeado por cima do
//! destino; uma falha deixa o artefato anterior intacto.

use crate::config::{ExportConfig, ExportPolicy};
use crate::error::ExportError;
use crate::store::ReadingStore;
use crate::types::{Field, FieldValue, Reading, TIMESTAMP_FORMAT};
use calamine::{Data, Range, Reader, Xlsx, open_workbook};
use chrono::{Local, NaiveDateTime};
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Nome da primeira coluna.
pub const TIMESTAMP_COLUMN: &str = "Timestamp";

/// Limite do Excel para nomes de aba.
const MAX_SECTION_NAME: usize = 31;

/// Resultado de uma exportação.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub path: PathBuf,
    /// Aba onde as linhas foram gravadas
    pub section: String,
    pub rows: usize,
    /// `.csv` irmão (política `fresh_file`)
    pub companion: Option<PathBuf>,
}

impl ExportArtifact {
    /// Todos os arquivos produzidos, planilha primeiro.
    pub fn files(&self) -> Vec<&Path> {
        let mut files = vec![self.path.as_path()];
        files.extend(self.companion.as_deref());
        files
    }
}

/// Uma aba (ou um CSV) lida de volta como texto.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub name: String,
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Section {
    /// Reconstrói leituras a partir das colunas conhecidas.
    ///
    /// Linhas com timestamp inválido são ignoradas.
    pub fn readings(&self) -> Vec<Reading> {
        let columns: Vec<Option<Field>> = self
            .header
            .iter()
            .map(|h| Field::from_column_name(h))
            .collect();
        let schema: Vec<Field> = columns.iter().flatten().copied().collect();

        self.rows
            .iter()
            .filter_map(|row| {
                let at = NaiveDateTime::parse_from_str(row.first()?, TIMESTAMP_FORMAT).ok()?;
                let mut reading = Reading::empty(&schema, at);
                for (field, text) in columns.iter().zip(row).skip(1) {
                    if let Some(field) = field {
                        reading.set(*field, FieldValue::from_text(text));
                    }
                }
                Some(reading)
            })
            .collect()
    }
}

// ──────────────────────────────────────────────
// Exporter
// ──────────────────────────────────────────────

/// Serializa leituras conforme a política configurada.
#[derive(Debug, Clone)]
pub struct Exporter {
    config: ExportConfig,
    schema: Vec<Field>,
}

impl Exporter {
    pub fn new(config: ExportConfig, schema: Vec<Field>) -> Self {
        Self { config, schema }
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    pub fn schema(&self) -> &[Field] {
        &self.schema
    }

    /// `Timestamp` seguido das colunas do esquema.
    pub fn header(&self) -> Vec<String> {
        std::iter::once(TIMESTAMP_COLUMN.to_string())
            .chain(self.schema.iter().map(|f| f.column_name().to_string()))
            .collect()
    }

    pub fn export(&self, readings: &[Reading]) -> Result<ExportArtifact, ExportError> {
        self.export_at(readings, Local::now().naive_local())
    }

    /// Exporta usando `now` para nomear aba/arquivo.
    pub fn export_at(
        &self,
        readings: &[Reading],
        now: NaiveDateTime,
    ) -> Result<ExportArtifact, ExportError> {
        if readings.is_empty() {
            return Err(ExportError::NothingToExport);
        }
        let dir = &self.config.directory;
        fs::create_dir_all(dir).map_err(|e| ExportError::io(dir, e))?;

        let rows: Vec<Vec<String>> = readings.iter().map(|r| r.to_row(&self.schema)).collect();
        let artifact = match self.config.policy {
            ExportPolicy::AppendSection => self.append_section(&rows, now)?,
            ExportPolicy::FreshFile => self.fresh_file(&rows, now)?,
        };

        info!(
            "{} leituras exportadas para {} [{}]",
            artifact.rows,
            artifact.path.display(),
            artifact.section
        );
        Ok(artifact)
    }

    /// Exporta um snapshot do store; só remove do store o que foi exportado,
    /// e apenas em caso de sucesso.
    pub fn export_store(&self, store: &ReadingStore) -> Result<ExportArtifact, ExportError> {
        let snapshot = store.snapshot();
        let artifact = self.export(&snapshot)?;
        if self.config.clear_after_export {
            store.discard_front(snapshot.len());
        }
        Ok(artifact)
    }

    /// Abre o workbook existente, acrescenta uma aba e grava de volta.
    /// As abas anteriores (fórmulas, formatos, larguras) não são tocadas.
    fn append_section(
        &self,
        rows: &[Vec<String>],
        now: NaiveDateTime,
    ) -> Result<ExportArtifact, ExportError> {
        let path = self.config.directory.join(&self.config.file_name);
        let mut book = if path.exists() {
            umya_spreadsheet::reader::xlsx::read(&path).map_err(|e| ExportError::WorkbookRead {
                path: path.clone(),
                detail: e.to_string(),
            })?
        } else {
            umya_spreadsheet::new_file_empty_worksheet()
        };
        let preserved = book.get_sheet_count();

        let base = section_name(&self.config.section_prefix, now);
        let name = unique_section_name(&base, |n| book.get_sheet_by_name(n).is_some());

        let write_err = |detail: String| ExportError::WorkbookWrite {
            path: path.clone(),
            detail,
        };
        let sheet = book
            .new_sheet(name.as_str())
            .map_err(|e| write_err(format!("aba '{name}': {e}")))?;
        write_section(sheet, &self.header(), rows);

        write_atomically(&path, |tmp| {
            umya_spreadsheet::writer::xlsx::write(&book, tmp).map_err(|e| write_err(e.to_string()))
        })?;

        if preserved > 0 {
            info!("Nova aba '{name}' adicionada ({preserved} abas preservadas)");
        }
        Ok(ExportArtifact {
            path,
            section: name,
            rows: rows.len(),
            companion: None,
        })
    }

    fn fresh_file(
        &self,
        rows: &[Vec<String>],
        now: NaiveDateTime,
    ) -> Result<ExportArtifact, ExportError> {
        let dir = &self.config.directory;
        let stem = format!("{}_{}", self.config.fresh_prefix, now.format("%Y%m%d_%H%M%S"));
        let write_csv = self.config.write_csv;

        let mut suffix = 1;
        let (xlsx_path, csv_path) = loop {
            let name = if suffix == 1 {
                stem.clone()
            } else {
                format!("{stem}_{suffix}")
            };
            let xlsx = dir.join(format!("{name}.xlsx"));
            let csv = dir.join(format!("{name}.csv"));
            if !xlsx.exists() && !(write_csv && csv.exists()) {
                break (xlsx, csv);
            }
            suffix += 1;
        };

        let header = self.header();
        let section = section_name(&self.config.section_prefix, now);
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.set_name(&section)?;
        write_table(sheet, &header, rows)?;
        write_atomically(&xlsx_path, |tmp| Ok(workbook.save(tmp)?))?;

        let companion = if write_csv {
            if let Err(e) = write_atomically(&csv_path, |tmp| write_csv_file(tmp, &header, rows)) {
                // O xlsx desta exportação é novo: remove para não deixar meio artefato
                if let Err(rm) = fs::remove_file(&xlsx_path) {
                    warn!("Não foi possível remover {}: {rm}", xlsx_path.display());
                }
                return Err(e);
            }
            Some(csv_path)
        } else {
            None
        };

        Ok(ExportArtifact {
            path: xlsx_path,
            section,
            rows: rows.len(),
            companion,
        })
    }
}

// ──────────────────────────────────────────────
// Leitura de artefatos
// ──────────────────────────────────────────────

/// Lê todas as abas de uma planilha como texto.
pub fn read_sections(path: &Path) -> Result<Vec<Section>, ExportError> {
    let sheets = read_raw_sheets(path)?;
    Ok(sheets
        .into_iter()
        .map(|(name, range)| {
            let mut rows = range.rows().map(|row| row.iter().map(cell_text).collect::<Vec<_>>());
            let header = rows.next().unwrap_or_default();
            Section {
                name,
                header,
                rows: rows.collect(),
            }
        })
        .collect())
}

/// Lê um CSV exportado.
pub fn read_csv(path: &Path) -> Result<Section, ExportError> {
    let mut reader = csv::Reader::from_path(path)?;
    let header = reader.headers()?.iter().map(str::to_string).collect();
    let rows = reader
        .records()
        .map(|r| r.map(|rec| rec.iter().map(str::to_string).collect()))
        .collect::<Result<Vec<Vec<String>>, _>>()?;
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(Section { name, header, rows })
}

fn read_raw_sheets(path: &Path) -> Result<Vec<(String, Range<Data>)>, ExportError> {
    let read_err = |detail: String| ExportError::WorkbookRead {
        path: path.to_path_buf(),
        detail,
    };

    let mut workbook: Xlsx<_> = open_workbook(path).map_err(|e: calamine::XlsxError| read_err(e.to_string()))?;
    let names = workbook.sheet_names();
    names
        .into_iter()
        .map(|name| {
            let range = workbook
                .worksheet_range(&name)
                .map_err(|e| read_err(format!("aba '{name}': {e}")))?;
            Ok((name, range))
        })
        .collect()
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.clone(),
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

// ──────────────────────────────────────────────
// Escrita
// ──────────────────────────────────────────────

fn write_table(sheet: &mut Worksheet, header: &[String], rows: &[Vec<String>]) -> Result<(), XlsxError> {
    let bold = Format::new().set_bold();
    for (col, title) in header.iter().enumerate() {
        let col = col as u16;
        sheet.write_string_with_format(0, col, title, &bold)?;
        sheet.set_column_width(col, if col == 0 { 20 } else { 16 })?;
    }
    for (i, row) in rows.iter().enumerate() {
        let r = i as u32 + 1;
        for (col, value) in row.iter().enumerate() {
            sheet.write_string(r, col as u16, value)?;
        }
    }
    Ok(())
}

/// Mesma tabela de [`write_table`] numa aba aberta para edição (1-based).
fn write_section(sheet: &mut umya_spreadsheet::Worksheet, header: &[String], rows: &[Vec<String>]) {
    for (i, title) in header.iter().enumerate() {
        let col = i as u32 + 1;
        sheet.get_cell_mut((col, 1)).set_value_string(title.as_str());
        sheet.get_style_mut((col, 1)).get_font_mut().set_bold(true);
        sheet
            .get_column_dimension_mut(&column_letter(col))
            .set_width(if col == 1 { 20.0 } else { 16.0 });
    }
    for (i, row) in rows.iter().enumerate() {
        let r = i as u32 + 2;
        for (j, value) in row.iter().enumerate() {
            sheet.get_cell_mut((j as u32 + 1, r)).set_value_string(value.as_str());
        }
    }
}

/// Letra da coluna a partir do índice 1-based (1 → A, 27 → AA).
fn column_letter(mut col: u32) -> String {
    let mut letters = Vec::new();
    while col > 0 {
        let rem = (col - 1) % 26;
        letters.push(b'A' + rem as u8);
        col = (col - 1) / 26;
    }
    letters.reverse();
    String::from_utf8_lossy(&letters).into_owned()
}

fn write_csv_file(path: &Path, header: &[String], rows: &[Vec<String>]) -> Result<(), ExportError> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(header)?;
    for row in rows {
        writer.write_record(row)?;
    }
    writer.flush().map_err(|e| ExportError::io(path, e))
}

/// Grava em `.<nome>.tmp` e renomeia para `target`.
fn write_atomically<F>(target: &Path, write: F) -> Result<(), ExportError>
where
    F: FnOnce(&Path) -> Result<(), ExportError>,
{
    let file_name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "export".into());
    let tmp = target.with_file_name(format!(".{file_name}.tmp"));

    let result = write(&tmp).and_then(|()| fs::rename(&tmp, target).map_err(|e| ExportError::io(target, e)));
    if result.is_err() && tmp.exists() {
        let _ = fs::remove_file(&tmp);
    }
    result
}

/// `<prefixo>_YYYYMMDD_HHMMSS`, saneado para nome de aba válido.
pub fn section_name(prefix: &str, now: NaiveDateTime) -> String {
    let raw = format!("{prefix}_{}", now.format("%Y%m%d_%H%M%S"));
    let cleaned: String = raw
        .chars()
        .map(|c| if matches!(c, '[' | ']' | ':' | '*' | '?' | '/' | '\\') { '_' } else { c })
        .collect();
    let cleaned = cleaned.trim_matches('\'');
    cleaned.chars().take(MAX_SECTION_NAME).collect()
}

fn unique_section_name(base: &str, taken: impl Fn(&str) -> bool) -> String {
    if !taken(base) {
        return base.to_string();
    }
    (2..)
        .map(|n| {
            let suffix = format!("_{n}");
            let keep = MAX_SECTION_NAME.saturating_sub(suffix.len());
            let head: String = base.chars().take(keep).collect();
            format!("{head}{suffix}")
        })
        .find(|candidate| !taken(candidate))
        .unwrap_or_else(|| base.to_string())
}

// ──────────────────────────────────────────────
// Testes
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const SCHEMA: [Field; 4] = [
        Field::TemperatureLm35,
        Field::TemperatureDht,
        Field::Humidity,
        Field::Distance,
    ];

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 17)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    fn reading(at: NaiveDateTime, values: [&str; 4]) -> Reading {
        let mut r = Reading::empty(&SCHEMA, at);
        for (f, v) in SCHEMA.iter().zip(values) {
            r.set(*f, FieldValue::from_text(v));
        }
        r
    }

    fn exporter(dir: &Path, policy: ExportPolicy) -> Exporter {
        let config = ExportConfig {
            policy,
            directory: dir.to_path_buf(),
            ..Default::default()
        };
        Exporter::new(config, SCHEMA.to_vec())
    }

    #[test]
    fn creates_workbook_with_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let exp = exporter(dir.path(), ExportPolicy::AppendSection);
        let readings = [reading(at(10, 0, 0), ["25.3", "24.1", "55", "30"])];

        let artifact = exp.export_at(&readings, at(10, 0, 5)).unwrap();
        assert_eq!(artifact.path, dir.path().join("datos_sensores.xlsx"));
        assert_eq!(artifact.section, "Medicion_20240517_100005");
        assert_eq!(artifact.rows, 1);

        let sections = read_sections(&artifact.path).unwrap();
        assert_eq!(sections.len(), 1);
        assert_eq!(
            sections[0].header,
            ["Timestamp", "Temperature_LM35", "Temperature_DHT", "Humidity", "Distance"]
        );
        assert_eq!(sections[0].rows[0], ["2024-05-17 10:00:00", "25.3", "24.1", "55", "30"]);
    }

    #[test]
    fn second_export_adds_section_and_keeps_first() {
        let dir = tempfile::tempdir().unwrap();
        let exp = exporter(dir.path(), ExportPolicy::AppendSection);

        let first = [
            reading(at(10, 0, 0), ["25.3", "24.1", "55", "30"]),
            reading(at(10, 0, 1), ["25.4", "---", "56", "31"]),
        ];
        exp.export_at(&first, at(10, 1, 0)).unwrap();
        let before = read_sections(&dir.path().join("datos_sensores.xlsx")).unwrap();

        let second = [reading(at(11, 0, 0), ["19.0", "18.5", "60", "12"])];
        let artifact = exp.export_at(&second, at(11, 1, 0)).unwrap();

        let after = read_sections(&artifact.path).unwrap();
        assert_eq!(after.len(), 2);
        assert_eq!(after[0], before[0]);
        assert_eq!(after[1].name, "Medicion_20240517_110100");
        assert_eq!(after[1].rows.len(), 1);

        assert_eq!(after[0].readings(), first.to_vec());
        assert_eq!(after[1].readings(), second.to_vec());
    }

    #[test]
    fn same_second_exports_get_distinct_sections() {
        let dir = tempfile::tempdir().unwrap();
        let exp = exporter(dir.path(), ExportPolicy::AppendSection);
        let readings = [reading(at(9, 0, 0), ["1", "2", "3", "4"])];

        let a = exp.export_at(&readings, at(9, 0, 0)).unwrap();
        let b = exp.export_at(&readings, at(9, 0, 0)).unwrap();
        assert_ne!(a.section, b.section);
        assert_eq!(b.section, "Medicion_20240517_090000_2");
        assert_eq!(read_sections(&b.path).unwrap().len(), 2);
    }

    #[test]
    fn corrupt_workbook_is_left_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("datos_sensores.xlsx");
        fs::write(&path, b"nao e um xlsx").unwrap();

        let exp = exporter(dir.path(), ExportPolicy::AppendSection);
        let readings = [reading(at(9, 0, 0), ["1", "2", "3", "4"])];
        let err = exp.export_at(&readings, at(9, 0, 0)).unwrap_err();

        assert!(matches!(err, ExportError::WorkbookRead { .. }));
        assert_eq!(fs::read(&path).unwrap(), b"nao e um xlsx");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn existing_sheets_keep_formulas_and_formats() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("datos_sensores.xlsx");

        let mut wb = Workbook::new();
        let sheet = wb.add_worksheet();
        sheet.set_name("Resumen").unwrap();
        sheet.write_number(0, 0, 1).unwrap();
        sheet.write_number(0, 1, 2).unwrap();
        sheet.write_formula(0, 2, "=A1+B1").unwrap();
        let day = rust_xlsxwriter::ExcelDateTime::from_ymd(2024, 5, 17).unwrap();
        let date_fmt = Format::new().set_num_format("yyyy-mm-dd");
        sheet.write_datetime_with_format(1, 0, &day, &date_fmt).unwrap();
        wb.save(&path).unwrap();

        let exp = exporter(dir.path(), ExportPolicy::AppendSection);
        let readings = [reading(at(9, 0, 0), ["1", "2", "3", "4"])];
        let artifact = exp.export_at(&readings, at(9, 0, 0)).unwrap();

        let mut book: Xlsx<_> = open_workbook(&artifact.path).unwrap();
        assert_eq!(book.sheet_names(), ["Resumen", "Medicion_20240517_090000"]);
        let formulas = book.worksheet_formula("Resumen").unwrap();
        assert_eq!(
            formulas.get_value((0, 2)).map(|f| f.trim_start_matches('=')),
            Some("A1+B1")
        );
        let values = book.worksheet_range("Resumen").unwrap();
        assert!(matches!(values.get_value((1, 0)), Some(Data::DateTime(_))));

        let sections = read_sections(&artifact.path).unwrap();
        assert_eq!(sections[1].readings(), readings.to_vec());
    }

    #[test]
    fn failed_save_leaves_workbook_and_store_intact() {
        let dir = tempfile::tempdir().unwrap();
        let exp = exporter(dir.path(), ExportPolicy::AppendSection);
        let store = ReadingStore::new();
        store.append(reading(at(7, 0, 0), ["1", "2", "3", "4"]));
        let artifact = exp.export_store(&store).unwrap();
        let before = fs::read(&artifact.path).unwrap();

        // Temporário ocupado por um diretório: a gravação falha antes do rename
        fs::create_dir(dir.path().join(".datos_sensores.xlsx.tmp")).unwrap();
        store.append(reading(at(7, 0, 1), ["5", "6", "7", "8"]));
        assert!(exp.export_store(&store).is_err());

        assert_eq!(fs::read(&artifact.path).unwrap(), before);
        assert_eq!(store.len(), 1);
        assert_eq!(read_sections(&artifact.path).unwrap().len(), 1);
    }

    #[test]
    fn fresh_file_writes_xlsx_and_csv_pair() {
        let dir = tempfile::tempdir().unwrap();
        let exp = exporter(dir.path(), ExportPolicy::FreshFile);
        let readings = [
            reading(at(8, 0, 0), ["25.3", "24.1", "55", "30"]),
            reading(at(8, 0, 0), ["25.3", "24.1", "55 %", "---"]),
        ];

        let a = exp.export_at(&readings, at(8, 30, 0)).unwrap();
        assert_eq!(a.path, dir.path().join("datos_sensores_20240517_083000.xlsx"));
        let csv_path = a.companion.clone().unwrap();
        assert_eq!(csv_path, dir.path().join("datos_sensores_20240517_083000.csv"));
        assert_eq!(a.files().len(), 2);

        let csv = read_csv(&csv_path).unwrap();
        let xlsx = read_sections(&a.path).unwrap();
        assert_eq!(csv.header, xlsx[0].header);
        assert_eq!(csv.rows, xlsx[0].rows);
        assert_eq!(csv.readings(), readings.to_vec());

        // Mesmo segundo: arquivo irmão com sufixo, nada sobrescrito
        let b = exp.export_at(&readings, at(8, 30, 0)).unwrap();
        assert_eq!(b.path, dir.path().join("datos_sensores_20240517_083000_2.xlsx"));
    }

    #[test]
    fn fresh_file_without_csv() {
        let dir = tempfile::tempdir().unwrap();
        let config = ExportConfig {
            policy: ExportPolicy::FreshFile,
            directory: dir.path().to_path_buf(),
            write_csv: false,
            ..Default::default()
        };
        let exp = Exporter::new(config, SCHEMA.to_vec());
        let a = exp.export_at(&[reading(at(8, 0, 0), ["1", "2", "3", "4"])], at(8, 0, 0)).unwrap();
        assert!(a.companion.is_none());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn empty_export_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let exp = exporter(dir.path(), ExportPolicy::AppendSection);
        assert!(matches!(exp.export(&[]), Err(ExportError::NothingToExport)));
    }

    #[test]
    fn export_store_clears_only_on_success() {
        let dir = tempfile::tempdir().unwrap();
        let store = ReadingStore::new();
        store.append(reading(at(7, 0, 0), ["1", "2", "3", "4"]));

        // Diretório de saída é um arquivo: falha de I/O
        let blocker = dir.path().join("bloqueio");
        fs::write(&blocker, b"x").unwrap();
        let broken = exporter(&blocker, ExportPolicy::AppendSection);
        assert!(broken.export_store(&store).is_err());
        assert_eq!(store.len(), 1);

        let exp = exporter(dir.path(), ExportPolicy::AppendSection);
        exp.export_store(&store).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn export_store_keeps_readings_when_not_clearing() {
        let dir = tempfile::tempdir().unwrap();
        let config = ExportConfig {
            directory: dir.path().to_path_buf(),
            clear_after_export: false,
            ..Default::default()
        };
        let exp = Exporter::new(config, SCHEMA.to_vec());
        let store = ReadingStore::new();
        store.append(reading(at(7, 0, 0), ["1", "2", "3", "4"]));
        exp.export_store(&store).unwrap();
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn section_names_are_sanitized() {
        let name = section_name("Sala [A]/Lab:1 com nome bem comprido", at(1, 2, 3));
        assert!(name.chars().count() <= MAX_SECTION_NAME);
        assert!(!name.contains(['[', ']', '/', ':']));
        let base = "x".repeat(31);
        let unique = unique_section_name(&base, |n| n == base);
        assert_eq!(unique, format!("{}_2", "x".repeat(29)));
        assert!(unique.chars().count() <= MAX_SECTION_NAME);
    }
}
