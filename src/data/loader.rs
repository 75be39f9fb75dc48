use std::collections::HashSet;
use std::sync::Arc;

use csv::{ReaderBuilder, StringRecord, Trim};

use super::model::{CellValue, ColumnKind, ColumnSchema, Dataset, Row};
use crate::error::LoadError;

/// Field separator of the accepted input. Quoting is not supported: a field
/// containing the delimiter splits into two.
pub const DELIMITER: u8 = b',';

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Parse comma-separated text into rows.
///
/// The first non-empty line is the header. Lines with no content, including
/// whitespace-only ones, are skipped wherever they appear. Lines whose field
/// count differs from the header's are skipped without error. Every header and field is
/// trimmed, then each field is stored as a number when it parses as one and
/// as text otherwise. Input without at least one data line yields no rows.
pub fn parse_csv_text(text: &str) -> Vec<Row> {
    let mut reader = ReaderBuilder::new()
        .delimiter(DELIMITER)
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let mut records = reader.records();

    let header: Arc<[String]> = loop {
        match records.next() {
            Some(Ok(record)) if is_blank(&record) => continue,
            Some(Ok(record)) => break record.iter().map(str::to_string).collect(),
            Some(Err(e)) => {
                log::debug!("skipping unreadable line before header: {e}");
                continue;
            }
            None => return Vec::new(),
        }
    };

    let mut rows = Vec::new();
    let mut dropped = 0usize;

    for result in records {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                log::debug!("skipping unreadable line: {e}");
                dropped += 1;
                continue;
            }
        };

        if is_blank(&record) {
            continue;
        }

        if record.len() != header.len() {
            log::debug!(
                "dropping line {}: expected {} fields, found {}",
                record.position().map_or(0, |p| p.line()),
                header.len(),
                record.len()
            );
            dropped += 1;
            continue;
        }

        let values = record.iter().map(CellValue::parse).collect();
        rows.push(Row::new(Arc::clone(&header), values));
    }

    if dropped > 0 {
        log::debug!("parsed {} rows, dropped {dropped} malformed lines", rows.len());
    }

    rows
}

/// Infer one [`ColumnSchema`] per key from the first row only.
///
/// Later rows are not consulted, so a column whose first value is numeric is
/// declared [`ColumnKind::Number`] even if some later value is text. A
/// repeated header name keeps its first occurrence.
pub fn infer_schema(rows: &[Row]) -> Vec<ColumnSchema> {
    let Some(first) = rows.first() else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    first
        .iter()
        .filter(|(key, _)| seen.insert(*key))
        .map(|(key, value)| ColumnSchema::new(key, value.kind()))
        .collect()
}

/// Parse text into a [`Dataset`], rejecting input that yields no rows.
pub fn parse_dataset(text: &str) -> Result<Dataset, LoadError> {
    let rows = parse_csv_text(text);
    if rows.is_empty() {
        return Err(LoadError::EmptyDataset);
    }
    Ok(Dataset::from_rows(rows))
}

/// A line with no content at all. A line of bare delimiters still has
/// fields and is not blank.
fn is_blank(record: &StringRecord) -> bool {
    record.len() == 1 && record[0].is_empty()
}
