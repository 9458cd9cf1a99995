//! CSV layout of the annotation table:
//!
//! ```text
//! time                      | id  | path | comment | <label 0> | ... | <label N>
//! 2014-10-03T11:12:14+00:00 | 3   | str  | str     | f64 [0,1] | ... | f64 [0,1]
//! ```

use chrono::{DateTime, SecondsFormat, Utc};
use std::fs::File;
use std::path::{Path, PathBuf};

use super::{check_confidence, AnnotationRow};
use crate::catalog::{PhotoRecord, PhotoTable};
use crate::error::PersistError;
use crate::schema::LabelSchema;

const FIXED_COLUMNS: [&str; 4] = ["time", "id", "path", "comment"];

pub(super) fn write(
    path: &Path,
    table: &PhotoTable,
    schema: &LabelSchema,
    rows: &[AnnotationRow],
) -> Result<(), PersistError> {
    let tmp_path = temp_path(path);
    let result = write_rows(&tmp_path, table, schema, rows)
        .and_then(|()| std::fs::rename(&tmp_path, path).map_err(|source| io_error(path, source)));
    if result.is_err() {
        if let Err(e) = std::fs::remove_file(&tmp_path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(path = %tmp_path.display(), error = %e, "Failed to remove temp file");
            }
        }
    }
    result
}

fn write_rows(
    tmp_path: &Path,
    table: &PhotoTable,
    schema: &LabelSchema,
    rows: &[AnnotationRow],
) -> Result<(), PersistError> {
    let file = File::create(tmp_path).map_err(|source| io_error(tmp_path, source))?;
    let mut wtr = csv::Writer::from_writer(file);

    let header = FIXED_COLUMNS
        .iter()
        .copied()
        .chain(schema.labels().iter().map(String::as_str));
    wtr.write_record(header)?;

    for (record, row) in table.records().iter().zip(rows) {
        let photo = record
            .path
            .to_str()
            .ok_or_else(|| PersistError::NonUtf8Path(record.path.clone()))?;
        let mut fields = vec![
            record.timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, false),
            record.participant_id.to_string(),
            photo.to_string(),
            row.comment.clone(),
        ];
        fields.extend(row.confidences.iter().map(f64::to_string));
        wtr.write_record(&fields)?;
    }

    wtr.flush().map_err(|source| io_error(tmp_path, source))
}

pub(super) fn read(
    path: &Path,
    schema: &LabelSchema,
) -> Result<(Vec<PhotoRecord>, Vec<AnnotationRow>), PersistError> {
    let file = File::open(path).map_err(|source| io_error(path, source))?;
    let mut rdr = csv::Reader::from_reader(file);

    let expected: Vec<&str> = FIXED_COLUMNS
        .iter()
        .copied()
        .chain(schema.labels().iter().map(String::as_str))
        .collect();
    let found: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
    if found != expected {
        return Err(PersistError::SchemaMismatch {
            expected: expected.join(", "),
            found: found.join(", "),
        });
    }

    let mut records = Vec::new();
    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        let malformed = |message: String| PersistError::Malformed { line, message };

        // The header check guarantees the column count.
        let field = |index: usize| record.get(index).unwrap_or_default();

        let timestamp = parse_time(field(0))
            .ok_or_else(|| malformed(format!("invalid time '{}'", field(0))))?;
        let participant_id: u32 = field(1)
            .trim()
            .parse()
            .map_err(|_| malformed(format!("invalid participant id '{}'", field(1))))?;

        let mut confidences = Vec::with_capacity(schema.len());
        for (offset, label) in schema.labels().iter().enumerate() {
            let raw = field(FIXED_COLUMNS.len() + offset).trim();
            // Empty cells are what a spreadsheet leaves behind for "no value".
            let value = if raw.is_empty() {
                0.0
            } else {
                raw.parse::<f64>()
                    .map_err(|_| malformed(format!("invalid confidence '{raw}' for '{label}'")))?
            };
            check_confidence(value)
                .map_err(|e| malformed(format!("label '{label}': {e}")))?;
            confidences.push(value);
        }

        records.push(PhotoRecord::new(participant_id, timestamp, PathBuf::from(field(2))));
        rows.push(AnnotationRow {
            comment: field(3).to_string(),
            confidences,
        });
    }

    if rows.is_empty() {
        return Err(PersistError::Empty(path.to_path_buf()));
    }
    Ok((records, rows))
}

/// RFC 3339, or the space-separated form pandas writes.
fn parse_time(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f%:z"))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "annotations.csv".to_string());
    path.with_file_name(format!(".{name}.tmp"))
}

fn io_error(path: &Path, source: std::io::Error) -> PersistError {
    PersistError::Io {
        path: path.to_path_buf(),
        source,
    }
}
