//! Per-photo annotation state.
//!
//! Rows mirror the [`PhotoTable`] one to one. Each row holds a confidence
//! in `[0, 1]` for every schema label plus a free-text comment. A
//! confidence of 0.0 means "not annotated"; there is no separate unset
//! state, so clearing a label and never setting it look the same.

mod csv_io;

use std::path::Path;
use std::sync::Arc;

use crate::catalog::PhotoTable;
use crate::error::{EditError, PersistError};
use crate::schema::LabelSchema;

/// Confidences at or below this are treated as not annotated.
pub const ANNOTATED_EPSILON: f64 = 1e-5;

#[derive(Debug, Clone, PartialEq)]
struct AnnotationRow {
    comment: String,
    confidences: Vec<f64>,
}

impl AnnotationRow {
    fn blank(labels: usize) -> Self {
        Self {
            comment: String::new(),
            confidences: vec![0.0; labels],
        }
    }

    fn is_annotated(&self) -> bool {
        !self.comment.is_empty() || self.confidences.iter().any(|&c| c > ANNOTATED_EPSILON)
    }
}

/// Parse a user-entered confidence.
pub fn parse_confidence(raw: &str) -> Result<f64, EditError> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| EditError::NotANumber(raw.to_string()))?;
    check_confidence(value)?;
    Ok(value)
}

fn check_confidence(value: f64) -> Result<(), EditError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(EditError::OutOfRange(value))
    }
}

pub struct AnnotationStore {
    table: Arc<PhotoTable>,
    schema: Arc<LabelSchema>,
    rows: Vec<AnnotationRow>,
}

impl AnnotationStore {
    /// A store with every confidence at 0.0 and every comment empty.
    pub fn new(table: Arc<PhotoTable>, schema: Arc<LabelSchema>) -> Self {
        let rows = vec![AnnotationRow::blank(schema.len()); table.len()];
        Self { table, schema, rows }
    }

    /// Rehydrate a store written by [`AnnotationStore::persist`].
    ///
    /// The label columns must match `schema` exactly, in order.
    pub fn load(path: &Path, schema: Arc<LabelSchema>) -> Result<Self, PersistError> {
        let (records, rows) = csv_io::read(path, &schema)?;
        let table = PhotoTable::from_sorted(records).map_err(|index| PersistError::Unsorted {
            line: index as u64 + 2,
        })?;
        tracing::info!(path = %path.display(), rows = rows.len(), "Loaded annotations");
        Ok(Self {
            table: Arc::new(table),
            schema,
            rows,
        })
    }

    /// Write the full table, photo columns included.
    ///
    /// The file is replaced atomically, so a failed save leaves the
    /// previous version intact.
    pub fn persist(&self, path: &Path) -> Result<(), PersistError> {
        csv_io::write(path, &self.table, &self.schema, &self.rows)?;
        tracing::debug!(path = %path.display(), rows = self.rows.len(), "Saved annotations");
        Ok(())
    }

    pub fn table(&self) -> &Arc<PhotoTable> {
        &self.table
    }

    pub fn schema(&self) -> &Arc<LabelSchema> {
        &self.schema
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn set_label(&mut self, row: usize, label: &str, confidence: f64) -> Result<(), EditError> {
        let index = self.label_index(label)?;
        check_confidence(confidence)?;
        self.row_mut(row)?.confidences[index] = confidence;
        Ok(())
    }

    pub fn clear_label(&mut self, row: usize, label: &str) -> Result<(), EditError> {
        let index = self.label_index(label)?;
        self.row_mut(row)?.confidences[index] = 0.0;
        Ok(())
    }

    pub fn confidence(&self, row: usize, label: &str) -> Result<f64, EditError> {
        let index = self.label_index(label)?;
        Ok(self.row(row)?.confidences[index])
    }

    /// Labels annotated on `row`, in schema order.
    pub fn nonzero_labels(&self, row: usize) -> Result<Vec<(String, f64)>, EditError> {
        let row = self.row(row)?;
        Ok(self
            .schema
            .labels()
            .iter()
            .zip(&row.confidences)
            .filter(|(_, &confidence)| confidence > ANNOTATED_EPSILON)
            .map(|(label, &confidence)| (label.clone(), confidence))
            .collect())
    }

    pub fn comment(&self, row: usize) -> Result<&str, EditError> {
        Ok(&self.row(row)?.comment)
    }

    pub fn set_comment(&mut self, row: usize, text: impl Into<String>) -> Result<(), EditError> {
        self.row_mut(row)?.comment = text.into();
        Ok(())
    }

    /// Rows carrying at least one label or a comment.
    pub fn annotated_rows(&self) -> usize {
        self.rows.iter().filter(|r| r.is_annotated()).count()
    }

    /// First row with neither labels nor a comment.
    pub fn first_unannotated(&self) -> Option<usize> {
        self.rows.iter().position(|r| !r.is_annotated())
    }

    fn label_index(&self, label: &str) -> Result<usize, EditError> {
        self.schema
            .index_of(label)
            .ok_or_else(|| EditError::UnknownLabel(label.to_string()))
    }

    fn row(&self, row: usize) -> Result<&AnnotationRow, EditError> {
        let len = self.rows.len();
        self.rows.get(row).ok_or(EditError::RowOutOfRange { row, len })
    }

    fn row_mut(&mut self, row: usize) -> Result<&mut AnnotationRow, EditError> {
        let len = self.rows.len();
        self.rows
            .get_mut(row)
            .ok_or(EditError::RowOutOfRange { row, len })
    }
}
