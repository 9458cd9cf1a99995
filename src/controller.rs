//! Navigation and editing on top of the store and the cursor.
//!
//! Every move saves first. If the save fails the move does not happen, so
//! the annotator never walks away from work that is not on disk.

use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

use crate::annotations::{parse_confidence, AnnotationStore};
use crate::cursor::{WindowCursor, WindowPolicy, WindowShape};
use crate::error::{ControllerError, CursorError, EditError, PersistError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavOutcome {
    Moved,
    /// Nowhere to go; nothing changed.
    AtBoundary,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WindowPhoto {
    pub row: usize,
    pub participant_id: u32,
    pub timestamp: DateTime<Utc>,
    pub path: PathBuf,
    pub active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionSummary {
    pub row: usize,
    pub total: usize,
    pub annotated: usize,
}

/// Everything the view needs for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderState {
    pub photos: Vec<WindowPhoto>,
    pub active_offset: usize,
    pub annotations: Vec<(String, f64)>,
    pub comment: String,
    pub position: PositionSummary,
    pub participant_id: u32,
    pub policy: WindowPolicy,
}

pub struct AnnotationController {
    store: AnnotationStore,
    cursor: WindowCursor,
    save_path: PathBuf,
}

impl AnnotationController {
    /// Position the cursor on its first row. Fails only when the strict
    /// policy finds no valid window anywhere in the table.
    pub fn new(
        store: AnnotationStore,
        shape: WindowShape,
        policy: WindowPolicy,
        save_path: impl Into<PathBuf>,
    ) -> Result<Self, CursorError> {
        let mut cursor = WindowCursor::new(store.table().clone(), shape, policy);
        cursor.initialize()?;
        Ok(Self {
            store,
            cursor,
            save_path: save_path.into(),
        })
    }

    pub fn advance(&mut self) -> Result<NavOutcome, ControllerError> {
        self.navigate(WindowCursor::advance)
    }

    pub fn retreat(&mut self) -> Result<NavOutcome, ControllerError> {
        self.navigate(WindowCursor::retreat)
    }

    /// Move without saving. Used once at startup to resume.
    pub fn jump_to(&mut self, row: usize) -> Result<usize, CursorError> {
        self.cursor.jump_to(row)
    }

    fn navigate(
        &mut self,
        step: fn(&mut WindowCursor) -> Result<bool, CursorError>,
    ) -> Result<NavOutcome, ControllerError> {
        if let Err(e) = self.save() {
            tracing::error!(error = %e, row = ?self.cursor.row().ok(), "Save failed, navigation blocked");
            return Err(e.into());
        }
        if !step(&mut self.cursor)? {
            return Ok(NavOutcome::AtBoundary);
        }
        tracing::debug!(row = self.cursor.row()?, "Moved");
        Ok(NavOutcome::Moved)
    }

    /// Annotate the active photo with `label` at the confidence typed in `raw`.
    pub fn set_annotation(&mut self, label: &str, raw: &str) -> Result<f64, EditError> {
        let row = self.cursor.row()?;
        let confidence = parse_confidence(raw)
            .and_then(|confidence| self.store.set_label(row, label, confidence).map(|()| confidence))
            .inspect_err(|e| tracing::warn!(row, label, error = %e, "Rejected annotation"))?;
        Ok(confidence)
    }

    pub fn remove_annotation(&mut self, label: &str) -> Result<(), EditError> {
        self.store.clear_label(self.cursor.row()?, label)
    }

    pub fn update_comment(&mut self, text: impl Into<String>) -> Result<(), EditError> {
        self.store.set_comment(self.cursor.row()?, text)
    }

    pub fn save(&self) -> Result<(), PersistError> {
        self.store.persist(&self.save_path)
    }

    pub fn save_path(&self) -> &Path {
        &self.save_path
    }

    pub fn labels(&self) -> &[String] {
        self.store.schema().labels()
    }

    pub fn store(&self) -> &AnnotationStore {
        &self.store
    }

    pub fn active_row(&self) -> Result<usize, CursorError> {
        self.cursor.row()
    }

    /// Built from the cursor on every call; the controller keeps no copy of
    /// the window.
    pub fn render_state(&self) -> Result<RenderState, CursorError> {
        let table = self.store.table();
        let window = self.cursor.window()?;
        let active_row = window.active_row();
        let photos = window
            .rows()
            .filter_map(|row| {
                table.get(row).map(|record| WindowPhoto {
                    row,
                    participant_id: record.participant_id,
                    timestamp: record.timestamp,
                    path: record.path.clone(),
                    active: row == active_row,
                })
            })
            .collect();

        Ok(RenderState {
            photos,
            active_offset: window.active_offset,
            annotations: self.store.nonzero_labels(active_row).unwrap_or_default(),
            comment: self.store.comment(active_row).unwrap_or_default().to_string(),
            position: PositionSummary {
                row: active_row,
                total: table.len(),
                annotated: self.store.annotated_rows(),
            },
            participant_id: table.participant_id(active_row).unwrap_or_default(),
            policy: self.cursor.policy(),
        })
    }
}
