//! Sliding-window navigation over the photo table.
//!
//! A [`WindowCursor`] owns the active row and decides which contiguous run
//! of photos is on screen around it. Two policies are supported and chosen
//! at setup:
//!
//! - [`WindowPolicy::Clamped`] visits every row. Near the table edges and
//!   participant boundaries the active photo slides away from its usual
//!   offset instead of leaving empty slots, and participants with fewer
//!   photos than the window get a narrower window. Near the very start or
//!   end of the table the window may include a neighbouring participant.
//! - [`WindowPolicy::Strict`] only stops on rows where a full window with
//!   the active photo at its usual offset fits inside one participant.
//!   Rows (and whole participants) where that is impossible are skipped.

mod clamped;
mod strict;

use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::sync::Arc;

use crate::catalog::PhotoTable;
use crate::error::{ConfigError, CursorError};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WindowPolicy {
    #[default]
    Clamped,
    Strict,
}

impl WindowPolicy {
    pub fn name(&self) -> &'static str {
        match self {
            WindowPolicy::Clamped => "clamped",
            WindowPolicy::Strict => "strict",
        }
    }
}

impl std::str::FromStr for WindowPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "clamped" => Ok(WindowPolicy::Clamped),
            "strict" => Ok(WindowPolicy::Strict),
            other => Err(format!("unknown window policy '{other}' (expected clamped or strict)")),
        }
    }
}

/// Logical window layout: `width` photos with the active one at `active_offset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowShape {
    width: usize,
    active_offset: usize,
}

impl WindowShape {
    pub fn new(width: usize, active_offset: usize) -> Result<Self, ConfigError> {
        if width == 0 || active_offset >= width {
            return Err(ConfigError::InvalidShape {
                width,
                active: active_offset,
            });
        }
        Ok(Self {
            width,
            active_offset,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn active_offset(&self) -> usize {
        self.active_offset
    }

    /// Photos shown to the right of the active one in a full window.
    pub fn right_count(&self) -> usize {
        self.width - self.active_offset - 1
    }
}

/// The rows currently on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: usize,
    pub width: usize,
    pub active_offset: usize,
    pub right_count: usize,
}

impl Window {
    pub fn rows(&self) -> Range<usize> {
        self.start..self.start + self.width
    }

    pub fn active_row(&self) -> usize {
        self.start + self.active_offset
    }
}

/// Cached bookkeeping for the participant owning the active row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParticipantSpan {
    pub id: u32,
    pub start: usize,
    pub count: usize,
}

impl ParticipantSpan {
    fn of_row(table: &PhotoTable, row: usize) -> Option<Self> {
        let id = table.participant_id(row)?;
        let run = table.participant_run(row);
        Some(Self {
            id,
            start: run.start,
            count: run.len(),
        })
    }
}

#[derive(Debug, Clone, Copy)]
struct Position {
    row: usize,
    participant: ParticipantSpan,
}

pub struct WindowCursor {
    table: Arc<PhotoTable>,
    shape: WindowShape,
    policy: WindowPolicy,
    position: Option<Position>,
}

impl WindowCursor {
    /// Create an unpositioned cursor. Call [`WindowCursor::initialize`]
    /// before asking for a window.
    pub fn new(table: Arc<PhotoTable>, shape: WindowShape, policy: WindowPolicy) -> Self {
        Self {
            table,
            shape,
            policy,
            position: None,
        }
    }

    /// Place the cursor on its first row and return the first window.
    pub fn initialize(&mut self) -> Result<Window, CursorError> {
        let first = match self.policy {
            WindowPolicy::Clamped => (!self.table.is_empty()).then_some(0),
            WindowPolicy::Strict => strict::first_valid_at_or_after(&self.table, self.shape, 0),
        };
        let row = first.ok_or(CursorError::NoValidWindow {
            width: self.shape.width(),
        })?;
        self.set_row(row);
        self.window()
    }

    pub fn is_initialized(&self) -> bool {
        self.position.is_some()
    }

    pub fn shape(&self) -> WindowShape {
        self.shape
    }

    pub fn policy(&self) -> WindowPolicy {
        self.policy
    }

    pub fn table(&self) -> &PhotoTable {
        &self.table
    }

    pub fn row(&self) -> Result<usize, CursorError> {
        self.position().map(|p| p.row)
    }

    pub fn participant(&self) -> Result<ParticipantSpan, CursorError> {
        self.position().map(|p| p.participant)
    }

    /// The window around the active row. Pure: repeated calls without a
    /// move in between return the same value.
    pub fn window(&self) -> Result<Window, CursorError> {
        let position = self.position()?;
        Ok(match self.policy {
            WindowPolicy::Clamped => clamped::window(
                position.row,
                position.participant,
                self.table.len(),
                self.shape,
            ),
            WindowPolicy::Strict => strict::window(position.row, self.shape),
        })
    }

    /// Move to the next row. `Ok(false)` means there is nowhere to go and
    /// nothing changed.
    pub fn advance(&mut self) -> Result<bool, CursorError> {
        let row = self.row()?;
        let next = match self.policy {
            WindowPolicy::Clamped => (row + 1 < self.table.len()).then_some(row + 1),
            WindowPolicy::Strict => strict::next_valid(&self.table, self.shape, row),
        };
        Ok(self.move_to(next))
    }

    /// Move to the previous row. `Ok(false)` means there is nowhere to go
    /// and nothing changed.
    pub fn retreat(&mut self) -> Result<bool, CursorError> {
        let row = self.row()?;
        let prev = match self.policy {
            WindowPolicy::Clamped => row.checked_sub(1),
            WindowPolicy::Strict => strict::prev_valid(&self.table, self.shape, row),
        };
        Ok(self.move_to(prev))
    }

    /// Jump as close to `target` as the policy allows, preferring rows at
    /// or after it. Returns the row the cursor landed on.
    pub fn jump_to(&mut self, target: usize) -> Result<usize, CursorError> {
        self.position()?;
        let last = self.table.len().saturating_sub(1);
        let target = target.min(last);
        let row = match self.policy {
            WindowPolicy::Clamped => Some(target),
            WindowPolicy::Strict => strict::first_valid_at_or_after(&self.table, self.shape, target)
                .or_else(|| strict::prev_valid(&self.table, self.shape, target)),
        };
        if let Some(row) = row {
            self.set_row(row);
        }
        self.row()
    }

    fn position(&self) -> Result<Position, CursorError> {
        self.position.ok_or(CursorError::Uninitialized)
    }

    fn move_to(&mut self, row: Option<usize>) -> bool {
        match row {
            Some(row) => {
                self.set_row(row);
                true
            }
            None => false,
        }
    }

    fn set_row(&mut self, row: usize) {
        let participant = match self.position {
            Some(current) if self.table.participant_id(row) == Some(current.participant.id) => {
                current.participant
            }
            _ => match ParticipantSpan::of_row(&self.table, row) {
                Some(span) => span,
                None => return,
            },
        };
        self.position = Some(Position { row, participant });
    }
}
