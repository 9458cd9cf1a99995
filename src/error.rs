//! Error types for each layer of the annotator.
//!
//! Setup problems are [`ConfigError`]s and stop the session before it
//! starts. Edits that fail validation are [`EditError`]s and never mutate
//! anything. Save/load failures are [`PersistError`]s and must reach the
//! user. Running off either end of the table is not an error at all.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("photo directory does not exist: {0}")]
    MissingPhotoDir(PathBuf),

    #[error("no photos matching P<id>/*_YYYYMMDD_HHMMSS* found under {0}")]
    NoPhotos(PathBuf),

    #[error("failed to read schema {path}: {source}")]
    SchemaRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("schema {0} contains no labels")]
    EmptySchema(PathBuf),

    #[error("schema {path} lists label '{label}' more than once")]
    DuplicateLabel { path: PathBuf, label: String },

    #[error("invalid window shape: active offset {active} must be less than width {width}")]
    InvalidShape { width: usize, active: usize },

    #[error("no participant has {width} consecutive photos; the strict window policy cannot show this table")]
    NoValidWindow { width: usize },

    #[error("rotation must be 0, 90, 180 or 270 degrees, got {0}")]
    InvalidRotation(u16),

    #[error("unknown source timezone '{0}'")]
    UnknownTimezone(String),

    #[error("{0} is not set; pass it on the command line or in the config file")]
    MissingSetting(&'static str),

    #[error("cannot resume from {path}: {source}")]
    Resume {
        path: PathBuf,
        #[source]
        source: PersistError,
    },

    #[error("failed to start scanner pool: {0}")]
    ScannerPool(String),
}

#[derive(Debug, Error, PartialEq)]
pub enum EditError {
    #[error("unknown label '{0}'")]
    UnknownLabel(String),

    #[error("confidence '{0}' is not a number")]
    NotANumber(String),

    #[error("confidence {0} is outside [0, 1]")]
    OutOfRange(f64),

    #[error("row {row} is outside the table ({len} rows)")]
    RowOutOfRange { row: usize, len: usize },

    #[error(transparent)]
    Cursor(#[from] CursorError),
}

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("annotation columns do not match the schema: expected [{expected}], found [{found}]")]
    SchemaMismatch { expected: String, found: String },

    #[error("line {line}: {message}")]
    Malformed { line: u64, message: String },

    #[error("rows are not in (participant, time) order at line {line}")]
    Unsorted { line: u64 },

    #[error("annotation file {0} contains no rows")]
    Empty(PathBuf),

    #[error("photo path is not valid UTF-8 and cannot be saved: {}", .0.display())]
    NonUtf8Path(PathBuf),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CursorError {
    #[error("cursor has not been positioned yet")]
    Uninitialized,

    #[error("no valid {width}-photo window exists in the table")]
    NoValidWindow { width: usize },
}

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("save failed, staying on the current photos: {0}")]
    Persist(#[from] PersistError),

    #[error(transparent)]
    Cursor(#[from] CursorError),
}
