//! Session setup: turn a [`Config`] into a ready controller.
//!
//! Everything that can be wrong with the inputs is checked here, before
//! the terminal is taken over.

use std::path::PathBuf;
use std::sync::Arc;

use crate::annotations::AnnotationStore;
use crate::config::Config;
use crate::controller::AnnotationController;
use crate::cursor::WindowShape;
use crate::error::{ConfigError, CursorError};
use crate::scanner::{Scanner, SkippedFile};
use crate::schema::LabelSchema;

/// Where the session's photo table came from.
#[derive(Debug)]
pub enum SessionOrigin {
    Scanned {
        discovered: usize,
        skipped: Vec<SkippedFile>,
        /// The output file already existed and will be overwritten by the
        /// first save.
        replaces_existing: bool,
    },
    Resumed {
        path: PathBuf,
    },
}

pub struct Session {
    pub controller: AnnotationController,
    pub origin: SessionOrigin,
}

impl Session {
    pub fn open(config: &Config) -> Result<Self, ConfigError> {
        let display = &config.display;
        let shape = WindowShape::new(display.width, display.active)?;
        if !matches!(display.rotate, 0 | 90 | 180 | 270) {
            return Err(ConfigError::InvalidRotation(display.rotate));
        }

        let schema_path = config
            .session
            .schema
            .as_ref()
            .ok_or(ConfigError::MissingSetting("schema"))?;
        let schema = Arc::new(LabelSchema::load(schema_path)?);
        tracing::info!(path = %schema_path.display(), labels = schema.len(), "Loaded schema");

        let output = config.session.output.clone();
        let (store, origin) = if config.session.resume && output.exists() {
            let store = AnnotationStore::load(&output, schema).map_err(|source| ConfigError::Resume {
                path: output.clone(),
                source,
            })?;
            (store, SessionOrigin::Resumed { path: output.clone() })
        } else {
            let images = config
                .session
                .images
                .as_ref()
                .ok_or(ConfigError::MissingSetting("images"))?;
            let replaces_existing = output.exists();
            if replaces_existing {
                tracing::warn!(path = %output.display(), "Resume disabled, existing annotations will be overwritten");
            }
            let report = Scanner::new(&config.scanner)?.scan(images)?;
            let store = AnnotationStore::new(Arc::new(report.table), schema);
            (
                store,
                SessionOrigin::Scanned {
                    discovered: report.discovered,
                    skipped: report.skipped,
                    replaces_existing,
                },
            )
        };

        let resume_row = match origin {
            SessionOrigin::Resumed { .. } => store.first_unannotated(),
            SessionOrigin::Scanned { .. } => None,
        };

        let no_window = |_: CursorError| ConfigError::NoValidWindow {
            width: shape.width(),
        };
        let mut controller =
            AnnotationController::new(store, shape, display.policy, output).map_err(no_window)?;

        if let Some(row) = resume_row {
            let landed = controller.jump_to(row).map_err(no_window)?;
            tracing::info!(first_unannotated = row, row = landed, "Resuming");
        }

        Ok(Self { controller, origin })
    }
}
