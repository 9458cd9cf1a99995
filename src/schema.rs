//! Label schema: the ordered set of activity labels an annotator may use.

use std::collections::HashSet;
use std::path::Path;

use thiserror::Error;

use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelSchema {
    labels: Vec<String>,
}

impl LabelSchema {
    /// Read a schema file with one label per line.
    ///
    /// Lines are trimmed and blank lines ignored. Order is preserved.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::SchemaRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content, path)
    }

    fn parse(content: &str, path: &Path) -> Result<Self, ConfigError> {
        let labels: Vec<String> = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();

        Self::from_labels(labels).map_err(|err| match err {
            SchemaProblem::Empty => ConfigError::EmptySchema(path.to_path_buf()),
            SchemaProblem::Duplicate(label) => ConfigError::DuplicateLabel {
                path: path.to_path_buf(),
                label,
            },
        })
    }

    pub fn from_labels<I, S>(labels: I) -> Result<Self, SchemaProblem>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        if labels.is_empty() {
            return Err(SchemaProblem::Empty);
        }

        let mut seen = HashSet::new();
        for label in &labels {
            if !seen.insert(label.as_str()) {
                return Err(SchemaProblem::Duplicate(label.clone()));
            }
        }

        Ok(Self { labels })
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Position of `label` in schema order.
    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.labels.iter().position(|l| l == label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaProblem {
    #[error("schema contains no labels")]
    Empty,

    #[error("label '{0}' appears more than once")]
    Duplicate(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_preserves_order_and_trims() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "walking\n  sleep \n\nsitting;TV").unwrap();

        let schema = LabelSchema::load(file.path()).unwrap();
        assert_eq!(schema.labels(), &["walking", "sleep", "sitting;TV"]);
        assert_eq!(schema.index_of("sleep"), Some(1));
        assert_eq!(schema.index_of("running"), None);
    }

    #[test]
    fn test_empty_schema_is_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "\n   \n").unwrap();

        let err = LabelSchema::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::EmptySchema(_)));
    }

    #[test]
    fn test_duplicate_label_is_rejected() {
        let err = LabelSchema::from_labels(["sleep", "walking", "sleep"]).unwrap_err();
        assert_eq!(err, SchemaProblem::Duplicate("sleep".to_string()));
        assert_eq!(err.to_string(), "label 'sleep' appears more than once");
    }

    #[test]
    fn test_schema_problem_is_an_error() {
        fn build() -> anyhow::Result<LabelSchema> {
            Ok(LabelSchema::from_labels(Vec::<String>::new())?)
        }
        let err = build().unwrap_err();
        assert_eq!(err.to_string(), "schema contains no labels");
    }

    #[test]
    fn test_missing_file() {
        let err = LabelSchema::load(Path::new("/definitely/not/here.txt")).unwrap_err();
        assert!(matches!(err, ConfigError::SchemaRead { .. }));
    }
}
