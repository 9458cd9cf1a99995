pub mod discovery;
pub mod filename;
pub mod metadata;

use chrono_tz::Tz;
use rayon::prelude::*;
use std::path::{Path, PathBuf};

use crate::catalog::{PhotoRecord, PhotoTable};
use crate::config::ScannerConfig;
use crate::error::ConfigError;

pub use discovery::discover_images;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Parent directory is not `P<digits>`.
    NoParticipant,
    /// Neither the file name nor EXIF carries a capture time.
    NoTimestamp,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: SkipReason,
}

#[derive(Debug)]
pub struct ScanReport {
    pub table: PhotoTable,
    /// Files with a matching extension, parsed or not.
    pub discovered: usize,
    pub skipped: Vec<SkippedFile>,
}

pub struct Scanner {
    extensions: Vec<String>,
    timezone: Tz,
    pool: rayon::ThreadPool,
}

impl Scanner {
    pub fn new(config: &ScannerConfig) -> Result<Self, ConfigError> {
        let timezone: Tz = config
            .source_timezone
            .parse()
            .map_err(|_| ConfigError::UnknownTimezone(config.source_timezone.clone()))?;

        // 0 lets rayon pick one thread per core.
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.workers)
            .thread_name(|i| format!("camlabel-scan-{i}"))
            .build()
            .map_err(|e| ConfigError::ScannerPool(e.to_string()))?;

        Ok(Self {
            extensions: config.extensions.clone(),
            timezone,
            pool,
        })
    }

    /// Build the photo table for everything under `root`.
    pub fn scan(&self, root: &Path) -> Result<ScanReport, ConfigError> {
        if !root.is_dir() {
            return Err(ConfigError::MissingPhotoDir(root.to_path_buf()));
        }

        let paths = discover_images(root, &self.extensions);
        tracing::info!(root = %root.display(), files = paths.len(), "Scanning photos");

        // Each file is parsed independently; collect keeps discovery order.
        let results: Vec<Result<PhotoRecord, SkippedFile>> = self
            .pool
            .install(|| paths.par_iter().map(|path| self.parse(path)).collect());

        let mut records = Vec::with_capacity(results.len());
        let mut skipped = Vec::new();
        for result in results {
            match result {
                Ok(record) => records.push(record),
                Err(skip) => {
                    tracing::warn!(path = %skip.path.display(), reason = ?skip.reason, "Skipping file");
                    skipped.push(skip);
                }
            }
        }

        if records.is_empty() {
            return Err(ConfigError::NoPhotos(root.to_path_buf()));
        }

        let table = PhotoTable::from_scan(records);
        tracing::info!(
            photos = table.len(),
            participants = table.participant_count(),
            skipped = skipped.len(),
            "Scan complete"
        );

        Ok(ScanReport {
            table,
            discovered: paths.len(),
            skipped,
        })
    }

    fn parse(&self, path: &Path) -> Result<PhotoRecord, SkippedFile> {
        let skip = |reason| SkippedFile {
            path: path.to_path_buf(),
            reason,
        };

        let participant_id = filename::participant_id(path).ok_or_else(|| skip(SkipReason::NoParticipant))?;
        let local = filename::local_timestamp(path)
            .or_else(|| metadata::exif_capture_time(path))
            .ok_or_else(|| skip(SkipReason::NoTimestamp))?;

        Ok(PhotoRecord::new(
            participant_id,
            filename::local_to_utc(local, self.timezone),
            path,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::fs::{self, File};
    use tempfile::tempdir;

    fn config(workers: usize) -> ScannerConfig {
        ScannerConfig {
            workers,
            ..ScannerConfig::default()
        }
    }

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        File::create(path).unwrap();
    }

    #[test]
    fn test_scan_orders_by_participant_then_time() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "P10/B0_20141003_121514E.JPG");
        touch(dir.path(), "P2/B0_20141003_121314E.JPG");
        touch(dir.path(), "P2/B0_20141003_121214E.JPG");
        touch(dir.path(), "P10/B0_20141003_091514E.jpg");

        let report = Scanner::new(&config(2)).unwrap().scan(dir.path()).unwrap();

        let keys: Vec<(u32, String)> = report
            .table
            .records()
            .iter()
            .map(|r| (r.participant_id, r.timestamp.format("%H:%M:%S").to_string()))
            .collect();
        assert_eq!(
            keys,
            vec![
                (2, "11:12:14".to_string()),
                (2, "11:13:14".to_string()),
                (10, "08:15:14".to_string()),
                (10, "11:15:14".to_string()),
            ]
        );
        assert_eq!(report.discovered, 4);
        assert!(report.skipped.is_empty());
    }

    #[test]
    fn test_scan_skips_unparseable_files() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "P1/B0_20141003_121214E.JPG");
        touch(dir.path(), "loose/B0_20141003_121214E.JPG");
        touch(dir.path(), "P1/IMG_0001.JPG");
        touch(dir.path(), "P1/readme.txt");

        let report = Scanner::new(&config(1)).unwrap().scan(dir.path()).unwrap();

        assert_eq!(report.table.len(), 1);
        assert_eq!(report.discovered, 3);
        let mut reasons: Vec<SkipReason> = report.skipped.iter().map(|s| s.reason).collect();
        reasons.sort_by_key(|r| *r as u8);
        assert_eq!(reasons, vec![SkipReason::NoParticipant, SkipReason::NoTimestamp]);
    }

    #[test]
    fn test_scan_order_independent_of_worker_count() {
        let dir = tempdir().unwrap();
        for participant in 1..=4 {
            for minute in 0..15 {
                touch(
                    dir.path(),
                    &format!("P{participant}/B0_20150621_10{minute:02}00E.JPG"),
                );
            }
        }

        let single = Scanner::new(&config(1)).unwrap().scan(dir.path()).unwrap();
        let many = Scanner::new(&config(8)).unwrap().scan(dir.path()).unwrap();
        assert_eq!(single.table.records(), many.table.records());
        assert_eq!(
            single.table.get(0).unwrap().timestamp,
            Utc.with_ymd_and_hms(2015, 6, 21, 9, 0, 0).single().unwrap()
        );
    }

    #[test]
    fn test_scan_errors() {
        let dir = tempdir().unwrap();
        let scanner = Scanner::new(&config(1)).unwrap();

        assert!(matches!(
            scanner.scan(&dir.path().join("nope")),
            Err(ConfigError::MissingPhotoDir(_))
        ));
        assert!(matches!(scanner.scan(dir.path()), Err(ConfigError::NoPhotos(_))));

        let bad_zone = ScannerConfig {
            source_timezone: "Mars/Olympus_Mons".to_string(),
            ..ScannerConfig::default()
        };
        assert!(matches!(
            Scanner::new(&bad_zone),
            Err(ConfigError::UnknownTimezone(_))
        ));
    }
}
