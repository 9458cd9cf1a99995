//! The immutable, participant-grouped photo table.

use chrono::{DateTime, Utc};
use std::ops::Range;
use std::path::PathBuf;

/// One photo as found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoRecord {
    pub participant_id: u32,
    /// Capture time normalised to UTC.
    pub timestamp: DateTime<Utc>,
    pub path: PathBuf,
}

impl PhotoRecord {
    pub fn new(participant_id: u32, timestamp: DateTime<Utc>, path: impl Into<PathBuf>) -> Self {
        Self {
            participant_id,
            timestamp,
            path: path.into(),
        }
    }

    fn sort_key(&self) -> (u32, DateTime<Utc>) {
        (self.participant_id, self.timestamp)
    }
}

/// Photos sorted by (participant, time). Every participant's photos form
/// one contiguous run. Never mutated after construction.
#[derive(Debug, Clone, Default)]
pub struct PhotoTable {
    records: Vec<PhotoRecord>,
}

impl PhotoTable {
    /// Build a table from records in scan order.
    ///
    /// The sort is stable, so records with equal (participant, time) keep
    /// the order they were scanned in.
    pub fn from_scan(mut records: Vec<PhotoRecord>) -> Self {
        records.sort_by_key(PhotoRecord::sort_key);
        Self { records }
    }

    /// Build a table from records that must already be in canonical order.
    /// Returns the index of the first out-of-order record on failure.
    pub fn from_sorted(records: Vec<PhotoRecord>) -> Result<Self, usize> {
        if let Some(bad) = records
            .windows(2)
            .position(|pair| pair[0].sort_key() > pair[1].sort_key())
        {
            return Err(bad + 1);
        }
        Ok(Self { records })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, row: usize) -> Option<&PhotoRecord> {
        self.records.get(row)
    }

    pub fn records(&self) -> &[PhotoRecord] {
        &self.records
    }

    pub fn participant_id(&self, row: usize) -> Option<u32> {
        self.records.get(row).map(|r| r.participant_id)
    }

    /// The contiguous run of rows sharing `row`'s participant.
    ///
    /// Returns an empty range when `row` is out of bounds.
    pub fn participant_run(&self, row: usize) -> Range<usize> {
        let Some(id) = self.participant_id(row) else {
            return row..row;
        };

        let mut start = row;
        while start > 0 && self.records[start - 1].participant_id == id {
            start -= 1;
        }
        let mut end = row + 1;
        while end < self.records.len() && self.records[end].participant_id == id {
            end += 1;
        }
        start..end
    }

    /// Number of distinct participants.
    pub fn participant_count(&self) -> usize {
        if self.records.is_empty() {
            return 0;
        }
        1 + self
            .records
            .windows(2)
            .filter(|pair| pair[0].participant_id != pair[1].participant_id)
            .count()
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use chrono::TimeZone;

    /// A table with `counts[i]` photos for participant `i + 1`, one minute apart.
    pub fn table_with_runs(counts: &[usize]) -> PhotoTable {
        let mut records = Vec::new();
        for (index, &count) in counts.iter().enumerate() {
            let id = index as u32 + 1;
            for n in 0..count {
                let timestamp = Utc
                    .with_ymd_and_hms(2014, 10, 3, 9, 0, 0)
                    .single()
                    .unwrap()
                    + chrono::TimeDelta::minutes(n as i64);
                records.push(PhotoRecord::new(
                    id,
                    timestamp,
                    format!("/photos/P{id}/B0000_{n:04}.JPG"),
                ));
            }
        }
        PhotoTable::from_sorted(records).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::table_with_runs;
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2015, 6, 21, hour, minute, 0).single().unwrap()
    }

    #[test]
    fn test_from_scan_sorts_by_participant_then_time() {
        let table = PhotoTable::from_scan(vec![
            PhotoRecord::new(2, at(9, 0), "/p2/a.jpg"),
            PhotoRecord::new(1, at(10, 0), "/p1/b.jpg"),
            PhotoRecord::new(1, at(8, 0), "/p1/a.jpg"),
        ]);

        let paths: Vec<_> = table.records().iter().map(|r| r.path.clone()).collect();
        assert_eq!(
            paths,
            vec![
                PathBuf::from("/p1/a.jpg"),
                PathBuf::from("/p1/b.jpg"),
                PathBuf::from("/p2/a.jpg"),
            ]
        );
    }

    #[test]
    fn test_from_scan_keeps_scan_order_on_ties() {
        let table = PhotoTable::from_scan(vec![
            PhotoRecord::new(1, at(9, 0), "/p1/first.jpg"),
            PhotoRecord::new(1, at(9, 0), "/p1/second.jpg"),
        ]);
        assert_eq!(table.get(0).unwrap().path, PathBuf::from("/p1/first.jpg"));
        assert_eq!(table.get(1).unwrap().path, PathBuf::from("/p1/second.jpg"));
    }

    #[test]
    fn test_from_sorted_rejects_out_of_order() {
        let result = PhotoTable::from_sorted(vec![
            PhotoRecord::new(1, at(9, 0), "/a.jpg"),
            PhotoRecord::new(2, at(9, 0), "/b.jpg"),
            PhotoRecord::new(1, at(10, 0), "/c.jpg"),
        ]);
        assert_eq!(result.unwrap_err(), 2);
    }

    #[test]
    fn test_participant_run() {
        let table = table_with_runs(&[2, 5, 1]);
        assert_eq!(table.participant_run(0), 0..2);
        assert_eq!(table.participant_run(1), 0..2);
        assert_eq!(table.participant_run(4), 2..7);
        assert_eq!(table.participant_run(7), 7..8);
        assert!(table.participant_run(8).is_empty());
        assert_eq!(table.participant_count(), 3);
    }
}
