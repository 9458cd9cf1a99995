//! Participant and capture time from the camera's file layout.
//!
//! Photos live at `.../P<participant>/<prefix>_<YYYYMMDD_HHMMSS><suffix>.<ext>`,
//! e.g. `P12/B00000000_21I507_20141003_121214E.JPG`. The camera writes local
//! wall-clock time; it is converted to UTC here.

use chrono::{DateTime, LocalResult, NaiveDateTime, Offset, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

static PARTICIPANT_DIR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^P(\d+)$").expect("valid regex"));

static TIMESTAMP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{8}_\d{6}").expect("valid regex"));

const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Participant id from the photo's parent directory (`P123` -> 123).
pub fn participant_id(path: &Path) -> Option<u32> {
    let dir = path.parent()?.file_name()?.to_str()?;
    PARTICIPANT_DIR_RE.captures(dir)?.get(1)?.as_str().parse().ok()
}

/// Local capture time embedded in the file name.
pub fn local_timestamp(path: &Path) -> Option<NaiveDateTime> {
    let name = path.file_name()?.to_str()?;
    TIMESTAMP_RE
        .find_iter(name)
        .find_map(|m| NaiveDateTime::parse_from_str(m.as_str(), TIMESTAMP_FORMAT).ok())
}

/// Convert camera wall-clock time in `tz` to UTC.
///
/// When the clocks go back the same wall-clock time happens twice; the
/// later instant (standard time) is used. When the clocks go forward some
/// wall-clock times never happen; those use the offset in effect before
/// the change.
pub fn local_to_utc(naive: NaiveDateTime, tz: Tz) -> DateTime<Utc> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt.with_timezone(&Utc),
        LocalResult::Ambiguous(a, b) => a.with_timezone(&Utc).max(b.with_timezone(&Utc)),
        LocalResult::None => {
            let offset_before = tz
                .offset_from_local_datetime(&(naive - TimeDelta::days(1)))
                .earliest()
                .map(|offset| offset.fix().local_minus_utc())
                .unwrap_or(0);
            (naive - TimeDelta::seconds(offset_before.into())).and_utc()
        }
    }
}
