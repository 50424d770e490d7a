//! Reuse of cleaned data across dashboard reloads.
//!
//! Cleaning is a pure function of the file bytes and the date order, so a
//! reload only re-runs it when either changed. The file itself is always
//! re-read (that is how a change is noticed).

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::domain::DateOrder;
use crate::error::AppError;
use crate::io::ingest::{IngestedData, clean_csv, read_source};

/// Identity of one cleaning input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceKey {
    pub path: PathBuf,
    pub len: usize,
    pub content_hash: u64,
    pub date_order: DateOrder,
}

impl SourceKey {
    pub fn new(path: &Path, bytes: &[u8], date_order: DateOrder) -> Self {
        let mut hasher = DefaultHasher::new();
        bytes.hash(&mut hasher);
        Self {
            path: path.to_path_buf(),
            len: bytes.len(),
            content_hash: hasher.finish(),
            date_order,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    /// Cleaned data was reused.
    Hit,
    /// The source was (re)cleaned.
    Miss,
}

/// Single-entry cache of the last cleaned source.
#[derive(Debug, Default)]
pub struct CleanCache {
    entry: Option<(SourceKey, IngestedData)>,
}

impl CleanCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read `path` and return its cleaned data, re-cleaning only when the bytes
    /// or the date order differ from the cached entry.
    pub fn load(&mut self, path: &Path, date_order: DateOrder) -> Result<(&IngestedData, CacheStatus), AppError> {
        let bytes = read_source(path)?;
        Ok(self.load_bytes(path, &bytes, date_order))
    }

    pub fn load_bytes(&mut self, path: &Path, bytes: &[u8], date_order: DateOrder) -> (&IngestedData, CacheStatus) {
        let key = SourceKey::new(path, bytes, date_order);
        if self.entry.as_ref().is_some_and(|(cached, _)| *cached != key) {
            self.entry = None;
        }

        let status = if self.entry.is_some() {
            debug!(path = %path.display(), "source unchanged; reusing cleaned data");
            CacheStatus::Hit
        } else {
            CacheStatus::Miss
        };

        let (_, data) = self
            .entry
            .get_or_insert_with(|| (key, clean_csv(bytes, date_order)));
        (data, status)
    }

    pub fn invalidate(&mut self) {
        self.entry = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_bytes_hit_and_changed_bytes_miss() {
        let mut cache = CleanCache::new();
        let path = Path::new("T10YIE.csv");
        let a = b"DATE,T10YIE\n2021-01-04,2.00\n";
        let b = b"DATE,T10YIE\n2021-01-04,2.00\n2021-01-05,2.05\n";

        let (data, status) = cache.load_bytes(path, a, DateOrder::DayFirst);
        assert_eq!(status, CacheStatus::Miss);
        assert_eq!(data.observations.len(), 1);

        let (_, status) = cache.load_bytes(path, a, DateOrder::DayFirst);
        assert_eq!(status, CacheStatus::Hit);

        let (data, status) = cache.load_bytes(path, b, DateOrder::DayFirst);
        assert_eq!(status, CacheStatus::Miss);
        assert_eq!(data.observations.len(), 2);
    }

    #[test]
    fn date_order_is_part_of_the_key() {
        let mut cache = CleanCache::new();
        let path = Path::new("T10YIE.csv");
        let bytes = b"03/04/2021,2.0\n";

        let (day_first, _) = cache.load_bytes(path, bytes, DateOrder::DayFirst);
        let day_first = day_first.observations[0].date;
        let (month_first, status) = cache.load_bytes(path, bytes, DateOrder::MonthFirst);
        assert_eq!(status, CacheStatus::Miss);
        assert_ne!(month_first.observations[0].date, day_first);
    }

    #[test]
    fn invalidate_forces_a_miss() {
        let mut cache = CleanCache::new();
        let path = Path::new("T10YIE.csv");
        let bytes = b"2021-01-04,2.0\n";
        cache.load_bytes(path, bytes, DateOrder::DayFirst);
        cache.invalidate();
        let (_, status) = cache.load_bytes(path, bytes, DateOrder::DayFirst);
        assert_eq!(status, CacheStatus::Miss);
    }
}
