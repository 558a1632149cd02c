#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Single-slot cache of the last successfully fetched summaries.
//!
//! The slot is one JSON array of [`CaseSummary`] records. Every successful
//! fetch replaces it wholesale, so a read returns whatever set was written
//! last, regardless of which areas the current invocation asked for.
//! Writes go through a temporary sibling file and a rename, so a crash
//! mid-write leaves the previous slot intact.

pub mod paths;

use std::io::Write as _;
use std::path::{Path, PathBuf};

use covid_widget_summary_models::CaseSummary;

/// Errors that can occur during cache operations.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// Nothing has been cached yet.
    #[error("No cached summaries at {}", path.display())]
    Miss {
        /// Cache slot path.
        path: PathBuf,
    },

    /// The slot exists but could not be read.
    #[error("Cannot read cache at {}: {source}", path.display())]
    Unreadable {
        /// Cache slot path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The slot does not hold a valid summary array.
    #[error("Corrupt cache at {}: {source}", path.display())]
    Corrupt {
        /// Cache slot path.
        path: PathBuf,
        /// Deserialization error.
        source: serde_json::Error,
    },

    /// The slot could not be written.
    #[error("Cannot write cache at {}: {source}", path.display())]
    Write {
        /// Cache slot path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// File-backed store for the cached summary set.
#[derive(Debug, Clone)]
pub struct CacheStore {
    path: PathBuf,
}

impl CacheStore {
    /// Creates a store backed by `path`. Nothing is touched on disk until
    /// the first read or write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the cache slot.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replaces the cached set with `summaries`.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Write`] if the directory, temporary file, or
    /// rename fails. The previous slot is left untouched in that case.
    pub fn write(&self, summaries: &[CaseSummary]) -> Result<(), CacheError> {
        let write_err = |source: std::io::Error| CacheError::Write {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            paths::ensure_dir(parent).map_err(write_err)?;
        }

        let bytes = serde_json::to_vec_pretty(summaries)
            .map_err(|e| write_err(std::io::Error::from(e)))?;

        let tmp = paths::temp_path_for(&self.path);
        if let Err(e) = write_then_rename(&tmp, &self.path, &bytes) {
            let _ = std::fs::remove_file(&tmp);
            return Err(write_err(e));
        }

        log::debug!(
            "Cached {} summaries ({} bytes) at {}",
            summaries.len(),
            bytes.len(),
            self.path.display()
        );
        Ok(())
    }

    /// Loads the cached set.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Miss`] if nothing has been cached,
    /// [`CacheError::Unreadable`] for other I/O failures, and
    /// [`CacheError::Corrupt`] if the content is not a summary array.
    pub fn read(&self) -> Result<Vec<CaseSummary>, CacheError> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(CacheError::Miss {
                    path: self.path.clone(),
                });
            }
            Err(source) => {
                return Err(CacheError::Unreadable {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        let summaries: Vec<CaseSummary> =
            serde_json::from_slice(&bytes).map_err(|source| CacheError::Corrupt {
                path: self.path.clone(),
                source,
            })?;

        log::debug!(
            "Loaded {} cached summaries from {}",
            summaries.len(),
            self.path.display()
        );
        Ok(summaries)
    }
}

/// Writes `bytes` to `tmp`, flushes it to disk, and renames it to `path`.
fn write_then_rename(tmp: &Path, path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = std::fs::File::create(tmp)?;
    file.write_all(bytes)?;
    file.sync_all()?;
    std::fs::rename(tmp, path)
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, NaiveDate};
    use covid_widget_summary_models::{DailyPoint, GeoLevel, TrendDirection};

    use super::*;

    fn test_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("covid_widget_cache_test_{name}"));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    fn summary(level: GeoLevel, label: &str, new_cases: u64) -> CaseSummary {
        let point = |day: u32, new_cases: u64, total: u64| DailyPoint {
            date: NaiveDate::from_ymd_opt(2021, 3, day).unwrap(),
            new_cases,
            cumulative_cases: Some(total),
            active_cases: Some(12),
            new_tests: None,
            cumulative_tests: Some(9_000),
            new_deaths: Some(0),
            cumulative_deaths: None,
        };
        CaseSummary {
            level,
            short_label: label.to_string(),
            long_label: format!("{label} long"),
            last_updated: DateTime::parse_from_rfc3339("2021-03-14T21:06:30-04:00").unwrap(),
            new_cases,
            active_cases: Some(12),
            total_cases: 1_000 + new_cases,
            trend_direction: TrendDirection::Up,
            timeseries: vec![point(13, 1, 1_000), point(14, new_cases, 1_000 + new_cases)],
        }
    }

    #[test]
    fn read_returns_what_was_written() {
        let dir = test_dir("roundtrip");
        let store = CacheStore::new(dir.join("summaries.json"));
        let records = vec![
            summary(GeoLevel::SubRegion, "4601", 5),
            summary(GeoLevel::Region, "MB", 50),
            summary(GeoLevel::Country, "CA", 500),
        ];

        store.write(&records).unwrap();
        assert!(store.path().is_file());
        let loaded = store.read().unwrap();

        assert_eq!(loaded, records);
        assert_eq!(
            loaded[0].last_updated.to_rfc3339(),
            "2021-03-14T21:06:30-04:00"
        );
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn write_replaces_previous_slot() {
        let dir = test_dir("overwrite");
        let store = CacheStore::new(dir.join("summaries.json"));

        store
            .write(&[
                summary(GeoLevel::SubRegion, "4601", 5),
                summary(GeoLevel::Region, "MB", 50),
            ])
            .unwrap();
        store.write(&[summary(GeoLevel::Region, "ON", 70)]).unwrap();

        let loaded = store.read().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].short_label, "ON");
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn write_leaves_no_temp_file() {
        let dir = test_dir("no_temp");
        let path = dir.join("summaries.json");
        CacheStore::new(&path)
            .write(&[summary(GeoLevel::Country, "CA", 1)])
            .unwrap();

        let entries: Vec<_> = std::fs::read_dir(&dir)
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("summaries.json")]);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_file_is_a_miss() {
        let dir = test_dir("miss");
        let store = CacheStore::new(dir.join("summaries.json"));
        assert!(matches!(store.read(), Err(CacheError::Miss { .. })));
    }

    #[test]
    fn garbage_is_corrupt() {
        let dir = test_dir("corrupt");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("summaries.json");
        std::fs::write(&path, "{\"half\": ").unwrap();

        let store = CacheStore::new(&path);
        assert!(matches!(store.read(), Err(CacheError::Corrupt { .. })));

        std::fs::write(&path, "[{\"shortLabel\": \"MB\"}]").unwrap();
        assert!(matches!(store.read(), Err(CacheError::Corrupt { .. })));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn unwritable_location_is_a_write_error() {
        let dir = test_dir("unwritable");
        std::fs::create_dir_all(&dir).unwrap();
        // A regular file where the parent directory should be.
        let blocker = dir.join("blocker");
        std::fs::write(&blocker, "x").unwrap();

        let store = CacheStore::new(blocker.join("summaries.json"));
        assert!(matches!(
            store.write(&[summary(GeoLevel::Country, "CA", 1)]),
            Err(CacheError::Write { .. })
        ));
        let _ = std::fs::remove_dir_all(&dir);
    }
}
