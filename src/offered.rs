//! Term-offering acquisition and caching.
//!
//! The offering snapshot is shared across requests behind an `Arc` swap:
//! readers always see a complete snapshot, and a failed refresh keeps the
//! last known good one. Only one refresh runs at a time.

use std::collections::HashMap;
use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use crate::models::ScrapedCourse;

/// The university's public course bulletin. Recommendations that cannot be
/// produced from the cached offering point the caller here.
pub const COURSE_BULLETIN_URL: &str = "http://appserver.fet.edu.jo:7778/courses/index.jsp";

pub type OfferingSnapshot = HashMap<String, ScrapedCourse>;

/// Where offering snapshots come from. The cache owns one of these and calls
/// it on demand; implementations must be callable from worker threads.
pub trait OfferingSource: Send + Sync {
    fn fetch(&self) -> Result<OfferingSnapshot, Box<dyn Error + Send + Sync>>;
}

/// Offering snapshot exported from the bulletin as JSON, keyed by bulletin
/// code. Re-reads the file on every fetch so a replaced export is picked up
/// by the next refresh.
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileSource { path: path.into() }
    }
}

impl OfferingSource for JsonFileSource {
    fn fetch(&self) -> Result<OfferingSnapshot, Box<dyn Error + Send + Sync>> {
        let raw = fs::read_to_string(&self.path)?;
        let snapshot: OfferingSnapshot = serde_json::from_str(&raw)?;
        Ok(snapshot)
    }
}

pub struct OfferingCache {
    source: Box<dyn OfferingSource>,
    snapshot: RwLock<Arc<OfferingSnapshot>>,
    refresh_lock: Mutex<()>,
}

impl OfferingCache {
    pub fn new(source: Box<dyn OfferingSource>) -> Self {
        OfferingCache {
            source,
            snapshot: RwLock::new(Arc::new(HashMap::new())),
            refresh_lock: Mutex::new(()),
        }
    }

    fn current(&self) -> Arc<OfferingSnapshot> {
        self.snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the cached snapshot, refreshing it first when asked to or when
    /// nothing has been fetched yet. A failed refresh logs and returns the
    /// last known good snapshot.
    pub fn snapshot(&self, refresh: bool) -> Arc<OfferingSnapshot> {
        let cached = self.current();
        if !refresh && !cached.is_empty() {
            return cached;
        }

        let _guard = self.refresh_lock.lock().unwrap_or_else(PoisonError::into_inner);
        // Another request may have refreshed while this one waited.
        let cached = self.current();
        if !refresh && !cached.is_empty() {
            return cached;
        }

        match self.source.fetch() {
            Ok(fresh) => {
                let fresh = Arc::new(fresh);
                *self
                    .snapshot
                    .write()
                    .unwrap_or_else(PoisonError::into_inner) = fresh.clone();
                tracing::info!(courses = fresh.len(), "offering snapshot refreshed");
                fresh
            }
            Err(err) => {
                tracing::warn!(error = %err, "offering refresh failed, keeping last snapshot");
                cached
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSource {
        calls: AtomicUsize,
        fail: bool,
    }

    impl CountingSource {
        fn new(fail: bool) -> Self {
            CountingSource { calls: AtomicUsize::new(0), fail }
        }
    }

    impl OfferingSource for CountingSource {
        fn fetch(&self) -> Result<OfferingSnapshot, Box<dyn Error + Send + Sync>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err("bulletin unreachable".into());
            }
            let mut snap = HashMap::new();
            snap.insert(
                "ELE101".to_string(),
                ScrapedCourse { name: "برمجة 1".to_string(), hours: 3, sections: vec![] },
            );
            Ok(snap)
        }
    }

    #[test]
    fn first_snapshot_triggers_a_fetch() {
        let cache = OfferingCache::new(Box::new(CountingSource::new(false)));
        let snap = cache.snapshot(false);
        assert_eq!(snap.len(), 1);
    }

    struct SharedSource(Arc<CountingSource>);

    impl OfferingSource for SharedSource {
        fn fetch(&self) -> Result<OfferingSnapshot, Box<dyn Error + Send + Sync>> {
            self.0.fetch()
        }
    }

    #[test]
    fn populated_cache_is_not_refetched_without_refresh() {
        let inner = Arc::new(CountingSource::new(false));
        let cache = OfferingCache::new(Box::new(SharedSource(inner.clone())));
        cache.snapshot(false);
        cache.snapshot(false);
        cache.snapshot(false);
        assert_eq!(inner.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn refresh_flag_forces_a_new_fetch() {
        let inner = Arc::new(CountingSource::new(false));
        let cache = OfferingCache::new(Box::new(SharedSource(inner.clone())));
        cache.snapshot(false);
        let snap = cache.snapshot(true);
        assert_eq!(snap.len(), 1);
        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn failed_refresh_keeps_last_known_good() {
        let cache = OfferingCache::new(Box::new(CountingSource::new(false)));
        let good = cache.snapshot(false);
        assert!(!good.is_empty());

        let failing = OfferingCache {
            source: Box::new(CountingSource::new(true)),
            snapshot: RwLock::new(Arc::new((*good).clone())),
            refresh_lock: Mutex::new(()),
        };
        let kept = failing.snapshot(true);
        assert_eq!(kept.len(), good.len());
    }

    #[test]
    fn failed_initial_fetch_yields_empty_snapshot() {
        let cache = OfferingCache::new(Box::new(CountingSource::new(true)));
        assert!(cache.snapshot(false).is_empty());
    }

    #[test]
    fn json_source_round_trips_a_snapshot_file() {
        let path = std::env::temp_dir().join("irshad-offering-test.json");
        let mut snap = HashMap::new();
        snap.insert(
            "ELE101".to_string(),
            ScrapedCourse { name: "برمجة 1".to_string(), hours: 3, sections: vec![] },
        );
        fs::write(&path, serde_json::to_string(&snap).unwrap()).unwrap();
        let loaded = JsonFileSource::new(&path).fetch().unwrap();
        fs::remove_file(&path).ok();
        assert_eq!(loaded["ELE101"].name, "برمجة 1");
    }

    #[test]
    fn json_source_reports_missing_files() {
        let source = JsonFileSource::new("/nonexistent/offering.json");
        assert!(source.fetch().is_err());
    }
}
