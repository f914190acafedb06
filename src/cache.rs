//! Process-wide table cache with a freshness window.
//!
//! Entries are complete snapshots: a reload builds a new table and swaps the
//! `Arc`, so readers holding the previous snapshot keep a consistent view.

use crate::error::LoadError;
use crate::types::Table;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error};

#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    pub value: Arc<T>,
    pub loaded_at: Instant,
}

impl<T> CacheEntry<T> {
    pub fn new(value: T, loaded_at: Instant) -> Self {
        Self { value: Arc::new(value), loaded_at }
    }

    pub fn is_stale(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.loaded_at) >= ttl
    }
}

/// What callers render from: the table plus the failure that emptied it, if any.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub points: Arc<Table>,
    pub failure: Option<Arc<LoadError>>,
}

impl Snapshot {
    /// An empty table means "unavailable": callers stop rendering.
    pub fn is_unavailable(&self) -> bool {
        self.points.is_empty()
    }
}

pub struct TableCache {
    ttl: Duration,
    entries: RwLock<HashMap<PathBuf, CacheEntry<Table>>>,
}

impl TableCache {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, entries: RwLock::new(HashMap::new()) }
    }

    /// Fresh cached table for `path`, or the result of `load` on a miss.
    pub fn get_with<F>(&self, path: &Path, now: Instant, load: F) -> Snapshot
    where
        F: FnOnce(&Path) -> Result<Table, LoadError>,
    {
        if let Some(entry) = self.entries.read().get(path) {
            if !entry.is_stale(now, self.ttl) {
                debug!("Cache hit for {:?}", path);
                return Snapshot { points: entry.value.clone(), failure: None };
            }
        }
        self.fill(path, now, load)
    }

    /// Drop any cached entry and re-read the source.
    pub fn reload_with<F>(&self, path: &Path, now: Instant, load: F) -> Snapshot
    where
        F: FnOnce(&Path) -> Result<Table, LoadError>,
    {
        self.invalidate(path);
        self.fill(path, now, load)
    }

    pub fn invalidate(&self, path: &Path) {
        self.entries.write().remove(path);
    }

    fn fill<F>(&self, path: &Path, now: Instant, load: F) -> Snapshot
    where
        F: FnOnce(&Path) -> Result<Table, LoadError>,
    {
        match load(path) {
            Ok(table) => {
                let entry = CacheEntry::new(table, now);
                let points = entry.value.clone();
                self.entries.write().insert(path.to_path_buf(), entry);
                Snapshot { points, failure: None }
            }
            Err(err) => {
                // not cached: the next request retries the source
                error!("Error al cargar la base de datos: {}", err);
                Snapshot { points: Arc::new(Table::new()), failure: Some(Arc::new(err)) }
            }
        }
    }
}
