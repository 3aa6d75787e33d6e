use super::data::*;
use crate::core::pbrt::*;

use log::*;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock};

type LoadResult = Result<Arc<MeasuredBxDFData>, PbrtError>;

/// Loads each measured dataset at most once per path and hands out shared
/// references. Failed loads are remembered as well.
#[derive(Debug, Default)]
pub struct MeasuredDataCache {
    slots: Mutex<HashMap<PathBuf, Arc<OnceLock<LoadResult>>>>,
    load_count: AtomicUsize,
}

impl MeasuredDataCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, path: &Path) -> Result<Arc<OnceLock<LoadResult>>, PbrtError> {
        let mut slots = self
            .slots
            .lock()
            .map_err(|_| PbrtError::error("measured data cache lock poisoned"))?;
        let slot = slots
            .entry(path.to_path_buf())
            .or_insert_with(|| Arc::new(OnceLock::new()));
        return Ok(slot.clone());
    }

    /// Returns the dataset for `path`, parsing the file on first request.
    /// Concurrent first requests block until the single load finishes.
    pub fn get_or_load<P: AsRef<Path>>(&self, path: P) -> Result<Arc<MeasuredBxDFData>, PbrtError> {
        let path = path.as_ref();
        let slot = self.slot(path)?;
        if let Some(r) = slot.get() {
            debug!("Measured BRDF cache hit: {}", path.display());
            return r.clone();
        }
        let r = slot.get_or_init(|| {
            info!("Loading measured BRDF: {}", path.display());
            self.load_count.fetch_add(1, Ordering::SeqCst);
            MeasuredBxDFData::open(path).map(Arc::new)
        });
        return r.clone();
    }

    /// Number of file parses performed so far.
    pub fn load_count(&self) -> usize {
        return self.load_count.load(Ordering::SeqCst);
    }

    pub fn contains<P: AsRef<Path>>(&self, path: P) -> bool {
        match self.slots.lock() {
            Ok(slots) => slots
                .get(path.as_ref())
                .map_or(false, |s| s.get().is_some()),
            Err(_) => false,
        }
    }

    pub fn len(&self) -> usize {
        match self.slots.lock() {
            Ok(slots) => slots.values().filter(|s| s.get().is_some()).count(),
            Err(_) => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        return self.len() == 0;
    }
}
