use crate::io::append_line;
use crate::paths::{index_file, is_safe_index_name};
use crate::types::ActionOccurrence;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("invalid index name '{0}'")]
    InvalidIndexName(String),

    #[error("index rejected occurrence: {0}")]
    Rejected(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Destination for occurrences of indexed actions.
///
/// The recorder calls this outside of its own locks, once per indexed
/// occurrence. Implementations decide how to store or forward it.
pub trait IndexSink: Send + Sync {
    fn index(&self, index_name: &str, occurrence: &ActionOccurrence) -> Result<(), IndexError>;
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl IndexSink for NoopSink {
    fn index(&self, _index_name: &str, _occurrence: &ActionOccurrence) -> Result<(), IndexError> {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// MemorySink
// ---------------------------------------------------------------------------

/// Keeps every forwarded occurrence in memory, in arrival order.
#[derive(Debug, Default)]
pub struct MemorySink {
    entries: Mutex<Vec<(String, ActionOccurrence)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<(String, ActionOccurrence)> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn entries_for(&self, index_name: &str) -> Vec<ActionOccurrence> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|(idx, _)| idx == index_name)
            .map(|(_, occ)| occ.clone())
            .collect()
    }
}

impl IndexSink for MemorySink {
    fn index(&self, index_name: &str, occurrence: &ActionOccurrence) -> Result<(), IndexError> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((index_name.to_string(), occurrence.clone()));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// JsonlSink
// ---------------------------------------------------------------------------

/// Appends each occurrence as one JSON line to `<dir>/<index_name>.jsonl`.
#[derive(Debug)]
pub struct JsonlSink {
    dir: PathBuf,
    // serializes appends so lines from concurrent recorders never interleave
    write_lock: Mutex<()>,
}

impl JsonlSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Read back everything stored under `index_name`. A missing file is empty.
    pub fn read(&self, index_name: &str) -> Result<Vec<ActionOccurrence>, IndexError> {
        let path = self.path_for(index_name)?;
        if !path.exists() {
            return Ok(vec![]);
        }
        let data = std::fs::read_to_string(&path)?;
        data.lines()
            .filter(|l| !l.trim().is_empty())
            .map(|l| serde_json::from_str(l).map_err(IndexError::from))
            .collect()
    }

    fn path_for(&self, index_name: &str) -> Result<PathBuf, IndexError> {
        if !is_safe_index_name(index_name) {
            return Err(IndexError::InvalidIndexName(index_name.to_string()));
        }
        Ok(index_file(&self.dir, index_name))
    }
}

impl IndexSink for JsonlSink {
    fn index(&self, index_name: &str, occurrence: &ActionOccurrence) -> Result<(), IndexError> {
        let path = self.path_for(index_name)?;
        let line = serde_json::to_string(occurrence)?;
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        append_line(&path, &line)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
