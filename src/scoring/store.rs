//! Persistence for the fitted forest.
//!
//! The record is a single JSON document. `FileModelStore` writes each save to its
//! own uniquely named temp file beside the target and persists it over the target,
//! so readers never see a half-written model and the last writer wins.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::debug;

use super::forest::RandomForest;
use crate::error::ModelError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelOrigin {
    /// Fit on the synthetic training set.
    Dummy,
    /// Re-fit on one user feedback example.
    Feedback,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelRecord {
    pub origin: ModelOrigin,
    pub trained_at: DateTime<Utc>,
    pub samples: usize,
    pub forest: RandomForest,
}

impl ModelRecord {
    pub fn new(origin: ModelOrigin, samples: usize, forest: RandomForest) -> Self {
        Self {
            origin,
            trained_at: Utc::now(),
            samples,
            forest,
        }
    }
}

pub trait ModelStore: Send + Sync {
    /// `Ok(None)` when nothing has been persisted yet.
    fn load(&self) -> Result<Option<ModelRecord>, ModelError>;
    fn save(&self, record: &ModelRecord) -> Result<(), ModelError>;
    fn clear(&self) -> Result<(), ModelError>;
    /// Human-readable location for logs.
    fn location(&self) -> String;
}

#[derive(Debug, Clone)]
pub struct FileModelStore {
    path: PathBuf,
}

impl FileModelStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn dir(&self) -> &Path {
        match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        }
    }
}

impl ModelStore for FileModelStore {
    fn load(&self) -> Result<Option<ModelRecord>, ModelError> {
        let bytes = match fs::read(&self.path) {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    fn save(&self, record: &ModelRecord) -> Result<(), ModelError> {
        let dir = self.dir();
        fs::create_dir_all(dir)?;
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(&serde_json::to_vec(record)?)?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        debug!(path = %self.path.display(), origin = ?record.origin, "model saved");
        Ok(())
    }

    fn clear(&self) -> Result<(), ModelError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

/// In-process store for tests and ephemeral deployments.
#[derive(Debug, Default)]
pub struct MemoryModelStore {
    inner: RwLock<Option<ModelRecord>>,
}

impl MemoryModelStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ModelStore for MemoryModelStore {
    fn load(&self) -> Result<Option<ModelRecord>, ModelError> {
        Ok(self
            .inner
            .read()
            .map(|g| g.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone()))
    }

    fn save(&self, record: &ModelRecord) -> Result<(), ModelError> {
        let mut guard = self.inner.write().unwrap_or_else(|p| p.into_inner());
        *guard = Some(record.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), ModelError> {
        let mut guard = self.inner.write().unwrap_or_else(|p| p.into_inner());
        *guard = None;
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}
