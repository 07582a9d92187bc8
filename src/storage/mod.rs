//! JSON persistence for the bookmark catalog, status set and rotation log
//!
//! All three files live in one data directory:
//!
//! ```text
//! data/
//! ├── iroiro.json    # key → {category, title, url, description, kind?}
//! ├── status.json    # key → {status, failureCount}
//! └── rotation.json  # ["3", "0", ...]
//! ```
//!
//! Writes go to a temp file that is then renamed over the target, so a
//! failed write never leaves a half-written file behind.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::config::DataConfig;
use crate::models::{Catalog, StatusMap};
use crate::rotation::RotationLog;
use crate::utils::error::StoreError;

/// Result type for storage operations
pub type StoreResult<T> = Result<T, StoreError>;

/// File-backed store for all persisted state
#[derive(Debug, Clone)]
pub struct DataStore {
    sites_path: PathBuf,
    status_path: PathBuf,
    rotation_path: PathBuf,
}

impl DataStore {
    /// Store over `dir` with the default file names
    pub fn new(dir: &Path) -> Self {
        Self::from_config(&DataConfig {
            data_dir: dir.to_path_buf(),
            ..DataConfig::default()
        })
    }

    /// Store using the `[data]` config section
    pub fn from_config(config: &DataConfig) -> Self {
        Self {
            sites_path: config.data_dir.join(&config.sites_file),
            status_path: config.data_dir.join(&config.status_file),
            rotation_path: config.data_dir.join(&config.rotation_file),
        }
    }

    /// Path of the bookmark catalog
    pub fn sites_path(&self) -> &Path {
        &self.sites_path
    }

    /// Path of the status file
    pub fn status_path(&self) -> &Path {
        &self.status_path
    }

    /// Path of the rotation log
    pub fn rotation_path(&self) -> &Path {
        &self.rotation_path
    }

    /// Load the catalog; a missing file is an error
    pub fn load_catalog(&self) -> StoreResult<Catalog> {
        let content = fs::read_to_string(&self.sites_path).map_err(|source| StoreError::Read {
            path: self.sites_path.clone(),
            source,
        })?;
        parse(&self.sites_path, &content)
    }

    /// Load the catalog; a missing file is an empty catalog
    pub fn load_catalog_or_default(&self) -> StoreResult<Catalog> {
        read_or_default(&self.sites_path)
    }

    /// Replace the catalog file
    pub fn save_catalog(&self, catalog: &Catalog) -> StoreResult<()> {
        write_atomic(&self.sites_path, catalog)
    }

    /// Load the status set; a missing file is an empty set
    pub fn load_statuses(&self) -> StoreResult<StatusMap> {
        read_or_default(&self.status_path)
    }

    /// Replace the status file
    pub fn save_statuses(&self, statuses: &StatusMap) -> StoreResult<()> {
        write_atomic(&self.status_path, statuses)
    }

    /// Load the rotation log; a missing file is an empty log
    pub fn load_rotation(&self) -> StoreResult<RotationLog> {
        let keys: Vec<String> = read_or_default(&self.rotation_path)?;
        Ok(RotationLog::from_keys(keys))
    }

    /// Replace the rotation log file
    pub fn save_rotation(&self, log: &RotationLog) -> StoreResult<()> {
        write_atomic(&self.rotation_path, log)
    }
}

fn parse<T: DeserializeOwned>(path: &Path, content: &str) -> StoreResult<T> {
    serde_json::from_str(content).map_err(|source| StoreError::Malformed {
        path: path.to_path_buf(),
        source,
    })
}

fn read_or_default<T: DeserializeOwned + Default>(path: &Path) -> StoreResult<T> {
    match fs::read_to_string(path) {
        Ok(content) => parse(path, &content),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "File missing, starting empty");
            Ok(T::default())
        }
        Err(source) => Err(StoreError::Read {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn write_atomic<T: Serialize>(path: &Path, value: &T) -> StoreResult<()> {
    let bytes = serde_json::to_vec_pretty(value).map_err(|source| StoreError::Serialize {
        path: path.to_path_buf(),
        source,
    })?;

    let mut temp_name = path.as_os_str().to_owned();
    temp_name.push(".tmp");
    let temp_path = PathBuf::from(temp_name);

    let write_err = |source| StoreError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_err)?;
    }
    fs::write(&temp_path, bytes).map_err(write_err)?;
    fs::rename(&temp_path, path).map_err(write_err)?;

    tracing::debug!(path = %path.display(), "Saved");
    Ok(())
}
