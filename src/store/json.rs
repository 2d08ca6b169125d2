use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::app::{ArborError, Result};
use crate::domain::Collection;
use crate::store::{decode, encode, Store};

pub const DEFAULT_STORE_FILE: &str = "feeds.json";

/// Collection stored as an indented JSON document on disk.
pub struct JsonStore {
    path: PathBuf,
}

impl JsonStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn parent_dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }
}

impl Store for JsonStore {
    fn load(&self) -> Result<Collection> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(ArborError::NotFound(self.path.display().to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        let collection = decode(&bytes, &self.path.display().to_string())?;
        tracing::info!(
            "loaded {} folders, {} feeds from {}",
            collection.folders.len(),
            collection.feed_count(),
            self.path.display()
        );
        Ok(collection)
    }

    fn save(&self, collection: &Collection) -> Result<()> {
        let bytes = encode(collection)?;

        // Write beside the target, then rename over it.
        let mut tmp = NamedTempFile::new_in(self.parent_dir())?;
        tmp.write_all(&bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;

        tracing::debug!("saved collection to {}", self.path.display());
        Ok(())
    }
}
