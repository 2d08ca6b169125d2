use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::app::error::{ArborError, Result};
use crate::fetcher::{FeedFetcher, HttpFetcher};
use crate::store::JsonStore;
use crate::tree::TreeState;

/// Long-lived collaborators shared by the CLI and the TUI.
pub struct AppContext {
    pub fetcher: Arc<dyn FeedFetcher + Send + Sync>,
    store_path: PathBuf,
}

impl AppContext {
    pub fn new(store_path: PathBuf) -> Result<Self> {
        let fetcher: Arc<dyn FeedFetcher + Send + Sync> = Arc::new(HttpFetcher::new()?);
        Ok(Self::with_fetcher(store_path, fetcher))
    }

    pub fn with_fetcher(store_path: PathBuf, fetcher: Arc<dyn FeedFetcher + Send + Sync>) -> Self {
        Self {
            fetcher,
            store_path,
        }
    }

    pub fn store_path(&self) -> &Path {
        &self.store_path
    }

    /// Load the tree from the store file.
    ///
    /// Fails only when the file can be neither read nor replaced; a corrupt or
    /// unreadable file in a writable directory is reported through the
    /// returned warning.
    pub fn open_tree(&self) -> Result<(TreeState, Option<ArborError>)> {
        let store = JsonStore::new(&self.store_path);
        let dir = store.parent_dir().to_path_buf();
        let (tree, warning) = TreeState::open(Box::new(store))?;

        if let Some(err) = &warning {
            if !dir_is_writable(&dir) {
                return Err(ArborError::Config(format!(
                    "{} ({}) and {} is not writable",
                    self.store_path.display(),
                    err,
                    dir.display()
                )));
            }
        }

        Ok((tree, warning))
    }
}

/// Probe by creating a scratch file, which also covers ACLs and read-only
/// mounts.
fn dir_is_writable(dir: &Path) -> bool {
    tempfile::NamedTempFile::new_in(dir).is_ok()
}
