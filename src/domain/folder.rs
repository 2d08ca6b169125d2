use serde::{Deserialize, Serialize};

use crate::domain::{Feed, FeedId};

/// Stable in-memory handle for a folder, unaffected by renames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FolderId(u64);

impl FolderId {
    pub fn new() -> Self {
        Self(super::next_id())
    }
}

impl Default for FolderId {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Folder {
    #[serde(skip)]
    pub id: FolderId,
    pub name: String,
    #[serde(default)]
    pub feeds: Vec<Feed>,
}

impl Folder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: FolderId::new(),
            name: name.into(),
            feeds: Vec::new(),
        }
    }

    pub fn feed(&self, id: FeedId) -> Option<&Feed> {
        self.feeds.iter().find(|f| f.id == id)
    }

    pub fn feed_mut(&mut self, id: FeedId) -> Option<&mut Feed> {
        self.feeds.iter_mut().find(|f| f.id == id)
    }

    pub fn contains_url(&self, url: &str) -> bool {
        self.feeds.iter().any(|f| f.url == url)
    }
}
