use serde::{Deserialize, Serialize};

use crate::domain::{Feed, FeedId, Folder, FolderId};

pub const DEFAULT_FOLDER_NAME: &str = "Default";

/// Every folder the user has, in display order. This is what the store holds.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Collection {
    pub folders: Vec<Folder>,
}

impl Collection {
    /// A collection holding one empty "Default" folder.
    pub fn with_default_folder() -> Self {
        Self {
            folders: vec![Folder::new(DEFAULT_FOLDER_NAME)],
        }
    }

    pub fn folder(&self, id: FolderId) -> Option<&Folder> {
        self.folders.iter().find(|f| f.id == id)
    }

    pub fn folder_mut(&mut self, id: FolderId) -> Option<&mut Folder> {
        self.folders.iter_mut().find(|f| f.id == id)
    }

    pub fn folder_by_name(&self, name: &str) -> Option<&Folder> {
        self.folders.iter().find(|f| f.name == name)
    }

    /// Find a feed anywhere in the collection along with its owning folder.
    pub fn locate_feed(&self, id: FeedId) -> Option<(&Folder, &Feed)> {
        self.folders
            .iter()
            .find_map(|folder| folder.feed(id).map(|feed| (folder, feed)))
    }

    pub fn feed_mut(&mut self, id: FeedId) -> Option<&mut Feed> {
        self.folders.iter_mut().find_map(|folder| folder.feed_mut(id))
    }

    pub fn feed_count(&self) -> usize {
        self.folders.iter().map(|f| f.feeds.len()).sum()
    }
}
