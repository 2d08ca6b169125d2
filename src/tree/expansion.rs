//! On-demand loading of feed nodes.
//!
//! Each feed node cycles `Collapsed → Loading → Expanded → Collapsed`. Moving
//! out of `Collapsed` always starts a fresh fetch; items are dropped again on
//! collapse. Every fetch is tagged with a generation number and a completion
//! is applied only while the node is still loading that same generation, so a
//! result arriving after a collapse, a removal or a newer request is dropped.

use std::collections::{HashMap, HashSet};

use crate::app::{ArborError, Result};
use crate::domain::{FeedId, FetchedFeed, FolderId};
use crate::tree::TreeState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodeState {
    #[default]
    Collapsed,
    Loading {
        generation: u64,
    },
    Expanded,
}

/// What the caller has to do after a feed node was toggled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Toggle {
    /// Fetch `url` and report back with `generation`.
    Fetch { url: String, generation: u64 },
    Collapsed,
    /// A fetch for this node is already running.
    Ignored,
}

#[derive(Debug)]
pub enum Completion {
    Loaded { count: usize, title: String },
    Failed(ArborError),
    /// The node moved on since the fetch started; nothing was changed.
    Stale,
}

#[derive(Debug, Default)]
pub struct ExpansionController {
    feeds: HashMap<FeedId, NodeState>,
    open_folders: HashSet<FolderId>,
    next_generation: u64,
}

impl ExpansionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, feed: FeedId) -> NodeState {
        self.feeds.get(&feed).copied().unwrap_or_default()
    }

    pub fn is_loading(&self, feed: FeedId) -> bool {
        matches!(self.state(feed), NodeState::Loading { .. })
    }

    pub fn is_folder_open(&self, folder: FolderId) -> bool {
        self.open_folders.contains(&folder)
    }

    pub fn open_folder(&mut self, folder: FolderId) {
        self.open_folders.insert(folder);
    }

    /// Open or close a folder node. Closing it also collapses its feeds.
    /// Returns whether the folder is open afterwards.
    pub fn toggle_folder(&mut self, tree: &mut TreeState, folder: FolderId) -> Result<bool> {
        let feeds: Vec<FeedId> = tree
            .folder(folder)
            .ok_or_else(|| ArborError::NotFound("folder".into()))?
            .feeds
            .iter()
            .map(|f| f.id)
            .collect();

        if self.open_folders.remove(&folder) {
            for feed in feeds {
                self.collapse_feed(tree, feed);
            }
            Ok(false)
        } else {
            self.open_folders.insert(folder);
            Ok(true)
        }
    }

    /// Expand or collapse a feed node.
    pub fn toggle_feed(&mut self, tree: &mut TreeState, feed: FeedId) -> Result<Toggle> {
        let url = tree
            .feed(feed)
            .map(|f| f.url.clone())
            .ok_or_else(|| ArborError::NotFound("feed".into()))?;

        match self.state(feed) {
            NodeState::Collapsed => {
                self.next_generation += 1;
                let generation = self.next_generation;
                self.feeds.insert(feed, NodeState::Loading { generation });
                tracing::debug!("loading {} (generation {})", url, generation);
                Ok(Toggle::Fetch { url, generation })
            }
            NodeState::Loading { .. } => Ok(Toggle::Ignored),
            NodeState::Expanded => {
                self.collapse_feed(tree, feed);
                Ok(Toggle::Collapsed)
            }
        }
    }

    /// Collapse a feed node and drop its items. A pending fetch is not aborted,
    /// its result will be discarded when it arrives.
    pub fn collapse_feed(&mut self, tree: &mut TreeState, feed: FeedId) {
        if self.feeds.remove(&feed).is_some() {
            tree.clear_items(feed);
        }
    }

    /// Apply the result of the fetch started for `generation`.
    pub fn complete(
        &mut self,
        tree: &mut TreeState,
        feed: FeedId,
        generation: u64,
        result: Result<FetchedFeed>,
    ) -> Completion {
        match self.feeds.get(&feed) {
            Some(NodeState::Loading { generation: pending }) if *pending == generation => {}
            _ => {
                tracing::debug!("discarding stale result for generation {}", generation);
                return Completion::Stale;
            }
        }

        match result {
            Ok(fetched) => {
                let count = fetched.items.len();
                if !tree.set_items(feed, fetched.items) {
                    self.feeds.remove(&feed);
                    return Completion::Stale;
                }
                self.feeds.insert(feed, NodeState::Expanded);
                let title = tree
                    .feed(feed)
                    .map(|f| f.display_title().to_string())
                    .unwrap_or_default();
                tracing::info!("loaded {} items for feed: {}", count, title);
                Completion::Loaded { count, title }
            }
            Err(err) => {
                self.feeds.remove(&feed);
                tree.clear_items(feed);
                tracing::warn!("failed to load feed items: {}", err);
                Completion::Failed(err)
            }
        }
    }

    /// Drop all state for a feed that left the tree.
    pub fn forget_feed(&mut self, feed: FeedId) {
        self.feeds.remove(&feed);
    }
}
