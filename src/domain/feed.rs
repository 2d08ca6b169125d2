use serde::{Deserialize, Serialize};

use crate::domain::Item;

/// Stable in-memory handle for a feed. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FeedId(u64);

impl FeedId {
    pub fn new() -> Self {
        Self(super::next_id())
    }
}

impl Default for FeedId {
    fn default() -> Self {
        Self::new()
    }
}

/// A subscribed feed. Only `title` and `url` reach the store; `items` is
/// refilled from the network every time the feed is expanded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feed {
    #[serde(skip)]
    pub id: FeedId,
    #[serde(default)]
    pub title: String,
    pub url: String,
    #[serde(skip)]
    pub items: Vec<Item>,
}

impl Feed {
    pub fn new(title: String, url: String) -> Self {
        Self {
            id: FeedId::new(),
            title,
            url,
            items: Vec::new(),
        }
    }

    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() {
            &self.url
        } else {
            &self.title
        }
    }
}

/// A decoded feed document, before the caller assigns it an identity.
#[derive(Debug, Clone, Default)]
pub struct FetchedFeed {
    pub title: String,
    pub items: Vec<Item>,
}

impl FetchedFeed {
    /// Turn the fetched document into a feed record for `url`.
    pub fn into_feed(self, url: &str) -> Feed {
        Feed {
            id: FeedId::new(),
            title: self.title,
            url: url.to_string(),
            items: self.items,
        }
    }
}
