use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

/// One entry of a fetched feed document. Items live only as long as the feed
/// node stays expanded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Item {
    pub id: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub link: Option<String>,
    pub pub_date: Option<DateTime<Utc>>,
    /// Date as written in the document, kept when it could not be parsed.
    pub date_text: Option<String>,
    pub content: Option<String>,
}

impl Item {
    pub fn new(feed_url: &str, entry_id: &str) -> Self {
        Self {
            id: Self::generate_id(feed_url, entry_id),
            ..Self::default()
        }
    }

    /// SHA-256 of the feed URL followed by the entry id, hex encoded. Stable
    /// across fetches of the same document.
    pub fn generate_id(feed_url: &str, entry_id: &str) -> String {
        let digest = Sha256::new()
            .chain_update(feed_url)
            .chain_update(entry_id)
            .finalize();
        hex::encode(digest)
    }

    /// Publication date for display: parsed when possible, raw text otherwise.
    pub fn display_date(&self) -> Option<String> {
        self.pub_date
            .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
            .or_else(|| self.date_text.clone())
    }

    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or("(Untitled)")
    }

    /// The rich body when the feed carries one, otherwise the description.
    pub fn display_content(&self) -> &str {
        self.content
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .or(self.description.as_deref())
            .unwrap_or("")
    }
}
