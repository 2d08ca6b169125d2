pub mod json;
pub mod memory;

use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;

use crate::app::{ArborError, Result};
use crate::domain::{Collection, Feed, Folder, DEFAULT_FOLDER_NAME};

pub use json::JsonStore;
pub use memory::MemoryStore;

/// Durable home of the [`Collection`].
///
/// `save` replaces the whole collection; readers never observe a partially
/// written file.
pub trait Store {
    fn load(&self) -> Result<Collection>;
    fn save(&self, collection: &Collection) -> Result<()>;
}

/// Flat feed list written before folders existed.
#[derive(Debug, Deserialize)]
struct LegacyFeedList {
    feeds: Vec<Feed>,
}

/// Decode a store document, migrating the legacy flat format into a single
/// "Default" folder. Repeated folder names and repeated URLs within a folder
/// are merged away.
pub(crate) fn decode(bytes: &[u8], origin: &str) -> Result<Collection> {
    decode_raw(bytes, origin).map(|collection| dedupe(collection, origin))
}

fn decode_raw(bytes: &[u8], origin: &str) -> Result<Collection> {
    let current_err = match serde_json::from_slice::<Collection>(bytes) {
        Ok(collection) => return Ok(collection),
        Err(e) => e,
    };

    match serde_json::from_slice::<LegacyFeedList>(bytes) {
        Ok(legacy) => {
            tracing::info!(
                "migrating {} feeds from legacy format in {}",
                legacy.feeds.len(),
                origin
            );
            let mut folder = Folder::new(DEFAULT_FOLDER_NAME);
            folder.feeds = legacy.feeds;
            Ok(Collection {
                folders: vec![folder],
            })
        }
        Err(_) => Err(ArborError::Corrupt(format!("{}: {}", origin, current_err))),
    }
}

/// Fold folders sharing a name into the first of them and drop feeds whose URL
/// already appears in the same folder. Order of first appearance is kept.
fn dedupe(collection: Collection, origin: &str) -> Collection {
    let mut folders: Vec<Folder> = Vec::with_capacity(collection.folders.len());
    let mut dropped = 0;

    for folder in collection.folders {
        let index = match folders.iter().position(|f| f.name == folder.name) {
            Some(index) => {
                tracing::warn!("merging repeated folder {} in {}", folder.name, origin);
                index
            }
            None => {
                folders.push(Folder {
                    id: folder.id,
                    name: folder.name.clone(),
                    feeds: Vec::new(),
                });
                folders.len() - 1
            }
        };

        let target = &mut folders[index];
        for feed in folder.feeds {
            if target.contains_url(&feed.url) {
                dropped += 1;
            } else {
                target.feeds.push(feed);
            }
        }
    }

    if dropped > 0 {
        tracing::warn!("dropped {} repeated feed URLs from {}", dropped, origin);
    }
    Collection { folders }
}

/// Serialize with four-space indentation and a trailing newline.
pub(crate) fn encode(collection: &Collection) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    collection
        .serialize(&mut ser)
        .map_err(std::io::Error::from)?;
    buf.push(b'\n');
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_current_schema() {
        let doc = r#"{
            "folders": [
                {"name": "Default", "feeds": [{"title": "A", "url": "https://a.example/rss"}]},
                {"name": "Tech", "feeds": []}
            ]
        }"#;
        let collection = decode(doc.as_bytes(), "test").unwrap();
        assert_eq!(collection.folders.len(), 2);
        assert_eq!(collection.folders[0].feeds[0].url, "https://a.example/rss");
        assert_eq!(collection.folders[1].name, "Tech");
    }

    #[test]
    fn test_decode_legacy_schema() {
        let doc = r#"{"feeds": [
            {"title": "A", "url": "https://a.example/rss"},
            {"title": "B", "url": "https://b.example/rss"}
        ]}"#;
        let collection = decode(doc.as_bytes(), "test").unwrap();
        assert_eq!(collection.folders.len(), 1);
        assert_eq!(collection.folders[0].name, DEFAULT_FOLDER_NAME);
        let urls: Vec<_> = collection.folders[0].feeds.iter().map(|f| f.url.as_str()).collect();
        assert_eq!(urls, vec!["https://a.example/rss", "https://b.example/rss"]);
    }

    #[test]
    fn test_decode_garbage_is_corrupt() {
        let result = decode(b"{ not json", "test");
        assert!(matches!(result, Err(ArborError::Corrupt(_))));

        let result = decode(br#"{"something": "else"}"#, "test");
        assert!(matches!(result, Err(ArborError::Corrupt(_))));
    }

    #[test]
    fn test_encode_uses_four_space_indent() {
        let collection = Collection::with_default_folder();
        let text = String::from_utf8(encode(&collection).unwrap()).unwrap();
        assert!(text.starts_with("{\n    \"folders\": ["));
        assert!(text.ends_with("}\n"));
        assert!(!text.contains("\"id\""));
    }

    #[test]
    fn test_decode_merges_repeated_names_and_urls() {
        let doc = r#"{
            "folders": [
                {"name": "News", "feeds": [
                    {"title": "A", "url": "https://a.example/rss"},
                    {"title": "A again", "url": "https://a.example/rss"}
                ]},
                {"name": "Tech", "feeds": []},
                {"name": "News", "feeds": [
                    {"title": "B", "url": "https://b.example/rss"},
                    {"title": "A", "url": "https://a.example/rss"}
                ]}
            ]
        }"#;
        let collection = decode(doc.as_bytes(), "test").unwrap();

        let names: Vec<_> = collection.folders.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["News", "Tech"]);
        let urls: Vec<_> = collection.folders[0].feeds.iter().map(|f| f.url.as_str()).collect();
        assert_eq!(urls, vec!["https://a.example/rss", "https://b.example/rss"]);
        assert_eq!(collection.folders[0].feeds[0].title, "A");
    }

    #[test]
    fn test_legacy_repeated_urls_are_dropped() {
        let doc = r#"{"feeds": [
            {"url": "https://a.example/rss"},
            {"url": "https://a.example/rss"}
        ]}"#;
        let collection = decode(doc.as_bytes(), "test").unwrap();
        assert_eq!(collection.folders[0].feeds.len(), 1);
    }
}
