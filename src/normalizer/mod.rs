use chrono::Utc;
use feed_rs::parser;
use html_escape::decode_html_entities;

use crate::app::{ArborError, Result};
use crate::domain::{FetchedFeed, Item};

/// Turns a raw feed document into a [`FetchedFeed`].
///
/// RSS 0.9x/1.0/2.0, Atom and JSON Feed are accepted. The character set comes
/// from the document's XML declaration and defaults to UTF-8.
#[derive(Clone)]
pub struct Normalizer;

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Normalizer {
    pub fn new() -> Self {
        Self
    }

    /// `feed_url` only seeds item ids; the result carries no URL.
    pub fn normalize(&self, feed_url: &str, body: &[u8]) -> Result<FetchedFeed> {
        let feed = parser::parse(body).map_err(|e| ArborError::Parse(e.to_string()))?;

        // feed-rs drops dates it cannot parse; keep their text for display.
        let mut raw_dates = entry_date_texts(body);
        if raw_dates.len() != feed.entries.len() {
            raw_dates.clear();
        }
        let mut raw_dates = raw_dates.into_iter();

        let title = feed
            .title
            .map(|t| decode_html_entities(t.content.trim()).to_string())
            .unwrap_or_default();

        let items = feed
            .entries
            .into_iter()
            .map(|entry| {
                let link = entry.links.first().map(|l| l.href.clone());
                let entry_id = if entry.id.is_empty() {
                    link.clone().unwrap_or_default()
                } else {
                    entry.id.clone()
                };

                let mut item = Item::new(feed_url, &entry_id);
                item.title = entry
                    .title
                    .map(|t| decode_html_entities(t.content.trim()).to_string());
                item.link = link;
                item.description = entry.summary.map(|s| s.content);
                // <content:encoded> in RSS, <content> in Atom
                item.content = entry.content.and_then(|c| c.body);
                item.pub_date = entry
                    .published
                    .or(entry.updated)
                    .map(|dt| dt.with_timezone(&Utc));
                let raw_date = raw_dates.next().flatten();
                if item.pub_date.is_none() {
                    item.date_text = raw_date;
                }
                item
            })
            .collect();

        Ok(FetchedFeed { title, items })
    }
}

const ENTRY_TAGS: [&str; 2] = ["<item", "<entry"];
const DATE_TAGS: [&str; 4] = ["pubDate", "dc:date", "published", "updated"];

/// The first date element of every `<item>`/`<entry>`, in document order, as
/// written in the source.
fn entry_date_texts(body: &[u8]) -> Vec<Option<String>> {
    let text = String::from_utf8_lossy(body);
    let mut starts: Vec<usize> = ENTRY_TAGS
        .iter()
        .flat_map(|tag| text.match_indices(tag).map(move |(i, _)| (i, tag.len())))
        .filter(|&(i, len)| {
            let next = text[i + len..].chars().next();
            matches!(next, Some('>' | '/')) || next.is_some_and(char::is_whitespace)
        })
        .map(|(i, _)| i)
        .collect();
    starts.sort_unstable();

    starts
        .iter()
        .enumerate()
        .map(|(n, &start)| {
            let end = starts.get(n + 1).copied().unwrap_or(text.len());
            let chunk = &text[start..end];
            DATE_TAGS.iter().find_map(|tag| element_text(chunk, tag))
        })
        .collect()
}

fn element_text(chunk: &str, tag: &str) -> Option<String> {
    let open = format!("<{}>", tag);
    let start = chunk.find(&open)? + open.len();
    let len = chunk[start..].find('<')?;
    let value = decode_html_entities(chunk[start..start + len].trim()).to_string();
    (!value.is_empty()).then_some(value)
}
