//! # Arbor
//!
//! A terminal feed reader that keeps its subscriptions as a folder tree.
//!
//! ## Architecture
//!
//! ```text
//! Store ⇄ TreeState ← ExpansionController ← TUI event loop
//!                                      ↑
//!                      Fetcher → Normalizer (background tasks)
//! ```
//!
//! Folders hold feeds and feeds hold items. Folders and feeds are persisted
//! to a JSON file after every change; items are fetched when a feed node is
//! expanded and dropped again when it collapses.
//!
//! ## Quick Start
//!
//! ```bash
//! # Add a feed to the first folder
//! arbor add https://blog.rust-lang.org/feed.xml
//!
//! # Organise
//! arbor folder add Rust
//! arbor add https://this-week-in-rust.org/rss.xml --folder Rust
//!
//! # Browse
//! arbor
//! ```

/// Application context, errors and the log sink.
///
/// [`AppContext`](app::AppContext) wires the fetcher and the store path
/// together for both front ends.
pub mod app;

/// Command-line interface using clap.
///
/// - `tui` - Launch the TUI (the default)
/// - `list` - Print the tree
/// - `add <url> [--folder NAME]` / `remove <url>`
/// - `folder add <name>` / `folder rename <old> <new>`
pub mod cli;

/// Configuration loaded from `~/.config/arbor/config.toml`: file locations,
/// status timeout and keybindings.
pub mod config;

/// Core models: [`Folder`](domain::Folder), [`Feed`](domain::Feed) and
/// [`Item`](domain::Item) with their in-memory ids.
pub mod domain;

/// HTTP retrieval of feed documents.
///
/// - [`FeedFetcher`](fetcher::FeedFetcher): Async trait, stubbed in tests
/// - [`HttpFetcher`](fetcher::HttpFetcher): reqwest-based implementation
pub mod fetcher;

/// Parses RSS 0.9x/1.0/2.0, Atom and JSON Feed documents into items.
pub mod normalizer;

/// Persistence of the folder/feed tree.
///
/// - [`Store`](store::Store): load/save trait
/// - [`JsonStore`](store::JsonStore): the `feeds.json` file, with migration
///   from the old flat feed list
/// - [`MemoryStore`](store::MemoryStore): in-memory store for tests
pub mod store;

/// The tree model: mutations with write-through, lazy feed expansion and the
/// flattened row view.
pub mod tree;

/// Terminal user interface built with ratatui.
///
/// Tree on the left, preview on the right, status line at the bottom.
/// Fetches run on tokio tasks and report back over an mpsc channel that the
/// event loop drains between frames.
pub mod tui;
