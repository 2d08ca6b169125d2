pub mod collection;
pub mod feed;
pub mod folder;
pub mod item;

use std::sync::atomic::{AtomicU64, Ordering};

pub use collection::{Collection, DEFAULT_FOLDER_NAME};
pub use feed::{Feed, FeedId, FetchedFeed};
pub use folder::{Folder, FolderId};
pub use item::Item;

/// Process-unique identifiers for in-memory folders and feeds.
fn next_id() -> u64 {
    static NEXT: AtomicU64 = AtomicU64::new(1);
    NEXT.fetch_add(1, Ordering::Relaxed)
}
