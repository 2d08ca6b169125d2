//! The authoritative in-memory folder → feed → item hierarchy.
//!
//! Every structural mutation writes the whole collection through to the
//! [`Store`] before returning. When that write fails the in-memory change is
//! kept, the error is returned as [`ArborError::Io`] and the tree stays
//! [`dirty`](TreeState::is_dirty) until a later write succeeds.
//!
//! `TreeState` is not synchronized. It belongs to a single owner (the UI event
//! loop), and background work reaches it only through that owner.

use crate::app::{ArborError, Result};
use crate::domain::{
    Collection, Feed, FeedId, FetchedFeed, Folder, FolderId, Item, DEFAULT_FOLDER_NAME,
};
use crate::fetcher::FeedFetcher;
use crate::store::Store;
use crate::tree::NodeRef;

pub struct TreeState {
    collection: Collection,
    store: Box<dyn Store + Send>,
    dirty: bool,
}

impl TreeState {
    pub fn new(collection: Collection, store: Box<dyn Store + Send>) -> Self {
        let mut collection = collection;
        if collection.folders.is_empty() {
            collection.folders.push(Folder::new(DEFAULT_FOLDER_NAME));
        }
        Self {
            collection,
            store,
            dirty: false,
        }
    }

    /// Load the collection from `store`.
    ///
    /// A missing store starts from an empty "Default" folder. A corrupt or
    /// unreadable store does the same but hands the error back so the caller
    /// can show it; the file is left alone until the first mutation.
    pub fn open(store: Box<dyn Store + Send>) -> Result<(Self, Option<ArborError>)> {
        match store.load() {
            Ok(collection) => Ok((Self::new(collection, store), None)),
            Err(ArborError::NotFound(what)) => {
                tracing::info!("no store at {}, starting with an empty collection", what);
                Ok((Self::new(Collection::with_default_folder(), store), None))
            }
            Err(err @ (ArborError::Corrupt(_) | ArborError::Io(_))) => {
                tracing::error!("{}", err);
                Ok((Self::new(Collection::with_default_folder(), store), Some(err)))
            }
            Err(err) => Err(err),
        }
    }

    pub fn collection(&self) -> &Collection {
        &self.collection
    }

    pub fn folders(&self) -> &[Folder] {
        &self.collection.folders
    }

    pub fn folder(&self, id: FolderId) -> Option<&Folder> {
        self.collection.folder(id)
    }

    pub fn feed(&self, id: FeedId) -> Option<&Feed> {
        self.collection.locate_feed(id).map(|(_, feed)| feed)
    }

    pub fn folder_of(&self, feed: FeedId) -> Option<FolderId> {
        self.collection.locate_feed(feed).map(|(folder, _)| folder.id)
    }

    /// True while the last store write failed.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn add_folder(&mut self, name: &str) -> Result<FolderId> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ArborError::EmptyName("Folder name"));
        }
        if self.collection.folder_by_name(name).is_some() {
            return Err(ArborError::DuplicateName(name.to_string()));
        }

        let folder = Folder::new(name);
        let id = folder.id;
        self.collection.folders.push(folder);
        tracing::info!("added folder {}", name);

        self.persist()?;
        Ok(id)
    }

    pub fn rename_folder(&mut self, folder: FolderId, new_name: &str) -> Result<()> {
        let new_name = new_name.trim();
        if new_name.is_empty() {
            return Err(ArborError::EmptyName("Folder name"));
        }
        let current = self
            .collection
            .folder(folder)
            .ok_or_else(|| ArborError::NotFound("folder".into()))?;
        if current.name == new_name {
            return Ok(());
        }
        if self.collection.folder_by_name(new_name).is_some() {
            return Err(ArborError::DuplicateName(new_name.to_string()));
        }

        if let Some(target) = self.collection.folder_mut(folder) {
            tracing::info!("renamed folder {} to {}", target.name, new_name);
            target.name = new_name.to_string();
        }

        self.persist()
    }

    /// Check that `url` may be added to `folder` without touching any state.
    ///
    /// Returns the normalized URL to fetch.
    pub fn prepare_feed(&self, folder: FolderId, url: &str) -> Result<String> {
        let url = url.trim();
        if url.is_empty() {
            return Err(ArborError::EmptyName("Feed URL"));
        }
        url::Url::parse(url)?;

        let target = self
            .collection
            .folder(folder)
            .ok_or_else(|| ArborError::NotFound("folder".into()))?;
        if target.contains_url(url) {
            return Err(ArborError::DuplicateFeed(url.to_string()));
        }
        Ok(url.to_string())
    }

    /// Append a fetched document to `folder` as a new feed with `url`.
    ///
    /// The duplicate check runs again: two submissions of the same URL may both
    /// pass [`prepare_feed`](Self::prepare_feed) while their fetches are in
    /// flight.
    pub fn commit_feed(
        &mut self,
        folder: FolderId,
        url: &str,
        fetched: FetchedFeed,
    ) -> Result<FeedId> {
        let target = self
            .collection
            .folder_mut(folder)
            .ok_or_else(|| ArborError::NotFound("folder".into()))?;
        if target.contains_url(url) {
            return Err(ArborError::DuplicateFeed(url.to_string()));
        }

        let mut feed = fetched.into_feed(url);
        // Items only appear once the node is expanded.
        feed.items.clear();
        let id = feed.id;
        tracing::info!("added feed {} ({}) to {}", feed.display_title(), url, target.name);
        target.feeds.push(feed);

        self.persist()?;
        Ok(id)
    }

    /// Fetch `url` and add it to `folder`. A failed fetch leaves everything
    /// untouched and is returned verbatim.
    pub async fn add_feed(
        &mut self,
        folder: FolderId,
        url: &str,
        fetcher: &(dyn FeedFetcher + Send + Sync),
    ) -> Result<FeedId> {
        let url = self.prepare_feed(folder, url)?;
        let fetched = fetcher.fetch(&url).await?;
        self.commit_feed(folder, &url, fetched)
    }

    pub fn remove_feed(&mut self, folder: FolderId, feed: FeedId) -> Result<Feed> {
        let target = self
            .collection
            .folder_mut(folder)
            .ok_or_else(|| ArborError::NotFound("folder".into()))?;
        let index = target
            .feeds
            .iter()
            .position(|f| f.id == feed)
            .ok_or_else(|| ArborError::NotFound(format!("feed in folder {}", target.name)))?;

        let removed = target.feeds.remove(index);
        tracing::info!("removed feed {} from {}", removed.url, target.name);

        self.persist()?;
        Ok(removed)
    }

    /// Folder that folder-scoped actions apply to for the given selection.
    ///
    /// A selected folder is used directly; a selected feed or item resolves to
    /// its owning folder. With nothing usable selected the first folder in the
    /// collection is used.
    pub fn resolve_target_folder(&self, selection: Option<&NodeRef>) -> Result<FolderId> {
        let resolved = match selection {
            Some(NodeRef::Folder(id)) => self.folder(*id).map(|f| f.id),
            Some(NodeRef::Feed { feed, .. }) | Some(NodeRef::Item { feed, .. }) => {
                self.folder_of(*feed)
            }
            None => None,
        };

        resolved
            .or_else(|| self.collection.folders.first().map(|f| f.id))
            .ok_or_else(|| ArborError::NotFound("no folders".into()))
    }

    /// Replace the volatile items of `feed`. Returns false if the feed is gone.
    pub fn set_items(&mut self, feed: FeedId, items: Vec<Item>) -> bool {
        match self.collection.feed_mut(feed) {
            Some(target) => {
                target.items = items;
                true
            }
            None => false,
        }
    }

    pub fn clear_items(&mut self, feed: FeedId) {
        if let Some(target) = self.collection.feed_mut(feed) {
            target.items.clear();
        }
    }

    fn persist(&mut self) -> Result<()> {
        match self.store.save(&self.collection) {
            Ok(()) => {
                self.dirty = false;
                Ok(())
            }
            Err(err) => {
                tracing::error!("failed to save collection: {}", err);
                self.dirty = true;
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use async_trait::async_trait;
    use tokio_test::{assert_err, assert_ok};

    struct StubFetcher;

    #[async_trait]
    impl FeedFetcher for StubFetcher {
        async fn fetch(&self, url: &str) -> Result<FetchedFeed> {
            if url.contains("unreachable") {
                return Err(ArborError::Network("connection refused".into()));
            }
            if url.contains("not-a-feed") {
                return Err(ArborError::Parse("no feed root".into()));
            }
            let items = (1..=3)
                .map(|n| {
                    let mut item = Item::new(url, &n.to_string());
                    item.title = Some(format!("Item {}", n));
                    item
                })
                .collect();
            Ok(FetchedFeed {
                title: "Example Feed".into(),
                items,
            })
        }
    }

    fn empty_tree() -> (TreeState, MemoryStore) {
        let store = MemoryStore::new();
        let (tree, warning) = TreeState::open(Box::new(store.clone())).unwrap();
        assert!(warning.is_none());
        (tree, store)
    }

    fn folder_names(tree: &TreeState) -> Vec<&str> {
        tree.folders().iter().map(|f| f.name.as_str()).collect()
    }

    fn default_folder(tree: &TreeState) -> FolderId {
        tree.folders()[0].id
    }

    #[test]
    fn test_open_missing_store_gives_default_folder() {
        let (tree, store) = empty_tree();
        assert_eq!(folder_names(&tree), vec!["Default"]);
        // Nothing is written until a mutation happens.
        assert_eq!(store.save_count(), 0);
    }

    #[test]
    fn test_open_corrupt_store_reports_and_keeps_file() {
        let store = MemoryStore::with_contents("not json at all");
        let (tree, warning) = TreeState::open(Box::new(store.clone())).unwrap();
        assert!(matches!(warning, Some(ArborError::Corrupt(_))));
        assert_eq!(folder_names(&tree), vec!["Default"]);
        assert_eq!(store.contents().as_deref(), Some("not json at all"));
    }

    struct UnreadableStore;

    impl Store for UnreadableStore {
        fn load(&self) -> Result<Collection> {
            Err(std::io::Error::from(std::io::ErrorKind::PermissionDenied).into())
        }

        fn save(&self, _collection: &Collection) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_open_unreadable_store_starts_fresh_and_stays_writable() {
        let (mut tree, warning) = assert_ok!(TreeState::open(Box::new(UnreadableStore)));
        assert!(matches!(warning, Some(ArborError::Io(_))));
        assert_eq!(folder_names(&tree), vec!["Default"]);

        assert_ok!(tree.add_folder("Tech"));
        assert!(!tree.is_dirty());
    }

    #[test]
    fn test_open_empty_folder_list_gets_default() {
        let store = MemoryStore::with_contents(r#"{"folders": []}"#);
        let (tree, _) = TreeState::open(Box::new(store)).unwrap();
        assert_eq!(folder_names(&tree), vec!["Default"]);
    }

    #[test]
    fn test_add_folder_persists() {
        let (mut tree, store) = empty_tree();
        assert_ok!(tree.add_folder("Tech"));
        assert_eq!(folder_names(&tree), vec!["Default", "Tech"]);
        assert_eq!(store.save_count(), 1);
        assert!(store.contents().unwrap().contains("\"Tech\""));
    }

    #[test]
    fn test_add_folder_rejects_duplicates_and_blank() {
        let (mut tree, store) = empty_tree();
        assert_ok!(tree.add_folder("Tech"));

        assert!(matches!(tree.add_folder("Tech"), Err(ArborError::DuplicateName(_))));
        assert!(matches!(tree.add_folder("   "), Err(ArborError::EmptyName(_))));
        // Case-sensitive: a different case is a different name.
        assert_ok!(tree.add_folder("tech"));

        assert_eq!(folder_names(&tree), vec!["Default", "Tech", "tech"]);
        assert_eq!(store.save_count(), 2);
    }

    #[test]
    fn test_rename_folder() {
        let (mut tree, store) = empty_tree();
        let tech = tree.add_folder("Tech").unwrap();

        assert_ok!(tree.rename_folder(tech, "Programming"));
        assert_eq!(folder_names(&tree), vec!["Default", "Programming"]);
        assert_eq!(tree.folder(tech).unwrap().name, "Programming");
        assert_eq!(store.save_count(), 2);
    }

    #[test]
    fn test_rename_folder_rejections_leave_collection_unchanged() {
        let (mut tree, store) = empty_tree();
        let tech = tree.add_folder("Tech").unwrap();

        assert!(matches!(tree.rename_folder(tech, "Default"), Err(ArborError::DuplicateName(_))));
        assert!(matches!(tree.rename_folder(tech, ""), Err(ArborError::EmptyName(_))));
        assert!(matches!(
            tree.rename_folder(FolderId::new(), "Other"),
            Err(ArborError::NotFound(_))
        ));

        assert_eq!(folder_names(&tree), vec!["Default", "Tech"]);
        assert_eq!(store.save_count(), 1);
    }

    #[test]
    fn test_rename_to_same_name_is_noop() {
        let (mut tree, store) = empty_tree();
        let tech = tree.add_folder("Tech").unwrap();
        assert_ok!(tree.rename_folder(tech, "Tech"));
        assert_eq!(store.save_count(), 1);
    }

    #[test]
    fn test_folder_names_stay_unique_over_mixed_sequence() {
        let (mut tree, _) = empty_tree();
        let names = ["a", "b", "a", "c", "b", "d"];
        let mut ids = Vec::new();
        for name in names {
            if let Ok(id) = tree.add_folder(name) {
                ids.push(id);
            }
        }
        for (i, id) in ids.iter().enumerate() {
            let _ = tree.rename_folder(*id, names[(i + 2) % names.len()]);
        }

        let mut seen = std::collections::HashSet::new();
        for folder in tree.folders() {
            assert!(seen.insert(folder.name.clone()), "duplicate {}", folder.name);
        }
    }

    #[tokio::test]
    async fn test_add_feed_stamps_url_and_persists() {
        let (mut tree, store) = empty_tree();
        let folder = default_folder(&tree);

        let id = tree
            .add_feed(folder, "http://example.com/rss", &StubFetcher)
            .await
            .unwrap();

        let feed = tree.feed(id).unwrap();
        assert_eq!(feed.title, "Example Feed");
        assert_eq!(feed.url, "http://example.com/rss");
        assert!(feed.items.is_empty());
        assert_eq!(store.save_count(), 1);
        assert!(store.contents().unwrap().contains("http://example.com/rss"));
    }

    #[tokio::test]
    async fn test_add_feed_twice_is_duplicate() {
        let (mut tree, store) = empty_tree();
        let folder = default_folder(&tree);

        assert_ok!(tree.add_feed(folder, "http://example.com/rss", &StubFetcher).await);
        let second = tree.add_feed(folder, "http://example.com/rss", &StubFetcher).await;

        assert!(matches!(second, Err(ArborError::DuplicateFeed(_))));
        assert_eq!(tree.folder(folder).unwrap().feeds.len(), 1);
        assert_eq!(store.save_count(), 1);
    }

    #[tokio::test]
    async fn test_same_url_allowed_in_different_folders() {
        let (mut tree, _) = empty_tree();
        let default = default_folder(&tree);
        let tech = tree.add_folder("Tech").unwrap();

        assert_ok!(tree.add_feed(default, "http://example.com/rss", &StubFetcher).await);
        assert_ok!(tree.add_feed(tech, "http://example.com/rss", &StubFetcher).await);
    }

    #[tokio::test]
    async fn test_fetch_failure_leaves_state_untouched() {
        let (mut tree, store) = empty_tree();
        let folder = default_folder(&tree);

        let network = tree
            .add_feed(folder, "http://unreachable.example/rss", &StubFetcher)
            .await;
        assert!(matches!(network, Err(ArborError::Network(_))));

        let parse = tree
            .add_feed(folder, "http://example.com/not-a-feed", &StubFetcher)
            .await;
        assert!(matches!(parse, Err(ArborError::Parse(_))));

        assert!(tree.folder(folder).unwrap().feeds.is_empty());
        assert_eq!(store.save_count(), 0);
    }

    #[tokio::test]
    async fn test_add_feed_rejects_bad_input() {
        let (mut tree, _) = empty_tree();
        let folder = default_folder(&tree);

        assert!(matches!(
            tree.add_feed(folder, "  ", &StubFetcher).await,
            Err(ArborError::EmptyName(_))
        ));
        assert!(matches!(
            tree.add_feed(folder, "not a url", &StubFetcher).await,
            Err(ArborError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_commit_rechecks_duplicates() {
        let (mut tree, _) = empty_tree();
        let folder = default_folder(&tree);
        let url = tree.prepare_feed(folder, "http://example.com/rss").unwrap();
        let again = tree.prepare_feed(folder, "http://example.com/rss").unwrap();

        assert_ok!(tree.commit_feed(folder, &url, FetchedFeed::default()));
        assert_err!(tree.commit_feed(folder, &again, FetchedFeed::default()));
        assert_eq!(tree.folder(folder).unwrap().feeds.len(), 1);
    }

    #[tokio::test]
    async fn test_remove_middle_feed_keeps_order() {
        let (mut tree, store) = empty_tree();
        let folder = default_folder(&tree);
        let first = tree.add_feed(folder, "http://one.example/rss", &StubFetcher).await.unwrap();
        let second = tree.add_feed(folder, "http://two.example/rss", &StubFetcher).await.unwrap();
        let third = tree.add_feed(folder, "http://three.example/rss", &StubFetcher).await.unwrap();

        let removed = tree.remove_feed(folder, second).unwrap();
        assert_eq!(removed.url, "http://two.example/rss");

        let remaining: Vec<_> = tree.folder(folder).unwrap().feeds.iter().map(|f| f.id).collect();
        assert_eq!(remaining, vec![first, third]);
        assert_eq!(store.save_count(), 4);
    }

    #[tokio::test]
    async fn test_remove_feed_from_wrong_folder_is_not_found() {
        let (mut tree, store) = empty_tree();
        let default = default_folder(&tree);
        let tech = tree.add_folder("Tech").unwrap();
        let feed = tree.add_feed(default, "http://one.example/rss", &StubFetcher).await.unwrap();

        assert!(matches!(tree.remove_feed(tech, feed), Err(ArborError::NotFound(_))));
        assert_eq!(tree.folder(default).unwrap().feeds.len(), 1);
        assert_eq!(store.save_count(), 2);
    }

    #[test]
    fn test_save_failure_keeps_mutation_and_marks_dirty() {
        let (mut tree, store) = empty_tree();
        store.set_fail_writes(true);

        let result = tree.add_folder("Tech");
        assert!(result.as_ref().is_err_and(|e| e.is_unsaved()));
        assert_eq!(folder_names(&tree), vec!["Default", "Tech"]);
        assert!(tree.is_dirty());

        store.set_fail_writes(false);
        assert_ok!(tree.add_folder("News"));
        assert!(!tree.is_dirty());
        assert!(store.contents().unwrap().contains("\"Tech\""));
    }

    #[tokio::test]
    async fn test_resolve_target_folder() {
        let (mut tree, _) = empty_tree();
        let default = default_folder(&tree);
        let tech = tree.add_folder("Tech").unwrap();
        let feed = tree.add_feed(tech, "http://one.example/rss", &StubFetcher).await.unwrap();

        assert_eq!(tree.resolve_target_folder(None).unwrap(), default);
        assert_eq!(tree.resolve_target_folder(Some(&NodeRef::Folder(tech))).unwrap(), tech);
        assert_eq!(
            tree.resolve_target_folder(Some(&NodeRef::Feed { folder: tech, feed })).unwrap(),
            tech
        );
        assert_eq!(
            tree.resolve_target_folder(Some(&NodeRef::Item { feed, index: 0 })).unwrap(),
            tech
        );
        // Stale selections fall back to the first folder.
        assert_eq!(
            tree.resolve_target_folder(Some(&NodeRef::Folder(FolderId::new()))).unwrap(),
            default
        );
    }
}
