use crate::domain::{FeedId, FolderId};
use crate::tree::{ExpansionController, NodeState, TreeState};

/// What a row of the tree points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeRef {
    Folder(FolderId),
    Feed { folder: FolderId, feed: FeedId },
    /// `index` into the feed's current items.
    Item { feed: FeedId, index: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    Folder { open: bool },
    Feed { state: NodeState },
    Item,
}

/// One visible line of the tree.
#[derive(Debug, Clone)]
pub struct Row {
    pub node: NodeRef,
    pub kind: RowKind,
    pub depth: usize,
    pub label: String,
}

/// Flatten the tree into the rows currently visible, top to bottom.
pub fn visible_rows(tree: &TreeState, expansion: &ExpansionController) -> Vec<Row> {
    let mut rows = Vec::new();

    for folder in tree.folders() {
        let open = expansion.is_folder_open(folder.id);
        rows.push(Row {
            node: NodeRef::Folder(folder.id),
            kind: RowKind::Folder { open },
            depth: 0,
            label: format!("{} ({})", folder.name, folder.feeds.len()),
        });
        if !open {
            continue;
        }

        for feed in &folder.feeds {
            let state = expansion.state(feed.id);
            rows.push(Row {
                node: NodeRef::Feed {
                    folder: folder.id,
                    feed: feed.id,
                },
                kind: RowKind::Feed { state },
                depth: 1,
                label: feed.display_title().to_string(),
            });
            if state != NodeState::Expanded {
                continue;
            }

            rows.extend(feed.items.iter().enumerate().map(|(index, item)| Row {
                node: NodeRef::Item {
                    feed: feed.id,
                    index,
                },
                kind: RowKind::Item,
                depth: 2,
                label: item.display_title().to_string(),
            }));
        }
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FetchedFeed, Item};
    use crate::store::MemoryStore;
    use crate::tree::Toggle;

    fn fetched(count: usize) -> FetchedFeed {
        FetchedFeed {
            title: "Example Feed".into(),
            items: (0..count)
                .map(|n| {
                    let mut item = Item::new("http://example.com/rss", &n.to_string());
                    item.title = Some(format!("Item {}", n));
                    item
                })
                .collect(),
        }
    }

    #[test]
    fn test_rows_follow_expansion() {
        let (mut tree, _) = TreeState::open(Box::new(MemoryStore::new())).unwrap();
        let folder = tree.folders()[0].id;
        let feed = tree.commit_feed(folder, "http://example.com/rss", fetched(0)).unwrap();
        let mut expansion = ExpansionController::new();

        let rows = visible_rows(&tree, &expansion);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].label, "Default (1)");
        assert_eq!(rows[0].kind, RowKind::Folder { open: false });

        expansion.toggle_folder(&mut tree, folder).unwrap();
        let rows = visible_rows(&tree, &expansion);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].node, NodeRef::Feed { folder, feed });

        let generation = match expansion.toggle_feed(&mut tree, feed).unwrap() {
            Toggle::Fetch { generation, .. } => generation,
            other => panic!("unexpected {:?}", other),
        };
        let rows = visible_rows(&tree, &expansion);
        assert!(matches!(rows[1].kind, RowKind::Feed { state: NodeState::Loading { .. } }));
        assert_eq!(rows.len(), 2);

        expansion.complete(&mut tree, feed, generation, Ok(fetched(3)));
        let rows = visible_rows(&tree, &expansion);
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[4].node, NodeRef::Item { feed, index: 2 });
        assert_eq!(rows[4].label, "Item 2");
        assert_eq!(rows[4].depth, 2);
    }
}
