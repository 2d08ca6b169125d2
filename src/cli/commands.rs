use crate::app::{AppContext, ArborError, Result};
use crate::domain::FolderId;
use crate::tree::TreeState;

fn folder_named(tree: &TreeState, name: &str) -> Result<FolderId> {
    tree.collection()
        .folder_by_name(name.trim())
        .map(|f| f.id)
        .ok_or_else(|| ArborError::NotFound(format!("folder {}", name)))
}

pub fn list(tree: &TreeState) {
    for folder in tree.folders() {
        println!("{} ({})", folder.name, folder.feeds.len());
        for feed in &folder.feeds {
            println!("  {}  <{}>", feed.display_title(), feed.url);
        }
    }
}

pub async fn add_feed(
    ctx: &AppContext,
    tree: &mut TreeState,
    url: &str,
    folder: Option<&str>,
) -> Result<()> {
    let folder = match folder {
        Some(name) => folder_named(tree, name)?,
        None => tree.resolve_target_folder(None)?,
    };

    let id = tree.add_feed(folder, url, ctx.fetcher.as_ref()).await?;
    if let Some(feed) = tree.feed(id) {
        println!("Added feed: {} <{}>", feed.display_title(), feed.url);
    }
    Ok(())
}

pub fn remove_feed(tree: &mut TreeState, url: &str, folder: Option<&str>) -> Result<()> {
    let scope = folder.map(|name| folder_named(tree, name)).transpose()?;
    let url = url.trim();

    let found = tree
        .folders()
        .iter()
        .filter(|f| scope.map_or(true, |id| f.id == id))
        .find_map(|f| f.feeds.iter().find(|feed| feed.url == url).map(|feed| (f.id, feed.id)));
    let (folder, feed) = found.ok_or_else(|| ArborError::NotFound(format!("feed {}", url)))?;

    let removed = tree.remove_feed(folder, feed)?;
    println!("Feed '{}' removed.", removed.display_title());
    Ok(())
}

pub fn add_folder(tree: &mut TreeState, name: &str) -> Result<()> {
    tree.add_folder(name)?;
    println!("Added folder: {}", name.trim());
    Ok(())
}

pub fn rename_folder(tree: &mut TreeState, old: &str, new: &str) -> Result<()> {
    let folder = folder_named(tree, old)?;
    tree.rename_folder(folder, new)?;
    println!("Renamed folder {} to {}", old.trim(), new.trim());
    Ok(())
}
