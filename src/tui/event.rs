use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use std::time::Duration;

use crate::app::Result;
use crate::domain::{FeedId, FetchedFeed, FolderId};

pub enum AppEvent {
    Key(KeyEvent),
    Tick,
}

pub struct EventHandler {
    tick_rate: Duration,
}

impl EventHandler {
    pub fn new(tick_rate: Duration) -> Self {
        Self { tick_rate }
    }

    /// Wait up to one tick for a key press.
    pub fn next(&self) -> Result<AppEvent> {
        if event::poll(self.tick_rate)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    return Ok(AppEvent::Key(key));
                }
            }
        }
        Ok(AppEvent::Tick)
    }
}

/// Results posted back to the event loop by background fetch tasks.
#[derive(Debug)]
pub enum TaskEvent {
    /// Items for an expanded feed node.
    FeedLoaded {
        feed: FeedId,
        generation: u64,
        result: Result<FetchedFeed>,
    },
    /// Document for a feed the user asked to add.
    FeedFetched {
        folder: FolderId,
        url: String,
        result: Result<FetchedFeed>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    MoveUp,
    MoveDown,
    PageUp,
    PageDown,
    ScrollTop,
    ScrollBottom,
    NextPane,
    Select,
    AddFeed,
    AddFolder,
    RenameFolder,
    RemoveFeed,
    OpenInBrowser,
    Help,
    None,
}
