use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::widgets::ListState;
use tokio::sync::mpsc::UnboundedSender;

use crate::app::ArborError;
use crate::config::KeybindingConfig;
use crate::domain::{FeedId, FetchedFeed, FolderId, Item};
use crate::fetcher::FeedFetcher;
use crate::tree::{visible_rows, Completion, ExpansionController, NodeRef, Row, Toggle, TreeState};
use crate::tui::event::{Action, TaskEvent};

pub const DEFAULT_STATUS: &str =
    "?: help | q: quit | Tab: switch focus | j/k: navigate | a: add feed | A: add folder";

pub const PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivePane {
    Tree,
    Preview,
}

impl ActivePane {
    pub fn next(self) -> Self {
        match self {
            ActivePane::Tree => ActivePane::Preview,
            ActivePane::Preview => ActivePane::Tree,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputPurpose {
    AddFeed { folder: FolderId },
    AddFolder,
    RenameFolder { folder: FolderId },
}

impl InputPurpose {
    pub fn prompt(&self) -> &'static str {
        match self {
            InputPurpose::AddFeed { .. } => "Feed URL",
            InputPurpose::AddFolder => "New folder name",
            InputPurpose::RenameFolder { .. } => "Rename folder to",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Normal,
    Input { purpose: InputPurpose, buffer: String },
    ConfirmRemove { folder: FolderId, feed: FeedId, title: String },
    Help,
}

/// The item currently shown in the preview pane. Copied out of the tree so
/// it survives the feed being collapsed.
#[derive(Debug, Clone)]
pub struct Preview {
    pub feed: FeedId,
    pub title: String,
    pub published: Option<String>,
    pub link: Option<String>,
    pub body: String,
}

impl Preview {
    fn from_item(feed: FeedId, item: &Item) -> Self {
        Self {
            feed,
            title: item.display_title().to_string(),
            published: item.display_date(),
            link: item.link.clone(),
            body: item.display_content().to_string(),
        }
    }
}

struct Status {
    text: String,
    expires_at: Instant,
}

/// All UI state. Owned by the event loop, which is the only code that mutates
/// the tree; background fetches report back through `tasks`.
pub struct TuiApp {
    pub tree: TreeState,
    pub expansion: ExpansionController,
    pub rows: Vec<Row>,
    pub selected: usize,
    pub list_state: ListState,
    pub active_pane: ActivePane,
    pub mode: Mode,
    pub preview: Option<Preview>,
    pub preview_scroll: u16,
    pub should_quit: bool,
    status: Option<Status>,
    status_timeout: Duration,
    keybindings: KeybindingConfig,
    fetcher: Arc<dyn FeedFetcher + Send + Sync>,
    tasks: UnboundedSender<TaskEvent>,
}

impl TuiApp {
    pub fn new(
        tree: TreeState,
        fetcher: Arc<dyn FeedFetcher + Send + Sync>,
        tasks: UnboundedSender<TaskEvent>,
        keybindings: KeybindingConfig,
        status_timeout: Duration,
    ) -> Self {
        let mut app = Self {
            tree,
            expansion: ExpansionController::new(),
            rows: Vec::new(),
            selected: 0,
            list_state: ListState::default(),
            active_pane: ActivePane::Tree,
            mode: Mode::Normal,
            preview: None,
            preview_scroll: 0,
            should_quit: false,
            status: None,
            status_timeout,
            keybindings,
            fetcher,
            tasks,
        };
        app.refresh_rows();
        app
    }

    pub fn keybindings(&self) -> &KeybindingConfig {
        &self.keybindings
    }

    pub fn selected_node(&self) -> Option<NodeRef> {
        self.rows.get(self.selected).map(|row| row.node)
    }

    pub fn status_text(&self) -> &str {
        self.status
            .as_ref()
            .map(|s| s.text.as_str())
            .unwrap_or(DEFAULT_STATUS)
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status = Some(Status {
            text: message.into(),
            expires_at: Instant::now() + self.status_timeout,
        });
    }

    /// Drop the status message once its time is up. Returns true if it was
    /// cleared.
    pub fn clear_expired_status(&mut self) -> bool {
        match &self.status {
            Some(status) if Instant::now() >= status.expires_at => {
                self.status = None;
                true
            }
            _ => false,
        }
    }

    /// Surface an error, noting when it left unsaved changes behind.
    fn report(&mut self, context: &str, err: ArborError) {
        if err.is_unsaved() {
            self.set_status(format!("{} (changes not saved: {})", context, err));
        } else {
            self.set_status(format!("{}: {}", context, err));
        }
    }

    /// Rebuild the visible rows, keeping the selection on the same node when it
    /// is still visible.
    pub fn refresh_rows(&mut self) {
        let previous = self.selected_node();
        self.rows = visible_rows(&self.tree, &self.expansion);

        let kept = previous.and_then(|node| self.rows.iter().position(|r| r.node == node));
        if let Some(index) = kept {
            self.selected = index;
        }
        if self.selected >= self.rows.len() {
            self.selected = self.rows.len().saturating_sub(1);
        }
        self.list_state.select(if self.rows.is_empty() {
            None
        } else {
            Some(self.selected)
        });
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        match std::mem::replace(&mut self.mode, Mode::Normal) {
            Mode::Normal => {
                let action = self.keybindings.get_action(&key);
                self.handle_action(action);
            }
            Mode::Help => {}
            Mode::ConfirmRemove { folder, feed, title } => match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => self.remove_feed(folder, feed, &title),
                _ => self.set_status("Removal cancelled"),
            },
            Mode::Input { purpose, mut buffer } => match key.code {
                KeyCode::Esc => {}
                KeyCode::Enter => self.submit_input(purpose, buffer),
                KeyCode::Backspace => {
                    buffer.pop();
                    self.mode = Mode::Input { purpose, buffer };
                }
                KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    self.mode = Mode::Input {
                        purpose,
                        buffer: String::new(),
                    };
                }
                KeyCode::Char(c) => {
                    buffer.push(c);
                    self.mode = Mode::Input { purpose, buffer };
                }
                _ => self.mode = Mode::Input { purpose, buffer },
            },
        }
    }

    pub fn handle_action(&mut self, action: Action) {
        match action {
            Action::Quit => self.should_quit = true,
            Action::MoveUp => self.move_by(-1),
            Action::MoveDown => self.move_by(1),
            Action::PageUp => self.move_by(-(PAGE_SIZE as isize)),
            Action::PageDown => self.move_by(PAGE_SIZE as isize),
            Action::ScrollTop => self.move_to_edge(false),
            Action::ScrollBottom => self.move_to_edge(true),
            Action::NextPane => self.active_pane = self.active_pane.next(),
            Action::Select => self.select(),
            Action::AddFeed => self.begin_add_feed(),
            Action::AddFolder => {
                self.mode = Mode::Input {
                    purpose: InputPurpose::AddFolder,
                    buffer: String::new(),
                }
            }
            Action::RenameFolder => self.begin_rename_folder(),
            Action::RemoveFeed => self.begin_remove_feed(),
            Action::OpenInBrowser => self.open_in_browser(),
            Action::Help => self.mode = Mode::Help,
            Action::None => {}
        }
    }

    fn move_by(&mut self, delta: isize) {
        match self.active_pane {
            ActivePane::Tree => {
                if self.rows.is_empty() {
                    return;
                }
                let last = self.rows.len() - 1;
                self.selected = self.selected.saturating_add_signed(delta).min(last);
                self.list_state.select(Some(self.selected));
            }
            ActivePane::Preview => {
                let step = delta.unsigned_abs().min(u16::MAX as usize) as u16;
                self.preview_scroll = if delta < 0 {
                    self.preview_scroll.saturating_sub(step)
                } else {
                    self.preview_scroll.saturating_add(step)
                };
            }
        }
    }

    fn move_to_edge(&mut self, bottom: bool) {
        match self.active_pane {
            ActivePane::Tree => {
                self.selected = if bottom { self.rows.len().saturating_sub(1) } else { 0 };
                self.list_state.select(Some(self.selected));
            }
            ActivePane::Preview => {
                self.preview_scroll = if bottom {
                    self.preview
                        .as_ref()
                        .map(|p| p.body.lines().count().min(u16::MAX as usize) as u16)
                        .unwrap_or(0)
                } else {
                    0
                };
            }
        }
    }

    fn select(&mut self) {
        let Some(node) = self.selected_node() else {
            return;
        };

        match node {
            NodeRef::Folder(folder) => {
                if let Err(e) = self.expansion.toggle_folder(&mut self.tree, folder) {
                    self.report("Cannot open folder", e);
                }
            }
            NodeRef::Feed { feed, .. } => match self.expansion.toggle_feed(&mut self.tree, feed) {
                Ok(Toggle::Fetch { url, generation }) => {
                    self.set_status(format!("loading {}...", url));
                    self.spawn_load(feed, url, generation);
                }
                Ok(Toggle::Collapsed) => {}
                Ok(Toggle::Ignored) => self.set_status("still loading, please wait"),
                Err(e) => self.report("Cannot expand feed", e),
            },
            NodeRef::Item { feed, index } => {
                if let Some(item) = self.tree.feed(feed).and_then(|f| f.items.get(index)) {
                    self.preview = Some(Preview::from_item(feed, item));
                    self.preview_scroll = 0;
                    self.active_pane = ActivePane::Preview;
                }
            }
        }

        self.refresh_rows();
    }

    fn begin_add_feed(&mut self) {
        match self.tree.resolve_target_folder(self.selected_node().as_ref()) {
            Ok(folder) => {
                self.mode = Mode::Input {
                    purpose: InputPurpose::AddFeed { folder },
                    buffer: String::new(),
                }
            }
            Err(e) => self.report("Cannot add feed", e),
        }
    }

    fn begin_rename_folder(&mut self) {
        let target = self
            .tree
            .resolve_target_folder(self.selected_node().as_ref())
            .ok()
            .and_then(|id| self.tree.folder(id));
        if let Some(folder) = target {
            self.mode = Mode::Input {
                purpose: InputPurpose::RenameFolder { folder: folder.id },
                buffer: folder.name.clone(),
            };
        }
    }

    fn begin_remove_feed(&mut self) {
        if let Some(NodeRef::Feed { folder, feed }) = self.selected_node() {
            if let Some(found) = self.tree.feed(feed) {
                self.mode = Mode::ConfirmRemove {
                    folder,
                    feed,
                    title: found.display_title().to_string(),
                };
            }
        } else {
            self.set_status("Select a feed to remove");
        }
    }

    fn submit_input(&mut self, purpose: InputPurpose, buffer: String) {
        let value = buffer.trim();
        if value.is_empty() {
            return;
        }

        match purpose {
            InputPurpose::AddFeed { folder } => match self.tree.prepare_feed(folder, value) {
                Ok(url) => {
                    self.set_status(format!("fetching {}...", url));
                    self.spawn_add(folder, url);
                }
                Err(e) => self.report("Cannot add feed", e),
            },
            InputPurpose::AddFolder => match self.tree.add_folder(value) {
                Ok(_) => self.set_status(format!("Folder '{}' added", value)),
                Err(e) => self.report("Cannot add folder", e),
            },
            InputPurpose::RenameFolder { folder } => match self.tree.rename_folder(folder, value) {
                Ok(()) => self.set_status(format!("Folder renamed to '{}'", value)),
                Err(e) => self.report("Cannot rename folder", e),
            },
        }

        self.refresh_rows();
    }

    fn remove_feed(&mut self, folder: FolderId, feed: FeedId, title: &str) {
        match self.tree.remove_feed(folder, feed) {
            Ok(_) => self.set_status(format!("Feed '{}' removed.", title)),
            Err(e @ ArborError::NotFound(_)) => {
                self.report("Cannot remove feed", e);
                return;
            }
            Err(e) => self.report(&format!("Feed '{}' removed", title), e),
        }

        self.expansion.forget_feed(feed);
        if self.preview.as_ref().is_some_and(|p| p.feed == feed) {
            self.preview = None;
        }
        self.refresh_rows();
    }

    fn open_in_browser(&mut self) {
        let link = match self.selected_node() {
            Some(NodeRef::Item { feed, index }) => self
                .tree
                .feed(feed)
                .and_then(|f| f.items.get(index))
                .and_then(|item| item.link.clone()),
            _ => self.preview.as_ref().and_then(|p| p.link.clone()),
        };

        if let Some(link) = link {
            if let Err(e) = open::that(&link) {
                self.set_status(format!("Failed to open browser: {}", e));
            }
        }
    }

    fn spawn_load(&self, feed: FeedId, url: String, generation: u64) {
        let fetcher = self.fetcher.clone();
        let tasks = self.tasks.clone();
        tokio::spawn(async move {
            let result = fetcher.fetch(&url).await;
            let _ = tasks.send(TaskEvent::FeedLoaded {
                feed,
                generation,
                result,
            });
        });
    }

    fn spawn_add(&self, folder: FolderId, url: String) {
        let fetcher = self.fetcher.clone();
        let tasks = self.tasks.clone();
        tokio::spawn(async move {
            let result = fetcher.fetch(&url).await;
            let _ = tasks.send(TaskEvent::FeedFetched { folder, url, result });
        });
    }

    /// Apply a background result. Runs on the event loop only.
    pub fn handle_task_event(&mut self, event: TaskEvent) {
        match event {
            TaskEvent::FeedLoaded {
                feed,
                generation,
                result,
            } => match self.expansion.complete(&mut self.tree, feed, generation, result) {
                Completion::Loaded { count, title } => {
                    self.set_status(format!("loaded {} items for feed: {}", count, title));
                }
                Completion::Failed(e) => self.report("error fetching feed items", e),
                Completion::Stale => {}
            },
            TaskEvent::FeedFetched { folder, url, result } => self.finish_add(folder, url, result),
        }

        self.refresh_rows();
    }

    fn finish_add(
        &mut self,
        folder: FolderId,
        url: String,
        result: crate::app::Result<FetchedFeed>,
    ) {
        let fetched = match result {
            Ok(fetched) => fetched,
            Err(e) => {
                tracing::warn!("could not add {}: {}", url, e);
                self.report("error fetching feed", e);
                return;
            }
        };

        let count = fetched.items.len();
        let title = if fetched.title.is_empty() {
            url.clone()
        } else {
            fetched.title.clone()
        };

        match self.tree.commit_feed(folder, &url, fetched) {
            Ok(_) => {
                self.expansion.open_folder(folder);
                self.set_status(format!("added feed: {} ({} items)", title, count));
            }
            Err(e @ ArborError::Io(_)) => {
                self.expansion.open_folder(folder);
                self.report(&format!("added feed: {}", title), e);
            }
            Err(e) => self.report("Cannot add feed", e),
        }
    }
}
