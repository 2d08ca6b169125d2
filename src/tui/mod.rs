pub mod app;
pub mod event;
pub mod layout;

use std::io::{self, Stdout};
use std::time::Duration;

use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;

use crate::app::{AppContext, ArborError, Result};
use crate::config::Config;
use crate::tree::TreeState;

use self::app::TuiApp;
use self::event::{AppEvent, EventHandler};

type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Run the interactive tree until the user quits. `warning` is shown in the
/// status bar on the first frame.
pub async fn run(
    ctx: &AppContext,
    config: &Config,
    tree: TreeState,
    warning: Option<ArborError>,
) -> Result<()> {
    let mut terminal = setup_terminal()?;
    let result = run_app(&mut terminal, ctx, config, tree, warning).await;
    restore_terminal(&mut terminal)?;
    result
}

fn setup_terminal() -> Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Tui) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

async fn run_app(
    terminal: &mut Tui,
    ctx: &AppContext,
    config: &Config,
    tree: TreeState,
    warning: Option<ArborError>,
) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut tui_app = TuiApp::new(
        tree,
        ctx.fetcher.clone(),
        tx,
        config.keybindings.clone(),
        config.general.status_timeout(),
    );
    if let Some(warning) = warning {
        tui_app.set_status(format!("{}; starting with an empty tree", warning));
    }

    let event_handler = EventHandler::new(Duration::from_millis(100));

    loop {
        terminal.draw(|frame| layout::render(frame, &mut tui_app))?;

        // Polling blocks this worker for up to one tick; fetch tasks keep
        // running on the other runtime threads.
        if let AppEvent::Key(key) = event_handler.next()? {
            tui_app.handle_key(key);
        }

        while let Ok(task_event) = rx.try_recv() {
            tui_app.handle_task_event(task_event);
        }

        tui_app.clear_expired_status();

        if tui_app.should_quit {
            break;
        }
    }

    if tui_app.tree.is_dirty() {
        tracing::warn!("exiting with unsaved changes");
    }

    Ok(())
}
