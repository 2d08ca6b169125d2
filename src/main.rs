use clap::Parser;

use arbor::app::{close_logger, init_logger, AppContext};
use arbor::cli::{commands, Cli, Commands, FolderAction};
use arbor::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    let log = init_logger(&config.general.log_path)?;
    tracing::info!("arbor {} starting", env!("CARGO_PKG_VERSION"));

    let store_path = cli.store.unwrap_or_else(|| config.general.store_path.clone());
    let ctx = AppContext::new(store_path)?;
    let (mut tree, warning) = ctx.open_tree()?;

    let command = cli.command.unwrap_or(Commands::Tui);
    if let Some(warning) = warning.as_ref().filter(|_| !matches!(command, Commands::Tui)) {
        eprintln!("warning: {}", warning);
    }

    let result = match command {
        Commands::Tui => arbor::tui::run(&ctx, &config, tree, warning).await,
        Commands::List => {
            commands::list(&tree);
            Ok(())
        }
        Commands::Add { url, folder } => {
            commands::add_feed(&ctx, &mut tree, &url, folder.as_deref()).await
        }
        Commands::Remove { url, folder } => {
            commands::remove_feed(&mut tree, &url, folder.as_deref())
        }
        Commands::Folder { action } => match action {
            FolderAction::Add { name } => commands::add_folder(&mut tree, &name),
            FolderAction::Rename { old, new } => commands::rename_folder(&mut tree, &old, &new),
        },
    };

    if let Err(e) = &result {
        tracing::error!("{}", e);
    }
    close_logger(log);

    Ok(result?)
}
