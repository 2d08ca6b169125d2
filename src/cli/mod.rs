pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "arbor")]
#[command(about = "A terminal feed reader organised as a folder tree", long_about = None)]
pub struct Cli {
    /// Store file holding folders and feeds (overrides the config file)
    #[arg(short, long, global = true)]
    pub store: Option<PathBuf>,

    /// Config file to read instead of ~/.config/arbor/config.toml
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Launch the TUI (default)
    Tui,
    /// Print folders and their feeds
    List,
    /// Fetch a feed and add it to a folder
    Add {
        /// URL of the feed to add
        url: String,
        /// Target folder, defaults to the first one
        #[arg(short, long)]
        folder: Option<String>,
    },
    /// Remove a feed
    Remove {
        /// URL of the feed to remove
        url: String,
        /// Only look in this folder
        #[arg(short, long)]
        folder: Option<String>,
    },
    /// Manage folders
    Folder {
        #[command(subcommand)]
        action: FolderAction,
    },
}

#[derive(Subcommand)]
pub enum FolderAction {
    /// Create an empty folder
    Add { name: String },
    /// Rename a folder
    Rename { old: String, new: String },
}
