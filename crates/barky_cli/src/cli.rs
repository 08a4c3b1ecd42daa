use barky_core::db::DEFAULT_DB_FILE_NAME;
use barky_core::BookmarkId;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub const DB_PATH_ENV: &str = "BARKY_DB_PATH";
pub const LOG_LEVEL_ENV: &str = "BARKY_LOG_LEVEL";
pub const LOG_DIR_ENV: &str = "BARKY_LOG_DIR";

#[derive(Debug, Parser)]
#[command(name = "barky", version, about = "Minimal bookmark manager")]
pub struct Cli {
    /// SQLite database file; created on first use.
    #[arg(long, global = true, env = DB_PATH_ENV, default_value = DEFAULT_DB_FILE_NAME)]
    pub db: PathBuf,

    /// Print records as JSON instead of plain text.
    #[arg(long, global = true)]
    pub json: bool,

    /// trace|debug|info|warn|error. Defaults to `warn` on stderr, build mode otherwise.
    #[arg(long, global = true, env = LOG_LEVEL_ENV)]
    pub log_level: Option<String>,

    /// Absolute directory for rolling log files. Logs go to stderr when unset.
    #[arg(long, global = true, env = LOG_DIR_ENV)]
    pub log_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand, PartialEq, Eq)]
pub enum Command {
    /// Store a new bookmark.
    Add {
        title: String,
        url: String,
        #[arg(long, short = 'd')]
        description: Option<String>,
    },
    /// Show one bookmark.
    Show { id: BookmarkId },
    /// Replace title, url and description of a bookmark.
    Edit {
        id: BookmarkId,
        title: String,
        url: String,
        #[arg(long, short = 'd')]
        description: Option<String>,
    },
    /// Remove a bookmark.
    Delete { id: BookmarkId },
    /// List all bookmarks.
    List,
    /// List bookmarks whose title contains the given text.
    Search {
        #[arg(default_value = "")]
        criteria: String,
    },
}

impl Command {
    /// Subcommand name, used as the `command=` log field.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Add { .. } => "add",
            Self::Show { .. } => "show",
            Self::Edit { .. } => "edit",
            Self::Delete { .. } => "delete",
            Self::List => "list",
            Self::Search { .. } => "search",
        }
    }
}
