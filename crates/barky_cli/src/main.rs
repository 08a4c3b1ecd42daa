//! Command-line front end for the bookmark service.
//!
//! # Responsibility
//! - Resolve flags/env into core configuration.
//! - Call exactly one service operation per invocation and render the result.
//! - Turn missing ids into a non-zero exit without changing core semantics.

mod cli;

use anyhow::{Context, Result};
use barky_core::db::open_db;
use barky_core::{
    default_log_level, init_logging, Bookmark, BookmarkId, BookmarkService, LogTarget,
    SqliteUnitOfWork, UnitOfWork,
};
use clap::Parser;
use cli::{Cli, Command};
use log::info;
use std::process::ExitCode;

const STDERR_LOG_LEVEL: &str = "warn";

/// Result of one command, before it becomes a process exit status.
#[derive(Debug, PartialEq, Eq)]
enum Outcome {
    Done,
    NotFound(BookmarkId),
}

impl Outcome {
    fn exit_status(&self) -> u8 {
        match self {
            Self::Done => 0,
            Self::NotFound(_) => 1,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    // stderr is shared with command output; keep it quiet unless asked.
    let (target, fallback_level) = match cli.log_dir {
        Some(dir) => (LogTarget::Directory(dir), default_log_level()),
        None => (LogTarget::Stderr, STDERR_LOG_LEVEL),
    };
    let level = cli.log_level.as_deref().unwrap_or(fallback_level);
    init_logging(level, target).context("failed to initialize logging")?;

    let command_name = cli.command.name();
    info!("event=cli_command module=cli status=start command={command_name}");

    let conn = open_db(&cli.db)
        .with_context(|| format!("failed to open database `{}`", cli.db.display()))?;
    let unit_of_work = SqliteUnitOfWork::try_new(conn).context("database is not ready")?;
    let mut service = BookmarkService::new(unit_of_work);

    let outcome = execute(&mut service, cli.command, cli.json)?;
    if let Outcome::NotFound(id) = outcome {
        info!("event=cli_command module=cli status=not_found command={command_name} id={id}");
        eprintln!("bookmark not found: {id}");
    } else {
        info!("event=cli_command module=cli status=ok command={command_name}");
    }
    Ok(ExitCode::from(outcome.exit_status()))
}

/// Runs one command against the service and prints its result to stdout.
fn execute<U: UnitOfWork>(
    service: &mut BookmarkService<U>,
    command: Command,
    json: bool,
) -> Result<Outcome> {
    match command {
        Command::Add {
            title,
            url,
            description,
        } => {
            let created = service.add_bookmark(title, url, description)?;
            print_one(&created, json)?;
        }
        Command::Show { id } => match service.get_bookmark(id)? {
            Some(bookmark) => print_one(&bookmark, json)?,
            None => return Ok(Outcome::NotFound(id)),
        },
        Command::Edit {
            id,
            title,
            url,
            description,
        } => match service.edit_bookmark(id, title, url, description)? {
            Some(bookmark) => print_one(&bookmark, json)?,
            None => return Ok(Outcome::NotFound(id)),
        },
        Command::Delete { id } => {
            if !service.delete_bookmark(id)? {
                return Ok(Outcome::NotFound(id));
            }
            println!("deleted {id}");
        }
        Command::List => print_many(&service.list_bookmarks()?, json)?,
        Command::Search { criteria } => print_many(&service.search_bookmarks(&criteria)?, json)?,
    }

    Ok(Outcome::Done)
}

fn print_one(bookmark: &Bookmark, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(bookmark)?);
    } else {
        println!("{}", render_line(bookmark));
    }
    Ok(())
}

fn print_many(bookmarks: &[Bookmark], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(bookmarks)?);
        return Ok(());
    }
    for bookmark in bookmarks {
        println!("{}", render_line(bookmark));
    }
    Ok(())
}

fn render_line(bookmark: &Bookmark) -> String {
    match bookmark.description.as_deref() {
        Some(description) if !description.is_empty() => format!(
            "{}\t{}\t{}\t{}",
            bookmark.id, bookmark.title, bookmark.url, description
        ),
        _ => format!("{}\t{}\t{}", bookmark.id, bookmark.title, bookmark.url),
    }
}
