use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{Controller, Intent, Outcome};
use server_api::TodoOrchestration;
use shared::domain::Todo;
use storage::{MemoryStorage, SqliteStorage, Storage, TODOS_TABLE};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

mod command;
mod view;

use command::Command;

#[derive(Parser, Debug)]
#[command(about = "Terminal front end for the todo board")]
struct Args {
    /// Keep todos in this SQLite database instead of in memory.
    #[arg(long)]
    database_url: Option<String>,
    /// JSON list of todos loaded before the session starts.
    #[arg(long)]
    seed: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let storage = open_storage(&args).await?;
    let mut controller = Controller::load(TodoOrchestration::new(storage))
        .await
        .context("failed to load todos")?;
    let mut changes = controller.subscribe();

    print!("{}", view::render(controller.state()));
    println!("type 'help' for commands");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = match command::parse(&line, controller.state()) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(err) => {
                println!("  {err}");
                continue;
            }
        };

        match command {
            Command::Quit => break,
            Command::Help => print!("{}", view::HELP),
            Command::List => {
                controller.dispatch(Intent::Refresh).await;
                // Always show the list, even when the refresh changed nothing.
                drop(changes.borrow_and_update());
                print!("{}", view::render(controller.state()));
            }
            Command::Intent(intent) => {
                if controller.dispatch(intent).await == Outcome::Unchanged {
                    println!("  nothing to do");
                }
            }
        }

        if changes.has_changed()? {
            print!("{}", view::render(&changes.borrow_and_update()));
        }
    }

    Ok(())
}

async fn open_storage(args: &Args) -> Result<Arc<dyn Storage>> {
    let seed = match &args.seed {
        Some(path) => {
            let raw = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("failed to read seed file {}", path.display()))?;
            let records: Vec<Todo> = serde_json::from_str(&raw)
                .with_context(|| format!("seed file {} is not a JSON list of todos", path.display()))?;
            Some(records)
        }
        None => None,
    };

    match &args.database_url {
        Some(database_url) => {
            let sqlite = SqliteStorage::connect(database_url).await?;
            tracing::info!(%database_url, "using sqlite storage");
            if let Some(records) = seed {
                sqlite.seed(TODOS_TABLE, records).await?;
            }
            Ok(Arc::new(sqlite))
        }
        None => Ok(Arc::new(MemoryStorage::seeded(
            TODOS_TABLE,
            seed.unwrap_or_default(),
        )?)),
    }
}
