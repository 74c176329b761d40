use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use shared::domain::Todo;
use storage::{SqliteStorage, Storage, TODOS_TABLE};

#[derive(Parser, Debug)]
struct Cli {
    #[arg(long, default_value = "sqlite://./data/todos.db")]
    database_url: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replace the todo table with the records in a JSON file.
    Seed { file: PathBuf },
    /// Print every stored todo.
    List,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let storage = SqliteStorage::connect(&cli.database_url)
        .await
        .with_context(|| format!("failed to open {}", cli.database_url))?;

    match cli.command {
        Command::Seed { file } => {
            let raw = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("failed to read {}", file.display()))?;
            let records: Vec<Todo> = serde_json::from_str(&raw)?;
            let count = records.len();
            storage.seed(TODOS_TABLE, records).await?;
            println!("seeded {count} todos");
        }
        Command::List => {
            for todo in storage.get(TODOS_TABLE).await? {
                println!("{}\t{}\t{}", todo.id, todo.status, todo.task);
            }
        }
    }

    Ok(())
}
