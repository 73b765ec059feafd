//! Frontis CLI entry point.
//!
//! Binary name: `frontis`
//!
//! Parses CLI arguments, loads configuration from the data directory,
//! initializes logging and the chosen collaborators (SQLite or the
//! in-memory demo fixtures), then dispatches to the command handler.

mod chat;
mod cli;
mod demo;
mod render;

use std::path::PathBuf;

use clap::Parser;

use frontis_core::clock::SystemClock;
use frontis_core::engine::DialogEngine;
use frontis_infra::config::{load_config, resolve_database_url};
use frontis_infra::memory::InMemoryConversationStore;
use frontis_infra::sqlite::{DatabasePool, SqliteConversationStore, SqliteDomainRepository};
use frontis_types::domain::{ConversationId, StudentId};

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let data_dir = data_dir(&cli);

    let config = load_config(&data_dir).await;
    frontis_observe::tracing_setup::init_tracing(&config.log_filter, cli.json_logs)
        .map_err(|e| anyhow::anyhow!("failed to initialize logging: {e}"))?;

    match cli.command {
        Commands::Chat {
            student,
            conversation,
            demo,
        } => {
            let student = StudentId(student.unwrap_or_else(uuid::Uuid::now_v7));
            let conversation = ConversationId(conversation.unwrap_or_else(uuid::Uuid::now_v7));

            if demo {
                let engine = DialogEngine::new(
                    demo::demo_repository(student),
                    InMemoryConversationStore::new(),
                    SystemClock,
                );
                chat::run(engine, conversation, student).await
            } else {
                let pool = open_pool(&data_dir).await?;
                let engine = DialogEngine::new(
                    SqliteDomainRepository::new(pool.clone()),
                    SqliteConversationStore::new(pool),
                    SystemClock,
                );
                chat::run(engine, conversation, student).await
            }
        }

        Commands::Migrate => {
            let pool = open_pool(&data_dir).await?;
            drop(pool);
            println!("database is up to date");
            Ok(())
        }
    }
}

fn data_dir(cli: &Cli) -> PathBuf {
    cli.data_dir.clone().unwrap_or_else(|| {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(".frontis")
    })
}

/// Ensure the data directory exists, then open (and migrate) the
/// database.
async fn open_pool(data_dir: &PathBuf) -> anyhow::Result<DatabasePool> {
    tokio::fs::create_dir_all(data_dir).await?;
    let config = load_config(data_dir).await;
    let url = resolve_database_url(&config, data_dir);
    tracing::debug!(url = %url, "opening database");
    Ok(DatabasePool::new(&url).await?)
}
