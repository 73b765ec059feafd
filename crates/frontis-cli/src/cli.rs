//! CLI argument definitions for the `frontis` binary.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use uuid::Uuid;

/// Homework chat engine for the tutoring school.
#[derive(Parser)]
#[command(name = "frontis", version, about, long_about = None)]
pub struct Cli {
    /// Data directory holding config.toml and the database.
    #[arg(long, env = "FRONTIS_DATA_DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Emit logs as line-delimited JSON.
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Interactive chat session over the homework flow.
    Chat {
        /// Student identity; a fresh one is generated when omitted.
        #[arg(long)]
        student: Option<Uuid>,

        /// Conversation to resume; a new one is started when omitted.
        #[arg(long)]
        conversation: Option<Uuid>,

        /// Use in-memory fixture data instead of the database.
        #[arg(long)]
        demo: bool,
    },

    /// Open the database and apply pending migrations.
    Migrate,
}
