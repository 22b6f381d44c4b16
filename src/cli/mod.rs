//! CLI definitions using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;

/// NoteChat - semantic retrieval over your Joplin notes
#[derive(Parser, Debug)]
#[command(name = "notechat", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Data directory holding config.json and the index snapshot (default: ~/.notechat)
    #[arg(long, global = true, env = "NOTECHAT_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (no output except errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load the index snapshot, or build the index from all notes
    Reindex {
        /// Ignore the snapshot and re-embed every note
        #[arg(long)]
        force: bool,
    },

    /// Prune deleted notes and re-embed new or changed ones
    Sync,

    /// Index or re-index a single note
    Upsert {
        /// Joplin note ID
        id: String,
    },

    /// Find the notes most relevant to a question
    Query {
        /// Natural-language query
        text: String,

        /// Number of results
        #[arg(short = 'k', long = "top", default_value_t = 5)]
        k: usize,
    },

    /// Delete the index snapshot
    Clear,

    /// Show provider, corpus and index status
    Status,

    /// Print version information
    Version,
}
