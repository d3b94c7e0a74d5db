//! # tasklist - Single-screen task list TUI
//!
//! A minimal to-do list for the terminal: one screen, one list.
//!
//! ## Key Features
//!
//! - **One-key workflow**: `a` adds a task, `Enter` renames the selected one,
//!   `d` deletes it
//! - **Modal prompts**: add and edit share a single-field popup that discards
//!   blank input silently
//! - **Local File Storage**: tasks live in a single JSON file, written
//!   atomically on every confirmed change
//!
//! ## Quick Start
//!
//! ```bash
//! # Launch with the default database (~/.tasklist/tasks.json)
//! tasklist
//!
//! # Or point it at a specific file
//! tasklist --db ./tasks.json
//! ```
//!
//! Failures never interrupt the screen: a database that fails to load leaves
//! the list empty, and a failed write is logged (see `RUST_LOG`) while the
//! rows keep showing what you did.

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

pub mod cli;
pub mod prompt;
pub mod storage;
pub mod task;
pub mod tui {
    pub mod app;
    pub mod colors;
    pub mod input;
    pub mod run;
    pub mod utils;
}

use cli::Cli;

fn main() {
    install_tracing();
    let cli = Cli::parse();

    let db_path = cli.db.unwrap_or_else(|| {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        let data_dir = PathBuf::from(home).join(".tasklist");
        if let Err(e) = std::fs::create_dir_all(&data_dir) {
            eprintln!("Failed to create data directory {}: {}", data_dir.display(), e);
            std::process::exit(1);
        }
        data_dir.join("tasks.json")
    });

    if let Err(e) = tui::run::run_tui(&db_path) {
        eprintln!("UI error: {e}");
        std::process::exit(1);
    }
}

fn install_tracing() {
    let filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .try_init();
}
