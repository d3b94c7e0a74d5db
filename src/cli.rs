use std::path::PathBuf;

use clap::Parser;

/// Single-screen task list for the terminal.
/// Storage defaults to ~/.tasklist/tasks.json or a path passed via --db.
#[derive(Parser)]
#[command(name = "tasklist", version, about = "Minimal task list TUI")]
pub struct Cli {
    /// Path to the JSON database file.
    #[arg(long)]
    pub db: Option<PathBuf>,
}
