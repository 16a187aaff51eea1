use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;

/// File-backed task cue for the terminal.
/// Storage defaults to ~/.cue or a directory passed via --data-dir.
#[derive(Parser)]
#[command(name = "cue", version, about = "Bucketed tasks with an urgency-ranked daily cue")]
pub struct Cli {
    /// Directory holding the JSON collections.
    #[arg(long, global = true, env = "CUE_DIR")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}
