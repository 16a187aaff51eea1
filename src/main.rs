//! # cue - bucketed tasks with an urgency-ranked daily view
//!
//! A file-backed task manager for the terminal. Tasks live in user-defined
//! buckets, carry tag lists and an optional recurrence, and surface in the
//! *cue*: the ranked list of everything due today, most urgent first.
//!
//! ## Key Features
//!
//! - **Buckets**: user-defined categories; deleting one removes its tasks too
//! - **Tag-driven ranking**: each tag carries an urgency weight (1-10); a
//!   task's score is the average over its tags
//! - **Recurrence**: one-time, daily, weekly, or monthly tasks with
//!   per-frequency due windows
//! - **Multiple interfaces**: full CLI for automation + interactive TUI
//! - **Local file storage**: JSON collections under `~/.cue`, one file per
//!   collection, safe to back up or source control
//! - **Daily reminder**: `cue notify` composes the morning summary for
//!   whatever scheduler wraps the binary
//!
//! ## Quick Start
//!
//! ```bash
//! # Launch the interactive cue
//! cue ui
//!
//! # Create a bucket and a task
//! cue bucket add "Home"
//! cue add "Water plants" --bucket home --tag "Low Priority" --every weekly --on tomorrow
//!
//! # See what's due, most urgent first
//! cue cue
//!
//! # Morning summary (for cron or a notification daemon)
//! cue notify
//! ```
//!
//! Logging is opt-in via `RUST_LOG` (e.g. `RUST_LOG=cue=debug`); all storage
//! and lookup anomalies degrade silently by design, so logs are the only
//! place they show up.

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub mod bucket;
pub mod cli;
pub mod cmd;
pub mod cue;
pub mod fields;
pub mod notify;
pub mod settings;
pub mod store;
pub mod tag;
pub mod task;
pub mod tui {
    pub mod app;
    pub mod colors;
    pub mod run;
}

use cli::Cli;
use cmd::*;
use store::{BucketStore, Storage, TagStore, TaskStore};

fn main() {
    // Tracing is opt-in via RUST_LOG; invalid filters fall back to off.
    let filter = std::env::var("RUST_LOG")
        .ok()
        .and_then(|raw| EnvFilter::try_new(raw.trim()).ok())
        .unwrap_or_else(|| EnvFilter::new("off"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let cli = Cli::parse();

    let data_dir = cli.data_dir.unwrap_or_else(|| {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(".cue")
    });
    if let Err(e) = std::fs::create_dir_all(&data_dir) {
        eprintln!("Failed to create data directory {}: {}", data_dir.display(), e);
        std::process::exit(1);
    }

    let storage = Storage::new(&data_dir);

    // Collections are loaded once here and held in memory; every mutating
    // command persists the full collection before returning.
    let mut tasks = TaskStore::load(&storage);
    let mut tags = TagStore::load(&storage);
    let mut buckets = BucketStore::load(&storage);

    match cli.command {
        Commands::Ui => cmd_ui(&storage),

        Commands::Cue { limit, all } => cmd_cue(&tasks, &tags, &buckets, limit, all),

        Commands::Add { title, bucket, tags: task_tags, on, every, notes } => {
            cmd_add(&mut tasks, &buckets, &storage, title, bucket, task_tags, on, every, notes)
        }

        Commands::Edit { id, title, bucket, tags: task_tags, on, every, once, notes } => {
            cmd_edit(
                &mut tasks, &buckets, &storage, id, title, bucket, task_tags, on, every, once,
                notes,
            )
        }

        Commands::Complete { id } => cmd_complete(&mut tasks, &storage, id),

        Commands::Remove { id } => cmd_remove(&mut tasks, &storage, id),

        Commands::List { bucket, tags: tag_filter, recurring } => {
            cmd_list(&tasks, &buckets, bucket, tag_filter, recurring)
        }

        Commands::Bucket { action } => match action {
            BucketAction::Add { name } => cmd_bucket_add(&mut buckets, &storage, name),
            BucketAction::List => cmd_bucket_list(&buckets, &tasks),
            BucketAction::Remove { id } => {
                cmd_bucket_remove(&mut buckets, &mut tasks, &storage, id)
            }
        },

        Commands::Tag { action } => match action {
            TagAction::Add { name, urgency } => cmd_tag_add(&mut tags, &storage, name, urgency),
            TagAction::List => cmd_tag_list(&tags),
            TagAction::Urgency { id, value } => cmd_tag_urgency(&mut tags, &storage, id, value),
            TagAction::Remove { id } => cmd_tag_remove(&mut tags, &storage, id),
        },

        Commands::Settings { action } => cmd_settings(&storage, action),

        Commands::Notify { force } => cmd_notify(&tasks, &tags, &storage, force),

        Commands::Completions { shell } => cmd_completions(shell),
    }
}
