//! Command implementations for the CLI interface.
//!
//! Store operations never fail; anything that is a genuine user error
//! (unknown bucket name, ambiguous tag, empty title) is reported on stderr
//! with exit code 1 here at the CLI boundary instead.

use std::collections::HashSet;

use chrono::{DateTime, Duration, Local, NaiveDate, Timelike, Utc};
use clap::Subcommand;
use clap_complete::{generate, Shell};

use crate::cue::{ranked_cue, urgency_score, urgency_table};
use crate::fields::{format_recurrence, Recurrence};
use crate::notify::{compose_reminder, greeting, REMINDER_TITLE};
use crate::settings::{Settings, Visuals};
use crate::store::{
    remove_bucket_with_tasks, BucketStore, Storage, TagStore, TaskStore,
};
use crate::tag::{clamp_urgency, Tag, TagPatch};
use crate::task::Task;
use crate::tui::run::run_tui;

#[derive(Subcommand)]
pub enum Commands {
    /// Launch the interactive UI interface.
    Ui,

    /// Print the ranked cue of currently-due tasks.
    Cue {
        /// Limit number of rows printed.
        #[arg(long)]
        limit: Option<usize>,
        /// Rank every task, ignoring the due-window filter.
        #[arg(long)]
        all: bool,
    },

    /// Add a new task to a bucket.
    Add {
        /// Short title for the task.
        title: String,
        /// Bucket id or name the task belongs to.
        #[arg(long)]
        bucket: String,
        /// Tag name. May be repeated.
        #[arg(long = "tag")]
        tags: Vec<String>,
        /// Start date: YYYY-MM-DD, "today", "tomorrow", or "in Nd". Defaults to today.
        #[arg(long)]
        on: Option<String>,
        /// Recurrence frequency: daily | weekly | monthly.
        #[arg(long, value_enum)]
        every: Option<Recurrence>,
        /// Free-text notes.
        #[arg(long)]
        notes: Option<String>,
    },

    /// Replace a task's fields. The task gets a fresh id.
    Edit {
        /// Task id to edit.
        id: String,
        #[arg(long)]
        title: Option<String>,
        /// Move the task to another bucket (id or name).
        #[arg(long)]
        bucket: Option<String>,
        /// Replace the tag list. May be repeated.
        #[arg(long = "tag")]
        tags: Vec<String>,
        /// New start date.
        #[arg(long)]
        on: Option<String>,
        /// New recurrence frequency.
        #[arg(long, value_enum)]
        every: Option<Recurrence>,
        /// Make the task one-time again.
        #[arg(long, conflicts_with = "every")]
        once: bool,
        #[arg(long)]
        notes: Option<String>,
    },

    /// Complete a task: one-time tasks are removed, recurring ones advance.
    Complete {
        /// Task id to complete.
        id: String,
    },

    /// Remove a task by id.
    Remove {
        /// Task id to remove.
        id: String,
    },

    /// List tasks with optional filters.
    List {
        /// Filter by bucket id or name.
        #[arg(long)]
        bucket: Option<String>,
        /// Filter by tag name. May be repeated.
        #[arg(long = "tag")]
        tags: Vec<String>,
        /// Only recurring tasks.
        #[arg(long)]
        recurring: bool,
    },

    /// Manage buckets.
    Bucket {
        #[command(subcommand)]
        action: BucketAction,
    },

    /// Manage tags and their urgency weights.
    Tag {
        #[command(subcommand)]
        action: TagAction,
    },

    /// Show or change settings.
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },

    /// Print the daily reminder message for the current cue.
    Notify {
        /// Compose the message even when notifications are disabled.
        #[arg(long)]
        force: bool,
    },

    /// Generate shell completion scripts.
    Completions {
        /// Shell to generate completions for.
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum BucketAction {
    /// Create a bucket.
    Add {
        /// Bucket name (required non-empty).
        name: String,
    },
    /// List buckets with task counts.
    List,
    /// Delete a bucket and every task inside it.
    Remove {
        /// Bucket id or name.
        id: String,
    },
}

#[derive(Subcommand)]
pub enum TagAction {
    /// Create a tag.
    Add {
        /// Tag name.
        name: String,
        /// Urgency weight, 1-10.
        #[arg(long, default_value_t = Tag::DEFAULT_URGENCY)]
        urgency: u8,
    },
    /// List tags and their weights.
    List,
    /// Set a tag's urgency weight.
    Urgency {
        /// Tag id or name.
        id: String,
        /// New weight, 1-10.
        value: u8,
    },
    /// Remove a tag. Tasks keep the tag name; the lookup falls back to 1.
    Remove {
        /// Tag id or name.
        id: String,
    },
}

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Print current settings.
    Show,
    /// Enable or disable the daily reminder.
    Notifications {
        #[arg(value_parser = ["on", "off"])]
        state: String,
    },
    /// Set the reminder time.
    Reminder {
        #[arg(long)]
        hour: Option<u32>,
        #[arg(long)]
        minute: Option<u32>,
    },
    /// Change shelf appearance.
    Visuals {
        #[arg(long)]
        background: Option<String>,
        #[arg(long)]
        bucket_color: Option<String>,
        #[arg(long, value_parser = ["on", "off"])]
        randomize_bucket_colors: Option<String>,
    },
}

/// Parse human-readable start date input.
///
/// Supports "today", "tomorrow", "yesterday", "in Nd", "in Nw", and
/// YYYY-MM-DD. The parsed day is anchored at local midnight.
pub fn parse_start_input(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim().to_lowercase();
    let today = Local::now().date_naive();

    let date = match s.as_str() {
        "today" => Some(today),
        "tomorrow" => Some(today + Duration::days(1)),
        "yesterday" => Some(today - Duration::days(1)),
        _ => {
            if let Some(rest) = s.strip_prefix("in ") {
                if let Some(nd) = rest.strip_suffix('d') {
                    nd.trim().parse::<i64>().ok().map(|n| today + Duration::days(n))
                } else if let Some(nw) = rest.strip_suffix('w') {
                    nw.trim().parse::<i64>().ok().map(|n| today + Duration::weeks(n))
                } else {
                    None
                }
            } else {
                NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()
            }
        }
    };

    date.and_then(|d| d.and_hms_opt(0, 0, 0))
        .and_then(|naive| naive.and_local_timezone(Local).earliest())
        .map(|local| local.with_timezone(&Utc))
}

/// Format a start date relative to today ("today", "tomorrow", "in 3d", "2d ago").
pub fn format_start_relative(start: DateTime<Utc>, today: NaiveDate) -> String {
    let delta = start.with_timezone(&Local).date_naive() - today;
    match delta.num_days() {
        0 => "today".into(),
        1 => "tomorrow".into(),
        d if d > 1 => format!("in {d}d"),
        d => format!("{}d ago", -d),
    }
}

/// Truncate a string to a maximum width, adding ellipsis if needed.
pub fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out = String::new();
        for (i, ch) in s.chars().enumerate() {
            if i + 1 >= width {
                out.push('…');
                break;
            }
            out.push(ch);
        }
        out
    }
}

/// Resolve a bucket given either its id or its (unique) name.
pub fn resolve_bucket(identifier: &str, buckets: &BucketStore) -> Result<String, String> {
    if buckets.get(identifier).is_some() {
        return Ok(identifier.to_string());
    }
    let matches: Vec<_> = buckets
        .all()
        .iter()
        .filter(|b| b.name.eq_ignore_ascii_case(identifier))
        .collect();
    match matches.len() {
        0 => Err(format!("No bucket found matching '{identifier}'")),
        1 => Ok(matches[0].id.clone()),
        n => Err(format!(
            "{n} buckets named '{identifier}'; use the bucket id instead"
        )),
    }
}

/// Resolve a tag given either its id or its (unique) name.
pub fn resolve_tag(identifier: &str, tags: &TagStore) -> Result<String, String> {
    if tags.get(identifier).is_some() {
        return Ok(identifier.to_string());
    }
    let matches: Vec<_> = tags
        .all()
        .iter()
        .filter(|t| t.name.eq_ignore_ascii_case(identifier))
        .collect();
    match matches.len() {
        0 => Err(format!("No tag found matching '{identifier}'")),
        1 => Ok(matches[0].id.clone()),
        n => Err(format!("{n} tags named '{identifier}'; use the tag id instead")),
    }
}

fn bail(message: &str) -> ! {
    eprintln!("{message}");
    std::process::exit(1);
}

/// Launch the terminal user interface.
pub fn cmd_ui(storage: &Storage) {
    if let Err(e) = run_tui(storage) {
        eprintln!("UI error: {e}");
        std::process::exit(1);
    }
}

/// Print the ranked cue.
pub fn cmd_cue(
    tasks: &TaskStore,
    tags: &TagStore,
    buckets: &BucketStore,
    limit: Option<usize>,
    all: bool,
) {
    let now = Local::now();
    let table = urgency_table(tags.all());

    let ranked: Vec<&Task> = if all {
        let mut scored: Vec<(&Task, f64)> = tasks
            .all()
            .iter()
            .map(|t| (t, urgency_score(t, &table)))
            .collect();
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.into_iter().map(|(t, _)| t).collect()
    } else {
        ranked_cue(tasks.all(), tags.all(), &HashSet::new(), now)
    };

    println!("{}! Your cue:", greeting(now.hour()));
    if ranked.is_empty() {
        println!("Nothing due. Create a bucket and a task to fill your cue.");
        return;
    }

    let shown = limit.unwrap_or(ranked.len()).min(ranked.len());
    println!(
        "{:<5} {:<36} {:<8} {:<10} {:<14} {}",
        "Score", "Title", "Recur", "Start", "Bucket", "Tags"
    );
    let today = now.date_naive();
    for (i, t) in ranked.iter().take(shown).enumerate() {
        let marker = if i == 0 { "▶" } else { " " };
        let bucket_name = buckets
            .get(&t.bucket_id)
            .map(|b| b.name.clone())
            .unwrap_or_else(|| "-".into());
        println!(
            "{:<5.1} {marker}{:<35} {:<8} {:<10} {:<14} {}",
            urgency_score(t, &table),
            truncate(&t.title, 35),
            format_recurrence(t.is_recurring, &t.recurring_details),
            format_start_relative(t.start_date, today),
            truncate(&bucket_name, 14),
            t.tags.join(","),
        );
    }
    if shown < ranked.len() {
        println!("… and {} more", ranked.len() - shown);
    }
}

/// Add a new task.
#[allow(clippy::too_many_arguments)]
pub fn cmd_add(
    tasks: &mut TaskStore,
    buckets: &BucketStore,
    storage: &Storage,
    title: String,
    bucket: String,
    tags: Vec<String>,
    on: Option<String>,
    every: Option<Recurrence>,
    notes: Option<String>,
) {
    if title.trim().is_empty() {
        bail("Task title cannot be empty.");
    }
    let bucket_id = match resolve_bucket(&bucket, buckets) {
        Ok(id) => id,
        Err(e) => bail(&e),
    };
    let start = match on.as_deref() {
        Some(raw) => match parse_start_input(raw) {
            Some(date) => date,
            None => bail(&format!("Unrecognised date '{raw}'.")),
        },
        None => Utc::now(),
    };

    let task = Task::new(&title, &bucket_id, tags, every, start, notes.as_deref().unwrap_or(""));
    let id = task.id.clone();
    tasks.add(task);
    tasks.save(storage);
    println!("Added task {id}");
}

/// Replace a task's fields. Implemented as remove-then-add with a fresh id,
/// so anything keyed on the old id (session exclusions, reminders) must
/// treat an edited task as a new one.
#[allow(clippy::too_many_arguments)]
pub fn cmd_edit(
    tasks: &mut TaskStore,
    buckets: &BucketStore,
    storage: &Storage,
    id: String,
    title: Option<String>,
    bucket: Option<String>,
    tags: Vec<String>,
    on: Option<String>,
    every: Option<Recurrence>,
    once: bool,
    notes: Option<String>,
) {
    let Some(old) = tasks.get(&id).cloned() else {
        bail(&format!("Task {id} not found."));
    };

    let bucket_id = match bucket {
        Some(b) => match resolve_bucket(&b, buckets) {
            Ok(id) => id,
            Err(e) => bail(&e),
        },
        None => old.bucket_id.clone(),
    };
    let start = match on.as_deref() {
        Some(raw) => match parse_start_input(raw) {
            Some(date) => date,
            None => bail(&format!("Unrecognised date '{raw}'.")),
        },
        None => old.start_date,
    };
    let recurrence = if once {
        None
    } else {
        every.or_else(|| old.recurrence())
    };
    let new_tags = if tags.is_empty() { old.tags.clone() } else { tags };
    let new_title = title.unwrap_or_else(|| old.title.clone());
    let new_notes = notes.unwrap_or_else(|| old.notes.clone());

    tasks.remove(&id);
    let replacement = Task::new(&new_title, &bucket_id, new_tags, recurrence, start, &new_notes);
    let new_id = replacement.id.clone();
    tasks.add(replacement);
    tasks.save(storage);
    println!("Replaced task {id} with {new_id}");
}

/// Complete a task.
pub fn cmd_complete(tasks: &mut TaskStore, storage: &Storage, id: String) {
    let was_recurring = tasks.get(&id).map(|t| t.is_recurring);
    tasks.complete(&id);
    tasks.save(storage);
    match was_recurring {
        Some(true) => {
            if let Some(t) = tasks.get(&id) {
                let today = Local::now().date_naive();
                println!("Completed; next occurrence {}", format_start_relative(t.start_date, today));
            }
        }
        Some(false) => println!("Completed and removed {id}"),
        None => println!("Task {id} not found; nothing completed."),
    }
}

/// Remove a task.
pub fn cmd_remove(tasks: &mut TaskStore, storage: &Storage, id: String) {
    tasks.remove(&id);
    tasks.save(storage);
    println!("Removed {id}");
}

/// List tasks with optional filters.
pub fn cmd_list(
    tasks: &TaskStore,
    buckets: &BucketStore,
    bucket: Option<String>,
    tags: Vec<String>,
    recurring: bool,
) {
    let bucket_id = bucket.map(|b| match resolve_bucket(&b, buckets) {
        Ok(id) => id,
        Err(e) => bail(&e),
    });

    let rows: Vec<&Task> = tasks
        .all()
        .iter()
        .filter(|t| bucket_id.as_deref().map_or(true, |id| t.bucket_id == id))
        .filter(|t| tags.iter().all(|wanted| t.tags.iter().any(|have| have == wanted)))
        .filter(|t| !recurring || t.is_recurring)
        .collect();

    println!(
        "{:<38} {:<30} {:<8} {:<10} {}",
        "ID", "Title", "Recur", "Start", "Bucket"
    );
    let today = Local::now().date_naive();
    for t in rows {
        let bucket_name = buckets
            .get(&t.bucket_id)
            .map(|b| b.name.clone())
            .unwrap_or_else(|| "-".into());
        println!(
            "{:<38} {:<30} {:<8} {:<10} {}",
            t.id,
            truncate(&t.title, 30),
            format_recurrence(t.is_recurring, &t.recurring_details),
            format_start_relative(t.start_date, today),
            truncate(&bucket_name, 14),
        );
    }
}

/// Create a bucket.
pub fn cmd_bucket_add(buckets: &mut BucketStore, storage: &Storage, name: String) {
    if name.trim().is_empty() {
        bail("Bucket name cannot be empty.");
    }
    let bucket = crate::bucket::Bucket::new(&name);
    let id = bucket.id.clone();
    buckets.add(bucket);
    buckets.save(storage);
    println!("Added bucket {id}");
}

/// List buckets with task counts.
pub fn cmd_bucket_list(buckets: &BucketStore, tasks: &TaskStore) {
    println!("{:<22} {:<20} {}", "ID", "Name", "Tasks");
    for b in buckets.all() {
        println!(
            "{:<22} {:<20} {}",
            b.id,
            truncate(&b.name, 20),
            tasks.in_bucket(&b.id).len()
        );
    }
}

/// Delete a bucket and cascade to its tasks.
pub fn cmd_bucket_remove(
    buckets: &mut BucketStore,
    tasks: &mut TaskStore,
    storage: &Storage,
    id: String,
) {
    let bucket_id = match resolve_bucket(&id, buckets) {
        Ok(id) => id,
        Err(e) => bail(&e),
    };
    let removed = remove_bucket_with_tasks(buckets, tasks, &bucket_id);
    tasks.save(storage);
    buckets.save(storage);
    println!("Removed bucket {bucket_id} and {removed} task(s)");
}

/// Create a tag.
pub fn cmd_tag_add(tags: &mut TagStore, storage: &Storage, name: String, urgency: u8) {
    if name.trim().is_empty() {
        bail("Tag name cannot be empty.");
    }
    let tag = Tag::new(&name, clamp_urgency(urgency));
    let id = tag.id.clone();
    tags.add(tag);
    tags.save(storage);
    println!("Added tag {id}");
}

/// List tags and weights.
pub fn cmd_tag_list(tags: &TagStore) {
    println!("{:<20} {:<20} {}", "ID", "Name", "Urgency");
    for t in tags.all() {
        println!("{:<20} {:<20} {}", t.id, truncate(&t.name, 20), t.urgency);
    }
}

/// Adjust a tag's urgency weight.
pub fn cmd_tag_urgency(tags: &mut TagStore, storage: &Storage, id: String, value: u8) {
    let tag_id = match resolve_tag(&id, tags) {
        Ok(id) => id,
        Err(e) => bail(&e),
    };
    tags.update(TagPatch {
        id: tag_id.clone(),
        urgency: Some(clamp_urgency(value)),
        ..Default::default()
    });
    tags.save(storage);
    println!("Tag {tag_id} urgency set to {}", clamp_urgency(value));
}

/// Remove a tag.
pub fn cmd_tag_remove(tags: &mut TagStore, storage: &Storage, id: String) {
    let tag_id = match resolve_tag(&id, tags) {
        Ok(id) => id,
        Err(e) => bail(&e),
    };
    tags.remove(&tag_id);
    tags.save(storage);
    println!("Removed tag {tag_id}");
}

/// Apply a settings action.
pub fn cmd_settings(storage: &Storage, action: SettingsAction) {
    match action {
        SettingsAction::Show => {
            let settings = Settings::load(storage);
            let visuals = Visuals::load(storage);
            println!(
                "notifications: {}",
                if settings.notifications_enabled { "on" } else { "off" }
            );
            println!(
                "reminder time: {:02}:{:02}",
                settings.reminder_hour, settings.reminder_minute
            );
            println!("background: {}", visuals.background);
            println!("bucket color: {}", visuals.bucket_color);
            println!(
                "randomize bucket colors: {}",
                if visuals.randomize_bucket_colors { "on" } else { "off" }
            );
        }
        SettingsAction::Notifications { state } => {
            let mut settings = Settings::load(storage);
            settings.notifications_enabled = state == "on";
            settings.save(storage);
            println!("Notifications {state}");
        }
        SettingsAction::Reminder { hour, minute } => {
            let mut settings = Settings::load(storage);
            if let Some(h) = hour {
                if h > 23 {
                    bail("Hour must be 0-23.");
                }
                settings.reminder_hour = h;
            }
            if let Some(m) = minute {
                if m > 59 {
                    bail("Minute must be 0-59.");
                }
                settings.reminder_minute = m;
            }
            settings.save(storage);
            println!(
                "Reminder time {:02}:{:02}",
                settings.reminder_hour, settings.reminder_minute
            );
        }
        SettingsAction::Visuals {
            background,
            bucket_color,
            randomize_bucket_colors,
        } => {
            let mut visuals = Visuals::load(storage);
            if let Some(bg) = background {
                visuals.background = bg;
            }
            if let Some(color) = bucket_color {
                visuals.bucket_color = color;
            }
            if let Some(state) = randomize_bucket_colors {
                visuals.randomize_bucket_colors = state == "on";
            }
            visuals.save(storage);
            println!("Visuals updated");
        }
    }
}

/// Compose the daily reminder for the full cue (empty exclusion set).
pub fn cmd_notify(tasks: &TaskStore, tags: &TagStore, storage: &Storage, force: bool) {
    let settings = Settings::load(storage);
    if !settings.notifications_enabled && !force {
        return;
    }
    let ranked = tasks.ranked(tags.all(), &HashSet::new(), Local::now());
    println!("{REMINDER_TITLE}");
    println!("{}", compose_reminder(&ranked));
}

/// Generate shell completion scripts.
pub fn cmd_completions(shell: Shell) {
    use clap::CommandFactory;
    use crate::cli::Cli;

    let mut app = Cli::command();
    let app_name = app.get_name().to_string();
    generate(shell, &mut app, app_name, &mut std::io::stdout());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bucket::Bucket;

    #[test]
    fn start_input_parses_keywords_and_iso() {
        let today = Local::now().date_naive();
        let parsed = parse_start_input("today").unwrap();
        assert_eq!(parsed.with_timezone(&Local).date_naive(), today);

        let parsed = parse_start_input("in 3d").unwrap();
        assert_eq!(
            parsed.with_timezone(&Local).date_naive(),
            today + Duration::days(3)
        );

        let parsed = parse_start_input("2025-12-01").unwrap();
        assert_eq!(
            parsed.with_timezone(&Local).date_naive(),
            NaiveDate::from_ymd_opt(2025, 12, 1).unwrap()
        );

        assert!(parse_start_input("someday").is_none());
    }

    #[test]
    fn bucket_resolution_prefers_id_then_unique_name() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path());
        let mut buckets = BucketStore::load(&storage);
        buckets.add(Bucket { id: "bucket-1".into(), name: "Chores".into() });
        buckets.add(Bucket { id: "bucket-2".into(), name: "Work".into() });
        buckets.add(Bucket { id: "bucket-3".into(), name: "work".into() });

        assert_eq!(resolve_bucket("bucket-1", &buckets).unwrap(), "bucket-1");
        assert_eq!(resolve_bucket("chores", &buckets).unwrap(), "bucket-1");
        assert!(resolve_bucket("work", &buckets).is_err());
        assert!(resolve_bucket("errands", &buckets).is_err());
    }
}
