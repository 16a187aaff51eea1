//! Storage layer and the tag/task/bucket stores.
//!
//! Persistence follows one pattern throughout: each store owns a full
//! in-memory collection, loaded once at startup from `<data-dir>/<key>.json`
//! and rewritten wholesale after every mutation. Writes go through a temp
//! file + rename; failures are logged and never surfaced to the caller.
//!
//! Store operations are total: a missing id, an unknown recurrence string,
//! or an unreadable file degrades to a logged no-op or a default, never a
//! panic or an error return.

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use chrono::{Duration, Months};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error, warn};

use crate::bucket::Bucket;
use crate::fields::Recurrence;
use crate::tag::{default_tags, Tag, TagPatch};
use crate::task::Task;

/// JSON key-value namespace backed by one file per key.
#[derive(Debug, Clone)]
pub struct Storage {
    dir: PathBuf,
}

impl Storage {
    pub fn new(dir: &Path) -> Self {
        Storage { dir: dir.to_path_buf() }
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    /// Read a collection under `key`. An absent key is not an error; a
    /// present-but-unreadable one is logged and treated the same way, so the
    /// caller always falls back to its default.
    pub fn read<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let path = self.path(key);
        if !path.exists() {
            return None;
        }
        let mut buf = String::new();
        match File::open(&path).and_then(|mut f| f.read_to_string(&mut buf)) {
            Ok(_) => match serde_json::from_str(&buf) {
                Ok(value) => Some(value),
                Err(e) => {
                    warn!(key, error = %e, "stored collection unparsable, using default");
                    None
                }
            },
            Err(e) => {
                warn!(key, error = %e, "failed to read stored collection, using default");
                None
            }
        }
    }

    /// Serialise `value` under `key` via temp file + rename.
    pub fn write<T: Serialize>(&self, key: &str, value: &T) -> std::io::Result<()> {
        let path = self.path(key);
        let tmp = path.with_extension("json.tmp");
        let data = serde_json::to_string_pretty(value)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        let mut f = File::create(&tmp)?;
        f.write_all(data.as_bytes())?;
        f.flush()?;
        fs::rename(tmp, path)?;
        Ok(())
    }
}

/// Tag collection with urgency weights.
#[derive(Debug)]
pub struct TagStore {
    tags: Vec<Tag>,
}

impl TagStore {
    pub const KEY: &'static str = "tags";

    /// Load the stored collection, or seed the defaults when none exists.
    pub fn load(storage: &Storage) -> Self {
        let tags = storage.read(Self::KEY).unwrap_or_else(default_tags);
        TagStore { tags }
    }

    /// Persist the full collection. Failures are logged, not returned.
    pub fn save(&self, storage: &Storage) {
        if let Err(e) = storage.write(Self::KEY, &self.tags) {
            error!(key = Self::KEY, error = %e, "failed to persist tags");
        }
    }

    pub fn all(&self) -> &[Tag] {
        &self.tags
    }

    pub fn get(&self, id: &str) -> Option<&Tag> {
        self.tags.iter().find(|t| t.id == id)
    }

    /// Append a tag. Names are not required to be unique; duplicates
    /// conflate in the urgency lookup (last one wins).
    pub fn add(&mut self, tag: Tag) {
        self.tags.push(tag);
    }

    /// Merge patch fields into the tag with matching id; no-op if absent.
    pub fn update(&mut self, patch: TagPatch) {
        match self.tags.iter_mut().find(|t| t.id == patch.id) {
            Some(tag) => {
                if let Some(name) = patch.name {
                    tag.name = name;
                }
                if let Some(urgency) = patch.urgency {
                    tag.urgency = urgency;
                }
            }
            None => debug!(id = %patch.id, "update for unknown tag ignored"),
        }
    }

    /// Remove by id. Tag names embedded in tasks are left dangling.
    pub fn remove(&mut self, id: &str) {
        self.tags.retain(|t| t.id != id);
    }
}

/// Task collection plus the completion state machine.
#[derive(Debug)]
pub struct TaskStore {
    tasks: Vec<Task>,
}

impl TaskStore {
    pub const KEY: &'static str = "tasks";

    pub fn load(storage: &Storage) -> Self {
        let tasks = storage.read(Self::KEY).unwrap_or_default();
        TaskStore { tasks }
    }

    pub fn save(&self, storage: &Storage) {
        if let Err(e) = storage.write(Self::KEY, &self.tasks) {
            error!(key = Self::KEY, error = %e, "failed to persist tasks");
        }
    }

    pub fn all(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Tasks belonging to one bucket, in insertion order.
    pub fn in_bucket<'a>(&'a self, bucket_id: &str) -> Vec<&'a Task> {
        self.tasks.iter().filter(|t| t.bucket_id == bucket_id).collect()
    }

    /// Append a task as-is; the caller supplies the id.
    pub fn add(&mut self, task: Task) {
        self.tasks.push(task);
    }

    /// Remove by id; absent ids are logged and ignored.
    pub fn remove(&mut self, id: &str) {
        debug!(id, "removing task");
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        if self.tasks.len() == before {
            debug!(id, "remove for unknown task ignored");
        }
    }

    /// Complete a task.
    ///
    /// One-time tasks are removed. Recurring tasks advance `start_date` by
    /// one period and stay in place with the same id; an unrecognised
    /// frequency leaves the date unchanged.
    pub fn complete(&mut self, id: &str) {
        let Some(idx) = self.tasks.iter().position(|t| t.id == id) else {
            warn!(id, "complete for unknown task ignored");
            return;
        };

        if !self.tasks[idx].is_recurring {
            self.remove(id);
            return;
        }

        let task = &mut self.tasks[idx];
        let next = match task.recurrence() {
            Some(Recurrence::Daily) => Some(task.start_date + Duration::days(1)),
            Some(Recurrence::Weekly) => Some(task.start_date + Duration::days(7)),
            Some(Recurrence::Monthly) => task.start_date.checked_add_months(Months::new(1)),
            None => None,
        };
        match next {
            Some(date) => task.start_date = date,
            None => debug!(id, details = %task.recurring_details, "no schedule advance"),
        }
    }

    /// Replace the whole collection with a manually reordered sequence.
    /// Ranked views recompute order from scratch, so this only affects flat
    /// listings.
    pub fn reorder(&mut self, new_order: Vec<Task>) {
        self.tasks = new_order;
    }

    /// The ranked cue over the current collection; see [`crate::cue`].
    pub fn ranked<'a>(
        &'a self,
        tags: &[Tag],
        excluded: &std::collections::HashSet<String>,
        now: chrono::DateTime<chrono::Local>,
    ) -> Vec<&'a Task> {
        crate::cue::ranked_cue(&self.tasks, tags, excluded, now)
    }
}

/// Bucket collection.
#[derive(Debug)]
pub struct BucketStore {
    buckets: Vec<Bucket>,
}

impl BucketStore {
    pub const KEY: &'static str = "buckets";

    pub fn load(storage: &Storage) -> Self {
        let buckets = storage.read(Self::KEY).unwrap_or_default();
        BucketStore { buckets }
    }

    pub fn save(&self, storage: &Storage) {
        if let Err(e) = storage.write(Self::KEY, &self.buckets) {
            error!(key = Self::KEY, error = %e, "failed to persist buckets");
        }
    }

    pub fn all(&self) -> &[Bucket] {
        &self.buckets
    }

    pub fn get(&self, id: &str) -> Option<&Bucket> {
        self.buckets.iter().find(|b| b.id == id)
    }

    pub fn add(&mut self, bucket: Bucket) {
        self.buckets.push(bucket);
    }

    pub fn remove(&mut self, id: &str) {
        self.buckets.retain(|b| b.id != id);
    }
}

/// Delete a bucket together with every task that references it.
///
/// Owning the cascade here keeps the no-orphans invariant in one place
/// instead of relying on each deletion call site to sequence it. Returns the
/// number of tasks removed; the caller persists both stores afterwards.
pub fn remove_bucket_with_tasks(
    buckets: &mut BucketStore,
    tasks: &mut TaskStore,
    bucket_id: &str,
) -> usize {
    let doomed: Vec<String> = tasks
        .in_bucket(bucket_id)
        .iter()
        .map(|t| t.id.clone())
        .collect();
    for id in &doomed {
        tasks.remove(id);
    }
    buckets.remove(bucket_id);
    doomed.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn task(id: &str, recurring: Option<&str>, start: chrono::DateTime<Utc>) -> Task {
        Task {
            id: id.to_string(),
            title: format!("task {id}"),
            bucket_id: "bucket-1".to_string(),
            tags: vec![],
            is_recurring: recurring.is_some(),
            recurring_details: recurring.unwrap_or("").to_string(),
            start_date: start,
            notes: String::new(),
        }
    }

    #[test]
    fn tag_store_seeds_defaults_when_key_absent() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path());
        let store = TagStore::load(&storage);
        assert_eq!(store.all().len(), 10);
        assert_eq!(store.get("tag-4").unwrap().name, "Follow Up");
    }

    #[test]
    fn tag_store_round_trips_field_for_field() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path());
        let mut store = TagStore::load(&storage);
        store.add(Tag {
            id: "tag-custom".to_string(),
            name: "Errand".to_string(),
            urgency: 7,
        });
        store.save(&storage);

        let reloaded = TagStore::load(&storage);
        assert_eq!(reloaded.all(), store.all());
    }

    #[test]
    fn tag_update_merges_and_ignores_unknown_ids() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path());
        let mut store = TagStore::load(&storage);

        store.update(TagPatch {
            id: "tag-1".to_string(),
            urgency: Some(8),
            ..Default::default()
        });
        let tag = store.get("tag-1").unwrap();
        assert_eq!(tag.urgency, 8);
        assert_eq!(tag.name, "Low Priority");

        let before: Vec<Tag> = store.all().to_vec();
        store.update(TagPatch {
            id: "tag-missing".to_string(),
            urgency: Some(2),
            ..Default::default()
        });
        assert_eq!(store.all(), before.as_slice());
    }

    #[test]
    fn removing_a_tag_leaves_task_tag_names_alone() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path());
        let mut tags = TagStore::load(&storage);
        let mut tasks = TaskStore::load(&storage);
        let mut t = task("a", None, Utc::now());
        t.tags = vec!["Follow Up".to_string()];
        tasks.add(t);

        tags.remove("tag-4");
        assert!(tags.get("tag-4").is_none());
        assert_eq!(tasks.get("a").unwrap().tags, vec!["Follow Up".to_string()]);
    }

    #[test]
    fn completing_one_time_task_removes_it() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path());
        let mut store = TaskStore::load(&storage);
        store.add(task("a", None, Utc::now()));

        store.complete("a");
        assert!(store.get("a").is_none());
        assert!(store.all().is_empty());
    }

    #[test]
    fn completing_weekly_task_advances_seven_days_same_id() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path());
        let mut store = TaskStore::load(&storage);
        let start = Utc.with_ymd_and_hms(2025, 3, 3, 9, 0, 0).unwrap();
        store.add(task("a", Some("Weekly"), start));

        store.complete("a");
        let after = store.get("a").expect("recurring task stays in the store");
        assert_eq!(after.start_date, start + Duration::days(7));
        assert_eq!(after.title, "task a");
    }

    #[test]
    fn completing_daily_task_advances_one_day() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path());
        let mut store = TaskStore::load(&storage);
        let start = Utc.with_ymd_and_hms(2025, 3, 3, 9, 0, 0).unwrap();
        store.add(task("a", Some("Daily"), start));

        store.complete("a");
        assert_eq!(store.get("a").unwrap().start_date, start + Duration::days(1));
    }

    #[test]
    fn completing_monthly_task_clamps_at_short_month_end() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path());
        let mut store = TaskStore::load(&storage);
        let start = Utc.with_ymd_and_hms(2025, 1, 31, 12, 0, 0).unwrap();
        store.add(task("a", Some("Monthly"), start));

        store.complete("a");
        let expected = Utc.with_ymd_and_hms(2025, 2, 28, 12, 0, 0).unwrap();
        assert_eq!(store.get("a").unwrap().start_date, expected);
    }

    #[test]
    fn completing_unknown_recurrence_keeps_date_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path());
        let mut store = TaskStore::load(&storage);
        let start = Utc.with_ymd_and_hms(2025, 3, 3, 9, 0, 0).unwrap();
        store.add(task("a", Some("Fortnightly"), start));

        store.complete("a");
        let after = store.get("a").unwrap();
        assert_eq!(after.start_date, start);
        assert!(after.is_recurring);
    }

    #[test]
    fn completing_missing_id_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path());
        let mut store = TaskStore::load(&storage);
        store.add(task("a", None, Utc::now()));

        store.complete("nope");
        store.remove("also-nope");
        assert_eq!(store.all().len(), 1);
    }

    #[test]
    fn reorder_replaces_the_collection() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path());
        let mut store = TaskStore::load(&storage);
        store.add(task("a", None, Utc::now()));
        store.add(task("b", None, Utc::now()));

        let flipped: Vec<Task> = store.all().iter().rev().cloned().collect();
        store.reorder(flipped);
        assert_eq!(store.all()[0].id, "b");
        assert_eq!(store.all()[1].id, "a");
    }

    #[test]
    fn task_store_round_trips_field_for_field() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path());
        let mut store = TaskStore::load(&storage);
        let mut t = task("a", Some("Weekly"), Utc.with_ymd_and_hms(2025, 6, 1, 8, 30, 0).unwrap());
        t.tags = vec!["Follow Up".to_string(), "Project".to_string()];
        t.notes = "call back after lunch".to_string();
        store.add(t);
        store.save(&storage);

        let reloaded = TaskStore::load(&storage);
        assert_eq!(reloaded.all(), store.all());
    }

    #[test]
    fn stored_camel_case_collections_load_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path());
        std::fs::write(
            dir.path().join("tasks.json"),
            r#"[{
                "id": "0f8b4ab2-9f60-4f9e-9a35-0c0d8e3a71aa",
                "title": "Water plants",
                "bucketId": "bucket-1700000000000",
                "tags": ["Low Priority"],
                "isRecurring": true,
                "recurringDetails": "Weekly",
                "startDate": "2025-06-01T08:30:00Z",
                "notes": ""
            }]"#,
        )
        .unwrap();

        let store = TaskStore::load(&storage);
        let t = store.get("0f8b4ab2-9f60-4f9e-9a35-0c0d8e3a71aa").unwrap();
        assert_eq!(t.bucket_id, "bucket-1700000000000");
        assert_eq!(t.recurrence(), Some(Recurrence::Weekly));
    }

    #[test]
    fn corrupt_file_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path());
        std::fs::write(dir.path().join("tasks.json"), "{ not json").unwrap();

        let store = TaskStore::load(&storage);
        assert!(store.all().is_empty());
    }

    #[test]
    fn bucket_cascade_leaves_no_orphans() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path());
        let mut buckets = BucketStore::load(&storage);
        let mut tasks = TaskStore::load(&storage);

        buckets.add(Bucket { id: "bucket-1".to_string(), name: "Chores".to_string() });
        buckets.add(Bucket { id: "bucket-2".to_string(), name: "Work".to_string() });
        for id in ["a", "b", "c"] {
            tasks.add(task(id, None, Utc::now()));
        }
        let mut other = task("d", None, Utc::now());
        other.bucket_id = "bucket-2".to_string();
        tasks.add(other);

        let removed = remove_bucket_with_tasks(&mut buckets, &mut tasks, "bucket-1");
        assert_eq!(removed, 3);
        assert!(buckets.get("bucket-1").is_none());
        assert!(tasks.all().iter().all(|t| t.bucket_id != "bucket-1"));
        assert_eq!(tasks.all().len(), 1);
        assert!(buckets.get("bucket-2").is_some());
    }
}
