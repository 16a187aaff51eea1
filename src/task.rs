//! Task data structure.
//!
//! Field names serialise in camelCase so collections written by earlier
//! versions of the app load unchanged. `recurringDetails` stays a raw string
//! on the wire; it is parsed into [`Recurrence`] on demand and unknown values
//! degrade rather than fail deserialisation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::fields::Recurrence;

/// A single work item, always owned by exactly one bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    pub bucket_id: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_recurring: bool,
    #[serde(default)]
    pub recurring_details: String,
    /// Due date for one-time tasks; next occurrence for recurring ones.
    pub start_date: DateTime<Utc>,
    #[serde(default)]
    pub notes: String,
}

impl Task {
    /// Build a new task with a fresh id. Editing goes through the same path:
    /// the old record is removed and a replacement minted, so an edited task
    /// always changes identity.
    pub fn new(
        title: &str,
        bucket_id: &str,
        tags: Vec<String>,
        recurrence: Option<Recurrence>,
        start_date: DateTime<Utc>,
        notes: &str,
    ) -> Self {
        Task {
            id: Uuid::new_v4().to_string(),
            title: title.trim().to_string(),
            bucket_id: bucket_id.to_string(),
            tags,
            is_recurring: recurrence.is_some(),
            recurring_details: recurrence.map(|r| r.as_wire_str().to_string()).unwrap_or_default(),
            start_date,
            notes: notes.to_string(),
        }
    }

    /// The parsed recurrence, if this task repeats on a recognised schedule.
    pub fn recurrence(&self) -> Option<Recurrence> {
        if !self.is_recurring {
            return None;
        }
        Recurrence::parse(&self.recurring_details)
    }
}
