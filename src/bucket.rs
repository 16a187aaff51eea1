//! Bucket data structure.
//!
//! A bucket is a user-defined category; tasks reference their bucket by id.
//! Bucket deletion is handled by the cascade use-case in `store`, which keeps
//! the no-orphaned-tasks invariant out of call-site discipline.

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// A category grouping tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bucket {
    pub id: String,
    pub name: String,
}

impl Bucket {
    /// Create a bucket with a creation-time-derived id. The name must be
    /// validated non-empty by the caller; the constructor only trims it.
    pub fn new(name: &str) -> Self {
        Bucket {
            id: format!("bucket-{}", Utc::now().timestamp_millis()),
            name: name.trim().to_string(),
        }
    }
}
