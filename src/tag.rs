//! Tag data structure and the default seed set.
//!
//! Tags carry a user-adjustable urgency weight (1–10) that drives cue
//! ranking. Tasks reference tags by *name*, not id, so renaming or removing
//! a tag leaves the names embedded in tasks dangling; the ranking lookup
//! falls back to the minimum weight for those.

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// A named urgency weight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: String,
    pub name: String,
    pub urgency: u8,
}

impl Tag {
    /// Urgency assigned to tags created without an explicit weight.
    pub const DEFAULT_URGENCY: u8 = 5;

    /// Create a tag with a creation-time-derived id.
    pub fn new(name: &str, urgency: u8) -> Self {
        Tag {
            id: format!("tag-{}", Utc::now().timestamp_millis()),
            name: name.trim().to_string(),
            urgency,
        }
    }
}

/// Partial update for a tag, applied by id. `None` fields are left as-is.
#[derive(Debug, Default, Clone)]
pub struct TagPatch {
    pub id: String,
    pub name: Option<String>,
    pub urgency: Option<u8>,
}

/// The bootstrap tag set used when no stored collection exists.
pub fn default_tags() -> Vec<Tag> {
    let seed: [(&str, &str, u8); 10] = [
        ("tag-1", "Low Priority", 1),
        ("tag-2", "Mid Priority", 5),
        ("tag-3", "High Priority", 9),
        ("tag-4", "Follow Up", 10),
        ("tag-5", "Project", 3),
        ("tag-6", "Big Project", 2),
        ("tag-7", "Low Difficulty", 9),
        ("tag-8", "Mid Difficulty", 5),
        ("tag-9", "High Difficulty", 1),
        ("tag-10", "R&D", 1),
    ];
    seed.iter()
        .map(|&(id, name, urgency)| Tag {
            id: id.to_string(),
            name: name.to_string(),
            urgency,
        })
        .collect()
}

/// Clamp a user-supplied urgency into the valid 1–10 range.
pub fn clamp_urgency(value: u8) -> u8 {
    value.clamp(1, 10)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_has_ten_tags_with_stable_ids() {
        let tags = default_tags();
        assert_eq!(tags.len(), 10);
        assert_eq!(tags[0].id, "tag-1");
        assert_eq!(tags[3].name, "Follow Up");
        assert_eq!(tags[3].urgency, 10);
        assert_eq!(tags[9].name, "R&D");
    }

    #[test]
    fn urgency_clamps_to_valid_range() {
        assert_eq!(clamp_urgency(0), 1);
        assert_eq!(clamp_urgency(7), 7);
        assert_eq!(clamp_urgency(42), 10);
    }
}
