//! Daily reminder composition.
//!
//! Only the message is built here. Actual delivery (cron, a notification
//! daemon, whatever wraps the binary) consumes `cue notify` output; the
//! composer itself is a pure function over the ranked cue, always called
//! with an empty exclusion set.

use crate::task::Task;

/// Title line of the daily reminder.
pub const REMINDER_TITLE: &str = "Good Morning!";

/// Time-of-day greeting shown in the cue header.
pub fn greeting(hour: u32) -> &'static str {
    if hour < 12 {
        "Good Morning"
    } else if hour < 18 {
        "Good Afternoon"
    } else {
        "Good Evening"
    }
}

/// Body of the daily reminder summarising the ranked cue.
pub fn compose_reminder(cue: &[&Task]) -> String {
    let first = cue
        .first()
        .map(|t| t.title.as_str())
        .unwrap_or("No tasks available");
    format!(
        "You have {} items in your cue. The first task is \"{}\".",
        cue.len(),
        first
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn titled(title: &str) -> Task {
        Task {
            id: "a".to_string(),
            title: title.to_string(),
            bucket_id: "bucket-1".to_string(),
            tags: vec![],
            is_recurring: false,
            recurring_details: String::new(),
            start_date: Utc::now(),
            notes: String::new(),
        }
    }

    #[test]
    fn reminder_names_the_top_task() {
        let top = titled("Water plants");
        let second = titled("Pay rent");
        let cue = vec![&top, &second];
        assert_eq!(
            compose_reminder(&cue),
            "You have 2 items in your cue. The first task is \"Water plants\"."
        );
    }

    #[test]
    fn reminder_for_empty_cue() {
        assert_eq!(
            compose_reminder(&[]),
            "You have 0 items in your cue. The first task is \"No tasks available\"."
        );
    }

    #[test]
    fn greeting_tracks_time_of_day() {
        assert_eq!(greeting(6), "Good Morning");
        assert_eq!(greeting(11), "Good Morning");
        assert_eq!(greeting(12), "Good Afternoon");
        assert_eq!(greeting(17), "Good Afternoon");
        assert_eq!(greeting(18), "Good Evening");
        assert_eq!(greeting(23), "Good Evening");
    }
}
