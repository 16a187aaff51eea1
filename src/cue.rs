//! The cue ranking engine.
//!
//! A pure function over the current task and tag collections: filter tasks
//! to the ones due today, score each by the average urgency of its tags, and
//! sort descending. It holds no state of its own and is recomputed on every
//! render, so callers pass the clock in explicitly and tests pin it.
//!
//! The monthly due-window deliberately compares day-of-month and month
//! number instead of doing real date arithmetic. That reproduces the
//! behaviour existing stored data was created against, quirks included
//! (months compare equal across years, and a day-31 occurrence is invisible
//! while the 10-day horizon sits inside a shorter month).

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Datelike, Duration, Local, Utc};

use crate::fields::Recurrence;
use crate::tag::Tag;
use crate::task::Task;

/// Urgency assumed for tag names with no entry in the table.
const FALLBACK_URGENCY: u8 = 1;

/// How far ahead, in days, weekly and monthly occurrences are surfaced.
const HORIZON_DAYS: i64 = 10;

/// Build the name → urgency lookup. Insertion order, last write wins, so
/// duplicate names conflate exactly as the stored collection orders them.
/// A stored weight of 0 reads as the minimum weight.
pub fn urgency_table(tags: &[Tag]) -> HashMap<String, u8> {
    let mut table = HashMap::with_capacity(tags.len());
    for tag in tags {
        table.insert(tag.name.clone(), tag.urgency.max(1));
    }
    table
}

/// Average urgency across a task's tag names; unknown names count as the
/// fallback weight, and a task with no tags scores 0.
pub fn urgency_score(task: &Task, table: &HashMap<String, u8>) -> f64 {
    if task.tags.is_empty() {
        return 0.0;
    }
    let total: u32 = task
        .tags
        .iter()
        .map(|name| u32::from(table.get(name).copied().unwrap_or(FALLBACK_URGENCY)))
        .sum();
    f64::from(total) / task.tags.len() as f64
}

/// Whether a task falls inside its due window at `now`.
///
/// One-time tasks are due once their start instant has passed (inclusive).
/// Daily tasks are always due. Weekly tasks are due when the next occurrence
/// lies 0 to 10 days ahead. Monthly tasks use the day-of-month window
/// described at module level. A recurring task with an unrecognised
/// frequency is never due.
pub fn is_due(task: &Task, now: DateTime<Local>) -> bool {
    if !task.is_recurring {
        return task.start_date <= now.with_timezone(&Utc);
    }

    match task.recurrence() {
        Some(Recurrence::Daily) => true,
        Some(Recurrence::Weekly) => {
            let days_ahead =
                (task.start_date - now.with_timezone(&Utc)).num_seconds() as f64 / 86_400.0;
            (0.0..=HORIZON_DAYS as f64).contains(&days_ahead)
        }
        Some(Recurrence::Monthly) => {
            let start = task.start_date.with_timezone(&now.timezone());
            let horizon = now + Duration::days(HORIZON_DAYS);
            let due_this_month = start.day() >= now.day() && start.month() == now.month();
            let due_next_month =
                start.day() <= horizon.day() && start.month() == horizon.month();
            due_this_month || due_next_month
        }
        None => false,
    }
}

/// Filter to due tasks and rank them, most urgent first.
///
/// `excluded` carries task ids completed in the current session but not yet
/// reflected in the collection; they never appear in the output regardless
/// of their due window. Ties keep the collection's relative order, so the
/// output is deterministic.
pub fn ranked_cue<'a>(
    tasks: &'a [Task],
    tags: &[Tag],
    excluded: &HashSet<String>,
    now: DateTime<Local>,
) -> Vec<&'a Task> {
    let table = urgency_table(tags);

    let mut due: Vec<(&Task, f64)> = tasks
        .iter()
        .filter(|t| !excluded.contains(&t.id) && is_due(t, now))
        .map(|t| (t, urgency_score(t, &table)))
        .collect();

    due.sort_by(|a, b| b.1.total_cmp(&a.1));
    due.into_iter().map(|(t, _)| t).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn tag(name: &str, urgency: u8) -> Tag {
        Tag { id: format!("tag-{name}"), name: name.to_string(), urgency }
    }

    fn one_time(id: &str, tags: &[&str], start: DateTime<Local>) -> Task {
        Task {
            id: id.to_string(),
            title: format!("task {id}"),
            bucket_id: "bucket-1".to_string(),
            tags: tags.iter().map(|s| s.to_string()).collect(),
            is_recurring: false,
            recurring_details: String::new(),
            start_date: start.with_timezone(&Utc),
            notes: String::new(),
        }
    }

    fn recurring(id: &str, details: &str, start: DateTime<Local>) -> Task {
        Task {
            id: id.to_string(),
            title: format!("task {id}"),
            bucket_id: "bucket-1".to_string(),
            tags: vec![],
            is_recurring: true,
            recurring_details: details.to_string(),
            start_date: start.with_timezone(&Utc),
            notes: String::new(),
        }
    }

    fn noon(y: i32, m: u32, d: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    #[test]
    fn score_averages_with_fallback_for_unknown_names() {
        let table = urgency_table(&[tag("Follow Up", 10)]);
        let task = one_time("a", &["Follow Up", "Unknown"], noon(2025, 6, 2));
        assert_eq!(urgency_score(&task, &table), 5.5);
    }

    #[test]
    fn score_of_untagged_task_is_zero() {
        let table = urgency_table(&[tag("Follow Up", 10)]);
        let task = one_time("a", &[], noon(2025, 6, 2));
        assert_eq!(urgency_score(&task, &table), 0.0);
    }

    #[test]
    fn duplicate_tag_names_conflate_last_wins() {
        let table = urgency_table(&[tag("Chore", 2), tag("Chore", 9)]);
        assert_eq!(table.get("Chore"), Some(&9));
    }

    #[test]
    fn zero_weight_reads_as_minimum() {
        let table = urgency_table(&[tag("Chore", 0)]);
        assert_eq!(table.get("Chore"), Some(&1));
    }

    #[test]
    fn one_time_due_window_is_inclusive_of_now() {
        let now = noon(2025, 6, 10);
        assert!(is_due(&one_time("past", &[], now - Duration::days(1)), now));
        assert!(is_due(&one_time("at-now", &[], now), now));
        assert!(!is_due(&one_time("future", &[], now + Duration::days(1)), now));
    }

    #[test]
    fn daily_is_always_due() {
        let now = noon(2025, 6, 10);
        assert!(is_due(&recurring("past", "Daily", now - Duration::days(400)), now));
        assert!(is_due(&recurring("future", "Daily", now + Duration::days(400)), now));
    }

    #[test]
    fn weekly_window_spans_zero_to_ten_days_ahead() {
        let now = noon(2025, 6, 10);
        assert!(is_due(&recurring("today", "Weekly", now), now));
        assert!(is_due(&recurring("edge", "Weekly", now + Duration::days(10)), now));
        assert!(!is_due(&recurring("beyond", "Weekly", now + Duration::days(11)), now));
        assert!(!is_due(&recurring("behind", "Weekly", now - Duration::days(1)), now));
    }

    #[test]
    fn monthly_same_month_window_follows_day_numbers() {
        let now = noon(2025, 6, 10);
        assert!(is_due(&recurring("soon", "Monthly", noon(2025, 6, 15)), now));
        // Far end of the month: the comparison only looks at day numbers,
        // not real distance, so day 28 is shown from day 10.
        assert!(is_due(&recurring("far", "Monthly", noon(2025, 6, 28)), now));
        // While the horizon stays inside June, its branch admits earlier
        // days of the month as well, so day 5 still surfaces.
        assert!(is_due(&recurring("earlier", "Monthly", noon(2025, 6, 5)), now));
        // A different month number misses both branches.
        assert!(!is_due(&recurring("may", "Monthly", noon(2025, 5, 15)), now));
    }

    #[test]
    fn monthly_due_when_window_spans_month_boundary() {
        let now = noon(2025, 6, 25);
        // Horizon lands on July 5th.
        assert!(is_due(&recurring("early-july", "Monthly", noon(2025, 7, 3)), now));
        assert!(!is_due(&recurring("mid-july", "Monthly", noon(2025, 7, 8)), now));
    }

    #[test]
    fn monthly_month_equality_ignores_year() {
        let now = noon(2025, 6, 10);
        // Same month number in another year still qualifies.
        assert!(is_due(&recurring("next-year", "Monthly", noon(2026, 6, 15)), now));
    }

    #[test]
    fn unknown_recurrence_is_never_due() {
        let now = noon(2025, 6, 10);
        assert!(!is_due(&recurring("odd", "Fortnightly", now), now));
        assert!(!is_due(&recurring("blank", "", now), now));
    }

    #[test]
    fn excluded_ids_never_appear() {
        let now = noon(2025, 6, 10);
        let tasks = vec![
            one_time("a", &[], now - Duration::days(1)),
            recurring("b", "Daily", now),
        ];
        let excluded: HashSet<String> = ["a".to_string(), "b".to_string()].into();
        assert!(ranked_cue(&tasks, &[], &excluded, now).is_empty());
    }

    #[test]
    fn ranking_sorts_descending_with_stable_ties() {
        let now = noon(2025, 6, 10);
        let tags = vec![tag("Three", 3), tag("Nine", 9), tag("One", 1)];
        let yesterday = now - Duration::days(1);
        let tasks = vec![
            one_time("t3", &["Three"], yesterday),
            one_time("t9-first", &["Nine"], yesterday),
            one_time("t9-second", &["Nine"], yesterday),
            one_time("t1", &["One"], yesterday),
        ];

        let ranked = ranked_cue(&tasks, &tags, &HashSet::new(), now);
        let ids: Vec<&str> = ranked.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["t9-first", "t9-second", "t3", "t1"]);
    }

    #[test]
    fn untagged_tasks_sort_after_scored_ones() {
        let now = noon(2025, 6, 10);
        let tags = vec![tag("Nine", 9)];
        let yesterday = now - Duration::days(1);
        let tasks = vec![
            one_time("bare", &[], yesterday),
            one_time("scored", &["Nine"], yesterday),
        ];

        let ranked = ranked_cue(&tasks, &tags, &HashSet::new(), now);
        let ids: Vec<&str> = ranked.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["scored", "bare"]);
    }

    #[test]
    fn future_one_time_tasks_stay_out_of_the_cue() {
        let now = noon(2025, 6, 10);
        let tasks = vec![
            one_time("due", &[], now - Duration::days(2)),
            one_time("later", &[], now + Duration::days(2)),
        ];

        let ranked = ranked_cue(&tasks, &[], &HashSet::new(), now);
        let ids: Vec<&str> = ranked.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["due"]);
    }
}
