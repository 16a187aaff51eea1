//! Enumerations and field types shared across the stores and the CLI.

use clap::ValueEnum;

/// Recurrence frequency for repeating tasks.
///
/// Task records persist the frequency as a raw string (`recurringDetails`),
/// so this enum only exists on the in-memory side: parsed on demand, and
/// anything unrecognised simply parses to `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Recurrence {
    Daily,
    Weekly,
    Monthly,
}

impl Recurrence {
    /// Parse the stored frequency string. Unknown values (including the
    /// empty string left by an unfinished creation flow) yield `None`.
    pub fn parse(s: &str) -> Option<Recurrence> {
        match s {
            "Daily" => Some(Recurrence::Daily),
            "Weekly" => Some(Recurrence::Weekly),
            "Monthly" => Some(Recurrence::Monthly),
            _ => None,
        }
    }

    /// The exact string written into `recurringDetails`.
    pub fn as_wire_str(&self) -> &'static str {
        match self {
            Recurrence::Daily => "Daily",
            Recurrence::Weekly => "Weekly",
            Recurrence::Monthly => "Monthly",
        }
    }
}

/// Format a recurrence column for table output.
pub fn format_recurrence(is_recurring: bool, details: &str) -> String {
    if !is_recurring {
        return "once".into();
    }
    match Recurrence::parse(details) {
        Some(r) => r.as_wire_str().to_lowercase(),
        None => "?".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_exact_match() {
        assert_eq!(Recurrence::parse("Daily"), Some(Recurrence::Daily));
        assert_eq!(Recurrence::parse("Weekly"), Some(Recurrence::Weekly));
        assert_eq!(Recurrence::parse("Monthly"), Some(Recurrence::Monthly));
        assert_eq!(Recurrence::parse("daily"), None);
        assert_eq!(Recurrence::parse(""), None);
        assert_eq!(Recurrence::parse("Fortnightly"), None);
    }
}
