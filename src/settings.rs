//! Behaviour and appearance settings.
//!
//! Both structs persist through the same storage pattern as the record
//! stores: camelCase JSON under a fixed key, defaults when nothing is
//! stored, failures logged and swallowed.

use serde::{Deserialize, Serialize};
use tracing::error;

use crate::store::Storage;

/// Reminder behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub notifications_enabled: bool,
    pub reminder_hour: u32,
    pub reminder_minute: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            notifications_enabled: true,
            reminder_hour: 8,
            reminder_minute: 30,
        }
    }
}

impl Settings {
    pub const KEY: &'static str = "settings";

    pub fn load(storage: &Storage) -> Self {
        storage.read(Self::KEY).unwrap_or_default()
    }

    pub fn save(&self, storage: &Storage) {
        if let Err(e) = storage.write(Self::KEY, self) {
            error!(key = Self::KEY, error = %e, "failed to persist settings");
        }
    }
}

/// Cosmetic preferences for the bucket shelf. Irrelevant to ranking; kept
/// so stored collections from the mobile app round-trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Visuals {
    pub background: String,
    pub bucket_color: String,
    pub randomize_bucket_colors: bool,
}

impl Default for Visuals {
    fn default() -> Self {
        Visuals {
            background: "wood_texture".to_string(),
            bucket_color: "bucket-white".to_string(),
            randomize_bucket_colors: false,
        }
    }
}

impl Visuals {
    pub const KEY: &'static str = "visuals";

    pub fn load(storage: &Storage) -> Self {
        storage.read(Self::KEY).unwrap_or_default()
    }

    pub fn save(&self, storage: &Storage) {
        if let Err(e) = storage.write(Self::KEY, self) {
            error!(key = Self::KEY, error = %e, "failed to persist visuals");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_default_and_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path());

        let mut settings = Settings::load(&storage);
        assert!(settings.notifications_enabled);
        assert_eq!((settings.reminder_hour, settings.reminder_minute), (8, 30));

        settings.notifications_enabled = false;
        settings.reminder_hour = 7;
        settings.save(&storage);
        assert_eq!(Settings::load(&storage), settings);
    }

    #[test]
    fn visuals_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path());

        let mut visuals = Visuals::load(&storage);
        assert_eq!(visuals.background, "wood_texture");

        visuals.randomize_bucket_colors = true;
        visuals.save(&storage);
        assert_eq!(Visuals::load(&storage), visuals);
    }
}
