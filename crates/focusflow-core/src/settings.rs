//! Timer and goal configuration.
//!
//! Settings control phase durations, the long-break cadence, daily/weekly
//! pomodoro goals and auto-start behavior. The record is immutable per
//! update: commands replace the whole value rather than mutating fields.

use serde::{Deserialize, Serialize};

use crate::error::SettingsError;
use crate::session::SessionType;

/// User-configurable timer settings.
///
/// Every field carries a serde default so partially persisted records from
/// older versions keep decoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Work phase length in minutes.
    #[serde(default = "default_work_duration")]
    pub work_duration: u32,
    /// Short break length in minutes.
    #[serde(default = "default_short_break")]
    pub short_break_duration: u32,
    /// Long break length in minutes.
    #[serde(default = "default_long_break")]
    pub long_break_duration: u32,
    /// Number of work phases before a long break.
    #[serde(default = "default_long_break_interval")]
    pub long_break_interval: u32,
    /// Target completed pomodoros per day.
    #[serde(default = "default_daily_goal")]
    pub daily_goal: u32,
    /// Target completed pomodoros per trailing week.
    #[serde(default = "default_weekly_goal")]
    pub weekly_goal: u32,
    #[serde(default)]
    pub auto_start_breaks: bool,
    #[serde(default)]
    pub auto_start_work: bool,
    /// Presentation-layer flag; no behavior in this crate.
    #[serde(default = "default_true")]
    pub notifications_enabled: bool,
    /// Presentation-layer flag; no behavior in this crate.
    #[serde(default = "default_true")]
    pub sound_enabled: bool,
}

fn default_work_duration() -> u32 {
    25
}
fn default_short_break() -> u32 {
    5
}
fn default_long_break() -> u32 {
    15
}
fn default_long_break_interval() -> u32 {
    4
}
fn default_daily_goal() -> u32 {
    8
}
fn default_weekly_goal() -> u32 {
    40
}
fn default_true() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            work_duration: default_work_duration(),
            short_break_duration: default_short_break(),
            long_break_duration: default_long_break(),
            long_break_interval: default_long_break_interval(),
            daily_goal: default_daily_goal(),
            weekly_goal: default_weekly_goal(),
            auto_start_breaks: false,
            auto_start_work: false,
            notifications_enabled: true,
            sound_enabled: true,
        }
    }
}

impl Settings {
    /// Validate field ranges: all durations > 0, interval >= 1.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::InvalidValue`] naming the offending field.
    pub fn validate(&self) -> Result<(), SettingsError> {
        let positive = [
            ("work_duration", self.work_duration),
            ("short_break_duration", self.short_break_duration),
            ("long_break_duration", self.long_break_duration),
            ("long_break_interval", self.long_break_interval),
        ];
        for (field, value) in positive {
            if value == 0 {
                return Err(SettingsError::InvalidValue {
                    field: field.to_string(),
                    message: "must be at least 1".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Configured length of a phase in minutes.
    pub fn phase_minutes(&self, phase: SessionType) -> u32 {
        match phase {
            SessionType::Work => self.work_duration,
            SessionType::ShortBreak => self.short_break_duration,
            SessionType::LongBreak => self.long_break_duration,
        }
    }

    /// Configured length of a phase in seconds.
    pub fn phase_secs(&self, phase: SessionType) -> u32 {
        self.phase_minutes(phase).saturating_mul(60)
    }

    /// Serialize to TOML for settings export.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Parse from TOML, filling missing fields with defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be parsed.
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_are_valid() {
        let s = Settings::default();
        assert!(s.validate().is_ok());
        assert_eq!(s.work_duration, 25);
        assert_eq!(s.long_break_interval, 4);
        assert_eq!(s.daily_goal, 8);
    }

    #[test]
    fn zero_duration_is_rejected() {
        let s = Settings {
            short_break_duration: 0,
            ..Settings::default()
        };
        assert!(s.validate().is_err());
    }

    #[test]
    fn zero_interval_is_rejected() {
        let s = Settings {
            long_break_interval: 0,
            ..Settings::default()
        };
        assert!(s.validate().is_err());
    }

    #[test]
    fn zero_goals_are_allowed() {
        // Goal progress is defined as 0 for zero goals; the fields themselves
        // are not validation errors.
        let s = Settings {
            daily_goal: 0,
            weekly_goal: 0,
            ..Settings::default()
        };
        assert!(s.validate().is_ok());
    }

    #[test]
    fn phase_secs_follows_configured_minutes() {
        let s = Settings::default();
        assert_eq!(s.phase_secs(SessionType::Work), 25 * 60);
        assert_eq!(s.phase_secs(SessionType::ShortBreak), 5 * 60);
        assert_eq!(s.phase_secs(SessionType::LongBreak), 15 * 60);
    }

    #[test]
    fn toml_roundtrip() {
        let s = Settings::default();
        let doc = s.to_toml().unwrap();
        let parsed = Settings::from_toml(&doc).unwrap();
        assert_eq!(parsed, s);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let parsed = Settings::from_toml("work_duration = 50\n").unwrap();
        assert_eq!(parsed.work_duration, 50);
        assert_eq!(parsed.short_break_duration, 5);
        assert!(parsed.notifications_enabled);
    }
}
