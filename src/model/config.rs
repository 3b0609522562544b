use crate::model::error::Error;
use crate::model::error::config::ConfigError;
use crate::model::schedule_state::SchedulePeriods;
use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const PROGRESS_FLAG: &str = "--info=progress2";

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Settings {
    #[serde(default)]
    pub rsync: RsyncSettings,
    #[serde(default)]
    pub backups: BackupSettings,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checker: Option<CheckerSettings>,
    #[serde(default)]
    pub controller: ControllerSettings,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RsyncSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<PathBuf>,
    #[serde(default)]
    pub options: String,
    #[serde(default = "default_program")]
    pub program: String,
}

impl Default for RsyncSettings {
    fn default() -> Self {
        Self {
            from: None,
            to: None,
            options: String::new(),
            program: default_program(),
        }
    }
}

impl RsyncSettings {
    /// Source and destination, or the ConfigError naming the missing one.
    pub fn paths(&self) -> Result<(&PathBuf, &PathBuf), Error> {
        let from = self
            .from
            .as_ref()
            .filter(|path| !path.as_os_str().is_empty())
            .ok_or(ConfigError::MissingSourcePath)?;
        let to = self
            .to
            .as_ref()
            .filter(|path| !path.as_os_str().is_empty())
            .ok_or(ConfigError::MissingDestinationPath)?;
        Ok((from, to))
    }

    /// Arguments placed between the program name and the two paths.
    pub fn arguments(&self) -> Vec<String> {
        self.options
            .split_whitespace()
            .map(str::to_string)
            .chain(std::iter::once(PROGRESS_FLAG.to_string()))
            .collect()
    }
}

fn default_program() -> String {
    "rsync".to_string()
}

/// All periods are in hours, as written by hand in the config file.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BackupSettings {
    pub delay: f64,
    pub countdown: f64,
    pub hide_after: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_at: Option<i64>,
}

impl Default for BackupSettings {
    fn default() -> Self {
        Self {
            delay: 6.0,
            countdown: 0.5,
            hide_after: 0.25,
            next_at: None,
        }
    }
}

impl BackupSettings {
    pub fn periods(&self) -> Result<SchedulePeriods, Error> {
        Ok(SchedulePeriods {
            backup: hours_to_period("delay", self.delay)?,
            countdown: hours_to_period("countdown", self.countdown)?,
            hide_after: hours_to_period("hide_after", self.hide_after)?,
        })
    }
}

/// About a century, far enough that `now + period` stays inside the calendar.
const MAX_PERIOD_HOURS: f64 = 1_000_000.0;

fn hours_to_period(key: &str, hours: f64) -> Result<TimeDelta, Error> {
    let invalid = || ConfigError::InvalidPeriod {
        key: key.to_string(),
        hours,
    };
    if !hours.is_finite() || !(0.0..=MAX_PERIOD_HOURS).contains(&hours) {
        return Err(invalid().into());
    }
    hours_to_delta(hours).ok_or_else(|| invalid().into())
}

/// Whole seconds, truncated. `None` when the value does not fit a `TimeDelta`.
pub fn hours_to_delta(hours: f64) -> Option<TimeDelta> {
    if !hours.is_finite() {
        return None;
    }
    TimeDelta::try_seconds((hours * 3600.0) as i64)
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CheckerSettings {
    #[serde(default)]
    pub command: Vec<String>,
    #[serde(default = "default_checker_timeout")]
    pub timeout_secs: u64,
}

fn default_checker_timeout() -> u64 {
    30
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct ControllerSettings {
    #[serde(default = "default_tick_interval")]
    pub tick_interval_ms: u64,
    #[serde(default = "default_monitor_interval")]
    pub monitor_interval_ms: u64,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval(),
            monitor_interval_ms: default_monitor_interval(),
        }
    }
}

fn default_tick_interval() -> u64 {
    10_000
}

fn default_monitor_interval() -> u64 {
    500
}
