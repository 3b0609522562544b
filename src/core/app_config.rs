use crate::interface::schedule_store::ScheduleStore;
use crate::model::config::Settings;
use crate::model::error::Error;
use crate::model::error::config::ConfigError;
use crate::model::log::system::SystemLog;
use chrono::{DateTime, Utc};
use macros::log;
use std::fs::{self, File};
use std::io::Write;
use std::ops::Deref;
use std::path::PathBuf;

pub const DEFAULT_CONFIG_PATH: &str = "./config.toml";

/// The configuration file, doubling as the store for the schedule.
pub struct AppConfig {
    path: PathBuf,
    settings: Settings,
}

impl AppConfig {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, Error> {
        let path = path.into();
        log!(SystemLog::ReadingConfig {
            path: path.display().to_string()
        });

        let toml_string = fs::read_to_string(&path).map_err(|err| ConfigError::ConfigNotFound {
            path: path.display().to_string(),
            reason: err.to_string(),
        })?;
        let table = toml::from_str::<toml::Table>(&toml_string).map_err(invalid_config)?;
        let settings = toml::from_str::<Settings>(&toml_string).map_err(invalid_config)?;
        settings.backups.periods()?;

        let app_config = Self { path, settings };
        if !table.contains_key("backups") {
            log!(SystemLog::WritingBackupDefaults);
            app_config.save()?;
        }
        Ok(app_config)
    }

    /// Rewrites the whole file through a synced temporary file and a rename.
    pub fn save(&self) -> Result<(), Error> {
        log!(SystemLog::SavingConfig {
            path: self.path.display().to_string()
        });

        let save_failed = |reason: String| ConfigError::SaveConfigFailed {
            path: self.path.display().to_string(),
            reason,
        };

        let toml_string = toml::to_string_pretty(&self.settings)
            .map_err(|err| save_failed(err.to_string()))?;

        let mut temporary = self.path.clone().into_os_string();
        temporary.push(".tmp");
        let temporary = PathBuf::from(temporary);

        let mut file = File::create(&temporary).map_err(|err| save_failed(err.to_string()))?;
        file.write_all(toml_string.as_bytes())
            .and_then(|_| file.sync_all())
            .map_err(|err| save_failed(err.to_string()))?;
        drop(file);

        fs::rename(&temporary, &self.path).map_err(|err| save_failed(err.to_string()))?;
        Ok(())
    }
}

fn invalid_config(err: toml::de::Error) -> ConfigError {
    ConfigError::InvalidConfig {
        reason: err.to_string(),
    }
}

impl Deref for AppConfig {
    type Target = Settings;

    fn deref(&self) -> &Self::Target {
        &self.settings
    }
}

impl ScheduleStore for AppConfig {
    fn load_next_at(&self) -> Option<DateTime<Utc>> {
        self.settings
            .backups
            .next_at
            .and_then(|next_at| DateTime::from_timestamp(next_at, 0))
    }

    fn save_next_at(&mut self, next_at: DateTime<Utc>) -> Result<(), Error> {
        self.settings.backups.next_at = Some(next_at.timestamp());
        self.save()
    }
}
