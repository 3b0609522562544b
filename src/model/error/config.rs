use macros::loggable;

loggable! {
    ConfigError {
        #[error("Configuration not found: {path} ({reason})")]
        ConfigNotFound { path: String, reason: String } => tracing::Level::ERROR,

        #[error("Invalid configuration: {reason}")]
        InvalidConfig { reason: String } => tracing::Level::ERROR,

        #[error("Invalid period \"backups.{key}\": {hours} hours")]
        InvalidPeriod { key: String, hours: f64 } => tracing::Level::ERROR,

        #[error("Failed to save configuration to {path}: {reason}")]
        SaveConfigFailed { path: String, reason: String } => tracing::Level::ERROR,

        #[error("Section \"rsync\" needs to include the \"from\" path")]
        MissingSourcePath => tracing::Level::ERROR,

        #[error("Section \"rsync\" needs to include the \"to\" path")]
        MissingDestinationPath => tracing::Level::ERROR,
    }
}
