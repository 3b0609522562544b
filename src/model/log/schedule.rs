use macros::loggable;

loggable! {
    ScheduleLog {
        #[error("Found valid \"next_at = {next_at}\" in the config")]
        ResumingSchedule { next_at: i64 } => tracing::Level::INFO,

        #[error("Scheduling next backup at {next_at} ({local})")]
        NextBackupScheduled { next_at: i64, local: String } => tracing::Level::INFO,

        #[error("Starting backup {run}")]
        BackupStarted { run: String } => tracing::Level::INFO,

        #[error("Backup {run} was successful")]
        BackupSucceeded { run: String } => tracing::Level::INFO,

        #[error("Backup {run} failed")]
        BackupFailed { run: String } => tracing::Level::WARN,

        #[error("Backup {run} was cancelled")]
        BackupCancelled { run: String } => tracing::Level::INFO,

        #[error("Backup status: {status}")]
        BackupStatus { status: String } => tracing::Level::DEBUG,
    }
}
