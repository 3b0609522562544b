use macros::loggable;

loggable! {
    SystemLog {
        #[error("Initializing")]
        Initializing => tracing::Level::INFO,

        #[error("Initialization completed")]
        InitializeComplete => tracing::Level::INFO,

        #[error("Online now")]
        Online => tracing::Level::INFO,

        #[error("Reading config file {path}")]
        ReadingConfig { path: String } => tracing::Level::DEBUG,

        #[error("Initializing config file with defaults for section \"backups\"")]
        WritingBackupDefaults => tracing::Level::WARN,

        #[error("Saving config to {path}")]
        SavingConfig { path: String } => tracing::Level::DEBUG,

        #[error("No precondition check configured, backups are always allowed")]
        DefaultChecker => tracing::Level::DEBUG,

        #[error("Using precondition check {program}")]
        CommandChecker { program: String } => tracing::Level::INFO,

        #[error("Gui exited")]
        GuiExited => tracing::Level::INFO,

        #[error("Termination in process")]
        Terminating => tracing::Level::INFO,

        #[error("Termination completed")]
        TerminateComplete => tracing::Level::INFO,
    }
}
