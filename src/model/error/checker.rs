use macros::loggable;

loggable! {
    CheckerError {
        #[error("Precondition check command is empty")]
        EmptyCommand => tracing::Level::WARN,

        #[error("Failed to run precondition check {program}: {reason}")]
        CommandFailed { program: String, reason: String } => tracing::Level::WARN,

        #[error("Precondition check {program} did not finish within {seconds}s")]
        CommandTimedOut { program: String, seconds: u64 } => tracing::Level::WARN,
    }
}
