use macros::loggable;

loggable! {
    ProcessError {
        #[error("Failed to spawn {program}: {reason}")]
        SpawnFailed { program: String, reason: String } => tracing::Level::ERROR,

        #[error("Process output is not available")]
        OutputUnavailable => tracing::Level::ERROR,

        #[error("Failed to read process output: {reason}")]
        ReadOutputFailed { reason: String } => tracing::Level::ERROR,

        #[error("Failed to wait for process: {reason}")]
        WaitFailed { reason: String } => tracing::Level::ERROR,

        #[error("Process exited unsuccessfully: {status}")]
        ExitedWithFailure { status: String } => tracing::Level::ERROR,
    }
}

loggable! {
    ParseWarning {
        #[error("Unexpected line from rsync: {line}")]
        UnexpectedLine { line: String } => tracing::Level::WARN,
    }
}
