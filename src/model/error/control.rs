use macros::loggable;

loggable! {
    ControlError {
        #[error("backup is already in progress")]
        AlreadyRunning => tracing::Level::WARN,

        #[error("cannot backup at this time")]
        PreconditionsNotMet => tracing::Level::WARN,

        #[error("backup could not be started")]
        LaunchFailed => tracing::Level::WARN,

        #[error("next backup time is out of range")]
        ScheduleOutOfRange => tracing::Level::WARN,
    }
}
