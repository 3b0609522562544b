use macros::loggable;

loggable! {
    SystemError {
        #[error("Background worker panicked: {reason}")]
        ThreadPanic { reason: String } => tracing::Level::ERROR,

        #[error("Window could not be opened: {reason}")]
        GuiFailed { reason: String } => tracing::Level::ERROR,

        #[error("Controller has already stopped")]
        ControllerStopped => tracing::Level::WARN,
    }
}
