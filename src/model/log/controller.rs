use macros::loggable;

loggable! {
    ControllerLog {
        #[error("Hiding because of user inactivity and sufficient time from last backup")]
        Hiding => tracing::Level::DEBUG,

        #[error("Un-hiding, entering countdown state")]
        EnteringCountdown => tracing::Level::DEBUG,

        #[error("Controller loop started")]
        Started => tracing::Level::DEBUG,

        #[error("Controller loop stopped")]
        Stopped => tracing::Level::DEBUG,
    }
}
