use macros::loggable;

loggable! {
    MonitorLog {
        #[error("Spawned {program} (pid {pid})")]
        ProcessSpawned { program: String, pid: u32 } => tracing::Level::DEBUG,

        #[error("Terminating process after cancellation")]
        Terminating => tracing::Level::DEBUG,
    }
}
