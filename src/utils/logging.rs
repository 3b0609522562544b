use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

const LOG_DIRECTORY: &str = "./logs";
const LOG_FILE_PREFIX: &str = "sync-sentinel.log";

pub struct Logging;

impl Logging {
    /// Console plus a daily file in `./logs`. Keep the guard alive until exit,
    /// or buffered lines are lost.
    pub fn initialize() -> WorkerGuard {
        let file_appender = rolling::daily(LOG_DIRECTORY, LOG_FILE_PREFIX);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        let file_layer = fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_target(false);

        let console_layer = fmt::layer().with_target(false);

        // A second initialization only happens in tests and is harmless.
        let _ = tracing_subscriber::registry()
            .with(env_filter)
            .with(file_layer)
            .with(console_layer)
            .try_init();

        log_panics::init();

        guard
    }
}
