use crate::model::error::Error;
use async_trait::async_trait;

/// A running backup program. Every getter is a non-blocking read of the latest observed value.
#[async_trait]
pub trait BackupProcess: Send + Sync {
    /// Fraction in `[0, 1]`.
    fn get_progress(&self) -> f64;

    /// Bytes transferred so far.
    fn get_size(&self) -> u64;

    fn get_speed(&self) -> String;

    fn is_running(&self) -> bool;

    /// True iff the program exited cleanly and was not cancelled.
    fn was_successful(&self) -> bool;

    /// Stops the program and waits until its worker has stopped.
    async fn cancel(&mut self);
}

/// Starts backup programs on behalf of the scheduler.
pub trait BackupLauncher: Send + Sync {
    fn launch(&self) -> Result<Box<dyn BackupProcess>, Error>;
}
