use crate::model::error::Error;
use chrono::{DateTime, Utc};

/// Durable home of `next_run_at`.
pub trait ScheduleStore: Send {
    fn load_next_at(&self) -> Option<DateTime<Utc>>;

    /// Must not return before the value is flushed to storage.
    fn save_next_at(&mut self, next_at: DateTime<Utc>) -> Result<(), Error>;
}
