use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    Running,
    Succeeded,
    Failed,
    Cancelled,
}

impl RunState {
    pub fn is_terminal(&self) -> bool {
        *self != RunState::Running
    }
}

/// Latest values observed on the progress stream of one process.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunProgress {
    pub fraction: f64,
    pub bytes: u64,
    pub speed: String,
    pub state: RunState,
}

impl RunProgress {
    pub fn apply(&mut self, update: ProgressUpdate) {
        self.fraction = update.fraction;
        self.bytes = self.bytes.max(update.bytes);
        self.speed = update.speed;
    }
}

/// One parsed progress line.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressUpdate {
    pub bytes: u64,
    pub fraction: f64,
    pub speed: String,
}

/// The live backup as seen by the scheduler.
#[derive(Debug, Clone, PartialEq)]
pub struct BackupRun {
    pub uuid: Uuid,
    pub started_at: DateTime<Utc>,
    pub progress: f64,
    pub bytes_transferred: u64,
    pub transfer_speed: String,
    pub state: RunState,
}

impl BackupRun {
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            started_at,
            progress: 0.0,
            bytes_transferred: 0,
            transfer_speed: String::new(),
            state: RunState::Running,
        }
    }

    /// Terminal states are final; later observations are ignored.
    pub fn observe(&mut self, progress: f64, bytes: u64, speed: String, state: RunState) {
        if self.state.is_terminal() {
            return;
        }
        self.progress = progress.clamp(0.0, 1.0);
        self.bytes_transferred = self.bytes_transferred.max(bytes);
        self.transfer_speed = speed;
        self.state = state;
    }
}
