use crate::interface::backup_process::{BackupLauncher, BackupProcess};
use crate::interface::checker::Checker;
use crate::interface::clock::Clock;
use crate::interface::presenter::Presenter;
use crate::interface::schedule_store::ScheduleStore;
use crate::model::error::Error;
use crate::model::error::checker::CheckerError;
use crate::model::error::config::ConfigError;
use crate::model::error::process::ProcessError;
use crate::model::status::StatusSnapshot;
use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub fn at(timestamp: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(timestamp, 0).unwrap()
}

pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(now: DateTime<Utc>) -> Arc<Self> {
        Arc::new(Self {
            now: Mutex::new(now),
        })
    }

    pub fn advance(&self, delta: TimeDelta) {
        *self.now.lock().unwrap() += delta;
    }

    pub fn advance_secs(&self, seconds: i64) {
        self.advance(TimeDelta::seconds(seconds));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

/// Cloned handles share the stored value, so a test can inspect what the scheduler wrote.
#[derive(Clone, Default)]
pub struct MemoryStore {
    next_at: Arc<Mutex<Option<DateTime<Utc>>>>,
    saves: Arc<AtomicUsize>,
    fail: Arc<AtomicBool>,
}

impl MemoryStore {
    pub fn with_next_at(next_at: DateTime<Utc>) -> Self {
        let store = Self::default();
        *store.next_at.lock().unwrap() = Some(next_at);
        store
    }

    pub fn next_at(&self) -> Option<DateTime<Utc>> {
        *self.next_at.lock().unwrap()
    }

    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn set_failing(&self, failing: bool) {
        self.fail.store(failing, Ordering::SeqCst);
    }
}

impl ScheduleStore for MemoryStore {
    fn load_next_at(&self) -> Option<DateTime<Utc>> {
        self.next_at()
    }

    fn save_next_at(&mut self, next_at: DateTime<Utc>) -> Result<(), Error> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(ConfigError::SaveConfigFailed {
                path: "memory".to_string(),
                reason: "read-only".to_string(),
            }
            .into());
        }
        *self.next_at.lock().unwrap() = Some(next_at);
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
struct FakeProgress {
    progress: f64,
    size: u64,
    speed: String,
    running: bool,
    successful: bool,
}

/// Hands out processes that the test finishes by hand. Only the latest process is driven.
#[derive(Clone, Default)]
pub struct FakeLauncher {
    current: Arc<Mutex<FakeProgress>>,
    launches: Arc<AtomicUsize>,
    cancels: Arc<AtomicUsize>,
    refuse: Arc<AtomicBool>,
}

impl FakeLauncher {
    pub fn launches(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }

    pub fn cancels(&self) -> usize {
        self.cancels.load(Ordering::SeqCst)
    }

    pub fn refuse_next(&self) {
        self.refuse.store(true, Ordering::SeqCst);
    }

    pub fn report(&self, progress: f64, size: u64, speed: &str) {
        let mut current = self.current.lock().unwrap();
        current.progress = progress;
        current.size = size;
        current.speed = speed.to_string();
    }

    pub fn finish(&self, successful: bool, size: u64) {
        let mut current = self.current.lock().unwrap();
        current.size = size;
        current.running = false;
        current.successful = successful;
    }
}

impl BackupLauncher for FakeLauncher {
    fn launch(&self) -> Result<Box<dyn BackupProcess>, Error> {
        if self.refuse.swap(false, Ordering::SeqCst) {
            return Err(ProcessError::SpawnFailed {
                program: "fake".to_string(),
                reason: "refused".to_string(),
            }
            .into());
        }
        self.launches.fetch_add(1, Ordering::SeqCst);
        *self.current.lock().unwrap() = FakeProgress {
            running: true,
            ..FakeProgress::default()
        };
        Ok(Box::new(FakeProcess {
            current: self.current.clone(),
            cancels: self.cancels.clone(),
        }))
    }
}

struct FakeProcess {
    current: Arc<Mutex<FakeProgress>>,
    cancels: Arc<AtomicUsize>,
}

#[async_trait]
impl BackupProcess for FakeProcess {
    fn get_progress(&self) -> f64 {
        self.current.lock().unwrap().progress
    }

    fn get_size(&self) -> u64 {
        self.current.lock().unwrap().size
    }

    fn get_speed(&self) -> String {
        self.current.lock().unwrap().speed.clone()
    }

    fn is_running(&self) -> bool {
        self.current.lock().unwrap().running
    }

    fn was_successful(&self) -> bool {
        self.current.lock().unwrap().successful
    }

    async fn cancel(&mut self) {
        self.cancels.fetch_add(1, Ordering::SeqCst);
        let mut current = self.current.lock().unwrap();
        current.running = false;
        current.successful = false;
    }
}

#[derive(Default)]
pub struct CountingChecker {
    deny: AtomicBool,
    fail: AtomicBool,
    calls: AtomicUsize,
    delay_ms: AtomicU64,
}

impl CountingChecker {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_allowed(&self, allowed: bool) {
        self.deny.store(!allowed, Ordering::SeqCst);
    }

    pub fn set_failing(&self, failing: bool) {
        self.fail.store(failing, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Every later answer takes this long to arrive.
    pub fn set_delay(&self, delay: Duration) {
        self.delay_ms
            .store(delay.as_millis() as u64, Ordering::SeqCst);
    }
}

#[async_trait]
impl Checker for CountingChecker {
    async fn can_backup(&self) -> Result<bool, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let delay = self.delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(CheckerError::EmptyCommand.into());
        }
        Ok(!self.deny.load(Ordering::SeqCst))
    }
}

#[derive(Default)]
pub struct RecordingPresenter {
    snapshots: Mutex<Vec<StatusSnapshot>>,
    notices: Mutex<Vec<String>>,
    hides: AtomicUsize,
    unhides: AtomicUsize,
}

impl RecordingPresenter {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn last_snapshot(&self) -> Option<StatusSnapshot> {
        self.snapshots.lock().unwrap().last().cloned()
    }

    pub fn notices(&self) -> Vec<String> {
        self.notices.lock().unwrap().clone()
    }

    pub fn hides(&self) -> usize {
        self.hides.load(Ordering::SeqCst)
    }

    pub fn unhides(&self) -> usize {
        self.unhides.load(Ordering::SeqCst)
    }
}

impl Presenter for RecordingPresenter {
    fn refresh(&self, snapshot: StatusSnapshot) {
        self.snapshots.lock().unwrap().push(snapshot);
    }

    fn hide(&self) {
        self.hides.fetch_add(1, Ordering::SeqCst);
    }

    fn unhide(&self) {
        self.unhides.fetch_add(1, Ordering::SeqCst);
    }

    fn invalid_action(&self, notice: String) {
        self.notices.lock().unwrap().push(notice);
    }
}
