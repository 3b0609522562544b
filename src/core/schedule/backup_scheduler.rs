use crate::interface::backup_process::{BackupLauncher, BackupProcess};
use crate::interface::clock::Clock;
use crate::interface::schedule_store::ScheduleStore;
use crate::model::backup_run::{BackupRun, RunState};
use crate::model::config::hours_to_delta;
use crate::model::error::Error;
use crate::model::error::control::ControlError;
use crate::model::log::schedule::ScheduleLog;
use crate::model::schedule_state::{BackupHistory, SchedulePeriods, ScheduleState};
use crate::utils::format::{format_duration, format_log_timestamp, format_size};
use chrono::{DateTime, TimeDelta, Utc};
use macros::log;
use std::sync::Arc;

struct LiveRun {
    run: BackupRun,
    process: Box<dyn BackupProcess>,
}

/// Owns the schedule and the single live run. Only the controller task mutates it.
pub struct BackupScheduler {
    clock: Arc<dyn Clock>,
    store: Box<dyn ScheduleStore>,
    state: ScheduleState,
    history: BackupHistory,
    live_run: Option<LiveRun>,
}

impl BackupScheduler {
    /// Resumes a persisted `next_at` that lies within one backup period from now,
    /// otherwise schedules the next backup one countdown period ahead.
    /// Either way the value is written back, so an unwritable store fails here.
    pub fn new(
        periods: SchedulePeriods,
        store: Box<dyn ScheduleStore>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, Error> {
        let now = clock.now();
        let persisted = store.load_next_at();

        let mut scheduler = Self {
            clock,
            store,
            state: ScheduleState {
                next_run_at: whole_seconds(now),
                periods,
            },
            history: BackupHistory::default(),
            live_run: None,
        };

        let within_period = |next_at: DateTime<Utc>| {
            now.checked_add_signed(periods.backup)
                .is_none_or(|limit| next_at <= limit)
        };
        match persisted {
            Some(next_at) if next_at >= now && within_period(next_at) => {
                log!(ScheduleLog::ResumingSchedule {
                    next_at: next_at.timestamp()
                });
                scheduler.schedule_at(next_at)?;
            }
            _ => scheduler.schedule_next(periods.countdown)?,
        }

        Ok(scheduler)
    }

    pub fn state(&self) -> &ScheduleState {
        &self.state
    }

    pub fn history(&self) -> &BackupHistory {
        &self.history
    }

    pub fn live_run(&self) -> Option<&BackupRun> {
        self.live_run.as_ref().map(|live| &live.run)
    }

    pub fn is_running(&self) -> bool {
        self.live_run.is_some()
    }

    pub fn is_in_countdown(&self) -> bool {
        self.state.next_run_at - self.state.periods.countdown < self.clock.now()
    }

    pub fn is_due(&self) -> bool {
        self.state.next_run_at < self.clock.now()
    }

    pub fn schedule_next(&mut self, offset: TimeDelta) -> Result<(), Error> {
        let next_run_at = self
            .clock
            .now()
            .checked_add_signed(offset)
            .ok_or(ControlError::ScheduleOutOfRange)?;
        self.schedule_at(next_run_at)
    }

    pub fn schedule_default(&mut self) -> Result<(), Error> {
        self.schedule_next(self.state.periods.backup)
    }

    /// Moves the current `next_run_at` by `hours`; repeated calls add up.
    pub fn postpone(&mut self, hours: f64) -> Result<(), Error> {
        let next_run_at = hours_to_delta(hours)
            .and_then(|delta| self.state.next_run_at.checked_add_signed(delta))
            .ok_or(ControlError::ScheduleOutOfRange)?;
        self.schedule_at(next_run_at)
    }

    fn schedule_at(&mut self, next_run_at: DateTime<Utc>) -> Result<(), Error> {
        let next_run_at = whole_seconds(next_run_at);
        self.state.next_run_at = next_run_at;
        log!(ScheduleLog::NextBackupScheduled {
            next_at: next_run_at.timestamp(),
            local: format_log_timestamp(next_run_at),
        });
        self.store.save_next_at(next_run_at)
    }

    /// Rejected without side effects while a run is live.
    pub fn launch(&mut self, launcher: &dyn BackupLauncher) -> Result<(), Error> {
        if self.live_run.is_some() {
            return Err(ControlError::AlreadyRunning.into());
        }

        let process = launcher.launch()?;
        let run = BackupRun::new(self.clock.now());
        log!(ScheduleLog::BackupStarted {
            run: run.uuid.to_string()
        });
        self.live_run = Some(LiveRun { run, process });
        Ok(())
    }

    /// Copies the latest process values into the live run and records it once it is terminal.
    /// Returns the finished run.
    pub fn poll_run(&mut self) -> Result<Option<BackupRun>, Error> {
        let Some(live) = self.live_run.as_mut() else {
            return Ok(None);
        };

        let state = if live.process.is_running() {
            RunState::Running
        } else if live.process.was_successful() {
            RunState::Succeeded
        } else {
            RunState::Failed
        };
        live.run.observe(
            live.process.get_progress(),
            live.process.get_size(),
            live.process.get_speed(),
            state,
        );

        if !live.run.state.is_terminal() {
            return Ok(None);
        }
        let run = live.run.clone();
        self.record_completion(&run)?;
        Ok(Some(run))
    }

    pub fn record_completion(&mut self, run: &BackupRun) -> Result<(), Error> {
        let now = self.clock.now();
        let status = if run.state == RunState::Succeeded {
            log!(ScheduleLog::BackupSucceeded {
                run: run.uuid.to_string()
            });
            format!(
                "took {} and transferred {}",
                format_duration(now - run.started_at),
                format_size(run.bytes_transferred)
            )
        } else {
            log!(ScheduleLog::BackupFailed {
                run: run.uuid.to_string()
            });
            "failed".to_string()
        };
        log!(ScheduleLog::BackupStatus {
            status: status.clone()
        });

        self.history = BackupHistory {
            last_backup_time: Some(now),
            last_backup_status: status,
        };
        self.live_run = None;
        self.schedule_default()
    }

    /// Stops the live run, if any, and reports whether there was one.
    pub async fn cancel_run(&mut self) -> Result<bool, Error> {
        let Some(live) = self.live_run.as_mut() else {
            return Ok(false);
        };

        live.process.cancel().await;
        live.run.observe(
            live.process.get_progress(),
            live.process.get_size(),
            live.process.get_speed(),
            RunState::Cancelled,
        );
        self.record_cancellation()?;
        Ok(true)
    }

    /// Leaves the backup history untouched.
    pub fn record_cancellation(&mut self) -> Result<(), Error> {
        if let Some(live) = self.live_run.take() {
            log!(ScheduleLog::BackupCancelled {
                run: live.run.uuid.to_string()
            });
        }
        self.schedule_default()
    }
}

fn whole_seconds(at: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp(at.timestamp(), 0).unwrap_or(at)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::error::config::ConfigError;
    use crate::utils::testing::{at, FakeLauncher, ManualClock, MemoryStore};

    const NOW: i64 = 1_700_000_000;

    fn periods() -> SchedulePeriods {
        SchedulePeriods {
            backup: TimeDelta::hours(6),
            countdown: TimeDelta::minutes(30),
            hide_after: TimeDelta::minutes(15),
        }
    }

    fn scheduler(store: &MemoryStore, clock: &Arc<ManualClock>) -> BackupScheduler {
        BackupScheduler::new(periods(), Box::new(store.clone()), clock.clone()).unwrap()
    }

    #[test]
    fn missing_next_at_starts_with_a_countdown() {
        let clock = ManualClock::new(at(NOW));
        let store = MemoryStore::default();

        let scheduler = scheduler(&store, &clock);

        assert_eq!(scheduler.state().next_run_at, at(NOW + 1800));
        assert_eq!(store.next_at(), Some(at(NOW + 1800)));
        assert!(scheduler.is_in_countdown());
    }

    #[test]
    fn stale_next_at_is_replaced() {
        let clock = ManualClock::new(at(NOW));

        let past = MemoryStore::with_next_at(at(NOW - 60));
        assert_eq!(scheduler(&past, &clock).state().next_run_at, at(NOW + 1800));
        assert_eq!(past.next_at(), Some(at(NOW + 1800)));

        let too_far = MemoryStore::with_next_at(at(NOW + 6 * 3600 + 1));
        assert_eq!(scheduler(&too_far, &clock).state().next_run_at, at(NOW + 1800));
    }

    #[test]
    fn valid_next_at_is_resumed_and_written_back() {
        let clock = ManualClock::new(at(NOW));
        let store = MemoryStore::with_next_at(at(NOW + 3600));

        let scheduler = scheduler(&store, &clock);

        assert_eq!(scheduler.state().next_run_at, at(NOW + 3600));
        assert_eq!(store.saves(), 1);
        assert_eq!(store.next_at(), Some(at(NOW + 3600)));
        assert!(!scheduler.is_in_countdown());
    }

    #[test]
    fn unwritable_store_fails_at_startup() {
        let clock = ManualClock::new(at(NOW));

        for store in [
            MemoryStore::with_next_at(at(NOW + 3600)),
            MemoryStore::default(),
        ] {
            store.set_failing(true);
            let result = BackupScheduler::new(periods(), Box::new(store.clone()), clock.clone());
            assert!(matches!(
                result,
                Err(Error::Config(ConfigError::SaveConfigFailed { .. }))
            ));
        }
    }

    #[test]
    fn huge_backup_period_does_not_overflow() {
        let clock = ManualClock::new(at(NOW));
        let store = MemoryStore::with_next_at(at(NOW + 3600));
        let periods = SchedulePeriods {
            backup: TimeDelta::MAX,
            ..periods()
        };

        let mut scheduler =
            BackupScheduler::new(periods, Box::new(store.clone()), clock.clone()).unwrap();
        assert_eq!(scheduler.state().next_run_at, at(NOW + 3600));

        let err = scheduler.schedule_default().unwrap_err();
        assert_eq!(err, Error::Control(ControlError::ScheduleOutOfRange));
        assert_eq!(scheduler.state().next_run_at, at(NOW + 3600));
        assert_eq!(store.next_at(), Some(at(NOW + 3600)));
    }

    #[test]
    fn postpone_out_of_range_is_rejected() {
        let clock = ManualClock::new(at(NOW));
        let store = MemoryStore::with_next_at(at(NOW + 3600));
        let mut scheduler = scheduler(&store, &clock);

        for hours in [1e12, 1e13, f64::INFINITY] {
            let err = scheduler.postpone(hours).unwrap_err();
            assert_eq!(err, Error::Control(ControlError::ScheduleOutOfRange));
        }
        assert_eq!(scheduler.state().next_run_at, at(NOW + 3600));
    }

    #[test]
    fn schedule_next_is_persisted_in_whole_seconds() {
        let clock = ManualClock::new(at(NOW) + TimeDelta::milliseconds(700));
        let store = MemoryStore::default();
        let mut scheduler = scheduler(&store, &clock);

        scheduler.schedule_next(TimeDelta::seconds(90)).unwrap();

        let next_run_at = scheduler.state().next_run_at;
        assert_eq!(next_run_at, at(NOW + 90));
        assert_eq!(next_run_at.timestamp_subsec_nanos(), 0);
        assert_eq!(store.next_at(), Some(next_run_at));
    }

    #[test]
    fn postpone_compounds_from_next_run_at() {
        let clock = ManualClock::new(at(NOW));
        let store = MemoryStore::with_next_at(at(NOW + 3600));
        let mut scheduler = scheduler(&store, &clock);

        scheduler.postpone(0.0).unwrap();
        assert_eq!(scheduler.state().next_run_at, at(NOW + 3600));

        clock.advance_secs(600);
        scheduler.postpone(1.0).unwrap();
        scheduler.postpone(1.0).unwrap();
        assert_eq!(scheduler.state().next_run_at, at(NOW + 3 * 3600));
        assert_eq!(store.next_at(), Some(at(NOW + 3 * 3600)));
    }

    #[test]
    fn due_and_countdown_follow_the_clock() {
        let clock = ManualClock::new(at(NOW));
        let store = MemoryStore::with_next_at(at(NOW + 3600));
        let scheduler = scheduler(&store, &clock);

        clock.advance_secs(1800);
        assert!(!scheduler.is_in_countdown());
        clock.advance_secs(1);
        assert!(scheduler.is_in_countdown());
        assert!(!scheduler.is_due());
        clock.advance_secs(1800);
        assert!(scheduler.is_due());
    }

    #[test]
    fn only_one_run_is_live() {
        let clock = ManualClock::new(at(NOW));
        let store = MemoryStore::default();
        let launcher = FakeLauncher::default();
        let mut scheduler = scheduler(&store, &clock);

        scheduler.launch(&launcher).unwrap();
        let started = scheduler.live_run().cloned();
        let next_run_at = scheduler.state().next_run_at;

        let err = scheduler.launch(&launcher).unwrap_err();
        assert_eq!(err, Error::Control(ControlError::AlreadyRunning));
        assert_eq!(launcher.launches(), 1);
        assert_eq!(scheduler.live_run().cloned(), started);
        assert_eq!(scheduler.state().next_run_at, next_run_at);
    }

    #[test]
    fn successful_run_is_recorded_and_rescheduled() {
        let clock = ManualClock::new(at(NOW));
        let store = MemoryStore::default();
        let launcher = FakeLauncher::default();
        let mut scheduler = scheduler(&store, &clock);

        scheduler.launch(&launcher).unwrap();
        launcher.report(0.5, 512, "1.00kB/s");
        assert_eq!(scheduler.poll_run().unwrap(), None);
        assert_eq!(scheduler.live_run().unwrap().bytes_transferred, 512);

        clock.advance_secs(125);
        launcher.finish(true, 1024);
        let run = scheduler.poll_run().unwrap().unwrap();

        assert_eq!(run.state, RunState::Succeeded);
        assert!(!scheduler.is_running());
        assert_eq!(scheduler.history().last_backup_time, Some(at(NOW + 125)));
        assert_eq!(
            scheduler.history().last_backup_status,
            "took 2 minutes and transferred 1.0KiB"
        );
        assert_eq!(scheduler.state().next_run_at, at(NOW + 125 + 6 * 3600));
        assert_eq!(store.next_at(), Some(at(NOW + 125 + 6 * 3600)));
    }

    #[test]
    fn failed_run_is_recorded_as_failed() {
        let clock = ManualClock::new(at(NOW));
        let store = MemoryStore::default();
        let launcher = FakeLauncher::default();
        let mut scheduler = scheduler(&store, &clock);

        scheduler.launch(&launcher).unwrap();
        launcher.finish(false, 4096);
        let run = scheduler.poll_run().unwrap().unwrap();

        assert_eq!(run.state, RunState::Failed);
        assert_eq!(scheduler.history().last_backup_status, "failed");
    }

    #[tokio::test]
    async fn cancelled_run_keeps_history() {
        let clock = ManualClock::new(at(NOW));
        let store = MemoryStore::default();
        let launcher = FakeLauncher::default();
        let mut scheduler = scheduler(&store, &clock);

        assert!(!scheduler.cancel_run().await.unwrap());

        scheduler.launch(&launcher).unwrap();
        clock.advance_secs(60);
        assert!(scheduler.cancel_run().await.unwrap());

        assert_eq!(launcher.cancels(), 1);
        assert!(!scheduler.is_running());
        assert_eq!(scheduler.history(), &BackupHistory::default());
        assert_eq!(scheduler.state().next_run_at, at(NOW + 60 + 6 * 3600));
    }
}
