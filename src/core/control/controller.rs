use crate::core::control::cached_checker::CachedChecker;
use crate::core::schedule::backup_scheduler::BackupScheduler;
use crate::interface::backup_process::BackupLauncher;
use crate::interface::checker::Checker;
use crate::interface::clock::Clock;
use crate::interface::core::runnable::Runnable;
use crate::interface::presenter::Presenter;
use crate::model::config::ControllerSettings;
use crate::model::error::Error;
use crate::model::error::control::ControlError;
use crate::model::log::controller::ControllerLog;
use crate::model::schedule_state::VisibilityState;
use crate::model::status::{Phase, RunSnapshot, StatusSnapshot, UserCommand};
use async_trait::async_trait;
use macros::log;
use std::sync::Arc;
use std::time::Duration;
use tokio::select;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::oneshot;
use tokio::time::{interval, MissedTickBehavior};

/// The single control task. Decides when to hide, unhide and start backups,
/// and applies user commands between ticks.
pub struct Controller {
    scheduler: BackupScheduler,
    checker: CachedChecker,
    launcher: Arc<dyn BackupLauncher>,
    presenter: Arc<dyn Presenter>,
    clock: Arc<dyn Clock>,
    settings: ControllerSettings,
    visibility: VisibilityState,
    command_rx: UnboundedReceiver<UserCommand>,
}

impl Controller {
    pub fn new(
        scheduler: BackupScheduler,
        checker: Arc<dyn Checker>,
        launcher: Arc<dyn BackupLauncher>,
        presenter: Arc<dyn Presenter>,
        clock: Arc<dyn Clock>,
        settings: ControllerSettings,
        command_rx: UnboundedReceiver<UserCommand>,
    ) -> Self {
        let visibility = VisibilityState::new(clock.now());
        Self {
            scheduler,
            checker: CachedChecker::new(checker, clock.clone()),
            launcher,
            presenter,
            clock,
            settings,
            visibility,
            command_rx,
        }
    }

    pub fn phase(&self) -> Phase {
        if self.scheduler.is_running() {
            Phase::BackingUp
        } else if self.visibility.hidden {
            Phase::Hidden
        } else if self.scheduler.is_in_countdown() {
            Phase::VisibleCountdown
        } else {
            Phase::VisibleIdle
        }
    }

    pub async fn tick(&mut self) {
        let now = self.clock.now();

        if !self.visibility.hidden {
            let threshold = now - self.scheduler.state().periods.hide_after;
            let backup_is_old = self
                .scheduler
                .history()
                .last_backup_time
                .is_none_or(|at| at < threshold);
            if backup_is_old
                && self.visibility.last_user_action_at < threshold
                && !self.scheduler.is_running()
                && !self.scheduler.is_in_countdown()
            {
                log!(ControllerLog::Hiding);
                self.hide();
            }
        } else if self.scheduler.is_in_countdown() && self.checker.can_backup().await {
            log!(ControllerLog::EnteringCountdown);
            self.unhide();
        }

        if self.scheduler.is_due()
            && self.visible_long_enough()
            && !self.scheduler.is_running()
            && self.checker.can_backup().await
        {
            self.start_backup();
        }

        self.publish().await;
    }

    /// Runs on the faster interval while a backup is live.
    pub async fn monitor_tick(&mut self) {
        if let Err(err) = self.scheduler.poll_run() {
            log!(err);
        }
        self.publish().await;
    }

    pub async fn handle_command(&mut self, command: UserCommand) {
        self.visibility.last_user_action_at = self.clock.now();

        match command {
            UserCommand::StartNow => {
                if self.checker.can_backup().await {
                    self.start_backup();
                } else {
                    self.reject(ControlError::PreconditionsNotMet);
                }
            }
            UserCommand::Postpone(hours) => {
                if let Err(err) = self.scheduler.postpone(hours) {
                    log!(err);
                }
            }
            UserCommand::Cancel => self.cancel_backup().await,
            UserCommand::Hide => self.hide(),
            UserCommand::Unhide => self.unhide(),
            UserCommand::Quit => {}
        }

        self.publish().await;
    }

    fn visible_long_enough(&self) -> bool {
        !self.visibility.hidden
            && self.visibility.last_unhide_at + self.scheduler.state().periods.countdown
                < self.clock.now()
    }

    fn start_backup(&mut self) {
        match self.scheduler.launch(self.launcher.as_ref()) {
            Ok(()) => {}
            Err(Error::Control(err)) => self.reject(err),
            Err(err) => {
                log!(err);
                self.reject(ControlError::LaunchFailed);
            }
        }
    }

    async fn cancel_backup(&mut self) {
        if let Err(err) = self.scheduler.cancel_run().await {
            log!(err);
        }
    }

    fn reject(&self, err: ControlError) {
        log!(err);
        self.presenter.invalid_action(err.to_string());
    }

    pub fn hide(&mut self) {
        if !self.visibility.hidden {
            self.visibility.hidden = true;
            self.presenter.hide();
        }
    }

    pub fn unhide(&mut self) {
        if self.visibility.hidden {
            self.visibility.hidden = false;
            self.visibility.last_unhide_at = self.clock.now();
            self.presenter.unhide();
        }
    }

    pub async fn snapshot(&mut self) -> StatusSnapshot {
        // Only a visible window polls the checker, like the tick does.
        let can_backup = if self.visibility.hidden {
            self.checker.last_known()
        } else {
            self.checker.can_backup().await
        };
        let run = self.scheduler.live_run().map(|run| RunSnapshot {
            running: !run.state.is_terminal(),
            progress: run.progress,
            bytes_transferred: run.bytes_transferred,
            transfer_speed: run.transfer_speed.clone(),
        });
        let history = self.scheduler.history();

        StatusSnapshot {
            taken_at: self.clock.now(),
            phase: self.phase(),
            hidden: self.visibility.hidden,
            in_countdown: self.scheduler.is_in_countdown(),
            can_backup,
            run,
            next_run_at: self.scheduler.state().next_run_at,
            last_backup_time: history.last_backup_time,
            last_backup_status: history.last_backup_status.clone(),
        }
    }

    async fn publish(&mut self) {
        let snapshot = self.snapshot().await;
        self.presenter.refresh(snapshot);
    }
}

#[async_trait]
impl Runnable for Controller {
    async fn run_impl(mut self, mut shutdown_rx: oneshot::Receiver<()>) {
        log!(ControllerLog::Started);

        let mut control = interval(Duration::from_millis(self.settings.tick_interval_ms));
        control.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut monitor = interval(Duration::from_millis(self.settings.monitor_interval_ms));
        monitor.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            let running = self.scheduler.is_running();
            select! {
                biased;
                _ = &mut shutdown_rx => break,
                command = self.command_rx.recv() => match command {
                    Some(UserCommand::Quit) | None => break,
                    Some(command) => self.handle_command(command).await,
                },
                _ = monitor.tick(), if running => self.monitor_tick().await,
                _ = control.tick() => self.tick().await,
            }
        }

        self.cancel_backup().await;
        log!(ControllerLog::Stopped);
    }
}
