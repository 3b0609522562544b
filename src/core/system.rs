use crate::core::app_config::{AppConfig, DEFAULT_CONFIG_PATH};
use crate::core::backup::rsync_launcher::RsyncLauncher;
use crate::core::control::command_checker::resolve_checker;
use crate::core::control::controller::Controller;
use crate::core::gui_manager::GuiManager;
use crate::core::schedule::backup_scheduler::BackupScheduler;
use crate::interface::clock::Clock;
use crate::interface::core::runnable::Runnable;
use crate::model::error::Error;
use crate::model::error::system::SystemError;
use crate::model::log::system::SystemLog;
use crate::model::status::UserCommand;
use crate::ui::window_presenter::{WindowPresenter, WindowState};
use crate::utils::clock::SystemClock;
use crate::utils::logging::Logging;
use macros::log;
use std::env;
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedSender};
use tokio::sync::oneshot;
use tokio::task::{self, JoinHandle};
use tracing_appender::non_blocking::WorkerGuard;

pub struct System {
    window_state: Arc<WindowState>,
    command_tx: UnboundedSender<UserCommand>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
    _log_guard: WorkerGuard,
}

impl System {
    /// Fails only on an unusable configuration; the error is logged before returning.
    pub async fn initialize() -> Result<Self, Error> {
        let log_guard = Logging::initialize();
        log!(SystemLog::Initializing);

        let config_path = env::args()
            .nth(1)
            .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
        let window_state = Arc::new(WindowState::default());
        let (command_tx, command_rx) = mpsc::unbounded_channel();

        let controller = Self::assemble(config_path, window_state.clone(), command_rx)
            .inspect_err(|err| log!(err))?;
        let (shutdown_tx, handle) = controller.run();

        log!(SystemLog::InitializeComplete);
        Ok(Self {
            window_state,
            command_tx,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
            _log_guard: log_guard,
        })
    }

    fn assemble(
        config_path: String,
        window_state: Arc<WindowState>,
        command_rx: mpsc::UnboundedReceiver<UserCommand>,
    ) -> Result<Controller, Error> {
        let app_config = AppConfig::load(config_path)?;
        let periods = app_config.backups.periods()?;
        let launcher = Arc::new(RsyncLauncher::new(app_config.rsync.clone())?);
        let checker = resolve_checker(app_config.checker.as_ref());
        let controller_settings = app_config.controller;

        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let scheduler = BackupScheduler::new(periods, Box::new(app_config), clock.clone())?;
        let presenter = Arc::new(WindowPresenter::new(window_state));

        Ok(Controller::new(
            scheduler,
            checker,
            launcher,
            presenter,
            clock,
            controller_settings,
            command_rx,
        ))
    }

    /// Runs the window on this thread until it closes.
    pub async fn run(&self) -> Result<(), Error> {
        log!(SystemLog::Online);
        let gui_manager = GuiManager::new(self.window_state.clone(), self.command_tx.clone());
        task::block_in_place(|| gui_manager.start())
    }

    pub async fn terminate(mut self) {
        log!(SystemLog::Terminating);
        if let Some(shutdown_tx) = self.shutdown_tx.take() {
            let _ = shutdown_tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            if let Err(err) = handle.await {
                log!(SystemError::ThreadPanic {
                    reason: err.to_string()
                });
            }
        }
        log!(SystemLog::TerminateComplete);
    }
}
