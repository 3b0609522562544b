use crate::core::backup::progress_parser::{parse_progress_line, LineReader};
use crate::interface::backup_process::BackupProcess;
use crate::model::backup_run::{RunProgress, RunState};
use crate::model::config::RsyncSettings;
use crate::model::error::Error;
use crate::model::error::process::ProcessError;
use crate::model::error::system::SystemError;
use crate::model::log::monitor::MonitorLog;
use crate::platform;
use async_trait::async_trait;
use macros::log;
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use tokio::process::{Child, ChildStdout, Command};
use tokio::select;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;

/// One external synchronization command and the worker following its output.
///
/// The worker task is the only writer of the progress channel while it runs;
/// `cancel` writes the final state once the worker has stopped.
pub struct ProcessMonitor {
    progress: Arc<watch::Sender<RunProgress>>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl ProcessMonitor {
    /// Runs `<program> <options...> --info=progress2 <from> <to>`.
    pub fn start(settings: &RsyncSettings) -> Result<Self, Error> {
        let (from, to) = settings.paths()?;

        let mut command = Command::new(&settings.program);
        command.args(settings.arguments()).arg(from).arg(to);
        Ok(Self::spawn(command))
    }

    /// Spawns any command whose standard output follows the progress protocol.
    /// A command that cannot be spawned yields a finished, unsuccessful monitor.
    pub fn spawn(mut command: Command) -> Self {
        command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .kill_on_drop(true);

        let (progress, _) = watch::channel(RunProgress::default());
        let progress = Arc::new(progress);
        let program = command.as_std().get_program().to_string_lossy().into_owned();

        match command.spawn() {
            Ok(child) => {
                log!(MonitorLog::ProcessSpawned {
                    program,
                    pid: child.id().unwrap_or_default(),
                });
                let (shutdown_tx, shutdown_rx) = oneshot::channel();
                let handle = tokio::spawn(Self::follow(child, progress.clone(), shutdown_rx));
                Self {
                    progress,
                    shutdown_tx: Some(shutdown_tx),
                    handle: Some(handle),
                }
            }
            Err(err) => {
                log!(ProcessError::SpawnFailed {
                    program,
                    reason: err.to_string(),
                });
                progress.send_modify(|current| current.state = RunState::Failed);
                Self {
                    progress,
                    shutdown_tx: None,
                    handle: None,
                }
            }
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<RunProgress> {
        self.progress.subscribe()
    }

    async fn follow(
        mut child: Child,
        progress: Arc<watch::Sender<RunProgress>>,
        mut shutdown_rx: oneshot::Receiver<()>,
    ) {
        let stdout = child.stdout.take();

        // A dropped sender counts as a shutdown request.
        let outcome = select! {
            biased;
            _ = &mut shutdown_rx => None,
            result = Self::consume(stdout, &mut child, &progress) => Some(result),
        };

        let state = match outcome {
            None => {
                log!(MonitorLog::Terminating);
                platform::terminate(&mut child).await;
                RunState::Cancelled
            }
            Some(Ok(status)) if status.success() => RunState::Succeeded,
            Some(Ok(status)) => {
                log!(ProcessError::ExitedWithFailure {
                    status: status.to_string()
                });
                RunState::Failed
            }
            Some(Err(err)) => {
                log!(err);
                platform::terminate(&mut child).await;
                RunState::Failed
            }
        };

        progress.send_modify(|current| current.state = state);
    }

    async fn consume(
        stdout: Option<ChildStdout>,
        child: &mut Child,
        progress: &watch::Sender<RunProgress>,
    ) -> Result<ExitStatus, Error> {
        let stdout = stdout.ok_or(ProcessError::OutputUnavailable)?;
        let mut reader = LineReader::new(stdout);

        while let Some(line) = reader
            .next_line()
            .await
            .map_err(|err| ProcessError::ReadOutputFailed {
                reason: err.to_string(),
            })?
        {
            if line.trim().is_empty() {
                continue;
            }
            match parse_progress_line(&line) {
                Ok(update) => progress.send_modify(|current| current.apply(update)),
                Err(warning) => log!(warning),
            }
        }

        let status = child.wait().await.map_err(|err| ProcessError::WaitFailed {
            reason: err.to_string(),
        })?;
        Ok(status)
    }
}

#[async_trait]
impl BackupProcess for ProcessMonitor {
    fn get_progress(&self) -> f64 {
        self.progress.borrow().fraction
    }

    fn get_size(&self) -> u64 {
        self.progress.borrow().bytes
    }

    fn get_speed(&self) -> String {
        self.progress.borrow().speed.clone()
    }

    fn is_running(&self) -> bool {
        !self.progress.borrow().state.is_terminal()
    }

    fn was_successful(&self) -> bool {
        self.progress.borrow().state == RunState::Succeeded
    }

    /// No-op once the process has finished on its own.
    async fn cancel(&mut self) {
        if !self.is_running() {
            return;
        }
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
        self.progress
            .send_modify(|current| current.state = RunState::Cancelled);
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::model::error::config::ConfigError;
    use crate::platform::process::TERMINATE_GRACE;
    use std::path::PathBuf;
    use std::time::Duration;
    use tokio::time::{timeout, Instant};

    fn shell(script: &str) -> Command {
        let mut command = Command::new("sh");
        command.arg("-c").arg(script);
        command
    }

    async fn finished(monitor: &ProcessMonitor) -> RunProgress {
        let mut receiver = monitor.subscribe();
        let progress = timeout(
            Duration::from_secs(10),
            receiver.wait_for(|progress| progress.state.is_terminal()),
        )
        .await
        .expect("process did not finish in time")
        .expect("progress channel closed")
        .clone();
        progress
    }

    #[tokio::test]
    async fn progress_lines_update_the_latest_values() {
        let monitor = ProcessMonitor::spawn(shell(
            "echo 'receiving incremental file list'; echo '1,048,576 45% 2.00MB/s'; echo 'sent 10 bytes'",
        ));

        let progress = finished(&monitor).await;

        assert_eq!(progress.bytes, 1_048_576);
        assert_eq!(progress.fraction, 0.45);
        assert_eq!(progress.speed, "2.00MB/s");
        assert!(!monitor.is_running());
        assert!(monitor.was_successful());
        assert_eq!(monitor.get_size(), 1_048_576);
        assert_eq!(monitor.get_progress(), 0.45);
        assert_eq!(monitor.get_speed(), "2.00MB/s");
    }

    #[tokio::test]
    async fn carriage_return_updates_are_followed() {
        let monitor = ProcessMonitor::spawn(shell("printf '10 1%% 1kB/s\\r20 2%% 2kB/s\\r'"));

        let progress = finished(&monitor).await;

        assert_eq!(progress.bytes, 20);
        assert_eq!(progress.speed, "2kB/s");
        assert!(monitor.was_successful());
    }

    #[tokio::test]
    async fn non_zero_exit_is_unsuccessful() {
        let monitor = ProcessMonitor::spawn(shell("echo '1,024 100% 1kB/s'; exit 23"));

        let progress = finished(&monitor).await;

        assert_eq!(progress.state, RunState::Failed);
        assert_eq!(monitor.get_size(), 1_024);
        assert!(!monitor.was_successful());
    }

    #[tokio::test]
    async fn missing_program_is_unsuccessful() {
        let monitor = ProcessMonitor::spawn(Command::new("/nonexistent/rsync"));

        assert!(!monitor.is_running());
        assert!(!monitor.was_successful());
    }

    #[tokio::test]
    async fn cancel_stops_a_running_process() {
        let mut monitor = ProcessMonitor::spawn(shell("exec sleep 30"));
        assert!(monitor.is_running());

        timeout(Duration::from_secs(10), monitor.cancel())
            .await
            .expect("cancel did not return in time");

        assert!(!monitor.is_running());
        assert!(!monitor.was_successful());
        assert_eq!(monitor.subscribe().borrow().state, RunState::Cancelled);
    }

    #[tokio::test]
    async fn cancel_kills_a_process_that_ignores_sigterm() {
        let mut monitor =
            ProcessMonitor::spawn(shell("trap '' TERM; echo '1 1% 1kB/s'; exec sleep 30"));
        // The progress line is printed after the trap is in place.
        let mut receiver = monitor.subscribe();
        timeout(
            Duration::from_secs(10),
            receiver.wait_for(|progress| progress.bytes == 1),
        )
        .await
        .expect("process did not report progress in time")
        .expect("progress channel closed");

        let started = Instant::now();
        timeout(Duration::from_secs(15), monitor.cancel())
            .await
            .expect("cancel did not return in time");

        assert!(started.elapsed() >= TERMINATE_GRACE - Duration::from_millis(100));
        assert!(!monitor.is_running());
        assert_eq!(monitor.subscribe().borrow().state, RunState::Cancelled);
    }

    #[tokio::test]
    async fn cancel_after_completion_keeps_the_outcome() {
        let mut monitor = ProcessMonitor::spawn(shell("true"));
        finished(&monitor).await;

        monitor.cancel().await;

        assert!(monitor.was_successful());
    }

    #[tokio::test]
    async fn start_requires_both_paths() {
        let settings = RsyncSettings {
            from: Some(PathBuf::from("/home/user/")),
            ..RsyncSettings::default()
        };
        let err = ProcessMonitor::start(&settings).err().unwrap();
        assert_eq!(err, Error::Config(ConfigError::MissingDestinationPath));
    }
}
