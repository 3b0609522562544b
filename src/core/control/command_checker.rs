use crate::interface::checker::{Checker, DefaultChecker};
use crate::model::config::CheckerSettings;
use crate::model::error::Error;
use crate::model::error::checker::CheckerError;
use crate::model::log::system::SystemLog;
use async_trait::async_trait;
use macros::log;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;

/// Allows a backup iff the configured command exits with status 0.
pub struct CommandChecker {
    program: String,
    arguments: Vec<String>,
    timeout_secs: u64,
}

impl CommandChecker {
    pub fn new(settings: &CheckerSettings) -> Result<Self, Error> {
        let (program, arguments) = settings
            .command
            .split_first()
            .ok_or(CheckerError::EmptyCommand)?;
        Ok(Self {
            program: program.clone(),
            arguments: arguments.to_vec(),
            timeout_secs: settings.timeout_secs,
        })
    }
}

#[async_trait]
impl Checker for CommandChecker {
    async fn can_backup(&self) -> Result<bool, Error> {
        let mut command = Command::new(&self.program);
        command
            .args(&self.arguments)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        let status = timeout(Duration::from_secs(self.timeout_secs), command.status())
            .await
            .map_err(|_| CheckerError::CommandTimedOut {
                program: self.program.clone(),
                seconds: self.timeout_secs,
            })?
            .map_err(|err| CheckerError::CommandFailed {
                program: self.program.clone(),
                reason: err.to_string(),
            })?;

        Ok(status.success())
    }
}

/// Picked once at startup; an unusable configuration falls back to the default.
pub fn resolve_checker(settings: Option<&CheckerSettings>) -> Arc<dyn Checker> {
    let Some(settings) = settings else {
        log!(SystemLog::DefaultChecker);
        return Arc::new(DefaultChecker);
    };

    match CommandChecker::new(settings) {
        Ok(checker) => {
            log!(SystemLog::CommandChecker {
                program: checker.program.clone()
            });
            Arc::new(checker)
        }
        Err(err) => {
            log!(err);
            log!(SystemLog::DefaultChecker);
            Arc::new(DefaultChecker)
        }
    }
}
