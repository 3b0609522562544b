pub mod checker;
pub mod config;
pub mod control;
pub mod process;
pub mod system;

use crate::model::error::checker::CheckerError;
use crate::model::error::config::ConfigError;
use crate::model::error::control::ControlError;
use crate::model::error::process::ProcessError;
use crate::model::error::system::SystemError;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Checker(CheckerError),
    #[error(transparent)]
    Config(ConfigError),
    #[error(transparent)]
    Control(ControlError),
    #[error(transparent)]
    Process(ProcessError),
    #[error(transparent)]
    System(SystemError),
}

impl Error {
    pub fn level(&self) -> tracing::Level {
        match self {
            Self::Checker(err) => err.level(),
            Self::Config(err) => err.level(),
            Self::Control(err) => err.level(),
            Self::Process(err) => err.level(),
            Self::System(err) => err.level(),
        }
    }
}

impl From<CheckerError> for Error {
    fn from(error: CheckerError) -> Self {
        Self::Checker(error)
    }
}

impl From<ConfigError> for Error {
    fn from(error: ConfigError) -> Self {
        Self::Config(error)
    }
}

impl From<ControlError> for Error {
    fn from(error: ControlError) -> Self {
        Self::Control(error)
    }
}

impl From<ProcessError> for Error {
    fn from(error: ProcessError) -> Self {
        Self::Process(error)
    }
}

impl From<SystemError> for Error {
    fn from(error: SystemError) -> Self {
        Self::System(error)
    }
}
