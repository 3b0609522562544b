use crate::core::backup::process_monitor::ProcessMonitor;
use crate::interface::backup_process::{BackupLauncher, BackupProcess};
use crate::model::config::RsyncSettings;
use crate::model::error::Error;

/// Starts one `ProcessMonitor` per backup from the `[rsync]` settings.
pub struct RsyncLauncher {
    settings: RsyncSettings,
}

impl RsyncLauncher {
    /// Fails early when either path is missing, so a misconfiguration stops startup.
    pub fn new(settings: RsyncSettings) -> Result<Self, Error> {
        settings.paths()?;
        Ok(Self { settings })
    }
}

impl BackupLauncher for RsyncLauncher {
    fn launch(&self) -> Result<Box<dyn BackupProcess>, Error> {
        let monitor = ProcessMonitor::start(&self.settings)?;
        Ok(Box::new(monitor))
    }
}
