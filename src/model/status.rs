use crate::utils::format::{format_duration, format_timestamp};
use chrono::{DateTime, Utc};

const TITLE: &str = "backup util";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    VisibleIdle,
    VisibleCountdown,
    Hidden,
    BackingUp,
}

/// Commands accepted from the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UserCommand {
    StartNow,
    Postpone(f64),
    Cancel,
    Hide,
    Unhide,
    Quit,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunSnapshot {
    pub running: bool,
    pub progress: f64,
    pub bytes_transferred: u64,
    pub transfer_speed: String,
}

/// Everything a renderer needs, captured at `taken_at`.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusSnapshot {
    pub taken_at: DateTime<Utc>,
    pub phase: Phase,
    pub hidden: bool,
    pub in_countdown: bool,
    pub can_backup: bool,
    pub run: Option<RunSnapshot>,
    pub next_run_at: DateTime<Utc>,
    pub last_backup_time: Option<DateTime<Utc>>,
    pub last_backup_status: String,
}

impl StatusSnapshot {
    pub fn backup_line(&self) -> String {
        if let Some(run) = &self.run {
            let (progress, speed) = if run.running {
                (run.progress, format!("at {}, ", run.transfer_speed))
            } else {
                (0.0, String::new())
            };
            return format!(
                "backing-up your files {speed}{}% done",
                (progress * 100.0) as u32
            );
        }

        let before = self.next_run_at > self.taken_at;
        let mut text = format!(
            "next backup {} scheduled at {}",
            if before { "is" } else { "was" },
            format_timestamp(self.next_run_at)
        );
        if before {
            text.push_str(&format!(
                " ({} from now)",
                format_duration(self.next_run_at - self.taken_at)
            ));
        } else if !self.can_backup {
            text.push_str(" and will start as soon as possible");
        }
        text
    }

    pub fn history_line(&self) -> String {
        match self.last_backup_time {
            Some(at) if self.last_backup_status.is_empty() => {
                format!("last backup finished at {}", format_timestamp(at))
            }
            Some(at) => format!(
                "last backup finished at {}, {}",
                format_timestamp(at),
                self.last_backup_status
            ),
            None => String::new(),
        }
    }

    pub fn title(&self) -> String {
        if self.run.is_some() {
            TITLE.to_string()
        } else if !self.can_backup {
            format!("{TITLE} - preconditions not met")
        } else if self.in_countdown {
            format!("{TITLE} - in countdown")
        } else {
            TITLE.to_string()
        }
    }
}
