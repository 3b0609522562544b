use chrono::{DateTime, TimeDelta, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulePeriods {
    pub backup: TimeDelta,
    pub countdown: TimeDelta,
    pub hide_after: TimeDelta,
}

/// The persisted part of the schedule; `next_run_at` always holds whole seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleState {
    pub next_run_at: DateTime<Utc>,
    pub periods: SchedulePeriods,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackupHistory {
    pub last_backup_time: Option<DateTime<Utc>>,
    pub last_backup_status: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibilityState {
    pub hidden: bool,
    pub last_user_action_at: DateTime<Utc>,
    pub last_unhide_at: DateTime<Utc>,
}

impl VisibilityState {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            hidden: false,
            last_user_action_at: now,
            last_unhide_at: now,
        }
    }
}
