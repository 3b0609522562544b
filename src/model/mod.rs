pub mod backup_run;
pub mod config;
pub mod error;
pub mod log;
pub mod schedule_state;
pub mod status;
