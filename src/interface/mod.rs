pub mod backup_process;
pub mod checker;
pub mod clock;
pub mod core;
pub mod presenter;
pub mod schedule_store;
