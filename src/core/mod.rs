pub mod app_config;
pub mod backup;
pub mod control;
pub mod gui_manager;
pub mod schedule;
pub mod system;
