pub mod process_monitor;
pub mod progress_parser;
pub mod rsync_launcher;
