pub mod cached_checker;
pub mod command_checker;
pub mod controller;
