pub mod controller;
pub mod monitor;
pub mod schedule;
pub mod system;
