use crate::core::system::System;
use macros::log;
use std::process::ExitCode;

mod core;
mod interface;
mod model;
mod platform;
mod ui;
mod utils;

#[tokio::main]
async fn main() -> ExitCode {
    let Ok(system) = System::initialize().await else {
        return ExitCode::FAILURE;
    };
    let result = system.run().await;
    if let Err(err) = &result {
        log!(err);
    }
    system.terminate().await;
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(_) => ExitCode::FAILURE,
    }
}
