pub mod clock;
pub mod format;
pub mod logging;
#[cfg(test)]
pub mod testing;
