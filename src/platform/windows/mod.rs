pub mod process;

pub use process::terminate;
