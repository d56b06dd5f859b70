//! Logging for drivers and free functions
//!
//! Drivers and the resolver take a `SharedLogger`; code without one writes to
//! the process-wide debug file through the `debug_log!` macro.

mod traits;
mod noop;
mod console;
pub mod file_logger;

pub use traits::{Logger, SharedLogger};
pub use noop::NoOpLogger;
pub use console::ConsoleLogger;

pub use file_logger::{log_file_path, LogLevel};
