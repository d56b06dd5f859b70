//! Silent logger

use std::sync::Arc;

use super::traits::{Logger, SharedLogger};

/// Logger that discards everything
///
/// Default logger for drivers built without one.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpLogger;

impl NoOpLogger {
    pub fn new() -> Self {
        Self
    }

    /// Shared handle, ready to pass to a driver
    pub fn shared() -> SharedLogger {
        Arc::new(Self)
    }
}

impl Logger for NoOpLogger {
    fn debug(&self, _message: &str) {}
    fn info(&self, _message: &str) {}
    fn warn(&self, _message: &str) {}
    fn error(&self, _message: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noop_logger_through_shared_handle() {
        let logger = NoOpLogger::shared();
        crate::log_debug!(logger, "reading {}", "db-pass");
        logger.info("info message");
        logger.warn("warn message");
        logger.error("error message");
    }
}
