//! Pluggable debug-logging sink.
//!
//! The engine writes free-text trace lines here. A logger has no return
//! value and cannot influence control flow.

/// Receives one diagnostic line per call.
pub trait Logger: Send + Sync {
    fn debug_log(&self, message: &str);
}

/// Default sink: forwards every line to `tracing` at debug level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn debug_log(&self, message: &str) {
        tracing::debug!(target: "switchyard", "{}", message);
    }
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullLogger;

impl Logger for NullLogger {
    fn debug_log(&self, _message: &str) {}
}

impl<F> Logger for F
where
    F: Fn(&str) + Send + Sync,
{
    fn debug_log(&self, message: &str) {
        self(message)
    }
}
