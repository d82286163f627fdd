//! Leveled logging contract with a tracing-backed default

use std::fmt::Display;

/// Leveled logging adapter the pipeline reports stage failures to.
///
/// Every stage logs full error detail here; only a status code and a
/// caller-authored message ever reach the wire.
pub trait Logger: Send + Sync {
    fn info(&self, message: &dyn Display);
    fn warning(&self, message: &dyn Display);
    fn error(&self, message: &dyn Display);
    fn fatal(&self, message: &dyn Display);
}

/// Default logger forwarding to the `tracing` macros. `fatal` maps to
/// an error event with a `fatal` marker; `tracing` has no fatal level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn info(&self, message: &dyn Display) {
        tracing::info!(message = %message);
    }

    fn warning(&self, message: &dyn Display) {
        tracing::warn!(message = %message);
    }

    fn error(&self, message: &dyn Display) {
        tracing::error!(error = %message);
    }

    fn fatal(&self, message: &dyn Display) {
        tracing::error!(fatal = true, error = %message);
    }
}
