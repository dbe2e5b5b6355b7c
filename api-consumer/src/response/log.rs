//! Sink for non-fatal diagnostics raised while handling a response.

use std::fmt;

use serde_json::Value;

/// Receives non-fatal issues such as unparseable response bodies.
///
/// Fire-and-forget: nothing the sink does affects the result.
pub trait LogSink: Send + Sync + fmt::Debug {
    /// Records `message` under a `context` label, with optional data.
    fn log(&self, context: &str, message: &str, data: Option<&Value>);
}

/// Default [`LogSink`] that emits `tracing` warnings.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogSink;

impl LogSink for TracingLogSink {
    fn log(&self, context: &str, message: &str, data: Option<&Value>) {
        match data {
            Some(data) => tracing::warn!(context, data = %data, "{message}"),
            None => tracing::warn!(context, "{message}"),
        }
    }
}
