//! Diagnostic sinks for load and prune messages

use std::sync::Mutex;

/// Receiver for human-readable diagnostics emitted while loading or mutating a table
pub trait Diagnostics: Send + Sync {
    fn info(&self, msg: &str);
    fn warn(&self, msg: &str);
    fn error(&self, msg: &str);
}

/// Forwards every message to `tracing` under the `csvtable` target
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn info(&self, msg: &str) {
        tracing::info!(target: "csvtable", "{}", msg);
    }

    fn warn(&self, msg: &str) {
        tracing::warn!(target: "csvtable", "{}", msg);
    }

    fn error(&self, msg: &str) {
        tracing::error!(target: "csvtable", "{}", msg);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warn,
    Error,
}

/// Keeps every message in memory, in emission order
#[derive(Debug, Default)]
pub struct CapturedDiagnostics {
    messages: Mutex<Vec<(Severity, String)>>,
}

impl CapturedDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<(Severity, String)> {
        self.lock().clone()
    }

    /// Messages of one severity only
    pub fn with_severity(&self, severity: Severity) -> Vec<String> {
        self.lock()
            .iter()
            .filter(|(s, _)| *s == severity)
            .map(|(_, msg)| msg.clone())
            .collect()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn push(&self, severity: Severity, msg: &str) {
        self.lock().push((severity, msg.to_string()));
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<(Severity, String)>> {
        // A poisoned log is still a usable log.
        self.messages
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Diagnostics for CapturedDiagnostics {
    fn info(&self, msg: &str) {
        self.push(Severity::Info, msg);
    }

    fn warn(&self, msg: &str) {
        self.push(Severity::Warn, msg);
    }

    fn error(&self, msg: &str) {
        self.push(Severity::Error, msg);
    }
}
