use crate::domain::diagnostic::{Diagnostic, Severity};
use crate::domain::ports::Reporter;
use std::cell::Cell;

/// Forwards diagnostics to `tracing` and keeps a count per severity.
#[derive(Debug, Default)]
pub struct TracingReporter {
    infos: Cell<usize>,
    warnings: Cell<usize>,
    errors: Cell<usize>,
}

impl TracingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.counter(severity).get()
    }

    fn counter(&self, severity: Severity) -> &Cell<usize> {
        match severity {
            Severity::Info => &self.infos,
            Severity::Warning => &self.warnings,
            Severity::Error => &self.errors,
        }
    }
}

impl Reporter for TracingReporter {
    fn report(&self, diagnostic: Diagnostic) {
        let severity = diagnostic.severity();
        let counter = self.counter(severity);
        counter.set(counter.get() + 1);

        match severity {
            Severity::Info => tracing::info!("[Config] {}", diagnostic),
            Severity::Warning => tracing::warn!("[Config] {}", diagnostic),
            Severity::Error => tracing::error!("[Config] {}", diagnostic),
        }
    }
}
