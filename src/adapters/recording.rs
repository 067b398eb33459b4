use crate::domain::diagnostic::{Diagnostic, Severity};
use crate::domain::ports::Reporter;
use std::cell::RefCell;

/// Keeps every diagnostic in emission order. Also logs them at debug level.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    diagnostics: RefCell<Vec<Diagnostic>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.borrow().clone()
    }

    pub fn with_severity(&self, severity: Severity) -> Vec<Diagnostic> {
        self.diagnostics
            .borrow()
            .iter()
            .filter(|d| d.severity() == severity)
            .cloned()
            .collect()
    }

    pub fn clear(&self) {
        self.diagnostics.borrow_mut().clear();
    }
}

impl Reporter for RecordingReporter {
    fn report(&self, diagnostic: Diagnostic) {
        tracing::debug!("recorded: {}", diagnostic);
        self.diagnostics.borrow_mut().push(diagnostic);
    }
}
