use crate::domain::model::Domain;
use crate::utils::error::DeviceError;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// Outcome of a single device interaction worth reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    Updated { domain: Domain },
    ReadFailed { domain: Domain, error: DeviceError },
    WriteFailed { domain: Domain, error: DeviceError },
    Saved,
    SaveFailed { error: DeviceError },
}

impl Diagnostic {
    pub fn severity(&self) -> Severity {
        match self {
            Diagnostic::Updated { .. } | Diagnostic::Saved => Severity::Info,
            Diagnostic::ReadFailed { .. } | Diagnostic::WriteFailed { .. } => Severity::Warning,
            Diagnostic::SaveFailed { .. } => Severity::Error,
        }
    }

    pub fn domain(&self) -> Option<Domain> {
        match self {
            Diagnostic::Updated { domain }
            | Diagnostic::ReadFailed { domain, .. }
            | Diagnostic::WriteFailed { domain, .. } => Some(*domain),
            Diagnostic::Saved | Diagnostic::SaveFailed { .. } => None,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::Updated { domain } => write!(f, "{} updated on the device", domain),
            Diagnostic::ReadFailed { domain, error } => {
                write!(f, "Unable to get the {} configuration: {}", domain, error)
            }
            Diagnostic::WriteFailed { domain, error } => {
                write!(f, "Unable to set the {} configuration: {}", domain, error)
            }
            Diagnostic::Saved => f.write_str("Settings saved and device rebooted"),
            Diagnostic::SaveFailed { error } => {
                write!(f, "Unable to save the settings on the device: {}", error)
            }
        }
    }
}
