pub mod applier;

pub use crate::domain::diagnostic::{Diagnostic, Severity};
pub use crate::domain::model::{Domain, OutputSetting};
pub use crate::domain::ports::{ConfigStore, DeviceTransport, Reporter};
pub use applier::{ConfigApplier, ReadFailurePolicy};
