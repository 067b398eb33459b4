pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliConfig;

pub use adapters::simulated::{DeviceImage, SimulatedDevice};
pub use adapters::tracing_reporter::TracingReporter;
pub use config::DesiredConfig;
pub use core::{ConfigApplier, ConfigStore, DeviceTransport, Diagnostic, ReadFailurePolicy, Reporter};
pub use utils::error::{DeviceError, Result, SyncError};
