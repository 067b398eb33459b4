// Adapters layer: concrete implementations of the domain ports (reporting
// sinks, offline device).

pub mod recording;
pub mod simulated;
pub mod tracing_reporter;
