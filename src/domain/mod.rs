// Domain layer: configuration value types, diagnostics and the ports the
// reconciler talks through.

pub mod diagnostic;
pub mod model;
pub mod ports;
