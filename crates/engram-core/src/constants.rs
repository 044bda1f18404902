/// Engram system version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Lower bound for causal edge strength.
pub const STRENGTH_MIN: f64 = 0.0;

/// Upper bound for causal edge strength.
pub const STRENGTH_MAX: f64 = 1.0;

/// Default number of deltas applied per sync batch.
pub const DEFAULT_DELTA_BATCH: usize = 100;
