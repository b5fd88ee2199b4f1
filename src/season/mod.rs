//! Season aggregation.
//!
//! Pure folds that turn per-round result sets into cumulative season
//! tallies. All I/O lives behind the provider boundary; this module only
//! accumulates.

pub mod aggregator;

pub use aggregator::*;
