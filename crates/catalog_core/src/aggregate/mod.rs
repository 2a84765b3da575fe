//! Aggregation engine: counts, sums and ranked views.

pub mod ranking;
pub mod stats;
