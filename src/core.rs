//! Cycle log normalization and metrics aggregation, free of any I/O.

pub mod config;
pub mod cycle;
pub mod error;
pub mod metrics;
pub mod normalize;
pub mod raw;
pub mod schema;
