//! Benchmark support crate for equigraph.
//!
//! Provides seeded graph fixtures and parameter types used by the Criterion
//! benchmarks for BFS tracing and equitable repair.

pub mod error;
pub mod fixtures;
pub mod params;
