//! Shared test utilities used across equigraph crates.
//!
//! [`tracing::RecordingLayer`] captures spans and events so suites can
//! assert instrumentation, and [`ci`] holds the environment-driven knobs the
//! property suites read.

pub mod ci;
pub mod tracing;
