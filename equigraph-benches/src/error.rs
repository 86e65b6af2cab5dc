//! Benchmark setup error type.
//!
//! Lets setup functions propagate failures with `?` instead of panicking
//! inside fixture code.

use equigraph_core::SessionError;

/// Errors that may occur during benchmark setup.
#[derive(Debug, thiserror::Error)]
pub enum BenchSetupError {
    /// Building or querying the fixture session failed.
    #[error("session operation failed: {0}")]
    Session(#[from] SessionError),
    /// The fixture needs more nodes than were requested.
    #[error("fixture needs at least {required} nodes, got {got}")]
    TooFewNodes {
        /// Minimum node count.
        required: usize,
        /// Requested node count.
        got: usize,
    },
}
