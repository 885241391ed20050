use std::collections::TryReserveError;
use std::io;

use thiserror::Error;

/// An error produced by a run container operation
#[derive(Debug, Error)]
pub enum RunError {
    /// The backing storage could not be grown. The container is left unchanged
    #[error("failed to allocate storage for {requested} runs")]
    AllocationFailed {
        /// The run capacity that was requested
        requested: usize,

        #[source]
        source: TryReserveError
    },

    /// A run does not start after the run preceding it
    #[error("run {index} is not sorted after its predecessor")]
    UnsortedRuns {
        index: usize
    },

    /// A run overlaps or touches the run preceding it and should have been merged
    #[error("run {index} overlaps or is adjacent to its predecessor")]
    NonMinimalRuns {
        index: usize
    },

    /// A run extends past `u16::MAX`
    #[error("run {index} extends past the end of the 16 bit domain")]
    RunOutOfRange {
        index: usize
    },

    /// More runs were declared than a minimal run list can hold
    #[error("invalid run count: {0}")]
    InvalidRunCount(usize),

    /// An IO error occured during (de)serialization
    #[error(transparent)]
    Io(#[from] io::Error)
}
