#![deny(bare_trait_objects)]

//! Rusting Runs is the run length encoded container of a Roaring style bitmap
//!
//! A `RunContainer` stores a set of 16 bit integers as sorted, maximal intervals. It is
//! one of the interchangeable container representations of a bitmap chunk; choosing
//! between representations is left to the caller.
//!
//! - Mutations keep the run list sorted, non-overlapping and non-adjacent
//! - Set operations are linear merge sweeps over the run lists
//! - Allocation failure is reported as an error instead of aborting

mod container;
mod error;

#[cfg(test)]
mod test;

pub use container::{
    Difference,
    Intersection,
    Iter,
    Rle16,
    RunContainer,
    Subset,
    Union,
    DEFAULT_RUN_CAPACITY,
    MAX_RUNS
};
pub use error::RunError;
