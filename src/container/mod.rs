mod run;
mod run_ops;

pub use self::run::{Iter, Rle16, RunContainer};

use crate::RunError;

/// Default number of runs allocated for a new run container
pub const DEFAULT_RUN_CAPACITY: usize = 4;

/// Maximum number of runs a minimal run list can hold. Reached by alternating present and absent values
pub const MAX_RUNS: usize = 1 << 15;

/// The set union operation
pub trait Union<T> {
    type Output;

    fn union_with(&self, other: &T, out: &mut Self::Output) -> Result<(), RunError>;
}

/// The set intersection operation
pub trait Intersection<T> {
    type Output;

    fn intersect_with(&self, other: &T, out: &mut Self::Output) -> Result<(), RunError>;
}

/// The set difference operation
pub trait Difference<T> {
    type Output;

    fn difference_with(&self, other: &T, out: &mut Self::Output) -> Result<(), RunError>;
}

/// The set subset operation
pub trait Subset<T> {
    fn subset_of(&self, other: &T) -> bool;
}
