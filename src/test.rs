#![cfg(test)]

use std::ops::Range;

use rand::prelude::*;
use rand::rngs::SmallRng;

use crate::container::RunContainer;

/// The type of operation to perform
pub(crate) enum OpType {
    /// Performs a union of the two input sets
    Or,

    /// Performs an intersection of the two input sets
    And,

    /// Peforms a difference between the two input sets
    AndNot
}

const SEED: u64 = 0x0304_0106_0308_0600;

/// Generates `count` random values in the range [min-max). Values are then deduplicated and sorted
pub(crate) fn generate_data(range: Range<u16>, count: usize) -> Vec<u16> {
    let mut rng = SmallRng::seed_from_u64(SEED);

    let mut result = Vec::with_capacity(count);
    while result.len() < count {
        result.push(rng.gen_range(range.clone()));
    }

    result.sort_unstable();
    result.dedup();

    result
}

/// Build a run container by adding every value in `data`
pub(crate) fn make_container(data: &[u16]) -> RunContainer {
    let mut container = RunContainer::new();
    for value in data.iter() {
        container.add(*value).unwrap();
    }

    container
}

/// Compute the result of an operation on two input sets using a known correct algorithm
///
/// # Remarks
/// Assumes the inputs are sorted
pub(crate) fn compute_result(a: &[u16], b: &[u16], op: OpType) -> Vec<u16> {
    match op {
        OpType::Or => {
            // Compute A + B - Duplicates and maintain sorting
            let mut result = Vec::with_capacity(a.len() + b.len());
            result.extend_from_slice(a);
            result.extend_from_slice(b);
            result.sort_unstable();
            result.dedup();

            result
        },
        OpType::And => {
            a.iter()
                .filter(|value| b.binary_search(value).is_ok())
                .copied()
                .collect()
        },
        OpType::AndNot => {
            a.iter()
                .filter(|value| b.binary_search(value).is_err())
                .copied()
                .collect()
        }
    }
}

/// Check that the runs of `container` are sorted, non-overlapping and non-adjacent
pub(crate) fn assert_minimal(container: &RunContainer) {
    for pair in container.runs().windows(2) {
        assert!(
            u32::from(pair[1].value) > pair[0].end() + 1,
            "Runs are not minimal: {:?} followed by {:?}",
            pair[0],
            pair[1]
        );
    }

    if let Some(last) = container.runs().last() {
        assert!(last.end() <= u32::from(u16::MAX));
    }
}

/// Check that `container` holds exactly `expected`
pub(crate) fn assert_values(container: &RunContainer, expected: &[u16]) {
    assert_eq!(
        container.cardinality(),
        expected.len(),
        "Unequal cardinality; found {}, expected {}",
        container.cardinality(),
        expected.len()
    );

    for (found, expected) in container.iter().zip(expected.iter()) {
        assert_eq!(found, *expected, "Sets are not equivalent. Found {}, expected {}", found, *expected);
    }
}
