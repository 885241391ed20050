use std::fmt;
use std::io::{self, Read, Write};
use std::ops::RangeInclusive;
use std::slice;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::container::{run_ops, Difference, Intersection, Subset, Union, DEFAULT_RUN_CAPACITY, MAX_RUNS};
use crate::RunError;

/// A run of consecutive values. Covers `[value, value + length]`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rle16 {
    /// The first value of the run
    pub value: u16,

    /// The number of values in the run minus one
    pub length: u16
}

impl Rle16 {
    pub fn new(value: u16, length: u16) -> Self {
        Self {
            value,
            length
        }
    }

    /// The last value covered by the run. Widened so that runs ending at `u16::MAX` don't overflow
    #[inline]
    pub fn end(&self) -> u32 {
        u32::from(self.value) + u32::from(self.length)
    }

    /// The number of values covered by the run
    #[inline]
    pub fn cardinality(&self) -> usize {
        self.length as usize + 1
    }
}

enum SearchResult {
    /// A run starts at the key
    ExactMatch(usize),

    /// The index of the last run starting before the key
    PossibleMatch(usize),

    /// Every run starts after the key
    NoMatch
}

/// A run container. Values are stored as sorted, non-overlapping and non-adjacent runs
///
/// The full 16 bit domain is always represented as the single run `(0, 0xFFFF)`
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Rle16>", into = "Vec<Rle16>")]
pub struct RunContainer {
    runs: Vec<Rle16>
}

impl RunContainer {
    /// Create a new run container with the default capacity
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_RUN_CAPACITY)
    }

    /// Create a new run container with the default capacity, reporting allocation failure
    pub fn try_new() -> Result<Self, RunError> {
        Self::try_with_capacity(DEFAULT_RUN_CAPACITY)
    }

    /// Create a new run container with room for `capacity` runs
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            runs: Vec::with_capacity(capacity)
        }
    }

    /// Create a new run container with room for `capacity` runs, reporting allocation failure
    pub fn try_with_capacity(capacity: usize) -> Result<Self, RunError> {
        let mut runs = Vec::new();
        runs.try_reserve_exact(capacity)
            .map_err(|source| RunError::AllocationFailed { requested: capacity, source })?;

        Ok(Self { runs })
    }

    /// Create a run container containing every value in the 16 bit domain
    pub fn full() -> Self {
        let mut runs = Vec::with_capacity(1);
        runs.push(Rle16::new(0, u16::MAX));

        Self { runs }
    }

    /// Create a run container from a list of runs
    ///
    /// # Errors
    /// Fails if the runs are unsorted, overlapping, adjacent or run past `u16::MAX`
    pub fn from_runs(runs: Vec<Rle16>) -> Result<Self, RunError> {
        validate(&runs)?;

        Ok(Self { runs })
    }

    /// Create an independent copy of the container, reporting allocation failure
    pub fn try_clone(&self) -> Result<Self, RunError> {
        let mut result = Self::try_with_capacity(self.runs.len())?;
        result.runs.extend_from_slice(&self.runs);

        Ok(result)
    }

    /// Replace the contents of `self` with the contents of `other`
    ///
    /// # Remarks
    /// Reuses the existing storage if it's large enough
    pub fn copy_from(&mut self, other: &RunContainer) -> Result<(), RunError> {
        self.grow(other.runs.len())?;

        self.runs.clear();
        self.runs.extend_from_slice(&other.runs);

        Ok(())
    }

    /// Number of runs in the container
    #[inline]
    pub fn num_runs(&self) -> usize {
        self.runs.len()
    }

    /// Number of runs the container can hold without reallocating
    #[inline]
    pub fn capacity(&self) -> usize {
        self.runs.capacity()
    }

    /// Read only view of the underlying runs
    #[inline]
    pub fn runs(&self) -> &[Rle16] {
        &self.runs
    }

    pub fn shrink_to_fit(&mut self) {
        self.runs.shrink_to_fit()
    }

    /// Reserve space for `additional` runs
    ///
    /// # Errors
    /// Fails if the storage can't be grown. The container is left unchanged
    pub fn reserve(&mut self, additional: usize) -> Result<(), RunError> {
        match self.runs.len().checked_add(additional) {
            Some(min_capacity) => self.grow(min_capacity),
            // `try_reserve` reports the overflow without touching the storage
            None => self.runs.try_reserve(additional)
                .map_err(|source| RunError::AllocationFailed { requested: usize::MAX, source })
        }
    }

    /// Add a value to the container
    ///
    /// # Returns
    /// `true` if the value was not already present
    pub fn add(&mut self, value: u16) -> Result<bool, RunError> {
        let key = u32::from(value);

        match self.binary_search(value) {
            SearchResult::ExactMatch(_index) => {
                Ok(false)
            },
            SearchResult::PossibleMatch(index) => {
                let v = self.runs[index];
                let offset = key - u32::from(v.value);

                if offset <= u32::from(v.length) {
                    return Ok(false);
                }

                if offset == u32::from(v.length) + 1 {
                    if index + 1 < self.runs.len() {
                        // Value bridges the gap, fuse the runs
                        let v1 = self.runs[index + 1];
                        if u32::from(v1.value) == key + 1 {
                            self.runs[index].length = (v1.end() - u32::from(v.value)) as u16;
                            self.runs.remove(index + 1);

                            return Ok(true);
                        }
                    }

                    self.runs[index].length += 1;
                    return Ok(true);
                }

                if index + 1 < self.runs.len() {
                    let v1 = &mut self.runs[index + 1];
                    if u32::from(v1.value) == key + 1 {
                        v1.value = value;
                        v1.length += 1;

                        return Ok(true);
                    }
                }

                self.insert_run(index + 1, Rle16::new(value, 0))?;
                Ok(true)
            },
            SearchResult::NoMatch => {
                // Extend the first run downwards if it starts right after the value
                if let Some(v0) = self.runs.first_mut() {
                    if u32::from(v0.value) == key + 1 {
                        v0.value = value;
                        v0.length += 1;

                        return Ok(true);
                    }
                }

                self.insert_run(0, Rle16::new(value, 0))?;
                Ok(true)
            }
        }
    }

    /// Add every value in `range` to the container
    pub fn add_range(&mut self, range: RangeInclusive<u16>) -> Result<(), RunError> {
        let (min, max) = (*range.start(), *range.end());
        if min > max {
            return Ok(());
        }

        let (lo, hi) = (u32::from(min), u32::from(max));

        // Runs in `first..last` overlap or touch the range
        let first = self.runs.partition_point(|run| run.end() + 1 < lo);
        let last = self.runs.partition_point(|run| u32::from(run.value) <= hi + 1);

        if first >= last {
            self.insert_run(first, Rle16::new(min, max - min))?;
            return Ok(());
        }

        let start = lo.min(u32::from(self.runs[first].value));
        let stop = hi.max(self.runs[last - 1].end());

        self.runs[first] = Rle16::new(start as u16, (stop - start) as u16);
        self.runs.drain((first + 1)..last);

        Ok(())
    }

    /// Remove a value from the container
    ///
    /// # Returns
    /// `true` if the value was present
    pub fn remove(&mut self, value: u16) -> Result<bool, RunError> {
        match self.binary_search(value) {
            SearchResult::ExactMatch(index) => {
                let rle = &mut self.runs[index];
                if rle.length == 0 {
                    self.runs.remove(index);
                }
                else {
                    rle.value += 1;
                    rle.length -= 1;
                }

                Ok(true)
            },
            SearchResult::PossibleMatch(prev_index) => {
                let rle = self.runs[prev_index];
                let offset = value - rle.value;

                // Interior value, split the run in two
                if offset < rle.length {
                    self.grow(self.runs.len() + 1)?;

                    self.runs[prev_index].length = offset - 1;

                    let new_rle = Rle16::new(value + 1, rle.length - offset - 1);
                    self.runs.insert(prev_index + 1, new_rle);

                    return Ok(true);
                }

                if offset == rle.length {
                    self.runs[prev_index].length -= 1;
                    return Ok(true);
                }

                Ok(false)
            },
            SearchResult::NoMatch => {
                Ok(false)
            }
        }
    }

    /// Check if the container contains a specified value
    pub fn contains(&self, value: u16) -> bool {
        match self.binary_search(value) {
            SearchResult::ExactMatch(_index) => {
                true
            },
            SearchResult::PossibleMatch(index) => {
                let v = self.runs[index];

                value - v.value <= v.length
            },
            SearchResult::NoMatch => {
                false
            }
        }
    }

    /// Check if the container contains every value in `range`
    pub fn contains_range(&self, range: RangeInclusive<u16>) -> bool {
        let (min, max) = (*range.start(), *range.end());
        if min > max {
            return true;
        }

        let index = match self.binary_search(min) {
            SearchResult::ExactMatch(i) => i,
            SearchResult::PossibleMatch(i) => i,
            SearchResult::NoMatch => return false
        };

        // Runs are never adjacent so the whole range must sit inside a single run
        self.runs[index].end() >= u32::from(max)
    }

    /// The number of values in the container
    ///
    /// # Remarks
    /// Not cached, this walks every run
    pub fn cardinality(&self) -> usize {
        self.runs.iter()
            .map(Rle16::cardinality)
            .sum()
    }

    /// Check if the container holds at least one value
    #[inline]
    pub fn nonzero_cardinality(&self) -> bool {
        // Runs are never empty
        !self.runs.is_empty()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Check if the container spans the whole 16 bit domain
    #[inline]
    pub fn is_full(&self) -> bool {
        match self.runs.as_slice() {
            [run] => run.value == 0 && run.length == u16::MAX,
            _ => false
        }
    }

    /// Remove all runs. The allocated storage is kept
    pub fn clear(&mut self) {
        self.runs.clear()
    }

    /// Iterate over the values in ascending order
    pub fn iter(&self) -> Iter {
        Iter {
            runs: self.runs.iter(),
            current: None
        }
    }

    /// The smallest value in the container. Returns `None` if the container is empty
    pub fn min(&self) -> Option<u16> {
        self.runs.first()
            .map(|run| run.value)
    }

    /// The largest value in the container. Returns `None` if the container is empty
    pub fn max(&self) -> Option<u16> {
        self.runs.last()
            .map(|run| run.end() as u16)
    }

    /// Find the number of values smaller or equal to `value`
    pub fn rank(&self, value: u16) -> usize {
        let value = u32::from(value);
        let mut sum = 0;

        for run in self.runs.iter() {
            let start = u32::from(run.value);

            if value < start {
                break;
            }

            if value <= run.end() {
                return sum + (value - start) as usize + 1;
            }

            sum += run.cardinality();
        }

        sum
    }

    /// Find the value at `rank` (0 based) in ascending order
    pub fn select(&self, rank: usize) -> Option<u16> {
        let mut start_rank = 0;

        for run in self.runs.iter() {
            let length = run.length as usize;

            if rank <= start_rank + length {
                return Some(run.value + (rank - start_rank) as u16);
            }

            start_rank += length + 1;
        }

        None
    }

    /// Write every value as `base | value` into `out` in ascending order
    ///
    /// `base` is expected to have its low 16 bits cleared
    ///
    /// # Returns
    /// The number of values written
    ///
    /// # Panics
    /// Panics if `out` is shorter than the cardinality of the container
    pub fn to_uint32_array(&self, out: &mut [u32], base: u32) -> usize {
        let mut count = 0;

        for run in self.runs.iter() {
            let values = run.value..=(run.end() as u16);

            for (slot, value) in out[count..count + run.cardinality()].iter_mut().zip(values) {
                *slot = base | u32::from(value);
            }

            count += run.cardinality();
        }

        count
    }

    /// Check if `self` and `other` share any value
    pub fn intersects(&self, other: &Self) -> bool {
        run_ops::intersects(&self.runs, &other.runs)
    }

    /// Search for the run that may contain `key`
    fn binary_search(&self, key: u16) -> SearchResult {
        match self.runs.binary_search_by_key(&key, |run| run.value) {
            Ok(index) => SearchResult::ExactMatch(index),
            Err(0) => SearchResult::NoMatch,
            Err(index) => SearchResult::PossibleMatch(index - 1)
        }
    }

    /// Insert a run at `index`, growing the storage first so a failed allocation leaves the runs untouched
    fn insert_run(&mut self, index: usize, run: Rle16) -> Result<(), RunError> {
        self.grow(self.runs.len() + 1)?;
        self.runs.insert(index, run);

        Ok(())
    }

    /// Ensure there is room for at least `min_capacity` runs. Capacity at least doubles when exhausted
    fn grow(&mut self, min_capacity: usize) -> Result<(), RunError> {
        let capacity = self.runs.capacity();
        if capacity >= min_capacity {
            return Ok(());
        }

        let new_capacity = capacity.saturating_mul(2)
            .max(min_capacity)
            .max(DEFAULT_RUN_CAPACITY);

        trace!(from = capacity, to = new_capacity, "growing run container");

        self.runs.try_reserve_exact(new_capacity - self.runs.len())
            .map_err(|source| RunError::AllocationFailed { requested: new_capacity, source })
    }

    /// Reserve room for the result of a sweep over `self` and `other` in `out` and clear it
    fn prepare_output(&self, other: &Self, out: &mut Self) -> Result<(), RunError> {
        out.grow(self.runs.len() + other.runs.len())?;
        out.runs.clear();

        Ok(())
    }
}

/// Check that `runs` is a valid minimal run list
fn validate(runs: &[Rle16]) -> Result<(), RunError> {
    if runs.len() > MAX_RUNS {
        debug!(count = runs.len(), "rejecting run list");
        return Err(RunError::InvalidRunCount(runs.len()));
    }

    let mut prev: Option<Rle16> = None;

    for (index, run) in runs.iter().enumerate() {
        if run.end() > u32::from(u16::MAX) {
            debug!(index, "rejecting run list, run out of range");
            return Err(RunError::RunOutOfRange { index });
        }

        if let Some(prev) = prev {
            if run.value <= prev.value {
                debug!(index, "rejecting run list, unsorted run");
                return Err(RunError::UnsortedRuns { index });
            }

            if u32::from(run.value) <= prev.end() + 1 {
                debug!(index, "rejecting run list, overlapping run");
                return Err(RunError::NonMinimalRuns { index });
            }
        }

        prev = Some(*run);
    }

    Ok(())
}

impl Union<Self> for RunContainer {
    type Output = Self;

    fn union_with(&self, other: &Self, out: &mut Self::Output) -> Result<(), RunError> {
        // A full container absorbs everything
        if self.is_full() || other.is_empty() {
            return out.copy_from(self);
        }

        if other.is_full() || self.is_empty() {
            return out.copy_from(other);
        }

        self.prepare_output(other, out)?;
        run_ops::union(&self.runs, &other.runs, &mut out.runs);

        Ok(())
    }
}

impl Intersection<Self> for RunContainer {
    type Output = Self;

    fn intersect_with(&self, other: &Self, out: &mut Self::Output) -> Result<(), RunError> {
        if self.is_full() {
            return out.copy_from(other);
        }

        if other.is_full() {
            return out.copy_from(self);
        }

        self.prepare_output(other, out)?;
        run_ops::intersect(&self.runs, &other.runs, &mut out.runs);

        Ok(())
    }
}

impl Difference<Self> for RunContainer {
    type Output = Self;

    fn difference_with(&self, other: &Self, out: &mut Self::Output) -> Result<(), RunError> {
        if other.is_empty() {
            return out.copy_from(self);
        }

        self.prepare_output(other, out)?;
        run_ops::difference(&self.runs, &other.runs, &mut out.runs);

        Ok(())
    }
}

impl Subset<Self> for RunContainer {
    fn subset_of(&self, other: &Self) -> bool {
        run_ops::subset(&self.runs, &other.runs)
    }
}

impl TryFrom<Vec<Rle16>> for RunContainer {
    type Error = RunError;

    fn try_from(runs: Vec<Rle16>) -> Result<Self, Self::Error> {
        Self::from_runs(runs)
    }
}

impl From<RunContainer> for Vec<Rle16> {
    fn from(container: RunContainer) -> Self {
        container.runs
    }
}

/// Iterator over the values of a run container
pub struct Iter<'a> {
    runs: slice::Iter<'a, Rle16>,

    /// Next value and last value of the run being walked
    current: Option<(u32, u32)>
}

impl<'a> Iterator for Iter<'a> {
    type Item = u16;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some((next, stop)) = self.current.as_mut() {
                if *next <= *stop {
                    let value = *next as u16;
                    *next += 1;

                    return Some(value);
                }
            }

            let run = self.runs.next()?;
            self.current = Some((u32::from(run.value), run.end()));
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let current = match self.current {
            Some((next, stop)) if next <= stop => (stop - next) as usize + 1,
            _ => 0
        };

        let remaining = current + self.runs
            .as_slice()
            .iter()
            .map(Rle16::cardinality)
            .sum::<usize>();

        (remaining, Some(remaining))
    }
}

impl<'a> ExactSizeIterator for Iter<'a> { }

impl<'a> IntoIterator for &'a RunContainer {
    type Item = u16;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// Diagnostics

impl fmt::Display for RunContainer {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for run in self.runs.iter() {
            write!(f, "[{},{}]", run.value, run.end())?;
        }

        Ok(())
    }
}

impl RunContainer {
    /// Write the runs as `[start,end]` pairs to `out`
    pub fn write_runs<W: Write>(&self, out: &mut W) -> io::Result<()> {
        write!(out, "{}", self)
    }

    /// Write the values as a comma separated list of `base | value` to `out`
    pub fn write_as_uint32_array<W: Write>(&self, out: &mut W, base: u32) -> io::Result<()> {
        for (i, value) in self.iter().enumerate() {
            if i > 0 {
                write!(out, ",")?;
            }

            write!(out, "{}", base | u32::from(value))?;
        }

        Ok(())
    }
}

// Serialization

impl RunContainer {
    /// Get the serialized size of the container in bytes
    pub fn serialized_size(&self) -> usize {
        2 + self.runs.len() * 4
    }

    /// Serialize the container to a stream. The run count is followed by the runs, little endian encoded
    ///
    /// # Returns
    /// The number of bytes written to the buffer
    pub fn serialize<W: Write>(&self, buf: &mut W) -> io::Result<usize> {
        // A minimal run list never holds more than `MAX_RUNS` runs so the count fits in a u16
        let count = self.runs.len() as u16;
        buf.write_all(&count.to_le_bytes())?;

        for run in self.runs.iter() {
            buf.write_all(&run.value.to_le_bytes())?;
            buf.write_all(&run.length.to_le_bytes())?;
        }

        Ok(self.serialized_size())
    }

    /// Deserialize a container from a stream written by `serialize`
    ///
    /// # Errors
    /// Fails on IO errors or if the stored runs are not a valid minimal run list
    pub fn deserialize<R: Read>(buf: &mut R) -> Result<Self, RunError> {
        let mut word = [0u8; 2];

        buf.read_exact(&mut word)?;
        let count = u16::from_le_bytes(word) as usize;
        if count > MAX_RUNS {
            debug!(count, "rejecting serialized run container");
            return Err(RunError::InvalidRunCount(count));
        }

        let mut container = Self::try_with_capacity(count)?;
        for _ in 0..count {
            buf.read_exact(&mut word)?;
            let value = u16::from_le_bytes(word);

            buf.read_exact(&mut word)?;
            let length = u16::from_le_bytes(word);

            container.runs.push(Rle16::new(value, length));
        }

        validate(&container.runs)?;

        Ok(container)
    }
}
