// Copyright 2022 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Iteration over the recorded value distribution.
//!
//! Each iterator walks the counts array slot by slot and yields an
//! `IterationValue` whenever its stepping strategy decides a reporting level
//! has been reached. The strategies share one driver which tracks running
//! count and value totals, so a record always carries the cumulative state
//! up to the value it reports.

mod all;
mod linear;
mod log;
mod percentile;
mod recorded;

pub use all::AllValues;
pub use linear::Linear;
pub use log::Logarithmic;
pub use percentile::Percentiles;
pub use recorded::Recorded;

use crate::Histogram;

/// A single step of iteration across the recorded distribution.
#[derive(Clone, Debug, PartialEq)]
pub struct IterationValue {
    value_iterated_to: u64,
    value_iterated_from: u64,
    count_at_value: u64,
    count_since_last_iteration: u64,
    total_count_to_this_value: u64,
    total_value_to_this_value: u64,
    percentile: f64,
    percentile_iterated_to: f64,
}

impl IterationValue {
    /// The value this step reports on.
    pub fn value_iterated_to(&self) -> u64 {
        self.value_iterated_to
    }

    /// The value reported by the previous step.
    pub fn value_iterated_from(&self) -> u64 {
        self.value_iterated_from
    }

    /// The count recorded in the slot holding the reported value.
    pub fn count_at_value(&self) -> u64 {
        self.count_at_value
    }

    /// The count accumulated since the previous step, saturating at
    /// u64::MAX.
    pub fn count_since_last_iteration(&self) -> u64 {
        self.count_since_last_iteration
    }

    /// The cumulative count through the reported value.
    pub fn total_count_to_this_value(&self) -> u64 {
        self.total_count_to_this_value
    }

    /// The cumulative sum of values through the reported value, saturating
    /// at u64::MAX.
    pub fn total_value_to_this_value(&self) -> u64 {
        self.total_value_to_this_value
    }

    /// The percentile of recorded samples at or below the reported value.
    pub fn percentile(&self) -> f64 {
        self.percentile
    }

    /// The percentile level the strategy was stepping toward. For value
    /// stepped strategies this matches `percentile`.
    pub fn percentile_iterated_to(&self) -> f64 {
        self.percentile_iterated_to
    }
}

/// The driver state visible to a stepping strategy.
pub struct Position<'a> {
    pub(crate) histogram: &'a Histogram,
    pub(crate) index: usize,
    pub(crate) value: u64,
    pub(crate) next_value: u64,
    pub(crate) count_at_index: u64,
    pub(crate) count_to_index: u64,
    pub(crate) total: u64,
}

impl Position<'_> {
    pub(crate) fn percentile(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            100.0 * self.count_to_index as f64 / self.total as f64
        }
    }
}

/// A stepping strategy decides where iteration records are reported.
pub trait Strategy {
    /// True when a record should be emitted at the current position.
    fn reached(&mut self, pos: &Position<'_>) -> bool;

    /// Move the reporting level forward after a record was emitted.
    fn advance(&mut self, pos: &Position<'_>);

    /// The value reported at the current position.
    fn value_iterated_to(&self, pos: &Position<'_>) -> u64 {
        pos.histogram.highest_equivalent(pos.value)
    }

    /// The percentile level reported at the current position.
    fn percentile_iterated_to(&self, pos: &Position<'_>) -> f64 {
        pos.percentile()
    }

    /// True when records remain after every recorded count has been
    /// accumulated.
    fn more(&mut self, _pos: &Position<'_>) -> bool {
        false
    }
}

/// Lazy pull iterator over a histogram, stepped by a `Strategy`.
pub struct Iter<'a, S> {
    histogram: &'a Histogram,
    strategy: S,
    total: u64,
    len: usize,
    index: usize,
    value: u64,
    next_value: u64,
    count_at_index: u64,
    count_to_index: u64,
    value_to_index: u64,
    count_since_last: u64,
    prev_value_iterated_to: u64,
    fresh: bool,
}

impl<'a, S: Strategy> Iter<'a, S> {
    fn new(histogram: &'a Histogram, strategy: S) -> Self {
        Self {
            histogram,
            strategy,
            total: histogram.count(),
            len: histogram.distinct_values(),
            index: 0,
            value: histogram.config().value_for(0),
            next_value: histogram.config().value_for(1),
            count_at_index: 0,
            count_to_index: 0,
            value_to_index: 0,
            count_since_last: 0,
            prev_value_iterated_to: 0,
            fresh: true,
        }
    }

    fn snapshot(&self) -> Position<'a> {
        Position {
            histogram: self.histogram,
            index: self.index,
            value: self.value,
            next_value: self.next_value,
            count_at_index: self.count_at_index,
            count_to_index: self.count_to_index,
            total: self.total,
        }
    }

    // True once the count at the last occupied slot has been accumulated.
    // Cumulative counts cannot signal this, they saturate.
    fn consumed(&self) -> bool {
        self.total == 0
            || self.index > self.histogram.max_nonzero_index()
            || (self.index == self.histogram.max_nonzero_index() && !self.fresh)
    }

    fn has_next(&mut self) -> bool {
        if !self.consumed() && self.index < self.len {
            return true;
        }
        let pos = self.snapshot();
        self.strategy.more(&pos)
    }

    fn step(&mut self) {
        self.index += 1;
        self.value = self.histogram.config().value_for(self.index);
        self.next_value = self.histogram.config().value_for(self.index + 1);
        self.fresh = true;
    }
}

impl<S: Strategy> Iterator for Iter<'_, S> {
    type Item = IterationValue;

    fn next(&mut self) -> Option<IterationValue> {
        if !self.has_next() {
            return None;
        }
        while self.index < self.len {
            self.count_at_index = self.histogram.count_at_index(self.index);
            if self.fresh {
                self.count_to_index = self.count_to_index.saturating_add(self.count_at_index);
                self.count_since_last =
                    self.count_since_last.saturating_add(self.count_at_index);
                self.value_to_index = self.value_to_index.saturating_add(
                    self.count_at_index
                        .saturating_mul(self.histogram.highest_equivalent(self.value)),
                );
                self.fresh = false;
            }
            let pos = self.snapshot();
            if self.strategy.reached(&pos) {
                let value_iterated_to = self.strategy.value_iterated_to(&pos);
                let record = IterationValue {
                    value_iterated_to,
                    value_iterated_from: self.prev_value_iterated_to,
                    count_at_value: self.count_at_index,
                    count_since_last_iteration: self.count_since_last,
                    total_count_to_this_value: self.count_to_index,
                    total_value_to_this_value: self.value_to_index,
                    percentile: pos.percentile(),
                    percentile_iterated_to: self.strategy.percentile_iterated_to(&pos),
                };
                self.prev_value_iterated_to = value_iterated_to;
                self.count_since_last = 0;
                self.strategy.advance(&pos);
                return Some(record);
            }
            self.step();
        }
        None
    }
}

impl Histogram {
    /// Iterate every slot in the layout, in value order.
    pub fn iter_all(&self) -> Iter<'_, AllValues> {
        Iter::new(self, AllValues::new())
    }

    /// Iterate every slot holding a nonzero count, in value order.
    pub fn iter_recorded(&self) -> Iter<'_, Recorded> {
        Iter::new(self, Recorded::new())
    }

    /// Iterate bands of `step` values starting at zero, until the band
    /// holding the highest recorded value has been reported.
    ///
    /// # Panics
    /// This will panic if `step` is zero.
    pub fn iter_linear(&self, step: u64) -> Iter<'_, Linear> {
        Iter::new(self, Linear::new(self, step))
    }

    /// Iterate geometrically growing bands, the first spanning `step` values
    /// and each later band `base` times its predecessor.
    ///
    /// # Panics
    /// This will panic if `step` is zero or `base` is not above 1.0.
    pub fn iter_log(&self, step: u64, base: f64) -> Iter<'_, Logarithmic> {
        Iter::new(self, Logarithmic::new(self, step, base))
    }

    /// Iterate percentile levels of increasing resolution toward 100%, with
    /// `ticks_per_half_distance` steps for every halving of the remaining
    /// distance. The ladder keeps reporting within the last occupied slot
    /// until its steps fall below float resolution, then ends with a single
    /// record at 100%.
    ///
    /// # Panics
    /// This will panic if `ticks_per_half_distance` is zero.
    pub fn iter_percentiles(&self, ticks_per_half_distance: u32) -> Iter<'_, Percentiles> {
        Iter::new(self, Percentiles::new(ticks_per_half_distance))
    }
}
