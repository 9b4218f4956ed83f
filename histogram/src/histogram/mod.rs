// Copyright 2022 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::counts::Counts;
use crate::{Config, Error, RangePolicy, Width};

use core::time::Duration;

/// A `Histogram` stores counts for recorded values across a high dynamic
/// range while guaranteeing a configurable number of significant figures.
///
/// Recording and lookup are constant time. Memory is fixed at construction
/// and depends only on the configured range and precision.
#[derive(Clone, Debug)]
pub struct Histogram {
    config: Config,
    counts: Counts,
    total_count: u64,
    // observed extrema among recorded values, not slot indices
    min_nonzero_value: u64,
    max_value: u64,
    // tightest witnessed bounds on slots holding a nonzero count
    min_nonzero_index: usize,
    max_nonzero_index: usize,
    // interval metadata passed through for log writers, opaque to the core
    start_time: Option<Duration>,
    end_time: Option<Duration>,
    tag: Option<String>,
}

/// A `Builder` allows for constructing a `Histogram` with the desired
/// configuration.
pub struct Builder {
    low: u64,
    high: u64,
    sigfig: u8,
    width: Width,
    policy: RangePolicy,
}

impl Builder {
    /// Consume the `Builder` and return a `Histogram`.
    pub fn build(self) -> Result<Histogram, Error> {
        let config = Config::with_policy(self.low, self.high, self.sigfig, self.policy)?;
        Ok(Histogram::from_config(config, self.width))
    }

    /// Sets the lowest value which is discerned from zero.
    ///
    /// Values below this may still be recorded, but they share slots with
    /// neighboring values and carry no precision guarantee.
    pub fn lowest_discernible_value(mut self, value: u64) -> Self {
        self.low = value;
        self
    }

    /// Sets the highest value which can be recorded into the `Histogram`.
    pub fn highest_trackable_value(mut self, value: u64) -> Self {
        self.high = value;
        self
    }

    /// Sets the number of significant figures which are preserved for
    /// recorded values, within the range 0 - 5 (inclusive).
    pub fn significant_figures(mut self, sigfig: u8) -> Self {
        self.sigfig = sigfig;
        self
    }

    /// Sets the storage width for per-slot counters.
    pub fn counter_width(mut self, width: Width) -> Self {
        self.width = width;
        self
    }

    /// Sets the policy for values above the highest trackable value.
    pub fn out_of_range(mut self, policy: RangePolicy) -> Self {
        self.policy = policy;
        self
    }
}

impl Histogram {
    /// Creates a `Builder` with the default values `lowest = 1`,
    /// `highest = 3_600_000_000`, `sigfig = 3`, 64-bit counters, and out of
    /// range values discarded.
    ///
    /// The defaults suit latencies measured in microseconds with a max
    /// expected latency of one hour.
    pub fn builder() -> Builder {
        Builder {
            low: 1,
            high: 3_600_000_000,
            sigfig: 3,
            width: Width::U64,
            policy: RangePolicy::Discard,
        }
    }

    /// Create a new histogram covering the full u64 range with the provided
    /// number of significant figures.
    pub fn new(sigfig: u8) -> Result<Self, Error> {
        Self::new_with_bounds(1, u64::MAX, sigfig)
    }

    /// Create a new histogram storing values from 1 to `high`.
    pub fn new_with_max(high: u64, sigfig: u8) -> Result<Self, Error> {
        Self::new_with_bounds(1, high, sigfig)
    }

    /// Create a new histogram storing values from `low` to `high` with
    /// `sigfig` significant figures preserved.
    pub fn new_with_bounds(low: u64, high: u64, sigfig: u8) -> Result<Self, Error> {
        Ok(Self::from_config(Config::new(low, high, sigfig)?, Width::U64))
    }

    pub(crate) fn from_config(config: Config, width: Width) -> Self {
        Self {
            counts: Counts::new(width, config.counts_len()),
            config,
            total_count: 0,
            min_nonzero_value: u64::MAX,
            max_value: 0,
            min_nonzero_index: usize::MAX,
            max_nonzero_index: 0,
            start_time: None,
            end_time: None,
            tag: None,
        }
    }

    pub(crate) fn config(&self) -> &Config {
        &self.config
    }

    pub(crate) fn count_at_index(&self, index: usize) -> u64 {
        self.counts.get(index)
    }

    pub(crate) fn counts_mut(&mut self) -> &mut Counts {
        &mut self.counts
    }

    /// Record a single occurrence of `value`.
    pub fn record(&mut self, value: u64) -> Result<(), Error> {
        self.record_n(value, 1)
    }

    /// Record `count` occurrences of `value`. Recording a count of zero is a
    /// no-op.
    pub fn record_n(&mut self, value: u64, count: u64) -> Result<(), Error> {
        if count == 0 {
            return Ok(());
        }
        let value = if value > self.config.high() {
            match self.config.policy() {
                RangePolicy::Discard => return Err(Error::OutOfRange),
                RangePolicy::Clip => self.config.high(),
            }
        } else {
            value
        };
        let index = self.config.index_for(value);
        self.counts.try_add(index, count)?;
        self.total_count = self.total_count.saturating_add(count);
        self.update_extrema(index, value);
        Ok(())
    }

    /// Record `value` while correcting for coordinated omission.
    ///
    /// If `value` is larger than `interval`, synthetic samples are recorded
    /// at `value - interval`, `value - 2 * interval`, and so on for as long
    /// as the result is at least `interval`. This compensates for samples
    /// which would have been observed during a stall had the observer not
    /// itself been stalled.
    pub fn record_correct(&mut self, value: u64, interval: u64) -> Result<(), Error> {
        self.record_n_correct(value, 1, interval)
    }

    /// Record `count` occurrences of `value` while correcting for
    /// coordinated omission.
    pub fn record_n_correct(
        &mut self,
        value: u64,
        count: u64,
        interval: u64,
    ) -> Result<(), Error> {
        self.record_n(value, count)?;
        if interval == 0 {
            return Ok(());
        }
        let mut missing = value.saturating_sub(interval);
        while missing >= interval {
            self.record_n(missing, count)?;
            missing -= interval;
        }
        Ok(())
    }

    /// Produce a copy of this histogram with coordinated omission correction
    /// applied to every recorded value, leaving this histogram untouched.
    pub fn clone_correct(&self, interval: u64) -> Result<Self, Error> {
        let mut corrected = Self::from_config(self.config, self.counts.width());
        for v in self.iter_recorded() {
            corrected.record_n_correct(v.value_iterated_to(), v.count_at_value(), interval)?;
        }
        corrected.start_time = self.start_time;
        corrected.end_time = self.end_time;
        corrected.tag = self.tag.clone();
        Ok(corrected)
    }

    /// Clear all recorded counts and extrema. Interval metadata is retained.
    pub fn reset(&mut self) {
        self.counts.clear();
        self.total_count = 0;
        self.min_nonzero_value = u64::MAX;
        self.max_value = 0;
        self.min_nonzero_index = usize::MAX;
        self.max_nonzero_index = 0;
    }

    /// The total number of samples recorded.
    pub fn count(&self) -> u64 {
        self.total_count
    }

    /// Return true if no samples have been recorded.
    pub fn is_empty(&self) -> bool {
        self.total_count == 0
    }

    /// The lowest recorded value, reported at the resolution of its slot.
    /// Returns 0 for an empty histogram.
    pub fn min(&self) -> u64 {
        if self.total_count == 0 || self.counts.get(0) > 0 {
            0
        } else if self.min_nonzero_value == u64::MAX {
            0
        } else {
            self.config.lowest_equivalent(self.min_nonzero_value)
        }
    }

    /// The highest recorded value, reported at the resolution of its slot.
    /// Returns 0 for an empty histogram.
    pub fn max(&self) -> u64 {
        if self.total_count == 0 {
            0
        } else {
            self.config.highest_equivalent(self.max_value)
        }
    }

    /// The mean of all recorded values, weighted by the midpoint of each
    /// occupied slot. Returns 0.0 for an empty histogram.
    pub fn mean(&self) -> f64 {
        if self.total_count == 0 {
            return 0.0;
        }
        self.iter_recorded().fold(0.0, |sum, v| {
            sum + self.config.median_equivalent(v.value_iterated_to()) as f64
                * v.count_at_value() as f64
        }) / self.total_count as f64
    }

    /// The population standard deviation about the mean, with the same slot
    /// midpoint weighting as `mean`. Returns 0.0 for an empty histogram.
    pub fn stdev(&self) -> f64 {
        if self.total_count == 0 {
            return 0.0;
        }
        let mean = self.mean();
        let sum = self.iter_recorded().fold(0.0, |sum, v| {
            let deviation =
                self.config.median_equivalent(v.value_iterated_to()) as f64 - mean;
            sum + deviation * deviation * v.count_at_value() as f64
        });
        (sum / self.total_count as f64).sqrt()
    }

    /// Return the value at the provided percentile. Percentile must be within
    /// the range 0.0 to 100.0 (inclusive). A percentile of 0.0 returns the
    /// lowest recorded value, 100.0 the highest.
    pub fn value_at_percentile(&self, percentile: f64) -> Result<u64, Error> {
        if !(0.0..=100.0).contains(&percentile) {
            return Err(Error::InvalidPercentile);
        }
        if self.total_count == 0 {
            return Err(Error::Empty);
        }

        let mut need = (percentile / 100.0 * self.total_count as f64).ceil() as u64;
        if need < 1 {
            need = 1;
        }
        if need > self.total_count {
            need = self.total_count;
        }

        let mut have = 0_u64;
        for index in self.min_nonzero_index..=self.max_nonzero_index {
            have = have.saturating_add(self.counts.get(index));
            if have >= need {
                let value = self.config.value_for(index);
                return Ok(if percentile == 0.0 {
                    self.config.lowest_equivalent(value)
                } else {
                    self.config.highest_equivalent(value)
                });
            }
        }
        Ok(self.max())
    }

    /// The percentile of recorded samples at or below `value`. Returns 100.0
    /// for an empty histogram.
    pub fn percentile_below(&self, value: u64) -> f64 {
        if self.total_count == 0 {
            return 100.0;
        }
        let target = self
            .config
            .index_for(value)
            .min(self.config.counts_len() - 1);
        let below = (0..=target)
            .map(|index| self.counts.get(index))
            .fold(0_u64, u64::saturating_add);
        100.0 * below as f64 / self.total_count as f64
    }

    /// The count recorded in the slot holding `value`.
    pub fn count_at(&self, value: u64) -> u64 {
        let index = self
            .config
            .index_for(value)
            .min(self.config.counts_len() - 1);
        self.counts.get(index)
    }

    /// The total count recorded across the slots spanning `low` to `high`
    /// (inclusive), saturating at u64::MAX.
    pub fn count_between(&self, low: u64, high: u64) -> u64 {
        let last = self.config.counts_len() - 1;
        let low_index = self.config.index_for(low).min(last);
        let high_index = self.config.index_for(high).min(last);
        (low_index..=high_index)
            .map(|index| self.counts.get(index))
            .fold(0_u64, u64::saturating_add)
    }

    /// Adds the other histogram to this histogram. The configurations must
    /// describe the same value range and precision. If any slot would
    /// overflow its counter width, an error is returned and this histogram is
    /// unchanged.
    pub fn add(&mut self, other: &Self) -> Result<(), Error> {
        if !self.config.matches(&other.config) {
            return Err(Error::IncompatibleHistogram);
        }
        if other.total_count == 0 {
            return Ok(());
        }

        // verify every addition fits before mutating anything
        for index in other.min_nonzero_index..=other.max_nonzero_index {
            let count = other.counts.get(index);
            if count > 0 && !self.counts.can_add(index, count) {
                return Err(Error::Overflow);
            }
        }

        for index in other.min_nonzero_index..=other.max_nonzero_index {
            let count = other.counts.get(index);
            if count > 0 {
                self.counts.try_add(index, count)?;
            }
        }
        self.total_count = self.total_count.saturating_add(other.total_count);
        if other.max_value > self.max_value {
            self.max_value = other.max_value;
        }
        if other.min_nonzero_value < self.min_nonzero_value {
            self.min_nonzero_value = other.min_nonzero_value;
        }
        if other.max_nonzero_index > self.max_nonzero_index {
            self.max_nonzero_index = other.max_nonzero_index;
        }
        if other.min_nonzero_index < self.min_nonzero_index {
            self.min_nonzero_index = other.min_nonzero_index;
        }
        Ok(())
    }

    /// Subtracts the other histogram from this histogram. The configurations
    /// must describe the same value range and precision, and every slot in
    /// this histogram must hold at least the count being subtracted. On
    /// failure this histogram is unchanged.
    pub fn subtract(&mut self, other: &Self) -> Result<(), Error> {
        if !self.config.matches(&other.config) {
            return Err(Error::IncompatibleHistogram);
        }
        if other.total_count == 0 {
            return Ok(());
        }

        for index in other.min_nonzero_index..=other.max_nonzero_index {
            if self.counts.get(index) < other.counts.get(index) {
                return Err(Error::Underflow);
            }
        }

        for index in other.min_nonzero_index..=other.max_nonzero_index {
            let count = other.counts.get(index);
            if count > 0 {
                let remaining = self.counts.get(index) - count;
                // the difference always fits the destination width
                let _ = self.counts.set(index, remaining);
            }
        }
        self.restat();
        Ok(())
    }

    // Rebuild total count, extrema, and index bounds from the counts array.
    pub(crate) fn restat(&mut self) {
        self.total_count = 0;
        self.min_nonzero_value = u64::MAX;
        self.max_value = 0;
        self.min_nonzero_index = usize::MAX;
        self.max_nonzero_index = 0;

        for index in 0..self.counts.len() {
            let count = self.counts.get(index);
            if count > 0 {
                self.total_count = self.total_count.saturating_add(count);
                if index < self.min_nonzero_index {
                    self.min_nonzero_index = index;
                }
                if index > self.max_nonzero_index {
                    self.max_nonzero_index = index;
                }
                let value = self.config.value_for(index);
                if value != 0 && value < self.min_nonzero_value {
                    self.min_nonzero_value = value;
                }
                if value > self.max_value {
                    self.max_value = value;
                }
            }
        }
    }

    pub(crate) fn min_nonzero_index(&self) -> usize {
        self.min_nonzero_index
    }

    pub(crate) fn max_nonzero_index(&self) -> usize {
        self.max_nonzero_index
    }

    fn update_extrema(&mut self, index: usize, value: u64) {
        if value > self.max_value {
            self.max_value = value;
        }
        if value != 0 && value < self.min_nonzero_value {
            self.min_nonzero_value = value;
        }
        if index > self.max_nonzero_index {
            self.max_nonzero_index = index;
        }
        if index < self.min_nonzero_index {
            self.min_nonzero_index = index;
        }
    }

    /// The lowest discernible value.
    pub fn low(&self) -> u64 {
        self.config.low()
    }

    /// The highest trackable value.
    pub fn high(&self) -> u64 {
        self.config.high()
    }

    /// The number of significant figures preserved.
    pub fn sigfig(&self) -> u8 {
        self.config.sigfig()
    }

    /// The storage width of the per-slot counters.
    pub fn counter_width(&self) -> Width {
        self.counts.width()
    }

    /// The number of buckets in the layout.
    pub fn buckets(&self) -> usize {
        self.config.buckets()
    }

    /// The number of sub buckets each bucket is divided into.
    pub fn sub_buckets(&self) -> usize {
        self.config.sub_buckets()
    }

    /// The number of distinct storage slots.
    pub fn distinct_values(&self) -> usize {
        self.config.counts_len()
    }

    /// The lowest value which is stored in the same slot as `value`.
    pub fn lowest_equivalent(&self, value: u64) -> u64 {
        self.config.lowest_equivalent(value)
    }

    /// The highest value which is stored in the same slot as `value`.
    pub fn highest_equivalent(&self, value: u64) -> u64 {
        self.config.highest_equivalent(value)
    }

    /// The number of distinct values which share a slot with `value`.
    pub fn equivalent_range(&self, value: u64) -> u64 {
        self.config.equivalent_range(value)
    }

    /// The value at the midpoint of the slot holding `value`.
    pub fn median_equivalent(&self, value: u64) -> u64 {
        self.config.median_equivalent(value)
    }

    /// The lowest value stored in the slot after the one holding `value`.
    pub fn next_non_equivalent(&self, value: u64) -> u64 {
        self.config.next_non_equivalent(value)
    }

    /// Return true if both values are stored in the same slot.
    pub fn equivalent(&self, a: u64, b: u64) -> bool {
        self.config.equivalent(a, b)
    }

    /// The start of the interval this histogram covers, as set by the
    /// recording process. Opaque to the histogram itself.
    pub fn start_time(&self) -> Option<Duration> {
        self.start_time
    }

    /// Set the start of the interval this histogram covers.
    pub fn set_start_time(&mut self, time: Option<Duration>) {
        self.start_time = time;
    }

    /// The end of the interval this histogram covers.
    pub fn end_time(&self) -> Option<Duration> {
        self.end_time
    }

    /// Set the end of the interval this histogram covers.
    pub fn set_end_time(&mut self, time: Option<Duration>) {
        self.end_time = time;
    }

    /// The tag carried for interval log writers.
    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    /// Set the tag carried for interval log writers.
    pub fn set_tag(&mut self, tag: Option<String>) {
        self.tag = tag;
    }
}

impl PartialEq for Histogram {
    // Interval metadata and counter width are excluded, so a decoded copy
    // compares equal to the histogram it was encoded from.
    fn eq(&self, other: &Self) -> bool {
        if !self.config.matches(&other.config) {
            return false;
        }
        if self.total_count != other.total_count
            || self.min() != other.min()
            || self.max() != other.max()
        {
            return false;
        }
        (0..self.counts.len()).all(|index| self.counts.get(index) == other.counts.get(index))
    }
}
