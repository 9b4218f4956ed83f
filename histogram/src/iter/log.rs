// Copyright 2022 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::iter::{Position, Strategy};
use crate::Histogram;

/// Steps through geometrically growing bands in value space.
///
/// The first band spans `step` values starting at zero and every later band
/// spans `base` times its predecessor.
pub struct Logarithmic {
    base: f64,
    // exclusive upper bound of the band about to be reported
    next_level: f64,
    step_highest: u64,
    step_lowest_equivalent: u64,
}

impl Logarithmic {
    pub(crate) fn new(histogram: &Histogram, step: u64, base: f64) -> Self {
        assert!(step > 0, "step must be at least 1");
        assert!(base > 1.0, "base must be above 1.0");
        Self {
            base,
            next_level: step as f64,
            step_highest: step - 1,
            step_lowest_equivalent: histogram.lowest_equivalent(step - 1),
        }
    }
}

impl Strategy for Logarithmic {
    fn reached(&mut self, pos: &Position<'_>) -> bool {
        pos.value >= self.step_lowest_equivalent
    }

    fn advance(&mut self, pos: &Position<'_>) {
        self.next_level *= self.base;
        self.step_highest = self.next_level as u64 - 1;
        self.step_lowest_equivalent = pos.histogram.lowest_equivalent(self.step_highest);
    }

    fn value_iterated_to(&self, _pos: &Position<'_>) -> u64 {
        self.step_highest
    }

    fn more(&mut self, pos: &Position<'_>) -> bool {
        ((self.next_level * self.base) as u64) < pos.next_value
    }
}
