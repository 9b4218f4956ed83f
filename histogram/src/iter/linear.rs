// Copyright 2022 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::iter::{Position, Strategy};
use crate::Histogram;

/// Steps through bands of a fixed width in value space, starting at zero.
///
/// A band is reported once the walk passes the slot holding the band's
/// highest value. Iteration continues through empty bands until the slot
/// holding the highest recorded value has been fully covered, which can
/// take several bands when the slot is wider than the band.
pub struct Linear {
    step: u64,
    // highest value of the band about to be reported
    step_highest: u64,
    // lowest value equivalent to step_highest, the walk must pass it before
    // the band is reported
    step_lowest_equivalent: u64,
}

impl Linear {
    pub(crate) fn new(histogram: &Histogram, step: u64) -> Self {
        assert!(step > 0, "step must be at least 1");
        Self {
            step,
            step_highest: step - 1,
            step_lowest_equivalent: histogram.lowest_equivalent(step - 1),
        }
    }
}

impl Strategy for Linear {
    fn reached(&mut self, pos: &Position<'_>) -> bool {
        pos.value >= self.step_lowest_equivalent
    }

    fn advance(&mut self, pos: &Position<'_>) {
        self.step_highest += self.step;
        self.step_lowest_equivalent = pos.histogram.lowest_equivalent(self.step_highest);
    }

    fn value_iterated_to(&self, _pos: &Position<'_>) -> u64 {
        self.step_highest
    }

    fn more(&mut self, pos: &Position<'_>) -> bool {
        // remaining bands lie inside the slot the walk stopped in
        self.step_highest < pos.next_value
    }
}
