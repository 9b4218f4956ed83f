// Copyright 2022 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::iter::{Position, Strategy};

/// Steps through percentile levels of increasing resolution.
///
/// The distance between reported levels halves each time the remaining
/// distance to 100% halves, with `ticks_per_half_distance` levels per
/// halving. The ladder keeps reporting inside the last occupied slot, so a
/// top heavy distribution repeats its maximum value at ever finer levels.
/// Once a step no longer moves the level, a single record at 100% ends the
/// iteration.
pub struct Percentiles {
    ticks_per_half_distance: u32,
    level: f64,
    emitted_last: bool,
}

impl Percentiles {
    pub(crate) fn new(ticks_per_half_distance: u32) -> Self {
        assert!(
            ticks_per_half_distance > 0,
            "ticks_per_half_distance must be at least 1"
        );
        Self {
            ticks_per_half_distance,
            level: 0.0,
            emitted_last: false,
        }
    }
}

impl Strategy for Percentiles {
    fn reached(&mut self, pos: &Position<'_>) -> bool {
        pos.count_at_index != 0 && pos.percentile() >= self.level
    }

    fn advance(&mut self, _pos: &Position<'_>) {
        if self.level >= 100.0 {
            // the record at 100% closes the iteration
            self.emitted_last = true;
            return;
        }
        // resolution doubles every time the remaining distance to 100%
        // halves
        let halvings = (100.0 / (100.0 - self.level)).log2().floor() + 1.0;
        let ticks = f64::from(self.ticks_per_half_distance) * halvings.exp2();
        let next = self.level + 100.0 / ticks;
        // once the step is below float resolution the ladder is exhausted
        self.level = if next > self.level { next } else { 100.0 };
    }

    fn percentile_iterated_to(&self, _pos: &Position<'_>) -> f64 {
        self.level
    }

    fn more(&mut self, pos: &Position<'_>) -> bool {
        // the ladder keeps reporting within the last occupied slot until
        // the 100% record has been emitted
        pos.total > 0 && !self.emitted_last
    }
}
