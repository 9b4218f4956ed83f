// Copyright 2022 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::iter::{Position, Strategy};

/// Steps through every slot in the layout, occupied or not.
pub struct AllValues {
    visited: Option<usize>,
}

impl AllValues {
    pub(crate) fn new() -> Self {
        Self { visited: None }
    }
}

impl Strategy for AllValues {
    fn reached(&mut self, pos: &Position<'_>) -> bool {
        self.visited != Some(pos.index)
    }

    fn advance(&mut self, pos: &Position<'_>) {
        self.visited = Some(pos.index);
    }

    fn more(&mut self, pos: &Position<'_>) -> bool {
        // every slot is reported, not just those holding counts
        pos.index + 1 < pos.histogram.distinct_values()
    }
}
