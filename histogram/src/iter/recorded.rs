// Copyright 2022 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::iter::{Position, Strategy};

/// Steps through the slots which hold a nonzero count.
pub struct Recorded {
    visited: Option<usize>,
}

impl Recorded {
    pub(crate) fn new() -> Self {
        Self { visited: None }
    }
}

impl Strategy for Recorded {
    fn reached(&mut self, pos: &Position<'_>) -> bool {
        pos.count_at_index != 0 && self.visited != Some(pos.index)
    }

    fn advance(&mut self, pos: &Position<'_>) {
        self.visited = Some(pos.index);
    }
}
