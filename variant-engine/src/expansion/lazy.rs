//! On-demand combination enumeration
//!
//! Odometer over the active axes: the last axis advances fastest, which is
//! exactly the order the eager accumulator produces. State is one index per
//! axis, so enumerating any prefix of a huge product costs O(D) memory.

use super::Combination;
use crate::normalize::Dimension;

pub struct CombinationIter<'a> {
    active: Vec<&'a Dimension>,
    /// Current value index per axis; `None` once exhausted
    cursor: Option<Vec<usize>>,
}

impl<'a> CombinationIter<'a> {
    pub(super) fn new(active: Vec<&'a Dimension>) -> Self {
        let cursor = if active.is_empty() {
            None
        } else {
            Some(vec![0; active.len()])
        };
        Self { active, cursor }
    }

    /// Advance the odometer; returns false when the sequence is exhausted.
    fn advance(&mut self) -> bool {
        let Some(cursor) = self.cursor.as_mut() else {
            return false;
        };
        for axis in (0..cursor.len()).rev() {
            cursor[axis] += 1;
            if cursor[axis] < self.active[axis].values.len() {
                return true;
            }
            cursor[axis] = 0;
        }
        self.cursor = None;
        false
    }
}

impl Iterator for CombinationIter<'_> {
    type Item = Combination;

    fn next(&mut self) -> Option<Combination> {
        let indices = self.cursor.as_ref()?.clone();
        let combination = Combination::from_selection(&self.active, &indices);
        self.advance();
        Some(combination)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match &self.cursor {
            None => (0, Some(0)),
            Some(cursor) => {
                // Remaining = total - consumed, both derivable from the odometer
                let mut total: usize = 1;
                let mut consumed: usize = 0;
                for (axis, dim) in self.active.iter().enumerate() {
                    consumed = consumed * dim.values.len() + cursor[axis];
                    total *= dim.values.len();
                }
                let remaining = total - consumed;
                (remaining, Some(remaining))
            }
        }
    }
}
