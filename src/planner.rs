//! Decides which block numbers to sample for a requested window.

use crate::types::{BlockNumber, ViewRange};
use std::num::NonZeroU32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SamplePlan {
    pub step: u64,
    pub blocks: Vec<BlockNumber>,
}

/// `step = floor(span / budget)`, at least 1. Candidates are
/// `start, start + step, ...` strictly below `end`.
///
/// Pure: the same arguments always give the same candidates, so exact
/// block numbers repeated across overlapping windows hit the cache.
pub fn plan(range: ViewRange, point_budget: NonZeroU32) -> SamplePlan {
    let step = (range.span() / u64::from(point_budget.get())).max(1);
    let blocks = (range.start()..range.end())
        .step_by(usize::try_from(step).unwrap_or(usize::MAX))
        .collect();
    SamplePlan { step, blocks }
}
