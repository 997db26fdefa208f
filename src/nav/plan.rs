//! Transition plan computation
//!
//! Pure decisions over a stack snapshot: which records enter, which exit, and
//! whether the exiting top is removed or merely covered. The stack drives the
//! lifecycle from these plans; nothing here mutates anything.

use crate::nav::record::PageRecord;

/// Computed description of one push transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushPlan {
    /// Index of the record that exits (always the current tail), if any.
    pub exiting: Option<usize>,
    /// True when the exiting record was pushed without `keep_in_stack` and is
    /// removed rather than covered.
    pub exiting_removed: bool,
}

/// Computed description of one pop transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopPlan {
    /// Indices of exiting records, top-first. Length equals the pop count.
    pub exiting: Vec<usize>,
    /// Index of the record newly exposed underneath, if any.
    pub entering: Option<usize>,
}

/// The exiting candidate is always the current tail; it is removed iff its
/// own `stacked` flag, captured when it was pushed, is false.
pub(crate) fn plan_push(records: &[PageRecord]) -> PushPlan {
    match records.last() {
        Some(top) => PushPlan {
            exiting: Some(records.len() - 1),
            exiting_removed: !top.is_stacked(),
        },
        None => PushPlan {
            exiting: None,
            exiting_removed: false,
        },
    }
}

/// Exiting set = the `count` tail records top-first; entering candidate = the
/// record left at the new tail, when one remains. Depth preconditions are the
/// caller's job.
pub(crate) fn plan_pop(depth: usize, count: usize) -> PopPlan {
    debug_assert!(count >= 1 && count <= depth);
    PopPlan {
        exiting: (depth - count..depth).rev().collect(),
        entering: (depth > count).then(|| depth - count - 1),
    }
}
