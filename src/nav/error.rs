//! Error taxonomy for navigation operations
//!
//! Every failure surfaces synchronously to the operation's caller; nothing is
//! retried inside the engine, and a failed request never blocks the ones
//! queued behind it.

use thiserror::Error;

use crate::nav::page::PageId;

pub type NavResult<T> = Result<T, NavError>;

/// Failure modes of push/pop/preload operations.
#[derive(Debug, Error)]
pub enum NavError {
    /// The resource key was empty.
    #[error("resource key must not be empty")]
    EmptyKey,

    /// A synchronous stack API was called while another transition was in
    /// flight. Requests routed through the [`Navigator`](crate::nav::queue::Navigator)
    /// queue instead of the stack directly are never rejected this way.
    #[error("a transition is already in progress")]
    TransitionInProgress,

    /// Pop was asked to remove zero pages.
    #[error("pop count must be at least 1")]
    InvalidPopCount,

    /// Pop was asked to remove more pages than are resident.
    #[error("pop count {requested} exceeds stack depth {depth}")]
    PopBeyondDepth { requested: usize, depth: usize },

    /// The destination page id of a pop-to is not in the stack.
    #[error("no page with id {0} is in the stack")]
    PageNotFound(PageId),

    /// A caller-supplied page id collides with a resident record.
    #[error("page id {0} is already in the stack")]
    DuplicatePageId(PageId),

    /// The key was already preloaded.
    #[error("asset {0:?} is already preloaded")]
    DuplicatePreload(String),

    /// Unload was called for a key that was never preloaded.
    #[error("asset {0:?} is not preloaded")]
    NotPreloaded(String),

    /// An asset handle was read before its load completed.
    #[error("asset {0:?} is not loaded")]
    NotLoaded(String),

    /// The asset backend failed to resolve the key. Aborts the single
    /// in-flight operation; the stack is left untouched.
    #[error("failed to load asset {key:?}")]
    ResourceLoad {
        key: String,
        #[source]
        source: anyhow::Error,
    },

    /// The page factory failed to construct an instance from a loaded prefab.
    #[error("page construction failed for asset {key:?}")]
    Construction {
        key: String,
        #[source]
        source: anyhow::Error,
    },

    /// The operation's cancellation token fired before the stack mutation was
    /// committed. Distinguished from failure: the caller asked for it.
    #[error("transition cancelled")]
    Cancelled,

    /// The navigator's consumer loop has shut down.
    #[error("navigator has shut down")]
    Closed,
}

impl NavError {
    /// True for the cancellation outcome, as opposed to a genuine failure.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, NavError::Cancelled)
    }

    /// True for errors rejected before any side effect took place.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            NavError::EmptyKey
                | NavError::TransitionInProgress
                | NavError::InvalidPopCount
                | NavError::PopBeyondDepth { .. }
                | NavError::PageNotFound(_)
                | NavError::DuplicatePageId(_)
                | NavError::DuplicatePreload(_)
                | NavError::NotPreloaded(_)
        )
    }
}
