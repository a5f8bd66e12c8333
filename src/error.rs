use std::fmt::Debug;

use thiserror::Error;

use crate::range::{Range, RangeError};

/// Errors raised by the tree coordinator.
///
/// Invariant violations (`InvariantViolation`, `Range`, `RenderedRangeNotAttached`)
/// signal a bug in the bookkeeping and are never recovered from internally.
/// The remaining variants reject caller input before anything is mutated.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("invariant violated: {0}")]
    InvariantViolation(String),
    #[error(transparent)]
    Range(#[from] RangeError),
    #[error("rows not rendered as expected in {range}: first or last row is detached")]
    RenderedRangeNotAttached { range: Range },
    #[error("unknown node {0}")]
    UnknownNode(String),
    #[error("node {0} already exists")]
    DuplicateNode(String),
    #[error("unexpected parent for node {node}: expected {expected}")]
    UnexpectedParent { node: String, expected: String },
    #[error("node order length mismatch: expected {expected}, got {actual}")]
    ChildCountMismatch { expected: usize, actual: usize },
    #[error("node order may only permute the existing children")]
    ChildSetMismatch,
    #[error("cannot calculate a view range with a node height of 0")]
    ZeroNodeHeight,
}

impl TreeError {
    pub(crate) fn unknown<Id: Debug>(id: Id) -> Self {
        Self::UnknownNode(format!("{id:?}"))
    }

    pub(crate) fn duplicate<Id: Debug>(id: Id) -> Self {
        Self::DuplicateNode(format!("{id:?}"))
    }

    pub(crate) fn unexpected_parent<Id: Debug>(node: Id, expected: Option<Id>) -> Self {
        Self::UnexpectedParent {
            node: format!("{node:?}"),
            expected: format!("{expected:?}"),
        }
    }

    /// Returns `true` for errors that indicate corrupted internal state.
    pub const fn is_invariant_violation(&self) -> bool {
        matches!(
            self,
            Self::InvariantViolation(_) | Self::Range(_) | Self::RenderedRangeNotAttached { .. }
        )
    }
}
