//! Tree construction errors.
//!
//! These all indicate a bug in the code assembling the view hierarchy; callers
//! are expected to treat them as fatal.

use crate::view::ViewId;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("view {0:?} does not exist in this tree")]
    UnknownView(ViewId),

    #[error("view {child:?} is already attached to {parent:?}")]
    AlreadyAttached { child: ViewId, parent: ViewId },

    #[error("attaching {child:?} under {parent:?} would create a cycle")]
    Cycle { child: ViewId, parent: ViewId },

    #[error("the tree is sealed; views cannot be attached after the first layout")]
    Sealed,

    #[error("the tree already has a root ({0:?})")]
    RootAlreadySet(ViewId),

    #[error("the root view cannot be attached as a child")]
    RootAsChild,
}
