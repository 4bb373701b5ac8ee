use thiserror::Error;

use crate::dock::Position;
use crate::tree::NodeId;

/// Failure paths for docker-façade and tree-rewrite operations.
///
/// Each variant maps to exactly one of the named error kinds from the
/// design: precondition violations are reported here and leave the tree
/// unchanged. Invariants violated *inside* the consolidator are bugs in
/// this crate, not caller errors, and are reported via `assert!` instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DockerError {
    #[error("anchor is invalid: {reason}")]
    InvalidAnchor { reason: &'static str },

    #[error("cannot dock with `with` position directly on the workspace root")]
    InvalidRootWith,

    #[error("dock does not support being minimized")]
    CannotMinimize,

    #[error("dock does not support being closed")]
    CannotClose,

    #[error("dock cannot be merged via `with`: {reason}")]
    CannotMerge { reason: &'static str },

    #[error("float requested from a dock that is not minimized")]
    InvalidFloatSource,

    #[error("pin requested from a dock that is not minimized or floating")]
    InvalidPinSource,

    #[error("the center group's node cannot be removed from the tree")]
    CenterNotRemovable,

    #[error("property is immutable on this segment variant: {property}")]
    FixedProperty { property: &'static str },

    #[error("node {node:?} cannot be assimilated into its parent")]
    InvalidAssimilation { node: NodeId },

    #[error("merge_leaf_parts precondition violated: {reason}")]
    MergeInvalid { reason: &'static str },

    #[error("a node holding CenterGroup cannot be promoted to an internal node")]
    CenterMustBeLeaf,

    #[error("anchor's relative-to dock is not present in the target group")]
    AnchorNotInGroup,

    #[error("dock is not present in the group it was removed from")]
    NotInGroup,

    #[error("node {child:?} is not a child of node {parent:?}")]
    NotAChild { parent: NodeId, child: NodeId },

    #[error("node {sibling:?} is not a direct child of the node being split")]
    InvalidSibling { sibling: NodeId },

    #[error("no tray group was found on the ancestor chain for position {position:?}")]
    NoTrayOnPath { position: Position },
}

pub type DockerResult<T> = Result<T, DockerError>;
