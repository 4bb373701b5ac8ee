//! The dock payload wrapper: anchors, capability flags and the small state
//! machine a dock moves through. The actual panel content (`Dockable` in the
//! design) is out of scope for this crate and is carried opaquely as `P`.

use bitflags::bitflags;

use crate::tree::NodeId;

/// Opaque handle to a [`Dock<P>`] stored in a [`crate::docker::Docker`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DockId(pub(crate) usize);

/// Where a dock sits relative to another dock, or relative to the
/// workspace's own edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Position {
    Left,
    Right,
    Top,
    Bottom,
    Center,
    With,
}

impl Position {
    /// `left`/`right` partition a group horizontally; `top`/`bottom`
    /// partition it vertically. Only meaningful for positions that can be
    /// used as a relative-to anchor (not `center`/`with`).
    pub fn required_orientation(self) -> Option<crate::segment::Orientation> {
        use crate::segment::Orientation;
        match self {
            Position::Left | Position::Right => Some(Orientation::Horizontal),
            Position::Top | Position::Bottom => Some(Orientation::Vertical),
            Position::Center | Position::With => None,
        }
    }

    pub fn is_edge(self) -> bool {
        matches!(self, Position::Left | Position::Right | Position::Top | Position::Bottom)
    }

    pub fn as_edge(self) -> Option<crate::segment::Edge> {
        use crate::segment::Edge;
        match self {
            Position::Left => Some(Edge::Left),
            Position::Right => Some(Edge::Right),
            Position::Top => Some(Edge::Top),
            Position::Bottom => Some(Edge::Bottom),
            Position::Center | Position::With => None,
        }
    }
}

/// Position hint plus an optional existing dockable acting as a reference
/// point.
///
/// `relative_to` must be `None` for [`Position::Center`] and `Some` for
/// [`Position::With`]; the docker validates this on every `dock()` call.
#[derive(Debug, Clone, Copy)]
pub struct Anchor {
    pub position: Position,
    pub relative_to: Option<DockId>,
}

impl Anchor {
    pub fn new(position: Position, relative_to: Option<DockId>) -> Self {
        Self { position, relative_to }
    }

    pub fn center() -> Self {
        Self { position: Position::Center, relative_to: None }
    }

    pub fn relative(position: Position, relative_to: DockId) -> Self {
        Self { position, relative_to: Some(relative_to) }
    }

    pub fn with(relative_to: DockId) -> Self {
        Self { position: Position::With, relative_to: Some(relative_to) }
    }
}

/// Where a dock currently sits in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DockState {
    /// Not attached to the tree at all.
    Undocked,
    /// Attached to a [`crate::segment::Segment::DockGroup`] or the center
    /// group.
    Pinned,
    /// Attached to a [`crate::segment::Segment::Tray`].
    Minimized,
    /// Detached for presentation purposes; still logically anchored to its
    /// tray placement (floating windows are an external collaborator, see
    /// spec §9 "Floating state is underspecified").
    Floating,
}

bitflags! {
    /// What operations a dock supports. Mirrors the capability-flag
    /// precondition checks in `Docker::minimize`/`Docker::close`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct DockCapabilities: u8 {
        const MINIMIZABLE = 0b0000_0001;
        const CLOSEABLE   = 0b0000_0010;
    }
}

impl Default for DockCapabilities {
    fn default() -> Self {
        DockCapabilities::MINIMIZABLE | DockCapabilities::CLOSEABLE
    }
}

/// A single dockable panel tracked by a [`crate::docker::Docker`].
///
/// `payload` is the opaque `Dockable` content; this crate never inspects
/// it beyond moving it around during `dock_with`.
#[derive(Debug)]
pub struct Dock<P> {
    pub(crate) id: DockId,
    pub payload: P,
    pub(crate) anchor: Anchor,
    pub(crate) state: DockState,
    pub(crate) capabilities: DockCapabilities,
    pub(crate) width: f32,
    pub(crate) height: f32,
    /// The node holding the `DockGroup`/`Center`/`Tray` segment this dock
    /// currently appears in, or `None` if undocked.
    pub(crate) group: Option<NodeId>,
}

impl<P> Dock<P> {
    pub fn new(payload: P, capabilities: DockCapabilities, width: f32, height: f32) -> Self {
        Self {
            id: DockId(usize::MAX),
            payload,
            anchor: Anchor::center(),
            state: DockState::Undocked,
            capabilities,
            width,
            height,
            group: None,
        }
    }

    pub fn id(&self) -> DockId {
        self.id
    }

    pub fn anchor(&self) -> Anchor {
        self.anchor
    }

    pub fn state(&self) -> DockState {
        self.state
    }

    pub fn capabilities(&self) -> DockCapabilities {
        self.capabilities
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn group(&self) -> Option<NodeId> {
        self.group
    }

    pub fn is_docked(&self) -> bool {
        self.state != DockState::Undocked
    }
}
