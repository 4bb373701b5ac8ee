//! A docking workspace layout engine: a typed tree of panel segments plus
//! the docking operations that rewrite it, normalized back into canonical
//! shape after every mutation. Geometry, rendering, the concrete dock
//! payload type and floating-window presentation are all external
//! collaborators — see [`layout::LayoutEngine`] and [`dock::Dock`]'s
//! generic `P`.

mod allocator;
pub mod consolidate;
pub mod dock;
pub mod docker;
pub mod dump;
pub mod error;
pub mod layout;
pub mod segment;
pub mod tree;

pub use dock::{Anchor, Dock, DockCapabilities, DockId, DockState, Position};
pub use docker::{Docker, LayoutChangedReason};
pub use error::{DockerError, DockerResult};
pub use layout::{Flow, FlowDirection, LayoutEngine};
pub use segment::{Edge, Orientation, Segment};
pub use tree::{NodeId, Tree};
