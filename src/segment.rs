//! Segment variants: the closed sum type every tree node holds (§3, §4.1).
//!
//! Downcasting is pervasive by design (spec §9 "Variant-typed tree") — the
//! rest of the crate pattern-matches on `Segment` rather than reaching for
//! dynamic dispatch, mirroring how `nglayoutng::layout_tree::LayoutNodeKind`
//! is matched on throughout the teacher's layout algorithms.

use std::sync::atomic::{AtomicU64, Ordering};

use smallvec::SmallVec;

use crate::dock::DockId;
use crate::error::{DockerError, DockerResult};

/// How a segment's children (or a dock group's docks) are arranged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Horizontal,
    Vertical,
    /// Fewer than two non-empty descendants; no arrangement is forced yet.
    Undetermined,
}

/// One of the four fixed workspace edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edge {
    Left,
    Right,
    Top,
    Bottom,
}

impl Edge {
    /// left/right edges stack their contents vertically (top-to-bottom);
    /// top/bottom edges stack horizontally.
    pub fn orientation(self) -> Orientation {
        match self {
            Edge::Left | Edge::Right => Orientation::Vertical,
            Edge::Top | Edge::Bottom => Orientation::Horizontal,
        }
    }

    pub const ALL: [Edge; 4] = [Edge::Left, Edge::Right, Edge::Top, Edge::Bottom];

    /// Slot into a 4-element table keyed by edge, used by the docker's edge
    /// table (§4.3 "Docker maintains a table from edge to node").
    pub fn index(self) -> usize {
        match self {
            Edge::Left => 0,
            Edge::Right => 1,
            Edge::Top => 2,
            Edge::Bottom => 3,
        }
    }
}

/// A small, process-wide monotonically increasing id, used only for debug
/// output (§6 "Debug output" — the exact text is not a stable contract).
fn next_debug_id() -> u64 {
    static COUNTER: AtomicU64 = AtomicU64::new(1);
    COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// Fields shared by every segment variant (§4.1).
#[derive(Debug, Clone, Copy)]
pub struct SegmentCommon {
    orientation: Orientation,
    stretch_to_fill: bool,
    debug_id: u64,
}

impl SegmentCommon {
    fn new(orientation: Orientation, stretch_to_fill: bool) -> Self {
        Self { orientation, stretch_to_fill, debug_id: next_debug_id() }
    }
}

type DockList = SmallVec<[DockId; 4]>;

/// The closed set of segment variants (§3).
#[derive(Debug)]
pub enum Segment {
    /// The unique central content region. Always a leaf, orientation is
    /// fixed horizontal, `stretch_to_fill` is always true.
    Center { common: SegmentCommon, docks: DockList },
    /// Container for one workspace edge. Never a leaf on its own (it always
    /// has at least a tray child); orientation is fixed at construction.
    Edge { common: SegmentCommon, edge: Edge },
    /// Leaf at one edge holding minimized docks. Orientation is fixed at
    /// construction, orthogonal to the edge.
    Tray { common: SegmentCommon, edge: Edge, docks: DockList },
    /// Purely structural internal node with two children.
    Layout { common: SegmentCommon },
    /// Leaf holding an ordered, orientation-consistent list of docks.
    DockGroup { common: SegmentCommon, docks: DockList },
}

impl Segment {
    pub fn new_center() -> Self {
        Segment::Center { common: SegmentCommon::new(Orientation::Horizontal, true), docks: DockList::new() }
    }

    pub fn new_edge(edge: Edge) -> Self {
        Segment::Edge { common: SegmentCommon::new(edge.orientation(), true), edge }
    }

    /// `TrayGroup` construction with a non-edge position fails with
    /// *invalid-edge* in the design's vocabulary; here that's simply not
    /// representable since `edge: Edge` excludes `center`/`with`.
    pub fn new_tray(edge: Edge) -> Self {
        let orientation = match edge {
            Edge::Left | Edge::Right => Orientation::Vertical,
            Edge::Top | Edge::Bottom => Orientation::Horizontal,
        };
        Segment::Tray { common: SegmentCommon::new(orientation, true), edge, docks: DockList::new() }
    }

    pub fn new_layout() -> Self {
        Segment::Layout { common: SegmentCommon::new(Orientation::Undetermined, true) }
    }

    pub fn new_dock_group() -> Self {
        Segment::DockGroup { common: SegmentCommon::new(Orientation::Undetermined, true), docks: DockList::new() }
    }

    fn common(&self) -> &SegmentCommon {
        match self {
            Segment::Center { common, .. }
            | Segment::Edge { common, .. }
            | Segment::Tray { common, .. }
            | Segment::Layout { common }
            | Segment::DockGroup { common, .. } => common,
        }
    }

    fn common_mut(&mut self) -> &mut SegmentCommon {
        match self {
            Segment::Center { common, .. }
            | Segment::Edge { common, .. }
            | Segment::Tray { common, .. }
            | Segment::Layout { common }
            | Segment::DockGroup { common, .. } => common,
        }
    }

    pub fn orientation(&self) -> Orientation {
        self.common().orientation
    }

    /// `EdgeGroup`/`TrayGroup` orientation is fixed at creation (*immutable-orientation*).
    pub fn set_orientation(&mut self, orientation: Orientation) -> DockerResult<()> {
        match self {
            Segment::Edge { .. } => {
                Err(DockerError::FixedProperty { property: "EdgeGroup.orientation" })
            }
            Segment::Tray { .. } => {
                Err(DockerError::FixedProperty { property: "TrayGroup.orientation" })
            }
            other => {
                other.common_mut().orientation = orientation;
                Ok(())
            }
        }
    }

    pub fn stretch_to_fill(&self) -> bool {
        self.common().stretch_to_fill
    }

    /// `CenterGroup.stretch_to_fill` is always true (*fixed-property*).
    pub fn set_stretch_to_fill(&mut self, value: bool) -> DockerResult<()> {
        match self {
            Segment::Center { .. } if !value => {
                Err(DockerError::FixedProperty { property: "CenterGroup.stretch_to_fill" })
            }
            other => {
                other.common_mut().stretch_to_fill = value;
                Ok(())
            }
        }
    }

    pub fn debug_id(&self) -> u64 {
        self.common().debug_id
    }

    pub fn is_leaf_variant(&self) -> bool {
        matches!(self, Segment::Center { .. } | Segment::Tray { .. } | Segment::DockGroup { .. })
    }

    pub fn is_center(&self) -> bool {
        matches!(self, Segment::Center { .. })
    }

    pub fn is_edge(&self) -> bool {
        matches!(self, Segment::Edge { .. })
    }

    pub fn is_tray(&self) -> bool {
        matches!(self, Segment::Tray { .. })
    }

    pub fn is_dock_group(&self) -> bool {
        matches!(self, Segment::DockGroup { .. })
    }

    pub fn docks(&self) -> &[DockId] {
        match self {
            Segment::Center { docks, .. } | Segment::Tray { docks, .. } | Segment::DockGroup { docks, .. } => docks,
            Segment::Edge { .. } | Segment::Layout { .. } => &[],
        }
    }

    pub fn docks_mut(&mut self) -> Option<&mut DockList> {
        match self {
            Segment::Center { docks, .. } | Segment::Tray { docks, .. } | Segment::DockGroup { docks, .. } => Some(docks),
            Segment::Edge { .. } | Segment::Layout { .. } => None,
        }
    }

    pub fn edge(&self) -> Option<Edge> {
        match self {
            Segment::Edge { edge, .. } | Segment::Tray { edge, .. } => Some(*edge),
            _ => None,
        }
    }

    pub fn variant_name(&self) -> &'static str {
        match self {
            Segment::Center { .. } => "CenterGroup",
            Segment::Edge { .. } => "EdgeGroup",
            Segment::Tray { .. } => "TrayGroup",
            Segment::Layout { .. } => "LayoutGroup",
            Segment::DockGroup { .. } => "LayoutDockGroup",
        }
    }

    /// Promote a `LayoutDockGroup` segment (now empty of docks, its docks
    /// having been migrated elsewhere) to a `LayoutGroup`, preserving
    /// orientation. Used by `Tree::promote_to_internal` (§4.2.1).
    pub fn promote_to_layout(&mut self) -> DockerResult<()> {
        if self.is_center() {
            return Err(DockerError::CenterMustBeLeaf);
        }
        let orientation = self.orientation();
        let debug_id = self.debug_id();
        *self = Segment::Layout { common: SegmentCommon { orientation, stretch_to_fill: true, debug_id } };
        Ok(())
    }

    /// Demote a `LayoutGroup` segment to a `LayoutDockGroup` holding the
    /// given docks, used when `assimilate_child` migrates a leaf dock
    /// group's contents up into its parent (§4.2 `assimilate_child`).
    pub fn demote_to_dock_group(&mut self, docks: DockList) {
        let orientation = self.orientation();
        let debug_id = self.debug_id();
        *self = Segment::DockGroup {
            common: SegmentCommon { orientation, stretch_to_fill: true, debug_id },
            docks,
        };
    }
}
