//! The public façade: high-level docking operations translated into tree
//! rewrites, plus observer notification (§4.3, §5).
//!
//! `Docker<P>` is the crate's entry point. Every mutating method validates
//! its preconditions, performs the rewrite, runs the consolidator from the
//! node it touched, and notifies observers — mirroring the
//! validate/mutate/normalize/notify shape of `nglayoutng`'s layout-tree
//! builder passes.

use log::{debug, trace, warn};

use crate::consolidate::{self, EdgeTable};
use crate::dock::{Anchor, Dock, DockCapabilities, DockId, DockState, Position};
use crate::error::{DockerError, DockerResult};
use crate::segment::{Edge, Orientation, Segment};
use crate::tree::{NodeId, Tree};

/// Why `Docker::on_layout_changed` listeners were invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutChangedReason {
    Docking,
    Floating,
    Resize,
}

/// Owns the tree and the bookkeeping a docking workspace needs on top of
/// it: the edge table, the non-reentrancy guard around consolidation, and
/// layout-change observers.
pub struct Docker<P> {
    tree: Tree<P>,
    edges: EdgeTable,
    consolidating: bool,
    listeners: Vec<Box<dyn FnMut(LayoutChangedReason)>>,
}

impl<P> Docker<P> {
    pub fn new() -> Self {
        Self { tree: Tree::new(), edges: [None; 4], consolidating: false, listeners: Vec::new() }
    }

    pub fn tree(&self) -> &Tree<P> {
        &self.tree
    }

    pub fn on_layout_changed(&mut self, listener: impl FnMut(LayoutChangedReason) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    fn notify(&mut self, reason: LayoutChangedReason) {
        if reason == LayoutChangedReason::Docking {
            self.refresh_stretch_to_fill();
        }
        trace!("layout changed: {:?}", reason);
        for listener in &mut self.listeners {
            listener(reason);
        }
    }

    /// §4.3 "Stretch-to-fill refresh": after any `Docking`-reason change,
    /// walk the chain of ancestors from the center node's parent upward to
    /// the root, setting each segment's `stretch_to_fill` back to true.
    fn refresh_stretch_to_fill(&mut self) {
        let mut node = self.tree.parent(self.tree.center());
        while let Some(n) = node {
            self.tree.segment_mut(n).set_stretch_to_fill(true).expect("stretch_to_fill=true never fails");
            node = self.tree.parent(n);
        }
    }

    fn consolidate_from(&mut self, node: NodeId) {
        if self.consolidating {
            warn!("consolidate_from called re-entrantly, ignoring");
            return;
        }
        self.consolidating = true;
        consolidate::run(&mut self.tree, &mut self.edges, node);
        self.consolidating = false;
    }

    // -- §4.3 dock ------------------------------------------------------------

    pub fn dock(
        &mut self,
        payload: P,
        anchor: Anchor,
        capabilities: DockCapabilities,
        width: f32,
        height: f32,
    ) -> DockerResult<DockId> {
        Self::validate_anchor(anchor)?;

        let mut dock = Dock::new(payload, capabilities, width, height);
        dock.anchor = anchor;
        dock.state = DockState::Pinned;
        let dock_id = self.tree.insert_dock(dock);

        if let Err(e) = self.place_by_anchor(dock_id, anchor) {
            self.tree.take_dock(dock_id);
            return Err(e);
        }

        debug!("docked {:?} at {:?}", dock_id, anchor.position);
        self.notify(LayoutChangedReason::Docking);
        Ok(dock_id)
    }

    /// Re-anchors an already-docked dock to a new position. Per §4.3's
    /// `dock` contract ("if the dock is currently docked, undock it
    /// first"), this is the re-docking path for a `DockId` that already
    /// exists, as opposed to `dock`, which always creates a fresh one.
    pub fn redock(&mut self, dock_id: DockId, anchor: Anchor) -> DockerResult<()> {
        Self::validate_anchor(anchor)?;

        if self.tree.dock(dock_id).is_docked() {
            self.undock(dock_id);
        }

        self.tree.dock_mut(dock_id).anchor = anchor;
        self.tree.dock_mut(dock_id).state = DockState::Pinned;
        if let Err(e) = self.place_by_anchor(dock_id, anchor) {
            self.tree.dock_mut(dock_id).state = DockState::Undocked;
            return Err(e);
        }

        debug!("redocked {:?} at {:?}", dock_id, anchor.position);
        self.notify(LayoutChangedReason::Docking);
        Ok(())
    }

    /// Removes `dock_id` from whatever tray or group currently holds it,
    /// without disposing it. Does not notify on its own (§5 "Undock does
    /// not emit on its own; it relies on the caller").
    fn undock(&mut self, dock_id: DockId) {
        if let Some(group) = self.tree.dock(dock_id).group() {
            self.tree.remove_dock_from_group(group, dock_id).expect("a docked dock is always listed in its own group");
            self.tree.dock_mut(dock_id).state = DockState::Undocked;
            self.consolidate_from(group);
        }
    }

    fn validate_anchor(anchor: Anchor) -> DockerResult<()> {
        match anchor.position {
            Position::Center if anchor.relative_to.is_some() => {
                Err(DockerError::InvalidAnchor { reason: "center anchors cannot carry a relative_to dock" })
            }
            Position::With if anchor.relative_to.is_none() => {
                Err(DockerError::InvalidAnchor { reason: "with anchors require a relative_to dock" })
            }
            _ => Ok(()),
        }
    }

    fn place_by_anchor(&mut self, dock_id: DockId, anchor: Anchor) -> DockerResult<()> {
        match (anchor.position, anchor.relative_to) {
            (Position::Center, _) => {
                self.tree.append_dock(self.tree.center(), dock_id);
                self.consolidate_from(self.tree.center());
            }
            (Position::With, Some(target)) => {
                let group = self.tree.dock(target).group().ok_or(DockerError::NotInGroup)?;
                self.tree.append_dock(group, dock_id);
                self.consolidate_from(group);
            }
            (Position::With, None) => return Err(DockerError::InvalidRootWith),
            (pos, Some(target)) if pos.is_edge() => self.dock_relative_to_existing(dock_id, pos, target)?,
            (pos, None) if pos.is_edge() => {
                let edge = pos.as_edge().expect("edge position always maps to an Edge");
                self.dock_to_edge(dock_id, edge);
            }
            _ => unreachable!("Position has no other combinations"),
        }
        Ok(())
    }

    fn dock_relative_to_existing(&mut self, dock_id: DockId, position: Position, target: DockId) -> DockerResult<()> {
        let group = self.tree.dock(target).group().ok_or(DockerError::NotInGroup)?;
        if !self.tree.segment(group).is_dock_group() {
            return Err(DockerError::InvalidAnchor {
                reason: "relative_to's owner is not a LayoutDockGroup",
            });
        }
        let required = position.required_orientation().expect("edge positions always require an orientation");
        let group_orientation = self.tree.segment(group).orientation();

        let host = if group_orientation != Orientation::Undetermined && group_orientation != required {
            self.tree.repartition(group, target, required)?
        } else {
            group
        };

        self.tree.anchored_insert(host, dock_id, position, target)?;
        self.consolidate_from(host);
        Ok(())
    }

    fn dock_to_edge(&mut self, dock_id: DockId, edge: Edge) {
        let edge_node = self.ensure_edge_node(edge);
        match self.edge_content_child(edge_node) {
            None => {
                let group = self.tree.new_leaf_dock_group(dock_id, Orientation::Undetermined);
                // left/top read before their content in traversal order, so
                // their tray (placed first, see ensure_edge_node) must stay
                // in the leading slot; right/bottom read after their content.
                let result = if matches!(edge, Edge::Left | Edge::Top) {
                    self.tree.add_child_right(edge_node, group, edge.orientation())
                } else {
                    self.tree.add_child_left(edge_node, group, edge.orientation())
                };
                result.expect("a freshly created EdgeGroup always has a free slot");
            }
            Some(content) => {
                let target_group = self.first_dock_group_under(content);
                self.tree.append_dock(target_group, dock_id);
            }
        }
        self.consolidate_from(edge_node);
    }

    /// The non-tray child of an `EdgeGroup`, if the edge currently holds any
    /// docked content.
    fn edge_content_child(&self, edge_node: NodeId) -> Option<NodeId> {
        match (self.tree.left(edge_node), self.tree.right(edge_node)) {
            (Some(c), _) if !self.tree.segment(c).is_tray() => Some(c),
            (_, Some(c)) if !self.tree.segment(c).is_tray() => Some(c),
            _ => None,
        }
    }

    fn first_dock_group_under(&self, node: NodeId) -> NodeId {
        if self.tree.segment(node).is_dock_group() {
            return node;
        }
        match self.tree.left(node) {
            Some(l) => self.first_dock_group_under(l),
            None => self.first_dock_group_under(self.tree.right(node).expect("internal node always has a child")),
        }
    }

    /// Creates the `EdgeGroup`+`TrayGroup` pair for `edge` the first time
    /// anything docks or minimizes there, and wires it into the workspace
    /// at the conventional slot: left/right flank the column that carries
    /// center (and, within that column, top/bottom flank center itself).
    fn ensure_edge_node(&mut self, edge: Edge) -> NodeId {
        if let Some(existing) = self.edges[edge.index()] {
            return existing;
        }

        let tray = self.tree.new_detached(Segment::new_tray(edge));
        let edge_node = self.tree.new_detached(Segment::new_edge(edge));
        self.tree.add_child_left(edge_node, tray, edge.orientation()).expect("fresh edge node accepts its tray");

        let center = self.tree.center();
        let result = match edge {
            Edge::Left => {
                let sibling = self.vertical_column();
                let parent = self.tree.parent(sibling).expect("the vertical column always has a parent");
                self.tree.add_child_before(parent, edge_node, sibling, Orientation::Horizontal)
            }
            Edge::Right => {
                let sibling = self.vertical_column();
                let parent = self.tree.parent(sibling).expect("the vertical column always has a parent");
                self.tree.add_child_after(parent, edge_node, sibling, Orientation::Horizontal)
            }
            Edge::Top => {
                let parent = self.tree.parent(center).expect("center always has a parent");
                self.tree.add_child_before(parent, edge_node, center, Orientation::Vertical)
            }
            Edge::Bottom => {
                let parent = self.tree.parent(center).expect("center always has a parent");
                self.tree.add_child_after(parent, edge_node, center, Orientation::Vertical)
            }
        };
        result.expect("inserting a fresh edge against its conventional sibling cannot fail");

        self.edges[edge.index()] = Some(edge_node);
        edge_node
    }

    /// The node directly under root that is center's ancestor-or-self.
    /// Left/right edges attach beside this node; it is computed fresh each
    /// time rather than cached, since consolidation can fold away whatever
    /// wrapper used to sit between root and center.
    fn vertical_column(&self) -> NodeId {
        let root = self.tree.root();
        let mut n = self.tree.center();
        while self.tree.parent(n) != Some(root) {
            n = self.tree.parent(n).expect("center's ancestor chain reaches root");
        }
        n
    }

    // -- §4.3 minimize / pin --------------------------------------------------

    pub fn minimize(&mut self, dock_id: DockId) -> DockerResult<()> {
        let dock = self.tree.dock(dock_id);
        if !dock.capabilities().contains(DockCapabilities::MINIMIZABLE) {
            return Err(DockerError::CannotMinimize);
        }
        if dock.state() != DockState::Pinned {
            return Err(DockerError::CannotMinimize);
        }
        let group = dock.group().ok_or(DockerError::NotInGroup)?;
        let position = dock.anchor().position;

        let edge_node = self
            .tree
            .ancestors(group)
            .into_iter()
            .find(|&n| self.tree.segment(n).is_edge())
            .ok_or(DockerError::NoTrayOnPath { position })?;
        let edge = self.tree.segment(edge_node).edge().expect("EdgeGroup always carries an edge");
        let tray = self.tray_of(edge_node, edge);

        self.tree.remove_dock_from_group(group, dock_id)?;
        self.tree.append_dock(tray, dock_id);
        self.tree.dock_mut(dock_id).state = DockState::Minimized;

        self.consolidate_from(group);
        self.notify(LayoutChangedReason::Docking);
        Ok(())
    }

    fn tray_of(&self, edge_node: NodeId, edge: Edge) -> NodeId {
        match (self.tree.left(edge_node), self.tree.right(edge_node)) {
            (Some(c), _) if self.tree.segment(c).is_tray() => c,
            (_, Some(c)) if self.tree.segment(c).is_tray() => c,
            _ => self.tree.nearest_tray_on_path(edge_node, edge).expect("every EdgeGroup carries a tray"),
        }
    }

    pub fn pin(&mut self, dock_id: DockId) -> DockerResult<()> {
        let state = self.tree.dock(dock_id).state();
        if !matches!(state, DockState::Minimized | DockState::Floating) {
            return Err(DockerError::InvalidPinSource);
        }
        let tray = self.tree.dock(dock_id).group().ok_or(DockerError::NotInGroup)?;
        self.tree.remove_dock_from_group(tray, dock_id)?;

        let anchor = self.tree.dock(dock_id).anchor();
        self.place_by_anchor(dock_id, anchor)?;
        self.tree.dock_mut(dock_id).state = DockState::Pinned;

        self.consolidate_from(tray);
        self.notify(LayoutChangedReason::Docking);
        Ok(())
    }

    // -- §4.3 float -------------------------------------------------------------

    pub fn float(&mut self, dock_id: DockId) -> DockerResult<()> {
        if self.tree.dock(dock_id).state() != DockState::Minimized {
            return Err(DockerError::InvalidFloatSource);
        }
        self.tree.dock_mut(dock_id).state = DockState::Floating;
        self.notify(LayoutChangedReason::Floating);
        Ok(())
    }

    // -- §4.3 close -------------------------------------------------------------

    pub fn close(&mut self, dock_id: DockId) -> DockerResult<()> {
        let dock = self.tree.dock(dock_id);
        if !dock.capabilities().contains(DockCapabilities::CLOSEABLE) {
            return Err(DockerError::CannotClose);
        }

        self.undock(dock_id);
        self.tree.take_dock(dock_id);

        self.notify(LayoutChangedReason::Docking);
        Ok(())
    }

    // -- §4.3 resize --------------------------------------------------------------

    /// Updates a dock's stored dimensions. Applies even to a minimized
    /// dock, so the size it's restored to on the next `pin` reflects the
    /// latest resize rather than whatever it had when it was minimized.
    /// A resize to the dock's current dimensions is a no-op and does not
    /// notify listeners.
    pub fn resize(&mut self, dock_id: DockId, width: f32, height: f32) -> DockerResult<()> {
        let dock = self.tree.dock_mut(dock_id);
        if dock.width == width && dock.height == height {
            return Ok(());
        }
        dock.width = width;
        dock.height = height;
        self.notify(LayoutChangedReason::Resize);
        Ok(())
    }

    // -- §4.3 dock_with -----------------------------------------------------------

    /// Moves `a` into whatever group `b` currently occupies, as an
    /// additional tab. Merging onto the `CenterGroup` is rejected: the
    /// center is the one segment every tree carries regardless of docking
    /// state, and letting arbitrary docks re-anchor there via `with` would
    /// blur that distinction.
    pub fn dock_with(&mut self, a: DockId, b: DockId) -> DockerResult<()> {
        if a == b {
            return Err(DockerError::CannotMerge { reason: "a dock cannot merge with itself" });
        }
        let target_group = self.tree.dock(b).group().ok_or(DockerError::NotInGroup)?;
        if self.tree.segment(target_group).is_center() {
            return Err(DockerError::CannotMerge { reason: "cannot merge onto the center group" });
        }

        let source_group = self.tree.dock(a).group();
        if let Some(g) = source_group {
            self.tree.remove_dock_from_group(g, a)?;
        }
        self.tree.append_dock(target_group, a);
        self.tree.dock_mut(a).anchor = Anchor::with(b);
        self.tree.dock_mut(a).state = DockState::Pinned;

        if let Some(g) = source_group {
            self.consolidate_from(g);
        }
        self.consolidate_from(target_group);
        self.notify(LayoutChangedReason::Docking);
        Ok(())
    }

    pub fn dump(&self) -> String {
        crate::dump::dump_tree(&self.tree)
    }
}

impl<P> Default for Docker<P> {
    fn default() -> Self {
        Self::new()
    }
}
