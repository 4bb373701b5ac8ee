//! The typed binary tree of layout segments (§4.2).
//!
//! Nodes live in an arena (`allocator::Allocator`); a node's two children are
//! owned slots (`left`/`right`), while the `parent` back-reference is a
//! plain, non-owning index maintained by the child-slot setters — the arena
//! mapping described in spec §9 "Parent back-references as non-owning".

use smallvec::SmallVec;

use crate::allocator::Allocator;
use crate::dock::{Dock, DockId};
use crate::error::{DockerError, DockerResult};
use crate::segment::{Edge, Orientation, Segment};

/// A handle into a [`Tree`]'s node arena. Stable for as long as the node it
/// names has not been removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

#[derive(Debug)]
struct Node {
    segment: Segment,
    parent: Option<NodeId>,
    left: Option<NodeId>,
    right: Option<NodeId>,
}

/// The docker's tree plus the dock storage it references.
///
/// Docks live in their own arena rather than being owned by the segment
/// that lists them, because a dock's `DockId` must stay stable while it
/// moves between groups (dock → edge → tray and back) over its lifetime.
#[derive(Debug)]
pub struct Tree<P> {
    nodes: Allocator<Node>,
    docks: Allocator<Dock<P>>,
    root: NodeId,
    center: NodeId,
}

impl<P> Tree<P> {
    pub fn new() -> Self {
        let mut nodes = Allocator::default();
        let root = NodeId(nodes.allocate(Node {
            segment: Segment::new_layout(),
            parent: None,
            left: None,
            right: None,
        }));
        let center = NodeId(nodes.allocate(Node {
            segment: Segment::new_center(),
            parent: Some(root),
            left: None,
            right: None,
        }));
        nodes[root.0].left = Some(center);

        Self { nodes, docks: Allocator::default(), root, center }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn center(&self) -> NodeId {
        self.center
    }

    pub fn segment(&self, id: NodeId) -> &Segment {
        &self.nodes[id.0].segment
    }

    pub fn segment_mut(&mut self, id: NodeId) -> &mut Segment {
        &mut self.nodes[id.0].segment
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn left(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].left
    }

    pub fn right(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].right
    }

    pub fn is_leaf(&self, id: NodeId) -> bool {
        self.left(id).is_none() && self.right(id).is_none()
    }

    /// The side `child` occupies under `parent`, if any.
    fn side_of(&self, parent: NodeId, child: NodeId) -> Option<bool /* is_left */> {
        if self.nodes[parent.0].left == Some(child) {
            Some(true)
        } else if self.nodes[parent.0].right == Some(child) {
            Some(false)
        } else {
            None
        }
    }

    // -- dock storage -----------------------------------------------------

    pub fn dock(&self, id: DockId) -> &Dock<P> {
        &self.docks[id.0]
    }

    pub fn dock_mut(&mut self, id: DockId) -> &mut Dock<P> {
        &mut self.docks[id.0]
    }

    pub fn insert_dock(&mut self, dock: Dock<P>) -> DockId {
        let slot = self.docks.allocate(dock);
        let id = DockId(slot);
        self.docks[slot].id = id;
        id
    }

    /// Removes and returns a dock from storage. The caller must have
    /// already detached it from whatever group listed it.
    pub fn take_dock(&mut self, id: DockId) -> Dock<P> {
        self.docks.deallocate(id.0)
    }

    fn reparent_docks(&mut self, group: NodeId, docks: &[DockId]) {
        for &d in docks {
            self.docks[d.0].group = Some(group);
        }
    }

    // -- raw child-slot primitives -----------------------------------------

    /// Sets `parent`'s slot to `child`, atomically clearing the previous
    /// occupant's parent link (if different) and setting the new
    /// occupant's parent link (spec §3 "Tree node").
    fn place(&mut self, parent: NodeId, is_left: bool, child: Option<NodeId>) {
        let old = if is_left { self.nodes[parent.0].left } else { self.nodes[parent.0].right };
        if old != child {
            if let Some(old) = old {
                self.nodes[old.0].parent = None;
            }
        }
        if is_left {
            self.nodes[parent.0].left = child;
        } else {
            self.nodes[parent.0].right = child;
        }
        if let Some(c) = child {
            self.nodes[c.0].parent = Some(parent);
        }
    }

    /// Detaches and returns whatever occupies `parent`'s slot, clearing
    /// both sides of the link.
    fn take_slot(&mut self, parent: NodeId, is_left: bool) -> Option<NodeId> {
        let slot = if is_left { &mut self.nodes[parent.0].left } else { &mut self.nodes[parent.0].right };
        let child = slot.take();
        if let Some(c) = child {
            self.nodes[c.0].parent = None;
        }
        child
    }

    fn swap_children(&mut self, node: NodeId) {
        let n = &mut self.nodes[node.0];
        std::mem::swap(&mut n.left, &mut n.right);
    }

    fn alloc_node(&mut self, segment: Segment) -> NodeId {
        NodeId(self.nodes.allocate(Node { segment, parent: None, left: None, right: None }))
    }

    /// Allocates a standalone node not yet attached anywhere in the tree.
    /// Callers attach it with `add_child_*` before it becomes reachable.
    pub fn new_detached(&mut self, segment: Segment) -> NodeId {
        self.alloc_node(segment)
    }

    fn free_node(&mut self, id: NodeId) {
        self.nodes.deallocate(id.0);
    }

    /// Bypasses the variant-immutability checks in
    /// [`Segment::set_orientation`]; used only by the consolidator and by
    /// structural rewrites that have already established the node cannot
    /// be an `EdgeGroup`/`TrayGroup`.
    fn force_orientation(&mut self, id: NodeId, orientation: Orientation) {
        let segment = &mut self.nodes[id.0].segment;
        debug_assert!(!segment.is_edge(), "EdgeGroup orientation must never be forced");
        let _ = segment.set_orientation(orientation);
    }

    // -- §4.2.1 internal-node promotion -------------------------------------

    /// Promotes `node` so it can hold children: a leaf-only segment
    /// (`LayoutDockGroup`/`TrayGroup`) is moved into a fresh left child and
    /// `node`'s own segment becomes a `LayoutGroup`. `CenterGroup` can never
    /// be promoted.
    fn ensure_internal(&mut self, node: NodeId) -> DockerResult<()> {
        if self.nodes[node.0].segment.is_center() {
            return Err(DockerError::CenterMustBeLeaf);
        }
        if !self.nodes[node.0].segment.is_leaf_variant() {
            // Already internal-capable (LayoutGroup or EdgeGroup).
            return Ok(());
        }
        let moved_segment = std::mem::replace(&mut self.nodes[node.0].segment, Segment::new_layout());
        let left = self.alloc_node(moved_segment);
        self.place(node, true, Some(left));
        Ok(())
    }

    // -- §4.2 add_child_left / add_child_right ------------------------------

    pub fn add_child_left(&mut self, node: NodeId, child: NodeId, orientation: Orientation) -> DockerResult<()> {
        self.ensure_internal(node)?;
        match (self.left(node), self.right(node)) {
            (None, _) => {
                self.place(node, true, Some(child));
            }
            (Some(_), None) => {
                self.place(node, false, Some(child));
                self.swap_children(node);
            }
            (Some(existing_left), Some(_)) => {
                return self.add_child_left(existing_left, child, orientation);
            }
        }
        self.maybe_set_two_child_orientation(node, orientation);
        Ok(())
    }

    pub fn add_child_right(&mut self, node: NodeId, child: NodeId, orientation: Orientation) -> DockerResult<()> {
        self.ensure_internal(node)?;
        match (self.left(node), self.right(node)) {
            (_, None) => {
                self.place(node, false, Some(child));
            }
            (None, Some(_)) => {
                self.place(node, true, Some(child));
                self.swap_children(node);
            }
            (Some(_), Some(existing_right)) => {
                return self.add_child_right(existing_right, child, orientation);
            }
        }
        self.maybe_set_two_child_orientation(node, orientation);
        Ok(())
    }

    fn maybe_set_two_child_orientation(&mut self, node: NodeId, orientation: Orientation) {
        if self.left(node).is_some() && self.right(node).is_some() && !self.nodes[node.0].segment.is_edge() {
            self.force_orientation(node, orientation);
        }
    }

    // -- §4.2 add_child_before / add_child_after ----------------------------

    pub fn add_child_before(
        &mut self,
        node: NodeId,
        child: NodeId,
        sibling: NodeId,
        orientation: Orientation,
    ) -> DockerResult<()> {
        self.add_child_relative(node, child, sibling, orientation, true)
    }

    pub fn add_child_after(
        &mut self,
        node: NodeId,
        child: NodeId,
        sibling: NodeId,
        orientation: Orientation,
    ) -> DockerResult<()> {
        self.add_child_relative(node, child, sibling, orientation, false)
    }

    fn add_child_relative(
        &mut self,
        node: NodeId,
        child: NodeId,
        sibling: NodeId,
        orientation: Orientation,
        before: bool,
    ) -> DockerResult<()> {
        let sibling_is_left = match self.side_of(node, sibling) {
            Some(side) => side,
            None => return Err(DockerError::InvalidSibling { sibling }),
        };
        self.ensure_internal(node)?;

        let other_side_free = if sibling_is_left { self.right(node).is_none() } else { self.left(node).is_none() };

        if other_side_free {
            // swap_needed iff inserting before a left sibling, or after a right sibling.
            let swap_needed = (sibling_is_left && before) || (!sibling_is_left && !before);
            let free_is_left = !sibling_is_left;
            self.place(node, free_is_left, Some(child));
            if swap_needed {
                self.swap_children(node);
            }
            // node gained a real second child just now; this is the only
            // branch where node's own orientation is what the caller asked for.
            self.maybe_set_two_child_orientation(node, orientation);
        } else {
            // Both slots occupied: grow a fresh two-node subtree replacing
            // sibling's slot. node already had two children and keeps
            // whatever orientation it already carried; only the fresh
            // subtree takes on the caller's orientation.
            let detached_sibling = self.take_slot(node, sibling_is_left);
            debug_assert_eq!(detached_sibling, Some(sibling));
            let new_group = self.alloc_node(Segment::new_layout());
            if before {
                self.place(new_group, true, Some(child));
                self.place(new_group, false, Some(sibling));
            } else {
                self.place(new_group, true, Some(sibling));
                self.place(new_group, false, Some(child));
            }
            self.force_orientation(new_group, orientation);
            self.place(node, sibling_is_left, Some(new_group));
        }
        Ok(())
    }

    // -- §4.2 remove_child ---------------------------------------------------

    pub fn remove_child(&mut self, node: NodeId, child: NodeId) -> DockerResult<()> {
        if self.nodes[child.0].segment.is_center() {
            return Err(DockerError::CenterNotRemovable);
        }
        let is_left = match self.side_of(node, child) {
            Some(side) => side,
            None => return Err(DockerError::NotAChild { parent: node, child }),
        };
        self.place(node, is_left, None);
        if !self.nodes[node.0].segment.is_edge() {
            self.force_orientation(node, Orientation::Undetermined);
        }
        Ok(())
    }

    // -- §4.2 assimilate_child -------------------------------------------------

    pub fn assimilate_child(&mut self, node: NodeId, child: NodeId) -> DockerResult<()> {
        let is_left = match self.side_of(node, child) {
            Some(side) => side,
            None => return Err(DockerError::InvalidAssimilation { node: child }),
        };
        let other_side_occupied = if is_left { self.right(node).is_some() } else { self.left(node).is_some() };
        if other_side_occupied {
            return Err(DockerError::InvalidAssimilation { node: child });
        }
        if self.is_root_variant(child) {
            return Err(DockerError::InvalidAssimilation { node: child });
        }

        let child_orientation = self.nodes[child.0].segment.orientation();

        if self.nodes[child.0].segment.is_dock_group() {
            let docks: SmallVec<[DockId; 4]> = self.nodes[child.0].segment.docks().into();
            self.place(node, is_left, None);
            self.nodes[node.0].segment.demote_to_dock_group(docks.clone());
            self.reparent_docks(node, &docks);
            self.free_node(child);
        } else {
            let (cl, cr) = (self.left(child), self.right(child));
            self.place(node, is_left, None);
            self.nodes[child.0].left = None;
            self.nodes[child.0].right = None;
            self.place(node, true, cl);
            self.place(node, false, cr);
            self.free_node(child);
        }

        if child_orientation != Orientation::Undetermined {
            self.force_orientation(node, child_orientation);
        }
        Ok(())
    }

    fn is_root_variant(&self, node: NodeId) -> bool {
        let segment = &self.nodes[node.0].segment;
        segment.is_center() || segment.is_edge() || segment.is_tray()
    }

    // -- §4.2 merge_leaf_parts -------------------------------------------------

    pub fn merge_leaf_parts(&mut self, node: NodeId) -> DockerResult<()> {
        let (l, r) = match (self.left(node), self.right(node)) {
            (Some(l), Some(r)) => (l, r),
            _ => return Err(DockerError::MergeInvalid { reason: "both children must be present" }),
        };
        if !self.is_leaf(l) || !self.is_leaf(r) {
            return Err(DockerError::MergeInvalid { reason: "both children must be leaves" });
        }
        if self.nodes[l.0].segment.is_center() || self.nodes[r.0].segment.is_center() {
            return Err(DockerError::MergeInvalid { reason: "CenterGroup cannot be merged" });
        }

        let right_docks: SmallVec<[DockId; 4]> = self.nodes[r.0].segment.docks().into();
        for &d in &right_docks {
            if let Some(list) = self.nodes[l.0].segment.docks_mut() {
                list.push(d);
            }
        }
        self.reparent_docks(l, &right_docks);

        let dock_count = self.nodes[l.0].segment.docks().len();
        let node_orientation = self.nodes[node.0].segment.orientation();
        let new_left_orientation = if dock_count > 1 { node_orientation } else { Orientation::Undetermined };
        self.force_orientation(l, new_left_orientation);

        self.place(node, false, None);
        self.free_node(r);
        Ok(())
    }

    // -- §4.2 repartition ------------------------------------------------------

    /// Splits the `LayoutDockGroup` held by `node` around `relative_to` into
    /// up to three groups and restructures `node` into the `LayoutGroup`
    /// wrapping them, returning the node now holding `relative_to`.
    pub fn repartition(
        &mut self,
        node: NodeId,
        relative_to: DockId,
        required_orientation: Orientation,
    ) -> DockerResult<NodeId> {
        debug_assert!(self.nodes[node.0].segment.is_dock_group());
        let original_orientation = self.nodes[node.0].segment.orientation();
        let docks: SmallVec<[DockId; 4]> = self.nodes[node.0].segment.docks().into();
        let idx = docks.iter().position(|&d| d == relative_to).ok_or(DockerError::AnchorNotInGroup)?;
        let before: SmallVec<[DockId; 4]> = docks[..idx].into();
        let after: SmallVec<[DockId; 4]> = docks[idx + 1..].into();

        if before.is_empty() && after.is_empty() {
            // Degenerate: nothing to split around; just retarget this group.
            self.force_orientation(node, required_orientation);
            return Ok(node);
        }

        let host = self.new_dock_group_with(smallvec::smallvec![relative_to], required_orientation);

        let before_node = (!before.is_empty()).then(|| {
            let orientation = if before.len() > 1 { original_orientation } else { Orientation::Undetermined };
            self.new_dock_group_with(before.clone(), orientation)
        });
        let after_node = (!after.is_empty()).then(|| {
            let orientation = if after.len() > 1 { original_orientation } else { Orientation::Undetermined };
            self.new_dock_group_with(after.clone(), orientation)
        });

        self.nodes[node.0].segment.promote_to_layout().expect("repartition target is never CenterGroup");

        match (before_node, after_node) {
            (Some(b), Some(a)) => {
                let inner = self.alloc_node(Segment::new_layout());
                self.place(inner, true, Some(host));
                self.place(inner, false, Some(a));
                self.force_orientation(inner, original_orientation);
                self.place(node, true, Some(b));
                self.place(node, false, Some(inner));
            }
            (Some(b), None) => {
                self.place(node, true, Some(b));
                self.place(node, false, Some(host));
            }
            (None, Some(a)) => {
                self.place(node, true, Some(host));
                self.place(node, false, Some(a));
            }
            (None, None) => unreachable!("handled by the degenerate case above"),
        }

        Ok(host)
    }

    fn new_dock_group_with(&mut self, docks: SmallVec<[DockId; 4]>, orientation: Orientation) -> NodeId {
        let id = self.alloc_node(Segment::new_dock_group());
        self.reparent_docks(id, &docks);
        if let Some(list) = self.nodes[id.0].segment.docks_mut() {
            *list = docks;
        }
        self.force_orientation(id, orientation);
        id
    }

    // -- §4.6 dock-group internals --------------------------------------------

    /// Creates a fresh `LayoutDockGroup` holding just `dock`, used the first
    /// time a dock lands at an edge or as the very first relative-to anchor.
    pub fn new_leaf_dock_group(&mut self, dock: DockId, orientation: Orientation) -> NodeId {
        self.new_dock_group_with(smallvec::smallvec![dock], orientation)
    }

    /// Appends `dock` to `group`'s ordered list without anchoring (used for
    /// `center`-position docking and for tray membership).
    pub fn append_dock(&mut self, group: NodeId, dock: DockId) {
        if let Some(list) = self.nodes[group.0].segment.docks_mut() {
            list.push(dock);
        }
        self.docks[dock.0].group = Some(group);
    }

    /// `LayoutDockGroup::add_dock` (§4.6 "Anchored insertion").
    pub fn anchored_insert(
        &mut self,
        group: NodeId,
        dock: DockId,
        position: crate::dock::Position,
        relative_to: DockId,
    ) -> DockerResult<()> {
        let required_orientation = position.required_orientation().expect("left/right/top/bottom only");
        let docks = self.nodes[group.0].segment.docks();
        let idx = docks.iter().position(|&d| d == relative_to).ok_or(DockerError::AnchorNotInGroup)?;

        if docks.len() <= 1 {
            self.force_orientation(group, required_orientation);
        }

        let insertion_index = match position {
            crate::dock::Position::Left | crate::dock::Position::Top => idx.saturating_sub(1),
            crate::dock::Position::Right | crate::dock::Position::Bottom => idx + 1,
            _ => unreachable!(),
        };

        match required_orientation {
            Orientation::Horizontal => {
                self.docks[relative_to.0].width /= 2.0;
                self.docks[dock.0].width /= 2.0;
            }
            Orientation::Vertical => {
                self.docks[relative_to.0].height /= 2.0;
                self.docks[dock.0].height /= 2.0;
            }
            Orientation::Undetermined => unreachable!(),
        }

        if let Some(list) = self.nodes[group.0].segment.docks_mut() {
            list.insert(insertion_index, dock);
        }
        self.docks[dock.0].group = Some(group);
        Ok(())
    }

    /// Removes `dock` from `group`'s ordered list. Resets orientation to
    /// `Undetermined` when the list becomes empty (`LayoutDockGroup` only —
    /// `TrayGroup`/`CenterGroup` orientation is otherwise fixed/stable).
    pub fn remove_dock_from_group(&mut self, group: NodeId, dock: DockId) -> DockerResult<()> {
        let removed = {
            let segment = &mut self.nodes[group.0].segment;
            let list = segment.docks_mut().expect("group holds a dock list");
            match list.iter().position(|&d| d == dock) {
                Some(i) => {
                    list.remove(i);
                    true
                }
                None => false,
            }
        };
        if !removed {
            return Err(DockerError::NotInGroup);
        }
        self.docks[dock.0].group = None;
        if self.nodes[group.0].segment.is_dock_group() && self.nodes[group.0].segment.docks().is_empty() {
            self.force_orientation(group, Orientation::Undetermined);
        }
        Ok(())
    }

    // -- traversal -------------------------------------------------------------

    /// Iterative, parent-pointer-driven in-order walk (spec §9 "Iterative
    /// in-order traversal"): avoids recursion by tracking which neighbor we
    /// just arrived from instead of pushing an explicit stack.
    pub fn in_order(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut node = Some(self.root);
        let mut prev: Option<NodeId> = None;

        while let Some(cur) = node {
            let n = &self.nodes[cur.0];
            let came_from_child = prev.is_some() && (prev == n.left || prev == n.right);

            if !came_from_child {
                if let Some(l) = n.left {
                    prev = Some(cur);
                    node = Some(l);
                    continue;
                }
            }

            if prev != n.right {
                out.push(cur);
                if let Some(r) = n.right {
                    prev = Some(cur);
                    node = Some(r);
                    continue;
                }
            }

            prev = Some(cur);
            node = n.parent;
        }

        out
    }

    /// §4.3 "Node search": the first node in in-order position whose
    /// segment matches `pred`.
    pub fn find_node(&self, pred: impl Fn(&Segment) -> bool) -> Option<NodeId> {
        self.in_order().into_iter().find(|&id| pred(&self.nodes[id.0].segment))
    }

    /// Walks from `start` towards the root, returning the nearest ancestor
    /// (inclusive of `start`) holding a `TrayGroup` for `edge`.
    pub fn nearest_tray_on_path(&self, start: NodeId, edge: Edge) -> Option<NodeId> {
        let mut cur = Some(start);
        while let Some(id) = cur {
            let segment = &self.nodes[id.0].segment;
            if segment.is_tray() && segment.edge() == Some(edge) {
                return Some(id);
            }
            cur = self.nodes[id.0].parent;
        }
        None
    }

    /// Recursively frees `node` and its descendants from the arena. The
    /// caller must have already detached `node` from its parent.
    pub fn dispose_subtree(&mut self, node: NodeId) {
        if let Some(l) = self.left(node) {
            self.dispose_subtree(l);
        }
        if let Some(r) = self.right(node) {
            self.dispose_subtree(r);
        }
        self.free_node(node);
    }

    /// Ancestor chain from `start` up to and including the root.
    pub fn ancestors(&self, start: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut cur = Some(start);
        while let Some(id) = cur {
            out.push(id);
            cur = self.nodes[id.0].parent;
        }
        out
    }
}

impl<P> Default for Tree<P> {
    fn default() -> Self {
        Self::new()
    }
}
