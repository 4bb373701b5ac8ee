//! Post-mutation tree normalization (§4.4).
//!
//! Every structural docker operation ends by calling [`run`] on the node
//! where it made its change. `consolidate_step` applies one rewrite and
//! names the next node to re-examine; `run` follows that chain until it
//! goes quiet. Re-entrant calls are guarded in `Docker`, not here — this
//! module assumes it is never invoked while already running.

use crate::segment::Orientation;
use crate::tree::{NodeId, Tree};

pub type EdgeTable = [Option<NodeId>; 4];

/// Applies at most one rewrite at `node` and returns the node that should
/// be examined next, or `None` once nothing more applies there.
pub fn consolidate_step<P>(tree: &mut Tree<P>, edges: &mut EdgeTable, node: NodeId) -> Option<NodeId> {
    if tree.segment(node).is_edge() {
        return collapse_empty_edge(tree, edges, node);
    }

    if tree.segment(node).is_dock_group() && tree.segment(node).docks().is_empty() {
        return collapse_empty_leaf(tree, node);
    }

    simplify_children(tree, node)
}

/// Runs [`consolidate_step`] repeatedly starting from `start` until it
/// returns `None`.
pub fn run<P>(tree: &mut Tree<P>, edges: &mut EdgeTable, start: NodeId) {
    let mut current = Some(start);
    while let Some(node) = current {
        current = consolidate_step(tree, edges, node);
    }
}


/// Step 1: an `EdgeGroup` whose only remaining child is an empty tray is
/// pure dead weight — remove it and clear its slot in the edge table.
fn collapse_empty_edge<P>(tree: &mut Tree<P>, edges: &mut EdgeTable, node: NodeId) -> Option<NodeId> {
    let sole_child = match (tree.left(node), tree.right(node)) {
        (Some(c), None) | (None, Some(c)) => c,
        _ => return None,
    };
    if !tree.segment(sole_child).is_tray() || !tree.segment(sole_child).docks().is_empty() {
        return None;
    }
    let edge = tree.segment(node).edge().expect("EdgeGroup always carries an edge");
    let parent = match tree.parent(node) {
        Some(p) => p,
        None => return None,
    };
    tree.remove_child(parent, node).expect("edge node is a child of its parent");
    tree.dispose_subtree(node);
    edges[edge.index()] = None;
    Some(parent)
}

/// Step 2: a `LayoutDockGroup` with no docks left carries no information;
/// remove it and re-examine its former parent.
fn collapse_empty_leaf<P>(tree: &mut Tree<P>, node: NodeId) -> Option<NodeId> {
    let parent = tree.parent(node)?;
    tree.remove_child(parent, node).expect("node is a child of its parent");
    tree.dispose_subtree(node);
    Some(parent)
}

/// Step 3: fold a now-redundant internal node into its parent, either by
/// assimilating a lone surviving child or by merging two compatible leaf
/// children into one. Never applied across an `EdgeGroup` boundary — an
/// edge's tray and content child are never candidates for merging into each
/// other (§9 "EdgeGroup boundary").
fn simplify_children<P>(tree: &mut Tree<P>, node: NodeId) -> Option<NodeId> {
    match (tree.left(node), tree.right(node)) {
        (Some(child), None) | (None, Some(child)) => {
            if tree.segment(child).is_center() {
                return None;
            }
            tree.assimilate_child(node, child).expect("lone non-center child is always assimilable");
            Some(node)
        }
        (Some(l), Some(r)) => {
            if !compatible_leaves(tree, node, l, r) {
                return None;
            }
            tree.merge_leaf_parts(node).expect("both children are compatible leaves");
            Some(node)
        }
        (None, None) => None,
    }
}

fn compatible_leaves<P>(tree: &Tree<P>, node: NodeId, l: NodeId, r: NodeId) -> bool {
    if !tree.segment(l).is_leaf_variant() || !tree.segment(r).is_leaf_variant() {
        return false;
    }
    if tree.segment(l).is_center() || tree.segment(r).is_center() {
        return false;
    }
    let node_orientation = tree.segment(node).orientation();
    let compatible = |child: NodeId| {
        let o = tree.segment(child).orientation();
        o == Orientation::Undetermined || o == node_orientation
    };
    compatible(l) && compatible(r)
}
