//! Direction-aware traversal that drives an external layout collaborator
//! (§4.5). This crate decides *order* — which dock, tray or sub-flow comes
//! next and along which axis — never geometry; an implementor of
//! [`LayoutEngine`] turns that order into actual rectangles, the same
//! division of labor `nglayoutng::layout_algorithms::LayoutAlgorithm`
//! draws between the tree walk and the block/inline algorithms that
//! compute sizes.

use crate::dock::{Dock, DockId, DockState};
use crate::segment::{Edge, Orientation, Segment};
use crate::tree::{NodeId, Tree};

/// The axis along which a flow's children are arranged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowDirection {
    LeftToRight,
    TopToBottom,
}

impl FlowDirection {
    fn for_orientation(orientation: Orientation) -> Self {
        match orientation {
            Orientation::Horizontal => FlowDirection::LeftToRight,
            Orientation::Vertical | Orientation::Undetermined => FlowDirection::TopToBottom,
        }
    }
}

/// A layout region being traversed: one `LayoutGroup`/`EdgeGroup`'s worth
/// of children, arranged along a single axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Flow {
    pub direction: FlowDirection,
    pub orientation: Orientation,
}

/// The external collaborator that turns traversal order into geometry.
/// Implemented outside this crate — see spec §1's out-of-scope list
/// (measurement, render target, presentation).
pub trait LayoutEngine<P> {
    fn start_layout(&mut self, root: &Segment) -> Flow;
    fn end_layout(&mut self);
    fn push_flow(&mut self, flow: Flow);
    fn pop_flow(&mut self);
    /// Opens a nested flow for a segment whose orientation diverges from
    /// the currently open flow's direction (§4.5).
    fn start_flow(&mut self, segment: &Segment) -> Flow;
    fn end_flow(&mut self);
    /// Must return the last flow pushed and not yet popped.
    fn current_flow(&self) -> Flow;
    fn place_dock(&mut self, dock: &Dock<P>);
    fn place_tray(&mut self, edge: Edge, docks: &[DockId]);
}

/// Walks `tree` depth-first, calling into `engine` in traversal order.
pub fn layout<P, E: LayoutEngine<P>>(tree: &Tree<P>, engine: &mut E) {
    let root = tree.root();
    let initial = engine.start_layout(tree.segment(root));
    engine.push_flow(initial);
    walk(tree, root, engine);
    debug_assert_eq!(
        engine.current_flow(),
        initial,
        "layout engine produced unbalanced start_flow/end_flow calls"
    );
    engine.end_layout();
}

/// A node is visible iff it will contribute at least one placement: a dock
/// group (or the center group) needs a non-minimized dock, a tray needs
/// any dock, an internal node needs a visible child.
fn is_visible<P>(tree: &Tree<P>, node: NodeId) -> bool {
    let segment = tree.segment(node);
    if segment.is_tray() {
        return !segment.docks().is_empty();
    }
    if segment.is_dock_group() || segment.is_center() {
        return segment.docks().iter().any(|&d| tree.dock(d).state() != DockState::Minimized);
    }
    match tree.left(node) {
        Some(l) if is_visible(tree, l) => true,
        _ => match tree.right(node) {
            Some(r) => is_visible(tree, r),
            None => false,
        },
    }
}

/// The orientation a node's flow decision is made against. A dock group (or
/// the center group) whose list holds exactly one pinned dock is treated as
/// `undetermined`, so a lone dock never forces a nested flow on its own
/// (§4.5).
fn flow_orientation<P>(tree: &Tree<P>, node: NodeId) -> Orientation {
    let segment = tree.segment(node);
    if segment.is_dock_group() || segment.is_center() {
        let pinned = segment.docks().iter().filter(|&&d| tree.dock(d).state() == DockState::Pinned).count();
        if pinned == 1 {
            return Orientation::Undetermined;
        }
    }
    segment.orientation()
}

/// Opens a nested flow for `node` if its orientation differs from the
/// currently open flow's direction. Returns whether one was opened, so the
/// caller knows whether to balance it with `end_flow`/`pop_flow`.
fn maybe_open_flow<P, E: LayoutEngine<P>>(tree: &Tree<P>, node: NodeId, engine: &mut E) -> bool {
    let orientation = flow_orientation(tree, node);
    if orientation == Orientation::Undetermined {
        return false;
    }
    if FlowDirection::for_orientation(orientation) == engine.current_flow().direction {
        return false;
    }
    let flow = engine.start_flow(tree.segment(node));
    engine.push_flow(flow);
    true
}

fn walk<P, E: LayoutEngine<P>>(tree: &Tree<P>, node: NodeId, engine: &mut E) {
    let segment = tree.segment(node);

    if segment.is_dock_group() || segment.is_center() {
        let nested = maybe_open_flow(tree, node, engine);
        for &dock_id in tree.segment(node).docks() {
            let dock = tree.dock(dock_id);
            if dock.state() != DockState::Minimized {
                engine.place_dock(dock);
            }
        }
        if nested {
            engine.end_flow();
            engine.pop_flow();
        }
        return;
    }

    // Edge / Layout: recurse into visible children. A child that is a
    // non-empty TrayGroup is handed to `place_tray` directly instead of
    // being walked further (it's always a leaf anyway).
    let nested = maybe_open_flow(tree, node, engine);
    if let Some(l) = tree.left(node) {
        walk_child(tree, l, engine);
    }
    if let Some(r) = tree.right(node) {
        walk_child(tree, r, engine);
    }
    if nested {
        engine.end_flow();
        engine.pop_flow();
    }
}

fn walk_child<P, E: LayoutEngine<P>>(tree: &Tree<P>, node: NodeId, engine: &mut E) {
    if !is_visible(tree, node) {
        return;
    }
    let segment = tree.segment(node);
    if segment.is_tray() {
        let edge = segment.edge().expect("TrayGroup always carries an edge");
        engine.place_tray(edge, segment.docks());
        return;
    }
    walk(tree, node, engine);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dock::{Dock, DockCapabilities};

    #[derive(Default)]
    struct RecordingEngine {
        stack: Vec<Flow>,
        trace: Vec<String>,
    }

    impl<P> LayoutEngine<P> for RecordingEngine {
        fn start_layout(&mut self, root: &Segment) -> Flow {
            self.trace.push("start_layout".to_string());
            Flow { direction: FlowDirection::for_orientation(root.orientation()), orientation: root.orientation() }
        }
        fn end_layout(&mut self) {
            self.trace.push("end_layout".to_string());
        }
        fn push_flow(&mut self, flow: Flow) {
            self.stack.push(flow);
        }
        fn pop_flow(&mut self) {
            self.stack.pop().expect("pop_flow without a matching push_flow");
        }
        fn start_flow(&mut self, segment: &Segment) -> Flow {
            self.trace.push(format!("start_flow({})", segment.variant_name()));
            Flow {
                direction: FlowDirection::for_orientation(segment.orientation()),
                orientation: segment.orientation(),
            }
        }
        fn end_flow(&mut self) {
            self.trace.push("end_flow".to_string());
        }
        fn current_flow(&self) -> Flow {
            *self.stack.last().expect("current_flow called with no open flow")
        }
        fn place_dock(&mut self, dock: &Dock<P>) {
            self.trace.push(format!("place_dock({:?})", dock.id()));
        }
        fn place_tray(&mut self, edge: Edge, docks: &[DockId]) {
            self.trace.push(format!("place_tray({edge:?}, {})", docks.len()));
        }
    }

    fn cap() -> DockCapabilities {
        DockCapabilities::default()
    }

    #[test]
    fn invisible_empty_tray_is_skipped() {
        let mut tree: Tree<&'static str> = Tree::new();
        let tray = tree.new_detached(Segment::new_tray(Edge::Left));
        let edge_node = tree.new_detached(Segment::new_edge(Edge::Left));
        tree.add_child_left(edge_node, tray, Orientation::Vertical).unwrap();
        tree.add_child_before(tree.root(), edge_node, tree.center(), Orientation::Horizontal).unwrap();

        let mut engine = RecordingEngine::default();
        layout(&tree, &mut engine);

        assert!(!engine.trace.iter().any(|e| e.starts_with("place_tray")));
    }

    #[test]
    fn non_empty_tray_is_placed_and_not_recursed_into() {
        let mut tree: Tree<&'static str> = Tree::new();
        let dock = tree.insert_dock(Dock::new("panel", cap(), 100.0, 100.0));
        tree.dock_mut(dock).state = DockState::Minimized;

        let tray = tree.new_detached(Segment::new_tray(Edge::Left));
        tree.append_dock(tray, dock);
        let edge_node = tree.new_detached(Segment::new_edge(Edge::Left));
        tree.add_child_left(edge_node, tray, Orientation::Vertical).unwrap();
        tree.add_child_before(tree.root(), edge_node, tree.center(), Orientation::Horizontal).unwrap();

        let mut engine = RecordingEngine::default();
        layout(&tree, &mut engine);

        assert!(engine.trace.contains(&"place_tray(Left, 1)".to_string()));
    }

    #[test]
    fn minimized_docks_are_excluded_from_placement() {
        let mut tree: Tree<&'static str> = Tree::new();
        let visible = tree.insert_dock(Dock::new("a", cap(), 50.0, 50.0));
        let minimized = tree.insert_dock(Dock::new("b", cap(), 50.0, 50.0));
        tree.dock_mut(minimized).state = DockState::Minimized;
        tree.append_dock(tree.center(), visible);
        tree.append_dock(tree.center(), minimized);

        let mut engine = RecordingEngine::default();
        layout(&tree, &mut engine);

        assert!(engine.trace.contains(&format!("place_dock({visible:?})")));
        assert!(!engine.trace.contains(&format!("place_dock({minimized:?})")));
    }

    #[test]
    fn a_lone_pinned_dock_does_not_force_a_nested_flow() {
        let mut tree: Tree<&'static str> = Tree::new();
        let dock = tree.insert_dock(Dock::new("a", cap(), 50.0, 50.0));
        tree.dock_mut(dock).state = DockState::Pinned;
        let group = tree.new_leaf_dock_group(dock, Orientation::Horizontal);
        tree.add_child_right(tree.root(), group, Orientation::Horizontal).unwrap();

        let mut engine = RecordingEngine::default();
        layout(&tree, &mut engine);

        assert!(!engine.trace.iter().any(|e| e.starts_with("start_flow")));
    }

    #[test]
    fn matching_orientation_does_not_open_a_redundant_flow() {
        // group's orientation is fixed at Horizontal directly (two docks,
        // neither pinned alone, so the single-pinned-dock exception never
        // kicks in); root becomes Horizontal too once it gains a second
        // child. Same direction on both sides, so no nested flow is needed.
        let mut tree: Tree<&'static str> = Tree::new();
        let a = tree.insert_dock(Dock::new("a", cap(), 50.0, 50.0));
        let b = tree.insert_dock(Dock::new("b", cap(), 50.0, 50.0));
        let group = tree.new_leaf_dock_group(a, Orientation::Horizontal);
        tree.append_dock(group, b);
        tree.add_child_right(tree.root(), group, Orientation::Horizontal).unwrap();

        let mut engine = RecordingEngine::default();
        layout(&tree, &mut engine);

        assert!(!engine.trace.iter().any(|e| e.starts_with("start_flow")));
    }

    #[test]
    fn balanced_push_pop_leaves_the_initial_flow_current() {
        let mut tree: Tree<&'static str> = Tree::new();
        let left_dock = tree.insert_dock(Dock::new("a", cap(), 50.0, 50.0));
        let group = tree.new_leaf_dock_group(left_dock, Orientation::Vertical);
        tree.add_child_before(tree.root(), group, tree.center(), Orientation::Horizontal).unwrap();

        let mut engine = RecordingEngine::default();
        layout(&tree, &mut engine);

        assert_eq!(engine.trace.first(), Some(&"start_layout".to_string()));
        assert_eq!(engine.trace.last(), Some(&"end_layout".to_string()));
        assert_eq!(engine.stack.len(), 1, "only the initial flow should remain pushed");
    }
}
