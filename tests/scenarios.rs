//! End-to-end scenarios against the public `Docker` façade, flattening the
//! tree into a short textual form and comparing against a literal expected
//! sequence — the same flatten-and-compare idiom `nglayoutng`'s own
//! `tests/tests.rs` uses for its DOM/layout-tree/fragment-tree comparisons,
//! scaled down to a single in-order dump instead of file fixtures.

use dockspace::{Anchor, Docker, DockCapabilities, DockerError, DockState, LayoutChangedReason, Position};

fn cap() -> DockCapabilities {
    DockCapabilities::default()
}

/// Lets `RUST_LOG=trace cargo test -- --nocapture` show the `trace!`/`debug!`
/// calls docker.rs makes around tree mutation and consolidation. Harmless to
/// call more than once across tests in this binary; `try_init` just reports
/// the later calls as already-initialized.
fn init_logger() {
    let _ = env_logger::try_init();
}

/// In-order flatten of every leaf segment (center/tray/dock-group), the
/// level spec.md's end-to-end scenarios are written against.
fn flatten(docker: &Docker<&'static str>) -> Vec<String> {
    let tree = docker.tree();
    tree.in_order()
        .into_iter()
        .filter_map(|id| {
            let segment = tree.segment(id);
            if segment.is_center() {
                return Some("CenterGroup".to_string());
            }
            if segment.is_tray() {
                return Some(format!("Tray({:?})", segment.edge().unwrap()));
            }
            if segment.is_dock_group() {
                let labels: Vec<&str> = segment.docks().iter().map(|&d| tree.dock(d).payload).collect();
                return Some(format!("LDG[{}]", labels.join(",")));
            }
            None
        })
        .collect()
}

#[test]
fn scenario_1_dock_a_at_left() {
    init_logger();
    let mut docker: Docker<&'static str> = Docker::new();
    docker.dock("A", Anchor::new(Position::Left, None), cap(), 200.0, 400.0).unwrap();

    assert_eq!(flatten(&docker), vec!["Tray(Left)", "LDG[A]", "CenterGroup"]);
}

#[test]
fn scenario_2_dock_b_at_right() {
    init_logger();
    let mut docker: Docker<&'static str> = Docker::new();
    docker.dock("A", Anchor::new(Position::Left, None), cap(), 200.0, 400.0).unwrap();
    docker.dock("B", Anchor::new(Position::Right, None), cap(), 200.0, 400.0).unwrap();

    assert_eq!(
        flatten(&docker),
        vec!["Tray(Left)", "LDG[A]", "CenterGroup", "LDG[B]", "Tray(Right)"]
    );
}

#[test]
fn scenario_3_dock_c_right_of_a_splits_horizontally() {
    init_logger();
    let mut docker: Docker<&'static str> = Docker::new();
    let a = docker.dock("A", Anchor::new(Position::Left, None), cap(), 200.0, 400.0).unwrap();
    docker.dock("B", Anchor::new(Position::Right, None), cap(), 200.0, 400.0).unwrap();
    docker.dock("C", Anchor::relative(Position::Right, a), cap(), 200.0, 400.0).unwrap();

    assert_eq!(
        flatten(&docker),
        vec!["Tray(Left)", "LDG[A,C]", "CenterGroup", "LDG[B]", "Tray(Right)"]
    );
    assert_eq!(docker.tree().dock(a).width(), 100.0);
}

#[test]
fn scenario_4_dock_d_below_a_repartitions_vertically() {
    init_logger();
    let mut docker: Docker<&'static str> = Docker::new();
    let a = docker.dock("A", Anchor::new(Position::Left, None), cap(), 200.0, 400.0).unwrap();
    docker.dock("B", Anchor::new(Position::Right, None), cap(), 200.0, 400.0).unwrap();
    docker.dock("C", Anchor::relative(Position::Right, a), cap(), 200.0, 400.0).unwrap();
    docker.dock("D", Anchor::relative(Position::Bottom, a), cap(), 200.0, 400.0).unwrap();

    assert_eq!(
        flatten(&docker),
        vec!["Tray(Left)", "LDG[A,D]", "LDG[C]", "CenterGroup", "LDG[B]", "Tray(Right)"]
    );
}

#[test]
fn scenario_5_closing_a_and_d_collapses_back_to_c() {
    init_logger();
    let mut docker: Docker<&'static str> = Docker::new();
    let a = docker.dock("A", Anchor::new(Position::Left, None), cap(), 200.0, 400.0).unwrap();
    docker.dock("B", Anchor::new(Position::Right, None), cap(), 200.0, 400.0).unwrap();
    docker.dock("C", Anchor::relative(Position::Right, a), cap(), 200.0, 400.0).unwrap();
    let d = docker.dock("D", Anchor::relative(Position::Bottom, a), cap(), 200.0, 400.0).unwrap();

    docker.close(a).unwrap();
    docker.close(d).unwrap();

    assert_eq!(
        flatten(&docker),
        vec!["Tray(Left)", "LDG[C]", "CenterGroup", "LDG[B]", "Tray(Right)"]
    );
}

#[test]
fn scenario_6_closing_c_collapses_the_left_edge_entirely() {
    init_logger();
    let mut docker: Docker<&'static str> = Docker::new();
    let a = docker.dock("A", Anchor::new(Position::Left, None), cap(), 200.0, 400.0).unwrap();
    docker.dock("B", Anchor::new(Position::Right, None), cap(), 200.0, 400.0).unwrap();
    let c = docker.dock("C", Anchor::relative(Position::Right, a), cap(), 200.0, 400.0).unwrap();
    let d = docker.dock("D", Anchor::relative(Position::Bottom, a), cap(), 200.0, 400.0).unwrap();

    docker.close(a).unwrap();
    docker.close(d).unwrap();
    docker.close(c).unwrap();

    assert_eq!(flatten(&docker), vec!["CenterGroup", "LDG[B]", "Tray(Right)"]);
}

// -- boundary scenarios (§8) -------------------------------------------------

#[test]
fn minimizing_with_no_tray_on_path_fails() {
    let mut docker: Docker<&'static str> = Docker::new();
    let id = docker.dock("A", Anchor::center(), cap(), 100.0, 100.0).unwrap();
    assert!(matches!(docker.minimize(id), Err(DockerError::NoTrayOnPath { .. })));
}

#[test]
fn floating_from_pinned_state_fails() {
    let mut docker: Docker<&'static str> = Docker::new();
    let id = docker.dock("A", Anchor::new(Position::Left, None), cap(), 200.0, 400.0).unwrap();
    assert_eq!(docker.float(id), Err(DockerError::InvalidFloatSource));
}

#[test]
fn docking_relative_to_a_center_dock_fails_with_invalid_anchor() {
    let mut docker: Docker<&'static str> = Docker::new();
    let center_dock = docker.dock("A", Anchor::center(), cap(), 100.0, 100.0).unwrap();

    assert!(matches!(
        docker.dock("B", Anchor::relative(Position::Right, center_dock), cap(), 50.0, 50.0),
        Err(DockerError::InvalidAnchor { .. })
    ));
}

// -- round-trip / idempotence (§8) -------------------------------------------

#[test]
fn docking_then_closing_restores_the_original_tree() {
    let mut docker: Docker<&'static str> = Docker::new();
    let before = flatten(&docker);

    let id = docker.dock("A", Anchor::new(Position::Left, None), cap(), 200.0, 400.0).unwrap();
    docker.close(id).unwrap();

    assert_eq!(flatten(&docker), before);
}

#[test]
fn pin_after_pin_is_a_no_op() {
    let mut docker: Docker<&'static str> = Docker::new();
    let id = docker.dock("A", Anchor::new(Position::Left, None), cap(), 200.0, 400.0).unwrap();
    docker.minimize(id).unwrap();

    docker.pin(id).unwrap();
    let after_first_pin = flatten(&docker);
    assert_eq!(docker.pin(id), Err(DockerError::InvalidPinSource));
    assert_eq!(flatten(&docker), after_first_pin);
}

#[test]
fn minimize_after_minimize_is_rejected_not_double_applied() {
    let mut docker: Docker<&'static str> = Docker::new();
    let id = docker.dock("A", Anchor::new(Position::Left, None), cap(), 200.0, 400.0).unwrap();
    docker.minimize(id).unwrap();
    let after_first = flatten(&docker);

    assert_eq!(docker.minimize(id), Err(DockerError::CannotMinimize));
    assert_eq!(flatten(&docker), after_first);
}

#[test]
fn float_after_float_is_idempotent() {
    let mut docker: Docker<&'static str> = Docker::new();
    let id = docker.dock("A", Anchor::new(Position::Left, None), cap(), 200.0, 400.0).unwrap();
    docker.minimize(id).unwrap();

    docker.float(id).unwrap();
    assert_eq!(docker.tree().dock(id).state(), DockState::Floating);
    docker.float(id).unwrap_err();
    assert_eq!(docker.tree().dock(id).state(), DockState::Floating);
}

#[test]
fn resize_to_the_same_dimensions_does_not_notify() {
    use std::cell::Cell;

    let mut docker: Docker<&'static str> = Docker::new();
    let id = docker.dock("A", Anchor::center(), cap(), 120.0, 80.0).unwrap();

    let notified = std::rc::Rc::new(Cell::new(false));
    let flag = notified.clone();
    docker.on_layout_changed(move |reason| {
        if reason == LayoutChangedReason::Resize {
            flag.set(true);
        }
    });

    docker.resize(id, 120.0, 80.0).unwrap();
    assert!(!notified.get(), "resize to identical dimensions should not be treated as a layout change");
}

// -- invariant-style checks (§8 I1-I6), spot-checked after a representative
// sequence of operations rather than via exhaustive property search.

#[test]
fn exactly_one_center_group_is_reachable_after_a_busy_sequence() {
    let mut docker: Docker<&'static str> = Docker::new();
    let a = docker.dock("A", Anchor::new(Position::Left, None), cap(), 200.0, 400.0).unwrap();
    docker.dock("B", Anchor::new(Position::Right, None), cap(), 200.0, 400.0).unwrap();
    docker.dock("C", Anchor::relative(Position::Right, a), cap(), 200.0, 400.0).unwrap();
    docker.dock("D", Anchor::relative(Position::Bottom, a), cap(), 200.0, 400.0).unwrap();
    docker.close(a).unwrap();

    let centers = flatten(&docker).into_iter().filter(|s| s == "CenterGroup").count();
    assert_eq!(centers, 1);
}

#[test]
fn every_group_dock_points_back_to_its_group() {
    let mut docker: Docker<&'static str> = Docker::new();
    let a = docker.dock("A", Anchor::new(Position::Left, None), cap(), 200.0, 400.0).unwrap();
    let b = docker.dock("B", Anchor::relative(Position::Right, a), cap(), 200.0, 400.0).unwrap();

    let group = docker.tree().dock(a).group().unwrap();
    assert_eq!(docker.tree().dock(b).group(), Some(group));
    assert!(docker.tree().segment(group).docks().contains(&a));
    assert!(docker.tree().segment(group).docks().contains(&b));
}
