//! Textual tree dump for debugging (§6 "Debug output").
//!
//! The pretty-printer itself is a direct port of `nglayoutng`'s
//! `misc::print_tree::PrintTree`: it queues the most recently added item so
//! it can tell, once the next sibling or level change arrives, whether to
//! draw a branching `├─` or a terminal `└─` prefix. The original targets
//! `std::io::Write`; this one targets `std::fmt::Write` since a dump is
//! built as an in-memory `String` rather than streamed.

use std::fmt::Write as _;

use crate::dock::DockId;
use crate::segment::Segment;
use crate::tree::{NodeId, Tree};

struct PrintTree {
    level: u32,
    queued_item: Option<String>,
    output: String,
}

impl PrintTree {
    fn new(title: &str) -> Self {
        let mut output = String::new();
        writeln!(output, "\u{250c} {title}").unwrap();
        Self { level: 1, queued_item: None, output }
    }

    fn print_level_prefix(&mut self) {
        for _ in 0..self.level {
            write!(self.output, "\u{2502}  ").unwrap();
        }
    }

    fn flush_queued_item(&mut self, prefix: &str) {
        if let Some(item) = self.queued_item.take() {
            self.print_level_prefix();
            writeln!(self.output, "{prefix} {item}").unwrap();
        }
    }

    fn new_level(&mut self, title: String) {
        self.flush_queued_item("\u{251c}\u{2500}");
        self.print_level_prefix();
        writeln!(self.output, "\u{251c}\u{2500} {title}").unwrap();
        self.level += 1;
    }

    fn end_level(&mut self) {
        self.flush_queued_item("\u{2514}\u{2500}");
        self.level -= 1;
    }

    fn add_item(&mut self, text: String) {
        self.flush_queued_item("\u{251c}\u{2500}");
        self.queued_item = Some(text);
    }

    fn finish(mut self) -> String {
        self.flush_queued_item("\u{2514}\u{2500}");
        self.output
    }
}

fn describe<P>(tree: &Tree<P>, node: NodeId) -> String {
    let segment = tree.segment(node);
    let mut text = format!("{} #{}", segment.variant_name(), segment.debug_id());
    if let Some(edge) = segment.edge() {
        let _ = write!(text, " edge={edge:?}");
    }
    if !matches!(segment, Segment::Layout { .. } | Segment::Edge { .. }) {
        let _ = write!(text, " orientation={:?}", segment.orientation());
    }
    if !segment.docks().is_empty() {
        let ids: Vec<String> = segment.docks().iter().map(|d: &DockId| format!("{d:?}")).collect();
        let _ = write!(text, " docks=[{}]", ids.join(", "));
    }
    text
}

fn walk<P>(tree: &Tree<P>, node: NodeId, printer: &mut PrintTree) {
    match (tree.left(node), tree.right(node)) {
        (None, None) => printer.add_item(describe(tree, node)),
        _ => {
            printer.new_level(describe(tree, node));
            if let Some(l) = tree.left(node) {
                walk(tree, l, printer);
            }
            if let Some(r) = tree.right(node) {
                walk(tree, r, printer);
            }
            printer.end_level();
        }
    }
}

/// Renders the whole tree as an indented, box-drawn outline rooted at the
/// workspace root.
pub fn dump_tree<P>(tree: &Tree<P>) -> String {
    let mut printer = PrintTree::new("workspace");
    walk(tree, tree.root(), &mut printer);
    printer.finish()
}
