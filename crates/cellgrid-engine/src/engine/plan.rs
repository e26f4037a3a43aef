//! Recalculation planning and circular dependency detection.
//!
//! After a cell changes, it and every cell that (transitively) reads it must
//! be re-evaluated, each one after all the cells it reads. This module walks
//! the dependents depth-first and emits that order, failing if the walk comes
//! back to a cell that is still on the stack.
//!
//! Planning is read-only. Run it against a [`PlannedEdit`] to find out whether
//! an edit would introduce a cycle before the graph is touched.

use std::collections::{BTreeSet, HashSet};

use thiserror::Error;

use super::graph::DependencyGraph;

/// A cycle reachable from the planned root.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("circular dependency through '{name}': {}", .path.join(" -> "))]
pub struct CycleError {
    /// The cell that was reached twice.
    pub name: String,
    /// The loop, starting and ending at `name`.
    pub path: Vec<String>,
}

/// Read access to direct dependents, as seen by the planner.
pub trait DependentsView {
    /// Cells that directly reference `name`, in a deterministic order.
    fn dependents_of(&self, name: &str) -> Vec<String>;
}

impl DependentsView for DependencyGraph {
    fn dependents_of(&self, name: &str) -> Vec<String> {
        self.dependents(name).map(str::to_string).collect()
    }
}

/// The graph as it would look after replacing one cell's dependees.
///
/// Only the edges into `cell` differ from the underlying graph.
#[derive(Debug)]
pub struct PlannedEdit<'a> {
    graph: &'a DependencyGraph,
    cell: &'a str,
    dependees: BTreeSet<String>,
}

impl<'a> PlannedEdit<'a> {
    pub fn new<I, S>(graph: &'a DependencyGraph, cell: &'a str, dependees: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        PlannedEdit {
            graph,
            cell,
            dependees: dependees.into_iter().map(Into::into).collect(),
        }
    }

    pub fn cell(&self) -> &str {
        self.cell
    }

    /// Releases the graph borrow, handing back the dependee set to commit.
    pub fn into_dependees(self) -> BTreeSet<String> {
        self.dependees
    }
}

impl DependentsView for PlannedEdit<'_> {
    fn dependents_of(&self, name: &str) -> Vec<String> {
        let mut out: BTreeSet<String> = self.graph.dependents(name).map(str::to_string).collect();
        if self.dependees.contains(name) {
            out.insert(self.cell.to_string());
        } else {
            out.remove(self.cell);
        }
        out.into_iter().collect()
    }
}

/// Compute the order in which `root` and its transitive dependents must be
/// re-evaluated.
///
/// The result starts with `root`; every cell appears after all of its
/// dependees that are also in the result.
pub fn recalculation_order<V>(view: &V, root: &str) -> Result<Vec<String>, CycleError>
where
    V: DependentsView + ?Sized,
{
    // Iterative DFS so long dependency chains cannot overflow the stack.
    struct Frame {
        node: String,
        dependents: Vec<String>,
        next: usize,
    }

    let mut visited: HashSet<String> = HashSet::new();
    let mut on_stack: HashSet<String> = HashSet::new();
    let mut order = Vec::new();

    on_stack.insert(root.to_string());
    let mut stack = vec![Frame {
        node: root.to_string(),
        dependents: view.dependents_of(root),
        next: 0,
    }];

    while let Some(frame) = stack.last_mut() {
        if frame.next < frame.dependents.len() {
            let dependent = frame.dependents[frame.next].clone();
            frame.next += 1;

            if on_stack.contains(&dependent) {
                let start = stack
                    .iter()
                    .position(|f| f.node == dependent)
                    .unwrap_or(0);
                let mut path: Vec<String> = stack[start..].iter().map(|f| f.node.clone()).collect();
                path.push(dependent.clone());
                return Err(CycleError {
                    name: dependent,
                    path,
                });
            }
            if visited.contains(&dependent) {
                continue;
            }

            on_stack.insert(dependent.clone());
            let dependents = view.dependents_of(&dependent);
            stack.push(Frame {
                node: dependent,
                dependents,
                next: 0,
            });
        } else if let Some(done) = stack.pop() {
            on_stack.remove(&done.node);
            visited.insert(done.node.clone());
            order.push(done.node);
        }
    }

    order.reverse();
    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> DependencyGraph {
        // A <- B <- C, and A <- C
        let mut g = DependencyGraph::new();
        g.add_dependency("A", "B");
        g.add_dependency("B", "C");
        g.add_dependency("A", "C");
        g
    }

    fn position(order: &[String], name: &str) -> usize {
        order.iter().position(|n| n == name).unwrap()
    }

    #[test]
    fn test_isolated_cell_plans_itself() {
        let g = DependencyGraph::new();
        assert_eq!(recalculation_order(&g, "A").unwrap(), vec!["A"]);
    }

    #[test]
    fn test_chain_order() {
        let g = chain();
        assert_eq!(recalculation_order(&g, "A").unwrap(), vec!["A", "B", "C"]);
        assert_eq!(recalculation_order(&g, "B").unwrap(), vec!["B", "C"]);
        assert_eq!(recalculation_order(&g, "C").unwrap(), vec!["C"]);
    }

    #[test]
    fn test_diamond_respects_dependees() {
        let mut g = DependencyGraph::new();
        g.add_dependency("A", "B");
        g.add_dependency("A", "C");
        g.add_dependency("B", "D");
        g.add_dependency("C", "D");
        g.add_dependency("D", "E");

        let order = recalculation_order(&g, "A").unwrap();
        assert_eq!(order.len(), 5);
        assert_eq!(order[0], "A");
        assert!(position(&order, "B") < position(&order, "D"));
        assert!(position(&order, "C") < position(&order, "D"));
        assert!(position(&order, "D") < position(&order, "E"));
    }

    #[test]
    fn test_self_reference_is_a_cycle() {
        let mut g = DependencyGraph::new();
        g.add_dependency("A", "A");
        let err = recalculation_order(&g, "A").unwrap_err();
        assert_eq!(err.name, "A");
        assert_eq!(err.path, vec!["A", "A"]);
    }

    #[test]
    fn test_indirect_cycle() {
        let mut g = chain();
        g.add_dependency("C", "A");
        let err = recalculation_order(&g, "A").unwrap_err();
        assert_eq!(err.name, "A");
        assert_eq!(err.path.first().map(String::as_str), Some("A"));
        assert_eq!(err.path.last().map(String::as_str), Some("A"));
        assert!(err.to_string().contains("circular dependency"));
    }

    #[test]
    fn test_cycle_not_reachable_from_root_is_ignored() {
        let mut g = DependencyGraph::new();
        g.add_dependency("X", "Y");
        g.add_dependency("Y", "X");
        g.add_dependency("A", "B");
        assert_eq!(recalculation_order(&g, "A").unwrap(), vec!["A", "B"]);
    }

    #[test]
    fn test_long_chain_does_not_overflow() {
        let mut g = DependencyGraph::new();
        for i in 1..10_000 {
            g.add_dependency(&format!("C{}", i - 1), &format!("C{}", i));
        }
        let order = recalculation_order(&g, "C0").unwrap();
        assert_eq!(order.len(), 10_000);
        assert_eq!(order[0], "C0");
        assert_eq!(order[9_999], "C9999");

        g.add_dependency("C9999", "C0");
        let err = recalculation_order(&g, "C0").unwrap_err();
        assert_eq!(err.path.len(), 10_001);
    }

    #[test]
    fn test_planned_edit_detects_cycle_without_mutation() {
        let mut g = DependencyGraph::new();
        // A = B + 1
        g.add_dependency("B", "A");
        let before = g.clone();

        // B = A + 1 would close the loop.
        let edit = PlannedEdit::new(&g, "B", ["A"]);
        let err = recalculation_order(&edit, "B").unwrap_err();
        assert_eq!(err.name, "B");
        assert_eq!(g, before);
    }

    #[test]
    fn test_planned_edit_drops_replaced_edges() {
        let mut g = DependencyGraph::new();
        // B = A + 1, C = B + 1
        g.add_dependency("A", "B");
        g.add_dependency("B", "C");

        // Re-point B at X: A no longer feeds B.
        let edit = PlannedEdit::new(&g, "B", ["X"]);
        assert!(edit.dependents_of("A").is_empty());
        assert_eq!(edit.dependents_of("X"), vec!["B"]);
        assert_eq!(recalculation_order(&edit, "B").unwrap(), vec!["B", "C"]);
        assert_eq!(edit.into_dependees().into_iter().collect::<Vec<_>>(), vec!["X"]);
    }
}
