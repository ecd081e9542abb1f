//! Circular dependency detection for formula cells.
//!
//! Before a formula at `origin` starts reading from `target`, we must verify
//! that `target` does not already (transitively) read from `origin`
//! (e.g., A1 references B1, B1 references C1, C1 references A1).
//! The search walks dependency snapshots depth-first.

use std::collections::HashSet;

use super::position::Position;

/// Read access to the "depends on" edges of a grid.
pub trait DependencyGraph {
    /// Positions the cell at `pos` currently reads from.
    fn dependencies(&self, pos: Position) -> Vec<Position>;
}

/// Find a dependency path from `target` back to `origin`.
///
/// Returns the path (starting at `target`, ending at `origin`) when adding
/// the edge `origin -> target` would close a cycle. A `target` equal to
/// `origin` is a cycle of length one.
pub fn find_cycle<G: DependencyGraph + ?Sized>(
    origin: Position,
    target: Position,
    graph: &G,
) -> Option<Vec<Position>> {
    let mut visited = HashSet::new();
    let mut path = Vec::new();

    if find_cycle_dfs(origin, target, graph, &mut visited, &mut path) {
        Some(path)
    } else {
        None
    }
}

fn find_cycle_dfs<G: DependencyGraph + ?Sized>(
    origin: Position,
    current: Position,
    graph: &G,
    visited: &mut HashSet<Position>,
    path: &mut Vec<Position>,
) -> bool {
    path.push(current);
    if current == origin {
        return true;
    }
    if !visited.insert(current) {
        path.pop();
        return false;
    }

    for dep in graph.dependencies(current) {
        if find_cycle_dfs(origin, dep, graph, visited, path) {
            return true;
        }
    }

    path.pop();
    false
}
