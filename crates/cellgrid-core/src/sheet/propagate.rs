//! Moving values and invalidations along observer edges.
//!
//! Propagation is push based and depth first: a changed cell hands its new
//! value to each observer in attach order, and each observer re-evaluates
//! and pushes on before the next sibling is visited.

use std::collections::{BTreeMap, HashSet};

use cellgrid_engine::engine::{CellId, Position};
use log::trace;

use super::Sheet;

impl Sheet {
    /// Send the current value of `id` to all of its observers, recursively.
    pub(crate) fn notify(&mut self, id: CellId) {
        let Some(cell) = self.get(id) else {
            return;
        };
        let from = cell.position;
        let value = cell.evaluated.clone();
        let observers = cell.observers.clone();

        for observer in observers {
            let Some(target) = self.get_mut(observer) else {
                continue;
            };
            trace!("push {} = {:?} to {}", from, value, target.position);
            target.update_evaluate(from, &value);
            self.notify(observer);
        }
    }

    /// Remove `id` from the observer lists of everything it reads from and
    /// clear its snapshot.
    pub(crate) fn detach_dependencies(&mut self, id: CellId) {
        let deps = match self.get_mut(id) {
            Some(cell) => std::mem::take(&mut cell.snapshot),
            None => return,
        };
        for pos in deps.keys() {
            self.detach_from(*pos, id);
        }
    }

    pub(crate) fn detach_from(&mut self, target: Position, observer: CellId) {
        if let Some(cell) = self.id_at(target).and_then(|t| self.get_mut(t)) {
            cell.detach(observer);
        }
    }

    /// Make `id` observe every position in `targets` and return the seeded
    /// snapshot of their current values.
    pub(crate) fn attach_dependencies(
        &mut self,
        id: CellId,
        targets: &[Position],
    ) -> BTreeMap<Position, String> {
        let mut snapshot = BTreeMap::new();
        for &pos in targets {
            if let Some(cell) = self.id_at(pos).and_then(|t| self.get_mut(t)) {
                cell.attach(id);
                snapshot.insert(pos, cell.evaluated.clone());
            }
        }
        snapshot
    }

    /// Invalidate every cell in `start` and, transitively, everything that
    /// observes them. Each invalidated cell drops its outgoing edges.
    pub(crate) fn invalidate_observers(&mut self, start: Vec<CellId>) {
        let mut to_process = start;
        let mut visited = HashSet::new();

        while let Some(id) = to_process.pop() {
            if !visited.insert(id) {
                continue;
            }
            self.detach_dependencies(id);
            let Some(cell) = self.get_mut(id) else {
                continue;
            };
            cell.invalidate();
            to_process.extend(cell.observers.iter().copied());
        }
    }
}
