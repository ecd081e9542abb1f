use cellgrid_engine::engine::{
    CellId, Position, ScanMode, find_cycle, messages, scan_calls,
};
use log::debug;

use super::Sheet;

impl Sheet {
    /// Write `content` to the cell at (`row`, `col`).
    ///
    /// Uppercase function calls in `content` decide which cells the new
    /// content reads from. The write is all or nothing:
    /// - a bad label, an out-of-bounds label or a self reference stores the
    ///   content but shows an invalid-position error and wires nothing
    /// - a reference that would close a cycle shows the circular error and
    ///   keeps the previous content and edges
    ///
    /// Positions outside the sheet are ignored.
    pub fn set_content(&mut self, row: usize, col: usize, content: &str) {
        let origin = Position::new(row, col);
        let Some(id) = self.id_at(origin) else {
            debug!("Ignoring write to {} outside the sheet", origin);
            return;
        };

        let mut targets: Vec<Position> = Vec::new();
        for call in scan_calls(content, ScanMode::Strict) {
            match call.validated_positions(origin, self.rows(), self.cols()) {
                Ok(positions) => {
                    for pos in positions {
                        if !targets.contains(&pos) {
                            targets.push(pos);
                        }
                    }
                }
                Err(err) => {
                    debug!("{}: {:?} rejected: {}", origin, content, err.message());
                    // Not evaluated: labels may lie far outside the sheet.
                    self.detach_dependencies(id);
                    if let Some(cell) = self.get_mut(id) {
                        cell.raw = content.to_string();
                        cell.evaluated = err.message().to_string();
                    }
                    self.notify(id);
                    return;
                }
            }
        }

        for &target in &targets {
            if let Some(path) = find_cycle(origin, target, &*self) {
                let path: Vec<String> = path.iter().map(Position::label).collect();
                debug!(
                    "{}: {:?} rejected: circular reference {} -> {}",
                    origin,
                    content,
                    origin,
                    path.join(" -> ")
                );
                if let Some(cell) = self.get_mut(id) {
                    cell.evaluated = messages::CIRCULAR_REFERENCE.to_string();
                }
                return;
            }
        }

        debug!("{}: set {:?} reading {} cells", origin, content, targets.len());
        self.replace_content(id, content, &targets);
        self.notify(id);
    }

    /// Same as writing empty content.
    pub fn clear_cell(&mut self, row: usize, col: usize) {
        self.set_content(row, col, "");
    }

    /// Change the color of a cell. Positions outside the sheet are ignored.
    pub fn recolor(&mut self, row: usize, col: usize, color: &str) {
        if let Some(cell) = self
            .id_at(Position::new(row, col))
            .and_then(|id| self.get_mut(id))
        {
            cell.recolor(color);
        }
    }

    /// Drop the old edges of `id`, wire it to `targets`, store `content`
    /// and evaluate.
    fn replace_content(&mut self, id: CellId, content: &str, targets: &[Position]) {
        self.detach_dependencies(id);
        let snapshot = self.attach_dependencies(id, targets);
        if let Some(cell) = self.get_mut(id) {
            cell.raw = content.to_string();
            cell.snapshot = snapshot;
            cell.evaluate();
        }
    }
}
