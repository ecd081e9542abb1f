//! Row and column insertion and deletion.
//!
//! Cells keep their ids when they move; only their `position` and the
//! formula text of the cells observing them change. Moves run from the far
//! end toward the edit point on insert and from the edit point outward on
//! delete, so a label is never rewritten onto one that has not moved yet.

use cellgrid_engine::engine::{CellId, Position, ScanMode, scan_calls};
use log::debug;

use super::Sheet;
use crate::error::{Result, SheetError};

/// Direction of a structural edit.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Axis {
    Row,
    Column,
}

impl Axis {
    /// The coordinate of `pos` along this axis.
    fn coord(self, pos: Position) -> usize {
        match self {
            Axis::Row => pos.row,
            Axis::Column => pos.col,
        }
    }

    /// `pos` with its coordinate along this axis replaced.
    fn with_coord(self, pos: Position, coord: usize) -> Position {
        match self {
            Axis::Row => Position::new(coord, pos.col),
            Axis::Column => Position::new(pos.row, coord),
        }
    }

    fn len(self, sheet: &Sheet) -> usize {
        match self {
            Axis::Row => sheet.rows(),
            Axis::Column => sheet.cols(),
        }
    }

    fn out_of_range(self, index: usize, sheet: &Sheet) -> SheetError {
        match self {
            Axis::Row => SheetError::RowOutOfRange {
                index,
                rows: sheet.rows(),
            },
            Axis::Column => SheetError::ColumnOutOfRange {
                index,
                cols: sheet.cols(),
            },
        }
    }
}

impl Sheet {
    /// Insert an empty row above row `index`. `index == rows()` appends.
    pub fn add_row(&mut self, index: usize) -> Result<()> {
        self.insert_line(Axis::Row, index)
    }

    /// Insert an empty column left of column `index`. `index == cols()`
    /// appends.
    pub fn add_column(&mut self, index: usize) -> Result<()> {
        self.insert_line(Axis::Column, index)
    }

    /// Delete row `index`. Formulas that read from it become
    /// invalid-reference literals, as do their dependents.
    pub fn delete_row(&mut self, index: usize) -> Result<()> {
        self.delete_line(Axis::Row, index)
    }

    /// Delete column `index`, invalidating formulas that read from it.
    pub fn delete_column(&mut self, index: usize) -> Result<()> {
        self.delete_line(Axis::Column, index)
    }

    /// Generic insert operation for row or column
    fn insert_line(&mut self, axis: Axis, index: usize) -> Result<()> {
        if index > axis.len(self) {
            return Err(axis.out_of_range(index, self));
        }

        let mut moved = self.cells_where(|pos| axis.coord(pos) >= index);
        moved.sort_by_key(|(_, pos)| std::cmp::Reverse(axis.coord(*pos)));
        for (id, pos) in moved {
            self.relocate(id, axis.with_coord(pos, axis.coord(pos) + 1));
        }

        match axis {
            Axis::Row => {
                let ids = (0..self.cols())
                    .map(|col| self.alloc(Position::new(index, col)))
                    .collect();
                self.matrix.insert(index, ids);
            }
            Axis::Column => {
                for row in 0..self.rows() {
                    let id = self.alloc(Position::new(row, index));
                    self.matrix[row].insert(index, id);
                }
                self.width += 1;
            }
        }

        debug!(
            "Inserted {:?} {}; sheet is now {}x{}",
            axis,
            index,
            self.rows(),
            self.cols()
        );
        self.extend_ranges(axis, index);
        Ok(())
    }

    /// Generic delete operation for row or column
    fn delete_line(&mut self, axis: Axis, index: usize) -> Result<()> {
        if index >= axis.len(self) {
            return Err(axis.out_of_range(index, self));
        }

        let removed: Vec<CellId> = self
            .cells_where(|pos| axis.coord(pos) == index)
            .into_iter()
            .map(|(id, _)| id)
            .collect();

        let mut moved = self.cells_where(|pos| axis.coord(pos) > index);
        moved.sort_by_key(|(_, pos)| axis.coord(*pos));
        for (id, pos) in moved {
            self.relocate(id, axis.with_coord(pos, axis.coord(pos) - 1));
        }

        match axis {
            Axis::Row => {
                self.matrix.remove(index);
            }
            Axis::Column => {
                for ids in &mut self.matrix {
                    ids.remove(index);
                }
                self.width -= 1;
            }
        }

        let mut orphaned = Vec::new();
        for id in removed {
            self.detach_dependencies(id);
            if let Some(cell) = self.retire(id) {
                orphaned.extend(cell.observers);
            }
        }

        debug!(
            "Deleted {:?} {}; invalidating {} dependents",
            axis,
            index,
            orphaned.len()
        );
        self.invalidate_observers(orphaned);
        Ok(())
    }

    /// Live cells whose slot satisfies `keep`, row-major.
    fn cells_where(&self, keep: impl Fn(Position) -> bool) -> Vec<(CellId, Position)> {
        let mut out = Vec::new();
        for (row, ids) in self.matrix.iter().enumerate() {
            for (col, id) in ids.iter().enumerate() {
                let pos = Position::new(row, col);
                if keep(pos) {
                    out.push((*id, pos));
                }
            }
        }
        out
    }

    /// Move a cell to `new`, rewriting the formulas that read from it.
    fn relocate(&mut self, id: CellId, new: Position) {
        let Some(cell) = self.get(id) else {
            return;
        };
        let prev = cell.position;
        let observers = cell.observers.clone();

        for observer in observers {
            if let Some(cell) = self.get_mut(observer) {
                cell.update_reference(prev, new);
            }
        }
        if let Some(cell) = self.get_mut(id) {
            cell.position = new;
        }
    }

    /// After inserting line `index`, formulas with a range spanning it start
    /// reading the new cells inside that range. Lists are left alone.
    fn extend_ranges(&mut self, axis: Axis, index: usize) {
        let mut wiring: Vec<(CellId, Vec<Position>)> = Vec::new();

        for (id, _) in self.cells_where(|_| true) {
            let Some(cell) = self.get(id) else {
                continue;
            };
            if cell.snapshot.is_empty() {
                continue;
            }

            let mut added = Vec::new();
            for call in scan_calls(&cell.raw, ScanMode::Strict) {
                let Some((a, b)) = call.range_corners() else {
                    continue;
                };
                let (lo, hi) = (
                    axis.coord(a).min(axis.coord(b)),
                    axis.coord(a).max(axis.coord(b)),
                );
                if index < lo || index > hi {
                    continue;
                }
                for pos in Position::rect(a, b) {
                    if axis.coord(pos) == index
                        && self.contains(pos)
                        && self.id_at(pos) != Some(id)
                        && !added.contains(&pos)
                    {
                        added.push(pos);
                    }
                }
            }
            if !added.is_empty() {
                wiring.push((id, added));
            }
        }

        for (id, positions) in wiring {
            let seeded = self.attach_dependencies(id, &positions);
            if let Some(cell) = self.get_mut(id) {
                debug!("{}: range extended over {} new cells", cell.position, seeded.len());
                cell.snapshot.extend(seeded);
                cell.evaluate();
            }
            self.notify(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cellgrid_engine::engine::messages;

    fn eval(sheet: &Sheet, row: usize, col: usize) -> &str {
        sheet.evaluated_content(row, col).unwrap()
    }

    fn raw(sheet: &Sheet, row: usize, col: usize) -> &str {
        sheet.raw_content(row, col).unwrap()
    }

    fn assert_positions_consistent(sheet: &Sheet) {
        for row in 0..sheet.rows() {
            for col in 0..sheet.cols() {
                assert_eq!(sheet.cell(row, col).unwrap().position, Position::new(row, col));
            }
        }
    }

    fn column_a(values: &[&str]) -> Sheet {
        let mut sheet = Sheet::new(100, 100);
        for (row, value) in values.iter().enumerate() {
            sheet.set_content(row, 0, value);
        }
        sheet
    }

    #[test]
    fn test_dimensions_track_edits() {
        let mut sheet = Sheet::new(100, 100);
        sheet.delete_column(0).unwrap();
        sheet.delete_column(0).unwrap();
        sheet.add_row(100).unwrap();
        sheet.add_row(0).unwrap();
        sheet.delete_row(5).unwrap();
        assert_eq!(sheet.cols(), 98);
        assert_eq!(sheet.rows(), 101);
        assert_positions_consistent(&sheet);
    }

    #[test]
    fn test_out_of_range_edits() {
        let mut sheet = Sheet::new(3, 2);
        assert_eq!(
            sheet.delete_row(2),
            Err(SheetError::RowOutOfRange { index: 2, rows: 2 })
        );
        assert_eq!(
            sheet.add_column(4),
            Err(SheetError::ColumnOutOfRange { index: 4, cols: 3 })
        );
        assert_eq!((sheet.rows(), sheet.cols()), (2, 3));
    }

    #[test]
    fn test_delete_row_without_reference() {
        let mut sheet = column_a(&["0", "1", "2", "3"]);
        sheet.delete_row(2).unwrap();
        assert_eq!(raw(&sheet, 0, 0), "0");
        assert_eq!(raw(&sheet, 1, 0), "1");
        assert_eq!(raw(&sheet, 2, 0), "3");
        assert_eq!(eval(&sheet, 2, 0), "3");
        assert_eq!(raw(&sheet, 3, 0), "");
        assert_positions_consistent(&sheet);
    }

    #[test]
    fn test_delete_end_row() {
        let mut sheet = Sheet::new(100, 100);
        sheet.set_content(98, 0, "0");
        sheet.set_content(99, 0, "1");
        sheet.delete_row(99).unwrap();
        assert_eq!(raw(&sheet, 98, 0), "0");
        assert_eq!(sheet.rows(), 99);
    }

    #[test]
    fn test_delete_row_rewrites_reference() {
        let mut sheet = column_a(&["= REF(A3) + 1", "1", "2", "3"]);
        sheet.delete_row(1).unwrap();
        assert_eq!(raw(&sheet, 0, 0), "= REF(A2) + 1");
        assert_eq!(eval(&sheet, 0, 0), "3");
        assert_eq!(raw(&sheet, 1, 0), "2");
        assert_eq!(raw(&sheet, 2, 0), "3");
        assert_eq!(raw(&sheet, 3, 0), "");

        sheet.set_content(1, 0, "41");
        assert_eq!(eval(&sheet, 0, 0), "42");
    }

    #[test]
    fn test_delete_row_leaves_unrelated_reference() {
        let mut sheet = column_a(&["= REF(B1) + 1", "1", "2", "3"]);
        sheet.delete_row(1).unwrap();
        assert_eq!(raw(&sheet, 0, 0), "= REF(B1) + 1");
        assert_eq!(raw(&sheet, 1, 0), "2");
    }

    #[test]
    fn test_delete_directly_referenced_row() {
        let mut sheet = column_a(&["= REF(A2) + 1", "1", "2", "3"]);
        sheet.delete_row(1).unwrap();
        assert_eq!(raw(&sheet, 0, 0), messages::INVALID_REFERENCE);
        assert_eq!(eval(&sheet, 0, 0), messages::INVALID_REFERENCE);
        assert!(sheet.dependencies_of(0, 0).is_empty());
        assert_eq!(raw(&sheet, 1, 0), "2");
        assert_eq!(raw(&sheet, 2, 0), "3");
    }

    #[test]
    fn test_delete_cascades_through_dependents() {
        let mut sheet = column_a(&["= REF(A2) + 1", "= REF(A3)", "2", "3"]);
        assert_eq!(eval(&sheet, 0, 0), "3");
        sheet.delete_row(2).unwrap();
        for row in 0..2 {
            assert_eq!(raw(&sheet, row, 0), messages::INVALID_REFERENCE);
            assert_eq!(eval(&sheet, row, 0), messages::INVALID_REFERENCE);
        }
        assert_eq!(raw(&sheet, 2, 0), "3");
        assert_eq!(eval(&sheet, 3, 0), "");
        assert!(sheet.observers_of(2, 0).is_empty());
    }

    #[test]
    fn test_invalidated_cell_no_longer_follows_old_target() {
        let mut sheet = column_a(&["= REF(A2) + SUM(B1)", "1"]);
        sheet.delete_row(1).unwrap();
        assert!(sheet.observers_of(0, 1).is_empty());
        sheet.set_content(0, 1, "7");
        assert_eq!(eval(&sheet, 0, 0), messages::INVALID_REFERENCE);
    }

    #[test]
    fn test_delete_row_inside_list_or_range_invalidates() {
        for formula in [
            "= SUM(A2, A3, A4) + 1",
            "= AVG(A2, A3, A4) + 1",
            "= SUM(A2:C4) + 1",
            "= AVG(A2:C4) + 1",
        ] {
            for deleted in [1, 2] {
                let mut sheet = column_a(&[formula, "1"]);
                sheet.delete_row(deleted).unwrap();
                assert_eq!(raw(&sheet, 0, 0), messages::INVALID_REFERENCE, "{formula}");
            }
        }
    }

    #[test]
    fn test_delete_row_above_shifts_list_and_range() {
        let mut sheet = Sheet::new(100, 100);
        sheet.set_content(1, 0, "= SUM(A3, A4, A5) + 1");
        sheet.set_content(2, 1, "= SUM(A4:A6) + 1");
        sheet.delete_row(0).unwrap();
        assert_eq!(raw(&sheet, 0, 0), "= SUM(A2, A3, A4) + 1");
        assert_eq!(eval(&sheet, 0, 0), "1");
        assert_eq!(raw(&sheet, 1, 1), "= SUM(A3:A5) + 1");
        assert_eq!(eval(&sheet, 1, 1), "1");
        assert_eq!(raw(&sheet, 1, 0), "");
        assert_positions_consistent(&sheet);
    }

    #[test]
    fn test_delete_column_rewrites_reference() {
        let mut sheet = Sheet::new(100, 100);
        sheet.set_content(0, 0, "= REF(C1) + 1");
        sheet.set_content(0, 1, "1");
        sheet.set_content(0, 2, "2");
        sheet.set_content(0, 3, "3");
        sheet.delete_column(1).unwrap();
        assert_eq!(raw(&sheet, 0, 0), "= REF(B1) + 1");
        assert_eq!(eval(&sheet, 0, 0), "3");
        assert_eq!(raw(&sheet, 0, 1), "2");
        assert_eq!(raw(&sheet, 0, 2), "3");
        assert_eq!(raw(&sheet, 0, 3), "");
        assert_positions_consistent(&sheet);
    }

    #[test]
    fn test_delete_directly_referenced_column() {
        for formula in ["= SUM(C1, D1, E1) + 1", "= SUM(C1:E1) + 1", "= REF(C1)"] {
            let mut sheet = Sheet::new(100, 100);
            sheet.set_content(0, 0, formula);
            sheet.set_content(0, 1, "1");
            sheet.set_content(0, 2, "2");
            sheet.set_content(0, 3, "3");
            sheet.delete_column(2).unwrap();
            assert_eq!(raw(&sheet, 0, 0), messages::INVALID_REFERENCE);
            assert_eq!(eval(&sheet, 0, 0), messages::INVALID_REFERENCE);
            assert_eq!(raw(&sheet, 0, 1), "1");
            assert_eq!(raw(&sheet, 0, 2), "3");
            assert_eq!(raw(&sheet, 0, 3), "");
        }
    }

    #[test]
    fn test_delete_column_cascade() {
        let mut sheet = Sheet::new(100, 100);
        sheet.set_content(0, 0, "= REF(B1) + 1");
        sheet.set_content(0, 1, "= REF(C1)");
        sheet.set_content(0, 2, "2");
        sheet.set_content(0, 3, "3");
        sheet.delete_column(2).unwrap();
        assert_eq!(raw(&sheet, 0, 0), messages::INVALID_REFERENCE);
        assert_eq!(raw(&sheet, 0, 1), messages::INVALID_REFERENCE);
        assert_eq!(raw(&sheet, 0, 2), "3");
    }

    #[test]
    fn test_add_row_rewrites_references() {
        let mut sheet = column_a(&["= REF(A2) + 1", "= REF(A3)", "2", "3"]);
        sheet.add_row(1).unwrap();
        assert_eq!(raw(&sheet, 0, 0), "= REF(A3) + 1");
        assert_eq!(eval(&sheet, 0, 0), "3");
        assert_eq!(raw(&sheet, 1, 0), "");
        assert_eq!(raw(&sheet, 2, 0), "= REF(A4)");
        assert_eq!(eval(&sheet, 2, 0), "2");
        assert_eq!(raw(&sheet, 3, 0), "2");
        assert_eq!(raw(&sheet, 4, 0), "3");
        assert_positions_consistent(&sheet);

        sheet.set_content(3, 0, "9");
        assert_eq!(eval(&sheet, 0, 0), "10");
    }

    #[test]
    fn test_add_row_at_top_and_end() {
        let mut sheet = column_a(&["0", "1", "2", "3"]);
        sheet.add_row(0).unwrap();
        assert_eq!(raw(&sheet, 0, 0), "");
        assert_eq!(raw(&sheet, 1, 0), "0");
        assert_eq!(raw(&sheet, 4, 0), "3");

        let mut sheet = Sheet::new(100, 100);
        sheet.set_content(98, 0, "0");
        sheet.set_content(99, 0, "1");
        sheet.add_row(99).unwrap();
        assert_eq!(raw(&sheet, 98, 0), "0");
        assert_eq!(raw(&sheet, 99, 0), "");
        assert_eq!(raw(&sheet, 100, 0), "1");
        assert_eq!(eval(&sheet, 100, 0), "1");
    }

    #[test]
    fn test_add_row_above_shifts_lists_and_ranges() {
        for (before, after, expected) in [
            ("= SUM(A3, A4, A5) + 1", "= SUM(A4, A5, A6) + 1", "7"),
            ("= SUM(A3, B4, C5) + 1", "= SUM(A4, B5, C6) + 1", "32"),
            ("= SUM(A3:A5) + 1", "= SUM(A4:A6) + 1", "7"),
            ("= AVG(A3, A4, A5) + 1", "= AVG(A4, A5, A6) + 1", "3"),
            ("= AVG(A3:A5) + 1", "= AVG(A4:A6) + 1", "3"),
        ] {
            let mut sheet = Sheet::new(100, 100);
            sheet.set_content(1, 0, before);
            assert_eq!(eval(&sheet, 1, 0), "1");
            let values = [
                (2, 0, "1"),
                (3, 0, "2"),
                (4, 0, "3"),
                (3, 1, "10"),
                (4, 2, "20"),
            ];
            for (row, col, value) in values {
                sheet.set_content(row, col, value);
            }
            assert_eq!(eval(&sheet, 1, 0), expected, "{before}");

            sheet.add_row(0).unwrap();
            assert_eq!(raw(&sheet, 1, 0), "");
            assert_eq!(raw(&sheet, 2, 0), after);
            assert_eq!(eval(&sheet, 2, 0), expected, "{after}");

            sheet.set_content(3, 0, "5");
            assert_ne!(eval(&sheet, 2, 0), expected, "{after} should follow A4");
        }
    }

    #[test]
    fn test_add_row_inside_list_does_not_extend_it() {
        let mut sheet = Sheet::new(100, 100);
        sheet.set_content(1, 0, "= SUM(A3, A4, A5) + 1");
        sheet.add_row(3).unwrap();
        assert_eq!(raw(&sheet, 1, 0), "= SUM(A3, A5, A6) + 1");
        assert!(sheet.observers_of(3, 0).is_empty());
    }

    #[test]
    fn test_add_row_inside_range_extends_it() {
        let mut sheet = Sheet::new(100, 100);
        sheet.set_content(1, 0, "= SUM(A3:A5)");
        sheet.add_row(3).unwrap();
        assert_eq!(sheet.observers_of(3, 0), vec![Position::new(1, 0)]);
        for row in 2..6 {
            sheet.set_content(row, 0, "1");
        }
        assert_eq!(raw(&sheet, 1, 0), "= SUM(A3:A6)");
        assert_eq!(eval(&sheet, 1, 0), "4");
    }

    #[test]
    fn test_add_column_inside_range_extends_it() {
        let mut sheet = Sheet::new(100, 100);
        sheet.set_content(0, 0, "= SUM(B1:D1) + 1");
        sheet.add_column(2).unwrap();
        for col in 1..5 {
            sheet.set_content(0, col, "1");
        }
        assert_eq!(raw(&sheet, 0, 0), "= SUM(B1:E1) + 1");
        assert_eq!(eval(&sheet, 0, 0), "5");
    }

    #[test]
    fn test_add_column_inside_list() {
        let mut sheet = Sheet::new(100, 100);
        sheet.set_content(0, 0, "= SUM(B1, C1, D1) + 1");
        sheet.set_content(0, 1, "1");
        sheet.set_content(0, 2, "2");
        sheet.set_content(0, 3, "3");
        sheet.add_column(2).unwrap();
        assert_eq!(raw(&sheet, 0, 0), "= SUM(B1, D1, E1) + 1");
        assert_eq!(eval(&sheet, 0, 0), "7");
        assert_eq!(raw(&sheet, 0, 1), "1");
        assert_eq!(raw(&sheet, 0, 2), "");
        assert_eq!(raw(&sheet, 0, 3), "2");
        assert_eq!(raw(&sheet, 0, 4), "3");
        assert_positions_consistent(&sheet);
    }

    #[test]
    fn test_add_column_at_left_edge() {
        let mut sheet = Sheet::new(100, 100);
        sheet.set_content(0, 0, "0");
        sheet.set_content(0, 1, "= REF(A1) + 1");
        sheet.add_column(0).unwrap();
        assert_eq!(raw(&sheet, 0, 0), "");
        assert_eq!(raw(&sheet, 0, 1), "0");
        assert_eq!(raw(&sheet, 0, 2), "= REF(B1) + 1");
        assert_eq!(sheet.cols(), 101);
    }

    #[test]
    fn test_reference_to_new_row() {
        let mut sheet = Sheet::new(100, 100);
        sheet.add_row(1).unwrap();
        sheet.set_content(1, 0, "= REF(B2)");
        sheet.set_content(1, 1, "5");
        assert_eq!(eval(&sheet, 1, 0), "5");
    }

    #[test]
    fn test_arena_reuses_retired_slots() {
        let mut sheet = Sheet::new(4, 4);
        for _ in 0..10 {
            sheet.add_row(1).unwrap();
            sheet.delete_row(1).unwrap();
            sheet.add_column(2).unwrap();
            sheet.delete_column(0).unwrap();
        }
        assert_eq!(sheet.cells.len(), 20);
        assert_eq!(sheet.cells.iter().flatten().count(), 16);
        assert_positions_consistent(&sheet);

        sheet.set_content(0, 0, "= REF(B2) * 2");
        sheet.set_content(1, 1, "21");
        assert_eq!(eval(&sheet, 0, 0), "42");
        assert_eq!(sheet.observers_of(1, 1), vec![Position::new(0, 0)]);
    }

    #[test]
    fn test_new_cells_use_configured_color() {
        let config = crate::SheetConfig {
            width: 2,
            height: 2,
            default_color: "#123456".to_string(),
        };
        let mut sheet = Sheet::with_config(&config);
        sheet.add_column(1).unwrap();
        assert_eq!(sheet.color(1, 1), Some("#123456"));
    }
}
