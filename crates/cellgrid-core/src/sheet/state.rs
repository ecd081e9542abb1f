use cellgrid_engine::engine::{Cell, CellId, DependencyGraph, Position};

use crate::config::{DEFAULT_COLOR, SheetConfig};

/// A rectangular grid of cells.
///
/// Cells live in an arena indexed by [`CellId`]; the matrix maps each
/// (row, column) slot to the id of the cell currently there. Observer edges
/// are ids, so cells can move between slots without rewiring.
#[derive(Clone, Debug)]
pub struct Sheet {
    /// Arena of cells. `None` marks a cell retired by a row/column delete.
    pub(crate) cells: Vec<Option<Cell>>,
    /// Retired slots, reused before the arena grows.
    pub(crate) free: Vec<CellId>,
    /// Row-major ids of the live cells.
    pub(crate) matrix: Vec<Vec<CellId>>,
    /// Column count, kept separately so a sheet with no rows keeps its width.
    pub(crate) width: usize,
    /// Color given to newly created cells.
    pub(crate) default_color: String,
}

impl Sheet {
    /// Create a sheet of `width` columns by `height` rows filled with empty
    /// white cells.
    pub fn new(width: usize, height: usize) -> Self {
        Self::build(width, height, DEFAULT_COLOR)
    }

    pub fn with_config(config: &SheetConfig) -> Self {
        Self::build(config.width, config.height, &config.default_color)
    }

    fn build(width: usize, height: usize, color: &str) -> Self {
        let mut sheet = Sheet {
            cells: Vec::with_capacity(width * height),
            free: Vec::new(),
            matrix: Vec::with_capacity(height),
            width,
            default_color: color.to_string(),
        };
        for row in 0..height {
            let ids = (0..width)
                .map(|col| sheet.alloc(Position::new(row, col)))
                .collect();
            sheet.matrix.push(ids);
        }
        sheet
    }

    pub fn rows(&self) -> usize {
        self.matrix.len()
    }

    pub fn cols(&self) -> usize {
        self.width
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.row < self.rows() && pos.col < self.cols()
    }

    /// The cell at (`row`, `col`), if inside the sheet.
    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.get(self.id_at(Position::new(row, col))?)
    }

    pub fn raw_content(&self, row: usize, col: usize) -> Option<&str> {
        self.cell(row, col).map(|c| c.raw.as_str())
    }

    pub fn evaluated_content(&self, row: usize, col: usize) -> Option<&str> {
        self.cell(row, col).map(|c| c.evaluated.as_str())
    }

    pub fn color(&self, row: usize, col: usize) -> Option<&str> {
        self.cell(row, col).map(|c| c.color.as_str())
    }

    /// Raw content of every cell, row-major.
    pub fn raw_matrix(&self) -> Vec<Vec<String>> {
        self.matrix
            .iter()
            .map(|row| {
                row.iter()
                    .map(|id| self.get(*id).map(|c| c.raw.clone()).unwrap_or_default())
                    .collect()
            })
            .collect()
    }

    /// Positions of the cells that read from (`row`, `col`).
    pub fn observers_of(&self, row: usize, col: usize) -> Vec<Position> {
        self.cell(row, col)
            .map(|cell| {
                cell.observers
                    .iter()
                    .filter_map(|id| self.get(*id).map(|c| c.position))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Positions (`row`, `col`) reads from.
    pub fn dependencies_of(&self, row: usize, col: usize) -> Vec<Position> {
        self.cell(row, col)
            .map(Cell::dependencies)
            .unwrap_or_default()
    }

    pub(crate) fn id_at(&self, pos: Position) -> Option<CellId> {
        self.matrix.get(pos.row)?.get(pos.col).copied()
    }

    pub(crate) fn get(&self, id: CellId) -> Option<&Cell> {
        self.cells.get(id.0)?.as_ref()
    }

    pub(crate) fn get_mut(&mut self, id: CellId) -> Option<&mut Cell> {
        self.cells.get_mut(id.0)?.as_mut()
    }

    /// Add a fresh empty cell to the arena, reusing a retired slot when
    /// there is one. The caller places its id in the matrix.
    pub(crate) fn alloc(&mut self, pos: Position) -> CellId {
        let cell = Cell::new(pos, &self.default_color);
        if let Some(id) = self.free.pop() {
            self.cells[id.0] = Some(cell);
            return id;
        }
        let id = CellId(self.cells.len());
        self.cells.push(Some(cell));
        id
    }

    /// Remove a cell from the arena, returning it. Its slot becomes free.
    pub(crate) fn retire(&mut self, id: CellId) -> Option<Cell> {
        let cell = self.cells.get_mut(id.0)?.take()?;
        self.free.push(id);
        Some(cell)
    }
}

impl DependencyGraph for Sheet {
    fn dependencies(&self, pos: Position) -> Vec<Position> {
        self.id_at(pos)
            .and_then(|id| self.get(id))
            .map(Cell::dependencies)
            .unwrap_or_default()
    }
}
