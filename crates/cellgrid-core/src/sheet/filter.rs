//! Column value listing for filter menus.

use indexmap::IndexSet;

use super::Sheet;

impl Sheet {
    /// Distinct evaluated values below the header at (`row`, `col`), in
    /// first-seen order. The scan stops at the first empty cell. Values are
    /// compared exactly, so `Boston` and `boston` are both listed.
    pub fn filter_list(&self, row: usize, col: usize) -> IndexSet<String> {
        self.column_below(row, col)
            .map(|(_, value)| value.to_string())
            .collect()
    }

    /// Rows under the header at (`row`, `col`) whose evaluated value equals
    /// `value`, using the same stopping rule as [`Sheet::filter_list`].
    pub fn filter_column(&self, value: &str, row: usize, col: usize) -> Vec<usize> {
        self.column_below(row, col)
            .filter(|(_, cell)| *cell == value)
            .map(|(row, _)| row)
            .collect()
    }

    fn column_below(&self, row: usize, col: usize) -> impl Iterator<Item = (usize, &str)> {
        let start = if row < self.rows() && col < self.cols() {
            row + 1
        } else {
            self.rows()
        };
        (start..self.rows())
            .map_while(move |r| match self.evaluated_content(r, col) {
                Some(value) if !value.is_empty() => Some((r, value)),
                _ => None,
            })
    }
}
