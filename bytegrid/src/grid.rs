use serde::Serialize;
use smallvec::SmallVec;
use tracing::debug;

use crate::error::LayoutError;
use crate::layout::Layout;
use crate::legend::LabelIndex;

/// One occupied slot in the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GridCell {
    /// Index into the grid's [`LabelIndex`].
    pub label: usize,
    /// Trailing cell of a field whose size is not a multiple of the step.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub partial: bool,
}

/// A row of the pivoted grid, keyed by the byte offset of its first cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GridRow {
    pub offset: usize,
    /// One entry per grid column; `None` past the end of the record.
    pub cells: SmallVec<[Option<GridCell>; 16]>,
}

impl GridRow {
    /// Whether two rows show the same label sequence.
    pub fn same_labels(&self, other: &GridRow) -> bool {
        self.cells.len() == other.cells.len()
            && self
                .cells
                .iter()
                .zip(other.cells.iter())
                .all(|(a, b)| a.map(|c| c.label) == b.map(|c| c.label))
    }
}

/// A layout reshaped into rows of `num_cols` step-sized cells.
#[derive(Debug, Clone, Serialize)]
pub struct LayoutGrid {
    pub step: usize,
    pub num_cols: usize,
    /// Column keys: the byte offset within a row at the end of each column.
    pub columns: Vec<usize>,
    pub rows: Vec<GridRow>,
    pub legend: LabelIndex,
}

impl LayoutGrid {
    /// Expand a layout into cells and pivot them into a row-major grid.
    ///
    /// Cell `i` lands in row `floor(i / num_cols) * num_cols * step` and
    /// column `((i mod num_cols) + 1) * step`.
    pub fn build(layout: &Layout, num_cols: usize) -> Result<LayoutGrid, LayoutError> {
        if num_cols == 0 {
            return Err(LayoutError::InvalidColumns(num_cols));
        }

        let step = layout.step();
        let cells = layout.cells();
        let field_labels: Vec<String> = layout.fields().iter().map(|f| f.label()).collect();
        let legend = LabelIndex::from_labels(cells.iter().map(|c| field_labels[c.field].as_str()));

        // Only columns that receive at least one cell exist in the pivot.
        let ncols = num_cols.min(cells.len());
        let columns: Vec<usize> = (1..=ncols).map(|c| c * step).collect();

        let mut rows: Vec<GridRow> = Vec::with_capacity(cells.len().div_ceil(num_cols));
        for chunk in cells.chunks(num_cols) {
            let offset = rows.len() * num_cols * step;
            let mut row_cells: SmallVec<[Option<GridCell>; 16]> = SmallVec::from_elem(None, ncols);
            for (col, cell) in chunk.iter().enumerate() {
                let label = legend
                    .index_of(&field_labels[cell.field])
                    .expect("every cell label is in the legend");
                row_cells[col] = Some(GridCell {
                    label,
                    partial: cell.partial,
                });
            }
            rows.push(GridRow {
                offset,
                cells: row_cells,
            });
        }

        debug!(
            step,
            num_cols,
            rows = rows.len(),
            cells = cells.len(),
            labels = legend.len(),
            "built layout grid"
        );

        Ok(LayoutGrid {
            step,
            num_cols,
            columns,
            rows,
            legend,
        })
    }

    /// `(rows, columns)` of the pivoted table.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows.len(), self.columns.len())
    }

    /// Label of the cell at `(row, col)`, if occupied.
    pub fn label_at(&self, row: usize, col: usize) -> Option<&str> {
        self.rows[row].cells[col].map(|c| self.legend.label(c.label))
    }

    /// All occupied cell labels in row-major order.
    pub fn cell_labels(&self) -> Vec<&str> {
        self.rows
            .iter()
            .flat_map(|r| r.cells.iter().flatten())
            .map(|c| self.legend.label(c.label))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_equal_fields() {
        let layout = Layout::from_fields([("a", "T", 4), ("b", "T", 4)]).unwrap();
        let grid = LayoutGrid::build(&layout, 2).unwrap();
        assert_eq!(grid.step, 4);
        assert_eq!(grid.shape(), (1, 2));
        assert_eq!(grid.columns, vec![4, 8]);
        assert_eq!(grid.rows[0].offset, 0);
        assert_eq!(grid.cell_labels(), vec!["a: T", "b: T"]);
    }

    #[test]
    fn single_cell() {
        let layout = Layout::from_fields([("a", "T", 8)]).unwrap();
        let grid = LayoutGrid::build(&layout, 4).unwrap();
        assert_eq!(grid.step, 8);
        assert_eq!(grid.shape(), (1, 1));
        assert_eq!(grid.label_at(0, 0), Some("a: T"));
    }

    #[test]
    fn zero_columns_rejected() {
        let layout = Layout::from_fields([("a", "T", 8)]).unwrap();
        assert!(matches!(
            LayoutGrid::build(&layout, 0),
            Err(LayoutError::InvalidColumns(0))
        ));
    }

    #[test]
    fn short_last_row_is_padded() {
        let layout = Layout::from_fields([("a", "u8", 1), ("b", "u32", 4)]).unwrap();
        let grid = LayoutGrid::build(&layout, 4).unwrap();
        assert_eq!(grid.shape(), (2, 4));
        assert_eq!(grid.rows[1].offset, 4);
        assert_eq!(grid.label_at(1, 0), Some("b: u32"));
        assert_eq!(grid.label_at(1, 1), None);
    }

    #[test]
    fn row_offsets_are_multiples_of_row_width() {
        let layout = Layout::from_fields([("a", "[u8; 40]", 40), ("b", "u16", 2)]).unwrap();
        let grid = LayoutGrid::build(&layout, 3).unwrap();
        let offsets: Vec<usize> = grid.rows.iter().map(|r| r.offset).collect();
        assert_eq!(offsets, vec![0, 6, 12, 18, 24, 30, 36]);
    }

    #[test]
    fn legend_indices_reverse_declaration() {
        let layout = Layout::from_fields([("a", "u8", 1), ("b", "u8", 1), ("c", "u8", 1)]).unwrap();
        let grid = LayoutGrid::build(&layout, 16).unwrap();
        let labels: Vec<usize> = grid.rows[0].cells.iter().flatten().map(|c| c.label).collect();
        assert_eq!(labels, vec![2, 1, 0]);
    }

    #[test]
    fn partial_cell_is_marked() {
        let layout = Layout::from_fields([("a", "u16", 2), ("b", "[u8; 3]", 3)]).unwrap();
        let grid = LayoutGrid::build(&layout, 8).unwrap();
        let partial: Vec<bool> = grid.rows[0].cells.iter().flatten().map(|c| c.partial).collect();
        assert_eq!(partial, vec![false, false, true]);
    }
}
