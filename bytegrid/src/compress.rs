use serde::Serialize;
use std::fmt;

use crate::grid::LayoutGrid;

/// A row kept in the rendered grid and the span of byte offsets it stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RowLabel {
    /// Index of the kept row in [`LayoutGrid::rows`].
    pub row: usize,
    /// Offset of the kept row.
    pub start: usize,
    /// Offset of the last identical row folded into it; equals `start` if none.
    pub end: usize,
}

impl RowLabel {
    pub fn is_range(&self) -> bool {
        self.start != self.end
    }
}

impl fmt::Display for RowLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_range() {
            write!(f, "{} - {}", self.start, self.end)
        } else {
            write!(f, "{}", self.start)
        }
    }
}

/// One label per row, no compression.
pub fn all_rows(grid: &LayoutGrid) -> Vec<RowLabel> {
    grid.rows
        .iter()
        .enumerate()
        .map(|(i, r)| RowLabel {
            row: i,
            start: r.offset,
            end: r.offset,
        })
        .collect()
}

/// Drop every row whose labels repeat the row directly above it.
///
/// The surviving row of each run is labeled with the range of offsets the
/// run covered. The first row always survives.
pub fn compress_rows(grid: &LayoutGrid) -> Vec<RowLabel> {
    let mut kept: Vec<RowLabel> = Vec::with_capacity(grid.rows.len());
    for (i, row) in grid.rows.iter().enumerate() {
        match kept.last_mut() {
            Some(last) if row.same_labels(&grid.rows[i - 1]) => last.end = row.offset,
            _ => kept.push(RowLabel {
                row: i,
                start: row.offset,
                end: row.offset,
            }),
        }
    }
    kept
}

/// Row labels for a grid, compressed or not.
pub fn row_labels(grid: &LayoutGrid, compress: bool) -> Vec<RowLabel> {
    if compress {
        compress_rows(grid)
    } else {
        all_rows(grid)
    }
}
