//! Renderer-agnostic heatmap plan.
//!
//! A [`Figure`] holds everything a backend needs to draw one layout diagram:
//! cell colors, tick labels, legend entries, and font sizes. Backends only
//! place what the plan describes.

use std::path::PathBuf;

use crate::compress::{self, RowLabel};
use crate::error::LayoutError;
use crate::grid::LayoutGrid;
use crate::layout::Layout;
use crate::palette::{self, Rgb};

/// Default grid width in steps.
pub const DEFAULT_NUM_COLS: usize = 16;

/// Default output folder for saved diagrams.
pub const DEFAULT_DEST_FOLDER: &str = "images";

/// Drawing parameters passed through to the output backend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Style {
    /// Width of the lines separating cells, in points.
    pub line_width: f32,
    /// Raster edge length of one cell, in pixels.
    pub cell_px: u32,
    /// Raster resolution used to convert points to pixels.
    pub dpi: u32,
}

impl Default for Style {
    fn default() -> Self {
        Style {
            line_width: 0.5,
            cell_px: 100,
            dpi: 100,
        }
    }
}

impl Style {
    /// Convert a size in points to pixels at this style's dpi.
    pub fn pt_to_px(&self, pt: f32) -> f32 {
        pt * self.dpi as f32 / 72.0
    }
}

/// Options for one render call.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub num_cols: usize,
    /// With a title the diagram is saved; without one it is displayed.
    pub title: Option<String>,
    /// Fold consecutive identical rows into one ranged row.
    pub compress_rows: bool,
    pub dest_folder: PathBuf,
    pub style: Style,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions {
            num_cols: DEFAULT_NUM_COLS,
            title: None,
            compress_rows: false,
            dest_folder: PathBuf::from(DEFAULT_DEST_FOLDER),
            style: Style::default(),
        }
    }
}

impl RenderOptions {
    /// Options seeded from a layout's own title, column count and compression flag.
    pub fn for_layout(layout: &Layout) -> RenderOptions {
        RenderOptions {
            num_cols: layout.num_cols().unwrap_or(DEFAULT_NUM_COLS),
            title: layout.title().map(String::from),
            compress_rows: layout.compress_rows(),
            ..RenderOptions::default()
        }
    }

    /// `{dest_folder}/{slug(title)}.{extension}`, or `None` when untitled.
    pub fn output_path(&self, extension: &str) -> Option<PathBuf> {
        self.title
            .as_deref()
            .map(|t| self.dest_folder.join(format!("{}.{}", slug(t), extension)))
    }
}

/// Lower-case the title and replace spaces with underscores.
pub fn slug(title: &str) -> String {
    title.to_lowercase().replace(' ', "_")
}

/// Font sizes in points, scaled by the number of grid columns.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontSizes {
    pub title: f32,
    pub axis_label: f32,
    pub major_tick: f32,
    pub minor_tick: f32,
}

impl FontSizes {
    pub fn for_columns(num_cols: usize) -> FontSizes {
        let n = num_cols as f32;
        FontSizes {
            title: 3.0 * n,
            axis_label: 2.0 * n,
            major_tick: n,
            minor_tick: (0.7 * n).floor(),
        }
    }
}

/// One legend swatch.
#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    pub label: String,
    pub color: Rgb,
}

/// A fully planned heatmap.
#[derive(Debug, Clone)]
pub struct Figure {
    pub title: Option<String>,
    pub nrows: usize,
    pub ncols: usize,
    /// Row-major indices into `legend`; `None` for cells past the end of the record.
    pub cells: Vec<Option<usize>>,
    /// Column ticks along the top, `+{offset}`.
    pub x_ticks: Vec<String>,
    /// Row ticks, one per drawn row.
    pub y_ticks: Vec<String>,
    pub y_label: &'static str,
    pub legend_title: &'static str,
    /// Legend swatches, top to bottom.
    pub legend: Vec<LegendEntry>,
    pub fonts: FontSizes,
    pub style: Style,
}

impl Figure {
    /// Build a layout's grid and plan its figure in one step.
    pub fn from_layout(layout: &Layout, options: &RenderOptions) -> Result<Figure, LayoutError> {
        let grid = LayoutGrid::build(layout, options.num_cols)?;
        Ok(Figure::plan(&grid, options))
    }

    /// Plan the heatmap for a grid.
    pub fn plan(grid: &LayoutGrid, options: &RenderOptions) -> Figure {
        let colors = palette::palette(grid.legend.len());
        let rows: Vec<RowLabel> = compress::row_labels(grid, options.compress_rows);
        let ncols = grid.columns.len();

        // Highest index on top, like a vertical colorbar.
        let top = grid.legend.len().saturating_sub(1);
        let cells = rows
            .iter()
            .flat_map(|r| grid.rows[r.row].cells.iter())
            .map(|c| c.map(|c| top - c.label))
            .collect();

        let legend = (0..grid.legend.len())
            .rev()
            .map(|i| LegendEntry {
                label: grid.legend.label(i).to_string(),
                color: colors[i],
            })
            .collect();

        Figure {
            title: options.title.clone(),
            nrows: rows.len(),
            ncols,
            cells,
            x_ticks: grid.columns.iter().map(|c| format!("+{c}")).collect(),
            y_ticks: rows.iter().map(|r| r.to_string()).collect(),
            y_label: "Buffer Index",
            legend_title: "Field",
            legend,
            fonts: FontSizes::for_columns(grid.num_cols),
            style: options.style,
        }
    }

    /// Legend entry of the cell at `(row, col)`, if occupied.
    pub fn entry(&self, row: usize, col: usize) -> Option<&LegendEntry> {
        self.cells[row * self.ncols + col].map(|i| &self.legend[i])
    }

    /// Fill color of the cell at `(row, col)`, if occupied.
    pub fn cell(&self, row: usize, col: usize) -> Option<Rgb> {
        self.entry(row, col).map(|e| e.color)
    }
}
