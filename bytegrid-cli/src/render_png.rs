//! PNG rendering for layout figures.

use anyhow::{Context, Result};
use bytegrid::figure::Figure;
use bytegrid::palette::Rgb;
use font8x8::{UnicodeFonts, BASIC_FONTS};
use std::path::Path;

/// Bitmap glyph edge in font pixels.
const GLYPH: usize = 8;

/// Write a figure as an RGB PNG file.
pub fn write_figure_png(fig: &Figure, path: &Path) -> Result<()> {
    let img = figure_to_image(fig);
    write_rgb_png(path, &img.pixels, img.width, img.height)
}

/// Pixel placement of every figure element.
#[derive(Debug, Clone, Copy)]
pub struct Geometry {
    pub width: usize,
    pub height: usize,
    pub grid_x: usize,
    pub grid_y: usize,
    pub cell: usize,
    pub line: usize,
    pub pad: usize,
    pub title_scale: usize,
    pub label_scale: usize,
    pub tick_scale: usize,
    pub minor_scale: usize,
    pub bar_x: usize,
    pub bar_w: usize,
}

/// Integer glyph magnification closest to a pixel font size.
fn glyph_scale(px: f32) -> usize {
    ((px / GLYPH as f32).round() as usize).max(1)
}

fn text_width(text: &str, scale: usize) -> usize {
    text.chars().count() * GLYPH * scale
}

impl Geometry {
    pub fn for_figure(fig: &Figure) -> Geometry {
        let style = fig.style;
        let cell = style.cell_px.max(1) as usize;
        let line = (style.pt_to_px(style.line_width).round() as usize).min(cell / 4);
        let pad = (cell / 5).max(4);

        let title_scale = glyph_scale(style.pt_to_px(fig.fonts.title));
        let label_scale = glyph_scale(style.pt_to_px(fig.fonts.axis_label));
        let tick_scale = glyph_scale(style.pt_to_px(fig.fonts.major_tick));
        let minor_scale = glyph_scale(style.pt_to_px(fig.fonts.minor_tick));

        let title_h = match &fig.title {
            Some(_) => GLYPH * title_scale + pad,
            None => 0,
        };
        let xtick_h = GLYPH * tick_scale + pad;
        let ylabel_w = GLYPH * label_scale + pad;
        let ytick_w = fig
            .y_ticks
            .iter()
            .map(|t| text_width(t, tick_scale))
            .max()
            .unwrap_or(0)
            + pad;

        let grid_x = pad + ylabel_w + ytick_w;
        let grid_y = pad + title_h + xtick_h;
        let grid_w = fig.ncols * cell;
        let grid_h = fig.nrows * cell;

        let bar_x = grid_x + grid_w + 2 * pad;
        let bar_w = (cell / 2).max(1);
        let legend_w = fig
            .legend
            .iter()
            .map(|e| text_width(&e.label, tick_scale))
            .chain(std::iter::once(text_width(fig.legend_title, minor_scale)))
            .max()
            .unwrap_or(0);

        let title_w = fig
            .title
            .as_deref()
            .map(|t| text_width(t, title_scale))
            .unwrap_or(0);
        let ylabel_len = text_width(fig.y_label, label_scale);

        let width = (bar_x + bar_w + pad / 2 + legend_w + pad).max(grid_x + title_w + pad);
        let height = grid_y + grid_h.max(ylabel_len) + pad;

        Geometry {
            width,
            height,
            grid_x,
            grid_y,
            cell,
            line,
            pad,
            title_scale,
            label_scale,
            tick_scale,
            minor_scale,
            bar_x,
            bar_w,
        }
    }

    /// Center pixel of grid cell `(row, col)`.
    pub fn cell_center(&self, row: usize, col: usize) -> (usize, usize) {
        (
            self.grid_x + col * self.cell + self.cell / 2,
            self.grid_y + row * self.cell + self.cell / 2,
        )
    }
}

pub struct RgbImage {
    pub pixels: Vec<u8>,
    pub width: usize,
    pub height: usize,
}

impl RgbImage {
    fn new(width: usize, height: usize) -> RgbImage {
        RgbImage {
            pixels: vec![255u8; width * height * 3], // white background
            width,
            height,
        }
    }

    fn put(&mut self, x: usize, y: usize, color: Rgb) {
        if x < self.width && y < self.height {
            let i = (y * self.width + x) * 3;
            self.pixels[i..i + 3].copy_from_slice(&[color.0, color.1, color.2]);
        }
    }

    pub fn get(&self, x: usize, y: usize) -> Rgb {
        let i = (y * self.width + x) * 3;
        Rgb(self.pixels[i], self.pixels[i + 1], self.pixels[i + 2])
    }

    fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: Rgb) {
        for py in y..(y + h).min(self.height) {
            for px in x..(x + w).min(self.width) {
                self.put(px, py, color);
            }
        }
    }

    /// Draw text with its top-left corner at `(x, y)`.
    fn draw_text(&mut self, text: &str, x: usize, y: usize, scale: usize, color: Rgb) {
        for (k, ch) in text.chars().enumerate() {
            let glyph = BASIC_FONTS.get(ch).unwrap_or([0; GLYPH]);
            let ox = x + k * GLYPH * scale;
            for (gy, bits) in glyph.iter().enumerate() {
                for gx in 0..GLYPH {
                    if bits & (1 << gx) != 0 {
                        self.fill_rect(ox + gx * scale, y + gy * scale, scale, scale, color);
                    }
                }
            }
        }
    }

    /// Draw text rotated a quarter turn counter-clockwise, reading bottom to top.
    ///
    /// `(x, y)` is the top-left corner of the rotated text's bounding box.
    fn draw_text_vertical(&mut self, text: &str, x: usize, y: usize, scale: usize, color: Rgb) {
        let len = text_width(text, scale);
        for (k, ch) in text.chars().enumerate() {
            let glyph = BASIC_FONTS.get(ch).unwrap_or([0; GLYPH]);
            for (gy, bits) in glyph.iter().enumerate() {
                for gx in 0..GLYPH {
                    if bits & (1 << gx) != 0 {
                        let along = (k * GLYPH + gx) * scale;
                        self.fill_rect(
                            x + gy * scale,
                            y + len - along - scale,
                            scale,
                            scale,
                            color,
                        );
                    }
                }
            }
        }
    }
}

/// Rasterize a figure.
pub fn figure_to_image(fig: &Figure) -> RgbImage {
    let g = Geometry::for_figure(fig);
    let mut img = RgbImage::new(g.width, g.height);
    let glyph_h = |scale: usize| GLYPH * scale;

    // Cells, inset so the background shows through as grid lines.
    let half = g.line / 2;
    let inner = g.cell.saturating_sub(g.line).max(1);
    for row in 0..fig.nrows {
        for col in 0..fig.ncols {
            if let Some(color) = fig.cell(row, col) {
                let x = g.grid_x + col * g.cell + half;
                let y = g.grid_y + row * g.cell + half;
                img.fill_rect(x, y, inner, inner, color);
            }
        }
    }

    // Title, centered over the grid.
    if let Some(title) = &fig.title {
        let w = text_width(title, g.title_scale);
        let x = g.grid_x + (fig.ncols * g.cell).saturating_sub(w) / 2;
        img.draw_text(title, x, g.pad, g.title_scale, Rgb::BLACK);
    }

    // Column ticks along the top.
    let xtick_y = g.grid_y - g.pad / 2 - glyph_h(g.tick_scale);
    for (col, tick) in fig.x_ticks.iter().enumerate() {
        let w = text_width(tick, g.tick_scale);
        let x = (g.grid_x + col * g.cell + g.cell / 2).saturating_sub(w / 2);
        img.draw_text(tick, x, xtick_y, g.tick_scale, Rgb::BLACK);
    }

    // Row ticks, right-aligned against the grid.
    for (row, tick) in fig.y_ticks.iter().enumerate() {
        let w = text_width(tick, g.tick_scale);
        let x = g.grid_x.saturating_sub(g.pad / 2 + w);
        let y = (g.grid_y + row * g.cell + g.cell / 2).saturating_sub(glyph_h(g.tick_scale) / 2);
        img.draw_text(tick, x, y, g.tick_scale, Rgb::BLACK);
    }

    // Axis label.
    let label_len = text_width(fig.y_label, g.label_scale);
    let body_h = (fig.nrows * g.cell).max(label_len);
    img.draw_text_vertical(
        fig.y_label,
        g.pad,
        g.grid_y + (body_h - label_len) / 2,
        g.label_scale,
        Rgb::BLACK,
    );

    // Legend bar: one band per entry, first entry on top.
    if !fig.legend.is_empty() {
        let bar_h = fig.nrows * g.cell;
        let n = fig.legend.len();
        for (i, entry) in fig.legend.iter().enumerate() {
            let top = bar_h * i / n;
            let bottom = bar_h * (i + 1) / n;
            img.fill_rect(g.bar_x, g.grid_y + top, g.bar_w, bottom - top, entry.color);

            let y = (g.grid_y + (top + bottom) / 2).saturating_sub(glyph_h(g.tick_scale) / 2);
            let x = g.bar_x + g.bar_w + g.pad / 2;
            img.draw_text(&entry.label, x, y, g.tick_scale, Rgb::BLACK);
        }
        let title_y = g.grid_y - g.pad / 2 - glyph_h(g.minor_scale);
        img.draw_text(fig.legend_title, g.bar_x, title_y, g.minor_scale, Rgb::BLACK);
    }

    img
}

fn write_rgb_png(path: &Path, pixels: &[u8], width: usize, height: usize) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    let w = std::io::BufWriter::new(file);

    let mut encoder = png::Encoder::new(w, width as u32, height as u32);
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);

    let mut writer = encoder
        .write_header()
        .with_context(|| format!("writing PNG header for {}", path.display()))?;
    writer
        .write_image_data(pixels)
        .with_context(|| format!("writing PNG data for {}", path.display()))?;

    Ok(())
}
