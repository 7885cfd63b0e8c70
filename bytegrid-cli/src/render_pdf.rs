//! PDF rendering for layout figures.

use anyhow::{Context, Result};
use bytegrid::figure::Figure;
use bytegrid::palette;
use printpdf::*;
use std::path::Path;

/// Edge of one grid cell in points (one inch).
const CELL_PT: f32 = 72.0;

/// Average Helvetica advance width as a fraction of the font size.
const CHAR_EM: f32 = 0.55;

fn pt_mm(pt: f32) -> Mm {
    Mm(pt * 25.4 / 72.0)
}

fn text_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * CHAR_EM
}

fn fill(layer: &PdfLayerReference, color: palette::Rgb) {
    let (r, g, b) = color.to_unit();
    layer.set_fill_color(Color::Rgb(Rgb::new(r, g, b, None)));
    layer.set_outline_color(Color::Rgb(Rgb::new(r, g, b, None)));
}

/// Page placement of a figure, in points measured from the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
struct PageGeometry {
    pad: f32,
    grid_x: f32,
    grid_top: f32,
    grid_w: f32,
    grid_h: f32,
    bar_x: f32,
    bar_w: f32,
    ylabel_len: f32,
    page_w: f32,
    page_h: f32,
}

impl PageGeometry {
    fn for_figure(fig: &Figure) -> PageGeometry {
        let fonts = fig.fonts;
        let pad = CELL_PT / 5.0;

        let title_h = if fig.title.is_some() { fonts.title + pad } else { 0.0 };
        let xtick_h = fonts.major_tick + pad;
        let ylabel_w = fonts.axis_label + pad;
        let ytick_w = fig
            .y_ticks
            .iter()
            .map(|t| text_width(t, fonts.major_tick))
            .fold(0.0, f32::max)
            + pad;

        let grid_x = pad + ylabel_w + ytick_w;
        let grid_top = pad + title_h + xtick_h;
        let grid_w = fig.ncols as f32 * CELL_PT;
        let grid_h = fig.nrows as f32 * CELL_PT;

        let bar_x = grid_x + grid_w + 2.0 * pad;
        let bar_w = CELL_PT / 2.0;
        let legend_w = fig
            .legend
            .iter()
            .map(|e| text_width(&e.label, fonts.major_tick))
            .fold(text_width(fig.legend_title, fonts.minor_tick), f32::max);
        let title_w = fig
            .title
            .as_deref()
            .map(|t| text_width(t, fonts.title))
            .unwrap_or(0.0);
        let ylabel_len = text_width(fig.y_label, fonts.axis_label);

        PageGeometry {
            pad,
            grid_x,
            grid_top,
            grid_w,
            grid_h,
            bar_x,
            bar_w,
            ylabel_len,
            page_w: (bar_x + bar_w + pad / 2.0 + legend_w + pad).max(grid_x + title_w + pad),
            page_h: grid_top + grid_h.max(ylabel_len) + pad,
        }
    }
}

/// Write a figure as a single-page PDF sized to fit it.
pub fn write_figure_pdf(fig: &Figure, path: &Path) -> Result<()> {
    let fonts = fig.fonts;
    let PageGeometry {
        pad,
        grid_x,
        grid_top,
        grid_w,
        grid_h,
        bar_x,
        bar_w,
        ylabel_len,
        page_w,
        page_h,
    } = PageGeometry::for_figure(fig);
    // Layout is computed top-down; PDF y grows upward.
    let y = |top: f32| page_h - top;

    let doc_title = fig.title.as_deref().unwrap_or("Layout");
    let (doc, page1, layer1) = PdfDocument::new(doc_title, pt_mm(page_w), pt_mm(page_h), "Figure");
    let layer = doc.get_page(page1).get_layer(layer1);
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .context("loading builtin Helvetica font")?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .context("loading builtin Helvetica-Bold font")?;

    // Cells, inset by half a line on each side.
    let inset = fig.style.line_width / 2.0;
    for row in 0..fig.nrows {
        for col in 0..fig.ncols {
            if let Some(color) = fig.cell(row, col) {
                fill(&layer, color);
                let x0 = grid_x + col as f32 * CELL_PT + inset;
                let top = grid_top + row as f32 * CELL_PT + inset;
                let rect = Rect::new(
                    pt_mm(x0),
                    pt_mm(y(top + CELL_PT - 2.0 * inset)),
                    pt_mm(x0 + CELL_PT - 2.0 * inset),
                    pt_mm(y(top)),
                );
                layer.add_rect(rect);
            }
        }
    }

    // Legend bar, first entry on top.
    let n = fig.legend.len();
    for (i, entry) in fig.legend.iter().enumerate() {
        let band = grid_h / n as f32;
        let top = grid_top + i as f32 * band;
        fill(&layer, entry.color);
        layer.add_rect(Rect::new(
            pt_mm(bar_x),
            pt_mm(y(top + band)),
            pt_mm(bar_x + bar_w),
            pt_mm(y(top)),
        ));
    }

    fill(&layer, palette::Rgb::BLACK);

    if let Some(title) = &fig.title {
        let w = text_width(title, fonts.title);
        let x = grid_x + (grid_w - w).max(0.0) / 2.0;
        layer.use_text(title.as_str(), fonts.title, pt_mm(x), pt_mm(y(pad + fonts.title)), &font);
    }

    let xtick_base = grid_top - pad / 2.0;
    for (col, tick) in fig.x_ticks.iter().enumerate() {
        let w = text_width(tick, fonts.major_tick);
        let x = grid_x + (col as f32 + 0.5) * CELL_PT - w / 2.0;
        layer.use_text(tick.as_str(), fonts.major_tick, pt_mm(x), pt_mm(y(xtick_base)), &font);
    }

    for (row, tick) in fig.y_ticks.iter().enumerate() {
        let w = text_width(tick, fonts.major_tick);
        let x = grid_x - pad / 2.0 - w;
        let base = grid_top + (row as f32 + 0.5) * CELL_PT + fonts.major_tick / 3.0;
        layer.use_text(tick.as_str(), fonts.major_tick, pt_mm(x), pt_mm(y(base)), &font);
    }

    for (i, entry) in fig.legend.iter().enumerate() {
        let band = grid_h / n as f32;
        let base = grid_top + (i as f32 + 0.5) * band + fonts.major_tick / 3.0;
        let x = bar_x + bar_w + pad / 2.0;
        layer.use_text(entry.label.as_str(), fonts.major_tick, pt_mm(x), pt_mm(y(base)), &font);
    }
    layer.use_text(fig.legend_title, fonts.minor_tick, pt_mm(bar_x), pt_mm(y(xtick_base)), &font);

    // Axis label, rotated to read bottom to top.
    let body_h = grid_h.max(ylabel_len);
    let label_bottom = grid_top + (body_h + ylabel_len) / 2.0;
    layer.begin_text_section();
    layer.set_font(&bold, fonts.axis_label);
    layer.set_text_matrix(TextMatrix::TranslateRotate(
        Pt(pad + fonts.axis_label),
        Pt(y(label_bottom)),
        90.0,
    ));
    layer.write_text(fig.y_label, &bold);
    layer.end_text_section();

    doc.save(&mut std::io::BufWriter::new(
        std::fs::File::create(path).with_context(|| format!("creating {}", path.display()))?,
    ))
    .with_context(|| format!("writing PDF to {}", path.display()))?;

    Ok(())
}
