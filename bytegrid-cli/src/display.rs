//! Terminal display for untitled figures.

use bytegrid::figure::Figure;
use bytegrid::palette::Rgb;
use crossterm::style::{style, Color, Stylize};
use std::fmt::Write;

/// Digits of the legend keys used when color is off.
const KEYS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Characters per key: every label gets a distinct key of this many digits.
fn key_width(labels: usize) -> usize {
    let mut width = 1;
    let mut span = KEYS.len();
    while span < labels {
        width += 1;
        span *= KEYS.len();
    }
    width
}

/// Key of label `i`, written in base `KEYS.len()` with `width` digits.
fn key(mut i: usize, width: usize) -> String {
    let mut digits = vec![0u8; width];
    for d in digits.iter_mut().rev() {
        *d = KEYS[i % KEYS.len()];
        i /= KEYS.len();
    }
    digits.into_iter().map(char::from).collect()
}

fn swatch(out: &mut String, color: Option<Rgb>, key: &str, width: usize, ansi: bool) {
    match (color, ansi) {
        (Some(c), true) => {
            let block = "█".repeat(width);
            let _ = write!(out, "{}", style(block).with(Color::Rgb { r: c.0, g: c.1, b: c.2 }));
        }
        (Some(_), false) => out.extend(key.chars().cycle().take(width)),
        (None, _) => out.extend(std::iter::repeat('·').take(width)),
    }
}

/// Draw a figure as text: axis label and column ticks on top, row ticks on
/// the left, legend below.
pub fn render_text(fig: &Figure, ansi: bool) -> String {
    let mut out = String::new();
    let kw = key_width(fig.legend.len());
    let tick_w = fig.y_ticks.iter().map(|t| t.len()).max().unwrap_or(0);
    let col_w = fig
        .x_ticks
        .iter()
        .map(|t| t.len())
        .max()
        .unwrap_or(0)
        .max(3)
        .max(kw)
        + 1;

    if let Some(title) = &fig.title {
        let _ = writeln!(out, "{:tick_w$}  {title}", "");
    }

    let _ = writeln!(out, "{}", fig.y_label);
    let _ = write!(out, "{:tick_w$} ", "");
    for tick in &fig.x_ticks {
        let _ = write!(out, "{tick:>col_w$}");
    }
    out.push('\n');

    for (row, tick) in fig.y_ticks.iter().enumerate() {
        let _ = write!(out, "{tick:>tick_w$} ");
        for col in 0..fig.ncols {
            out.push(' ');
            let k = key(fig.cells[row * fig.ncols + col].unwrap_or(0), kw);
            swatch(&mut out, fig.cell(row, col), &k, col_w - 1, ansi);
        }
        out.push('\n');
    }

    let _ = writeln!(out, "\n{}:", fig.legend_title);
    for (i, entry) in fig.legend.iter().enumerate() {
        out.push_str("  ");
        swatch(&mut out, Some(entry.color), &key(i, kw), kw.max(2), ansi);
        let _ = writeln!(out, " {}", entry.label);
    }
    out
}
