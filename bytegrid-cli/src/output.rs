//! Save-or-display dispatch for one render call.

use anyhow::{Context, Result};
use bytegrid::figure::{Figure, RenderOptions};
use bytegrid::layout::Layout;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::display;
use crate::render_pdf;
use crate::render_png;

/// Where a render call sent its figure.
#[derive(Debug, PartialEq, Eq)]
pub enum Rendered {
    Saved(PathBuf),
    Displayed(String),
}

/// Plan a layout's figure and either save it (titled) or display it (untitled).
///
/// `format` is `"png"` or `"pdf"`; it is ignored when displaying.
pub fn render(
    layout: &Layout,
    options: &RenderOptions,
    format: &str,
    ansi: bool,
) -> Result<Rendered> {
    let fig = Figure::from_layout(layout, options).context("planning layout figure")?;
    debug!(
        rows = fig.nrows,
        cols = fig.ncols,
        fields = fig.legend.len(),
        "planned figure"
    );

    let Some(path) = options.output_path(format) else {
        return Ok(Rendered::Displayed(display::render_text(&fig, ansi)));
    };

    let write: fn(&Figure, &Path) -> Result<()> = match format {
        "png" => render_png::write_figure_png,
        "pdf" => render_pdf::write_figure_pdf,
        _ => anyhow::bail!("unknown format '{}', use 'png' or 'pdf'", format),
    };

    std::fs::create_dir_all(&options.dest_folder).with_context(|| {
        format!(
            "creating output directory '{}'",
            options.dest_folder.display()
        )
    })?;
    write(&fig, &path)?;
    info!(path = %path.display(), "wrote figure");
    Ok(Rendered::Saved(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytegrid::builtin;

    #[test]
    fn titled_render_saves_slugged_file() {
        let layout = builtin::mint();
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("images");
        let options = RenderOptions {
            dest_folder: dest.clone(),
            ..RenderOptions::for_layout(&layout)
        };
        let rendered = render(&layout, &options, "png", false).unwrap();
        let path = dest.join("mint_layout.png");
        assert_eq!(rendered, Rendered::Saved(path.clone()));
        assert!(path.exists());
    }

    #[test]
    fn titled_render_saves_pdf() {
        let layout = builtin::token_account();
        let dir = tempfile::tempdir().unwrap();
        let options = RenderOptions {
            dest_folder: dir.path().to_path_buf(),
            ..RenderOptions::for_layout(&layout)
        };
        let rendered = render(&layout, &options, "pdf", false).unwrap();
        let path = dir.path().join("token_account_layout.pdf");
        assert_eq!(rendered, Rendered::Saved(path.clone()));
        assert!(std::fs::read(&path).unwrap().starts_with(b"%PDF"));
    }

    #[test]
    fn untitled_render_displays() {
        let layout = Layout::from_fields([("a", "T", 4), ("b", "T", 4)]).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("images");
        let options = RenderOptions {
            num_cols: 2,
            dest_folder: dest.clone(),
            ..RenderOptions::default()
        };
        match render(&layout, &options, "png", false).unwrap() {
            Rendered::Displayed(text) => assert!(text.contains("a: T")),
            other => panic!("expected display, got {other:?}"),
        }
        assert!(!dest.exists());
    }

    #[test]
    fn unknown_format_fails() {
        let layout = builtin::mint();
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("images");
        let options = RenderOptions {
            dest_folder: dest.clone(),
            ..RenderOptions::for_layout(&layout)
        };
        let err = render(&layout, &options, "gif", false).unwrap_err();
        assert!(err.to_string().contains("unknown format"));
        assert!(!dest.exists());
    }

    #[test]
    fn zero_columns_fails() {
        let layout = builtin::mint();
        let options = RenderOptions {
            num_cols: 0,
            ..RenderOptions::for_layout(&layout)
        };
        assert!(render(&layout, &options, "png", false).is_err());
    }
}
