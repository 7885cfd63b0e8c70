use anyhow::{Context, Result};
use bytegrid::builtin;
use bytegrid::compress::{self, RowLabel};
use bytegrid::figure::{RenderOptions, Style, DEFAULT_DEST_FOLDER};
use bytegrid::grid::LayoutGrid;
use bytegrid::layout::Layout;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::io::IsTerminal;
use std::path::PathBuf;

mod display;
mod output;
mod render_pdf;
mod render_png;

use output::Rendered;

/// Byte layout heatmap CLI
#[derive(Parser)]
#[command(name = "bytegrid", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

/// Options shared by every command that builds a grid.
#[derive(Args)]
struct GridArgs {
    /// Layout name (built-in) or path to .toml file
    #[arg(long)]
    layout: String,
    /// Grid width in steps (default: the layout's own, else 16)
    #[arg(long)]
    cols: Option<usize>,
    /// Fold consecutive identical rows into one ranged row
    #[arg(long)]
    compress: bool,
}

#[derive(Subcommand)]
enum Command {
    /// List all built-in layouts
    List,
    /// Show the fields and offsets of a layout
    Info {
        /// Layout name (built-in) or path to .toml file
        #[arg(long)]
        layout: String,
    },
    /// Display a layout grid in the terminal
    Show {
        #[command(flatten)]
        grid: GridArgs,
        /// Disable ANSI colors
        #[arg(long)]
        no_color: bool,
    },
    /// Dump a layout grid as JSON
    Grid {
        #[command(flatten)]
        grid: GridArgs,
        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },
    /// Render a layout heatmap to a file
    Render {
        #[command(flatten)]
        grid: GridArgs,
        /// Figure title; also names the output file (default: the layout's own)
        #[arg(long)]
        title: Option<String>,
        /// Output format
        #[arg(long, default_value = "png")]
        format: String,
        /// Output directory
        #[arg(short, long, default_value = DEFAULT_DEST_FOLDER)]
        output: PathBuf,
        /// Pixels per grid cell (PNG)
        #[arg(long, default_value = "100")]
        cell_px: u32,
        /// Resolution used to size fonts (PNG)
        #[arg(long, default_value = "100")]
        dpi: u32,
        /// Width of the lines between cells, in points
        #[arg(long, default_value = "0.5")]
        line_width: f32,
    },
    /// Render the token account, mint, and derivative metadata layouts
    Demo {
        /// Output directory
        #[arg(short, long, default_value = DEFAULT_DEST_FOLDER)]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    install_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::List => cmd_list(),
        Command::Info { layout } => cmd_info(&layout),
        Command::Show { grid, no_color } => cmd_show(&grid, !no_color),
        Command::Grid { grid, pretty } => cmd_grid(&grid, pretty),
        Command::Render {
            grid,
            title,
            format,
            output,
            cell_px,
            dpi,
            line_width,
        } => {
            let style = Style {
                line_width,
                cell_px,
                dpi,
            };
            cmd_render(&grid, title, &format, output, style)
        }
        Command::Demo { output } => cmd_demo(output),
    }
}

fn install_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);
    let filter_layer = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();
}

/// Load a layout by name (built-in) or path (.toml file).
fn load_layout(name_or_path: &str) -> Result<Layout> {
    if let Some(layout) = builtin::builtin_layout(name_or_path) {
        return Ok(layout);
    }

    let toml_path = std::path::Path::new(name_or_path);
    if toml_path.exists() {
        let toml_str = std::fs::read_to_string(toml_path)
            .with_context(|| format!("reading {}", toml_path.display()))?;
        let layout = Layout::from_toml(&toml_str)
            .with_context(|| format!("parsing layout from {}", toml_path.display()))?;
        return Ok(layout);
    }

    anyhow::bail!(
        "unknown layout '{}'. Use 'list' to see built-in layouts, or provide a .toml path.",
        name_or_path
    );
}

/// Layout plus render options with command-line overrides applied.
fn resolve(args: &GridArgs) -> Result<(Layout, RenderOptions)> {
    let layout = load_layout(&args.layout)?;
    let mut options = RenderOptions::for_layout(&layout);
    if let Some(cols) = args.cols {
        anyhow::ensure!(cols > 0, "--cols must be positive");
        options.num_cols = cols;
    }
    options.compress_rows |= args.compress;
    Ok((layout, options))
}

fn cmd_list() -> Result<()> {
    println!(
        "{:<22} {:>6} {:>6} {:>5}",
        "Layout", "Fields", "Bytes", "Step"
    );
    println!("{}", "-".repeat(42));
    for name in builtin::BUILTIN_NAMES {
        let layout = builtin::builtin_layout(name)
            .with_context(|| format!("loading built-in layout '{name}'"))?;
        println!(
            "{:<22} {:>6} {:>6} {:>5}",
            name,
            layout.fields().len(),
            layout.total_size(),
            layout.step(),
        );
    }
    Ok(())
}

fn cmd_info(name: &str) -> Result<()> {
    let layout = load_layout(name)?;
    if let Some(title) = layout.title() {
        println!("Title:         {}", title);
    }
    println!("Fields:        {}", layout.fields().len());
    println!("Total bytes:   {}", layout.total_size());
    println!("Step:          {}", layout.step());
    println!("Cells:         {}", layout.cell_count());
    if let Some(cols) = layout.num_cols() {
        println!("Columns:       {}", cols);
    }
    println!();

    let name_w = layout.fields().iter().map(|f| f.name.len()).max().unwrap_or(0);
    let type_w = layout
        .fields()
        .iter()
        .map(|f| f.type_label.len())
        .max()
        .unwrap_or(0);
    println!(
        "  {:>6}  {:<name_w$}  {:<type_w$}  {:>5}",
        "Offset", "Field", "Type", "Size"
    );
    for (field, offset) in layout.fields().iter().zip(layout.offsets()) {
        println!(
            "  {:>6}  {:<name_w$}  {:<type_w$}  {:>5}",
            offset, field.name, field.type_label, field.size
        );
    }
    Ok(())
}

fn cmd_show(args: &GridArgs, color: bool) -> Result<()> {
    let (layout, mut options) = resolve(args)?;
    // Displaying never writes a file.
    options.title = None;
    let ansi = color && std::io::stdout().is_terminal();
    if let Rendered::Displayed(text) = output::render(&layout, &options, "png", ansi)? {
        if let Some(title) = layout.title() {
            println!("{title}");
        }
        print!("{text}");
    }
    Ok(())
}

#[derive(Serialize)]
struct OutputGrid<'a> {
    #[serde(flatten)]
    grid: &'a LayoutGrid,
    kept_rows: Vec<OutputRow>,
}

#[derive(Serialize)]
struct OutputRow {
    label: String,
    #[serde(flatten)]
    span: RowLabel,
}

fn cmd_grid(args: &GridArgs, pretty: bool) -> Result<()> {
    let (layout, options) = resolve(args)?;
    let grid = LayoutGrid::build(&layout, options.num_cols)?;
    let kept_rows = compress::row_labels(&grid, options.compress_rows)
        .into_iter()
        .map(|span| OutputRow {
            label: span.to_string(),
            span,
        })
        .collect();
    let result = OutputGrid {
        grid: &grid,
        kept_rows,
    };

    let json = if pretty {
        serde_json::to_string_pretty(&result)?
    } else {
        serde_json::to_string(&result)?
    };
    println!("{json}");
    Ok(())
}

fn cmd_render(
    args: &GridArgs,
    title: Option<String>,
    format: &str,
    output_dir: PathBuf,
    style: Style,
) -> Result<()> {
    let (layout, mut options) = resolve(args)?;
    if title.is_some() {
        options.title = title;
    }
    options.dest_folder = output_dir;
    options.style = style;

    match output::render(&layout, &options, format, std::io::stdout().is_terminal())? {
        Rendered::Saved(path) => println!("wrote {}", path.display()),
        Rendered::Displayed(text) => print!("{text}"),
    }
    Ok(())
}

fn cmd_demo(output_dir: PathBuf) -> Result<()> {
    for name in ["token-account", "mint", "derivative-metadata"] {
        let layout = load_layout(name)?;
        let options = RenderOptions {
            dest_folder: output_dir.clone(),
            ..RenderOptions::for_layout(&layout)
        };
        if let Rendered::Saved(path) = output::render(&layout, &options, "png", false)? {
            println!("wrote {}", path.display());
        }
    }
    Ok(())
}
