//! Grid invariants checked across the built-in layouts and a few handmade ones.

use std::collections::BTreeSet;

use bytegrid::builtin::{self, BUILTIN_NAMES};
use bytegrid::compress;
use bytegrid::figure::{Figure, RenderOptions};
use bytegrid::grid::LayoutGrid;
use bytegrid::layout::Layout;

fn all_layouts() -> Vec<Layout> {
    let mut layouts: Vec<Layout> = BUILTIN_NAMES
        .iter()
        .map(|name| builtin::builtin_layout(name).unwrap())
        .collect();
    layouts.push(Layout::from_fields([("a", "T", 4), ("b", "T", 4)]).unwrap());
    layouts.push(Layout::from_fields([("a", "T", 8)]).unwrap());
    layouts.push(Layout::from_fields([("x", "u16", 2), ("y", "[u8; 5]", 5), ("z", "u64", 8)]).unwrap());
    layouts
}

#[test]
fn cell_count_matches_rounded_up_sizes() {
    for layout in all_layouts() {
        let step = layout.fields().iter().map(|f| f.size).min().unwrap();
        let expected: usize = layout.fields().iter().map(|f| f.size.div_ceil(step)).sum();
        for num_cols in [1, 3, 8, 16, 32] {
            let grid = LayoutGrid::build(&layout, num_cols).unwrap();
            assert_eq!(grid.cell_labels().len(), expected, "num_cols={num_cols}");
        }
    }
}

#[test]
fn row_offsets_increase_by_row_width() {
    for layout in all_layouts() {
        for num_cols in [1, 4, 16] {
            let grid = LayoutGrid::build(&layout, num_cols).unwrap();
            let width = num_cols * grid.step;
            for (i, row) in grid.rows.iter().enumerate() {
                assert_eq!(row.offset, i * width);
            }
        }
    }
}

#[test]
fn distinct_labels_match_fields() {
    for layout in all_layouts() {
        let grid = LayoutGrid::build(&layout, 16).unwrap();
        let got: BTreeSet<&str> = grid.cell_labels().into_iter().collect();
        let want: BTreeSet<String> = layout.fields().iter().map(|f| f.label()).collect();
        let want: BTreeSet<&str> = want.iter().map(String::as_str).collect();
        assert_eq!(got, want);
        assert_eq!(grid.legend.len(), want.len());
    }
}

#[test]
fn compression_only_drops_repeats() {
    for layout in all_layouts() {
        for num_cols in [2, 8, 16] {
            let grid = LayoutGrid::build(&layout, num_cols).unwrap();
            let kept = compress::compress_rows(&grid);
            assert!(kept.len() <= grid.rows.len());
            let kept_rows: BTreeSet<usize> = kept.iter().map(|l| l.row).collect();
            for i in 1..grid.rows.len() {
                if !grid.rows[i].same_labels(&grid.rows[i - 1]) {
                    assert!(kept_rows.contains(&i), "row {i} differs but was dropped");
                }
            }
        }
    }
}

#[test]
fn token_account_compressed_figure() {
    let layout = builtin::token_account();
    let options = RenderOptions {
        compress_rows: true,
        ..RenderOptions::for_layout(&layout)
    };
    let fig = Figure::from_layout(&layout, &options).unwrap();
    // 165 bytes at 16 per row: 11 rows; mint (0, 16) and owner (32, 48) fold.
    assert_eq!(fig.ncols, 16);
    assert_eq!(fig.y_ticks[0], "0 - 16");
    assert_eq!(fig.y_ticks[1], "32 - 48");
    assert_eq!(fig.nrows, 9);
    assert_eq!(fig.legend.len(), 8);
    assert_eq!(fig.legend[0].label, "mint: Pubkey");
    assert_eq!(fig.title.as_deref(), Some("Token Account Layout"));
}

#[test]
fn derivative_metadata_uses_eight_byte_step() {
    let layout = builtin::derivative_metadata();
    let grid = LayoutGrid::build(&layout, layout.num_cols().unwrap()).unwrap();
    assert_eq!(grid.step, 8);
    assert_eq!(grid.columns, vec![8, 16, 24, 32, 40, 48, 56, 64]);
    // 216 / 8 = 27 cells, 8 per row.
    assert_eq!(grid.shape(), (4, 8));
    assert_eq!(grid.label_at(0, 3), Some("strike: Fractional"));
    assert_eq!(grid.label_at(0, 4), Some("strike: Fractional"));
}
