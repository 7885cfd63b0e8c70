use serde::Deserialize;
use tracing::warn;

use crate::error::LayoutError;
use crate::types::{Cell, FieldSpec};

/// Serde-driven layout configuration matching the TOML format.
///
/// ```toml
/// title = "Mint Layout"
/// num_cols = 16
///
/// [[fields]]
/// name = "mint_authority"
/// type = "COption<Pubkey>"
/// size = 36
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct LayoutConfig {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub num_cols: Option<usize>,
    #[serde(default)]
    pub compress_rows: bool,
    pub fields: Vec<FieldSpec>,
}

/// A validated record layout: an ordered, non-empty list of uniquely named
/// fields, each at least one byte long.
///
/// Only the constructors can build one, so every `Layout` upholds those rules.
#[derive(Debug, Clone)]
pub struct Layout {
    title: Option<String>,
    num_cols: Option<usize>,
    compress_rows: bool,
    fields: Vec<FieldSpec>,
}

impl Layout {
    /// Validate an ordered field list.
    pub fn new(fields: Vec<FieldSpec>) -> Result<Layout, LayoutError> {
        if fields.is_empty() {
            return Err(LayoutError::Empty);
        }
        for (i, field) in fields.iter().enumerate() {
            if field.size == 0 {
                return Err(LayoutError::ZeroSize(field.name.clone()));
            }
            if fields[..i].iter().any(|f| f.name == field.name) {
                return Err(LayoutError::DuplicateField(field.name.clone()));
            }
        }
        Ok(Layout {
            title: None,
            num_cols: None,
            compress_rows: false,
            fields,
        })
    }

    /// Build a layout from `(name, type, size)` triples in declaration order.
    pub fn from_fields<'a, I>(fields: I) -> Result<Layout, LayoutError>
    where
        I: IntoIterator<Item = (&'a str, &'a str, usize)>,
    {
        Layout::new(
            fields
                .into_iter()
                .map(|(name, ty, size)| FieldSpec::new(name, ty, size))
                .collect(),
        )
    }

    pub fn from_config(config: LayoutConfig) -> Result<Layout, LayoutError> {
        if config.num_cols == Some(0) {
            return Err(LayoutError::InvalidColumns(0));
        }
        let mut layout = Layout::new(config.fields)?;
        layout.title = config.title;
        layout.num_cols = config.num_cols;
        layout.compress_rows = config.compress_rows;
        Ok(layout)
    }

    /// Parse a TOML layout document.
    pub fn from_toml(toml_str: &str) -> Result<Layout, LayoutError> {
        let config: LayoutConfig =
            toml::from_str(toml_str).map_err(|e| LayoutError::Config(e.to_string()))?;
        Layout::from_config(config)
    }

    /// Title suggested by the layout source, if any.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Column count suggested by the layout source, if any.
    pub fn num_cols(&self) -> Option<usize> {
        self.num_cols
    }

    /// Whether the layout source asks for repeated rows to be folded.
    pub fn compress_rows(&self) -> bool {
        self.compress_rows
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// The grid unit: the smallest field size.
    pub fn step(&self) -> usize {
        // `new` guarantees at least one field, all non-zero.
        self.fields.iter().map(|f| f.size).min().unwrap_or(1)
    }

    /// Total record size in bytes.
    pub fn total_size(&self) -> usize {
        self.fields.iter().map(|f| f.size).sum()
    }

    /// Byte offset of each field, in declaration order.
    pub fn offsets(&self) -> Vec<usize> {
        self.fields
            .iter()
            .scan(0, |offset, f| {
                let start = *offset;
                *offset += f.size;
                Some(start)
            })
            .collect()
    }

    /// Number of step-sized cells the layout expands to.
    pub fn cell_count(&self) -> usize {
        let step = self.step();
        self.fields.iter().map(|f| f.size.div_ceil(step)).sum()
    }

    /// Expand every field into `ceil(size / step)` cells, preserving order.
    ///
    /// A field whose size is not a multiple of the step gets a trailing
    /// partial cell.
    pub fn cells(&self) -> Vec<Cell> {
        let step = self.step();
        let mut cells = Vec::with_capacity(self.cell_count());
        for (field_idx, field) in self.fields.iter().enumerate() {
            let n = field.size.div_ceil(step);
            let partial = field.size % step != 0;
            if partial {
                warn!(
                    field = %field.name,
                    size = field.size,
                    step,
                    "field size is not a multiple of the step; last cell is partial"
                );
            }
            for k in 0..n {
                cells.push(Cell {
                    field: field_idx,
                    partial: partial && k == n - 1,
                });
            }
        }
        cells
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_is_min_size() {
        let layout = Layout::from_fields([("a", "u64", 8), ("b", "u8", 1), ("c", "Pubkey", 32)])
            .unwrap();
        assert_eq!(layout.step(), 1);
        assert_eq!(layout.total_size(), 41);
        assert_eq!(layout.cell_count(), 41);
    }

    #[test]
    fn empty_layout_rejected() {
        let result = Layout::new(Vec::new());
        assert!(matches!(result, Err(LayoutError::Empty)));
    }

    #[test]
    fn zero_size_rejected() {
        let result = Layout::from_fields([("a", "u8", 1), ("b", "()", 0)]);
        assert!(matches!(result, Err(LayoutError::ZeroSize(name)) if name == "b"));
    }

    #[test]
    fn duplicate_name_rejected() {
        let result = Layout::from_fields([("a", "u8", 1), ("a", "u16", 2)]);
        assert!(matches!(result, Err(LayoutError::DuplicateField(name)) if name == "a"));
    }

    #[test]
    fn offsets_accumulate() {
        let layout =
            Layout::from_fields([("a", "u32", 4), ("b", "u64", 8), ("c", "u32", 4)]).unwrap();
        assert_eq!(layout.offsets(), vec![0, 4, 12]);
    }

    #[test]
    fn non_divisible_size_rounds_up() {
        let layout = Layout::from_fields([("a", "u32", 4), ("b", "[u8; 6]", 6)]).unwrap();
        let cells = layout.cells();
        assert_eq!(cells.len(), 3);
        assert!(!cells[1].partial);
        assert!(cells[2].partial);
        assert_eq!(cells[2].field, 1);
    }

    #[test]
    fn parse_toml_preserves_order() {
        let toml = r#"
            title = "Mint Layout"
            num_cols = 8

            [[fields]]
            name = "supply"
            type = "u64"
            size = 8

            [[fields]]
            name = "decimals"
            type = "u8"
            size = 1
        "#;
        let layout = Layout::from_toml(toml).unwrap();
        assert_eq!(layout.title(), Some("Mint Layout"));
        assert_eq!(layout.num_cols(), Some(8));
        assert!(!layout.compress_rows());
        assert_eq!(layout.fields()[0].name, "supply");
        assert_eq!(layout.fields()[1].type_label, "u8");
    }

    #[test]
    fn parse_toml_zero_columns() {
        let toml = "num_cols = 0\n[[fields]]\nname = \"a\"\ntype = \"u8\"\nsize = 1\n";
        assert!(matches!(
            Layout::from_toml(toml),
            Err(LayoutError::InvalidColumns(0))
        ));
    }

    #[test]
    fn parse_toml_empty_fields() {
        let result = Layout::from_toml("title = \"Empty\"\nfields = []\n");
        assert!(matches!(result, Err(LayoutError::Empty)));
    }

    #[test]
    fn parse_toml_zero_size_field() {
        let toml = "[[fields]]\nname = \"pad\"\ntype = \"()\"\nsize = 0\n";
        assert!(matches!(
            Layout::from_toml(toml),
            Err(LayoutError::ZeroSize(name)) if name == "pad"
        ));
    }

    #[test]
    fn cell_expansion_never_divides_by_zero() {
        // Every constructed layout has a positive step.
        for fields in [vec![("a", "T", 1)], vec![("a", "T", 3), ("b", "T", 7)]] {
            let layout = Layout::from_fields(fields).unwrap();
            assert!(layout.step() > 0);
            assert_eq!(layout.cells().len(), layout.cell_count());
        }
    }

    #[test]
    fn parse_toml_missing_fields() {
        let result = Layout::from_toml("title = \"x\"");
        assert!(matches!(result, Err(LayoutError::Config(_))));
    }
}
