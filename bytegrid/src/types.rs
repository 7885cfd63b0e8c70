use serde::{Deserialize, Serialize};

/// A named, typed, sized field within a binary record layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    /// Type label shown in the legend, e.g. `Pubkey` or `COption<u64>`.
    #[serde(rename = "type")]
    pub type_label: String,
    /// Size of the field in bytes. Must be non-zero.
    pub size: usize,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, type_label: impl Into<String>, size: usize) -> FieldSpec {
        FieldSpec {
            name: name.into(),
            type_label: type_label.into(),
            size,
        }
    }

    /// The `"name: type"` label carried by every cell of this field.
    pub fn label(&self) -> String {
        format!("{}: {}", self.name, self.type_label)
    }
}

/// One step-sized slot of the flattened record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    /// Index of the owning field in declaration order.
    pub field: usize,
    /// True for the trailing cell of a field whose size is not a multiple of the step.
    pub partial: bool,
}
