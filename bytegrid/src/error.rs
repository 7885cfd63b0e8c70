use thiserror::Error;

#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("layout has no fields")]
    Empty,

    #[error("number of columns must be positive, got {0}")]
    InvalidColumns(usize),

    #[error("field '{0}' has zero size")]
    ZeroSize(String),

    #[error("duplicate field name '{0}'")]
    DuplicateField(String),

    #[error("config error: {0}")]
    Config(String),
}
