use crate::layout::Layout;

// --- Built-in layouts ---

macro_rules! builtin_layout {
    ($name:ident, $toml:expr) => {
        pub fn $name() -> Layout {
            Layout::from_toml(include_str!(concat!("../layouts/", $toml)))
                .expect(concat!("built-in layout ", $toml, " should be valid"))
        }
    };
}

builtin_layout!(token_account, "token_account.toml");
builtin_layout!(mint, "mint.toml");
builtin_layout!(token_metadata, "token_metadata.toml");
builtin_layout!(derivative_metadata, "derivative_metadata.toml");

/// List of all built-in layout names.
pub const BUILTIN_NAMES: &[&str] = &[
    "token-account",
    "mint",
    "token-metadata",
    "derivative-metadata",
];

/// Load a built-in layout by name.
pub fn builtin_layout(name: &str) -> Option<Layout> {
    match name {
        "token-account" => Some(token_account()),
        "mint" => Some(mint()),
        "token-metadata" => Some(token_metadata()),
        "derivative-metadata" => Some(derivative_metadata()),
        _ => None,
    }
}
