pub mod types;
pub mod error;
pub mod layout;
pub mod grid;
pub mod legend;
pub mod compress;
pub mod palette;
pub mod figure;
pub mod builtin;
