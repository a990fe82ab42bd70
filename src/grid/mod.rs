mod extract;
mod grid;

pub use extract::{extract, extract_or_empty};
pub use grid::{ColorCell, ColorColumn, ColorGrid, COLUMN_LEN, EMPTY_COLOR};
