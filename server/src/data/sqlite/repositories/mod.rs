//! SQLite repositories
//!
//! Row types live in `crate::data::types`.

pub mod product;

pub use product::{clear_products, count_rows, fetch_rows, insert_products};
