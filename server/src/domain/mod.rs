//! Domain logic for catalog search
//!
//! - `search` - Compile → execute → paginate
//! - `seed` - Synthetic catalog generator

pub mod search;
pub mod seed;

pub use search::{SearchError, SearchPage, SearchService};
pub use seed::{CatalogGenerator, seed_catalog};
