//! Data storage layer
//!
//! - `filters` - Filter-expression compiler (request → parameterized SQL)
//! - `sqlite` - Catalog database and statement execution
//! - `traits` - Repository trait the search service runs against
//! - `types` - Row types shared by repository and service
//! - `error` - Unified data-layer error

pub mod error;
pub mod filters;
pub mod sqlite;
pub mod traits;
pub mod types;

pub use error::DataError;
pub use sqlite::SqliteService;
pub use traits::CatalogRepository;
pub use types::{CatalogRow, NewProduct};
