//! Filter-expression compiler
//!
//! Turns a declarative search request (field/operator/value filters, a sort
//! clause and pagination parameters) into parameterized row and count queries
//! against the product catalog. Fields resolve either to structured columns or
//! to attributes of the per-row JSON `specs` document.
//!
//! Stages, each consuming the previous stage's output:
//! - `validate` - request shape and per-filter well-formedness
//! - `registry` - logical field name → column or attribute path
//! - `clause` - one filter → SQL fragment + bound values
//! - `builder` - WHERE/ORDER BY/LIMIT assembly, row and count statements
//! - `pagination` - page size clamp, offset and page count
//!
//! Client values only ever travel through the bound-parameter list.
//!
//! ## Usage
//!
//! ```no_run
//! use catalog_server::core::config::{CatalogConfig, SearchConfig};
//! use catalog_server::data::filters::{FilterRequest, QueryCompiler};
//!
//! let compiler = QueryCompiler::from_config(&CatalogConfig::default(), &SearchConfig::default()).unwrap();
//! let request: FilterRequest = serde_json::from_str(
//!     r#"{"filters": [{"field": "ram", "op": "GE", "value": 16}], "pageSize": 20}"#,
//! ).unwrap();
//! let search = compiler.compile(&request).unwrap();
//! assert_eq!(search.rows.placeholder_count(), search.rows.params.len());
//! ```

mod builder;
mod clause;
mod compiler;
mod error;
mod pagination;
mod registry;
mod types;
mod validate;

pub use builder::{QueryAssembler, QueryPlan};
pub use clause::{compile_clause, json_extract};
pub use compiler::{CompiledSearch, QueryCompiler};
pub use error::{CompileError, FilterError, ResolutionError, ValidationError};
pub use pagination::{PageRequest, Pagination, paginate};
pub use registry::{
    FieldRegistry, FieldSpec, RegistryError, SortableFields, UnknownFieldPolicy,
    is_safe_identifier,
};
pub use types::{
    CompiledClause, FieldDescriptor, FieldKind, FilterRequest, FilterValue, OperatorTag, Scalar,
    SortDirection, SortSpec, SqlPlan, ValidatedFilter, ValueType,
};
pub use validate::FilterValidator;
