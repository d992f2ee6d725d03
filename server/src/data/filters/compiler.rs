//! Search compiler
//!
//! Runs validator → resolver → clause compiler → builder over one request.
//! Pure and synchronous; a single instance is shared across all requests.

use serde::Serialize;

use crate::core::config::{CatalogConfig, SearchConfig};

use super::builder::QueryAssembler;
use super::clause::compile_clause;
use super::error::FilterError;
use super::pagination::PageRequest;
use super::registry::{FieldRegistry, RegistryError, SortableFields};
use super::types::{FilterRequest, SqlPlan};
use super::validate::FilterValidator;

/// Row and count statements for one request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompiledSearch {
    pub rows: SqlPlan,
    pub count: SqlPlan,
    #[serde(skip)]
    pub page: PageRequest,
}

#[derive(Debug, Clone)]
pub struct QueryCompiler {
    validator: FilterValidator,
    registry: FieldRegistry,
    assembler: QueryAssembler,
}

impl QueryCompiler {
    pub fn new(validator: FilterValidator, registry: FieldRegistry, assembler: QueryAssembler) -> Self {
        Self {
            validator,
            registry,
            assembler,
        }
    }

    /// Build the compiler from catalog configuration
    pub fn from_config(catalog: &CatalogConfig, search: &SearchConfig) -> Result<Self, RegistryError> {
        let registry = FieldRegistry::new(
            &catalog.fields,
            &catalog.document_column,
            search.unknown_fields,
        )?;
        let sortable = SortableFields::new(&catalog.sortable)?;
        let assembler = QueryAssembler::new(&catalog.table, &catalog.columns, sortable)?;
        Ok(Self::new(FilterValidator::default(), registry, assembler))
    }

    pub fn compile(&self, request: &FilterRequest) -> Result<CompiledSearch, FilterError> {
        let filters = self.validator.validate(request.filters.as_ref())?;

        let clauses = filters
            .iter()
            .map(|filter| -> Result<_, FilterError> {
                let descriptor = self.registry.resolve(&filter.field)?;
                Ok(compile_clause(
                    filter,
                    &descriptor,
                    self.registry.document_column(),
                )?)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let page = PageRequest::new(request.page, request.page_size);
        let plan = self
            .assembler
            .assemble(clauses, request.sort.as_ref(), &page)?;

        let rows = self.assembler.row_plan(&plan);
        let count = self.assembler.count_plan(&plan);

        tracing::trace!(
            sql = %rows.sql,
            params = rows.params.len(),
            "Compiled search query"
        );

        Ok(CompiledSearch { rows, count, page })
    }

    pub fn registry(&self) -> &FieldRegistry {
        &self.registry
    }
}
