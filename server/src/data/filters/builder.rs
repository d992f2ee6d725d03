//! SQL query builder
//!
//! Joins compiled clauses, attaches sort and pagination, and derives the row
//! and count statements from one shared WHERE clause.

use super::error::ResolutionError;
use super::pagination::PageRequest;
use super::registry::{RegistryError, SortableFields, ensure_safe};
use super::types::{CompiledClause, Scalar, SortSpec, SqlPlan};

/// Assembled query parts for one request
///
/// `params` holds filter values in placeholder order followed by LIMIT and
/// OFFSET.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan {
    pub where_sql: String,
    pub order_sql: String,
    pub limit: i64,
    pub offset: i64,
    pub params: Vec<Scalar>,
}

impl QueryPlan {
    /// Everything after `FROM <table>`: optional WHERE and ORDER BY, then LIMIT/OFFSET
    pub fn tail_sql(&self) -> String {
        [self.where_sql.as_str(), self.order_sql.as_str(), "LIMIT ? OFFSET ?"]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Params bound by the WHERE clause alone
    pub fn filter_params(&self) -> &[Scalar] {
        &self.params[..self.params.len().saturating_sub(2)]
    }
}

/// Builds statements against the catalog table
#[derive(Debug, Clone)]
pub struct QueryAssembler {
    table: String,
    select_list: String,
    sortable: SortableFields,
}

impl QueryAssembler {
    pub fn new(
        table: &str,
        columns: &[String],
        sortable: SortableFields,
    ) -> Result<Self, RegistryError> {
        ensure_safe("table", table)?;
        for column in columns {
            ensure_safe("select column", column)?;
        }
        let select_list = if columns.is_empty() {
            "*".to_string()
        } else {
            columns.join(", ")
        };
        Ok(Self {
            table: table.to_string(),
            select_list,
            sortable,
        })
    }

    /// Assemble clauses, sort and page into a plan.
    ///
    /// No clauses means no WHERE at all. A sort field outside the sortable
    /// whitelist is rejected.
    pub fn assemble(
        &self,
        clauses: Vec<CompiledClause>,
        sort: Option<&SortSpec>,
        page: &PageRequest,
    ) -> Result<QueryPlan, ResolutionError> {
        let order_sql = match sort {
            Some(spec) => {
                let column = self.sortable.resolve(&spec.field)?;
                format!("ORDER BY {} {}", column, spec.direction.as_sql())
            }
            None => String::new(),
        };

        let mut fragments = Vec::with_capacity(clauses.len());
        let mut params = Vec::new();
        for clause in clauses {
            fragments.push(clause.sql_fragment);
            params.extend(clause.bound_values);
        }

        let where_sql = if fragments.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", fragments.join(" AND "))
        };

        let limit = page.page_size;
        let offset = page.offset();
        params.push(Scalar::Integer(limit));
        params.push(Scalar::Integer(offset));

        Ok(QueryPlan {
            where_sql,
            order_sql,
            limit,
            offset,
            params,
        })
    }

    /// Page of rows
    pub fn row_plan(&self, plan: &QueryPlan) -> SqlPlan {
        SqlPlan {
            sql: format!(
                "SELECT {} FROM {} {}",
                self.select_list,
                self.table,
                plan.tail_sql()
            ),
            params: plan.params.clone(),
        }
    }

    /// Total count under the identical predicate, without ORDER BY/LIMIT/OFFSET
    pub fn count_plan(&self, plan: &QueryPlan) -> SqlPlan {
        let sql = if plan.where_sql.is_empty() {
            format!("SELECT COUNT(*) FROM {}", self.table)
        } else {
            format!("SELECT COUNT(*) FROM {} {}", self.table, plan.where_sql)
        };
        SqlPlan {
            sql,
            params: plan.filter_params().to_vec(),
        }
    }
}
