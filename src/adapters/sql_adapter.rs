//! Relational adapter: parameterized SQL against a tabular data source

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;

use crate::query_port::{ensure_query_text, OlapError, OlapQueryPort, QueryParams};
use crate::result_model::{AggregationResponse, AggregationRow};

/// Logical table token rewritten to the configured physical view
pub const CUBE_VIEW_PLACEHOLDER: &str = "cube_view";

/// One native result record, column labels exactly as the engine reports them
pub type SqlRecord = Map<String, Value>;

#[derive(Debug, Clone, thiserror::Error)]
pub enum SqlExecutorError {
    #[error("Parameter binding failed: {0}")]
    Binding(String),

    #[error("{0}")]
    Driver(String),

    #[error("Unexpected result record: {0}")]
    Decode(String),
}

/// SQL execution handle bound to one data source
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SqlExecutor: Send + Sync {
    /// Run `sql` with `params` bound as named parameters and collect every record
    async fn fetch_rows(
        &self,
        sql: &str,
        params: &QueryParams,
    ) -> Result<Vec<SqlRecord>, SqlExecutorError>;
}

/// Query port over an [`SqlExecutor`]
///
/// The `cube_view` substitution is a literal, case-sensitive text replacement.
/// It is not a parser: `CUBE_VIEW` is left alone, while `cube_views` or a
/// `'cube_view'` string literal are rewritten like any other occurrence.
pub struct SqlOlapAdapter {
    executor: Arc<dyn SqlExecutor>,
    cube_view_name: String,
}

impl SqlOlapAdapter {
    pub fn new(
        executor: Arc<dyn SqlExecutor>,
        cube_view_name: impl Into<String>,
    ) -> Result<Self, OlapError> {
        let cube_view_name = cube_view_name.into();
        if cube_view_name.trim().is_empty() {
            return Err(OlapError::invalid_argument(
                "Cube view name must not be empty",
            ));
        }

        Ok(Self {
            executor,
            cube_view_name,
        })
    }

    pub fn cube_view_name(&self) -> &str {
        &self.cube_view_name
    }

    fn resolve_cube_view(&self, sql: &str) -> String {
        sql.replace(CUBE_VIEW_PLACEHOLDER, &self.cube_view_name)
    }
}

#[async_trait]
impl OlapQueryPort for SqlOlapAdapter {
    async fn execute(
        &self,
        sql: &str,
        params: &QueryParams,
    ) -> Result<AggregationResponse, OlapError> {
        ensure_query_text(sql, "SQL query")?;

        let final_sql = self.resolve_cube_view(sql);
        log::debug!("Executing SQL:\n{}", final_sql);

        let records = self
            .executor
            .fetch_rows(&final_sql, params)
            .await
            .map_err(|e| {
                log::error!("SQL query failed. SQL was:\n{}\nError: {}", final_sql, e);
                OlapError::backend(format!("Error executing SQL query: {}", e))
            })?;

        log::debug!("SQL query returned {} rows", records.len());
        Ok(AggregationResponse::new(
            records.into_iter().map(AggregationRow::new),
        ))
    }
}
