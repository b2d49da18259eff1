//! Aggregation query builder
//!
//! Turns (dimensions, measures, filters) into SQL against the logical
//! `cube_view` table and runs it through the bound [`OlapQueryPort`].
//!
//! Injection surface: filter values are quoted with `'` doubled. Column and
//! measure names are interpolated verbatim and are only trusted through the
//! allow-list; filter keys are never checked against it. With an empty
//! allow-list every name is caller-controlled, so integrators must treat
//! that configuration as an injection risk.

use std::sync::Arc;

use crate::adapters::CUBE_VIEW_PLACEHOLDER;
use crate::query_port::{ensure_query_text, OlapError, OlapQueryPort};
use crate::result_model::AggregationResponse;

pub mod columns;
pub mod filters;

pub use columns::{split_csv, AllowedColumns};
pub use filters::{FilterSet, DEFAULT_MAX_FILTERS};

pub struct AggregationService {
    query_port: Arc<dyn OlapQueryPort>,
    allowed_columns: AllowedColumns,
    max_filters: usize,
}

impl AggregationService {
    pub fn new(query_port: Arc<dyn OlapQueryPort>, allowed_columns: AllowedColumns) -> Self {
        if allowed_columns.is_unrestricted() {
            log::warn!(
                "Allowed-column list is empty: every dimension and measure name is accepted"
            );
        } else {
            log::info!(
                "Allowed columns: {}",
                allowed_columns.iter().collect::<Vec<_>>().join(", ")
            );
        }

        Self {
            query_port,
            allowed_columns,
            max_filters: DEFAULT_MAX_FILTERS,
        }
    }

    pub fn with_max_filters(mut self, max_filters: usize) -> Self {
        self.max_filters = max_filters;
        self
    }

    pub fn allowed_columns(&self) -> &AllowedColumns {
        &self.allowed_columns
    }

    pub fn max_filters(&self) -> usize {
        self.max_filters
    }

    /// Compose the aggregation SQL without executing it
    pub fn build_query(
        &self,
        dimensions: Option<&str>,
        measures: Option<&str>,
        filters: Option<&str>,
    ) -> Result<String, OlapError> {
        let dimensions = split_csv(dimensions);
        let measures = split_csv(measures);
        self.allowed_columns.authorize(&dimensions)?;
        self.allowed_columns.authorize(&measures)?;
        let filters = FilterSet::parse(filters, self.max_filters)?;

        Ok(compose_sql(&dimensions, &measures, &filters))
    }

    /// Run previously built query text with no parameters
    pub async fn execute(&self, query: &str) -> Result<AggregationResponse, OlapError> {
        ensure_query_text(query, "SQL query")?;
        self.query_port.execute_text(query).await
    }

    pub async fn aggregate(
        &self,
        dimensions: Option<&str>,
        measures: Option<&str>,
        filters: Option<&str>,
    ) -> Result<AggregationResponse, OlapError> {
        let sql = self.build_query(dimensions, measures, filters)?;
        log::debug!("Generated aggregation SQL: {}", sql);
        self.execute(&sql).await
    }
}

/// ClickHouse string literal: backslash is an escape character there too
fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "''"))
}

fn compose_sql(dimensions: &[String], measures: &[String], filters: &FilterSet) -> String {
    let mut select: Vec<String> = dimensions.to_vec();
    select.extend(measures.iter().map(|m| format!("SUM({m}) AS {m}")));
    if select.is_empty() {
        select.push("*".to_string());
    }

    let mut sql = format!("SELECT {} FROM {}", select.join(", "), CUBE_VIEW_PLACEHOLDER);

    if !filters.is_empty() {
        let conditions: Vec<String> = filters
            .iter()
            .map(|(column, value)| format!("{} = {}", column, quote_literal(value)))
            .collect();
        sql.push_str(" WHERE ");
        sql.push_str(&conditions.join(" AND "));
    }

    if !dimensions.is_empty() {
        sql.push_str(" GROUP BY ");
        sql.push_str(&dimensions.join(", "));
    }

    sql
}
