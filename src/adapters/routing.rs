use async_trait::async_trait;
use std::sync::Arc;

use crate::query_port::query::MDX_PREFIX;
use crate::query_port::{ensure_query_text, OlapError, OlapQueryPort, Query, QueryParams, QueryType};
use crate::result_model::AggregationResponse;

/// Query port that dispatches to the relational or multidimensional backend.
///
/// Text starting with `MDX:` goes to the multidimensional port, anything else
/// to the relational one.
pub struct RoutingOlapPort {
    relational: Option<Arc<dyn OlapQueryPort>>,
    multidimensional: Option<Arc<dyn OlapQueryPort>>,
}

impl RoutingOlapPort {
    pub fn new(
        relational: Option<Arc<dyn OlapQueryPort>>,
        multidimensional: Option<Arc<dyn OlapQueryPort>>,
    ) -> Result<Self, OlapError> {
        if relational.is_none() && multidimensional.is_none() {
            return Err(OlapError::invalid_argument(
                "At least one backend (relational or multidimensional) must be configured",
            ));
        }

        Ok(Self {
            relational,
            multidimensional,
        })
    }

    pub fn has_backend(&self, query_type: QueryType) -> bool {
        self.backend(query_type).is_some()
    }

    fn backend(&self, query_type: QueryType) -> Option<&Arc<dyn OlapQueryPort>> {
        match query_type {
            QueryType::Sql => self.relational.as_ref(),
            QueryType::Mdx => self.multidimensional.as_ref(),
        }
    }

    fn route(&self, query: &str) -> Result<&Arc<dyn OlapQueryPort>, OlapError> {
        let query_type = if query.starts_with(MDX_PREFIX) {
            QueryType::Mdx
        } else {
            QueryType::Sql
        };
        log::debug!("Routing {} query", query_type);
        self.require(query_type)
    }

    fn require(&self, query_type: QueryType) -> Result<&Arc<dyn OlapQueryPort>, OlapError> {
        self.backend(query_type).ok_or_else(|| {
            OlapError::invalid_argument(format!("No {} backend is configured", query_type))
        })
    }

    /// Execute a typed query entity with its own parameters
    pub async fn execute_query(&self, query: &Query) -> Result<AggregationResponse, OlapError> {
        log::debug!("Executing {}", query);
        self.require(query.query_type())?
            .execute(&query.port_text(), query.parameters())
            .await
    }
}

#[async_trait]
impl OlapQueryPort for RoutingOlapPort {
    async fn execute(
        &self,
        query: &str,
        params: &QueryParams,
    ) -> Result<AggregationResponse, OlapError> {
        ensure_query_text(query, "Query")?;
        self.route(query)?.execute(query, params).await
    }
}
