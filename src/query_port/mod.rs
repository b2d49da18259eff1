//! Query port: the contract shared by every analytical backend
//!
//! Callers (the aggregation service, the HTTP layer) hold an
//! `Arc<dyn OlapQueryPort>` and never learn which adapter serves a query.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;

use crate::result_model::AggregationResponse;

pub mod errors;
pub mod query;

pub use errors::OlapError;
pub use query::{Query, QueryType};

/// Named parameters bound into a query
pub type QueryParams = HashMap<String, Value>;

/// Execute backend query text and normalize the result
#[async_trait]
pub trait OlapQueryPort: Send + Sync {
    /// Execute `query` with named parameters.
    ///
    /// Blank query text fails with [`OlapError::InvalidArgument`]; everything
    /// past that check is backend-specific.
    async fn execute(
        &self,
        query: &str,
        params: &QueryParams,
    ) -> Result<AggregationResponse, OlapError>;

    /// Execute `query` without parameters
    async fn execute_text(&self, query: &str) -> Result<AggregationResponse, OlapError> {
        self.execute(query, &QueryParams::new()).await
    }
}

/// Reject blank query text with the given subject in the message
pub fn ensure_query_text(query: &str, subject: &str) -> Result<(), OlapError> {
    if query.trim().is_empty() {
        return Err(OlapError::invalid_argument(format!(
            "{} must not be empty",
            subject
        )));
    }
    Ok(())
}
