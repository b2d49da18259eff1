use serde::{Deserialize, Serialize};

use crate::query_port::QueryParams;

/// Query string of `GET /api/olap/aggregate`
#[derive(Debug, Default, Deserialize)]
pub struct AggregateParams {
    pub dimensions: Option<String>,
    pub measures: Option<String>,
    pub filters: Option<String>,
}

/// Body of `POST /api/olap/query`
#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub statement: String,
    /// `SQL` or `MDX`, case-insensitive; kept untyped so bad values map to a 400
    #[serde(rename = "type", default = "default_query_type")]
    pub query_type: String,
    #[serde(default)]
    pub parameters: Option<QueryParams>,
}

fn default_query_type() -> String {
    "SQL".to_string()
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub service: String,
    pub status: String,
    pub version: String,
}
