use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{OlapError, QueryParams};

/// Marker that routes query text to the multidimensional backend
pub const MDX_PREFIX: &str = "MDX:";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum QueryType {
    Sql,
    Mdx,
}

impl QueryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryType::Sql => "SQL",
            QueryType::Mdx => "MDX",
        }
    }
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QueryType {
    type Err = OlapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            t if t.eq_ignore_ascii_case("sql") => Ok(QueryType::Sql),
            t if t.eq_ignore_ascii_case("mdx") => Ok(QueryType::Mdx),
            other => Err(OlapError::invalid_argument(format!(
                "Unsupported query type: {}",
                other
            ))),
        }
    }
}

/// A caller-supplied unit of work, constructed per request and never mutated
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    statement: String,
    query_type: QueryType,
    parameters: QueryParams,
}

impl Query {
    pub fn new(
        statement: impl Into<String>,
        query_type: QueryType,
        parameters: Option<&QueryParams>,
    ) -> Result<Self, OlapError> {
        let statement = statement.into();
        if statement.trim().is_empty() {
            return Err(OlapError::invalid_argument("Statement must not be empty"));
        }

        Ok(Self {
            statement,
            query_type,
            parameters: parameters.cloned().unwrap_or_default(),
        })
    }

    /// Build a query from an untyped tag such as `"sql"` or `"MDX"`
    pub fn parse(
        statement: impl Into<String>,
        query_type: &str,
        parameters: Option<&QueryParams>,
    ) -> Result<Self, OlapError> {
        let query_type = query_type.parse()?;
        Self::new(statement, query_type, parameters)
    }

    pub fn statement(&self) -> &str {
        &self.statement
    }

    pub fn query_type(&self) -> QueryType {
        self.query_type
    }

    pub fn parameters(&self) -> &QueryParams {
        &self.parameters
    }

    pub fn has_parameters(&self) -> bool {
        !self.parameters.is_empty()
    }

    /// Text to hand to a port: MDX statements carry the routing prefix
    pub fn port_text(&self) -> String {
        match self.query_type {
            QueryType::Mdx if !self.statement.starts_with(MDX_PREFIX) => {
                format!("{} {}", MDX_PREFIX, self.statement)
            }
            _ => self.statement.clone(),
        }
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Query{{type={}, statement='{}', parametersCount={}}}",
            self.query_type,
            self.statement,
            self.parameters.len()
        )
    }
}
