//! Backend-agnostic tabular result model
//!
//! Every adapter converts its native records into [`AggregationRow`]s and
//! wraps them in an [`AggregationResponse`]. Both types own their storage:
//! constructors take (or copy) the input and accessors only hand out shared
//! references or owned copies, so a returned model cannot be changed through
//! the collection it was built from.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// One result record: column name -> value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregationRow {
    values: Map<String, Value>,
}

impl AggregationRow {
    pub fn new<K, I>(values: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Self {
            values: values.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// Copy a borrowed map into a new row
    pub fn from_map(values: &HashMap<String, Value>) -> Self {
        Self::new(values.iter().map(|(k, v)| (k.clone(), v.clone())))
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.values.get(column)
    }

    pub fn has(&self, column: &str) -> bool {
        self.values.contains_key(column)
    }

    /// Column names in the order the backend reported them
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }

    pub fn to_map(&self) -> HashMap<String, Value> {
        self.values
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Ordered rows returned by a query port
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregationResponse {
    rows: Vec<AggregationRow>,
}

impl AggregationResponse {
    pub fn new(rows: impl IntoIterator<Item = AggregationRow>) -> Self {
        Self {
            rows: rows.into_iter().collect(),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> &[AggregationRow] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<AggregationRow> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl<'a> IntoIterator for &'a AggregationResponse {
    type Item = &'a AggregationRow;
    type IntoIter = std::slice::Iter<'a, AggregationRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
