use std::collections::BTreeSet;

use crate::query_port::OlapError;

/// Split a comma-separated list, trimming and dropping empty tokens
pub fn split_csv(value: Option<&str>) -> Vec<String> {
    value
        .map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Column names callers may reference in dimensions and measures.
///
/// An empty set means "no restriction".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowedColumns {
    columns: BTreeSet<String>,
}

impl AllowedColumns {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns
                .into_iter()
                .map(Into::into)
                .map(|c: String| c.trim().to_string())
                .filter(|c| !c.is_empty())
                .collect(),
        }
    }

    /// Parse a configuration value such as `"Region, Product,Sales"`
    pub fn parse(value: Option<&str>) -> Self {
        Self::new(split_csv(value))
    }

    pub fn unrestricted() -> Self {
        Self::default()
    }

    pub fn is_unrestricted(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn contains(&self, column: &str) -> bool {
        self.columns.contains(column)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(String::as_str)
    }

    /// Fail on the first column missing from a non-empty allow-list
    pub fn authorize(&self, columns: &[String]) -> Result<(), OlapError> {
        if self.is_unrestricted() {
            return Ok(());
        }
        match columns.iter().find(|c| !self.contains(c)) {
            Some(column) => Err(OlapError::unauthorized(column.as_str())),
            None => Ok(()),
        }
    }
}
