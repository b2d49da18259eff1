use crate::query_port::OlapError;

pub const DEFAULT_MAX_FILTERS: usize = 3;

const CLAUSE_SEPARATOR: char = '|';
const KEY_VALUE_SEPARATOR: char = ':';

/// Equality filters parsed from `key:value|key:value`, in clause order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet {
    filters: Vec<(String, String)>,
}

impl FilterSet {
    /// Parse a filter expression.
    ///
    /// Clauses are split on the first `:` only, so `Time:10:30` filters
    /// `Time` on `10:30`. Clauses without a `:` or with an empty key are
    /// dropped. A repeated key, or more than `max_filters` clauses, fails.
    pub fn parse(expr: Option<&str>, max_filters: usize) -> Result<Self, OlapError> {
        let mut filters: Vec<(String, String)> = Vec::new();

        let Some(expr) = expr.filter(|e| !e.trim().is_empty()) else {
            return Ok(Self { filters });
        };

        for clause in expr.split(CLAUSE_SEPARATOR) {
            let Some((key, value)) = clause.split_once(KEY_VALUE_SEPARATOR) else {
                log::debug!("Dropping malformed filter clause: {:?}", clause);
                continue;
            };
            let key = key.trim();
            if key.is_empty() {
                log::debug!("Dropping filter clause without a column: {:?}", clause);
                continue;
            }
            if filters.iter().any(|(k, _)| k == key) {
                return Err(OlapError::invalid_argument(format!(
                    "Duplicate filter on column: {}",
                    key
                )));
            }
            filters.push((key.to_string(), value.trim().to_string()));
        }

        if filters.len() > max_filters {
            return Err(OlapError::invalid_argument(format!(
                "At most {} filters allowed, received: {}",
                max_filters,
                filters.len()
            )));
        }

        Ok(Self { filters })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.filters.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.iter().find(|(k, _)| *k == column).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}
