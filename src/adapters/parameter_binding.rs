//! Named parameter binding for ClickHouse SQL
//!
//! Replaces `$name` placeholders with escaped ClickHouse literals. Text inside
//! single-quoted string literals is copied untouched, so a filter value such
//! as `'US$'` never turns into a placeholder.

use serde_json::Value;

use crate::query_port::QueryParams;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParameterBindingError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    #[error("Invalid parameter name: {0:?}")]
    InvalidName(String),

    #[error("Unsupported parameter type for {name}: {detail}")]
    UnsupportedType { name: String, detail: String },
}

/// Escape a string for a ClickHouse single-quoted literal
///
/// Backslash first, then quotes and control characters.
fn escape_string(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('\'', "\\'")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
        .replace('\0', "\\0")
}

fn format_literal(name: &str, value: &Value) -> Result<String, ParameterBindingError> {
    let unsupported = |detail: String| ParameterBindingError::UnsupportedType {
        name: name.to_string(),
        detail,
    };

    match value {
        Value::String(s) => Ok(format!("'{}'", escape_string(s))),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(i.to_string())
            } else if let Some(u) = n.as_u64() {
                Ok(u.to_string())
            } else {
                match n.as_f64() {
                    Some(f) if f.is_finite() => Ok(f.to_string()),
                    _ => Err(unsupported(format!("non-finite number {}", n))),
                }
            }
        }
        Value::Bool(b) => Ok(if *b { "1" } else { "0" }.to_string()),
        Value::Null => Ok("NULL".to_string()),
        Value::Array(items) => {
            let formatted = items
                .iter()
                .map(|item| format_literal(name, item))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(format!("[{}]", formatted.join(", ")))
        }
        Value::Object(_) => Err(unsupported(
            "object parameters are not supported".to_string(),
        )),
    }
}

fn is_name_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

/// Substitute every `$name` placeholder outside string literals.
///
/// An empty parameter map leaves the SQL untouched.
pub fn bind_parameters(sql: &str, params: &QueryParams) -> Result<String, ParameterBindingError> {
    if params.is_empty() {
        return Ok(sql.to_string());
    }
    if let Some(bad) = params
        .keys()
        .find(|k| k.is_empty() || !k.chars().all(is_name_char))
    {
        return Err(ParameterBindingError::InvalidName(bad.clone()));
    }

    let mut result = String::with_capacity(sql.len() * 2);
    let mut chars = sql.chars().peekable();
    let mut in_literal = false;

    while let Some(ch) = chars.next() {
        if in_literal {
            result.push(ch);
            match ch {
                '\\' => {
                    if let Some(escaped) = chars.next() {
                        result.push(escaped);
                    }
                }
                '\'' => {
                    // '' is an escaped quote, not the end of the literal
                    if chars.peek() == Some(&'\'') {
                        result.push('\'');
                        chars.next();
                    } else {
                        in_literal = false;
                    }
                }
                _ => {}
            }
            continue;
        }

        match ch {
            '\'' => {
                in_literal = true;
                result.push(ch);
            }
            '$' => {
                let mut name = String::new();
                while let Some(&next) = chars.peek() {
                    if is_name_char(next) {
                        name.push(next);
                        chars.next();
                    } else {
                        break;
                    }
                }

                if name.is_empty() {
                    result.push('$');
                    continue;
                }

                let value = params
                    .get(&name)
                    .ok_or_else(|| ParameterBindingError::MissingParameter(name.clone()))?;
                result.push_str(&format_literal(&name, value)?);
            }
            _ => result.push(ch),
        }
    }

    Ok(result)
}
