use async_trait::async_trait;
use clickhouse::Client;
use serde_json::Value;
use tokio::io::AsyncBufReadExt;

use super::parameter_binding::bind_parameters;
use super::sql_adapter::{SqlExecutor, SqlExecutorError, SqlRecord};
use crate::query_port::QueryParams;

/// Connection settings for the relational backend
#[derive(Debug, Clone, PartialEq)]
pub struct ClickHouseSettings {
    pub url: String,
    pub user: String,
    pub password: String,
    pub database: String,
    /// Server-side limit applied through `max_execution_time`
    pub max_execution_time_secs: u64,
}

/// [`SqlExecutor`] over the ClickHouse HTTP interface
pub struct ClickHouseExecutor {
    client: Client,
}

impl ClickHouseExecutor {
    pub fn new(settings: &ClickHouseSettings) -> Self {
        log::info!(
            "ClickHouse executor: url={}, database={}, max_execution_time={}s",
            settings.url,
            settings.database,
            settings.max_execution_time_secs
        );

        let client = Client::default()
            .with_url(&settings.url)
            .with_user(&settings.user)
            .with_password(&settings.password)
            .with_database(&settings.database)
            .with_option(
                "max_execution_time",
                settings.max_execution_time_secs.to_string(),
            )
            // SUM over integer columns yields Int64; keep it a JSON number
            .with_option("output_format_json_quote_64bit_integers", "0");

        Self { client }
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

/// The client treats `?` as a bind marker; `??` is a literal question mark
fn escape_bind_markers(sql: &str) -> String {
    sql.replace('?', "??")
}

/// Decode one `JSONEachRow` line into a record
fn decode_record(line: &str) -> Result<Option<SqlRecord>, SqlExecutorError> {
    if line.trim().is_empty() {
        return Ok(None);
    }

    match serde_json::from_str::<Value>(line) {
        Ok(Value::Object(record)) => Ok(Some(record)),
        Ok(other) => Err(SqlExecutorError::Decode(format!(
            "expected a JSON object, got {}",
            other
        ))),
        Err(e) => Err(SqlExecutorError::Decode(e.to_string())),
    }
}

#[async_trait]
impl SqlExecutor for ClickHouseExecutor {
    async fn fetch_rows(
        &self,
        sql: &str,
        params: &QueryParams,
    ) -> Result<Vec<SqlRecord>, SqlExecutorError> {
        let bound_sql =
            bind_parameters(sql, params).map_err(|e| SqlExecutorError::Binding(e.to_string()))?;

        let mut lines = self
            .client
            .query(&escape_bind_markers(&bound_sql))
            .fetch_bytes("JSONEachRow")
            .map_err(|e| SqlExecutorError::Driver(format!("ClickHouse error: {}", e)))?
            .lines();

        let mut records = Vec::new();
        while let Some(line) = lines
            .next_line()
            .await
            .map_err(|e| SqlExecutorError::Driver(format!("ClickHouse error: {}", e)))?
        {
            if let Some(record) = decode_record(&line)? {
                records.push(record);
            }
        }

        Ok(records)
    }
}
