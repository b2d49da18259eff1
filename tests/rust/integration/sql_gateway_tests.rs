//! Relational path: aggregation service -> router -> SQL adapter -> executor

#[cfg(test)]
mod sql_gateway_tests {
    use std::env;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use serde_json::{json, Map, Value};

    use cubegate::adapters::{
        ClickHouseExecutor, ClickHouseSettings, RoutingOlapPort, SqlExecutor, SqlExecutorError,
        SqlOlapAdapter, SqlRecord,
    };
    use cubegate::aggregation::{AggregationService, AllowedColumns};
    use cubegate::query_port::{OlapError, OlapQueryPort, Query, QueryParams, QueryType};

    /// Executor that records every call and answers with canned records
    #[derive(Default)]
    struct RecordingExecutor {
        calls: Mutex<Vec<(String, QueryParams)>>,
        failure: Option<SqlExecutorError>,
    }

    #[async_trait]
    impl SqlExecutor for RecordingExecutor {
        async fn fetch_rows(
            &self,
            sql: &str,
            params: &QueryParams,
        ) -> Result<Vec<SqlRecord>, SqlExecutorError> {
            self.calls
                .lock()
                .unwrap()
                .push((sql.to_string(), params.clone()));
            if let Some(err) = &self.failure {
                return Err(err.clone());
            }

            let mut first = Map::new();
            first.insert("Region".to_string(), json!("EMEA"));
            first.insert("Sales".to_string(), json!(1000));
            let mut second = Map::new();
            second.insert("Region".to_string(), json!("APAC"));
            second.insert("Sales".to_string(), Value::Null);
            Ok(vec![first, second])
        }
    }

    fn relational(executor: Arc<RecordingExecutor>) -> Arc<RoutingOlapPort> {
        let adapter = SqlOlapAdapter::new(executor, "vw_olap_cube").unwrap();
        Arc::new(RoutingOlapPort::new(Some(Arc::new(adapter)), None).unwrap())
    }

    #[tokio::test]
    async fn test_aggregate_reaches_physical_view() {
        let executor = Arc::new(RecordingExecutor::default());
        let service = AggregationService::new(
            relational(executor.clone()),
            AllowedColumns::new(["Region", "Sales"]),
        );

        let response = service
            .aggregate(Some("Region"), Some("Sales"), Some("Year:2024|Region:EMEA"))
            .await
            .unwrap();

        assert_eq!(response.len(), 2);
        assert_eq!(response.rows()[0].get("Sales"), Some(&json!(1000)));
        assert!(response.rows()[1].has("Sales"));
        assert_eq!(response.rows()[1].get("Sales"), Some(&Value::Null));

        let calls = executor.calls.lock().unwrap();
        assert_eq!(
            calls[0].0,
            "SELECT Region, SUM(Sales) AS Sales FROM vw_olap_cube WHERE Year = '2024' AND Region = 'EMEA' GROUP BY Region"
        );
        assert!(calls[0].1.is_empty());
    }

    #[tokio::test]
    async fn test_typed_query_carries_parameters() {
        let executor = Arc::new(RecordingExecutor::default());
        let router = relational(executor.clone());

        let mut params = QueryParams::new();
        params.insert("year".to_string(), json!(2024));
        let query = Query::new(
            "SELECT Region FROM cube_view WHERE Year = $year",
            QueryType::Sql,
            Some(&params),
        )
        .unwrap();

        router.execute_query(&query).await.unwrap();

        let calls = executor.calls.lock().unwrap();
        assert_eq!(calls[0].0, "SELECT Region FROM vw_olap_cube WHERE Year = $year");
        assert_eq!(calls[0].1.get("year"), Some(&json!(2024)));
    }

    #[tokio::test]
    async fn test_driver_failure_is_backend_error() {
        let executor = Arc::new(RecordingExecutor {
            failure: Some(SqlExecutorError::Driver("Code: 60. Unknown table".to_string())),
            ..Default::default()
        });
        let router = relational(executor);

        match router.execute_text("SELECT * FROM cube_view").await {
            Err(OlapError::BackendExecution(message)) => {
                assert!(message.starts_with("Error executing SQL query"));
                assert!(message.contains("Unknown table"));
            }
            other => panic!("expected backend error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unauthorized_column_never_reaches_executor() {
        let executor = Arc::new(RecordingExecutor::default());
        let service =
            AggregationService::new(relational(executor.clone()), AllowedColumns::new(["Region"]));

        assert_eq!(
            service.aggregate(Some("Region"), Some("Salary"), None).await,
            Err(OlapError::unauthorized("Salary"))
        );
        assert!(executor.calls.lock().unwrap().is_empty());
    }

    fn live_settings() -> Option<ClickHouseSettings> {
        Some(ClickHouseSettings {
            url: env::var("CLICKHOUSE_URL").ok()?,
            user: env::var("CLICKHOUSE_USER").unwrap_or_else(|_| "default".to_string()),
            password: env::var("CLICKHOUSE_PASSWORD").unwrap_or_default(),
            database: env::var("CLICKHOUSE_DATABASE").unwrap_or_else(|_| "default".to_string()),
            max_execution_time_secs: 30,
        })
    }

    #[tokio::test]
    #[ignore = "requires a running ClickHouse (CLICKHOUSE_URL)"]
    async fn test_live_clickhouse_aggregation() {
        let settings = live_settings().expect("CLICKHOUSE_URL must be set");
        let executor = ClickHouseExecutor::new(&settings);
        let view = "(SELECT 'EMEA' AS Region, toInt64(number) AS Sales FROM numbers(5))";
        let adapter = SqlOlapAdapter::new(Arc::new(executor), view).unwrap();

        let service = AggregationService::new(Arc::new(adapter), AllowedColumns::unrestricted());
        let response = service
            .aggregate(Some("Region"), Some("Sales"), Some("Region:EMEA"))
            .await
            .unwrap();

        assert_eq!(response.len(), 1);
        assert_eq!(response.rows()[0].get("Region"), Some(&json!("EMEA")));
        assert_eq!(response.rows()[0].get("Sales"), Some(&json!(10)));
    }

    #[tokio::test]
    #[ignore = "requires a running ClickHouse (CLICKHOUSE_URL)"]
    async fn test_live_clickhouse_named_parameters() {
        let settings = live_settings().expect("CLICKHOUSE_URL must be set");
        let executor = ClickHouseExecutor::new(&settings);

        let mut params = QueryParams::new();
        params.insert("name".to_string(), json!("O'Brien"));
        params.insert("limit".to_string(), json!(3));

        let records = executor
            .fetch_rows(
                "SELECT $name AS name, number FROM numbers(10) LIMIT $limit",
                &params,
            )
            .await
            .unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].get("name"), Some(&json!("O'Brien")));
    }
}
