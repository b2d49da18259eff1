//! Integration tests - the gateway wired end to end
//!
//! XMLA tests run against an in-process stub endpoint. SQL tests use a fake
//! executor, except the ignored ones that need a live ClickHouse
//! (`CLICKHOUSE_URL`).

mod sql_gateway_tests;
