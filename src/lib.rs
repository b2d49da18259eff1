//! cubegate: one aggregation-query contract over a SQL backend (ClickHouse)
//! and an XMLA/MDX backend.

pub mod adapters;
pub mod aggregation;
pub mod config;
pub mod query_port;
pub mod result_model;
pub mod server;
