//! Backend adapters implementing [`crate::query_port::OlapQueryPort`]
//!
//! - [`SqlOlapAdapter`]: SQL over an [`SqlExecutor`] (ClickHouse in production)
//! - [`XmlaOlapAdapter`]: MDX wrapped in SOAP, sent over an [`XmlaTransport`]
//! - [`RoutingOlapPort`]: picks one of the two by the `MDX:` prefix

pub mod clickhouse_executor;
pub mod parameter_binding;
pub mod routing;
pub mod sql_adapter;
pub mod xmla_adapter;
pub mod xmla_envelope;
pub mod xmla_response;
pub mod xmla_transport;

pub use clickhouse_executor::{ClickHouseExecutor, ClickHouseSettings};
pub use routing::RoutingOlapPort;
pub use sql_adapter::{SqlExecutor, SqlExecutorError, SqlOlapAdapter, SqlRecord, CUBE_VIEW_PLACEHOLDER};
pub use xmla_adapter::{XmlaOlapAdapter, XmlaSettings};
pub use xmla_transport::{HttpXmlaTransport, TransportError, XmlaCredentials, XmlaTransport};
