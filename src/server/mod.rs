use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::StatusCode,
    routing::{get, post},
    Router,
};
use handlers::{aggregate_handler, health_check, query_handler};
use tokio::net::TcpListener;
use tower_http::{catch_panic::CatchPanicLayer, timeout::TimeoutLayer};

use crate::adapters::{ClickHouseExecutor, RoutingOlapPort, SqlOlapAdapter, XmlaOlapAdapter};
use crate::aggregation::AggregationService;
use crate::config::GatewayConfig;
use crate::query_port::{OlapError, OlapQueryPort};

pub mod handlers;
pub mod models;

#[derive(Clone)]
pub struct AppState {
    pub aggregation: Arc<AggregationService>,
    pub router: Arc<RoutingOlapPort>,
}

impl AppState {
    /// Aggregations run through the router, so they reach the relational backend
    pub fn new(router: Arc<RoutingOlapPort>, aggregation: AggregationService) -> Self {
        Self {
            aggregation: Arc::new(aggregation),
            router,
        }
    }

    pub fn from_config(config: &GatewayConfig) -> Result<Self, OlapError> {
        let relational: Option<Arc<dyn OlapQueryPort>> = match &config.clickhouse {
            Some(clickhouse) => {
                log::info!(
                    "Relational backend: {} (database '{}', cube view '{}')",
                    clickhouse.url,
                    clickhouse.database,
                    clickhouse.cube_view
                );
                let executor = ClickHouseExecutor::new(&clickhouse.settings());
                Some(Arc::new(SqlOlapAdapter::new(
                    Arc::new(executor),
                    clickhouse.cube_view.clone(),
                )?))
            }
            None => None,
        };

        let multidimensional: Option<Arc<dyn OlapQueryPort>> = match &config.xmla {
            Some(xmla) => {
                log::info!(
                    "Multidimensional backend: {} (catalog '{}')",
                    xmla.endpoint_url,
                    xmla.catalog
                );
                Some(Arc::new(XmlaOlapAdapter::connect(
                    xmla.settings(config.request_timeout()),
                )?))
            }
            None => None,
        };

        let router = Arc::new(RoutingOlapPort::new(relational, multidimensional)?);
        let aggregation = AggregationService::new(router.clone(), config.allowed_columns())
            .with_max_filters(config.max_filters);

        Ok(Self::new(router, aggregation))
    }
}

pub fn build_router(app_state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/olap/aggregate", get(aggregate_handler))
        .route("/api/olap/query", post(query_handler))
        .with_state(Arc::new(app_state))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(CatchPanicLayer::new())
}

pub async fn run_with_config(config: GatewayConfig) -> anyhow::Result<()> {
    let app_state = AppState::from_config(&config)?;
    let app = build_router(app_state, config.request_timeout());

    let http_bind_address = format!("{}:{}", config.http_host, config.http_port);
    log::info!("Starting HTTP server on {}", http_bind_address);

    let http_listener = TcpListener::bind(&http_bind_address)
        .await
        .map_err(|e| {
            log::error!("Failed to bind HTTP listener to {}: {}", http_bind_address, e);
            e
        })?;

    log::info!("cubegate is running at http://{}", http_bind_address);

    axum::serve(http_listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    log::info!("Received shutdown signal, shutting down...");
}
