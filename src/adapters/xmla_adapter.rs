//! Multidimensional adapter: MDX over SOAP/XMLA

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use super::xmla_envelope::build_execute_envelope;
use super::xmla_response::parse_rows;
use super::xmla_transport::{HttpXmlaTransport, XmlaCredentials, XmlaTransport};
use crate::query_port::query::MDX_PREFIX;
use crate::query_port::{OlapError, OlapQueryPort, QueryParams};
use crate::result_model::AggregationResponse;

/// Endpoint settings for [`XmlaOlapAdapter::connect`]
#[derive(Debug, Clone, PartialEq)]
pub struct XmlaSettings {
    pub endpoint_url: String,
    pub catalog: String,
    pub credentials: Option<XmlaCredentials>,
    pub request_timeout: Option<Duration>,
}

pub struct XmlaOlapAdapter {
    transport: Arc<dyn XmlaTransport>,
    catalog: String,
}

impl XmlaOlapAdapter {
    /// Build an adapter that talks HTTP to a real XMLA endpoint
    pub fn connect(settings: XmlaSettings) -> Result<Self, OlapError> {
        if settings.endpoint_url.trim().is_empty() {
            return Err(OlapError::invalid_argument(
                "XMLA endpoint URL must not be empty",
            ));
        }

        let transport = HttpXmlaTransport::new(
            settings.endpoint_url.as_str(),
            settings.credentials,
            settings.request_timeout,
        )
        .map_err(|e| OlapError::invalid_argument(e.to_string()))?;

        log::info!(
            "XMLA adapter: endpoint={}, catalog={}",
            settings.endpoint_url,
            settings.catalog
        );
        Self::with_transport(Arc::new(transport), settings.catalog)
    }

    pub fn with_transport(
        transport: Arc<dyn XmlaTransport>,
        catalog: impl Into<String>,
    ) -> Result<Self, OlapError> {
        let catalog = catalog.into();
        if catalog.trim().is_empty() {
            return Err(OlapError::invalid_argument(
                "XMLA catalog must not be empty",
            ));
        }

        Ok(Self { transport, catalog })
    }

    pub fn catalog(&self) -> &str {
        &self.catalog
    }

    fn extract_mdx(query: &str) -> Result<&str, OlapError> {
        let mdx = query
            .strip_prefix(MDX_PREFIX)
            .ok_or_else(|| {
                OlapError::invalid_argument(format!(
                    "XMLA adapter only accepts MDX queries prefixed with '{}'",
                    MDX_PREFIX
                ))
            })?
            .trim();

        if mdx.is_empty() {
            return Err(OlapError::invalid_argument("MDX statement must not be empty"));
        }
        Ok(mdx)
    }
}

#[async_trait]
impl OlapQueryPort for XmlaOlapAdapter {
    /// Params are accepted for contract symmetry; MDX carries its own filters
    async fn execute(
        &self,
        query: &str,
        _params: &QueryParams,
    ) -> Result<AggregationResponse, OlapError> {
        let mdx = Self::extract_mdx(query)?;
        let envelope = build_execute_envelope(mdx, Some(&self.catalog));
        log::debug!("Executing MDX against catalog {}:\n{}", self.catalog, mdx);

        let body = self.transport.post(&envelope).await.map_err(|e| {
            log::error!("XMLA request failed. MDX was:\n{}\nError: {}", mdx, e);
            OlapError::backend(format!("Error executing XMLA query: {}", e))
        })?;

        let response = parse_rows(&body).inspect_err(|e| {
            log::error!("XMLA response rejected: {}", e);
        })?;
        log::debug!("XMLA query returned {} rows", response.len());
        Ok(response)
    }
}
