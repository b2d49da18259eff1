//! Wire transport for XMLA requests
//!
//! The adapter only needs "POST this envelope, give me the body back". Keeping
//! that behind [`XmlaTransport`] lets tests substitute a closure for the
//! network.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;

/// SOAP action header value for XMLA Execute
pub const SOAP_ACTION: &str = "urn:schemas-microsoft-com:xml-analysis:Execute";

pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Debug, Clone, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP client setup failed: {0}")]
    Setup(String),

    #[error("XMLA request failed: {0}")]
    Request(String),

    #[error("XMLA endpoint returned HTTP {status}: {detail}")]
    Status { status: u16, detail: String },
}

#[async_trait]
pub trait XmlaTransport: Send + Sync {
    /// POST a SOAP envelope and return the response body
    async fn post(&self, envelope: &str) -> Result<String, TransportError>;
}

#[async_trait]
impl<F> XmlaTransport for F
where
    F: Fn(&str) -> Result<String, TransportError> + Send + Sync,
{
    async fn post(&self, envelope: &str) -> Result<String, TransportError> {
        self(envelope)
    }
}

/// Basic-auth credentials for the XMLA endpoint
#[derive(Clone, PartialEq)]
pub struct XmlaCredentials {
    pub username: String,
    pub password: Option<String>,
}

impl std::fmt::Debug for XmlaCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("XmlaCredentials")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}

/// [`XmlaTransport`] over HTTP(S) with `reqwest`
pub struct HttpXmlaTransport {
    client: reqwest::Client,
    endpoint_url: String,
    credentials: Option<XmlaCredentials>,
}

impl HttpXmlaTransport {
    pub fn new(
        endpoint_url: impl Into<String>,
        credentials: Option<XmlaCredentials>,
        request_timeout: Option<Duration>,
    ) -> Result<Self, TransportError> {
        let mut builder = reqwest::Client::builder().connect_timeout(CONNECT_TIMEOUT);
        if let Some(timeout) = request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| TransportError::Setup(e.to_string()))?;

        Ok(Self {
            client,
            endpoint_url: endpoint_url.into(),
            credentials,
        })
    }

    pub fn endpoint_url(&self) -> &str {
        &self.endpoint_url
    }
}

#[async_trait]
impl XmlaTransport for HttpXmlaTransport {
    async fn post(&self, envelope: &str) -> Result<String, TransportError> {
        let mut request = self
            .client
            .post(&self.endpoint_url)
            .header(CONTENT_TYPE, "text/xml; charset=utf-8")
            .header("SOAPAction", SOAP_ACTION)
            .body(envelope.to_owned());

        if let Some(credentials) = &self.credentials {
            request = request.basic_auth(&credentials.username, credentials.password.as_ref());
        }

        let response = request
            .send()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;

        if !status.is_success() {
            let detail = super::xmla_response::fault_string(&body)
                .unwrap_or_else(|| body.chars().take(200).collect());
            return Err(TransportError::Status {
                status: status.as_u16(),
                detail,
            });
        }

        Ok(body)
    }
}
