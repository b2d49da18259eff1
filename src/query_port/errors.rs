use thiserror::Error;

/// Error taxonomy shared by every query port implementation.
///
/// Client-side kinds (`InvalidArgument`, `Unauthorized`) are surfaced to the
/// caller unmodified. Server-side kinds keep "the backend failed" apart from
/// "the backend answered but the answer was unparsable".
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OlapError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Column not authorized: {column}")]
    Unauthorized { column: String },

    #[error("Backend execution failed: {0}")]
    BackendExecution(String),

    #[error("Backend response could not be parsed: {0}")]
    ResponseParse(String),
}

impl OlapError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        OlapError::InvalidArgument(message.into())
    }

    pub fn unauthorized(column: impl Into<String>) -> Self {
        OlapError::Unauthorized {
            column: column.into(),
        }
    }

    pub fn backend(message: impl Into<String>) -> Self {
        OlapError::BackendExecution(message.into())
    }

    pub fn parse(message: impl Into<String>) -> Self {
        OlapError::ResponseParse(message.into())
    }

    /// True for errors caused by caller input (HTTP 400 family)
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            OlapError::InvalidArgument(_) | OlapError::Unauthorized { .. }
        )
    }

    /// Stable label used in error payloads and logs
    pub fn kind(&self) -> &'static str {
        match self {
            OlapError::InvalidArgument(_) => "InvalidArgument",
            OlapError::Unauthorized { .. } => "Unauthorized",
            OlapError::BackendExecution(_) => "BackendExecutionError",
            OlapError::ResponseParse(_) => "ResponseParseError",
        }
    }
}
