use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use validator::{Validate, ValidationError};

use crate::adapters::{ClickHouseSettings, XmlaCredentials, XmlaSettings};
use crate::aggregation::{AllowedColumns, DEFAULT_MAX_FILTERS};

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Parse error for {field}: {value} - {source}")]
    Parse {
        field: String,
        value: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

/// Relational backend (ClickHouse) settings
#[derive(Clone, Debug, PartialEq, Validate, Serialize, Deserialize)]
pub struct ClickHouseConfig {
    #[validate(length(min = 1, message = "ClickHouse URL cannot be empty"))]
    pub url: String,

    #[serde(default = "default_clickhouse_user")]
    pub user: String,

    /// Empty password is allowed for local development
    #[serde(default)]
    pub password: String,

    #[serde(default = "default_clickhouse_database")]
    pub database: String,

    /// Physical view substituted for the `cube_view` placeholder
    #[serde(default = "default_cube_view")]
    #[validate(length(min = 1, message = "Cube view name cannot be empty"))]
    pub cube_view: String,

    /// Server-side execution limit (ClickHouse max_execution_time)
    #[serde(default = "default_sql_timeout_secs")]
    #[validate(range(
        min = 1,
        max = 86400,
        message = "SQL timeout must be between 1 and 86400 seconds"
    ))]
    pub sql_timeout_secs: u64,
}

impl ClickHouseConfig {
    pub fn settings(&self) -> ClickHouseSettings {
        ClickHouseSettings {
            url: self.url.clone(),
            user: self.user.clone(),
            password: self.password.clone(),
            database: self.database.clone(),
            max_execution_time_secs: self.sql_timeout_secs,
        }
    }
}

/// Multidimensional backend (XMLA endpoint) settings
#[derive(Clone, Debug, PartialEq, Validate, Serialize, Deserialize)]
pub struct XmlaConfig {
    #[validate(length(min = 1, message = "XMLA endpoint URL cannot be empty"))]
    pub endpoint_url: String,

    #[validate(length(min = 1, message = "XMLA catalog cannot be empty"))]
    pub catalog: String,

    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub password: Option<String>,
}

impl XmlaConfig {
    pub fn settings(&self, request_timeout: Duration) -> XmlaSettings {
        XmlaSettings {
            endpoint_url: self.endpoint_url.clone(),
            catalog: self.catalog.clone(),
            credentials: self.username.as_ref().map(|username| XmlaCredentials {
                username: username.clone(),
                password: self.password.clone(),
            }),
            request_timeout: Some(request_timeout),
        }
    }
}

/// Gateway configuration with validation
#[derive(Clone, Debug, PartialEq, Validate, Serialize, Deserialize)]
#[serde(default)]
#[validate(schema(function = "validate_backends"))]
pub struct GatewayConfig {
    /// HTTP server host address
    #[validate(length(min = 1, message = "HTTP host cannot be empty"))]
    pub http_host: String,

    /// HTTP server port (1-65535)
    #[validate(range(
        min = 1,
        max = 65535,
        message = "HTTP port must be between 1 and 65535"
    ))]
    pub http_port: u16,

    /// Comma-separated allow-list; absent or blank means unrestricted
    pub allowed_columns: Option<String>,

    /// Filter-count ceiling for aggregation requests
    #[validate(range(min = 1, max = 32, message = "Max filters must be between 1 and 32"))]
    pub max_filters: usize,

    /// Per-request timeout for HTTP handlers and the XMLA round trip
    #[validate(range(
        min = 1,
        max = 3600,
        message = "Request timeout must be between 1 and 3600 seconds"
    ))]
    pub request_timeout_secs: u64,

    #[validate(nested)]
    pub clickhouse: Option<ClickHouseConfig>,

    #[validate(nested)]
    pub xmla: Option<XmlaConfig>,
}

fn validate_backends(config: &GatewayConfig) -> Result<(), ValidationError> {
    if config.clickhouse.is_none() && config.xmla.is_none() {
        let mut err = ValidationError::new("no_backend");
        err.message = Some("Configure CLICKHOUSE_URL and/or CUBEGATE_XMLA_URL".into());
        return Err(err);
    }
    Ok(())
}

fn default_clickhouse_user() -> String {
    "default".to_string()
}

fn default_clickhouse_database() -> String {
    "default".to_string()
}

fn default_cube_view() -> String {
    "cube_view".to_string()
}

fn default_sql_timeout_secs() -> u64 {
    30
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            http_host: "0.0.0.0".to_string(),
            http_port: 8080,
            allowed_columns: None,
            max_filters: DEFAULT_MAX_FILTERS,
            request_timeout_secs: 60,
            clickhouse: None,
            xmla: None,
        }
    }
}

impl GatewayConfig {
    /// Create configuration from environment variables with validation
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self::from_env_unvalidated()?;
        config.validate()?;
        Ok(config)
    }

    fn from_env_unvalidated() -> Result<Self, ConfigError> {
        let clickhouse = match read_env_var("CLICKHOUSE_URL") {
            Some(url) => Some(ClickHouseConfig {
                url,
                user: read_env_var("CLICKHOUSE_USER").unwrap_or_else(default_clickhouse_user),
                password: read_env_var("CLICKHOUSE_PASSWORD").unwrap_or_default(),
                database: read_env_var("CLICKHOUSE_DATABASE")
                    .unwrap_or_else(default_clickhouse_database),
                cube_view: read_env_var("CUBEGATE_CUBE_VIEW").unwrap_or_else(default_cube_view),
                sql_timeout_secs: parse_env_var("CUBEGATE_SQL_TIMEOUT_SECS", "30")?,
            }),
            None => None,
        };

        let xmla = read_env_var("CUBEGATE_XMLA_URL").map(|endpoint_url| XmlaConfig {
            endpoint_url,
            catalog: read_env_var("CUBEGATE_XMLA_CATALOG").unwrap_or_default(),
            username: read_env_var("CUBEGATE_XMLA_USER"),
            password: read_env_var("CUBEGATE_XMLA_PASSWORD"),
        });

        Ok(Self {
            http_host: read_env_var("CUBEGATE_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            http_port: parse_env_var("CUBEGATE_PORT", "8080")?,
            allowed_columns: read_env_var("CUBEGATE_ALLOWED_COLUMNS"),
            max_filters: parse_env_var("CUBEGATE_MAX_FILTERS", "3")?,
            request_timeout_secs: parse_env_var("CUBEGATE_REQUEST_TIMEOUT_SECS", "60")?,
            clickhouse,
            xmla,
        })
    }

    /// Create configuration from YAML file
    pub fn from_yaml_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, ConfigError> {
        let config = Self::read_yaml_file(path)?;
        config.validate()?;
        Ok(config)
    }

    fn read_yaml_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Parse {
            field: "yaml_file".to_string(),
            value: "file read failed".to_string(),
            source: Box::new(e),
        })?;

        serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse {
            field: "yaml_content".to_string(),
            value: content,
            source: Box::new(e),
        })
    }

    /// Load from the YAML file named on the command line (or the environment),
    /// then apply CLI overrides and validate
    pub fn from_cli(cli: CliConfig) -> Result<Self, ConfigError> {
        let mut config = match &cli.config_file {
            Some(path) => Self::read_yaml_file(path)?,
            None => Self::from_env_unvalidated()?,
        };
        config.apply(cli);
        config.validate()?;
        Ok(config)
    }

    /// CLI values override whatever was loaded
    pub fn apply(&mut self, cli: CliConfig) {
        if let Some(host) = cli.http_host {
            self.http_host = host;
        }
        if let Some(port) = cli.http_port {
            self.http_port = port;
        }
        if let Some(columns) = cli.allowed_columns {
            self.allowed_columns = Some(columns);
        }
        if let Some(max_filters) = cli.max_filters {
            self.max_filters = max_filters;
        }
    }

    pub fn allowed_columns(&self) -> AllowedColumns {
        AllowedColumns::parse(self.allowed_columns.as_deref())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// CLI configuration (parsed from command line arguments)
#[derive(Clone, Debug, Default)]
pub struct CliConfig {
    pub config_file: Option<PathBuf>,
    pub http_host: Option<String>,
    pub http_port: Option<u16>,
    pub allowed_columns: Option<String>,
    pub max_filters: Option<usize>,
}

/// Read an environment variable, treating blank values as absent
fn read_env_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Parse an environment variable with a default value
fn parse_env_var<T: std::str::FromStr>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let value = read_env_var(key).unwrap_or_else(|| default.to_string());
    value.trim().parse().map_err(|e| ConfigError::Parse {
        field: key.to_string(),
        value,
        source: Box::new(e),
    })
}
