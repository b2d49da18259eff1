use std::path::PathBuf;

use clap::Parser;
use cubegate::{config, server};

/// cubegate - uniform aggregation queries over SQL and XMLA backends
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// YAML configuration file (replaces environment variables)
    #[arg(long)]
    config: Option<PathBuf>,

    /// HTTP server host address
    #[arg(long)]
    http_host: Option<String>,

    /// HTTP server port
    #[arg(long)]
    http_port: Option<u16>,

    /// Comma-separated list of columns callers may reference
    #[arg(long)]
    allowed_columns: Option<String>,

    /// Maximum number of filters per aggregation request
    #[arg(long)]
    max_filters: Option<usize>,
}

impl From<Cli> for config::CliConfig {
    fn from(cli: Cli) -> Self {
        config::CliConfig {
            config_file: cli.config,
            http_host: cli.http_host,
            http_port: cli.http_port,
            allowed_columns: cli.allowed_columns,
            max_filters: cli.max_filters,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Defaults to INFO level, can be overridden with RUST_LOG env var
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    log::info!("cubegate v{}", env!("CARGO_PKG_VERSION"));

    let config = match config::GatewayConfig::from_cli(cli.into()) {
        Ok(config) => config,
        Err(e) => {
            log::error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    server::run_with_config(config).await
}
