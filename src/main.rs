//! wisekingson-gateway
//!
//! Forwards cross-origin JSON POSTs from allow-listed browser origins to a
//! fixed upstream (an Apps Script web app by default).
//!
//! # Architecture Overview
//!
//! ```text
//!   Browser ──OPTIONS /wisekingson──▶ origin gate ──▶ 200 + CORS headers (never forwarded)
//!
//!   Browser ──POST /wisekingson────▶ origin gate ──denied──▶ 403, no allow-origin
//!                                        │
//!                                     allowed
//!                                        ▼
//!                                    forwarder ──POST + query──▶ upstream
//!                                        │       (one call, one deadline)
//!                                        ▼
//!                 Success | UpstreamError | Timeout | Unreachable | Unknown
//!                                        │
//!   Browser ◀──status + JSON + CORS──────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use wisekingson_gateway::config::{resolve_config, ConfigOverrides};
use wisekingson_gateway::lifecycle::startup;

#[derive(Parser, Debug)]
#[command(name = "wisekingson-gateway", version)]
#[command(about = "Origin-gated JSON forwarding gateway", long_about = None)]
struct Cli {
    /// Optional TOML configuration file.
    #[arg(short, long, env = "GATEWAY_CONFIG")]
    config: Option<PathBuf>,

    /// Listen port.
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,

    /// Upstream URL every approved request is forwarded to.
    #[arg(long, env = "GOOGLE_SCRIPT_URL")]
    upstream_url: Option<String>,

    /// Comma-separated list of allowed origins.
    #[arg(long, env = "ALLOWED_ORIGINS", value_delimiter = ',')]
    allowed_origins: Option<Vec<String>>,

    /// Allow-origin value used when there is no origin to echo.
    #[arg(long, env = "CORS_FALLBACK_ORIGIN")]
    fallback_origin: Option<String>,

    /// Directory of static files served for all other paths.
    #[arg(long, env = "STATIC_DIR")]
    static_dir: Option<PathBuf>,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            port: self.port,
            upstream_url: self.upstream_url.clone(),
            allowed_origins: self.allowed_origins.clone(),
            fallback_origin: self.fallback_origin.clone(),
            static_dir: self.static_dir.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = resolve_config(cli.config.as_deref(), cli.overrides())?;
    startup::run(config).await
}
