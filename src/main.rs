//! Credentialed chat-completion reverse proxy.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌──────────────────────────────────────────────┐
//!                      │                  CHAT PROXY                   │
//!                      │                                               │
//!   Client Request     │  ┌──────────┐   ┌──────────┐   ┌──────────┐  │
//!   ──────────────────▶│  │ security │──▶│  token   │──▶│transform │  │
//!                      │  │   gate   │   │  check   │   │ payload  │  │
//!                      │  └──────────┘   └──────────┘   └────┬─────┘  │
//!                      │                                      │        │
//!                      │                                      ▼        │
//!   Client Response    │  ┌──────────┐                 ┌──────────┐   │
//!   ◀──────────────────│──│  relay   │◀────────────────│ forward  │◀──┼── Upstream
//!                      │  │(json/SSE)│                 │ upstream │   │    API
//!                      │  └──────────┘                 └──────────┘   │
//!                      │                                               │
//!                      │  cross-cutting: config · logging · metrics    │
//!                      │                 · correlation ids · shutdown  │
//!                      └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use chat_proxy::config::load_config;
use chat_proxy::{HttpServer, Shutdown};

#[derive(Parser, Debug)]
#[command(name = "chat-proxy", about = "Credentialed chat-completion reverse proxy")]
struct Args {
    /// Path to a TOML config file. Environment variables override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chat_proxy=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "chat-proxy starting");

    let mut config = load_config(args.config.as_deref())?;
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }

    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.base_url,
        require_https = config.security.require_https,
        allowlist_entries = config.security.allowed_ips.len(),
        signing = config.security.signing_secret.is_some(),
        rate_limit_max = config.rate_limit.max_requests,
        rate_limit_window_secs = config.rate_limit.window_seconds,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            chat_proxy::observability::metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config)?;
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
