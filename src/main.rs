//! MCP HTTP Proxy
//!
//! Forwarding proxy that fronts MCP servers over plain HTTP.
//!
//! # Architecture Overview
//!
//! ```text
//!                       ┌───────────────────────────────────────────────────┐
//!                       │                  PROXY INSTANCE                   │
//!                       │                                                   │
//!     Client Request    │  ┌─────────┐    ┌──────────┐    ┌─────────────┐   │
//!     ──────────────────┼─▶│  http   │───▶│ routing  │───▶│  backend    │───┼──▶ Backend
//!                       │  │ server  │    │  table   │    │  forwarder  │   │    (MCP server)
//!                       │  └─────────┘    └────┬─────┘    └──────┬──────┘   │
//!                       │                      │ local           │          │
//!     Client Response   │  ┌─────────┐         ▼                 ▼          │
//!     ◀─────────────────┼──│ relay / │◀── health / describe   upstream ◀────┼─── Response
//!                       │  │envelope │                       response       │
//!                       │  └─────────┘                                      │
//!                       └───────────────────────────────────────────────────┘
//! ```
//!
//! With no arguments both built-in instances run side by side:
//! the GitHub proxy on :3002 and the Docker proxy on :3004.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use tokio::net::TcpListener;
use tokio::task::JoinSet;

use mcp_http_proxy::backend;
use mcp_http_proxy::config::{self, validation, LogFormat, Profile, Settings};
use mcp_http_proxy::lifecycle::{signals, Shutdown};
use mcp_http_proxy::observability::{logging, metrics};
use mcp_http_proxy::HttpServer;

#[derive(Parser)]
#[command(name = "mcp-http-proxy", version)]
#[command(about = "Forwarding HTTP proxy for MCP servers", long_about = None)]
struct Cli {
    /// TOML settings file.
    #[arg(short, long, conflicts_with = "profile")]
    config: Option<PathBuf>,

    /// Built-in profile to run (repeatable). Defaults to all profiles.
    #[arg(short, long, value_enum)]
    profile: Vec<ProfileArg>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long)]
    log_level: Option<String>,

    /// Log output format.
    #[arg(long, value_enum)]
    log_format: Option<LogFormatArg>,

    /// Enable the Prometheus exporter on this address.
    #[arg(long)]
    metrics_address: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum ProfileArg {
    Github,
    Docker,
}

impl From<ProfileArg> for Profile {
    fn from(arg: ProfileArg) -> Self {
        match arg {
            ProfileArg::Github => Profile::Github,
            ProfileArg::Docker => Profile::Docker,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormatArg {
    Pretty,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Pretty => LogFormat::Pretty,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}

fn load_settings(cli: &Cli) -> Result<Settings, config::ConfigError> {
    let mut settings = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => {
            let profiles: Vec<Profile> = if cli.profile.is_empty() {
                Profile::ALL.to_vec()
            } else {
                cli.profile.iter().copied().map(Profile::from).collect()
            };
            Settings {
                proxies: profiles.into_iter().map(Profile::config).collect(),
                ..Default::default()
            }
        }
    };

    if let Some(level) = &cli.log_level {
        settings.observability.log_level = level.clone();
    }
    if let Some(format) = cli.log_format {
        settings.observability.log_format = format.into();
    }
    if let Some(address) = &cli.metrics_address {
        settings.observability.metrics_enabled = true;
        settings.observability.metrics_address = address.clone();
    }

    // Overrides can break a file that validated on load.
    validation::validate_settings(&settings).map_err(config::ConfigError::Validation)?;
    Ok(settings)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let settings = load_settings(&cli)?;

    logging::init(&settings.observability);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        instances = settings.proxies.len(),
        "mcp-http-proxy starting"
    );

    if settings.observability.metrics_enabled {
        let addr: SocketAddr = settings.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    // Bind everything first so a port clash aborts before any traffic is served.
    let mut servers = Vec::with_capacity(settings.proxies.len());
    for proxy in settings.proxies {
        let backend_url = backend::resolve(&proxy.backend);
        let listener = TcpListener::bind(&proxy.listener.bind_address).await?;

        tracing::info!(
            proxy = %proxy.name,
            address = %listener.local_addr()?,
            backend = %backend_url,
            "Configuration loaded"
        );

        servers.push((HttpServer::new(proxy, backend_url)?, listener));
    }

    let shutdown = Shutdown::new();
    let mut tasks = JoinSet::new();
    for (server, listener) in servers {
        let name = server.config().name.clone();
        let rx = shutdown.subscribe();
        tasks.spawn(async move { (name, server.run(listener, rx).await) });
    }

    let signal_shutdown = shutdown.clone();
    tokio::spawn(async move {
        signals::shutdown_signal().await;
        signal_shutdown.trigger();
    });

    let mut first_error: Option<std::io::Error> = None;
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((_, Ok(()))) => {}
            Ok((name, Err(e))) => {
                tracing::error!(proxy = %name, error = %e, "Proxy instance failed");
                shutdown.trigger();
                first_error.get_or_insert(e);
            }
            Err(e) => {
                tracing::error!(error = %e, "Proxy task aborted");
                shutdown.trigger();
            }
        }
    }

    tracing::info!("Shutdown complete");
    match first_error {
        Some(e) => Err(e.into()),
        None => Ok(()),
    }
}
