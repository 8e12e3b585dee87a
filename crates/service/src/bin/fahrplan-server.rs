//! fahrplan-server — ZeroMQ request/reply scheduling endpoint.
//!
//! Accepts JSON event requests on a REP socket and answers each with a
//! computed time slot and a generated event id.
//!
//! # Usage
//!
//! ```bash
//! # TCP on the default port (5555)
//! fahrplan-server
//!
//! # Custom port
//! fahrplan-server --port 6000
//!
//! # Local IPC socket
//! fahrplan-server --transport ipc --ipc-name fahrplan
//!
//! # Via environment variables
//! FAHRPLAN_TRANSPORT=tcp FAHRPLAN_PORT=6000 fahrplan-server
//! ```

use std::sync::Arc;

use clap::Parser;
use fahrplan_core::Dispatcher;
use fahrplan_service::channel::ZmqReplyServer;
use fahrplan_service::config::ServiceConfig;
use fahrplan_service::serve::EventService;
use tokio::sync::Notify;

/// ZeroMQ request/reply scheduling endpoint.
#[derive(Parser, Debug)]
#[command(name = "fahrplan-server", version, about)]
struct Cli {
    /// Path to a TOML configuration file (the flags below override it).
    #[arg(long, env = "FAHRPLAN_CONFIG")]
    config: Option<String>,

    /// Transport type: "tcp" or "ipc".
    #[arg(long, env = "FAHRPLAN_TRANSPORT")]
    transport: Option<String>,

    /// TCP host to bind to.
    #[arg(long, env = "FAHRPLAN_HOST")]
    host: Option<String>,

    /// TCP port to bind to.
    #[arg(long, env = "FAHRPLAN_PORT")]
    port: Option<u16>,

    /// IPC socket name (only used with --transport ipc).
    #[arg(long, env = "FAHRPLAN_IPC_NAME")]
    ipc_name: Option<String>,
}

impl Cli {
    fn into_config(self) -> anyhow::Result<ServiceConfig> {
        let mut config = match &self.config {
            Some(path) => ServiceConfig::from_file(path)?,
            None => ServiceConfig::default(),
        };
        if let Some(kind) = self.transport {
            config.transport.kind = kind;
        }
        if let Some(host) = self.host {
            config.transport.host = host;
        }
        if let Some(port) = self.port {
            config.transport.port = port;
        }
        if let Some(name) = self.ipc_name {
            config.transport.ipc_name = name;
        }
        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    tracing::info!(?cli, "starting fahrplan-server");

    let config = cli.into_config()?;
    let transport = config.resolve_transport();

    let server = ZmqReplyServer::bind(&transport).await?;
    let service = EventService::new(server, Dispatcher::new());

    // Install signal handlers for graceful shutdown.
    let shutdown = Arc::new(Notify::new());
    let signal_shutdown = shutdown.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        tracing::info!("shutdown signal received");
        signal_shutdown.notify_waiters();
    });

    // Run the serve loop (blocks until shutdown).
    service.run(shutdown).await?;

    tracing::info!("fahrplan-server exited cleanly");
    Ok(())
}

/// Wait for SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        let mut sigterm =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .expect("failed to register SIGTERM handler");
        tokio::select! {
            _ = ctrl_c => {},
            _ = sigterm.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        ctrl_c.await.expect("failed to listen for ctrl_c");
    }
}
