//! Eduko Signalling Relay
//!
//! Always-on process that groups WebSocket peers into named sessions and
//! forwards opaque WebRTC signalling payloads between them.

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tracing::info;

use eduko_core::config::load_config;
use eduko_core::tracing_init::init_tracing;
use eduko_relay::registry::SessionRegistry;
use eduko_relay::server::build_router;

#[derive(Parser, Debug)]
#[command(name = "eduko-relay")]
#[command(version, about = "Eduko signalling relay - session registry and signal forwarding")]
struct Args {
    /// Address to listen on. Overrides the config file.
    #[arg(long, env = "EDUKO_RELAY_ADDR")]
    addr: Option<SocketAddr>,

    /// Maximum peers per session. Overrides the config file.
    #[arg(long)]
    max_session_peers: Option<usize>,

    /// Output logs as JSON (for structured log aggregation).
    #[arg(long)]
    log_json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing("eduko_relay=info", args.log_json);

    let config = load_config(None)?;
    let addr: SocketAddr = match args.addr {
        Some(addr) => addr,
        None => config.relay.addr.parse()?,
    };
    let max_session_peers = args
        .max_session_peers
        .unwrap_or(config.relay.max_session_peers);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        %addr,
        max_session_peers,
        "Starting eduko-relay"
    );

    let registry = Arc::new(SessionRegistry::new(max_session_peers));
    let app = build_router(registry, config.relay.max_frame_bytes);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Relay listening on ws://{addr}/ws");

    tokio::select! {
        result = axum::serve(listener, app) => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received shutdown signal");
        }
    }

    info!("Relay stopped");
    Ok(())
}
