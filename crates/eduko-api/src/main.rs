//! Eduko Flow Endpoints
//!
//! HTTP server exposing one endpoint per flow, backed by the hosted
//! generation API.

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tracing::info;

use eduko_api::routes::{AppState, build_router};
use eduko_core::config::load_config;
use eduko_core::tracing_init::init_tracing;
use eduko_flows::GenAiClient;

#[derive(Parser, Debug)]
#[command(name = "eduko-api")]
#[command(version, about = "Eduko flow endpoints - timetables, notes, chat, and speech")]
struct Args {
    /// Address to listen on. Overrides the config file.
    #[arg(long, env = "EDUKO_API_ADDR")]
    addr: Option<SocketAddr>,

    /// Output logs as JSON (for structured log aggregation).
    #[arg(long)]
    log_json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing("eduko_api=info", args.log_json);

    // reqwest is built without a default TLS provider; install ring once.
    let _ = rustls::crypto::ring::default_provider().install_default();

    let config = load_config(None)?;
    let addr: SocketAddr = match args.addr {
        Some(addr) => addr,
        None => config.api.addr.parse()?,
    };

    let generator = GenAiClient::from_env(config.genai.clone())?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        %addr,
        model = config.genai.model,
        "Starting eduko-api"
    );

    let state = AppState {
        generator: Arc::new(generator),
    };
    let app = build_router(state, config.api.max_body_bytes);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Flow endpoints listening on http://{addr}/api");

    tokio::select! {
        result = axum::serve(listener, app) => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received shutdown signal");
        }
    }

    info!("Server stopped");
    Ok(())
}
