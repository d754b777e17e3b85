//! Boothpay Server
//!
//! Bridges hosted checkout payments to a photo booth print kiosk: opens
//! checkout sessions, verifies payment notifications and triggers the
//! kiosk once a payment settles.

mod api;
mod config;
mod render;
mod server;
mod shutdown;
mod state;


use clap::Parser;
use config::ConfigLoader;
use config::env::EnvConfig;
use server::{build_router, run_server};
use state::AppState;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Boothpay - payment gateway to photo booth bridge
#[derive(Parser, Debug)]
#[command(name = "boothpay-server")]
#[command(version, about, long_about = None)]
struct Args {
    #[command(flatten)]
    env: EnvConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load `.env` before clap reads the environment
    dotenvy::dotenv().ok();

    // Initialize tracing
    init_tracing();

    // Parse command line arguments
    let args = Args::parse();

    tracing::info!("Starting boothpay-server v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = ConfigLoader::new(args.env).load().map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        e
    })?;

    let listen_addr = config.server.listen;
    tracing::info!(
        provider = %config.provider.base_url,
        public = ?config.public.base_url.as_ref().map(|url| url.as_str()),
        payment_methods = %config.public.default_payment_methods.join(","),
        kiosk = config.kiosk.endpoint.is_some(),
        "Configuration loaded"
    );

    // Create application state
    let state = AppState::new(config);

    // Build the router
    let router = build_router(state);

    // Run the server
    tracing::info!("Starting HTTP server on {}", listen_addr);
    let result = run_server(router, listen_addr).await;

    tracing::info!("Server shutdown complete");

    result.map_err(Into::into)
}

/// Initialize the tracing subscriber with environment-based filtering.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
