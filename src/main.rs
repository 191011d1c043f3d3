//! drive_links server - Graph-backed link resolution for the add-in.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use drive_links::server::{create_router, AppState};
use drive_links::Exchanger;

/// Backend service for the spreadsheet link-insertion add-in.
#[derive(Parser)]
#[command(name = "drive_links")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory (tenant) ID of the app registration.
    #[arg(long, env = "TENANT_ID")]
    tenant_id: String,

    /// Application (client) ID.
    #[arg(long, env = "CLIENT_ID")]
    client_id: String,

    /// Client secret for the on-behalf-of exchange.
    #[arg(long, env = "CLIENT_SECRET")]
    client_secret: String,

    /// Port to listen on.
    #[arg(long, env = "PORT", default_value = "3000")]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "drive_links=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let exchanger = Exchanger::new(&cli.tenant_id, cli.client_id, cli.client_secret);
    let state = Arc::new(AppState::new(exchanger));
    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], cli.port));
    tracing::info!("drive_links listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
