//! lookupd server
//!
//! Binary entry point for the lookupd lookup gateway.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use lookupd_api::{ApiConfig, ApiServer};

/// lookupd - cached gateway for WHOIS, geocoding and email services
#[derive(Parser)]
#[command(name = "lookupd")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Port to listen on
    #[arg(short, long, default_value = "8080", env = "PORT")]
    port: u16,

    /// Bind address
    #[arg(short, long, default_value = "0.0.0.0")]
    bind: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        "lookupd=debug,info"
    } else {
        "lookupd=info,warn"
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr: SocketAddr = format!("{}:{}", cli.bind, cli.port)
        .parse()
        .context("invalid bind address")?;

    info!(%addr, "starting lookupd");

    let config = ApiConfig::from_env();
    let server = ApiServer::new(config);
    server.run(addr).await.context("server error")?;

    info!("lookupd stopped");
    Ok(())
}
