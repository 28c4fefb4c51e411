use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use car_genius::{app, auth::TokenIssuer, config::AppConfig, database, AppState};

#[derive(Debug, Parser)]
#[command(name = "car-genius-server", version, about = "Car Genius booking API server")]
struct Args {
    /// Port to listen on (overrides PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Address to bind (overrides HOST)
    #[arg(long)]
    host: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up ACCESS_TOKEN_SECRET, DATABASE_URL, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("car_genius=info,car_genius_server=info,tower_http=info")),
        )
        .init();

    let args = Args::parse();
    let mut config = AppConfig::from_env();
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(host) = args.host {
        config.server.host = host;
    }
    tracing::info!("Starting Car Genius API in {:?} mode", config.environment);

    let ttl = config
        .security
        .token_ttl()
        .context("invalid SECURITY_TOKEN_EXPIRY_HOURS")?;
    let tokens = TokenIssuer::new(&config.security.token_secret, ttl)
        .context("ACCESS_TOKEN_SECRET must be set")?;

    let store = database::connect(&config.database)
        .await
        .context("failed to open document store")?;

    match store.ping().await {
        Ok(()) => tracing::info!("Pinged document store, connection ok"),
        Err(e) => tracing::error!("Document store ping failed: {}", e),
    }

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Car Genius API listening on http://{}", bind_addr);

    let state = AppState::new(store, tokens, config);
    axum::serve(listener, app(state)).await.context("server error")?;
    Ok(())
}
