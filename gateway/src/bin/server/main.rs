use std::sync::Arc;

use anyhow::Context;
use auth::TokenService;
use gateway::config::Config;
use gateway::create_router;
use gateway::RpcIdentityClient;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gateway=debug,rpc=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "gateway",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.http_port,
        identity_service = %config.identity_service.address(),
        request_timeout_ms = config.identity_service.request_timeout_ms,
        connect_timeout_ms = config.identity_service.connect_timeout_ms,
        "Configuration loaded"
    );

    let secret = config
        .signing_secret()
        .context("Refusing to start: invalid JWT signing secret")?;
    let tokens = Arc::new(TokenService::new(&secret, config.jwt.token_ttl()?));
    let identity = Arc::new(RpcIdentityClient::new(
        config.identity_service.client_config(),
    ));

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocols = "http",
        "Server Listening"
    );

    let application = create_router(identity, tokens);

    axum::serve(listener, application)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server exited successfully");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
