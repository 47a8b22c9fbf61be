use std::sync::Arc;

use anyhow::Context;
use auth::TokenService;
use identity_service::config::BootstrapAdminConfig;
use identity_service::config::Config;
use identity_service::domain::auth::models::AdminBootstrap;
use identity_service::domain::auth::models::RegisterCommand;
use identity_service::domain::auth::service::AuthService;
use identity_service::domain::user::models::EmailAddress;
use identity_service::domain::user::models::NewPassword;
use identity_service::domain::user::models::Username;
use identity_service::domain::user::ports::UserRepository;
use identity_service::domain::user::service::UserService;
use identity_service::inbound::rpc::IdentityDispatcher;
use identity_service::outbound::hashing::Argon2CredentialHasher;
use identity_service::outbound::repositories::InMemoryUserRepository;
use identity_service::outbound::repositories::PostgresUserRepository;
use rpc::RpcServer;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "identity_service=debug,rpc=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "identity-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        host = %config.server.host,
        port = config.server.port,
        token_expiration_hours = config.jwt.expiration_hours,
        storage = if config.database.is_some() { "postgresql" } else { "memory" },
        "Configuration loaded"
    );

    let secret = config
        .signing_secret()
        .context("Refusing to start: invalid JWT signing secret")?;
    let tokens = Arc::new(TokenService::new(&secret, config.jwt.token_ttl()?));
    let hasher = Arc::new(Argon2CredentialHasher::new());

    match &config.database {
        Some(database) => {
            let pg_pool = PgPoolOptions::new()
                .max_connections(database.max_connections)
                .connect(&database.url)
                .await
                .context("Failed to connect to the database")?;
            tracing::info!(
                max_connections = database.max_connections,
                database = "postgresql",
                "Database connection pool created"
            );

            sqlx::migrate!("./migrations").run(&pg_pool).await?;
            tracing::info!(database = "postgresql", "Database migrations completed");

            let repository = Arc::new(PostgresUserRepository::new(pg_pool));
            run(&config, repository, hasher, tokens).await
        }
        None => {
            tracing::warn!("No database configured, users are kept in memory");
            let repository = Arc::new(InMemoryUserRepository::new());
            run(&config, repository, hasher, tokens).await
        }
    }
}

async fn run<UR: UserRepository>(
    config: &Config,
    repository: Arc<UR>,
    hasher: Arc<Argon2CredentialHasher>,
    tokens: Arc<TokenService>,
) -> Result<(), anyhow::Error> {
    let auth_service = Arc::new(AuthService::new(
        Arc::clone(&repository),
        Arc::clone(&hasher),
        tokens,
    ));
    let user_service = Arc::new(UserService::new(repository, hasher));

    if let Some(admin) = &config.bootstrap_admin {
        bootstrap_admin(&auth_service, admin).await?;
    }

    let rpc_address = config.rpc_address();
    let rpc_listener = tokio::net::TcpListener::bind(&rpc_address).await?;
    tracing::info!(
        address = %rpc_address,
        port = config.server.port,
        protocol = "rpc",
        "RPC server listening"
    );

    let dispatcher = Arc::new(IdentityDispatcher::new(auth_service, user_service));
    RpcServer::new(dispatcher)
        .with_max_frame_bytes(config.rpc.max_frame_bytes)
        .serve_with_shutdown(rpc_listener, shutdown_signal())
        .await?;

    tracing::info!("Server exited successfully");
    Ok(())
}

async fn bootstrap_admin<UR: UserRepository>(
    auth_service: &AuthService<UR, Argon2CredentialHasher>,
    admin: &BootstrapAdminConfig,
) -> Result<(), anyhow::Error> {
    let command = RegisterCommand::new(
        Username::new(admin.username.clone()).context("Invalid bootstrap admin username")?,
        EmailAddress::new(admin.email.clone()).context("Invalid bootstrap admin email")?,
        NewPassword::new(admin.password.clone()).context("Invalid bootstrap admin password")?,
    );

    match auth_service
        .bootstrap_admin(command)
        .await
        .context("Failed to bootstrap admin account")?
    {
        AdminBootstrap::Created(user) => {
            tracing::info!(user_id = %user.id, email = %user.email, "Admin account created")
        }
        AdminBootstrap::AlreadyPresent(user) => tracing::info!(
            user_id = %user.id,
            email = %user.email,
            "Admin account already present, left unchanged"
        ),
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
