use std::sync::Arc;

use anyhow::Context;
use auth::decode_secret;
use auth::TokenIssuer;
use auth::TokenVerifier;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use user_service::config::Config;
use user_service::domain::user::oidc::OidcLoginService;
use user_service::domain::user::service::UserService;
use user_service::inbound::http::router::create_router;
use user_service::inbound::http::router::AppState;
use user_service::outbound::google::GoogleAuthClient;
use user_service::outbound::repositories::PostgresProviderLinkRepository;
use user_service::outbound::repositories::PostgresUserRepository;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "user_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "user-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.http_port,
        jwt_issuer = %config.jwt.issuer,
        jwt_expiration_minutes = config.jwt.expiration_minutes,
        "Configuration loaded"
    );

    // A misconfigured secret must stop the service before it can issue a
    // single token.
    let jwt_secret = decode_secret(&config.jwt.secret, config.jwt.secret_base64)
        .context("jwt secret rejected")?;

    let pg_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database.url)
        .await?;
    tracing::info!(
        max_connections = 5,
        database = "postgresql",
        "Database connection pool created"
    );

    sqlx::migrate!("./migrations").run(&pg_pool).await?;
    tracing::info!(database = "postgresql", "Database migrations completed");

    let token_issuer = Arc::new(TokenIssuer::new(
        &jwt_secret,
        config.jwt.issuer.clone(),
        chrono::Duration::minutes(config.jwt.expiration_minutes),
    ));
    let token_verifier = Arc::new(TokenVerifier::new(
        &jwt_secret,
        config.jwt.issuer.clone(),
        config.jwt.leeway_seconds,
    ));

    let user_repository = Arc::new(PostgresUserRepository::new(pg_pool.clone()));
    let link_repository = Arc::new(PostgresProviderLinkRepository::new(pg_pool));

    let user_service = Arc::new(UserService::new(Arc::clone(&user_repository)));
    let oidc_service = Arc::new(OidcLoginService::new(user_repository, link_repository));
    let google_client = Arc::new(GoogleAuthClient::new(config.google.clone()));

    let state = AppState {
        user_service,
        oidc_service,
        google_client,
        token_issuer,
        token_verifier,
    };

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let http_application = create_router(state);
    axum::serve(http_listener, http_application).await?;

    Ok(())
}
