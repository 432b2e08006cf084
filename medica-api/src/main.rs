use std::net::SocketAddr;
use std::sync::Arc;

use medica_api::{app, state::{AppState, AuthConfig, RateLimitSettings}};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "medica_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = medica_store::app_config::Config::load().expect("Failed to load config");
    tracing::info!("Starting Medica API on port {}", config.server.port);

    // Postgres Connection + migrations
    let db = medica_store::DbClient::new(&config.database.url)
        .await
        .expect("Failed to connect to Postgres");
    db.migrate().await.expect("Failed to run migrations");

    // Redis Connection
    let redis_client = medica_store::RedisClient::new(&config.redis.url)
        .await
        .expect("Failed to connect to Redis");

    let app_state = AppState {
        ledger: Arc::new(medica_store::StoreLedgerRepository::new(db.pool.clone())),
        roster: Arc::new(medica_store::StoreRosterRepository::new(db.pool.clone())),
        audit: Arc::new(medica_store::StoreAuditRepository::new(db.pool.clone())),
        redis: Arc::new(redis_client),
        auth: AuthConfig {
            secret: config.auth.jwt_secret.clone(),
            expiration: config.auth.jwt_expiration_seconds,
        },
        rate_limit: RateLimitSettings {
            requests: config.rate_limit.requests,
            window_seconds: config.rate_limit.window_seconds,
        },
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>()
    ).await.unwrap();
}
