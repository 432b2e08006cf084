use axum::{
    extract::State,
    http::Method,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use std::net::SocketAddr;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod accounts;
pub mod accruals;
pub mod audit_admin;
pub mod error;
pub mod middleware;
pub mod payments;
pub mod payouts;
pub mod plans;
pub mod state;
pub mod telemetry;
pub mod transactions;

pub use state::AppState;

pub fn app(state: AppState) -> Router {
    // CORS Middleware
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
            axum::http::header::USER_AGENT,
        ]);

    // Every finance route sits behind session resolution; role and feature
    // gates run per-operation inside the handlers.
    let finance = Router::new()
        .merge(plans::routes())
        .merge(payments::routes())
        .merge(payouts::routes())
        .merge(accruals::routes())
        .merge(transactions::routes())
        .merge(accounts::routes())
        .merge(audit_admin::routes())
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::session_middleware,
        ));

    Router::new()
        .route("/health", get(health))
        .nest("/v1", finance)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn_with_state(state.clone(), rate_limit_middleware))
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn rate_limit_middleware(
    State(state): State<AppState>,
    axum::extract::ConnectInfo(addr): axum::extract::ConnectInfo<SocketAddr>,
    req: axum::extract::Request,
    next: axum::middleware::Next,
) -> Result<impl IntoResponse, impl IntoResponse> {
    let ip = addr.ip().to_string();
    let key = format!("ratelimit:{}", ip);

    match state
        .redis
        .check_rate_limit(&key, state.rate_limit.requests, state.rate_limit.window_seconds)
        .await
    {
        Ok(true) => Ok(next.run(req).await),
        Ok(false) => Err((axum::http::StatusCode::TOO_MANY_REQUESTS, "Rate limit exceeded")),
        Err(_) => Ok(next.run(req).await), // Fail open
    }
}
