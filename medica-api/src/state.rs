use std::sync::Arc;

use medica_ledger::repository::{AuditRepository, LedgerRepository, RosterRepository};
use medica_store::RedisClient;

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub expiration: u64,
}

#[derive(Clone)]
pub struct RateLimitSettings {
    pub requests: i64,
    pub window_seconds: i64,
}

#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<dyn LedgerRepository>,
    pub roster: Arc<dyn RosterRepository>,
    pub audit: Arc<dyn AuditRepository>,
    pub redis: Arc<RedisClient>,
    pub auth: AuthConfig,
    pub rate_limit: RateLimitSettings,
}
