pub mod app_config;
pub mod audit_repo;
pub mod database;
pub mod ledger_repo;
pub mod redis_repo;
pub mod roster_repo;

pub use audit_repo::StoreAuditRepository;
pub use database::DbClient;
pub use ledger_repo::StoreLedgerRepository;
pub use redis_repo::RedisClient;
pub use roster_repo::StoreRosterRepository;
