use async_trait::async_trait;
use chrono::{Duration, Utc};
use medica_core::{LedgerError, LedgerResult};
use medica_ledger::audit::{AuditEntry, MIN_RETENTION_DAYS};
use medica_ledger::repository::AuditRepository;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

pub struct StoreAuditRepository {
    pool: PgPool,
}

impl StoreAuditRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Raw append, shared with the settlement transaction in the ledger repository.
pub(crate) async fn insert_audit(
    conn: &mut PgConnection,
    clinic_id: Uuid,
    actor_id: Uuid,
    entry: &AuditEntry,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO audit_logs (id, clinic_id, actor_id, action, entity, entity_id, meta, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(clinic_id)
    .bind(actor_id)
    .bind(entry.action.as_str())
    .bind(entry.action.entity())
    .bind(entry.entity_id)
    .bind(&entry.meta)
    .bind(Utc::now())
    .execute(&mut *conn)
    .await?;
    Ok(())
}

#[async_trait]
impl AuditRepository for StoreAuditRepository {
    async fn append(&self, clinic_id: Uuid, actor_id: Uuid, entry: AuditEntry) {
        let mut conn = match self.pool.acquire().await {
            Ok(conn) => conn,
            Err(e) => {
                tracing::warn!("audit append skipped, no connection: {}", e);
                return;
            }
        };

        if let Err(e) = insert_audit(&mut conn, clinic_id, actor_id, &entry).await {
            tracing::warn!(
                "audit append failed for {} in clinic {}: {}",
                entry.action.as_str(),
                clinic_id,
                e
            );
        }
    }

    async fn cleanup(
        &self,
        actor_id: Uuid,
        clinic_scope: Uuid,
        older_than_days: i64,
    ) -> LedgerResult<u64> {
        if older_than_days < MIN_RETENTION_DAYS {
            return Err(LedgerError::validation(
                "older_than_days",
                format!("retention cleanup requires at least {} days", MIN_RETENTION_DAYS),
            ));
        }

        let cutoff = Utc::now() - Duration::days(older_than_days);

        // The delete and its summary record commit together.
        let mut tx = self.pool.begin().await.map_err(LedgerError::internal)?;

        let deleted = sqlx::query("DELETE FROM audit_logs WHERE clinic_id = $1 AND created_at < $2")
            .bind(clinic_scope)
            .bind(cutoff)
            .execute(&mut *tx)
            .await
            .map_err(LedgerError::internal)?
            .rows_affected();

        let summary = AuditEntry::cleanup_summary(deleted, older_than_days);
        insert_audit(&mut tx, clinic_scope, actor_id, &summary)
            .await
            .map_err(LedgerError::internal)?;

        tx.commit().await.map_err(LedgerError::internal)?;

        Ok(deleted)
    }
}
