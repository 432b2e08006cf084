use async_trait::async_trait;
use medica_core::{LedgerError, LedgerResult};
use medica_ledger::models::{PatientRef, SpecialistRef, StaffRef};
use medica_ledger::repository::RosterRepository;
use medica_shared::Masked;
use sqlx::PgPool;
use uuid::Uuid;

pub struct StoreRosterRepository {
    pool: PgPool,
}

impl StoreRosterRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal structs for type-safe querying
#[derive(sqlx::FromRow)]
struct PatientRow {
    id: Uuid,
    clinic_id: Uuid,
    full_name: String,
    assigned_specialist_id: Option<Uuid>,
    share_override: Option<i32>,
    total_payments: i64,
}

impl PatientRow {
    fn into_domain(self) -> PatientRef {
        PatientRef {
            id: self.id,
            clinic_id: self.clinic_id,
            full_name: Masked(self.full_name),
            assigned_specialist_id: self.assigned_specialist_id,
            share_override: self.share_override,
            total_payments: self.total_payments,
        }
    }
}

#[derive(sqlx::FromRow)]
struct SpecialistRow {
    staff_id: Uuid,
    clinic_id: Uuid,
    full_name: String,
    default_share: i32,
    total_revenue: i64,
}

impl SpecialistRow {
    fn into_domain(self) -> SpecialistRef {
        SpecialistRef {
            staff_id: self.staff_id,
            clinic_id: self.clinic_id,
            full_name: self.full_name,
            default_share: self.default_share,
            total_revenue: self.total_revenue,
        }
    }
}

#[derive(sqlx::FromRow)]
struct StaffRow {
    id: Uuid,
    clinic_id: Uuid,
    full_name: String,
    role: String,
}

#[async_trait]
impl RosterRepository for StoreRosterRepository {
    async fn patient(&self, clinic_id: Uuid, patient_id: Uuid) -> LedgerResult<PatientRef> {
        let row = sqlx::query_as::<_, PatientRow>(
            r#"
            SELECT id, clinic_id, full_name, assigned_specialist_id, share_override, total_payments
            FROM patients
            WHERE id = $1 AND clinic_id = $2
            "#,
        )
        .bind(patient_id)
        .bind(clinic_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(LedgerError::internal)?;

        row.map(PatientRow::into_domain)
            .ok_or(LedgerError::NotFound("patient"))
    }

    async fn specialist(&self, clinic_id: Uuid, staff_id: Uuid) -> LedgerResult<SpecialistRef> {
        let row = sqlx::query_as::<_, SpecialistRow>(
            r#"
            SELECT p.staff_id, p.clinic_id, s.full_name, p.default_share, p.total_revenue
            FROM specialist_profiles p
            JOIN staff s ON s.id = p.staff_id
            WHERE p.staff_id = $1 AND p.clinic_id = $2
            "#,
        )
        .bind(staff_id)
        .bind(clinic_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(LedgerError::internal)?;

        row.map(SpecialistRow::into_domain)
            .ok_or(LedgerError::NotFound("specialist"))
    }

    async fn staff(&self, clinic_id: Uuid, staff_id: Uuid) -> LedgerResult<StaffRef> {
        let row = sqlx::query_as::<_, StaffRow>(
            "SELECT id, clinic_id, full_name, role FROM staff WHERE id = $1 AND clinic_id = $2",
        )
        .bind(staff_id)
        .bind(clinic_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(LedgerError::internal)?;

        row.map(|r| StaffRef {
            id: r.id,
            clinic_id: r.clinic_id,
            full_name: r.full_name,
            role: r.role,
        })
        .ok_or(LedgerError::NotFound("staff member"))
    }

    async fn specialist_roster(&self, clinic_id: Uuid) -> LedgerResult<Vec<(Uuid, String)>> {
        let rows = sqlx::query_as::<_, (Uuid, String)>(
            r#"
            SELECT p.staff_id, s.full_name
            FROM specialist_profiles p
            JOIN staff s ON s.id = p.staff_id
            WHERE p.clinic_id = $1
            ORDER BY s.full_name
            "#,
        )
        .bind(clinic_id)
        .fetch_all(&self.pool)
        .await
        .map_err(LedgerError::internal)?;

        Ok(rows)
    }

    async fn clinic_tz_offset_minutes(&self, clinic_id: Uuid) -> LedgerResult<i32> {
        let row = sqlx::query_as::<_, (i32,)>(
            "SELECT tz_offset_minutes FROM clinics WHERE id = $1",
        )
        .bind(clinic_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(LedgerError::internal)?;

        row.map(|(tz,)| tz).ok_or(LedgerError::NotFound("clinic"))
    }
}
