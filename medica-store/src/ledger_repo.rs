use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use medica_core::{LedgerError, LedgerResult};
use medica_ledger::accrual::{AccruedRow, PaidOutRow, PeriodBounds};
use medica_ledger::aggregates::PaymentDelta;
use medica_ledger::audit::AuditEntry;
use medica_ledger::models::{
    AccountKind, CashTransaction, FinanceAccount, FinanceCategory, FinanceTransaction, PatientRef,
    Payment, PaymentPlan, Payout, PayoutCategory, PayoutKind, PlanStatus, PlanType, SpecialistRef,
    TransactionType,
};
use medica_ledger::repository::{
    LedgerRepository, PaymentAmendment, PaymentFilter, PayoutFilter, TransactionFilter,
};
use medica_ledger::settlement::{self, Transition};
use medica_ledger::split::{resolve_share, RevenueSplit};
use medica_shared::Masked;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::audit_repo::insert_audit;

pub struct StoreLedgerRepository {
    pool: PgPool,
}

impl StoreLedgerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Best-effort write of a cash drawer mirror. The mirror is a derived
    /// projection; a failure here never changes the primary outcome.
    async fn mirror_cash(&self, cash: CashTransaction) {
        if let Err(e) = insert_cash(&self.pool, &cash).await {
            tracing::warn!(
                "cash mirror write failed ({} {}): {}",
                cash.direction.as_str(),
                cash.amount,
                e
            );
        }
    }
}

fn corrupt(field: &'static str, value: &str) -> LedgerError {
    LedgerError::Internal(format!("corrupt {} value in store: {}", field, value))
}

// Internal structs for type-safe querying
#[derive(sqlx::FromRow)]
struct PaymentRow {
    id: Uuid,
    clinic_id: Uuid,
    patient_id: Uuid,
    specialist_id: Uuid,
    amount: i64,
    specialist_cut: i64,
    clinic_cut: i64,
    note: Option<String>,
    created_at: DateTime<Utc>,
}

impl PaymentRow {
    fn into_domain(self) -> Payment {
        Payment {
            id: self.id,
            clinic_id: self.clinic_id,
            patient_id: self.patient_id,
            specialist_id: self.specialist_id,
            amount: self.amount,
            specialist_cut: self.specialist_cut,
            clinic_cut: self.clinic_cut,
            note: self.note,
            created_at: self.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct PlanRow {
    id: Uuid,
    clinic_id: Uuid,
    plan_type: String,
    amount: i64,
    due_date: NaiveDate,
    description: String,
    patient_id: Option<Uuid>,
    specialist_id: Option<Uuid>,
    status: String,
    created_at: DateTime<Utc>,
    settled_at: Option<DateTime<Utc>>,
}

impl PlanRow {
    fn into_domain(self) -> LedgerResult<PaymentPlan> {
        let plan_type =
            PlanType::parse(&self.plan_type).ok_or_else(|| corrupt("plan_type", &self.plan_type))?;
        let status =
            PlanStatus::parse(&self.status).ok_or_else(|| corrupt("status", &self.status))?;
        Ok(PaymentPlan {
            id: self.id,
            clinic_id: self.clinic_id,
            plan_type,
            amount: self.amount,
            due_date: self.due_date,
            description: self.description,
            patient_id: self.patient_id,
            specialist_id: self.specialist_id,
            status,
            created_at: self.created_at,
            settled_at: self.settled_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct PayoutRow {
    id: Uuid,
    clinic_id: Uuid,
    target_staff_id: Uuid,
    target_kind: String,
    category: Option<String>,
    amount: i64,
    note: Option<String>,
    period_month: Option<i32>,
    period_year: Option<i32>,
    paid_on: NaiveDate,
    created_at: DateTime<Utc>,
}

impl PayoutRow {
    fn into_domain(self) -> LedgerResult<Payout> {
        let target_kind = PayoutKind::parse(&self.target_kind)
            .ok_or_else(|| corrupt("target_kind", &self.target_kind))?;
        let category = match self.category {
            Some(raw) => Some(PayoutCategory::parse(&raw).ok_or_else(|| corrupt("category", &raw))?),
            None => None,
        };
        Ok(Payout {
            id: self.id,
            clinic_id: self.clinic_id,
            target_staff_id: self.target_staff_id,
            target_kind,
            category,
            amount: self.amount,
            note: self.note,
            period_month: self.period_month.map(|m| m as u32),
            period_year: self.period_year,
            paid_on: self.paid_on,
            created_at: self.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct TransactionRow {
    id: Uuid,
    clinic_id: Uuid,
    tx_type: String,
    amount: i64,
    description: Option<String>,
    patient_id: Option<Uuid>,
    specialist_id: Option<Uuid>,
    account_id: Option<Uuid>,
    category_id: Option<Uuid>,
    occurred_on: NaiveDate,
    created_at: DateTime<Utc>,
}

impl TransactionRow {
    fn into_domain(self) -> LedgerResult<FinanceTransaction> {
        let tx_type =
            TransactionType::parse(&self.tx_type).ok_or_else(|| corrupt("tx_type", &self.tx_type))?;
        Ok(FinanceTransaction {
            id: self.id,
            clinic_id: self.clinic_id,
            tx_type,
            amount: self.amount,
            description: self.description,
            patient_id: self.patient_id,
            specialist_id: self.specialist_id,
            account_id: self.account_id,
            category_id: self.category_id,
            occurred_on: self.occurred_on,
            created_at: self.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct AccountRow {
    id: Uuid,
    clinic_id: Uuid,
    name: String,
    kind: String,
}

impl AccountRow {
    fn into_domain(self) -> LedgerResult<FinanceAccount> {
        let kind = AccountKind::parse(&self.kind).ok_or_else(|| corrupt("kind", &self.kind))?;
        Ok(FinanceAccount {
            id: self.id,
            clinic_id: self.clinic_id,
            name: self.name,
            kind,
        })
    }
}

#[derive(sqlx::FromRow)]
struct CategoryRow {
    id: Uuid,
    clinic_id: Uuid,
    name: String,
    kind: String,
}

impl CategoryRow {
    fn into_domain(self) -> LedgerResult<FinanceCategory> {
        let kind = TransactionType::parse(&self.kind).ok_or_else(|| corrupt("kind", &self.kind))?;
        Ok(FinanceCategory {
            id: self.id,
            clinic_id: self.clinic_id,
            name: self.name,
            kind,
        })
    }
}

#[derive(sqlx::FromRow)]
struct SumRow {
    specialist_id: Uuid,
    amount: i64,
}

// ============================================================================
// Transaction-scoped helpers
// ============================================================================

async fn fetch_patient_tx(
    tx: &mut Transaction<'_, Postgres>,
    clinic_id: Uuid,
    patient_id: Uuid,
) -> LedgerResult<PatientRef> {
    #[derive(sqlx::FromRow)]
    struct Row {
        id: Uuid,
        clinic_id: Uuid,
        full_name: String,
        assigned_specialist_id: Option<Uuid>,
        share_override: Option<i32>,
        total_payments: i64,
    }

    let row = sqlx::query_as::<_, Row>(
        r#"
        SELECT id, clinic_id, full_name, assigned_specialist_id, share_override, total_payments
        FROM patients
        WHERE id = $1 AND clinic_id = $2
        "#,
    )
    .bind(patient_id)
    .bind(clinic_id)
    .fetch_optional(&mut **tx)
    .await
    .map_err(LedgerError::internal)?;

    row.map(|r| PatientRef {
        id: r.id,
        clinic_id: r.clinic_id,
        full_name: Masked(r.full_name),
        assigned_specialist_id: r.assigned_specialist_id,
        share_override: r.share_override,
        total_payments: r.total_payments,
    })
    .ok_or(LedgerError::NotFound("patient"))
}

async fn fetch_specialist_tx(
    tx: &mut Transaction<'_, Postgres>,
    clinic_id: Uuid,
    staff_id: Uuid,
) -> LedgerResult<Option<SpecialistRef>> {
    #[derive(sqlx::FromRow)]
    struct Row {
        staff_id: Uuid,
        clinic_id: Uuid,
        full_name: String,
        default_share: i32,
        total_revenue: i64,
    }

    let row = sqlx::query_as::<_, Row>(
        r#"
        SELECT p.staff_id, p.clinic_id, s.full_name, p.default_share, p.total_revenue
        FROM specialist_profiles p
        JOIN staff s ON s.id = p.staff_id
        WHERE p.staff_id = $1 AND p.clinic_id = $2
        "#,
    )
    .bind(staff_id)
    .bind(clinic_id)
    .fetch_optional(&mut **tx)
    .await
    .map_err(LedgerError::internal)?;

    Ok(row.map(|r| SpecialistRef {
        staff_id: r.staff_id,
        clinic_id: r.clinic_id,
        full_name: r.full_name,
        default_share: r.default_share,
        total_revenue: r.total_revenue,
    }))
}

async fn insert_payment_tx(
    tx: &mut Transaction<'_, Postgres>,
    payment: &Payment,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO payments (id, clinic_id, patient_id, specialist_id, amount, specialist_cut, clinic_cut, note, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        "#,
    )
    .bind(payment.id)
    .bind(payment.clinic_id)
    .bind(payment.patient_id)
    .bind(payment.specialist_id)
    .bind(payment.amount)
    .bind(payment.specialist_cut)
    .bind(payment.clinic_cut)
    .bind(&payment.note)
    .bind(payment.created_at)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// The single enforcement point for the two denormalized aggregates.
///
/// Both updates are signed increments so that concurrent mutations of
/// different payments serialize correctly at the store level.
async fn apply_payment_delta(
    tx: &mut Transaction<'_, Postgres>,
    clinic_id: Uuid,
    delta: PaymentDelta,
) -> LedgerResult<()> {
    let patient = sqlx::query(
        "UPDATE patients SET total_payments = total_payments + $1 WHERE id = $2 AND clinic_id = $3",
    )
    .bind(delta.amount_delta)
    .bind(delta.patient_id)
    .bind(clinic_id)
    .execute(&mut **tx)
    .await
    .map_err(LedgerError::internal)?;

    if patient.rows_affected() != 1 {
        return Err(LedgerError::Internal(format!(
            "patient aggregate row missing for {}",
            delta.patient_id
        )));
    }

    let specialist = sqlx::query(
        "UPDATE specialist_profiles SET total_revenue = total_revenue + $1 WHERE staff_id = $2 AND clinic_id = $3",
    )
    .bind(delta.specialist_cut_delta)
    .bind(delta.specialist_id)
    .bind(clinic_id)
    .execute(&mut **tx)
    .await
    .map_err(LedgerError::internal)?;

    if specialist.rows_affected() != 1 {
        return Err(LedgerError::Internal(format!(
            "specialist aggregate row missing for {}",
            delta.specialist_id
        )));
    }

    Ok(())
}

async fn insert_transaction_tx(
    tx: &mut Transaction<'_, Postgres>,
    record: &FinanceTransaction,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO finance_transactions (id, clinic_id, tx_type, amount, description, patient_id, specialist_id, account_id, category_id, occurred_on, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        "#,
    )
    .bind(record.id)
    .bind(record.clinic_id)
    .bind(record.tx_type.as_str())
    .bind(record.amount)
    .bind(&record.description)
    .bind(record.patient_id)
    .bind(record.specialist_id)
    .bind(record.account_id)
    .bind(record.category_id)
    .bind(record.occurred_on)
    .bind(record.created_at)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

async fn insert_cash(pool: &PgPool, cash: &CashTransaction) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO cash_transactions (id, clinic_id, direction, amount, category, description, payment_id, payout_id, plan_id, occurred_on, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        "#,
    )
    .bind(cash.id)
    .bind(cash.clinic_id)
    .bind(cash.direction.as_str())
    .bind(cash.amount)
    .bind(&cash.category)
    .bind(&cash.description)
    .bind(cash.payment_id)
    .bind(cash.payout_id)
    .bind(cash.plan_id)
    .bind(cash.occurred_on)
    .bind(cash.created_at)
    .execute(pool)
    .await?;
    Ok(())
}

#[async_trait]
impl LedgerRepository for StoreLedgerRepository {
    async fn record_payment(
        &self,
        clinic_id: Uuid,
        patient_id: Uuid,
        specialist_id: Option<Uuid>,
        amount: i64,
        note: Option<String>,
    ) -> LedgerResult<Payment> {
        let mut tx = self.pool.begin().await.map_err(LedgerError::internal)?;

        let patient = fetch_patient_tx(&mut tx, clinic_id, patient_id).await?;
        let specialist_id = specialist_id
            .or(patient.assigned_specialist_id)
            .ok_or_else(|| {
                LedgerError::validation("specialist_id", "patient has no assigned specialist")
            })?;
        let specialist = fetch_specialist_tx(&mut tx, clinic_id, specialist_id)
            .await?
            .ok_or(LedgerError::NotFound("specialist"))?;

        let share = resolve_share(patient.share_override, Some(specialist.default_share));
        let split = RevenueSplit::compute(amount, share)?;
        let payment = Payment::new(clinic_id, patient_id, specialist_id, amount, split, note);

        insert_payment_tx(&mut tx, &payment).await.map_err(LedgerError::internal)?;
        apply_payment_delta(&mut tx, clinic_id, PaymentDelta::recorded(&payment)).await?;

        tx.commit().await.map_err(LedgerError::internal)?;

        self.mirror_cash(CashTransaction::for_payment(&payment)).await;

        Ok(payment)
    }

    async fn amend_payment(
        &self,
        clinic_id: Uuid,
        payment_id: Uuid,
        new_amount: i64,
    ) -> LedgerResult<PaymentAmendment> {
        let mut tx = self.pool.begin().await.map_err(LedgerError::internal)?;

        let row = sqlx::query_as::<_, PaymentRow>(
            r#"
            SELECT id, clinic_id, patient_id, specialist_id, amount, specialist_cut, clinic_cut, note, created_at
            FROM payments
            WHERE id = $1 AND clinic_id = $2
            FOR UPDATE
            "#,
        )
        .bind(payment_id)
        .bind(clinic_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(LedgerError::internal)?;

        let payment = row
            .map(PaymentRow::into_domain)
            .ok_or(LedgerError::NotFound("payment"))?;

        // Re-resolve the effective share; the override may have changed since
        // the payment was recorded.
        let patient = fetch_patient_tx(&mut tx, clinic_id, payment.patient_id).await?;
        let specialist = fetch_specialist_tx(&mut tx, clinic_id, payment.specialist_id)
            .await?
            .ok_or(LedgerError::NotFound("specialist"))?;

        let share = resolve_share(patient.share_override, Some(specialist.default_share));
        let split = RevenueSplit::compute(new_amount, share)?;
        let delta = PaymentDelta::amended(&payment, new_amount, split);

        sqlx::query(
            "UPDATE payments SET amount = $1, specialist_cut = $2, clinic_cut = $3 WHERE id = $4",
        )
        .bind(new_amount)
        .bind(split.specialist_cut)
        .bind(split.clinic_cut)
        .bind(payment.id)
        .execute(&mut *tx)
        .await
        .map_err(LedgerError::internal)?;

        apply_payment_delta(&mut tx, clinic_id, delta).await?;

        // Keep the cash drawer mirror in lockstep with the edit.
        sqlx::query(
            "UPDATE cash_transactions SET amount = $1 WHERE payment_id = $2 AND clinic_id = $3",
        )
        .bind(new_amount)
        .bind(payment.id)
        .bind(clinic_id)
        .execute(&mut *tx)
        .await
        .map_err(LedgerError::internal)?;

        tx.commit().await.map_err(LedgerError::internal)?;

        Ok(PaymentAmendment {
            payment_id: payment.id,
            patient_id: payment.patient_id,
            old_amount: payment.amount,
            new_amount,
        })
    }

    async fn remove_payment(&self, clinic_id: Uuid, payment_id: Uuid) -> LedgerResult<Payment> {
        let mut tx = self.pool.begin().await.map_err(LedgerError::internal)?;

        let row = sqlx::query_as::<_, PaymentRow>(
            r#"
            SELECT id, clinic_id, patient_id, specialist_id, amount, specialist_cut, clinic_cut, note, created_at
            FROM payments
            WHERE id = $1 AND clinic_id = $2
            FOR UPDATE
            "#,
        )
        .bind(payment_id)
        .bind(clinic_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(LedgerError::internal)?;

        let payment = row
            .map(PaymentRow::into_domain)
            .ok_or(LedgerError::NotFound("payment"))?;

        sqlx::query("DELETE FROM payments WHERE id = $1")
            .bind(payment.id)
            .execute(&mut *tx)
            .await
            .map_err(LedgerError::internal)?;

        apply_payment_delta(&mut tx, clinic_id, PaymentDelta::removed(&payment)).await?;

        sqlx::query("DELETE FROM cash_transactions WHERE payment_id = $1 AND clinic_id = $2")
            .bind(payment.id)
            .bind(clinic_id)
            .execute(&mut *tx)
            .await
            .map_err(LedgerError::internal)?;

        tx.commit().await.map_err(LedgerError::internal)?;

        Ok(payment)
    }

    async fn list_payments(
        &self,
        clinic_id: Uuid,
        filter: PaymentFilter,
    ) -> LedgerResult<Vec<Payment>> {
        let rows = sqlx::query_as::<_, PaymentRow>(
            r#"
            SELECT id, clinic_id, patient_id, specialist_id, amount, specialist_cut, clinic_cut, note, created_at
            FROM payments
            WHERE clinic_id = $1
              AND ($2::uuid IS NULL OR patient_id = $2)
              AND ($3::uuid IS NULL OR specialist_id = $3)
            ORDER BY created_at DESC
            "#,
        )
        .bind(clinic_id)
        .bind(filter.patient_id)
        .bind(filter.specialist_id)
        .fetch_all(&self.pool)
        .await
        .map_err(LedgerError::internal)?;

        Ok(rows.into_iter().map(PaymentRow::into_domain).collect())
    }

    async fn create_plan(&self, plan: PaymentPlan) -> LedgerResult<PaymentPlan> {
        sqlx::query(
            r#"
            INSERT INTO payment_plans (id, clinic_id, plan_type, amount, due_date, description, patient_id, specialist_id, status, created_at, settled_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(plan.id)
        .bind(plan.clinic_id)
        .bind(plan.plan_type.as_str())
        .bind(plan.amount)
        .bind(plan.due_date)
        .bind(&plan.description)
        .bind(plan.patient_id)
        .bind(plan.specialist_id)
        .bind(plan.status.as_str())
        .bind(plan.created_at)
        .bind(plan.settled_at)
        .execute(&self.pool)
        .await
        .map_err(LedgerError::internal)?;

        Ok(plan)
    }

    async fn list_plans(
        &self,
        clinic_id: Uuid,
        status: Option<PlanStatus>,
    ) -> LedgerResult<Vec<PaymentPlan>> {
        let rows = sqlx::query_as::<_, PlanRow>(
            r#"
            SELECT id, clinic_id, plan_type, amount, due_date, description, patient_id, specialist_id, status, created_at, settled_at
            FROM payment_plans
            WHERE clinic_id = $1
              AND ($2::text IS NULL OR status = $2)
            ORDER BY created_at DESC
            "#,
        )
        .bind(clinic_id)
        .bind(status.map(|s| s.as_str()))
        .fetch_all(&self.pool)
        .await
        .map_err(LedgerError::internal)?;

        rows.into_iter().map(PlanRow::into_domain).collect()
    }

    async fn set_plan_status(
        &self,
        clinic_id: Uuid,
        plan_id: Uuid,
        requested: PlanStatus,
        actor_id: Uuid,
    ) -> LedgerResult<PaymentPlan> {
        let mut tx = self.pool.begin().await.map_err(LedgerError::internal)?;

        // Status check and status write share this transaction; the row lock
        // prevents two concurrent settlements from both observing PLANNED.
        let row = sqlx::query_as::<_, PlanRow>(
            r#"
            SELECT id, clinic_id, plan_type, amount, due_date, description, patient_id, specialist_id, status, created_at, settled_at
            FROM payment_plans
            WHERE id = $1 AND clinic_id = $2
            FOR UPDATE
            "#,
        )
        .bind(plan_id)
        .bind(clinic_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(LedgerError::internal)?;

        let plan = row
            .ok_or(LedgerError::NotFound("payment plan"))?
            .into_domain()?;

        match settlement::check_transition(plan.status, requested)? {
            Transition::Noop => {
                tx.commit().await.map_err(LedgerError::internal)?;
                Ok(plan)
            }
            Transition::Cancel => {
                let updated = sqlx::query(
                    "UPDATE payment_plans SET status = 'CANCELED' WHERE id = $1 AND status = 'PLANNED'",
                )
                .bind(plan.id)
                .execute(&mut *tx)
                .await
                .map_err(LedgerError::internal)?;

                if updated.rows_affected() == 0 {
                    return Err(LedgerError::Conflict(
                        "plan status changed concurrently".to_string(),
                    ));
                }

                let entry = AuditEntry::plan_canceled(&plan);
                insert_audit(&mut *tx, clinic_id, actor_id, &entry)
                    .await
                    .map_err(LedgerError::internal)?;

                tx.commit().await.map_err(LedgerError::internal)?;

                let mut canceled = plan;
                canceled.status = PlanStatus::Canceled;
                Ok(canceled)
            }
            Transition::Settle => {
                let settled_at = Utc::now();
                let updated = sqlx::query(
                    "UPDATE payment_plans SET status = 'PAID', settled_at = $1 WHERE id = $2 AND status = 'PLANNED'",
                )
                .bind(settled_at)
                .bind(plan.id)
                .execute(&mut *tx)
                .await
                .map_err(LedgerError::internal)?;

                if updated.rows_affected() == 0 {
                    return Err(LedgerError::Conflict(
                        "plan status changed concurrently".to_string(),
                    ));
                }

                // Resolve the people behind an incoming plan; a payment is only
                // materialized when the patient has an assigned specialist.
                let patient = match (plan.plan_type, plan.patient_id) {
                    (PlanType::Incoming, Some(patient_id)) => {
                        Some(fetch_patient_tx(&mut tx, clinic_id, patient_id).await?)
                    }
                    _ => None,
                };
                let specialist = match patient.as_ref().and_then(|p| p.assigned_specialist_id) {
                    Some(staff_id) => fetch_specialist_tx(&mut tx, clinic_id, staff_id).await?,
                    None => None,
                };

                let effects =
                    settlement::materialize(&plan, patient.as_ref(), specialist.as_ref())?;

                insert_transaction_tx(&mut tx, &effects.transaction)
                    .await
                    .map_err(LedgerError::internal)?;

                if let Some(materialized) = &effects.payment {
                    insert_payment_tx(&mut tx, &materialized.payment)
                        .await
                        .map_err(LedgerError::internal)?;
                    apply_payment_delta(&mut tx, clinic_id, materialized.delta).await?;
                }

                let entry = AuditEntry::plan_settled(
                    &plan,
                    effects.payment.as_ref().map(|m| &m.payment),
                );
                insert_audit(&mut *tx, clinic_id, actor_id, &entry)
                    .await
                    .map_err(LedgerError::internal)?;

                tx.commit().await.map_err(LedgerError::internal)?;

                self.mirror_cash(effects.cash).await;

                let mut settled = plan;
                settled.status = PlanStatus::Paid;
                settled.settled_at = Some(settled_at);
                Ok(settled)
            }
        }
    }

    async fn create_payout(&self, payout: Payout) -> LedgerResult<Payout> {
        sqlx::query(
            r#"
            INSERT INTO payouts (id, clinic_id, target_staff_id, target_kind, category, amount, note, period_month, period_year, paid_on, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(payout.id)
        .bind(payout.clinic_id)
        .bind(payout.target_staff_id)
        .bind(payout.target_kind.as_str())
        .bind(payout.category.map(|c| c.as_str()))
        .bind(payout.amount)
        .bind(&payout.note)
        .bind(payout.period_month.map(|m| m as i32))
        .bind(payout.period_year)
        .bind(payout.paid_on)
        .bind(payout.created_at)
        .execute(&self.pool)
        .await
        .map_err(LedgerError::internal)?;

        self.mirror_cash(CashTransaction::for_payout(&payout)).await;

        Ok(payout)
    }

    async fn list_payouts(
        &self,
        clinic_id: Uuid,
        filter: PayoutFilter,
    ) -> LedgerResult<Vec<Payout>> {
        let rows = sqlx::query_as::<_, PayoutRow>(
            r#"
            SELECT id, clinic_id, target_staff_id, target_kind, category, amount, note, period_month, period_year, paid_on, created_at
            FROM payouts
            WHERE clinic_id = $1
              AND ($2::uuid IS NULL OR target_staff_id = $2)
              AND ($3::text IS NULL OR target_kind = $3)
            ORDER BY paid_on DESC, created_at DESC
            "#,
        )
        .bind(clinic_id)
        .bind(filter.target_staff_id)
        .bind(filter.kind.map(|k| k.as_str()))
        .fetch_all(&self.pool)
        .await
        .map_err(LedgerError::internal)?;

        rows.into_iter().map(PayoutRow::into_domain).collect()
    }

    async fn create_transaction(&self, tx: FinanceTransaction) -> LedgerResult<FinanceTransaction> {
        sqlx::query(
            r#"
            INSERT INTO finance_transactions (id, clinic_id, tx_type, amount, description, patient_id, specialist_id, account_id, category_id, occurred_on, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(tx.id)
        .bind(tx.clinic_id)
        .bind(tx.tx_type.as_str())
        .bind(tx.amount)
        .bind(&tx.description)
        .bind(tx.patient_id)
        .bind(tx.specialist_id)
        .bind(tx.account_id)
        .bind(tx.category_id)
        .bind(tx.occurred_on)
        .bind(tx.created_at)
        .execute(&self.pool)
        .await
        .map_err(LedgerError::internal)?;

        Ok(tx)
    }

    async fn list_transactions(
        &self,
        clinic_id: Uuid,
        filter: TransactionFilter,
    ) -> LedgerResult<Vec<FinanceTransaction>> {
        let rows = sqlx::query_as::<_, TransactionRow>(
            r#"
            SELECT id, clinic_id, tx_type, amount, description, patient_id, specialist_id, account_id, category_id, occurred_on, created_at
            FROM finance_transactions
            WHERE clinic_id = $1
              AND ($2::uuid IS NULL OR patient_id = $2)
              AND ($3::uuid IS NULL OR specialist_id = $3)
              AND ($4::text IS NULL OR tx_type = $4)
            ORDER BY occurred_on DESC, created_at DESC
            "#,
        )
        .bind(clinic_id)
        .bind(filter.patient_id)
        .bind(filter.specialist_id)
        .bind(filter.tx_type.map(|t| t.as_str()))
        .fetch_all(&self.pool)
        .await
        .map_err(LedgerError::internal)?;

        rows.into_iter().map(TransactionRow::into_domain).collect()
    }

    async fn accrued_by_specialist(
        &self,
        clinic_id: Uuid,
        period: Option<PeriodBounds>,
        specialist_id: Option<Uuid>,
    ) -> LedgerResult<Vec<AccruedRow>> {
        let rows = sqlx::query_as::<_, SumRow>(
            r#"
            SELECT specialist_id, COALESCE(SUM(specialist_cut), 0)::bigint AS amount
            FROM payments
            WHERE clinic_id = $1
              AND ($2::uuid IS NULL OR specialist_id = $2)
              AND ($3::timestamptz IS NULL OR created_at >= $3)
              AND ($4::timestamptz IS NULL OR created_at <= $4)
            GROUP BY specialist_id
            "#,
        )
        .bind(clinic_id)
        .bind(specialist_id)
        .bind(period.map(|p| p.start))
        .bind(period.map(|p| p.end))
        .fetch_all(&self.pool)
        .await
        .map_err(LedgerError::internal)?;

        Ok(rows
            .into_iter()
            .map(|r| AccruedRow {
                specialist_id: r.specialist_id,
                amount: r.amount,
            })
            .collect())
    }

    async fn specialist_payouts(
        &self,
        clinic_id: Uuid,
        period: Option<PeriodBounds>,
        specialist_id: Option<Uuid>,
    ) -> LedgerResult<Vec<PaidOutRow>> {
        let rows = sqlx::query_as::<_, SumRow>(
            r#"
            SELECT target_staff_id AS specialist_id, COALESCE(SUM(amount), 0)::bigint AS amount
            FROM payouts
            WHERE clinic_id = $1
              AND target_kind = 'SPECIALIST'
              AND ($2::uuid IS NULL OR target_staff_id = $2)
              AND ($3::date IS NULL OR paid_on >= $3)
              AND ($4::date IS NULL OR paid_on <= $4)
            GROUP BY target_staff_id
            "#,
        )
        .bind(clinic_id)
        .bind(specialist_id)
        .bind(period.map(|p| p.start_day))
        .bind(period.map(|p| p.end_day))
        .fetch_all(&self.pool)
        .await
        .map_err(LedgerError::internal)?;

        Ok(rows
            .into_iter()
            .map(|r| PaidOutRow {
                specialist_id: r.specialist_id,
                amount: r.amount,
            })
            .collect())
    }

    async fn create_account(&self, account: FinanceAccount) -> LedgerResult<FinanceAccount> {
        sqlx::query("INSERT INTO finance_accounts (id, clinic_id, name, kind) VALUES ($1, $2, $3, $4)")
            .bind(account.id)
            .bind(account.clinic_id)
            .bind(&account.name)
            .bind(account.kind.as_str())
            .execute(&self.pool)
            .await
            .map_err(LedgerError::internal)?;

        Ok(account)
    }

    async fn get_account(&self, clinic_id: Uuid, account_id: Uuid) -> LedgerResult<FinanceAccount> {
        let row = sqlx::query_as::<_, AccountRow>(
            "SELECT id, clinic_id, name, kind FROM finance_accounts WHERE id = $1 AND clinic_id = $2",
        )
        .bind(account_id)
        .bind(clinic_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(LedgerError::internal)?;

        row.ok_or(LedgerError::NotFound("finance account"))?.into_domain()
    }

    async fn list_accounts(&self, clinic_id: Uuid) -> LedgerResult<Vec<FinanceAccount>> {
        let rows = sqlx::query_as::<_, AccountRow>(
            "SELECT id, clinic_id, name, kind FROM finance_accounts WHERE clinic_id = $1 ORDER BY name",
        )
        .bind(clinic_id)
        .fetch_all(&self.pool)
        .await
        .map_err(LedgerError::internal)?;

        rows.into_iter().map(AccountRow::into_domain).collect()
    }

    async fn create_category(&self, category: FinanceCategory) -> LedgerResult<FinanceCategory> {
        sqlx::query("INSERT INTO finance_categories (id, clinic_id, name, kind) VALUES ($1, $2, $3, $4)")
            .bind(category.id)
            .bind(category.clinic_id)
            .bind(&category.name)
            .bind(category.kind.as_str())
            .execute(&self.pool)
            .await
            .map_err(LedgerError::internal)?;

        Ok(category)
    }

    async fn get_category(
        &self,
        clinic_id: Uuid,
        category_id: Uuid,
    ) -> LedgerResult<FinanceCategory> {
        let row = sqlx::query_as::<_, CategoryRow>(
            "SELECT id, clinic_id, name, kind FROM finance_categories WHERE id = $1 AND clinic_id = $2",
        )
        .bind(category_id)
        .bind(clinic_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(LedgerError::internal)?;

        row.ok_or(LedgerError::NotFound("finance category"))?.into_domain()
    }

    async fn list_categories(&self, clinic_id: Uuid) -> LedgerResult<Vec<FinanceCategory>> {
        let rows = sqlx::query_as::<_, CategoryRow>(
            "SELECT id, clinic_id, name, kind FROM finance_categories WHERE clinic_id = $1 ORDER BY name",
        )
        .bind(clinic_id)
        .fetch_all(&self.pool)
        .await
        .map_err(LedgerError::internal)?;

        rows.into_iter().map(CategoryRow::into_domain).collect()
    }
}
