use async_trait::async_trait;
use medica_core::LedgerResult;
use uuid::Uuid;

use crate::accrual::{AccruedRow, PaidOutRow, PeriodBounds};
use crate::audit::AuditEntry;
use crate::models::{
    FinanceAccount, FinanceCategory, FinanceTransaction, PatientRef, Payment, PaymentPlan, Payout,
    PayoutKind, PlanStatus, SpecialistRef, StaffRef, TransactionType,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct PaymentFilter {
    pub patient_id: Option<Uuid>,
    pub specialist_id: Option<Uuid>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PayoutFilter {
    pub target_staff_id: Option<Uuid>,
    pub kind: Option<PayoutKind>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TransactionFilter {
    pub patient_id: Option<Uuid>,
    pub specialist_id: Option<Uuid>,
    pub tx_type: Option<TransactionType>,
}

/// Result of an amount edit, carried back for the audit message.
#[derive(Debug, Clone)]
pub struct PaymentAmendment {
    pub payment_id: Uuid,
    pub patient_id: Uuid,
    pub old_amount: i64,
    pub new_amount: i64,
}

/// Clinic-scoped lookups of the people the ledger references.
///
/// Every method treats a row belonging to another clinic exactly like a
/// missing row: NotFound, so tenants cannot probe each other's data.
#[async_trait]
pub trait RosterRepository: Send + Sync {
    async fn patient(&self, clinic_id: Uuid, patient_id: Uuid) -> LedgerResult<PatientRef>;

    async fn specialist(&self, clinic_id: Uuid, staff_id: Uuid) -> LedgerResult<SpecialistRef>;

    async fn staff(&self, clinic_id: Uuid, staff_id: Uuid) -> LedgerResult<StaffRef>;

    /// (staff_id, full_name) for every specialist in the clinic, name-ordered.
    async fn specialist_roster(&self, clinic_id: Uuid) -> LedgerResult<Vec<(Uuid, String)>>;

    async fn clinic_tz_offset_minutes(&self, clinic_id: Uuid) -> LedgerResult<i32>;
}

/// The durable ledger store. Every multi-entity write happens inside one
/// store transaction; aggregate updates ride in the same transaction as the
/// payment row they mirror.
#[async_trait]
pub trait LedgerRepository: Send + Sync {
    /// Record a patient payment: resolve the effective share, split the gross
    /// amount, insert the row and apply the positive aggregate deltas.
    /// `specialist_id` falls back to the patient's assigned specialist.
    async fn record_payment(
        &self,
        clinic_id: Uuid,
        patient_id: Uuid,
        specialist_id: Option<Uuid>,
        amount: i64,
        note: Option<String>,
    ) -> LedgerResult<Payment>;

    /// Edit a payment's gross amount: recompute cuts, apply signed deltas to
    /// both aggregates, and propagate the amount to any linked cash mirror.
    async fn amend_payment(
        &self,
        clinic_id: Uuid,
        payment_id: Uuid,
        new_amount: i64,
    ) -> LedgerResult<PaymentAmendment>;

    /// Delete a payment, reversing its aggregate contributions and removing
    /// any linked cash mirror. Returns the removed payment.
    async fn remove_payment(&self, clinic_id: Uuid, payment_id: Uuid) -> LedgerResult<Payment>;

    async fn list_payments(
        &self,
        clinic_id: Uuid,
        filter: PaymentFilter,
    ) -> LedgerResult<Vec<Payment>>;

    async fn create_plan(&self, plan: PaymentPlan) -> LedgerResult<PaymentPlan>;

    async fn list_plans(
        &self,
        clinic_id: Uuid,
        status: Option<PlanStatus>,
    ) -> LedgerResult<Vec<PaymentPlan>>;

    /// Drive the plan settlement state machine. The status check and the
    /// status write happen under one transaction; a terminal plan yields
    /// Conflict, a missing or foreign plan yields NotFound.
    async fn set_plan_status(
        &self,
        clinic_id: Uuid,
        plan_id: Uuid,
        requested: PlanStatus,
        actor_id: Uuid,
    ) -> LedgerResult<PaymentPlan>;

    async fn create_payout(&self, payout: Payout) -> LedgerResult<Payout>;

    async fn list_payouts(
        &self,
        clinic_id: Uuid,
        filter: PayoutFilter,
    ) -> LedgerResult<Vec<Payout>>;

    async fn create_transaction(&self, tx: FinanceTransaction) -> LedgerResult<FinanceTransaction>;

    async fn list_transactions(
        &self,
        clinic_id: Uuid,
        filter: TransactionFilter,
    ) -> LedgerResult<Vec<FinanceTransaction>>;

    /// SUM(specialist_cut) over payments, grouped by specialist.
    async fn accrued_by_specialist(
        &self,
        clinic_id: Uuid,
        period: Option<PeriodBounds>,
        specialist_id: Option<Uuid>,
    ) -> LedgerResult<Vec<AccruedRow>>;

    /// SUM(amount) over SPECIALIST payouts, grouped by target.
    async fn specialist_payouts(
        &self,
        clinic_id: Uuid,
        period: Option<PeriodBounds>,
        specialist_id: Option<Uuid>,
    ) -> LedgerResult<Vec<PaidOutRow>>;

    async fn create_account(&self, account: FinanceAccount) -> LedgerResult<FinanceAccount>;

    async fn get_account(&self, clinic_id: Uuid, account_id: Uuid) -> LedgerResult<FinanceAccount>;

    async fn list_accounts(&self, clinic_id: Uuid) -> LedgerResult<Vec<FinanceAccount>>;

    async fn create_category(&self, category: FinanceCategory) -> LedgerResult<FinanceCategory>;

    async fn get_category(
        &self,
        clinic_id: Uuid,
        category_id: Uuid,
    ) -> LedgerResult<FinanceCategory>;

    async fn list_categories(&self, clinic_id: Uuid) -> LedgerResult<Vec<FinanceCategory>>;
}

/// Append-only audit trail.
#[async_trait]
pub trait AuditRepository: Send + Sync {
    /// Best-effort append: failures are logged and swallowed, never surfaced.
    async fn append(&self, clinic_id: Uuid, actor_id: Uuid, entry: AuditEntry);

    /// Retention cleanup: delete rows older than the age floor (>= 30 days)
    /// within `clinic_scope`, and write one summary record in the same
    /// transaction as the delete. Returns the number of rows deleted.
    async fn cleanup(
        &self,
        actor_id: Uuid,
        clinic_scope: Uuid,
        older_than_days: i64,
    ) -> LedgerResult<u64>;
}
