use chrono::{DateTime, NaiveDate, Utc};
use medica_shared::Masked;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::split::RevenueSplit;

/// Payment plan lifecycle status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlanStatus {
    Planned,
    Paid,
    Canceled,
}

impl PlanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanStatus::Planned => "PLANNED",
            PlanStatus::Paid => "PAID",
            PlanStatus::Canceled => "CANCELED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PLANNED" => Some(PlanStatus::Planned),
            "PAID" => Some(PlanStatus::Paid),
            "CANCELED" => Some(PlanStatus::Canceled),
            _ => None,
        }
    }

    /// PAID and CANCELED are terminal; only PLANNED may transition.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, PlanStatus::Planned)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlanType {
    Incoming,
    Outgoing,
}

impl PlanType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanType::Incoming => "INCOMING",
            PlanType::Outgoing => "OUTGOING",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "INCOMING" => Some(PlanType::Incoming),
            "OUTGOING" => Some(PlanType::Outgoing),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "INCOME",
            TransactionType::Expense => "EXPENSE",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "INCOME" => Some(TransactionType::Income),
            "EXPENSE" => Some(TransactionType::Expense),
            _ => None,
        }
    }
}

/// Cash drawer movement direction
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CashDirection {
    In,
    Out,
}

impl CashDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            CashDirection::In => "IN",
            CashDirection::Out => "OUT",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "IN" => Some(CashDirection::In),
            "OUT" => Some(CashDirection::Out),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PayoutKind {
    Specialist,
    Staff,
}

impl PayoutKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PayoutKind::Specialist => "SPECIALIST",
            PayoutKind::Staff => "STAFF",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "SPECIALIST" => Some(PayoutKind::Specialist),
            "STAFF" => Some(PayoutKind::Staff),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PayoutCategory {
    Salary,
    Bonus,
    Other,
}

impl PayoutCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            PayoutCategory::Salary => "SALARY",
            PayoutCategory::Bonus => "BONUS",
            PayoutCategory::Other => "OTHER",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "SALARY" => Some(PayoutCategory::Salary),
            "BONUS" => Some(PayoutCategory::Bonus),
            "OTHER" => Some(PayoutCategory::Other),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountKind {
    Cash,
    Bank,
    Other,
}

impl AccountKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountKind::Cash => "CASH",
            AccountKind::Bank => "BANK",
            AccountKind::Other => "OTHER",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "CASH" => Some(AccountKind::Cash),
            "BANK" => Some(AccountKind::Bank),
            "OTHER" => Some(AccountKind::Other),
            _ => None,
        }
    }
}

/// A realized, specialist-attributable income event.
///
/// Invariant: `amount == specialist_cut + clinic_cut` at all times.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub id: Uuid,
    pub clinic_id: Uuid,
    pub patient_id: Uuid,
    pub specialist_id: Uuid,
    pub amount: i64,
    pub specialist_cut: i64,
    pub clinic_cut: i64,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Payment {
    pub fn new(
        clinic_id: Uuid,
        patient_id: Uuid,
        specialist_id: Uuid,
        amount: i64,
        split: RevenueSplit,
        note: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            clinic_id,
            patient_id,
            specialist_id,
            amount,
            specialist_cut: split.specialist_cut,
            clinic_cut: split.clinic_cut,
            note,
            created_at: Utc::now(),
        }
    }
}

/// A promise of future income or expense, not yet realized in the ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentPlan {
    pub id: Uuid,
    pub clinic_id: Uuid,
    pub plan_type: PlanType,
    pub amount: i64,
    pub due_date: NaiveDate,
    pub description: String,
    pub patient_id: Option<Uuid>,
    pub specialist_id: Option<Uuid>,
    pub status: PlanStatus,
    pub created_at: DateTime<Utc>,
    pub settled_at: Option<DateTime<Utc>>,
}

impl PaymentPlan {
    pub fn new(
        clinic_id: Uuid,
        plan_type: PlanType,
        amount: i64,
        due_date: NaiveDate,
        description: String,
        patient_id: Option<Uuid>,
        specialist_id: Option<Uuid>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            clinic_id,
            plan_type,
            amount,
            due_date,
            description,
            patient_id,
            specialist_id,
            status: PlanStatus::Planned,
            created_at: Utc::now(),
            settled_at: None,
        }
    }
}

/// A disbursement out of the clinic to a specialist or staff member.
///
/// Immutable once created; corrections are made via new offsetting payouts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payout {
    pub id: Uuid,
    pub clinic_id: Uuid,
    pub target_staff_id: Uuid,
    pub target_kind: PayoutKind,
    pub category: Option<PayoutCategory>,
    pub amount: i64,
    pub note: Option<String>,
    pub period_month: Option<u32>,
    pub period_year: Option<i32>,
    pub paid_on: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl Payout {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        clinic_id: Uuid,
        target_staff_id: Uuid,
        target_kind: PayoutKind,
        category: Option<PayoutCategory>,
        amount: i64,
        note: Option<String>,
        period_month: Option<u32>,
        period_year: Option<i32>,
        paid_on: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            clinic_id,
            target_staff_id,
            target_kind,
            category,
            amount,
            note,
            period_month,
            period_year,
            paid_on,
            created_at: Utc::now(),
        }
    }
}

/// A generic clinic-level income/expense record outside the specialist-split model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinanceTransaction {
    pub id: Uuid,
    pub clinic_id: Uuid,
    pub tx_type: TransactionType,
    pub amount: i64,
    pub description: Option<String>,
    pub patient_id: Option<Uuid>,
    pub specialist_id: Option<Uuid>,
    pub account_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub occurred_on: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl FinanceTransaction {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        clinic_id: Uuid,
        tx_type: TransactionType,
        amount: i64,
        description: Option<String>,
        patient_id: Option<Uuid>,
        specialist_id: Option<Uuid>,
        account_id: Option<Uuid>,
        category_id: Option<Uuid>,
        occurred_on: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            clinic_id,
            tx_type,
            amount,
            description,
            patient_id,
            specialist_id,
            account_id,
            category_id,
            occurred_on,
            created_at: Utc::now(),
        }
    }
}

/// Cash-drawer mirror of a money movement.
///
/// This is a derived, reconcilable projection of the primary ledger rows, never
/// a source of truth: its writes are best-effort by contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashTransaction {
    pub id: Uuid,
    pub clinic_id: Uuid,
    pub direction: CashDirection,
    pub amount: i64,
    pub category: String,
    pub description: Option<String>,
    pub payment_id: Option<Uuid>,
    pub payout_id: Option<Uuid>,
    pub plan_id: Option<Uuid>,
    pub occurred_on: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl CashTransaction {
    fn blank(clinic_id: Uuid, direction: CashDirection, amount: i64, category: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            clinic_id,
            direction,
            amount,
            category: category.to_string(),
            description: None,
            payment_id: None,
            payout_id: None,
            plan_id: None,
            occurred_on: Utc::now().date_naive(),
            created_at: Utc::now(),
        }
    }

    /// Mirror for a directly recorded patient payment.
    pub fn for_payment(payment: &Payment) -> Self {
        let mut cash = Self::blank(
            payment.clinic_id,
            CashDirection::In,
            payment.amount,
            "PATIENT_PAYMENT",
        );
        cash.payment_id = Some(payment.id);
        cash
    }

    /// Mirror for a payout; category derived from the payout's own category.
    pub fn for_payout(payout: &Payout) -> Self {
        let category = payout
            .category
            .map(|c| c.as_str())
            .unwrap_or(match payout.target_kind {
                PayoutKind::Specialist => "SPECIALIST_PAYOUT",
                PayoutKind::Staff => "STAFF_PAYOUT",
            });
        let mut cash = Self::blank(payout.clinic_id, CashDirection::Out, payout.amount, category);
        cash.payout_id = Some(payout.id);
        cash.description = payout.note.clone();
        cash
    }

    /// Mirror for a settled payment plan.
    pub fn for_settled_plan(plan: &PaymentPlan) -> Self {
        let (direction, category) = match plan.plan_type {
            PlanType::Incoming => (CashDirection::In, "PLAN_INCOME"),
            PlanType::Outgoing => (CashDirection::Out, "PLAN_EXPENSE"),
        };
        let mut cash = Self::blank(plan.clinic_id, direction, plan.amount, category);
        cash.plan_id = Some(plan.id);
        cash.description = Some(plan.description.clone());
        cash
    }
}

/// Chart-of-accounts dimension: where the money sits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinanceAccount {
    pub id: Uuid,
    pub clinic_id: Uuid,
    pub name: String,
    pub kind: AccountKind,
}

impl FinanceAccount {
    pub fn new(clinic_id: Uuid, name: String, kind: AccountKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            clinic_id,
            name,
            kind,
        }
    }
}

/// Chart-of-accounts dimension: what the money is for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinanceCategory {
    pub id: Uuid,
    pub clinic_id: Uuid,
    pub name: String,
    pub kind: TransactionType,
}

impl FinanceCategory {
    pub fn new(clinic_id: Uuid, name: String, kind: TransactionType) -> Self {
        Self {
            id: Uuid::new_v4(),
            clinic_id,
            name,
            kind,
        }
    }
}

/// Append-only audit record as stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLog {
    pub id: Uuid,
    pub clinic_id: Uuid,
    pub actor_id: Uuid,
    pub action: String,
    pub entity: String,
    pub entity_id: Option<Uuid>,
    pub meta: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// Clinic-scoped view of a patient, as the ledger needs it.
#[derive(Debug, Clone)]
pub struct PatientRef {
    pub id: Uuid,
    pub clinic_id: Uuid,
    pub full_name: Masked<String>,
    pub assigned_specialist_id: Option<Uuid>,
    pub share_override: Option<i32>,
    pub total_payments: i64,
}

/// Clinic-scoped view of a specialist profile.
#[derive(Debug, Clone)]
pub struct SpecialistRef {
    pub staff_id: Uuid,
    pub clinic_id: Uuid,
    pub full_name: String,
    pub default_share: i32,
    pub total_revenue: i64,
}

/// Clinic-scoped view of any staff member (payout targets).
#[derive(Debug, Clone)]
pub struct StaffRef {
    pub id: Uuid,
    pub clinic_id: Uuid,
    pub full_name: String,
    pub role: String,
}
