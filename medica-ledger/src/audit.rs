use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use medica_shared::money::format_minor;

use crate::models::{
    FinanceAccount, FinanceCategory, FinanceTransaction, Payment, PaymentPlan, Payout,
};

/// Minimum age floor accepted by the audit retention cleanup.
pub const MIN_RETENTION_DAYS: i64 = 30;

/// Enumerated verb+entity vocabulary for the audit trail.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    PaymentRecorded,
    PaymentAmended,
    PaymentRemoved,
    PlanCreated,
    PlanSettled,
    PlanCanceled,
    PayoutCreated,
    TransactionCreated,
    AccountCreated,
    CategoryCreated,
    AuditCleanup,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::PaymentRecorded => "PAYMENT_RECORDED",
            AuditAction::PaymentAmended => "PAYMENT_AMENDED",
            AuditAction::PaymentRemoved => "PAYMENT_REMOVED",
            AuditAction::PlanCreated => "PLAN_CREATED",
            AuditAction::PlanSettled => "PLAN_SETTLED",
            AuditAction::PlanCanceled => "PLAN_CANCELED",
            AuditAction::PayoutCreated => "PAYOUT_CREATED",
            AuditAction::TransactionCreated => "TRANSACTION_CREATED",
            AuditAction::AccountCreated => "ACCOUNT_CREATED",
            AuditAction::CategoryCreated => "CATEGORY_CREATED",
            AuditAction::AuditCleanup => "AUDIT_CLEANUP",
        }
    }

    pub fn entity(&self) -> &'static str {
        match self {
            AuditAction::PaymentRecorded
            | AuditAction::PaymentAmended
            | AuditAction::PaymentRemoved => "payment",
            AuditAction::PlanCreated | AuditAction::PlanSettled | AuditAction::PlanCanceled => {
                "payment_plan"
            }
            AuditAction::PayoutCreated => "payout",
            AuditAction::TransactionCreated => "finance_transaction",
            AuditAction::AccountCreated => "finance_account",
            AuditAction::CategoryCreated => "finance_category",
            AuditAction::AuditCleanup => "audit_log",
        }
    }
}

/// What the Audit Trail Writer appends: action plus a structured payload that
/// already carries the human-readable message.
#[derive(Debug, Clone)]
pub struct AuditEntry {
    pub action: AuditAction,
    pub entity_id: Option<Uuid>,
    pub meta: serde_json::Value,
}

impl AuditEntry {
    pub fn payment_recorded(payment: &Payment, patient_name: &str) -> Self {
        Self {
            action: AuditAction::PaymentRecorded,
            entity_id: Some(payment.id),
            meta: json!({
                "message": format!(
                    "Recorded payment of {} for {} (specialist cut {})",
                    format_minor(payment.amount),
                    patient_name,
                    format_minor(payment.specialist_cut),
                ),
                "patient_id": payment.patient_id,
                "specialist_id": payment.specialist_id,
                "amount": payment.amount,
                "specialist_cut": payment.specialist_cut,
            }),
        }
    }

    pub fn payment_amended(payment_id: Uuid, old_amount: i64, new_amount: i64) -> Self {
        Self {
            action: AuditAction::PaymentAmended,
            entity_id: Some(payment_id),
            meta: json!({
                "message": format!(
                    "Changed payment amount {} -> {}",
                    format_minor(old_amount),
                    format_minor(new_amount),
                ),
                "old_amount": old_amount,
                "new_amount": new_amount,
            }),
        }
    }

    pub fn payment_removed(payment: &Payment) -> Self {
        Self {
            action: AuditAction::PaymentRemoved,
            entity_id: Some(payment.id),
            meta: json!({
                "message": format!("Removed payment of {}", format_minor(payment.amount)),
                "patient_id": payment.patient_id,
                "specialist_id": payment.specialist_id,
                "amount": payment.amount,
            }),
        }
    }

    pub fn plan_created(plan: &PaymentPlan) -> Self {
        Self {
            action: AuditAction::PlanCreated,
            entity_id: Some(plan.id),
            meta: json!({
                "message": format!(
                    "Created {} plan of {} due {}",
                    plan.plan_type.as_str(),
                    format_minor(plan.amount),
                    plan.due_date,
                ),
                "plan_type": plan.plan_type.as_str(),
                "amount": plan.amount,
                "due_date": plan.due_date,
            }),
        }
    }

    pub fn plan_settled(plan: &PaymentPlan, materialized_payment: Option<&Payment>) -> Self {
        Self {
            action: AuditAction::PlanSettled,
            entity_id: Some(plan.id),
            meta: json!({
                "message": format!(
                    "Plan '{}' settled as paid, {}",
                    plan.description,
                    format_minor(plan.amount),
                ),
                "plan_type": plan.plan_type.as_str(),
                "amount": plan.amount,
                "payment_id": materialized_payment.map(|p| p.id),
            }),
        }
    }

    pub fn plan_canceled(plan: &PaymentPlan) -> Self {
        Self {
            action: AuditAction::PlanCanceled,
            entity_id: Some(plan.id),
            meta: json!({
                "message": format!(
                    "Plan '{}' canceled, {}",
                    plan.description,
                    format_minor(plan.amount),
                ),
                "amount": plan.amount,
            }),
        }
    }

    pub fn payout_created(payout: &Payout, target_name: &str) -> Self {
        Self {
            action: AuditAction::PayoutCreated,
            entity_id: Some(payout.id),
            meta: json!({
                "message": format!(
                    "Paid out {} to {} ({})",
                    format_minor(payout.amount),
                    target_name,
                    payout.target_kind.as_str(),
                ),
                "target_staff_id": payout.target_staff_id,
                "target_kind": payout.target_kind.as_str(),
                "amount": payout.amount,
            }),
        }
    }

    pub fn transaction_created(tx: &FinanceTransaction) -> Self {
        Self {
            action: AuditAction::TransactionCreated,
            entity_id: Some(tx.id),
            meta: json!({
                "message": format!(
                    "Recorded {} transaction of {}",
                    tx.tx_type.as_str(),
                    format_minor(tx.amount),
                ),
                "tx_type": tx.tx_type.as_str(),
                "amount": tx.amount,
            }),
        }
    }

    pub fn account_created(account: &FinanceAccount) -> Self {
        Self {
            action: AuditAction::AccountCreated,
            entity_id: Some(account.id),
            meta: json!({
                "message": format!("Created {} account '{}'", account.kind.as_str(), account.name),
                "kind": account.kind.as_str(),
            }),
        }
    }

    pub fn category_created(category: &FinanceCategory) -> Self {
        Self {
            action: AuditAction::CategoryCreated,
            entity_id: Some(category.id),
            meta: json!({
                "message": format!(
                    "Created {} category '{}'",
                    category.kind.as_str(),
                    category.name
                ),
                "kind": category.kind.as_str(),
            }),
        }
    }

    pub fn cleanup_summary(deleted: u64, older_than_days: i64) -> Self {
        Self {
            action: AuditAction::AuditCleanup,
            entity_id: None,
            meta: json!({
                "message": format!(
                    "Retention cleanup removed {} audit records older than {} days",
                    deleted, older_than_days
                ),
                "deleted": deleted,
                "older_than_days": older_than_days,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::split::RevenueSplit;

    #[test]
    fn test_recorded_message_carries_formatted_amount() {
        let split = RevenueSplit::compute(125_000, 40).unwrap();
        let payment = Payment::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            125_000,
            split,
            None,
        );
        let entry = AuditEntry::payment_recorded(&payment, "Jane Citizen");
        let message = entry.meta["message"].as_str().unwrap();
        assert_eq!(
            message,
            "Recorded payment of 1250.00 for Jane Citizen (specialist cut 500.00)"
        );
        assert_eq!(entry.entity_id, Some(payment.id));
    }

    #[test]
    fn test_amended_message_shows_old_and_new() {
        let entry = AuditEntry::payment_amended(Uuid::new_v4(), 100_000, 150_000);
        assert_eq!(
            entry.meta["message"].as_str().unwrap(),
            "Changed payment amount 1000.00 -> 1500.00"
        );
    }

    #[test]
    fn test_action_entity_vocabulary() {
        assert_eq!(AuditAction::PaymentRecorded.as_str(), "PAYMENT_RECORDED");
        assert_eq!(AuditAction::PaymentRecorded.entity(), "payment");
        assert_eq!(AuditAction::PlanSettled.entity(), "payment_plan");
        assert_eq!(AuditAction::AuditCleanup.entity(), "audit_log");
    }
}
