use chrono::Utc;
use medica_core::{LedgerError, LedgerResult};

use crate::aggregates::PaymentDelta;
use crate::models::{
    CashTransaction, FinanceTransaction, PatientRef, Payment, PaymentPlan, PlanStatus, PlanType,
    SpecialistRef, TransactionType,
};
use crate::split::{resolve_share, RevenueSplit};

/// Outcome of validating a requested status change against the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// PLANNED -> PLANNED: accepted, nothing to do.
    Noop,
    /// PLANNED -> CANCELED: terminal, no materialization.
    Cancel,
    /// PLANNED -> PAID: terminal, materializes ledger entries.
    Settle,
}

/// Validate a requested plan status change.
///
/// PAID and CANCELED are terminal: once reached, every further request is a
/// conflict, including a repeat of the same status. This is the guard that the
/// store must re-evaluate under the same transaction as the status write.
pub fn check_transition(current: PlanStatus, requested: PlanStatus) -> LedgerResult<Transition> {
    if current.is_terminal() {
        return Err(LedgerError::Conflict(format!(
            "plan is already {} and cannot change status",
            current.as_str()
        )));
    }

    match requested {
        PlanStatus::Planned => Ok(Transition::Noop),
        PlanStatus::Canceled => Ok(Transition::Cancel),
        PlanStatus::Paid => Ok(Transition::Settle),
    }
}

/// A payment materialized out of an incoming plan, with the aggregate delta
/// that must be applied in the same transaction.
#[derive(Debug, Clone)]
pub struct MaterializedPayment {
    pub payment: Payment,
    pub delta: PaymentDelta,
}

/// Everything a PAID transition writes besides the status itself.
#[derive(Debug, Clone)]
pub struct SettlementEffects {
    pub transaction: FinanceTransaction,
    pub cash: CashTransaction,
    pub payment: Option<MaterializedPayment>,
}

/// Describe the ledger entries a PAID transition produces.
///
/// `patient` and `specialist` are the plan's resolved references, if any; a
/// payment is only materialized for an INCOMING plan whose patient has an
/// assigned specialist.
pub fn materialize(
    plan: &PaymentPlan,
    patient: Option<&PatientRef>,
    specialist: Option<&SpecialistRef>,
) -> LedgerResult<SettlementEffects> {
    let tx_type = match plan.plan_type {
        PlanType::Incoming => TransactionType::Income,
        PlanType::Outgoing => TransactionType::Expense,
    };

    let transaction = FinanceTransaction::new(
        plan.clinic_id,
        tx_type,
        plan.amount,
        Some(plan.description.clone()),
        plan.patient_id,
        plan.specialist_id,
        None,
        None,
        Utc::now().date_naive(),
    );

    let cash = CashTransaction::for_settled_plan(plan);

    let payment = match (plan.plan_type, patient) {
        (PlanType::Incoming, Some(patient)) => {
            match (patient.assigned_specialist_id, specialist) {
                (Some(assigned_id), Some(specialist)) if assigned_id == specialist.staff_id => {
                    let share =
                        resolve_share(patient.share_override, Some(specialist.default_share));
                    let split = RevenueSplit::compute(plan.amount, share)?;
                    let payment = Payment::new(
                        plan.clinic_id,
                        patient.id,
                        specialist.staff_id,
                        plan.amount,
                        split,
                        Some(plan.description.clone()),
                    );
                    let delta = PaymentDelta::recorded(&payment);
                    Some(MaterializedPayment { payment, delta })
                }
                _ => None,
            }
        }
        _ => None,
    };

    Ok(SettlementEffects {
        transaction,
        cash,
        payment,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CashDirection;
    use chrono::NaiveDate;
    use medica_shared::Masked;
    use uuid::Uuid;

    fn plan(plan_type: PlanType, patient_id: Option<Uuid>) -> PaymentPlan {
        PaymentPlan::new(
            Uuid::new_v4(),
            plan_type,
            50_000,
            NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            "Implant, second installment".to_string(),
            patient_id,
            None,
        )
    }

    fn patient(clinic_id: Uuid, specialist_id: Option<Uuid>, share: Option<i32>) -> PatientRef {
        PatientRef {
            id: Uuid::new_v4(),
            clinic_id,
            full_name: Masked("Test Patient".to_string()),
            assigned_specialist_id: specialist_id,
            share_override: share,
            total_payments: 0,
        }
    }

    fn specialist(clinic_id: Uuid, staff_id: Uuid, default_share: i32) -> SpecialistRef {
        SpecialistRef {
            staff_id,
            clinic_id,
            full_name: "Dr. Example".to_string(),
            default_share,
            total_revenue: 0,
        }
    }

    #[test]
    fn test_planned_transitions() {
        assert_eq!(
            check_transition(PlanStatus::Planned, PlanStatus::Planned).unwrap(),
            Transition::Noop
        );
        assert_eq!(
            check_transition(PlanStatus::Planned, PlanStatus::Canceled).unwrap(),
            Transition::Cancel
        );
        assert_eq!(
            check_transition(PlanStatus::Planned, PlanStatus::Paid).unwrap(),
            Transition::Settle
        );
    }

    #[test]
    fn test_terminal_states_reject_everything() {
        for terminal in [PlanStatus::Paid, PlanStatus::Canceled] {
            for requested in [PlanStatus::Planned, PlanStatus::Paid, PlanStatus::Canceled] {
                let result = check_transition(terminal, requested);
                assert!(
                    matches!(result, Err(LedgerError::Conflict(_))),
                    "{:?} -> {:?} must conflict",
                    terminal,
                    requested
                );
            }
        }
    }

    #[test]
    fn test_outgoing_plan_materializes_expense_without_payment() {
        let plan = plan(PlanType::Outgoing, None);
        let effects = materialize(&plan, None, None).unwrap();

        assert_eq!(effects.transaction.tx_type, TransactionType::Expense);
        assert_eq!(effects.transaction.amount, plan.amount);
        assert_eq!(effects.cash.direction, CashDirection::Out);
        assert_eq!(effects.cash.plan_id, Some(plan.id));
        assert!(effects.payment.is_none());
    }

    #[test]
    fn test_incoming_plan_with_assigned_specialist_materializes_payment() {
        let specialist_id = Uuid::new_v4();
        let mut plan = plan(PlanType::Incoming, None);
        let patient = patient(plan.clinic_id, Some(specialist_id), None);
        plan.patient_id = Some(patient.id);
        let specialist = specialist(plan.clinic_id, specialist_id, 40);

        let effects = materialize(&plan, Some(&patient), Some(&specialist)).unwrap();

        assert_eq!(effects.transaction.tx_type, TransactionType::Income);
        assert_eq!(effects.cash.direction, CashDirection::In);

        let materialized = effects.payment.expect("payment must be materialized");
        assert_eq!(materialized.payment.amount, 50_000);
        assert_eq!(materialized.payment.specialist_cut, 20_000);
        assert_eq!(materialized.payment.clinic_cut, 30_000);
        assert_eq!(materialized.delta.amount_delta, 50_000);
        assert_eq!(materialized.delta.specialist_cut_delta, 20_000);
    }

    #[test]
    fn test_patient_share_override_wins_over_specialist_default() {
        let specialist_id = Uuid::new_v4();
        let mut plan = plan(PlanType::Incoming, None);
        let patient = patient(plan.clinic_id, Some(specialist_id), Some(70));
        plan.patient_id = Some(patient.id);
        let specialist = specialist(plan.clinic_id, specialist_id, 40);

        let effects = materialize(&plan, Some(&patient), Some(&specialist)).unwrap();
        let materialized = effects.payment.unwrap();
        assert_eq!(materialized.payment.specialist_cut, 35_000);
    }

    #[test]
    fn test_incoming_plan_without_assigned_specialist_skips_payment() {
        let mut plan = plan(PlanType::Incoming, None);
        let patient = patient(plan.clinic_id, None, None);
        plan.patient_id = Some(patient.id);

        let effects = materialize(&plan, Some(&patient), None).unwrap();
        assert!(effects.payment.is_none());
        // The clinic-level transaction is still written.
        assert_eq!(effects.transaction.tx_type, TransactionType::Income);
    }
}
