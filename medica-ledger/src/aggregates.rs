use uuid::Uuid;

use crate::models::Payment;
use crate::split::RevenueSplit;

/// Signed increments to apply to the two denormalized aggregates:
/// `Patient.total_payments` and `SpecialistProfile.total_revenue`.
///
/// Every payment mutation path produces exactly one of these and hands it to
/// the store's single apply function; aggregates are never overwritten with
/// absolute values, so concurrent mutations serialize at the store row level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentDelta {
    pub patient_id: Uuid,
    pub specialist_id: Uuid,
    pub amount_delta: i64,
    pub specialist_cut_delta: i64,
}

impl PaymentDelta {
    /// Delta for a newly recorded payment.
    pub fn recorded(payment: &Payment) -> Self {
        Self {
            patient_id: payment.patient_id,
            specialist_id: payment.specialist_id,
            amount_delta: payment.amount,
            specialist_cut_delta: payment.specialist_cut,
        }
    }

    /// Delta for a removed payment: the exact reverse of recording it.
    pub fn removed(payment: &Payment) -> Self {
        Self {
            patient_id: payment.patient_id,
            specialist_id: payment.specialist_id,
            amount_delta: -payment.amount,
            specialist_cut_delta: -payment.specialist_cut,
        }
    }

    /// Delta for an amount edit on an existing payment.
    pub fn amended(old: &Payment, new_amount: i64, new_split: RevenueSplit) -> Self {
        Self {
            patient_id: old.patient_id,
            specialist_id: old.specialist_id,
            amount_delta: new_amount - old.amount,
            specialist_cut_delta: new_split.specialist_cut - old.specialist_cut,
        }
    }

    pub fn is_noop(&self) -> bool {
        self.amount_delta == 0 && self.specialist_cut_delta == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payment(amount: i64, share: i32) -> Payment {
        let split = RevenueSplit::compute(amount, share).unwrap();
        Payment::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            amount,
            split,
            None,
        )
    }

    #[test]
    fn test_record_then_remove_cancels_out() {
        let p = payment(100_000, 50);
        let recorded = PaymentDelta::recorded(&p);
        let removed = PaymentDelta::removed(&p);

        assert_eq!(recorded.amount_delta + removed.amount_delta, 0);
        assert_eq!(
            recorded.specialist_cut_delta + removed.specialist_cut_delta,
            0
        );
    }

    #[test]
    fn test_amend_delta_is_difference() {
        let p = payment(100_000, 40);
        let new_split = RevenueSplit::compute(150_000, 40).unwrap();
        let delta = PaymentDelta::amended(&p, 150_000, new_split);

        assert_eq!(delta.amount_delta, 50_000);
        assert_eq!(delta.specialist_cut_delta, 60_000 - 40_000);
    }

    #[test]
    fn test_amend_to_same_amount_is_noop() {
        let p = payment(100_000, 40);
        let same_split = RevenueSplit::compute(100_000, 40).unwrap();
        assert!(PaymentDelta::amended(&p, 100_000, same_split).is_noop());
    }

    #[test]
    fn test_amend_downwards_goes_negative() {
        let p = payment(100_000, 50);
        let new_split = RevenueSplit::compute(30_000, 50).unwrap();
        let delta = PaymentDelta::amended(&p, 30_000, new_split);

        assert_eq!(delta.amount_delta, -70_000);
        assert_eq!(delta.specialist_cut_delta, -35_000);
    }
}
