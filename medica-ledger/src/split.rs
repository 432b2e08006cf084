use medica_core::{LedgerError, LedgerResult};
use serde::{Deserialize, Serialize};

/// Share applied when neither the patient nor the specialist carries one.
pub const DEFAULT_SHARE_PERCENT: i32 = 50;

/// Result of splitting a gross payment between specialist and clinic.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RevenueSplit {
    pub specialist_cut: i64,
    pub clinic_cut: i64,
}

impl RevenueSplit {
    /// Split a gross amount by the specialist's share percentage.
    ///
    /// The clinic cut is computed by subtraction, not by its own percentage, so
    /// `specialist_cut + clinic_cut == amount` holds exactly for every input.
    pub fn compute(amount: i64, share_percent: i32) -> LedgerResult<Self> {
        if amount <= 0 {
            return Err(LedgerError::validation(
                "amount",
                "amount must be a positive number of minor units",
            ));
        }
        if !(0..=100).contains(&share_percent) {
            return Err(LedgerError::validation(
                "share",
                format!("share must be between 0 and 100, got {}", share_percent),
            ));
        }

        let specialist_cut = amount * share_percent as i64 / 100;
        let clinic_cut = amount - specialist_cut;

        Ok(Self {
            specialist_cut,
            clinic_cut,
        })
    }
}

/// Resolve the effective share for a payment: patient override, then the
/// specialist's default, then the hardcoded fallback.
pub fn resolve_share(patient_override: Option<i32>, specialist_default: Option<i32>) -> i32 {
    patient_override
        .or(specialist_default)
        .unwrap_or(DEFAULT_SHARE_PERCENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_half() {
        let split = RevenueSplit::compute(100_000, 50).unwrap();
        assert_eq!(split.specialist_cut, 50_000);
        assert_eq!(split.clinic_cut, 50_000);
    }

    #[test]
    fn test_sum_invariant_holds_for_every_share() {
        // Amounts chosen so that amount * share / 100 truncates.
        for amount in [1, 3, 7, 99, 101, 12_345, 1_000_003] {
            for share in 0..=100 {
                let split = RevenueSplit::compute(amount, share).unwrap();
                assert_eq!(
                    split.specialist_cut + split.clinic_cut,
                    amount,
                    "amount={} share={}",
                    amount,
                    share
                );
                assert!(split.specialist_cut >= 0);
                assert!(split.clinic_cut >= 0);
            }
        }
    }

    #[test]
    fn test_rounding_loss_lands_on_clinic_side() {
        // 101 * 33 / 100 = 33 (truncated); clinic picks up the remainder.
        let split = RevenueSplit::compute(101, 33).unwrap();
        assert_eq!(split.specialist_cut, 33);
        assert_eq!(split.clinic_cut, 68);
    }

    #[test]
    fn test_rejects_non_positive_amount() {
        assert!(RevenueSplit::compute(0, 50).is_err());
        assert!(RevenueSplit::compute(-100, 50).is_err());
    }

    #[test]
    fn test_rejects_share_out_of_range() {
        assert!(RevenueSplit::compute(100, -1).is_err());
        assert!(RevenueSplit::compute(100, 101).is_err());
    }

    #[test]
    fn test_share_resolution_order() {
        assert_eq!(resolve_share(Some(70), Some(40)), 70);
        assert_eq!(resolve_share(None, Some(40)), 40);
        assert_eq!(resolve_share(None, None), DEFAULT_SHARE_PERCENT);
    }
}
