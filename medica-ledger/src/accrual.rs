use std::collections::HashMap;

use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone, Utc};
use medica_core::{LedgerError, LedgerResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Optional reporting period: month+year, year only, or unbounded.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PeriodFilter {
    pub month: Option<u32>,
    pub year: Option<i32>,
}

/// Resolved period window. `start`/`end` bound timestamp columns; the matching
/// `start_day`/`end_day` bound date columns, so both grouped sums in a
/// reconciliation share one boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodBounds {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub start_day: NaiveDate,
    pub end_day: NaiveDate,
}

impl PeriodFilter {
    /// Resolve the filter into clinic-local bounds: first day 00:00:00.000 to
    /// last day 23:59:59.999 at the clinic's UTC offset.
    pub fn bounds(&self, tz_offset_minutes: i32) -> LedgerResult<Option<PeriodBounds>> {
        let year = match (self.year, self.month) {
            (None, None) => return Ok(None),
            (None, Some(_)) => {
                return Err(LedgerError::validation(
                    "year",
                    "a month filter requires a year",
                ))
            }
            (Some(year), _) => year,
        };

        if let Some(month) = self.month {
            if !(1..=12).contains(&month) {
                return Err(LedgerError::validation(
                    "month",
                    format!("month must be between 1 and 12, got {}", month),
                ));
            }
        }

        let start_day = NaiveDate::from_ymd_opt(year, self.month.unwrap_or(1), 1)
            .ok_or_else(|| LedgerError::validation("year", "invalid period"))?;
        let end_day = match self.month {
            None | Some(12) => NaiveDate::from_ymd_opt(year, 12, 31),
            Some(month) => NaiveDate::from_ymd_opt(year, month + 1, 1).and_then(|d| d.pred_opt()),
        }
        .ok_or_else(|| LedgerError::validation("year", "invalid period"))?;

        let offset = FixedOffset::east_opt(tz_offset_minutes * 60).ok_or_else(|| {
            LedgerError::validation("tz_offset_minutes", "clinic timezone offset out of range")
        })?;

        let start_local = start_day
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| LedgerError::validation("year", "invalid period"))?;
        let end_local = end_day
            .and_hms_milli_opt(23, 59, 59, 999)
            .ok_or_else(|| LedgerError::validation("year", "invalid period"))?;

        let start = offset
            .from_local_datetime(&start_local)
            .single()
            .ok_or_else(|| LedgerError::validation("year", "invalid period"))?
            .with_timezone(&Utc);
        let end = offset
            .from_local_datetime(&end_local)
            .single()
            .ok_or_else(|| LedgerError::validation("year", "invalid period"))?
            .with_timezone(&Utc);

        Ok(Some(PeriodBounds {
            start,
            end,
            start_day,
            end_day,
        }))
    }
}

/// `SUM(specialist_cut)` over payments in-period, one row per specialist.
#[derive(Debug, Clone)]
pub struct AccruedRow {
    pub specialist_id: Uuid,
    pub amount: i64,
}

/// `SUM(amount)` over SPECIALIST payouts in-period, one row per target.
#[derive(Debug, Clone)]
pub struct PaidOutRow {
    pub specialist_id: Uuid,
    pub amount: i64,
}

/// One reconciliation row: what a specialist earned vs. what was paid out.
///
/// A negative balance (overpayment) is a valid, reportable state.
#[derive(Debug, Clone, Serialize)]
pub struct SpecialistBalance {
    pub specialist_id: Uuid,
    pub specialist_name: String,
    pub accrued: i64,
    pub paid_out: i64,
    pub balance: i64,
}

/// Join the two grouped sums over the clinic's specialist roster.
///
/// Missing group entries default to 0 on either side.
pub fn reconcile(
    roster: &[(Uuid, String)],
    accrued: &[AccruedRow],
    paid_out: &[PaidOutRow],
) -> Vec<SpecialistBalance> {
    let accrued_by_id: HashMap<Uuid, i64> =
        accrued.iter().map(|r| (r.specialist_id, r.amount)).collect();
    let paid_by_id: HashMap<Uuid, i64> = paid_out
        .iter()
        .map(|r| (r.specialist_id, r.amount))
        .collect();

    roster
        .iter()
        .map(|(id, name)| {
            let accrued = accrued_by_id.get(id).copied().unwrap_or(0);
            let paid_out = paid_by_id.get(id).copied().unwrap_or(0);
            SpecialistBalance {
                specialist_id: *id,
                specialist_name: name.clone(),
                accrued,
                paid_out,
                balance: accrued - paid_out,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reconcile_basic() {
        let specialist = Uuid::new_v4();
        let roster = vec![(specialist, "Dr. Example".to_string())];
        // Payments with cuts [100, 200, 300] arrive pre-summed from the store.
        let accrued = vec![AccruedRow {
            specialist_id: specialist,
            amount: 600,
        }];
        let paid_out = vec![PaidOutRow {
            specialist_id: specialist,
            amount: 150,
        }];

        let rows = reconcile(&roster, &accrued, &paid_out);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].accrued, 600);
        assert_eq!(rows[0].paid_out, 150);
        assert_eq!(rows[0].balance, 450);
    }

    #[test]
    fn test_reconcile_missing_sides_default_to_zero() {
        let only_accrued = Uuid::new_v4();
        let only_paid = Uuid::new_v4();
        let idle = Uuid::new_v4();
        let roster = vec![
            (only_accrued, "A".to_string()),
            (only_paid, "B".to_string()),
            (idle, "C".to_string()),
        ];
        let accrued = vec![AccruedRow {
            specialist_id: only_accrued,
            amount: 500,
        }];
        let paid_out = vec![PaidOutRow {
            specialist_id: only_paid,
            amount: 200,
        }];

        let rows = reconcile(&roster, &accrued, &paid_out);
        assert_eq!(rows[0].balance, 500);
        // Overpayment is reportable, not an error.
        assert_eq!(rows[1].balance, -200);
        assert_eq!(rows[2].accrued, 0);
        assert_eq!(rows[2].paid_out, 0);
        assert_eq!(rows[2].balance, 0);
    }

    #[test]
    fn test_month_bounds_cover_whole_month() {
        let filter = PeriodFilter {
            month: Some(2),
            year: Some(2025),
        };
        let bounds = filter.bounds(0).unwrap().unwrap();

        assert_eq!(bounds.start_day, NaiveDate::from_ymd_opt(2025, 2, 1).unwrap());
        assert_eq!(bounds.end_day, NaiveDate::from_ymd_opt(2025, 2, 28).unwrap());
        assert_eq!(bounds.start.to_rfc3339(), "2025-02-01T00:00:00+00:00");
        assert_eq!(bounds.end.to_rfc3339(), "2025-02-28T23:59:59.999+00:00");
    }

    #[test]
    fn test_december_bounds_stay_in_year() {
        let filter = PeriodFilter {
            month: Some(12),
            year: Some(2025),
        };
        let bounds = filter.bounds(0).unwrap().unwrap();
        assert_eq!(bounds.end_day, NaiveDate::from_ymd_opt(2025, 12, 31).unwrap());
    }

    #[test]
    fn test_year_only_bounds() {
        let filter = PeriodFilter {
            month: None,
            year: Some(2025),
        };
        let bounds = filter.bounds(0).unwrap().unwrap();
        assert_eq!(bounds.start_day, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        assert_eq!(bounds.end_day, NaiveDate::from_ymd_opt(2025, 12, 31).unwrap());
    }

    #[test]
    fn test_clinic_offset_shifts_utc_window() {
        // UTC+05:00 clinic: local midnight is 19:00 UTC the previous day.
        let filter = PeriodFilter {
            month: Some(6),
            year: Some(2025),
        };
        let bounds = filter.bounds(300).unwrap().unwrap();
        assert_eq!(bounds.start.to_rfc3339(), "2025-05-31T19:00:00+00:00");
    }

    #[test]
    fn test_month_without_year_is_rejected() {
        let filter = PeriodFilter {
            month: Some(3),
            year: None,
        };
        assert!(filter.bounds(0).is_err());
    }

    #[test]
    fn test_no_filter_means_unbounded() {
        let filter = PeriodFilter::default();
        assert!(filter.bounds(0).unwrap().is_none());
    }
}
