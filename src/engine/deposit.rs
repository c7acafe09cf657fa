//! Late-fee evaluation for monthly contributions

use chrono::{Datelike, NaiveDate};

use crate::settings::SystemSettings;

/// Last day of the month a contribution is still on time
pub const LATE_FEE_CUTOFF_DAY: u32 = 10;

/// Fee assessment for a single contribution
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepositEvaluation {
    pub late_fee: f64,
}

impl DepositEvaluation {
    pub fn is_late(&self) -> bool {
        self.late_fee > 0.0
    }
}

/// Whether a contribution made on `date` is late (from the 11th onward)
pub fn is_late(date: NaiveDate) -> bool {
    date.day() > LATE_FEE_CUTOFF_DAY
}

/// Compute the late fee for a contribution
///
/// Bounds on `amount` are checked by the caller; this only prices the fee.
pub fn evaluate_deposit(amount: f64, date: NaiveDate, settings: &SystemSettings) -> DepositEvaluation {
    let late_fee = if is_late(date) {
        amount * settings.late_fee_rate
    } else {
        0.0
    };
    DepositEvaluation { late_fee }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_late_deposit_fee() {
        let settings = SystemSettings::default();
        let eval = evaluate_deposit(5_000.0, date(2026, 2, 12), &settings);
        assert_relative_eq!(eval.late_fee, 750.0);
        assert!(eval.is_late());
    }

    #[test]
    fn test_cutoff_boundary() {
        let settings = SystemSettings::default();

        // Day 10 is still on time
        let on_time = evaluate_deposit(3_000.0, date(2026, 3, 10), &settings);
        assert_eq!(on_time.late_fee, 0.0);
        assert!(!on_time.is_late());

        let late = evaluate_deposit(3_000.0, date(2026, 3, 11), &settings);
        assert_relative_eq!(late.late_fee, 450.0);
    }

    #[test]
    fn test_every_day_of_month() {
        let settings = SystemSettings::default();
        for day in 1..=31 {
            let eval = evaluate_deposit(2_000.0, date(2026, 1, day), &settings);
            if day <= 10 {
                assert_eq!(eval.late_fee, 0.0, "day {}", day);
            } else {
                assert_relative_eq!(eval.late_fee, 2_000.0 * settings.late_fee_rate);
            }
        }
    }

    #[test]
    fn test_out_of_range_amount_is_still_priced() {
        let settings = SystemSettings::default();
        let eval = evaluate_deposit(10_000.0, date(2026, 1, 20), &settings);
        assert_relative_eq!(eval.late_fee, 1_500.0);
    }

    #[test]
    fn test_fee_follows_configured_rate() {
        let settings = SystemSettings {
            late_fee_rate: 0.10,
            ..SystemSettings::default()
        };
        let eval = evaluate_deposit(2_500.0, date(2026, 4, 28), &settings);
        assert_relative_eq!(eval.late_fee, 250.0);
    }
}
