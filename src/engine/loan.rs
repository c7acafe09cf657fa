//! Loan terms, status, penalties and the active -> paid lifecycle
//!
//! Every function here is pure: renewals and liquidations return a new
//! [`Loan`] rather than mutating the input. Refusing transitions on a paid
//! loan is the ledger book's job; the functions below assume an active loan.

use chrono::{Duration, NaiveDate};

use crate::ledger::{Loan, LoanId, LoanStatus, MemberId};

/// Fixed loan term in calendar days
pub const LOAN_TERM_DAYS: u32 = 30;

/// Active loans due within this many days are flagged as imminent
pub const IMMINENT_THRESHOLD_DAYS: i64 = 7;

/// Terms fixed when a loan is granted
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoanTerms {
    pub due_date: NaiveDate,
    pub total_repayment: f64,
    pub status: LoanStatus,
}

/// Derive due date and repayment for a new loan
///
/// Principal is not capped here; admission control runs before this.
pub fn create_loan(principal: f64, rate: f64, requested_at: NaiveDate) -> LoanTerms {
    LoanTerms {
        due_date: requested_at + Duration::days(LOAN_TERM_DAYS as i64),
        total_repayment: principal * (1.0 + rate),
        status: LoanStatus::Active,
    }
}

/// Build a full loan record from freshly created terms
pub fn new_loan(
    id: LoanId,
    member_id: MemberId,
    principal: f64,
    rate: f64,
    requested_at: NaiveDate,
) -> Loan {
    let terms = create_loan(principal, rate, requested_at);
    Loan {
        id,
        member_id,
        amount: principal,
        interest_rate: rate,
        requested_at,
        due_date: terms.due_date,
        status: terms.status,
        total_repayment: terms.total_repayment,
        paid_at: None,
    }
}

/// Repayment status of a loan at a given date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoanStatusReport {
    pub overdue: bool,
    pub imminent: bool,
    /// Days until the due date, negative once overdue
    pub days_remaining: i64,
}

/// Classify a loan as overdue, imminent, or neither
///
/// Overdue and imminent are mutually exclusive, and paid loans are neither.
pub fn evaluate_loan_status(loan: &Loan, as_of: NaiveDate) -> LoanStatusReport {
    let days_remaining = (loan.due_date - as_of).num_days();
    let active = loan.status.is_active();
    let overdue = active && as_of > loan.due_date;
    let imminent = active
        && !overdue
        && (0..=IMMINENT_THRESHOLD_DAYS).contains(&days_remaining);

    LoanStatusReport {
        overdue,
        imminent,
        days_remaining,
    }
}

/// Amount owed on an overdue loan: the current total plus one extra interest charge
///
/// For a loan that was never renewed this is `principal + principal * rate * 2`.
/// Each renewal already added a charge, so a loan renewed once owes
/// `principal + principal * rate * 3` once it falls overdue again.
pub fn penalized_repayment(loan: &Loan) -> f64 {
    loan.total_repayment + loan.interest_charge()
}

/// What the member must pay to liquidate the loan on `as_of`
pub fn amount_owed(loan: &Loan, as_of: NaiveDate) -> f64 {
    match loan.status {
        LoanStatus::Paid => 0.0,
        LoanStatus::Active if evaluate_loan_status(loan, as_of).overdue => penalized_repayment(loan),
        LoanStatus::Active => loan.total_repayment,
    }
}

/// Roll a loan over: push the due date out and add one interest charge
pub fn renew(loan: &Loan, days: u32) -> Loan {
    debug_assert!(loan.status.is_active(), "renewing paid loan {}", loan.id);
    Loan {
        due_date: loan.due_date + Duration::days(days as i64),
        total_repayment: loan.total_repayment + loan.interest_charge(),
        ..loan.clone()
    }
}

/// Mark a loan as paid in full
pub fn liquidate(loan: &Loan, paid_at: NaiveDate) -> Loan {
    debug_assert!(loan.status.is_active(), "liquidating paid loan {}", loan.id);
    Loan {
        status: LoanStatus::Paid,
        paid_at: Some(paid_at),
        ..loan.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn test_loan() -> Loan {
        new_loan(LoanId::new("L1"), MemberId::new("m1"), 20_000.0, 0.15, date(2026, 1, 5))
    }

    #[test]
    fn test_create_loan_terms() {
        let terms = create_loan(20_000.0, 0.15, date(2026, 1, 5));
        assert_eq!(terms.due_date, date(2026, 2, 4));
        assert_relative_eq!(terms.total_repayment, 23_000.0);
        assert_eq!(terms.status, LoanStatus::Active);
    }

    #[test]
    fn test_due_date_crosses_year_end() {
        let terms = create_loan(1_000.0, 0.15, date(2025, 12, 20));
        assert_eq!(terms.due_date, date(2026, 1, 19));
    }

    #[test]
    fn test_single_renewal() {
        let loan = test_loan();
        let renewed = renew(&loan, LOAN_TERM_DAYS);

        assert_relative_eq!(renewed.total_repayment, 26_000.0);
        assert_eq!(renewed.due_date, date(2026, 3, 6));
        assert_eq!(renewed.status, LoanStatus::Active);
        assert_eq!(renewed.amount, loan.amount);
    }

    #[test]
    fn test_renewals_compound_linearly() {
        let original = test_loan();
        let mut loan = original.clone();
        for n in 1..=5u32 {
            loan = renew(&loan, LOAN_TERM_DAYS);
            let expected = 20_000.0 * 1.15 + n as f64 * 20_000.0 * 0.15;
            assert_relative_eq!(loan.total_repayment, expected, epsilon = 1e-9);
            assert_eq!(loan.due_date, original.due_date + Duration::days(30 * n as i64));
        }
        assert_eq!(loan.renewals(), 5);
    }

    #[test]
    fn test_liquidate() {
        let paid = liquidate(&test_loan(), date(2026, 1, 30));
        assert_eq!(paid.status, LoanStatus::Paid);
        assert_eq!(paid.paid_at, Some(date(2026, 1, 30)));
        assert_relative_eq!(paid.total_repayment, 23_000.0);
    }

    #[test]
    fn test_status_windows() {
        let loan = test_loan(); // due 2026-02-04

        let early = evaluate_loan_status(&loan, date(2026, 1, 10));
        assert!(!early.overdue && !early.imminent);
        assert_eq!(early.days_remaining, 25);

        let week_out = evaluate_loan_status(&loan, date(2026, 1, 28));
        assert!(week_out.imminent && !week_out.overdue);
        assert_eq!(week_out.days_remaining, 7);

        let eight_out = evaluate_loan_status(&loan, date(2026, 1, 27));
        assert!(!eight_out.imminent);

        let due_today = evaluate_loan_status(&loan, date(2026, 2, 4));
        assert!(due_today.imminent && !due_today.overdue);
        assert_eq!(due_today.days_remaining, 0);

        let late = evaluate_loan_status(&loan, date(2026, 2, 5));
        assert!(late.overdue && !late.imminent);
        assert_eq!(late.days_remaining, -1);
    }

    #[test]
    fn test_paid_loan_is_never_flagged() {
        let paid = liquidate(&test_loan(), date(2026, 1, 20));
        for as_of in [date(2026, 2, 1), date(2026, 3, 1)] {
            let report = evaluate_loan_status(&paid, as_of);
            assert!(!report.overdue && !report.imminent);
        }
    }

    #[test]
    fn test_amount_owed() {
        let loan = test_loan();
        assert_relative_eq!(amount_owed(&loan, date(2026, 1, 20)), 23_000.0);

        // Overdue: interest doubled, principal + principal * rate * 2
        assert_relative_eq!(amount_owed(&loan, date(2026, 2, 10)), 26_000.0);
        assert_relative_eq!(penalized_repayment(&loan), 20_000.0 + 20_000.0 * 0.15 * 2.0);

        let paid = liquidate(&loan, date(2026, 2, 10));
        assert_eq!(amount_owed(&paid, date(2026, 3, 1)), 0.0);
    }

    #[test]
    fn test_overdue_renewed_loan_adds_one_charge_to_current_total() {
        let renewed = renew(&test_loan(), LOAN_TERM_DAYS); // due 2026-03-06
        assert_relative_eq!(renewed.total_repayment, 26_000.0);
        assert_relative_eq!(amount_owed(&renewed, date(2026, 3, 1)), 26_000.0);

        let as_of = date(2026, 3, 20);
        assert!(evaluate_loan_status(&renewed, as_of).overdue);
        assert_relative_eq!(amount_owed(&renewed, as_of), 29_000.0);
    }

    #[test]
    fn test_renewal_clears_overdue() {
        let loan = test_loan();
        let as_of = date(2026, 2, 10);
        assert!(evaluate_loan_status(&loan, as_of).overdue);

        let renewed = renew(&loan, LOAN_TERM_DAYS);
        let report = evaluate_loan_status(&renewed, as_of);
        assert!(!report.overdue);
        assert_eq!(report.days_remaining, 24);
    }
}
