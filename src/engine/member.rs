//! Per-member metrics derived from the ledger

use chrono::NaiveDate;

use super::loan::evaluate_loan_status;
use crate::ledger::{Deposit, Loan, LoanId, LoanStatus, Member, MemberId};
use crate::settings::{CreditRules, SystemSettings};

/// Derived metrics for one member
#[derive(Debug, Clone, PartialEq)]
pub struct MemberAggregate {
    pub member_id: MemberId,

    /// Sum of all contributions
    pub total_savings: f64,

    /// Lifetime principal borrowed, including loans already paid off
    pub total_loans_taken: f64,

    /// Fraction of the movement target reached, in [0, 1]
    pub eligibility_progress: f64,

    /// Maximum principal the member may request
    pub credit_limit: f64,
}

impl MemberAggregate {
    /// Eligible for the fixed end-of-cycle bonus
    pub fn is_eligible(&self) -> bool {
        self.eligibility_progress >= 1.0
    }
}

/// Compute a member's derived metrics from the full deposit and loan sets
pub fn aggregate_member(
    member: &Member,
    deposits: &[Deposit],
    loans: &[Loan],
    settings: &SystemSettings,
) -> MemberAggregate {
    let total_savings: f64 = deposits
        .iter()
        .filter(|d| d.member_id == member.id)
        .map(|d| d.amount)
        .sum();

    let total_loans_taken: f64 = loans
        .iter()
        .filter(|l| l.member_id == member.id)
        .map(|l| l.amount)
        .sum();

    MemberAggregate {
        member_id: member.id.clone(),
        total_savings,
        total_loans_taken,
        eligibility_progress: eligibility_progress(total_loans_taken, settings.min_movement_for_interest),
        credit_limit: credit_limit(total_savings, member.joia_paid, &settings.credit),
    }
}

/// Progress toward the movement target, clamped to [0, 1]
///
/// A non-positive target counts as already reached.
pub fn eligibility_progress(total_loans_taken: f64, target: f64) -> f64 {
    if target <= 0.0 {
        return 1.0;
    }
    (total_loans_taken / target).clamp(0.0, 1.0)
}

/// Savings plus the base margin, plus the joia bonus when the joia is paid
pub fn credit_limit(total_savings: f64, joia_paid: bool, rules: &CreditRules) -> f64 {
    let joia_bonus = if joia_paid { rules.joia_bonus } else { 0.0 };
    total_savings + joia_bonus + rules.base_margin
}

/// A member's loan book at a given date
#[derive(Debug, Clone, PartialEq)]
pub struct MemberLoanSummary {
    pub member_id: MemberId,
    pub active_count: usize,
    pub total_count: usize,
    /// Sum of `total_repayment` over active loans
    pub total_debt: f64,
    /// Sum of `total_repayment` over paid loans
    pub total_paid: f64,
    pub overdue: Vec<LoanId>,
    pub imminent: Vec<LoanId>,
    /// Most recently requested loan
    pub latest_loan: Option<LoanId>,
}

impl MemberLoanSummary {
    pub fn needs_attention(&self) -> bool {
        !self.overdue.is_empty() || !self.imminent.is_empty()
    }
}

/// Summarise the loans of one member as of `as_of`
///
/// Overdue and imminent lists are ordered by request date, oldest first.
pub fn summarize_member_loans(member_id: &MemberId, loans: &[Loan], as_of: NaiveDate) -> MemberLoanSummary {
    let mut member_loans: Vec<&Loan> = loans.iter().filter(|l| &l.member_id == member_id).collect();
    member_loans.sort_by_key(|l| l.requested_at);

    let mut summary = MemberLoanSummary {
        member_id: member_id.clone(),
        active_count: 0,
        total_count: member_loans.len(),
        total_debt: 0.0,
        total_paid: 0.0,
        overdue: Vec::new(),
        imminent: Vec::new(),
        latest_loan: member_loans.last().map(|l| l.id.clone()),
    };

    for loan in member_loans {
        match loan.status {
            LoanStatus::Paid => summary.total_paid += loan.total_repayment,
            LoanStatus::Active => {
                summary.active_count += 1;
                summary.total_debt += loan.total_repayment;

                let report = evaluate_loan_status(loan, as_of);
                if report.overdue {
                    summary.overdue.push(loan.id.clone());
                } else if report.imminent {
                    summary.imminent.push(loan.id.clone());
                }
            }
        }
    }

    summary
}
