//! Financial computation engine
//!
//! Pure functions over ledger snapshots:
//! - Deposit evaluation (late fees)
//! - Loan terms, status, penalties, renewal and liquidation
//! - Member aggregates (savings, lifetime borrowing, eligibility, credit limit)
//! - Group cash position and end-of-cycle payout projection
//! - Cycle reporting (monthly series, activity feed)

mod deposit;
mod loan;
mod member;
mod group;
mod cycle;

pub use deposit::{evaluate_deposit, is_late, DepositEvaluation, LATE_FEE_CUTOFF_DAY};
pub use loan::{
    amount_owed, create_loan, evaluate_loan_status, liquidate, new_loan, penalized_repayment, renew,
    LoanStatusReport, LoanTerms, IMMINENT_THRESHOLD_DAYS, LOAN_TERM_DAYS,
};
pub use member::{
    aggregate_member, credit_limit, eligibility_progress, summarize_member_loans, MemberAggregate,
    MemberLoanSummary,
};
pub use group::{available_for_loan, compute_group_stats, projected_payout, GroupStats, MemberProjection};
pub use cycle::{monthly_savings, recent_activity, Activity, MonthlyTotal};
