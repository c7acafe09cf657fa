//! Cycle reporting: monthly savings series and recent ledger activity

use chrono::NaiveDate;

use crate::ledger::{CycleMonth, Deposit, DepositId, Loan, LoanId, MemberId};
use crate::settings::Cycle;

/// Savings collected for one month bucket
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonthlyTotal {
    pub month: CycleMonth,
    pub total: f64,
}

/// Deposits summed per month bucket, one entry for every month of the cycle
///
/// Buckets are matched on year and month, so a December from another cycle
/// never lands in this cycle's December.
pub fn monthly_savings(deposits: &[Deposit], cycle: &Cycle) -> Vec<MonthlyTotal> {
    cycle
        .months()
        .into_iter()
        .map(|month| MonthlyTotal {
            month,
            total: deposits
                .iter()
                .filter(|d| d.month == month)
                .map(|d| d.amount)
                .sum(),
        })
        .collect()
}

/// A ledger event for the activity feed
#[derive(Debug, Clone, PartialEq)]
pub enum Activity {
    Deposit {
        id: DepositId,
        member_id: MemberId,
        amount: f64,
        date: NaiveDate,
    },
    Loan {
        id: LoanId,
        member_id: MemberId,
        amount: f64,
        date: NaiveDate,
    },
}

impl Activity {
    pub fn date(&self) -> NaiveDate {
        match self {
            Activity::Deposit { date, .. } | Activity::Loan { date, .. } => *date,
        }
    }

    pub fn member_id(&self) -> &MemberId {
        match self {
            Activity::Deposit { member_id, .. } | Activity::Loan { member_id, .. } => member_id,
        }
    }

    pub fn amount(&self) -> f64 {
        match self {
            Activity::Deposit { amount, .. } | Activity::Loan { amount, .. } => *amount,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Activity::Deposit { .. } => "deposit",
            Activity::Loan { .. } => "loan",
        }
    }
}

/// Deposits and loan requests merged, newest first, at most `limit` entries
pub fn recent_activity(deposits: &[Deposit], loans: &[Loan], limit: usize) -> Vec<Activity> {
    let mut activity: Vec<Activity> = deposits
        .iter()
        .map(|d| Activity::Deposit {
            id: d.id.clone(),
            member_id: d.member_id.clone(),
            amount: d.amount,
            date: d.date,
        })
        .chain(loans.iter().map(|l| Activity::Loan {
            id: l.id.clone(),
            member_id: l.member_id.clone(),
            amount: l.amount,
            date: l.requested_at,
        }))
        .collect();

    // stable: same-day entries keep deposits before loans
    activity.sort_by(|a, b| b.date().cmp(&a.date()));
    activity.truncate(limit);
    activity
}
