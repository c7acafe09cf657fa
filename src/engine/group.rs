//! Group-wide cash position and end-of-cycle payout projection
//!
//! A stateless fold over one ledger snapshot. Nothing is cached between
//! queries; every call recomputes from the collections passed in.

use log::debug;

use super::member::{aggregate_member, MemberAggregate};
use crate::ledger::{Deposit, Loan, Member, MemberId};
use crate::settings::SystemSettings;

/// A member's aggregate together with their projected end-of-cycle payout
#[derive(Debug, Clone, PartialEq)]
pub struct MemberProjection {
    pub aggregate: MemberAggregate,
    pub projected_payout: f64,
}

/// Group cash position and profit-sharing projection
#[derive(Debug, Clone, PartialEq)]
pub struct GroupStats {
    /// Sum of every deposit
    pub total_group_savings: f64,

    /// Principal currently lent out
    pub active_loans_total: f64,

    /// Ceiling for any new loan, never negative
    pub available_for_loan: f64,

    pub total_late_fees: f64,

    /// Interest accrued across all loans, paid or active
    pub total_loan_interest: f64,

    /// Late fees plus loan interest
    pub total_earnings: f64,

    pub eligible_member_count: usize,

    /// Fixed bonus owed to eligible members
    pub total_fixed_commitment: f64,

    /// Earnings left after fixed commitments, never negative
    pub surplus: f64,

    /// Surplus shared equally across all members
    pub surplus_per_member: f64,

    /// Joia collected, used for operating costs
    pub operational_fund: f64,

    pub management_fee_total: f64,

    /// One projection per member, in input order
    pub members: Vec<MemberProjection>,
}

impl GroupStats {
    pub fn projection_for(&self, member_id: &MemberId) -> Option<&MemberProjection> {
        self.members.iter().find(|p| &p.aggregate.member_id == member_id)
    }

    /// Sum of all projected payouts
    pub fn total_projected_payout(&self) -> f64 {
        self.members.iter().map(|p| p.projected_payout).sum()
    }
}

/// Group savings minus principal lent out on active loans, floored at zero
pub fn available_for_loan(deposits: &[Deposit], loans: &[Loan]) -> f64 {
    let savings: f64 = deposits.iter().map(|d| d.amount).sum();
    (savings - active_loans_total(loans)).max(0.0)
}

fn active_loans_total(loans: &[Loan]) -> f64 {
    loans
        .iter()
        .filter(|l| l.status.is_active())
        .map(|l| l.amount)
        .sum()
}

/// Savings, plus the fixed bonus if eligible, plus an equal share of the surplus
pub fn projected_payout(aggregate: &MemberAggregate, surplus_per_member: f64, settings: &SystemSettings) -> f64 {
    let bonus = if aggregate.is_eligible() {
        settings.fixed_interest_return
    } else {
        0.0
    };
    aggregate.total_savings + bonus + surplus_per_member
}

/// Compute group statistics and per-member projections for a snapshot
pub fn compute_group_stats(
    members: &[Member],
    deposits: &[Deposit],
    loans: &[Loan],
    settings: &SystemSettings,
) -> GroupStats {
    let total_group_savings: f64 = deposits.iter().map(|d| d.amount).sum();
    let active_loans_total = active_loans_total(loans);
    let available_for_loan = (total_group_savings - active_loans_total).max(0.0);

    let total_late_fees: f64 = deposits.iter().map(|d| d.late_fee).sum();
    let total_loan_interest: f64 = loans.iter().map(Loan::accrued_interest).sum();
    let total_earnings = total_late_fees + total_loan_interest;

    let aggregates: Vec<MemberAggregate> = members
        .iter()
        .map(|m| aggregate_member(m, deposits, loans, settings))
        .collect();

    let eligible_member_count = aggregates.iter().filter(|a| a.is_eligible()).count();
    let total_fixed_commitment = eligible_member_count as f64 * settings.fixed_interest_return;
    let surplus = (total_earnings - total_fixed_commitment).max(0.0);
    let surplus_per_member = if members.is_empty() {
        0.0
    } else {
        surplus / members.len() as f64
    };

    let operational_fund = members.iter().filter(|m| m.joia_paid).count() as f64 * settings.joia_amount;
    let management_fee_total = members.len() as f64 * settings.management_fee_per_member;

    debug!(
        "Group stats: savings={:.2} active_loans={:.2} earnings={:.2} eligible={} surplus={:.2}",
        total_group_savings, active_loans_total, total_earnings, eligible_member_count, surplus
    );

    let members = aggregates
        .into_iter()
        .map(|aggregate| {
            let projected_payout = projected_payout(&aggregate, surplus_per_member, settings);
            MemberProjection {
                aggregate,
                projected_payout,
            }
        })
        .collect();

    GroupStats {
        total_group_savings,
        active_loans_total,
        available_for_loan,
        total_late_fees,
        total_loan_interest,
        total_earnings,
        eligible_member_count,
        total_fixed_commitment,
        surplus,
        surplus_per_member,
        operational_fund,
        management_fee_total,
        members,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::loan::{liquidate, new_loan, renew, LOAN_TERM_DAYS};
    use crate::ledger::{CycleMonth, DepositId, LoanId};
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn deposit(id: &str, member: &str, amount: f64, late_fee: f64) -> Deposit {
        let on = date(2026, 1, 5);
        Deposit {
            id: DepositId::new(id),
            member_id: MemberId::new(member),
            amount,
            date: on,
            late_fee,
            month: CycleMonth::from_date(on),
        }
    }

    fn loan(id: &str, member: &str, amount: f64) -> Loan {
        new_loan(LoanId::new(id), MemberId::new(member), amount, 0.15, date(2026, 1, 10))
    }

    fn members() -> Vec<Member> {
        vec![
            Member::new("m1", "Ana", "ana@example.com", true, date(2025, 12, 1)),
            Member::new("m2", "Carlos", "carlos@example.com", true, date(2025, 12, 1)),
            Member::new("m3", "Dina", "dina@example.com", false, date(2025, 12, 1)),
        ]
    }

    #[test]
    fn test_over_extended_group_reports_zero_liquidity() {
        let deposits = vec![
            deposit("d1", "m1", 15_000.0, 0.0),
            deposit("d2", "m2", 12_000.0, 0.0),
        ];
        let loans = vec![loan("l1", "m1", 33_750.0), loan("l2", "m2", 20_000.0)];

        let stats = compute_group_stats(&members(), &deposits, &loans, &SystemSettings::default());
        assert_relative_eq!(stats.total_group_savings, 27_000.0);
        assert_relative_eq!(stats.active_loans_total, 53_750.0);
        assert_eq!(stats.available_for_loan, 0.0);
        assert_eq!(available_for_loan(&deposits, &loans), 0.0);
    }

    #[test]
    fn test_paid_loans_free_liquidity() {
        let deposits = vec![deposit("d1", "m1", 10_000.0, 0.0)];
        let loans = vec![
            liquidate(&loan("l1", "m1", 6_000.0), date(2026, 1, 20)),
            loan("l2", "m2", 3_000.0),
        ];
        assert_relative_eq!(available_for_loan(&deposits, &loans), 7_000.0);
    }

    #[test]
    fn test_earnings_surplus_and_payouts() {
        let settings = SystemSettings::default();
        let deposits = vec![
            deposit("d1", "m1", 20_000.0, 750.0),
            deposit("d2", "m2", 15_000.0, 0.0),
            deposit("d3", "m3", 10_000.0, 300.0),
        ];
        // m1 reaches the 50 000 movement target; its second loan is renewed once
        let first = liquidate(&loan("l1", "m1", 30_000.0), date(2026, 2, 1));
        let second = renew(&loan("l2", "m1", 20_000.0), LOAN_TERM_DAYS);
        let loans = vec![first, second, loan("l3", "m2", 10_000.0)];

        let stats = compute_group_stats(&members(), &deposits, &loans, &settings);

        assert_relative_eq!(stats.total_late_fees, 1_050.0);
        // 4 500 + 6 000 + 1 500
        assert_relative_eq!(stats.total_loan_interest, 12_000.0, epsilon = 1e-6);
        assert_relative_eq!(stats.total_earnings, 13_050.0, epsilon = 1e-6);
        assert_eq!(stats.eligible_member_count, 1);
        assert_relative_eq!(stats.total_fixed_commitment, 7_500.0);
        assert_relative_eq!(stats.surplus, 5_550.0, epsilon = 1e-6);
        assert_relative_eq!(stats.surplus_per_member, 1_850.0, epsilon = 1e-6);

        let m1 = stats.projection_for(&MemberId::new("m1")).unwrap();
        assert_relative_eq!(m1.projected_payout, 20_000.0 + 7_500.0 + 1_850.0, epsilon = 1e-6);
        let m3 = stats.projection_for(&MemberId::new("m3")).unwrap();
        assert_relative_eq!(m3.projected_payout, 10_000.0 + 1_850.0, epsilon = 1e-6);

        assert_relative_eq!(stats.operational_fund, 2_000.0);
        assert_relative_eq!(stats.management_fee_total, 1_500.0);
        assert_relative_eq!(
            stats.total_projected_payout(),
            45_000.0 + 7_500.0 + 5_550.0,
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_commitments_exceeding_earnings_leave_no_surplus() {
        let settings = SystemSettings {
            fixed_interest_return: 10_000.0,
            ..SystemSettings::default()
        };
        let deposits = vec![deposit("d1", "m1", 5_000.0, 0.0)];
        let loans = vec![liquidate(&loan("l1", "m1", 50_000.0), date(2026, 2, 1))];

        let stats = compute_group_stats(&members(), &deposits, &loans, &settings);
        assert_eq!(stats.eligible_member_count, 1);
        assert_eq!(stats.surplus, 0.0);
        assert_eq!(stats.surplus_per_member, 0.0);
    }

    #[test]
    fn test_empty_group() {
        let stats = compute_group_stats(&[], &[], &[], &SystemSettings::default());
        assert_eq!(stats.surplus_per_member, 0.0);
        assert_eq!(stats.available_for_loan, 0.0);
        assert!(stats.members.is_empty());
    }
}
