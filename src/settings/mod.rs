//! Association rules: contribution bounds, fees, rates and the savings cycle
//!
//! Settings are an immutable snapshot handed to every calculation. Changing a
//! rule means loading (or building) a new snapshot, never mutating a shared one.

pub mod loader;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::ledger::CycleMonth;

/// Savings-independent margin every member may borrow
pub const BASE_MARGIN: f64 = 1_000.0;

/// Extra credit granted to members who paid the joia
pub const JOIA_BONUS: f64 = 1_000.0;

/// Process-wide configuration snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemSettings {
    /// One-time admission fee
    pub joia_amount: f64,

    /// Lower bound of a monthly contribution
    pub min_mensalidade: f64,

    /// Upper bound of a monthly contribution
    pub max_mensalidade: f64,

    /// Fraction of the deposit charged when paid after the cutoff day
    pub late_fee_rate: f64,

    /// Lifetime principal a member must borrow to become eligible for the fixed bonus
    pub min_movement_for_interest: f64,

    /// Fixed bonus paid to each eligible member at the end of the cycle
    pub fixed_interest_return: f64,

    pub management_fee_per_member: f64,

    /// Interest charged per loan term
    pub loan_interest_rate: f64,

    #[serde(default)]
    pub credit: CreditRules,

    #[serde(default)]
    pub cycle: Cycle,
}

impl Default for SystemSettings {
    fn default() -> Self {
        Self {
            joia_amount: 1_000.0,
            min_mensalidade: 2_000.0,
            max_mensalidade: 5_000.0,
            late_fee_rate: 0.15,
            min_movement_for_interest: 50_000.0,
            fixed_interest_return: 7_500.0,
            management_fee_per_member: 500.0,
            loan_interest_rate: 0.15,
            credit: CreditRules::default(),
            cycle: Cycle::default(),
        }
    }
}

impl SystemSettings {
    /// Whether a contribution lies within the configured monthly bounds
    pub fn deposit_in_bounds(&self, amount: f64) -> bool {
        amount >= self.min_mensalidade && amount <= self.max_mensalidade
    }
}

/// Constants behind the personal credit limit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CreditRules {
    pub base_margin: f64,
    pub joia_bonus: f64,
}

impl Default for CreditRules {
    fn default() -> Self {
        Self {
            base_margin: BASE_MARGIN,
            joia_bonus: JOIA_BONUS,
        }
    }
}

/// The annual period over which savings and borrowing are measured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cycle {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Default for Cycle {
    fn default() -> Self {
        // December to November
        Self {
            start: NaiveDate::from_ymd_opt(2025, 12, 1).unwrap_or(NaiveDate::MIN),
            end: NaiveDate::from_ymd_opt(2026, 11, 30).unwrap_or(NaiveDate::MAX),
        }
    }
}

impl Cycle {
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Every month bucket from start to end, inclusive
    pub fn months(&self) -> Vec<CycleMonth> {
        let last = CycleMonth::from_date(self.end);
        let mut month = CycleMonth::from_date(self.start);
        let mut months = Vec::new();
        while month <= last {
            months.push(month);
            month = month.next();
        }
        months
    }
}
