//! Ledger entities: members, savings deposits and loans

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::month::CycleMonth;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self::new(id)
            }
        }
    };
}

string_id!(
    /// Identifier of a member record
    MemberId
);
string_id!(
    /// Identifier of a savings deposit
    DepositId
);
string_id!(
    /// Identifier of a loan
    LoanId
);

/// Role of a member within the association
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    Member,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Member => "member",
        }
    }
}

/// A member of the association
///
/// Savings totals, lifetime borrowing and eligibility are never stored here;
/// they are derived from the deposit and loan records by
/// [`crate::engine::aggregate_member`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,

    pub name: String,

    pub email: String,

    pub phone: Option<String>,

    pub address: Option<String>,

    /// Avatar image reference
    pub avatar: Option<String>,

    pub role: Role,

    /// Whether the one-time admission fee (joia) has been paid
    pub joia_paid: bool,

    pub joined_at: NaiveDate,
}

impl Member {
    /// Create a regular member with no contact details beyond email
    pub fn new(
        id: impl Into<MemberId>,
        name: impl Into<String>,
        email: impl Into<String>,
        joia_paid: bool,
        joined_at: NaiveDate,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: email.into(),
            phone: None,
            address: None,
            avatar: None,
            role: Role::Member,
            joia_paid,
            joined_at,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// A monthly savings contribution (mensalidade)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deposit {
    pub id: DepositId,

    pub member_id: MemberId,

    /// Deposited amount, always positive
    pub amount: f64,

    pub date: NaiveDate,

    /// Late fee charged at creation time
    pub late_fee: f64,

    /// Month bucket the deposit counts toward
    pub month: CycleMonth,
}

/// Lifecycle state of a loan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoanStatus {
    Active,
    /// Terminal
    Paid,
}

impl LoanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanStatus::Active => "active",
            LoanStatus::Paid => "paid",
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, LoanStatus::Active)
    }
}

/// A short-term loan granted from the group's savings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Loan {
    pub id: LoanId,

    pub member_id: MemberId,

    /// Principal
    pub amount: f64,

    /// Interest charged per term, as a fraction (0.15 = 15%)
    pub interest_rate: f64,

    pub requested_at: NaiveDate,

    pub due_date: NaiveDate,

    pub status: LoanStatus,

    /// Principal plus every interest charge accrued so far (creation + rollovers)
    pub total_repayment: f64,

    pub paid_at: Option<NaiveDate>,
}

impl Loan {
    /// Interest earned by the group on this loan so far
    pub fn accrued_interest(&self) -> f64 {
        self.total_repayment - self.amount
    }

    /// One interest charge on the principal
    pub fn interest_charge(&self) -> f64 {
        self.amount * self.interest_rate
    }

    /// Number of rollovers implied by the accrued interest
    pub fn renewals(&self) -> u32 {
        let charge = self.interest_charge();
        if charge <= 0.0 {
            return 0;
        }
        let charges = (self.accrued_interest() / charge).round();
        (charges as u32).saturating_sub(1)
    }
}

/// Settlement requested on an active loan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SettleAction {
    /// Liquidate the loan in full
    Pay,
    /// Pay the interest and roll the loan over for another term
    Renew,
}

impl fmt::Display for SettleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettleAction::Pay => f.write_str("pay"),
            SettleAction::Renew => f.write_str("renew"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_member_defaults() {
        let member = Member::new("m1", "Ana Ribeiro", "ana@example.com", true, date(2025, 12, 1));
        assert_eq!(member.id.as_str(), "m1");
        assert_eq!(member.role, Role::Member);
        assert!(!member.is_admin());
        assert!(member.phone.is_none());
    }

    #[test]
    fn test_loan_interest_and_renewals() {
        let mut loan = Loan {
            id: LoanId::new("L1"),
            member_id: MemberId::new("m1"),
            amount: 20_000.0,
            interest_rate: 0.15,
            requested_at: date(2026, 1, 5),
            due_date: date(2026, 2, 4),
            status: LoanStatus::Active,
            total_repayment: 23_000.0,
            paid_at: None,
        };
        assert!((loan.accrued_interest() - 3_000.0).abs() < 1e-9);
        assert_eq!(loan.renewals(), 0);

        loan.total_repayment = 29_000.0;
        assert_eq!(loan.renewals(), 2);
    }

    #[test]
    fn test_status_serde() {
        let json = serde_json::to_string(&LoanStatus::Paid).unwrap();
        assert_eq!(json, "\"paid\"");
        let role: Role = serde_json::from_str("\"admin\"").unwrap();
        assert_eq!(role, Role::Admin);
    }
}
