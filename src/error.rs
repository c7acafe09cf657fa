//! Error types for the ledger boundary
//!
//! The calculators in [`crate::engine`] are total and never fail. Errors only
//! arise where data crosses into the crate (loading) or where a write intent is
//! admitted against the current snapshot (the ledger book).

use thiserror::Error;

use crate::ledger::{LoanId, MemberId, SettleAction};

/// Result type alias for write intents
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Rejections raised by admission control before any mutation is applied
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Amount is non-positive, not finite, or outside the configured deposit bounds
    #[error("Invalid amount {amount:.2}: {reason}")]
    InvalidAmount { amount: f64, reason: String },

    /// Requested principal exceeds the member's personal credit limit
    #[error("Requested {requested:.2} exceeds credit limit {limit:.2} for member {member_id}")]
    CreditLimitExceeded {
        member_id: MemberId,
        requested: f64,
        limit: f64,
    },

    /// Requested principal exceeds the cash the group has on hand
    #[error("Requested {requested:.2} exceeds available group liquidity {available:.2}")]
    InsufficientGroupLiquidity { requested: f64, available: f64 },

    /// Pay or renew attempted on a loan that is already paid
    #[error("Cannot {action} loan {loan_id}: loan is already paid")]
    InvalidTransition {
        loan_id: LoanId,
        action: SettleAction,
    },

    /// Registration details are missing or blank
    #[error("Invalid member {field}: {reason}")]
    InvalidMember { field: &'static str, reason: String },

    #[error("Member already exists: {0}")]
    DuplicateMember(MemberId),

    #[error("Member not found: {0}")]
    MemberNotFound(MemberId),

    #[error("Loan not found: {0}")]
    LoanNotFound(LoanId),
}

/// Failures while reading or writing ledger records
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A stored row did not parse into a well-formed entity
    #[error("Invalid {entity} {field}: {value}")]
    Invalid {
        entity: &'static str,
        field: &'static str,
        value: String,
    },
}

impl LoadError {
    pub(crate) fn invalid(entity: &'static str, field: &'static str, value: impl Into<String>) -> Self {
        LoadError::Invalid {
            entity,
            field,
            value: value.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = LedgerError::InsufficientGroupLiquidity {
            requested: 5000.0,
            available: 1250.5,
        };
        assert_eq!(
            err.to_string(),
            "Requested 5000.00 exceeds available group liquidity 1250.50"
        );

        let err = LedgerError::InvalidTransition {
            loan_id: LoanId::new("L-7"),
            action: SettleAction::Renew,
        };
        assert_eq!(err.to_string(), "Cannot renew loan L-7: loan is already paid");

        let err = LedgerError::DuplicateMember(MemberId::new("m2"));
        assert_eq!(err.to_string(), "Member already exists: m2");

        let err = LoadError::invalid("loan", "status", "cancelled");
        assert_eq!(err.to_string(), "Invalid loan status: cancelled");
    }
}
