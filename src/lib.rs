//! ASCA Ledger - savings-and-credit engine for rotating savings associations
//!
//! This library provides:
//! - Late-fee evaluation for monthly contributions
//! - Loan terms, overdue/imminent status, penalties, rollover and liquidation
//! - Member aggregates (savings, lifetime borrowing, eligibility, credit limit)
//! - Group liquidity and end-of-cycle profit-sharing projections
//! - A validated CSV/JSON persistence boundary and a write-intent ledger book

pub mod error;
pub mod ledger;
pub mod settings;
pub mod engine;
pub mod book;

// Re-export commonly used types
pub use book::{LedgerBook, NewMember};
pub use error::{LedgerError, LedgerResult, LoadError};
pub use ledger::{CsvStore, Deposit, LedgerSnapshot, LedgerStore, Loan, LoanStatus, Member, SettleAction};
pub use settings::SystemSettings;
pub use engine::{GroupStats, MemberAggregate};
