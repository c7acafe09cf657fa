//! Ledger records, their CSV representation, and the persistence seam

mod data;
mod month;
pub mod loader;
pub mod store;

pub use data::{Deposit, DepositId, Loan, LoanId, LoanStatus, Member, MemberId, Role, SettleAction};
pub use month::{CycleMonth, ParseMonthError};
pub use store::{CsvStore, LedgerSnapshot, LedgerStore, DEFAULT_LEDGER_PATH};
