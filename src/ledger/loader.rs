//! Load and save ledger tables as CSV
//!
//! Stored rows are loosely shaped (optional columns, legacy status values).
//! Each row type is parsed into its strongly-typed entity here, so the engine
//! never sees a partially-shaped record.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use chrono::NaiveDate;
use csv::{Reader, Writer};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::{CycleMonth, Deposit, DepositId, Loan, LoanId, LoanStatus, Member, MemberId, Role};
use crate::error::LoadError;

pub const MEMBERS_FILE: &str = "members.csv";
pub const DEPOSITS_FILE: &str = "deposits.csv";
pub const LOANS_FILE: &str = "loans.csv";

/// Raw row of members.csv
#[derive(Debug, Serialize, Deserialize)]
struct MemberRow {
    id: String,
    name: String,
    email: String,
    phone: Option<String>,
    address: Option<String>,
    avatar: Option<String>,
    role: Option<String>,
    joia_paid: bool,
    joined_at: NaiveDate,
}

impl MemberRow {
    fn to_member(self) -> Result<Member, LoadError> {
        if self.id.trim().is_empty() {
            return Err(LoadError::invalid("member", "id", self.id));
        }

        let role = match self.role.as_deref().map(str::trim) {
            None | Some("") | Some("member") => Role::Member,
            Some("admin") => Role::Admin,
            Some(other) => return Err(LoadError::invalid("member", "role", other)),
        };

        Ok(Member {
            id: MemberId::new(self.id),
            name: self.name,
            email: self.email,
            phone: non_empty(self.phone),
            address: non_empty(self.address),
            avatar: non_empty(self.avatar),
            role,
            joia_paid: self.joia_paid,
            joined_at: self.joined_at,
        })
    }
}

impl From<&Member> for MemberRow {
    fn from(member: &Member) -> Self {
        Self {
            id: member.id.to_string(),
            name: member.name.clone(),
            email: member.email.clone(),
            phone: member.phone.clone(),
            address: member.address.clone(),
            avatar: member.avatar.clone(),
            role: Some(member.role.as_str().to_string()),
            joia_paid: member.joia_paid,
            joined_at: member.joined_at,
        }
    }
}

/// Raw row of deposits.csv
#[derive(Debug, Serialize, Deserialize)]
struct DepositRow {
    id: String,
    member_id: String,
    amount: f64,
    date: NaiveDate,
    /// Missing fees are stored as empty and read as zero
    late_fee: Option<f64>,
    month: Option<String>,
}

impl DepositRow {
    fn to_deposit(self) -> Result<Deposit, LoadError> {
        if !(self.amount.is_finite() && self.amount > 0.0) {
            return Err(LoadError::invalid("deposit", "amount", self.amount.to_string()));
        }

        let late_fee = self.late_fee.unwrap_or(0.0);
        if !(late_fee.is_finite() && late_fee >= 0.0) {
            return Err(LoadError::invalid("deposit", "late_fee", late_fee.to_string()));
        }

        let month = match non_empty(self.month) {
            Some(raw) => raw
                .parse::<CycleMonth>()
                .map_err(|_| LoadError::invalid("deposit", "month", raw))?,
            None => CycleMonth::from_date(self.date),
        };

        Ok(Deposit {
            id: DepositId::new(self.id),
            member_id: MemberId::new(self.member_id),
            amount: self.amount,
            date: self.date,
            late_fee,
            month,
        })
    }
}

impl From<&Deposit> for DepositRow {
    fn from(deposit: &Deposit) -> Self {
        Self {
            id: deposit.id.to_string(),
            member_id: deposit.member_id.to_string(),
            amount: deposit.amount,
            date: deposit.date,
            late_fee: Some(deposit.late_fee),
            month: Some(deposit.month.to_string()),
        }
    }
}

/// Raw row of loans.csv
#[derive(Debug, Serialize, Deserialize)]
struct LoanRow {
    id: String,
    member_id: String,
    amount: f64,
    interest_rate: f64,
    requested_at: NaiveDate,
    due_date: NaiveDate,
    paid_at: Option<NaiveDate>,
    status: String,
    total_repayment: f64,
}

impl LoanRow {
    fn to_loan(self) -> Result<Loan, LoadError> {
        if !(self.amount.is_finite() && self.amount > 0.0) {
            return Err(LoadError::invalid("loan", "amount", self.amount.to_string()));
        }
        if !(self.interest_rate.is_finite() && self.interest_rate >= 0.0) {
            return Err(LoadError::invalid("loan", "interest_rate", self.interest_rate.to_string()));
        }
        if !(self.total_repayment.is_finite() && self.total_repayment >= self.amount) {
            return Err(LoadError::invalid("loan", "total_repayment", self.total_repayment.to_string()));
        }

        // "overdue" is a legacy stored status; overdue is derived from dates
        let status = match self.status.trim() {
            "active" | "overdue" => LoanStatus::Active,
            "paid" => LoanStatus::Paid,
            other => return Err(LoadError::invalid("loan", "status", other)),
        };

        match (status, self.paid_at) {
            (LoanStatus::Paid, None) => {
                return Err(LoadError::invalid("loan", "paid_at", format!("missing on paid loan {}", self.id)));
            }
            (LoanStatus::Active, Some(paid_at)) => {
                return Err(LoadError::invalid("loan", "paid_at", format!("{} on active loan {}", paid_at, self.id)));
            }
            _ => {}
        }

        Ok(Loan {
            id: LoanId::new(self.id),
            member_id: MemberId::new(self.member_id),
            amount: self.amount,
            interest_rate: self.interest_rate,
            requested_at: self.requested_at,
            due_date: self.due_date,
            status,
            total_repayment: self.total_repayment,
            paid_at: self.paid_at,
        })
    }
}

impl From<&Loan> for LoanRow {
    fn from(loan: &Loan) -> Self {
        Self {
            id: loan.id.to_string(),
            member_id: loan.member_id.to_string(),
            amount: loan.amount,
            interest_rate: loan.interest_rate,
            requested_at: loan.requested_at,
            due_date: loan.due_date,
            paid_at: loan.paid_at,
            status: loan.status.as_str().to_string(),
            total_repayment: loan.total_repayment,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn read_rows<R: Read, T: DeserializeOwned>(reader: R) -> Result<Vec<T>, LoadError> {
    let mut csv_reader = Reader::from_reader(reader);
    let mut rows = Vec::new();
    for result in csv_reader.deserialize() {
        rows.push(result?);
    }
    Ok(rows)
}

fn write_rows<W: Write, T: Serialize>(writer: W, rows: impl IntoIterator<Item = T>) -> Result<(), LoadError> {
    let mut csv_writer = Writer::from_writer(writer);
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Load members from any reader
pub fn load_members_from_reader<R: Read>(reader: R) -> Result<Vec<Member>, LoadError> {
    read_rows::<_, MemberRow>(reader)?
        .into_iter()
        .map(MemberRow::to_member)
        .collect()
}

/// Load deposits from any reader
pub fn load_deposits_from_reader<R: Read>(reader: R) -> Result<Vec<Deposit>, LoadError> {
    read_rows::<_, DepositRow>(reader)?
        .into_iter()
        .map(DepositRow::to_deposit)
        .collect()
}

/// Load loans from any reader
pub fn load_loans_from_reader<R: Read>(reader: R) -> Result<Vec<Loan>, LoadError> {
    read_rows::<_, LoanRow>(reader)?
        .into_iter()
        .map(LoanRow::to_loan)
        .collect()
}

pub fn load_members<P: AsRef<Path>>(path: P) -> Result<Vec<Member>, LoadError> {
    load_members_from_reader(File::open(path)?)
}

pub fn load_deposits<P: AsRef<Path>>(path: P) -> Result<Vec<Deposit>, LoadError> {
    load_deposits_from_reader(File::open(path)?)
}

pub fn load_loans<P: AsRef<Path>>(path: P) -> Result<Vec<Loan>, LoadError> {
    load_loans_from_reader(File::open(path)?)
}

pub fn write_members<W: Write>(writer: W, members: &[Member]) -> Result<(), LoadError> {
    write_rows(writer, members.iter().map(MemberRow::from))
}

pub fn write_deposits<W: Write>(writer: W, deposits: &[Deposit]) -> Result<(), LoadError> {
    write_rows(writer, deposits.iter().map(DepositRow::from))
}

pub fn write_loans<W: Write>(writer: W, loans: &[Loan]) -> Result<(), LoadError> {
    write_rows(writer, loans.iter().map(LoanRow::from))
}
