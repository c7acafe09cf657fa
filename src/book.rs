//! Ledger book: the write-intent boundary
//!
//! Holds one snapshot and is the only place it is mutated. Each intent is
//! validated against the snapshot as it stands at call time and rejected
//! before any change is applied, so a failed intent leaves the book untouched.

use chrono::NaiveDate;
use log::{info, warn};

use crate::engine::{
    self, aggregate_member, available_for_loan, compute_group_stats, evaluate_deposit,
    summarize_member_loans, GroupStats, MemberAggregate, MemberLoanSummary, LOAN_TERM_DAYS,
};
use crate::error::{LedgerError, LedgerResult};
use crate::ledger::{
    CycleMonth, Deposit, DepositId, LedgerSnapshot, Loan, LoanId, Member, MemberId, SettleAction,
};
use crate::settings::SystemSettings;

/// Details supplied when an admin registers a member
#[derive(Debug, Clone, Default)]
pub struct NewMember {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// In-memory ledger that applies write intents to a snapshot
///
/// # Example
/// ```ignore
/// let mut book = LedgerBook::new(store.snapshot()?);
/// book.record_deposit(&member_id, 5_000.0, today)?;
/// book.request_loan(&member_id, 3_000.0, today)?;
/// store.save(book.snapshot())?;
/// ```
#[derive(Debug, Clone)]
pub struct LedgerBook {
    snapshot: LedgerSnapshot,
}

impl LedgerBook {
    pub fn new(snapshot: LedgerSnapshot) -> Self {
        Self { snapshot }
    }

    pub fn snapshot(&self) -> &LedgerSnapshot {
        &self.snapshot
    }

    pub fn into_snapshot(self) -> LedgerSnapshot {
        self.snapshot
    }

    pub fn settings(&self) -> &SystemSettings {
        &self.snapshot.settings
    }

    /// Replace the settings snapshot used for subsequent calculations
    pub fn set_settings(&mut self, settings: SystemSettings) {
        self.snapshot.settings = settings;
    }

    pub fn member(&self, member_id: &MemberId) -> LedgerResult<&Member> {
        self.snapshot
            .member(member_id)
            .ok_or_else(|| LedgerError::MemberNotFound(member_id.clone()))
    }

    pub fn loan(&self, loan_id: &LoanId) -> LedgerResult<&Loan> {
        self.snapshot
            .loan(loan_id)
            .ok_or_else(|| LedgerError::LoanNotFound(loan_id.clone()))
    }

    /// Derived metrics for one member
    pub fn aggregate(&self, member_id: &MemberId) -> LedgerResult<MemberAggregate> {
        let member = self.member(member_id)?;
        Ok(aggregate_member(
            member,
            &self.snapshot.deposits,
            &self.snapshot.loans,
            &self.snapshot.settings,
        ))
    }

    /// Loan book of one member as of a date
    pub fn loan_summary(
        &self,
        member_id: &MemberId,
        as_of: NaiveDate,
    ) -> LedgerResult<MemberLoanSummary> {
        self.member(member_id)?;
        Ok(summarize_member_loans(member_id, &self.snapshot.loans, as_of))
    }

    /// Group position and payout projection for the current snapshot
    pub fn group_stats(&self) -> GroupStats {
        compute_group_stats(
            &self.snapshot.members,
            &self.snapshot.deposits,
            &self.snapshot.loans,
            &self.snapshot.settings,
        )
    }

    /// Register a regular member who has not paid the joia yet
    pub fn add_member(&mut self, new: NewMember, joined_at: NaiveDate) -> LedgerResult<&Member> {
        let id = new.id.trim();
        if id.is_empty() {
            return Err(rejected(LedgerError::InvalidMember {
                field: "id",
                reason: "id must not be blank".to_string(),
            }));
        }
        if new.name.trim().is_empty() {
            return Err(rejected(LedgerError::InvalidMember {
                field: "name",
                reason: "name must not be blank".to_string(),
            }));
        }

        let member_id = MemberId::new(id);
        if self.snapshot.member(&member_id).is_some() {
            return Err(rejected(LedgerError::DuplicateMember(member_id)));
        }

        let mut member = Member::new(member_id, new.name.trim(), new.email.trim(), false, joined_at);
        member.phone = new.phone.filter(|p| !p.trim().is_empty());
        member.address = new.address.filter(|a| !a.trim().is_empty());

        info!("Registered member {} ({}) on {}", member.id, member.name, joined_at);
        let index = self.snapshot.members.len();
        self.snapshot.members.push(member);
        Ok(&self.snapshot.members[index])
    }

    /// Append a monthly contribution, pricing its late fee
    pub fn record_deposit(
        &mut self,
        member_id: &MemberId,
        amount: f64,
        date: NaiveDate,
    ) -> LedgerResult<&Deposit> {
        self.member(member_id)?;

        let settings = &self.snapshot.settings;
        ensure_positive(amount)?;
        if !settings.deposit_in_bounds(amount) {
            return Err(rejected(LedgerError::InvalidAmount {
                amount,
                reason: format!(
                    "monthly contribution must be between {:.2} and {:.2}",
                    settings.min_mensalidade, settings.max_mensalidade
                ),
            }));
        }

        let evaluation = evaluate_deposit(amount, date, settings);
        let deposit = Deposit {
            id: self.next_deposit_id(),
            member_id: member_id.clone(),
            amount,
            date,
            late_fee: evaluation.late_fee,
            month: CycleMonth::from_date(date),
        };

        info!(
            "Recorded deposit {} for {}: {:.2} on {} (late fee {:.2})",
            deposit.id, member_id, amount, date, deposit.late_fee
        );
        let index = self.snapshot.deposits.len();
        self.snapshot.deposits.push(deposit);
        Ok(&self.snapshot.deposits[index])
    }

    /// Grant a loan after checking the member's credit limit and group liquidity
    pub fn request_loan(
        &mut self,
        member_id: &MemberId,
        amount: f64,
        date: NaiveDate,
    ) -> LedgerResult<&Loan> {
        ensure_positive(amount)?;

        let limit = self.aggregate(member_id)?.credit_limit;
        if amount > limit {
            return Err(rejected(LedgerError::CreditLimitExceeded {
                member_id: member_id.clone(),
                requested: amount,
                limit,
            }));
        }

        let available = available_for_loan(&self.snapshot.deposits, &self.snapshot.loans);
        if amount > available {
            return Err(rejected(LedgerError::InsufficientGroupLiquidity {
                requested: amount,
                available,
            }));
        }

        let loan = engine::new_loan(
            self.next_loan_id(),
            member_id.clone(),
            amount,
            self.snapshot.settings.loan_interest_rate,
            date,
        );

        info!(
            "Granted loan {} to {}: {:.2}, repay {:.2} by {}",
            loan.id, member_id, amount, loan.total_repayment, loan.due_date
        );
        let index = self.snapshot.loans.len();
        self.snapshot.loans.push(loan);
        Ok(&self.snapshot.loans[index])
    }

    /// Liquidate or roll over an active loan
    pub fn settle_loan(
        &mut self,
        loan_id: &LoanId,
        action: SettleAction,
        date: NaiveDate,
    ) -> LedgerResult<&Loan> {
        let index = self
            .snapshot
            .loans
            .iter()
            .position(|l| &l.id == loan_id)
            .ok_or_else(|| LedgerError::LoanNotFound(loan_id.clone()))?;

        let current = &self.snapshot.loans[index];
        if !current.status.is_active() {
            return Err(rejected(LedgerError::InvalidTransition {
                loan_id: loan_id.clone(),
                action,
            }));
        }

        let settled = match action {
            SettleAction::Pay => engine::liquidate(current, date),
            SettleAction::Renew => engine::renew(current, LOAN_TERM_DAYS),
        };

        info!(
            "Settled loan {} ({}): status {}, repay {:.2}, due {}",
            loan_id,
            action,
            settled.status.as_str(),
            settled.total_repayment,
            settled.due_date
        );
        self.snapshot.loans[index] = settled;
        Ok(&self.snapshot.loans[index])
    }

    fn next_deposit_id(&self) -> DepositId {
        let mut n = self.snapshot.deposits.len() + 1;
        loop {
            let id = DepositId::new(format!("D{:04}", n));
            if !self.snapshot.deposits.iter().any(|d| d.id == id) {
                return id;
            }
            n += 1;
        }
    }

    fn next_loan_id(&self) -> LoanId {
        let mut n = self.snapshot.loans.len() + 1;
        loop {
            let id = LoanId::new(format!("L{:04}", n));
            if !self.snapshot.loans.iter().any(|l| l.id == id) {
                return id;
            }
            n += 1;
        }
    }
}

fn ensure_positive(amount: f64) -> LedgerResult<()> {
    if amount.is_finite() && amount > 0.0 {
        Ok(())
    } else {
        Err(rejected(LedgerError::InvalidAmount {
            amount,
            reason: "amount must be a positive number".to_string(),
        }))
    }
}

fn rejected(err: LedgerError) -> LedgerError {
    warn!("Rejected write intent: {}", err);
    err
}
