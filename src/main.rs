//! ASCA Ledger CLI
//!
//! Reports on the group's position and applies write intents to a ledger directory

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use asca_ledger::engine::{amount_owed, evaluate_loan_status, monthly_savings, recent_activity};
use asca_ledger::ledger::{LoanId, MemberId, DEFAULT_LEDGER_PATH};
use asca_ledger::{CsvStore, LedgerBook, LedgerStore, NewMember, SettleAction};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;

#[derive(Debug, Parser)]
#[command(name = "asca_ledger", version, about = "Savings-and-credit ledger for an ASCA group")]
struct Cli {
    /// Directory holding members.csv, deposits.csv, loans.csv and settings.json
    #[arg(long, default_value = DEFAULT_LEDGER_PATH)]
    data: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Group position, member projections and loans needing attention
    Report {
        /// Evaluation date (defaults to today)
        #[arg(long)]
        as_of: Option<NaiveDate>,
    },
    /// Show or register members
    Member {
        #[command(subcommand)]
        command: MemberCommand,
    },
    /// Record a monthly contribution
    Deposit {
        #[arg(long)]
        member: String,
        #[arg(long)]
        amount: f64,
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Request a loan
    Loan {
        #[arg(long)]
        member: String,
        #[arg(long)]
        amount: f64,
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Pay off or renew an active loan
    Settle {
        #[arg(long)]
        loan: String,
        #[arg(long, value_enum)]
        action: ActionArg,
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Write per-member projections to CSV
    Export {
        #[arg(long, default_value = "projection_output.csv")]
        output: PathBuf,
    },
}

#[derive(Debug, Subcommand)]
enum MemberCommand {
    /// Metrics and loan book for one member
    Show {
        id: String,
        #[arg(long)]
        as_of: Option<NaiveDate>,
    },
    /// Register a new member (joia not yet paid)
    Add {
        #[arg(long)]
        id: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        address: Option<String>,
        /// Joining date (defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ActionArg {
    Pay,
    Renew,
}

impl From<ActionArg> for SettleAction {
    fn from(arg: ActionArg) -> Self {
        match arg {
            ActionArg::Pay => SettleAction::Pay,
            ActionArg::Renew => SettleAction::Renew,
        }
    }
}

/// Row of the projection export
#[derive(Debug, Serialize)]
struct ProjectionRow<'a> {
    member_id: &'a str,
    name: &'a str,
    total_savings: f64,
    total_loans_taken: f64,
    eligibility_progress: f64,
    credit_limit: f64,
    eligible: bool,
    projected_payout: f64,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let store = CsvStore::new(&cli.data);
    let snapshot = store
        .snapshot()
        .with_context(|| format!("loading ledger from {}", cli.data.display()))?;
    let mut book = LedgerBook::new(snapshot);
    let today = Local::now().date_naive();

    match cli.command {
        Command::Report { as_of } => print_report(&book, as_of.unwrap_or(today)),
        Command::Member { command: MemberCommand::Show { id, as_of } } => {
            print_member(&book, &MemberId::new(id), as_of.unwrap_or(today))?
        }
        Command::Member { command: MemberCommand::Add { id, name, email, phone, address, date } } => {
            let registration = NewMember { id, name, email, phone, address };
            let member = book.add_member(registration, date.unwrap_or(today))?;
            println!("Member {} registered: {} <{}>", member.id, member.name, member.email);
            store.save(book.snapshot()).context("saving ledger")?;
        }
        Command::Deposit { member, amount, date } => {
            let deposit = book.record_deposit(&MemberId::new(member), amount, date.unwrap_or(today))?;
            println!(
                "Deposit {} recorded: {:.2} MT for {} (late fee {:.2} MT)",
                deposit.id, deposit.amount, deposit.month, deposit.late_fee
            );
            store.save(book.snapshot()).context("saving ledger")?;
        }
        Command::Loan { member, amount, date } => {
            let loan = book.request_loan(&MemberId::new(member), amount, date.unwrap_or(today))?;
            println!(
                "Loan {} granted: {:.2} MT, repay {:.2} MT by {}",
                loan.id, loan.amount, loan.total_repayment, loan.due_date
            );
            store.save(book.snapshot()).context("saving ledger")?;
        }
        Command::Settle { loan, action, date } => {
            let loan = book.settle_loan(&LoanId::new(loan), action.into(), date.unwrap_or(today))?;
            println!(
                "Loan {} is {}: repay {:.2} MT, due {}",
                loan.id,
                loan.status.as_str(),
                loan.total_repayment,
                loan.due_date
            );
            store.save(book.snapshot()).context("saving ledger")?;
        }
        Command::Export { output } => {
            export_projections(&book, &output)?;
            println!("Projections written to: {}", output.display());
        }
    }

    Ok(())
}

fn print_report(book: &LedgerBook, as_of: NaiveDate) {
    let snapshot = book.snapshot();
    let settings = book.settings();
    let stats = book.group_stats();

    println!("ASCA Ledger - position as of {}", as_of);
    println!("{}\n", "=".repeat(40));

    println!("Cash:");
    println!("  Total Savings:      {:>14.2} MT", stats.total_group_savings);
    println!("  Active Loans:       {:>14.2} MT", stats.active_loans_total);
    println!("  Available for Loan: {:>14.2} MT", stats.available_for_loan);
    println!("  Operational Fund:   {:>14.2} MT", stats.operational_fund);
    println!("  Management Fees:    {:>14.2} MT", stats.management_fee_total);

    println!("\nEarnings:");
    println!("  Late Fees:          {:>14.2} MT", stats.total_late_fees);
    println!("  Loan Interest:      {:>14.2} MT", stats.total_loan_interest);
    println!("  Total:              {:>14.2} MT", stats.total_earnings);
    println!("  Fixed Commitment:   {:>14.2} MT ({} eligible)", stats.total_fixed_commitment, stats.eligible_member_count);
    println!("  Surplus:            {:>14.2} MT ({:.2} per member)", stats.surplus, stats.surplus_per_member);

    println!("\nMembers:");
    println!("{:<8} {:<24} {:>12} {:>12} {:>6} {:>12} {:>12}",
        "ID", "Name", "Savings", "Borrowed", "Elig%", "Limit", "Payout");
    println!("{}", "-".repeat(92));
    for (member, projection) in snapshot.members.iter().zip(&stats.members) {
        let agg = &projection.aggregate;
        println!("{:<8} {:<24} {:>12.2} {:>12.2} {:>5.0}% {:>12.2} {:>12.2}",
            member.id,
            member.name,
            agg.total_savings,
            agg.total_loans_taken,
            agg.eligibility_progress * 100.0,
            agg.credit_limit,
            projection.projected_payout,
        );
    }

    println!("\nCycle {} to {}:", settings.cycle.start, settings.cycle.end);
    for month in monthly_savings(&snapshot.deposits, &settings.cycle) {
        println!("  {} {:>12.2} MT", month.month, month.total);
    }
    let outside = snapshot.deposits.iter().filter(|d| !settings.cycle.contains(d.date)).count();
    if outside > 0 {
        println!("  ({} deposits dated outside this cycle)", outside);
    }

    println!("\nLoans needing attention:");
    let mut flagged = 0;
    for loan in &snapshot.loans {
        let status = evaluate_loan_status(loan, as_of);
        if status.overdue || status.imminent {
            flagged += 1;
            println!("  {} ({}) {:>10.2} MT owed, {} {} days",
                loan.id,
                loan.member_id,
                amount_owed(loan, as_of),
                if status.overdue { "OVERDUE by" } else { "due in" },
                status.days_remaining.abs(),
            );
        }
    }
    if flagged == 0 {
        println!("  none");
    }

    println!("\nRecent activity:");
    for activity in recent_activity(&snapshot.deposits, &snapshot.loans, 5) {
        println!("  {} {:<8} {:<8} {:>10.2} MT",
            activity.date(), activity.kind(), activity.member_id(), activity.amount());
    }
}

fn print_member(book: &LedgerBook, member_id: &MemberId, as_of: NaiveDate) -> Result<()> {
    let member = book.member(member_id)?;
    let aggregate = book.aggregate(member_id)?;
    let summary = book.loan_summary(member_id, as_of)?;
    let stats = book.group_stats();

    println!("{} ({}) - {}", member.name, member.id, member.role.as_str());
    println!("  Joined: {}  Joia paid: {}", member.joined_at, member.joia_paid);
    println!("  Total Savings:  {:>12.2} MT", aggregate.total_savings);
    println!("  Lifetime Loans: {:>12.2} MT", aggregate.total_loans_taken);
    println!("  Eligibility:    {:>11.0}%", aggregate.eligibility_progress * 100.0);
    println!("  Credit Limit:   {:>12.2} MT", aggregate.credit_limit);
    if let Some(projection) = stats.projection_for(member_id) {
        println!("  Projected Payout: {:>10.2} MT", projection.projected_payout);
    }

    println!("\nLoans ({} active of {}):", summary.active_count, summary.total_count);
    println!("  Debt: {:.2} MT  Paid: {:.2} MT", summary.total_debt, summary.total_paid);
    for loan in book.snapshot().loans.iter().filter(|l| &l.member_id == member_id) {
        let status = evaluate_loan_status(loan, as_of);
        let flag = if status.overdue {
            "overdue"
        } else if status.imminent {
            "imminent"
        } else {
            loan.status.as_str()
        };
        println!("  {} {:>10.2} MT requested {} due {} renewals {} owed {:>10.2} MT [{}]",
            loan.id,
            loan.amount,
            loan.requested_at,
            loan.due_date,
            loan.renewals(),
            amount_owed(loan, as_of),
            flag,
        );
    }
    if summary.needs_attention() {
        println!("\n  {} overdue, {} due within a week", summary.overdue.len(), summary.imminent.len());
    }

    Ok(())
}

fn export_projections(book: &LedgerBook, output: &Path) -> Result<()> {
    let stats = book.group_stats();
    let file = File::create(output).with_context(|| format!("creating {}", output.display()))?;
    let mut writer = csv::Writer::from_writer(file);

    for (member, projection) in book.snapshot().members.iter().zip(&stats.members) {
        let agg = &projection.aggregate;
        writer.serialize(ProjectionRow {
            member_id: member.id.as_str(),
            name: &member.name,
            total_savings: agg.total_savings,
            total_loans_taken: agg.total_loans_taken,
            eligibility_progress: agg.eligibility_progress,
            credit_limit: agg.credit_limit,
            eligible: agg.is_eligible(),
            projected_payout: projection.projected_payout,
        })?;
    }
    writer.flush()?;
    Ok(())
}
