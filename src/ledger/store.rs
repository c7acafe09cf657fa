//! Ledger snapshots and the persistence seam
//!
//! The engine only ever sees a [`LedgerSnapshot`]: the four collections read
//! together so that aggregates are never computed against a torn read.

use std::collections::HashSet;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use log::info;

use super::loader::{self, DEPOSITS_FILE, LOANS_FILE, MEMBERS_FILE};
use super::{Deposit, Loan, LoanId, Member, MemberId};
use crate::error::LoadError;
use crate::settings::loader::{load_settings, save_settings, SETTINGS_FILE};
use crate::settings::SystemSettings;

/// Default ledger directory
pub const DEFAULT_LEDGER_PATH: &str = "data/ledger";

/// One consistent point-in-time view of the ledger
#[derive(Debug, Clone, Default)]
pub struct LedgerSnapshot {
    pub members: Vec<Member>,
    pub deposits: Vec<Deposit>,
    pub loans: Vec<Loan>,
    pub settings: SystemSettings,
}

impl LedgerSnapshot {
    pub fn new(
        members: Vec<Member>,
        deposits: Vec<Deposit>,
        loans: Vec<Loan>,
        settings: SystemSettings,
    ) -> Self {
        Self {
            members,
            deposits,
            loans,
            settings,
        }
    }

    pub fn member(&self, id: &MemberId) -> Option<&Member> {
        self.members.iter().find(|m| &m.id == id)
    }

    pub fn loan(&self, id: &LoanId) -> Option<&Loan> {
        self.loans.iter().find(|l| &l.id == id)
    }

    /// Check that ids are unique per table and every record belongs to a member
    pub fn validate(&self) -> Result<(), LoadError> {
        let mut member_ids = HashSet::new();
        for member in &self.members {
            if !member_ids.insert(&member.id) {
                return Err(LoadError::invalid("member", "id", format!("duplicate {}", member.id)));
            }
        }

        let mut deposit_ids = HashSet::new();
        for deposit in &self.deposits {
            if !deposit_ids.insert(&deposit.id) {
                return Err(LoadError::invalid("deposit", "id", format!("duplicate {}", deposit.id)));
            }
            if !member_ids.contains(&deposit.member_id) {
                return Err(LoadError::invalid(
                    "deposit",
                    "member_id",
                    format!("unknown member {} on deposit {}", deposit.member_id, deposit.id),
                ));
            }
        }

        let mut loan_ids = HashSet::new();
        for loan in &self.loans {
            if !loan_ids.insert(&loan.id) {
                return Err(LoadError::invalid("loan", "id", format!("duplicate {}", loan.id)));
            }
            if !member_ids.contains(&loan.member_id) {
                return Err(LoadError::invalid(
                    "loan",
                    "member_id",
                    format!("unknown member {} on loan {}", loan.member_id, loan.id),
                ));
            }
        }

        Ok(())
    }
}

/// Read side of the persistence collaborator
///
/// Implementors must return collections that belong to the same point in time
/// when called through [`LedgerStore::snapshot`].
pub trait LedgerStore {
    fn list_members(&self) -> Result<Vec<Member>, LoadError>;

    fn list_deposits(&self) -> Result<Vec<Deposit>, LoadError>;

    fn list_loans(&self) -> Result<Vec<Loan>, LoadError>;

    fn get_settings(&self) -> Result<SystemSettings, LoadError>;

    /// Fetch all four collections together, rejecting duplicate ids and orphaned records
    fn snapshot(&self) -> Result<LedgerSnapshot, LoadError> {
        let snapshot = LedgerSnapshot {
            members: self.list_members()?,
            deposits: self.list_deposits()?,
            loans: self.list_loans()?,
            settings: self.get_settings()?,
        };
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Persist a snapshot produced by applying write intents
    fn save(&self, snapshot: &LedgerSnapshot) -> Result<(), LoadError>;
}

/// Directory of CSV tables plus a JSON settings record
#[derive(Debug, Clone)]
pub struct CsvStore {
    root: PathBuf,
}

impl CsvStore {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    fn path(&self, file: &str) -> PathBuf {
        self.root.join(file)
    }
}

impl Default for CsvStore {
    fn default() -> Self {
        Self::new(DEFAULT_LEDGER_PATH)
    }
}

impl LedgerStore for CsvStore {
    fn list_members(&self) -> Result<Vec<Member>, LoadError> {
        loader::load_members(self.path(MEMBERS_FILE))
    }

    fn list_deposits(&self) -> Result<Vec<Deposit>, LoadError> {
        loader::load_deposits(self.path(DEPOSITS_FILE))
    }

    fn list_loans(&self) -> Result<Vec<Loan>, LoadError> {
        loader::load_loans(self.path(LOANS_FILE))
    }

    /// A missing settings record means the association runs on default rules
    fn get_settings(&self) -> Result<SystemSettings, LoadError> {
        let path = self.path(SETTINGS_FILE);
        if path.exists() {
            load_settings(path)
        } else {
            info!("No {} in {}, using default settings", SETTINGS_FILE, self.root.display());
            Ok(SystemSettings::default())
        }
    }

    fn snapshot(&self) -> Result<LedgerSnapshot, LoadError> {
        let snapshot = LedgerSnapshot {
            members: self.list_members()?,
            deposits: self.list_deposits()?,
            loans: self.list_loans()?,
            settings: self.get_settings()?,
        };
        snapshot.validate()?;
        info!(
            "Loaded {} members, {} deposits, {} loans from {}",
            snapshot.members.len(),
            snapshot.deposits.len(),
            snapshot.loans.len(),
            self.root.display()
        );
        Ok(snapshot)
    }

    fn save(&self, snapshot: &LedgerSnapshot) -> Result<(), LoadError> {
        std::fs::create_dir_all(&self.root)?;
        loader::write_members(BufWriter::new(File::create(self.path(MEMBERS_FILE))?), &snapshot.members)?;
        loader::write_deposits(BufWriter::new(File::create(self.path(DEPOSITS_FILE))?), &snapshot.deposits)?;
        loader::write_loans(BufWriter::new(File::create(self.path(LOANS_FILE))?), &snapshot.loans)?;
        save_settings(self.path(SETTINGS_FILE), &snapshot.settings)?;
        info!("Saved ledger to {}", self.root.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::LoanStatus;

    #[test]
    fn test_load_default_ledger() {
        let store = CsvStore::default();
        let snapshot = store.snapshot().expect("Failed to load sample ledger");

        assert_eq!(snapshot.members.len(), 4);
        assert!(!snapshot.deposits.is_empty());
        assert!(snapshot.loans.iter().any(|l| l.status == LoanStatus::Paid));

        let admin = snapshot.member(&MemberId::new("m1")).unwrap();
        assert!(admin.is_admin());
        assert_eq!(snapshot.settings.late_fee_rate, 0.15);
    }

    #[test]
    fn test_save_then_reload() {
        let source = CsvStore::default().snapshot().unwrap();

        let dir = std::env::temp_dir().join(format!("asca_ledger_store_{}", std::process::id()));
        let store = CsvStore::new(&dir);
        store.save(&source).unwrap();

        let reloaded = store.snapshot().unwrap();
        assert_eq!(reloaded.members.len(), source.members.len());
        assert_eq!(reloaded.deposits.len(), source.deposits.len());
        assert_eq!(reloaded.loans.len(), source.loans.len());
        assert_eq!(reloaded.settings, source.settings);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_duplicate_and_orphaned_records_are_rejected() {
        let source = CsvStore::default().snapshot().unwrap();

        let mut duplicated = source.clone();
        duplicated.deposits.push(source.deposits[0].clone());
        let err = duplicated.validate().unwrap_err();
        assert!(matches!(err, LoadError::Invalid { entity: "deposit", field: "id", .. }));

        let mut orphaned = source.clone();
        orphaned.loans[0].member_id = MemberId::new("ghost");
        let err = orphaned.validate().unwrap_err();
        assert!(matches!(err, LoadError::Invalid { entity: "loan", field: "member_id", .. }));

        // Loading goes through the same check
        let dir = std::env::temp_dir().join(format!("asca_ledger_orphans_{}", std::process::id()));
        let store = CsvStore::new(&dir);
        store.save(&duplicated).unwrap();
        assert!(store.snapshot().is_err());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_missing_settings_fall_back_to_defaults() {
        let dir = std::env::temp_dir().join(format!("asca_ledger_nosettings_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let store = CsvStore::new(&dir);
        assert_eq!(store.get_settings().unwrap(), SystemSettings::default());
        std::fs::remove_dir_all(&dir).ok();
    }
}
