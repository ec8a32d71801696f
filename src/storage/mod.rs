//! Storage layer with JSON file persistence
//!
//! Each entity lives in its own repository: an `RwLock<HashMap>` working
//! set plus secondary indexes, loaded from and saved to one JSON file via
//! atomic writes. The `Storage` coordinator owns all repositories and maps
//! their files onto a `LedgerPaths` layout.

pub mod donors;
pub mod file_io;
pub mod projects;
pub mod reimbursements;
pub mod transactions;

pub use donors::DonorRepository;
pub use projects::ProjectRepository;
pub use reimbursements::ReimbursementRepository;
pub use transactions::{ImportInsert, TransactionRepository};

use crate::config::LedgerPaths;
use crate::error::KassenwartError;

/// Map a poisoned-lock error onto the storage error variant
pub(crate) fn lock_poisoned<T>(_: std::sync::PoisonError<T>) -> KassenwartError {
    KassenwartError::Storage("Lock poisoned".to_string())
}

/// Coordinator owning every repository
pub struct Storage {
    pub transactions: TransactionRepository,
    pub projects: ProjectRepository,
    pub donors: DonorRepository,
    pub reimbursements: ReimbursementRepository,
}

impl Storage {
    /// Create storage rooted at the given layout
    pub fn new(paths: &LedgerPaths) -> Self {
        Self {
            transactions: TransactionRepository::new(paths.transactions_file()),
            projects: ProjectRepository::new(paths.projects_file()),
            donors: DonorRepository::new(paths.donors_file()),
            reimbursements: ReimbursementRepository::new(paths.reimbursements_file()),
        }
    }

    /// Create storage and load all data files
    pub fn open(paths: &LedgerPaths) -> Result<Self, KassenwartError> {
        paths.ensure_directories()?;
        let storage = Self::new(paths);
        storage.load_all()?;
        Ok(storage)
    }

    /// Load all repositories from disk
    pub fn load_all(&self) -> Result<(), KassenwartError> {
        self.transactions.load()?;
        self.projects.load()?;
        self.donors.load()?;
        self.reimbursements.load()?;
        Ok(())
    }

    /// Save all repositories to disk
    pub fn save_all(&self) -> Result<(), KassenwartError> {
        self.transactions.save()?;
        self.projects.save()?;
        self.donors.save()?;
        self.reimbursements.save()?;
        Ok(())
    }
}
