//! Path management for the JSON storage layer
//!
//! The engine never picks OS directories itself; the embedding application
//! supplies a base directory and everything lives underneath it.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{KassenwartError, KassenwartResult};

/// Filesystem layout of the ledger store
#[derive(Debug, Clone)]
pub struct LedgerPaths {
    base_dir: PathBuf,
}

impl LedgerPaths {
    /// Create a layout rooted at an explicit base directory
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// The base directory
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Directory holding the data files
    pub fn data_dir(&self) -> PathBuf {
        self.base_dir.join("data")
    }

    /// Transactions data file
    pub fn transactions_file(&self) -> PathBuf {
        self.data_dir().join("transactions.json")
    }

    /// Projects data file
    pub fn projects_file(&self) -> PathBuf {
        self.data_dir().join("projects.json")
    }

    /// Donors data file
    pub fn donors_file(&self) -> PathBuf {
        self.data_dir().join("donors.json")
    }

    /// Reimbursements data file
    pub fn reimbursements_file(&self) -> PathBuf {
        self.data_dir().join("reimbursements.json")
    }

    /// Ensure the directory structure exists
    pub fn ensure_directories(&self) -> KassenwartResult<()> {
        fs::create_dir_all(self.data_dir()).map_err(|e| {
            KassenwartError::Storage(format!(
                "Failed to create data directory {}: {}",
                self.data_dir().display(),
                e
            ))
        })
    }
}
