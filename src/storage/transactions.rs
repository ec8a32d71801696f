//! Transaction repository
//!
//! In-memory ledger state with JSON persistence and two secondary indexes:
//! by organization (every read is tenant-scoped) and by import reference
//! (the deduplication key). The import insert is a single atomic
//! check-then-insert under the write locks, so two racing imports of
//! overlapping statements cannot both insert the same line.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::KassenwartError;
use crate::models::{ImportSource, OrganizationId, ProjectId, Transaction, TransactionId};

use super::file_io::{read_json, write_json_atomic};
use super::lock_poisoned;

/// Serializable transaction data structure
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct TransactionFile {
    transactions: Vec<Transaction>,
}

/// Key of the per-organization import uniqueness index
type ImportKey = (OrganizationId, String, ImportSource);

/// Outcome of an import insert
#[derive(Debug)]
pub enum ImportInsert {
    /// The row was new and has been inserted
    Inserted(Transaction),
    /// A row with the same import reference already exists; nothing was
    /// inserted. This is a skip signal, not an error.
    Duplicate(TransactionId),
}

impl ImportInsert {
    /// Whether this outcome inserted a row
    pub fn was_inserted(&self) -> bool {
        matches!(self, ImportInsert::Inserted(_))
    }
}

/// Repository for ledger transactions
pub struct TransactionRepository {
    path: PathBuf,
    data: RwLock<HashMap<TransactionId, Transaction>>,
    /// Index: organization -> transaction ids
    by_organization: RwLock<HashMap<OrganizationId, Vec<TransactionId>>>,
    /// Unique index enforcing at-most-once import per statement line
    by_import: RwLock<HashMap<ImportKey, TransactionId>>,
}

impl TransactionRepository {
    /// Create a new transaction repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
            by_organization: RwLock::new(HashMap::new()),
            by_import: RwLock::new(HashMap::new()),
        }
    }

    /// Load transactions from disk and rebuild indexes
    pub fn load(&self) -> Result<(), KassenwartError> {
        let file: TransactionFile = read_json(&self.path)?;

        let mut data = self.data.write().map_err(lock_poisoned)?;
        let mut by_organization = self.by_organization.write().map_err(lock_poisoned)?;
        let mut by_import = self.by_import.write().map_err(lock_poisoned)?;

        data.clear();
        by_organization.clear();
        by_import.clear();

        for txn in file.transactions {
            by_organization
                .entry(txn.organization_id)
                .or_default()
                .push(txn.id);
            if let Some(import_ref) = &txn.import_ref {
                by_import.insert(
                    (
                        txn.organization_id,
                        import_ref.imported_transaction_id.clone(),
                        import_ref.source,
                    ),
                    txn.id,
                );
            }
            data.insert(txn.id, txn);
        }

        Ok(())
    }

    /// Save transactions to disk
    pub fn save(&self) -> Result<(), KassenwartError> {
        let data = self.data.read().map_err(lock_poisoned)?;

        let mut transactions: Vec<_> = data.values().cloned().collect();
        transactions.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.date.cmp(&b.date)));

        write_json_atomic(&self.path, &TransactionFile { transactions })
    }

    /// Get a transaction by ID
    pub fn get(&self, id: TransactionId) -> Result<Option<Transaction>, KassenwartError> {
        let data = self.data.read().map_err(lock_poisoned)?;
        Ok(data.get(&id).cloned())
    }

    /// Get all transactions of one organization, in ledger (creation) order
    pub fn get_by_organization(
        &self,
        organization_id: OrganizationId,
    ) -> Result<Vec<Transaction>, KassenwartError> {
        let data = self.data.read().map_err(lock_poisoned)?;
        let by_organization = self.by_organization.read().map_err(lock_poisoned)?;

        let ids = by_organization
            .get(&organization_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[]);
        Ok(ids.iter().filter_map(|id| data.get(id).cloned()).collect())
    }

    /// Query one organization's slice: inclusive date range, optionally
    /// narrowed to a project
    pub fn query(
        &self,
        organization_id: OrganizationId,
        start_date: i64,
        end_date: i64,
        project_id: Option<&ProjectId>,
    ) -> Result<Vec<Transaction>, KassenwartError> {
        let mut transactions = self.get_by_organization(organization_id)?;
        transactions.retain(|t| t.in_range(start_date, end_date));
        if let Some(project_id) = project_id {
            transactions.retain(|t| t.project_id.as_ref() == Some(project_id));
        }
        Ok(transactions)
    }

    /// Look up a transaction by its import reference
    pub fn find_by_import_ref(
        &self,
        organization_id: OrganizationId,
        imported_transaction_id: &str,
        source: ImportSource,
    ) -> Result<Option<Transaction>, KassenwartError> {
        let data = self.data.read().map_err(lock_poisoned)?;
        let by_import = self.by_import.read().map_err(lock_poisoned)?;

        let key = (
            organization_id,
            imported_transaction_id.to_string(),
            source,
        );
        Ok(by_import.get(&key).and_then(|id| data.get(id).cloned()))
    }

    /// Atomically insert an imported transaction unless its import
    /// reference already exists for the organization
    ///
    /// The check and the insert happen under the same write locks; this is
    /// the conditional insert the dedup invariant requires.
    pub fn insert_imported(&self, txn: Transaction) -> Result<ImportInsert, KassenwartError> {
        let import_ref = txn.import_ref.clone().ok_or_else(|| {
            KassenwartError::Validation("Imported transaction must carry an import reference".into())
        })?;

        let mut data = self.data.write().map_err(lock_poisoned)?;
        let mut by_organization = self.by_organization.write().map_err(lock_poisoned)?;
        let mut by_import = self.by_import.write().map_err(lock_poisoned)?;

        let key = (
            txn.organization_id,
            import_ref.imported_transaction_id,
            import_ref.source,
        );
        if let Some(existing) = by_import.get(&key) {
            return Ok(ImportInsert::Duplicate(*existing));
        }

        by_import.insert(key, txn.id);
        by_organization
            .entry(txn.organization_id)
            .or_default()
            .push(txn.id);
        data.insert(txn.id, txn.clone());

        Ok(ImportInsert::Inserted(txn))
    }

    /// Insert or update a transaction
    pub fn upsert(&self, txn: Transaction) -> Result<(), KassenwartError> {
        let mut data = self.data.write().map_err(lock_poisoned)?;
        let mut by_organization = self.by_organization.write().map_err(lock_poisoned)?;
        let mut by_import = self.by_import.write().map_err(lock_poisoned)?;

        // Remove from old indexes if updating
        if let Some(old) = data.get(&txn.id) {
            if let Some(ids) = by_organization.get_mut(&old.organization_id) {
                ids.retain(|&id| id != txn.id);
            }
            if let Some(import_ref) = &old.import_ref {
                by_import.remove(&(
                    old.organization_id,
                    import_ref.imported_transaction_id.clone(),
                    import_ref.source,
                ));
            }
        }

        by_organization
            .entry(txn.organization_id)
            .or_default()
            .push(txn.id);
        if let Some(import_ref) = &txn.import_ref {
            by_import.insert(
                (
                    txn.organization_id,
                    import_ref.imported_transaction_id.clone(),
                    import_ref.source,
                ),
                txn.id,
            );
        }
        data.insert(txn.id, txn);
        Ok(())
    }

    /// Delete a transaction
    pub fn delete(&self, id: TransactionId) -> Result<bool, KassenwartError> {
        let mut data = self.data.write().map_err(lock_poisoned)?;
        let mut by_organization = self.by_organization.write().map_err(lock_poisoned)?;
        let mut by_import = self.by_import.write().map_err(lock_poisoned)?;

        if let Some(txn) = data.remove(&id) {
            if let Some(ids) = by_organization.get_mut(&txn.organization_id) {
                ids.retain(|&tid| tid != id);
            }
            if let Some(import_ref) = &txn.import_ref {
                by_import.remove(&(
                    txn.organization_id,
                    import_ref.imported_transaction_id.clone(),
                    import_ref.source,
                ));
            }
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Count transactions across all organizations
    pub fn count(&self) -> Result<usize, KassenwartError> {
        let data = self.data.read().map_err(lock_poisoned)?;
        Ok(data.len())
    }
}
