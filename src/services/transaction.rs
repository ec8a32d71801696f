//! Ledger transaction lifecycle
//!
//! Creation, partial update, and deletion of ledger rows, enforcing the
//! state machine: expected rows are freely editable and deletable,
//! processed rows are locked history, and the only status transition is
//! expected -> processed.

use tracing::info;

use crate::catalog::CategoryCatalog;
use crate::error::{KassenwartError, KassenwartResult};
use crate::import::TransactionData;
use crate::models::{
    CategoryId, DonorId, ImportRef, ImportSource, Money, OrganizationId, Patch, ProjectId,
    Transaction, TransactionId, TransactionStatus,
};
use crate::storage::{ImportInsert, Storage};

use super::validation::TaxSphereValidator;

/// Input for a new expected (planned) transaction
#[derive(Debug, Clone)]
pub struct NewExpected {
    pub project_id: ProjectId,
    pub category_id: CategoryId,
    pub donor_id: Option<DonorId>,
    /// Epoch milliseconds
    pub date: i64,
    pub amount: Money,
    pub description: String,
    pub counterparty: String,
}

/// Partial update of a transaction
///
/// `Option` fields are plain "absent means unchanged" scalars; optional
/// references use `Patch` so clearing a link is distinct from leaving it.
#[derive(Debug, Clone, Default)]
pub struct TransactionUpdate {
    pub date: Option<i64>,
    /// New magnitude; the row's original sign always wins
    pub amount: Option<Money>,
    pub description: Option<String>,
    pub counterparty: Option<String>,
    pub project_id: Patch<ProjectId>,
    pub category_id: Patch<CategoryId>,
    pub donor_id: Patch<DonorId>,
    pub matched_transaction_id: Patch<TransactionId>,
    pub status: Option<TransactionStatus>,
}

/// Transaction lifecycle operations against the store
pub struct LedgerService<'a> {
    storage: &'a Storage,
    catalog: &'a dyn CategoryCatalog,
}

impl<'a> LedgerService<'a> {
    pub fn new(storage: &'a Storage, catalog: &'a dyn CategoryCatalog) -> Self {
        Self { storage, catalog }
    }

    fn validator(&self) -> TaxSphereValidator<'_> {
        TaxSphereValidator::new(&self.storage.donors, self.catalog)
    }

    /// Fetch a transaction, enforcing organization scoping
    pub fn get(
        &self,
        organization_id: OrganizationId,
        id: TransactionId,
    ) -> KassenwartResult<Transaction> {
        let txn = self
            .storage
            .transactions
            .get(id)?
            .ok_or_else(|| KassenwartError::transaction_not_found(id.to_string()))?;
        if txn.organization_id != organization_id {
            return Err(KassenwartError::AccessDenied {
                entity_type: "Transaction",
                identifier: id.to_string(),
            });
        }
        Ok(txn)
    }

    /// List an organization's transactions, optionally narrowed by date
    /// range and project
    pub fn list(
        &self,
        organization_id: OrganizationId,
        start_date: i64,
        end_date: i64,
        project_id: Option<&ProjectId>,
    ) -> KassenwartResult<Vec<Transaction>> {
        self.storage
            .transactions
            .query(organization_id, start_date, end_date, project_id)
    }

    /// Look up a transaction by its import reference
    pub fn find_by_import_ref(
        &self,
        organization_id: OrganizationId,
        imported_transaction_id: &str,
        source: ImportSource,
    ) -> KassenwartResult<Option<Transaction>> {
        self.storage
            .transactions
            .find_by_import_ref(organization_id, imported_transaction_id, source)
    }

    /// Create a planned transaction
    pub fn create_expected(
        &self,
        organization_id: OrganizationId,
        input: NewExpected,
    ) -> KassenwartResult<Transaction> {
        let project = self
            .storage
            .projects
            .get(input.project_id)?
            .ok_or_else(|| KassenwartError::project_not_found(input.project_id.to_string()))?;
        if project.organization_id != organization_id {
            return Err(KassenwartError::AccessDenied {
                entity_type: "Project",
                identifier: input.project_id.to_string(),
            });
        }

        if self.catalog.resolve(&input.category_id).is_none() {
            return Err(KassenwartError::category_not_found(
                input.category_id.to_string(),
            ));
        }

        self.validator().check(
            organization_id,
            input.donor_id.as_ref(),
            Some(&input.category_id),
        )?;

        let mut txn = Transaction::expected(
            organization_id,
            input.project_id,
            input.category_id,
            input.date,
            input.amount,
        )
        .with_text(input.description, input.counterparty);
        txn.donor_id = input.donor_id;
        txn.validate().map_err(KassenwartError::Validation)?;

        self.storage.transactions.upsert(txn.clone())?;
        info!(transaction = %txn.id, "created expected transaction");
        Ok(txn)
    }

    /// Create a processed transaction from a mapped statement row
    ///
    /// Idempotent: re-importing the same statement line yields a
    /// `Duplicate` signal and inserts nothing.
    pub fn create_imported(
        &self,
        organization_id: OrganizationId,
        data: &TransactionData,
        source: ImportSource,
    ) -> KassenwartResult<ImportInsert> {
        let mut txn = Transaction::imported(
            organization_id,
            data.date,
            data.amount,
            ImportRef {
                imported_transaction_id: data.imported_transaction_id.clone(),
                source,
            },
        )
        .with_text(data.description.clone(), data.counterparty.clone());
        txn.account_name = data.account_name.clone();

        self.storage.transactions.insert_imported(txn)
    }

    /// Apply a partial update
    pub fn update(
        &self,
        organization_id: OrganizationId,
        id: TransactionId,
        update: TransactionUpdate,
    ) -> KassenwartResult<Transaction> {
        let mut txn = self.get(organization_id, id)?;

        if let Some(status) = update.status {
            if status != txn.status {
                if txn.status == TransactionStatus::Processed {
                    return Err(KassenwartError::Locked(format!(
                        "Transaction {} is processed and cannot go back to expected",
                        id
                    )));
                }
                txn.status = status;
            }
        }

        if let Some(date) = update.date {
            txn.date = date;
        }
        if let Some(amount) = update.amount {
            // Edits supply a magnitude; the original sign wins
            txn.amount = amount.resign_to(txn.amount);
        }
        if let Some(description) = update.description {
            txn.description = description;
        }
        if let Some(counterparty) = update.counterparty {
            txn.counterparty = counterparty;
        }

        if let Some(project_id) = update.project_id.as_set() {
            let project = self
                .storage
                .projects
                .get(*project_id)?
                .ok_or_else(|| KassenwartError::project_not_found(project_id.to_string()))?;
            if project.organization_id != organization_id {
                return Err(KassenwartError::AccessDenied {
                    entity_type: "Project",
                    identifier: project_id.to_string(),
                });
            }
        }
        update.project_id.apply_to(&mut txn.project_id);

        if let Some(category_id) = update.category_id.as_set() {
            if self.catalog.resolve(category_id).is_none() {
                return Err(KassenwartError::category_not_found(category_id.to_string()));
            }
        }
        update.category_id.apply_to(&mut txn.category_id);
        update.donor_id.apply_to(&mut txn.donor_id);

        if let Some(target_id) = update.matched_transaction_id.as_set() {
            let target = self.get(organization_id, *target_id)?;
            if target.status != TransactionStatus::Processed {
                return Err(KassenwartError::Validation(format!(
                    "Transaction {} cannot be matched against {}: the target is not processed",
                    id, target_id
                )));
            }
        }
        update
            .matched_transaction_id
            .apply_to(&mut txn.matched_transaction_id);

        // Re-validate the pairing with the post-update links
        self.validator().check(
            organization_id,
            txn.donor_id.as_ref(),
            txn.category_id.as_ref(),
        )?;

        txn.validate().map_err(KassenwartError::Validation)?;
        txn.touch();
        self.storage.transactions.upsert(txn.clone())?;
        Ok(txn)
    }

    /// Delete a transaction
    ///
    /// Only expected rows may be deleted; processed rows are history.
    pub fn delete(
        &self,
        organization_id: OrganizationId,
        id: TransactionId,
    ) -> KassenwartResult<()> {
        let txn = self.get(organization_id, id)?;
        if txn.status == TransactionStatus::Processed {
            return Err(KassenwartError::Locked(format!(
                "Transaction {} is processed and cannot be deleted",
                id
            )));
        }
        self.storage.transactions.delete(id)?;
        info!(transaction = %id, "deleted expected transaction");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::StaticCatalog;
    use crate::config::LedgerPaths;
    use crate::models::{Donor, Project, TaxSphere};
    use tempfile::TempDir;

    struct Fixture {
        _temp_dir: TempDir,
        storage: Storage,
        catalog: StaticCatalog,
        org: OrganizationId,
        project: ProjectId,
    }

    fn fixture() -> Fixture {
        let temp_dir = TempDir::new().unwrap();
        let paths = LedgerPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::open(&paths).unwrap();

        let org = OrganizationId::new();
        let project = Project::new(org, "Sommerfest");
        let project_id = project.id;
        storage.projects.upsert(project).unwrap();

        Fixture {
            _temp_dir: temp_dir,
            storage,
            catalog: StaticCatalog::standard(),
            org,
            project: project_id,
        }
    }

    fn new_expected(f: &Fixture, cents: i64) -> NewExpected {
        NewExpected {
            project_id: f.project,
            category_id: CategoryId::new("raummiete"),
            donor_id: None,
            date: 1_709_251_200_000,
            amount: Money::from_cents(cents),
            description: "Saalmiete".into(),
            counterparty: "Bürgerhaus".into(),
        }
    }

    #[test]
    fn test_create_expected() {
        let f = fixture();
        let service = LedgerService::new(&f.storage, &f.catalog);

        let txn = service.create_expected(f.org, new_expected(&f, -50_000)).unwrap();
        assert_eq!(txn.status, TransactionStatus::Expected);
        assert_eq!(txn.description, "Saalmiete");
        assert!(service.get(f.org, txn.id).is_ok());
    }

    #[test]
    fn test_create_expected_rejects_foreign_project() {
        let f = fixture();
        let service = LedgerService::new(&f.storage, &f.catalog);

        let foreign = Project::new(OrganizationId::new(), "Fremd");
        let foreign_id = foreign.id;
        f.storage.projects.upsert(foreign).unwrap();

        let mut input = new_expected(&f, -100);
        input.project_id = foreign_id;
        let err = service.create_expected(f.org, input).unwrap_err();
        assert!(matches!(err, KassenwartError::AccessDenied { .. }));
    }

    #[test]
    fn test_create_expected_checks_donor_sphere() {
        let f = fixture();
        let service = LedgerService::new(&f.storage, &f.catalog);

        let donor = Donor::new(f.org, "Sponsor GmbH")
            .with_allowed_spheres([TaxSphere::CommercialOperations]);
        let donor_id = donor.id;
        f.storage.donors.upsert(donor).unwrap();

        // raummiete is non-profit
        let mut input = new_expected(&f, -100);
        input.donor_id = Some(donor_id);
        let err = service.create_expected(f.org, input).unwrap_err();
        assert!(matches!(err, KassenwartError::IncompatibleTaxSphere { .. }));

        // sponsoring is commercial-operations
        let mut input = new_expected(&f, 100);
        input.category_id = CategoryId::new("sponsoring");
        input.donor_id = Some(donor_id);
        assert!(service.create_expected(f.org, input).is_ok());
    }

    #[test]
    fn test_update_preserves_amount_sign() {
        let f = fixture();
        let service = LedgerService::new(&f.storage, &f.catalog);
        let txn = service.create_expected(f.org, new_expected(&f, -50_000)).unwrap();

        let updated = service
            .update(
                f.org,
                txn.id,
                TransactionUpdate {
                    amount: Some(Money::from_cents(75_000)),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.amount.cents(), -75_000);
    }

    #[test]
    fn test_update_patch_clears_and_sets_links() {
        let f = fixture();
        let service = LedgerService::new(&f.storage, &f.catalog);

        let donor = Donor::new(f.org, "Förderverein");
        let donor_id = donor.id;
        f.storage.donors.upsert(donor).unwrap();

        let txn = service.create_expected(f.org, new_expected(&f, -100)).unwrap();

        let updated = service
            .update(
                f.org,
                txn.id,
                TransactionUpdate {
                    donor_id: Patch::Set(donor_id),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.donor_id, Some(donor_id));

        // Unchanged leaves the donor alone
        let updated = service
            .update(
                f.org,
                txn.id,
                TransactionUpdate {
                    description: Some("Neue Beschreibung".into()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.donor_id, Some(donor_id));

        let updated = service
            .update(
                f.org,
                txn.id,
                TransactionUpdate {
                    donor_id: Patch::Clear,
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.donor_id, None);
    }

    #[test]
    fn test_status_transition_only_forward() {
        let f = fixture();
        let service = LedgerService::new(&f.storage, &f.catalog);
        let txn = service.create_expected(f.org, new_expected(&f, -100)).unwrap();

        let updated = service
            .update(
                f.org,
                txn.id,
                TransactionUpdate {
                    status: Some(TransactionStatus::Processed),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.status, TransactionStatus::Processed);

        let err = service
            .update(
                f.org,
                txn.id,
                TransactionUpdate {
                    status: Some(TransactionStatus::Expected),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, KassenwartError::Locked(_)));
    }

    #[test]
    fn test_match_requires_processed_target() {
        let f = fixture();
        let service = LedgerService::new(&f.storage, &f.catalog);

        let expected = service.create_expected(f.org, new_expected(&f, 50_000)).unwrap();
        let other_expected = service.create_expected(f.org, new_expected(&f, 50_000)).unwrap();

        let err = service
            .update(
                f.org,
                expected.id,
                TransactionUpdate {
                    matched_transaction_id: Patch::Set(other_expected.id),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(err.is_validation());

        let data = TransactionData {
            date: 1_709_251_200_000,
            amount: Money::from_cents(50_000),
            description: "Zuschuss".into(),
            counterparty: "Stadt".into(),
            account_name: String::new(),
            imported_transaction_id: "01-03-24-Zuschuss-sparkasse".into(),
        };
        let inserted = match service
            .create_imported(f.org, &data, ImportSource::Sparkasse)
            .unwrap()
        {
            ImportInsert::Inserted(t) => t,
            ImportInsert::Duplicate(_) => panic!("fresh import reported duplicate"),
        };

        let matched = service
            .update(
                f.org,
                expected.id,
                TransactionUpdate {
                    matched_transaction_id: Patch::Set(inserted.id),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(matched.matched_transaction_id, Some(inserted.id));
    }

    #[test]
    fn test_delete_only_expected() {
        let f = fixture();
        let service = LedgerService::new(&f.storage, &f.catalog);

        let txn = service.create_expected(f.org, new_expected(&f, -100)).unwrap();
        service.delete(f.org, txn.id).unwrap();
        assert!(service.get(f.org, txn.id).unwrap_err().is_not_found());

        let data = TransactionData {
            date: 0,
            amount: Money::from_cents(-100),
            description: String::new(),
            counterparty: String::new(),
            account_name: String::new(),
            imported_transaction_id: "x".into(),
        };
        let inserted = match service
            .create_imported(f.org, &data, ImportSource::Moss)
            .unwrap()
        {
            ImportInsert::Inserted(t) => t,
            ImportInsert::Duplicate(_) => panic!("fresh import reported duplicate"),
        };
        let err = service.delete(f.org, inserted.id).unwrap_err();
        assert!(matches!(err, KassenwartError::Locked(_)));
    }

    #[test]
    fn test_cross_org_access_denied() {
        let f = fixture();
        let service = LedgerService::new(&f.storage, &f.catalog);
        let txn = service.create_expected(f.org, new_expected(&f, -100)).unwrap();

        let other = OrganizationId::new();
        let err = service.get(other, txn.id).unwrap_err();
        assert!(matches!(err, KassenwartError::AccessDenied { .. }));
        assert!(service.delete(other, txn.id).is_err());
    }
}
