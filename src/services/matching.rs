//! Reconciling expected rows against processed bank rows
//!
//! After a statement import, open expected rows are offered as match
//! candidates: planned expenses against processed debits, planned income
//! against processed credits. Reconciling links the expected row to the
//! processed one; the expected row then stops counting toward the
//! available budget.

use crate::catalog::CategoryCatalog;
use crate::error::{KassenwartError, KassenwartResult};
use crate::models::{OrganizationId, Transaction, TransactionId, TransactionStatus};
use crate::storage::Storage;

/// How candidates for a processed row are selected
///
/// Expense matching and income assignment are distinct flows that happen
/// to share the candidate plumbing; they are kept as two strategies rather
/// than one parameterized filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStrategy {
    /// Processed debits against planned expenses already booked on a
    /// project
    ExpenseMatch,
    /// Processed credits against planned income; assignment is manual
    IncomeAssign,
}

impl MatchStrategy {
    fn qualifies(&self, txn: &Transaction) -> bool {
        match self {
            MatchStrategy::ExpenseMatch => txn.is_expense() && txn.has_project(),
            MatchStrategy::IncomeAssign => txn.is_income(),
        }
    }
}

/// An open expected row offered for reconciliation
#[derive(Debug, Clone)]
pub struct MatchCandidate {
    pub transaction: Transaction,
    /// Resolved project name for display; None if the project was deleted
    pub project_name: Option<String>,
}

/// A processed row that still needs a project assignment
#[derive(Debug, Clone)]
pub struct UnassignedRow {
    pub transaction: Transaction,
    /// Resolved category label, or None while unclassified
    pub category_label: Option<String>,
}

/// Reconciliation queries and the match operation
pub struct MatchingService<'a> {
    storage: &'a Storage,
    catalog: &'a dyn CategoryCatalog,
}

impl<'a> MatchingService<'a> {
    pub fn new(storage: &'a Storage, catalog: &'a dyn CategoryCatalog) -> Self {
        Self { storage, catalog }
    }

    /// Open expected rows qualifying under a strategy, in ledger order
    ///
    /// No similarity scoring; the caller decides how many candidates to
    /// show. Project names are joined in for display only.
    pub fn candidates(
        &self,
        organization_id: OrganizationId,
        strategy: MatchStrategy,
    ) -> KassenwartResult<Vec<MatchCandidate>> {
        let mut rows = self.storage.transactions.get_by_organization(organization_id)?;
        rows.retain(|t| {
            t.status == TransactionStatus::Expected && !t.is_matched() && strategy.qualifies(t)
        });

        rows.into_iter()
            .map(|transaction| {
                let project_name = match transaction.project_id {
                    Some(project_id) => {
                        self.storage.projects.get(project_id)?.map(|p| p.name)
                    }
                    None => None,
                };
                Ok(MatchCandidate {
                    transaction,
                    project_name,
                })
            })
            .collect()
    }

    /// Processed rows not yet assigned to any project
    ///
    /// Rows carrying a match link are excluded; a linked row is already
    /// accounted for through its expected counterpart.
    pub fn unassigned_processed(
        &self,
        organization_id: OrganizationId,
    ) -> KassenwartResult<Vec<UnassignedRow>> {
        let mut rows = self.storage.transactions.get_by_organization(organization_id)?;
        rows.retain(|t| {
            t.status == TransactionStatus::Processed && !t.has_project() && !t.is_matched()
        });

        Ok(rows
            .into_iter()
            .map(|transaction| {
                let category_label = transaction
                    .category_id
                    .as_ref()
                    .map(|id| self.catalog.label(id));
                UnassignedRow {
                    transaction,
                    category_label,
                }
            })
            .collect())
    }

    /// Link an open expected row to the processed row that realized it
    pub fn reconcile(
        &self,
        organization_id: OrganizationId,
        expected_id: TransactionId,
        processed_id: TransactionId,
    ) -> KassenwartResult<Transaction> {
        let mut expected = self.fetch(organization_id, expected_id)?;
        let processed = self.fetch(organization_id, processed_id)?;

        if expected.status != TransactionStatus::Expected {
            return Err(KassenwartError::Validation(format!(
                "Transaction {} is not an expected row",
                expected_id
            )));
        }
        if expected.is_matched() {
            return Err(KassenwartError::Validation(format!(
                "Transaction {} is already reconciled",
                expected_id
            )));
        }
        if processed.status != TransactionStatus::Processed {
            return Err(KassenwartError::Validation(format!(
                "Transaction {} is not a processed row",
                processed_id
            )));
        }

        expected.matched_transaction_id = Some(processed_id);
        expected.touch();
        self.storage.transactions.upsert(expected.clone())?;
        Ok(expected)
    }

    fn fetch(
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
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::StaticCatalog;
    use crate::config::LedgerPaths;
    use crate::models::{CategoryId, ImportRef, ImportSource, Money, Project, ProjectId};
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

    fn expected(f: &Fixture, cents: i64) -> Transaction {
        Transaction::expected(
            f.org,
            f.project,
            CategoryId::new("raummiete"),
            100,
            Money::from_cents(cents),
        )
    }

    fn processed(f: &Fixture, import_id: &str, cents: i64) -> Transaction {
        Transaction::imported(
            f.org,
            100,
            Money::from_cents(cents),
            ImportRef {
                imported_transaction_id: import_id.into(),
                source: ImportSource::Sparkasse,
            },
        )
    }

    #[test]
    fn test_expense_candidates_filtering() {
        let f = fixture();
        let service = MatchingService::new(&f.storage, &f.catalog);

        let open_expense = expected(&f, -50_000);
        let open_expense_id = open_expense.id;
        f.storage.transactions.upsert(open_expense).unwrap();

        // Income row does not qualify as an expense candidate
        f.storage.transactions.upsert(expected(&f, 10_000)).unwrap();

        // Already-matched expense does not qualify
        let mut matched = expected(&f, -7_000);
        matched.matched_transaction_id = Some(TransactionId::new());
        f.storage.transactions.upsert(matched).unwrap();

        // Expected row without a project does not qualify
        let mut no_project = expected(&f, -3_000);
        no_project.project_id = None;
        f.storage.transactions.upsert(no_project).unwrap();

        let candidates = service
            .candidates(f.org, MatchStrategy::ExpenseMatch)
            .unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].transaction.id, open_expense_id);
        assert_eq!(candidates[0].project_name.as_deref(), Some("Sommerfest"));
    }

    #[test]
    fn test_income_assign_candidates() {
        let f = fixture();
        let service = MatchingService::new(&f.storage, &f.catalog);

        f.storage.transactions.upsert(expected(&f, 10_000)).unwrap();
        f.storage.transactions.upsert(expected(&f, -5_000)).unwrap();

        let candidates = service
            .candidates(f.org, MatchStrategy::IncomeAssign)
            .unwrap();
        assert_eq!(candidates.len(), 1);
        assert!(candidates[0].transaction.is_income());
    }

    #[test]
    fn test_unassigned_processed_with_labels() {
        let f = fixture();
        let service = MatchingService::new(&f.storage, &f.catalog);

        let mut classified = processed(&f, "a", -1_000);
        classified.category_id = Some(CategoryId::new("raummiete"));
        f.storage.transactions.upsert(classified).unwrap();

        f.storage.transactions.upsert(processed(&f, "b", -2_000)).unwrap();

        let mut assigned = processed(&f, "c", -3_000);
        assigned.project_id = Some(f.project);
        f.storage.transactions.upsert(assigned).unwrap();

        // A row carrying a match link is not listed either
        let mut linked = processed(&f, "d", -4_000);
        linked.matched_transaction_id = Some(TransactionId::new());
        f.storage.transactions.upsert(linked).unwrap();

        let rows = service.unassigned_processed(f.org).unwrap();
        assert_eq!(rows.len(), 2);
        let labels: Vec<_> = rows.iter().map(|r| r.category_label.clone()).collect();
        assert!(labels.contains(&Some("Raummiete".to_string())));
        assert!(labels.contains(&None));
    }

    #[test]
    fn test_reconcile_links_and_closes() {
        let f = fixture();
        let service = MatchingService::new(&f.storage, &f.catalog);

        let planned = expected(&f, -50_000);
        let planned_id = planned.id;
        f.storage.transactions.upsert(planned).unwrap();

        let realized = processed(&f, "miete", -50_000);
        let realized_id = realized.id;
        f.storage.transactions.upsert(realized).unwrap();

        let linked = service.reconcile(f.org, planned_id, realized_id).unwrap();
        assert_eq!(linked.matched_transaction_id, Some(realized_id));

        // The closed row no longer appears as a candidate
        assert!(service
            .candidates(f.org, MatchStrategy::ExpenseMatch)
            .unwrap()
            .is_empty());

        // And cannot be reconciled twice
        let err = service.reconcile(f.org, planned_id, realized_id).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_reconcile_rejects_wrong_statuses() {
        let f = fixture();
        let service = MatchingService::new(&f.storage, &f.catalog);

        let planned_a = expected(&f, -100);
        let planned_a_id = planned_a.id;
        f.storage.transactions.upsert(planned_a).unwrap();
        let planned_b = expected(&f, -100);
        let planned_b_id = planned_b.id;
        f.storage.transactions.upsert(planned_b).unwrap();

        // Expected against expected
        assert!(service.reconcile(f.org, planned_a_id, planned_b_id).is_err());

        // Processed as the left-hand side
        let realized = processed(&f, "x", -100);
        let realized_id = realized.id;
        f.storage.transactions.upsert(realized).unwrap();
        assert!(service.reconcile(f.org, realized_id, realized_id).is_err());
    }
}
