//! Budget aggregation over a ledger slice
//!
//! All four figures are computed over the same window (one organization,
//! an inclusive date range, optionally one project) and differ only in
//! their row filters:
//!
//! - allocated: Σ |amount| over expected rows assigned to a project
//! - spent:     Σ |amount| over processed rows assigned to a project
//! - received:  Σ amount over processed income rows assigned to a project
//! - available: planned income (expected, unmatched) + received income
//!              - spent expenses
//!
//! Allocated, spent, and received exclude project-less rows even when the
//! window is not narrowed to a project; available does not, since a debit
//! leaves the account whether or not it has been assigned yet.
//!
//! The unmatched filter in `available` is what prevents double counting:
//! once an expected income row is reconciled against a processed one, the
//! processed row alone carries the value.

use crate::error::KassenwartResult;
use crate::models::{Money, OrganizationId, ProjectId, Transaction, TransactionStatus};
use crate::storage::TransactionRepository;

/// Σ |amount| over expected rows assigned to a project
pub fn allocated_budget(transactions: &[Transaction]) -> Money {
    transactions
        .iter()
        .filter(|t| t.status == TransactionStatus::Expected && t.has_project())
        .map(|t| t.amount.abs())
        .sum()
}

/// Σ |amount| over processed rows assigned to a project
///
/// No sign filter: the figure tracks realized money movement on the
/// project, so a project-assigned credit contributes its magnitude too.
/// An unassigned processed row contributes to no project's spend.
pub fn spent_budget(transactions: &[Transaction]) -> Money {
    transactions
        .iter()
        .filter(|t| t.status == TransactionStatus::Processed && t.has_project())
        .map(|t| t.amount.abs())
        .sum()
}

/// Σ amount over processed income rows assigned to a project
pub fn received_budget(transactions: &[Transaction]) -> Money {
    transactions
        .iter()
        .filter(|t| t.status == TransactionStatus::Processed && t.is_income() && t.has_project())
        .map(|t| t.amount)
        .sum()
}

/// Planned income plus received income minus spent expenses
///
/// Single pass; every row contributes to at most one of the three parts.
pub fn available_budget(transactions: &[Transaction]) -> Money {
    let mut planned_income = Money::zero();
    let mut received_income = Money::zero();
    let mut spent_expense = Money::zero();

    for t in transactions {
        match t.status {
            TransactionStatus::Expected => {
                if t.is_income() && !t.is_matched() {
                    planned_income += t.amount;
                }
            }
            TransactionStatus::Processed => {
                if t.is_income() {
                    received_income += t.amount;
                } else if t.is_expense() {
                    spent_expense += t.amount.abs();
                }
            }
        }
    }

    planned_income + received_income - spent_expense
}

/// All four figures over one window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BudgetSummary {
    pub allocated: Money,
    pub available: Money,
    pub spent: Money,
    pub received: Money,
}

impl BudgetSummary {
    /// Compute all four figures over a ledger slice
    pub fn over(transactions: &[Transaction]) -> Self {
        Self {
            allocated: allocated_budget(transactions),
            available: available_budget(transactions),
            spent: spent_budget(transactions),
            received: received_budget(transactions),
        }
    }
}

/// Budget aggregation against the transaction store
pub struct BudgetService<'a> {
    transactions: &'a TransactionRepository,
}

impl<'a> BudgetService<'a> {
    pub fn new(transactions: &'a TransactionRepository) -> Self {
        Self { transactions }
    }

    /// All four figures over an organization window
    pub fn summary(
        &self,
        organization_id: OrganizationId,
        start_date: i64,
        end_date: i64,
        project_id: Option<&ProjectId>,
    ) -> KassenwartResult<BudgetSummary> {
        let slice = self
            .transactions
            .query(organization_id, start_date, end_date, project_id)?;
        Ok(BudgetSummary::over(&slice))
    }

    pub fn allocated(
        &self,
        organization_id: OrganizationId,
        start_date: i64,
        end_date: i64,
        project_id: Option<&ProjectId>,
    ) -> KassenwartResult<Money> {
        let slice = self
            .transactions
            .query(organization_id, start_date, end_date, project_id)?;
        Ok(allocated_budget(&slice))
    }

    pub fn available(
        &self,
        organization_id: OrganizationId,
        start_date: i64,
        end_date: i64,
        project_id: Option<&ProjectId>,
    ) -> KassenwartResult<Money> {
        let slice = self
            .transactions
            .query(organization_id, start_date, end_date, project_id)?;
        Ok(available_budget(&slice))
    }

    pub fn spent(
        &self,
        organization_id: OrganizationId,
        start_date: i64,
        end_date: i64,
        project_id: Option<&ProjectId>,
    ) -> KassenwartResult<Money> {
        let slice = self
            .transactions
            .query(organization_id, start_date, end_date, project_id)?;
        Ok(spent_budget(&slice))
    }

    pub fn received(
        &self,
        organization_id: OrganizationId,
        start_date: i64,
        end_date: i64,
        project_id: Option<&ProjectId>,
    ) -> KassenwartResult<Money> {
        let slice = self
            .transactions
            .query(organization_id, start_date, end_date, project_id)?;
        Ok(received_budget(&slice))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CategoryId, ImportRef, ImportSource};

    fn org() -> OrganizationId {
        OrganizationId::new()
    }

    fn expected(project: ProjectId, cents: i64) -> Transaction {
        Transaction::expected(
            org(),
            project,
            CategoryId::new("raummiete"),
            100,
            Money::from_cents(cents),
        )
    }

    fn processed(cents: i64) -> Transaction {
        Transaction::imported(
            org(),
            100,
            Money::from_cents(cents),
            ImportRef {
                imported_transaction_id: format!("row-{}", cents),
                source: ImportSource::Sparkasse,
            },
        )
    }

    fn processed_assigned(project: ProjectId, cents: i64) -> Transaction {
        let mut txn = processed(cents);
        txn.project_id = Some(project);
        txn
    }

    #[test]
    fn test_allocated_sums_magnitudes_of_expected() {
        let project = ProjectId::new();
        let rows = vec![
            expected(project, -30_000), // planned expense
            expected(project, 50_000),  // planned income
            processed(-10_000),         // processed rows never count
        ];
        assert_eq!(allocated_budget(&rows).cents(), 80_000);
    }

    #[test]
    fn test_allocated_ignores_unassigned_expected() {
        let project = ProjectId::new();
        let mut unassigned = expected(project, -30_000);
        unassigned.project_id = None;

        let rows = vec![unassigned, expected(project, 50_000)];
        assert_eq!(allocated_budget(&rows).cents(), 50_000);
    }

    #[test]
    fn test_spent_sums_all_processed_magnitudes() {
        let project = ProjectId::new();
        let rows = vec![
            processed_assigned(project, -10_000),
            processed_assigned(project, -2_500),
            // A project-assigned credit contributes its magnitude too
            processed_assigned(project, 40_000),
        ];
        assert_eq!(spent_budget(&rows).cents(), 52_500);
        // Received counts only the credits
        assert_eq!(received_budget(&rows).cents(), 40_000);
    }

    #[test]
    fn test_unassigned_processed_counts_nowhere_but_available() {
        let rows = vec![processed(-10_000), processed(5_000)];
        // No project: spent and received see nothing
        assert_eq!(spent_budget(&rows).cents(), 0);
        assert_eq!(received_budget(&rows).cents(), 0);
        // The money still moved through the account
        assert_eq!(available_budget(&rows).cents(), -5_000);
    }

    #[test]
    fn test_available_counts_planned_income_once() {
        let project = ProjectId::new();

        // 500 € expected income, 200 € already spent
        let planned = expected(project, 50_000);
        let rows = vec![planned.clone(), processed(-20_000)];
        assert_eq!(available_budget(&rows).cents(), 30_000);

        // The income arrives: the expected row is matched against the
        // processed one. Available must not change.
        let realized = processed(50_000);
        let mut matched = planned;
        matched.matched_transaction_id = Some(realized.id);
        let rows = vec![matched, realized, processed(-20_000)];
        assert_eq!(available_budget(&rows).cents(), 30_000);
    }

    #[test]
    fn test_available_ignores_expected_expenses() {
        let project = ProjectId::new();
        // A planned expense reduces nothing until it is processed
        let rows = vec![expected(project, -99_900), processed(10_000)];
        assert_eq!(available_budget(&rows).cents(), 10_000);
    }

    #[test]
    fn test_matched_expected_expense_never_counted_anyway() {
        let project = ProjectId::new();
        let realized = processed(-20_000);
        let mut planned = expected(project, -20_000);
        planned.matched_transaction_id = Some(realized.id);

        let rows = vec![planned, realized];
        // Only the processed expense counts
        assert_eq!(available_budget(&rows).cents(), -20_000);
    }

    #[test]
    fn test_empty_slice_is_all_zero() {
        let summary = BudgetSummary::over(&[]);
        assert_eq!(summary, BudgetSummary::default());
    }

    #[test]
    fn test_summary_over_mixed_slice() {
        let project = ProjectId::new();
        let rows = vec![
            expected(project, 50_000),
            expected(project, -30_000),
            processed_assigned(project, 40_000),
            processed_assigned(project, -10_000),
        ];
        let summary = BudgetSummary::over(&rows);
        assert_eq!(summary.allocated.cents(), 80_000);
        // |400 credit| + |-100 debit|
        assert_eq!(summary.spent.cents(), 50_000);
        assert_eq!(summary.received.cents(), 40_000);
        // 500 planned + 400 received - 100 spent expenses
        assert_eq!(summary.available.cents(), 80_000);
    }

    #[test]
    fn test_service_scopes_by_window() {
        use tempfile::TempDir;

        let temp_dir = TempDir::new().unwrap();
        let repo = TransactionRepository::new(temp_dir.path().join("transactions.json"));
        repo.load().unwrap();

        let org = OrganizationId::new();
        let project = ProjectId::new();

        let mut inside = Transaction::expected(
            org,
            project,
            CategoryId::new("ticketverkauf"),
            150,
            Money::from_cents(50_000),
        );
        inside.date = 150;
        repo.upsert(inside).unwrap();

        let mut outside = Transaction::expected(
            org,
            project,
            CategoryId::new("ticketverkauf"),
            999,
            Money::from_cents(70_000),
        );
        outside.date = 999;
        repo.upsert(outside).unwrap();

        let service = BudgetService::new(&repo);
        let summary = service.summary(org, 100, 200, Some(&project)).unwrap();
        assert_eq!(summary.allocated.cents(), 50_000);
        assert_eq!(summary.available.cents(), 50_000);
    }
}
