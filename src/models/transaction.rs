//! Transaction model — the single ledger entity
//!
//! Every row is either an expected (planned) or a processed (realized)
//! transaction. Imported rows carry an import reference used for
//! deduplication; reconciled expected rows carry a back-reference to the
//! processed row that realized them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::category::CategoryId;
use super::ids::{DonorId, OrganizationId, ProjectId, TransactionId};
use super::money::Money;

/// Status of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    /// Planned, not yet realized in a bank statement
    #[default]
    Expected,
    /// Realized, from a bank import or an internal event
    Processed,
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Expected => write!(f, "expected"),
            Self::Processed => write!(f, "processed"),
        }
    }
}

/// The bank export format a row was imported from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportSource {
    Sparkasse,
    Volksbank,
    Moss,
}

impl ImportSource {
    /// The wire string for this source
    pub const fn as_str(&self) -> &'static str {
        match self {
            ImportSource::Sparkasse => "sparkasse",
            ImportSource::Volksbank => "volksbank",
            ImportSource::Moss => "moss",
        }
    }
}

impl fmt::Display for ImportSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Deduplication reference present only on imported rows
///
/// The pair is unique per organization: re-importing the same statement
/// line never inserts a second row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImportRef {
    /// Deterministic id derived from the statement line
    pub imported_transaction_id: String,
    /// Which bank export the row came from
    pub source: ImportSource,
}

/// A ledger transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique identifier, immutable once created
    pub id: TransactionId,

    /// Tenant partition key; aggregations never cross organizations
    pub organization_id: OrganizationId,

    /// Optional link to a budget project; None means unassigned
    pub project_id: Option<ProjectId>,

    /// Optional classification links
    pub category_id: Option<CategoryId>,
    pub donor_id: Option<DonorId>,

    /// Epoch-millisecond timestamp (statement date for imports, expected
    /// date for planned rows)
    pub date: i64,

    /// Signed amount; negative = expense, positive = income
    pub amount: Money,

    /// Planned or realized
    pub status: TransactionStatus,

    /// Set when an expected row has been reconciled against a processed
    /// one; presence means closed, absence means open
    pub matched_transaction_id: Option<TransactionId>,

    /// Present only on imported rows; used for deduplication
    pub import_ref: Option<ImportRef>,

    /// Free-text metadata, not used in calculations
    #[serde(default)]
    pub counterparty: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub account_name: String,

    /// When the transaction was created
    pub created_at: DateTime<Utc>,

    /// When the transaction was last modified
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    /// Create a planned (expected) transaction
    pub fn expected(
        organization_id: OrganizationId,
        project_id: ProjectId,
        category_id: CategoryId,
        date: i64,
        amount: Money,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: TransactionId::new(),
            organization_id,
            project_id: Some(project_id),
            category_id: Some(category_id),
            donor_id: None,
            date,
            amount,
            status: TransactionStatus::Expected,
            matched_transaction_id: None,
            import_ref: None,
            counterparty: String::new(),
            description: String::new(),
            account_name: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Create a processed transaction from an imported statement row
    ///
    /// Project, category, and donor are unassigned at import time; they
    /// are filled in later during the import-assignment workflow.
    pub fn imported(
        organization_id: OrganizationId,
        date: i64,
        amount: Money,
        import_ref: ImportRef,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: TransactionId::new(),
            organization_id,
            project_id: None,
            category_id: None,
            donor_id: None,
            date,
            amount,
            status: TransactionStatus::Processed,
            matched_transaction_id: None,
            import_ref: Some(import_ref),
            counterparty: String::new(),
            description: String::new(),
            account_name: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Create a processed transaction booked by an internal event (a
    /// reimbursement payout), not a bank import
    pub fn booked(
        organization_id: OrganizationId,
        project_id: ProjectId,
        date: i64,
        amount: Money,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: TransactionId::new(),
            organization_id,
            project_id: Some(project_id),
            category_id: None,
            donor_id: None,
            date,
            amount,
            status: TransactionStatus::Processed,
            matched_transaction_id: None,
            import_ref: None,
            counterparty: String::new(),
            description: String::new(),
            account_name: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Check if this is an income row (positive amount)
    pub fn is_income(&self) -> bool {
        self.amount.is_positive()
    }

    /// Check if this is an expense row (negative amount)
    pub fn is_expense(&self) -> bool {
        self.amount.is_negative()
    }

    /// An expected row is open until it carries a matched-transaction link
    pub fn is_matched(&self) -> bool {
        self.matched_transaction_id.is_some()
    }

    /// Whether the row is assigned to a budget project
    pub fn has_project(&self) -> bool {
        self.project_id.is_some()
    }

    /// Whether the date falls inside an inclusive epoch-ms range
    pub fn in_range(&self, start: i64, end: i64) -> bool {
        self.date >= start && self.date <= end
    }

    /// Attach free-text metadata
    pub fn with_text(
        mut self,
        description: impl Into<String>,
        counterparty: impl Into<String>,
    ) -> Self {
        self.description = description.into();
        self.counterparty = counterparty.into();
        self
    }

    /// Mark the row as touched now
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Validate invariants that hold independent of the store
    pub fn validate(&self) -> Result<(), String> {
        if self.status == TransactionStatus::Expected && self.import_ref.is_some() {
            return Err("An expected transaction cannot carry an import reference".into());
        }
        Ok(())
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] {} {}",
            self.id, self.status, self.description, self.amount
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn org() -> OrganizationId {
        OrganizationId::new()
    }

    #[test]
    fn test_expected_transaction() {
        let txn = Transaction::expected(
            org(),
            ProjectId::new(),
            CategoryId::new("raummiete"),
            1_709_251_200_000,
            Money::from_cents(-50_000),
        );
        assert_eq!(txn.status, TransactionStatus::Expected);
        assert!(txn.has_project());
        assert!(txn.is_expense());
        assert!(!txn.is_matched());
        assert!(txn.validate().is_ok());
    }

    #[test]
    fn test_imported_transaction_is_unassigned() {
        let txn = Transaction::imported(
            org(),
            1_709_251_200_000,
            Money::from_cents(120_00),
            ImportRef {
                imported_transaction_id: "01-03-2024-Miete-sparkasse".into(),
                source: ImportSource::Sparkasse,
            },
        );
        assert_eq!(txn.status, TransactionStatus::Processed);
        assert!(txn.project_id.is_none());
        assert!(txn.category_id.is_none());
        assert!(txn.donor_id.is_none());
        assert!(txn.is_income());
    }

    #[test]
    fn test_expected_with_import_ref_invalid() {
        let mut txn = Transaction::expected(
            org(),
            ProjectId::new(),
            CategoryId::new("technik"),
            0,
            Money::from_cents(-100),
        );
        txn.import_ref = Some(ImportRef {
            imported_transaction_id: "x".into(),
            source: ImportSource::Moss,
        });
        assert!(txn.validate().is_err());
    }

    #[test]
    fn test_in_range_is_inclusive() {
        let mut txn = Transaction::imported(
            org(),
            100,
            Money::from_cents(1),
            ImportRef {
                imported_transaction_id: "x".into(),
                source: ImportSource::Volksbank,
            },
        );
        txn.date = 100;
        assert!(txn.in_range(100, 200));
        assert!(txn.in_range(0, 100));
        assert!(!txn.in_range(101, 200));
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(
            serde_json::to_string(&TransactionStatus::Expected).unwrap(),
            "\"expected\""
        );
        assert_eq!(
            serde_json::to_string(&TransactionStatus::Processed).unwrap(),
            "\"processed\""
        );
        assert_eq!(
            serde_json::to_string(&ImportSource::Sparkasse).unwrap(),
            "\"sparkasse\""
        );
    }
}
