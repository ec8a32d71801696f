//! Reimbursement model
//!
//! A reimbursement is a payout request (expense receipts fronted by a
//! member) with its receipt set embedded. Marking a reimbursement paid is
//! the internal event that inserts a processed expense transaction into
//! the ledger.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{OrganizationId, ProjectId, ReimbursementId};
use super::money::Money;
use super::receipt::Receipt;

/// Lifecycle status of a reimbursement
///
/// A rejected request keeps its data and can be amended and resubmitted;
/// paid is final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReimbursementStatus {
    /// Submitted, awaiting payout
    #[default]
    Pending,
    /// Turned down by the treasurer; the admin note says why
    Rejected,
    /// Paid out; the realizing ledger transaction exists
    Paid,
}

impl fmt::Display for ReimbursementStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Rejected => write!(f, "rejected"),
            Self::Paid => write!(f, "paid"),
        }
    }
}

/// A reimbursement request with its receipts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reimbursement {
    /// Unique identifier
    pub id: ReimbursementId,

    /// Owning organization
    pub organization_id: OrganizationId,

    /// The project this payout is booked against
    pub project_id: ProjectId,

    /// Payout amount
    pub amount: Money,

    /// Lifecycle status
    #[serde(default)]
    pub status: ReimbursementStatus,

    /// Payout bank details
    pub iban: String,
    pub bic: String,
    pub account_holder: String,

    /// Receipt line items
    #[serde(default)]
    pub receipts: Vec<Receipt>,

    /// Treasurer's note explaining a rejection
    #[serde(default)]
    pub admin_note: Option<String>,

    /// When the reimbursement was created
    pub created_at: DateTime<Utc>,

    /// When the reimbursement was last modified
    pub updated_at: DateTime<Utc>,
}

impl Reimbursement {
    /// Create a new pending reimbursement
    pub fn new(
        organization_id: OrganizationId,
        project_id: ProjectId,
        amount: Money,
        iban: impl Into<String>,
        bic: impl Into<String>,
        account_holder: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: ReimbursementId::new(),
            organization_id,
            project_id,
            amount,
            status: ReimbursementStatus::Pending,
            iban: iban.into(),
            bic: bic.into(),
            account_holder: account_holder.into(),
            receipts: Vec::new(),
            admin_note: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Attach receipts
    pub fn with_receipts(mut self, receipts: Vec<Receipt>) -> Self {
        self.receipts = receipts;
        self
    }

    /// Whether this reimbursement can still be edited or deleted
    pub fn is_pending(&self) -> bool {
        self.status == ReimbursementStatus::Pending
    }

    /// Whether this reimbursement has been paid out
    pub fn is_paid(&self) -> bool {
        self.status == ReimbursementStatus::Paid
    }

    /// Validate the reimbursement
    pub fn validate(&self) -> Result<(), String> {
        if self.amount.is_zero() || self.amount.is_negative() {
            return Err("Reimbursement amount must be positive".into());
        }
        if self.iban.trim().is_empty() {
            return Err("IBAN must not be empty".into());
        }
        if self.account_holder.trim().is_empty() {
            return Err("Account holder must not be empty".into());
        }
        Ok(())
    }

    /// Mark the row as touched now
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
