//! Reimbursement lifecycle
//!
//! Members front expenses and hand in receipts; the treasurer pays them
//! back. A pending reimbursement is freely editable. Marking it paid is
//! final: it flips the status and books a processed expense transaction
//! against the reimbursement's project, so the payout shows up in the
//! project's spent figure like any bank debit.

use tracing::info;

use crate::error::{KassenwartError, KassenwartResult};
use crate::models::{
    CategoryId, Money, OrganizationId, ProjectId, Receipt, ReceiptTotals, Reimbursement,
    ReimbursementId, ReimbursementStatus, TaxRate, Transaction,
};
use crate::storage::Storage;

/// Partial update of one receipt line
#[derive(Debug, Clone, Default)]
pub struct ReceiptUpdate {
    pub receipt_number: Option<String>,
    pub receipt_date: Option<String>,
    pub company_name: Option<String>,
    pub description: Option<String>,
    pub gross_amount: Option<f64>,
    pub tax_rate: Option<TaxRate>,
}

/// Reimbursement operations against the store
pub struct ReimbursementService<'a> {
    storage: &'a Storage,
}

impl<'a> ReimbursementService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Fetch a reimbursement, enforcing organization scoping
    pub fn get(
        &self,
        organization_id: OrganizationId,
        id: ReimbursementId,
    ) -> KassenwartResult<Reimbursement> {
        let reimbursement = self
            .storage
            .reimbursements
            .get(id)?
            .ok_or_else(|| KassenwartError::reimbursement_not_found(id.to_string()))?;
        if reimbursement.organization_id != organization_id {
            return Err(KassenwartError::AccessDenied {
                entity_type: "Reimbursement",
                identifier: id.to_string(),
            });
        }
        Ok(reimbursement)
    }

    /// Create a pending reimbursement
    pub fn create(
        &self,
        organization_id: OrganizationId,
        project_id: ProjectId,
        amount: Money,
        iban: impl Into<String>,
        bic: impl Into<String>,
        account_holder: impl Into<String>,
        receipts: Vec<Receipt>,
    ) -> KassenwartResult<Reimbursement> {
        let project = self
            .storage
            .projects
            .get(project_id)?
            .ok_or_else(|| KassenwartError::project_not_found(project_id.to_string()))?;
        if project.organization_id != organization_id {
            return Err(KassenwartError::AccessDenied {
                entity_type: "Project",
                identifier: project_id.to_string(),
            });
        }

        let reimbursement =
            Reimbursement::new(organization_id, project_id, amount, iban, bic, account_holder)
                .with_receipts(receipts);
        reimbursement.validate().map_err(KassenwartError::Validation)?;

        self.storage.reimbursements.upsert(reimbursement.clone())?;
        info!(reimbursement = %reimbursement.id, "created reimbursement");
        Ok(reimbursement)
    }

    fn get_pending(
        &self,
        organization_id: OrganizationId,
        id: ReimbursementId,
    ) -> KassenwartResult<Reimbursement> {
        let reimbursement = self.get(organization_id, id)?;
        if !reimbursement.is_pending() {
            return Err(KassenwartError::Locked(format!(
                "Reimbursement {} is {} and can no longer be changed",
                id, reimbursement.status
            )));
        }
        Ok(reimbursement)
    }

    /// Append a receipt to a pending reimbursement
    pub fn add_receipt(
        &self,
        organization_id: OrganizationId,
        id: ReimbursementId,
        receipt: Receipt,
    ) -> KassenwartResult<Reimbursement> {
        let mut reimbursement = self.get_pending(organization_id, id)?;
        reimbursement.receipts.push(receipt);
        reimbursement.touch();
        self.storage.reimbursements.upsert(reimbursement.clone())?;
        Ok(reimbursement)
    }

    /// Update one receipt line of a pending reimbursement
    ///
    /// Gross and rate changes recompute the net amount; it is never stored
    /// out of sync.
    pub fn update_receipt(
        &self,
        organization_id: OrganizationId,
        id: ReimbursementId,
        index: usize,
        update: ReceiptUpdate,
    ) -> KassenwartResult<Reimbursement> {
        let mut reimbursement = self.get_pending(organization_id, id)?;
        let receipt = reimbursement.receipts.get_mut(index).ok_or_else(|| {
            KassenwartError::Validation(format!(
                "Reimbursement {} has no receipt at index {}",
                id, index
            ))
        })?;

        if let Some(number) = update.receipt_number {
            receipt.receipt_number = number;
        }
        if let Some(date) = update.receipt_date {
            receipt.receipt_date = date;
        }
        if let Some(company) = update.company_name {
            receipt.company_name = company;
        }
        if let Some(description) = update.description {
            receipt.description = description;
        }
        if let Some(gross) = update.gross_amount {
            receipt.set_gross_amount(gross);
        }
        if let Some(rate) = update.tax_rate {
            receipt.set_tax_rate(rate);
        }

        reimbursement.touch();
        self.storage.reimbursements.upsert(reimbursement.clone())?;
        Ok(reimbursement)
    }

    /// Remove one receipt line from a pending reimbursement
    pub fn remove_receipt(
        &self,
        organization_id: OrganizationId,
        id: ReimbursementId,
        index: usize,
    ) -> KassenwartResult<Reimbursement> {
        let mut reimbursement = self.get_pending(organization_id, id)?;
        if index >= reimbursement.receipts.len() {
            return Err(KassenwartError::Validation(format!(
                "Reimbursement {} has no receipt at index {}",
                id, index
            )));
        }
        reimbursement.receipts.remove(index);
        reimbursement.touch();
        self.storage.reimbursements.upsert(reimbursement.clone())?;
        Ok(reimbursement)
    }

    /// Turn down a pending reimbursement
    ///
    /// The request and its receipts stay in the store; the note tells the
    /// member why. A rejected request can be amended via `update` and
    /// thereby resubmitted.
    pub fn reject(
        &self,
        organization_id: OrganizationId,
        id: ReimbursementId,
        admin_note: impl Into<String>,
    ) -> KassenwartResult<Reimbursement> {
        let mut reimbursement = self.get_pending(organization_id, id)?;
        reimbursement.status = ReimbursementStatus::Rejected;
        reimbursement.admin_note = Some(admin_note.into());
        reimbursement.touch();
        self.storage.reimbursements.upsert(reimbursement.clone())?;
        info!(reimbursement = %id, "rejected reimbursement");
        Ok(reimbursement)
    }

    /// Amend a reimbursement's project and amount
    ///
    /// Resets the status to pending, so amending a rejected request
    /// resubmits it. A paid reimbursement cannot be amended.
    pub fn update(
        &self,
        organization_id: OrganizationId,
        id: ReimbursementId,
        project_id: ProjectId,
        amount: Money,
    ) -> KassenwartResult<Reimbursement> {
        let mut reimbursement = self.get(organization_id, id)?;
        if reimbursement.is_paid() {
            return Err(KassenwartError::Locked(format!(
                "Reimbursement {} is paid and can no longer be changed",
                id
            )));
        }

        let project = self
            .storage
            .projects
            .get(project_id)?
            .ok_or_else(|| KassenwartError::project_not_found(project_id.to_string()))?;
        if project.organization_id != organization_id {
            return Err(KassenwartError::AccessDenied {
                entity_type: "Project",
                identifier: project_id.to_string(),
            });
        }

        reimbursement.project_id = project_id;
        reimbursement.amount = amount;
        reimbursement.status = ReimbursementStatus::Pending;
        reimbursement.validate().map_err(KassenwartError::Validation)?;
        reimbursement.touch();
        self.storage.reimbursements.upsert(reimbursement.clone())?;
        Ok(reimbursement)
    }

    /// Delete a pending reimbursement
    pub fn delete(
        &self,
        organization_id: OrganizationId,
        id: ReimbursementId,
    ) -> KassenwartResult<()> {
        self.get_pending(organization_id, id)?;
        self.storage.reimbursements.delete(id)?;
        info!(reimbursement = %id, "deleted pending reimbursement");
        Ok(())
    }

    /// The reconciling totals over a reimbursement's receipt set
    pub fn totals(
        &self,
        organization_id: OrganizationId,
        id: ReimbursementId,
    ) -> KassenwartResult<ReceiptTotals> {
        let reimbursement = self.get(organization_id, id)?;
        Ok(ReceiptTotals::from_receipts(&reimbursement.receipts))
    }

    /// Mark a pending reimbursement paid
    ///
    /// Books a processed expense transaction against the reimbursement's
    /// project, dated with the payout date. Final: a paid reimbursement
    /// cannot be reopened, edited, or deleted.
    pub fn mark_paid(
        &self,
        organization_id: OrganizationId,
        id: ReimbursementId,
        payout_date: i64,
        category_id: Option<CategoryId>,
    ) -> KassenwartResult<(Reimbursement, Transaction)> {
        let mut reimbursement = self.get_pending(organization_id, id)?;

        let mut txn = Transaction::booked(
            organization_id,
            reimbursement.project_id,
            payout_date,
            -reimbursement.amount,
        )
        .with_text("Auslagenerstattung", reimbursement.account_holder.clone());
        txn.category_id = category_id;

        reimbursement.status = ReimbursementStatus::Paid;
        reimbursement.touch();

        self.storage.transactions.upsert(txn.clone())?;
        self.storage.reimbursements.upsert(reimbursement.clone())?;
        info!(
            reimbursement = %id,
            transaction = %txn.id,
            amount = %txn.amount,
            "reimbursement paid out"
        );
        Ok((reimbursement, txn))
    }

    /// All reimbursements of one organization, oldest first
    pub fn list(
        &self,
        organization_id: OrganizationId,
    ) -> KassenwartResult<Vec<Reimbursement>> {
        self.storage.reimbursements.get_by_organization(organization_id)
    }
}
