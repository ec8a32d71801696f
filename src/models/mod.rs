//! Core data models
//!
//! The ledger entity (`Transaction`) plus the records it references:
//! projects, donors, categories (with the tax-sphere vocabulary), and
//! reimbursements with their receipts.

pub mod category;
pub mod donor;
pub mod ids;
pub mod money;
pub mod patch;
pub mod project;
pub mod receipt;
pub mod reimbursement;
pub mod transaction;

pub use category::{Category, CategoryId, TaxSphere};
pub use donor::Donor;
pub use ids::{DonorId, OrganizationId, ProjectId, ReimbursementId, TransactionId};
pub use money::Money;
pub use patch::Patch;
pub use project::Project;
pub use receipt::{split_gross_amount, Receipt, ReceiptTotals, TaxRate};
pub use reimbursement::{Reimbursement, ReimbursementStatus};
pub use transaction::{ImportRef, ImportSource, Transaction, TransactionStatus};
