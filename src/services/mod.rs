//! Business logic layer
//!
//! Services coordinate models and storage: transaction lifecycle, statement
//! import, budget aggregation, reconciliation, donor/category validation,
//! and reimbursements. They hold references to the storage coordinator and
//! the category catalog; persistence to disk stays the caller's decision
//! (`Storage::save_all`).

pub mod budget;
pub mod import;
pub mod matching;
pub mod reimbursement;
pub mod transaction;
pub mod validation;

pub use budget::{BudgetService, BudgetSummary};
pub use import::{ImportReport, ImportService};
pub use matching::{MatchCandidate, MatchStrategy, MatchingService, UnassignedRow};
pub use reimbursement::{ReceiptUpdate, ReimbursementService};
pub use transaction::{LedgerService, NewExpected, TransactionUpdate};
pub use validation::TaxSphereValidator;
