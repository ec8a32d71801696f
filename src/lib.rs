//! kassenwart — budgeting and reconciliation engine for German nonprofits
//!
//! The ledger tracks expected (planned) and processed (realized)
//! transactions per organization. Bank statements (Sparkasse, Volksbank,
//! Moss) import idempotently: every statement line gets a deterministic id
//! and re-imports are skipped, never duplicated. Expected rows are
//! reconciled against the processed rows that realize them, budgets
//! aggregate over project/date windows without double counting, donor
//! restrictions are enforced against the category tax spheres
//! (Gemeinnützigkeitsrecht), and reimbursements carry gross/net/VAT
//! receipt sets that reconcile exactly.
//!
//! State lives in JSON files under a caller-supplied directory; writes are
//! atomic (temp file + rename).

pub mod catalog;
pub mod config;
pub mod error;
pub mod import;
pub mod models;
pub mod services;
pub mod storage;

pub use error::{KassenwartError, KassenwartResult};
