//! Custom error types for the kassenwart engine
//!
//! This module defines the error hierarchy for the crate using thiserror
//! for ergonomic error definitions.

use thiserror::Error;

use crate::models::TaxSphere;

/// The main error type for kassenwart operations
#[derive(Error, Debug)]
pub enum KassenwartError {
    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Validation errors for data models and mutations
    #[error("Validation error: {0}")]
    Validation(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Cross-organization reference
    #[error("Access denied: {entity_type} {identifier} belongs to a different organization")]
    AccessDenied {
        entity_type: &'static str,
        identifier: String,
    },

    /// Donor/category tax-sphere constraint violation
    #[error(
        "Donor \"{donor}\" cannot be used for category \"{category}\" (tax sphere: {sphere}). \
         Allowed tax spheres: {}",
        format_spheres(.allowed)
    )]
    IncompatibleTaxSphere {
        donor: String,
        category: String,
        sphere: TaxSphere,
        allowed: Vec<TaxSphere>,
    },

    /// Attempted to modify or delete a processed (realized) transaction
    /// in a way the state machine forbids
    #[error("Transaction is locked: {0}")]
    Locked(String),

    /// Import errors (malformed statement file, not a per-row parse failure)
    #[error("Import error: {0}")]
    Import(String),

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(String),
}

fn format_spheres(spheres: &[TaxSphere]) -> String {
    spheres
        .iter()
        .map(|s| s.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

impl KassenwartError {
    /// Create a "not found" error for transactions
    pub fn transaction_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Transaction",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for projects
    pub fn project_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Project",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for donors
    pub fn donor_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Donor",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for categories
    pub fn category_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Category",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for reimbursements
    pub fn reimbursement_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Reimbursement",
            identifier: identifier.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

// Implement From traits for common error types

impl From<std::io::Error> for KassenwartError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for KassenwartError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for kassenwart operations
pub type KassenwartResult<T> = Result<T, KassenwartError>;
