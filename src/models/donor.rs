//! Donor model
//!
//! Donors fund transactions. A donor may restrict which tax spheres its
//! money can be booked into; an empty restriction set means unrestricted
//! (the permissive default for donors created before the restriction
//! existed).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::category::TaxSphere;
use super::ids::{DonorId, OrganizationId};

/// A donor (person, company, or public body funding the organization)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Donor {
    /// Unique identifier
    pub id: DonorId,

    /// Owning organization; donors are never shared across organizations
    pub organization_id: OrganizationId,

    /// Display name
    pub name: String,

    /// Tax spheres this donor's money may fund; empty means unrestricted
    #[serde(default)]
    pub allowed_tax_spheres: Vec<TaxSphere>,

    /// Free-text notes
    #[serde(default)]
    pub notes: String,

    /// When the donor was created
    pub created_at: DateTime<Utc>,

    /// When the donor was last modified
    pub updated_at: DateTime<Utc>,
}

impl Donor {
    /// Create a new unrestricted donor
    pub fn new(organization_id: OrganizationId, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: DonorId::new(),
            organization_id,
            name: name.into(),
            allowed_tax_spheres: Vec::new(),
            notes: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Restrict this donor to a set of tax spheres
    pub fn with_allowed_spheres(mut self, spheres: impl IntoIterator<Item = TaxSphere>) -> Self {
        self.allowed_tax_spheres = spheres.into_iter().collect();
        self
    }

    /// Whether this donor may fund the given sphere
    ///
    /// An empty restriction set is always compatible.
    pub fn allows(&self, sphere: TaxSphere) -> bool {
        self.allowed_tax_spheres.is_empty() || self.allowed_tax_spheres.contains(&sphere)
    }

    /// Validate the donor
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Donor name must not be empty".into());
        }
        Ok(())
    }
}

impl fmt::Display for Donor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unrestricted_donor_allows_everything() {
        let donor = Donor::new(OrganizationId::new(), "Förderverein");
        for sphere in TaxSphere::ALL {
            assert!(donor.allows(sphere));
        }
    }

    #[test]
    fn test_restricted_donor() {
        let donor = Donor::new(OrganizationId::new(), "Stadt")
            .with_allowed_spheres([TaxSphere::NonProfit, TaxSphere::PurposeOperations]);
        assert!(donor.allows(TaxSphere::NonProfit));
        assert!(donor.allows(TaxSphere::PurposeOperations));
        assert!(!donor.allows(TaxSphere::CommercialOperations));
        assert!(!donor.allows(TaxSphere::AssetManagement));
    }

    #[test]
    fn test_validate_rejects_empty_name() {
        let mut donor = Donor::new(OrganizationId::new(), "X");
        donor.name = "  ".into();
        assert!(donor.validate().is_err());
    }
}
