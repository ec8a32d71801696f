//! Donor/category tax-sphere compatibility checks
//!
//! German nonprofit accounting partitions money into tax spheres. A donor
//! may restrict which spheres its money can fund; booking a restricted
//! donor against a category in a forbidden sphere must be rejected before
//! the transaction is written.

use crate::catalog::CategoryCatalog;
use crate::error::{KassenwartError, KassenwartResult};
use crate::models::{CategoryId, Donor, DonorId, OrganizationId};
use crate::storage::DonorRepository;

/// Validates donor/category pairings against the tax-sphere rules
pub struct TaxSphereValidator<'a> {
    donors: &'a DonorRepository,
    catalog: &'a dyn CategoryCatalog,
}

impl<'a> TaxSphereValidator<'a> {
    pub fn new(donors: &'a DonorRepository, catalog: &'a dyn CategoryCatalog) -> Self {
        Self { donors, catalog }
    }

    /// Check whether a donor may fund a category
    ///
    /// Passing `None` for either side is a pass: the rule only binds once a
    /// transaction carries both a donor and a category. Donors with an
    /// empty restriction set are unrestricted.
    pub fn check(
        &self,
        organization_id: OrganizationId,
        donor_id: Option<&DonorId>,
        category_id: Option<&CategoryId>,
    ) -> KassenwartResult<()> {
        let (donor_id, category_id) = match (donor_id, category_id) {
            (Some(d), Some(c)) => (d, c),
            _ => return Ok(()),
        };

        let donor = self
            .donors
            .get(*donor_id)?
            .ok_or_else(|| KassenwartError::donor_not_found(donor_id.to_string()))?;
        if donor.organization_id != organization_id {
            return Err(KassenwartError::AccessDenied {
                entity_type: "Donor",
                identifier: donor_id.to_string(),
            });
        }

        let category = self
            .catalog
            .resolve(category_id)
            .ok_or_else(|| KassenwartError::category_not_found(category_id.to_string()))?;

        if donor.allows(category.taxsphere) {
            Ok(())
        } else {
            Err(KassenwartError::IncompatibleTaxSphere {
                donor: donor.name.clone(),
                category: category.name.clone(),
                sphere: category.taxsphere,
                allowed: donor.allowed_tax_spheres.clone(),
            })
        }
    }

    /// All donors of the organization eligible for a category
    ///
    /// Used to populate donor pickers so an incompatible donor is never
    /// offered in the first place.
    pub fn eligible_donors(
        &self,
        organization_id: OrganizationId,
        category_id: &CategoryId,
    ) -> KassenwartResult<Vec<Donor>> {
        let category = self
            .catalog
            .resolve(category_id)
            .ok_or_else(|| KassenwartError::category_not_found(category_id.to_string()))?;

        let mut donors = self.donors.get_by_organization(organization_id)?;
        donors.retain(|d| d.allows(category.taxsphere));
        Ok(donors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::StaticCatalog;
    use crate::models::{Donor, TaxSphere};
    use tempfile::TempDir;

    fn setup() -> (TempDir, DonorRepository, StaticCatalog, OrganizationId) {
        let temp_dir = TempDir::new().unwrap();
        let donors = DonorRepository::new(temp_dir.path().join("donors.json"));
        donors.load().unwrap();
        (temp_dir, donors, StaticCatalog::standard(), OrganizationId::new())
    }

    #[test]
    fn test_absent_donor_or_category_passes() {
        let (_t, donors, catalog, org) = setup();
        let validator = TaxSphereValidator::new(&donors, &catalog);

        assert!(validator.check(org, None, None).is_ok());
        assert!(validator
            .check(org, None, Some(&CategoryId::new("raummiete")))
            .is_ok());

        let donor = Donor::new(org, "Stadt");
        let donor_id = donor.id;
        donors.upsert(donor).unwrap();
        assert!(validator.check(org, Some(&donor_id), None).is_ok());
    }

    #[test]
    fn test_unrestricted_donor_passes_every_category() {
        let (_t, donors, catalog, org) = setup();
        let donor = Donor::new(org, "Förderverein");
        let donor_id = donor.id;
        donors.upsert(donor).unwrap();

        let validator = TaxSphereValidator::new(&donors, &catalog);
        for category in catalog.all() {
            assert!(validator.check(org, Some(&donor_id), Some(&category.id)).is_ok());
        }
    }

    #[test]
    fn test_restricted_donor_rejected_with_names() {
        let (_t, donors, catalog, org) = setup();
        let donor = Donor::new(org, "Stadtwerke")
            .with_allowed_spheres([TaxSphere::NonProfit, TaxSphere::PurposeOperations]);
        let donor_id = donor.id;
        donors.upsert(donor).unwrap();

        let validator = TaxSphereValidator::new(&donors, &catalog);

        // sponsoring is commercial-operations
        let err = validator
            .check(org, Some(&donor_id), Some(&CategoryId::new("sponsoring")))
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Stadtwerke"));
        assert!(msg.contains("Sponsoring"));
        assert!(msg.contains("commercial-operations"));
        assert!(msg.contains("non-profit, purpose-operations"));

        // raummiete is non-profit, allowed
        assert!(validator
            .check(org, Some(&donor_id), Some(&CategoryId::new("raummiete")))
            .is_ok());
    }

    #[test]
    fn test_cross_organization_donor_denied() {
        let (_t, donors, catalog, org) = setup();
        let foreign = Donor::new(OrganizationId::new(), "Fremd");
        let foreign_id = foreign.id;
        donors.upsert(foreign).unwrap();

        let validator = TaxSphereValidator::new(&donors, &catalog);
        let err = validator
            .check(org, Some(&foreign_id), Some(&CategoryId::new("raummiete")))
            .unwrap_err();
        assert!(matches!(err, KassenwartError::AccessDenied { .. }));
    }

    #[test]
    fn test_unknown_donor_and_category() {
        let (_t, donors, catalog, org) = setup();
        let validator = TaxSphereValidator::new(&donors, &catalog);

        let err = validator
            .check(org, Some(&DonorId::new()), Some(&CategoryId::new("raummiete")))
            .unwrap_err();
        assert!(err.is_not_found());

        let donor = Donor::new(org, "Stadt");
        let donor_id = donor.id;
        donors.upsert(donor).unwrap();
        let err = validator
            .check(org, Some(&donor_id), Some(&CategoryId::new("nope")))
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_eligible_donors_filters_by_sphere() {
        let (_t, donors, catalog, org) = setup();
        donors.upsert(Donor::new(org, "Offen")).unwrap();
        donors
            .upsert(Donor::new(org, "Nur ideell").with_allowed_spheres([TaxSphere::NonProfit]))
            .unwrap();

        let validator = TaxSphereValidator::new(&donors, &catalog);

        let for_sponsoring = validator
            .eligible_donors(org, &CategoryId::new("sponsoring"))
            .unwrap();
        assert_eq!(for_sponsoring.len(), 1);
        assert_eq!(for_sponsoring[0].name, "Offen");

        let for_raummiete = validator
            .eligible_donors(org, &CategoryId::new("raummiete"))
            .unwrap();
        assert_eq!(for_raummiete.len(), 2);
    }
}
