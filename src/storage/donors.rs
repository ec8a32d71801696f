//! Donor repository

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::KassenwartError;
use crate::models::{Donor, DonorId, OrganizationId};

use super::file_io::{read_json, write_json_atomic};
use super::lock_poisoned;

/// Serializable donor data structure
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct DonorFile {
    donors: Vec<Donor>,
}

/// Repository for donors
pub struct DonorRepository {
    path: PathBuf,
    data: RwLock<HashMap<DonorId, Donor>>,
    by_organization: RwLock<HashMap<OrganizationId, Vec<DonorId>>>,
}

impl DonorRepository {
    /// Create a new donor repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
            by_organization: RwLock::new(HashMap::new()),
        }
    }

    /// Load donors from disk and rebuild the organization index
    pub fn load(&self) -> Result<(), KassenwartError> {
        let file: DonorFile = read_json(&self.path)?;

        let mut data = self.data.write().map_err(lock_poisoned)?;
        let mut by_organization = self.by_organization.write().map_err(lock_poisoned)?;

        data.clear();
        by_organization.clear();

        for donor in file.donors {
            by_organization
                .entry(donor.organization_id)
                .or_default()
                .push(donor.id);
            data.insert(donor.id, donor);
        }

        Ok(())
    }

    /// Save donors to disk
    pub fn save(&self) -> Result<(), KassenwartError> {
        let data = self.data.read().map_err(lock_poisoned)?;

        let mut donors: Vec<_> = data.values().cloned().collect();
        donors.sort_by(|a, b| a.name.cmp(&b.name));

        write_json_atomic(&self.path, &DonorFile { donors })
    }

    /// Get a donor by ID
    pub fn get(&self, id: DonorId) -> Result<Option<Donor>, KassenwartError> {
        let data = self.data.read().map_err(lock_poisoned)?;
        Ok(data.get(&id).cloned())
    }

    /// Get all donors of one organization, sorted by name
    pub fn get_by_organization(
        &self,
        organization_id: OrganizationId,
    ) -> Result<Vec<Donor>, KassenwartError> {
        let data = self.data.read().map_err(lock_poisoned)?;
        let by_organization = self.by_organization.read().map_err(lock_poisoned)?;

        let ids = by_organization
            .get(&organization_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[]);
        let mut donors: Vec<_> = ids.iter().filter_map(|id| data.get(id).cloned()).collect();
        donors.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(donors)
    }

    /// Insert or update a donor
    pub fn upsert(&self, donor: Donor) -> Result<(), KassenwartError> {
        let mut data = self.data.write().map_err(lock_poisoned)?;
        let mut by_organization = self.by_organization.write().map_err(lock_poisoned)?;

        if let Some(old) = data.get(&donor.id) {
            if let Some(ids) = by_organization.get_mut(&old.organization_id) {
                ids.retain(|&id| id != donor.id);
            }
        }

        by_organization
            .entry(donor.organization_id)
            .or_default()
            .push(donor.id);
        data.insert(donor.id, donor);
        Ok(())
    }

    /// Delete a donor
    pub fn delete(&self, id: DonorId) -> Result<bool, KassenwartError> {
        let mut data = self.data.write().map_err(lock_poisoned)?;
        let mut by_organization = self.by_organization.write().map_err(lock_poisoned)?;

        if let Some(donor) = data.remove(&id) {
            if let Some(ids) = by_organization.get_mut(&donor.organization_id) {
                ids.retain(|&did| did != id);
            }
            Ok(true)
        } else {
            Ok(false)
        }
    }
}
