//! Reimbursement repository

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::KassenwartError;
use crate::models::{OrganizationId, Reimbursement, ReimbursementId};

use super::file_io::{read_json, write_json_atomic};
use super::lock_poisoned;

/// Serializable reimbursement data structure
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct ReimbursementFile {
    reimbursements: Vec<Reimbursement>,
}

/// Repository for reimbursements
pub struct ReimbursementRepository {
    path: PathBuf,
    data: RwLock<HashMap<ReimbursementId, Reimbursement>>,
    by_organization: RwLock<HashMap<OrganizationId, Vec<ReimbursementId>>>,
}

impl ReimbursementRepository {
    /// Create a new reimbursement repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
            by_organization: RwLock::new(HashMap::new()),
        }
    }

    /// Load reimbursements from disk and rebuild the organization index
    pub fn load(&self) -> Result<(), KassenwartError> {
        let file: ReimbursementFile = read_json(&self.path)?;

        let mut data = self.data.write().map_err(lock_poisoned)?;
        let mut by_organization = self.by_organization.write().map_err(lock_poisoned)?;

        data.clear();
        by_organization.clear();

        for reimbursement in file.reimbursements {
            by_organization
                .entry(reimbursement.organization_id)
                .or_default()
                .push(reimbursement.id);
            data.insert(reimbursement.id, reimbursement);
        }

        Ok(())
    }

    /// Save reimbursements to disk
    pub fn save(&self) -> Result<(), KassenwartError> {
        let data = self.data.read().map_err(lock_poisoned)?;

        let mut reimbursements: Vec<_> = data.values().cloned().collect();
        reimbursements.sort_by(|a, b| a.created_at.cmp(&b.created_at));

        write_json_atomic(&self.path, &ReimbursementFile { reimbursements })
    }

    /// Get a reimbursement by ID
    pub fn get(&self, id: ReimbursementId) -> Result<Option<Reimbursement>, KassenwartError> {
        let data = self.data.read().map_err(lock_poisoned)?;
        Ok(data.get(&id).cloned())
    }

    /// Get all reimbursements of one organization, oldest first
    pub fn get_by_organization(
        &self,
        organization_id: OrganizationId,
    ) -> Result<Vec<Reimbursement>, KassenwartError> {
        let data = self.data.read().map_err(lock_poisoned)?;
        let by_organization = self.by_organization.read().map_err(lock_poisoned)?;

        let ids = by_organization
            .get(&organization_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[]);
        let mut reimbursements: Vec<_> =
            ids.iter().filter_map(|id| data.get(id).cloned()).collect();
        reimbursements.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(reimbursements)
    }

    /// Insert or update a reimbursement
    pub fn upsert(&self, reimbursement: Reimbursement) -> Result<(), KassenwartError> {
        let mut data = self.data.write().map_err(lock_poisoned)?;
        let mut by_organization = self.by_organization.write().map_err(lock_poisoned)?;

        if let Some(old) = data.get(&reimbursement.id) {
            if let Some(ids) = by_organization.get_mut(&old.organization_id) {
                ids.retain(|&id| id != reimbursement.id);
            }
        }

        by_organization
            .entry(reimbursement.organization_id)
            .or_default()
            .push(reimbursement.id);
        data.insert(reimbursement.id, reimbursement);
        Ok(())
    }

    /// Delete a reimbursement
    pub fn delete(&self, id: ReimbursementId) -> Result<bool, KassenwartError> {
        let mut data = self.data.write().map_err(lock_poisoned)?;
        let mut by_organization = self.by_organization.write().map_err(lock_poisoned)?;

        if let Some(reimbursement) = data.remove(&id) {
            if let Some(ids) = by_organization.get_mut(&reimbursement.organization_id) {
                ids.retain(|&rid| rid != id);
            }
            Ok(true)
        } else {
            Ok(false)
        }
    }
}
