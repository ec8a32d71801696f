//! Project repository

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::KassenwartError;
use crate::models::{OrganizationId, Project, ProjectId};

use super::file_io::{read_json, write_json_atomic};
use super::lock_poisoned;

/// Serializable project data structure
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct ProjectFile {
    projects: Vec<Project>,
}

/// Repository for budget projects
pub struct ProjectRepository {
    path: PathBuf,
    data: RwLock<HashMap<ProjectId, Project>>,
    by_organization: RwLock<HashMap<OrganizationId, Vec<ProjectId>>>,
}

impl ProjectRepository {
    /// Create a new project repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
            by_organization: RwLock::new(HashMap::new()),
        }
    }

    /// Load projects from disk and rebuild the organization index
    pub fn load(&self) -> Result<(), KassenwartError> {
        let file: ProjectFile = read_json(&self.path)?;

        let mut data = self.data.write().map_err(lock_poisoned)?;
        let mut by_organization = self.by_organization.write().map_err(lock_poisoned)?;

        data.clear();
        by_organization.clear();

        for project in file.projects {
            by_organization
                .entry(project.organization_id)
                .or_default()
                .push(project.id);
            data.insert(project.id, project);
        }

        Ok(())
    }

    /// Save projects to disk
    pub fn save(&self) -> Result<(), KassenwartError> {
        let data = self.data.read().map_err(lock_poisoned)?;

        let mut projects: Vec<_> = data.values().cloned().collect();
        projects.sort_by(|a, b| a.name.cmp(&b.name));

        write_json_atomic(&self.path, &ProjectFile { projects })
    }

    /// Get a project by ID
    pub fn get(&self, id: ProjectId) -> Result<Option<Project>, KassenwartError> {
        let data = self.data.read().map_err(lock_poisoned)?;
        Ok(data.get(&id).cloned())
    }

    /// Get all projects of one organization, sorted by name
    pub fn get_by_organization(
        &self,
        organization_id: OrganizationId,
    ) -> Result<Vec<Project>, KassenwartError> {
        let data = self.data.read().map_err(lock_poisoned)?;
        let by_organization = self.by_organization.read().map_err(lock_poisoned)?;

        let ids = by_organization
            .get(&organization_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[]);
        let mut projects: Vec<_> = ids.iter().filter_map(|id| data.get(id).cloned()).collect();
        projects.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(projects)
    }

    /// Insert or update a project
    pub fn upsert(&self, project: Project) -> Result<(), KassenwartError> {
        let mut data = self.data.write().map_err(lock_poisoned)?;
        let mut by_organization = self.by_organization.write().map_err(lock_poisoned)?;

        if let Some(old) = data.get(&project.id) {
            if let Some(ids) = by_organization.get_mut(&old.organization_id) {
                ids.retain(|&id| id != project.id);
            }
        }

        by_organization
            .entry(project.organization_id)
            .or_default()
            .push(project.id);
        data.insert(project.id, project);
        Ok(())
    }

    /// Delete a project
    pub fn delete(&self, id: ProjectId) -> Result<bool, KassenwartError> {
        let mut data = self.data.write().map_err(lock_poisoned)?;
        let mut by_organization = self.by_organization.write().map_err(lock_poisoned)?;

        if let Some(project) = data.remove(&id) {
            if let Some(ids) = by_organization.get_mut(&project.organization_id) {
                ids.retain(|&pid| pid != id);
            }
            Ok(true)
        } else {
            Ok(false)
        }
    }
}
