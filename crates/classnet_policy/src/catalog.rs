//! In-memory catalog of classrooms and rule groups.
//!
//! Stand-in for the administration application's data. Loaded from a JSON
//! file of the form:
//!
//! ```json
//! {
//!   "classrooms": [{ "id": "lab-a", "name": "Lab A", "defaultGroupId": "base" }],
//!   "groups": [{ "id": "base", "name": "base", "rules": [{ "kind": "whitelist", "value": "example.org" }] }]
//! }
//! ```

use classnet_common::models::{Classroom, RuleGroup};
use classnet_common::services::{BoxFuture, PolicyCatalog};
use classnet_common::ClassnetError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::sync::{RwLock, RwLockReadGuard};
use tracing::{info, warn};

use crate::error::PolicyError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogData {
    #[serde(default)]
    pub classrooms: Vec<Classroom>,
    #[serde(default)]
    pub groups: Vec<RuleGroup>,
}

impl CatalogData {
    fn validate(&self) -> Result<(), PolicyError> {
        let mut seen = HashSet::new();
        for classroom in &self.classrooms {
            if !seen.insert(classroom.id.as_str()) {
                return Err(PolicyError::Duplicate(format!("classroom id '{}'", classroom.id)));
            }
        }
        let mut names = HashSet::new();
        for classroom in &self.classrooms {
            if !names.insert(classroom.name.to_lowercase()) {
                return Err(PolicyError::Duplicate(format!("classroom name '{}'", classroom.name)));
            }
        }

        let mut group_ids = HashSet::new();
        let mut group_names = HashSet::new();
        for group in &self.groups {
            if !group_ids.insert(group.id.as_str()) {
                return Err(PolicyError::Duplicate(format!("group id '{}'", group.id)));
            }
            if !group_names.insert(group.name.as_str()) {
                return Err(PolicyError::Duplicate(format!("group name '{}'", group.name)));
            }
        }

        for classroom in &self.classrooms {
            if let Some(group_id) = classroom.effective_group_id() {
                if !group_ids.contains(group_id) {
                    warn!(classroom = %classroom.id, group = %group_id, "Classroom references unknown group");
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryPolicyCatalog {
    data: RwLock<CatalogData>,
}

impl InMemoryPolicyCatalog {
    pub fn new(data: CatalogData) -> Result<Self, PolicyError> {
        data.validate()?;
        Ok(Self {
            data: RwLock::new(data),
        })
    }

    pub fn from_json_str(json: &str) -> Result<Self, PolicyError> {
        Self::new(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, PolicyError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let catalog = Self::from_json_str(&raw)?;
        if let Ok(data) = catalog.data.read() {
            info!(
                path = %path.display(),
                classrooms = data.classrooms.len(),
                groups = data.groups.len(),
                "Policy catalog loaded"
            );
        }
        Ok(catalog)
    }

    /// Swap in new catalog content atomically.
    pub fn replace(&self, data: CatalogData) -> Result<(), PolicyError> {
        data.validate()?;
        let mut guard = self.data.write().map_err(|_| PolicyError::Poisoned)?;
        *guard = data;
        Ok(())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, CatalogData>, ClassnetError> {
        self.data
            .read()
            .map_err(|_| ClassnetError::from(PolicyError::Poisoned))
    }

    fn find_classroom(
        &self,
        pred: impl Fn(&Classroom) -> bool,
    ) -> Result<Option<Classroom>, ClassnetError> {
        Ok(self.read()?.classrooms.iter().find(|c| pred(c)).cloned())
    }

    fn find_group(
        &self,
        pred: impl Fn(&RuleGroup) -> bool,
    ) -> Result<Option<RuleGroup>, ClassnetError> {
        Ok(self.read()?.groups.iter().find(|g| pred(g)).cloned())
    }
}

impl PolicyCatalog for InMemoryPolicyCatalog {
    fn classroom_by_id<'a>(
        &'a self,
        id: &'a str,
    ) -> BoxFuture<'a, Option<Classroom>, ClassnetError> {
        let result = self.find_classroom(|c| c.id == id);
        Box::pin(async move { result })
    }

    fn classroom_by_name<'a>(
        &'a self,
        name: &'a str,
    ) -> BoxFuture<'a, Option<Classroom>, ClassnetError> {
        let name = name.trim();
        let result = self.find_classroom(|c| c.name.eq_ignore_ascii_case(name));
        Box::pin(async move { result })
    }

    fn group_by_id<'a>(&'a self, id: &'a str) -> BoxFuture<'a, Option<RuleGroup>, ClassnetError> {
        let result = self.find_group(|g| g.id == id);
        Box::pin(async move { result })
    }

    fn group_by_export_name<'a>(
        &'a self,
        name: &'a str,
    ) -> BoxFuture<'a, Option<RuleGroup>, ClassnetError> {
        let result = self.find_group(|g| g.name == name);
        Box::pin(async move { result })
    }
}
