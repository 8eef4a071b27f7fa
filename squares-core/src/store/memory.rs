use super::GroupStore;
use crate::error::Result;
use crate::group::{Group, GroupStatus, Visibility};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

/// Whole-record map store. Default backing for tests and for embedders
/// that bring their own persistence.
#[derive(Default)]
pub struct MemoryStore {
    groups: RwLock<HashMap<String, Group>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GroupStore for MemoryStore {
    async fn get(&self, id: &str) -> Result<Option<Group>> {
        Ok(self.groups.read().get(id).cloned())
    }

    async fn find_by_invite_code(&self, code: &str) -> Result<Option<Group>> {
        let code = code.to_uppercase();
        Ok(self
            .groups
            .read()
            .values()
            .find(|g| g.invite_code.as_deref() == Some(code.as_str()))
            .cloned())
    }

    async fn list_public_active(&self) -> Result<Vec<Group>> {
        let mut groups: Vec<Group> = self
            .groups
            .read()
            .values()
            .filter(|g| g.visibility == Visibility::Public && g.status != GroupStatus::Completed)
            .cloned()
            .collect();
        groups.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(groups)
    }

    async fn put(&self, group: &Group) -> Result<()> {
        self.groups
            .write()
            .insert(group.id.clone(), group.clone());
        Ok(())
    }

    async fn remove(&self, id: &str) -> Result<bool> {
        Ok(self.groups.write().remove(id).is_some())
    }
}
