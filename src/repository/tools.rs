//! Tools repository

use std::sync::Arc;

use chrono::NaiveDate;
use tokio::sync::RwLock;

use super::persist;
use crate::{
    error::{AppError, AppResult},
    models::{Tool, ToolDerivedStatus},
    storage::{self, Storage},
};

/// Ordered tool list with unique names
#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<Tool>,
}

impl ToolRegistry {
    pub fn from_tools(tools: Vec<Tool>) -> Self {
        Self { tools }
    }

    pub fn tools(&self) -> &[Tool] {
        &self.tools
    }

    pub fn names(&self) -> Vec<String> {
        self.tools.iter().map(|t| t.name.clone()).collect()
    }

    pub fn get(&self, id: i32) -> Option<&Tool> {
        self.tools.iter().find(|t| t.id == id)
    }

    pub fn get_by_name(&self, name: &str) -> Option<&Tool> {
        self.tools.iter().find(|t| t.name == name)
    }

    fn next_id(&self) -> i32 {
        self.tools.iter().map(|t| t.id).max().unwrap_or(0) + 1
    }

    fn ensure_name_free(&self, name: &str, except: Option<i32>) -> AppResult<()> {
        if self.tools.iter().any(|t| t.name == name && Some(t.id) != except) {
            return Err(AppError::Conflict(format!("A tool named '{}' already exists", name)));
        }
        Ok(())
    }

    /// Append a tool in the `Up` state
    pub fn add(&mut self, name: &str, today: NaiveDate) -> AppResult<Tool> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("Tool name must not be empty".to_string()));
        }
        self.ensure_name_free(name, None)?;
        let tool = Tool::new(self.next_id(), name, today);
        self.tools.push(tool.clone());
        Ok(tool)
    }

    /// Rename a tool, returning its previous name (`None` if the id is unknown).
    /// Dependent records are not touched here.
    pub fn rename(&mut self, id: i32, new_name: &str) -> AppResult<Option<String>> {
        let new_name = new_name.trim();
        if new_name.is_empty() {
            return Err(AppError::Validation("Tool name must not be empty".to_string()));
        }
        self.ensure_name_free(new_name, Some(id))?;
        Ok(self
            .tools
            .iter_mut()
            .find(|t| t.id == id)
            .map(|tool| std::mem::replace(&mut tool.name, new_name.to_string())))
    }

    pub fn remove(&mut self, id: i32) -> Option<Tool> {
        let index = self.tools.iter().position(|t| t.id == id)?;
        Some(self.tools.remove(index))
    }

    /// Overwrite the derived fields of the named tool. Returns whether they changed.
    pub(crate) fn apply_derived_status(&mut self, name: &str, derived: ToolDerivedStatus) -> bool {
        match self.tools.iter_mut().find(|t| t.name == name) {
            Some(tool) if tool.derived() != &derived => {
                tool.set_derived(derived);
                true
            }
            _ => false,
        }
    }
}

#[derive(Clone)]
pub struct ToolsRepository {
    storage: Arc<dyn Storage>,
    store: Arc<RwLock<ToolRegistry>>,
}

impl ToolsRepository {
    pub fn new(storage: Arc<dyn Storage>, registry: ToolRegistry) -> Self {
        Self {
            storage,
            store: Arc::new(RwLock::new(registry)),
        }
    }

    pub(crate) fn store(&self) -> &Arc<RwLock<ToolRegistry>> {
        &self.store
    }

    /// List tools in registry order
    pub async fn list(&self) -> Vec<Tool> {
        self.store.read().await.tools().to_vec()
    }

    pub async fn get(&self, id: i32) -> Option<Tool> {
        self.store.read().await.get(id).cloned()
    }

    pub async fn get_by_name(&self, name: &str) -> Option<Tool> {
        self.store.read().await.get_by_name(name).cloned()
    }

    /// Create a tool and persist the registry
    pub async fn add(&self, name: &str, today: NaiveDate) -> AppResult<Tool> {
        let mut registry = self.store.write().await;
        let tool = registry.add(name, today)?;
        persist(self.storage.as_ref(), storage::KEY_TOOLS, registry.tools()).await;
        Ok(tool)
    }
}
