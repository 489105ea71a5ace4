//! Tool administration service

use crate::{
    error::{AppError, AppResult},
    models::Tool,
    repository::Repository,
};

use super::status::StatusService;

#[derive(Clone)]
pub struct ToolsService {
    repository: Repository,
    status: StatusService,
}

impl ToolsService {
    pub fn new(repository: Repository, status: StatusService) -> Self {
        Self { repository, status }
    }

    pub async fn list(&self) -> Vec<Tool> {
        self.repository.tools.list().await
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Tool> {
        self.repository
            .tools
            .get(id)
            .await
            .ok_or_else(|| AppError::NotFound(format!("Tool with id {} not found", id)))
    }

    /// Create a tool, make it selectable for consumables and derive its status
    pub async fn create(&self, name: &str) -> AppResult<Tool> {
        let today = self.status.now().date();
        let tool = self.repository.tools.add(name, today).await?;
        self.repository.consumables.register_tool(&tool.name).await;
        self.status.recompute().await;
        tracing::info!("Added tool {} ({})", tool.id, tool.name);
        self.get_by_id(tool.id).await
    }

    /// Rename a tool; consumables, events and credentials follow the new name
    pub async fn rename(&self, id: i32, name: &str) -> AppResult<Tool> {
        if self.repository.rename_tool(id, name).await?.is_none() {
            return Err(AppError::NotFound(format!("Tool with id {} not found", id)));
        }
        self.status.recompute().await;
        self.get_by_id(id).await
    }

    /// Remove a tool with its consumables and credentials; its history stays
    pub async fn delete(&self, id: i32) -> AppResult<Tool> {
        self.repository
            .remove_tool(id)
            .await
            .ok_or_else(|| AppError::NotFound(format!("Tool with id {} not found", id)))
    }

    pub async fn recompute(&self) -> usize {
        self.status.recompute().await
    }
}
