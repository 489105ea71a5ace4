//! Password manager service

use crate::{
    error::{AppError, AppResult},
    models::{
        credential::{CredentialInput, ToolCredentialEntry},
        Tool, ToolCredential,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct CredentialsService {
    repository: Repository,
}

impl CredentialsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    async fn tool(&self, tool_id: i32) -> AppResult<Tool> {
        self.repository
            .tools
            .get(tool_id)
            .await
            .ok_or_else(|| AppError::NotFound(format!("Tool with id {} not found", tool_id)))
    }

    /// Every stored credential with its tool name
    pub async fn list_all(&self) -> Vec<ToolCredentialEntry> {
        self.repository.credentials.list_all().await
    }

    pub async fn list(&self, tool_id: i32) -> AppResult<Vec<ToolCredential>> {
        let tool = self.tool(tool_id).await?;
        Ok(self.repository.credentials.list(&tool.name).await)
    }

    pub async fn create(&self, tool_id: i32, request: CredentialInput) -> AppResult<ToolCredential> {
        let tool = self.tool(tool_id).await?;
        let credential = self.repository.credentials.add(&tool.name, request).await;
        tracing::info!("Stored {} credential for {}", credential.system, tool.name);
        Ok(credential)
    }

    pub async fn update(&self, tool_id: i32, id: i64, request: CredentialInput) -> AppResult<ToolCredential> {
        let tool = self.tool(tool_id).await?;
        self.repository
            .credentials
            .update(&tool.name, id, request)
            .await
            .ok_or_else(|| AppError::NotFound(format!("Credential with id {} not found", id)))
    }

    pub async fn delete(&self, tool_id: i32, id: i64) -> AppResult<()> {
        let tool = self.tool(tool_id).await?;
        if !self.repository.credentials.delete(&tool.name, id).await {
            return Err(AppError::NotFound(format!("Credential with id {} not found", id)));
        }
        Ok(())
    }
}
