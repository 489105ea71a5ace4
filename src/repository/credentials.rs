//! Per-tool credential vault

use std::{collections::BTreeMap, sync::Arc};

use tokio::sync::RwLock;

use super::{forget, persist, IdGenerator};
use crate::{
    models::{
        credential::{CredentialInput, ToolCredentialEntry},
        ToolCredential,
    },
    storage::{self, Storage},
};

/// Credential lists keyed by tool name
#[derive(Debug, Default)]
pub struct CredentialVault {
    by_tool: BTreeMap<String, Vec<ToolCredential>>,
    ids: IdGenerator,
}

impl CredentialVault {
    pub fn insert_tool(&mut self, tool_name: String, credentials: Vec<ToolCredential>) {
        self.by_tool.insert(tool_name, credentials);
    }

    pub fn list(&self, tool_name: &str) -> &[ToolCredential] {
        self.by_tool.get(tool_name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every credential with the tool it belongs to, grouped by tool name
    pub fn entries(&self) -> Vec<ToolCredentialEntry> {
        self.by_tool
            .iter()
            .flat_map(|(tool_name, list)| {
                list.iter().map(move |c| ToolCredentialEntry {
                    tool_name: tool_name.clone(),
                    credential: c.clone(),
                })
            })
            .collect()
    }

    pub fn add(&mut self, tool_name: &str, input: CredentialInput) -> ToolCredential {
        let credential = input.into_credential(self.ids.next_id());
        self.by_tool
            .entry(tool_name.to_string())
            .or_default()
            .push(credential.clone());
        credential
    }

    pub fn update(&mut self, tool_name: &str, id: i64, input: CredentialInput) -> Option<ToolCredential> {
        let slot = self
            .by_tool
            .get_mut(tool_name)?
            .iter_mut()
            .find(|c| c.id == id)?;
        *slot = input.into_credential(id);
        Some(slot.clone())
    }

    pub fn delete(&mut self, tool_name: &str, id: i64) -> bool {
        let Some(list) = self.by_tool.get_mut(tool_name) else {
            return false;
        };
        let before = list.len();
        list.retain(|c| c.id != id);
        list.len() != before
    }

    /// Move a tool's list under its new name. Returns whether there was one.
    pub fn rename_tool(&mut self, old_name: &str, new_name: &str) -> bool {
        match self.by_tool.remove(old_name) {
            Some(mut list) => {
                self.by_tool
                    .entry(new_name.to_string())
                    .or_default()
                    .append(&mut list);
                true
            }
            None => false,
        }
    }

    pub fn remove_tool(&mut self, tool_name: &str) -> bool {
        self.by_tool.remove(tool_name).is_some()
    }
}

#[derive(Clone)]
pub struct CredentialsRepository {
    storage: Arc<dyn Storage>,
    store: Arc<RwLock<CredentialVault>>,
}

impl CredentialsRepository {
    pub fn new(storage: Arc<dyn Storage>, vault: CredentialVault) -> Self {
        Self {
            storage,
            store: Arc::new(RwLock::new(vault)),
        }
    }

    pub(crate) fn store(&self) -> &Arc<RwLock<CredentialVault>> {
        &self.store
    }

    async fn save(&self, vault: &CredentialVault, tool_name: &str) {
        let key = storage::credentials_key(tool_name);
        let list = vault.list(tool_name);
        if list.is_empty() {
            forget(self.storage.as_ref(), &key).await;
        } else {
            persist(self.storage.as_ref(), &key, list).await;
        }
    }

    pub async fn list(&self, tool_name: &str) -> Vec<ToolCredential> {
        self.store.read().await.list(tool_name).to_vec()
    }

    pub async fn list_all(&self) -> Vec<ToolCredentialEntry> {
        self.store.read().await.entries()
    }

    pub async fn add(&self, tool_name: &str, input: CredentialInput) -> ToolCredential {
        let mut vault = self.store.write().await;
        let credential = vault.add(tool_name, input);
        self.save(&vault, tool_name).await;
        credential
    }

    pub async fn update(&self, tool_name: &str, id: i64, input: CredentialInput) -> Option<ToolCredential> {
        let mut vault = self.store.write().await;
        let credential = vault.update(tool_name, id, input)?;
        self.save(&vault, tool_name).await;
        Some(credential)
    }

    pub async fn delete(&self, tool_name: &str, id: i64) -> bool {
        let mut vault = self.store.write().await;
        let deleted = vault.delete(tool_name, id);
        if deleted {
            self.save(&vault, tool_name).await;
        }
        deleted
    }
}
