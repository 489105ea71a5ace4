//! Consumables repository

use std::sync::Arc;

use chrono::NaiveDate;
use tokio::sync::RwLock;

use super::persist;
use crate::{
    models::{consumable::CreateConsumable, Consumable},
    storage::{self, Storage},
};

/// Consumable parts plus the list of tool names they may be attached to
#[derive(Debug, Clone, Default)]
pub struct ConsumableRegistry {
    consumables: Vec<Consumable>,
    tool_names: Vec<String>,
}

impl ConsumableRegistry {
    /// Rebuild from persisted parts. Without a stored tool list, the names
    /// used by the parts are taken in first-seen order.
    pub fn from_parts(consumables: Vec<Consumable>, tool_names: Option<Vec<String>>) -> Self {
        let mut registry = Self {
            consumables,
            tool_names: tool_names.unwrap_or_default(),
        };
        let used: Vec<String> = registry.consumables.iter().map(|c| c.tool_name.clone()).collect();
        for name in used {
            registry.register_tool(&name);
        }
        registry
    }

    pub fn consumables(&self) -> &[Consumable] {
        &self.consumables
    }

    pub fn tool_names(&self) -> &[String] {
        &self.tool_names
    }

    pub fn get(&self, id: i32) -> Option<&Consumable> {
        self.consumables.iter().find(|c| c.id == id)
    }

    /// Parts whose run hours reached their guaranteed lifetime
    pub fn due(&self) -> impl Iterator<Item = &Consumable> {
        self.consumables.iter().filter(|c| c.needs_replacement())
    }

    /// Add a tool name to the list; false when already present
    pub fn register_tool(&mut self, name: &str) -> bool {
        if self.tool_names.iter().any(|n| n == name) {
            return false;
        }
        self.tool_names.push(name.to_string());
        true
    }

    pub fn add(&mut self, input: CreateConsumable, today: NaiveDate) -> Consumable {
        let id = self.consumables.iter().map(|c| c.id).max().unwrap_or(0) + 1;
        let consumable = Consumable {
            id,
            tool_name: input.tool_name,
            name: input.name,
            current_hours: input.current_hours,
            guaranteed_hours: input.guaranteed_hours,
            last_replaced: input.last_replaced.unwrap_or(today),
            scheduled_replacement: input.scheduled_replacement,
            remark: input.remark,
        };
        self.register_tool(&consumable.tool_name);
        self.consumables.push(consumable.clone());
        consumable
    }

    /// Replace the record with the same id; false when no such record
    pub fn update(&mut self, consumable: Consumable) -> bool {
        let Some(slot) = self.consumables.iter_mut().find(|c| c.id == consumable.id) else {
            return false;
        };
        let tool_name = consumable.tool_name.clone();
        *slot = consumable;
        self.register_tool(&tool_name);
        true
    }

    pub fn delete(&mut self, id: i32) -> bool {
        let before = self.consumables.len();
        self.consumables.retain(|c| c.id != id);
        self.consumables.len() != before
    }

    /// Point every part of `old_name` at `new_name`; returns how many moved
    pub fn rename_tool(&mut self, old_name: &str, new_name: &str) -> usize {
        if old_name != new_name && self.tool_names.iter().any(|n| n == new_name) {
            self.tool_names.retain(|n| n != old_name);
        } else {
            for name in self.tool_names.iter_mut().filter(|n| *n == old_name) {
                *name = new_name.to_string();
            }
        }
        let mut moved = 0;
        for consumable in self.consumables.iter_mut().filter(|c| c.tool_name == old_name) {
            consumable.tool_name = new_name.to_string();
            moved += 1;
        }
        moved
    }

    /// Drop a tool name and all its parts; returns how many parts went
    pub fn delete_by_tool(&mut self, name: &str) -> usize {
        self.tool_names.retain(|n| n != name);
        let before = self.consumables.len();
        self.consumables.retain(|c| c.tool_name != name);
        before - self.consumables.len()
    }
}

#[derive(Clone)]
pub struct ConsumablesRepository {
    storage: Arc<dyn Storage>,
    store: Arc<RwLock<ConsumableRegistry>>,
}

impl ConsumablesRepository {
    pub fn new(storage: Arc<dyn Storage>, registry: ConsumableRegistry) -> Self {
        Self {
            storage,
            store: Arc::new(RwLock::new(registry)),
        }
    }

    pub(crate) fn store(&self) -> &Arc<RwLock<ConsumableRegistry>> {
        &self.store
    }

    async fn save(&self, registry: &ConsumableRegistry) {
        let store = self.storage.as_ref();
        persist(store, storage::KEY_CONSUMABLES, registry.consumables()).await;
        persist(store, storage::KEY_CONSUMABLE_TOOLS, registry.tool_names()).await;
    }

    /// List consumables, optionally only those of one tool
    pub async fn list(&self, tool_name: Option<&str>) -> Vec<Consumable> {
        self.store
            .read()
            .await
            .consumables()
            .iter()
            .filter(|c| tool_name.map_or(true, |t| c.tool_name == t))
            .cloned()
            .collect()
    }

    pub async fn get(&self, id: i32) -> Option<Consumable> {
        self.store.read().await.get(id).cloned()
    }

    pub async fn tool_names(&self) -> Vec<String> {
        self.store.read().await.tool_names().to_vec()
    }

    pub async fn due(&self) -> Vec<Consumable> {
        self.store.read().await.due().cloned().collect()
    }

    pub async fn register_tool(&self, name: &str) {
        let mut registry = self.store.write().await;
        if registry.register_tool(name) {
            self.save(&registry).await;
        }
    }

    pub async fn add(&self, input: CreateConsumable, today: NaiveDate) -> Consumable {
        let mut registry = self.store.write().await;
        let consumable = registry.add(input, today);
        self.save(&registry).await;
        consumable
    }

    pub async fn update(&self, consumable: Consumable) -> bool {
        let mut registry = self.store.write().await;
        let updated = registry.update(consumable);
        if updated {
            self.save(&registry).await;
        }
        updated
    }

    pub async fn delete(&self, id: i32) -> bool {
        let mut registry = self.store.write().await;
        let deleted = registry.delete(id);
        if deleted {
            self.save(&registry).await;
        }
        deleted
    }
}
