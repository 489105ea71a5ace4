//! Spare-parts inventory repository

use std::sync::Arc;

use tokio::sync::RwLock;

use super::{persist, IdGenerator};
use crate::{
    models::{inventory::InventoryItemInput, InventoryItem},
    storage::{self, Storage},
};

#[derive(Debug, Default)]
pub struct Inventory {
    items: Vec<InventoryItem>,
    ids: IdGenerator,
}

impl Inventory {
    pub fn from_items(items: Vec<InventoryItem>) -> Self {
        Self {
            items,
            ids: IdGenerator::new(),
        }
    }

    pub fn items(&self) -> &[InventoryItem] {
        &self.items
    }

    pub fn add(&mut self, input: InventoryItemInput) -> InventoryItem {
        let item = input.into_item(self.ids.next_id());
        self.items.push(item.clone());
        item
    }

    pub fn update(&mut self, id: i64, input: InventoryItemInput) -> Option<InventoryItem> {
        let slot = self.items.iter_mut().find(|i| i.id == id)?;
        *slot = input.into_item(id);
        Some(slot.clone())
    }

    pub fn delete(&mut self, id: i64) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.id != id);
        self.items.len() != before
    }
}

#[derive(Clone)]
pub struct InventoryRepository {
    storage: Arc<dyn Storage>,
    store: Arc<RwLock<Inventory>>,
}

impl InventoryRepository {
    pub fn new(storage: Arc<dyn Storage>, inventory: Inventory) -> Self {
        Self {
            storage,
            store: Arc::new(RwLock::new(inventory)),
        }
    }

    pub(crate) fn store(&self) -> &Arc<RwLock<Inventory>> {
        &self.store
    }

    async fn save(&self, inventory: &Inventory) {
        persist(self.storage.as_ref(), storage::KEY_INVENTORY, inventory.items()).await;
    }

    pub async fn list(&self) -> Vec<InventoryItem> {
        self.store.read().await.items().to_vec()
    }

    pub async fn add(&self, input: InventoryItemInput) -> InventoryItem {
        let mut inventory = self.store.write().await;
        let item = inventory.add(input);
        self.save(&inventory).await;
        item
    }

    pub async fn update(&self, id: i64, input: InventoryItemInput) -> Option<InventoryItem> {
        let mut inventory = self.store.write().await;
        let item = inventory.update(id, input)?;
        self.save(&inventory).await;
        Some(item)
    }

    pub async fn delete(&self, id: i64) -> bool {
        let mut inventory = self.store.write().await;
        let deleted = inventory.delete(id);
        if deleted {
            self.save(&inventory).await;
        }
        deleted
    }
}
