//! Consumables and spare-parts inventory service

use crate::{
    error::{AppError, AppResult},
    models::{
        consumable::{CreateConsumable, UpdateConsumable},
        inventory::InventoryItemInput,
        Consumable, InventoryItem,
    },
    repository::Repository,
};

use super::status::StatusService;

#[derive(Clone)]
pub struct ConsumablesService {
    repository: Repository,
    status: StatusService,
}

impl ConsumablesService {
    pub fn new(repository: Repository, status: StatusService) -> Self {
        Self { repository, status }
    }

    pub async fn list(&self, tool_name: Option<&str>) -> Vec<Consumable> {
        self.repository.consumables.list(tool_name).await
    }

    /// Tool names consumables can be attached to
    pub async fn tool_names(&self) -> Vec<String> {
        self.repository.consumables.tool_names().await
    }

    /// Parts whose hours reached the guaranteed lifetime
    pub async fn due(&self) -> Vec<Consumable> {
        self.repository.consumables.due().await
    }

    pub async fn create(&self, request: CreateConsumable) -> AppResult<Consumable> {
        let today = self.status.now().date();
        let consumable = self.repository.consumables.add(request, today).await;
        tracing::info!("Added consumable {} on {}", consumable.name, consumable.tool_name);
        Ok(consumable)
    }

    pub async fn update(&self, id: i32, request: UpdateConsumable) -> AppResult<Consumable> {
        let consumable = request.into_consumable(id);
        if !self.repository.consumables.update(consumable.clone()).await {
            return Err(AppError::NotFound(format!("Consumable with id {} not found", id)));
        }
        if consumable.needs_replacement() {
            tracing::info!("Consumable {} on {} is due for replacement", consumable.name, consumable.tool_name);
        }
        Ok(consumable)
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        if !self.repository.consumables.delete(id).await {
            return Err(AppError::NotFound(format!("Consumable with id {} not found", id)));
        }
        Ok(())
    }

    pub async fn inventory(&self) -> Vec<InventoryItem> {
        self.repository.inventory.list().await
    }

    pub async fn add_inventory_item(&self, request: InventoryItemInput) -> AppResult<InventoryItem> {
        Ok(self.repository.inventory.add(request).await)
    }

    pub async fn update_inventory_item(&self, id: i64, request: InventoryItemInput) -> AppResult<InventoryItem> {
        self.repository
            .inventory
            .update(id, request)
            .await
            .ok_or_else(|| AppError::NotFound(format!("Inventory item with id {} not found", id)))
    }

    pub async fn delete_inventory_item(&self, id: i64) -> AppResult<()> {
        if !self.repository.inventory.delete(id).await {
            return Err(AppError::NotFound(format!("Inventory item with id {} not found", id)));
        }
        Ok(())
    }
}
