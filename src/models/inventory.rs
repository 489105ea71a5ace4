//! Spare-parts inventory model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::timestamp;

/// Spare part kept in storage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub id: i64,
    pub name: String,
    pub quantity: u32,
    #[serde(default, with = "timestamp::date_option")]
    #[schema(value_type = Option<String>, example = "2023-03-01")]
    pub purchase_date: Option<NaiveDate>,
    #[serde(default)]
    pub storage_location: String,
    #[serde(default)]
    pub remarks: String,
}

/// Create / update inventory item request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct InventoryItemInput {
    #[validate(length(min = 1, message = "Item name is required"))]
    pub name: String,
    #[validate(range(min = 1, message = "Quantity must be greater than zero"))]
    pub quantity: u32,
    pub purchase_date: Option<NaiveDate>,
    #[serde(default)]
    pub storage_location: String,
    #[serde(default)]
    pub remarks: String,
}

impl InventoryItemInput {
    pub fn into_item(self, id: i64) -> InventoryItem {
        InventoryItem {
            id,
            name: self.name,
            quantity: self.quantity,
            purchase_date: self.purchase_date,
            storage_location: self.storage_location,
            remarks: self.remarks,
        }
    }
}
