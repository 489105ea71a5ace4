//! Consumable part model (wear tracking)

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::timestamp;

/// Consumable part installed on a tool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Consumable {
    pub id: i32,
    /// Name of the tool the part is installed on
    pub tool_name: String,
    pub name: String,
    pub current_hours: Option<u32>,
    pub guaranteed_hours: Option<u32>,
    pub last_replaced: NaiveDate,
    #[serde(default, with = "timestamp::date_option")]
    #[schema(value_type = Option<String>, example = "2023-06-01")]
    pub scheduled_replacement: Option<NaiveDate>,
    #[serde(default)]
    pub remark: String,
}

impl Consumable {
    /// A part is due once its run hours reach the guaranteed lifetime
    pub fn needs_replacement(&self) -> bool {
        match (self.current_hours, self.guaranteed_hours) {
            (Some(current), Some(guaranteed)) => current >= guaranteed,
            _ => false,
        }
    }
}

/// Create consumable request
#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct CreateConsumable {
    #[validate(length(min = 1, message = "Tool name is required"))]
    pub tool_name: String,
    #[validate(length(min = 1, message = "Consumable name is required"))]
    pub name: String,
    pub current_hours: Option<u32>,
    pub guaranteed_hours: Option<u32>,
    /// Defaults to today
    pub last_replaced: Option<NaiveDate>,
    pub scheduled_replacement: Option<NaiveDate>,
    #[serde(default)]
    pub remark: String,
}

/// Full-record update of a consumable
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateConsumable {
    #[validate(length(min = 1, message = "Tool name is required"))]
    pub tool_name: String,
    #[validate(length(min = 1, message = "Consumable name is required"))]
    pub name: String,
    pub current_hours: Option<u32>,
    pub guaranteed_hours: Option<u32>,
    pub last_replaced: NaiveDate,
    pub scheduled_replacement: Option<NaiveDate>,
    #[serde(default)]
    pub remark: String,
}

impl UpdateConsumable {
    pub fn into_consumable(self, id: i32) -> Consumable {
        Consumable {
            id,
            tool_name: self.tool_name,
            name: self.name,
            current_hours: self.current_hours,
            guaranteed_hours: self.guaranteed_hours,
            last_replaced: self.last_replaced,
            scheduled_replacement: self.scheduled_replacement,
            remark: self.remark,
        }
    }
}

/// Query parameters for consumables
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct ConsumableQuery {
    /// Only consumables installed on this tool
    pub tool: Option<String>,
}
