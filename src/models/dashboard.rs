//! Dashboard summary payload

use serde::Serialize;
use utoipa::ToSchema;

use super::{Consumable, HistoryEvent, Tool};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MaintenancePhase {
    /// Window already started
    Current,
    Upcoming,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MaintenanceEntry {
    pub phase: MaintenancePhase,
    #[serde(flatten)]
    pub event: HistoryEvent,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub tools: Vec<Tool>,
    pub consumables_due: Vec<Consumable>,
    /// Up to five unresolved windows starting after `now - 24h`, earliest first
    pub maintenance: Vec<MaintenanceEntry>,
}
