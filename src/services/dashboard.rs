//! Dashboard summary service

use chrono::{Duration, NaiveDateTime};

use crate::{
    models::{
        dashboard::{DashboardSummary, MaintenanceEntry, MaintenancePhase},
        EventType, HistoryEvent,
    },
    repository::Repository,
};

use super::status::StatusService;

const MAINTENANCE_SHOWN: usize = 5;

#[derive(Clone)]
pub struct DashboardService {
    repository: Repository,
    status: StatusService,
}

/// Unresolved maintenance that started within the last day or lies ahead,
/// earliest first
fn maintenance_outlook(events: Vec<HistoryEvent>, now: NaiveDateTime) -> Vec<MaintenanceEntry> {
    let horizon = now - Duration::hours(24);
    let mut windows: Vec<HistoryEvent> = events
        .into_iter()
        .filter(|e| e.event_type == EventType::Maintenance && !e.resolved && e.date > horizon)
        .collect();
    windows.sort_by_key(|e| e.date);

    windows
        .into_iter()
        .take(MAINTENANCE_SHOWN)
        .map(|event| MaintenanceEntry {
            phase: if event.date <= now {
                MaintenancePhase::Current
            } else {
                MaintenancePhase::Upcoming
            },
            event,
        })
        .collect()
}

impl DashboardService {
    pub fn new(repository: Repository, status: StatusService) -> Self {
        Self { repository, status }
    }

    pub async fn summary(&self) -> DashboardSummary {
        let now = self.status.now();
        DashboardSummary {
            tools: self.repository.tools.list().await,
            consumables_due: self.repository.consumables.due().await,
            maintenance: maintenance_outlook(self.repository.events.list(None).await, now),
        }
    }
}
