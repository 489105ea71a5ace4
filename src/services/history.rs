//! History workflows: issues, maintenance windows, recoveries
//!
//! Every mutation of the event log is followed by a status recompute.

use crate::{
    error::{AppError, AppResult},
    models::{
        event::{HistoryFilter, HistoryQuery, LogQuery, PerformRecovery, ReportIssue, ResolveEvent, ScheduleMaintenance},
        HistoryEvent, NewEvent, Tool,
    },
    repository::Repository,
};

use super::status::StatusService;

#[derive(Clone)]
pub struct HistoryService {
    repository: Repository,
    status: StatusService,
}

impl HistoryService {
    pub fn new(repository: Repository, status: StatusService) -> Self {
        Self { repository, status }
    }

    async fn tool(&self, tool_id: i32) -> AppResult<Tool> {
        self.repository
            .tools
            .get(tool_id)
            .await
            .ok_or_else(|| AppError::NotFound(format!("Tool with id {} not found", tool_id)))
    }

    /// Whole log, newest first
    pub async fn list(&self, query: LogQuery) -> AppResult<Vec<HistoryEvent>> {
        let filter = HistoryFilter::try_from(query).map_err(AppError::BadRequest)?;
        Ok(self.repository.events.list(Some(&filter)).await)
    }

    /// History of one tool, newest first
    pub async fn for_tool(&self, tool_id: i32, query: HistoryQuery) -> AppResult<Vec<HistoryEvent>> {
        let tool = self.tool(tool_id).await?;
        let filter = HistoryFilter::try_from(query).map_err(AppError::BadRequest)?;
        Ok(self.repository.events.search(&tool.name, &filter).await)
    }

    pub async fn report_issue(&self, tool_id: i32, request: ReportIssue, user: &str) -> AppResult<HistoryEvent> {
        let tool = self.tool(tool_id).await?;
        let event = NewEvent::issue(&tool.name, request.description, user, self.status.now())
            .with_screenshots(request.screenshots);
        let event = self.repository.events.add(event).await;
        tracing::info!("Issue {} reported on {} by {}", event.id, tool.name, user);
        self.status.recompute().await;
        Ok(event)
    }

    pub async fn schedule_maintenance(
        &self,
        tool_id: i32,
        request: ScheduleMaintenance,
        user: &str,
    ) -> AppResult<HistoryEvent> {
        if let Some(end) = request.end_date {
            if end <= request.start_date {
                return Err(AppError::Validation(
                    "Maintenance end must be after its start".to_string(),
                ));
            }
        }
        let tool = self.tool(tool_id).await?;
        let event = NewEvent::maintenance(
            &tool.name,
            format!("Scheduled maintenance: {}", request.description),
            user,
            request.start_date,
            request.end_date,
        );
        let event = self.repository.events.add(event).await;
        tracing::info!("Maintenance {} scheduled on {} from {}", event.id, tool.name, event.date);
        self.status.recompute().await;
        Ok(event)
    }

    /// Close the selected issues / maintenance windows of a tool.
    /// Returns the recovery events that were logged.
    pub async fn perform_recovery(&self, tool_id: i32, request: PerformRecovery) -> AppResult<Vec<HistoryEvent>> {
        if request.item_ids.is_empty() {
            return Err(AppError::Validation(
                "Select at least one issue or maintenance item".to_string(),
            ));
        }
        let tool = self.tool(tool_id).await?;
        let recoveries = self
            .repository
            .events
            .record_recovery(
                &tool.name,
                &request.item_ids,
                &request.description,
                &request.attended_by,
                self.status.now(),
            )
            .await;
        tracing::info!(
            "Recovery on {}: {} of {} item(s) closed",
            tool.name,
            recoveries.len(),
            request.item_ids.len()
        );
        self.status.recompute().await;
        Ok(recoveries)
    }

    /// Resolve an event; unknown or already-resolved ids are ignored
    pub async fn resolve(&self, id: i64, request: ResolveEvent) -> AppResult<()> {
        if self
            .repository
            .events
            .resolve(id, &request.resolution_steps, &request.resolved_by)
            .await
        {
            tracing::info!("Event {} resolved by {}", id, request.resolved_by);
        }
        self.status.recompute().await;
        Ok(())
    }

    /// Delete an event; unknown ids are ignored
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        if self.repository.events.delete(id).await {
            tracing::info!("Event {} deleted", id);
        }
        self.status.recompute().await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        clock::ManualClock,
        models::{timestamp, EventType, ToolStatus},
        storage::MemoryStorage,
    };
    use chrono::NaiveDate;
    use std::sync::Arc;

    async fn setup() -> (Repository, HistoryService, ManualClock, i32) {
        let repository = Repository::new(Arc::new(MemoryStorage::new()));
        let tool = repository
            .tools
            .add("FIB-01: Helios 600i", NaiveDate::from_ymd_opt(2023, 4, 1).unwrap())
            .await
            .unwrap();
        let clock = ManualClock::new(timestamp::parse("2023-04-10T00:00").unwrap());
        let status = StatusService::new(repository.clone(), Arc::new(clock.clone()));
        (repository.clone(), HistoryService::new(repository, status), clock, tool.id)
    }

    async fn status_of(repository: &Repository, id: i32) -> ToolStatus {
        repository.tools.get(id).await.unwrap().status()
    }

    fn issue(description: &str) -> ReportIssue {
        ReportIssue {
            description: description.to_string(),
            screenshots: vec!["beam.png".to_string()],
        }
    }

    #[tokio::test]
    async fn reporting_an_issue_takes_the_tool_down() {
        let (repository, history, _, id) = setup().await;
        let event = history.report_issue(id, issue("Beam drift"), "alice").await.unwrap();
        assert_eq!(event.event_type, EventType::Issue);
        assert_eq!(event.date, timestamp::parse("2023-04-10T00:00").unwrap());
        assert_eq!(event.screenshots, vec!["beam.png".to_string()]);
        assert_eq!(status_of(&repository, id).await, ToolStatus::Down);

        history
            .resolve(
                event.id,
                ResolveEvent {
                    resolution_steps: "Realigned".to_string(),
                    resolved_by: "lead".to_string(),
                },
            )
            .await
            .unwrap();
        assert_eq!(status_of(&repository, id).await, ToolStatus::Up);
    }

    #[tokio::test]
    async fn maintenance_is_prefixed_and_validated() {
        let (repository, history, _, id) = setup().await;
        let request = ScheduleMaintenance {
            description: "Column bake-out".to_string(),
            start_date: timestamp::parse("2023-04-07T09:00").unwrap(),
            end_date: timestamp::parse("2023-04-14T17:00"),
        };
        let event = history.schedule_maintenance(id, request, "lead").await.unwrap();
        assert_eq!(event.description, "Scheduled maintenance: Column bake-out");
        assert_eq!(status_of(&repository, id).await, ToolStatus::Maintenance);

        let backwards = ScheduleMaintenance {
            description: "x".to_string(),
            start_date: timestamp::parse("2023-04-14T17:00").unwrap(),
            end_date: timestamp::parse("2023-04-14T17:00"),
        };
        assert!(matches!(
            history.schedule_maintenance(id, backwards, "lead").await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn recovery_closes_items_and_recomputes() {
        let (repository, history, clock, id) = setup().await;
        let event = history.report_issue(id, issue("Vacuum leak"), "alice").await.unwrap();
        clock.advance(chrono::Duration::hours(2));

        let recoveries = history
            .perform_recovery(
                id,
                PerformRecovery {
                    item_ids: vec![event.id],
                    description: "Replaced gasket".to_string(),
                    attended_by: "tech".to_string(),
                },
            )
            .await
            .unwrap();
        assert_eq!(recoveries.len(), 1);
        assert_eq!(recoveries[0].date, timestamp::parse("2023-04-10T02:00").unwrap());
        assert_eq!(status_of(&repository, id).await, ToolStatus::Up);

        let all = history
            .for_tool(
                id,
                HistoryQuery {
                    include_resolved: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].event_type, EventType::Recovery);
    }

    #[tokio::test]
    async fn empty_recovery_selection_is_rejected() {
        let (_, history, _, id) = setup().await;
        let result = history
            .perform_recovery(
                id,
                PerformRecovery {
                    item_ids: vec![],
                    description: "x".to_string(),
                    attended_by: "y".to_string(),
                },
            )
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn deleting_the_issue_restores_up() {
        let (repository, history, _, id) = setup().await;
        let event = history.report_issue(id, issue("Noise"), "alice").await.unwrap();
        history.delete(event.id).await.unwrap();
        history.delete(event.id).await.unwrap();
        assert_eq!(status_of(&repository, id).await, ToolStatus::Up);
        assert!(history.for_tool(id, HistoryQuery::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_filter_type_is_a_bad_request() {
        let (_, history, _, _) = setup().await;
        let query = LogQuery {
            event_type: Some("outage".to_string()),
            ..Default::default()
        };
        assert!(matches!(history.list(query).await, Err(AppError::BadRequest(_))));
    }
}
