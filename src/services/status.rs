//! Tool status engine
//!
//! A tool's status is a pure function of the event log and the wall clock:
//!
//! 1. an unresolved maintenance event whose window contains `now` puts the tool
//!    in `Maintenance`;
//! 2. otherwise any unresolved issue puts it `Down`;
//! 3. otherwise it is `Up`.
//!
//! `hasIssues` is reported independently of the status, so a tool under
//! maintenance still flags its open issues. When several maintenance windows
//! are active, the first one in log order (newest first) is surfaced.

use std::sync::Arc;

use chrono::NaiveDateTime;

use crate::{
    clock::Clock,
    models::{HistoryEvent, ToolDerivedStatus, ToolStatus},
    repository::Repository,
};

/// Derive the status fields of `tool_name` at `now`
pub fn derive_status(events: &[HistoryEvent], tool_name: &str, now: NaiveDateTime) -> ToolDerivedStatus {
    let mut window: Option<&HistoryEvent> = None;
    let mut has_issues = false;

    for event in events.iter().filter(|e| e.tool_name == tool_name) {
        if window.is_none() && event.is_active_maintenance(now) {
            window = Some(event);
        }
        if event.is_unresolved_issue() {
            has_issues = true;
        }
    }

    let status = match (window, has_issues) {
        (Some(_), _) => ToolStatus::Maintenance,
        (None, true) => ToolStatus::Down,
        (None, false) => ToolStatus::Up,
    };

    ToolDerivedStatus {
        status,
        has_issues,
        has_maintenance: window.is_some(),
        maintenance_start: window.map(|e| e.date),
        maintenance_end: window.and_then(|e| e.end_date),
    }
}

#[derive(Clone)]
pub struct StatusService {
    repository: Repository,
    clock: Arc<dyn Clock>,
}

impl StatusService {
    pub fn new(repository: Repository, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }

    pub fn now(&self) -> NaiveDateTime {
        self.clock.now()
    }

    /// Rewrite every tool's derived fields at the current time.
    /// Returns the number of tools whose status changed.
    pub async fn recompute(&self) -> usize {
        self.recompute_at(self.clock.now()).await
    }

    pub async fn recompute_at(&self, now: NaiveDateTime) -> usize {
        let changed = self
            .repository
            .apply_derived_status(|events, name| derive_status(events, name, now))
            .await;
        if changed > 0 {
            tracing::info!("Status recompute at {}: {} tool(s) changed", now, changed);
        } else {
            tracing::trace!("Status recompute at {}: no change", now);
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        clock::ManualClock,
        models::{timestamp, NewEvent},
        repository::events::EventLog,
        storage::MemoryStorage,
    };
    use chrono::{Duration, NaiveDate};

    fn at(s: &str) -> NaiveDateTime {
        timestamp::parse(s).unwrap()
    }

    const TOOL: &str = "FIB-01: Helios 600i";

    fn window(log: &mut EventLog, start: &str, end: Option<&str>) -> HistoryEvent {
        log.add(NewEvent::maintenance(TOOL, "PM", "lead", at(start), end.map(at)))
    }

    #[test]
    fn no_events_means_up() {
        let derived = derive_status(&[], TOOL, at("2023-04-10T00:00"));
        assert_eq!(derived, ToolDerivedStatus::default());
        assert_eq!(derived.status, ToolStatus::Up);
    }

    #[test]
    fn scheduled_window_comes_and_goes() {
        let mut log = EventLog::default();
        window(&mut log, "2023-04-07T09:00", Some("2023-04-14T17:00"));

        let during = derive_status(log.events(), TOOL, at("2023-04-10T00:00"));
        assert_eq!(during.status, ToolStatus::Maintenance);
        assert!(during.has_maintenance);
        assert_eq!(during.maintenance_start, Some(at("2023-04-07T09:00")));
        assert_eq!(during.maintenance_end, Some(at("2023-04-14T17:00")));

        let after = derive_status(log.events(), TOOL, at("2023-04-15T00:00"));
        assert_eq!(after, ToolDerivedStatus::default());
    }

    #[test]
    fn window_start_is_inclusive_and_end_exclusive() {
        let mut log = EventLog::default();
        window(&mut log, "2023-04-07T09:00", Some("2023-04-14T17:00"));

        let before = derive_status(log.events(), TOOL, at("2023-04-07T08:59"));
        let start = derive_status(log.events(), TOOL, at("2023-04-07T09:00"));
        let end = derive_status(log.events(), TOOL, at("2023-04-14T17:00"));
        assert_eq!(before.status, ToolStatus::Up);
        assert_eq!(start.status, ToolStatus::Maintenance);
        assert_eq!(end.status, ToolStatus::Up);
    }

    #[test]
    fn open_ended_window_stays_active() {
        let mut log = EventLog::default();
        window(&mut log, "2023-04-07T09:00", None);
        let derived = derive_status(log.events(), TOOL, at("2030-01-01T00:00"));
        assert_eq!(derived.status, ToolStatus::Maintenance);
        assert_eq!(derived.maintenance_end, None);
    }

    #[test]
    fn maintenance_outranks_issues_but_keeps_the_flag() {
        let mut log = EventLog::default();
        log.add(NewEvent::issue(TOOL, "Vacuum leak", "u", at("2023-04-08T10:00")));
        window(&mut log, "2023-04-07T09:00", Some("2023-04-14T17:00"));

        let derived = derive_status(log.events(), TOOL, at("2023-04-10T00:00"));
        assert_eq!(derived.status, ToolStatus::Maintenance);
        assert!(derived.has_issues);
        assert!(derived.has_maintenance);
    }

    #[test]
    fn resolving_the_last_issue_brings_the_tool_up() {
        let mut log = EventLog::default();
        let issue = log.add(NewEvent::issue(TOOL, "Stage stuck", "u", at("2023-04-08T10:00")));
        let now = at("2023-04-10T00:00");

        let down = derive_status(log.events(), TOOL, now);
        assert_eq!(down.status, ToolStatus::Down);
        assert!(down.has_issues);

        log.resolve(issue.id, "Reseated stage", "lead");
        let up = derive_status(log.events(), TOOL, now);
        assert_eq!(up.status, ToolStatus::Up);
        assert!(!up.has_issues);
    }

    #[test]
    fn resolved_maintenance_and_other_tools_are_ignored() {
        let mut log = EventLog::default();
        let pm = window(&mut log, "2023-04-07T09:00", None);
        log.resolve(pm.id, "done early", "lead");
        log.add(NewEvent::issue("FIB-04: G4", "x", "u", at("2023-04-08T10:00")));

        let derived = derive_status(log.events(), TOOL, at("2023-04-10T00:00"));
        assert_eq!(derived, ToolDerivedStatus::default());
    }

    #[test]
    fn newest_active_window_is_surfaced() {
        let mut log = EventLog::default();
        window(&mut log, "2023-04-07T09:00", Some("2023-04-20T17:00"));
        window(&mut log, "2023-04-09T09:00", Some("2023-04-11T17:00"));

        let derived = derive_status(log.events(), TOOL, at("2023-04-10T00:00"));
        assert_eq!(derived.maintenance_start, Some(at("2023-04-09T09:00")));
    }

    #[tokio::test]
    async fn recompute_is_idempotent() {
        let repository = Repository::new(Arc::new(MemoryStorage::new()));
        let today = NaiveDate::from_ymd_opt(2023, 4, 10).unwrap();
        repository.tools.add(TOOL, today).await.unwrap();
        repository
            .events
            .add(NewEvent::issue(TOOL, "Beam drift", "u", at("2023-04-09T10:00")))
            .await;

        let clock = ManualClock::new(at("2023-04-10T00:00"));
        let service = StatusService::new(repository.clone(), Arc::new(clock.clone()));

        assert_eq!(service.recompute().await, 1);
        let first = repository.tools.list().await;
        assert_eq!(service.recompute().await, 0);
        assert_eq!(repository.tools.list().await, first);
        assert_eq!(first[0].status(), ToolStatus::Down);
    }

    #[tokio::test]
    async fn recompute_follows_the_clock() {
        let repository = Repository::new(Arc::new(MemoryStorage::new()));
        let today = NaiveDate::from_ymd_opt(2023, 4, 7).unwrap();
        repository.tools.add(TOOL, today).await.unwrap();
        repository
            .events
            .add(NewEvent::maintenance(
                TOOL,
                "Scheduled maintenance: column bake-out",
                "lead",
                at("2023-04-07T09:00"),
                Some(at("2023-04-14T17:00")),
            ))
            .await;

        let clock = ManualClock::new(at("2023-04-10T00:00"));
        let service = StatusService::new(repository.clone(), Arc::new(clock.clone()));

        service.recompute().await;
        assert_eq!(repository.tools.get_by_name(TOOL).await.unwrap().status(), ToolStatus::Maintenance);

        clock.advance(Duration::days(5));
        service.recompute().await;
        let tool = repository.tools.get_by_name(TOOL).await.unwrap();
        assert_eq!(tool.status(), ToolStatus::Up);
        assert!(!tool.has_maintenance());
        assert!(tool.derived().maintenance_start.is_none());
    }
}
