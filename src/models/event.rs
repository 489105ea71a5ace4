//! History event model (issues, maintenance windows, recoveries)

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::{enums::EventType, timestamp};

/// History event record as kept in the event log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEvent {
    pub id: i64,
    /// Name of the tool the event belongs to
    pub tool_name: String,
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub description: String,
    /// Report time for issues and recoveries, window start for maintenance
    #[serde(with = "timestamp")]
    #[schema(value_type = String, example = "2023-04-07T09:00:00")]
    pub date: NaiveDateTime,
    /// Maintenance window close; never set on issues
    #[serde(default, skip_serializing_if = "Option::is_none", with = "timestamp::option")]
    #[schema(value_type = Option<String>, example = "2023-04-14T17:00:00")]
    pub end_date: Option<NaiveDateTime>,
    pub user: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub screenshots: Vec<String>,
    #[serde(default)]
    pub resolved: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution_steps: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_by: Option<String>,
    /// Issue or maintenance event a recovery event closed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_item_id: Option<i64>,
}

impl HistoryEvent {
    /// Unresolved maintenance whose window contains `now` (start inclusive, end exclusive)
    pub fn is_active_maintenance(&self, now: NaiveDateTime) -> bool {
        self.event_type == EventType::Maintenance
            && !self.resolved
            && self.date <= now
            && self.end_date.map_or(true, |end| end > now)
    }

    pub fn is_unresolved_issue(&self) -> bool {
        self.event_type == EventType::Issue && !self.resolved
    }

    /// Whether a recovery may close this event at `now`
    pub fn is_recoverable(&self, now: NaiveDateTime) -> bool {
        matches!(self.event_type, EventType::Issue | EventType::Maintenance)
            && !self.resolved
            && self.date <= now
    }
}

/// An event before the log assigns it an id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEvent {
    pub tool_name: String,
    pub event_type: EventType,
    pub description: String,
    pub date: NaiveDateTime,
    pub end_date: Option<NaiveDateTime>,
    pub user: String,
    pub screenshots: Vec<String>,
    pub resolved_item_id: Option<i64>,
}

impl NewEvent {
    pub fn issue(
        tool_name: impl Into<String>,
        description: impl Into<String>,
        user: impl Into<String>,
        date: NaiveDateTime,
    ) -> Self {
        Self {
            tool_name: tool_name.into(),
            event_type: EventType::Issue,
            description: description.into(),
            date,
            end_date: None,
            user: user.into(),
            screenshots: Vec::new(),
            resolved_item_id: None,
        }
    }

    pub fn maintenance(
        tool_name: impl Into<String>,
        description: impl Into<String>,
        user: impl Into<String>,
        start: NaiveDateTime,
        end: Option<NaiveDateTime>,
    ) -> Self {
        Self {
            tool_name: tool_name.into(),
            event_type: EventType::Maintenance,
            description: description.into(),
            date: start,
            end_date: end,
            user: user.into(),
            screenshots: Vec::new(),
            resolved_item_id: None,
        }
    }

    pub fn recovery(
        tool_name: impl Into<String>,
        description: impl Into<String>,
        user: impl Into<String>,
        date: NaiveDateTime,
        resolved_item_id: i64,
    ) -> Self {
        Self {
            tool_name: tool_name.into(),
            event_type: EventType::Recovery,
            description: description.into(),
            date,
            end_date: None,
            user: user.into(),
            screenshots: Vec::new(),
            resolved_item_id: Some(resolved_item_id),
        }
    }

    pub fn with_screenshots(mut self, screenshots: Vec<String>) -> Self {
        self.screenshots = screenshots;
        self
    }

    pub(crate) fn into_event(self, id: i64) -> HistoryEvent {
        HistoryEvent {
            id,
            tool_name: self.tool_name,
            event_type: self.event_type,
            description: self.description,
            date: self.date,
            // Only maintenance windows carry an end
            end_date: match self.event_type {
                EventType::Maintenance => self.end_date,
                _ => None,
            },
            user: self.user,
            screenshots: self.screenshots,
            resolved: false,
            resolution_steps: None,
            resolved_by: None,
            resolved_item_id: self.resolved_item_id,
        }
    }
}

/// Report issue request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ReportIssue {
    #[validate(length(min = 1, message = "Issue description is required"))]
    pub description: String,
    /// Screenshot references (URLs or file names)
    #[serde(default)]
    pub screenshots: Vec<String>,
}

/// Schedule maintenance request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ScheduleMaintenance {
    #[validate(length(min = 1, message = "Maintenance description is required"))]
    pub description: String,
    /// Window start (YYYY-MM-DDTHH:MM)
    #[serde(with = "timestamp")]
    #[schema(value_type = String, example = "2023-04-07T09:00")]
    pub start_date: NaiveDateTime,
    /// Window end (YYYY-MM-DDTHH:MM); open-ended when omitted
    #[serde(default, with = "timestamp::option")]
    #[schema(value_type = Option<String>, example = "2023-04-14T17:00")]
    pub end_date: Option<NaiveDateTime>,
}

/// Perform recovery request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct PerformRecovery {
    /// Issue / maintenance event ids being recovered
    #[validate(length(min = 1, message = "Select at least one issue or maintenance item"))]
    pub item_ids: Vec<i64>,
    #[validate(length(min = 1, message = "Recovery description is required"))]
    pub description: String,
    #[validate(length(min = 1, message = "Attended by is required"))]
    pub attended_by: String,
}

/// Resolve event request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ResolveEvent {
    #[validate(length(min = 1, message = "Resolution steps are required"))]
    pub resolution_steps: String,
    #[validate(length(min = 1, message = "Resolved by is required"))]
    pub resolved_by: String,
}

/// Query parameters for a tool's history
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct HistoryQuery {
    /// "all" (default), "issue", "maintenance" or "recovery"
    #[serde(rename = "type")]
    pub event_type: Option<String>,
    /// Include resolved events (default false)
    pub include_resolved: Option<bool>,
    /// Free-text search on description, user, resolver and dates
    pub search: Option<String>,
    /// Only events dated on or after this day (YYYY-MM-DD)
    pub start_date: Option<NaiveDate>,
    /// Only events dated on or before this day (YYYY-MM-DD)
    pub end_date: Option<NaiveDate>,
}

/// Query parameters for the whole event log
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct LogQuery {
    /// Only events of these tools (repeat the parameter); every tool when omitted
    #[serde(default)]
    pub tools: Vec<String>,
    /// "all" (default), "issue", "maintenance" or "recovery"
    #[serde(rename = "type")]
    pub event_type: Option<String>,
    /// Include resolved events (default true)
    pub include_resolved: Option<bool>,
    /// Free-text search on description, user, resolver and dates
    pub search: Option<String>,
    /// Only events dated on or after this day (YYYY-MM-DD)
    pub start_date: Option<NaiveDate>,
    /// Only events dated on or before this day (YYYY-MM-DD)
    pub end_date: Option<NaiveDate>,
}

/// Parsed history filter
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryFilter {
    /// Empty means every tool
    pub tools: Vec<String>,
    pub event_type: Option<EventType>,
    pub include_resolved: bool,
    pub search: Option<String>,
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
}

impl HistoryFilter {
    pub fn matches(&self, event: &HistoryEvent) -> bool {
        if !self.tools.is_empty() && !self.tools.iter().any(|t| *t == event.tool_name) {
            return false;
        }
        if let Some(t) = self.event_type {
            if event.event_type != t {
                return false;
            }
        }
        if !self.include_resolved && event.resolved {
            return false;
        }
        if let Some(term) = self.search.as_deref().filter(|t| !t.is_empty()) {
            let needle = term.to_lowercase();
            let date_text = timestamp::format(&event.date);
            let end_text = event.end_date.as_ref().map(timestamp::format);
            let hit = event.description.to_lowercase().contains(&needle)
                || date_text.contains(term)
                || end_text.map_or(false, |e| e.contains(term))
                || event.user.to_lowercase().contains(&needle)
                || event
                    .resolved_by
                    .as_ref()
                    .map_or(false, |r| r.to_lowercase().contains(&needle));
            if !hit {
                return false;
            }
        }
        if let Some(start) = self.start {
            if event.date < start {
                return false;
            }
        }
        if let Some(end) = self.end {
            if event.date > end {
                return false;
            }
        }
        true
    }
}

fn parse_type(raw: Option<&str>) -> Result<Option<EventType>, String> {
    match raw {
        None | Some("") | Some("all") => Ok(None),
        Some(other) => other.parse::<EventType>().map(Some),
    }
}

fn day_start(day: Option<NaiveDate>) -> Option<NaiveDateTime> {
    day.and_then(|d| d.and_hms_opt(0, 0, 0))
}

fn day_end(day: Option<NaiveDate>) -> Option<NaiveDateTime> {
    day.and_then(|d| d.and_hms_opt(23, 59, 59))
}

/// One tool's history hides resolved events unless asked
impl TryFrom<HistoryQuery> for HistoryFilter {
    type Error = String;

    fn try_from(query: HistoryQuery) -> Result<Self, Self::Error> {
        Ok(Self {
            tools: Vec::new(),
            event_type: parse_type(query.event_type.as_deref())?,
            include_resolved: query.include_resolved.unwrap_or(false),
            search: query.search,
            start: day_start(query.start_date),
            end: day_end(query.end_date),
        })
    }
}

/// The whole log shows resolved events unless told otherwise
impl TryFrom<LogQuery> for HistoryFilter {
    type Error = String;

    fn try_from(query: LogQuery) -> Result<Self, Self::Error> {
        Ok(Self {
            tools: query.tools,
            event_type: parse_type(query.event_type.as_deref())?,
            include_resolved: query.include_resolved.unwrap_or(true),
            search: query.search,
            start: day_start(query.start_date),
            end: day_end(query.end_date),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> NaiveDateTime {
        timestamp::parse(s).unwrap()
    }

    fn maintenance(start: &str, end: Option<&str>) -> HistoryEvent {
        NewEvent::maintenance("FIB-01", "Scheduled maintenance: column bake", "lead", at(start), end.map(at))
            .into_event(1)
    }

    #[test]
    fn maintenance_window_is_start_inclusive_end_exclusive() {
        let event = maintenance("2023-04-07T09:00", Some("2023-04-14T17:00"));
        assert!(!event.is_active_maintenance(at("2023-04-07T08:59")));
        assert!(event.is_active_maintenance(at("2023-04-07T09:00")));
        assert!(event.is_active_maintenance(at("2023-04-14T16:59")));
        assert!(!event.is_active_maintenance(at("2023-04-14T17:00")));
    }

    #[test]
    fn open_ended_maintenance_stays_active() {
        let event = maintenance("2023-04-07T09:00", None);
        assert!(event.is_active_maintenance(at("2030-01-01T00:00")));
    }

    #[test]
    fn issues_never_carry_an_end_date() {
        let mut draft = NewEvent::issue("FIB-01", "Beam drift", "user", at("2023-04-07T09:00"));
        draft.end_date = Some(at("2023-04-08T09:00"));
        assert_eq!(draft.into_event(7).end_date, None);
    }

    #[test]
    fn reads_dashboard_history_items() {
        let raw = r#"{"id": 1681120000000, "toolName": "FIB-04: G4", "type": "issue",
            "description": "Stage stuck", "date": "2023-04-10T10:00:00.000Z", "user": "Current User"}"#;
        let event: HistoryEvent = serde_json::from_str(raw).unwrap();
        assert_eq!(event.event_type, EventType::Issue);
        assert!(!event.resolved);
        assert!(event.is_unresolved_issue());
    }

    #[test]
    fn filter_hides_resolved_by_default_and_searches_case_insensitively() {
        let mut event = NewEvent::issue("FIB-01", "Vacuum LEAK", "alice", at("2023-04-07T09:00")).into_event(1);
        let filter = HistoryFilter {
            search: Some("leak".to_string()),
            ..Default::default()
        };
        assert!(filter.matches(&event));

        event.resolved = true;
        assert!(!filter.matches(&event));
        let with_resolved = HistoryFilter {
            include_resolved: true,
            ..filter
        };
        assert!(with_resolved.matches(&event));
    }

    #[test]
    fn filter_from_query_rejects_unknown_types() {
        let query = HistoryQuery {
            event_type: Some("outage".to_string()),
            ..Default::default()
        };
        assert!(HistoryFilter::try_from(query).is_err());
    }

    #[test]
    fn filter_date_range_covers_whole_days() {
        let event = NewEvent::issue("FIB-01", "x", "u", at("2023-04-07T22:00")).into_event(1);
        let filter = HistoryFilter::try_from(HistoryQuery {
            start_date: NaiveDate::from_ymd_opt(2023, 4, 7),
            end_date: NaiveDate::from_ymd_opt(2023, 4, 7),
            ..Default::default()
        })
        .unwrap();
        assert!(filter.matches(&event));
    }

    #[test]
    fn whole_log_shows_resolved_events_and_narrows_to_selected_tools() {
        let mut event = NewEvent::issue("FIB-04: G4", "Stage stuck", "u", at("2023-04-09T08:00")).into_event(1);
        event.resolved = true;

        let everything = HistoryFilter::try_from(LogQuery::default()).unwrap();
        assert!(everything.matches(&event));

        let selected = HistoryFilter::try_from(LogQuery {
            tools: vec!["FIB-01: Helios 600i".to_string(), "FIB-04: G4".to_string()],
            ..Default::default()
        })
        .unwrap();
        assert!(selected.matches(&event));

        let others = HistoryFilter::try_from(LogQuery {
            tools: vec!["TEM02 - Talos01".to_string()],
            ..Default::default()
        })
        .unwrap();
        assert!(!others.matches(&event));

        // One tool's history still hides it
        let per_tool = HistoryFilter::try_from(HistoryQuery::default()).unwrap();
        assert!(!per_tool.matches(&event));
    }
}
