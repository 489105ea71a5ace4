//! Tool model

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::{enums::ToolStatus, timestamp};

/// Status fields computed from the event log.
///
/// Only the status engine writes these; a `Tool` exposes them read-only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ToolDerivedStatus {
    #[serde(default)]
    pub status: ToolStatus,
    #[serde(default)]
    pub has_issues: bool,
    #[serde(default)]
    pub has_maintenance: bool,
    /// Start of the surfaced maintenance window
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "timestamp::option"
    )]
    #[schema(value_type = Option<String>, example = "2023-04-07T09:00:00")]
    pub maintenance_start: Option<NaiveDateTime>,
    /// End of the surfaced maintenance window (open-ended when absent)
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "timestamp::option"
    )]
    #[schema(value_type = Option<String>, example = "2023-04-14T17:00:00")]
    pub maintenance_end: Option<NaiveDateTime>,
}

/// Tool (instrument) record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    pub id: i32,
    /// Unique display name; events and consumables reference the tool by it
    pub name: String,
    pub last_updated: NaiveDate,
    #[serde(flatten)]
    derived: ToolDerivedStatus,
}

impl Tool {
    pub fn new(id: i32, name: impl Into<String>, last_updated: NaiveDate) -> Self {
        Self {
            id,
            name: name.into(),
            last_updated,
            derived: ToolDerivedStatus::default(),
        }
    }

    pub fn derived(&self) -> &ToolDerivedStatus {
        &self.derived
    }

    pub fn status(&self) -> ToolStatus {
        self.derived.status
    }

    pub fn has_issues(&self) -> bool {
        self.derived.has_issues
    }

    pub fn has_maintenance(&self) -> bool {
        self.derived.has_maintenance
    }

    pub(crate) fn set_derived(&mut self, derived: ToolDerivedStatus) {
        self.derived = derived;
    }
}

/// Create tool request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateTool {
    #[validate(length(min = 1, max = 200, message = "Tool name must not be empty"))]
    pub name: String,
}

/// Rename tool request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RenameTool {
    #[validate(length(min = 1, max = 200, message = "Tool name must not be empty"))]
    pub name: String,
}
