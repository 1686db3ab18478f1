//! Data models for Taskboard entities.
//!
//! This module defines the core data structures:
//! - `User` - An account with an admin capability flag
//! - `Task` - Assigned work with a date range, priority, and status
//! - `Session` - Auth token plus the cached authenticated user
//! - `FilterCriteria` - Transient query narrowing a task list for display
//!
//! All wire dates are day-granularity calendar dates (`YYYY-MM-DD`).
//! Timestamps never cross the comparison boundary: values arriving with a
//! time-of-day component are truncated to the calendar day at parse time.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Task status in the workflow.
///
/// `pending → in_progress → completed`; `overdue` is time-based and set
/// externally. The server is the authority on transitions, but the client
/// only ever sends one of these four values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Overdue,
}

impl TaskStatus {
    /// Sort weight: more urgent statuses sort first under descending order.
    pub fn weight(&self) -> u8 {
        match self {
            TaskStatus::Overdue => 4,
            TaskStatus::Pending => 3,
            TaskStatus::InProgress => 2,
            TaskStatus::Completed => 1,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
            TaskStatus::Overdue => "overdue",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TaskStatus::Pending),
            "in_progress" => Ok(TaskStatus::InProgress),
            "completed" => Ok(TaskStatus::Completed),
            "overdue" => Ok(TaskStatus::Overdue),
            _ => Err(format!(
                "Unknown status '{}' (expected pending, in_progress, completed, or overdue)",
                s
            )),
        }
    }
}

/// Task priority level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

impl TaskPriority {
    /// Sort weight: high before medium before low under descending order.
    pub fn weight(&self) -> u8 {
        match self {
            TaskPriority::High => 3,
            TaskPriority::Medium => 2,
            TaskPriority::Low => 1,
        }
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskPriority::Low => "low",
            TaskPriority::Medium => "medium",
            TaskPriority::High => "high",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for TaskPriority {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "low" => Ok(TaskPriority::Low),
            "medium" => Ok(TaskPriority::Medium),
            "high" => Ok(TaskPriority::High),
            _ => Err(format!(
                "Unknown priority '{}' (expected low, medium, or high)",
                s
            )),
        }
    }
}

/// A user account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Server-assigned identifier
    pub id: i64,

    /// Display name
    pub name: String,

    /// Login email
    pub email: String,

    /// Admin capability flag. Absent on the wire means `false`; a session
    /// is never treated as admin on missing data.
    #[serde(default)]
    pub is_admin: bool,
}

/// A unit of assigned work, render-ready after wire-date validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Server-assigned identifier
    pub id: i64,

    /// Task title (non-empty)
    pub title: String,

    /// Detailed description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// First calendar day the task is active
    pub start_date: NaiveDate,

    /// Last calendar day the task is active (inclusive, >= start_date)
    pub end_date: NaiveDate,

    /// Priority level
    #[serde(default)]
    pub priority: TaskPriority,

    /// Current status
    #[serde(default)]
    pub status: TaskStatus,

    /// The user this task is assigned to
    pub assignee: User,
}

impl Task {
    /// True iff `date` falls within the task's inclusive day range.
    pub fn active_on(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}

/// Raw task record as received from the API, before date validation.
///
/// Dates stay as strings here so a single malformed record degrades to a
/// data-quality warning instead of failing the whole fetch.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskRecord {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub start_date: String,
    pub end_date: String,
    #[serde(default)]
    pub priority: TaskPriority,
    #[serde(default)]
    pub status: TaskStatus,
    pub assignee: User,
}

impl TaskRecord {
    /// Validate wire dates and produce a typed task.
    ///
    /// Returns a warning message instead when either date is unparseable.
    pub fn into_task(self) -> std::result::Result<Task, String> {
        let start = parse_wire_date(&self.start_date).ok_or_else(|| {
            format!(
                "task {} \"{}\": unparseable start date '{}'",
                self.id, self.title, self.start_date
            )
        })?;
        let end = parse_wire_date(&self.end_date).ok_or_else(|| {
            format!(
                "task {} \"{}\": unparseable end date '{}'",
                self.id, self.title, self.end_date
            )
        })?;
        Ok(Task {
            id: self.id,
            title: self.title,
            description: self.description,
            start_date: start,
            end_date: end,
            priority: self.priority,
            status: self.status,
            assignee: self.assignee,
        })
    }
}

/// Parse a wire date at day granularity.
///
/// Accepts a plain `YYYY-MM-DD` calendar date, and tolerates backends that
/// leak a full timestamp by truncating it to its calendar day. Returns
/// `None` for anything else.
pub fn parse_wire_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.date());
    }
    None
}

/// Convert raw records into typed tasks, collecting warnings for records
/// with malformed dates. Input order is preserved for the kept tasks.
pub fn hydrate_tasks(records: Vec<TaskRecord>) -> (Vec<Task>, Vec<String>) {
    let mut tasks = Vec::with_capacity(records.len());
    let mut warnings = Vec::new();
    for record in records {
        match record.into_task() {
            Ok(task) => tasks.push(task),
            Err(warning) => warnings.push(warning),
        }
    }
    (tasks, warnings)
}

/// Client-held proof of authentication plus cached identity/role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Opaque bearer token
    pub token: String,

    /// Cached copy of the authenticated user
    pub user: User,
}

/// Sort key for task list display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Ascending by end date
    DueDate,
    /// Descending by priority weight
    Priority,
    /// Descending by status weight
    Status,
    /// Lexicographic ascending
    Title,
}

impl std::str::FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "due_date" => Ok(SortKey::DueDate),
            "priority" => Ok(SortKey::Priority),
            "status" => Ok(SortKey::Status),
            "title" => Ok(SortKey::Title),
            _ => Err(format!(
                "Unknown sort key '{}' (expected due_date, priority, status, or title)",
                s
            )),
        }
    }
}

/// Transient query parameters narrowing a task list for display.
///
/// Absent criteria impose no constraint; present criteria compose with AND.
#[derive(Debug, Clone, Default)]
pub struct FilterCriteria {
    /// Keep tasks assigned to this user
    pub assignee_id: Option<i64>,

    /// Keep tasks in this status
    pub status: Option<TaskStatus>,

    /// Case-insensitive substring match on title and description
    pub search: Option<String>,

    /// Keep tasks whose day range intersects this inclusive range
    pub date_range: Option<(NaiveDate, NaiveDate)>,

    /// Stable sort applied after filtering; `None` preserves input order
    pub sort: Option<SortKey>,
}
