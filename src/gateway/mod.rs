//! Task mutation gateway.
//!
//! Builds and validates the payloads sent to the task API. Validation
//! failures are caught here, before any network dispatch. The gateway also
//! enforces at-most-one-in-flight mutation per task id: a second request
//! for a task with one pending is rejected synchronously with a busy
//! error, never queued or silently dropped.
//!
//! Role policy: only an admin session may reassign a task to a different
//! user. A non-admin update keeps the existing assignee regardless of what
//! the form carries (defense-in-depth; the server remains authoritative).

use crate::models::{Task, TaskPriority, TaskStatus};
use crate::{Error, Result};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::{Mutex, OnceLock};

/// Raw form input for task create/update, as collected from the CLI.
///
/// Status, priority, and assignee arrive as strings and are parsed here so
/// a bad value surfaces as a validation error rather than a silent default.
#[derive(Debug, Clone, Default)]
pub struct TaskForm {
    pub title: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub priority: Option<String>,
    pub status: Option<String>,
    pub assignee: Option<String>,
}

/// Full-field task payload for `POST /tasks` and `PUT /tasks/{id}`.
///
/// Dates serialize as `YYYY-MM-DD` calendar-date strings, never timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskPayload {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    pub assignee_id: i64,
}

/// Status-only payload for `PATCH /tasks/{id}/status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusPayload {
    pub status: TaskStatus,
}

/// Build a creation payload from form input.
///
/// Requires a non-empty (trimmed) title, an assignee, and a date range
/// with start <= end. Priority defaults to `medium` when omitted; status
/// is always forced to `pending` on create.
pub fn build_create_payload(form: &TaskForm) -> Result<TaskPayload> {
    let title = require_title(form.title.as_deref())?;
    let (start_date, end_date) = require_date_range(form.start_date, form.end_date)?;
    let assignee_id = parse_assignee(
        form.assignee
            .as_deref()
            .ok_or_else(|| Error::Validation("an assignee is required".to_string()))?,
    )?;
    let priority = parse_priority(form.priority.as_deref())?.unwrap_or_default();

    Ok(TaskPayload {
        title,
        description: none_if_blank(form.description.clone()),
        start_date,
        end_date,
        priority,
        status: TaskStatus::Pending,
        assignee_id,
    })
}

/// Build a full-field update payload, filling omitted fields from the
/// existing task. Partial omission is not supported on the wire for full
/// edits; the lightweight path is `build_status_payload`.
///
/// When `admin` is false an attempted reassignment is ignored and the
/// existing assignee is kept.
pub fn build_update_payload(existing: &Task, form: &TaskForm, admin: bool) -> Result<TaskPayload> {
    let title = match form.title.as_deref() {
        Some(t) => require_title(Some(t))?,
        None => existing.title.clone(),
    };

    let start_date = form.start_date.unwrap_or(existing.start_date);
    let end_date = form.end_date.unwrap_or(existing.end_date);
    let (start_date, end_date) = require_date_range(Some(start_date), Some(end_date))?;

    let assignee_id = match form.assignee.as_deref() {
        Some(raw) if admin => parse_assignee(raw)?,
        // Non-admin sessions cannot reassign; keep the current assignee
        _ => existing.assignee.id,
    };

    let priority = parse_priority(form.priority.as_deref())?.unwrap_or(existing.priority);
    let status = parse_status(form.status.as_deref())?.unwrap_or(existing.status);

    let description = match form.description.clone() {
        Some(d) => none_if_blank(Some(d)),
        None => existing.description.clone(),
    };

    Ok(TaskPayload {
        title,
        description,
        start_date,
        end_date,
        priority,
        status,
        assignee_id,
    })
}

/// Build the status-only transition payload (used by "mark complete").
pub fn build_status_payload(status: TaskStatus) -> StatusPayload {
    StatusPayload { status }
}

fn require_title(title: Option<&str>) -> Result<String> {
    let trimmed = title.unwrap_or("").trim();
    if trimmed.is_empty() {
        return Err(Error::Validation("a task title is required".to_string()));
    }
    Ok(trimmed.to_string())
}

fn require_date_range(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<(NaiveDate, NaiveDate)> {
    let (Some(start), Some(end)) = (start, end) else {
        return Err(Error::Validation(
            "both a start date and an end date are required".to_string(),
        ));
    };
    if start > end {
        return Err(Error::Validation(format!(
            "start date {} is after end date {}",
            start, end
        )));
    }
    Ok((start, end))
}

fn parse_assignee(raw: &str) -> Result<i64> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| Error::Validation(format!("invalid assignee id '{}'", raw)))
}

fn parse_priority(raw: Option<&str>) -> Result<Option<TaskPriority>> {
    raw.map(|s| s.parse::<TaskPriority>().map_err(Error::Validation))
        .transpose()
}

fn parse_status(raw: Option<&str>) -> Result<Option<TaskStatus>> {
    raw.map(|s| s.parse::<TaskStatus>().map_err(Error::Validation))
        .transpose()
}

fn none_if_blank(s: Option<String>) -> Option<String> {
    s.filter(|v| !v.trim().is_empty())
}

/// Tracks task ids with a mutating request outstanding.
///
/// `begin` takes the id; the returned guard releases it on drop, so an
/// error path never leaves a task id wedged.
#[derive(Debug, Default)]
pub struct InflightTracker {
    pending: Mutex<HashSet<i64>>,
}

impl InflightTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `task_id` for a mutation.
    ///
    /// Fails with `Error::Busy` when a mutation for the same id is already
    /// outstanding.
    pub fn begin(&self, task_id: i64) -> Result<InflightGuard<'_>> {
        let mut pending = self
            .pending
            .lock()
            .map_err(|_| Error::Other("in-flight tracker poisoned".to_string()))?;
        if !pending.insert(task_id) {
            return Err(Error::Busy(task_id));
        }
        Ok(InflightGuard {
            tracker: self,
            task_id,
        })
    }
}

/// RAII claim on a task id; dropping it releases the id.
#[derive(Debug)]
pub struct InflightGuard<'a> {
    tracker: &'a InflightTracker,
    task_id: i64,
}

impl Drop for InflightGuard<'_> {
    fn drop(&mut self) {
        if let Ok(mut pending) = self.tracker.pending.lock() {
            pending.remove(&self.task_id);
        }
    }
}

/// Process-wide in-flight tracker shared by all mutation paths.
pub fn inflight() -> &'static InflightTracker {
    static TRACKER: OnceLock<InflightTracker> = OnceLock::new();
    TRACKER.get_or_init(InflightTracker::new)
}
