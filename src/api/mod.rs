//! REST client for the task-assignment backend.
//!
//! Thin wrapper over `ureq` with bearer auth and a configured timeout.
//! Error mapping follows the client taxonomy:
//! - 401 clears the persisted session (once, globally) and the original
//!   request is never retried
//! - 404 on task delete is treated as already-successful
//! - timeouts and transport failures surface as network errors, no retry
//! - other 4xx/5xx surface the server-provided `detail` message verbatim
//!   when the body carries one

use crate::config::Config;
use crate::models::{hydrate_tasks, Session, Task, TaskRecord, TaskStatus, User};
use crate::session::SessionStore;
use crate::gateway::{StatusPayload, TaskPayload};
use crate::{Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Server-side task query parameters for `GET /tasks`.
///
/// Mirrors the client-side `FilterCriteria` minus the sort key, which is
/// applied locally.
#[derive(Debug, Clone, Default)]
pub struct TaskQuery {
    pub assignee_id: Option<i64>,
    pub status: Option<TaskStatus>,
    pub search: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl TaskQuery {
    /// Flatten into query-string pairs; absent criteria emit nothing.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(id) = self.assignee_id {
            params.push(("assignee_id", id.to_string()));
        }
        if let Some(status) = self.status {
            params.push(("status", status.to_string()));
        }
        if let Some(search) = self.search.as_deref() {
            if !search.is_empty() {
                params.push(("search", search.to_string()));
            }
        }
        if let Some(date) = self.start_date {
            params.push(("start_date", date.format("%Y-%m-%d").to_string()));
        }
        if let Some(date) = self.end_date {
            params.push(("end_date", date.format("%Y-%m-%d").to_string()));
        }
        params
    }
}

/// Payload for user create/update (admin surface).
#[derive(Debug, Clone, Serialize)]
pub struct UserPayload {
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub is_admin: bool,
}

/// Response from `POST /auth/login` (only fields we care about).
#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
    user: User,
}

/// Outcome of a task delete; 404 means the task was already gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteOutcome {
    pub already_gone: bool,
}

/// Typed list fetch result: render-ready tasks plus data-quality warnings
/// for records whose wire dates failed to parse.
#[derive(Debug, Clone)]
pub struct TaskFetch {
    pub tasks: Vec<Task>,
    pub warnings: Vec<String>,
}

/// HTTP client bound to one backend and one session store.
pub struct ApiClient {
    agent: ureq::Agent,
    base_url: String,
    store: SessionStore,
}

impl ApiClient {
    /// Build a client from resolved configuration.
    pub fn new(config: &Config, store: SessionStore) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build();
        Self {
            agent,
            base_url: config.api_url.clone(),
            store,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Bearer token from the persisted session, or a not-logged-in error
    /// before any network traffic happens.
    fn token(&self) -> Result<String> {
        self.store
            .load()
            .map(|s| s.token)
            .ok_or(Error::NotLoggedIn)
    }

    /// Authenticate and persist the resulting session.
    pub fn login(&self, email: &str, password: &str) -> Result<Session> {
        let response = self
            .agent
            .post(&self.url("/auth/login"))
            .send_json(serde_json::json!({ "email": email, "password": password }));

        let response = match response {
            Ok(resp) => resp,
            // Login has no session to invalidate; a 401 here is bad credentials
            Err(ureq::Error::Status(401, _)) => {
                return Err(Error::Authorization(
                    "incorrect email or password".to_string(),
                ));
            }
            Err(e) => return Err(self.map_error(e)),
        };

        let login: LoginResponse = response
            .into_json()
            .map_err(|e| Error::Other(format!("Failed to parse login response: {}", e)))?;
        let session = Session {
            token: login.token,
            user: login.user,
        };
        self.store.save(&session)?;
        Ok(session)
    }

    /// Fetch tasks matching the server-side query.
    pub fn list_tasks(&self, query: &TaskQuery) -> Result<TaskFetch> {
        let token = self.token()?;
        let mut request = self
            .agent
            .get(&self.url("/tasks"))
            .set("Authorization", &format!("Bearer {}", token));
        for (key, value) in query.params() {
            request = request.query(key, &value);
        }

        let records: Vec<TaskRecord> = request
            .call()
            .map_err(|e| self.map_error(e))?
            .into_json()
            .map_err(|e| Error::Other(format!("Failed to parse task list: {}", e)))?;

        let (tasks, warnings) = hydrate_tasks(records);
        Ok(TaskFetch { tasks, warnings })
    }

    /// Fetch one task by id.
    pub fn get_task(&self, id: i64) -> Result<Task> {
        let token = self.token()?;
        let record: TaskRecord = self
            .agent
            .get(&self.url(&format!("/tasks/{}", id)))
            .set("Authorization", &format!("Bearer {}", token))
            .call()
            .map_err(|e| self.map_error(e))?
            .into_json()
            .map_err(|e| Error::Other(format!("Failed to parse task: {}", e)))?;
        record
            .into_task()
            .map_err(|w| Error::Other(format!("received malformed task: {}", w)))
    }

    /// Create a task (`POST /tasks`).
    pub fn create_task(&self, payload: &TaskPayload) -> Result<Task> {
        let token = self.token()?;
        self.send_task(
            self.agent
                .post(&self.url("/tasks"))
                .set("Authorization", &format!("Bearer {}", token)),
            payload,
        )
    }

    /// Full-field update (`PUT /tasks/{id}`).
    pub fn update_task(&self, id: i64, payload: &TaskPayload) -> Result<Task> {
        let token = self.token()?;
        self.send_task(
            self.agent
                .put(&self.url(&format!("/tasks/{}", id)))
                .set("Authorization", &format!("Bearer {}", token)),
            payload,
        )
    }

    /// Status-only transition (`PATCH /tasks/{id}/status`).
    pub fn update_task_status(&self, id: i64, payload: &StatusPayload) -> Result<Task> {
        let token = self.token()?;
        let record: TaskRecord = self
            .agent
            .request("PATCH", &self.url(&format!("/tasks/{}/status", id)))
            .set("Authorization", &format!("Bearer {}", token))
            .send_json(serde_json::to_value(payload)?)
            .map_err(|e| self.map_error(e))?
            .into_json()
            .map_err(|e| Error::Other(format!("Failed to parse task: {}", e)))?;
        record
            .into_task()
            .map_err(|w| Error::Other(format!("received malformed task: {}", w)))
    }

    /// Delete a task. A 404 means it was already gone and counts as success.
    pub fn delete_task(&self, id: i64) -> Result<DeleteOutcome> {
        let token = self.token()?;
        match self
            .agent
            .delete(&self.url(&format!("/tasks/{}", id)))
            .set("Authorization", &format!("Bearer {}", token))
            .call()
        {
            Ok(_) => Ok(DeleteOutcome { already_gone: false }),
            Err(ureq::Error::Status(404, _)) => Ok(DeleteOutcome { already_gone: true }),
            Err(e) => Err(self.map_error(e)),
        }
    }

    /// Fetch all users (for assignment pickers and the admin surface).
    pub fn list_users(&self) -> Result<Vec<User>> {
        let token = self.token()?;
        self.agent
            .get(&self.url("/users"))
            .set("Authorization", &format!("Bearer {}", token))
            .call()
            .map_err(|e| self.map_error(e))?
            .into_json()
            .map_err(|e| Error::Other(format!("Failed to parse user list: {}", e)))
    }

    /// Create a user account via the admin-only registration endpoint.
    pub fn register_user(&self, payload: &UserPayload) -> Result<User> {
        let token = self.token()?;
        self.agent
            .post(&self.url("/auth/admin/register"))
            .set("Authorization", &format!("Bearer {}", token))
            .send_json(serde_json::to_value(payload)?)
            .map_err(|e| self.map_error(e))?
            .into_json()
            .map_err(|e| Error::Other(format!("Failed to parse user: {}", e)))
    }

    /// Update a user account (`PUT /users/{id}`).
    pub fn update_user(&self, id: i64, payload: &UserPayload) -> Result<User> {
        let token = self.token()?;
        self.agent
            .put(&self.url(&format!("/users/{}", id)))
            .set("Authorization", &format!("Bearer {}", token))
            .send_json(serde_json::to_value(payload)?)
            .map_err(|e| self.map_error(e))?
            .into_json()
            .map_err(|e| Error::Other(format!("Failed to parse user: {}", e)))
    }

    /// Delete a user account (`DELETE /users/{id}`).
    pub fn delete_user(&self, id: i64) -> Result<()> {
        let token = self.token()?;
        self.agent
            .delete(&self.url(&format!("/users/{}", id)))
            .set("Authorization", &format!("Bearer {}", token))
            .call()
            .map_err(|e| self.map_error(e))?;
        Ok(())
    }

    fn send_task(&self, request: ureq::Request, payload: &TaskPayload) -> Result<Task> {
        let record: TaskRecord = request
            .send_json(serde_json::to_value(payload)?)
            .map_err(|e| self.map_error(e))?
            .into_json()
            .map_err(|e| Error::Other(format!("Failed to parse task: {}", e)))?;
        record
            .into_task()
            .map_err(|w| Error::Other(format!("received malformed task: {}", w)))
    }

    /// Map a transport/status error into the client taxonomy.
    ///
    /// The 401 branch clears the persisted session; callers must not retry
    /// the original request.
    fn map_error(&self, err: ureq::Error) -> Error {
        if let ureq::Error::Status(401, _) = err {
            let _ = self.store.clear();
            return Error::Authorization("session expired or invalid; logged out".to_string());
        }
        classify_error(err)
    }
}

/// Map non-401 failures: 404 → not found, other status → conflict with the
/// server detail, transport → network.
fn classify_error(err: ureq::Error) -> Error {
    match err {
        ureq::Error::Status(404, resp) => Error::NotFound(detail_message(resp)),
        ureq::Error::Status(code, resp) => {
            Error::Conflict(format!("HTTP {}: {}", code, detail_message(resp)))
        }
        ureq::Error::Transport(t) => Error::Network(t.to_string()),
    }
}

fn detail_message(resp: ureq::Response) -> String {
    let body = resp.into_string().unwrap_or_default();
    extract_detail(&body)
}

/// Pull the `detail` field out of a JSON error body, falling back to the
/// raw body (or a placeholder when empty).
fn extract_detail(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(detail) = value.get("detail").and_then(|d| d.as_str()) {
            return detail.to_string();
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "(no detail provided)".to_string()
    } else {
        trimmed.to_string()
    }
}
