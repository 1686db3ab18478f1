//! Command implementations for the Taskboard CLI.
//!
//! Each command returns a result type implementing [`Output`], which the
//! binary prints as JSON (default) or human-readable text (`-H`).
//!
//! Role gates collapse into the single `require_admin` check: task
//! create/delete and the whole `user` surface demand an admin session
//! client-side, as defense-in-depth in front of the authoritative server.

use crate::api::{ApiClient, TaskQuery, UserPayload};
use crate::config::{self, Config, ConfigFile};
use crate::filter::{filter_and_sort, tasks_active_on};
use crate::gateway::{self, TaskForm};
use crate::models::{FilterCriteria, Session, SortKey, Task, TaskStatus, User};
use crate::session::SessionStore;
use crate::{Error, Result};
use chrono::NaiveDate;
use serde::Serialize;

/// Command results that can be serialized to JSON or formatted for humans.
pub trait Output: Serialize {
    /// Format for human-readable output.
    fn to_human(&self) -> String;

    /// Serialize to JSON string.
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| r#"{"error":"serialization failed"}"#.into())
    }
}

/// Require an admin session, or fail before any network dispatch.
fn require_admin(store: &SessionStore) -> Result<Session> {
    let session = store.load().ok_or(Error::NotLoggedIn)?;
    if !session.user.is_admin {
        return Err(Error::Authorization(
            "admin privileges required".to_string(),
        ));
    }
    Ok(session)
}

fn parse_status_arg(raw: Option<&str>) -> Result<Option<TaskStatus>> {
    raw.map(|s| s.parse::<TaskStatus>().map_err(Error::Validation))
        .transpose()
}

fn parse_sort_arg(raw: Option<&str>) -> Result<Option<SortKey>> {
    raw.map(|s| s.parse::<SortKey>().map_err(Error::Validation))
        .transpose()
}

// === Session commands ===

/// Result of `tb login`.
#[derive(Debug, Serialize)]
pub struct LoginResult {
    pub user: User,
    pub admin: bool,
}

impl Output for LoginResult {
    fn to_human(&self) -> String {
        let role = if self.admin { " (admin)" } else { "" };
        format!("Logged in as {} <{}>{}", self.user.name, self.user.email, role)
    }
}

/// Authenticate and persist the session.
pub fn login(client: &ApiClient, email: &str, password: &str) -> Result<LoginResult> {
    let session = client.login(email, password)?;
    Ok(LoginResult {
        admin: session.user.is_admin,
        user: session.user,
    })
}

/// Result of `tb logout`.
#[derive(Debug, Serialize)]
pub struct LogoutResult {
    pub was_logged_in: bool,
}

impl Output for LogoutResult {
    fn to_human(&self) -> String {
        if self.was_logged_in {
            "Logged out".to_string()
        } else {
            "No active session".to_string()
        }
    }
}

/// Clear the persisted session. Idempotent.
pub fn logout(store: &SessionStore) -> Result<LogoutResult> {
    let was_logged_in = store.load().is_some();
    store.clear()?;
    Ok(LogoutResult { was_logged_in })
}

/// Result of `tb whoami`.
#[derive(Debug, Serialize)]
pub struct WhoamiResult {
    pub logged_in: bool,
    pub admin: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
}

impl Output for WhoamiResult {
    fn to_human(&self) -> String {
        match &self.user {
            Some(user) => {
                let role = if self.admin { "admin" } else { "member" };
                format!("{} <{}> ({})", user.name, user.email, role)
            }
            None => "Not logged in".to_string(),
        }
    }
}

/// Show the current session and role.
pub fn whoami(store: &SessionStore) -> WhoamiResult {
    let session = store.load();
    WhoamiResult {
        logged_in: session.is_some(),
        admin: crate::session::is_admin(session.as_ref()),
        user: session.map(|s| s.user),
    }
}

// === Task commands ===

/// Result of `tb task list`.
#[derive(Debug, Serialize)]
pub struct TaskListResult {
    pub tasks: Vec<Task>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl Output for TaskListResult {
    fn to_human(&self) -> String {
        let mut lines = Vec::new();
        if self.tasks.is_empty() {
            lines.push("No tasks found".to_string());
        }
        for task in &self.tasks {
            lines.push(format!(
                "[{}] {} ({}..{}, {}, {}) -> {}",
                task.id,
                task.title,
                task.start_date,
                task.end_date,
                task.priority,
                task.status,
                task.assignee.name
            ));
        }
        for warning in &self.warnings {
            lines.push(format!("warning: {}", warning));
        }
        lines.join("\n")
    }
}

/// Options for `tb task list`, straight from the CLI.
#[derive(Debug, Default)]
pub struct TaskListArgs {
    pub status: Option<String>,
    pub assignee: Option<i64>,
    pub search: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub sort: Option<String>,
}

/// Fetch, filter, and sort the task list.
///
/// The same criteria are sent as server query parameters and re-applied
/// locally; the sort is local-only.
pub fn task_list(client: &ApiClient, args: &TaskListArgs) -> Result<TaskListResult> {
    let status = parse_status_arg(args.status.as_deref())?;
    let sort = parse_sort_arg(args.sort.as_deref())?;

    let date_range = match (args.from, args.to) {
        (Some(from), Some(to)) => {
            if from > to {
                return Err(Error::Validation(format!(
                    "--from {} is after --to {}",
                    from, to
                )));
            }
            Some((from, to))
        }
        (None, None) => None,
        _ => {
            return Err(Error::Validation(
                "--from and --to must be given together".to_string(),
            ));
        }
    };

    let query = TaskQuery {
        assignee_id: args.assignee,
        status,
        search: args.search.clone(),
        start_date: date_range.map(|(from, _)| from),
        end_date: date_range.map(|(_, to)| to),
    };
    let fetch = client.list_tasks(&query)?;

    let criteria = FilterCriteria {
        assignee_id: args.assignee,
        status,
        search: args.search.clone(),
        date_range,
        sort,
    };
    Ok(TaskListResult {
        tasks: filter_and_sort(&fetch.tasks, &criteria),
        warnings: fetch.warnings,
    })
}

/// Result wrapping a single task.
#[derive(Debug, Serialize)]
pub struct TaskResult {
    pub task: Task,
}

impl Output for TaskResult {
    fn to_human(&self) -> String {
        let task = &self.task;
        let mut lines = vec![
            format!("[{}] {}", task.id, task.title),
            format!("  active:   {}..{} (inclusive)", task.start_date, task.end_date),
            format!("  priority: {}", task.priority),
            format!("  status:   {}", task.status),
            format!("  assignee: {} <{}>", task.assignee.name, task.assignee.email),
        ];
        if let Some(description) = &task.description {
            lines.push(format!("  {}", description));
        }
        lines.join("\n")
    }
}

/// Show one task.
pub fn task_show(client: &ApiClient, id: i64) -> Result<TaskResult> {
    Ok(TaskResult {
        task: client.get_task(id)?,
    })
}

/// Create a task. Validation runs before the admin gate and the network.
pub fn task_create(client: &ApiClient, store: &SessionStore, form: &TaskForm) -> Result<TaskResult> {
    let payload = gateway::build_create_payload(form)?;
    require_admin(store)?;
    Ok(TaskResult {
        task: client.create_task(&payload)?,
    })
}

/// Full-field update. At most one mutation per task id may be in flight;
/// a concurrent second call fails with a busy error.
pub fn task_update(
    client: &ApiClient,
    store: &SessionStore,
    id: i64,
    form: &TaskForm,
) -> Result<TaskResult> {
    let admin = store.is_admin();
    let _guard = gateway::inflight().begin(id)?;
    let existing = client.get_task(id)?;
    let payload = gateway::build_update_payload(&existing, form, admin)?;
    Ok(TaskResult {
        task: client.update_task(id, &payload)?,
    })
}

/// Mark a task completed via the status-only transition.
pub fn task_done(client: &ApiClient, id: i64) -> Result<TaskResult> {
    let _guard = gateway::inflight().begin(id)?;
    let payload = gateway::build_status_payload(TaskStatus::Completed);
    Ok(TaskResult {
        task: client.update_task_status(id, &payload)?,
    })
}

/// Result of `tb task delete`.
#[derive(Debug, Serialize)]
pub struct TaskDeleteResult {
    pub id: i64,
    pub deleted: bool,
    pub already_gone: bool,
}

impl Output for TaskDeleteResult {
    fn to_human(&self) -> String {
        if self.already_gone {
            format!("Task {} was already deleted", self.id)
        } else {
            format!("Deleted task {}", self.id)
        }
    }
}

/// Delete a task. A 404 from the server counts as success.
pub fn task_delete(client: &ApiClient, store: &SessionStore, id: i64) -> Result<TaskDeleteResult> {
    require_admin(store)?;
    let _guard = gateway::inflight().begin(id)?;
    let outcome = client.delete_task(id)?;
    Ok(TaskDeleteResult {
        id,
        deleted: true,
        already_gone: outcome.already_gone,
    })
}

// === Calendar ===

/// One calendar day with its active tasks.
#[derive(Debug, Serialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub tasks: Vec<Task>,
}

/// Result of `tb calendar`.
#[derive(Debug, Serialize)]
pub struct CalendarResult {
    pub month: String,
    pub days: Vec<CalendarDay>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// How many tasks a day shows before truncating to "+K more".
const CALENDAR_DAY_LIMIT: usize = 3;

impl Output for CalendarResult {
    fn to_human(&self) -> String {
        if self.days.is_empty() {
            return format!("No tasks in {}", self.month);
        }
        let mut lines = Vec::new();
        for day in &self.days {
            lines.push(format!("{}:", day.date));
            for task in day.tasks.iter().take(CALENDAR_DAY_LIMIT) {
                lines.push(format!(
                    "  - [{}] {} ({}, {})",
                    task.id, task.title, task.priority, task.status
                ));
            }
            if day.tasks.len() > CALENDAR_DAY_LIMIT {
                lines.push(format!("  +{} more", day.tasks.len() - CALENDAR_DAY_LIMIT));
            }
        }
        for warning in &self.warnings {
            lines.push(format!("warning: {}", warning));
        }
        lines.join("\n")
    }
}

/// Parse a `YYYY-MM` month argument into its first day.
fn parse_month(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(&format!("{}-01", raw), "%Y-%m-%d")
        .map_err(|_| Error::Validation(format!("invalid month '{}' (expected YYYY-MM)", raw)))
}

fn month_bounds(first: NaiveDate) -> (NaiveDate, NaiveDate) {
    use chrono::Datelike;
    let (year, month) = (first.year(), first.month());
    let next_first = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    // The successor month's first day always exists
    let last = next_first
        .and_then(|d| d.pred_opt())
        .unwrap_or(first);
    (first, last)
}

/// Render a month of task activity, one entry per day with active tasks.
///
/// Day entries keep fetch order, so view truncation is reproducible.
pub fn calendar(
    client: &ApiClient,
    month: Option<&str>,
    assignee: Option<i64>,
) -> Result<CalendarResult> {
    let first = match month {
        Some(raw) => parse_month(raw)?,
        None => {
            use chrono::Datelike;
            let today = chrono::Local::now().date_naive();
            NaiveDate::from_ymd_opt(today.year(), today.month(), 1)
                .ok_or_else(|| Error::Other("could not resolve current month".to_string()))?
        }
    };
    let (start, end) = month_bounds(first);

    let query = TaskQuery {
        assignee_id: assignee,
        start_date: Some(start),
        end_date: Some(end),
        ..Default::default()
    };
    let fetch = client.list_tasks(&query)?;

    let mut days = Vec::new();
    let mut day = start;
    while day <= end {
        let tasks = tasks_active_on(&fetch.tasks, day);
        if !tasks.is_empty() {
            days.push(CalendarDay { date: day, tasks });
        }
        match day.succ_opt() {
            Some(next) => day = next,
            None => break,
        }
    }

    Ok(CalendarResult {
        month: first.format("%Y-%m").to_string(),
        days,
        warnings: fetch.warnings,
    })
}

// === User commands (admin surface) ===

/// Result of `tb user list`.
#[derive(Debug, Serialize)]
pub struct UserListResult {
    pub users: Vec<User>,
}

impl Output for UserListResult {
    fn to_human(&self) -> String {
        if self.users.is_empty() {
            return "No users".to_string();
        }
        self.users
            .iter()
            .map(|u| {
                let role = if u.is_admin { " (admin)" } else { "" };
                format!("[{}] {} <{}>{}", u.id, u.name, u.email, role)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// List user accounts.
pub fn user_list(client: &ApiClient, store: &SessionStore) -> Result<UserListResult> {
    require_admin(store)?;
    Ok(UserListResult {
        users: client.list_users()?,
    })
}

/// Result wrapping a single user.
#[derive(Debug, Serialize)]
pub struct UserResult {
    pub user: User,
}

impl Output for UserResult {
    fn to_human(&self) -> String {
        let role = if self.user.is_admin { " (admin)" } else { "" };
        format!(
            "[{}] {} <{}>{}",
            self.user.id, self.user.name, self.user.email, role
        )
    }
}

/// Create a user account via the admin registration endpoint.
pub fn user_add(
    client: &ApiClient,
    store: &SessionStore,
    name: &str,
    email: &str,
    password: &str,
    admin: bool,
) -> Result<UserResult> {
    require_admin(store)?;
    if name.trim().is_empty() {
        return Err(Error::Validation("a user name is required".to_string()));
    }
    if email.trim().is_empty() {
        return Err(Error::Validation("an email is required".to_string()));
    }
    let payload = UserPayload {
        name: name.trim().to_string(),
        email: email.trim().to_string(),
        password: Some(password.to_string()),
        is_admin: admin,
    };
    Ok(UserResult {
        user: client.register_user(&payload)?,
    })
}

/// Update a user account; omitted fields keep their current value.
pub fn user_update(
    client: &ApiClient,
    store: &SessionStore,
    id: i64,
    name: Option<&str>,
    email: Option<&str>,
    password: Option<&str>,
    admin: Option<bool>,
) -> Result<UserResult> {
    require_admin(store)?;
    let existing = client
        .list_users()?
        .into_iter()
        .find(|u| u.id == id)
        .ok_or_else(|| Error::NotFound(format!("user {}", id)))?;

    let payload = UserPayload {
        name: name.unwrap_or(&existing.name).trim().to_string(),
        email: email.unwrap_or(&existing.email).trim().to_string(),
        password: password.map(str::to_string),
        is_admin: admin.unwrap_or(existing.is_admin),
    };
    Ok(UserResult {
        user: client.update_user(id, &payload)?,
    })
}

/// Result of `tb user rm`.
#[derive(Debug, Serialize)]
pub struct UserDeleteResult {
    pub id: i64,
    pub deleted: bool,
}

impl Output for UserDeleteResult {
    fn to_human(&self) -> String {
        format!("Deleted user {}", self.id)
    }
}

/// Delete a user account.
pub fn user_rm(client: &ApiClient, store: &SessionStore, id: i64) -> Result<UserDeleteResult> {
    require_admin(store)?;
    client.delete_user(id)?;
    Ok(UserDeleteResult { id, deleted: true })
}

// === Config commands ===

/// Result of `tb config get`.
#[derive(Debug, Serialize)]
pub struct ConfigValueResult {
    pub key: String,
    pub value: String,
}

impl Output for ConfigValueResult {
    fn to_human(&self) -> String {
        format!("{} = {}", self.key, self.value)
    }
}

/// Result of `tb config list`.
#[derive(Debug, Serialize)]
pub struct ConfigListResult {
    pub api_url: String,
    pub timeout_secs: u64,
    pub data_dir: String,
}

impl Output for ConfigListResult {
    fn to_human(&self) -> String {
        format!(
            "api-url      = {}\ntimeout-secs = {}\ndata-dir     = {}",
            self.api_url, self.timeout_secs, self.data_dir
        )
    }
}

/// Get one resolved config value.
pub fn config_get(key: &str) -> Result<ConfigValueResult> {
    let config = Config::load()?;
    let value = match key {
        "api-url" => config.api_url,
        "timeout-secs" => config.timeout_secs.to_string(),
        _ => {
            return Err(Error::Validation(format!(
                "unknown config key '{}' (expected api-url or timeout-secs)",
                key
            )));
        }
    };
    Ok(ConfigValueResult {
        key: key.to_string(),
        value,
    })
}

/// Set one config value in the config file.
///
/// The echoed value is the normalized form actually written, not the raw
/// argument (api-url drops trailing slashes).
pub fn config_set(key: &str, value: &str) -> Result<ConfigValueResult> {
    let dir = config::data_dir()?;
    let mut file = ConfigFile::load_dir(&dir);
    let stored = match key {
        "api-url" => {
            let trimmed = value.trim().trim_end_matches('/');
            if trimmed.is_empty() {
                return Err(Error::Validation("api-url must not be empty".to_string()));
            }
            file.api_url = Some(trimmed.to_string());
            trimmed.to_string()
        }
        "timeout-secs" => {
            let secs: u64 = value
                .parse()
                .map_err(|_| Error::Validation(format!("invalid timeout '{}'", value)))?;
            if secs == 0 {
                return Err(Error::Validation("timeout-secs must be positive".to_string()));
            }
            file.timeout_secs = Some(secs);
            secs.to_string()
        }
        _ => {
            return Err(Error::Validation(format!(
                "unknown config key '{}' (expected api-url or timeout-secs)",
                key
            )));
        }
    };
    file.write(&dir)?;
    Ok(ConfigValueResult {
        key: key.to_string(),
        value: stored,
    })
}

/// List resolved config values and the data directory.
pub fn config_list() -> Result<ConfigListResult> {
    let config = Config::load()?;
    let dir = config::data_dir()?;
    Ok(ConfigListResult {
        api_url: config.api_url,
        timeout_secs: config.timeout_secs,
        data_dir: dir.display().to_string(),
    })
}

// === Version ===

/// Build information for `tb version`.
#[derive(Debug, Serialize)]
pub struct BuildInfo {
    pub version: &'static str,
    pub commit: &'static str,
    pub built: &'static str,
}

impl Output for BuildInfo {
    fn to_human(&self) -> String {
        format!(
            "Version: {}\nCommit:  {}\nBuilt:   {}",
            self.version, self.commit, self.built
        )
    }
}

/// Report crate version and build metadata.
pub fn version() -> BuildInfo {
    BuildInfo {
        version: crate::cli::package_version(),
        commit: crate::cli::git_commit(),
        built: crate::cli::build_timestamp(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{TaskPriority, User};
    use crate::test_utils::TestEnv;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn task(id: i64, title: &str) -> Task {
        Task {
            id,
            title: title.to_string(),
            description: None,
            start_date: date(2025, 3, 10),
            end_date: date(2025, 3, 12),
            priority: TaskPriority::Medium,
            status: TaskStatus::Pending,
            assignee: User {
                id: 1,
                name: "Ada".to_string(),
                email: "ada@example.com".to_string(),
                is_admin: false,
            },
        }
    }

    #[test]
    fn test_require_admin_without_session() {
        let env = TestEnv::new();
        let store = SessionStore::with_dir(env.data_path());
        assert!(matches!(require_admin(&store), Err(Error::NotLoggedIn)));
    }

    #[test]
    fn test_require_admin_non_admin_session() {
        let env = TestEnv::new();
        let store = SessionStore::with_dir(env.data_path());
        store
            .save(&Session {
                token: "tok".to_string(),
                user: User {
                    id: 1,
                    name: "Ada".to_string(),
                    email: "ada@example.com".to_string(),
                    is_admin: false,
                },
            })
            .unwrap();
        assert!(matches!(
            require_admin(&store),
            Err(Error::Authorization(_))
        ));
    }

    #[test]
    fn test_whoami_without_session() {
        let env = TestEnv::new();
        let store = SessionStore::with_dir(env.data_path());
        let result = whoami(&store);
        assert!(!result.logged_in);
        assert!(!result.admin);
        assert_eq!(result.to_human(), "Not logged in");
    }

    #[test]
    fn test_parse_month() {
        assert_eq!(parse_month("2025-03").unwrap(), date(2025, 3, 1));
        assert!(parse_month("March 2025").is_err());
        assert!(parse_month("2025-13").is_err());
    }

    #[test]
    fn test_month_bounds() {
        assert_eq!(
            month_bounds(date(2025, 3, 1)),
            (date(2025, 3, 1), date(2025, 3, 31))
        );
        assert_eq!(
            month_bounds(date(2025, 2, 1)),
            (date(2025, 2, 1), date(2025, 2, 28))
        );
        // December rolls into the next year
        assert_eq!(
            month_bounds(date(2025, 12, 1)),
            (date(2025, 12, 1), date(2025, 12, 31))
        );
    }

    #[test]
    fn test_calendar_human_truncation() {
        let result = CalendarResult {
            month: "2025-03".to_string(),
            days: vec![CalendarDay {
                date: date(2025, 3, 10),
                tasks: vec![
                    task(1, "a"),
                    task(2, "b"),
                    task(3, "c"),
                    task(4, "d"),
                    task(5, "e"),
                ],
            }],
            warnings: Vec::new(),
        };
        let human = result.to_human();
        assert!(human.contains("[1] a"));
        assert!(human.contains("[3] c"));
        assert!(!human.contains("[4] d"));
        assert!(human.contains("+2 more"));
    }

    #[test]
    fn test_calendar_human_empty_month() {
        let result = CalendarResult {
            month: "2025-03".to_string(),
            days: Vec::new(),
            warnings: Vec::new(),
        };
        assert_eq!(result.to_human(), "No tasks in 2025-03");
    }

    #[test]
    fn test_task_list_output_includes_warnings() {
        let result = TaskListResult {
            tasks: vec![task(7, "Write report")],
            warnings: vec!["task 9: unparseable start date 'x'".to_string()],
        };
        let human = result.to_human();
        assert!(human.contains("[7] Write report"));
        assert!(human.contains("warning: task 9"));

        let json = result.to_json();
        assert!(json.contains("\"warnings\""));
    }

    #[test]
    fn test_task_list_warnings_omitted_from_json_when_empty() {
        let result = TaskListResult {
            tasks: Vec::new(),
            warnings: Vec::new(),
        };
        assert!(!result.to_json().contains("warnings"));
    }

    #[test]
    fn test_output_json_shape() {
        let result = LoginResult {
            user: User {
                id: 1,
                name: "Ada".to_string(),
                email: "ada@example.com".to_string(),
                is_admin: true,
            },
            admin: true,
        };
        let json = result.to_json();
        assert!(json.contains("\"admin\":true"));
        assert!(json.contains("\"email\":\"ada@example.com\""));
        assert_eq!(
            result.to_human(),
            "Logged in as Ada <ada@example.com> (admin)"
        );
    }
}
