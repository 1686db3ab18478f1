//! Task visibility filtering and calendar date-membership.
//!
//! Two pure functions with no side effects beyond their return values:
//! - `filter_and_sort` - conjunctive filters plus an optional stable sort
//! - `tasks_active_on` - which tasks cover a given calendar day
//!
//! All date comparisons happen at day granularity. Time-of-day never
//! reaches this module; wire values are truncated to calendar days at the
//! parse boundary (see `models::parse_wire_date`).

use crate::models::{FilterCriteria, SortKey, Task};
use chrono::NaiveDate;
use std::cmp::Reverse;

/// Filter a task list by the given criteria, then apply the requested sort.
///
/// Filters compose with AND; absent criteria impose no constraint. Sorts
/// are stable, so ties preserve input order, and `sort: None` returns the
/// surviving tasks in their original order.
pub fn filter_and_sort(tasks: &[Task], criteria: &FilterCriteria) -> Vec<Task> {
    let mut out: Vec<Task> = tasks
        .iter()
        .filter(|task| matches(task, criteria))
        .cloned()
        .collect();

    match criteria.sort {
        Some(SortKey::DueDate) => out.sort_by_key(|t| t.end_date),
        Some(SortKey::Priority) => out.sort_by_key(|t| Reverse(t.priority.weight())),
        Some(SortKey::Status) => out.sort_by_key(|t| Reverse(t.status.weight())),
        Some(SortKey::Title) => out.sort_by(|a, b| a.title.cmp(&b.title)),
        None => {}
    }

    out
}

/// The tasks active on `date`, in input order.
///
/// A task is active iff `start_date <= date <= end_date`, inclusive on
/// both ends; a task with `start == end` is active on exactly that day.
/// Order stability makes "show first N, +K more" truncation reproducible.
pub fn tasks_active_on(tasks: &[Task], date: NaiveDate) -> Vec<Task> {
    tasks
        .iter()
        .filter(|task| task.active_on(date))
        .cloned()
        .collect()
}

fn matches(task: &Task, criteria: &FilterCriteria) -> bool {
    if let Some(assignee_id) = criteria.assignee_id {
        if task.assignee.id != assignee_id {
            return false;
        }
    }

    if let Some(status) = criteria.status {
        if task.status != status {
            return false;
        }
    }

    if let Some(search) = criteria.search.as_deref() {
        if !search.is_empty() && !search_matches(task, search) {
            return false;
        }
    }

    if let Some((range_start, range_end)) = criteria.date_range {
        // Interval intersection: task.start <= range.end AND task.end >= range.start
        if task.start_date > range_end || task.end_date < range_start {
            return false;
        }
    }

    true
}

fn search_matches(task: &Task, needle: &str) -> bool {
    let needle = needle.to_lowercase();
    if task.title.to_lowercase().contains(&needle) {
        return true;
    }
    task.description
        .as_deref()
        .is_some_and(|d| d.to_lowercase().contains(&needle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{TaskPriority, TaskStatus, User};

    fn user(id: i64) -> User {
        User {
            id,
            name: format!("User {}", id),
            email: format!("user{}@example.com", id),
            is_admin: false,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn task(id: i64, title: &str, start: NaiveDate, end: NaiveDate) -> Task {
        Task {
            id,
            title: title.to_string(),
            description: None,
            start_date: start,
            end_date: end,
            priority: TaskPriority::Medium,
            status: TaskStatus::Pending,
            assignee: user(1),
        }
    }

    fn sample_tasks() -> Vec<Task> {
        let mut a = task(1, "Write report", date(2025, 3, 10), date(2025, 3, 12));
        a.priority = TaskPriority::High;
        a.description = Some("Quarterly summary".to_string());

        let mut b = task(2, "Review budget", date(2025, 3, 11), date(2025, 3, 15));
        b.status = TaskStatus::InProgress;
        b.assignee = user(2);

        let mut c = task(3, "Archive files", date(2025, 2, 1), date(2025, 2, 3));
        c.priority = TaskPriority::Low;
        c.status = TaskStatus::Completed;

        vec![a, b, c]
    }

    #[test]
    fn test_empty_criteria_is_identity() {
        let tasks = sample_tasks();
        let out = filter_and_sort(&tasks, &FilterCriteria::default());
        assert_eq!(out, tasks);
    }

    #[test]
    fn test_empty_task_list() {
        let out = filter_and_sort(&[], &FilterCriteria::default());
        assert!(out.is_empty());
        assert!(tasks_active_on(&[], date(2025, 3, 10)).is_empty());
    }

    #[test]
    fn test_assignee_filter() {
        let tasks = sample_tasks();
        let criteria = FilterCriteria {
            assignee_id: Some(2),
            ..Default::default()
        };
        let out = filter_and_sort(&tasks, &criteria);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, 2);
    }

    #[test]
    fn test_status_filter() {
        let tasks = sample_tasks();
        let criteria = FilterCriteria {
            status: Some(TaskStatus::Completed),
            ..Default::default()
        };
        let out = filter_and_sort(&tasks, &criteria);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, 3);
    }

    #[test]
    fn test_search_is_case_insensitive_and_checks_description() {
        let tasks = sample_tasks();
        let criteria = FilterCriteria {
            search: Some("REPORT".to_string()),
            ..Default::default()
        };
        assert_eq!(filter_and_sort(&tasks, &criteria)[0].id, 1);

        // Matches against description too
        let criteria = FilterCriteria {
            search: Some("quarterly".to_string()),
            ..Default::default()
        };
        assert_eq!(filter_and_sort(&tasks, &criteria)[0].id, 1);
    }

    #[test]
    fn test_empty_search_imposes_no_constraint() {
        let tasks = sample_tasks();
        let criteria = FilterCriteria {
            search: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(filter_and_sort(&tasks, &criteria).len(), 3);
    }

    #[test]
    fn test_date_range_intersection() {
        let tasks = sample_tasks();
        // Range touching only the tail of task 2
        let criteria = FilterCriteria {
            date_range: Some((date(2025, 3, 14), date(2025, 3, 20))),
            ..Default::default()
        };
        let out = filter_and_sort(&tasks, &criteria);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, 2);

        // Range covering none
        let criteria = FilterCriteria {
            date_range: Some((date(2025, 4, 1), date(2025, 4, 30))),
            ..Default::default()
        };
        assert!(filter_and_sort(&tasks, &criteria).is_empty());
    }

    #[test]
    fn test_filters_compose_conjunctively() {
        let tasks = sample_tasks();
        let criteria = FilterCriteria {
            assignee_id: Some(1),
            status: Some(TaskStatus::Pending),
            search: Some("write".to_string()),
            date_range: Some((date(2025, 3, 1), date(2025, 3, 31))),
            ..Default::default()
        };
        let out = filter_and_sort(&tasks, &criteria);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, 1);
    }

    #[test]
    fn test_sort_by_priority_descending_and_stable() {
        let mut tasks = vec![
            task(1, "a", date(2025, 1, 1), date(2025, 1, 2)),
            task(2, "b", date(2025, 1, 1), date(2025, 1, 2)),
            task(3, "c", date(2025, 1, 1), date(2025, 1, 2)),
            task(4, "d", date(2025, 1, 1), date(2025, 1, 2)),
        ];
        tasks[0].priority = TaskPriority::Medium;
        tasks[1].priority = TaskPriority::High;
        tasks[2].priority = TaskPriority::Medium;
        tasks[3].priority = TaskPriority::Low;

        let criteria = FilterCriteria {
            sort: Some(SortKey::Priority),
            ..Default::default()
        };
        let out = filter_and_sort(&tasks, &criteria);
        let ids: Vec<i64> = out.iter().map(|t| t.id).collect();
        // High first, then the two mediums in input order, then low
        assert_eq!(ids, vec![2, 1, 3, 4]);
    }

    #[test]
    fn test_sort_by_due_date_ascending() {
        let tasks = vec![
            task(1, "late", date(2025, 1, 1), date(2025, 3, 1)),
            task(2, "early", date(2025, 1, 1), date(2025, 1, 15)),
            task(3, "mid", date(2025, 1, 1), date(2025, 2, 1)),
        ];
        let criteria = FilterCriteria {
            sort: Some(SortKey::DueDate),
            ..Default::default()
        };
        let ids: Vec<i64> = filter_and_sort(&tasks, &criteria)
            .iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn test_sort_by_status_descending() {
        let mut tasks = vec![
            task(1, "a", date(2025, 1, 1), date(2025, 1, 2)),
            task(2, "b", date(2025, 1, 1), date(2025, 1, 2)),
            task(3, "c", date(2025, 1, 1), date(2025, 1, 2)),
            task(4, "d", date(2025, 1, 1), date(2025, 1, 2)),
        ];
        tasks[0].status = TaskStatus::Completed;
        tasks[1].status = TaskStatus::InProgress;
        tasks[2].status = TaskStatus::Overdue;
        tasks[3].status = TaskStatus::Pending;

        let criteria = FilterCriteria {
            sort: Some(SortKey::Status),
            ..Default::default()
        };
        let ids: Vec<i64> = filter_and_sort(&tasks, &criteria)
            .iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, vec![3, 4, 2, 1]);
    }

    #[test]
    fn test_sort_by_title() {
        let tasks = vec![
            task(1, "banana", date(2025, 1, 1), date(2025, 1, 2)),
            task(2, "apple", date(2025, 1, 1), date(2025, 1, 2)),
            task(3, "cherry", date(2025, 1, 1), date(2025, 1, 2)),
        ];
        let criteria = FilterCriteria {
            sort: Some(SortKey::Title),
            ..Default::default()
        };
        let ids: Vec<i64> = filter_and_sort(&tasks, &criteria)
            .iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, vec![2, 1, 3]);
    }

    #[test]
    fn test_active_on_inclusive_boundaries() {
        // start=2025-03-10, end=2025-03-12: active on 10th, 11th, 12th only
        let tasks = vec![task(1, "A", date(2025, 3, 10), date(2025, 3, 12))];

        assert_eq!(tasks_active_on(&tasks, date(2025, 3, 10)).len(), 1);
        assert_eq!(tasks_active_on(&tasks, date(2025, 3, 11)).len(), 1);
        assert_eq!(tasks_active_on(&tasks, date(2025, 3, 12)).len(), 1);
        assert!(tasks_active_on(&tasks, date(2025, 3, 9)).is_empty());
        assert!(tasks_active_on(&tasks, date(2025, 3, 13)).is_empty());
    }

    #[test]
    fn test_active_on_preserves_input_order() {
        let tasks = vec![
            task(5, "e", date(2025, 3, 1), date(2025, 3, 31)),
            task(2, "b", date(2025, 3, 1), date(2025, 3, 31)),
            task(9, "i", date(2025, 3, 1), date(2025, 3, 31)),
        ];
        let ids: Vec<i64> = tasks_active_on(&tasks, date(2025, 3, 15))
            .iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, vec![5, 2, 9]);
    }
}
