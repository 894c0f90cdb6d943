use std::sync::Arc;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::error::AppError;
use crate::models::{NewTaskRequest, OpenTask, TaskDeleted, UpdateTaskRequest};
use crate::planner::PlannerClient;
use crate::services::coordinator::PollingCoordinator;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TodoStatus {
    NeedsAction,
    Completed,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TodoPriority {
    High,
    Normal,
    Low,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TodoItem {
    #[serde(default)]
    pub uid: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default = "default_status")]
    pub status: TodoStatus,
    #[serde(default)]
    pub due: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Option<TodoPriority>,
}

fn default_status() -> TodoStatus {
    TodoStatus::NeedsAction
}

pub fn status_from_percent(percent_complete: i32) -> TodoStatus {
    if percent_complete >= 100 {
        TodoStatus::Completed
    } else {
        TodoStatus::NeedsAction
    }
}

pub fn priority_from_planner(priority: Option<i32>) -> TodoPriority {
    match priority {
        None => TodoPriority::Normal,
        Some(p) if p <= 3 => TodoPriority::High,
        Some(p) if p <= 6 => TodoPriority::Normal,
        Some(_) => TodoPriority::Low,
    }
}

pub fn priority_to_planner(priority: Option<TodoPriority>) -> i32 {
    match priority {
        Some(TodoPriority::High) => 1,
        Some(TodoPriority::Low) => 9,
        _ => 5,
    }
}

/// Parses a Graph timestamp. A trailing `Z` and naive timestamps are read as UTC.
pub fn parse_due_date(value: Option<&str>) -> Option<DateTime<FixedOffset>> {
    let value = value.filter(|v| !v.is_empty())?;
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed);
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc().fixed_offset());
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|d| d.and_utc().fixed_offset());
    }
    debug!("Could not parse due date: {}", value);
    None
}

/// UTC ISO-8601 with a `Z` suffix, as Graph expects.
pub fn format_due_date(value: Option<&DateTime<FixedOffset>>) -> Option<String> {
    value.map(|v| v.with_timezone(&Utc).to_rfc3339_opts(SecondsFormat::Secs, true))
}

impl From<&OpenTask> for TodoItem {
    fn from(task: &OpenTask) -> Self {
        Self {
            uid: Some(task.id.clone()),
            summary: Some(if task.title.is_empty() {
                "Unnamed task".to_string()
            } else {
                task.title.clone()
            }),
            status: status_from_percent(task.percent_complete),
            due: parse_due_date(task.due_date_time.as_deref()),
            description: (!task.assignees.is_empty()).then(|| task.assignees.join(", ")),
            priority: Some(priority_from_planner(Some(task.priority))),
        }
    }
}

/// Todo-list view over the coordinator's snapshot. Successful writes ask the
/// coordinator for a refresh.
pub struct TodoList {
    planner: Arc<dyn PlannerClient>,
    coordinator: Arc<PollingCoordinator>,
}

impl TodoList {
    pub fn new(planner: Arc<dyn PlannerClient>, coordinator: Arc<PollingCoordinator>) -> Self {
        Self { planner, coordinator }
    }

    pub fn name(&self) -> String {
        format!("{} Tasks", self.coordinator.plan_name())
    }

    pub async fn items(&self) -> Vec<TodoItem> {
        self.coordinator
            .snapshot()
            .await
            .map(|s| s.open_tasks.iter().map(TodoItem::from).collect())
            .unwrap_or_default()
    }

    pub async fn create(&self, item: &TodoItem) -> Result<TodoItem, AppError> {
        let title = item
            .summary
            .clone()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "New Task".to_string());

        let mut request = NewTaskRequest::titled(title.clone());
        request.due_date = format_due_date(item.due.as_ref());
        request.priority = priority_to_planner(item.priority);

        let created = self
            .planner
            .create_task(self.coordinator.plan_name(), &request)
            .await
            .inspect_err(|e| error!("Failed to create Planner task: {}", e))?;

        self.coordinator.request_refresh();

        Ok(TodoItem {
            uid: Some(created.task_id),
            summary: Some(title),
            status: TodoStatus::NeedsAction,
            due: item.due,
            description: None,
            priority: item.priority,
        })
    }

    pub async fn update(&self, item: &TodoItem) -> Result<TodoItem, AppError> {
        let uid = item.uid.as_deref().ok_or_else(|| {
            error!("Cannot update Planner task without uid");
            AppError::BadRequest("Cannot update Planner task without uid".to_string())
        })?;

        let update = UpdateTaskRequest {
            title: item.summary.clone(),
            due_date: format_due_date(item.due.as_ref()),
            completed: Some(item.status == TodoStatus::Completed),
            ..Default::default()
        };

        self.planner
            .update_task(uid, &update)
            .await
            .inspect_err(|e| error!("Failed to update Planner task {}: {}", uid, e))?;

        self.coordinator.request_refresh();
        Ok(item.clone())
    }

    pub async fn delete(&self, uid: &str) -> Result<TaskDeleted, AppError> {
        let deleted = self
            .planner
            .delete_task(uid)
            .await
            .inspect_err(|e| error!("Failed to delete Planner task {}: {}", uid, e))?;

        self.coordinator.request_refresh();
        Ok(deleted)
    }
}
