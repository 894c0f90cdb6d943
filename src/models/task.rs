use serde::{Deserialize, Serialize};

/// Planner's "medium" priority.
pub const DEFAULT_PRIORITY: i32 = 5;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OpenTask {
    pub id: String,
    pub title: String,
    pub percent_complete: i32,
    pub priority: i32,
    pub due_date_time: Option<String>,
    pub created_date_time: Option<String>,
    pub bucket_id: Option<String>,
    pub assignees: Vec<String>,
}

/// Result of one poll of a plan. Rebuilt wholesale every time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskSnapshot {
    pub plan_name: String,
    pub plan_id: Option<String>,
    pub open_tasks: Vec<OpenTask>,
    pub total_open: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TaskSnapshot {
    pub fn new(plan_name: &str, plan_id: &str, open_tasks: Vec<OpenTask>) -> Self {
        Self {
            plan_name: plan_name.to_string(),
            total_open: open_tasks.len(),
            plan_id: Some(plan_id.to_string()),
            open_tasks,
            error: None,
        }
    }

    pub fn failed(plan_name: &str, plan_id: Option<String>, error: impl Into<String>) -> Self {
        Self {
            plan_name: plan_name.to_string(),
            plan_id,
            open_tasks: Vec::new(),
            total_open: 0,
            error: Some(error.into()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTaskRequest {
    pub title: String,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub assignees: Vec<String>,
    #[serde(default = "default_priority")]
    pub priority: i32,
    #[serde(default)]
    pub bucket_id: Option<String>,
}

fn default_priority() -> i32 {
    DEFAULT_PRIORITY
}

impl NewTaskRequest {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            due_date: None,
            assignees: Vec::new(),
            priority: DEFAULT_PRIORITY,
            bucket_id: None,
        }
    }
}

/// Sparse update. `assignees`, when present, is the complete new set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    pub due_date: Option<String>,
    pub assignees: Option<Vec<String>>,
    pub percent_complete: Option<i32>,
    pub completed: Option<bool>,
    pub bucket_id: Option<String>,
}

impl UpdateTaskRequest {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.due_date.is_none()
            && self.assignees.is_none()
            && self.percent_complete.is_none()
            && self.completed.is_none()
            && self.bucket_id.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskCreated {
    pub success: bool,
    pub task_id: String,
    pub title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskUpdated {
    pub success: bool,
    pub task_id: String,
    pub updated_fields: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskDeleted {
    pub success: bool,
    pub task_id: String,
}
