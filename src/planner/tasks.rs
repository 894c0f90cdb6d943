use std::collections::{BTreeMap, HashMap};

use reqwest::Method;
use serde_json::{Map, Value, json};
use tracing::{debug, error, info, warn};
use urlencoding::encode as url_encode;

use super::PlannerHttpClient;
use crate::error::AppError;
use crate::graph::dto::{CreateTaskBody, CreatedTask, ODataList, PlannerTask};
use crate::models::{
    DEFAULT_PRIORITY, NewTaskRequest, OpenTask, TaskCreated, TaskDeleted, TaskSnapshot, TaskUpdated,
    UpdateTaskRequest,
};

pub fn assignment_marker() -> Value {
    json!({
        "@odata.type": "#microsoft.graph.plannerAssignment",
        "orderHint": " !"
    })
}

/// Explicit percentage (clamped to 0..=100) wins over the `completed` shortcut.
pub fn resolve_percent(percent_complete: Option<i32>, completed: Option<bool>) -> Option<i32> {
    match (percent_complete, completed) {
        (Some(percent), _) => Some(percent.clamp(0, 100)),
        (None, Some(true)) => Some(100),
        (None, Some(false)) => Some(0),
        (None, None) => None,
    }
}

/// Builds the sparse PATCH body. `resolved_assignees` replaces the current
/// assignment set: current users missing from it are tombstoned with null.
pub fn build_patch(
    current: &PlannerTask,
    update: &UpdateTaskRequest,
    resolved_assignees: Option<&[String]>,
) -> Map<String, Value> {
    let mut patch = Map::new();

    if let Some(title) = &update.title {
        patch.insert("title".to_string(), json!(title));
    }
    if let Some(due) = &update.due_date {
        patch.insert("dueDateTime".to_string(), json!(due));
    }
    if let Some(percent) = resolve_percent(update.percent_complete, update.completed) {
        patch.insert("percentComplete".to_string(), json!(percent));
    }
    if let Some(resolved) = resolved_assignees {
        let mut assignments = Map::new();
        for user_id in resolved {
            assignments.insert(user_id.clone(), assignment_marker());
        }
        for existing in current.assignments.keys() {
            if !resolved.contains(existing) {
                assignments.insert(existing.clone(), Value::Null);
            }
        }
        patch.insert("assignments".to_string(), Value::Object(assignments));
    }
    if let Some(bucket_id) = &update.bucket_id {
        patch.insert("bucketId".to_string(), json!(bucket_id));
    }

    patch
}

impl PlannerHttpClient {
    /// Never fails: errors end up in the snapshot's `error` field.
    pub(crate) async fn fetch_open_tasks(&self, plan_name: &str) -> TaskSnapshot {
        let plan = match self.find_plan(plan_name).await {
            Ok(Some(plan)) => plan,
            Ok(None) => {
                return TaskSnapshot::failed(plan_name, None, format!("Plan '{}' not found", plan_name));
            }
            Err(err) => {
                error!("Error resolving plan {}: {}", plan_name, err);
                return TaskSnapshot::failed(plan_name, None, err.to_string());
            }
        };

        let path = format!("planner/plans/{}/tasks", plan.id);
        let tasks = match self.graph.get_json::<ODataList<PlannerTask>>(&path).await {
            Ok(list) => list.value,
            Err(err) => {
                error!("Error fetching tasks: {}", err);
                return TaskSnapshot::failed(plan_name, Some(plan.id), err.to_string());
            }
        };

        let mut names: HashMap<String, String> = HashMap::new();
        let mut open_tasks = Vec::new();
        for task in tasks.into_iter().filter(|t| t.percent_complete < 100) {
            let mut assignees = Vec::new();
            for user_id in task.assigned_user_ids() {
                if !names.contains_key(user_id) {
                    let name = self.user_display_name(user_id).await;
                    names.insert(user_id.clone(), name);
                }
                assignees.push(names[user_id].clone());
            }

            open_tasks.push(OpenTask {
                id: task.id,
                title: task.title,
                percent_complete: task.percent_complete,
                priority: task.priority.unwrap_or(DEFAULT_PRIORITY),
                due_date_time: task.due_date_time,
                created_date_time: task.created_date_time,
                bucket_id: task.bucket_id,
                assignees,
            });
        }

        TaskSnapshot::new(plan_name, &plan.id, open_tasks)
    }

    async fn resolve_assignees(&self, names: &[String]) -> Vec<String> {
        let mut ids = Vec::new();
        for name in names {
            match self.find_user_id(name).await {
                Some(id) if !ids.contains(&id) => ids.push(id),
                Some(_) => {}
                None => warn!("Could not find user '{}', skipping assignment", name),
            }
        }
        ids
    }

    pub(crate) async fn submit_task(&self, plan_name: &str, task: &NewTaskRequest) -> Result<TaskCreated, AppError> {
        let plan = self.find_plan(plan_name).await?.ok_or_else(|| {
            error!("Cannot create task: Plan '{}' not found", plan_name);
            AppError::PlanNotFound(plan_name.to_string())
        })?;

        let assignments: BTreeMap<String, Value> = self
            .resolve_assignees(&task.assignees)
            .await
            .into_iter()
            .map(|id| (id, assignment_marker()))
            .collect();

        let body = CreateTaskBody {
            plan_id: plan.id,
            title: task.title.clone(),
            priority: task.priority,
            due_date_time: task.due_date.clone().filter(|d| !d.is_empty()),
            bucket_id: task.bucket_id.clone().filter(|b| !b.is_empty()),
            assignments,
        };
        let body = serde_json::to_value(&body)
            .map_err(|e| AppError::Parse(format!("Failed to serialize task: {}", e)))?;

        info!("Creating task '{}' in plan '{}'", task.title, plan_name);
        debug!("Task data: {}", body);

        let created: CreatedTask = self
            .graph
            .request(Method::POST, "planner/tasks", Some(&body), None)
            .await?
            .json()?;

        info!("Successfully created task '{}' with ID: {}", task.title, created.id);
        Ok(TaskCreated {
            success: true,
            title: created.title.unwrap_or_else(|| task.title.clone()),
            task_id: created.id,
        })
    }

    pub(crate) async fn patch_task(&self, task_id: &str, update: &UpdateTaskRequest) -> Result<TaskUpdated, AppError> {
        if update.is_empty() {
            return Err(AppError::NoUpdateFields);
        }

        let path = format!("planner/tasks/{}", url_encode(task_id));
        let response = self.graph.get(&path).await?;
        let etag = response.concurrency_token().ok_or(AppError::EtagMissing("update"))?;
        let current: PlannerTask = response.json()?;

        let resolved = match &update.assignees {
            Some(names) => Some(self.resolve_assignees(names).await),
            None => None,
        };
        let patch = build_patch(&current, update, resolved.as_deref());
        if patch.is_empty() {
            return Err(AppError::NoUpdateFields);
        }

        let updated_fields: Vec<String> = patch.keys().cloned().collect();
        let body = Value::Object(patch);
        self.graph
            .request(Method::PATCH, &path, Some(&body), Some(&etag))
            .await?;

        info!("Updated task {} successfully", task_id);
        Ok(TaskUpdated {
            success: true,
            task_id: task_id.to_string(),
            updated_fields,
        })
    }

    pub(crate) async fn remove_task(&self, task_id: &str) -> Result<TaskDeleted, AppError> {
        let path = format!("planner/tasks/{}", url_encode(task_id));
        let etag = self
            .graph
            .get(&path)
            .await?
            .concurrency_token()
            .ok_or(AppError::EtagMissing("delete"))?;

        self.graph
            .request(Method::DELETE, &path, None, Some(&etag))
            .await?;

        info!("Deleted task {}", task_id);
        Ok(TaskDeleted {
            success: true,
            task_id: task_id.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task_with(assigned: &[&str]) -> PlannerTask {
        PlannerTask {
            id: "task-1".to_string(),
            title: "Water plants".to_string(),
            percent_complete: 0,
            priority: Some(5),
            due_date_time: None,
            created_date_time: None,
            bucket_id: None,
            assignments: assigned
                .iter()
                .map(|id| (id.to_string(), Some(assignment_marker())))
                .collect(),
            etag: None,
        }
    }

    #[test]
    fn percent_is_clamped() {
        assert_eq!(resolve_percent(Some(150), None), Some(100));
        assert_eq!(resolve_percent(Some(-5), None), Some(0));
        assert_eq!(resolve_percent(Some(42), None), Some(42));
    }

    #[test]
    fn completed_maps_to_percent_unless_percent_given() {
        assert_eq!(resolve_percent(None, Some(true)), Some(100));
        assert_eq!(resolve_percent(None, Some(false)), Some(0));
        assert_eq!(resolve_percent(Some(50), Some(true)), Some(50));
        assert_eq!(resolve_percent(None, None), None);
    }

    #[test]
    fn assignees_replace_current_set() {
        let current = task_with(&["user-x", "user-y"]);
        let update = UpdateTaskRequest {
            assignees: Some(vec!["Alice".to_string()]),
            ..Default::default()
        };
        let resolved = vec!["user-z".to_string()];

        let patch = build_patch(&current, &update, Some(&resolved));
        let assignments = patch["assignments"].as_object().expect("assignments");

        assert_eq!(assignments.len(), 3);
        assert!(assignments["user-x"].is_null());
        assert!(assignments["user-y"].is_null());
        assert_eq!(assignments["user-z"], assignment_marker());
    }

    #[test]
    fn still_assigned_users_are_not_tombstoned() {
        let current = task_with(&["user-x", "user-y"]);
        let update = UpdateTaskRequest {
            assignees: Some(vec!["X".to_string()]),
            ..Default::default()
        };
        let resolved = vec!["user-x".to_string()];

        let patch = build_patch(&current, &update, Some(&resolved));
        let assignments = patch["assignments"].as_object().expect("assignments");
        assert_eq!(assignments["user-x"], assignment_marker());
        assert!(assignments["user-y"].is_null());
    }

    #[test]
    fn patch_only_carries_supplied_fields() {
        let update = UpdateTaskRequest {
            title: Some("Renamed".to_string()),
            completed: Some(true),
            ..Default::default()
        };

        let patch = build_patch(&task_with(&["user-x"]), &update, None);
        let keys: Vec<&String> = patch.keys().collect();
        assert_eq!(keys, vec!["percentComplete", "title"]);
        assert_eq!(patch["percentComplete"], json!(100));
    }
}
