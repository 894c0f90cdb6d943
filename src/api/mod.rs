use axum::Json;
use axum::extract::Path;
use axum::extract::rejection::JsonRejection;
use axum::routing::{patch, post};
use axum::{Router, extract::State, http::StatusCode, routing::get};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::error::AppError;
use crate::models::*;
use crate::services::{OpenTasksSensor, TodoItem};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateTaskCall {
    pub title: String,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub assignees: Vec<String>,
    #[serde(default = "default_priority")]
    pub priority: i32,
    #[serde(default)]
    pub bucket_id: Option<String>,
    #[serde(default)]
    pub bucket: Option<String>,
    #[serde(default)]
    pub plan_name: Option<String>,
}

fn default_priority() -> i32 {
    DEFAULT_PRIORITY
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateTaskCall {
    #[serde(default)]
    pub task_id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub assignees: Option<Vec<String>>,
    #[serde(default)]
    pub percent_complete: Option<i32>,
    #[serde(default)]
    pub completed: Option<bool>,
    #[serde(default)]
    pub bucket_id: Option<String>,
    #[serde(default)]
    pub bucket: Option<String>,
    #[serde(default)]
    pub plan_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListBucketsCall {
    #[serde(default)]
    pub plan_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BucketsResponse {
    pub success: bool,
    #[serde(flatten)]
    pub listing: BucketListing,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub available: bool,
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TodoListResponse {
    pub name: String,
    pub items: Vec<TodoItem>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/tasks", get(current_snapshot))
        .route("/refresh", post(refresh_now))
        .route("/sensor", get(sensor))
        .route("/todo", get(list_todo_items).post(create_todo_item))
        .route("/todo/{uid}", patch(update_todo_item).delete(delete_todo_item))
        .route("/services/create_task", post(create_task))
        .route("/services/update_task", post(update_task))
        .route("/services/list_buckets", post(list_buckets))
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let current = state.coordinator.state().await;
    let status = if current.last_update_success {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (
        status,
        Json(HealthResponse {
            available: current.last_update_success,
            last_updated: current.last_updated,
            error: current.snapshot.and_then(|s| s.error),
        }),
    )
}

async fn current_snapshot(State(state): State<AppState>) -> Json<TaskSnapshot> {
    match state.coordinator.snapshot().await {
        Some(snapshot) => Json(snapshot),
        None => Json(state.coordinator.refresh().await),
    }
}

async fn refresh_now(State(state): State<AppState>) -> Json<TaskSnapshot> {
    Json(state.coordinator.refresh().await)
}

async fn sensor(State(state): State<AppState>) -> Json<OpenTasksSensor> {
    Json(OpenTasksSensor::from_state(&state.coordinator.state().await))
}

async fn list_todo_items(State(state): State<AppState>) -> Json<TodoListResponse> {
    Json(TodoListResponse {
        name: state.todo.name(),
        items: state.todo.items().await,
    })
}

async fn create_todo_item(
    State(state): State<AppState>,
    payload: Result<Json<TodoItem>, JsonRejection>,
) -> Result<(StatusCode, Json<TodoItem>), AppError> {
    let Json(item) = payload?;
    let created = state.todo.create(&item).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_todo_item(
    State(state): State<AppState>,
    Path(uid): Path<String>,
    payload: Result<Json<TodoItem>, JsonRejection>,
) -> Result<Json<TodoItem>, AppError> {
    let Json(mut item) = payload?;
    item.uid = Some(uid);
    Ok(Json(state.todo.update(&item).await?))
}

async fn delete_todo_item(
    State(state): State<AppState>,
    Path(uid): Path<String>,
) -> Result<Json<TaskDeleted>, AppError> {
    Ok(Json(state.todo.delete(&uid).await?))
}

/// `bucket_id` wins; otherwise a non-blank bucket name or id is looked up in the plan.
async fn resolve_bucket_param(
    state: &AppState,
    plan_name: &str,
    bucket_id: Option<String>,
    bucket: Option<&str>,
) -> Result<Option<String>, AppError> {
    if let Some(id) = bucket_id.filter(|b| !b.is_empty()) {
        return Ok(Some(id));
    }
    let Some(value) = bucket.filter(|b| !b.trim().is_empty()) else {
        return Ok(None);
    };

    match state.planner.resolve_bucket(plan_name, value).await {
        Ok(found) => Ok(Some(found.bucket_id)),
        Err(err) => {
            error!(
                "Failed to resolve bucket '{}' for plan '{}': {}",
                value, plan_name, err
            );
            Err(err)
        }
    }
}

async fn create_task(
    State(state): State<AppState>,
    payload: Result<Json<CreateTaskCall>, JsonRejection>,
) -> Result<Json<TaskCreated>, AppError> {
    let Json(call) = payload?;
    let plan_name = state.target_plan(call.plan_name.as_deref());
    let bucket_id = resolve_bucket_param(&state, &plan_name, call.bucket_id, call.bucket.as_deref()).await?;

    info!("Service call to create task: {}", call.title);
    let request = NewTaskRequest {
        title: call.title,
        due_date: call.due_date,
        assignees: call.assignees,
        priority: call.priority,
        bucket_id,
    };

    match state.planner.create_task(&plan_name, &request).await {
        Ok(created) => {
            info!("Task created successfully: {}", created.task_id);
            state.coordinator.request_refresh();
            Ok(Json(created))
        }
        Err(err) => {
            error!("Failed to create task: {}", err);
            Err(err)
        }
    }
}

async fn update_task(
    State(state): State<AppState>,
    payload: Result<Json<UpdateTaskCall>, JsonRejection>,
) -> Result<Json<TaskUpdated>, AppError> {
    let Json(call) = payload?;
    let task_id = call
        .task_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| {
            error!("update_task service requires task_id");
            AppError::BadRequest("task_id missing".to_string())
        })?;

    let plan_name = state.target_plan(call.plan_name.as_deref());
    let bucket_id = resolve_bucket_param(&state, &plan_name, call.bucket_id, call.bucket.as_deref()).await?;

    info!("Service call to update task: {}", task_id);
    let update = UpdateTaskRequest {
        title: call.title,
        due_date: call.due_date,
        assignees: call.assignees,
        percent_complete: call.percent_complete,
        completed: call.completed,
        bucket_id,
    };

    match state.planner.update_task(&task_id, &update).await {
        Ok(updated) => {
            state.coordinator.request_refresh();
            Ok(Json(updated))
        }
        Err(err) => {
            error!("Failed to update task {}: {}", task_id, err);
            Err(err)
        }
    }
}

async fn list_buckets(
    State(state): State<AppState>,
    payload: Result<Option<Json<ListBucketsCall>>, JsonRejection>,
) -> Result<Json<BucketsResponse>, AppError> {
    let call = payload?.map(|Json(c)| c).unwrap_or_default();
    let plan_name = state.target_plan(call.plan_name.as_deref());

    match state.planner.list_buckets(&plan_name).await {
        Ok(listing) => Ok(Json(BucketsResponse {
            success: true,
            listing,
        })),
        Err(err) => {
            error!("Failed to list buckets for plan '{}': {}", plan_name, err);
            Err(err)
        }
    }
}
