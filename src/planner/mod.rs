pub mod resolve;
pub mod tasks;

use async_trait::async_trait;

use crate::config::PlannerConfig;
use crate::error::AppError;
use crate::graph::GraphClient;
use crate::models::{
    BucketListing, BucketMatch, NewTaskRequest, Plan, TaskCreated, TaskDeleted, TaskSnapshot,
    TaskUpdated, UpdateTaskRequest,
};

/// Command and query surface over one Planner tenant.
#[async_trait]
pub trait PlannerClient: Send + Sync {
    async fn authenticate(&self) -> Result<(), AppError>;
    async fn list_all_plans(&self) -> Result<Vec<Plan>, AppError>;
    async fn resolve_plan(&self, title: &str) -> Result<Option<Plan>, AppError>;
    async fn resolve_user(&self, identifier: &str) -> Option<String>;
    async fn list_buckets(&self, plan_name: &str) -> Result<BucketListing, AppError>;
    async fn resolve_bucket(&self, plan_name: &str, bucket_value: &str) -> Result<BucketMatch, AppError>;
    async fn list_open_tasks(&self, plan_name: &str) -> TaskSnapshot;
    async fn create_task(&self, plan_name: &str, task: &NewTaskRequest) -> Result<TaskCreated, AppError>;
    async fn update_task(&self, task_id: &str, update: &UpdateTaskRequest) -> Result<TaskUpdated, AppError>;
    async fn delete_task(&self, task_id: &str) -> Result<TaskDeleted, AppError>;
}

pub struct PlannerHttpClient {
    graph: GraphClient,
}

impl PlannerHttpClient {
    pub fn new(config: &PlannerConfig) -> Result<Self, AppError> {
        let graph = GraphClient::new(config.credentials.clone(), &config.endpoints)?;
        Ok(Self { graph })
    }

    pub fn graph(&self) -> &GraphClient {
        &self.graph
    }
}

#[async_trait]
impl PlannerClient for PlannerHttpClient {
    async fn authenticate(&self) -> Result<(), AppError> {
        self.graph.tokens().authenticate().await.map(|_| ())
    }

    async fn list_all_plans(&self) -> Result<Vec<Plan>, AppError> {
        self.fetch_all_plans().await
    }

    async fn resolve_plan(&self, title: &str) -> Result<Option<Plan>, AppError> {
        self.find_plan(title).await
    }

    async fn resolve_user(&self, identifier: &str) -> Option<String> {
        self.find_user_id(identifier).await
    }

    async fn list_buckets(&self, plan_name: &str) -> Result<BucketListing, AppError> {
        self.fetch_buckets(plan_name).await
    }

    async fn resolve_bucket(&self, plan_name: &str, bucket_value: &str) -> Result<BucketMatch, AppError> {
        self.find_bucket(plan_name, bucket_value).await
    }

    async fn list_open_tasks(&self, plan_name: &str) -> TaskSnapshot {
        self.fetch_open_tasks(plan_name).await
    }

    async fn create_task(&self, plan_name: &str, task: &NewTaskRequest) -> Result<TaskCreated, AppError> {
        self.submit_task(plan_name, task).await
    }

    async fn update_task(&self, task_id: &str, update: &UpdateTaskRequest) -> Result<TaskUpdated, AppError> {
        self.patch_task(task_id, update).await
    }

    async fn delete_task(&self, task_id: &str) -> Result<TaskDeleted, AppError> {
        self.remove_task(task_id).await
    }
}
