#![allow(dead_code)]

use std::time::Duration;

use planner_bridge::config::{Credentials, GraphEndpoints, PlannerConfig, DEFAULT_SCOPE};
use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

pub const TENANT: &str = "contoso";
pub const PLAN_ID: &str = "plan-1";
pub const PLAN_TITLE: &str = "Chores";

pub fn config_for(server: &MockServer) -> PlannerConfig {
    PlannerConfig {
        credentials: Credentials {
            client_id: "app-id".to_string(),
            client_secret: "app-secret".to_string(),
            tenant_id: TENANT.to_string(),
        },
        plan_name: PLAN_TITLE.to_string(),
        endpoints: GraphEndpoints {
            graph_base: format!("{}/v1.0", server.uri()),
            authority: server.uri(),
            scope: DEFAULT_SCOPE.to_string(),
        },
        poll_interval: Duration::from_secs(300),
        bind_addr: "127.0.0.1:0".parse().unwrap(),
    }
}

pub fn token_path() -> String {
    format!("/{}/oauth2/v2.0/token", TENANT)
}

pub async fn mount_token(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(token_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token_type": "Bearer",
            "expires_in": 3599,
            "access_token": "token-1"
        })))
        .mount(server)
        .await;
}

/// One group holding the given plans.
pub async fn mount_plans(server: &MockServer, plans: Value) {
    Mock::given(method("GET"))
        .and(path("/v1.0/groups"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [{ "id": "group-1", "displayName": "Family" }]
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1.0/groups/group-1/planner/plans"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "value": plans })))
        .mount(server)
        .await;
}

pub async fn mount_default_plan(server: &MockServer) {
    mount_plans(server, json!([{ "id": PLAN_ID, "title": PLAN_TITLE }])).await;
}

/// Answers every `$filter` user search with an empty result.
pub async fn mount_empty_user_search(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/v1.0/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "value": [] })))
        .mount(server)
        .await;
}

pub async fn mount_user(server: &MockServer, key: &str, id: &str, display_name: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/v1.0/users/{}", key)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": id,
            "displayName": display_name
        })))
        .mount(server)
        .await;
}

pub async fn requests_with(server: &MockServer, verb: &str) -> Vec<Request> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|r| r.method.as_str() == verb)
        .collect()
}

pub fn json_body(request: &Request) -> Value {
    serde_json::from_slice(&request.body).expect("json body")
}

pub mod fake {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use planner_bridge::error::AppError;
    use planner_bridge::models::*;
    use planner_bridge::planner::PlannerClient;

    /// In-memory planner recording the writes it receives.
    #[derive(Default)]
    pub struct FakePlanner {
        pub snapshot_calls: AtomicUsize,
        pub fail_snapshots: bool,
        pub open_tasks: Vec<OpenTask>,
        pub buckets: Vec<BucketInfo>,
        pub created: Mutex<Vec<(String, NewTaskRequest)>>,
        pub updated: Mutex<Vec<(String, UpdateTaskRequest)>>,
        pub deleted: Mutex<Vec<String>>,
    }

    impl FakePlanner {
        pub fn snapshots_taken(&self) -> usize {
            self.snapshot_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PlannerClient for FakePlanner {
        async fn authenticate(&self) -> Result<(), AppError> {
            Ok(())
        }

        async fn list_all_plans(&self) -> Result<Vec<Plan>, AppError> {
            Ok(vec![Plan {
                id: "plan-1".to_string(),
                title: "Chores".to_string(),
                group_id: "group-1".to_string(),
                group_name: Some("Family".to_string()),
            }])
        }

        async fn resolve_plan(&self, title: &str) -> Result<Option<Plan>, AppError> {
            Ok(self.list_all_plans().await?.into_iter().find(|p| p.title == title))
        }

        async fn resolve_user(&self, _identifier: &str) -> Option<String> {
            None
        }

        async fn list_buckets(&self, plan_name: &str) -> Result<BucketListing, AppError> {
            let plan = self
                .resolve_plan(plan_name)
                .await?
                .ok_or_else(|| AppError::PlanNotFound(plan_name.to_string()))?;
            Ok(BucketListing {
                plan_name: plan_name.to_string(),
                plan_id: plan.id,
                buckets: self.buckets.clone(),
            })
        }

        async fn resolve_bucket(&self, plan_name: &str, bucket_value: &str) -> Result<BucketMatch, AppError> {
            if bucket_value.trim().is_empty() {
                return Err(AppError::BadRequest("Bucket value is empty".to_string()));
            }
            let listing = self.list_buckets(plan_name).await?;
            planner_bridge::planner::resolve::match_bucket(&listing, bucket_value).ok_or_else(|| {
                AppError::BucketNotFound {
                    value: bucket_value.to_string(),
                    available: listing.buckets.iter().map(BucketRef::from).collect(),
                }
            })
        }

        async fn list_open_tasks(&self, plan_name: &str) -> TaskSnapshot {
            self.snapshot_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_snapshots {
                return TaskSnapshot::failed(plan_name, Some("plan-1".to_string()), "Graph API error 503");
            }
            TaskSnapshot::new(plan_name, "plan-1", self.open_tasks.clone())
        }

        async fn create_task(&self, plan_name: &str, task: &NewTaskRequest) -> Result<TaskCreated, AppError> {
            self.created
                .lock()
                .unwrap()
                .push((plan_name.to_string(), task.clone()));
            Ok(TaskCreated {
                success: true,
                task_id: "new-task".to_string(),
                title: task.title.clone(),
            })
        }

        async fn update_task(&self, task_id: &str, update: &UpdateTaskRequest) -> Result<TaskUpdated, AppError> {
            if update.is_empty() {
                return Err(AppError::NoUpdateFields);
            }
            self.updated
                .lock()
                .unwrap()
                .push((task_id.to_string(), update.clone()));
            Ok(TaskUpdated {
                success: true,
                task_id: task_id.to_string(),
                updated_fields: vec!["title".to_string()],
            })
        }

        async fn delete_task(&self, task_id: &str) -> Result<TaskDeleted, AppError> {
            self.deleted.lock().unwrap().push(task_id.to_string());
            Ok(TaskDeleted {
                success: true,
                task_id: task_id.to_string(),
            })
        }
    }

    pub fn open_task(id: &str, title: &str, priority: i32) -> OpenTask {
        OpenTask {
            id: id.to_string(),
            title: title.to_string(),
            percent_complete: 0,
            priority,
            due_date_time: None,
            created_date_time: None,
            bucket_id: None,
            assignees: Vec::new(),
        }
    }
}
