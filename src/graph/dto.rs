use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Deserialize)]
pub struct ODataList<T> {
    #[serde(default = "Vec::new")]
    pub value: Vec<T>,
}

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub error_description: Option<String>,
}

/// Subset of the JWT payload logged after authentication.
#[derive(Debug, Default, Deserialize)]
pub struct TokenClaims {
    #[serde(default)]
    pub roles: Option<Vec<String>>,
    #[serde(default)]
    pub scp: Option<String>,
    #[serde(default)]
    pub appid: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PlannerPlan {
    pub id: String,
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannerBucket {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub plan_id: Option<String>,
    #[serde(default)]
    pub order_hint: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannerTask {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub percent_complete: i32,
    #[serde(default)]
    pub priority: Option<i32>,
    #[serde(default)]
    pub due_date_time: Option<String>,
    #[serde(default)]
    pub created_date_time: Option<String>,
    #[serde(default)]
    pub bucket_id: Option<String>,
    /// user id -> assignment object; Graph reports removed entries as null.
    #[serde(default)]
    pub assignments: BTreeMap<String, Option<Value>>,
    #[serde(rename = "@odata.etag", default)]
    pub etag: Option<String>,
}

impl PlannerTask {
    /// Users with a live (non-null) assignment.
    pub fn assigned_user_ids(&self) -> impl Iterator<Item = &String> {
        self.assignments
            .iter()
            .filter(|(_, marker)| marker.as_ref().is_some_and(|m| !m.is_null()))
            .map(|(id, _)| id)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskBody {
    pub plan_id: String,
    pub title: String,
    pub priority: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bucket_id: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub assignments: BTreeMap<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct CreatedTask {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
}
