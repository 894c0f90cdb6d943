use serde::{Deserialize, Serialize};

/// A Planner plan together with the group that owns it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Plan {
    pub id: String,
    pub title: String,
    pub group_id: String,
    pub group_name: Option<String>,
}
