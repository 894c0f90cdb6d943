use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::TaskSnapshot;
use crate::services::coordinator::CoordinatorState;

/// Priority values at or below this count as high priority.
pub const HIGH_PRIORITY_MAX: i32 = 3;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SensorTask {
    pub id: String,
    pub title: String,
    pub priority: i32,
    pub percent_complete: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignees: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SensorAttributes {
    pub plan_name: String,
    pub plan_id: Option<String>,
    pub total_open_tasks: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tasks: Option<Vec<SensorTask>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub high_priority_tasks: Option<usize>,
    pub last_updated: DateTime<Utc>,
}

/// Open-task counter with per-task attributes.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OpenTasksSensor {
    pub name: &'static str,
    pub icon: &'static str,
    pub state: usize,
    pub available: bool,
    pub attributes: Option<SensorAttributes>,
}

impl OpenTasksSensor {
    pub fn from_state(state: &CoordinatorState) -> Self {
        let attributes = state
            .snapshot
            .as_ref()
            .map(|snapshot| attributes_for(snapshot, state.last_updated.unwrap_or_else(Utc::now)));

        Self {
            name: "Open Tasks",
            icon: "mdi:clipboard-check-multiple-outline",
            state: state.snapshot.as_ref().map_or(0, |s| s.total_open),
            available: state.last_update_success,
            attributes,
        }
    }
}

pub fn attributes_for(snapshot: &TaskSnapshot, last_updated: DateTime<Utc>) -> SensorAttributes {
    let mut attributes = SensorAttributes {
        plan_name: snapshot.plan_name.clone(),
        plan_id: snapshot.plan_id.clone(),
        total_open_tasks: snapshot.total_open,
        error: snapshot.error.clone(),
        tasks: None,
        high_priority_tasks: None,
        last_updated,
    };

    if snapshot.open_tasks.is_empty() {
        return attributes;
    }

    let mut sorted: Vec<_> = snapshot.open_tasks.iter().collect();
    sorted.sort_by_key(|t| t.priority);

    attributes.tasks = Some(
        sorted
            .into_iter()
            .map(|t| SensorTask {
                id: t.id.clone(),
                title: t.title.clone(),
                priority: t.priority,
                percent_complete: t.percent_complete,
                due_date: t.due_date_time.clone(),
                assignees: (!t.assignees.is_empty()).then(|| t.assignees.clone()),
            })
            .collect(),
    );
    attributes.high_priority_tasks = Some(
        snapshot
            .open_tasks
            .iter()
            .filter(|t| t.priority <= HIGH_PRIORITY_MAX)
            .count(),
    );

    attributes
}
