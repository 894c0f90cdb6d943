use std::sync::Arc;

use crate::planner::PlannerClient;
use crate::services::{PollingCoordinator, TodoList};

#[derive(Clone)]
pub struct AppState {
    pub planner: Arc<dyn PlannerClient>,
    pub coordinator: Arc<PollingCoordinator>,
    pub todo: Arc<TodoList>,
}

impl AppState {
    pub fn new(planner: Arc<dyn PlannerClient>, coordinator: Arc<PollingCoordinator>) -> Self {
        let todo = Arc::new(TodoList::new(planner.clone(), coordinator.clone()));
        Self {
            planner,
            coordinator,
            todo,
        }
    }

    /// Plan targeted by a service call: the override when given, else the configured plan.
    pub fn target_plan(&self, plan_name: Option<&str>) -> String {
        plan_name
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .unwrap_or(self.coordinator.plan_name())
            .to_string()
    }
}
