use thiserror::Error;
use tracing::{error, info};

use crate::error::AppError;
use crate::planner::PlannerClient;

#[derive(Debug, Error)]
pub enum SetupError {
    #[error("invalid credentials: {0}")]
    InvalidAuth(#[source] AppError),

    #[error("Plan '{plan_name}' not found. Available plans: {available:?}")]
    PlanMissing { plan_name: String, available: Vec<String> },

    #[error("cannot connect: {0}")]
    CannotConnect(#[source] AppError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SetupInfo {
    pub title: String,
    pub unique_id: String,
}

/// Checks that the credentials authenticate and the plan is reachable before
/// anything is started.
pub async fn validate_setup(
    planner: &dyn PlannerClient,
    tenant_id: &str,
    plan_name: &str,
) -> Result<SetupInfo, SetupError> {
    planner.authenticate().await.map_err(|err| {
        error!("Authentication failed: {}", err);
        SetupError::InvalidAuth(err)
    })?;
    info!("Authentication successful for tenant: {}", tenant_id);

    info!("Attempting to find plan: {}", plan_name);
    let plan = planner.resolve_plan(plan_name).await.map_err(|err| {
        error!("Failed to retrieve plan: {}", err);
        SetupError::CannotConnect(err)
    })?;

    if plan.is_none() {
        let available: Vec<String> = planner
            .list_all_plans()
            .await
            .map(|plans| plans.into_iter().map(|p| p.title).collect())
            .unwrap_or_default();
        error!("Plan '{}' not found. Available plans: {:?}", plan_name, available);
        return Err(SetupError::PlanMissing {
            plan_name: plan_name.to_string(),
            available,
        });
    }

    Ok(SetupInfo {
        title: format!("Planner: {}", plan_name),
        unique_id: format!("{}_{}", tenant_id, plan_name),
    })
}
