use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use planner_bridge::api::router;
use planner_bridge::config::PlannerConfig;
use planner_bridge::planner::{PlannerClient, PlannerHttpClient};
use planner_bridge::services::{PollingCoordinator, validate_setup};
use planner_bridge::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "planner_bridge=debug".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = PlannerConfig::new_from_env()?;
    let planner: Arc<dyn PlannerClient> = Arc::new(PlannerHttpClient::new(&config)?);

    let setup = validate_setup(
        planner.as_ref(),
        &config.credentials.tenant_id,
        &config.plan_name,
    )
    .await
    .inspect_err(|e| error!("setup failed: {}", e))?;
    info!("{} ready ({})", setup.title, setup.unique_id);

    let coordinator = Arc::new(PollingCoordinator::new(
        planner.clone(),
        config.plan_name.clone(),
        config.poll_interval,
    ));
    tokio::spawn(coordinator.clone().start());

    let app = router(AppState::new(planner, coordinator));

    info!("listening on http://{}", config.bind_addr);
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
