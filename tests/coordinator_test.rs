mod common;

use std::sync::Arc;
use std::time::Duration;

use planner_bridge::services::{OpenTasksSensor, PollingCoordinator};

use common::fake::{FakePlanner, open_task};

#[tokio::test]
async fn test_coordinator_initialization() {
    let planner = Arc::new(FakePlanner::default());

    let coordinator = PollingCoordinator::new(planner.clone(), "Chores", Duration::from_secs(300));

    assert_eq!(coordinator.plan_name(), "Chores");
    assert_eq!(coordinator.interval(), Duration::from_secs(300));
    assert!(coordinator.snapshot().await.is_none());
    assert!(!coordinator.last_update_success().await);
    assert_eq!(planner.snapshots_taken(), 0);
}

#[tokio::test]
async fn test_refresh_records_snapshot_and_success() {
    let planner = Arc::new(FakePlanner {
        open_tasks: vec![open_task("t1", "Mow lawn", 1), open_task("t2", "Dishes", 5)],
        ..Default::default()
    });
    let coordinator = PollingCoordinator::new(planner.clone(), "Chores", Duration::from_secs(300));

    let snapshot = coordinator.refresh().await;
    assert_eq!(snapshot.total_open, 2);

    let state = coordinator.state().await;
    assert!(state.last_update_success);
    assert!(state.last_updated.is_some());
    assert_eq!(state.snapshot.as_ref().map(|s| s.total_open), Some(2));

    let sensor = OpenTasksSensor::from_state(&state);
    assert_eq!(sensor.state, 2);
    assert!(sensor.available);
    assert_eq!(sensor.attributes.and_then(|a| a.high_priority_tasks), Some(1));
}

#[tokio::test]
async fn test_error_snapshot_keeps_sensor_available() {
    let planner = Arc::new(FakePlanner {
        fail_snapshots: true,
        ..Default::default()
    });
    let coordinator = PollingCoordinator::new(planner, "Chores", Duration::from_secs(300));

    let snapshot = coordinator.refresh().await;

    assert!(snapshot.error.is_some());
    assert!(coordinator.last_update_success().await);
    assert_eq!(coordinator.snapshot().await, Some(snapshot));

    let sensor = OpenTasksSensor::from_state(&coordinator.state().await);
    assert!(sensor.available);
    assert_eq!(sensor.state, 0);
    assert_eq!(
        sensor.attributes.and_then(|a| a.error).as_deref(),
        Some("Graph API error 503")
    );
}

#[tokio::test]
async fn test_coordinator_short_interval() {
    let planner = Arc::new(FakePlanner::default());
    let coordinator = Arc::new(PollingCoordinator::new(
        planner.clone(),
        "Chores",
        Duration::from_millis(200),
    ));

    let task = tokio::spawn(coordinator.clone().start());

    tokio::time::sleep(Duration::from_millis(700)).await;
    task.abort();

    // one immediate refresh plus at least two ticks
    assert!(planner.snapshots_taken() >= 3, "took {}", planner.snapshots_taken());
}

#[tokio::test]
async fn test_request_refresh_wakes_the_loop() {
    let planner = Arc::new(FakePlanner::default());
    let coordinator = Arc::new(PollingCoordinator::new(
        planner.clone(),
        "Chores",
        Duration::from_secs(3600),
    ));

    let task = tokio::spawn(coordinator.clone().start());
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(planner.snapshots_taken(), 1);

    coordinator.request_refresh();
    tokio::time::sleep(Duration::from_millis(100)).await;
    task.abort();

    assert_eq!(planner.snapshots_taken(), 2);
}
