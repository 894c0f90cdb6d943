mod common;

use planner_bridge::services::{SetupError, validate_setup};

use common::fake::FakePlanner;

#[tokio::test]
async fn known_plan_yields_entry_identity() {
    let planner = FakePlanner::default();

    let info = validate_setup(&planner, "contoso", "Chores").await.expect("setup");

    assert_eq!(info.title, "Planner: Chores");
    assert_eq!(info.unique_id, "contoso_Chores");
}

#[tokio::test]
async fn missing_plan_lists_what_exists() {
    let planner = FakePlanner::default();

    let err = validate_setup(&planner, "contoso", "chores").await.expect_err("case-sensitive");

    match err {
        SetupError::PlanMissing { plan_name, available } => {
            assert_eq!(plan_name, "chores");
            assert_eq!(available, vec!["Chores".to_string()]);
        }
        other => panic!("unexpected error: {:?}", other),
    }
}
