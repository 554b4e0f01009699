use pgfit::commands::{churn, report, reset_stats, seed, simulate};
use pgfit::output::OutputFormat;
use pgfit_db::fixtures;
use pgfit_db::test_utils::TestDb;

/// Test end-to-end seed command at the smallest scale
#[tokio::test]
async fn test_seed_command() {
    let test_db = TestDb::new().await.expect("Failed to create test database");

    let result = seed::run(test_db.database_url(), 1).await;

    assert!(result.is_ok(), "Seed command failed: {:?}", result.err());

    let products: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM shop_products")
        .fetch_one(&test_db.pool)
        .await
        .expect("Failed to count products");
    assert_eq!(products, 1_000);

    test_db.cleanup().await.expect("Failed to cleanup");
}

/// Test a zero scale is floored rather than rejected
#[tokio::test]
async fn test_seed_command_floors_scale() {
    let test_db = TestDb::new().await.expect("Failed to create test database");

    let result = seed::run(test_db.database_url(), 0).await;

    assert!(result.is_ok(), "Seed command failed: {:?}", result.err());

    let customers: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM shop_customers")
        .fetch_one(&test_db.pool)
        .await
        .expect("Failed to count customers");
    assert_eq!(customers, 500);

    test_db.cleanup().await.expect("Failed to cleanup");
}

/// Test end-to-end simulate command against the small fixture
#[tokio::test]
async fn test_simulate_command() {
    let test_db = TestDb::new().await.expect("Failed to create test database");

    fixtures::create_small_dataset(&test_db.pool)
        .await
        .expect("Failed to create fixture");

    let result = simulate::run(test_db.database_url(), 1, 0).await;

    assert!(result.is_ok(), "Simulate command failed: {:?}", result.err());

    test_db.cleanup().await.expect("Failed to cleanup");
}

/// Test simulate refuses to run against empty tables
#[tokio::test]
async fn test_simulate_requires_seeded_data() {
    let test_db = TestDb::new().await.expect("Failed to create test database");

    fixtures::ensure_schema(&test_db.pool)
        .await
        .expect("Failed to create schema");

    let result = simulate::run(test_db.database_url(), 1, 0).await;

    assert!(result.is_err(), "Expected error for empty tables");

    test_db.cleanup().await.expect("Failed to cleanup");
}

/// Test end-to-end churn command against the small fixture
#[tokio::test]
async fn test_churn_command() {
    let test_db = TestDb::new().await.expect("Failed to create test database");

    fixtures::create_small_dataset(&test_db.pool)
        .await
        .expect("Failed to create fixture");

    let result = churn::run(test_db.database_url(), 1, 5, 0.9, 0.5, 0, 123).await;

    assert!(result.is_ok(), "Churn command failed: {:?}", result.err());

    test_db.cleanup().await.expect("Failed to cleanup");
}

/// Test churn accepts out-of-range knobs by clamping them
#[tokio::test]
async fn test_churn_command_clamps_knobs() {
    let test_db = TestDb::new().await.expect("Failed to create test database");

    fixtures::create_small_dataset(&test_db.pool)
        .await
        .expect("Failed to create fixture");

    let result = churn::run(test_db.database_url(), 1, 0, 1.7, -0.3, 0, 7).await;

    assert!(result.is_ok(), "Churn command failed: {:?}", result.err());

    test_db.cleanup().await.expect("Failed to cleanup");
}

/// Test the full workflow: seed, reset counters, load, report
#[tokio::test]
async fn test_full_workflow() {
    let test_db = TestDb::new().await.expect("Failed to create test database");
    let url = test_db.database_url();

    seed::run(url, 1).await.expect("Seed failed");
    reset_stats::run(url).await.expect("Reset-stats failed");
    simulate::run(url, 1, 0).await.expect("Simulate failed");
    churn::run(url, 1, 5, 0.9, 0.5, 0, 123)
        .await
        .expect("Churn failed");
    report::run(url, "shop_", OutputFormat::Table)
        .await
        .expect("Report failed");

    test_db.cleanup().await.expect("Failed to cleanup");
}
