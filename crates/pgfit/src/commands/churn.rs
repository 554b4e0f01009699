use std::time::Duration;

use anyhow::{Context, Result};
use pgfit_db::{ChurnGenerator, ChurnPools, ConnectionPool};

/// runs the churn command: write-heavy order churn for a fixed duration
pub async fn run(
    database_url: &str,
    seconds: u64,
    items_per_order: u32,
    delete_ratio: f64,
    toggle_ratio: f64,
    sleep_ms: u64,
    seed: u64,
) -> Result<()> {
    let conn = ConnectionPool::new(database_url)
        .await
        .context("Failed to connect to database")?;

    conn.test_connection()
        .await
        .context("Failed to test database connection")?;

    let mut pools = ChurnPools::load(conn.pool())
        .await
        .context("Failed to load id pools")?;

    let seconds = seconds.max(1);
    println!("Churning orders for {} second(s)...", seconds);

    let mut generator = ChurnGenerator::with_seed(seed)
        .items_per_order(items_per_order)
        .delete_ratio(delete_ratio)
        .toggle_ratio(toggle_ratio)
        .with_delay(Duration::from_millis(sleep_ms));
    let stats = generator
        .run(conn.pool(), &mut pools, Duration::from_secs(seconds))
        .await
        .context("Churn run failed")?;

    println!(
        "Done. ops={} created_orders={} deleted_orders={} toggled_orders={}",
        stats.ops, stats.created, stats.deleted, stats.toggled
    );

    Ok(())
}
