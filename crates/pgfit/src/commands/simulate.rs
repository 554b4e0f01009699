use std::time::Duration;

use anyhow::{Context, Result};
use pgfit_db::{ConnectionPool, ReadPools, ReadSimulator};

/// runs the simulate command: a read-biased workload for a fixed duration
pub async fn run(database_url: &str, seconds: u64, sleep_ms: u64) -> Result<()> {
    let conn = ConnectionPool::new(database_url)
        .await
        .context("Failed to connect to database")?;

    conn.test_connection()
        .await
        .context("Failed to test database connection")?;

    let pools = ReadPools::load(conn.pool())
        .await
        .context("Failed to load id pools")?;

    let seconds = seconds.max(1);
    println!("Simulating reads for {} second(s)...", seconds);

    let mut simulator = ReadSimulator::new().with_delay(Duration::from_millis(sleep_ms));
    let ops = simulator
        .run(conn.pool(), &pools, Duration::from_secs(seconds))
        .await
        .context("Read simulation failed")?;

    println!("Completed {} operations.", ops);

    Ok(())
}
