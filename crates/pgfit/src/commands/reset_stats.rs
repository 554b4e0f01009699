use anyhow::{Context, Result};
use colored::Colorize;
use pgfit_db::{ConnectionPool, reset_statistics};

/// runs the reset-stats command against the statistics collector
pub async fn run(database_url: &str) -> Result<()> {
    let conn = ConnectionPool::new(database_url)
        .await
        .context("Failed to connect to database")?;

    conn.test_connection()
        .await
        .context("Failed to test database connection")?;

    reset_statistics(conn.pool())
        .await
        .context("Failed to reset statistics")?;

    println!("{}", "Statistics counters reset.".green());
    println!(
        "{}",
        "This wiped every cumulative scan count; the next report starts from zero.".yellow()
    );

    Ok(())
}
