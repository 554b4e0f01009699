use crate::output::{OutputFormat, print_report};
use anyhow::{Context, Result};
use pgfit_core::health::annotate;
use pgfit_db::{ConnectionPool, fetch_index_stats};

/// runs the report command: snapshot the catalog and flag redundant indexes
pub async fn run(database_url: &str, prefix: &str, format: OutputFormat) -> Result<()> {
    let conn = ConnectionPool::new(database_url)
        .await
        .context("Failed to connect to database")?;

    conn.test_connection()
        .await
        .context("Failed to test database connection")?;

    let snapshot = fetch_index_stats(conn.pool(), prefix)
        .await
        .context("Failed to read the index statistics catalog")?;

    let report = annotate(snapshot);
    print_report(prefix, &report, &format);

    Ok(())
}
