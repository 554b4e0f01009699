use anyhow::{Context, Result};
use colored::Colorize;
use pgfit_db::{ConnectionPool, seed_demo_data};

/// runs the seed command to create and fill the demo schema
pub async fn run(database_url: &str, scale: u32) -> Result<()> {
    let conn = ConnectionPool::new(database_url)
        .await
        .context("Failed to connect to database")?;

    conn.test_connection()
        .await
        .context("Failed to test database connection")?;

    let scale = scale.max(1);
    println!("Seeding demo data at scale {}...", scale);

    let summary = seed_demo_data(conn.pool(), scale)
        .await
        .context("Failed to seed demo data")?;

    println!("\n{}", "Rows in place:".bold().green());
    println!("  Products:    {}", summary.products);
    println!("  Customers:   {}", summary.customers);
    println!("  Orders:      {}", summary.orders);
    println!("  Order items: {}", summary.order_items);

    Ok(())
}
