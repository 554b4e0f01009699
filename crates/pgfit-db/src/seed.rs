use indicatif::{ProgressBar, ProgressStyle};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sqlx::{PgPool, Postgres, Transaction};

use crate::error::{Error, Result};
use crate::fixtures;

/// Seed for demo-data generation, distinct from the workload seed so
/// reseeding never disturbs a generator's draw sequence
const SEED: u64 = 42;

/// Rows inserted per UNNEST batch
const INSERT_BATCH: u64 = 1_000;

/// Base row counts at scale 1
const PRODUCT_BASE: u64 = 1_000;
const CUSTOMER_BASE: u64 = 500;
const ORDER_BASE: u64 = 2_000;

const CATEGORIES: &[&str] = &["books", "electronics", "garden", "grocery", "sports", "toys"];

const SKU_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

const PRODUCT_INSERT: &str = r#"
    INSERT INTO shop_products (sku, name, category, is_active)
    SELECT t.sku, t.name, t.category, t.is_active
    FROM UNNEST($1::text[], $2::text[], $3::text[], $4::boolean[])
        AS t(sku, name, category, is_active)
    ON CONFLICT (sku) DO NOTHING
    "#;

const CUSTOMER_INSERT: &str = r#"
    INSERT INTO shop_customers (email, full_name)
    SELECT t.email, t.full_name
    FROM UNNEST($1::text[], $2::text[]) AS t(email, full_name)
    ON CONFLICT (email) DO NOTHING
    "#;

/// Timestamps are computed server-side from day/hour offsets; a negative
/// cancel_hours means the order stays open
const ORDER_INSERT: &str = r#"
    INSERT INTO shop_orders (customer_id, created_at, cancelled_at)
    SELECT
        t.customer_id,
        now() - (t.age_days * interval '1 day'),
        CASE WHEN t.cancel_hours >= 0.0
             THEN now() - (t.age_days * interval '1 day') + (t.cancel_hours * interval '1 hour')
        END
    FROM UNNEST($1::bigint[], $2::float8[], $3::float8[])
        AS t(customer_id, age_days, cancel_hours)
    RETURNING id
    "#;

const ITEM_INSERT: &str = r#"
    INSERT INTO shop_order_items (order_id, product_id, quantity)
    SELECT t.order_id, t.product_id, t.quantity
    FROM UNNEST($1::bigint[], $2::bigint[], $3::int[])
        AS t(order_id, product_id, quantity)
    "#;

/// Row counts after a seeding run
#[derive(Debug, Clone, Copy, Default)]
pub struct SeedSummary {
    pub products: u64,
    pub customers: u64,
    pub orders: u64,
    pub order_items: u64,
}

/// Ensure the shop schema and top up demo data to scale-derived targets
///
/// Targets are 1000 products, 500 customers and 2000 orders per unit of
/// scale, with one to five items per new order. Only the shortfall is
/// inserted, so re-running with the same scale is a no-op; all inserts
/// happen in one transaction. Order ages spread over the last year and
/// about one order in twenty is already cancelled, which gives the
/// open-order scan something to skip.
pub async fn seed_demo_data(pool: &PgPool, scale: u32) -> Result<SeedSummary> {
    fixtures::ensure_schema(pool).await?;

    let scale = u64::from(scale.max(1));
    let mut rng = StdRng::seed_from_u64(SEED);

    let existing_products = count_rows(pool, "shop_products").await?;
    let existing_customers = count_rows(pool, "shop_customers").await?;
    let existing_orders = count_rows(pool, "shop_orders").await?;

    let missing_products = (PRODUCT_BASE * scale).saturating_sub(existing_products);
    let missing_customers = (CUSTOMER_BASE * scale).saturating_sub(existing_customers);
    let missing_orders = (ORDER_BASE * scale).saturating_sub(existing_orders);
    let total_new = missing_products + missing_customers + missing_orders;

    let progress = ProgressBar::new(total_new);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} rows")
            .expect("Invalid progress bar template")
            .progress_chars("█▓▒░"),
    );

    let mut tx = pool.begin().await?;

    seed_products(&mut tx, &mut rng, existing_products, missing_products, &progress).await?;
    seed_customers(&mut tx, existing_customers, missing_customers, &progress).await?;
    let new_order_ids = seed_orders(&mut tx, &mut rng, missing_orders, &progress).await?;
    seed_items(&mut tx, &mut rng, &new_order_ids).await?;

    tx.commit().await?;
    progress.finish_with_message(format!("Seeded {} new rows", total_new));

    Ok(SeedSummary {
        products: count_rows(pool, "shop_products").await?,
        customers: count_rows(pool, "shop_customers").await?,
        orders: count_rows(pool, "shop_orders").await?,
        order_items: count_rows(pool, "shop_order_items").await?,
    })
}

async fn seed_products(
    tx: &mut Transaction<'_, Postgres>,
    rng: &mut StdRng,
    existing: u64,
    missing: u64,
    progress: &ProgressBar,
) -> Result<()> {
    let mut next_index = existing;

    let mut remaining = missing;
    while remaining > 0 {
        let batch = remaining.min(INSERT_BATCH);
        let mut skus = Vec::with_capacity(batch as usize);
        let mut names = Vec::with_capacity(batch as usize);
        let mut categories = Vec::with_capacity(batch as usize);
        let mut actives = Vec::with_capacity(batch as usize);

        for _ in 0..batch {
            skus.push(random_sku(rng));
            names.push(format!("Product {}", next_index));
            categories.push(CATEGORIES[rng.random_range(0..CATEGORIES.len())].to_string());
            actives.push(rng.random::<f64>() < 0.9);
            next_index += 1;
        }

        sqlx::query(PRODUCT_INSERT)
            .bind(&skus)
            .bind(&names)
            .bind(&categories)
            .bind(&actives)
            .execute(&mut **tx)
            .await?;

        progress.inc(batch);
        remaining -= batch;
    }

    Ok(())
}

async fn seed_customers(
    tx: &mut Transaction<'_, Postgres>,
    existing: u64,
    missing: u64,
    progress: &ProgressBar,
) -> Result<()> {
    let mut next_index = existing;

    let mut remaining = missing;
    while remaining > 0 {
        let batch = remaining.min(INSERT_BATCH);
        let mut emails = Vec::with_capacity(batch as usize);
        let mut names = Vec::with_capacity(batch as usize);

        for _ in 0..batch {
            emails.push(format!("user{}@example.com", next_index));
            names.push(format!("User {}", next_index));
            next_index += 1;
        }

        sqlx::query(CUSTOMER_INSERT)
            .bind(&emails)
            .bind(&names)
            .execute(&mut **tx)
            .await?;

        progress.inc(batch);
        remaining -= batch;
    }

    Ok(())
}

async fn seed_orders(
    tx: &mut Transaction<'_, Postgres>,
    rng: &mut StdRng,
    missing: u64,
    progress: &ProgressBar,
) -> Result<Vec<i64>> {
    if missing == 0 {
        return Ok(Vec::new());
    }

    let customer_ids: Vec<i64> = sqlx::query_scalar("SELECT id FROM shop_customers ORDER BY id")
        .fetch_all(&mut **tx)
        .await?;
    if customer_ids.is_empty() {
        return Err(Error::InsufficientData { pool: "customer id" });
    }

    let mut new_order_ids = Vec::with_capacity(missing as usize);
    let mut remaining = missing;
    while remaining > 0 {
        let batch = remaining.min(INSERT_BATCH);
        let mut customers = Vec::with_capacity(batch as usize);
        let mut ages = Vec::with_capacity(batch as usize);
        let mut cancels = Vec::with_capacity(batch as usize);

        for _ in 0..batch {
            customers.push(customer_ids[rng.random_range(0..customer_ids.len())]);
            ages.push(rng.random_range(0.0..365.0));
            cancels.push(if rng.random::<f64>() < 0.05 {
                rng.random_range(1.0..72.0)
            } else {
                -1.0
            });
        }

        let ids: Vec<i64> = sqlx::query_scalar(ORDER_INSERT)
            .bind(&customers)
            .bind(&ages)
            .bind(&cancels)
            .fetch_all(&mut **tx)
            .await?;
        new_order_ids.extend(ids);

        progress.inc(batch);
        remaining -= batch;
    }

    Ok(new_order_ids)
}

async fn seed_items(
    tx: &mut Transaction<'_, Postgres>,
    rng: &mut StdRng,
    new_order_ids: &[i64],
) -> Result<()> {
    if new_order_ids.is_empty() {
        return Ok(());
    }

    let product_ids: Vec<i64> = sqlx::query_scalar("SELECT id FROM shop_products ORDER BY id")
        .fetch_all(&mut **tx)
        .await?;
    if product_ids.is_empty() {
        return Err(Error::InsufficientData { pool: "product id" });
    }

    let mut orders = Vec::new();
    let mut products = Vec::new();
    let mut quantities = Vec::new();

    for &order_id in new_order_ids {
        let item_count: u32 = rng.random_range(1..=5);
        for _ in 0..item_count {
            orders.push(order_id);
            products.push(product_ids[rng.random_range(0..product_ids.len())]);
            quantities.push(rng.random_range(1..=5_i32));
        }

        if orders.len() >= INSERT_BATCH as usize {
            flush_items(tx, &mut orders, &mut products, &mut quantities).await?;
        }
    }
    flush_items(tx, &mut orders, &mut products, &mut quantities).await?;

    Ok(())
}

async fn flush_items(
    tx: &mut Transaction<'_, Postgres>,
    orders: &mut Vec<i64>,
    products: &mut Vec<i64>,
    quantities: &mut Vec<i32>,
) -> Result<()> {
    if orders.is_empty() {
        return Ok(());
    }

    sqlx::query(ITEM_INSERT)
        .bind(&*orders)
        .bind(&*products)
        .bind(&*quantities)
        .execute(&mut **tx)
        .await?;

    orders.clear();
    products.clear();
    quantities.clear();

    Ok(())
}

async fn count_rows(pool: &PgPool, table: &str) -> Result<u64> {
    let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
        .fetch_one(pool)
        .await?;
    Ok(count as u64)
}

fn random_sku(rng: &mut StdRng) -> String {
    let tail: String = (0..10)
        .map(|_| SKU_CHARSET[rng.random_range(0..SKU_CHARSET.len())] as char)
        .collect();
    format!("SKU-{}", tail)
}
