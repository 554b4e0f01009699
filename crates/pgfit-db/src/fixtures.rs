use sqlx::PgPool;

use crate::error::Result;

/// DDL for the shop schema, applied statement by statement
///
/// The secondary indexes are deliberately over-provisioned: several
/// shadow a constraint index or share a leading key with a wider index.
/// They are what gives the health report something to flag.
const SCHEMA_DDL: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS shop_products (
        id BIGSERIAL PRIMARY KEY,
        sku VARCHAR(32) NOT NULL UNIQUE,
        name TEXT NOT NULL,
        category TEXT NOT NULL,
        is_active BOOLEAN NOT NULL DEFAULT TRUE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS shop_customers (
        id BIGSERIAL PRIMARY KEY,
        email TEXT NOT NULL UNIQUE,
        full_name TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS shop_orders (
        id BIGSERIAL PRIMARY KEY,
        customer_id BIGINT NOT NULL REFERENCES shop_customers (id) ON DELETE CASCADE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        cancelled_at TIMESTAMPTZ
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS shop_order_items (
        id BIGSERIAL PRIMARY KEY,
        order_id BIGINT NOT NULL REFERENCES shop_orders (id) ON DELETE CASCADE,
        product_id BIGINT NOT NULL REFERENCES shop_products (id) ON DELETE CASCADE,
        quantity INTEGER NOT NULL DEFAULT 1 CHECK (quantity > 0)
    )
    "#,
    // Products: a non-unique copy of the unique sku index, a low-value
    // boolean index, and a plain/functional pair on name
    "CREATE INDEX IF NOT EXISTS idx_product_sku_nonunique ON shop_products (sku)",
    "CREATE INDEX IF NOT EXISTS idx_product_is_active ON shop_products (is_active)",
    "CREATE INDEX IF NOT EXISTS idx_product_name_plain ON shop_products (name)",
    "CREATE INDEX IF NOT EXISTS idx_product_name_lower ON shop_products (lower(name))",
    // Customers: the plain index shadows the unique constraint, the
    // functional one is what the email lookup actually needs
    "CREATE INDEX IF NOT EXISTS idx_customer_email_plain ON shop_customers (email)",
    "CREATE INDEX IF NOT EXISTS idx_customer_email_lower ON shop_customers (lower(email))",
    // Orders: three indexes lead on customer_id, two on cancelled_at
    "CREATE INDEX IF NOT EXISTS idx_order_customer_created_at ON shop_orders (customer_id, created_at)",
    "CREATE INDEX IF NOT EXISTS idx_order_customer_only ON shop_orders (customer_id)",
    "CREATE INDEX IF NOT EXISTS idx_order_cust_inc_created ON shop_orders (customer_id) INCLUDE (created_at)",
    "CREATE INDEX IF NOT EXISTS idx_order_cancelled_full ON shop_orders (cancelled_at)",
    "CREATE INDEX IF NOT EXISTS idx_order_cancelled_partial ON shop_orders (cancelled_at) WHERE cancelled_at IS NULL",
    // Order items: composite in both column orders plus a redundant
    // single-column prefix
    "CREATE INDEX IF NOT EXISTS idx_orderitem_order_product ON shop_order_items (order_id, product_id)",
    "CREATE INDEX IF NOT EXISTS idx_oi_prod_order_bad ON shop_order_items (product_id, order_id)",
    "CREATE INDEX IF NOT EXISTS idx_orderitem_order_only ON shop_order_items (order_id)",
];

/// Create the shop tables and their full index roster. Idempotent.
pub async fn ensure_schema(pool: &PgPool) -> Result<()> {
    for statement in SCHEMA_DDL {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}

/// Small deterministic dataset for integration tests: 100 products,
/// 50 customers, 200 orders with two items each, one order in ten
/// already cancelled
pub async fn create_small_dataset(pool: &PgPool) -> Result<()> {
    ensure_schema(pool).await?;

    for i in 0..100 {
        sqlx::query(
            "INSERT INTO shop_products (sku, name, category) VALUES ($1, $2, $3) \
             ON CONFLICT (sku) DO NOTHING",
        )
        .bind(format!("SKU-TEST-{:04}", i))
        .bind(format!("Test product {}", i))
        .bind("test")
        .execute(pool)
        .await?;
    }

    for i in 0..50 {
        sqlx::query(
            "INSERT INTO shop_customers (email, full_name) VALUES ($1, $2) \
             ON CONFLICT (email) DO NOTHING",
        )
        .bind(format!("user{}@example.com", i))
        .bind(format!("Test User {}", i))
        .execute(pool)
        .await?;
    }

    let product_ids: Vec<i64> = sqlx::query_scalar("SELECT id FROM shop_products ORDER BY id")
        .fetch_all(pool)
        .await?;
    let customer_ids: Vec<i64> = sqlx::query_scalar("SELECT id FROM shop_customers ORDER BY id")
        .fetch_all(pool)
        .await?;

    for i in 0..200_usize {
        let customer_id = customer_ids[i % customer_ids.len()];
        let cancelled = i % 10 == 0;

        let order_id: i64 = sqlx::query_scalar(
            "INSERT INTO shop_orders (customer_id, cancelled_at) \
             VALUES ($1, CASE WHEN $2 THEN now() END) RETURNING id",
        )
        .bind(customer_id)
        .bind(cancelled)
        .fetch_one(pool)
        .await?;

        for k in 0..2_usize {
            sqlx::query(
                "INSERT INTO shop_order_items (order_id, product_id, quantity) \
                 VALUES ($1, $2, $3)",
            )
            .bind(order_id)
            .bind(product_ids[(i * 2 + k) % product_ids.len()])
            .bind(1 + (i % 3) as i32)
            .execute(pool)
            .await?;
        }
    }

    Ok(())
}

/// Drop the shop tables, children first
pub async fn drop_schema(pool: &PgPool) -> Result<()> {
    sqlx::query("DROP TABLE IF EXISTS shop_order_items")
        .execute(pool)
        .await?;
    sqlx::query("DROP TABLE IF EXISTS shop_orders")
        .execute(pool)
        .await?;
    sqlx::query("DROP TABLE IF EXISTS shop_customers")
        .execute(pool)
        .await?;
    sqlx::query("DROP TABLE IF EXISTS shop_products")
        .execute(pool)
        .await?;
    Ok(())
}
