use futures::TryStreamExt;
use sqlx::PgPool;

use crate::error::{Error, Result};
use pgfit_core::IdPool;

/// Capacity of the product and customer pools
pub const ID_POOL_CAP: usize = 10_000;
/// Capacity of the order pool; orders churn faster so it runs deeper
pub const ORDER_POOL_CAP: usize = 20_000;

/// Identifier pools backing the read workload simulator
///
/// Loaded once before a run and never refreshed. Ids that vanish under
/// concurrent churn simply miss, which is part of the workload the
/// simulator is meant to produce.
#[derive(Debug)]
pub struct ReadPools {
    pub product_skus: IdPool<String>,
    pub customer_ids: IdPool<i64>,
    pub customer_emails: IdPool<String>,
    pub order_ids: IdPool<i64>,
}

impl ReadPools {
    /// Load every pool the read mix draws from
    pub async fn load(pool: &PgPool) -> Result<Self> {
        Ok(Self {
            product_skus: load_text_pool(
                pool,
                "SELECT sku FROM shop_products ORDER BY id LIMIT $1",
                ID_POOL_CAP,
            )
            .await?,
            customer_ids: load_id_pool(
                pool,
                "SELECT id FROM shop_customers ORDER BY id LIMIT $1",
                ID_POOL_CAP,
            )
            .await?,
            customer_emails: load_text_pool(
                pool,
                "SELECT email FROM shop_customers ORDER BY id LIMIT $1",
                ID_POOL_CAP,
            )
            .await?,
            order_ids: load_id_pool(
                pool,
                "SELECT id FROM shop_orders ORDER BY id LIMIT $1",
                ORDER_POOL_CAP,
            )
            .await?,
        })
    }

    /// Fail with the first empty pool, by name
    pub fn require_loaded(&self) -> Result<()> {
        if self.product_skus.is_empty() {
            return Err(Error::InsufficientData { pool: "product sku" });
        }
        if self.customer_ids.is_empty() {
            return Err(Error::InsufficientData { pool: "customer id" });
        }
        if self.customer_emails.is_empty() {
            return Err(Error::InsufficientData {
                pool: "customer email",
            });
        }
        if self.order_ids.is_empty() {
            return Err(Error::InsufficientData { pool: "order id" });
        }
        Ok(())
    }
}

/// Identifier pools backing the churn generator
#[derive(Debug)]
pub struct ChurnPools {
    pub product_ids: IdPool<i64>,
    pub customer_ids: IdPool<i64>,
    pub order_ids: IdPool<i64>,
}

impl ChurnPools {
    pub async fn load(pool: &PgPool) -> Result<Self> {
        Ok(Self {
            product_ids: load_id_pool(
                pool,
                "SELECT id FROM shop_products ORDER BY id LIMIT $1",
                ID_POOL_CAP,
            )
            .await?,
            customer_ids: load_id_pool(
                pool,
                "SELECT id FROM shop_customers ORDER BY id LIMIT $1",
                ID_POOL_CAP,
            )
            .await?,
            order_ids: load_id_pool(
                pool,
                "SELECT id FROM shop_orders ORDER BY id LIMIT $1",
                ORDER_POOL_CAP,
            )
            .await?,
        })
    }

    /// Products and customers must exist up front. The order pool may
    /// start empty: the churn branch creates orders and feeds it.
    pub fn require_loaded(&self) -> Result<()> {
        if self.product_ids.is_empty() {
            return Err(Error::InsufficientData { pool: "product id" });
        }
        if self.customer_ids.is_empty() {
            return Err(Error::InsufficientData { pool: "customer id" });
        }
        Ok(())
    }
}

async fn load_id_pool(pool: &PgPool, query: &str, cap: usize) -> Result<IdPool<i64>> {
    let mut ids = IdPool::new(cap);

    // Stream instead of fetch_all; the caps are modest but there is no
    // point buffering a second copy of the result set
    let mut rows = sqlx::query_scalar::<_, i64>(query)
        .bind(cap as i64)
        .fetch(pool);
    while let Some(id) = rows.try_next().await? {
        ids.push(id);
    }

    Ok(ids)
}

async fn load_text_pool(pool: &PgPool, query: &str, cap: usize) -> Result<IdPool<String>> {
    let mut values = IdPool::new(cap);

    let mut rows = sqlx::query_scalar::<_, String>(query)
        .bind(cap as i64)
        .fetch(pool);
    while let Some(value) = rows.try_next().await? {
        values.push(value);
    }

    Ok(values)
}
