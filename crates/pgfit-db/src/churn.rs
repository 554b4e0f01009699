use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sqlx::PgPool;

use crate::error::Result;
use crate::pools::ChurnPools;
use crate::simulate::DEFAULT_SEED;
use pgfit_core::workload::ChurnAction;

/// Counters reported by a churn run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChurnStats {
    /// Iterations completed, toggles and churns together
    pub ops: u64,
    /// Orders created (including those deleted again moments later)
    pub created: u64,
    /// Orders deleted by the churn branch
    pub deleted: u64,
    /// Cancellation toggles attempted against existing order ids
    pub toggled: u64,
}

/// Write-heavy churn driver
///
/// Each iteration flips a weighted coin: either toggle the cancellation
/// state of a random known order, or create a fresh order with items and
/// usually delete it straight away. The point is dead tuples and index
/// bloat, not realistic shop traffic.
pub struct ChurnGenerator {
    items_per_order: u32,
    delete_ratio: f64,
    toggle_ratio: f64,
    delay: Option<Duration>,
    rng: StdRng,
}

impl Default for ChurnGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl ChurnGenerator {
    /// Generator with the default knobs and the default seed
    pub fn new() -> Self {
        Self::with_seed(DEFAULT_SEED)
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            items_per_order: 5,
            delete_ratio: 0.9,
            toggle_ratio: 0.5,
            delay: None,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Line items per churned order, floored to 1
    pub fn items_per_order(mut self, items: u32) -> Self {
        self.items_per_order = items.max(1);
        self
    }

    /// Probability that a churned order is deleted again, clamped to [0, 1]
    pub fn delete_ratio(mut self, ratio: f64) -> Self {
        self.delete_ratio = ratio.clamp(0.0, 1.0);
        self
    }

    /// Probability that an iteration toggles instead of churning, clamped to [0, 1]
    pub fn toggle_ratio(mut self, ratio: f64) -> Self {
        self.toggle_ratio = ratio.clamp(0.0, 1.0);
        self
    }

    /// Sleep between operations; zero disables throttling
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = if delay.is_zero() { None } else { Some(delay) };
        self
    }

    /// Generate churn until the deadline
    ///
    /// Requires products and customers up front; the order pool may start
    /// empty, in which case the first iterations churn until it fills.
    /// Counters only move once an action has committed. A transient error
    /// rolls its statement or transaction back and the loop moves on; any
    /// other error stops the run.
    pub async fn run(
        &mut self,
        pool: &PgPool,
        pools: &mut ChurnPools,
        duration: Duration,
    ) -> Result<ChurnStats> {
        pools.require_loaded()?;

        let coin = ChurnAction::coin(self.toggle_ratio);
        let deadline = Instant::now() + duration;
        let mut stats = ChurnStats::default();

        while Instant::now() < deadline {
            let action = if pools.order_ids.is_empty() {
                // Nothing to toggle yet
                ChurnAction::OrderChurn
            } else {
                let r = self.rng.random::<f64>();
                *coin.pick(r)
            };

            let outcome = match action {
                ChurnAction::ToggleCancellation => {
                    self.toggle_existing(pool, pools, &mut stats).await
                }
                ChurnAction::OrderChurn => self.churn_order(pool, pools, &mut stats).await,
            };

            match outcome {
                Ok(()) => {}
                Err(e) if e.is_transient() => {}
                Err(e) => return Err(e),
            }
            stats.ops += 1;

            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
        }

        Ok(stats)
    }

    async fn toggle_existing(
        &mut self,
        pool: &PgPool,
        pools: &ChurnPools,
        stats: &mut ChurnStats,
    ) -> Result<()> {
        let Some(order_id) = pools.order_ids.choose(&mut self.rng).copied() else {
            return Ok(());
        };

        toggle_cancellation(pool, order_id).await?;
        // Counts the attempt: a toggle against an id the churn branch
        // already deleted matches zero rows and that is fine
        stats.toggled += 1;

        Ok(())
    }

    async fn churn_order(
        &mut self,
        pool: &PgPool,
        pools: &mut ChurnPools,
        stats: &mut ChurnStats,
    ) -> Result<()> {
        let Some(customer_id) = pools.customer_ids.choose(&mut self.rng).copied() else {
            return Ok(());
        };

        // Draw all randomness before touching the database so the RNG
        // stream stays deterministic whatever the storage does
        let item_count = self.items_per_order as usize;
        let mut product_ids = Vec::with_capacity(item_count);
        let mut quantities = Vec::with_capacity(item_count);
        for _ in 0..item_count {
            let Some(product_id) = pools.product_ids.choose(&mut self.rng).copied() else {
                return Ok(());
            };
            product_ids.push(product_id);
            quantities.push(self.rng.random_range(1..=5_i32));
        }
        let delete_after = self.rng.random::<f64>() < self.delete_ratio;

        let mut tx = pool.begin().await?;

        let order_id: i64 = sqlx::query_scalar(
            "INSERT INTO shop_orders (customer_id) VALUES ($1) RETURNING id",
        )
        .bind(customer_id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO shop_order_items (order_id, product_id, quantity)
            SELECT $1, item.product_id, item.quantity
            FROM UNNEST($2::bigint[], $3::int[]) AS item(product_id, quantity)
            "#,
        )
        .bind(order_id)
        .bind(&product_ids)
        .bind(&quantities)
        .execute(&mut *tx)
        .await?;

        if delete_after {
            sqlx::query("DELETE FROM shop_orders WHERE id = $1")
                .bind(order_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        // Deleted ids go into the pool too: the toggle branch feeds on
        // them to produce zero-row updates against vanished orders
        pools.order_ids.push(order_id);
        stats.created += 1;
        if delete_after {
            stats.deleted += 1;
        }

        Ok(())
    }
}

/// Flip one order's cancellation state with guarded updates
///
/// Cancels an open order; when that matches nothing (already cancelled,
/// or gone) the reverse update runs instead. Both guards are plain WHERE
/// preconditions, so concurrent generators race without locking: one
/// matches, the other updates zero rows.
pub async fn toggle_cancellation(pool: &PgPool, order_id: i64) -> Result<()> {
    let cancelled = sqlx::query(
        "UPDATE shop_orders SET cancelled_at = now() \
         WHERE id = $1 AND cancelled_at IS NULL",
    )
    .bind(order_id)
    .execute(pool)
    .await?;

    if cancelled.rows_affected() == 0 {
        sqlx::query(
            "UPDATE shop_orders SET cancelled_at = NULL \
             WHERE id = $1 AND cancelled_at IS NOT NULL",
        )
        .bind(order_id)
        .execute(pool)
        .await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_clamps_ratios() {
        let generator = ChurnGenerator::new().delete_ratio(1.7).toggle_ratio(-0.3);
        assert_eq!(generator.delete_ratio, 1.0);
        assert_eq!(generator.toggle_ratio, 0.0);
    }

    #[test]
    fn test_builder_floors_items_per_order() {
        let generator = ChurnGenerator::new().items_per_order(0);
        assert_eq!(generator.items_per_order, 1);
    }

    #[test]
    fn test_builder_defaults() {
        let generator = ChurnGenerator::new();
        assert_eq!(generator.items_per_order, 5);
        assert_eq!(generator.delete_ratio, 0.9);
        assert_eq!(generator.toggle_ratio, 0.5);
        assert!(generator.delay.is_none());
    }
}
