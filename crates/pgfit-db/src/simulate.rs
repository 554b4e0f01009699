use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sqlx::PgPool;

use crate::error::Result;
use crate::pools::ReadPools;
use pgfit_core::workload::{ReadOp, WeightedBuckets};

/// Default RNG seed shared by the workload generators
pub const DEFAULT_SEED: u64 = 123;

/// Read-biased workload driver
///
/// Replays the shop's read mix against seeded data: SKU and email point
/// lookups, per-customer order lists, item lists and an open-order scan.
/// Keys are drawn uniformly with replacement from pre-loaded pools, so a
/// lookup that misses a churned row is a normal outcome, not a failure.
pub struct ReadSimulator {
    mix: WeightedBuckets<ReadOp>,
    delay: Option<Duration>,
    rng: StdRng,
}

impl Default for ReadSimulator {
    fn default() -> Self {
        Self::new()
    }
}

impl ReadSimulator {
    /// Simulator with the default mix and the default seed
    pub fn new() -> Self {
        Self::with_seed(DEFAULT_SEED)
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            mix: ReadOp::default_mix(),
            delay: None,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Replace the default operation mix
    pub fn with_mix(mut self, mix: WeightedBuckets<ReadOp>) -> Self {
        self.mix = mix;
        self
    }

    /// Sleep between operations; zero disables throttling
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = if delay.is_zero() { None } else { Some(delay) };
        self
    }

    /// Drive the read mix until the deadline, returning operations issued
    ///
    /// Aborts with InsufficientData before the first operation when any
    /// pool is empty. A transient miss still counts as one completed
    /// operation; any other database error stops the run.
    pub async fn run(
        &mut self,
        pool: &PgPool,
        pools: &ReadPools,
        duration: Duration,
    ) -> Result<u64> {
        pools.require_loaded()?;

        let deadline = Instant::now() + duration;
        let mut ops: u64 = 0;

        while Instant::now() < deadline {
            let r = self.rng.random::<f64>();
            let op = *self.mix.pick(r);

            match self.issue(pool, pools, op).await {
                Ok(()) => {}
                Err(e) if e.is_transient() => {}
                Err(e) => return Err(e),
            }
            ops += 1;

            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
        }

        Ok(ops)
    }

    /// Issue one operation. Point lookups use fetch_optional: a key that
    /// matches nothing is a non-event, the scan still happened.
    async fn issue(&mut self, pool: &PgPool, pools: &ReadPools, op: ReadOp) -> Result<()> {
        match op {
            ReadOp::ProductBySku => {
                let Some(sku) = pools.product_skus.choose(&mut self.rng) else {
                    return Ok(());
                };
                sqlx::query_scalar::<_, i64>("SELECT id FROM shop_products WHERE sku = $1")
                    .bind(sku)
                    .fetch_optional(pool)
                    .await?;
            }
            ReadOp::CustomerByEmail => {
                let Some(email) = pools.customer_emails.choose(&mut self.rng) else {
                    return Ok(());
                };
                sqlx::query_scalar::<_, i64>(
                    "SELECT id FROM shop_customers WHERE lower(email) = lower($1)",
                )
                .bind(email)
                .fetch_optional(pool)
                .await?;
            }
            ReadOp::RecentOrdersForCustomer => {
                let Some(customer_id) = pools.customer_ids.choose(&mut self.rng).copied() else {
                    return Ok(());
                };
                sqlx::query_scalar::<_, i64>(
                    "SELECT id FROM shop_orders WHERE customer_id = $1 \
                     ORDER BY created_at DESC LIMIT 50",
                )
                .bind(customer_id)
                .fetch_all(pool)
                .await?;
            }
            ReadOp::ItemsForOrder => {
                let Some(order_id) = pools.order_ids.choose(&mut self.rng).copied() else {
                    return Ok(());
                };
                sqlx::query_scalar::<_, i64>(
                    "SELECT id FROM shop_order_items WHERE order_id = $1 LIMIT 100",
                )
                .bind(order_id)
                .fetch_all(pool)
                .await?;
            }
            ReadOp::ActiveOrders => {
                sqlx::query_scalar::<_, i64>(
                    "SELECT id FROM shop_orders WHERE cancelled_at IS NULL \
                     ORDER BY created_at LIMIT 50",
                )
                .fetch_all(pool)
                .await?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_delay_disables_throttling() {
        let simulator = ReadSimulator::new().with_delay(Duration::ZERO);
        assert!(simulator.delay.is_none());

        let simulator = ReadSimulator::new().with_delay(Duration::from_millis(5));
        assert_eq!(simulator.delay, Some(Duration::from_millis(5)));
    }
}
