use rand::Rng;
use rand::seq::IndexedRandom;

/// Bounded pool of identifiers for the workload generators
///
/// Loaded once at startup and fed by the generators as they create rows.
/// When the pool grows past its capacity the oldest entries are dropped,
/// so a long churn run keeps drawing from recent ids instead of growing
/// without bound. Draws are uniform with replacement.
#[derive(Debug, Clone)]
pub struct IdPool<T> {
    items: Vec<T>,
    cap: usize,
}

impl<T> IdPool<T> {
    pub fn new(cap: usize) -> Self {
        assert!(cap > 0, "pool capacity must be positive");
        Self {
            items: Vec::new(),
            cap,
        }
    }

    /// Build a pool from already-fetched items, keeping the most recent `cap`
    pub fn from_items(items: Vec<T>, cap: usize) -> Self {
        let mut pool = Self::new(cap);
        for item in items {
            pool.push(item);
        }
        pool
    }

    /// Append one item, dropping the oldest entries beyond capacity
    pub fn push(&mut self, item: T) {
        self.items.push(item);
        if self.items.len() > self.cap {
            let excess = self.items.len() - self.cap;
            self.items.drain(..excess);
        }
    }

    /// Draw one item uniformly, with replacement
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&T> {
        self.items.choose(rng)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.cap
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_push_below_capacity_keeps_everything() {
        let mut pool = IdPool::new(5);
        for i in 0..5_i64 {
            pool.push(i);
        }
        assert_eq!(pool.len(), 5);
    }

    #[test]
    fn test_push_past_capacity_drops_oldest() {
        let mut pool = IdPool::new(3);
        for i in 0..10_i64 {
            pool.push(i);
        }

        assert_eq!(pool.len(), 3);

        // Only the three most recent ids survive
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..50 {
            let id = *pool.choose(&mut rng).unwrap();
            assert!(id >= 7, "stale id {} survived the trim", id);
        }
    }

    #[test]
    fn test_from_items_trims_to_most_recent() {
        let pool = IdPool::from_items((0..100_i64).collect(), 10);
        assert_eq!(pool.len(), 10);

        let mut rng = StdRng::seed_from_u64(2);
        assert!(*pool.choose(&mut rng).unwrap() >= 90);
    }

    #[test]
    fn test_choose_on_empty_pool_is_none() {
        let pool: IdPool<i64> = IdPool::new(4);
        let mut rng = StdRng::seed_from_u64(3);

        assert!(pool.is_empty());
        assert!(pool.choose(&mut rng).is_none());
    }

    #[test]
    fn test_choose_is_deterministic_for_a_fixed_seed() {
        let pool = IdPool::from_items((0..1000_i64).collect(), 1000);

        let mut a = StdRng::seed_from_u64(123);
        let mut b = StdRng::seed_from_u64(123);
        let draws_a: Vec<i64> = (0..20).map(|_| *pool.choose(&mut a).unwrap()).collect();
        let draws_b: Vec<i64> = (0..20).map(|_| *pool.choose(&mut b).unwrap()).collect();

        assert_eq!(draws_a, draws_b);
    }

    #[test]
    #[should_panic(expected = "capacity must be positive")]
    fn test_zero_capacity_panics() {
        let _ = IdPool::<i64>::new(0);
    }
}
