/// Weighted selection over a fixed set of alternatives
///
/// Entries carry cumulative upper bounds over a uniform draw in [0, 1).
/// The final entry absorbs everything past the last bound, so rounding in
/// the weight table can never leave a draw unmatched.
#[derive(Debug, Clone)]
pub struct WeightedBuckets<T> {
    entries: Vec<(f64, T)>,
}

impl<T> WeightedBuckets<T> {
    /// Build from (weight, value) pairs; bounds are the running sum
    pub fn new(weighted: Vec<(f64, T)>) -> Self {
        assert!(!weighted.is_empty(), "bucket set must not be empty");

        let mut bound = 0.0;
        let entries = weighted
            .into_iter()
            .map(|(weight, value)| {
                assert!(weight >= 0.0, "bucket weight must not be negative");
                bound += weight;
                (bound, value)
            })
            .collect();

        Self { entries }
    }

    /// Map a uniform draw in [0, 1) to a bucket value
    pub fn pick(&self, r: f64) -> &T {
        for (bound, value) in &self.entries[..self.entries.len() - 1] {
            if r < *bound {
                return value;
            }
        }
        &self.entries[self.entries.len() - 1].1
    }
}

/// Read operation classes issued by the workload simulator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOp {
    /// Point lookup of a product by exact SKU
    ProductBySku,
    /// Case-insensitive customer lookup by email
    CustomerByEmail,
    /// Latest orders for one customer, newest first
    RecentOrdersForCustomer,
    /// Line items for one order
    ItemsForOrder,
    /// Oldest open (not cancelled) orders
    ActiveOrders,
}

impl ReadOp {
    /// The default operation mix: 30% SKU lookups, 25% email lookups,
    /// 25% per-customer order lists, 15% item lists, 5% open-order scans.
    ///
    /// The weights are fixed on purpose. They exist to warm a known
    /// subset of indexes and leave the rest cold, not to model real
    /// traffic.
    pub fn default_mix() -> WeightedBuckets<ReadOp> {
        WeightedBuckets::new(vec![
            (0.30, ReadOp::ProductBySku),
            (0.25, ReadOp::CustomerByEmail),
            (0.25, ReadOp::RecentOrdersForCustomer),
            (0.15, ReadOp::ItemsForOrder),
            (0.05, ReadOp::ActiveOrders),
        ])
    }
}

/// The two things a churn iteration can do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChurnAction {
    /// Flip an existing order's cancellation state
    ToggleCancellation,
    /// Create an order with items, then usually delete it again
    OrderChurn,
}

impl ChurnAction {
    /// Weighted coin: toggle with probability `toggle_ratio`, churn otherwise
    pub fn coin(toggle_ratio: f64) -> WeightedBuckets<ChurnAction> {
        WeightedBuckets::new(vec![
            (toggle_ratio, ChurnAction::ToggleCancellation),
            (1.0 - toggle_ratio, ChurnAction::OrderChurn),
        ])
    }
}
