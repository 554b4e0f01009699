pub mod churn;
pub mod report;
pub mod reset_stats;
pub mod seed;
pub mod simulate;
