pub mod blocks;
pub mod metrics;
