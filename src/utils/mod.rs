pub mod point_stats;

pub use point_stats::*;
