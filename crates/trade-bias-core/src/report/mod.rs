pub mod recommendations;
pub mod statistics;
pub mod summary;

pub use recommendations::{build_recommendations, Priority, Recommendation};
pub use statistics::{compute_statistics, TradingStatistics};
pub use summary::{build_summary, Summary};
