//! Joins per-unit results into batch reports and applies their side effects.
//!
//! Units never touch shared state. Everything that has to happen once per
//! batch, like logging a summary or pruning the registry, happens here
//! after the dispatcher's join.

pub mod broadcast_report;
pub mod transform_report;

pub use broadcast_report::{BroadcastReport, PruneSummary, prune_dead_connections};
pub use transform_report::{TransformReport, collect_transform_results};
