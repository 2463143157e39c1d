//! Working-capital and solvency ratio analysis.
//!
//! Turns chronologically ordered yearly statement figures into derived ratios
//! (`metrics`) and flags threshold breaches in those ratios (`anomalies`).
//! Both stages are pure functions over their inputs.

pub mod anomalies;
pub mod metrics;
pub mod pipeline;

pub use anomalies::{detect_anomalies, AnomalyDetector};
pub use metrics::derive_metrics;
pub use pipeline::{analyze_statements, SeveritySummary, StatementAnalysis};
