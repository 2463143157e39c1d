use serde::{Deserialize, Serialize};
use statement_core::{AnomalyFinding, AugmentedYear, Severity, Thresholds, YearRecord};

use crate::anomalies::detect_anomalies;
use crate::metrics::derive_metrics;

/// Output of one analysis run over a company's yearly figures
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatementAnalysis {
    pub years: Vec<AugmentedYear>,
    pub anomalies: Vec<AnomalyFinding>,
}

/// Finding counts per severity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeveritySummary {
    pub critical: usize,
    pub warning: usize,
    pub info: usize,
}

impl SeveritySummary {
    pub fn total(&self) -> usize {
        self.critical + self.warning + self.info
    }
}

impl StatementAnalysis {
    pub fn summary(&self) -> SeveritySummary {
        self.anomalies
            .iter()
            .fold(SeveritySummary::default(), |mut acc, finding| {
                match finding.severity {
                    Severity::Critical => acc.critical += 1,
                    Severity::Warning => acc.warning += 1,
                    Severity::Info => acc.info += 1,
                }
                acc
            })
    }
}

/// Derive metrics for `records` and run the anomaly rules over them.
pub fn analyze_statements(records: &[YearRecord], thresholds: &Thresholds) -> StatementAnalysis {
    let years = derive_metrics(records);
    let anomalies = detect_anomalies(&years, thresholds);

    let analysis = StatementAnalysis { years, anomalies };
    let summary = analysis.summary();
    tracing::debug!(
        "Analyzed {} years: {} critical, {} warning findings",
        analysis.years.len(),
        summary.critical,
        summary.warning
    );
    analysis
}
