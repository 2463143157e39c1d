use serde::{Deserialize, Serialize};
use std::fmt;

/// Fiscal year identifier as scraped: either a bare number or free text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FiscalYear {
    Number(i64),
    Text(String),
}

impl fmt::Display for FiscalYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FiscalYear::Number(n) => write!(f, "{}", n),
            FiscalYear::Text(s) => write!(f, "{}", s),
        }
    }
}

/// One fiscal year of raw statement figures
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct YearRecord {
    pub label: Option<String>,
    pub year: Option<FiscalYear>,
    pub revenue: Option<f64>,
    /// Accounts receivable
    pub ar: Option<f64>,
    pub cash: Option<f64>,
    pub debt: Option<f64>,
    pub equity: Option<f64>,
}

impl YearRecord {
    pub fn labelled(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            ..Default::default()
        }
    }

    /// Label used when reporting on this year.
    ///
    /// Falls back from `label` to `year` to the record's position in the run.
    pub fn display_label(&self, index: usize) -> String {
        if let Some(label) = self.label.as_deref().filter(|l| !l.is_empty()) {
            return label.to_string();
        }
        match &self.year {
            Some(FiscalYear::Text(s)) if s.is_empty() => format!("Year {}", index),
            Some(FiscalYear::Number(0)) => format!("Year {}", index),
            Some(year) => year.to_string(),
            None => format!("Year {}", index),
        }
    }
}

/// Ratios and growth figures derived from a year and its predecessor.
///
/// Every field is rounded to 2 decimals; `None` means an input was missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DerivedMetrics {
    /// Days sales outstanding
    pub dso: Option<f64>,
    pub cash_ar: Option<f64>,
    pub cash_debt: Option<f64>,
    /// Revenue growth vs prior year, in percent
    pub rev_yoy: Option<f64>,
    /// Receivables growth vs prior year, in percent
    pub ar_yoy: Option<f64>,
}

/// A raw year together with its derived metrics.
///
/// Serializes flat, so the raw fields and the derived fields sit side by side.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AugmentedYear {
    #[serde(flatten)]
    pub record: YearRecord,
    #[serde(flatten)]
    pub metrics: DerivedMetrics,
}

/// Anomaly severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Warning,
    Info,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }

    /// Color code shown by the dashboard.
    pub fn color(&self) -> &'static str {
        match self {
            Severity::Critical => "red",
            Severity::Warning => "orange",
            Severity::Info => "yellow",
        }
    }
}

/// The anomaly rules applied to each year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyRule {
    HighDso,
    LowCashToDebt,
    SlowCollectionsThinCash,
    ReceivablesOutpaceRevenue,
    RevenueDecline,
}

impl AnomalyRule {
    pub const ALL: [AnomalyRule; 5] = [
        AnomalyRule::HighDso,
        AnomalyRule::LowCashToDebt,
        AnomalyRule::SlowCollectionsThinCash,
        AnomalyRule::ReceivablesOutpaceRevenue,
        AnomalyRule::RevenueDecline,
    ];

    pub fn severity(&self) -> Severity {
        match self {
            AnomalyRule::HighDso | AnomalyRule::SlowCollectionsThinCash => Severity::Critical,
            AnomalyRule::LowCashToDebt
            | AnomalyRule::ReceivablesOutpaceRevenue
            | AnomalyRule::RevenueDecline => Severity::Warning,
        }
    }

    pub fn interpretation(&self) -> &'static str {
        match self {
            AnomalyRule::HighDso => {
                "High receivables cycle indicates slow collections or aggressive credit policies."
            }
            AnomalyRule::LowCashToDebt => {
                "Limited cash relative to debt; liquidity buffers are thin."
            }
            AnomalyRule::SlowCollectionsThinCash => {
                "Receivables are slow and not backed by strong cash position. Collections risk is elevated."
            }
            AnomalyRule::ReceivablesOutpaceRevenue => {
                "Receivables growing much faster than sales; may indicate loose credit or aggressive accounting."
            }
            AnomalyRule::RevenueDecline => {
                "Year-on-year revenue decline; investigate business headwinds or market conditions."
            }
        }
    }
}

/// A single flagged condition for one year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyFinding {
    pub year: String,
    pub rule: AnomalyRule,
    pub severity: Severity,
    pub condition: String,
    pub interpretation: String,
}

impl AnomalyFinding {
    pub fn new(year: impl Into<String>, rule: AnomalyRule, condition: impl Into<String>) -> Self {
        Self {
            year: year.into(),
            rule,
            severity: rule.severity(),
            condition: condition.into(),
            interpretation: rule.interpretation().to_string(),
        }
    }
}
