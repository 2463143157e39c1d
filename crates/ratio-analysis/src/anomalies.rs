//! Threshold rules over derived metrics.
//!
//! Each year is checked independently. Comparisons against the prior year are
//! already folded into `rev_yoy` / `ar_yoy`, so the detector never looks back.

use statement_core::{AnomalyFinding, AnomalyRule, AugmentedYear, DerivedMetrics, Thresholds};

/// Applies the anomaly rules with a fixed set of thresholds.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnomalyDetector {
    thresholds: Thresholds,
}

impl AnomalyDetector {
    pub fn new(thresholds: Thresholds) -> Self {
        Self { thresholds }
    }

    /// Findings for every year, in year order then rule order.
    pub fn detect(&self, years: &[AugmentedYear]) -> Vec<AnomalyFinding> {
        years
            .iter()
            .enumerate()
            .flat_map(|(i, year)| {
                let label = year.record.display_label(i);
                self.check_year(&year.metrics)
                    .into_iter()
                    .map(move |(rule, condition)| AnomalyFinding::new(label.clone(), rule, condition))
            })
            .collect()
    }

    /// Conditions fired by a single year's metrics, in rule order.
    pub fn check_year(&self, m: &DerivedMetrics) -> Vec<(AnomalyRule, String)> {
        AnomalyRule::ALL
            .iter()
            .filter_map(|rule| self.evaluate(*rule, m).map(|condition| (*rule, condition)))
            .collect()
    }

    /// Condition text if `rule` fires for `m`.
    pub fn evaluate(&self, rule: AnomalyRule, m: &DerivedMetrics) -> Option<String> {
        let t = &self.thresholds;
        match rule {
            AnomalyRule::HighDso => {
                let dso = m.dso.filter(|d| *d > t.dso_critical_days)?;
                Some(format!("DSO = {:.0} days (>{})", dso, t.dso_critical_days))
            }
            AnomalyRule::LowCashToDebt => {
                let ratio = m.cash_debt.filter(|r| *r < t.cash_debt_floor)?;
                Some(format!("Cash/Debt = {:.2}x (<{})", ratio, t.cash_debt_floor))
            }
            AnomalyRule::SlowCollectionsThinCash => {
                m.dso.filter(|d| *d > t.combo_dso_days)?;
                m.cash_ar.filter(|r| *r < t.cash_ar_floor)?;
                Some("High DSO + Low Cash/AR".to_string())
            }
            AnomalyRule::ReceivablesOutpaceRevenue => {
                let (rev, ar) = (m.rev_yoy?, m.ar_yoy?);
                if ar > rev + t.ar_growth_margin_pct {
                    Some(format!("AR growth {:.1}% >> Sales growth {:.1}%", ar, rev))
                } else {
                    None
                }
            }
            AnomalyRule::RevenueDecline => {
                let rev = m.rev_yoy.filter(|r| *r < t.revenue_decline_pct)?;
                Some(format!("Revenue declined {:.1}%", rev.abs()))
            }
        }
    }
}

/// Run every anomaly rule over `years`.
pub fn detect_anomalies(years: &[AugmentedYear], thresholds: &Thresholds) -> Vec<AnomalyFinding> {
    AnomalyDetector::new(*thresholds).detect(years)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::derive_metrics;
    use statement_core::{Severity, YearRecord};

    fn metrics_year(label: &str, metrics: DerivedMetrics) -> AugmentedYear {
        AugmentedYear {
            record: YearRecord::labelled(label),
            metrics,
        }
    }

    #[test]
    fn test_two_year_scenario() {
        let records = vec![
            YearRecord {
                label: Some("FY22".to_string()),
                revenue: Some(1000.0),
                ar: Some(100.0),
                cash: Some(50.0),
                debt: Some(500.0),
                ..Default::default()
            },
            YearRecord {
                label: Some("FY23".to_string()),
                revenue: Some(900.0),
                ar: Some(150.0),
                cash: Some(40.0),
                debt: Some(600.0),
                ..Default::default()
            },
        ];
        let findings = detect_anomalies(&derive_metrics(&records), &Thresholds::default());

        let fy23: Vec<&AnomalyFinding> = findings.iter().filter(|f| f.year == "FY23").collect();
        let rules: Vec<AnomalyRule> = fy23.iter().map(|f| f.rule).collect();
        assert_eq!(
            rules,
            vec![
                AnomalyRule::LowCashToDebt,
                AnomalyRule::ReceivablesOutpaceRevenue,
                AnomalyRule::RevenueDecline,
            ]
        );
        assert!(fy23.iter().all(|f| f.severity == Severity::Warning));
        assert_eq!(fy23[0].condition, "Cash/Debt = 0.07x (<0.2)");
        assert_eq!(fy23[1].condition, "AR growth 50.0% >> Sales growth -10.0%");
        assert_eq!(fy23[2].condition, "Revenue declined 10.0%");

        // FY22 cash/debt of 0.1 is below the floor as well.
        let fy22: Vec<AnomalyRule> = findings.iter().filter(|f| f.year == "FY22").map(|f| f.rule).collect();
        assert_eq!(fy22, vec![AnomalyRule::LowCashToDebt]);
        assert_eq!(findings.len(), 4);
        assert_eq!(findings[0].year, "FY22");
    }

    #[test]
    fn test_high_dso_and_combo_fire_together() {
        let record = YearRecord {
            label: Some("FY24".to_string()),
            revenue: Some(1000.0),
            ar: Some(400.0),
            cash: Some(150.0),
            ..Default::default()
        };
        let findings = detect_anomalies(&derive_metrics(&[record]), &Thresholds::default());
        assert_eq!(findings.len(), 2);
        assert!(findings.iter().all(|f| f.severity == Severity::Critical));
        assert_eq!(findings[0].rule, AnomalyRule::HighDso);
        assert_eq!(findings[0].condition, "DSO = 146 days (>120)");
        assert_eq!(findings[1].rule, AnomalyRule::SlowCollectionsThinCash);
        assert_eq!(findings[1].condition, "High DSO + Low Cash/AR");
        assert_eq!(
            findings[1].interpretation,
            "Receivables are slow and not backed by strong cash position. Collections risk is elevated."
        );
    }

    #[test]
    fn test_combo_without_high_dso() {
        let detector = AnomalyDetector::default();
        let m = DerivedMetrics {
            dso: Some(110.0),
            cash_ar: Some(0.3),
            ..Default::default()
        };
        let rules: Vec<AnomalyRule> = detector.check_year(&m).into_iter().map(|(r, _)| r).collect();
        assert_eq!(rules, vec![AnomalyRule::SlowCollectionsThinCash]);
    }

    #[test]
    fn test_thresholds_are_strict() {
        let detector = AnomalyDetector::default();
        let m = DerivedMetrics {
            dso: Some(120.0),
            cash_ar: Some(0.5),
            cash_debt: Some(0.2),
            rev_yoy: Some(-5.0),
            ar_yoy: Some(5.0),
        };
        assert!(detector.check_year(&m).is_empty());
    }

    #[test]
    fn test_combo_boundary_at_exact_dso() {
        let detector = AnomalyDetector::default();
        let at_limit = DerivedMetrics {
            dso: Some(100.0),
            cash_ar: Some(0.3),
            ..Default::default()
        };
        assert!(detector.check_year(&at_limit).is_empty());

        let above = DerivedMetrics {
            dso: Some(100.01),
            ..at_limit
        };
        let rules: Vec<AnomalyRule> = detector.check_year(&above).into_iter().map(|(r, _)| r).collect();
        assert_eq!(rules, vec![AnomalyRule::SlowCollectionsThinCash]);
    }

    // A present zero is a value like any other.
    #[test]
    fn test_present_zero_metrics_still_fire() {
        let detector = AnomalyDetector::default();
        let m = DerivedMetrics {
            cash_debt: Some(0.0),
            rev_yoy: Some(0.0),
            ar_yoy: Some(25.0),
            ..Default::default()
        };
        let fired = detector.check_year(&m);
        let rules: Vec<AnomalyRule> = fired.iter().map(|(r, _)| *r).collect();
        assert_eq!(
            rules,
            vec![AnomalyRule::LowCashToDebt, AnomalyRule::ReceivablesOutpaceRevenue]
        );
        assert_eq!(fired[0].1, "Cash/Debt = 0.00x (<0.2)");
        assert_eq!(fired[1].1, "AR growth 25.0% >> Sales growth 0.0%");
    }

    #[test]
    fn test_missing_metrics_fire_nothing() {
        let years = vec![metrics_year("FY20", DerivedMetrics::default())];
        assert!(detect_anomalies(&years, &Thresholds::default()).is_empty());
        assert!(detect_anomalies(&[], &Thresholds::default()).is_empty());
    }

    #[test]
    fn test_ar_growth_rule_needs_both_growth_figures() {
        let detector = AnomalyDetector::default();
        let only_ar = DerivedMetrics {
            ar_yoy: Some(80.0),
            ..Default::default()
        };
        assert!(detector.evaluate(AnomalyRule::ReceivablesOutpaceRevenue, &only_ar).is_none());

        let both = DerivedMetrics {
            rev_yoy: Some(12.5),
            ar_yoy: Some(30.26),
            ..Default::default()
        };
        assert_eq!(
            detector.evaluate(AnomalyRule::ReceivablesOutpaceRevenue, &both).as_deref(),
            Some("AR growth 30.3% >> Sales growth 12.5%")
        );
    }

    #[test]
    fn test_year_label_fallbacks() {
        let bad = DerivedMetrics {
            cash_debt: Some(0.05),
            ..Default::default()
        };
        let years = vec![
            AugmentedYear {
                record: YearRecord {
                    year: Some(statement_core::FiscalYear::Text("2021".to_string())),
                    ..Default::default()
                },
                metrics: bad,
            },
            AugmentedYear {
                record: YearRecord::default(),
                metrics: bad,
            },
        ];
        let findings = detect_anomalies(&years, &Thresholds::default());
        assert_eq!(findings[0].year, "2021");
        assert_eq!(findings[1].year, "Year 1");
    }

    #[test]
    fn test_custom_thresholds_change_text() {
        let thresholds = Thresholds {
            dso_critical_days: 30.0,
            ..Default::default()
        };
        let years = vec![metrics_year(
            "FY22",
            DerivedMetrics {
                dso: Some(36.8),
                ..Default::default()
            },
        )];
        let findings = detect_anomalies(&years, &thresholds);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].condition, "DSO = 37 days (>30)");
    }
}
