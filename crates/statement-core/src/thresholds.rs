//! Anomaly detection thresholds.
//!
//! Every rule in the detector reads its cut-off from here, so the values can be
//! audited in one place and overridden per deployment through the environment.

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// DSO (days) above which collections are considered critically slow.
pub const DSO_CRITICAL_DAYS: f64 = 120.0;

/// Cash/debt ratio below which liquidity is flagged.
pub const CASH_DEBT_FLOOR: f64 = 0.2;

/// DSO (days) above which the slow-collections/thin-cash combination is checked.
pub const COMBO_DSO_DAYS: f64 = 100.0;

/// Cash/AR ratio below which receivables count as unbacked by cash.
pub const CASH_AR_FLOOR: f64 = 0.5;

/// Percentage points by which AR growth may exceed revenue growth before flagging.
pub const AR_GROWTH_MARGIN_PCT: f64 = 10.0;

/// Revenue growth (percent) below which a decline is flagged.
pub const REVENUE_DECLINE_PCT: f64 = -5.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub dso_critical_days: f64,
    pub cash_debt_floor: f64,
    pub combo_dso_days: f64,
    pub cash_ar_floor: f64,
    pub ar_growth_margin_pct: f64,
    pub revenue_decline_pct: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            dso_critical_days: DSO_CRITICAL_DAYS,
            cash_debt_floor: CASH_DEBT_FLOOR,
            combo_dso_days: COMBO_DSO_DAYS,
            cash_ar_floor: CASH_AR_FLOOR,
            ar_growth_margin_pct: AR_GROWTH_MARGIN_PCT,
            revenue_decline_pct: REVENUE_DECLINE_PCT,
        }
    }
}

impl Thresholds {
    /// Load thresholds, letting `THRESHOLD_*` environment variables override the defaults.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Same as [`Thresholds::from_env`] but reading values through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |var: &str, default: f64| -> ConfigResult<f64> {
            match lookup(var) {
                Some(raw) => {
                    let parsed: Result<f64, _> = raw.trim().parse();
                    parsed.map_err(|_| ConfigError::InvalidValue {
                        var: var.to_string(),
                        value: raw,
                    })
                }
                None => Ok(default),
            }
        };

        Ok(Self {
            dso_critical_days: read("THRESHOLD_DSO_CRITICAL", DSO_CRITICAL_DAYS)?,
            cash_debt_floor: read("THRESHOLD_CASH_DEBT_FLOOR", CASH_DEBT_FLOOR)?,
            combo_dso_days: read("THRESHOLD_COMBO_DSO", COMBO_DSO_DAYS)?,
            cash_ar_floor: read("THRESHOLD_CASH_AR_FLOOR", CASH_AR_FLOOR)?,
            ar_growth_margin_pct: read("THRESHOLD_AR_GROWTH_MARGIN", AR_GROWTH_MARGIN_PCT)?,
            revenue_decline_pct: read("THRESHOLD_REVENUE_DECLINE", REVENUE_DECLINE_PCT)?,
        })
    }
}
