use rust_decimal::{Decimal, RoundingStrategy};
use statement_core::{AugmentedYear, DerivedMetrics, YearRecord};

const DAYS_PER_YEAR: f64 = 365.0;

/// Present and non-zero.
fn nonzero(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v != 0.0)
}

/// Two decimals, half away from zero, taken from the exact value of `value`.
///
/// Magnitudes outside `Decimal` range are returned unrounded.
fn round2(value: f64) -> f64 {
    Decimal::from_f64_retain(value)
        .map(|d| d.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|d| d.to_string().parse().ok())
        .unwrap_or(value)
}

/// Round a raw result for reporting.
///
/// A result that is exactly zero is reported as absent, same as a missing
/// input: a flat year shows no growth figure rather than `0.0`. Non-finite
/// results are absent as well.
fn finish(value: Option<f64>) -> Option<f64> {
    value
        .filter(|v| *v != 0.0)
        .map(round2)
        .filter(|v| v.is_finite())
}

/// Days sales outstanding: `ar / revenue * 365`.
pub fn calculate_dso(ar: Option<f64>, revenue: Option<f64>) -> Option<f64> {
    let (ar, revenue) = (nonzero(ar)?, nonzero(revenue)?);
    Some(ar / revenue * DAYS_PER_YEAR)
}

/// Cash coverage ratio `cash / base`, used for both cash/AR and cash/debt.
pub fn calculate_cash_ratio(cash: Option<f64>, base: Option<f64>) -> Option<f64> {
    let (cash, base) = (nonzero(cash)?, nonzero(base)?);
    Some(cash / base)
}

/// Percentage change from `previous` to `current`.
pub fn calculate_growth_pct(current: f64, previous: f64) -> Option<f64> {
    if previous == 0.0 {
        return None;
    }
    Some((current - previous) / previous * 100.0)
}

fn derive_year(record: &YearRecord, prev: Option<&YearRecord>) -> DerivedMetrics {
    let rev_yoy = prev
        .and_then(|p| nonzero(p.revenue))
        .zip(record.revenue)
        .and_then(|(previous, current)| calculate_growth_pct(current, previous));

    let ar_yoy = prev
        .and_then(|p| nonzero(p.ar))
        .zip(nonzero(record.ar))
        .and_then(|(previous, current)| calculate_growth_pct(current, previous));

    DerivedMetrics {
        dso: finish(calculate_dso(record.ar, record.revenue)),
        cash_ar: finish(calculate_cash_ratio(record.cash, record.ar)),
        cash_debt: finish(calculate_cash_ratio(record.cash, record.debt)),
        rev_yoy: finish(rev_yoy),
        ar_yoy: finish(ar_yoy),
    }
}

/// Derive ratios and year-over-year growth for each record.
///
/// `records` must be in chronological order: the previous year of index `i`
/// is simply index `i - 1`, and the first record never gets growth figures.
/// The output has the same length and order, with each raw record copied
/// unchanged next to its metrics.
pub fn derive_metrics(records: &[YearRecord]) -> Vec<AugmentedYear> {
    records
        .iter()
        .enumerate()
        .map(|(i, record)| {
            let prev = i.checked_sub(1).map(|p| &records[p]);
            AugmentedYear {
                record: record.clone(),
                metrics: derive_year(record, prev),
            }
        })
        .collect()
}
