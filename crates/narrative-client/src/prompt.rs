use crate::NarrativeRequest;

/// Role given to the model.
pub const SYSTEM_INSTRUCTION: &str =
    "You are a disciplined equity analyst. Analyze financial metrics and anomalies.";

/// Anomalies quoted in the offline summary.
const FALLBACK_OBSERVATIONS: usize = 3;

fn fmt_value(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "n/a".to_string())
}

/// User prompt describing the run's metrics and findings.
pub fn build_prompt(request: &NarrativeRequest<'_>) -> String {
    let years = request
        .years
        .iter()
        .enumerate()
        .map(|(i, y)| {
            format!(
                "{}: Revenue={}, DSO={}, Cash/Debt={}",
                y.record.display_label(i),
                fmt_value(y.record.revenue),
                fmt_value(y.metrics.dso),
                fmt_value(y.metrics.cash_debt)
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let anomalies = if request.anomalies.is_empty() {
        "None".to_string()
    } else {
        request
            .anomalies
            .iter()
            .map(|a| format!("{}: {} - {}", a.year, a.condition, a.interpretation))
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        "Stock: {} (Market: {})\n\n\
         Financial metrics ({} years):\n{}\n\n\
         Detected anomalies:\n{}\n\n\
         Provide a concise analyst-style interpretation (3-4 sentences) focusing on:\n\
         1. Cash flow and liquidity health\n\
         2. Collections/working capital trends\n\
         3. Overall risk assessment\n\n\
         Do NOT give explicit buy/sell recommendations.",
        request.symbol,
        request.market.unwrap_or("Unknown"),
        request.years.len(),
        years,
        anomalies
    )
}

/// Deterministic summary used when no language model is configured.
pub fn fallback_narrative(request: &NarrativeRequest<'_>) -> String {
    let mut lines = vec![
        format!("Analysis for {} ({}):", request.symbol, request.market.unwrap_or("Global")),
        String::new(),
        format!("- Years analyzed: {}", request.years.len()),
        format!("- Anomalies detected: {}", request.anomalies.len()),
    ];

    if !request.anomalies.is_empty() {
        lines.push(String::new());
        lines.push("Key observations:".to_string());
        lines.extend(
            request
                .anomalies
                .iter()
                .take(FALLBACK_OBSERVATIONS)
                .map(|a| format!("• {} {}: {}", a.year, a.condition, a.interpretation)),
        );
    }

    lines.push(String::new());
    lines.push("Note: set GOOGLE_API_KEY to enable model-written commentary.".to_string());
    lines.join("\n")
}
