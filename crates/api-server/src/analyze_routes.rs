use axum::{extract::State, routing::post, Json, Router};
use narrative_client::{narrate_or_explain, NarrativeRequest};
use ratio_analysis::analyze_statements;
use serde::{Deserialize, Serialize};
use statement_core::{AnomalyFinding, AnomalyRule, AugmentedYear, Severity};
use statement_scraper::{build_financial_url, parse_financial_tables, PageSource};

use crate::{AppError, AppState};

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub symbol: String,
    #[serde(default)]
    pub market: Option<String>,
    /// Page to scrape instead of the default quote page.
    #[serde(default)]
    pub url: Option<String>,
}

/// Finding as shown to clients, with its display color.
#[derive(Debug, Serialize, Deserialize)]
pub struct AnomalyView {
    pub year: String,
    pub color: String,
    pub severity: Severity,
    pub rule: AnomalyRule,
    pub condition: String,
    pub interpretation: String,
}

impl From<&AnomalyFinding> for AnomalyView {
    fn from(f: &AnomalyFinding) -> Self {
        Self {
            year: f.year.clone(),
            color: f.severity.color().to_string(),
            severity: f.severity,
            rule: f.rule,
            condition: f.condition.clone(),
            interpretation: f.interpretation.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    pub symbol: String,
    pub market: Option<String>,
    pub years: Vec<AugmentedYear>,
    pub anomalies: Vec<AnomalyView>,
    pub narrative: String,
}

pub fn analyze_routes() -> Router<AppState> {
    Router::new().route("/api/analyze", post(analyze))
}

async fn analyze(
    State(state): State<AppState>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let symbol = req.symbol.trim().to_string();
    if symbol.is_empty() {
        return Err(AppError::bad_request("symbol is required"));
    }
    let market = req.market.filter(|m| !m.trim().is_empty());

    let url = req
        .url
        .filter(|u| !u.trim().is_empty())
        .unwrap_or_else(|| build_financial_url(&symbol, market.as_deref()));

    let html = match state.source.fetch_page(&url).await {
        Ok(html) => html,
        Err(e) => {
            tracing::warn!("Scraping failed for {}: {}", symbol, e);
            let narrative = format!("Scraping error: {}. Could not fetch data for {}.", e, symbol);
            return Ok(Json(AnalyzeResponse {
                symbol,
                market,
                years: vec![],
                anomalies: vec![],
                narrative,
            }));
        }
    };

    let records = parse_financial_tables(&html);
    let analysis = analyze_statements(&records, &state.thresholds);
    let summary = analysis.summary();

    let request = NarrativeRequest {
        symbol: &symbol,
        market: market.as_deref(),
        years: &analysis.years,
        anomalies: &analysis.anomalies,
    };
    let narrative = narrate_or_explain(state.narrator.as_ref(), &request).await;

    tracing::info!(
        "Analyzed {}: {} years, {} critical / {} warning findings",
        symbol,
        analysis.years.len(),
        summary.critical,
        summary.warning
    );

    let anomalies = analysis.anomalies.iter().map(AnomalyView::from).collect();
    Ok(Json(AnalyzeResponse {
        symbol,
        market,
        years: analysis.years,
        anomalies,
        narrative,
    }))
}
