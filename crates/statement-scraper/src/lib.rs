//! Fetching and parsing published financial statement pages.
//!
//! Best-effort adapter: it turns whatever tables a quote page exposes into
//! [`YearRecord`](statement_core::YearRecord)s and leaves fields it cannot read empty.

pub mod error;
pub mod fetch;
pub mod parse;

pub use error::{ScrapingError, ScrapingResult};
pub use fetch::{PageSource, StatementFetcher};
pub use parse::{extract_number, parse_financial_tables};

use std::env;
use std::time::Duration;

/// Configuration for page fetching
#[derive(Debug, Clone)]
pub struct ScraperConfig {
    pub timeout: Duration,
    /// Retries after the first attempt.
    pub max_retries: u32,
    pub retry_delay: Duration,
    pub proxy_url: Option<String>,
    pub user_agent: String,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_retries: 3,
            retry_delay: Duration::from_secs(2),
            proxy_url: None,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".to_string(),
        }
    }
}

impl ScraperConfig {
    pub fn from_env() -> ScrapingResult<Self> {
        let defaults = Self::default();

        Ok(Self {
            timeout: Duration::from_secs(parse_var("REQUEST_TIMEOUT", defaults.timeout.as_secs())?),
            max_retries: parse_var("MAX_RETRIES", defaults.max_retries)?,
            retry_delay: Duration::from_secs(parse_var("RETRY_DELAY", defaults.retry_delay.as_secs())?),
            proxy_url: env::var("PROXY_URL").ok().filter(|p| !p.trim().is_empty()),
            user_agent: defaults.user_agent,
        })
    }
}

fn parse_var<T: std::str::FromStr>(var: &str, default: T) -> ScrapingResult<T> {
    match env::var(var) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ScrapingError::Config(format!("{} has invalid value {:?}", var, raw))),
        Err(_) => Ok(default),
    }
}

/// Quote page for `symbol`: Indian exchanges go to Moneycontrol, the rest to Yahoo Finance.
pub fn build_financial_url(symbol: &str, market: Option<&str>) -> String {
    match market.map(|m| m.trim().to_uppercase()) {
        Some(m) if m == "NSE" || m == "BSE" => {
            format!("https://www.moneycontrol.com/india/stockpricequote/{}", symbol)
        }
        _ => format!("https://finance.yahoo.com/quote/{}", symbol),
    }
}
