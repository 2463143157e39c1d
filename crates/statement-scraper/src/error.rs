use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScrapingError {
    #[error("Failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

pub type ScrapingResult<T> = Result<T, ScrapingError>;
