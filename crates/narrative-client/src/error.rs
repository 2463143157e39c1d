use thiserror::Error;

#[derive(Error, Debug)]
pub enum NarrativeError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Model returned no text")]
    EmptyResponse,

    #[error("Invalid configuration: {0}")]
    Config(String),
}

pub type NarrativeResult<T> = Result<T, NarrativeError>;
