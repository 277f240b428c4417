use thiserror::Error;

/// Failure to exchange a request with the statistics service.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(reqwest::Error),
    #[error("request timed out")]
    Timeout,
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout
        } else {
            TransportError::Request(err)
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubmitError {
    #[error("a submission is already in flight")]
    InFlight,
}

/// A successful payload that cannot be turned into a report.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("successful response carried no results")]
    MissingResults,
    #[error("malformed results: {0}")]
    Malformed(String),
    #[error("{location}: missing required field `{field}`")]
    MissingField { location: String, field: &'static str },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
}
