use thiserror::Error;

/// Error taxonomy for the resume parsing pipeline.
///
/// Recovery rules: `RateLimited` is retried with backoff inside the LLM
/// client before it surfaces; `MalformedResponse` is recovered by the field
/// resolver, which degrades the affected sections to empty. Everything else
/// fails the current document only and never aborts a batch.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("corrupt document: {0}")]
    CorruptDocument(String),

    #[error("entity model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("authentication failed: {0}")]
    AuthError(String),

    #[error("rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("malformed LLM response: {0}")]
    MalformedResponse(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ParseError {
    /// True for failures that no amount of retrying will fix.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, ParseError::RateLimited { .. } | ParseError::Http(_))
    }
}
