use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HttpError {
    #[error("HTTP start line is not terminated within {scanned} bytes")]
    IncompleteStartLine { scanned: usize },
    #[error("invalid HTTP start line: {line:?}")]
    InvalidStartLine { line: String },
    #[error("invalid HTTP header line: {line:?}")]
    InvalidHeaderLine { line: String },
}
