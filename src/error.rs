use std::{
    error::Error as StdError,
    fmt
};
use async_openai::error::{ApiError, OpenAIError};

/// Failure modes of a single classification attempt. All variants are
/// terminal for that request; retrying is the dispatcher's call.
#[derive(Debug)]
pub enum ClassifyError {
    /// Missing or structurally invalid API key, caught before any request.
    Credential(String),
    /// The service rejected the credential (401-equivalent).
    Auth(String),
    /// The service refused the request rate (429-equivalent).
    RateLimit(String),
    Timeout(String),
    /// No strategy could recover a valid object from the response text.
    Extraction(String),
    /// The recovered number field had no digits to normalize.
    Format(String),
    /// A whole chunk died before its items produced outcomes.
    ChunkFailure(String),
    Unknown(String)
}

impl fmt::Display for ClassifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassifyError::Credential(msg) => write!(f, "invalid or missing API key: {}", msg),
            ClassifyError::Auth(msg) => write!(f, "unauthorized: {}", msg),
            ClassifyError::RateLimit(msg) => write!(f, "rate limit exceeded: {}", msg),
            ClassifyError::Timeout(msg) => write!(f, "request timed out: {}", msg),
            ClassifyError::Extraction(msg) => write!(f, "could not extract classification: {}", msg),
            ClassifyError::Format(msg) => write!(f, "invalid DDC number: {}", msg),
            ClassifyError::ChunkFailure(msg) => write!(f, "failed to process chunk: {}", msg),
            ClassifyError::Unknown(msg) => write!(f, "classification error: {}", msg)
        }
    }
}

impl StdError for ClassifyError {}

impl From<OpenAIError> for ClassifyError {
    fn from(err: OpenAIError) -> Self {
        match err {
            OpenAIError::ApiError(api) => classify_api_error(api),
            OpenAIError::Reqwest(e) if e.is_timeout() => ClassifyError::Timeout(e.to_string()),
            OpenAIError::Reqwest(e) => ClassifyError::Unknown(e.to_string()),
            other => ClassifyError::Unknown(other.to_string())
        }
    }
}

impl From<serde_json::Error> for ClassifyError {
    fn from(err: serde_json::Error) -> Self {
        ClassifyError::Extraction(format!("Json deserializing error: {}", err))
    }
}

// The completion API reports auth and throttling failures as error objects
// whose shape varies by provider; the status code is only reliably present
// in the message text.
fn classify_api_error(err: ApiError) -> ClassifyError {
    let msg = err.message.to_lowercase();
    if msg.contains("401")
        || msg.contains("unauthorized")
        || msg.contains("authentication")
        || msg.contains("invalid api key")
        || msg.contains("incorrect api key")
    {
        ClassifyError::Auth(err.message)
    } else if msg.contains("429") || msg.contains("rate limit") {
        ClassifyError::RateLimit(err.message)
    } else {
        ClassifyError::Unknown(err.message)
    }
}

/// Failure modes of spreadsheet ingestion.
#[derive(Debug)]
pub enum IngestError {
    Io(std::io::Error),
    Csv(csv::Error),
    /// No header matched `title` case-insensitively.
    MissingTitleColumn,
    /// The file parsed but held no non-empty titles.
    NoTitles
}

impl fmt::Display for IngestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IngestError::Io(err) => write!(f, "failed to read input file: {}", err),
            IngestError::Csv(err) => write!(f, "CSV parsing error: {}", err),
            IngestError::MissingTitleColumn => {
                write!(f, "no \"title\" column found; ensure the file has a title header")
            }
            IngestError::NoTitles => write!(f, "no valid titles found in the file")
        }
    }
}

impl StdError for IngestError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            IngestError::Io(err) => Some(err),
            IngestError::Csv(err) => Some(err),
            _ => None
        }
    }
}

impl From<std::io::Error> for IngestError {
    fn from(err: std::io::Error) -> Self {
        IngestError::Io(err)
    }
}

impl From<csv::Error> for IngestError {
    fn from(err: csv::Error) -> Self {
        IngestError::Csv(err)
    }
}
