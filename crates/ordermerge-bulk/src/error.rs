use std::path::PathBuf;

use thiserror::Error;

use crate::types::BulkOperationStatus;

#[derive(Debug, Error)]
pub enum BulkError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid GraphQL endpoint \"{endpoint}\": {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    /// The platform did not return a bulk operation id for the submission.
    #[error("failed to create bulk operation: {reason}; response: {response}")]
    SubmissionFailure { reason: String, response: String },

    /// The bulk operation reached `FAILED`, `CANCELED` or `EXPIRED`.
    #[error("bulk operation {id} ended with status {status} (error code: {}); payload: {payload}", .error_code.as_deref().unwrap_or("none"))]
    JobFailure {
        id: String,
        status: BulkOperationStatus,
        error_code: Option<String>,
        payload: String,
    },

    #[error("status query for bulk operation {id} returned no node; response: {response}")]
    StatusUnavailable { id: String, response: String },

    #[error("bulk operation {id} still running after {attempts} status queries")]
    PollLimit { id: String, attempts: u32 },

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed snapshot record at {}:{line}: {source}", .path.display())]
    MalformedSnapshotLine {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("CSV error on {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

impl BulkError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
