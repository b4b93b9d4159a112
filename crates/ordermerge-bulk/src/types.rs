//! Admin GraphQL response shapes for bulk operations.
//!
//! ### Envelope
//! Every response is `{"data": ..., "errors": [...]}`. `errors` is present for
//! query-level failures (bad syntax, access denied, throttling) and `data` may
//! then be `null`. Mutation input problems come back as `userErrors` inside
//! `data` with HTTP 200.
//!
//! ### `objectCount`
//! `UnsignedInt64` is serialized as a JSON **string** (`"1523"`).
//!
//! ### `url`
//! `null` until the operation completes, and also `null` for a completed
//! operation that matched no objects.

use std::fmt;

use serde::Deserialize;

/// Top-level GraphQL envelope.
#[derive(Debug, Deserialize)]
pub struct GraphqlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphqlError>,
}

#[derive(Debug, Deserialize)]
pub struct GraphqlError {
    pub message: String,
}

/// `data` for the `bulkOperationRunQuery` mutation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunQueryData {
    pub bulk_operation_run_query: Option<RunQueryPayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunQueryPayload {
    #[serde(default)]
    pub bulk_operation: Option<BulkJobHandle>,
    #[serde(default)]
    pub user_errors: Vec<UserError>,
}

#[derive(Debug, Deserialize)]
pub struct UserError {
    #[serde(default)]
    pub field: Option<Vec<String>>,
    pub message: String,
}

impl fmt::Display for UserError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.field {
            Some(path) if !path.is_empty() => write!(f, "{}: {}", path.join("."), self.message),
            _ => f.write_str(&self.message),
        }
    }
}

/// `data` for the status query.
#[derive(Debug, Deserialize)]
pub struct NodeData {
    pub node: Option<BulkOperationNode>,
}

/// Server-assigned bulk operation id plus the status reported at submission.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BulkJobHandle {
    /// GID, e.g. `"gid://shopify/BulkOperation/5483960418"`.
    pub id: String,
    pub status: BulkOperationStatus,
}

impl BulkJobHandle {
    /// Last path segment of the GID (`"5483960418"`), used to name the artifact.
    #[must_use]
    pub fn id_suffix(&self) -> &str {
        id_suffix(&self.id)
    }
}

pub(crate) fn id_suffix(gid: &str) -> &str {
    gid.rsplit('/').next().unwrap_or(gid)
}

/// Bulk operation status as reported by the `BulkOperationStatus` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BulkOperationStatus {
    Created,
    Running,
    Canceling,
    Completed,
    Canceled,
    Failed,
    Expired,
    /// A status this client does not know about; treated as still in flight.
    #[serde(other)]
    Unknown,
}

impl BulkOperationStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Created => "CREATED",
            Self::Running => "RUNNING",
            Self::Canceling => "CANCELING",
            Self::Completed => "COMPLETED",
            Self::Canceled => "CANCELED",
            Self::Failed => "FAILED",
            Self::Expired => "EXPIRED",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// `true` once the platform will never report a different status.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Completed | Self::Canceled | Self::Failed | Self::Expired
        )
    }
}

impl fmt::Display for BulkOperationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A `BulkOperation` node returned by the status query.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkOperationNode {
    pub id: String,
    pub status: BulkOperationStatus,
    #[serde(default)]
    pub error_code: Option<String>,
    #[serde(default)]
    pub object_count: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub completed_at: Option<String>,
}

impl BulkOperationNode {
    /// Parsed `objectCount`; `None` when absent or not numeric.
    #[must_use]
    pub fn object_count(&self) -> Option<u64> {
        self.object_count.as_deref().and_then(|s| s.parse().ok())
    }
}

/// Completion metadata for a bulk operation that reached `COMPLETED`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedJob {
    pub id: String,
    /// Signed artifact URL; `None` when the query matched nothing.
    pub url: Option<String>,
    pub object_count: Option<u64>,
}

impl CompletedJob {
    #[must_use]
    pub fn id_suffix(&self) -> &str {
        id_suffix(&self.id)
    }
}
