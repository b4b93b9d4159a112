//! HTTP client for Shopify Admin bulk operations.

mod download;
mod poll;

use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::{Client, Url};
use serde_json::json;

use crate::error::BulkError;
use crate::queries::{BULK_OPERATION_RUN_QUERY, BULK_OPERATION_STATUS};
use crate::types::{BulkJobHandle, BulkOperationNode, GraphqlResponse, NodeData, RunQueryData};

pub use download::artifact_path;
pub(crate) use download::part_path;
pub use poll::{advance, JobPhase, PollPolicy, Sleeper, TokioSleeper};

const ACCESS_TOKEN_HEADER: &str = "X-Shopify-Access-Token";

const USER_AGENT: &str = "ordermerge/0.1 (order-migration)";

/// Client for the Shopify Admin GraphQL bulk-operation API.
///
/// Every non-2xx response is a typed error and nothing is retried: a failed
/// run is re-run by the operator.
pub struct BulkClient {
    /// GraphQL requests; bounded by the configured request timeout.
    pub(super) client: Client,
    /// Artifact downloads; only the connect phase is bounded so large
    /// snapshots are not cut off mid-stream.
    pub(super) download_client: Client,
    pub(super) endpoint: Url,
    pub(super) access_token: String,
}

impl BulkClient {
    /// Creates a client for the given Admin GraphQL endpoint
    /// (`https://{shop}.myshopify.com/admin/api/{version}/graphql.json`).
    ///
    /// `accept_invalid_certs` disables TLS certificate verification for both
    /// GraphQL calls and artifact downloads.
    ///
    /// # Errors
    ///
    /// Returns [`BulkError::InvalidEndpoint`] if `endpoint` is not a URL, or
    /// [`BulkError::Http`] if the underlying `reqwest::Client` cannot be built.
    pub fn new(
        endpoint: &str,
        access_token: &str,
        timeout_secs: u64,
        accept_invalid_certs: bool,
    ) -> Result<Self, BulkError> {
        let endpoint = Url::parse(endpoint).map_err(|e| BulkError::InvalidEndpoint {
            endpoint: endpoint.to_owned(),
            reason: e.to_string(),
        })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(USER_AGENT)
            .danger_accept_invalid_certs(accept_invalid_certs)
            .build()?;
        let download_client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .user_agent(USER_AGENT)
            .danger_accept_invalid_certs(accept_invalid_certs)
            .build()?;

        Ok(Self {
            client,
            download_client,
            endpoint,
            access_token: access_token.to_owned(),
        })
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        self.endpoint.as_str()
    }

    /// Starts a bulk operation for `query` via `bulkOperationRunQuery`.
    ///
    /// # Errors
    ///
    /// - [`BulkError::UnexpectedStatus`] / [`BulkError::Http`] on transport failure.
    /// - [`BulkError::SubmissionFailure`] if the response carries GraphQL
    ///   `errors`, `userErrors`, or no bulk operation id. The raw response body
    ///   is included.
    pub async fn submit(&self, query: &str) -> Result<BulkJobHandle, BulkError> {
        let body = self
            .post_graphql(BULK_OPERATION_RUN_QUERY, json!({ "query": query }))
            .await?;
        let handle = parse_submission(&body)?;
        tracing::info!(id = %handle.id, status = %handle.status, "bulk operation created");
        Ok(handle)
    }

    /// Fetches the current state of the bulk operation `id`.
    ///
    /// # Errors
    ///
    /// - [`BulkError::UnexpectedStatus`] / [`BulkError::Http`] on transport failure.
    /// - [`BulkError::Deserialize`] if the body is not the expected shape.
    /// - [`BulkError::StatusUnavailable`] if the response has GraphQL errors or
    ///   a `null` node.
    pub async fn fetch_status(&self, id: &str) -> Result<BulkOperationNode, BulkError> {
        let body = self
            .post_graphql(BULK_OPERATION_STATUS, json!({ "id": id }))
            .await?;
        parse_status(id, &body)
    }

    /// Submits `query`, waits for it to complete, and downloads the result
    /// into `download_dir`. Returns the path of the JSONL artifact.
    ///
    /// # Errors
    ///
    /// Propagates any error from [`Self::submit`], [`Self::poll_until_complete`]
    /// or [`Self::download`].
    pub async fn run_bulk_query<S: Sleeper>(
        &self,
        query: &str,
        policy: &PollPolicy,
        download_dir: &Path,
        sleeper: &S,
    ) -> Result<PathBuf, BulkError> {
        let handle = self.submit(query).await?;
        let job = self.poll_until_complete(&handle, policy, sleeper).await?;
        self.download(&job, download_dir).await
    }

    /// POSTs a GraphQL document and returns the response body once a 2xx
    /// status has been confirmed.
    async fn post_graphql(
        &self,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<String, BulkError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .header(ACCESS_TOKEN_HEADER, &self.access_token)
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(BulkError::UnexpectedStatus {
                status: status.as_u16(),
                url: self.endpoint.to_string(),
            });
        }

        Ok(response.text().await?)
    }
}

/// Extracts the bulk operation handle from a `bulkOperationRunQuery` response.
fn parse_submission(body: &str) -> Result<BulkJobHandle, BulkError> {
    let failure = |reason: String| BulkError::SubmissionFailure {
        reason,
        response: body.to_owned(),
    };

    let envelope: GraphqlResponse<RunQueryData> = serde_json::from_str(body)
        .map_err(|e| failure(format!("response is not a GraphQL envelope: {e}")))?;

    if !envelope.errors.is_empty() {
        let messages: Vec<&str> = envelope.errors.iter().map(|e| e.message.as_str()).collect();
        return Err(failure(messages.join("; ")));
    }

    let payload = envelope
        .data
        .and_then(|d| d.bulk_operation_run_query)
        .ok_or_else(|| failure("response has no bulkOperationRunQuery payload".to_string()))?;

    if !payload.user_errors.is_empty() {
        let messages: Vec<String> = payload.user_errors.iter().map(ToString::to_string).collect();
        return Err(failure(messages.join("; ")));
    }

    payload
        .bulk_operation
        .ok_or_else(|| failure("response has no bulkOperation id".to_string()))
}

/// Extracts the `BulkOperation` node from a status query response.
fn parse_status(id: &str, body: &str) -> Result<BulkOperationNode, BulkError> {
    let envelope: GraphqlResponse<NodeData> =
        serde_json::from_str(body).map_err(|e| BulkError::Deserialize {
            context: format!("status of bulk operation {id}"),
            source: e,
        })?;

    if !envelope.errors.is_empty() {
        return Err(BulkError::StatusUnavailable {
            id: id.to_owned(),
            response: body.to_owned(),
        });
    }

    envelope
        .data
        .and_then(|d| d.node)
        .ok_or_else(|| BulkError::StatusUnavailable {
            id: id.to_owned(),
            response: body.to_owned(),
        })
}

#[cfg(test)]
#[path = "../client_test.rs"]
mod tests;
