//! Status polling for submitted bulk operations.
//!
//! The lifecycle is `CREATED → RUNNING* → COMPLETED | FAILED | CANCELED | EXPIRED`.
//! [`advance`] maps one observed status to the next [`JobPhase`]; the loop in
//! [`BulkClient::poll_until_complete`] re-enters that transition after a fixed
//! delay supplied by a [`Sleeper`], so tests and callers can swap the timer.

use std::future::Future;
use std::time::Duration;

use crate::error::BulkError;
use crate::types::{BulkJobHandle, BulkOperationNode, BulkOperationStatus, CompletedJob};

use super::BulkClient;

/// Fixed-interval polling policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Delay between consecutive status queries. Never grows.
    pub interval: Duration,
    /// Give up after this many status queries. `None` polls forever.
    pub max_attempts: Option<u32>,
}

impl PollPolicy {
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            max_attempts: None,
        }
    }

    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: Option<u32>) -> Self {
        self.max_attempts = max_attempts;
        self
    }
}

/// Observed phase of a bulk operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobPhase {
    /// Not terminal yet; poll again after the interval.
    Pending(BulkOperationStatus),
    Completed(CompletedJob),
}

/// Maps a status-query node to the next phase.
///
/// # Errors
///
/// Returns [`BulkError::JobFailure`] for `FAILED`, `CANCELED` and `EXPIRED`.
pub fn advance(node: BulkOperationNode) -> Result<JobPhase, BulkError> {
    match node.status {
        BulkOperationStatus::Completed => {
            let object_count = node.object_count();
            Ok(JobPhase::Completed(CompletedJob {
                id: node.id,
                url: node.url,
                object_count,
            }))
        }
        BulkOperationStatus::Failed
        | BulkOperationStatus::Canceled
        | BulkOperationStatus::Expired => Err(BulkError::JobFailure {
            payload: format!("{node:?}"),
            id: node.id,
            status: node.status,
            error_code: node.error_code,
        }),
        status @ (BulkOperationStatus::Created
        | BulkOperationStatus::Running
        | BulkOperationStatus::Canceling
        | BulkOperationStatus::Unknown) => Ok(JobPhase::Pending(status)),
    }
}

/// Waits between status queries.
pub trait Sleeper {
    fn sleep(&self, interval: Duration) -> impl Future<Output = ()> + Send;
}

/// [`Sleeper`] backed by `tokio::time::sleep`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    fn sleep(&self, interval: Duration) -> impl Future<Output = ()> + Send {
        tokio::time::sleep(interval)
    }
}

impl BulkClient {
    /// Queries the status of `handle` until it reaches a terminal state.
    ///
    /// The first query is issued immediately; `policy.interval` is slept
    /// between queries, so a job that completes on the n-th query costs
    /// exactly `n - 1` sleeps. No query is issued after `COMPLETED`.
    ///
    /// # Errors
    ///
    /// - [`BulkError::JobFailure`] as soon as a failure terminal is observed.
    /// - [`BulkError::PollLimit`] when `policy.max_attempts` is exhausted.
    /// - Any transport or decoding error from [`Self::fetch_status`] (not retried).
    pub async fn poll_until_complete<S: Sleeper>(
        &self,
        handle: &BulkJobHandle,
        policy: &PollPolicy,
        sleeper: &S,
    ) -> Result<CompletedJob, BulkError> {
        let mut attempts = 0u32;

        loop {
            attempts = attempts.saturating_add(1);
            let node = self.fetch_status(&handle.id).await?;
            tracing::info!(
                id = %node.id,
                status = %node.status,
                object_count = node.object_count().unwrap_or(0),
                attempt = attempts,
                "bulk operation status"
            );

            match advance(node)? {
                JobPhase::Completed(job) => return Ok(job),
                JobPhase::Pending(_) => {}
            }

            if policy.max_attempts.is_some_and(|max| attempts >= max) {
                return Err(BulkError::PollLimit {
                    id: handle.id.clone(),
                    attempts,
                });
            }

            sleeper.sleep(policy.interval).await;
        }
    }
}
