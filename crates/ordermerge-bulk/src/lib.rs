//! Shopify Admin bulk-operation client and catalog snapshot decoder.
//!
//! A variant snapshot is produced in three steps: [`BulkClient::submit`]
//! starts a `bulkOperationRunQuery`, [`BulkClient::poll_until_complete`]
//! waits for a terminal status, and [`BulkClient::download`] streams the
//! JSONL result to disk. [`snapshot::decode_snapshot`] then turns that file
//! into a [`ordermerge_core::SnapshotTable`].

pub mod client;
pub mod error;
pub mod queries;
pub mod snapshot;
pub mod types;

pub use client::{advance, artifact_path, BulkClient, JobPhase, PollPolicy, Sleeper, TokioSleeper};
pub use error::BulkError;
pub use snapshot::{decode_snapshot, export_snapshot_csv, load_snapshot, load_snapshot_csv};
pub use types::{BulkJobHandle, BulkOperationNode, BulkOperationStatus, CompletedJob};
