//! Steps shared by the `run`, `snapshot` and `merge` commands.
//!
//! File decoding, the join and the output write are synchronous, so they run
//! on the blocking pool and leave the runtime free to observe Ctrl-C.

use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use ordermerge_bulk::{queries, BulkClient, PollPolicy, TokioSleeper};
use ordermerge_core::{AppConfig, SnapshotTable};

use crate::output;
use crate::MergeArgs;

pub(crate) fn build_bulk_client(config: &AppConfig) -> anyhow::Result<BulkClient> {
    if config.accept_invalid_certs {
        tracing::warn!("TLS certificate verification is disabled");
    }
    BulkClient::new(
        &config.graphql_endpoint(),
        &config.access_token,
        config.request_timeout_secs,
        config.accept_invalid_certs,
    )
    .context("failed to build Shopify bulk client")
}

pub(crate) fn poll_policy(config: &AppConfig) -> PollPolicy {
    PollPolicy::new(Duration::from_secs(config.poll_interval_secs))
        .with_max_attempts(config.poll_max_attempts)
}

/// Runs `task` on the blocking thread pool.
pub(crate) async fn run_blocking<T, F>(task: F) -> anyhow::Result<T>
where
    F: FnOnce() -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .context("blocking task did not complete")?
}

/// Runs the variant bulk export and decodes the downloaded artifact.
///
/// Returns the artifact path alongside the decoded table. When `snapshot_csv`
/// is given the table is also written there as a `sku,id` CSV.
pub(crate) async fn fetch_snapshot(
    config: &AppConfig,
    snapshot_csv: Option<PathBuf>,
) -> anyhow::Result<(PathBuf, SnapshotTable)> {
    let client = build_bulk_client(config)?;
    tracing::info!(endpoint = client.endpoint(), "starting variant bulk export");

    let artifact = client
        .run_bulk_query(
            queries::PRODUCT_VARIANT_SKUS,
            &poll_policy(config),
            &config.download_dir,
            &TokioSleeper,
        )
        .await
        .context("variant bulk export failed")?;

    run_blocking(move || {
        let table = ordermerge_bulk::decode_snapshot(&artifact)
            .with_context(|| format!("failed to decode snapshot {}", artifact.display()))?;

        if let Some(csv_path) = snapshot_csv {
            let rows = ordermerge_bulk::export_snapshot_csv(&artifact, &csv_path)
                .with_context(|| format!("failed to write snapshot CSV {}", csv_path.display()))?;
            tracing::info!(path = %csv_path.display(), rows, "snapshot CSV written");
        }

        Ok((artifact, table))
    })
    .await
}

/// Joins the two exports against `table` and writes the merged document.
///
/// Nothing is written to the output path once `interrupted` is set.
pub(crate) async fn merge_exports(
    merge: MergeArgs,
    table: SnapshotTable,
    interrupted: Arc<AtomicBool>,
) -> anyhow::Result<()> {
    run_blocking(move || {
        let outcome = ordermerge_join::join_files(&merge.orders, &merge.items, &table)
            .context("failed to join order exports")?;

        output::write_orders_json(&merge.output, &outcome.orders, &interrupted)?;
        tracing::info!(
            path = %merge.output.display(),
            orders = outcome.orders.len(),
            "merged orders written"
        );
        Ok(())
    })
    .await
}
