//! Streamed retrieval of a completed bulk operation's JSONL artifact.

use std::path::{Path, PathBuf};

use futures::StreamExt;
use tokio::io::{AsyncWriteExt, BufWriter};

use crate::error::BulkError;
use crate::types::CompletedJob;

use super::BulkClient;

/// Write buffer size; bounds memory regardless of artifact size.
const DOWNLOAD_BUFFER_BYTES: usize = 8 * 1024;

const ARTIFACT_EXTENSION: &str = "jsonl";

/// Final path of the artifact for a job whose GID ends in `id_suffix`.
#[must_use]
pub fn artifact_path(download_dir: &Path, id_suffix: &str) -> PathBuf {
    download_dir.join(format!("{id_suffix}.{ARTIFACT_EXTENSION}"))
}

/// In-progress sibling of `path`; renamed over `path` only once fully written.
pub(crate) fn part_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".part");
    PathBuf::from(name)
}

/// Strips the query string so signed-URL credentials stay out of errors and logs.
fn redact_url(url: &str) -> String {
    reqwest::Url::parse(url).map_or_else(
        |_| url.to_owned(),
        |mut u| {
            u.set_query(None);
            u.to_string()
        },
    )
}

impl BulkClient {
    /// Streams the artifact of `job` into `download_dir/<id suffix>.jsonl`.
    ///
    /// The directory is created if absent. Bytes go to a `.part` file that is
    /// renamed into place after the last chunk is flushed, so a failed or
    /// interrupted download never leaves a truncated `.jsonl` behind. A
    /// completed job without a URL (no matching objects) produces an empty file.
    ///
    /// # Errors
    ///
    /// - [`BulkError::UnexpectedStatus`] for a non-2xx artifact response.
    /// - [`BulkError::Http`] if the connection fails mid-stream.
    /// - [`BulkError::Io`] if the directory or file cannot be written.
    pub async fn download(
        &self,
        job: &CompletedJob,
        download_dir: &Path,
    ) -> Result<PathBuf, BulkError> {
        tokio::fs::create_dir_all(download_dir)
            .await
            .map_err(|e| BulkError::io(download_dir, e))?;

        let final_path = artifact_path(download_dir, job.id_suffix());
        let tmp_path = part_path(&final_path);

        let written = match job.url.as_deref() {
            Some(url) => self.stream_to_file(url, &tmp_path).await,
            None => {
                tracing::warn!(id = %job.id, "bulk operation completed without a result URL; writing empty snapshot");
                tokio::fs::write(&tmp_path, b"")
                    .await
                    .map(|()| 0)
                    .map_err(|e| BulkError::io(&tmp_path, e))
            }
        };

        let bytes = match written {
            Ok(bytes) => bytes,
            Err(err) => {
                if let Err(cleanup) = tokio::fs::remove_file(&tmp_path).await {
                    tracing::debug!(path = %tmp_path.display(), error = %cleanup, "no partial artifact to remove");
                }
                return Err(err);
            }
        };

        tokio::fs::rename(&tmp_path, &final_path)
            .await
            .map_err(|e| BulkError::io(&final_path, e))?;

        tracing::info!(path = %final_path.display(), bytes, "bulk operation result downloaded");
        Ok(final_path)
    }

    async fn stream_to_file(&self, url: &str, path: &Path) -> Result<u64, BulkError> {
        let response = self.download_client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(BulkError::UnexpectedStatus {
                status: status.as_u16(),
                url: redact_url(url),
            });
        }

        let file = tokio::fs::File::create(path)
            .await
            .map_err(|e| BulkError::io(path, e))?;
        let mut writer = BufWriter::with_capacity(DOWNLOAD_BUFFER_BYTES, file);
        let mut stream = response.bytes_stream();
        let mut written = 0u64;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            writer
                .write_all(&chunk)
                .await
                .map_err(|e| BulkError::io(path, e))?;
            written += chunk.len() as u64;
        }

        writer.flush().await.map_err(|e| BulkError::io(path, e))?;
        writer
            .into_inner()
            .sync_all()
            .await
            .map_err(|e| BulkError::io(path, e))?;

        Ok(written)
    }
}
