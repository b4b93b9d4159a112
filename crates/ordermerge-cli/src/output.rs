use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Context;
use ordermerge_core::OrderRecord;

/// Writes `orders` as a pretty-printed JSON array.
///
/// The document is written to a `.part` sibling and renamed over `path`, so
/// `path` only ever holds a complete document. If `interrupted` is set by the
/// time the document is written, the `.part` file is removed instead.
pub(crate) fn write_orders_json(
    path: &Path,
    orders: &[OrderRecord],
    interrupted: &AtomicBool,
) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }

    let tmp = part_path(path);
    if let Err(err) = write_json(&tmp, orders) {
        if let Err(cleanup) = fs::remove_file(&tmp) {
            tracing::debug!(path = %tmp.display(), error = %cleanup, "no partial output to remove");
        }
        return Err(err.context(format!("failed to write {}", path.display())));
    }

    if interrupted.load(Ordering::SeqCst) {
        if let Err(cleanup) = fs::remove_file(&tmp) {
            tracing::debug!(path = %tmp.display(), error = %cleanup, "no partial output to remove");
        }
        anyhow::bail!("interrupted before {} was written", path.display());
    }

    fs::rename(&tmp, path).with_context(|| format!("failed to move output into {}", path.display()))
}

fn write_json(path: &Path, orders: &[OrderRecord]) -> anyhow::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, orders)?;
    writer.flush()?;
    writer.into_inner().map_err(std::io::IntoInnerError::into_error)?.sync_all()?;
    Ok(())
}

fn part_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".part");
    PathBuf::from(name)
}
