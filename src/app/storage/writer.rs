//! Atomic streaming file writer

use std::path::Path;

use futures::{Stream, StreamExt};
use tempfile::TempPath;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{error, warn};

use super::path::PathGenerator;
use crate::constants::files;
use crate::errors::{DownloadError, DownloadResult};

/// Stream `body` into `final_path` through a temporary file
///
/// The temporary file lives next to `final_path` under a unique name and is
/// removed if any chunk, write or the final rename fails.
pub(super) async fn write_atomic<S, B, E>(final_path: &Path, body: S) -> DownloadResult<u64>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    DownloadError: From<E>,
{
    let directory = match final_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let (file, temp_path) = tempfile::Builder::new()
        .prefix(&PathGenerator::temp_prefix(final_path))
        .suffix(files::TEMP_FILE_SUFFIX)
        .tempfile_in(directory)?
        .into_parts();

    let written = match stream_to(File::from_std(file), body).await {
        Ok(written) => written,
        Err(e) => {
            discard(temp_path);
            return Err(e);
        }
    };

    if let Err(e) = temp_path.persist(final_path) {
        error!("Failed to rename temporary file: {}", e.error);
        let temp_file = e.path.to_path_buf();
        discard(e.path);
        return Err(DownloadError::AtomicOperationFailed {
            temp_path: temp_file,
            final_path: final_path.to_path_buf(),
        });
    }

    Ok(written)
}

async fn stream_to<S, B, E>(mut file: File, body: S) -> DownloadResult<u64>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    DownloadError: From<E>,
{
    let mut written = 0u64;

    futures::pin_mut!(body);
    while let Some(chunk) = body.next().await {
        let chunk = chunk?;
        let bytes = chunk.as_ref();
        file.write_all(bytes).await?;
        written += bytes.len() as u64;
    }

    file.flush().await?;
    Ok(written)
}

fn discard(temp_path: TempPath) {
    let path_display = temp_path.display().to_string();
    if let Err(e) = temp_path.close() {
        warn!("Failed to remove partial file {}: {}", path_display, e);
    }
}
