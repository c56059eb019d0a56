//! Maps download targets onto the local tree and writes missing files.

use std::path::{Path, PathBuf};

use futures_util::StreamExt;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info, instrument};
use url::Url;

use super::error::SyncError;
use super::sanitize::sanitize_segment;
use crate::fetch::{FetchError, PortalClient};
use crate::resolver::DownloadTarget;

/// Suffix of the temporary file a download streams into before the rename.
const PARTIAL_SUFFIX: &str = ".part";

/// Outcome of [`materialize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteResult {
    /// The file was downloaded and written to this path.
    Written(PathBuf),
    /// The path already existed; nothing was fetched.
    Skipped(PathBuf),
}

impl WriteResult {
    /// Destination path, whichever the outcome.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Written(path) | Self::Skipped(path) => path,
        }
    }
}

/// Directory for a term/course pair: `<base>/<term>/<course>`, both sanitized.
#[must_use]
pub fn destination_dir(base_dir: &Path, term_label: &str, course_name: &str) -> PathBuf {
    base_dir
        .join(sanitize_segment(term_label))
        .join(sanitize_segment(course_name))
}

/// Full destination path of a target.
#[must_use]
pub fn destination_path(base_dir: &Path, target: &DownloadTarget) -> PathBuf {
    destination_dir(base_dir, &target.term_label, &target.course_name).join(&target.file_name)
}

/// Writes a target into the local tree unless it is already there.
///
/// The directory is created and the existence check made before any network
/// request, so already-synced files cost nothing. New files stream into a
/// `.part` sibling which is renamed into place once complete.
///
/// # Errors
///
/// Returns [`SyncError::Io`] for directory or file failures and
/// [`SyncError::Fetch`] when the download fails. A partial file is removed.
#[instrument(skip(client, target, base_dir), fields(file = %target.file_name))]
pub async fn materialize(
    client: &PortalClient,
    target: &DownloadTarget,
    base_dir: &Path,
) -> Result<WriteResult, SyncError> {
    let dir = destination_dir(base_dir, &target.term_label, &target.course_name);
    tokio::fs::create_dir_all(&dir)
        .await
        .map_err(|e| SyncError::io(&dir, e))?;

    let path = dir.join(&target.file_name);
    let exists = tokio::fs::try_exists(&path)
        .await
        .map_err(|e| SyncError::io(&path, e))?;
    if exists {
        debug!(path = %path.display(), "already synced");
        return Ok(WriteResult::Skipped(path));
    }

    let url = Url::parse(&target.source_url).map_err(|_| {
        SyncError::fetch(&target.source_url, FetchError::invalid_url(&target.source_url))
    })?;
    let partial = partial_path(&path);
    let result = download_to(client, &url, &partial).await;
    if let Err(error) = result {
        debug!(path = %partial.display(), "cleaning up partial file after error");
        let _ = tokio::fs::remove_file(&partial).await;
        return Err(error);
    }

    tokio::fs::rename(&partial, &path)
        .await
        .map_err(|e| SyncError::io(&path, e))?;
    info!(path = %path.display(), "Downloaded file");
    Ok(WriteResult::Written(path))
}

/// Removes `.part` files left in `dir` by downloads that never finished.
///
/// A run interrupted mid-download drops the write before its own cleanup
/// runs; this is called before a course is synced again. A missing directory
/// counts as clean.
///
/// # Errors
///
/// Returns [`SyncError::Io`] when the directory cannot be listed or a stale
/// file cannot be removed.
pub async fn clear_partial_files(dir: &Path) -> Result<usize, SyncError> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(SyncError::io(dir, e)),
    };

    let mut removed = 0;
    while let Some(entry) = entries.next_entry().await.map_err(|e| SyncError::io(dir, e))? {
        let path = entry.path();
        let is_partial = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.ends_with(PARTIAL_SUFFIX));
        if !is_partial {
            continue;
        }
        tokio::fs::remove_file(&path)
            .await
            .map_err(|e| SyncError::io(&path, e))?;
        debug!(path = %path.display(), "removed stale partial file");
        removed += 1;
    }
    Ok(removed)
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(PARTIAL_SUFFIX);
    path.with_file_name(name)
}

/// Streams the response body to `path`, returning bytes written.
async fn download_to(client: &PortalClient, url: &Url, path: &Path) -> Result<u64, SyncError> {
    let response = client
        .get(url)
        .await
        .map_err(|e| SyncError::fetch(url.as_str(), e))?;

    let file = File::create(path)
        .await
        .map_err(|e| SyncError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    let mut stream = response.bytes_stream();
    let mut bytes_written: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk =
            chunk.map_err(|e| SyncError::fetch(url.as_str(), FetchError::network(url.as_str(), e)))?;
        writer
            .write_all(&chunk)
            .await
            .map_err(|e| SyncError::io(path, e))?;
        bytes_written += chunk.len() as u64;
    }

    writer.flush().await.map_err(|e| SyncError::io(path, e))?;
    debug!(bytes = bytes_written, "body streamed");
    Ok(bytes_written)
}
