//! Download stage: stream each file to the mods directory, one at a time.
//!
//! Sequential on purpose so a large modpack doesn't open hundreds of
//! transfers at once. A failed item is cleaned up and reported, never retried;
//! the next item is always attempted.

use anyhow::{Context, Result};
use indicatif::ProgressBar;
use std::cell::Cell;
use std::path::Path;
use std::time::Duration;

use crate::api::ModFile;
use crate::progress::{self, Progress};
use crate::storage::{self, StorageWriter};

/// Why a single download failed.
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    #[error("transfer failed: {0}")]
    Transfer(curl::Error),
    #[error("HTTP {0}")]
    Http(u32),
    #[error("storage: {0}")]
    Storage(#[from] std::io::Error),
}

impl DownloadError {
    /// Console line for this failure.
    pub fn message(&self, display_name: &str) -> String {
        match self {
            DownloadError::Transfer(_) | DownloadError::Http(_) => {
                format!("Download error: {}", display_name)
            }
            DownloadError::Storage(_) => format!("Save error: {}", display_name),
        }
    }
}

/// Outcome of the download stage.
#[derive(Debug, Clone, Default)]
pub struct DownloadReport {
    /// Always equals the number of input items.
    pub attempted: usize,
    pub completed: usize,
    pub errors: Vec<String>,
}

/// Download `url` into `path`, ticking `bar` with percent complete.
/// Returns bytes written.
///
/// The file is opened (truncating any old copy) only when the first body byte
/// of a 2xx response arrives, so a connect failure or an error status leaves
/// an existing file alone. Once opened, any error removes the partial file.
///
/// Runs in the current thread; call from `spawn_blocking` if used from async code.
pub fn download_file(
    url: &str,
    path: &Path,
    connect_timeout: Duration,
    bar: &ProgressBar,
) -> Result<u64, DownloadError> {
    let mut writer: Option<StorageWriter> = None;
    let streamed = stream_into(url, path, &mut writer, connect_timeout, bar);
    match (streamed, writer) {
        (Ok(()), Some(writer)) => finish_or_remove(writer, path),
        // 2xx with an empty body still produces the (empty) file.
        (Ok(()), None) => finish_or_remove(StorageWriter::create(path)?, path),
        (Err(e), Some(writer)) => {
            writer.discard();
            Err(e)
        }
        (Err(e), None) => Err(e),
    }
}

fn finish_or_remove(writer: StorageWriter, path: &Path) -> Result<u64, DownloadError> {
    writer.finish().map_err(|e| {
        storage::remove_partial(path);
        DownloadError::Storage(e)
    })
}

/// Status code from an HTTP status line (`HTTP/1.1 200 OK`, `HTTP/2 302`).
fn status_code(header: &[u8]) -> Option<u32> {
    let line = std::str::from_utf8(header).ok()?;
    let rest = line.strip_prefix("HTTP/")?;
    rest.split_whitespace().nth(1)?.parse().ok()
}

fn is_success(code: u32) -> bool {
    (200..300).contains(&code)
}

fn stream_into(
    url: &str,
    path: &Path,
    writer: &mut Option<StorageWriter>,
    connect_timeout: Duration,
    bar: &ProgressBar,
) -> Result<(), DownloadError> {
    let mut write_err: Option<std::io::Error> = None;
    // Last status line seen; with redirects this ends up as the final response.
    let status: Cell<Option<u32>> = Cell::new(None);

    let mut easy = curl::easy::Easy::new();
    easy.url(url).map_err(DownloadError::Transfer)?;
    easy.follow_location(true).map_err(DownloadError::Transfer)?;
    easy.max_redirections(10).map_err(DownloadError::Transfer)?;
    easy.connect_timeout(connect_timeout)
        .map_err(DownloadError::Transfer)?;
    easy.progress(true).map_err(DownloadError::Transfer)?;

    let performed = {
        let mut transfer = easy.transfer();
        transfer
            .header_function(|data| {
                if let Some(code) = status_code(data) {
                    status.set(Some(code));
                }
                true
            })
            .map_err(DownloadError::Transfer)?;
        transfer
            .write_function(|data| {
                if matches!(status.get(), Some(code) if !is_success(code)) {
                    // Error page body; never touches the disk.
                    return Ok(data.len());
                }
                if writer.is_none() {
                    match StorageWriter::create(path) {
                        Ok(w) => *writer = Some(w),
                        Err(e) => {
                            write_err = Some(e);
                            return Ok(0); // abort transfer
                        }
                    }
                }
                let res = match writer.as_mut() {
                    Some(w) => w.write(data),
                    None => Ok(()),
                };
                match res {
                    Ok(()) => Ok(data.len()),
                    Err(e) => {
                        write_err = Some(e);
                        Ok(0) // abort transfer
                    }
                }
            })
            .map_err(DownloadError::Transfer)?;
        transfer
            .progress_function(|dltotal, dlnow, _, _| {
                if let Some(pct) = progress::percent(dlnow, dltotal) {
                    bar.set_position(pct);
                }
                true
            })
            .map_err(DownloadError::Transfer)?;
        transfer.perform()
    };

    if let Some(e) = write_err {
        return Err(DownloadError::Storage(e));
    }
    performed.map_err(DownloadError::Transfer)?;

    let code = easy.response_code().map_err(DownloadError::Transfer)?;
    if !is_success(code) {
        return Err(DownloadError::Http(code));
    }
    Ok(())
}

/// Download every file in `files`, strictly in order.
pub async fn download_all(
    mods_dir: &Path,
    files: &[ModFile],
    connect_timeout: Duration,
    progress: Progress,
) -> Result<DownloadReport> {
    let mut report = DownloadReport::default();

    for file in files {
        report.attempted += 1;
        let bar = progress.transfer(&file.display_name);

        let res = match storage::mod_path(mods_dir, &file.file_name) {
            Ok(path) => {
                let url = file.download_url.clone();
                let task_bar = bar.clone();
                tokio::task::spawn_blocking(move || {
                    download_file(&url, &path, connect_timeout, &task_bar)
                })
                .await
                .context("download task join")?
            }
            Err(e) => Err(DownloadError::Storage(e)),
        };

        match res {
            Ok(bytes) => {
                bar.set_position(100);
                bar.finish();
                tracing::info!(file_name = %file.file_name, bytes, "downloaded");
                report.completed += 1;
            }
            Err(e) => {
                bar.abandon();
                tracing::warn!(
                    file_name = %file.file_name,
                    url = %file.download_url,
                    "download failed: {}",
                    e
                );
                report.errors.push(e.message(&file.display_name));
            }
        }
    }

    tracing::info!(
        attempted = report.attempted,
        completed = report.completed,
        "download stage done"
    );
    Ok(report)
}
