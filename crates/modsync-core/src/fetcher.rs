//! Metadata fetch stage: resolve every ModReference to a ModFile.
//!
//! One lookup per reference, all started together (or up to `limit` at a
//! time). A failed lookup becomes one message line and the item is dropped;
//! it never aborts the batch.

use anyhow::Result;

use crate::api::{ApiClient, FetchError, ModFile};
use crate::batch;
use crate::manifest::ModReference;
use crate::progress::Progress;

/// Outcome of the fetch stage.
#[derive(Debug, Clone, Default)]
pub struct FetchReport {
    /// Successfully resolved files, in manifest order.
    pub files: Vec<ModFile>,
    /// One line per failed lookup: `projectID:fileID | <reason>`.
    pub errors: Vec<String>,
    pub ok: usize,
    pub failed: usize,
}

pub async fn fetch_all(
    client: &ApiClient,
    references: &[ModReference],
    limit: Option<usize>,
    progress: Progress,
) -> Result<FetchReport> {
    let mut bar = progress.batch(references.len() as u64, "Fetching list");
    let client = client.clone();

    let results = batch::run_blocking_all(
        references.to_vec(),
        limit,
        move |reference| {
            let res = client.fetch_file(&reference);
            (reference, res)
        },
        |(_, res): &(ModReference, Result<ModFile, FetchError>)| match res {
            Ok(_) => bar.ok(),
            Err(_) => bar.err(),
        },
    )
    .await?;
    bar.finish();

    let mut report = FetchReport::default();
    for (reference, res) in results {
        match res {
            Ok(file) => {
                tracing::debug!(%reference, file_name = %file.file_name, "resolved");
                report.files.push(file);
                report.ok += 1;
            }
            Err(e) => {
                let line = format!("{} | {}", reference, e);
                tracing::warn!("{}", line);
                report.errors.push(line);
                report.failed += 1;
            }
        }
    }

    tracing::info!(ok = report.ok, failed = report.failed, "fetch stage done");
    Ok(report)
}
