//! The full run: fetch -> check -> download -> check again -> report.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;

use crate::api::{ApiClient, ModFile};
use crate::config::ModsyncConfig;
use crate::downloader::{self, DownloadReport};
use crate::fetcher::{self, FetchReport};
use crate::manifest::ModReference;
use crate::progress::Progress;
use crate::verify::{self, CheckReport};

/// Per-run settings passed explicitly into each stage.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub mods_dir: PathBuf,
    /// Cap for the fetch and check fan-out; None = unbounded.
    pub max_concurrent: Option<usize>,
    pub connect_timeout: Duration,
    pub show_progress: bool,
}

impl SyncOptions {
    pub fn from_config(cfg: &ModsyncConfig) -> Self {
        Self {
            mods_dir: cfg.mods_dir.clone(),
            max_concurrent: cfg.max_concurrent,
            connect_timeout: Duration::from_secs(cfg.connect_timeout_secs),
            show_progress: true,
        }
    }
}

/// Everything each stage produced.
#[derive(Debug, Clone, Default)]
pub struct SyncReport {
    pub fetch: FetchReport,
    pub first_check: CheckReport,
    pub download: DownloadReport,
    pub second_check: CheckReport,
}

impl SyncReport {
    /// Downloaded files that have no hash to verify integrity against.
    pub fn unhashed(&self) -> Vec<&ModFile> {
        self.second_check
            .needs_action
            .iter()
            .filter(|f| f.hash.is_none())
            .collect()
    }

    /// Files that have a hash but still fail verification after download.
    pub fn failed(&self) -> Vec<&ModFile> {
        self.second_check
            .needs_action
            .iter()
            .filter(|f| f.hash.is_some())
            .collect()
    }
}

fn print_messages(lines: &[String]) {
    if !lines.is_empty() {
        println!("{}", lines.join("\n"));
    }
}

/// Run every stage over `references`.
pub async fn run(
    client: &ApiClient,
    references: &[ModReference],
    opts: &SyncOptions,
) -> Result<SyncReport> {
    let progress = Progress::new(opts.show_progress);
    std::fs::create_dir_all(&opts.mods_dir)
        .with_context(|| format!("create mods dir {}", opts.mods_dir.display()))?;

    tracing::info!(
        files = references.len(),
        mods_dir = %opts.mods_dir.display(),
        "sync started"
    );

    let fetch = fetcher::fetch_all(client, references, opts.max_concurrent, progress).await?;
    print_messages(&fetch.errors);

    let first_check =
        verify::check_all(&opts.mods_dir, &fetch.files, opts.max_concurrent, progress).await?;
    print_messages(&first_check.messages);

    let download = downloader::download_all(
        &opts.mods_dir,
        &first_check.needs_action,
        opts.connect_timeout,
        progress,
    )
    .await?;
    print_messages(&download.errors);

    let second_check = verify::check_all(
        &opts.mods_dir,
        &first_check.needs_action,
        opts.max_concurrent,
        progress,
    )
    .await?;
    print_messages(&second_check.messages);

    let report = SyncReport {
        fetch,
        first_check,
        download,
        second_check,
    };
    print_final_report(&report);
    Ok(report)
}

/// End-of-run integrity warnings. Advisory only; never an error.
pub fn print_final_report(report: &SyncReport) {
    let unhashed = report.unhashed();
    if !unhashed.is_empty() {
        println!(
            "\n {} file(s) don't have a hash to verify integrity:",
            unhashed.len()
        );
        for f in &unhashed {
            tracing::warn!(file_name = %f.file_name, "no hash to verify integrity");
            println!(" {}  |  {}", f.display_name, f.download_url);
        }
    }

    let failed = report.failed();
    if !failed.is_empty() {
        println!(
            "\n {} file(s) failed verification after download:",
            failed.len()
        );
        for f in &failed {
            tracing::warn!(file_name = %f.file_name, "still failing verification");
            println!(" {}  |  {}", f.display_name, f.download_url);
        }
    }

    tracing::info!(
        fetched = report.fetch.ok,
        fetch_errors = report.fetch.failed,
        downloaded = report.download.completed,
        unhashed = unhashed.len(),
        failed = failed.len(),
        "sync finished"
    );
}
