//! Integrity check stage: compare on-disk MD5 against the expected hash.
//!
//! Stateless; the pipeline runs it once before downloading (to pick what to
//! fetch) and once after (to confirm the downloads).

use anyhow::Result;
use std::path::Path;

use crate::api::ModFile;
use crate::batch;
use crate::checksum;
use crate::progress::Progress;
use crate::storage;

/// Result of checking one file.
#[derive(Debug)]
pub enum CheckOutcome {
    /// On-disk content matches the expected hash.
    Verified,
    /// Expected hash present, on-disk content differs.
    Mismatch { actual: String },
    /// No expected hash to compare against.
    Unhashed,
    /// File missing or unreadable.
    Unreadable(anyhow::Error),
}

impl CheckOutcome {
    pub fn needs_action(&self) -> bool {
        !matches!(self, CheckOutcome::Verified)
    }
}

/// Outcome of one check pass.
#[derive(Debug, Clone, Default)]
pub struct CheckReport {
    /// Files to (re)download, in input order.
    pub needs_action: Vec<ModFile>,
    pub ok: usize,
    /// Unreadable plus mismatched.
    pub errors: usize,
    /// Files with no expected hash; in `needs_action` but never in `messages`.
    pub unhashed: usize,
    pub messages: Vec<String>,
}

/// Check a single file under `mods_dir`.
pub fn check_file(mods_dir: &Path, file: &ModFile) -> CheckOutcome {
    let path = match storage::mod_path(mods_dir, &file.file_name) {
        Ok(p) => p,
        Err(e) => return CheckOutcome::Unreadable(e.into()),
    };
    let actual = match checksum::md5_path(&path) {
        Ok(d) => d,
        Err(e) => return CheckOutcome::Unreadable(e),
    };
    match file.hash.as_deref() {
        Some(expected) if checksum::digest_eq(expected, &actual) => CheckOutcome::Verified,
        Some(_) => CheckOutcome::Mismatch { actual },
        None => CheckOutcome::Unhashed,
    }
}

pub async fn check_all(
    mods_dir: &Path,
    files: &[ModFile],
    limit: Option<usize>,
    progress: Progress,
) -> Result<CheckReport> {
    let mut bar = progress.batch(files.len() as u64, "Check hashsum");
    let mods_dir = mods_dir.to_path_buf();

    let results = batch::run_blocking_all(
        files.to_vec(),
        limit,
        move |file| {
            let outcome = check_file(&mods_dir, &file);
            (file, outcome)
        },
        |(_, outcome): &(ModFile, CheckOutcome)| match outcome {
            CheckOutcome::Verified => bar.ok(),
            CheckOutcome::Unhashed => bar.skip(),
            CheckOutcome::Mismatch { .. } | CheckOutcome::Unreadable(_) => bar.err(),
        },
    )
    .await?;
    bar.finish();

    let mut report = CheckReport::default();
    for (file, outcome) in results {
        match &outcome {
            CheckOutcome::Verified => report.ok += 1,
            CheckOutcome::Mismatch { actual } => {
                tracing::warn!(
                    file_name = %file.file_name,
                    expected = file.hash.as_deref().unwrap_or(""),
                    actual = %actual,
                    "hash mismatch"
                );
                report.errors += 1;
                report.messages.push(format!("{} hash mismatch!", file.display_name));
            }
            CheckOutcome::Unreadable(e) => {
                tracing::warn!(file_name = %file.file_name, "hash error: {:#}", e);
                report.errors += 1;
                report.messages.push(format!("{} hash error!", file.display_name));
            }
            CheckOutcome::Unhashed => {
                tracing::debug!(file_name = %file.file_name, "no hash to verify against");
                report.unhashed += 1;
            }
        }
        if outcome.needs_action() {
            report.needs_action.push(file);
        }
    }

    tracing::info!(
        ok = report.ok,
        errors = report.errors,
        unhashed = report.unhashed,
        "check pass done"
    );
    Ok(report)
}
