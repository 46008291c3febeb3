//! CLI for modsync: `modsync <MANIFEST>`.

use anyhow::Result;
use clap::Parser;
use modsync_core::config::{self, ModsyncConfig};
use modsync_core::pipeline::{self, SyncOptions};
use modsync_core::{ApiClient, Manifest};
use std::path::PathBuf;
use std::time::Duration;

/// Resolve, download and verify the mod files listed in a manifest.
#[derive(Debug, Parser)]
#[command(name = "modsync")]
#[command(about = "Resolve, download and verify mod files from a manifest", long_about = None)]
pub struct Cli {
    /// Manifest JSON with `files: [{projectID, fileID}, ...]`.
    pub manifest: PathBuf,

    /// Directory to download into and verify (default from config: `mods`).
    #[arg(long, value_name = "DIR")]
    pub mods_dir: Option<PathBuf>,

    /// API base URL (default from config: https://api.curseforge.com).
    #[arg(long, value_name = "URL")]
    pub endpoint: Option<String>,

    /// Run at most N lookups / hash checks at once (default: no limit).
    #[arg(long, value_name = "N")]
    pub jobs: Option<usize>,

    /// Don't draw progress bars.
    #[arg(long)]
    pub no_progress: bool,
}

impl Cli {
    /// Fold command-line overrides into the file config.
    pub fn apply(&self, mut cfg: ModsyncConfig) -> ModsyncConfig {
        if let Some(dir) = &self.mods_dir {
            cfg.mods_dir = dir.clone();
        }
        if let Some(endpoint) = &self.endpoint {
            cfg.endpoint = endpoint.clone();
        }
        if let Some(jobs) = self.jobs {
            cfg.max_concurrent = Some(jobs.max(1));
        }
        cfg
    }

    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = cli.apply(config::load_or_init()?);
        tracing::debug!("loaded config: {:?}", cfg);

        let manifest = Manifest::load(&cli.manifest)?;
        let token = config::api_token()?;

        let client = ApiClient::new(cfg.endpoint.clone(), token)
            .with_connect_timeout(Duration::from_secs(cfg.connect_timeout_secs));
        let mut opts = SyncOptions::from_config(&cfg);
        opts.show_progress = !cli.no_progress;

        pipeline::run(&client, &manifest.files, &opts).await?;
        Ok(())
    }
}
