//! Input manifest: the list of (projectID, fileID) pairs to resolve.
//!
//! Modpack manifests carry many more keys (minecraft version, mod loaders,
//! per-file `required` flags); only `files[].projectID` and `files[].fileID`
//! are read.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fmt;
use std::path::Path;

/// One file to resolve against the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub struct ModReference {
    #[serde(rename = "projectID")]
    pub project_id: u64,
    #[serde(rename = "fileID")]
    pub file_id: u64,
}

impl fmt::Display for ModReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.project_id, self.file_id)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Manifest {
    pub files: Vec<ModReference>,
}

impl Manifest {
    pub fn from_json(data: &str) -> Result<Self> {
        serde_json::from_str(data).context("invalid manifest JSON")
    }

    /// Read and parse a manifest file. Any failure here is fatal for the run.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("read manifest {}", path.display()))?;
        let manifest =
            Self::from_json(&data).with_context(|| format!("parse manifest {}", path.display()))?;
        tracing::debug!(
            files = manifest.files.len(),
            "loaded manifest {}",
            path.display()
        );
        Ok(manifest)
    }
}
