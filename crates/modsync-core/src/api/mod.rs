//! Mod-hosting API client: file metadata lookup.
//!
//! Uses the curl crate (libcurl) for `GET {endpoint}/v1/mods/{projectID}/files/{fileID}`
//! authenticated with the `x-api-key` header.

mod parse;

pub use parse::{parse_file_response, HASH_ALGO_MD5};

use crate::manifest::ModReference;
use std::time::Duration;

/// Resolved metadata for one `ModReference`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModFile {
    pub display_name: String,
    pub download_url: String,
    /// Name of the file under the mods directory.
    pub file_name: String,
    /// Expected MD5 (lowercase hex), if the API published one.
    pub hash: Option<String>,
}

/// Why a single metadata lookup failed. Never aborts the batch.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Fetch status: {0}")]
    Status(u32),
    #[error("Fetch json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Fetch json: download URL unavailable")]
    MissingDownloadUrl,
    #[error("Fetch transport: {0}")]
    Transport(#[from] curl::Error),
}

/// Connection settings for the API. Cheap to clone into blocking tasks.
#[derive(Debug, Clone)]
pub struct ApiClient {
    endpoint: String,
    token: String,
    connect_timeout: Duration,
}

impl ApiClient {
    pub fn new(endpoint: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            token: token.into(),
            connect_timeout: Duration::from_secs(30),
        }
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// File-lookup URL for a reference.
    pub fn file_url(&self, reference: &ModReference) -> String {
        format!(
            "{}/v1/mods/{}/files/{}",
            self.endpoint.trim_end_matches('/'),
            reference.project_id,
            reference.file_id
        )
    }

    /// Look up one file's metadata.
    ///
    /// Runs in the current thread; call from `spawn_blocking` if used from async code.
    pub fn fetch_file(&self, reference: &ModReference) -> Result<ModFile, FetchError> {
        let url = self.file_url(reference);
        let mut body: Vec<u8> = Vec::new();

        let mut easy = curl::easy::Easy::new();
        easy.url(&url)?;
        easy.follow_location(true)?;
        easy.connect_timeout(self.connect_timeout)?;

        let mut list = curl::easy::List::new();
        list.append("Accept: application/json")?;
        list.append(&format!("x-api-key: {}", self.token))?;
        easy.http_headers(list)?;

        {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.perform()?;
        }

        let code = easy.response_code()?;
        if !(200..300).contains(&code) {
            return Err(FetchError::Status(code));
        }

        parse_file_response(&body)
    }
}
