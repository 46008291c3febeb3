use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Default mod-hosting API endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.curseforge.com";

/// Environment variable holding the API key sent as `x-api-key`.
pub const TOKEN_ENV: &str = "TOKEN";

/// Global configuration loaded from `~/.config/modsync/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModsyncConfig {
    /// Base URL of the API (without the `/v1/...` path).
    pub endpoint: String,
    /// Directory that downloaded mod files are written to and verified in.
    pub mods_dir: PathBuf,
    /// Cap on in-flight lookups / hash computations. None = one task per item, no cap.
    #[serde(default)]
    pub max_concurrent: Option<usize>,
    /// Connect timeout applied to every HTTP request.
    pub connect_timeout_secs: u64,
}

impl Default for ModsyncConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            mods_dir: PathBuf::from("mods"),
            max_concurrent: None,
            connect_timeout_secs: 30,
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("modsync")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<ModsyncConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = ModsyncConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: ModsyncConfig =
        toml::from_str(&data).with_context(|| format!("parse {}", path.display()))?;
    Ok(cfg)
}

/// Read the API token from the environment. Missing or empty token is fatal.
pub fn api_token() -> Result<String> {
    match std::env::var(TOKEN_ENV) {
        Ok(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
        _ => anyhow::bail!(
            "missing API token: set {} in the environment or in a .env file",
            TOKEN_ENV
        ),
    }
}
