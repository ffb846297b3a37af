// Client configuration: base URI, bearer token and request timeout.
// Loaded from the environment, from a JSON file, or built directly.

use anyhow::{Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_URI: &str = "http://localhost:8080";
const DEFAULT_TIMEOUT_SEC: u64 = 30;
const TOKEN_FILE: &str = ".mlcave_token";

/// Settings consumed once when an `ApiClient` is created.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub uri: String,
    pub token: String,
    /// Per-request timeout in seconds. `0` disables the timeout.
    #[serde(default = "default_timeout_sec")]
    pub timeout_sec: u64,
}

fn default_timeout_sec() -> u64 {
    DEFAULT_TIMEOUT_SEC
}

impl ClientConfig {
    pub fn new(uri: impl Into<String>, token: impl Into<String>, timeout_sec: u64) -> Self {
        ClientConfig {
            uri: uri.into(),
            token: token.into(),
            timeout_sec,
        }
    }

    /// Timeout handed to the transport. Zero means no timeout at all rather
    /// than an immediate one.
    pub fn timeout(&self) -> Option<Duration> {
        match self.timeout_sec {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    /// Build a config from `MLCAVE_URI`, `MLCAVE_TOKEN` and
    /// `MLCAVE_TIMEOUT_SEC`. Without `MLCAVE_TOKEN` the token persisted by
    /// `persist_token` is used, if any.
    pub fn from_env() -> Result<Self> {
        let uri = std::env::var("MLCAVE_URI").unwrap_or_else(|_| DEFAULT_URI.into());
        let token = match std::env::var("MLCAVE_TOKEN") {
            Ok(t) => t,
            Err(_) => match load_token() {
                Ok(t) => t,
                Err(e) => {
                    if token_path().exists() {
                        warn!("ignoring token file: {e:#}");
                    }
                    String::new()
                }
            },
        };
        let timeout_sec = match std::env::var("MLCAVE_TIMEOUT_SEC") {
            Ok(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("Invalid MLCAVE_TIMEOUT_SEC value: {raw:?}"))?,
            Err(_) => DEFAULT_TIMEOUT_SEC,
        };
        Ok(ClientConfig::new(uri, token, timeout_sec))
    }

    /// Read a JSON config file with `uri`, `token` and optional `timeout_sec`.
    pub fn from_file(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let cfg = serde_json::from_str(&data)
            .with_context(|| format!("Parsing config file {}", path.display()))?;
        Ok(cfg)
    }
}

fn token_path() -> PathBuf {
    let dir = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    dir.join(TOKEN_FILE)
}

/// Persist the bearer token into a file in the user's home directory.
pub fn persist_token(token: &str) -> Result<()> {
    let path = token_path();
    std::fs::write(&path, token)
        .with_context(|| format!("Failed to write token to {}", path.display()))?;
    Ok(())
}

/// Load the bearer token saved by `persist_token`.
pub fn load_token() -> Result<String> {
    let path = token_path();
    let data = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read token from {}", path.display()))?;
    Ok(data.trim().to_string())
}
