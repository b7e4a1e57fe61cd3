//! Credential resolution.
//!
//! Precedence for each field: explicit flag > environment variable >
//! ~/.config/crmsync/auth.json. The API base falls back to the public
//! endpoint; the token has no fallback.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::client::HubError;

pub const DEFAULT_API_BASE: &str = "https://api.hubapi.com";
pub const TOKEN_ENV: &str = "CRMSYNC_TOKEN";
pub const API_BASE_ENV: &str = "CRMSYNC_API_BASE";

/// Private-app token plus the API root it is valid for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    /// Bearer token
    pub token: String,
    /// API base URL (e.g., "https://api.hubapi.com")
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.into()
}

impl Credentials {
    pub fn new(token: impl Into<String>, api_base: impl Into<String>) -> Self {
        Self { token: token.into(), api_base: api_base.into() }
    }
}

/// Returns the path to the saved credentials file.
pub fn auth_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|c| c.join("crmsync/auth.json"))
}

/// Load saved credentials from `path`.
/// Returns None if the file is absent or invalid.
pub fn load_auth_from(path: &Path) -> Option<Credentials> {
    let contents = std::fs::read_to_string(path).ok()?;
    match serde_json::from_str(&contents) {
        Ok(creds) => Some(creds),
        Err(e) => {
            log::warn!("ignoring unreadable credentials file {}: {e}", path.display());
            None
        }
    }
}

/// Load saved credentials from the default location.
pub fn load_auth() -> Option<Credentials> {
    load_auth_from(&auth_file_path()?)
}

/// Resolve credentials from flags, the process environment, and the saved file.
pub fn resolve_credentials(token_flag: Option<&str>, api_base_flag: Option<&str>) -> Result<Credentials, HubError> {
    let env_token = std::env::var(TOKEN_ENV).ok();
    let env_base = std::env::var(API_BASE_ENV).ok();
    resolve_from(
        [token_flag, env_token.as_deref()],
        [api_base_flag, env_base.as_deref()],
        load_auth(),
    )
}

/// Pick the first non-blank candidate for each field, then the saved file.
pub fn resolve_from(
    token_candidates: [Option<&str>; 2],
    base_candidates: [Option<&str>; 2],
    saved: Option<Credentials>,
) -> Result<Credentials, HubError> {
    let first = |candidates: [Option<&str>; 2]| {
        candidates
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|v| !v.is_empty())
            .map(String::from)
    };

    let token = first(token_candidates)
        .or_else(|| saved.as_ref().map(|c| c.token.trim().to_string()).filter(|t| !t.is_empty()))
        .ok_or(HubError::NotAuthenticated)?;

    let api_base = first(base_candidates)
        .or_else(|| saved.map(|c| c.api_base))
        .unwrap_or_else(default_api_base);

    Ok(Credentials::new(token, api_base.trim_end_matches('/')))
}
