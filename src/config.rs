//! Portal configuration parsed from environment variables.
//!
//! Required:
//! - `SUPABASE_URL`: backend project URL
//! - `SUPABASE_ANON_KEY`: public API key sent with every backend request
//!
//! Optional:
//! - `PORT`: default 3000
//! - `BACKEND_REQUEST_TIMEOUT_SECS`: default 30
//! - `BACKEND_CONNECT_TIMEOUT_SECS`: default 10
//! - `COOKIE_SECURE`: bool-ish; inferred from an `https://` `PUBLIC_URL` when unset
//! - `SESSION_SWEEP_INTERVAL_SECS`: default 300
//! - `SESSION_GRACE_SECS`: how long past expiry an unrefreshed session is kept; default 7 days

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_BACKEND_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_BACKEND_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_SESSION_SWEEP_INTERVAL_SECS: u64 = 300;
pub const DEFAULT_SESSION_GRACE_SECS: u64 = 7 * 24 * 60 * 60;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required env var {0}")]
    Missing(&'static str),
    #[error("invalid value for {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackendTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    pub url: String,
    pub anon_key: String,
    pub timeouts: BackendTimeouts,
}

/// Background eviction of sessions whose browser never came back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSweep {
    pub interval_secs: u64,
    pub grace_secs: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortalConfig {
    pub port: u16,
    pub cookie_secure: bool,
    pub backend: BackendConfig,
    pub sessions: SessionSweep,
}

impl PortalConfig {
    /// Build typed portal config from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or `PORT` is not a
    /// valid port number.
    pub fn from_env() -> Result<Self, ConfigError> {
        let url = required("SUPABASE_URL")?.trim_end_matches('/').to_string();
        let anon_key = required("SUPABASE_ANON_KEY")?;

        let port = match std::env::var("PORT") {
            Ok(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::Invalid { var: "PORT", value: raw })?,
            Err(_) => DEFAULT_PORT,
        };

        let timeouts = BackendTimeouts {
            request_secs: env_parse_u64("BACKEND_REQUEST_TIMEOUT_SECS", DEFAULT_BACKEND_REQUEST_TIMEOUT_SECS),
            connect_secs: env_parse_u64("BACKEND_CONNECT_TIMEOUT_SECS", DEFAULT_BACKEND_CONNECT_TIMEOUT_SECS),
        };

        let grace_secs = env_parse_u64("SESSION_GRACE_SECS", DEFAULT_SESSION_GRACE_SECS);
        let sessions = SessionSweep {
            interval_secs: env_parse_u64("SESSION_SWEEP_INTERVAL_SECS", DEFAULT_SESSION_SWEEP_INTERVAL_SECS),
            grace_secs: i64::try_from(grace_secs).unwrap_or(i64::MAX),
        };

        Ok(Self {
            port,
            cookie_secure: cookie_secure(),
            backend: BackendConfig { url, anon_key, timeouts },
            sessions,
        })
    }
}

fn required(key: &'static str) -> Result<String, ConfigError> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::Missing(key))
}

pub(crate) fn env_bool(key: &str) -> Option<bool> {
    std::env::var(key)
        .ok()
        .and_then(|raw| match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        })
}

fn env_parse_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(default)
}

fn cookie_secure() -> bool {
    if let Some(value) = env_bool("COOKIE_SECURE") {
        return value;
    }

    std::env::var("PUBLIC_URL")
        .map(|url| url.starts_with("https://"))
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
