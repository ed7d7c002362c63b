//! Drawscape configuration parsed from environment variables.

use super::types::ApiError;

pub const DEFAULT_DRAWSCAPE_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_DRAWSCAPE_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawscapeTimeouts {
    /// Whole-request timeout. `None` leaves render requests unbounded.
    pub request_secs: Option<u64>,
    pub connect_secs: u64,
}

impl Default for DrawscapeTimeouts {
    fn default() -> Self {
        Self { request_secs: None, connect_secs: DEFAULT_DRAWSCAPE_CONNECT_TIMEOUT_SECS }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawscapeConfig {
    pub base_url: String,
    pub timeouts: DrawscapeTimeouts,
    /// Schematic preselected when a configuration session starts.
    pub default_schematic: Option<String>,
}

impl DrawscapeConfig {
    /// Config pointing at `base_url` with default timeouts.
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeouts: DrawscapeTimeouts::default(),
            default_schematic: None,
        }
    }

    /// Build typed config from environment variables.
    ///
    /// Optional:
    /// - `DRAWSCAPE_API_URL`: default `http://localhost:8000`
    /// - `DRAWSCAPE_REQUEST_TIMEOUT_SECS`: unset means no request timeout
    /// - `DRAWSCAPE_CONNECT_TIMEOUT_SECS`: default 10
    /// - `ARTBOARD_DEFAULT_SCHEMATIC`: schematic id to seed new sessions with
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::ConfigParse`] if a timeout is set but not a number.
    pub fn from_env() -> Result<Self, ApiError> {
        let base_url = std::env::var("DRAWSCAPE_API_URL").unwrap_or_else(|_| DEFAULT_DRAWSCAPE_API_URL.to_string());
        let request_secs = match std::env::var("DRAWSCAPE_REQUEST_TIMEOUT_SECS") {
            Ok(raw) => Some(parse_secs("DRAWSCAPE_REQUEST_TIMEOUT_SECS", &raw)?),
            Err(_) => None,
        };
        let connect_secs = match std::env::var("DRAWSCAPE_CONNECT_TIMEOUT_SECS") {
            Ok(raw) => parse_secs("DRAWSCAPE_CONNECT_TIMEOUT_SECS", &raw)?,
            Err(_) => DEFAULT_DRAWSCAPE_CONNECT_TIMEOUT_SECS,
        };
        let default_schematic = std::env::var("ARTBOARD_DEFAULT_SCHEMATIC")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());

        let mut config = Self::new(&base_url);
        config.timeouts = DrawscapeTimeouts { request_secs, connect_secs };
        config.default_schematic = default_schematic;
        Ok(config)
    }
}

fn parse_secs(key: &str, raw: &str) -> Result<u64, ApiError> {
    raw.trim()
        .parse::<u64>()
        .map_err(|_| ApiError::ConfigParse(format!("{key} must be a whole number of seconds, got '{raw}'")))
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
