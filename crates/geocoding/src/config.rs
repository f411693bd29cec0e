//! Geocoder configuration (defaults + environment overrides).

use std::time::Duration;

use tracing::warn;

pub const DEFAULT_BASE_URL: &str = "https://nominatim.openstreetmap.org";
pub const DEFAULT_COUNTRY_CODES: &str = "us";
pub const DEFAULT_RESULT_LIMIT: usize = 5;
pub const DEFAULT_USER_AGENT: &str = concat!("billbook/", env!("CARGO_PKG_VERSION"));

/// Settings for the Nominatim client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeocoderConfig {
    /// Service root, without trailing slash.
    pub base_url: String,
    /// Country scope for forward searches (comma separated ISO codes).
    pub country_codes: String,
    /// Maximum number of forward search candidates.
    pub result_limit: usize,
    /// Nominatim's usage policy requires an identifying user agent.
    pub user_agent: String,
    /// Request timeout. `None` means no timeout is enforced.
    pub timeout: Option<Duration>,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            country_codes: DEFAULT_COUNTRY_CODES.to_string(),
            result_limit: DEFAULT_RESULT_LIMIT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: None,
        }
    }
}

impl GeocoderConfig {
    /// Defaults overridden by `BILLBOOK_GEOCODER_*` environment variables.
    ///
    /// Unparsable values are logged and ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(url) = lookup("BILLBOOK_GEOCODER_URL") {
            config.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(codes) = lookup("BILLBOOK_GEOCODER_COUNTRY") {
            config.country_codes = codes;
        }
        if let Some(raw) = lookup("BILLBOOK_GEOCODER_LIMIT") {
            match raw.parse::<usize>() {
                Ok(limit) if limit > 0 => config.result_limit = limit,
                _ => warn!(
                    value = %raw,
                    "BILLBOOK_GEOCODER_LIMIT is not a positive integer; using default"
                ),
            }
        }
        if let Some(agent) = lookup("BILLBOOK_GEOCODER_USER_AGENT") {
            config.user_agent = agent;
        }
        if let Some(raw) = lookup("BILLBOOK_GEOCODER_TIMEOUT_SECS") {
            match raw.parse::<u64>() {
                Ok(0) => config.timeout = None,
                Ok(secs) => config.timeout = Some(Duration::from_secs(secs)),
                Err(_) => warn!(
                    value = %raw,
                    "BILLBOOK_GEOCODER_TIMEOUT_SECS is not an integer; no timeout"
                ),
            }
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_public_nominatim() {
        let config = GeocoderConfig::from_lookup(lookup_from(&[]));
        assert_eq!(config, GeocoderConfig::default());
        assert_eq!(config.base_url, "https://nominatim.openstreetmap.org");
        assert_eq!(config.country_codes, "us");
        assert_eq!(config.result_limit, 5);
        assert_eq!(config.timeout, None);
    }

    #[test]
    fn environment_overrides_apply() {
        let config = GeocoderConfig::from_lookup(lookup_from(&[
            ("BILLBOOK_GEOCODER_URL", "http://localhost:8088/"),
            ("BILLBOOK_GEOCODER_COUNTRY", "ca"),
            ("BILLBOOK_GEOCODER_LIMIT", "3"),
            ("BILLBOOK_GEOCODER_TIMEOUT_SECS", "10"),
        ]));
        assert_eq!(config.base_url, "http://localhost:8088");
        assert_eq!(config.country_codes, "ca");
        assert_eq!(config.result_limit, 3);
        assert_eq!(config.timeout, Some(Duration::from_secs(10)));
    }

    #[test]
    fn bad_values_fall_back_to_defaults() {
        let config = GeocoderConfig::from_lookup(lookup_from(&[
            ("BILLBOOK_GEOCODER_LIMIT", "zero"),
            ("BILLBOOK_GEOCODER_TIMEOUT_SECS", "soon"),
        ]));
        assert_eq!(config.result_limit, DEFAULT_RESULT_LIMIT);
        assert_eq!(config.timeout, None);
    }
}
