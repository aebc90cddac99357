//! Dashboard configuration.
//!
//! The browser bundle has no process environment, so the keys are baked in
//! at compile time. [`DashboardConfig::from_lookup`] holds the parsing rules.

use std::time::Duration;

use thiserror::Error;

use fleetdash_auth::ProviderConfig;

pub const API_URL_VAR: &str = "FLEETDASH_API_URL";
pub const SUPABASE_URL_VAR: &str = "FLEETDASH_SUPABASE_URL";
pub const SUPABASE_ANON_KEY_VAR: &str = "FLEETDASH_SUPABASE_ANON_KEY";
pub const HTTP_TIMEOUT_VAR: &str = "FLEETDASH_HTTP_TIMEOUT_SECS";

const DEFAULT_API_URL: &str = "http://localhost:3000";
const DEFAULT_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required setting {0}")]
    Missing(&'static str),

    #[error("invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardConfig {
    /// Base URL of the dashboard API (monthly reports).
    pub api_url: String,
    pub provider: ProviderConfig,
    pub http_timeout: Duration,
}

impl DashboardConfig {
    /// Settings compiled into the browser bundle.
    pub fn from_build_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| {
            let value = match key {
                API_URL_VAR => option_env!("FLEETDASH_API_URL"),
                SUPABASE_URL_VAR => option_env!("FLEETDASH_SUPABASE_URL"),
                SUPABASE_ANON_KEY_VAR => option_env!("FLEETDASH_SUPABASE_ANON_KEY"),
                HTTP_TIMEOUT_VAR => option_env!("FLEETDASH_HTTP_TIMEOUT_SECS"),
                _ => None,
            };
            value.map(str::to_string)
        })
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_url = non_empty(API_URL_VAR).unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let supabase_url = non_empty(SUPABASE_URL_VAR).ok_or(ConfigError::Missing(SUPABASE_URL_VAR))?;
        let anon_key =
            non_empty(SUPABASE_ANON_KEY_VAR).ok_or(ConfigError::Missing(SUPABASE_ANON_KEY_VAR))?;

        let http_timeout = match non_empty(HTTP_TIMEOUT_VAR) {
            Some(raw) => {
                let secs = raw.trim().parse::<u64>().map_err(|_| ConfigError::Invalid {
                    key: HTTP_TIMEOUT_VAR,
                    value: raw.clone(),
                })?;
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        Ok(Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            provider: ProviderConfig::new(supabase_url, anon_key).with_timeout(http_timeout),
            http_timeout,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_optional_keys_are_absent() {
        let config = DashboardConfig::from_lookup(lookup(&[
            (SUPABASE_URL_VAR, "https://fleet.supabase.co/"),
            (SUPABASE_ANON_KEY_VAR, "anon"),
        ]))
        .unwrap();

        assert_eq!(config.api_url, "http://localhost:3000");
        assert_eq!(config.provider.base_url, "https://fleet.supabase.co");
        assert_eq!(config.http_timeout, Duration::from_secs(15));
        assert_eq!(config.provider.timeout, config.http_timeout);
    }

    #[test]
    fn missing_provider_settings_are_reported_by_name() {
        let err = DashboardConfig::from_lookup(lookup(&[(SUPABASE_URL_VAR, "https://x")])).unwrap_err();
        assert_eq!(err, ConfigError::Missing(SUPABASE_ANON_KEY_VAR));

        let err = DashboardConfig::from_lookup(lookup(&[(SUPABASE_URL_VAR, "  ")])).unwrap_err();
        assert_eq!(err, ConfigError::Missing(SUPABASE_URL_VAR));
    }

    #[test]
    fn timeout_must_be_whole_seconds() {
        let err = DashboardConfig::from_lookup(lookup(&[
            (SUPABASE_URL_VAR, "https://x"),
            (SUPABASE_ANON_KEY_VAR, "anon"),
            (HTTP_TIMEOUT_VAR, "soon"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: HTTP_TIMEOUT_VAR, .. }));
    }
}
