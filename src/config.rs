use std::time::Duration;

const DEFAULT_API_URL: &str = "http://localhost:8000";
const DEFAULT_API_PREFIX: &str = "/api/v1";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Client settings, read from the environment (and `.env` when the binary loads it).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_url: String,
    pub api_prefix: String,
    /// Applies to plain JSON requests only; streams stay open until the server finishes.
    pub request_timeout: Duration,
    pub auto_recommendations: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            auto_recommendations: false,
        }
    }
}

impl ClientConfig {
    /// Reads `API_URL`, `API_PREFIX`, `REQUEST_TIMEOUT_SECS` and `AUTO_RECOMMENDATIONS`.
    /// Missing or unparsable values fall back to the defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let request_timeout = lookup("REQUEST_TIMEOUT_SECS")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.request_timeout);

        let auto_recommendations = lookup("AUTO_RECOMMENDATIONS")
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
            .unwrap_or(defaults.auto_recommendations);

        Self {
            api_url: lookup("API_URL")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.api_url),
            api_prefix: lookup("API_PREFIX").unwrap_or(defaults.api_prefix),
            request_timeout,
            auto_recommendations,
        }
    }

    /// `api_url` joined with `api_prefix`, without a trailing slash.
    pub fn base_url(&self) -> String {
        let url = self.api_url.trim_end_matches('/');
        let prefix = self.api_prefix.trim_matches('/');
        if prefix.is_empty() {
            url.to_string()
        } else {
            format!("{url}/{prefix}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> ClientConfig {
        let env: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        ClientConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults_when_environment_is_empty() {
        let config = config_from(&[]);
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.base_url(), "http://localhost:8000/api/v1");
    }

    #[test]
    fn reads_overrides_and_ignores_garbage() {
        let config = config_from(&[
            ("API_URL", "https://travel.example/"),
            ("API_PREFIX", ""),
            ("REQUEST_TIMEOUT_SECS", "soon"),
            ("AUTO_RECOMMENDATIONS", "TRUE"),
        ]);
        assert_eq!(config.base_url(), "https://travel.example");
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert!(config.auto_recommendations);
    }
}
