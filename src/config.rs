// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use url::Url;

use crate::error::ConfigError;

/// Public Radio France GraphQL endpoint
pub const DEFAULT_GRAPHQL_URI: &str = "https://openapi.radiofrance.fr/v1/graphql";

/// Number of diffusions requested per show when no limit is given
pub const DEFAULT_EPISODE_LIMIT: usize = 10;

/// Default download root, relative to the working directory
pub const DEFAULT_OUTPUT_DIR: &str = "downloads";

/// Connection settings for the GraphQL API
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// GraphQL endpoint
    pub endpoint: Url,
    /// Value sent in the `x-token` header, if any
    pub token: Option<String>,
}

impl ApiConfig {
    /// Build a config from a raw endpoint string and optional token
    pub fn new(endpoint: &str, token: Option<String>) -> Result<Self, ConfigError> {
        let endpoint = Url::parse(endpoint).map_err(|e| ConfigError::InvalidEndpoint {
            uri: endpoint.to_string(),
            source: e,
        })?;

        Ok(Self {
            endpoint,
            token: token.filter(|t| !t.is_empty()),
        })
    }
}

/// Explicit proxy settings handed to the HTTP client at construction time
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProxyConfig {
    /// Proxy for plain HTTP targets (also the fallback for HTTPS targets)
    pub http: Option<String>,
    /// Proxy for HTTPS targets
    pub https: Option<String>,
}

impl ProxyConfig {
    /// Build a proxy config, normalizing both URLs and dropping empty values
    pub fn new(http: Option<String>, https: Option<String>) -> Self {
        Self {
            http: http.as_deref().and_then(normalize_proxy_url),
            https: https.as_deref().and_then(normalize_proxy_url),
        }
    }

    /// Proxy used for requests to HTTPS targets
    pub fn for_https(&self) -> Option<&str> {
        self.https.as_deref().or(self.http.as_deref())
    }

    /// Proxy used for requests to plain HTTP targets
    pub fn for_http(&self) -> Option<&str> {
        self.http.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.http.is_none() && self.https.is_none()
    }
}

/// Prepend `http://` to proxy URLs given without a scheme
pub fn normalize_proxy_url(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if raw.starts_with("http://") || raw.starts_with("https://") {
        Some(raw.to_string())
    } else {
        Some(format!("http://{raw}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_keeps_urls_with_scheme() {
        assert_eq!(
            normalize_proxy_url("http://proxy:3128"),
            Some("http://proxy:3128".to_string())
        );
        assert_eq!(
            normalize_proxy_url("https://proxy:3128"),
            Some("https://proxy:3128".to_string())
        );
    }

    #[test]
    fn normalize_adds_missing_scheme() {
        assert_eq!(
            normalize_proxy_url("proxy.local:8080"),
            Some("http://proxy.local:8080".to_string())
        );
    }

    #[test]
    fn normalize_drops_empty_values() {
        assert_eq!(normalize_proxy_url(""), None);
        assert_eq!(normalize_proxy_url("   "), None);
    }

    #[test]
    fn https_targets_fall_back_to_http_proxy() {
        let proxies = ProxyConfig::new(Some("proxy:3128".to_string()), None);

        assert_eq!(proxies.for_https(), Some("http://proxy:3128"));
        assert_eq!(proxies.for_http(), Some("http://proxy:3128"));
    }

    #[test]
    fn https_targets_prefer_https_proxy() {
        let proxies = ProxyConfig::new(
            Some("http://plain:3128".to_string()),
            Some("http://secure:3129".to_string()),
        );

        assert_eq!(proxies.for_https(), Some("http://secure:3129"));
        assert_eq!(proxies.for_http(), Some("http://plain:3128"));
    }

    #[test]
    fn http_targets_ignore_https_proxy() {
        let proxies = ProxyConfig::new(None, Some("http://secure:3129".to_string()));

        assert_eq!(proxies.for_http(), None);
        assert!(!proxies.is_empty());
    }

    #[test]
    fn api_config_rejects_invalid_endpoint() {
        let result = ApiConfig::new("not a url", None);
        assert!(matches!(result, Err(ConfigError::InvalidEndpoint { .. })));
    }

    #[test]
    fn api_config_drops_empty_token() {
        let config = ApiConfig::new(DEFAULT_GRAPHQL_URI, Some(String::new())).unwrap();
        assert!(config.token.is_none());
    }

    #[test]
    fn api_config_parses_default_endpoint() {
        let config = ApiConfig::new(DEFAULT_GRAPHQL_URI, Some("secret".to_string())).unwrap();
        assert_eq!(config.endpoint.as_str(), DEFAULT_GRAPHQL_URI);
        assert_eq!(config.token.as_deref(), Some("secret"));
    }
}
