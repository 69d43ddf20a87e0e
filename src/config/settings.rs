//! Settings structures for searchlight configuration

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Main settings structure, loaded from `settings.yml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub connection: ConnectionSettings,
    pub search: SearchSettings,
}

impl Settings {
    /// Load settings from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse settings from a YAML string
    pub fn from_yaml(content: &str) -> Result<Self> {
        let settings: Settings = serde_yaml::from_str(content)?;
        Ok(settings)
    }

    /// Merge with environment variables (SEARCHLIGHT_* prefix)
    pub fn merge_env(&mut self) {
        self.merge_vars(|key| std::env::var(key).ok());
    }

    fn merge_vars(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(val) = var("SEARCHLIGHT_URL") {
            self.connection.url = val;
        }
        if let Some(val) = var("SEARCHLIGHT_TIMEOUT") {
            if let Ok(timeout) = val.parse() {
                self.connection.request_timeout = timeout;
            }
        }
        if let Some(val) = var("SEARCHLIGHT_USERNAME") {
            self.connection.username = Some(val);
        }
        if let Some(val) = var("SEARCHLIGHT_PASSWORD") {
            self.connection.password = Some(val);
        }
        if let Some(val) = var("SEARCHLIGHT_VERIFY_SSL") {
            self.connection.verify_ssl = val.parse().unwrap_or(true);
        }
        if let Some(val) = var("SEARCHLIGHT_INDICES") {
            self.search.default_indices = val
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
        }
    }
}

/// Connection to the search cluster
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionSettings {
    /// Base URL of the cluster
    pub url: String,
    /// Request timeout in seconds
    pub request_timeout: f64,
    /// Connect timeout in seconds
    pub connect_timeout: f64,
    /// Verify SSL certificates
    pub verify_ssl: bool,
    /// Basic auth user
    pub username: Option<String>,
    /// Basic auth password
    pub password: Option<String>,
    /// Appended to the default user agent
    pub useragent_suffix: Option<String>,
    /// Idle connections kept per host
    pub pool_maxsize: usize,
    /// Proxy settings
    pub proxies: ProxySettings,
    /// Extra headers to send
    pub extra_headers: HashMap<String, String>,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            url: "http://localhost:9200".to_string(),
            request_timeout: crate::DEFAULT_TIMEOUT as f64,
            connect_timeout: 5.0,
            verify_ssl: true,
            username: None,
            password: None,
            useragent_suffix: None,
            pool_maxsize: 20,
            proxies: ProxySettings::default(),
            extra_headers: HashMap::new(),
        }
    }
}

/// Proxy settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxySettings {
    pub http: Option<String>,
    pub https: Option<String>,
    pub all: Option<String>,
}

/// Defaults applied by the command line front end
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Indices searched when none are given
    pub default_indices: Vec<String>,
    /// Scroll context keep-alive
    pub scroll_expiry: String,
    /// Page size when no limit is given
    pub default_limit: u64,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            default_indices: vec![],
            scroll_expiry: "1m".to_string(),
            default_limit: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.connection.url, "http://localhost:9200");
        assert!(settings.connection.verify_ssl);
        assert_eq!(settings.search.scroll_expiry, "1m");
        assert!(settings.search.default_indices.is_empty());
    }

    #[test]
    fn test_partial_yaml() {
        let yaml = r#"
connection:
  url: "https://search.internal:9243"
  username: elastic
search:
  default_indices: [logs, metrics]
"#;
        let settings = Settings::from_yaml(yaml).unwrap();
        assert_eq!(settings.connection.url, "https://search.internal:9243");
        assert_eq!(settings.connection.username.as_deref(), Some("elastic"));
        assert_eq!(settings.connection.request_timeout, crate::DEFAULT_TIMEOUT as f64);
        assert_eq!(settings.search.default_indices, vec!["logs", "metrics"]);
        assert_eq!(settings.search.default_limit, 10);
    }

    #[test]
    fn test_merge_vars() {
        let vars: HashMap<&str, &str> = [
            ("SEARCHLIGHT_URL", "http://es:9200"),
            ("SEARCHLIGHT_TIMEOUT", "2.5"),
            ("SEARCHLIGHT_INDICES", "a, b,,c"),
        ]
        .into_iter()
        .collect();

        let mut settings = Settings::default();
        settings.merge_vars(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(settings.connection.url, "http://es:9200");
        assert_eq!(settings.connection.request_timeout, 2.5);
        assert_eq!(settings.search.default_indices, vec!["a", "b", "c"]);
        assert!(settings.connection.username.is_none());
    }
}
