//! Suite configuration.
//!
//! Defaults, an optional YAML file and `E2E_*` environment overrides,
//! applied in that order.

use crate::result::{E2eError, E2eResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default base URL of the demo site
pub const DEFAULT_BASE_URL: &str = "https://www.techglobal-training.com/frontend";

/// Default timeout for `expect()` polling (5 seconds)
pub const DEFAULT_EXPECT_TIMEOUT_MS: u64 = 5_000;

/// Default timeout for actionability waits (10 seconds)
pub const DEFAULT_ACTION_TIMEOUT_MS: u64 = 10_000;

/// Default timeout for a whole test (60 seconds)
pub const DEFAULT_TEST_TIMEOUT_MS: u64 = 60_000;

/// Default polling interval (100ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

/// Browser launch settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserSettings {
    /// Run in headless mode
    pub headless: bool,
    /// Viewport width
    pub viewport_width: u32,
    /// Viewport height
    pub viewport_height: u32,
    /// Path to chromium binary (None = auto-detect)
    pub chromium_path: Option<String>,
    /// Sandbox mode (disable for containers)
    pub sandbox: bool,
    /// Delay inserted before every action, in milliseconds
    pub slow_mo_ms: u64,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            headless: true,
            viewport_width: 1280,
            viewport_height: 720,
            chromium_path: None,
            sandbox: true,
            slow_mo_ms: 0,
        }
    }
}

/// Configuration shared by every test in a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuiteConfig {
    /// Base URL of the frontend demo pages
    pub base_url: String,
    /// Index URL the to-do journey starts from; `None` uses `base_url`
    pub todo_url: Option<String>,
    /// Timeout for assertion polling
    pub expect_timeout_ms: u64,
    /// Timeout for actionability waits
    pub action_timeout_ms: u64,
    /// Timeout for a whole test body
    pub test_timeout_ms: u64,
    /// Interval between polls
    pub poll_interval_ms: u64,
    /// Serialize tests that share remote application state
    pub serialize_shared_state: bool,
    /// Browser launch settings
    pub browser: BrowserSettings,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            todo_url: None,
            expect_timeout_ms: DEFAULT_EXPECT_TIMEOUT_MS,
            action_timeout_ms: DEFAULT_ACTION_TIMEOUT_MS,
            test_timeout_ms: DEFAULT_TEST_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            serialize_shared_state: true,
            browser: BrowserSettings::default(),
        }
    }
}

impl SuiteConfig {
    /// Create new default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration: `E2E_CONFIG` file if set, then environment overrides
    ///
    /// # Errors
    ///
    /// Returns error if the config file cannot be read or a variable is malformed
    pub fn load() -> E2eResult<Self> {
        let mut config = match std::env::var("E2E_CONFIG") {
            Ok(path) => Self::from_yaml_file(path)?,
            Err(_) => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        tracing::debug!(?config, "loaded suite configuration");
        Ok(config)
    }

    /// Parse a YAML config file; missing keys keep their defaults
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed
    pub fn from_yaml_file(path: impl AsRef<Path>) -> E2eResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&text)
    }

    /// Parse YAML text
    ///
    /// # Errors
    ///
    /// Returns error if the text is not a valid config document
    pub fn from_yaml(text: &str) -> E2eResult<Self> {
        let config: Self = serde_yaml_ng::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from a variable lookup (the environment in [`Self::load`])
    ///
    /// # Errors
    ///
    /// Returns error if a numeric or boolean variable cannot be parsed
    pub fn apply_overrides<F>(&mut self, lookup: F) -> E2eResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("E2E_BASE_URL") {
            self.base_url = url;
        }
        if let Some(url) = lookup("E2E_TODO_URL") {
            self.todo_url = Some(url);
        }
        if let Some(v) = lookup("E2E_EXPECT_TIMEOUT_MS") {
            self.expect_timeout_ms = parse_num("E2E_EXPECT_TIMEOUT_MS", &v)?;
        }
        if let Some(v) = lookup("E2E_ACTION_TIMEOUT_MS") {
            self.action_timeout_ms = parse_num("E2E_ACTION_TIMEOUT_MS", &v)?;
        }
        if let Some(v) = lookup("E2E_TEST_TIMEOUT_MS") {
            self.test_timeout_ms = parse_num("E2E_TEST_TIMEOUT_MS", &v)?;
        }
        if let Some(v) = lookup("E2E_SLOW_MO_MS") {
            self.browser.slow_mo_ms = parse_num("E2E_SLOW_MO_MS", &v)?;
        }
        if let Some(v) = lookup("E2E_HEADLESS") {
            self.browser.headless = parse_bool("E2E_HEADLESS", &v)?;
        }
        if let Some(v) = lookup("E2E_SERIALIZE") {
            self.serialize_shared_state = parse_bool("E2E_SERIALIZE", &v)?;
        }
        if let Some(path) = lookup("CHROMIUM_PATH") {
            self.browser.chromium_path = Some(path);
        }
        self.validate()
    }

    /// Check invariants between fields
    ///
    /// # Errors
    ///
    /// Returns error on an empty base URL or a zero poll interval
    pub fn validate(&self) -> E2eResult<()> {
        if self.base_url.trim().is_empty() {
            return Err(E2eError::Config {
                message: "base_url must not be empty".to_string(),
            });
        }
        if self.todo_url.as_deref().is_some_and(|url| url.trim().is_empty()) {
            return Err(E2eError::Config {
                message: "todo_url must not be empty when set".to_string(),
            });
        }
        if self.poll_interval_ms == 0 {
            return Err(E2eError::Config {
                message: "poll_interval_ms must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    /// Set the base URL
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Start the to-do journey from another index URL
    #[must_use]
    pub fn with_todo_url(mut self, url: impl Into<String>) -> Self {
        self.todo_url = Some(url.into());
        self
    }

    /// Set the expect timeout
    #[must_use]
    pub const fn with_expect_timeout(mut self, ms: u64) -> Self {
        self.expect_timeout_ms = ms;
        self
    }

    /// Set the action timeout
    #[must_use]
    pub const fn with_action_timeout(mut self, ms: u64) -> Self {
        self.action_timeout_ms = ms;
        self
    }

    /// Set the test timeout
    #[must_use]
    pub const fn with_test_timeout(mut self, ms: u64) -> Self {
        self.test_timeout_ms = ms;
        self
    }

    /// Set the poll interval
    #[must_use]
    pub const fn with_poll_interval(mut self, ms: u64) -> Self {
        self.poll_interval_ms = ms;
        self
    }

    /// Enable or disable shared-state serialization
    #[must_use]
    pub const fn with_serialized_shared_state(mut self, serialize: bool) -> Self {
        self.serialize_shared_state = serialize;
        self
    }

    /// Join a path onto the base URL
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        if path.is_empty() {
            base.to_string()
        } else {
            format!("{base}/{path}")
        }
    }

    /// Index URL the to-do journey starts from
    #[must_use]
    pub fn todo_entry_url(&self) -> String {
        self.todo_url.as_deref().map_or_else(
            || self.url(""),
            |url| url.trim_end_matches('/').to_string(),
        )
    }

    /// Expect timeout as Duration
    #[must_use]
    pub const fn expect_timeout(&self) -> Duration {
        Duration::from_millis(self.expect_timeout_ms)
    }

    /// Action timeout as Duration
    #[must_use]
    pub const fn action_timeout(&self) -> Duration {
        Duration::from_millis(self.action_timeout_ms)
    }

    /// Test timeout as Duration
    #[must_use]
    pub const fn test_timeout(&self) -> Duration {
        Duration::from_millis(self.test_timeout_ms)
    }

    /// Poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

fn parse_num(key: &str, value: &str) -> E2eResult<u64> {
    value.trim().parse().map_err(|_| E2eError::Config {
        message: format!("{key} must be a number of milliseconds, got '{value}'"),
    })
}

fn parse_bool(key: &str, value: &str) -> E2eResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(E2eError::Config {
            message: format!("{key} must be a boolean, got '{value}'"),
        }),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    mod defaults {
        use super::*;

        #[test]
        fn test_default_values() {
            let config = SuiteConfig::default();
            assert_eq!(config.base_url, DEFAULT_BASE_URL);
            assert_eq!(config.expect_timeout(), Duration::from_secs(5));
            assert_eq!(config.poll_interval(), Duration::from_millis(100));
            assert!(config.serialize_shared_state);
            assert!(config.browser.headless);
            assert_eq!(config.browser.slow_mo_ms, 0);
        }

        #[test]
        fn test_url_join() {
            let config = SuiteConfig::new().with_base_url("https://example.test/frontend/");
            assert_eq!(
                config.url("/project-8"),
                "https://example.test/frontend/project-8"
            );
            assert_eq!(config.url(""), "https://example.test/frontend");
        }

        #[test]
        fn test_todo_entry_url_follows_base_unless_set() {
            let config = SuiteConfig::new().with_base_url("https://example.test/frontend/");
            assert_eq!(config.todo_entry_url(), "https://example.test/frontend");

            let config = config.with_todo_url("https://apex.example.test/frontend/");
            assert_eq!(config.todo_entry_url(), "https://apex.example.test/frontend");
        }
    }

    mod overrides {
        use super::*;

        #[test]
        fn test_env_overrides_apply() {
            let mut config = SuiteConfig::default();
            config
                .apply_overrides(lookup_from(&[
                    ("E2E_BASE_URL", "http://localhost:3000/frontend"),
                    ("E2E_TODO_URL", "http://127.0.0.1:3000/frontend"),
                    ("E2E_EXPECT_TIMEOUT_MS", "750"),
                    ("E2E_HEADLESS", "false"),
                    ("E2E_SLOW_MO_MS", "3000"),
                    ("E2E_SERIALIZE", "0"),
                    ("CHROMIUM_PATH", "/usr/bin/chromium"),
                ]))
                .unwrap();

            assert_eq!(config.base_url, "http://localhost:3000/frontend");
            assert_eq!(
                config.todo_url.as_deref(),
                Some("http://127.0.0.1:3000/frontend")
            );
            assert_eq!(config.expect_timeout_ms, 750);
            assert!(!config.browser.headless);
            assert_eq!(config.browser.slow_mo_ms, 3000);
            assert!(!config.serialize_shared_state);
            assert_eq!(
                config.browser.chromium_path.as_deref(),
                Some("/usr/bin/chromium")
            );
        }

        #[test]
        fn test_malformed_number_rejected() {
            let mut config = SuiteConfig::default();
            let err = config
                .apply_overrides(lookup_from(&[("E2E_TEST_TIMEOUT_MS", "soon")]))
                .unwrap_err();
            assert!(matches!(err, E2eError::Config { .. }));
        }

        #[test]
        fn test_malformed_bool_rejected() {
            let mut config = SuiteConfig::default();
            assert!(config
                .apply_overrides(lookup_from(&[("E2E_HEADLESS", "maybe")]))
                .is_err());
        }
    }

    mod yaml {
        use super::*;

        #[test]
        fn test_partial_yaml_keeps_defaults() {
            let config = SuiteConfig::from_yaml(
                "expect_timeout_ms: 2000\nbrowser:\n  headless: false\n  slow_mo_ms: 250\n",
            )
            .unwrap();
            assert_eq!(config.expect_timeout_ms, 2000);
            assert_eq!(config.action_timeout_ms, DEFAULT_ACTION_TIMEOUT_MS);
            assert!(!config.browser.headless);
            assert_eq!(config.browser.slow_mo_ms, 250);
            assert_eq!(config.browser.viewport_width, 1280);
        }

        #[test]
        fn test_yaml_file() {
            let mut file = tempfile::NamedTempFile::new().unwrap();
            writeln!(file, "base_url: http://127.0.0.1:8080/frontend").unwrap();
            writeln!(file, "serialize_shared_state: false").unwrap();

            let config = SuiteConfig::from_yaml_file(file.path()).unwrap();
            assert_eq!(config.base_url, "http://127.0.0.1:8080/frontend");
            assert!(!config.serialize_shared_state);
        }

        #[test]
        fn test_invalid_yaml_values() {
            assert!(SuiteConfig::from_yaml("poll_interval_ms: 0\n").is_err());
            assert!(SuiteConfig::from_yaml("base_url: ''\n").is_err());
            assert!(SuiteConfig::from_yaml("todo_url: ' '\n").is_err());
            assert!(matches!(
                SuiteConfig::from_yaml("expect_timeout_ms: [1, 2]\n"),
                Err(E2eError::Yaml(_))
            ));
        }

        #[test]
        fn test_missing_file() {
            assert!(matches!(
                SuiteConfig::from_yaml_file("/nonexistent/e2e.yaml"),
                Err(E2eError::Io(_))
            ));
        }
    }
}
