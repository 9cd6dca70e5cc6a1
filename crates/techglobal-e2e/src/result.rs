//! Result and error types for the suite.

use thiserror::Error;

/// Result type for suite operations
pub type E2eResult<T> = Result<T, E2eError>;

/// Errors that can occur while driving a page
#[derive(Debug, Error)]
pub enum E2eError {
    /// Expected UI state was not observed before the assertion timeout
    #[error("Assertion failed on {locator}: expected {expected}, got {actual}")]
    Assertion {
        /// Locator the assertion was made on
        locator: String,
        /// Expected state
        expected: String,
        /// Last observed state
        actual: String,
    },

    /// A value assertion (not bound to a locator) failed
    #[error("Assertion failed: {message}")]
    ValueAssertion {
        /// Error message
        message: String,
    },

    /// Element could not be acted upon
    #[error("Action on {locator} failed: {message}")]
    Action {
        /// Locator the action targeted
        locator: String,
        /// Error message
        message: String,
    },

    /// An action required a single element but the locator matched several
    #[error("Strict mode violation: {locator} resolved to {count} elements")]
    StrictModeViolation {
        /// Offending locator
        locator: String,
        /// Number of matches
        count: usize,
    },

    /// Index outside of the collection's current cardinality
    #[error("Index {index} out of range for {locator} ({len} elements)")]
    IndexOutOfRange {
        /// Collection locator
        locator: String,
        /// Requested index
        index: usize,
        /// Collection size when the action gave up
        len: usize,
    },

    /// Navigation error
    #[error("Navigation to {url} failed: {message}")]
    Navigation {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// Session (browser page / app double) failure
    #[error("Session error: {message}")]
    Session {
        /// Error message
        message: String,
    },

    /// Browser launch error
    #[error("Failed to launch browser: {message}")]
    BrowserLaunch {
        /// Error message
        message: String,
    },

    /// Operation timed out
    #[error("Timed out after {ms}ms waiting for {waited_for}")]
    Timeout {
        /// Timeout in milliseconds
        ms: u64,
        /// What was being waited for
        waited_for: String,
    },

    /// One or more steps of a scenario failed
    #[error("Scenario '{scenario}' failed:\n{}", .failures.join("\n"))]
    ScenarioFailed {
        /// Scenario name
        scenario: String,
        /// `step name: message` for every failed step
        failures: Vec<String>,
    },

    /// Fixture error (setup/teardown failed)
    #[error("Fixture error: {message}")]
    Fixture {
        /// Error message
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// Invalid pattern in a class or text assertion
    #[error("Invalid pattern: {0}")]
    Regex(#[from] regex::Error),
}

impl E2eError {
    /// Whether this failure leaves the page in a state later steps cannot rely on.
    ///
    /// Assertion failures are checkpoints and let the scenario continue;
    /// everything else aborts the remaining steps.
    #[must_use]
    pub const fn aborts_scenario(&self) -> bool {
        !matches!(self, Self::Assertion { .. } | Self::ValueAssertion { .. })
    }

    /// Shorthand for a value assertion failure
    #[must_use]
    pub fn value(message: impl Into<String>) -> Self {
        Self::ValueAssertion {
            message: message.into(),
        }
    }

    /// Shorthand for a session failure
    #[must_use]
    pub fn session(message: impl Into<String>) -> Self {
        Self::Session {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assertion_does_not_abort() {
        let err = E2eError::Assertion {
            locator: "css=#total-price".into(),
            expected: "text \"$0\"".into(),
            actual: "text \"$100\"".into(),
        };
        assert!(!err.aborts_scenario());
        assert!(!E2eError::value("price must be positive").aborts_scenario());
    }

    #[test]
    fn test_action_failures_abort() {
        let out_of_range = E2eError::IndexOutOfRange {
            locator: "css=[id^=\"course\"] button".into(),
            index: 5,
            len: 3,
        };
        assert!(out_of_range.aborts_scenario());
        assert!(E2eError::session("closed").aborts_scenario());
        assert!(E2eError::Navigation {
            url: "https://example.invalid".into(),
            message: "dns".into(),
        }
        .aborts_scenario());
    }

    #[test]
    fn test_scenario_failed_lists_steps() {
        let err = E2eError::ScenarioFailed {
            scenario: "Cart".into(),
            failures: vec!["3. total: off by one".into(), "4. empty: no".into()],
        };
        let rendered = err.to_string();
        assert!(rendered.contains("Scenario 'Cart' failed"));
        assert!(rendered.contains("3. total: off by one"));
        assert!(rendered.contains("4. empty: no"));
    }

    #[test]
    fn test_regex_error_converts() {
        let err: E2eError = regex::Regex::new("(unclosed").unwrap_err().into();
        assert!(err.to_string().starts_with("Invalid pattern"));
        assert!(err.aborts_scenario());
    }

    #[test]
    fn test_index_out_of_range_display() {
        let err = E2eError::IndexOutOfRange {
            locator: "css=button".into(),
            index: 3,
            len: 3,
        };
        assert_eq!(
            err.to_string(),
            "Index 3 out of range for css=button (3 elements)"
        );
    }
}
