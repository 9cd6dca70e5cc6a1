//! Auto-retrying locator assertions (Playwright's `expect()`).
//!
//! `expect(&locator).to_have_count(1).await?` re-resolves the locator every
//! poll interval until the condition holds or the expect timeout elapses. On
//! timeout the error carries the last observed state.

use super::retry::{poll_until, AssertionCheckResult, RetryConfig};
use crate::locator::{normalize_whitespace, ElementSnapshot, Locator};
use crate::result::{E2eError, E2eResult};
use futures::future::BoxFuture;
use regex::Regex;
use std::fmt;
use std::future::IntoFuture;
use std::time::Duration;

/// Create an expectation for a locator
#[must_use]
pub fn expect(locator: &Locator) -> Expect {
    Expect::new(locator.clone())
}

/// Assertion builder for a locator
#[derive(Debug, Clone)]
pub struct Expect {
    locator: Locator,
    timeout: Option<Duration>,
}

impl Expect {
    /// Create a new expectation for a locator
    #[must_use]
    pub const fn new(locator: Locator) -> Self {
        Self {
            locator,
            timeout: None,
        }
    }

    /// Override the suite's expect timeout for this assertion
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn assertion(&self, kind: AssertionKind) -> ExpectAssertion {
        let config = self.locator.session().config();
        let retry = RetryConfig::new(self.timeout.unwrap_or_else(|| config.expect_timeout()))
            .with_poll_interval(config.poll_interval());
        ExpectAssertion {
            locator: self.locator.clone(),
            retry,
            kind,
        }
    }

    /// The single match is visible
    pub fn to_be_visible(&self) -> ExpectAssertion {
        self.assertion(AssertionKind::Visible)
    }

    /// Nothing matches, or the single match is hidden
    pub fn to_be_hidden(&self) -> ExpectAssertion {
        self.assertion(AssertionKind::Hidden)
    }

    /// The single match is enabled
    pub fn to_be_enabled(&self) -> ExpectAssertion {
        self.assertion(AssertionKind::Enabled)
    }

    /// The single match is disabled
    pub fn to_be_disabled(&self) -> ExpectAssertion {
        self.assertion(AssertionKind::Disabled)
    }

    /// The single match accepts text input
    pub fn to_be_editable(&self) -> ExpectAssertion {
        self.assertion(AssertionKind::Editable)
    }

    /// Every match has exactly this (whitespace-normalized) text
    pub fn to_have_text(&self, expected: impl Into<String>) -> ExpectAssertion {
        self.assertion(AssertionKind::Text(normalize_whitespace(&expected.into())))
    }

    /// The matches have exactly these texts, in order
    pub fn to_have_texts<I, S>(&self, expected: I) -> ExpectAssertion
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.assertion(AssertionKind::Texts(
            expected
                .into_iter()
                .map(|s| normalize_whitespace(s.as_ref()))
                .collect(),
        ))
    }

    /// Every match contains this text
    pub fn to_contain_text(&self, expected: impl Into<String>) -> ExpectAssertion {
        self.assertion(AssertionKind::ContainsText(normalize_whitespace(
            &expected.into(),
        )))
    }

    /// The locator resolves to exactly `count` elements
    pub fn to_have_count(&self, count: usize) -> ExpectAssertion {
        self.assertion(AssertionKind::Count(count))
    }

    /// The single match's `class` attribute matches a pattern
    ///
    /// # Errors
    ///
    /// Returns [`E2eError::Regex`] if the pattern does not compile
    pub fn to_have_class(&self, pattern: &str) -> E2eResult<ExpectAssertion> {
        Ok(self.assertion(AssertionKind::Class(Regex::new(pattern)?)))
    }

    /// The single match's form value equals `expected`
    pub fn to_have_value(&self, expected: impl Into<String>) -> ExpectAssertion {
        self.assertion(AssertionKind::Value(expected.into()))
    }
}

/// Condition checked by an [`ExpectAssertion`]
#[derive(Debug, Clone)]
pub enum AssertionKind {
    /// Single element is visible
    Visible,
    /// No element, or single element hidden
    Hidden,
    /// Single element is enabled
    Enabled,
    /// Single element is disabled
    Disabled,
    /// Single element is editable
    Editable,
    /// Every element has exactly this text
    Text(String),
    /// Element texts equal this list
    Texts(Vec<String>),
    /// Every element contains this text
    ContainsText(String),
    /// Element count
    Count(usize),
    /// Single element class matches
    Class(Regex),
    /// Single element value
    Value(String),
}

impl fmt::Display for AssertionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Visible => f.write_str("visible"),
            Self::Hidden => f.write_str("hidden"),
            Self::Enabled => f.write_str("enabled"),
            Self::Disabled => f.write_str("disabled"),
            Self::Editable => f.write_str("editable"),
            Self::Text(text) => write!(f, "text {text:?}"),
            Self::Texts(texts) => write!(f, "texts {texts:?}"),
            Self::ContainsText(text) => write!(f, "text containing {text:?}"),
            Self::Count(count) => write!(f, "count {count}"),
            Self::Class(pattern) => write!(f, "class matching /{}/", pattern.as_str()),
            Self::Value(value) => write!(f, "value {value:?}"),
        }
    }
}

/// A pending assertion. Await it (or call [`ExpectAssertion::verify`]) to poll.
#[derive(Debug, Clone)]
pub struct ExpectAssertion {
    locator: Locator,
    retry: RetryConfig,
    kind: AssertionKind,
}

impl ExpectAssertion {
    /// Condition being checked
    #[must_use]
    pub const fn kind(&self) -> &AssertionKind {
        &self.kind
    }

    /// Polling configuration
    #[must_use]
    pub const fn retry_config(&self) -> &RetryConfig {
        &self.retry
    }

    /// Check one resolution of the locator.
    ///
    /// `Fail` carries a description of what was observed.
    ///
    /// # Errors
    ///
    /// Returns [`E2eError::StrictModeViolation`] when a single-element
    /// condition is checked against several matches
    pub fn evaluate(&self, snapshots: &[ElementSnapshot]) -> E2eResult<AssertionCheckResult> {
        let verdict = |ok: bool, observed: String| {
            if ok {
                AssertionCheckResult::Pass(())
            } else {
                AssertionCheckResult::Fail(observed)
            }
        };

        match &self.kind {
            AssertionKind::Count(expected) => Ok(verdict(
                snapshots.len() == *expected,
                format!("count {}", snapshots.len()),
            )),
            AssertionKind::Texts(expected) => {
                let actual: Vec<String> = snapshots
                    .iter()
                    .map(|s| normalize_whitespace(&s.text))
                    .collect();
                Ok(verdict(&actual == expected, format!("texts {actual:?}")))
            }
            AssertionKind::Text(expected) => {
                if snapshots.is_empty() {
                    return Ok(AssertionCheckResult::Fail("no element matched".into()));
                }
                let actual: Vec<String> = snapshots
                    .iter()
                    .map(|s| normalize_whitespace(&s.text))
                    .collect();
                let ok = actual.iter().all(|t| t == expected);
                Ok(verdict(ok, describe_texts(&actual)))
            }
            AssertionKind::ContainsText(expected) => {
                if snapshots.is_empty() {
                    return Ok(AssertionCheckResult::Fail("no element matched".into()));
                }
                let actual: Vec<String> = snapshots
                    .iter()
                    .map(|s| normalize_whitespace(&s.text))
                    .collect();
                let ok = actual.iter().all(|t| t.contains(expected.as_str()));
                Ok(verdict(ok, describe_texts(&actual)))
            }
            AssertionKind::Hidden => match snapshots {
                [] => Ok(AssertionCheckResult::Pass(())),
                [only] => Ok(verdict(!only.visible, "visible".into())),
                many => Err(self.locator.strict_violation(many.len())),
            },
            single => {
                let only = match snapshots {
                    [] => return Ok(AssertionCheckResult::Fail("no element matched".into())),
                    [only] => only,
                    many => return Err(self.locator.strict_violation(many.len())),
                };
                Ok(match single {
                    AssertionKind::Visible => verdict(only.visible, "hidden".into()),
                    AssertionKind::Enabled => verdict(only.enabled, "disabled".into()),
                    AssertionKind::Disabled => verdict(!only.enabled, "enabled".into()),
                    AssertionKind::Editable => verdict(
                        only.editable && only.enabled,
                        "not editable".into(),
                    ),
                    AssertionKind::Class(pattern) => verdict(
                        pattern.is_match(&only.class_name),
                        format!("class {:?}", only.class_name),
                    ),
                    AssertionKind::Value(expected) => {
                        let actual = only.value.clone().unwrap_or_default();
                        verdict(&actual == expected, format!("value {actual:?}"))
                    }
                    _ => AssertionCheckResult::Pass(()),
                })
            }
        }
    }

    /// Poll until the condition holds
    ///
    /// # Errors
    ///
    /// Returns [`E2eError::Assertion`] with the last observation on timeout,
    /// or the driver's error if resolution fails
    pub async fn verify(self) -> E2eResult<()> {
        let this = &self;
        let result = poll_until(
            &self.retry,
            move || async move {
                let snapshots = this.locator.snapshots().await?;
                this.evaluate(&snapshots)
            },
            |e| E2eError::Assertion {
                locator: this.locator.to_string(),
                expected: this.kind.to_string(),
                actual: e.message,
            },
        )
        .await;

        match &result {
            Ok(()) => tracing::debug!(locator = %self.locator, expected = %self.kind, "assertion passed"),
            Err(err) => tracing::debug!(locator = %self.locator, %err, "assertion failed"),
        }
        result
    }
}

impl IntoFuture for ExpectAssertion {
    type Output = E2eResult<()>;
    type IntoFuture = BoxFuture<'static, E2eResult<()>>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(self.verify())
    }
}

fn describe_texts(texts: &[String]) -> String {
    match texts {
        [only] => format!("text {only:?}"),
        many => format!("texts {many:?}"),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::SuiteConfig;
    use crate::doubles::DemoSite;
    use crate::driver::Session;

    fn session() -> Session {
        let config = SuiteConfig::default()
            .with_expect_timeout(150)
            .with_action_timeout(150)
            .with_poll_interval(5);
        Session::new(DemoSite::new(&config), config)
    }

    fn snap(text: &str) -> ElementSnapshot {
        ElementSnapshot {
            tag: "div".into(),
            text: text.into(),
            inner_text: text.into(),
            visible: true,
            enabled: true,
            ..ElementSnapshot::default()
        }
    }

    mod evaluate_tests {
        use super::*;

        #[test]
        fn test_text_exact_single() {
            let s = session();
            let assertion = expect(&s.locator("#panel .panel-block div")).to_have_text("homework");
            assert!(assertion.evaluate(&[snap("homework")]).unwrap().is_pass());
            assert!(assertion.evaluate(&[snap("homework2")]).unwrap().is_fail());
            assert!(assertion.evaluate(&[]).unwrap().is_fail());
        }

        #[test]
        fn test_text_every_element() {
            let s = session();
            let assertion = expect(&s.locator("button")).to_have_text("Add to Cart");
            let all = [snap("Add to Cart"), snap("Add to Cart")];
            assert!(assertion.evaluate(&all).unwrap().is_pass());
            let mixed = [snap("Add to Cart"), snap("Place Order")];
            assert!(assertion.evaluate(&mixed).unwrap().is_fail());
        }

        #[test]
        fn test_texts_in_order() {
            let s = session();
            let assertion = expect(&s.locator("span")).to_have_texts(["task1", "task2"]);
            assert!(assertion
                .evaluate(&[snap("task1"), snap("task2")])
                .unwrap()
                .is_pass());
            assert!(assertion
                .evaluate(&[snap("task2"), snap("task1")])
                .unwrap()
                .is_fail());
        }

        #[test]
        fn test_visible_is_strict() {
            let s = session();
            let assertion = expect(&s.locator("img")).to_be_visible();
            let err = assertion.evaluate(&[snap("a"), snap("b")]).unwrap_err();
            assert!(matches!(err, E2eError::StrictModeViolation { count: 2, .. }));
        }

        #[test]
        fn test_hidden_passes_on_no_match() {
            let s = session();
            let assertion = expect(&s.locator(".is-success")).to_be_hidden();
            assert!(assertion.evaluate(&[]).unwrap().is_pass());
        }

        #[test]
        fn test_class_pattern() {
            let s = session();
            let assertion = expect(&s.locator("span"))
                .to_have_class("has-text-success")
                .unwrap();
            let mut done = snap("homework");
            done.class_name = "is-clickable has-text-success".into();
            assert!(assertion.evaluate(&[done]).unwrap().is_pass());
            assert!(assertion.evaluate(&[snap("homework")]).unwrap().is_fail());
        }

        #[test]
        fn test_invalid_class_pattern() {
            let s = session();
            assert!(matches!(
                expect(&s.locator("span")).to_have_class("(oops"),
                Err(E2eError::Regex(_))
            ));
        }

        #[test]
        fn test_with_timeout_overrides_config() {
            let s = session();
            let assertion = expect(&s.locator("#total-price"))
                .with_timeout(Duration::from_secs(2))
                .to_be_visible();
            assert_eq!(assertion.retry_config().timeout, Duration::from_secs(2));
            assert_eq!(
                assertion.retry_config().poll_interval,
                Duration::from_millis(5)
            );
        }
    }

    mod polling_tests {
        use super::*;

        #[tokio::test]
        async fn test_timeout_reports_last_observation() {
            let s = session();
            s.goto(&s.config().url("project-8")).await.unwrap();
            let err = expect(&s.locator(".course-card-content"))
                .to_have_count(2)
                .await
                .unwrap_err();
            match err {
                E2eError::Assertion {
                    expected, actual, ..
                } => {
                    assert_eq!(expected, "count 2");
                    assert_eq!(actual, "count 0");
                }
                other => panic!("unexpected error {other:?}"),
            }
        }

        #[tokio::test]
        async fn test_passes_against_live_state() {
            let s = session();
            s.goto(&s.config().url("project-8")).await.unwrap();
            expect(&s.locator(".mt-2"))
                .to_have_text("Available Courses")
                .await
                .unwrap();
            expect(&s.locator("#total-price"))
                .to_contain_text("$0")
                .await
                .unwrap();
        }
    }
}
