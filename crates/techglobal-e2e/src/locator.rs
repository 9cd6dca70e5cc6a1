//! Locator abstraction for element selection and interaction.
//!
//! # Design
//!
//! - **Re-resolvable**: a locator is a chain of query segments, never a
//!   snapshot. Every query and action resolves the chain against the live page.
//! - **Auto-waiting actions**: `click` and `fill` poll until the target is
//!   unique and actionable.
//! - **Strict actions**: acting on a locator that matches several elements is
//!   an error (narrow it with `nth`, `first`, `last`).

use crate::assertion::{poll_until, AssertionCheckResult, RetryConfig};
use crate::driver::Session;
use crate::result::{E2eError, E2eResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

/// ARIA roles understood by role queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// `a[href]`
    Link,
    /// `button`, `input[type=button|submit|reset]`
    Button,
    /// text inputs and `textarea`
    Textbox,
}

impl Role {
    /// Role name as used in ARIA
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Link => "link",
            Self::Button => "button",
            Self::Textbox => "textbox",
        }
    }
}

/// One step of a locator chain.
///
/// Text comparisons are whitespace-normalized, case-insensitive substring
/// matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Segment {
    /// Descendants of the current matches that match a CSS selector
    Css {
        /// CSS selector
        selector: String,
    },
    /// Keep current matches whose text content contains `text`
    HasText {
        /// Text to find
        text: String,
    },
    /// Innermost descendants whose text content contains `text`
    Text {
        /// Text to find
        text: String,
    },
    /// Descendants with a role and (optionally) an accessible name
    Role {
        /// ARIA role
        role: Role,
        /// Accessible name filter
        name: Option<String>,
    },
    /// Descendant inputs by placeholder
    Placeholder {
        /// Placeholder text
        text: String,
    },
    /// Pick one match; negative indexes count from the end
    Nth {
        /// Index into the current matches
        index: i64,
    },
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Css { selector } => write!(f, "css={selector}"),
            Self::HasText { text } => write!(f, "has-text={text:?}"),
            Self::Text { text } => write!(f, "text={text:?}"),
            Self::Role { role, name: None } => write!(f, "role={}", role.as_str()),
            Self::Role {
                role,
                name: Some(name),
            } => write!(f, "role={}[name={name:?}]", role.as_str()),
            Self::Placeholder { text } => write!(f, "placeholder={text:?}"),
            Self::Nth { index } => write!(f, "nth={index}"),
        }
    }
}

/// What one resolution observed about a single element
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementSnapshot {
    /// Lowercase tag name
    pub tag: String,
    /// Whitespace-normalized text content
    pub text: String,
    /// Whitespace-normalized rendered text
    pub inner_text: String,
    /// Form control value
    pub value: Option<String>,
    /// Raw `class` attribute
    pub class_name: String,
    /// Rendered and not hidden
    pub visible: bool,
    /// Not disabled
    pub enabled: bool,
    /// Accepts text input
    pub editable: bool,
}

/// A re-resolvable reference to zero or more elements.
#[derive(Debug, Clone)]
pub struct Locator {
    session: Session,
    chain: Vec<Segment>,
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for segment in &self.chain {
            if !first {
                f.write_str(" >> ")?;
            }
            write!(f, "{segment}")?;
            first = false;
        }
        Ok(())
    }
}

impl Locator {
    pub(crate) fn root(session: Session, segment: Segment) -> Self {
        Self {
            session,
            chain: vec![segment],
        }
    }

    fn push(&self, segment: Segment) -> Self {
        let mut chain = self.chain.clone();
        chain.push(segment);
        Self {
            session: self.session.clone(),
            chain,
        }
    }

    /// Scope a CSS selector inside the current matches
    #[must_use]
    pub fn locator(&self, selector: impl Into<String>) -> Self {
        self.push(Segment::Css {
            selector: selector.into(),
        })
    }

    /// Keep matches whose text contains `text`
    #[must_use]
    pub fn filter_has_text(&self, text: impl Into<String>) -> Self {
        self.push(Segment::HasText { text: text.into() })
    }

    /// Innermost descendants containing `text`
    #[must_use]
    pub fn get_by_text(&self, text: impl Into<String>) -> Self {
        self.push(Segment::Text { text: text.into() })
    }

    /// Descendants with a role and accessible name
    #[must_use]
    pub fn get_by_role(&self, role: Role, name: impl Into<String>) -> Self {
        self.push(Segment::Role {
            role,
            name: Some(name.into()),
        })
    }

    /// Descendant inputs by placeholder
    #[must_use]
    pub fn get_by_placeholder(&self, text: impl Into<String>) -> Self {
        self.push(Segment::Placeholder { text: text.into() })
    }

    /// The nth match (zero-based)
    #[must_use]
    pub fn nth(&self, index: usize) -> Self {
        self.push(Segment::Nth {
            index: i64::try_from(index).unwrap_or(i64::MAX),
        })
    }

    /// The first match
    #[must_use]
    pub fn first(&self) -> Self {
        self.push(Segment::Nth { index: 0 })
    }

    /// The last match
    #[must_use]
    pub fn last(&self) -> Self {
        self.push(Segment::Nth { index: -1 })
    }

    /// Segments of this locator
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.chain
    }

    /// Session this locator resolves against
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    fn action_retry(&self) -> RetryConfig {
        let config = self.session.config();
        RetryConfig::new(config.action_timeout()).with_poll_interval(config.poll_interval())
    }

    // ------------------------------------------------------------------
    // Queries: resolve once, no waiting
    // ------------------------------------------------------------------

    /// Snapshot every element currently matched
    ///
    /// # Errors
    ///
    /// Returns error if the session is closed or the driver fails
    pub async fn snapshots(&self) -> E2eResult<Vec<ElementSnapshot>> {
        self.session.query(&self.chain).await
    }

    /// Number of elements currently matched
    ///
    /// # Errors
    ///
    /// Returns error if the session is closed or the driver fails
    pub async fn count(&self) -> E2eResult<usize> {
        Ok(self.snapshots().await?.len())
    }

    /// One locator per current match, each narrowed with `nth`
    ///
    /// # Errors
    ///
    /// Returns error if the session is closed or the driver fails
    pub async fn all(&self) -> E2eResult<Vec<Self>> {
        let count = self.count().await?;
        Ok((0..count).map(|i| self.nth(i)).collect())
    }

    /// Rendered text of every match
    ///
    /// # Errors
    ///
    /// Returns error if the session is closed or the driver fails
    pub async fn all_inner_texts(&self) -> E2eResult<Vec<String>> {
        Ok(self
            .snapshots()
            .await?
            .into_iter()
            .map(|s| s.inner_text)
            .collect())
    }

    /// Text content of every match
    ///
    /// # Errors
    ///
    /// Returns error if the session is closed or the driver fails
    pub async fn all_text_contents(&self) -> E2eResult<Vec<String>> {
        Ok(self.snapshots().await?.into_iter().map(|s| s.text).collect())
    }

    /// Whether the single match is visible; `false` when nothing matches
    ///
    /// # Errors
    ///
    /// Returns [`E2eError::StrictModeViolation`] when several elements match
    pub async fn is_visible(&self) -> E2eResult<bool> {
        let snapshots = self.snapshots().await?;
        match snapshots.as_slice() {
            [] => Ok(false),
            [only] => Ok(only.visible),
            many => Err(self.strict_violation(many.len())),
        }
    }

    // ------------------------------------------------------------------
    // Waiting queries and actions
    // ------------------------------------------------------------------

    /// Wait for exactly one match satisfying `ready` and return its snapshot
    async fn wait_for_single<F>(&self, what: &str, ready: F) -> E2eResult<ElementSnapshot>
    where
        F: Fn(&ElementSnapshot) -> Result<(), String>,
    {
        let description = self.to_string();
        let ms = self.session.config().action_timeout_ms;
        let ready = &ready;
        poll_until(
            &self.action_retry(),
            move || async move {
                let snapshots = self.snapshots().await?;
                match snapshots.as_slice() {
                    [] => Ok(AssertionCheckResult::Fail("no element matched".into())),
                    [only] => Ok(match ready(only) {
                        Ok(()) => AssertionCheckResult::Pass(only.clone()),
                        Err(why) => AssertionCheckResult::Fail(why),
                    }),
                    many => Err(self.strict_violation(many.len())),
                }
            },
            |e| E2eError::Action {
                locator: description,
                message: format!("{what}: not ready after {ms}ms ({})", e.message),
            },
        )
        .await
    }

    /// Text content of the single match, waiting for it to appear
    ///
    /// # Errors
    ///
    /// Returns error if no unique element appears within the action timeout
    pub async fn text_content(&self) -> E2eResult<String> {
        Ok(self.wait_for_single("text_content", |_| Ok(())).await?.text)
    }

    /// Rendered text of the single match, waiting for it to appear
    ///
    /// # Errors
    ///
    /// Returns error if no unique element appears within the action timeout
    pub async fn inner_text(&self) -> E2eResult<String> {
        Ok(self
            .wait_for_single("inner_text", |_| Ok(()))
            .await?
            .inner_text)
    }

    /// Wait until more than `index` elements match and return the count
    ///
    /// # Errors
    ///
    /// Returns [`E2eError::IndexOutOfRange`] if the collection never grows
    /// past `index` within the action timeout
    pub async fn wait_for_index(&self, index: usize) -> E2eResult<usize> {
        let description = self.to_string();
        let observed = AtomicUsize::new(0);
        let last = &observed;
        poll_until(
            &self.action_retry(),
            move || async move {
                let len = self.count().await?;
                last.store(len, Ordering::Relaxed);
                Ok(if len > index {
                    AssertionCheckResult::Pass(len)
                } else {
                    AssertionCheckResult::Fail(format!("{len} matches"))
                })
            },
            |_| E2eError::IndexOutOfRange {
                locator: description,
                index,
                len: observed.load(Ordering::Relaxed),
            },
        )
        .await
    }

    /// Click the single match once it is visible and enabled
    ///
    /// # Errors
    ///
    /// Returns error if the element never becomes actionable or the click fails
    pub async fn click(&self) -> E2eResult<()> {
        self.wait_for_single("click", |s| {
            if !s.visible {
                Err("element is not visible".into())
            } else if !s.enabled {
                Err("element is disabled".into())
            } else {
                Ok(())
            }
        })
        .await?;
        tracing::debug!(locator = %self, "click");
        self.session.click(&self.chain).await
    }

    /// Replace the value of the single match once it is visible and editable
    ///
    /// # Errors
    ///
    /// Returns error if the element never becomes editable or the fill fails
    pub async fn fill(&self, text: impl AsRef<str>) -> E2eResult<()> {
        let text = text.as_ref();
        self.wait_for_single("fill", |s| {
            if !s.visible {
                Err("element is not visible".into())
            } else if !s.editable {
                Err("element is not editable".into())
            } else {
                Ok(())
            }
        })
        .await?;
        tracing::debug!(locator = %self, text, "fill");
        self.session.fill(&self.chain, text).await
    }

    pub(crate) fn strict_violation(&self, count: usize) -> E2eError {
        E2eError::StrictModeViolation {
            locator: self.to_string(),
            count,
        }
    }
}

/// Collapse runs of whitespace and trim, as text snapshots do
#[must_use]
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Whitespace-normalized, case-insensitive substring match
#[must_use]
pub fn text_matches(haystack: &str, needle: &str) -> bool {
    normalize_whitespace(haystack)
        .to_lowercase()
        .contains(&normalize_whitespace(needle).to_lowercase())
}
