//! Driver seam and per-test sessions.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  Locator / PageObject                                        │
//! │        │  segments (re-resolved on every call)               │
//! │        ▼                                                     │
//! │  Session ──► PageDriver (trait)                              │
//! │                ├── ChromiumDriver  (feature `browser`, CDP)  │
//! │                └── DemoSite        (in-process app double)   │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! A `Session` belongs to exactly one test. Closing it is idempotent and
//! every later call fails with [`E2eError::Session`].

use crate::config::SuiteConfig;
use crate::locator::{ElementSnapshot, Locator, Role, Segment};
use crate::result::{E2eError, E2eResult};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Browser automation backend.
///
/// Implementations resolve a locator chain against the live page on every
/// call; nothing is cached between calls.
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Navigate to URL and wait for the load event
    async fn goto(&self, url: &str) -> E2eResult<()>;

    /// Resolve a chain and snapshot every matched element
    async fn query(&self, chain: &[Segment]) -> E2eResult<Vec<ElementSnapshot>>;

    /// Click the single element the chain resolves to
    async fn click(&self, chain: &[Segment]) -> E2eResult<()>;

    /// Replace the value of the single editable element the chain resolves to
    async fn fill(&self, chain: &[Segment], text: &str) -> E2eResult<()>;

    /// Current page URL
    async fn current_url(&self) -> E2eResult<String>;

    /// Release the underlying page / browser
    async fn close(&self) -> E2eResult<()>;
}

/// Opens isolated sessions, one per test
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// Acquire a fresh session
    async fn open(&self) -> E2eResult<Session>;

    /// Configuration the sessions are created with
    fn config(&self) -> &SuiteConfig;
}

struct SessionInner {
    id: String,
    driver: Box<dyn PageDriver>,
    config: SuiteConfig,
    closed: AtomicBool,
}

/// An isolated browser page (or app double) used by exactly one test.
///
/// Cloning is cheap; clones share the same underlying page.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.inner.id)
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Wrap a driver into a session
    pub fn new(driver: impl PageDriver + 'static, config: SuiteConfig) -> Self {
        let id = uuid::Uuid::new_v4().to_string();
        tracing::debug!(session = %id, "session opened");
        Self {
            inner: Arc::new(SessionInner {
                id,
                driver: Box::new(driver),
                config,
                closed: AtomicBool::new(false),
            }),
        }
    }

    /// Unique session id
    #[must_use]
    pub fn id(&self) -> &str {
        &self.inner.id
    }

    /// Suite configuration
    #[must_use]
    pub fn config(&self) -> &SuiteConfig {
        &self.inner.config
    }

    /// Whether [`Session::close`] has run
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }

    fn ensure_open(&self) -> E2eResult<()> {
        if self.is_closed() {
            Err(E2eError::session(format!(
                "session {} is already closed",
                self.inner.id
            )))
        } else {
            Ok(())
        }
    }

    async fn slow_mo(&self) {
        let delay = self.inner.config.browser.slow_mo_ms;
        if delay > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(delay)).await;
        }
    }

    /// Navigate to a URL
    ///
    /// # Errors
    ///
    /// Returns error if the session is closed or navigation fails
    pub async fn goto(&self, url: &str) -> E2eResult<()> {
        self.ensure_open()?;
        self.slow_mo().await;
        tracing::info!(session = %self.inner.id, url, "navigate");
        self.inner.driver.goto(url).await
    }

    /// Current page URL
    ///
    /// # Errors
    ///
    /// Returns error if the session is closed or the driver fails
    pub async fn current_url(&self) -> E2eResult<String> {
        self.ensure_open()?;
        self.inner.driver.current_url().await
    }

    pub(crate) async fn query(&self, chain: &[Segment]) -> E2eResult<Vec<ElementSnapshot>> {
        self.ensure_open()?;
        self.inner.driver.query(chain).await
    }

    pub(crate) async fn click(&self, chain: &[Segment]) -> E2eResult<()> {
        self.ensure_open()?;
        self.slow_mo().await;
        self.inner.driver.click(chain).await
    }

    pub(crate) async fn fill(&self, chain: &[Segment], text: &str) -> E2eResult<()> {
        self.ensure_open()?;
        self.slow_mo().await;
        self.inner.driver.fill(chain, text).await
    }

    /// Release the session. Safe to call more than once.
    ///
    /// # Errors
    ///
    /// Returns the driver's error from the first close
    pub async fn close(&self) -> E2eResult<()> {
        if self.inner.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        tracing::debug!(session = %self.inner.id, "session closed");
        self.inner.driver.close().await
    }

    /// Locator for a CSS selector
    #[must_use]
    pub fn locator(&self, selector: impl Into<String>) -> Locator {
        Locator::root(
            self.clone(),
            Segment::Css {
                selector: selector.into(),
            },
        )
    }

    /// Locator for the innermost elements containing `text`
    #[must_use]
    pub fn get_by_text(&self, text: impl Into<String>) -> Locator {
        Locator::root(self.clone(), Segment::Text { text: text.into() })
    }

    /// Locator for elements with an ARIA role whose accessible name contains `name`
    #[must_use]
    pub fn get_by_role(&self, role: Role, name: impl Into<String>) -> Locator {
        Locator::root(
            self.clone(),
            Segment::Role {
                role,
                name: Some(name.into()),
            },
        )
    }

    /// Locator for inputs by placeholder
    #[must_use]
    pub fn get_by_placeholder(&self, text: impl Into<String>) -> Locator {
        Locator::root(self.clone(), Segment::Placeholder { text: text.into() })
    }
}
