//! techglobal-e2e: end-to-end suite for the TechGlobal frontend demo pages
//!
//! Page objects, a fixture harness and scripted user journeys for the to-do
//! list and shopping cart apps, in the style of Playwright: re-resolvable
//! locators, auto-waiting actions and polling assertions.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     techglobal-e2e                              │
//! ├─────────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐    ┌────────────┐    ┌────────────────────┐    │
//! │   │ Scenario   │    │ Page       │    │ PageDriver         │    │
//! │   │ (steps)    │───►│ Objects    │───►│  ChromiumDriver    │    │
//! │   │            │    │ (Locators) │    │  DemoSite (double) │    │
//! │   └────────────┘    └────────────┘    └────────────────────┘    │
//! │         ▲                                                       │
//! │   ┌─────┴──────┐                                                │
//! │   │ Fixture    │  session per test, teardown on every exit      │
//! │   └────────────┘                                                │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use techglobal_e2e::{expect, pages::TodoListPage, DoubleProvider, Fixture, SuiteConfig};
//!
//! let fixture = Fixture::<TodoListPage>::new(DoubleProvider::new(SuiteConfig::load()?));
//! fixture
//!     .run("add one task", |page| async move {
//!         page.add_task("homework").await?;
//!         expect(page.task_rows()).to_have_count(1).await
//!     })
//!     .await?;
//! ```

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

mod assertion;
#[cfg(feature = "browser")]
#[allow(clippy::missing_errors_doc, clippy::doc_markdown)]
mod browser;
mod config;
/// In-process doubles of the demo pages
#[allow(clippy::missing_errors_doc, clippy::must_use_candidate)]
pub mod doubles;
mod driver;
mod fixture;
/// Interaction helpers and money parsing
pub mod helpers;
#[allow(
    clippy::missing_errors_doc,
    clippy::must_use_candidate,
    clippy::missing_const_for_fn
)]
mod locator;
/// Tracing subscriber setup
pub mod logging;
mod page_object;
/// Page objects for the demo pages
pub mod pages;
mod result;
mod scenario;
/// Scripted user journeys
pub mod scenarios;

pub use assertion::{
    assert_close, assert_equals, expect, poll_until, AssertionCheckResult, AssertionKind, Expect,
    ExpectAssertion, RetryConfig, RetryError,
};
#[cfg(feature = "browser")]
pub use browser::{ChromiumDriver, ChromiumProvider};
pub use config::{
    BrowserSettings, SuiteConfig, DEFAULT_ACTION_TIMEOUT_MS, DEFAULT_BASE_URL,
    DEFAULT_EXPECT_TIMEOUT_MS, DEFAULT_POLL_INTERVAL_MS, DEFAULT_TEST_TIMEOUT_MS,
};
pub use doubles::{DemoSite, DoubleProvider, ProviderStats};
pub use driver::{PageDriver, Session, SessionProvider};
pub use fixture::{Fixture, NAVIGATE_STEP};
pub use locator::{normalize_whitespace, text_matches, ElementSnapshot, Locator, Role, Segment};
pub use page_object::PageObject;
pub use result::{E2eError, E2eResult};
pub use scenario::{Scenario, ScenarioReport, StepOutcome, StepReport};

/// Prelude for convenient imports
pub mod prelude {
    pub use super::pages::{ShoppingCartPage, TodoListPage};
    pub use super::{
        assert_close, expect, DoubleProvider, E2eError, E2eResult, Fixture, Locator, PageObject,
        Role, Scenario, ScenarioReport, Session, SessionProvider, StepOutcome, SuiteConfig,
    };
    #[cfg(feature = "browser")]
    pub use super::ChromiumProvider;
}
