//! Page Object Model support.
//!
//! A page object owns the named locators of one screen and exposes
//! user-intent actions on top of them. It holds no element state: every
//! accessor returns a locator that re-resolves on use.
//!
//! # Example
//!
//! ```ignore
//! #[derive(Debug, Clone)]
//! struct LoginPage {
//!     session: Session,
//!     username: Locator,
//! }
//!
//! #[async_trait]
//! impl PageObject for LoginPage {
//!     const SHARED_STATE: &'static str = "login";
//!
//!     fn new(session: Session) -> Self {
//!         Self { username: session.locator("input[name='username']"), session }
//!     }
//!
//!     fn session(&self) -> &Session {
//!         &self.session
//!     }
//!
//!     fn url(&self) -> String {
//!         self.session.config().url("login")
//!     }
//! }
//! ```

use crate::driver::Session;
use crate::result::E2eResult;
use async_trait::async_trait;

/// A page or component of the application under test.
#[async_trait]
pub trait PageObject: Clone + Send + Sync + Sized + 'static {
    /// Name of the remote application state this page mutates.
    ///
    /// Tests whose pages share a name run one at a time when the suite
    /// serializes shared state.
    const SHARED_STATE: &'static str;

    /// Build the page object and its locators for a session
    fn new(session: Session) -> Self;

    /// Session the locators resolve against
    fn session(&self) -> &Session;

    /// Fixed URL of the page
    fn url(&self) -> String;

    /// Page name for logging
    fn page_name(&self) -> &str {
        std::any::type_name::<Self>()
            .rsplit("::")
            .next()
            .unwrap_or("page")
    }

    /// Load the page
    ///
    /// # Errors
    ///
    /// Returns [`crate::E2eError::Navigation`] if the page cannot be loaded
    async fn navigate(&self) -> E2eResult<()> {
        tracing::info!(page = self.page_name(), "navigate");
        self.session().goto(&self.url()).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::SuiteConfig;
    use crate::doubles::DemoSite;
    use crate::locator::Locator;

    #[derive(Debug, Clone)]
    struct CartHeading {
        session: Session,
        heading: Locator,
    }

    impl PageObject for CartHeading {
        const SHARED_STATE: &'static str = "cart";

        fn new(session: Session) -> Self {
            Self {
                heading: session.locator(".mt-2"),
                session,
            }
        }

        fn session(&self) -> &Session {
            &self.session
        }

        fn url(&self) -> String {
            self.session.config().url("project-8")
        }
    }

    fn session() -> Session {
        let config = SuiteConfig::default().with_action_timeout(100);
        Session::new(DemoSite::new(&config), config)
    }

    #[test]
    fn test_page_name_is_type_name() {
        let page = CartHeading::new(session());
        assert_eq!(page.page_name(), "CartHeading");
    }

    #[tokio::test]
    async fn test_default_navigate_loads_url() {
        let page = CartHeading::new(session());
        page.navigate().await.unwrap();
        assert_eq!(
            page.session().current_url().await.unwrap(),
            "https://www.techglobal-training.com/frontend/project-8"
        );
        assert_eq!(page.heading.count().await.unwrap(), 1);
    }
}
