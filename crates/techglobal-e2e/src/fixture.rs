//! Per-test fixture: session setup and guaranteed teardown.
//!
//! ```text
//! lane (optional) ─► open session ─► P::new ─► navigate ─► body ─► close session
//!                                                   │                   ▲
//!                                                   └── error / timeout / panic
//! ```
//!
//! The session is closed on every exit path. A panic in the body is resumed
//! after teardown so the test still fails with its own message.

use crate::driver::{Session, SessionProvider};
use crate::page_object::PageObject;
use crate::result::{E2eError, E2eResult};
use crate::scenario::{Scenario, ScenarioReport};
use futures::FutureExt;
use std::collections::HashMap;
use std::future::Future;
use std::marker::PhantomData;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use tokio::sync::OwnedMutexGuard;
use tracing::Instrument;

/// Name of the step recorded for the page's initial navigation
pub const NAVIGATE_STEP: &str = "01. Navigate to the URL";

type Lanes = Mutex<HashMap<&'static str, Arc<tokio::sync::Mutex<()>>>>;

static LANES: OnceLock<Lanes> = OnceLock::new();

/// Acquire the process-wide lane for a piece of shared remote state
async fn acquire_lane(name: &'static str) -> OwnedMutexGuard<()> {
    let lane = {
        let mut lanes = LANES
            .get_or_init(Lanes::default)
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        Arc::clone(lanes.entry(name).or_default())
    };
    lane.lock_owned().await
}

/// Runs test bodies against a fresh page object of type `P`.
pub struct Fixture<P: PageObject> {
    provider: Arc<dyn SessionProvider>,
    navigate: bool,
    _page: PhantomData<fn() -> P>,
}

impl<P: PageObject> Clone for Fixture<P> {
    fn clone(&self) -> Self {
        Self {
            provider: Arc::clone(&self.provider),
            navigate: self.navigate,
            _page: PhantomData,
        }
    }
}

impl<P: PageObject> std::fmt::Debug for Fixture<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fixture")
            .field("page", &std::any::type_name::<P>())
            .field("navigate", &self.navigate)
            .finish_non_exhaustive()
    }
}

impl<P: PageObject> Fixture<P> {
    /// Create a fixture that navigates to the page before each body
    pub fn new(provider: impl SessionProvider + 'static) -> Self {
        Self::from_shared(Arc::new(provider))
    }

    /// Create a fixture from a provider shared with other fixtures
    #[must_use]
    pub fn from_shared(provider: Arc<dyn SessionProvider>) -> Self {
        Self {
            provider,
            navigate: true,
            _page: PhantomData,
        }
    }

    /// Skip the initial navigation
    #[must_use]
    pub const fn without_navigation(mut self) -> Self {
        self.navigate = false;
        self
    }

    /// Run `body` with a fresh page object and tear the session down afterwards.
    ///
    /// # Errors
    ///
    /// Returns the body's error, [`E2eError::Timeout`] if the body exceeds the
    /// test timeout, or [`E2eError::Fixture`] if only teardown failed
    ///
    /// # Panics
    ///
    /// Resumes a panic raised by the body, after teardown
    pub async fn run<T, F, Fut>(&self, name: &str, body: F) -> E2eResult<T>
    where
        F: FnOnce(P) -> Fut,
        Fut: Future<Output = E2eResult<T>>,
    {
        let config = self.provider.config();
        let _lane = if config.serialize_shared_state {
            Some(acquire_lane(P::SHARED_STATE).await)
        } else {
            None
        };

        let session = self.provider.open().await?;
        tracing::info!(test = name, session = session.id(), "test started");
        let page = P::new(session.clone());
        let navigate = self.navigate;
        let timeout = config.test_timeout();

        let guarded = async move {
            if navigate {
                page.navigate().await?;
            }
            body(page).await
        };
        let span = tracing::info_span!("test", test = name, session = session.id());
        let outcome = AssertUnwindSafe(tokio::time::timeout(timeout, guarded.instrument(span)))
            .catch_unwind()
            .await;

        let teardown = teardown(&session).await;

        match outcome {
            Err(panic) => {
                tracing::error!(test = name, "test panicked; session closed");
                std::panic::resume_unwind(panic)
            }
            Ok(Err(_elapsed)) => {
                tracing::error!(test = name, timeout_ms = config.test_timeout_ms, "test timed out");
                Err(E2eError::Timeout {
                    ms: config.test_timeout_ms,
                    waited_for: format!("test '{name}'"),
                })
            }
            Ok(Ok(Err(err))) => {
                tracing::warn!(test = name, error = %err, "test failed");
                Err(err)
            }
            Ok(Ok(Ok(value))) => {
                teardown?;
                tracing::info!(test = name, "test finished");
                Ok(value)
            }
        }
    }

    /// Run a scenario body; navigation is recorded as its first step.
    ///
    /// A failed navigation aborts the scenario, so every step of the body is
    /// reported as skipped.
    ///
    /// # Errors
    ///
    /// Returns [`E2eError::Timeout`] or a teardown error; step failures are
    /// in the report
    pub async fn run_scenario<F, Fut>(&self, name: &str, body: F) -> E2eResult<ScenarioReport>
    where
        F: FnOnce(P, Scenario) -> Fut,
        Fut: Future<Output = Scenario>,
    {
        let navigate = self.navigate;
        let inner = self.clone().without_navigation();
        inner
            .run(name, |page| async move {
                let mut scenario = Scenario::new(name);
                if navigate {
                    scenario.step(NAVIGATE_STEP, page.navigate()).await;
                }
                Ok(body(page, scenario).await.finish())
            })
            .await
    }
}

async fn teardown(session: &Session) -> E2eResult<()> {
    session.close().await.map_err(|err| {
        tracing::warn!(session = session.id(), error = %err, "teardown failed");
        E2eError::Fixture {
            message: format!("closing session {}: {err}", session.id()),
        }
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::SuiteConfig;
    use crate::doubles::DoubleProvider;
    use crate::pages::ShoppingCartPage;
    use crate::scenario::StepOutcome;

    fn provider() -> DoubleProvider {
        DoubleProvider::new(
            SuiteConfig::default()
                .with_action_timeout(100)
                .with_expect_timeout(100)
                .with_poll_interval(5)
                .with_serialized_shared_state(false),
        )
    }

    mod teardown_tests {
        use super::*;

        #[tokio::test]
        async fn test_closes_after_success() {
            let provider = provider();
            let stats = provider.stats();
            let fixture = Fixture::<ShoppingCartPage>::new(provider);

            let count = fixture
                .run("count", |page| async move { page.courses().count().await })
                .await
                .unwrap();

            assert_eq!(count, 3);
            assert_eq!(stats.opened(), 1);
            assert_eq!(stats.closed(), 1);
        }

        #[tokio::test]
        async fn test_closes_after_error() {
            let provider = provider();
            let stats = provider.stats();
            let fixture = Fixture::<ShoppingCartPage>::new(provider);

            let err = fixture
                .run("boom", |page| async move { page.add_to_cart(9).await })
                .await
                .unwrap_err();

            assert!(matches!(err, E2eError::IndexOutOfRange { .. }));
            assert_eq!(stats.closed(), 1);
        }

        #[tokio::test]
        async fn test_closes_after_timeout() {
            let provider = DoubleProvider::new(
                SuiteConfig::default()
                    .with_test_timeout(30)
                    .with_serialized_shared_state(false),
            );
            let stats = provider.stats();
            let fixture = Fixture::<ShoppingCartPage>::new(provider);

            let err = fixture
                .run("slow", |_page| async move {
                    tokio::time::sleep(std::time::Duration::from_secs(5)).await;
                    Ok(())
                })
                .await
                .unwrap_err();

            assert!(matches!(err, E2eError::Timeout { ms: 30, .. }));
            assert_eq!(stats.closed(), 1);
        }
    }

    mod scenario_tests {
        use super::*;

        #[tokio::test]
        async fn test_navigation_is_first_step() {
            let fixture = Fixture::<ShoppingCartPage>::new(provider());
            let report = fixture
                .run_scenario("nav", |page, mut scenario| async move {
                    scenario
                        .step("2. heading", async {
                            page.heading().text_content().await.map(|_| ())
                        })
                        .await;
                    scenario
                })
                .await
                .unwrap();

            assert_eq!(report.steps[0].name, NAVIGATE_STEP);
            assert!(report.passed());
        }

        #[tokio::test]
        async fn test_failed_navigation_skips_body() {
            let provider = DoubleProvider::new(
                SuiteConfig::default().with_serialized_shared_state(false),
            )
            .unreachable();
            let fixture = Fixture::<ShoppingCartPage>::new(provider);
            let report = fixture
                .run_scenario("offline", |_page, mut scenario| async move {
                    scenario.step("2. anything", async { Ok(()) }).await;
                    scenario
                })
                .await
                .unwrap();

            assert_eq!(report.steps[0].outcome, StepOutcome::Failed);
            assert_eq!(report.steps[1].outcome, StepOutcome::Skipped);
        }
    }

    mod lane_tests {
        use super::*;
        use std::sync::atomic::{AtomicUsize, Ordering};

        #[tokio::test]
        async fn test_lane_serializes_holders() {
            let active = Arc::new(AtomicUsize::new(0));
            let peak = Arc::new(AtomicUsize::new(0));

            let tasks: Vec<_> = (0..4)
                .map(|_| {
                    let active = Arc::clone(&active);
                    let peak = Arc::clone(&peak);
                    tokio::spawn(async move {
                        let _guard = acquire_lane("lane-test").await;
                        let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                        peak.fetch_max(now, Ordering::SeqCst);
                        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
                        active.fetch_sub(1, Ordering::SeqCst);
                    })
                })
                .collect();
            for task in tasks {
                task.await.unwrap();
            }

            assert_eq!(peak.load(Ordering::SeqCst), 1);
        }
    }
}
