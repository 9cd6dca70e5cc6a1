//! In-process doubles of the two demo pages.
//!
//! `DemoSite` implements [`PageDriver`] over a tiny virtual DOM rendered from
//! app state, so every locator, assertion and scenario runs offline with the
//! same selectors used against the live site. Each session gets its own
//! site, which makes tests fully isolated.
//!
//! An optional render delay keeps the previous page visible for a while after
//! every action, the way a real app repaints asynchronously. Assertions must
//! poll through it.

pub mod cart_app;
pub mod dom;
pub mod todo_app;

use crate::config::SuiteConfig;
use crate::driver::{PageDriver, Session, SessionProvider};
use crate::locator::{ElementSnapshot, Segment};
use crate::result::{E2eError, E2eResult};
use async_trait::async_trait;
use cart_app::CartApp;
use dom::{Dom, Node};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use todo_app::TodoApp;

/// Path of the to-do app below the base URL
pub const TODO_PATH: &str = "todo-list";

/// Wrap page content in the site's chrome (top navbar)
pub(crate) fn page_shell(title: &str, content: Node) -> Node {
    Node::new("html").child(
        Node::new("body")
            .child(
                Node::new("nav")
                    .class("navbar")
                    .child(Node::new("a").class("navbar-item").attr("href", "/").text("TechGlobal Training"))
                    .child(Node::new("span").class("navbar-item").text(title)),
            )
            .child(Node::new("div").class("container").child(content)),
    )
}

#[derive(Debug)]
enum Screen {
    Blank,
    Index,
    Todo(TodoApp),
    Cart(CartApp),
}

impl Screen {
    fn render(&self, base: &str) -> Node {
        match self {
            Self::Blank => Node::new("html").child(Node::new("body")),
            Self::Index => {
                let link = |name: &str, path: &str| {
                    Node::new("a")
                        .class("card")
                        .attr("href", &format!("{base}/{path}"))
                        .child(Node::new("p").text(name))
                };
                page_shell(
                    "Frontend Testing Practice",
                    Node::new("div")
                        .class("columns is-multiline")
                        .child(link("Html Elements", "html-elements"))
                        .child(link("Todo List", TODO_PATH))
                        .child(link("Shopping Cart", cart_path())),
                )
            }
            Self::Todo(app) => app.render(),
            Self::Cart(app) => app.render(),
        }
    }
}

fn cart_path() -> &'static str {
    crate::pages::shopping_cart::PATH
}

#[derive(Debug)]
struct SiteState {
    url: String,
    screen: Screen,
    /// Page still painted until the instant passes
    stale: Option<(Node, Instant)>,
}

/// Counters shared by a provider and the sites it opened
#[derive(Debug, Default)]
pub struct ProviderStats {
    opened: AtomicUsize,
    closed: AtomicUsize,
}

impl ProviderStats {
    /// Sessions opened so far
    #[must_use]
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    /// Sessions closed so far
    #[must_use]
    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    /// Sessions currently open
    #[must_use]
    pub fn open(&self) -> usize {
        self.opened().saturating_sub(self.closed())
    }
}

/// Both demo pages served in-process
#[derive(Debug)]
pub struct DemoSite {
    base: String,
    todo_origin: Option<String>,
    render_delay: Duration,
    unreachable: bool,
    state: Mutex<SiteState>,
    stats: Option<Arc<ProviderStats>>,
}

impl DemoSite {
    /// Site served under the configured base URL
    #[must_use]
    pub fn new(config: &SuiteConfig) -> Self {
        Self {
            base: config.base_url.trim_end_matches('/').to_string(),
            todo_origin: config.todo_url.is_some().then(|| config.todo_entry_url()),
            render_delay: Duration::ZERO,
            unreachable: false,
            state: Mutex::new(SiteState {
                url: "about:blank".to_string(),
                screen: Screen::Blank,
                stale: None,
            }),
            stats: None,
        }
    }

    /// Keep the previous paint visible for `delay` after each action
    #[must_use]
    pub const fn with_render_delay(mut self, delay: Duration) -> Self {
        self.render_delay = delay;
        self
    }

    /// Fail every navigation, as if the host were down
    #[must_use]
    pub const fn unreachable(mut self) -> Self {
        self.unreachable = true;
        self
    }

    fn with_stats(mut self, stats: Arc<ProviderStats>) -> Self {
        self.stats = Some(stats);
        self
    }

    fn lock(&self) -> MutexGuard<'_, SiteState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The painted DOM: the stale page while a repaint is pending
    fn painted(&self, state: &mut SiteState) -> Dom {
        if let Some((node, until)) = &state.stale {
            if Instant::now() < *until {
                return Dom::new(node.clone());
            }
            state.stale = None;
        }
        Dom::new(state.screen.render(&self.base))
    }

    /// Run a state change and schedule its repaint
    fn mutate(&self, state: &mut SiteState, change: impl FnOnce(&mut Screen)) {
        let before = state.screen.render(&self.base);
        change(&mut state.screen);
        if !self.render_delay.is_zero() && state.stale.is_none() {
            state.stale = Some((before, Instant::now() + self.render_delay));
        }
    }

    /// Resolve a chain to exactly one element of the painted page
    fn resolve_single(dom: &Dom, chain: &[Segment]) -> E2eResult<usize> {
        let found = dom.resolve(chain)?;
        let locator = chain
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" >> ");
        match found.as_slice() {
            [only] => Ok(*only),
            [] => Err(E2eError::Action {
                locator,
                message: "element detached before the action ran".to_string(),
            }),
            many => Err(E2eError::StrictModeViolation {
                locator,
                count: many.len(),
            }),
        }
    }

    fn load(&self, state: &mut SiteState, url: &str) -> E2eResult<()> {
        let navigation_error = |message: &str| E2eError::Navigation {
            url: url.to_string(),
            message: message.to_string(),
        };
        if self.unreachable {
            return Err(navigation_error("net::ERR_NAME_NOT_RESOLVED"));
        }
        let normalized = url.trim_end_matches('/');
        // the to-do origin serves the same site, as a redirect would
        let path = normalized
            .strip_prefix(&self.base)
            .or_else(|| {
                self.todo_origin
                    .as_deref()
                    .and_then(|origin| normalized.strip_prefix(origin))
            })
            .ok_or_else(|| navigation_error("net::ERR_NAME_NOT_RESOLVED"))?
            .trim_start_matches('/');
        state.screen = match path {
            "" => Screen::Index,
            TODO_PATH => Screen::Todo(TodoApp::new()),
            p if p == cart_path() => Screen::Cart(CartApp::default()),
            _ => return Err(navigation_error("404 Not Found")),
        };
        state.url = normalized.to_string();
        state.stale = None;
        Ok(())
    }
}

#[async_trait]
impl PageDriver for DemoSite {
    async fn goto(&self, url: &str) -> E2eResult<()> {
        let mut state = self.lock();
        self.load(&mut state, url)
    }

    async fn query(&self, chain: &[Segment]) -> E2eResult<Vec<ElementSnapshot>> {
        let mut state = self.lock();
        let dom = self.painted(&mut state);
        Ok(dom
            .resolve(chain)?
            .into_iter()
            .map(|i| dom.snapshot(i))
            .collect())
    }

    async fn click(&self, chain: &[Segment]) -> E2eResult<()> {
        let mut state = self.lock();
        let dom = self.painted(&mut state);
        let target = Self::resolve_single(&dom, chain)?;

        if let Some(handler) = dom.handler_for(target).map(str::to_string) {
            self.mutate(&mut state, |screen| match screen {
                Screen::Todo(app) => app.click(&handler),
                Screen::Cart(app) => app.click(&handler),
                Screen::Blank | Screen::Index => {}
            });
            return Ok(());
        }
        if let Some(href) = dom.link_for(target) {
            let url = if href.starts_with('/') {
                format!("{}{href}", self.base)
            } else {
                href
            };
            return self.load(&mut state, &url);
        }
        Ok(())
    }

    async fn fill(&self, chain: &[Segment], text: &str) -> E2eResult<()> {
        let mut state = self.lock();
        let dom = self.painted(&mut state);
        let target = Self::resolve_single(&dom, chain)?;
        let id = dom.id_of(target).unwrap_or_default();
        self.mutate(&mut state, |screen| {
            if let Screen::Todo(app) = screen {
                app.fill(&id, text);
            }
        });
        Ok(())
    }

    async fn current_url(&self) -> E2eResult<String> {
        Ok(self.lock().url.clone())
    }

    async fn close(&self) -> E2eResult<()> {
        if let Some(stats) = &self.stats {
            stats.closed.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }
}

/// Opens a fresh [`DemoSite`] per session
#[derive(Debug, Clone)]
pub struct DoubleProvider {
    config: SuiteConfig,
    render_delay: Duration,
    unreachable: bool,
    stats: Arc<ProviderStats>,
}

impl DoubleProvider {
    /// Provider for sites under the configured base URL
    #[must_use]
    pub fn new(config: SuiteConfig) -> Self {
        Self {
            config,
            render_delay: Duration::ZERO,
            unreachable: false,
            stats: Arc::new(ProviderStats::default()),
        }
    }

    /// Delay repaints of every site this provider opens
    #[must_use]
    pub const fn with_render_delay(mut self, delay: Duration) -> Self {
        self.render_delay = delay;
        self
    }

    /// Make every navigation fail
    #[must_use]
    pub const fn unreachable(mut self) -> Self {
        self.unreachable = true;
        self
    }

    /// Open/close counters
    #[must_use]
    pub fn stats(&self) -> Arc<ProviderStats> {
        Arc::clone(&self.stats)
    }
}

#[async_trait]
impl SessionProvider for DoubleProvider {
    async fn open(&self) -> E2eResult<Session> {
        let mut site = DemoSite::new(&self.config)
            .with_render_delay(self.render_delay)
            .with_stats(Arc::clone(&self.stats));
        if self.unreachable {
            site = site.unreachable();
        }
        self.stats.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Session::new(site, self.config.clone()))
    }

    fn config(&self) -> &SuiteConfig {
        &self.config
    }
}
