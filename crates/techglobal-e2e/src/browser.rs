//! Real browser control over the Chrome DevTools Protocol.
//!
//! Locator chains are resolved in the page by a small script that mirrors the
//! in-process DOM double: the same segment kinds, the same text matching, the
//! same strictness for actions. Each session launches its own browser.

use crate::config::{BrowserSettings, SuiteConfig};
use crate::driver::{PageDriver, Session, SessionProvider};
use crate::locator::{ElementSnapshot, Segment};
use crate::result::{E2eError, E2eResult};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
use chromiumoxide::page::Page as CdpPage;
use futures::StreamExt;
use serde::Deserialize;
use tokio::sync::Mutex;

/// Resolver injected for every query and action.
///
/// `__ARGS__` is replaced once with a JSON object `{segments, action, text}`.
const RESOLVER: &str = r#"(() => {
  const { segments, action, text: fillText } = __ARGS__;
  const norm = (s) => (s || '').replace(/\s+/g, ' ').trim();
  const matches = (hay, needle) => norm(hay).toLowerCase().includes(norm(needle).toLowerCase());
  const descendants = (scopes) => {
    const seen = new Set();
    for (const scope of scopes) {
      for (const el of scope.querySelectorAll('*')) seen.add(el);
    }
    return [...document.querySelectorAll('*')].filter((el) => seen.has(el));
  };
  const roleOf = (el) => {
    const explicit = el.getAttribute('role');
    if (explicit) return explicit;
    const tag = el.tagName.toLowerCase();
    if (tag === 'a' && el.hasAttribute('href')) return 'link';
    if (tag === 'button') return 'button';
    if (tag === 'textarea') return 'textbox';
    if (tag === 'input') {
      const type = (el.getAttribute('type') || 'text').toLowerCase();
      if (['button', 'submit', 'reset'].includes(type)) return 'button';
      if (['text', 'search', 'email', 'tel', 'url', 'password'].includes(type)) return 'textbox';
    }
    return null;
  };
  const nameOf = (el) => el.getAttribute('aria-label') || norm(el.textContent) || el.getAttribute('placeholder') || '';
  const visible = (el) => {
    const style = getComputedStyle(el);
    return el.getClientRects().length > 0 && style.visibility !== 'hidden' && style.display !== 'none';
  };
  const editable = (el) => {
    if (el.isContentEditable) return true;
    const tag = el.tagName.toLowerCase();
    return (tag === 'input' || tag === 'textarea') && !el.disabled && !el.readOnly;
  };
  const snapshot = (el) => ({
    tag: el.tagName.toLowerCase(),
    text: norm(el.textContent),
    inner_text: norm(el.innerText),
    value: 'value' in el && typeof el.value === 'string' ? el.value : null,
    class_name: el.getAttribute('class') || '',
    visible: visible(el),
    enabled: !el.disabled,
    editable: editable(el),
  });

  let current = [document.documentElement];
  try {
    for (const seg of segments) {
      switch (seg.kind) {
        case 'css': {
          const found = new Set();
          for (const scope of current) {
            for (const el of scope.querySelectorAll(seg.selector)) found.add(el);
          }
          current = [...document.querySelectorAll('*')].filter((el) => found.has(el));
          break;
        }
        case 'has_text':
          current = current.filter((el) => matches(el.textContent, seg.text));
          break;
        case 'text':
          current = descendants(current).filter((el) =>
            matches(el.textContent, seg.text) &&
            ![...el.children].some((child) => matches(child.textContent, seg.text)));
          break;
        case 'role':
          current = descendants(current).filter((el) =>
            roleOf(el) === seg.role && (seg.name == null || matches(nameOf(el), seg.name)));
          break;
        case 'placeholder':
          current = descendants(current).filter((el) =>
            el.hasAttribute('placeholder') && matches(el.getAttribute('placeholder'), seg.text));
          break;
        case 'nth': {
          const i = seg.index < 0 ? current.length + seg.index : seg.index;
          current = i >= 0 && i < current.length ? [current[i]] : [];
          break;
        }
      }
    }
  } catch (e) {
    return { status: 'invalid', message: String(e) };
  }

  if (action === 'query') return { status: 'ok', elements: current.map(snapshot) };
  if (current.length === 0) return { status: 'detached' };
  if (current.length > 1) return { status: 'strict', count: current.length };
  const el = current[0];
  if (action === 'click') {
    const navigates = !!el.closest('a[href]');
    el.scrollIntoView({ block: 'center' });
    el.click();
    return { status: 'done', navigates };
  }
  if (!editable(el)) return { status: 'invalid', message: 'element is not editable' };
  el.focus();
  const proto = el.tagName.toLowerCase() === 'textarea'
    ? HTMLTextAreaElement.prototype
    : HTMLInputElement.prototype;
  Object.getOwnPropertyDescriptor(proto, 'value').set.call(el, fillText);
  el.dispatchEvent(new Event('input', { bubbles: true }));
  el.dispatchEvent(new Event('change', { bubbles: true }));
  return { status: 'done', navigates: false };
})()"#;

fn resolver_script(chain: &[Segment], action: &str, text: &str) -> E2eResult<String> {
    let args = serde_json::json!({
        "segments": chain,
        "action": action,
        "text": text,
    });
    Ok(RESOLVER.replacen("__ARGS__", &serde_json::to_string(&args)?, 1))
}

#[derive(Debug, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum Reply {
    Ok { elements: Vec<ElementSnapshot> },
    Done { navigates: bool },
    Strict { count: usize },
    Detached,
    Invalid { message: String },
}

fn chain_label(chain: &[Segment]) -> String {
    chain
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" >> ")
}

/// [`PageDriver`] backed by one Chromium instance and one tab
#[derive(Debug)]
pub struct ChromiumDriver {
    browser: Mutex<CdpBrowser>,
    page: CdpPage,
    handle: tokio::task::JoinHandle<()>,
}

impl ChromiumDriver {
    /// Launch a browser and open a blank tab
    ///
    /// # Errors
    ///
    /// Returns [`E2eError::BrowserLaunch`] if Chromium cannot be started
    pub async fn launch(settings: &BrowserSettings) -> E2eResult<Self> {
        let mut builder = CdpConfig::builder()
            .window_size(settings.viewport_width, settings.viewport_height);

        if !settings.headless {
            builder = builder.with_head();
        }

        if !settings.sandbox {
            builder = builder.no_sandbox();
        }

        if let Some(ref path) = settings.chromium_path {
            builder = builder.chrome_executable(path);
        }

        let cdp_config = builder
            .build()
            .map_err(|message| E2eError::BrowserLaunch { message })?;

        let (browser, mut handler) =
            CdpBrowser::launch(cdp_config)
                .await
                .map_err(|e| E2eError::BrowserLaunch {
                    message: e.to_string(),
                })?;

        let handle = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| E2eError::BrowserLaunch {
                message: e.to_string(),
            })?;
        tracing::debug!(headless = settings.headless, "chromium launched");

        Ok(Self {
            browser: Mutex::new(browser),
            page,
            handle,
        })
    }

    async fn run(&self, chain: &[Segment], action: &str, text: &str) -> E2eResult<Reply> {
        let script = resolver_script(chain, action, text)?;
        let result = self
            .page
            .evaluate(script)
            .await
            .map_err(|e| E2eError::session(e.to_string()))?;
        result
            .into_value()
            .map_err(|e| E2eError::session(e.to_string()))
    }

    async fn act(&self, chain: &[Segment], action: &str, text: &str) -> E2eResult<()> {
        let locator = chain_label(chain);
        match self.run(chain, action, text).await? {
            Reply::Done { navigates } => {
                if navigates {
                    self.page
                        .wait_for_navigation()
                        .await
                        .map_err(|e| E2eError::Navigation {
                            url: locator,
                            message: e.to_string(),
                        })?;
                }
                Ok(())
            }
            Reply::Strict { count } => Err(E2eError::StrictModeViolation { locator, count }),
            Reply::Detached => Err(E2eError::Action {
                locator,
                message: "element detached before the action ran".to_string(),
            }),
            Reply::Invalid { message } => Err(E2eError::Action { locator, message }),
            Reply::Ok { .. } => Err(E2eError::session("unexpected reply to an action")),
        }
    }
}

#[async_trait]
impl PageDriver for ChromiumDriver {
    async fn goto(&self, url: &str) -> E2eResult<()> {
        self.page
            .goto(url)
            .await
            .map_err(|e| E2eError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            })?;
        Ok(())
    }

    async fn query(&self, chain: &[Segment]) -> E2eResult<Vec<ElementSnapshot>> {
        match self.run(chain, "query", "").await? {
            Reply::Ok { elements } => Ok(elements),
            Reply::Invalid { message } => Err(E2eError::Action {
                locator: chain_label(chain),
                message,
            }),
            other => Err(E2eError::session(format!("unexpected reply to a query: {other:?}"))),
        }
    }

    async fn click(&self, chain: &[Segment]) -> E2eResult<()> {
        self.act(chain, "click", "").await
    }

    async fn fill(&self, chain: &[Segment], text: &str) -> E2eResult<()> {
        self.act(chain, "fill", text).await
    }

    async fn current_url(&self) -> E2eResult<String> {
        let url = self
            .page
            .url()
            .await
            .map_err(|e| E2eError::session(e.to_string()))?;
        Ok(url.unwrap_or_else(|| "about:blank".to_string()))
    }

    async fn close(&self) -> E2eResult<()> {
        let mut browser = self.browser.lock().await;
        let closed = browser
            .close()
            .await
            .map(|_| ())
            .map_err(|e| E2eError::session(e.to_string()));
        self.handle.abort();
        tracing::debug!("chromium closed");
        closed
    }
}

/// Launches one Chromium per session
#[derive(Debug, Clone)]
pub struct ChromiumProvider {
    config: SuiteConfig,
}

impl ChromiumProvider {
    /// Provider using the configured browser settings
    #[must_use]
    pub const fn new(config: SuiteConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl SessionProvider for ChromiumProvider {
    async fn open(&self) -> E2eResult<Session> {
        let driver = ChromiumDriver::launch(&self.config.browser).await?;
        Ok(Session::new(driver, self.config.clone()))
    }

    fn config(&self) -> &SuiteConfig {
        &self.config
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::locator::Role;

    #[test]
    fn test_reply_decoding() {
        let reply: Reply = serde_json::from_str(
            r#"{"status":"ok","elements":[{"tag":"button","text":"ADD","inner_text":"ADD",
                "value":null,"class_name":"button","visible":true,"enabled":true,"editable":false}]}"#,
        )
        .unwrap();
        match reply {
            Reply::Ok { elements } => assert_eq!(elements[0].tag, "button"),
            other => panic!("unexpected {other:?}"),
        }

        let reply: Reply = serde_json::from_str(r#"{"status":"strict","count":3}"#).unwrap();
        assert!(matches!(reply, Reply::Strict { count: 3 }));
    }

    #[test]
    fn test_segments_serialize_for_resolver() {
        let chain = vec![
            Segment::Role {
                role: Role::Button,
                name: Some("ADD".into()),
            },
            Segment::Nth { index: -1 },
        ];
        let json = serde_json::to_string(&chain).unwrap();
        assert_eq!(
            json,
            r#"[{"kind":"role","role":"button","name":"ADD"},{"kind":"nth","index":-1}]"#
        );
        assert!(RESOLVER.contains("case 'role'"));
        assert!(RESOLVER.contains("case 'has_text'"));
    }

    #[test]
    fn test_resolver_args_are_substituted_once() {
        let chain = vec![Segment::Text {
            text: "__ACTION__ and __TEXT__".into(),
        }];
        let script = resolver_script(&chain, "fill", "__ARGS__").unwrap();

        let line = script
            .lines()
            .find(|l| l.contains("const { segments, action"))
            .unwrap();
        let (_, literal) = line.split_once(" = ").unwrap();
        let args: serde_json::Value =
            serde_json::from_str(literal.trim_end_matches(';')).unwrap();
        assert_eq!(args["segments"][0]["text"], "__ACTION__ and __TEXT__");
        assert_eq!(args["action"], "fill");
        assert_eq!(args["text"], "__ARGS__");
    }
}
