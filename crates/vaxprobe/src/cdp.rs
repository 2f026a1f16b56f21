//! Chromium driver over CDP.
//!
//! Elements are found by an injected script that computes ARIA roles and
//! accessible names in the page and tags each match with a
//! `data-vaxprobe-id` attribute. Clicks and typing then go through real CDP
//! input events on the tagged element.

use crate::driver::{ElementHandle, ElementQuery, ElementState, PageDriver, ReadyState};
use crate::locator::NameMatch;
use crate::result::{ProbeError, ProbeResult};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
use chromiumoxide::page::Page as CdpPage;
use futures::StreamExt;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// Attribute the query script tags matched elements with
pub const ELEMENT_ID_ATTRIBUTE: &str = "data-vaxprobe-id";

const QUERY_SCRIPT: &str = r#"
window.__vaxprobe || (window.__vaxprobe = (() => {
  let seq = 0;
  const norm = (s) => (s || '').replace(/\s+/g, ' ').trim();
  const byId = (id) => document.querySelector(`[data-vaxprobe-id="${id}"]`);
  const role = (el) => {
    const explicit = el.getAttribute('role');
    if (explicit) return explicit.split(' ')[0];
    const tag = el.tagName.toLowerCase();
    if (/^h[1-6]$/.test(tag)) return 'heading';
    switch (tag) {
      case 'button': return 'button';
      case 'a': return el.hasAttribute('href') ? 'link' : null;
      case 'main': return 'main';
      case 'nav': return 'navigation';
      case 'p': return 'paragraph';
      case 'tr': return 'row';
      case 'table': return 'table';
      case 'strong': return 'strong';
      case 'select': return 'combobox';
      case 'textarea': return 'textbox';
      case 'input': {
        const type = (el.getAttribute('type') || 'text').toLowerCase();
        if (['button', 'submit', 'reset', 'image'].includes(type)) return 'button';
        if (type === 'checkbox') return 'checkbox';
        if (type === 'radio') return 'radio';
        if (['text', 'email', 'tel', 'search', 'url', 'number', 'password'].includes(type)) return 'textbox';
        return null;
      }
      default: return null;
    }
  };
  const name = (el) => {
    const labelledBy = el.getAttribute('aria-labelledby');
    if (labelledBy) {
      return labelledBy.split(/\s+/).map((id) => (document.getElementById(id) || {}).textContent || '').join(' ');
    }
    const label = el.getAttribute('aria-label');
    if (label) return label;
    if (el.labels && el.labels.length) return Array.from(el.labels).map((l) => l.textContent).join(' ');
    if (el.tagName === 'INPUT' && ['button', 'submit', 'reset'].includes(el.type)) return el.value;
    if (['MAIN', 'NAV', 'TABLE', 'TR', 'SELECT', 'TEXTAREA', 'INPUT'].includes(el.tagName)) return el.getAttribute('title') || '';
    return el.textContent || el.getAttribute('title') || '';
  };
  const tag = (el) => {
    if (!el.dataset.vaxprobeId) el.dataset.vaxprobeId = 'vp' + (++seq);
    return el.dataset.vaxprobeId;
  };
  return {
    query(q) {
      const root = q.within ? byId(q.within) : document;
      if (!root) return [];
      const found = [];
      for (const el of root.querySelectorAll('*')) {
        const r = role(el);
        if (q.role && r !== q.role) continue;
        const n = norm(name(el));
        if (q.name !== null) {
          const wanted = norm(q.name);
          if (q.exact ? n !== wanted : !n.toLowerCase().includes(wanted.toLowerCase())) continue;
        }
        if (q.hasText !== null) {
          const text = norm(el.innerText || el.textContent).toLowerCase();
          if (!text.includes(norm(q.hasText).toLowerCase())) continue;
        }
        found.push({ id: tag(el), role: r, name: n });
      }
      return found;
    },
    state(id) {
      const el = byId(id);
      if (!el) return { attached: false, visible: false, enabled: false, checked: false, text: '', value: null };
      const style = getComputedStyle(el);
      const rect = el.getBoundingClientRect();
      const hasValue = ['INPUT', 'TEXTAREA', 'SELECT'].includes(el.tagName);
      return {
        attached: true,
        visible: style.visibility !== 'hidden' && style.display !== 'none' && (rect.width > 0 || rect.height > 0),
        enabled: !el.disabled && el.getAttribute('aria-disabled') !== 'true',
        checked: !!el.checked,
        text: el.innerText || el.textContent || '',
        value: hasValue ? el.value : null,
      };
    },
    clear(id) {
      const el = byId(id);
      if (!el) return false;
      el.value = '';
      el.dispatchEvent(new Event('input', { bubbles: true }));
      return true;
    },
  };
})());
"#;

/// Chromium launch options
#[derive(Debug, Clone)]
pub struct BrowserOptions {
    /// Run without a visible window
    pub headless: bool,
    /// Keep Chromium's sandbox (disable in containers)
    pub sandbox: bool,
    /// Chromium executable; `None` lets chromiumoxide find one
    pub chromium_path: Option<PathBuf>,
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            headless: true,
            sandbox: true,
            chromium_path: None,
        }
    }
}

impl BrowserOptions {
    /// Show the browser window
    #[must_use]
    pub const fn headed(mut self) -> Self {
        self.headless = false;
        self
    }

    /// Disable the sandbox
    #[must_use]
    pub const fn without_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }

    /// Use a specific Chromium binary
    #[must_use]
    pub fn with_chromium_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.chromium_path = Some(path.into());
        self
    }
}

#[derive(Debug, Deserialize)]
struct FoundElement {
    id: String,
    role: Option<String>,
    name: String,
}

/// [`PageDriver`] backed by a real Chromium page
#[derive(Debug)]
pub struct CdpDriver {
    browser: Arc<Mutex<CdpBrowser>>,
    page: Arc<Mutex<CdpPage>>,
    handle: tokio::task::JoinHandle<()>,
}

impl CdpDriver {
    /// Launch Chromium and open a blank page
    pub async fn launch(options: &BrowserOptions) -> ProbeResult<Self> {
        let mut builder = CdpConfig::builder();
        if !options.headless {
            builder = builder.with_head();
        }
        if !options.sandbox {
            builder = builder.no_sandbox();
        }
        if let Some(ref path) = options.chromium_path {
            builder = builder.chrome_executable(path);
        }
        let config = builder.build().map_err(ProbeError::driver)?;

        let (browser, mut handler) = CdpBrowser::launch(config)
            .await
            .map_err(|e| ProbeError::driver(format!("browser launch failed: {e}")))?;

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
            .map_err(|e| ProbeError::driver(e.to_string()))?;
        debug!("chromium launched");

        Ok(Self {
            browser: Arc::new(Mutex::new(browser)),
            page: Arc::new(Mutex::new(page)),
            handle,
        })
    }

    /// Close the browser
    pub async fn close(self) -> ProbeResult<()> {
        let mut browser = self.browser.lock().await;
        browser
            .close()
            .await
            .map_err(|e| ProbeError::driver(e.to_string()))?;
        self.handle.abort();
        Ok(())
    }

    async fn eval<T: DeserializeOwned>(&self, call: &str) -> ProbeResult<T> {
        let page = self.page.lock().await;
        let expression = format!("{QUERY_SCRIPT}\n{call}");
        page.evaluate_expression(expression)
            .await
            .map_err(|e| ProbeError::driver(e.to_string()))?
            .into_value()
            .map_err(|e| ProbeError::driver(e.to_string()))
    }

    async fn tagged(&self, element: &ElementHandle) -> ProbeResult<chromiumoxide::Element> {
        let page = self.page.lock().await;
        page.find_element(element_selector(&element.id))
            .await
            .map_err(|e| ProbeError::driver(format!("element {} is gone: {e}", element.id)))
    }
}

fn element_selector(id: &str) -> String {
    format!("[{ELEMENT_ID_ATTRIBUTE}=\"{id}\"]")
}

fn query_call(query: &ElementQuery) -> ProbeResult<String> {
    let args = serde_json::json!({
        "role": query.role,
        "name": query.name,
        "exact": query.name_match == NameMatch::Exact,
        "hasText": query.has_text,
        "within": query.within.as_ref().map(|h| h.id.as_str()),
    });
    Ok(format!("window.__vaxprobe.query({})", serde_json::to_string(&args)?))
}

#[async_trait]
impl PageDriver for CdpDriver {
    async fn navigate(&self, url: &str) -> ProbeResult<()> {
        let page = self.page.lock().await;
        page.goto(url).await.map_err(|e| ProbeError::Navigation {
            url: url.to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    async fn current_url(&self) -> ProbeResult<String> {
        let page = self.page.lock().await;
        let url = page
            .url()
            .await
            .map_err(|e| ProbeError::driver(e.to_string()))?;
        Ok(url.unwrap_or_default())
    }

    async fn query(&self, query: &ElementQuery) -> ProbeResult<Vec<ElementHandle>> {
        let found: Vec<FoundElement> = self.eval(&query_call(query)?).await?;
        Ok(found
            .into_iter()
            .map(|e| ElementHandle::new(e.id, e.role.and_then(|r| r.parse().ok()), e.name))
            .collect())
    }

    async fn state(&self, element: &ElementHandle) -> ProbeResult<ElementState> {
        let id = serde_json::to_string(&element.id)?;
        self.eval(&format!("window.__vaxprobe.state({id})")).await
    }

    async fn clear(&self, element: &ElementHandle) -> ProbeResult<()> {
        let id = serde_json::to_string(&element.id)?;
        let cleared: bool = self.eval(&format!("window.__vaxprobe.clear({id})")).await?;
        if cleared {
            Ok(())
        } else {
            Err(ProbeError::driver(format!("element {} is gone", element.id)))
        }
    }

    async fn type_text(&self, element: &ElementHandle, text: &str) -> ProbeResult<()> {
        let target = self.tagged(element).await?;
        target
            .click()
            .await
            .map_err(|e| ProbeError::driver(e.to_string()))?;
        target
            .type_str(text)
            .await
            .map_err(|e| ProbeError::driver(e.to_string()))?;
        Ok(())
    }

    async fn click(&self, element: &ElementHandle) -> ProbeResult<()> {
        let target = self.tagged(element).await?;
        target
            .click()
            .await
            .map_err(|e| ProbeError::driver(e.to_string()))?;
        Ok(())
    }

    async fn ready_state(&self) -> ProbeResult<ReadyState> {
        let page = self.page.lock().await;
        let state: String = page
            .evaluate_expression("document.readyState")
            .await
            .map_err(|e| ProbeError::driver(e.to_string()))?
            .into_value()
            .map_err(|e| ProbeError::driver(e.to_string()))?;
        Ok(ReadyState::from_document(&state))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::locator::Role;

    #[test]
    fn test_query_call_serializes_filters() {
        let query = ElementQuery::by_role(Some(Role::Link))
            .with_name(Some("Change \"GB1\"".into()), NameMatch::Exact)
            .within(Some(ElementHandle::new("vp7", Some(Role::Row), "")));
        let call = query_call(&query).unwrap();
        assert!(call.starts_with("window.__vaxprobe.query({"));
        assert!(call.contains(r#""role":"link""#));
        assert!(call.contains(r#""exact":true"#));
        assert!(call.contains(r#""within":"vp7""#));
        assert!(call.contains(r#"Change \"GB1\""#));
    }

    #[test]
    fn test_unfiltered_query_sends_nulls() {
        let call = query_call(&ElementQuery::default()).unwrap();
        assert!(call.contains(r#""name":null"#));
        assert!(call.contains(r#""hasText":null"#));
    }

    #[test]
    fn test_element_selector() {
        assert_eq!(element_selector("vp3"), "[data-vaxprobe-id=\"vp3\"]");
    }

    #[test]
    fn test_options_builder() {
        let options = BrowserOptions::default()
            .headed()
            .without_sandbox()
            .with_chromium_path("/usr/bin/chromium");
        assert!(!options.headless);
        assert!(!options.sandbox);
        assert!(options.chromium_path.is_some());
    }

    #[tokio::test]
    #[ignore = "requires a local Chromium"]
    async fn test_live_query_and_state() {
        let driver = CdpDriver::launch(&BrowserOptions::default().without_sandbox())
            .await
            .unwrap();
        driver
            .navigate("data:text/html,<main><h1>Children</h1><a href='#'>Vaccines</a></main>")
            .await
            .unwrap();
        let links = driver
            .query(&ElementQuery::by_role(Some(Role::Link)).with_name(Some("vacc".into()), NameMatch::Contains))
            .await
            .unwrap();
        assert_eq!(links.len(), 1);
        assert!(driver.state(&links[0]).await.unwrap().is_actionable());
        assert_eq!(driver.ready_state().await.unwrap(), ReadyState::Complete);
        driver.close().await.unwrap();
    }
}
