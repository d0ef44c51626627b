//! Chromium backend over the DevTools protocol.
//!
//! Keys go through `Input.dispatchKeyEvent` so the page sees trusted events,
//! as a remote control would deliver them. Targeted key events and element
//! queries run as page scripts.

use crate::config::BrowserSettings;
use crate::driver::{Driver, ElementSnapshot};
use crate::event::{Key, KeyEventKind};
use crate::result::{TenfootError, TenfootResult};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
use chromiumoxide::cdp::browser_protocol::input::{DispatchKeyEventParams, DispatchKeyEventType};
use chromiumoxide::cdp::browser_protocol::page::{CaptureScreenshotFormat, CaptureScreenshotParams};
use chromiumoxide::page::Page as CdpPage;
use futures::StreamExt;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio::sync::Mutex;

/// Serializes one element the way [`ElementSnapshot`] deserializes it
const SNAPSHOT_FN: &str = r"
function __tenfootSnapshot(el) {
  const style = window.getComputedStyle(el);
  const rect = el.getBoundingClientRect();
  const attributes = {};
  for (const attr of el.attributes) attributes[attr.name] = attr.value;
  let opacity = 1;
  for (let node = el; node && node.nodeType === 1; node = node.parentElement) {
    opacity *= parseFloat(window.getComputedStyle(node).opacity || '1');
  }
  return {
    tag: el.tagName.toLowerCase(),
    id: el.id || null,
    classes: Array.from(el.classList),
    attributes,
    text: (el.innerText ?? el.textContent ?? '').replace(/\s+/g, ' ').trim(),
    visible: style.display !== 'none' && style.visibility !== 'hidden'
      && rect.width > 0 && rect.height > 0,
    opacity,
  };
}
";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
enum QueryReply {
    Ok(Vec<ElementSnapshot>),
    Invalid(String),
}

#[derive(Debug, Deserialize)]
struct ActiveReply {
    active: Option<ElementSnapshot>,
}

fn input_error(e: impl std::fmt::Display) -> TenfootError {
    TenfootError::Input {
        message: e.to_string(),
    }
}

fn js_string(value: &str) -> TenfootResult<String> {
    Ok(serde_json::to_string(value)?)
}

/// CDP event loop task, aborted when dropped
#[derive(Debug)]
struct HandlerTask(tokio::task::JoinHandle<()>);

impl Drop for HandlerTask {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// A Chromium page driven over CDP
#[derive(Debug)]
pub struct ChromiumDriver {
    browser: Mutex<CdpBrowser>,
    page: CdpPage,
    handler: HandlerTask,
}

impl ChromiumDriver {
    /// Launch Chromium and open a blank page
    pub async fn launch(settings: &BrowserSettings) -> TenfootResult<Self> {
        let mut builder = CdpConfig::builder()
            .window_size(settings.viewport_width, settings.viewport_height);
        if !settings.headless {
            builder = builder.with_head();
        }
        if !settings.sandbox {
            builder = builder.no_sandbox();
        }
        if let Some(path) = &settings.chromium_path {
            builder = builder.chrome_executable(path);
        }
        let config = builder
            .build()
            .map_err(|message| TenfootError::BrowserLaunch { message })?;

        let (browser, mut handler) =
            CdpBrowser::launch(config)
                .await
                .map_err(|e| TenfootError::BrowserLaunch {
                    message: e.to_string(),
                })?;
        let handler = HandlerTask(tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        }));

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| TenfootError::BrowserLaunch {
                message: e.to_string(),
            })?;
        tracing::info!(
            headless = settings.headless,
            width = settings.viewport_width,
            height = settings.viewport_height,
            "chromium launched"
        );
        Ok(Self {
            browser: Mutex::new(browser),
            page,
            handler,
        })
    }

    async fn eval<T: DeserializeOwned>(&self, script: String) -> TenfootResult<T> {
        let result = self
            .page
            .evaluate(script)
            .await
            .map_err(|e| TenfootError::evaluation(e.to_string()))?;
        result
            .into_value()
            .map_err(|e| TenfootError::evaluation(e.to_string()))
    }

    async fn send_key(&self, kind: DispatchKeyEventType, key: Key) -> TenfootResult<()> {
        let mut builder = DispatchKeyEventParams::builder()
            .r#type(kind)
            .key(key.dom_key())
            .code(key.dom_code())
            .windows_virtual_key_code(i64::from(key.key_code()))
            .native_virtual_key_code(i64::from(key.key_code()));
        if key == Key::Enter {
            builder = builder.text("\r");
        }
        let params = builder.build().map_err(input_error)?;
        let _ = self.page.execute(params).await.map_err(input_error)?;
        Ok(())
    }
}

#[async_trait]
impl Driver for ChromiumDriver {
    async fn goto(&self, url: &str) -> TenfootResult<()> {
        let _ = self
            .page
            .goto(url)
            .await
            .map_err(|e| TenfootError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            })?;
        Ok(())
    }

    async fn current_url(&self) -> TenfootResult<String> {
        self.eval("window.location.href".to_string()).await
    }

    async fn title(&self) -> TenfootResult<String> {
        self.eval("document.title".to_string()).await
    }

    async fn press_key(&self, key: Key) -> TenfootResult<()> {
        self.send_key(DispatchKeyEventType::KeyDown, key).await?;
        self.send_key(DispatchKeyEventType::KeyUp, key).await
    }

    async fn dispatch_key_event(
        &self,
        target: &str,
        kind: KeyEventKind,
        key: Key,
    ) -> TenfootResult<()> {
        let script = format!(
            "(() => {{
              const el = document.querySelector({target});
              if (!el) return false;
              el.dispatchEvent(new KeyboardEvent({event}, {{
                key: {key}, code: {code}, keyCode: {key_code}, which: {key_code},
                bubbles: true, cancelable: true,
              }}));
              return true;
            }})()",
            target = js_string(target)?,
            event = js_string(kind.event_type())?,
            key = js_string(key.dom_key())?,
            code = js_string(key.dom_code())?,
            key_code = key.key_code(),
        );
        let found: bool = self.eval(script).await?;
        if found {
            Ok(())
        } else {
            Err(TenfootError::ElementNotFound {
                selector: target.to_string(),
            })
        }
    }

    async fn query_all(
        &self,
        scope: Option<&str>,
        selector: &str,
    ) -> TenfootResult<Vec<ElementSnapshot>> {
        let scope_js = match scope {
            Some(scope) => js_string(scope)?,
            None => "null".to_string(),
        };
        let script = format!(
            "(() => {{
              {SNAPSHOT_FN}
              try {{
                let root = document;
                const scope = {scope_js};
                if (scope !== null) {{
                  root = document.querySelector(scope);
                  if (!root) return {{ ok: [] }};
                }}
                return {{ ok: Array.from(root.querySelectorAll({selector})).map(__tenfootSnapshot) }};
              }} catch (e) {{
                return {{ invalid: String(e && e.message || e) }};
              }}
            }})()",
            selector = js_string(selector)?,
        );
        match self.eval(script).await? {
            QueryReply::Ok(found) => Ok(found),
            QueryReply::Invalid(message) => Err(TenfootError::InvalidSelector {
                selector: selector.to_string(),
                message,
            }),
        }
    }

    async fn active_element(&self) -> TenfootResult<Option<ElementSnapshot>> {
        let script = format!(
            "(() => {{
              {SNAPSHOT_FN}
              const el = document.activeElement;
              return {{ active: el ? __tenfootSnapshot(el) : null }};
            }})()"
        );
        let reply: ActiveReply = self.eval(script).await?;
        Ok(reply.active)
    }

    async fn click(&self, selector: &str) -> TenfootResult<()> {
        let element =
            self.page
                .find_element(selector)
                .await
                .map_err(|_| TenfootError::ElementNotFound {
                    selector: selector.to_string(),
                })?;
        let _ = element.click().await.map_err(input_error)?;
        Ok(())
    }

    async fn screenshot(&self) -> TenfootResult<Vec<u8>> {
        let params = CaptureScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .build();
        let screenshot = self
            .page
            .execute(params)
            .await
            .map_err(|e| TenfootError::evaluation(e.to_string()))?;

        use base64::Engine;
        base64::engine::general_purpose::STANDARD
            .decode(&screenshot.data)
            .map_err(|e| TenfootError::evaluation(e.to_string()))
    }

    async fn close(&self) -> TenfootResult<()> {
        let mut browser = self.browser.lock().await;
        let closed = browser.close().await;
        self.handler.0.abort();
        closed
            .map(drop)
            .map_err(|e| TenfootError::BrowserLaunch {
                message: e.to_string(),
            })
    }
}
