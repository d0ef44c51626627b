//! Test session.
//!
//! A [`Session`] owns the driver and the settings for one run. Screens borrow
//! it; nothing in the crate reaches for global state. The operations here are
//! the ones every screen shares: loading waits, element waits, URL waits,
//! dialog handling and debug artifacts.

use crate::config::Settings;
use crate::driver::{Driver, ElementSnapshot};
use crate::focus::FocusLocator;
use crate::remote::RemoteControl;
use crate::result::TenfootResult;
use crate::retry::{retry_action, RetryPolicy};
use crate::scanner::GridScanner;
use crate::selector::SelectorChain;
use crate::wait::{pause, poll_until, PollOptions, TimeoutTier};
use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

/// One driver plus its settings
#[derive(Debug)]
pub struct Session<D: Driver> {
    driver: D,
    settings: Settings,
    focus: FocusLocator,
}

impl<D: Driver> Session<D> {
    /// Create a session
    pub fn new(driver: D, settings: Settings) -> Self {
        let focus = FocusLocator::new(settings.selectors.common.focused.clone());
        Self {
            driver,
            settings,
            focus,
        }
    }

    /// The driver
    pub const fn driver(&self) -> &D {
        &self.driver
    }

    /// The settings
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The focus locator
    pub const fn focus(&self) -> &FocusLocator {
        &self.focus
    }

    /// A paced key sender
    pub const fn remote(&self) -> RemoteControl<'_, D> {
        RemoteControl::new(&self.driver, self.settings.remote)
    }

    /// A grid scanner over the whole page
    pub const fn scanner(&self) -> GridScanner<'_, D> {
        GridScanner::new(&self.driver, self.settings.remote, &self.focus)
    }

    /// Poll options for a timeout tier
    pub const fn poll_options(&self, tier: TimeoutTier) -> PollOptions {
        PollOptions::from_config(&self.settings.polling, self.settings.timeouts.get(tier))
    }

    /// Duration of a timeout tier
    pub const fn timeout(&self, tier: TimeoutTier) -> Duration {
        self.settings.timeouts.get(tier)
    }

    /// A timeout tier in milliseconds, as precondition errors report it
    pub const fn timeout_ms(&self, tier: TimeoutTier) -> u64 {
        self.timeout(tier).as_millis() as u64
    }

    /// Release the driver
    pub async fn close(self) -> TenfootResult<()> {
        self.driver.close().await
    }

    // =========================================================================
    // NAVIGATION
    // =========================================================================

    /// Load the base URL and wait for the page to settle
    pub async fn open_home(&self) -> TenfootResult<()> {
        tracing::info!(url = %self.settings.base_url, "opening application");
        self.driver.goto(&self.settings.base_url).await?;
        self.wait_for_page_load().await
    }

    /// Load a path relative to the base URL
    pub async fn navigate(&self, path: &str) -> TenfootResult<()> {
        let url = self.settings.url_for(path)?;
        tracing::info!(%url, "navigating");
        self.driver.goto(&url).await?;
        self.wait_for_page_load().await
    }

    /// Loading indicators gone, then a short settle
    pub async fn wait_for_page_load(&self) -> TenfootResult<()> {
        self.wait_for_absent(&self.settings.selectors.common.loading, TimeoutTier::Navigation)
            .await?;
        pause(self.settings.remote.page_settle).await;
        Ok(())
    }

    /// Current URL
    pub async fn current_url(&self) -> TenfootResult<String> {
        self.driver.current_url().await
    }

    /// Wait until the URL contains `fragment`
    pub async fn wait_for_url_contains(
        &self,
        fragment: &str,
        tier: TimeoutTier,
    ) -> TenfootResult<String> {
        let options = self.poll_options(tier);
        poll_until(&format!("url contains {fragment:?}"), &options, || async {
            let url = self.driver.current_url().await?;
            Ok(url.contains(fragment).then_some(url))
        })
        .await?
        .or_precondition(format!("URL containing {fragment:?}"), options.timeout)
    }

    // =========================================================================
    // ELEMENTS
    // =========================================================================

    /// Wait until some element of `chain` exists and is rendered
    pub async fn wait_for_element(
        &self,
        chain: &SelectorChain,
        tier: TimeoutTier,
    ) -> TenfootResult<ElementSnapshot> {
        self.wait_for_element_in(chain, None, tier).await
    }

    /// [`Self::wait_for_element`] restricted to `scope`
    pub async fn wait_for_element_in(
        &self,
        chain: &SelectorChain,
        scope: Option<&SelectorChain>,
        tier: TimeoutTier,
    ) -> TenfootResult<ElementSnapshot> {
        let options = self.poll_options(tier);
        poll_until(&format!("element {chain}"), &options, || async {
            Ok(chain
                .query(&self.driver, scope)
                .await?
                .into_iter()
                .find(ElementSnapshot::is_rendered))
        })
        .await?
        .or_precondition(format!("{chain} visible"), options.timeout)
    }

    /// Wait until nothing matches `chain`
    pub async fn wait_for_absent(
        &self,
        chain: &SelectorChain,
        tier: TimeoutTier,
    ) -> TenfootResult<()> {
        let options = self.poll_options(tier);
        poll_until(&format!("absence of {chain}"), &options, || async {
            Ok((!chain.exists(&self.driver).await?).then_some(()))
        })
        .await?
        .or_precondition(format!("{chain} gone"), options.timeout)
    }

    /// Number of `item` matches inside `container`
    pub async fn element_count(
        &self,
        container: &SelectorChain,
        item: &SelectorChain,
    ) -> TenfootResult<usize> {
        Ok(item.query(&self.driver, Some(container)).await?.len())
    }

    /// Whether any match of `chain` contains `text` (case-insensitive)
    pub async fn element_contains_text(
        &self,
        chain: &SelectorChain,
        text: &str,
    ) -> TenfootResult<bool> {
        let needle = text.to_lowercase();
        Ok(chain
            .query(&self.driver, None)
            .await?
            .iter()
            .any(|e| e.text.to_lowercase().contains(&needle)))
    }

    /// Fail unless the document title contains `expected`
    pub async fn verify_title(&self, expected: &str) -> TenfootResult<()> {
        let title = self.driver.title().await?;
        crate::result::ensure(title.contains(expected), || {
            format!("title {title:?} should contain {expected:?}")
        })
    }

    // =========================================================================
    // DIALOGS
    // =========================================================================

    /// Press OK when a confirm button is showing. Returns whether it was.
    pub async fn confirm_action(&self) -> TenfootResult<bool> {
        if !self
            .settings
            .selectors
            .common
            .confirm_button
            .exists(&self.driver)
            .await?
        {
            return Ok(false);
        }
        self.remote().ok().await?;
        self.wait_for_animations().await;
        Ok(true)
    }

    /// Move to the cancel button and press OK when one is showing
    pub async fn cancel_action(&self) -> TenfootResult<bool> {
        if !self
            .settings
            .selectors
            .common
            .cancel_button
            .exists(&self.driver)
            .await?
        {
            return Ok(false);
        }
        let remote = self.remote();
        remote.right(1).await?;
        remote.ok().await?;
        self.wait_for_animations().await;
        Ok(true)
    }

    /// Allow CSS transitions to finish
    pub async fn wait_for_animations(&self) {
        pause(self.settings.remote.animation_settle).await;
    }

    // =========================================================================
    // DEBUGGING
    // =========================================================================

    /// Log `message` together with the focused element
    pub async fn log_debug_info(&self, message: &str) -> TenfootResult<()> {
        let at = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);
        match self.focus.focused(&self.driver, None).await? {
            Some(item) => tracing::info!(
                %at,
                tag = %item.element.tag,
                classes = %item.element.classes.join(" "),
                id = item.element.id.as_deref().unwrap_or(""),
                text = %item.label,
                "{message}"
            ),
            None => tracing::info!(%at, "{message} (nothing focused)"),
        }
        Ok(())
    }

    /// Save a PNG of the viewport under `artifacts_dir`
    pub async fn take_debug_screenshot(&self, name: &str) -> TenfootResult<PathBuf> {
        let png = self.driver.screenshot().await?;
        let stamp = chrono::Utc::now().format("%Y-%m-%dT%H-%M-%S-%3fZ");
        let safe_name: String = name
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
            .collect();
        tokio::fs::create_dir_all(&self.settings.artifacts_dir).await?;
        let path = self
            .settings
            .artifacts_dir
            .join(format!("debug-{safe_name}-{stamp}.png"));
        tokio::fs::write(&path, png).await?;
        tracing::info!(path = %path.display(), "saved debug screenshot");
        Ok(path)
    }

    /// Run `action` under the configured retry policy
    pub async fn retry<T, F, Fut>(&self, description: &str, action: F) -> TenfootResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = TenfootResult<T>>,
    {
        retry_action(&RetryPolicy::from_settings(&self.settings), description, action).await
    }

    /// Fail with [`TenfootError::ElementNotFound`] unless `chain` matches
    pub async fn require(&self, chain: &SelectorChain) -> TenfootResult<String> {
        chain.require(&self.driver).await
    }
}
