//! Focus locator.
//!
//! The target application marks the focused tile in several ways depending
//! on the screen (`data-focused="focused"` on the apps grid,
//! `data-focused="true"` on the search genres, a `.focused` class
//! elsewhere). The locator tries every marker in priority order, preferring
//! a match inside the container being scanned.

use crate::driver::{Driver, ElementSnapshot};
use crate::result::TenfootResult;
use crate::selector::SelectorChain;
use crate::wait::{poll_until, PollOptions, WaitOutcome};
use serde::Serialize;

/// The element currently holding focus
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FocusedItem {
    /// Visible label (trimmed text, else aria-label, else test id)
    pub label: String,
    /// `data-testid`
    pub test_id: Option<String>,
    /// Full snapshot
    pub element: ElementSnapshot,
}

impl FocusedItem {
    /// Build from a snapshot
    #[must_use]
    pub fn from_element(element: ElementSnapshot) -> Self {
        let test_id = element.test_id().map(str::to_string);
        let text = element.text.trim();
        let label = if !text.is_empty() {
            text.to_string()
        } else if let Some(aria) = element.attr("aria-label").filter(|a| !a.trim().is_empty()) {
            aria.trim().to_string()
        } else {
            test_id.clone().unwrap_or_default()
        };
        Self {
            label,
            test_id,
            element,
        }
    }

    /// Identity used to detect that a move changed nothing
    #[must_use]
    pub fn identity(&self) -> (Option<&str>, &str) {
        (self.test_id.as_deref(), self.label.as_str())
    }

    /// Every name this item answers to (label, aria-label, test id)
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names = vec![self.label.as_str()];
        if let Some(aria) = self.element.attr("aria-label") {
            names.push(aria);
        }
        if let Some(id) = self.test_id.as_deref() {
            names.push(id);
        }
        names
    }
}

/// Reads the focused element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusLocator {
    markers: SelectorChain,
}

impl FocusLocator {
    /// Locator over the given focus markers
    #[must_use]
    pub const fn new(markers: SelectorChain) -> Self {
        Self { markers }
    }

    /// Focus markers in priority order
    #[must_use]
    pub const fn markers(&self) -> &SelectorChain {
        &self.markers
    }

    /// The focused item inside `scope`, else anywhere on the page
    pub async fn focused<D: Driver + ?Sized>(
        &self,
        driver: &D,
        scope: Option<&SelectorChain>,
    ) -> TenfootResult<Option<FocusedItem>> {
        if let Some(scope) = scope {
            if let Some(element) = self.markers.first(driver, Some(scope)).await? {
                let item = FocusedItem::from_element(element);
                tracing::debug!(label = %item.label, test_id = ?item.test_id, "focus (scoped)");
                return Ok(Some(item));
            }
        }
        let item = self
            .markers
            .first(driver, None)
            .await?
            .map(FocusedItem::from_element);
        tracing::debug!(
            label = item.as_ref().map(|i| i.label.as_str()),
            "focus (page)"
        );
        Ok(item)
    }

    /// The focused item inside `scope` only
    pub async fn focused_within<D: Driver + ?Sized>(
        &self,
        driver: &D,
        scope: &SelectorChain,
    ) -> TenfootResult<Option<FocusedItem>> {
        Ok(self
            .markers
            .first(driver, Some(scope))
            .await?
            .map(FocusedItem::from_element))
    }

    /// `document.activeElement`, for screens that move real DOM focus
    pub async fn active<D: Driver + ?Sized>(
        &self,
        driver: &D,
    ) -> TenfootResult<Option<FocusedItem>> {
        Ok(driver.active_element().await?.map(FocusedItem::from_element))
    }

    /// Wait until an element matching `target` is the focused one
    pub async fn wait_for_focus<D: Driver + ?Sized>(
        &self,
        driver: &D,
        target: &SelectorChain,
        options: &PollOptions,
    ) -> TenfootResult<WaitOutcome<FocusedItem>> {
        poll_until(&format!("focus on {target}"), options, || async {
            let Some(focused) = self.focused(driver, None).await? else {
                return Ok(None);
            };
            let candidates = target.query(driver, None).await?;
            Ok(candidates
                .iter()
                .any(|c| *c == focused.element)
                .then_some(focused))
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CommonSelectors;
    use crate::sim::SimulatedTv;
    use std::time::Duration;

    fn locator() -> FocusLocator {
        FocusLocator::new(CommonSelectors::default().focused)
    }

    mod item_tests {
        use super::*;

        #[test]
        fn test_label_prefers_text() {
            let mut element = ElementSnapshot::new("div");
            element.text = "  Netflix \n".to_string();
            element
                .attributes
                .insert("data-testid".into(), "netflix".into());
            let item = FocusedItem::from_element(element);
            assert_eq!(item.label, "Netflix");
            assert_eq!(item.identity(), (Some("netflix"), "Netflix"));
        }

        #[test]
        fn test_label_falls_back_to_aria_then_test_id() {
            let mut element = ElementSnapshot::new("button");
            element
                .attributes
                .insert("aria-label".into(), "Search".into());
            assert_eq!(FocusedItem::from_element(element).label, "Search");

            let mut element = ElementSnapshot::new("div");
            element
                .attributes
                .insert("data-testid".into(), "youtube".into());
            assert_eq!(FocusedItem::from_element(element).label, "youtube");
        }

        #[test]
        fn test_names_include_all_identifiers() {
            let mut element = ElementSnapshot::new("a");
            element.text = "Apps".into();
            element
                .attributes
                .insert("data-testid".into(), "main-menu-item-4".into());
            let item = FocusedItem::from_element(element);
            assert_eq!(item.names(), vec!["Apps", "main-menu-item-4"]);
        }
    }

    mod locator_tests {
        use super::*;

        #[tokio::test]
        async fn test_home_starts_on_first_favorite() {
            let tv = SimulatedTv::new();
            let focused = locator().focused(&tv, None).await.unwrap().unwrap();
            assert_eq!(focused.test_id.as_deref(), Some("watch-tv"));
        }

        #[tokio::test]
        async fn test_scope_without_focus_falls_back_to_page() {
            let tv = SimulatedTv::new();
            let menu = SelectorChain::parse(r#"[data-testid="main-menu"]"#);
            let focused = locator().focused(&tv, Some(&menu)).await.unwrap().unwrap();
            assert_eq!(focused.test_id.as_deref(), Some("watch-tv"));
        }

        #[tokio::test]
        async fn test_focused_within_ignores_focus_elsewhere() {
            let tv = SimulatedTv::new();
            let menu = SelectorChain::parse(r#"[data-testid="main-menu"]"#);
            assert!(locator().focused_within(&tv, &menu).await.unwrap().is_none());
            let row = SelectorChain::parse("#favourite-apps");
            let item = locator().focused_within(&tv, &row).await.unwrap().unwrap();
            assert_eq!(item.label, "Watch TV");
        }

        #[tokio::test]
        async fn test_wait_for_focus() {
            let tv = SimulatedTv::new();
            let target = SelectorChain::parse(r#"#favourite-apps > div[data-testid="watch-tv"]"#);
            let options = PollOptions::default().with_timeout(Duration::from_millis(50));
            let outcome = locator()
                .wait_for_focus(&tv, &target, &options)
                .await
                .unwrap();
            assert!(outcome.is_ready());

            let other = SelectorChain::parse(r#"[data-testid="netflix"]"#);
            let outcome = locator()
                .wait_for_focus(&tv, &other, &options)
                .await
                .unwrap();
            assert!(!outcome.is_ready());
        }
    }
}
