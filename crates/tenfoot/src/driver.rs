//! Driver - abstract browser seam.
//!
//! Everything above this module talks to the target application through the
//! [`Driver`] trait, so the same screens and scenarios run against a real
//! Chromium page ([`crate::ChromiumDriver`], `browser` feature) or the
//! in-process [`crate::sim::SimulatedTv`].
//!
//! Methods take `&self`; backends keep their mutable state behind locks so
//! that page objects can hold plain shared borrows of the session.

use crate::event::{Key, KeyEventKind};
use crate::result::TenfootResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Snapshot of one DOM element at query time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementSnapshot {
    /// Lowercase tag name
    pub tag: String,
    /// `id` attribute
    pub id: Option<String>,
    /// Class list
    pub classes: Vec<String>,
    /// All attributes
    pub attributes: BTreeMap<String, String>,
    /// Trimmed text content
    pub text: String,
    /// Has a layout box and is not hidden
    pub visible: bool,
    /// Computed opacity
    pub opacity: f64,
}

impl Default for ElementSnapshot {
    fn default() -> Self {
        Self {
            tag: "div".to_string(),
            id: None,
            classes: Vec::new(),
            attributes: BTreeMap::new(),
            text: String::new(),
            visible: true,
            opacity: 1.0,
        }
    }
}

impl ElementSnapshot {
    /// Create a snapshot with a tag name
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    /// Attribute value
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// `data-testid` attribute
    #[must_use]
    pub fn test_id(&self) -> Option<&str> {
        self.attr("data-testid")
    }

    /// Class membership
    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// Visible and not faded out (removed items linger at opacity 0)
    #[must_use]
    pub fn is_rendered(&self) -> bool {
        self.visible && self.opacity > 0.0
    }
}

/// Abstract browser automation seam
#[async_trait]
pub trait Driver: Send + Sync {
    /// Navigate to URL
    async fn goto(&self, url: &str) -> TenfootResult<()>;

    /// `window.location.href`
    async fn current_url(&self) -> TenfootResult<String>;

    /// `document.title`
    async fn title(&self) -> TenfootResult<String>;

    /// Press and release a key on the focused document
    async fn press_key(&self, key: Key) -> TenfootResult<()>;

    /// Dispatch a synthetic key event on the first element matching `target`
    async fn dispatch_key_event(
        &self,
        target: &str,
        kind: KeyEventKind,
        key: Key,
    ) -> TenfootResult<()>;

    /// All elements matching `selector` inside the first element matching
    /// `scope` (whole document when `scope` is `None`)
    async fn query_all(
        &self,
        scope: Option<&str>,
        selector: &str,
    ) -> TenfootResult<Vec<ElementSnapshot>>;

    /// `document.activeElement`
    async fn active_element(&self) -> TenfootResult<Option<ElementSnapshot>>;

    /// Click the first element matching `selector`
    async fn click(&self, selector: &str) -> TenfootResult<()>;

    /// PNG screenshot of the viewport
    async fn screenshot(&self) -> TenfootResult<Vec<u8>>;

    /// Release the page/browser
    async fn close(&self) -> TenfootResult<()>;
}
