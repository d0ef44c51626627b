//! In-process simulation of the TV application.
//!
//! [`SimulatedTv`] implements [`Driver`] over a deterministic model of the
//! target: main menu, home screen with a featured row and the favorites row,
//! apps grid, app details, search genres and channels. It renders an element
//! tree on every query and answers CSS selectors against it, so screens and
//! scenarios run unchanged against it and against a real browser.
//!
//! Behaviors modeled after the real application:
//!
//! - focus markers differ per screen (`data-focused="focused"`/`"na"` on the
//!   apps grid, `"true"`/`"false"` on favorites and genres,
//!   `data-is-focused` on the featured row, a `.focused` class in the menu
//!   and on channels; app details only move `document.activeElement`)
//! - grids do not wrap: moving past an edge changes nothing
//! - a long press of Enter on `#favourite-apps` opens delete mode
//! - deleted favorites linger at opacity 0 until the next screen change,
//!   and [`SimulatedTv::with_sticky_favorites`] makes deletions silently fail
//! - a loading indicator is shown for a few queries after every navigation

mod css;
mod dom;
mod model;

pub use model::SimApp;

use crate::driver::{Driver, ElementSnapshot};
use crate::event::{Key, KeyEventKind};
use crate::result::{TenfootError, TenfootResult};
use async_trait::async_trait;
use model::TvModel;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;
use url::Url;

/// Base URL the simulator answers on by default
pub const SIM_BASE_URL: &str = "http://tenfoot.sim/";

/// Queries that still see the loading indicator after a navigation
pub const DEFAULT_LOADING_QUERIES: usize = 2;

/// 1x1 transparent PNG
const BLANK_PNG: [u8; 67] = [
    0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0x00, 0x00, 0x0d, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1f,
    0x15, 0xc4, 0x89, 0x00, 0x00, 0x00, 0x0a, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9c, 0x63, 0x00,
    0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0d, 0x0a, 0x2d, 0xb4, 0x00, 0x00, 0x00, 0x00, 0x49,
    0x45, 0x4e, 0x44, 0xae, 0x42, 0x60, 0x82,
];

#[derive(Debug)]
struct SimState {
    model: TvModel,
    key_log: Vec<Key>,
    loading_queries: usize,
    loading_left: usize,
    long_press_threshold: Duration,
    enter_held_since: Option<Instant>,
    closed: bool,
}

impl SimState {
    fn navigated(&mut self) {
        self.loading_left = self.loading_queries;
    }

    fn press(&mut self, key: Key) {
        self.key_log.push(key);
        if self.model.press(key) {
            self.navigated();
        }
    }
}

/// Simulated TV application
#[derive(Debug)]
pub struct SimulatedTv {
    state: Mutex<SimState>,
}

impl Default for SimulatedTv {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedTv {
    /// Application on its home screen at [`SIM_BASE_URL`]
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SimState {
                model: TvModel::new(SIM_BASE_URL.trim_end_matches('/').to_string()),
                key_log: Vec::new(),
                loading_queries: DEFAULT_LOADING_QUERIES,
                loading_left: 0,
                long_press_threshold: Duration::ZERO,
                enter_held_since: None,
                closed: false,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the favorites row (first entry is `watch-tv` by default)
    #[must_use]
    pub fn with_favorites(self, names: &[&str]) -> Self {
        self.lock()
            .model
            .set_favorites(names.iter().map(|n| SimApp::named(n)).collect());
        self
    }

    /// Replace the apps grid
    #[must_use]
    pub fn with_catalog(self, names: &[&str]) -> Self {
        self.lock()
            .model
            .set_catalog(names.iter().map(|n| SimApp::named(n)).collect());
        self
    }

    /// Replace the search genres
    #[must_use]
    pub fn with_genres(self, genres: &[&str]) -> Self {
        self.lock()
            .model
            .set_genres(genres.iter().map(|g| (*g).to_string()).collect());
        self
    }

    /// Remove buttons still respond, but no favorite is ever removed
    #[must_use]
    pub fn with_sticky_favorites(self) -> Self {
        self.lock().model.sticky_favorites = true;
        self
    }

    /// Queries that see the loading indicator after each navigation
    #[must_use]
    pub fn with_loading_queries(self, queries: usize) -> Self {
        self.lock().loading_queries = queries;
        self
    }

    /// Minimum Enter hold that opens delete mode
    #[must_use]
    pub fn with_long_press_threshold(self, threshold: Duration) -> Self {
        self.lock().long_press_threshold = threshold;
        self
    }

    /// Every key received through [`Driver::press_key`] or a synthetic
    /// keydown, in order
    #[must_use]
    pub fn key_log(&self) -> Vec<Key> {
        self.lock().key_log.clone()
    }

    /// Identifiers of the favorites still in the row
    #[must_use]
    pub fn favorites(&self) -> Vec<String> {
        self.lock()
            .model
            .live_favorites()
            .into_iter()
            .map(|app| app.id.clone())
            .collect()
    }

    /// Name of the current screen
    #[must_use]
    pub fn screen_name(&self) -> &'static str {
        self.lock().model.screen.name()
    }

    /// Whether the favorites row is in delete mode
    #[must_use]
    pub fn is_delete_mode(&self) -> bool {
        self.lock().model.delete_mode
    }

    /// Whether [`Driver::close`] was called
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }
}

#[async_trait]
impl Driver for SimulatedTv {
    async fn goto(&self, url: &str) -> TenfootResult<()> {
        let parsed = Url::parse(url).map_err(|e| TenfootError::Navigation {
            url: url.to_string(),
            message: e.to_string(),
        })?;
        let mut state = self.lock();
        state.model.goto(&parsed);
        state.navigated();
        tracing::debug!(url, screen = state.model.screen.name(), "sim: goto");
        Ok(())
    }

    async fn current_url(&self) -> TenfootResult<String> {
        Ok(self.lock().model.url())
    }

    async fn title(&self) -> TenfootResult<String> {
        Ok(self.lock().model.title())
    }

    async fn press_key(&self, key: Key) -> TenfootResult<()> {
        self.lock().press(key);
        Ok(())
    }

    async fn dispatch_key_event(
        &self,
        target: &str,
        kind: KeyEventKind,
        key: Key,
    ) -> TenfootResult<()> {
        let mut state = self.lock();
        let rendered = state.model.render(state.loading_left > 0);
        let Some(&node) = css::query_all(&rendered.dom, None, target)?.first() else {
            return Err(TenfootError::ElementNotFound {
                selector: target.to_string(),
            });
        };
        let on_favorites = rendered.dom.node(node).attr("id") == Some("favourite-apps");

        match (kind, key) {
            (KeyEventKind::KeyDown, Key::Enter) if on_favorites => {
                state.enter_held_since = Some(Instant::now());
            }
            (KeyEventKind::KeyUp, Key::Enter) if on_favorites => {
                if let Some(since) = state.enter_held_since.take() {
                    let held = since.elapsed();
                    if held >= state.long_press_threshold {
                        tracing::debug!(?held, "sim: long press opens delete mode");
                        state.model.long_press();
                    } else {
                        state.press(Key::Enter);
                    }
                }
            }
            (KeyEventKind::KeyDown, key) => state.press(key),
            (KeyEventKind::KeyUp, _) => {}
        }
        Ok(())
    }

    async fn query_all(
        &self,
        scope: Option<&str>,
        selector: &str,
    ) -> TenfootResult<Vec<ElementSnapshot>> {
        let mut state = self.lock();
        let loading = state.loading_left > 0;
        state.loading_left = state.loading_left.saturating_sub(1);
        let rendered = state.model.render(loading);
        Ok(css::query_all(&rendered.dom, scope, selector)?
            .into_iter()
            .map(|i| rendered.dom.snapshot(i))
            .collect())
    }

    async fn active_element(&self) -> TenfootResult<Option<ElementSnapshot>> {
        let state = self.lock();
        let rendered = state.model.render(state.loading_left > 0);
        let index = rendered.active.unwrap_or(dom::Dom::BODY);
        Ok(Some(rendered.dom.snapshot(index)))
    }

    async fn click(&self, selector: &str) -> TenfootResult<()> {
        let mut state = self.lock();
        let rendered = state.model.render(state.loading_left > 0);
        let Some(&node) = css::query_all(&rendered.dom, None, selector)?.first() else {
            return Err(TenfootError::ElementNotFound {
                selector: selector.to_string(),
            });
        };
        if let Some(focus) = rendered.focus_of(node) {
            if state.model.activate(focus) {
                state.navigated();
            }
        }
        Ok(())
    }

    async fn screenshot(&self) -> TenfootResult<Vec<u8>> {
        Ok(BLANK_PNG.to_vec())
    }

    async fn close(&self) -> TenfootResult<()> {
        self.lock().closed = true;
        Ok(())
    }
}
