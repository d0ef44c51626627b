//! Home screen and the favorites row.
//!
//! The favorites row is ordered and its first entry is the sentinel app,
//! which the application refuses to remove. Deleting goes through delete
//! mode: a long press of Enter on the row shows a remove button under every
//! deletable favorite and an edit overlay over the rest of the screen.
//!
//! Removed items may linger in the DOM at opacity 0 for a while, so every
//! read here counts rendered items only.

use super::{descend_into, AppsScreen, ChannelsScreen, MainMenu, MenuEntry, Screen, SearchScreen};
use crate::config::HomeSelectors;
use crate::driver::{Driver, ElementSnapshot};
use crate::event::Direction;
use crate::focus::FocusedItem;
use crate::result::{TenfootError, TenfootResult};
use crate::selector::SelectorChain;
use crate::session::Session;
use crate::wait::{poll_until, TimeoutTier};
use async_trait::async_trait;
use serde::Serialize;

/// Down presses tolerated when moving from the menu to the favorites row
const MAX_DESCENT: usize = 4;

/// What a delete attempt did to the favorites row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeletionOutcome {
    /// Identifier that disappeared, if any
    pub removed: Option<String>,
    /// Favorites before the attempt
    pub before: usize,
    /// Favorites after the attempt
    pub after: usize,
}

impl DeletionOutcome {
    /// Whether the row shrank
    #[must_use]
    pub const fn changed(&self) -> bool {
        self.after < self.before
    }
}

/// Home screen
#[derive(Debug)]
pub struct HomeScreen<'s, D: Driver> {
    session: &'s Session<D>,
}

#[async_trait]
impl<D: Driver> Screen for HomeScreen<'_, D> {
    type Driver = D;

    const NAME: &'static str = "home";

    fn session(&self) -> &Session<D> {
        self.session
    }

    fn ready_marker(&self) -> &SelectorChain {
        &self.selectors().favorites_container
    }
}

impl<'s, D: Driver> HomeScreen<'s, D> {
    /// Home screen of `session`
    pub const fn new(session: &'s Session<D>) -> Self {
        Self { session }
    }

    fn selectors(&self) -> &'s HomeSelectors {
        &self.session.settings().selectors.home
    }

    async fn rendered_items(&self) -> TenfootResult<Vec<ElementSnapshot>> {
        let selectors = self.selectors();
        let items = selectors
            .favorite_item
            .query(self.session.driver(), Some(&selectors.favorites_container))
            .await?;
        Ok(items.into_iter().filter(ElementSnapshot::is_rendered).collect())
    }

    // =========================================================================
    // READS
    // =========================================================================

    /// Identifiers of the favorites, in row order
    pub async fn favorite_apps(&self) -> TenfootResult<Vec<String>> {
        Ok(self
            .rendered_items()
            .await?
            .into_iter()
            .map(|item| {
                item.test_id()
                    .map_or_else(|| item.text.trim().to_string(), str::to_string)
            })
            .collect())
    }

    /// Visible titles of the favorites
    pub async fn favorite_titles(&self) -> TenfootResult<Vec<String>> {
        let selectors = self.selectors();
        let titles = selectors
            .favorite_title
            .query(self.session.driver(), Some(&selectors.favorites_container))
            .await?;
        Ok(titles
            .into_iter()
            .filter(ElementSnapshot::is_rendered)
            .map(|t| t.text.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect())
    }

    /// Number of favorites
    pub async fn favorite_count(&self) -> TenfootResult<usize> {
        Ok(self.rendered_items().await?.len())
    }

    /// Whether `app` is on the non-deletable list
    pub fn is_protected(&self, app: &str) -> bool {
        self.session.settings().is_non_deletable(app)
    }

    // =========================================================================
    // NAVIGATION
    // =========================================================================

    /// Open the apps grid from the menu
    pub async fn navigate_to_apps(&self) -> TenfootResult<AppsScreen<'s, D>> {
        MainMenu::new(self.session).open(MenuEntry::Apps).await?;
        Ok(AppsScreen::new(self.session))
    }

    /// Open the channels screen from the menu
    pub async fn navigate_to_channels(&self) -> TenfootResult<ChannelsScreen<'s, D>> {
        MainMenu::new(self.session)
            .open(MenuEntry::Channels)
            .await?;
        Ok(ChannelsScreen::new(self.session))
    }

    /// Open the search screen from the menu
    pub async fn navigate_to_search(&self) -> TenfootResult<SearchScreen<'s, D>> {
        MainMenu::new(self.session).open(MenuEntry::Search).await?;
        Ok(SearchScreen::new(self.session))
    }

    /// Move focus to the favorite at `index`
    pub async fn focus_favorite(&self, index: usize) -> TenfootResult<FocusedItem> {
        let container = &self.selectors().favorites_container;
        let _ = descend_into(self.session, container, MAX_DESCENT).await?;
        let count = self.favorite_count().await?;
        let remote = self.session.remote();
        remote.left(count).await?;
        remote.smart_navigate(Direction::Right, index, true).await?;
        let item = self
            .session
            .focus()
            .focused_within(self.session.driver(), container)
            .await?
            .ok_or_else(|| {
                TenfootError::precondition(
                    format!("favorite {index} focused"),
                    self.session.timeout_ms(TimeoutTier::Short),
                )
            })?;
        tracing::debug!(index, label = %item.label, "favorite focused");
        Ok(item)
    }

    // =========================================================================
    // DELETE MODE
    // =========================================================================

    /// Long-press Enter on the favorites row, keeping the current focus.
    /// Returns whether delete mode showed up within the short tier.
    pub async fn activate_delete_mode(&self) -> TenfootResult<bool> {
        let target = self
            .session
            .require(&self.selectors().favorites_container)
            .await?;
        self.session.remote().long_press(&target).await?;
        let outcome = poll_until(
            "delete mode",
            &self.session.poll_options(TimeoutTier::Short),
            || async { Ok(self.is_delete_mode_active().await?.then_some(())) },
        )
        .await?;
        if !outcome.is_ready() {
            tracing::warn!("delete mode did not appear after long press");
        }
        Ok(outcome.is_ready())
    }

    /// Remove buttons present and the edit overlay visible
    pub async fn is_delete_mode_active(&self) -> TenfootResult<bool> {
        let driver = self.session.driver();
        let selectors = self.selectors();
        if !selectors.delete_button.exists(driver).await? {
            return Ok(false);
        }
        Ok(selectors
            .edit_overlay
            .query(driver, None)
            .await?
            .iter()
            .any(ElementSnapshot::is_rendered))
    }

    /// Move to the focused favorite's remove button and press it
    pub async fn confirm_delete_favorite(&self) -> TenfootResult<()> {
        let remote = self.session.remote();
        remote.down(1).await?;
        remote.ok().await
    }

    /// Leave delete mode
    pub async fn exit_delete_mode(&self) -> TenfootResult<()> {
        self.session.remote().back().await
    }

    /// Try to delete the favorite at `index`.
    ///
    /// The row is re-read until it shrinks or the medium tier elapses. A row
    /// that never shrinks is reported through the outcome rather than as an
    /// error; callers decide whether that is a failure.
    pub async fn delete_favorite_at(&self, index: usize) -> TenfootResult<DeletionOutcome> {
        let before_apps = self.favorite_apps().await?;
        let before = before_apps.len();
        let Some(target) = before_apps.get(index) else {
            return Err(TenfootError::precondition(
                format!("favorite at index {index} (row has {before})"),
                self.session.timeout_ms(TimeoutTier::Medium),
            ));
        };
        tracing::info!(index, app = %target, "deleting favorite");

        let _ = self.focus_favorite(index).await?;
        if !self.is_delete_mode_active().await? {
            let _ = self.activate_delete_mode().await?;
        }
        self.confirm_delete_favorite().await?;

        let shrunk = poll_until(
            "favorites row shrinks",
            &self.session.poll_options(TimeoutTier::Medium),
            || async {
                let count = self.favorite_count().await?;
                Ok((count < before).then_some(()))
            },
        )
        .await?
        .is_ready();

        let after_apps = self.favorite_apps().await?;
        let removed = if shrunk {
            before_apps.iter().find(|app| !after_apps.contains(app)).cloned()
        } else {
            tracing::warn!(app = %target, "favorites row unchanged after delete");
            None
        };
        self.exit_delete_mode().await?;

        Ok(DeletionOutcome {
            removed,
            before,
            after: after_apps.len(),
        })
    }
}
