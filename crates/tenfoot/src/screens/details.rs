//! App details screen.
//!
//! Unlike the grids, this screen moves real DOM focus between its buttons and
//! sets no focus attribute, so it is read through `document.activeElement`.

use super::Screen;
use crate::config::DetailsSelectors;
use crate::driver::{Driver, ElementSnapshot};
use crate::event::Direction;
use crate::result::TenfootResult;
use crate::selector::SelectorChain;
use crate::session::Session;
use crate::wait::{poll_until, TimeoutTier};
use async_trait::async_trait;
use regex::Regex;
use std::sync::LazyLock;

static ADD_TO_FAVORITES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)add.*favou?rite").expect("literal pattern"));

/// Focus reads spent looking for the add button
const BUTTON_SEARCH_BUDGET: usize = 10;

const SEARCH_CYCLE: [Direction; 4] = [
    Direction::Down,
    Direction::Right,
    Direction::Up,
    Direction::Left,
];

/// Details of one app, opened from the apps grid
#[derive(Debug)]
pub struct AppDetailsScreen<'s, D: Driver> {
    session: &'s Session<D>,
}

#[async_trait]
impl<D: Driver> Screen for AppDetailsScreen<'_, D> {
    type Driver = D;

    const NAME: &'static str = "app-details";

    fn session(&self) -> &Session<D> {
        self.session
    }

    fn ready_marker(&self) -> &SelectorChain {
        &self.selectors().container
    }

    fn load_tier(&self) -> TimeoutTier {
        TimeoutTier::Long
    }
}

impl<'s, D: Driver> AppDetailsScreen<'s, D> {
    /// Details screen of `session`
    pub const fn new(session: &'s Session<D>) -> Self {
        Self { session }
    }

    fn selectors(&self) -> &'s DetailsSelectors {
        &self.session.settings().selectors.details
    }

    /// Move DOM focus onto the "add to favourites" button. Returns whether
    /// it got there within the budget.
    pub async fn focus_add_to_favorites(&self) -> TenfootResult<bool> {
        let remote = self.session.remote();
        for attempt in 0..BUTTON_SEARCH_BUDGET {
            let active = self.session.focus().active(self.session.driver()).await?;
            if let Some(item) = active.filter(|i| i.element.tag != "body") {
                if ADD_TO_FAVORITES.is_match(&item.label) {
                    tracing::debug!(attempt, label = %item.label, "add button focused");
                    return Ok(true);
                }
            }
            remote
                .press(SEARCH_CYCLE[attempt % SEARCH_CYCLE.len()], 1)
                .await?;
        }
        tracing::warn!(budget = BUTTON_SEARCH_BUDGET, "add to favourites button not reached");
        Ok(false)
    }

    /// Add the app to favorites and confirm the position.
    ///
    /// Falls back to clicking the button when the keyboard path cannot reach
    /// it.
    pub async fn add_to_favorites(&self) -> TenfootResult<()> {
        if self.focus_add_to_favorites().await? {
            self.session.remote().ok().await?;
        } else {
            let selector = self.add_button_selector().await?;
            tracing::info!(%selector, "clicking add to favourites");
            self.session.driver().click(&selector).await?;
        }
        let _ = self.confirm_position().await?;
        Ok(())
    }

    /// `#id` of a button whose text reads like "add to favourites", else
    /// the configured button chain
    async fn add_button_selector(&self) -> TenfootResult<String> {
        let buttons = self
            .session
            .driver()
            .query_all(None, "button")
            .await?;
        let by_text = buttons
            .iter()
            .filter(|b| ADD_TO_FAVORITES.is_match(&b.text))
            .find_map(|b| b.id.as_deref().map(|id| format!("#{id}")));
        match by_text {
            Some(selector) => Ok(selector),
            None => self.session.require(&self.selectors().add_to_favorites_button).await,
        }
    }

    /// Confirm the position picker. Returns whether one was shown.
    pub async fn confirm_position(&self) -> TenfootResult<bool> {
        let modal = &self.session.settings().selectors.common.modal;
        let shown = poll_until(
            "position picker",
            &self.session.poll_options(TimeoutTier::Short),
            || async {
                Ok(modal
                    .query(self.session.driver(), None)
                    .await?
                    .into_iter()
                    .find(ElementSnapshot::is_rendered))
            },
        )
        .await?
        .is_ready();
        if !shown {
            tracing::debug!("no position picker shown, confirming anyway");
        }
        self.session.remote().ok().await?;
        if shown {
            self.session
                .wait_for_absent(modal, TimeoutTier::Medium)
                .await?;
        }
        Ok(shown)
    }

    /// Leave the details screen
    pub async fn go_back(&self) -> TenfootResult<()> {
        self.session.remote().backspace().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::sim::SimulatedTv;

    async fn details_session(tv: SimulatedTv, app: &str) -> Session<SimulatedTv> {
        let session = Session::new(tv, Settings::for_simulation());
        session.navigate(&format!("/details/{app}")).await.unwrap();
        session
    }

    #[test]
    fn test_button_pattern() {
        assert!(ADD_TO_FAVORITES.is_match("Add to Favourites"));
        assert!(ADD_TO_FAVORITES.is_match("ADD TO FAVORITES"));
        assert!(!ADD_TO_FAVORITES.is_match("In Favourites"));
    }

    #[tokio::test]
    async fn test_focus_add_button() {
        let session = details_session(SimulatedTv::new(), "twitch").await;
        let details = AppDetailsScreen::new(&session);
        details.wait_until_loaded().await.unwrap();
        assert!(details.focus_add_to_favorites().await.unwrap());
    }

    #[tokio::test]
    async fn test_add_to_favorites() {
        let session = details_session(SimulatedTv::new(), "twitch").await;
        AppDetailsScreen::new(&session)
            .add_to_favorites()
            .await
            .unwrap();
        assert_eq!(session.driver().favorites().last().map(String::as_str), Some("twitch"));
    }

    #[tokio::test]
    async fn test_already_favorite_is_unchanged() {
        let session = details_session(SimulatedTv::new(), "netflix").await;
        let details = AppDetailsScreen::new(&session);
        assert!(!details.focus_add_to_favorites().await.unwrap());
        details.add_to_favorites().await.unwrap();
        assert_eq!(session.driver().favorites().len(), 4);
    }

    #[tokio::test]
    async fn test_go_back_returns_to_grid() {
        let session = details_session(SimulatedTv::new(), "twitch").await;
        AppDetailsScreen::new(&session).go_back().await.unwrap();
        assert_eq!(session.driver().screen_name(), "apps");
    }
}
