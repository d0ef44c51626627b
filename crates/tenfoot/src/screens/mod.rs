//! Screen objects.
//!
//! One type per screen of the target application, each borrowing the
//! [`Session`] it drives. Screens are constructed where they are used and
//! hold no navigation state of their own: "which screen are we on" is always
//! answered by querying the page.
//!
//! Alternative selector sets for the same screen live in one
//! [`SelectorChain`] per element rather than in separate screen types.

mod apps;
mod channels;
mod details;
mod home;
mod menu;
mod search;

pub use apps::{AppsScreen, GRID_COLUMNS};
pub use channels::{ChannelsReport, ChannelsScreen};
pub use details::AppDetailsScreen;
pub use home::{DeletionOutcome, HomeScreen};
pub use menu::{MainMenu, MenuEntry};
pub use search::{SearchScreen, GENRE_QUERY_PARAM};

use crate::driver::{Driver, ElementSnapshot};
use crate::focus::FocusedItem;
use crate::result::{TenfootError, TenfootResult};
use crate::selector::SelectorChain;
use crate::session::Session;
use crate::wait::TimeoutTier;
use async_trait::async_trait;

/// A screen of the target application
#[async_trait]
pub trait Screen: Send + Sync {
    /// Backend the screen is driven through
    type Driver: Driver;

    /// Name used in logs
    const NAME: &'static str;

    /// The session this screen drives
    fn session(&self) -> &Session<Self::Driver>;

    /// Element whose presence means the screen is usable
    fn ready_marker(&self) -> &SelectorChain;

    /// Substring of the URL while this screen is shown, if it has one
    fn url_fragment(&self) -> Option<&str> {
        None
    }

    /// Timeout tier for [`Self::wait_until_loaded`]
    fn load_tier(&self) -> TimeoutTier {
        TimeoutTier::Medium
    }

    /// Whether the ready marker is rendered right now
    async fn is_loaded(&self) -> TenfootResult<bool> {
        let found = self
            .ready_marker()
            .query(self.session().driver(), None)
            .await?;
        Ok(found.iter().any(ElementSnapshot::is_rendered))
    }

    /// Whether the current URL contains [`Self::url_fragment`]
    async fn is_current(&self) -> TenfootResult<bool> {
        match self.url_fragment() {
            Some(fragment) => Ok(self.session().current_url().await?.contains(fragment)),
            None => self.is_loaded().await,
        }
    }

    /// Wait for the ready marker within [`Self::load_tier`]
    async fn wait_until_loaded(&self) -> TenfootResult<ElementSnapshot> {
        tracing::debug!(screen = Self::NAME, "waiting for screen");
        self.session()
            .wait_for_element(self.ready_marker(), self.load_tier())
            .await
    }
}

/// Press down until focus lands inside `container`
pub(crate) async fn descend_into<D: Driver>(
    session: &Session<D>,
    container: &SelectorChain,
    max_presses: usize,
) -> TenfootResult<FocusedItem> {
    let remote = session.remote();
    for press in 0..=max_presses {
        if let Some(item) = session
            .focus()
            .focused_within(session.driver(), container)
            .await?
        {
            tracing::debug!(%container, presses = press, label = %item.label, "focus inside container");
            return Ok(item);
        }
        if press < max_presses {
            remote.down(1).await?;
        }
    }
    Err(TenfootError::precondition(
        format!("focus inside {container} after {max_presses} down presses"),
        session.timeout_ms(TimeoutTier::Short),
    ))
}
