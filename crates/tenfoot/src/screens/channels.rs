//! Channels screen.

use super::{descend_into, Screen};
use crate::config::ChannelsSelectors;
use crate::driver::{Driver, ElementSnapshot};
use crate::result::TenfootResult;
use crate::selector::SelectorChain;
use crate::session::Session;
use crate::wait::{poll_until, TimeoutTier};
use async_trait::async_trait;
use serde::Serialize;

const MAX_DESCENT: usize = 3;

/// Result of [`ChannelsScreen::verify_accessibility`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChannelsReport {
    /// Channels listed and focus could move between them
    pub accessible: bool,
    /// Rendered channel entries
    pub channel_count: usize,
}

/// Channels screen
#[derive(Debug)]
pub struct ChannelsScreen<'s, D: Driver> {
    session: &'s Session<D>,
}

#[async_trait]
impl<D: Driver> Screen for ChannelsScreen<'_, D> {
    type Driver = D;

    const NAME: &'static str = "channels";

    fn session(&self) -> &Session<D> {
        self.session
    }

    fn ready_marker(&self) -> &SelectorChain {
        &self.selectors().ready_marker
    }

    fn url_fragment(&self) -> Option<&str> {
        Some(&self.session.settings().paths.channels)
    }

    fn load_tier(&self) -> TimeoutTier {
        TimeoutTier::Navigation
    }

    /// Any `ready_marker` element rendered within the navigation tier
    async fn is_loaded(&self) -> TenfootResult<bool> {
        let marker = self.ready_marker();
        let outcome = poll_until(
            "channels content",
            &self.session.poll_options(TimeoutTier::Navigation),
            || async {
                Ok(marker
                    .query(self.session.driver(), None)
                    .await?
                    .into_iter()
                    .find(ElementSnapshot::is_rendered))
            },
        )
        .await?;
        Ok(outcome.is_ready())
    }
}

impl<'s, D: Driver> ChannelsScreen<'s, D> {
    /// Channels screen of `session`
    pub const fn new(session: &'s Session<D>) -> Self {
        Self { session }
    }

    fn selectors(&self) -> &'s ChannelsSelectors {
        &self.session.settings().selectors.channels
    }

    /// Rendered channel entries
    pub async fn channel_count(&self) -> TenfootResult<usize> {
        let selectors = self.selectors();
        let channels = selectors
            .channel_item
            .query(self.session.driver(), Some(&selectors.channel_grid))
            .await?;
        Ok(channels.iter().filter(|c| c.is_rendered()).count())
    }

    /// Check that channels are listed and focus moves between them
    pub async fn verify_accessibility(&self) -> TenfootResult<ChannelsReport> {
        let channel_count = self.channel_count().await?;
        if channel_count == 0 {
            tracing::warn!("no channels listed");
            return Ok(ChannelsReport {
                accessible: false,
                channel_count,
            });
        }

        let grid = &self.selectors().channel_grid;
        let _ = descend_into(self.session, grid, MAX_DESCENT).await?;
        let remote = self.session.remote();
        remote.right(1).await?;
        remote.left(1).await?;
        let focused = self
            .session
            .focus()
            .focused_within(self.session.driver(), grid)
            .await?;
        tracing::info!(
            channel_count,
            focused = focused.as_ref().map(|f| f.label.as_str()),
            "channels checked"
        );
        Ok(ChannelsReport {
            accessible: focused.is_some(),
            channel_count,
        })
    }
}
