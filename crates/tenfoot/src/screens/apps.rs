//! Apps grid.

use super::{descend_into, AppDetailsScreen, Screen};
use crate::config::AppsSelectors;
use crate::driver::{Driver, ElementSnapshot};
use crate::focus::FocusedItem;
use crate::remote::GridPosition;
use crate::result::{TenfootError, TenfootResult};
use crate::scanner::{MatchMode, ScanOutcome, ScanPlan, Target};
use crate::selector::SelectorChain;
use crate::session::Session;
use crate::wait::TimeoutTier;
use async_trait::async_trait;

/// Tiles per row
pub const GRID_COLUMNS: usize = 5;

/// Left presses after wrapping to a new row
const ROW_RESET_MOVES: usize = GRID_COLUMNS;

/// Down presses tolerated when moving from the menu into the grid
const MAX_DESCENT: usize = 3;

/// Apps grid under the hero banner
#[derive(Debug)]
pub struct AppsScreen<'s, D: Driver> {
    session: &'s Session<D>,
}

#[async_trait]
impl<D: Driver> Screen for AppsScreen<'_, D> {
    type Driver = D;

    const NAME: &'static str = "apps";

    fn session(&self) -> &Session<D> {
        self.session
    }

    fn ready_marker(&self) -> &SelectorChain {
        &self.selectors().lists_container
    }

    fn url_fragment(&self) -> Option<&str> {
        Some(&self.session.settings().paths.apps)
    }
}

impl<'s, D: Driver> AppsScreen<'s, D> {
    /// Apps screen of `session`
    pub const fn new(session: &'s Session<D>) -> Self {
        Self { session }
    }

    fn selectors(&self) -> &'s AppsSelectors {
        &self.session.settings().selectors.apps
    }

    /// Wait for the hero banner within the long tier
    pub async fn wait_for_banner(&self) -> TenfootResult<ElementSnapshot> {
        self.session
            .wait_for_element(&self.selectors().banner, TimeoutTier::Long)
            .await
    }

    async fn tiles(&self) -> TenfootResult<Vec<ElementSnapshot>> {
        let selectors = self.selectors();
        let tiles = selectors
            .app_item
            .query(self.session.driver(), Some(&selectors.lists_container))
            .await?;
        Ok(tiles.into_iter().filter(ElementSnapshot::is_rendered).collect())
    }

    /// Names of every tile, in document order.
    ///
    /// Title elements are used when there is exactly one per tile; otherwise
    /// each tile's own text.
    pub async fn app_names(&self) -> TenfootResult<Vec<String>> {
        let selectors = self.selectors();
        let tiles = self.tiles().await?;
        let titles: Vec<ElementSnapshot> = selectors
            .app_title
            .query(self.session.driver(), Some(&selectors.lists_container))
            .await?
            .into_iter()
            .filter(ElementSnapshot::is_rendered)
            .collect();
        let source = if titles.len() == tiles.len() {
            titles
        } else {
            tiles
        };
        Ok(source.into_iter().map(|e| e.text.trim().to_string()).collect())
    }

    /// Number of tiles
    pub async fn apps_count(&self) -> TenfootResult<usize> {
        Ok(self.tiles().await?.len())
    }

    /// Name of the tile at `index`
    pub async fn app_name(&self, index: usize) -> TenfootResult<Option<String>> {
        Ok(self.app_names().await?.into_iter().nth(index))
    }

    /// First app in the grid that is not among `favorites`
    pub async fn find_non_favorite_app(&self, favorites: &[String]) -> TenfootResult<Option<String>> {
        let names = self.app_names().await?;
        Ok(names.into_iter().find(|name| {
            !favorites
                .iter()
                .any(|favorite| MatchMode::Loose.matches(name, favorite))
        }))
    }

    /// Move focus from the menu into the grid
    pub async fn enter_grid(&self) -> TenfootResult<FocusedItem> {
        descend_into(self.session, &self.selectors().lists_container, MAX_DESCENT).await
    }

    /// Scan the grid for `name`
    pub async fn navigate_to_app(&self, name: &str) -> TenfootResult<FocusedItem> {
        let outcome = self
            .scan(&Target::one(name, MatchMode::Loose), &ScanPlan::apps_grid(ROW_RESET_MOVES))
            .await?;
        outcome.item.ok_or_else(|| TenfootError::SearchExhausted {
            target: name.to_string(),
            attempts: outcome.attempts,
        })
    }

    /// Enter the grid and run `plan` inside it
    pub async fn scan(&self, target: &Target, plan: &ScanPlan) -> TenfootResult<ScanOutcome> {
        let _ = self.enter_grid().await?;
        self.session
            .scanner()
            .within(&self.selectors().lists_container)
            .scan(target, plan)
            .await
    }

    /// Scan for `name`, open it and wait for its details screen
    pub async fn navigate_to_and_select_app(
        &self,
        name: &str,
    ) -> TenfootResult<AppDetailsScreen<'s, D>> {
        let item = self.navigate_to_app(name).await?;
        tracing::info!(app = %item.label, "opening app details");
        self.session.remote().ok().await?;
        let details = AppDetailsScreen::new(self.session);
        let _ = details.wait_until_loaded().await?;
        Ok(details)
    }

    /// Walk to the tile at `index` by grid arithmetic
    pub async fn navigate_to_index(&self, index: usize) -> TenfootResult<FocusedItem> {
        let _ = self.enter_grid().await?;
        self.session
            .remote()
            .navigate_to_grid_position(
                GridPosition::new(0, 0),
                GridPosition::from_index(index, GRID_COLUMNS),
            )
            .await?;
        self.session
            .focus()
            .focused_within(self.session.driver(), &self.selectors().lists_container)
            .await?
            .ok_or_else(|| {
                TenfootError::precondition(
                    format!("app tile {index} focused"),
                    self.session.timeout_ms(TimeoutTier::Short),
                )
            })
    }
}
