//! Main menu bar.

use crate::config::{AppPaths, NavigationSelectors};
use crate::driver::{Driver, ElementSnapshot};
use crate::event::Direction;
use crate::focus::FocusedItem;
use crate::result::{TenfootError, TenfootResult};
use crate::scanner::{ExhaustionPolicy, MatchMode, ScanPlan, Target};
use crate::selector::SelectorChain;
use crate::session::Session;
use crate::wait::TimeoutTier;
use serde::{Deserialize, Serialize};

/// Up presses tolerated after the initial two when looking for the menu
const MAX_EXTRA_CLIMB: usize = 5;

/// Entries of the main menu
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MenuEntry {
    /// Search screen
    Search,
    /// Home screen
    Home,
    /// Programme guide
    TvGuide,
    /// Channels screen
    Channels,
    /// Apps grid
    Apps,
}

impl MenuEntry {
    /// Every entry, left to right
    pub const ALL: [Self; 5] = [
        Self::Search,
        Self::Home,
        Self::TvGuide,
        Self::Channels,
        Self::Apps,
    ];

    /// Label shown in the menu
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Search => "Search",
            Self::Home => "Home",
            Self::TvGuide => "TV Guide",
            Self::Channels => "Channels",
            Self::Apps => "Apps",
        }
    }

    /// Configured selector for this entry's button
    #[must_use]
    pub const fn button(self, selectors: &NavigationSelectors) -> &SelectorChain {
        match self {
            Self::Search => &selectors.search_button,
            Self::Home => &selectors.home_button,
            Self::TvGuide => &selectors.tv_guide_button,
            Self::Channels => &selectors.channels_button,
            Self::Apps => &selectors.apps_button,
        }
    }

    /// URL substring expected after opening this entry
    #[must_use]
    pub fn path(self, paths: &AppPaths) -> Option<&str> {
        match self {
            Self::Search => Some(&paths.search),
            Self::Channels => Some(&paths.channels),
            Self::Apps => Some(&paths.apps),
            Self::Home | Self::TvGuide => None,
        }
    }
}

impl std::fmt::Display for MenuEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// The menu bar at the top of every top-level screen
#[derive(Debug)]
pub struct MainMenu<'s, D: Driver> {
    session: &'s Session<D>,
}

impl<'s, D: Driver> MainMenu<'s, D> {
    /// Menu of `session`
    pub const fn new(session: &'s Session<D>) -> Self {
        Self { session }
    }

    /// Whether focus is currently inside the menu
    pub async fn has_focus(&self) -> TenfootResult<bool> {
        Ok(self.focused().await?.is_some())
    }

    /// The focused menu entry, if focus is in the menu
    pub async fn focused(&self) -> TenfootResult<Option<FocusedItem>> {
        self.session
            .focus()
            .focused_within(
                self.session.driver(),
                &self.session.settings().selectors.navigation.main_menu,
            )
            .await
    }

    /// Climb into the menu bar
    pub async fn enter(&self) -> TenfootResult<FocusedItem> {
        let remote = self.session.remote();
        remote.up(2).await?;
        for _ in 0..MAX_EXTRA_CLIMB {
            if let Some(item) = self.focused().await? {
                return Ok(item);
            }
            remote.up(1).await?;
        }
        self.focused().await?.ok_or_else(|| {
            TenfootError::precondition(
                "focus in main menu",
                self.session.timeout_ms(TimeoutTier::Short),
            )
        })
    }

    /// What focus must land on to open `entry`.
    ///
    /// A rendered button with a test id is matched by that id alone. Without
    /// one the entry label and the button's aria-label are compared.
    pub async fn target_for(&self, entry: MenuEntry) -> TenfootResult<Target> {
        let navigation = &self.session.settings().selectors.navigation;
        let buttons = entry
            .button(navigation)
            .query(self.session.driver(), Some(&navigation.main_menu))
            .await?;
        let button = buttons.iter().find(|b| b.is_rendered());
        if let Some(test_id) = button.and_then(ElementSnapshot::test_id) {
            return Ok(Target::one(test_id, MatchMode::Exact));
        }
        let mut names = vec![entry.label().to_string()];
        names.extend(button.and_then(|b| b.attr("aria-label")).map(str::to_string));
        tracing::debug!(%entry, ?names, "menu button not found by selector, matching labels");
        Ok(Target::any_of(names, MatchMode::IgnoreCase))
    }

    /// Move to `entry`, press OK and wait for the new screen
    pub async fn open(&self, entry: MenuEntry) -> TenfootResult<()> {
        tracing::info!(%entry, "opening from main menu");
        let _ = self.enter().await?;

        let menu = &self.session.settings().selectors.navigation.main_menu;
        let scanner = self.session.scanner().within(menu);
        let target = self.target_for(entry).await?;
        let rightward = scanner
            .scan(
                &target,
                &ScanPlan::linear(Direction::Right, ExhaustionPolicy::SettleForCurrent),
            )
            .await?;
        if !rightward.matched {
            let _ = scanner
                .scan(
                    &target,
                    &ScanPlan::linear(Direction::Left, ExhaustionPolicy::Fail),
                )
                .await?;
        }

        self.session.remote().ok().await?;
        self.session.wait_for_page_load().await?;
        if let Some(path) = entry.path(&self.session.settings().paths) {
            let _ = self
                .session
                .wait_for_url_contains(path, TimeoutTier::Navigation)
                .await?;
        }
        Ok(())
    }
}
