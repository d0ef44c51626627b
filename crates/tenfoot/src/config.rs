//! Suite configuration.
//!
//! One [`Settings`] value carries everything the suite needs to know about
//! the target application: where it lives, how long each class of wait may
//! take, how fast the simulated remote presses keys, which apps may never be
//! deleted and which selectors address each screen.
//!
//! Settings are layered: built-in defaults, an optional YAML file, then
//! `TENFOOT_*` environment variables. Durations are written as integer
//! milliseconds.

use crate::result::{TenfootError, TenfootResult};
use crate::selector::SelectorChain;
use crate::wait::TimeoutTier;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default target application
pub const DEFAULT_BASE_URL: &str = "https://app.titanos.tv/";

/// Environment variable overriding [`Settings::base_url`]
pub const ENV_BASE_URL: &str = "TENFOOT_BASE_URL";
/// Environment variable overriding [`BrowserSettings::headless`]
pub const ENV_HEADLESS: &str = "TENFOOT_HEADLESS";
/// Environment variable overriding [`BrowserSettings::chromium_path`]
pub const ENV_CHROMIUM_PATH: &str = "TENFOOT_CHROMIUM_PATH";

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

/// Timeout tiers for DOM and URL assertions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timeouts {
    /// Quick checks
    #[serde(with = "millis")]
    pub short: Duration,
    /// Default element waits
    #[serde(with = "millis")]
    pub medium: Duration,
    /// Slow screens
    #[serde(with = "millis")]
    pub long: Duration,
    /// Page transitions
    #[serde(with = "millis")]
    pub navigation: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            short: Duration::from_millis(2_000),
            medium: Duration::from_millis(5_000),
            long: Duration::from_millis(10_000),
            navigation: Duration::from_millis(15_000),
        }
    }
}

impl Timeouts {
    /// Duration of a tier
    #[must_use]
    pub const fn get(&self, tier: TimeoutTier) -> Duration {
        match tier {
            TimeoutTier::Short => self.short,
            TimeoutTier::Medium => self.medium,
            TimeoutTier::Long => self.long,
            TimeoutTier::Navigation => self.navigation,
        }
    }
}

/// Remote-control timing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteDelays {
    /// Pause after every key event in a batch
    #[serde(with = "millis")]
    pub key_press_delay: Duration,
    /// Settle time after a batch or a confirm
    #[serde(with = "millis")]
    pub navigation_delay: Duration,
    /// Settle time after a long press
    #[serde(with = "millis")]
    pub long_press_delay: Duration,
    /// Time between keydown and keyup of a long press
    #[serde(with = "millis")]
    pub long_press_hold: Duration,
    /// Settle time once the loading indicator is gone
    #[serde(with = "millis")]
    pub page_settle: Duration,
    /// CSS transition allowance
    #[serde(with = "millis")]
    pub animation_settle: Duration,
}

impl Default for RemoteDelays {
    fn default() -> Self {
        Self {
            key_press_delay: Duration::from_millis(100),
            navigation_delay: Duration::from_millis(300),
            long_press_delay: Duration::from_millis(1_000),
            long_press_hold: Duration::from_millis(2_000),
            page_settle: Duration::from_millis(1_000),
            animation_settle: Duration::from_millis(500),
        }
    }
}

impl RemoteDelays {
    /// All delays zero
    #[must_use]
    pub const fn none() -> Self {
        Self {
            key_press_delay: Duration::ZERO,
            navigation_delay: Duration::ZERO,
            long_press_delay: Duration::ZERO,
            long_press_hold: Duration::ZERO,
            page_settle: Duration::ZERO,
            animation_settle: Duration::ZERO,
        }
    }
}

/// Largest accepted `polling.backoff_factor`
pub const MAX_BACKOFF_FACTOR: f64 = 10.0;

/// Condition polling cadence
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    /// First interval between checks
    #[serde(with = "millis")]
    pub initial_interval: Duration,
    /// Interval ceiling
    #[serde(with = "millis")]
    pub max_interval: Duration,
    /// Interval growth per check
    pub backoff_factor: f64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            initial_interval: Duration::from_millis(50),
            max_interval: Duration::from_millis(500),
            backoff_factor: 1.5,
        }
    }
}

/// Data assumptions about the target application
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TestData {
    /// Apps the application refuses to delete
    pub non_deletable_apps: Vec<String>,
    /// Attempts for [`crate::retry::retry_action`]
    pub max_retry_attempts: usize,
}

impl Default for TestData {
    fn default() -> Self {
        Self {
            non_deletable_apps: vec!["watch-tv".to_string(), "watch tv".to_string()],
            max_retry_attempts: 3,
        }
    }
}

/// URL fragments identifying each screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppPaths {
    /// Apps screen
    pub apps: String,
    /// Search screen
    pub search: String,
    /// Channels screen
    pub channels: String,
}

impl Default for AppPaths {
    fn default() -> Self {
        Self {
            apps: "/page/499".to_string(),
            search: "/search".to_string(),
            channels: "channels".to_string(),
        }
    }
}

/// Browser launch settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserSettings {
    /// Run without a window
    pub headless: bool,
    /// Viewport width
    pub viewport_width: u32,
    /// Viewport height
    pub viewport_height: u32,
    /// Chromium binary (None = auto-detect)
    pub chromium_path: Option<String>,
    /// Sandbox mode (disable for containers)
    pub sandbox: bool,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            headless: true,
            viewport_width: 1920,
            viewport_height: 1080,
            chromium_path: None,
            sandbox: true,
        }
    }
}

/// Selectors shared by every screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommonSelectors {
    /// Focus markers, in priority order
    pub focused: SelectorChain,
    /// Loading indicators
    pub loading: SelectorChain,
    /// Dialogs
    pub modal: SelectorChain,
    /// Dialog confirm button
    pub confirm_button: SelectorChain,
    /// Dialog cancel button
    pub cancel_button: SelectorChain,
}

impl Default for CommonSelectors {
    fn default() -> Self {
        Self {
            focused: SelectorChain::parse(
                r#"[data-focused="focused"], [data-focused="true"], [data-is-focused="true"], .focused"#,
            ),
            loading: SelectorChain::parse(".loading, .spinner, [data-loading]"),
            modal: SelectorChain::parse(".modal, .dialog, .popup"),
            confirm_button: SelectorChain::parse(".confirm, .ok, .yes"),
            cancel_button: SelectorChain::parse(".cancel, .no, .close"),
        }
    }
}

/// Main menu selectors
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationSelectors {
    /// Menu container
    pub main_menu: SelectorChain,
    /// Search entry
    pub search_button: SelectorChain,
    /// Home entry
    pub home_button: SelectorChain,
    /// TV guide entry
    pub tv_guide_button: SelectorChain,
    /// Channels entry
    pub channels_button: SelectorChain,
    /// Apps entry
    pub apps_button: SelectorChain,
}

impl Default for NavigationSelectors {
    fn default() -> Self {
        Self {
            main_menu: SelectorChain::parse(r#"[data-testid="main-menu"], nav"#),
            search_button: SelectorChain::parse(
                r#"[data-testid="main-menu-item-0"], [aria-label="Search"]"#,
            ),
            home_button: SelectorChain::parse(
                r#"[data-testid="main-menu-item-1"], [aria-label="Home"]"#,
            ),
            tv_guide_button: SelectorChain::parse(
                r#"[data-testid="main-menu-item-2"], [aria-label="TV Guide"]"#,
            ),
            channels_button: SelectorChain::parse(
                r#"[aria-label*="Channel"], [data-testid*="channel"]"#,
            ),
            apps_button: SelectorChain::parse(r#"[aria-label*="Apps"], [data-testid*="apps"]"#),
        }
    }
}

/// Home screen and favorites row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HomeSelectors {
    /// Section holding the user's apps
    pub user_apps: SelectorChain,
    /// Favorites row container (long-press target)
    pub favorites_container: SelectorChain,
    /// One favorite item
    pub favorite_item: SelectorChain,
    /// Title inside an item
    pub favorite_title: SelectorChain,
    /// Delete buttons shown in edit mode
    pub delete_button: SelectorChain,
    /// Edit mode overlay
    pub edit_overlay: SelectorChain,
}

impl Default for HomeSelectors {
    fn default() -> Self {
        Self {
            user_apps: SelectorChain::parse(r#"[data-testid="user-apps"]"#),
            favorites_container: SelectorChain::parse(
                "#favourite-apps, ._favAppsList_tcq1v_712, .favorite-apps",
            ),
            favorite_item: SelectorChain::parse(
                "#favourite-apps > div, ._favAppItem_10v6y_173, .favorite-app",
            ),
            favorite_title: SelectorChain::parse("._itemTitle_10v6y_138, .app-title, .item-title"),
            delete_button: SelectorChain::parse(
                r#"[data-testid="editmode-remove-app"], [data-testid="delete-button"], .delete-button"#,
            ),
            edit_overlay: SelectorChain::parse("._overlay_15ypj_1, .edit-overlay"),
        }
    }
}

/// Apps screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppsSelectors {
    /// Container of all app rows
    pub lists_container: SelectorChain,
    /// Hero banner shown once the screen has data
    pub banner: SelectorChain,
    /// One app tile
    pub app_item: SelectorChain,
    /// Title inside a tile
    pub app_title: SelectorChain,
}

impl Default for AppsSelectors {
    fn default() -> Self {
        Self {
            lists_container: SelectorChain::parse(
                r#"[data-testid="lists-container"], [data-testid="app-grid"], .app-grid"#,
            ),
            banner: SelectorChain::parse(r#"[data-testid="hero-banner"], .banner"#),
            app_item: SelectorChain::parse(
                r#"._listItem_10v6y_73, [data-testid="app-item"], .app-item"#,
            ),
            app_title: SelectorChain::parse("._itemTitle_10v6y_138, .app-name, .title"),
        }
    }
}

/// App details screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetailsSelectors {
    /// Screen root
    pub container: SelectorChain,
    /// "Add to Favourites" button
    pub add_to_favorites_button: SelectorChain,
}

impl Default for DetailsSelectors {
    fn default() -> Self {
        Self {
            container: SelectorChain::parse(r#"[data-testid="app-details"], #app-details"#),
            add_to_favorites_button: SelectorChain::parse(
                r#"#app-fav-button, [data-testid="add-to-favorites"], .add-favorite"#,
            ),
        }
    }
}

/// Search screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSelectors {
    /// Genre grid
    pub genres_grid: SelectorChain,
    /// One genre tile
    pub genre_item: SelectorChain,
}

impl Default for SearchSelectors {
    fn default() -> Self {
        Self {
            genres_grid: SelectorChain::parse(
                r#"#search-genres, [data-testid="category-list"], .category-list"#,
            ),
            genre_item: SelectorChain::parse(
                r#"[role="listitem"], [data-testid="category"], .category-item"#,
            ),
        }
    }
}

/// Channels screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelsSelectors {
    /// Channel grid
    pub channel_grid: SelectorChain,
    /// One channel tile
    pub channel_item: SelectorChain,
    /// Anything proving the screen rendered
    pub ready_marker: SelectorChain,
}

impl Default for ChannelsSelectors {
    fn default() -> Self {
        Self {
            channel_grid: SelectorChain::parse(
                r#"[data-testid="channel-grid"], .channel-grid, .channels"#,
            ),
            channel_item: SelectorChain::parse(
                r#"[data-testid^="channel-item"], .channel-item, .channel"#,
            ),
            ready_marker: SelectorChain::parse("[data-testid]"),
        }
    }
}

/// Every selector the suite uses, grouped by screen
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorCatalog {
    /// Shared
    pub common: CommonSelectors,
    /// Main menu
    pub navigation: NavigationSelectors,
    /// Home
    pub home: HomeSelectors,
    /// Apps
    pub apps: AppsSelectors,
    /// App details
    pub details: DetailsSelectors,
    /// Search
    pub search: SearchSelectors,
    /// Channels
    pub channels: ChannelsSelectors,
}

impl SelectorCatalog {
    fn named_chains(&self) -> Vec<(&'static str, &SelectorChain)> {
        vec![
            ("common.focused", &self.common.focused),
            ("common.loading", &self.common.loading),
            ("common.modal", &self.common.modal),
            ("common.confirm_button", &self.common.confirm_button),
            ("common.cancel_button", &self.common.cancel_button),
            ("navigation.main_menu", &self.navigation.main_menu),
            ("navigation.search_button", &self.navigation.search_button),
            ("navigation.home_button", &self.navigation.home_button),
            ("navigation.tv_guide_button", &self.navigation.tv_guide_button),
            ("navigation.channels_button", &self.navigation.channels_button),
            ("navigation.apps_button", &self.navigation.apps_button),
            ("home.user_apps", &self.home.user_apps),
            ("home.favorites_container", &self.home.favorites_container),
            ("home.favorite_item", &self.home.favorite_item),
            ("home.favorite_title", &self.home.favorite_title),
            ("home.delete_button", &self.home.delete_button),
            ("home.edit_overlay", &self.home.edit_overlay),
            ("apps.lists_container", &self.apps.lists_container),
            ("apps.banner", &self.apps.banner),
            ("apps.app_item", &self.apps.app_item),
            ("apps.app_title", &self.apps.app_title),
            ("details.container", &self.details.container),
            (
                "details.add_to_favorites_button",
                &self.details.add_to_favorites_button,
            ),
            ("search.genres_grid", &self.search.genres_grid),
            ("search.genre_item", &self.search.genre_item),
            ("channels.channel_grid", &self.channels.channel_grid),
            ("channels.channel_item", &self.channels.channel_item),
            ("channels.ready_marker", &self.channels.ready_marker),
        ]
    }
}

/// Complete suite configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Target application URL
    pub base_url: String,
    /// Assertion timeout tiers
    pub timeouts: Timeouts,
    /// Remote-control timing
    pub remote: RemoteDelays,
    /// Condition polling cadence
    pub polling: PollingConfig,
    /// Data assumptions
    pub test_data: TestData,
    /// Screen URL fragments
    pub paths: AppPaths,
    /// Browser launch
    pub browser: BrowserSettings,
    /// Where debug screenshots go
    pub artifacts_dir: PathBuf,
    /// Selector catalog
    pub selectors: SelectorCatalog,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeouts: Timeouts::default(),
            remote: RemoteDelays::default(),
            polling: PollingConfig::default(),
            test_data: TestData::default(),
            paths: AppPaths::default(),
            browser: BrowserSettings::default(),
            artifacts_dir: PathBuf::from("target/tenfoot"),
            selectors: SelectorCatalog::default(),
        }
    }
}

impl Settings {
    /// Create default settings
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Settings for the in-process simulator: no key delays and
    /// sub-second timeouts
    #[must_use]
    pub fn for_simulation() -> Self {
        Self {
            base_url: crate::sim::SIM_BASE_URL.to_string(),
            timeouts: Timeouts {
                short: Duration::from_millis(200),
                medium: Duration::from_millis(300),
                long: Duration::from_millis(500),
                navigation: Duration::from_millis(500),
            },
            remote: RemoteDelays::none(),
            polling: PollingConfig {
                initial_interval: Duration::from_millis(1),
                max_interval: Duration::from_millis(10),
                backoff_factor: 2.0,
            },
            ..Self::default()
        }
    }

    /// Set base URL
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set remote delays
    #[must_use]
    pub const fn with_remote_delays(mut self, remote: RemoteDelays) -> Self {
        self.remote = remote;
        self
    }

    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.browser.headless = headless;
        self
    }

    /// Parse YAML
    pub fn from_yaml(yaml: &str) -> TenfootResult<Self> {
        Ok(serde_yaml_ng::from_str(yaml)?)
    }

    /// Serialize to YAML
    pub fn to_yaml(&self) -> TenfootResult<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    /// Read a YAML file
    pub fn from_file(path: &Path) -> TenfootResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            TenfootError::config(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_yaml(&text)
    }

    /// Defaults or file, then environment overrides, then validation
    pub fn load(path: Option<&Path>) -> TenfootResult<Self> {
        let mut settings = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        settings.apply_env();
        settings.validate()?;
        Ok(settings)
    }

    /// Apply `TENFOOT_*` environment overrides
    pub fn apply_env(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Apply overrides from an arbitrary variable lookup
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_BASE_URL).filter(|v| !v.trim().is_empty()) {
            self.base_url = url.trim().to_string();
        }
        if let Some(headless) = lookup(ENV_HEADLESS) {
            match headless.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => self.browser.headless = true,
                "0" | "false" | "no" => self.browser.headless = false,
                other => tracing::warn!(value = other, "ignoring unrecognized {ENV_HEADLESS}"),
            }
        }
        if let Some(path) = lookup(ENV_CHROMIUM_PATH).filter(|v| !v.trim().is_empty()) {
            self.browser.chromium_path = Some(path);
        }
    }

    /// Reject settings that cannot work
    pub fn validate(&self) -> TenfootResult<()> {
        let parsed = url::Url::parse(&self.base_url)
            .map_err(|e| TenfootError::config(format!("base_url {:?}: {e}", self.base_url)))?;
        if parsed.cannot_be_a_base() {
            return Err(TenfootError::config(format!(
                "base_url {:?} cannot be a base URL",
                self.base_url
            )));
        }
        for tier in TimeoutTier::ALL {
            if self.timeouts.get(tier).is_zero() {
                return Err(TenfootError::config(format!("timeouts.{tier} must be > 0")));
            }
        }
        let factor = self.polling.backoff_factor;
        if !(1.0..=MAX_BACKOFF_FACTOR).contains(&factor) {
            return Err(TenfootError::config(format!(
                "polling.backoff_factor must be within 1.0..={MAX_BACKOFF_FACTOR}, got {factor}"
            )));
        }
        if self.polling.max_interval < self.polling.initial_interval {
            return Err(TenfootError::config(
                "polling.max_interval must be >= polling.initial_interval",
            ));
        }
        if self.polling.initial_interval.is_zero() {
            return Err(TenfootError::config("polling.initial_interval must be > 0"));
        }
        if self.test_data.max_retry_attempts == 0 {
            return Err(TenfootError::config("test_data.max_retry_attempts must be > 0"));
        }
        for (name, chain) in self.selectors.named_chains() {
            if chain.is_empty() {
                return Err(TenfootError::config(format!("selectors.{name} is empty")));
            }
        }
        Ok(())
    }

    /// Duration of a timeout tier
    #[must_use]
    pub const fn timeout(&self, tier: TimeoutTier) -> Duration {
        self.timeouts.get(tier)
    }

    /// Resolve `path` against the base URL
    pub fn url_for(&self, path: &str) -> TenfootResult<String> {
        Ok(url::Url::parse(&self.base_url)?.join(path)?.to_string())
    }

    /// Whether `app` is on the non-deletable list (loose comparison)
    #[must_use]
    pub fn is_non_deletable(&self, app: &str) -> bool {
        let app = crate::scanner::normalize_label(app);
        self.test_data
            .non_deletable_apps
            .iter()
            .any(|protected| crate::scanner::normalize_label(protected) == app)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    mod default_tests {
        use super::*;

        #[test]
        fn test_defaults_match_original_tiers() {
            let settings = Settings::default();
            assert_eq!(settings.base_url, DEFAULT_BASE_URL);
            assert_eq!(settings.timeouts.short, Duration::from_secs(2));
            assert_eq!(settings.timeouts.navigation, Duration::from_secs(15));
            assert_eq!(settings.remote.key_press_delay, Duration::from_millis(100));
            assert_eq!(settings.remote.navigation_delay, Duration::from_millis(300));
            assert_eq!(settings.test_data.max_retry_attempts, 3);
            assert!(settings.validate().is_ok());
        }

        #[test]
        fn test_simulation_settings_are_fast_and_valid() {
            let settings = Settings::for_simulation();
            assert_eq!(settings.remote, RemoteDelays::none());
            assert!(settings.timeouts.navigation < Duration::from_secs(1));
            assert!(settings.validate().is_ok());
        }

        #[test]
        fn test_non_deletable_is_loose() {
            let settings = Settings::default();
            assert!(settings.is_non_deletable("Watch TV"));
            assert!(settings.is_non_deletable("watch_tv"));
            assert!(!settings.is_non_deletable("netflix"));
        }

        #[test]
        fn test_url_for_joins_paths() {
            let settings = Settings::default();
            assert_eq!(
                settings.url_for("search?q=drama").unwrap(),
                "https://app.titanos.tv/search?q=drama"
            );
        }
    }

    mod yaml_tests {
        use super::*;

        #[test]
        fn test_partial_yaml_keeps_defaults() {
            let yaml = "base_url: http://localhost:8080/\ntimeouts:\n  short: 500\n";
            let settings = Settings::from_yaml(yaml).unwrap();
            assert_eq!(settings.base_url, "http://localhost:8080/");
            assert_eq!(settings.timeouts.short, Duration::from_millis(500));
            assert_eq!(settings.timeouts.medium, Duration::from_secs(5));
            assert_eq!(settings.selectors, SelectorCatalog::default());
        }

        #[test]
        fn test_selector_chain_from_comma_string() {
            let yaml = "selectors:\n  search:\n    genres_grid: '#genres, .genres'\n";
            let settings = Settings::from_yaml(yaml).unwrap();
            assert_eq!(
                settings.selectors.search.genres_grid.alternatives(),
                &["#genres", ".genres"]
            );
        }

        #[test]
        fn test_yaml_round_trip_of_defaults() {
            let settings = Settings::default();
            let yaml = settings.to_yaml().unwrap();
            assert!(yaml.contains("key_press_delay: 100"));
            assert_eq!(Settings::from_yaml(&yaml).unwrap(), settings);
        }

        #[test]
        fn test_example_file_matches_defaults() {
            let yaml = include_str!("../../../config/tenfoot.example.yaml");
            let settings = Settings::from_yaml(yaml).unwrap();
            assert_eq!(settings, Settings::default());
        }

        #[test]
        fn test_load_from_file() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("tenfoot.yaml");
            std::fs::write(&path, "base_url: http://tv.local/\n").unwrap();
            let settings = Settings::from_file(&path).unwrap();
            assert_eq!(settings.base_url, "http://tv.local/");
        }

        #[test]
        fn test_missing_file_is_config_error() {
            let err = Settings::from_file(Path::new("/nonexistent/tenfoot.yaml")).unwrap_err();
            assert!(matches!(err, TenfootError::Config { .. }));
        }
    }

    mod override_tests {
        use super::*;

        fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
            let map: HashMap<String, String> = vars
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect();
            move |name| map.get(name).cloned()
        }

        #[test]
        fn test_env_overrides() {
            let mut settings = Settings::default();
            settings.apply_overrides(lookup(&[
                (ENV_BASE_URL, " http://staging.tv/ "),
                (ENV_HEADLESS, "false"),
                (ENV_CHROMIUM_PATH, "/usr/bin/chromium"),
            ]));
            assert_eq!(settings.base_url, "http://staging.tv/");
            assert!(!settings.browser.headless);
            assert_eq!(
                settings.browser.chromium_path.as_deref(),
                Some("/usr/bin/chromium")
            );
        }

        #[test]
        fn test_unrecognized_headless_value_ignored() {
            let mut settings = Settings::default();
            settings.apply_overrides(lookup(&[(ENV_HEADLESS, "maybe")]));
            assert!(settings.browser.headless);
        }
    }

    mod validation_tests {
        use super::*;

        #[test]
        fn test_rejects_bad_base_url() {
            let settings = Settings::default().with_base_url("not a url");
            assert!(matches!(
                settings.validate(),
                Err(TenfootError::Config { .. })
            ));
        }

        #[test]
        fn test_rejects_zero_timeout() {
            let mut settings = Settings::default();
            settings.timeouts.medium = Duration::ZERO;
            let err = settings.validate().unwrap_err();
            assert!(err.to_string().contains("timeouts.medium"));
        }

        #[test]
        fn test_rejects_shrinking_backoff() {
            let mut settings = Settings::default();
            settings.polling.backoff_factor = 0.5;
            assert!(settings.validate().is_err());
        }

        #[test]
        fn test_rejects_unbounded_backoff() {
            let yaml = "polling:\n  initial_interval: 1\n  max_interval: 10\n  backoff_factor: .inf\n";
            let settings = Settings::from_yaml(yaml).unwrap();
            assert!(settings.polling.backoff_factor.is_infinite());
            let err = settings.validate().unwrap_err();
            assert!(err.to_string().contains("polling.backoff_factor"));

            let mut settings = Settings::default();
            settings.polling.backoff_factor = 1e300;
            assert!(settings.validate().is_err());
            settings.polling.backoff_factor = MAX_BACKOFF_FACTOR;
            assert!(settings.validate().is_ok());
        }

        #[test]
        fn test_rejects_ceiling_below_initial_interval() {
            let mut settings = Settings::default();
            settings.polling.max_interval = Duration::from_millis(10);
            assert!(settings.validate().is_err());
        }

        #[test]
        fn test_rejects_empty_selector_chain() {
            let mut settings = Settings::default();
            settings.selectors.home.delete_button = SelectorChain::parse("");
            let err = settings.validate().unwrap_err();
            assert!(err.to_string().contains("home.delete_button"));
        }
    }
}
