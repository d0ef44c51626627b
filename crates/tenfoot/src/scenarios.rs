//! End-to-end scenarios.
//!
//! Every scenario follows the same shape: capture a baseline, drive the
//! screens, capture the final state, assert one relation between the two.
//! A failing scenario is reported, never recovered: no rollback is
//! attempted and the next scenario starts from the home screen again.

use crate::driver::Driver;
use crate::event::Direction;
use crate::focus::FocusedItem;
use crate::result::{ensure, FailureKind, TenfootError, TenfootResult};
use crate::scanner::{ExhaustionPolicy, MatchMode, ScanPlan, ScanStrategy, Target};
use crate::screens::{AppDetailsScreen, HomeScreen, Screen};
use crate::session::Session;
use crate::wait::TimeoutTier;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Instant;

/// Scripted walk used when the apps grid scan cannot find the candidate
const FALLBACK_PATTERN: [Direction; 5] = [
    Direction::Right,
    Direction::Right,
    Direction::Right,
    Direction::Right,
    Direction::Down,
];

// =============================================================================
// SCENARIO KINDS
// =============================================================================

/// The end-to-end scenarios
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScenarioKind {
    /// Adding a non-favorite app grows the favorites row by one
    AddAppToFavorites,
    /// Deleting the second favorite shrinks the row by one
    DeleteFavoriteApp,
    /// The first favorite cannot be deleted
    SentinelNotDeletable,
    /// Selecting a genre puts it in the URL
    OpenCategoryFromSearch,
    /// The channels screen opens and lists channels
    ChannelsPageAvailable,
    /// The apps screen opens
    AppsPageAvailable,
    /// The search screen opens
    SearchPageAvailable,
}

impl ScenarioKind {
    /// Every scenario, in run order
    #[must_use]
    pub const fn all() -> [Self; 7] {
        [
            Self::AddAppToFavorites,
            Self::DeleteFavoriteApp,
            Self::SentinelNotDeletable,
            Self::OpenCategoryFromSearch,
            Self::ChannelsPageAvailable,
            Self::AppsPageAvailable,
            Self::SearchPageAvailable,
        ]
    }

    /// Kebab-case name
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::AddAppToFavorites => "add-app-to-favorites",
            Self::DeleteFavoriteApp => "delete-favorite-app",
            Self::SentinelNotDeletable => "sentinel-not-deletable",
            Self::OpenCategoryFromSearch => "open-category-from-search",
            Self::ChannelsPageAvailable => "channels-page-available",
            Self::AppsPageAvailable => "apps-page-available",
            Self::SearchPageAvailable => "search-page-available",
        }
    }

    /// One-line description
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::AddAppToFavorites => "add an app from the apps grid to favorites",
            Self::DeleteFavoriteApp => "delete the second favorite in delete mode",
            Self::SentinelNotDeletable => "the first favorite survives a delete attempt",
            Self::OpenCategoryFromSearch => "a random genre from search ends up in the URL",
            Self::ChannelsPageAvailable => "channels screen opens and lists channels",
            Self::AppsPageAvailable => "apps screen opens from the menu",
            Self::SearchPageAvailable => "search screen opens from the menu",
        }
    }
}

impl std::fmt::Display for ScenarioKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ScenarioKind {
    type Err = TenfootError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::all()
            .into_iter()
            .find(|kind| kind.name() == wanted)
            .ok_or_else(|| TenfootError::config(format!("unknown scenario {s:?}")))
    }
}

// =============================================================================
// REPORT
// =============================================================================

/// Result of one scenario
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScenarioReport {
    /// Which scenario
    pub scenario: ScenarioKind,
    /// Whether the asserted relation held
    pub passed: bool,
    /// Wall time
    pub duration_ms: u64,
    /// Failure class when failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_kind: Option<FailureKind>,
    /// Error message when failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Observations made along the way
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

// =============================================================================
// RUNNER
// =============================================================================

/// Run one scenario and report how it went. Never fails: errors become a
/// failed report.
pub async fn run_scenario<D: Driver, R: Rng>(
    session: &Session<D>,
    kind: ScenarioKind,
    rng: &mut R,
) -> ScenarioReport {
    tracing::info!(scenario = %kind, "scenario start");
    let start = Instant::now();
    let mut notes = Vec::new();

    let result = match kind {
        ScenarioKind::AddAppToFavorites => add_app_to_favorites(session, &mut notes).await,
        ScenarioKind::DeleteFavoriteApp => delete_favorite_app(session, &mut notes).await,
        ScenarioKind::SentinelNotDeletable => sentinel_not_deletable(session, &mut notes).await,
        ScenarioKind::OpenCategoryFromSearch => {
            open_category_from_search(session, rng, &mut notes).await
        }
        ScenarioKind::ChannelsPageAvailable => channels_page_available(session, &mut notes).await,
        ScenarioKind::AppsPageAvailable => apps_page_available(session, &mut notes).await,
        ScenarioKind::SearchPageAvailable => search_page_available(session, &mut notes).await,
    };
    let duration_ms = start.elapsed().as_millis() as u64;

    match result {
        Ok(()) => {
            tracing::info!(scenario = %kind, duration_ms, "scenario passed");
            ScenarioReport {
                scenario: kind,
                passed: true,
                duration_ms,
                failure_kind: None,
                error: None,
                notes,
            }
        }
        Err(err) => {
            tracing::error!(scenario = %kind, kind = %err.kind(), error = %err, "scenario failed");
            capture_diagnostics(session, kind, &mut notes).await;
            ScenarioReport {
                scenario: kind,
                passed: false,
                duration_ms,
                failure_kind: Some(err.kind()),
                error: Some(err.to_string()),
                notes,
            }
        }
    }
}

/// Run `kinds` in order on one session, stopping at the first failure when
/// `fail_fast` is set
pub async fn run_scenarios<D: Driver, R: Rng>(
    session: &Session<D>,
    kinds: &[ScenarioKind],
    rng: &mut R,
    fail_fast: bool,
) -> Vec<ScenarioReport> {
    let mut reports = Vec::with_capacity(kinds.len());
    for &kind in kinds {
        let report = run_scenario(session, kind, rng).await;
        let failed = !report.passed;
        reports.push(report);
        if failed && fail_fast {
            break;
        }
    }
    reports
}

async fn capture_diagnostics<D: Driver>(
    session: &Session<D>,
    kind: ScenarioKind,
    notes: &mut Vec<String>,
) {
    if let Err(err) = session.log_debug_info(&format!("{kind} failed")).await {
        tracing::warn!(error = %err, "could not read focus for diagnostics");
    }
    match session.take_debug_screenshot(kind.name()).await {
        Ok(path) => notes.push(format!("screenshot: {}", path.display())),
        Err(err) => tracing::warn!(error = %err, "could not save screenshot"),
    }
}

async fn open_home<'s, D: Driver>(session: &'s Session<D>) -> TenfootResult<HomeScreen<'s, D>> {
    session.open_home().await?;
    let home = HomeScreen::new(session);
    let _ = home.wait_until_loaded().await?;
    Ok(home)
}

// =============================================================================
// SCENARIOS
// =============================================================================

async fn add_app_to_favorites<D: Driver>(
    session: &Session<D>,
    notes: &mut Vec<String>,
) -> TenfootResult<()> {
    let home = open_home(session).await?;
    let before = home.favorite_apps().await?;
    notes.push(format!("favorites before: {}", before.join(", ")));

    let apps = home.navigate_to_apps().await?;
    let _ = apps.wait_until_loaded().await?;
    let _ = apps.wait_for_banner().await?;
    let candidate = apps.find_non_favorite_app(&before).await?.ok_or_else(|| {
        TenfootError::precondition(
            "an app that is not yet a favorite",
            session.timeout_ms(TimeoutTier::Long),
        )
    })?;

    let chosen = match apps.navigate_to_app(&candidate).await {
        Ok(item) => item.label,
        Err(TenfootError::SearchExhausted { attempts, .. }) => {
            tracing::warn!(%candidate, attempts, "candidate not reached, using scripted walk");
            let plan = ScanPlan {
                strategy: ScanStrategy::Pattern {
                    moves: FALLBACK_PATTERN.to_vec(),
                },
                max_attempts: 15,
                on_exhausted: ExhaustionPolicy::SettleForCurrent,
            };
            let outcome = apps
                .scan(&Target::one(candidate.as_str(), MatchMode::Loose), &plan)
                .await?;
            let item = outcome
                .item
                .filter(|item| !is_listed(item, &before))
                .ok_or_else(|| TenfootError::SearchExhausted {
                    target: candidate.clone(),
                    attempts: outcome.attempts,
                })?;
            notes.push(format!("scan fell back to {:?}", item.label));
            item.label
        }
        Err(err) => return Err(err),
    };
    notes.push(format!("adding {chosen}"));

    session.remote().ok().await?;
    let details = AppDetailsScreen::new(session);
    let _ = details.wait_until_loaded().await?;
    details.add_to_favorites().await?;
    details.go_back().await?;

    let home = open_home(session).await?;
    let after = home.favorite_apps().await?;
    notes.push(format!("favorites after: {}", after.join(", ")));

    verify_added(&before, &after, &chosen)
}

/// Whether the focused tile is one of `favorites`
fn is_listed(item: &FocusedItem, favorites: &[String]) -> bool {
    favorites.iter().any(|favorite| {
        item.test_id.as_deref() == Some(favorite.as_str())
            || MatchMode::Loose.matches(&item.label, favorite)
    })
}

/// Exactly one favorite appeared and it is `chosen`
fn verify_added(before: &[String], after: &[String], chosen: &str) -> TenfootResult<()> {
    ensure(after.len() == before.len() + 1, || {
        format!(
            "favorites count should grow from {} to {}, got {}",
            before.len(),
            before.len() + 1,
            after.len()
        )
    })?;
    let added: Vec<&String> = after.iter().filter(|id| !before.contains(id)).collect();
    ensure(added.len() == 1, || {
        format!("expected one new favorite, found {added:?}")
    })?;
    ensure(MatchMode::Loose.matches(added[0], chosen), || {
        format!("added {:?} but {chosen:?} was chosen", added[0])
    })
}

async fn delete_favorite_app<D: Driver>(
    session: &Session<D>,
    notes: &mut Vec<String>,
) -> TenfootResult<()> {
    let home = open_home(session).await?;
    let before = home.favorite_apps().await?;
    let Some(target) = before.get(1).cloned() else {
        return Err(TenfootError::precondition(
            "at least two favorites",
            session.timeout_ms(TimeoutTier::Medium),
        ));
    };
    if home.is_protected(&target) {
        return Err(TenfootError::precondition(
            format!("deletable favorite at index 1 (found {target})"),
            0,
        ));
    }
    notes.push(format!("deleting {target}"));

    let outcome = home.delete_favorite_at(1).await?;
    let after = home.favorite_apps().await?;
    notes.push(format!("favorites after: {}", after.join(", ")));

    ensure(outcome.after + 1 == outcome.before, || {
        format!(
            "favorites count should shrink from {} to {}, got {}",
            outcome.before,
            outcome.before.saturating_sub(1),
            outcome.after
        )
    })?;
    ensure(!after.contains(&target), || {
        format!("{target:?} still in favorites {after:?}")
    })
}

async fn sentinel_not_deletable<D: Driver>(
    session: &Session<D>,
    notes: &mut Vec<String>,
) -> TenfootResult<()> {
    let home = open_home(session).await?;
    let before = home.favorite_apps().await?;
    let Some(sentinel) = before.first().cloned() else {
        return Err(TenfootError::precondition(
            "a sentinel favorite",
            session.timeout_ms(TimeoutTier::Medium),
        ));
    };
    notes.push(format!("sentinel: {sentinel}"));

    let outcome = home.delete_favorite_at(0).await?;
    let after = home.favorite_apps().await?;

    ensure(outcome.after == outcome.before, || {
        format!(
            "favorites count changed from {} to {} deleting the sentinel",
            outcome.before, outcome.after
        )
    })?;
    ensure(after.first() == Some(&sentinel), || {
        format!("first favorite changed from {sentinel:?} to {:?}", after.first())
    })
}

async fn open_category_from_search<D: Driver, R: Rng>(
    session: &Session<D>,
    rng: &mut R,
    notes: &mut Vec<String>,
) -> TenfootResult<()> {
    let home = open_home(session).await?;
    let search = home.navigate_to_search().await?;
    let _ = search.wait_for_genres_grid().await?;
    let genre = search.select_random_genre(rng).await?;
    notes.push(format!("genre: {genre}"));

    let _ = session
        .wait_for_url_contains("q=", TimeoutTier::Navigation)
        .await?;
    let selected = search.selected_genre_from_url().await?;
    ensure(
        selected
            .as_deref()
            .is_some_and(|q| q.to_lowercase() == genre.to_lowercase()),
        || format!("URL query {selected:?} should be {genre:?}"),
    )
}

async fn channels_page_available<D: Driver>(
    session: &Session<D>,
    notes: &mut Vec<String>,
) -> TenfootResult<()> {
    let home = open_home(session).await?;
    let channels = home.navigate_to_channels().await?;
    let url = session
        .wait_for_url_contains(&session.settings().paths.channels, TimeoutTier::Navigation)
        .await?;
    notes.push(format!("url: {url}"));

    ensure(channels.is_loaded().await?, || {
        "channels content never rendered".to_string()
    })?;
    let report = channels.verify_accessibility().await?;
    notes.push(format!("channels: {}", report.channel_count));
    ensure(report.channel_count >= 1, || "no channels listed".to_string())?;
    ensure(report.accessible, || {
        "focus could not move between channels".to_string()
    })
}

async fn apps_page_available<D: Driver>(
    session: &Session<D>,
    notes: &mut Vec<String>,
) -> TenfootResult<()> {
    let home = open_home(session).await?;
    let apps = home.navigate_to_apps().await?;
    let url = session
        .wait_for_url_contains(&session.settings().paths.apps, TimeoutTier::Navigation)
        .await?;
    notes.push(format!("url: {url}"));
    let _ = apps.wait_until_loaded().await?;
    Ok(())
}

async fn search_page_available<D: Driver>(
    session: &Session<D>,
    notes: &mut Vec<String>,
) -> TenfootResult<()> {
    let home = open_home(session).await?;
    let search = home.navigate_to_search().await?;
    let url = session
        .wait_for_url_contains(&session.settings().paths.search, TimeoutTier::Navigation)
        .await?;
    notes.push(format!("url: {url}"));
    let _ = search.wait_for_genres_grid().await?;
    Ok(())
}
