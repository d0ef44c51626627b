//! End-to-end scenarios against the simulated TV
//!
//! Each test runs the public scenario API on a fresh [`SimulatedTv`], the way
//! the CLI does, and checks the reports rather than the simulator internals.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use rand::rngs::StdRng;
use rand::SeedableRng;
use tempfile::TempDir;
use tenfoot::prelude::*;

fn session_in(tv: SimulatedTv, artifacts: &TempDir) -> Session<SimulatedTv> {
    let mut settings = Settings::for_simulation();
    settings.artifacts_dir = artifacts.path().to_path_buf();
    Session::new(tv, settings)
}

// ============================================================================
// Passing runs
// ============================================================================

#[tokio::test]
async fn test_every_scenario_passes_on_default_tv() {
    let artifacts = TempDir::new().unwrap();
    let session = session_in(SimulatedTv::new(), &artifacts);
    let mut rng = StdRng::seed_from_u64(42);

    let reports = run_scenarios(&session, &ScenarioKind::all(), &mut rng, false).await;

    assert_eq!(reports.len(), 7);
    for report in &reports {
        assert!(report.passed, "{} failed: {:?}", report.scenario, report.error);
        assert!(report.failure_kind.is_none());
    }
    assert!(std::fs::read_dir(artifacts.path()).map_or(true, |mut d| d.next().is_none()));
}

#[tokio::test]
async fn test_add_then_delete_leaves_sentinel_first() {
    let artifacts = TempDir::new().unwrap();
    let session = session_in(SimulatedTv::new(), &artifacts);
    let mut rng = StdRng::seed_from_u64(1);

    let added = run_scenario(&session, ScenarioKind::AddAppToFavorites, &mut rng).await;
    assert!(added.passed, "{:?}", added.error);
    assert_eq!(
        session.driver().favorites().last().map(String::as_str),
        Some("prime-video")
    );

    let deleted = run_scenario(&session, ScenarioKind::DeleteFavoriteApp, &mut rng).await;
    assert!(deleted.passed, "{:?}", deleted.error);
    assert_eq!(
        session.driver().favorites(),
        vec!["watch-tv", "youtube", "spotify", "prime-video"]
    );
}

#[tokio::test]
async fn test_sentinel_survives_delete_attempt() {
    let artifacts = TempDir::new().unwrap();
    let session = session_in(SimulatedTv::new(), &artifacts);
    let mut rng = StdRng::seed_from_u64(3);

    let report = run_scenario(&session, ScenarioKind::SentinelNotDeletable, &mut rng).await;

    assert!(report.passed, "{:?}", report.error);
    assert_eq!(session.driver().favorites().len(), 4);
}

#[tokio::test]
async fn test_category_scenario_is_seeded() {
    for seed in [0_u64, 9, 1234] {
        let artifacts = TempDir::new().unwrap();
        let session = session_in(SimulatedTv::new(), &artifacts);
        let mut rng = StdRng::seed_from_u64(seed);
        let report =
            run_scenario(&session, ScenarioKind::OpenCategoryFromSearch, &mut rng).await;
        assert!(report.passed, "seed {seed}: {:?}", report.error);
        assert!(report.notes.iter().any(|n| n.starts_with("genre: ")));
    }
}

// ============================================================================
// Failing runs
// ============================================================================

#[tokio::test]
async fn test_add_fails_when_every_app_is_a_favorite() {
    let artifacts = TempDir::new().unwrap();
    let tv = SimulatedTv::new().with_catalog(&["Netflix", "YouTube", "Spotify"]);
    let session = session_in(tv, &artifacts);
    let mut rng = StdRng::seed_from_u64(5);

    let report = run_scenario(&session, ScenarioKind::AddAppToFavorites, &mut rng).await;

    assert!(!report.passed);
    assert_eq!(report.failure_kind, Some(FailureKind::Precondition));
    assert!(report.error.is_some());
    assert!(report.notes.iter().any(|n| n.starts_with("screenshot: ")));
    assert_eq!(session.driver().favorites().len(), 4);
}

#[tokio::test]
async fn test_delete_needs_a_second_favorite() {
    let artifacts = TempDir::new().unwrap();
    let tv = SimulatedTv::new().with_favorites(&["watch-tv"]);
    let session = session_in(tv, &artifacts);
    let mut rng = StdRng::seed_from_u64(5);

    let report = run_scenario(&session, ScenarioKind::DeleteFavoriteApp, &mut rng).await;

    assert!(!report.passed);
    assert_eq!(report.failure_kind, Some(FailureKind::Precondition));
    assert_eq!(session.driver().favorites(), vec!["watch-tv"]);
}

#[tokio::test]
async fn test_category_fails_without_genres() {
    let artifacts = TempDir::new().unwrap();
    let tv = SimulatedTv::new().with_genres(&[]);
    let session = session_in(tv, &artifacts);
    let mut rng = StdRng::seed_from_u64(5);

    let report = run_scenario(&session, ScenarioKind::OpenCategoryFromSearch, &mut rng).await;

    assert!(!report.passed);
    assert_eq!(report.failure_kind, Some(FailureKind::Precondition));
}

#[tokio::test]
async fn test_delete_fails_when_row_never_shrinks() {
    let artifacts = TempDir::new().unwrap();
    let tv = SimulatedTv::new().with_sticky_favorites();
    let session = session_in(tv, &artifacts);
    let mut rng = StdRng::seed_from_u64(5);

    let report = run_scenario(&session, ScenarioKind::DeleteFavoriteApp, &mut rng).await;

    assert!(!report.passed);
    assert_eq!(report.failure_kind, Some(FailureKind::Postcondition));
    assert!(report.error.as_deref().unwrap().contains("shrink"));
    assert_eq!(session.driver().favorites().len(), 4);
    assert!(!session.driver().is_delete_mode());
}

#[tokio::test]
async fn test_add_rejects_fallback_onto_existing_favorite() {
    let artifacts = TempDir::new().unwrap();
    let favorites: Vec<String> = std::iter::once("Watch TV".to_string())
        .chain((1..=45).map(|n| format!("App {n:02}")))
        .collect();
    let favorites: Vec<&str> = favorites.iter().map(String::as_str).collect();
    // Only the last tile is not a favorite, far out of reach of both walks
    let mut catalog = favorites[1..].to_vec();
    catalog.push("Arte");
    let tv = SimulatedTv::new()
        .with_favorites(&favorites)
        .with_catalog(&catalog);
    let session = session_in(tv, &artifacts);
    let mut rng = StdRng::seed_from_u64(5);

    let report = run_scenario(&session, ScenarioKind::AddAppToFavorites, &mut rng).await;

    assert!(!report.passed);
    assert_eq!(report.failure_kind, Some(FailureKind::SearchExhausted));
    assert!(report.error.as_deref().unwrap().contains("Arte"));
    assert_eq!(session.driver().favorites().len(), favorites.len());
}

#[tokio::test]
async fn test_identical_neighbours_read_as_stuck() {
    let artifacts = TempDir::new().unwrap();
    let tv = SimulatedTv::new().with_catalog(&[
        "Arte", "Arte", "Plex", "Deezer", "DAZN", "Twitch", "Euronews",
    ]);
    let session = session_in(tv, &artifacts);
    session.open_home().await.unwrap();
    let apps = HomeScreen::new(&session).navigate_to_apps().await.unwrap();
    let _ = apps.wait_until_loaded().await.unwrap();
    assert!(apps.app_names().await.unwrap().contains(&"Plex".to_string()));

    // The second "Arte" looks like a move that changed nothing, so the scan
    // wraps to the next row before it ever reaches "Plex"
    let err = apps.navigate_to_app("Plex").await.unwrap_err();
    assert_eq!(err.kind(), FailureKind::SearchExhausted);
}

#[tokio::test]
async fn test_fail_fast_stops_after_first_failure() {
    let artifacts = TempDir::new().unwrap();
    let kinds = [ScenarioKind::DeleteFavoriteApp, ScenarioKind::AppsPageAvailable];

    let session = session_in(SimulatedTv::new().with_favorites(&["watch-tv"]), &artifacts);
    let mut rng = StdRng::seed_from_u64(8);
    let reports = run_scenarios(&session, &kinds, &mut rng, true).await;
    assert_eq!(reports.len(), 1);
    assert!(!reports[0].passed);

    let session = session_in(SimulatedTv::new().with_favorites(&["watch-tv"]), &artifacts);
    let reports = run_scenarios(&session, &kinds, &mut rng, false).await;
    assert_eq!(reports.len(), 2);
    assert!(!reports[0].passed);
    assert!(reports[1].passed, "{:?}", reports[1].error);
}

#[tokio::test]
async fn test_failed_report_serializes_kind() {
    let artifacts = TempDir::new().unwrap();
    let tv = SimulatedTv::new().with_favorites(&["watch-tv"]);
    let session = session_in(tv, &artifacts);
    let mut rng = StdRng::seed_from_u64(5);

    let report = run_scenario(&session, ScenarioKind::DeleteFavoriteApp, &mut rng).await;
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["scenario"], "delete-favorite-app");
    assert_eq!(json["passed"], false);
    assert_eq!(json["failure_kind"], "precondition");
}
