//! Tenfoot: remote-control end-to-end testing for ten-foot TV web apps
//!
//! A TV home screen is driven with the five keys of a remote (arrows, OK,
//! back). Tenfoot sends those keys, reads which element holds focus, scans
//! grids until a wanted item is focused, and wraps each screen of the app in
//! a page object so that scenarios read like the manual test plan.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    TENFOOT Architecture                          │
//! ├─────────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐    ┌────────────┐    ┌────────────┐            │
//! │   │ Scenarios  │    │ Screens    │    │ Driver     │            │
//! │   │ (Rust)     │───►│ + Scanner  │───►│ chromium / │            │
//! │   │            │    │ + Remote   │    │ simulated  │            │
//! │   └────────────┘    └────────────┘    └────────────┘            │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use tenfoot::prelude::*;
//! use rand::SeedableRng;
//!
//! # async fn demo() -> TenfootResult<()> {
//! let session = Session::new(SimulatedTv::new(), Settings::for_simulation());
//! let mut rng = rand::rngs::StdRng::seed_from_u64(7);
//! let report = run_scenario(&session, ScenarioKind::AddAppToFavorites, &mut rng).await;
//! assert!(report.passed);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

#[cfg(feature = "browser")]
mod chromium;
/// Settings: timeouts, remote delays, paths and the selector catalog
pub mod config;
mod driver;
mod event;
mod focus;
mod remote;
mod result;
mod retry;
mod scanner;
/// End-to-end scenarios over the screen objects
pub mod scenarios;
/// Page objects, one per screen of the app
pub mod screens;
mod selector;
mod session;
/// In-process TV home screen implementing [`Driver`]
pub mod sim;
mod wait;

#[cfg(feature = "browser")]
pub use chromium::ChromiumDriver;
pub use config::{Settings, ENV_BASE_URL, ENV_CHROMIUM_PATH, ENV_HEADLESS};
pub use driver::{Driver, ElementSnapshot};
pub use event::{Direction, Key, KeyEventKind};
pub use focus::{FocusLocator, FocusedItem};
pub use remote::{GridPosition, RemoteControl};
pub use result::{ensure, FailureKind, TenfootError, TenfootResult};
pub use retry::{retry_action, RetryPolicy, DEFAULT_BASE_DELAY};
pub use scanner::{
    normalize_label, ExhaustionPolicy, GridScanner, MatchMode, ScanOutcome, ScanPlan,
    ScanStrategy, Target,
};
pub use scenarios::{run_scenario, run_scenarios, ScenarioKind, ScenarioReport};
pub use selector::SelectorChain;
pub use session::Session;
pub use sim::SimulatedTv;
pub use wait::{poll_until, PollOptions, TimeoutTier, WaitOutcome};

/// Prelude for convenient imports
pub mod prelude {
    #[cfg(feature = "browser")]
    pub use super::chromium::ChromiumDriver;
    pub use super::config::*;
    pub use super::driver::*;
    pub use super::event::*;
    pub use super::focus::*;
    pub use super::remote::*;
    pub use super::result::*;
    pub use super::retry::*;
    pub use super::scanner::*;
    pub use super::scenarios::*;
    pub use super::screens::*;
    pub use super::selector::*;
    pub use super::session::*;
    pub use super::sim::SimulatedTv;
    pub use super::wait::*;
}
