//! Grid scanner.
//!
//! Finds a named tile in a grid the suite has no coordinate model for: read
//! the focused tile, compare it with the target, move, repeat, within a
//! fixed attempt budget. Each strategy reproduces how a particular screen
//! lays out its tiles.

use crate::config::RemoteDelays;
use crate::driver::Driver;
use crate::event::Direction;
use crate::focus::{FocusLocator, FocusedItem};
use crate::remote::RemoteControl;
use crate::result::{TenfootError, TenfootResult};
use crate::selector::SelectorChain;
use serde::{Deserialize, Serialize};

// =============================================================================
// MATCHING
// =============================================================================

/// Lowercase, treat `-` and `_` as spaces, collapse whitespace
#[must_use]
pub fn normalize_label(label: &str) -> String {
    label
        .to_lowercase()
        .replace(['-', '_'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// How a focused label is compared with a target name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchMode {
    /// Byte equality after trimming
    Exact,
    /// Case-insensitive equality after trimming
    IgnoreCase,
    /// Normalized substring in either direction
    #[default]
    Loose,
}

impl MatchMode {
    /// Compare two labels
    #[must_use]
    pub fn matches(self, candidate: &str, wanted: &str) -> bool {
        let (candidate, wanted) = (candidate.trim(), wanted.trim());
        if candidate.is_empty() || wanted.is_empty() {
            return false;
        }
        match self {
            Self::Exact => candidate == wanted,
            Self::IgnoreCase => candidate.to_lowercase() == wanted.to_lowercase(),
            Self::Loose => {
                let (candidate, wanted) = (normalize_label(candidate), normalize_label(wanted));
                candidate.contains(&wanted) || wanted.contains(&candidate)
            }
        }
    }
}

/// What the scanner is looking for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    names: Vec<String>,
    mode: MatchMode,
}

impl Target {
    /// One name
    #[must_use]
    pub fn one(name: impl Into<String>, mode: MatchMode) -> Self {
        Self {
            names: vec![name.into()],
            mode,
        }
    }

    /// Any of several names (aliases)
    #[must_use]
    pub fn any_of<I, S>(names: I, mode: MatchMode) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
            mode,
        }
    }

    /// Names
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Whether the focused item is this target
    #[must_use]
    pub fn matches(&self, item: &FocusedItem) -> bool {
        item.names().iter().any(|candidate| {
            self.names
                .iter()
                .any(|wanted| self.mode.matches(candidate, wanted))
        })
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.names.join(" | "))
    }
}

// =============================================================================
// PLAN
// =============================================================================

/// Movement strategy
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanStrategy {
    /// Move right; when a right move changes nothing, go down one row and
    /// left `reset_moves` times
    WrapOnStuck {
        /// Left moves after wrapping
        reset_moves: usize,
    },
    /// Sweep each row rightwards, return left, go down
    RowSweep {
        /// Reads per row
        row_width: usize,
        /// Rows to sweep
        max_rows: usize,
    },
    /// Keep moving one way until stuck
    Linear {
        /// Direction
        direction: Direction,
    },
    /// Cycle through a scripted move list
    Pattern {
        /// Moves, repeated
        moves: Vec<Direction>,
    },
}

/// What to do when the budget runs out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExhaustionPolicy {
    /// Raise [`TenfootError::SearchExhausted`]
    #[default]
    Fail,
    /// Return whatever is focused with `matched == false`
    SettleForCurrent,
}

/// Strategy plus budget
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanPlan {
    /// Movement strategy
    pub strategy: ScanStrategy,
    /// Maximum focus reads
    pub max_attempts: usize,
    /// Exhaustion behavior
    pub on_exhausted: ExhaustionPolicy,
}

impl ScanPlan {
    /// Apps grid: wrap on stuck, 15 attempts
    #[must_use]
    pub const fn apps_grid(reset_moves: usize) -> Self {
        Self {
            strategy: ScanStrategy::WrapOnStuck { reset_moves },
            max_attempts: 15,
            on_exhausted: ExhaustionPolicy::Fail,
        }
    }

    /// Genre grid: 20 reads per row, 5 rows
    #[must_use]
    pub const fn genre_grid() -> Self {
        Self {
            strategy: ScanStrategy::RowSweep {
                row_width: 20,
                max_rows: 5,
            },
            max_attempts: 100,
            on_exhausted: ExhaustionPolicy::Fail,
        }
    }

    /// Menu bar in one direction, 10 attempts
    #[must_use]
    pub const fn linear(direction: Direction, on_exhausted: ExhaustionPolicy) -> Self {
        Self {
            strategy: ScanStrategy::Linear { direction },
            max_attempts: 10,
            on_exhausted,
        }
    }

    /// Set budget
    #[must_use]
    pub const fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }
}

/// Result of a scan
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanOutcome {
    /// Focus when the scan stopped
    pub item: Option<FocusedItem>,
    /// Whether `item` is the target
    pub matched: bool,
    /// Focus reads spent
    pub attempts: usize,
}

// =============================================================================
// SCANNER
// =============================================================================

/// Scans a grid by moving focus with the remote
#[derive(Debug)]
pub struct GridScanner<'a, D: Driver + ?Sized> {
    driver: &'a D,
    remote: RemoteControl<'a, D>,
    locator: &'a FocusLocator,
    scope: Option<&'a SelectorChain>,
}

impl<'a, D: Driver + ?Sized> GridScanner<'a, D> {
    /// Scanner over the whole page
    pub const fn new(driver: &'a D, delays: RemoteDelays, locator: &'a FocusLocator) -> Self {
        Self {
            driver,
            remote: RemoteControl::new(driver, delays),
            locator,
            scope: None,
        }
    }

    /// Prefer focus inside `scope`
    #[must_use]
    pub const fn within(mut self, scope: &'a SelectorChain) -> Self {
        self.scope = Some(scope);
        self
    }

    async fn read(&self) -> TenfootResult<Option<FocusedItem>> {
        self.locator.focused(self.driver, self.scope).await
    }

    /// Move focus until `target` is focused or `plan` is exhausted
    pub async fn scan(&self, target: &Target, plan: &ScanPlan) -> TenfootResult<ScanOutcome> {
        tracing::debug!(%target, strategy = ?plan.strategy, budget = plan.max_attempts, "scan start");
        let mut cursor = Cursor::new(&plan.strategy);
        let mut attempts = 0;
        let mut previous: Option<FocusedItem> = None;
        let mut item = None;

        while attempts < plan.max_attempts {
            attempts += 1;
            item = self.read().await?;
            if let Some(found) = item.as_ref().filter(|i| target.matches(i)) {
                tracing::debug!(%target, label = %found.label, attempts, "scan hit");
                return Ok(ScanOutcome {
                    item,
                    matched: true,
                    attempts,
                });
            }
            let stuck = attempts > 1
                && previous.as_ref().map(FocusedItem::identity)
                    == item.as_ref().map(FocusedItem::identity);
            previous.clone_from(&item);

            match cursor.next(stuck) {
                Step::Moves(moves) => {
                    for (direction, steps) in moves {
                        self.remote.press(direction, steps).await?;
                    }
                }
                Step::Stop => break,
            }
        }

        self.exhausted(target, plan, attempts, item).await
    }

    async fn exhausted(
        &self,
        target: &Target,
        plan: &ScanPlan,
        attempts: usize,
        last: Option<FocusedItem>,
    ) -> TenfootResult<ScanOutcome> {
        match plan.on_exhausted {
            ExhaustionPolicy::Fail => Err(TenfootError::SearchExhausted {
                target: target.to_string(),
                attempts,
            }),
            ExhaustionPolicy::SettleForCurrent => {
                let item = match self.read().await? {
                    Some(item) => Some(item),
                    None => last,
                };
                tracing::warn!(
                    %target,
                    attempts,
                    settled_on = item.as_ref().map(|i| i.label.as_str()),
                    "scan budget exhausted, settling for current focus"
                );
                Ok(ScanOutcome {
                    item,
                    matched: false,
                    attempts,
                })
            }
        }
    }
}

enum Step {
    Moves(Vec<(Direction, usize)>),
    Stop,
}

/// Per-strategy movement state
struct Cursor<'p> {
    strategy: &'p ScanStrategy,
    moved_right: bool,
    column: usize,
    row: usize,
    index: usize,
}

impl<'p> Cursor<'p> {
    const fn new(strategy: &'p ScanStrategy) -> Self {
        Self {
            strategy,
            moved_right: false,
            column: 0,
            row: 0,
            index: 0,
        }
    }

    /// Moves after a miss. `stuck` means the last move changed nothing.
    fn next(&mut self, stuck: bool) -> Step {
        match self.strategy {
            ScanStrategy::WrapOnStuck { reset_moves } => {
                if stuck && self.moved_right {
                    self.moved_right = false;
                    Step::Moves(vec![(Direction::Down, 1), (Direction::Left, *reset_moves)])
                } else {
                    self.moved_right = true;
                    Step::Moves(vec![(Direction::Right, 1)])
                }
            }
            ScanStrategy::RowSweep {
                row_width,
                max_rows,
            } => {
                self.column += 1;
                let row_done = self.column >= *row_width || (stuck && self.column > 1);
                if !row_done {
                    return Step::Moves(vec![(Direction::Right, 1)]);
                }
                self.row += 1;
                if self.row >= *max_rows {
                    return Step::Stop;
                }
                self.column = 0;
                Step::Moves(vec![(Direction::Left, *row_width), (Direction::Down, 1)])
            }
            ScanStrategy::Linear { direction } => {
                if stuck {
                    Step::Stop
                } else {
                    Step::Moves(vec![(*direction, 1)])
                }
            }
            ScanStrategy::Pattern { moves } => {
                if moves.is_empty() {
                    return Step::Stop;
                }
                let direction = moves[self.index % moves.len()];
                self.index += 1;
                Step::Moves(vec![(direction, 1)])
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CommonSelectors;
    use crate::driver::ElementSnapshot;
    use crate::event::Key;
    use crate::sim::SimulatedTv;
    use proptest::prelude::*;

    fn item(text: &str, test_id: &str) -> FocusedItem {
        let mut element = ElementSnapshot::new("div");
        element.text = text.to_string();
        element
            .attributes
            .insert("data-testid".into(), test_id.into());
        FocusedItem::from_element(element)
    }

    mod matching_tests {
        use super::*;

        #[test]
        fn test_normalize_label() {
            assert_eq!(normalize_label("  Watch-TV  "), "watch tv");
            assert_eq!(normalize_label("sci_fi\tand  fantasy"), "sci fi and fantasy");
        }

        #[test]
        fn test_modes() {
            assert!(MatchMode::Exact.matches("Drama", "Drama"));
            assert!(!MatchMode::Exact.matches("drama", "Drama"));
            assert!(MatchMode::IgnoreCase.matches("drama", " Drama "));
            assert!(!MatchMode::IgnoreCase.matches("Drama Series", "Drama"));
            assert!(MatchMode::Loose.matches("Drama Series", "drama"));
            assert!(MatchMode::Loose.matches("tv", "watch-tv"));
            assert!(!MatchMode::Loose.matches("", "x"));
        }

        #[test]
        fn test_target_matches_label_or_test_id() {
            let target = Target::one("netflix", MatchMode::IgnoreCase);
            assert!(target.matches(&item("Netflix", "netflix")));
            assert!(target.matches(&item("", "netflix")));
            assert!(!target.matches(&item("YouTube", "youtube")));

            let aliases = Target::any_of(["Apps", "Applications"], MatchMode::Exact);
            assert!(aliases.matches(&item("Applications", "main-menu-item-4")));
            assert_eq!(aliases.to_string(), "Apps | Applications");
        }
    }

    mod cursor_tests {
        use super::*;

        #[test]
        fn test_wrap_on_stuck_wraps_only_after_right_move() {
            let strategy = ScanStrategy::WrapOnStuck { reset_moves: 4 };
            let mut cursor = Cursor::new(&strategy);
            assert!(matches!(cursor.next(false), Step::Moves(m) if m == vec![(Direction::Right, 1)]));
            assert!(matches!(
                cursor.next(true),
                Step::Moves(m) if m == vec![(Direction::Down, 1), (Direction::Left, 4)]
            ));
            assert!(matches!(cursor.next(true), Step::Moves(m) if m == vec![(Direction::Right, 1)]));
        }

        #[test]
        fn test_row_sweep_returns_and_descends() {
            let strategy = ScanStrategy::RowSweep {
                row_width: 2,
                max_rows: 2,
            };
            let mut cursor = Cursor::new(&strategy);
            assert!(matches!(cursor.next(false), Step::Moves(m) if m == vec![(Direction::Right, 1)]));
            assert!(matches!(
                cursor.next(false),
                Step::Moves(m) if m == vec![(Direction::Left, 2), (Direction::Down, 1)]
            ));
            assert!(matches!(cursor.next(false), Step::Moves(_)));
            assert!(matches!(cursor.next(false), Step::Stop));
        }

        #[test]
        fn test_linear_stops_when_stuck() {
            let strategy = ScanStrategy::Linear {
                direction: Direction::Left,
            };
            let mut cursor = Cursor::new(&strategy);
            assert!(matches!(cursor.next(false), Step::Moves(m) if m == vec![(Direction::Left, 1)]));
            assert!(matches!(cursor.next(true), Step::Stop));
        }

        #[test]
        fn test_pattern_cycles() {
            let strategy = ScanStrategy::Pattern {
                moves: vec![Direction::Right, Direction::Down],
            };
            let mut cursor = Cursor::new(&strategy);
            let mut seen = Vec::new();
            for _ in 0..4 {
                if let Step::Moves(m) = cursor.next(false) {
                    seen.push(m[0].0);
                }
            }
            assert_eq!(
                seen,
                [Direction::Right, Direction::Down, Direction::Right, Direction::Down]
            );
        }
    }

    mod scan_tests {
        use super::*;

        fn locator() -> FocusLocator {
            FocusLocator::new(CommonSelectors::default().focused)
        }

        #[tokio::test]
        async fn test_linear_scan_along_favorites() {
            let tv = SimulatedTv::new();
            let locator = locator();
            let scanner = GridScanner::new(&tv, RemoteDelays::none(), &locator);
            let target = Target::one("youtube", MatchMode::Loose);
            let outcome = scanner
                .scan(
                    &target,
                    &ScanPlan::linear(Direction::Right, ExhaustionPolicy::Fail),
                )
                .await
                .unwrap();
            assert!(outcome.matched);
            assert_eq!(outcome.item.unwrap().test_id.as_deref(), Some("youtube"));
            assert!(tv.key_log().iter().all(|k| *k == Key::Right));
        }

        #[tokio::test]
        async fn test_missing_target_fails() {
            let tv = SimulatedTv::new();
            let locator = locator();
            let scanner = GridScanner::new(&tv, RemoteDelays::none(), &locator);
            let target = Target::one("does-not-exist", MatchMode::Exact);
            let err = scanner
                .scan(
                    &target,
                    &ScanPlan::linear(Direction::Right, ExhaustionPolicy::Fail),
                )
                .await
                .unwrap_err();
            assert!(matches!(err, TenfootError::SearchExhausted { .. }));
        }

        #[tokio::test]
        async fn test_missing_target_settles() {
            let tv = SimulatedTv::new();
            let locator = locator();
            let scanner = GridScanner::new(&tv, RemoteDelays::none(), &locator);
            let plan = ScanPlan::linear(Direction::Right, ExhaustionPolicy::SettleForCurrent)
                .with_max_attempts(2);
            let outcome = scanner
                .scan(&Target::one("nothing", MatchMode::Exact), &plan)
                .await
                .unwrap();
            assert!(!outcome.matched);
            assert_eq!(outcome.attempts, 2);
            assert!(outcome.item.is_some());
        }

        #[tokio::test]
        async fn test_zero_budget_reads_nothing() {
            let tv = SimulatedTv::new();
            let locator = locator();
            let scanner = GridScanner::new(&tv, RemoteDelays::none(), &locator);
            let plan = ScanPlan::linear(Direction::Right, ExhaustionPolicy::Fail)
                .with_max_attempts(0);
            let err = scanner
                .scan(&Target::one("watch-tv", MatchMode::Exact), &plan)
                .await
                .unwrap_err();
            assert!(matches!(err, TenfootError::SearchExhausted { attempts: 0, .. }));
        }
    }

    proptest! {
        #[test]
        fn prop_normalize_is_idempotent(label in "[A-Za-z _-]{0,24}") {
            let once = normalize_label(&label);
            prop_assert_eq!(normalize_label(&once), once.clone());
        }

        #[test]
        fn prop_loose_match_is_symmetric(a in "[a-z]{1,8}", b in "[a-z]{1,8}") {
            prop_assert_eq!(
                MatchMode::Loose.matches(&a, &b),
                MatchMode::Loose.matches(&b, &a)
            );
        }

        #[test]
        fn prop_loose_accepts_decorated_names(name in "[a-z]{2,8}", suffix in "[a-z]{1,6}") {
            let decorated = format!("{}-{}", name.to_uppercase(), suffix);
            prop_assert!(MatchMode::Loose.matches(&decorated, &name));
        }
    }
}
