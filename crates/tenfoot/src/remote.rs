//! Key-event sender.
//!
//! [`RemoteControl`] turns remote-control intents (move, confirm, go back,
//! long press) into key events on a [`Driver`], pacing them with the
//! configured [`RemoteDelays`] so the application's focus engine keeps up.

use crate::config::RemoteDelays;
use crate::driver::Driver;
use crate::event::{Direction, Key, KeyEventKind};
use crate::result::TenfootResult;
use crate::wait::pause;
use serde::{Deserialize, Serialize};

/// Row/column coordinate inside a grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct GridPosition {
    /// Zero-based row
    pub row: usize,
    /// Zero-based column
    pub col: usize,
}

impl GridPosition {
    /// Create a position
    #[must_use]
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Position of the `index`-th item in a row-major grid
    #[must_use]
    pub const fn from_index(index: usize, columns: usize) -> Self {
        let columns = if columns == 0 { 1 } else { columns };
        Self {
            row: index / columns,
            col: index % columns,
        }
    }

    /// Moves from `self` to `to`: vertical first, then horizontal
    #[must_use]
    pub fn moves_to(self, to: Self) -> Vec<(Direction, usize)> {
        let mut moves = Vec::with_capacity(2);
        if to.row > self.row {
            moves.push((Direction::Down, to.row - self.row));
        } else if to.row < self.row {
            moves.push((Direction::Up, self.row - to.row));
        }
        if to.col > self.col {
            moves.push((Direction::Right, to.col - self.col));
        } else if to.col < self.col {
            moves.push((Direction::Left, self.col - to.col));
        }
        moves
    }
}

/// Paced remote-control key sender
#[derive(Debug)]
pub struct RemoteControl<'a, D: Driver + ?Sized> {
    driver: &'a D,
    delays: RemoteDelays,
}

impl<'a, D: Driver + ?Sized> RemoteControl<'a, D> {
    /// Create a sender over `driver`
    pub const fn new(driver: &'a D, delays: RemoteDelays) -> Self {
        Self { driver, delays }
    }

    /// Press `direction` `steps` times, then let navigation settle
    pub async fn press(&self, direction: Direction, steps: usize) -> TenfootResult<()> {
        tracing::debug!(?direction, steps, "remote: move");
        for _ in 0..steps {
            self.driver.press_key(direction.key()).await?;
            pause(self.delays.key_press_delay).await;
        }
        pause(self.delays.navigation_delay).await;
        Ok(())
    }

    /// Move up
    pub async fn up(&self, steps: usize) -> TenfootResult<()> {
        self.press(Direction::Up, steps).await
    }

    /// Move down
    pub async fn down(&self, steps: usize) -> TenfootResult<()> {
        self.press(Direction::Down, steps).await
    }

    /// Move left
    pub async fn left(&self, steps: usize) -> TenfootResult<()> {
        self.press(Direction::Left, steps).await
    }

    /// Move right
    pub async fn right(&self, steps: usize) -> TenfootResult<()> {
        self.press(Direction::Right, steps).await
    }

    /// Confirm (Enter)
    pub async fn ok(&self) -> TenfootResult<()> {
        self.single(Key::Enter).await
    }

    /// Back (Escape)
    pub async fn back(&self) -> TenfootResult<()> {
        self.single(Key::Escape).await
    }

    /// Back on screens that listen for Backspace
    pub async fn backspace(&self) -> TenfootResult<()> {
        self.single(Key::Backspace).await
    }

    async fn single(&self, key: Key) -> TenfootResult<()> {
        tracing::debug!(%key, "remote: press");
        self.driver.press_key(key).await?;
        pause(self.delays.navigation_delay).await;
        Ok(())
    }

    /// Hold Enter on `target`: keydown, hold, keyup, settle
    pub async fn long_press(&self, target: &str) -> TenfootResult<()> {
        tracing::debug!(target, hold = ?self.delays.long_press_hold, "remote: long press");
        self.driver
            .dispatch_key_event(target, KeyEventKind::KeyDown, Key::Enter)
            .await?;
        pause(self.delays.long_press_hold).await;
        self.driver
            .dispatch_key_event(target, KeyEventKind::KeyUp, Key::Enter)
            .await?;
        pause(self.delays.long_press_delay).await;
        Ok(())
    }

    /// Walk from one grid cell to another
    pub async fn navigate_to_grid_position(
        &self,
        from: GridPosition,
        to: GridPosition,
    ) -> TenfootResult<()> {
        for (direction, steps) in from.moves_to(to) {
            self.press(direction, steps).await?;
        }
        Ok(())
    }

    /// [`Self::press`] plus an extra settle of twice the navigation delay
    pub async fn smart_navigate(
        &self,
        direction: Direction,
        steps: usize,
        wait_for_stability: bool,
    ) -> TenfootResult<()> {
        self.press(direction, steps).await?;
        if wait_for_stability {
            pause(self.delays.navigation_delay * 2).await;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimulatedTv;
    use std::time::Duration;

    mod grid_position_tests {
        use super::*;

        #[test]
        fn test_from_index() {
            assert_eq!(GridPosition::from_index(7, 5), GridPosition::new(1, 2));
            assert_eq!(GridPosition::from_index(3, 0), GridPosition::new(3, 0));
        }

        #[test]
        fn test_moves_vertical_then_horizontal() {
            let moves = GridPosition::new(2, 4).moves_to(GridPosition::new(0, 1));
            assert_eq!(moves, vec![(Direction::Up, 2), (Direction::Left, 3)]);
            assert!(GridPosition::new(1, 1)
                .moves_to(GridPosition::new(1, 1))
                .is_empty());
        }
    }

    mod key_tests {
        use super::*;

        #[tokio::test]
        async fn test_press_sends_one_event_per_step() {
            let tv = SimulatedTv::new();
            let remote = RemoteControl::new(&tv, RemoteDelays::none());
            remote.right(3).await.unwrap();
            remote.ok().await.unwrap();
            assert_eq!(
                tv.key_log(),
                vec![Key::Right, Key::Right, Key::Right, Key::Enter]
            );
        }

        #[tokio::test]
        async fn test_zero_steps_sends_nothing() {
            let tv = SimulatedTv::new();
            let remote = RemoteControl::new(&tv, RemoteDelays::none());
            remote.down(0).await.unwrap();
            assert!(tv.key_log().is_empty());
        }

        #[tokio::test]
        async fn test_grid_navigation_keys() {
            let tv = SimulatedTv::new();
            let remote = RemoteControl::new(&tv, RemoteDelays::none());
            remote
                .navigate_to_grid_position(GridPosition::new(0, 0), GridPosition::new(1, 2))
                .await
                .unwrap();
            assert_eq!(tv.key_log(), vec![Key::Down, Key::Right, Key::Right]);
        }

        #[tokio::test]
        async fn test_back_keys() {
            let tv = SimulatedTv::new();
            let remote = RemoteControl::new(&tv, RemoteDelays::none());
            remote.back().await.unwrap();
            remote.backspace().await.unwrap();
            assert_eq!(tv.key_log(), vec![Key::Escape, Key::Backspace]);
        }

        #[tokio::test(start_paused = true)]
        async fn test_delays_are_applied() {
            let tv = SimulatedTv::new();
            let delays = RemoteDelays {
                key_press_delay: Duration::from_millis(100),
                navigation_delay: Duration::from_millis(300),
                ..RemoteDelays::none()
            };
            let remote = RemoteControl::new(&tv, delays);
            let start = tokio::time::Instant::now();
            remote.left(2).await.unwrap();
            assert_eq!(start.elapsed(), Duration::from_millis(500));
        }

        #[tokio::test(start_paused = true)]
        async fn test_smart_navigate_waits_for_stability() {
            let tv = SimulatedTv::new();
            let delays = RemoteDelays {
                key_press_delay: Duration::from_millis(100),
                navigation_delay: Duration::from_millis(300),
                ..RemoteDelays::none()
            };
            let remote = RemoteControl::new(&tv, delays);

            let start = tokio::time::Instant::now();
            remote.smart_navigate(Direction::Right, 1, false).await.unwrap();
            assert_eq!(start.elapsed(), Duration::from_millis(400));

            let start = tokio::time::Instant::now();
            remote.smart_navigate(Direction::Right, 1, true).await.unwrap();
            assert_eq!(start.elapsed(), Duration::from_millis(1_000));
            assert_eq!(tv.key_log(), vec![Key::Right, Key::Right]);
        }
    }
}
