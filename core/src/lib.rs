#![no_std]

extern crate alloc;

use core::time::Duration;
use serde::Serialize;

pub use board::*;
pub use error::*;
pub use generator::*;
pub use input::*;
pub use ranking::*;
pub use result::*;
pub use session::*;
pub use submission::*;
pub use timer::*;
pub use types::*;

mod board;
mod error;
mod generator;
mod input;
mod ranking;
mod result;
mod session;
mod submission;
mod timer;
mod types;

/// Instant type used for every timestamp handed to the engine.
///
/// The engine never reads the clock itself, callers pass `now` into each operation.
pub use web_time::Instant;

/// Timing and grid of one game. Only the presets set the budgets, so none of
/// them is ever zero.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GameConfig {
    /// Columns and rows of the puzzle grid.
    size: Coord2,
    time_budget_ms: u32,
    hint_budget_ms: u32,
    glow_delay_ms: u32,
    /// How long a record submission may stay unanswered before it is failed.
    submission_timeout_ms: u32,
}

impl GameConfig {
    pub const DEFAULT_SIZE: Coord2 = (4, 4);

    pub const fn new_unchecked(size: Coord2) -> Self {
        Self {
            size,
            time_budget_ms: 60_000,
            hint_budget_ms: 10_000,
            glow_delay_ms: 2_000,
            submission_timeout_ms: 10_000,
        }
    }

    pub fn new((cols, rows): Coord2) -> Result<Self> {
        if cols == 0 || rows == 0 || mult(cols, rows) < 2 {
            return Err(GameError::InvalidBoardSize);
        }
        Ok(Self::new_unchecked((cols, rows)))
    }

    /// The 4×4 puzzle with a 10 second hint.
    pub const fn standard() -> Self {
        Self::new_unchecked(Self::DEFAULT_SIZE)
    }

    /// The earlier variant, same grid but only a 3 second hint.
    pub const fn classic() -> Self {
        let mut config = Self::standard();
        config.hint_budget_ms = 3_000;
        config
    }

    pub const fn size(&self) -> Coord2 {
        self.size
    }

    pub const fn total_tiles(&self) -> TileCount {
        mult(self.size.0, self.size.1)
    }

    pub const fn time_budget(&self) -> Duration {
        Duration::from_millis(self.time_budget_ms as u64)
    }

    pub const fn hint_budget(&self) -> Duration {
        Duration::from_millis(self.hint_budget_ms as u64)
    }

    pub const fn glow_delay(&self) -> Duration {
        Duration::from_millis(self.glow_delay_ms as u64)
    }

    pub const fn submission_timeout(&self) -> Duration {
        Duration::from_millis(self.submission_timeout_ms as u64)
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::standard()
    }
}

/// Converts a duration to whole milliseconds, saturating at `u32::MAX`.
pub fn as_millis(duration: Duration) -> u32 {
    duration.as_millis().try_into().unwrap_or(u32::MAX)
}
