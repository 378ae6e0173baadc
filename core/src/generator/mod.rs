use crate::*;
pub use shuffle::*;

mod shuffle;

pub trait BoardGenerator {
    fn generate(self, config: GameConfig) -> Board;
}

/// Always produces the solved board. Useful to set up a known position.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct SolvedGenerator;

impl BoardGenerator for SolvedGenerator {
    fn generate(self, config: GameConfig) -> Board {
        Board::solved(config.size)
    }
}
