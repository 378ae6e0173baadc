use super::*;

/// Uniform Fisher–Yates shuffle of the solved board.
///
/// Every one of the N! orderings is equally likely, including the solved one. That
/// case is not special-cased.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ShuffleGenerator {
    seed: u64,
}

impl ShuffleGenerator {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl BoardGenerator for ShuffleGenerator {
    fn generate(self, config: GameConfig) -> Board {
        use rand::rngs::SmallRng;
        use rand::{Rng, SeedableRng};

        let solved = Board::solved(config.size);
        let mut tiles = solved.tiles().to_vec();
        let mut rng = SmallRng::seed_from_u64(self.seed);

        for i in (1..tiles.len()).rev() {
            let j = rng.random_range(0..=i);
            tiles.swap(i, j);
        }

        log::trace!("Shuffled board with seed {}", self.seed);
        Board::from_tiles_unchecked(config.size, tiles)
    }
}
