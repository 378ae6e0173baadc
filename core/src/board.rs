use alloc::vec::Vec;
use core::ops::Index;
use serde::{Deserialize, Serialize};

use crate::*;

/// The live arrangement of puzzle tiles, one tile per grid cell in row-major order.
///
/// Always a permutation of the canonical tile set, the only mutation is swapping
/// two slots.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    size: Coord2,
    tiles: Vec<Tile>,
}

impl Board {
    /// The solved arrangement: tile `i + 1` at index `i`.
    pub fn solved(size: Coord2) -> Self {
        let (cols, rows) = size;
        let tiles = (0..rows)
            .flat_map(|y| (0..cols).map(move |x| (x, y)))
            .enumerate()
            .map(|(i, home)| Tile {
                id: (i + 1) as TileId,
                home,
            })
            .collect();
        Self { size, tiles }
    }

    pub(crate) fn from_tiles_unchecked(size: Coord2, tiles: Vec<Tile>) -> Self {
        Self { size, tiles }
    }

    pub fn size(&self) -> Coord2 {
        self.size
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn ids(&self) -> impl Iterator<Item = TileId> + '_ {
        self.tiles.iter().map(|tile| tile.id)
    }

    pub fn validate_index(&self, index: usize) -> Result<usize> {
        if index < self.tiles.len() {
            Ok(index)
        } else {
            Err(GameError::InvalidIndex)
        }
    }

    /// Exchanges the tiles in two slots.
    pub fn swap(&mut self, a: usize, b: usize) -> Result<()> {
        let a = self.validate_index(a)?;
        let b = self.validate_index(b)?;
        self.tiles.swap(a, b);
        Ok(())
    }

    /// Whether every slot holds the tile whose id matches the canonical ordering.
    pub fn is_solved(&self) -> bool {
        self.tiles
            .iter()
            .enumerate()
            .all(|(i, tile)| usize::from(tile.id) == i + 1)
    }
}

impl Index<usize> for Board {
    type Output = Tile;

    fn index(&self, index: usize) -> &Self::Output {
        &self.tiles[index]
    }
}
