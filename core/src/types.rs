use serde::{Deserialize, Serialize};

/// Single coordinate axis used for grid width, height, and positions.
pub type Coord = u8;

/// Count type used for tile counts and board indexes.
pub type TileCount = u16;

/// Two-dimensional coordinates `(x, y)`.
pub type Coord2 = (Coord, Coord);

/// Tile identifier, `1..=N` in solved order.
pub type TileId = TileCount;

pub const fn mult(a: Coord, b: Coord) -> TileCount {
    let a = a as TileCount;
    let b = b as TileCount;
    a.saturating_mul(b)
}

/// A piece of the puzzle image. Its identity and home never change, only the slot
/// it occupies on the board does.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub id: TileId,
    /// Grid cell this tile belongs to when the puzzle is solved.
    pub home: Coord2,
}
