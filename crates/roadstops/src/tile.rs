//! Tile addressing: linear tile indices, map dimensions and the directional
//! offset arithmetic used to walk along a road-stop axis.
//!
//! "North" along an axis is the end closest to the map origin. Stepping from a
//! tile towards `Axis::south_dir()` moves away from the origin.

use serde::{Deserialize, Serialize};

/// Linear index of a tile: `y * width + x`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TileIndex(pub u32);

/// Coordinate offset between two tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileIndexDiffC {
    pub x: i32,
    pub y: i32,
}

impl TileIndexDiffC {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn reversed(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    /// The diagonal direction that heads south along this axis.
    pub fn south_dir(self) -> DiagDirection {
        match self {
            Axis::X => DiagDirection::SW,
            Axis::Y => DiagDirection::SE,
        }
    }

    /// The diagonal direction that heads north along this axis.
    pub fn north_dir(self) -> DiagDirection {
        self.south_dir().reverse()
    }
}

/// The four directions a tile edge can face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagDirection {
    NE,
    SE,
    SW,
    NW,
}

impl DiagDirection {
    pub fn offset(self) -> TileIndexDiffC {
        match self {
            DiagDirection::NE => TileIndexDiffC::new(-1, 0),
            DiagDirection::SE => TileIndexDiffC::new(0, 1),
            DiagDirection::SW => TileIndexDiffC::new(1, 0),
            DiagDirection::NW => TileIndexDiffC::new(0, -1),
        }
    }

    pub fn reverse(self) -> Self {
        match self {
            DiagDirection::NE => DiagDirection::SW,
            DiagDirection::SE => DiagDirection::NW,
            DiagDirection::SW => DiagDirection::NE,
            DiagDirection::NW => DiagDirection::SE,
        }
    }

    pub fn axis(self) -> Axis {
        match self {
            DiagDirection::NE | DiagDirection::SW => Axis::X,
            DiagDirection::SE | DiagDirection::NW => Axis::Y,
        }
    }

    pub fn to_direction(self) -> Direction {
        match self {
            DiagDirection::NE => Direction::NE,
            DiagDirection::SE => Direction::SE,
            DiagDirection::SW => Direction::SW,
            DiagDirection::NW => Direction::NW,
        }
    }
}

/// Eight-way facing of a vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    NW,
}

impl Direction {
    const ALL: [Direction; 8] = [
        Direction::N,
        Direction::NE,
        Direction::E,
        Direction::SE,
        Direction::S,
        Direction::SW,
        Direction::W,
        Direction::NW,
    ];

    pub fn reverse(self) -> Self {
        Self::ALL[(self as usize + 4) % 8]
    }
}

/// Dimensions of the tile map; owns the index <-> coordinate conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapSize {
    pub width: u32,
    pub height: u32,
}

impl MapSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn tile_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    #[inline]
    pub fn in_bounds(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height
    }

    #[inline]
    pub fn contains(&self, tile: TileIndex) -> bool {
        (tile.0 as usize) < self.tile_count()
    }

    #[inline]
    pub fn tile(&self, x: u32, y: u32) -> TileIndex {
        debug_assert!(self.in_bounds(x, y), "tile ({}, {}) outside {:?}", x, y, self);
        TileIndex(y * self.width + x)
    }

    #[inline]
    pub fn tile_x(&self, tile: TileIndex) -> u32 {
        tile.0 % self.width
    }

    #[inline]
    pub fn tile_y(&self, tile: TileIndex) -> u32 {
        tile.0 / self.width
    }

    /// Offset `tile` by `diff`, or `None` when the result would leave the map.
    /// Offsets never wrap from one row into the next.
    pub fn add_diff(&self, tile: TileIndex, diff: TileIndexDiffC) -> Option<TileIndex> {
        let x = i64::from(self.tile_x(tile)) + i64::from(diff.x);
        let y = i64::from(self.tile_y(tile)) + i64::from(diff.y);
        if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.height) {
            return None;
        }
        Some(self.tile(x as u32, y as u32))
    }

    /// The neighbouring tile one step in `dir`.
    #[inline]
    pub fn neighbour(&self, tile: TileIndex, dir: DiagDirection) -> Option<TileIndex> {
        self.add_diff(tile, dir.offset())
    }
}
