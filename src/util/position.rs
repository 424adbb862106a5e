use std::fmt;

/// Side length of a map chunk in tiles.
pub const CHUNK_SIZE: i32 = 8;

/// Shift that converts a tile coordinate into a chunk coordinate.
pub const CHUNK_BITS: u32 = 3;

/// Highest valid plane (ground floor is 0).
pub const MAX_PLANE: u8 = 3;

/// Absolute tile position in the world.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: i32,
    pub y: i32,
    pub plane: u8,
}

impl Position {
    #[inline]
    pub const fn new(x: i32, y: i32, plane: u8) -> Self {
        Self { x, y, plane }
    }

    /// Chunk containing this tile.
    #[inline]
    pub const fn chunk(&self) -> ChunkPoint {
        ChunkPoint {
            x: self.x >> CHUNK_BITS,
            y: self.y >> CHUNK_BITS,
        }
    }

    /// Position one tile away in the given direction, same plane.
    #[inline]
    pub fn step(&self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        Self {
            x: self.x + dx,
            y: self.y + dy,
            plane: self.plane,
        }
    }

    #[inline]
    pub fn translated(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            plane: self.plane,
        }
    }

    /// Chebyshev distance in whole chunks.
    #[inline]
    pub fn chunk_distance(&self, other: &Position) -> u32 {
        self.chunk().chebyshev(&other.chunk())
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.plane)
    }
}

/// Chunk coordinates (tile coordinates divided by [`CHUNK_SIZE`]).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ChunkPoint {
    pub x: i32,
    pub y: i32,
}

impl ChunkPoint {
    #[inline]
    pub fn chebyshev(&self, other: &ChunkPoint) -> u32 {
        self.x.abs_diff(other.x).max(self.y.abs_diff(other.y))
    }
}

/// Compass direction of a single movement step.
///
/// The discriminant is the value written to the wire for directional
/// payloads, so the numbering is part of the protocol and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Direction {
    NorthWest = 0,
    North = 1,
    NorthEast = 2,
    West = 3,
    East = 4,
    SouthWest = 5,
    South = 6,
    SouthEast = 7,
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::NorthWest,
        Direction::North,
        Direction::NorthEast,
        Direction::West,
        Direction::East,
        Direction::SouthWest,
        Direction::South,
        Direction::SouthEast,
    ];

    /// Tile delta of one step in this direction.
    #[inline]
    pub const fn delta(&self) -> (i32, i32) {
        match self {
            Direction::NorthWest => (-1, 1),
            Direction::North => (0, 1),
            Direction::NorthEast => (1, 1),
            Direction::West => (-1, 0),
            Direction::East => (1, 0),
            Direction::SouthWest => (-1, -1),
            Direction::South => (0, -1),
            Direction::SouthEast => (1, -1),
        }
    }

    /// Direction of a single-step delta, `None` when the delta is zero or
    /// spans more than one tile on either axis.
    pub fn from_delta(dx: i32, dy: i32) -> Option<Direction> {
        match (dx, dy) {
            (-1, 1) => Some(Direction::NorthWest),
            (0, 1) => Some(Direction::North),
            (1, 1) => Some(Direction::NorthEast),
            (-1, 0) => Some(Direction::West),
            (1, 0) => Some(Direction::East),
            (-1, -1) => Some(Direction::SouthWest),
            (0, -1) => Some(Direction::South),
            (1, -1) => Some(Direction::SouthEast),
            _ => None,
        }
    }

    /// Wire value of this direction.
    #[inline]
    pub const fn id(&self) -> u8 {
        *self as u8
    }
}
