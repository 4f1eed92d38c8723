//! # Generation Module
//!
//! Procedural dungeon generation: configuration, room geometry, and the
//! generator abstraction.
//!
//! Generation is driven entirely by a seeded [`StdRng`], so a given
//! configuration always reproduces the same dungeon.

pub mod dungeon;

pub use dungeon::*;

use crate::{DelveError, DelveResult, GameMap, Position};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

/// Configuration for procedural generation.
///
/// # Examples
///
/// ```
/// use delve::GenerationConfig;
///
/// let config = GenerationConfig::new(12345);
/// assert!(config.room_min_size <= config.room_max_size);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Random seed for reproducible generation
    pub seed: u64,
    /// Map width in tiles
    pub map_width: u32,
    /// Map height in tiles
    pub map_height: u32,
    /// Minimum room side length
    pub room_min_size: u32,
    /// Maximum room side length
    pub room_max_size: u32,
    /// Placement attempts; each failed attempt is consumed, not retried
    pub max_rooms: u32,
    /// Probability that an accepted room spawns one item (0.0 to 1.0)
    pub item_chance: f64,
}

impl GenerationConfig {
    /// Creates the default generation configuration.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            map_width: crate::config::DEFAULT_MAP_WIDTH,
            map_height: crate::config::DEFAULT_MAP_HEIGHT,
            room_min_size: 6,
            room_max_size: 10,
            max_rooms: 30,
            item_chance: 0.7,
        }
    }

    /// Creates a configuration for testing with smaller, simpler maps.
    pub fn for_testing(seed: u64) -> Self {
        Self {
            seed,
            map_width: 30,
            map_height: 20,
            room_min_size: 3,
            room_max_size: 6,
            max_rooms: 8,
            item_chance: 0.5,
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self::new(42)
    }
}

/// An axis-aligned rectangular room, defined by two corners.
///
/// A room of size `width × height` spans the cells `x1..=x2`, `y1..=y2`
/// where `x2 = x1 + width`; the outermost ring is wall and only the interior
/// is carved. Rooms are transient: they steer carving, connectivity, and
/// spawning, and are returned alongside the map in acceptance order.
///
/// # Examples
///
/// ```
/// use delve::{Position, Room};
///
/// let room = Room::new(5, 5, 10, 8);
/// assert_eq!(room.center(), Position::new(10, 9));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl Room {
    /// Creates a room from its top-left corner and size.
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x1: x,
            y1: y,
            x2: x + width,
            y2: y + height,
        }
    }

    /// The center cell of the room, rounding toward the top-left.
    pub fn center(&self) -> Position {
        Position::new((self.x1 + self.x2) / 2, (self.y1 + self.y2) / 2)
    }

    /// Whether this room's rectangle overlaps another's.
    ///
    /// Touching edges count as an intersection, which is what keeps accepted
    /// rooms from sharing even a border cell.
    pub fn intersects(&self, other: &Room) -> bool {
        self.x1 <= other.x2 && self.x2 >= other.x1 && self.y1 <= other.y2 && self.y2 >= other.y1
    }

    /// The interior floor cells, excluding the one-cell wall border.
    pub fn interior(self) -> impl Iterator<Item = Position> {
        (self.y1 + 1..self.y2)
            .flat_map(move |y| (self.x1 + 1..self.x2).map(move |x| Position::new(x, y)))
    }

    /// Whether a position lies inside the room's rectangle (walls included).
    pub fn contains(&self, pos: Position) -> bool {
        pos.x >= self.x1 && pos.x <= self.x2 && pos.y >= self.y1 && pos.y <= self.y2
    }
}

/// Trait for procedural generators.
///
/// Generators are pure functions of a configuration and an RNG, which keeps
/// every layout reproducible from its seed.
pub trait Generator<T> {
    /// Generates content using the provided configuration and RNG.
    fn generate(&self, config: &GenerationConfig, rng: &mut StdRng) -> DelveResult<T>;

    /// Validates that the generated content meets requirements.
    fn validate(&self, content: &T, config: &GenerationConfig) -> DelveResult<()>;

    /// Gets the generator type name for logging and debugging.
    fn generator_type(&self) -> &'static str;
}

/// Utility functions for generation algorithms.
pub mod utils {
    use super::*;
    use rand::SeedableRng;

    /// Creates a seeded random number generator from the config.
    pub fn create_rng(config: &GenerationConfig) -> StdRng {
        StdRng::seed_from_u64(config.seed)
    }

    /// Validates that a map is playable: it must contain floor.
    ///
    /// An all-wall map is the degenerate zero-rooms outcome; callers that
    /// need a start position must treat it as a startup failure.
    pub fn validate_map(map: &GameMap) -> DelveResult<()> {
        if map.tiles.count_set() == 0 {
            return Err(DelveError::GenerationFailed(
                "map has no floor tiles".to_string(),
            ));
        }
        Ok(())
    }
}
