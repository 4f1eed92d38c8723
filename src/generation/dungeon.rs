//! # Dungeon Generation
//!
//! Room-and-tunnel dungeon layout generation.
//!
//! The generator attempts a fixed number of room placements, rejecting any
//! candidate that would overlap an accepted room, carves the survivors into
//! the map, chains each new room to the previous one with an L-shaped
//! tunnel, and seeds items into room interiors.

use crate::generation::{utils, GenerationConfig, Generator, Room};
use crate::{DelveResult, GameMap, Item, ItemKind, Position};
use log::debug;
use rand::{rngs::StdRng, Rng};

/// Primary dungeon generator using the room-and-tunnel algorithm.
///
/// Placement is attempt-bounded rather than count-bounded: a dungeon asks
/// for up to `config.max_rooms` rooms and gets however many survive the
/// overlap test. Rooms are chained in acceptance order, which keeps the
/// whole carved area connected as a path graph.
#[derive(Debug, Clone, Default)]
pub struct RoomTunnelGenerator;

impl RoomTunnelGenerator {
    /// Creates a new dungeon generator.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::{GenerationConfig, Generator, RoomTunnelGenerator};
    ///
    /// let generator = RoomTunnelGenerator::new();
    /// let config = GenerationConfig::for_testing(12345);
    /// let mut rng = delve::utils::create_rng(&config);
    /// let (map, rooms) = generator.generate(&config, &mut rng).unwrap();
    /// assert!(!rooms.is_empty());
    /// assert!(map.tiles.count_set() > 0);
    /// ```
    pub fn new() -> Self {
        Self
    }

    /// Carves a room's interior as walkable floor.
    fn carve_room(&self, map: &mut GameMap, room: Room) {
        for pos in room.interior() {
            map.tiles.set(pos, true);
        }
    }

    /// Carves an inclusive horizontal run of floor at row `y`.
    ///
    /// Carving an already-walkable cell is a no-op, so tunnels may cross
    /// rooms and each other freely.
    fn carve_horizontal_tunnel(&self, map: &mut GameMap, x1: i32, x2: i32, y: i32) {
        for x in x1.min(x2)..=x1.max(x2) {
            map.tiles.set(Position::new(x, y), true);
        }
    }

    /// Carves an inclusive vertical run of floor at column `x`.
    fn carve_vertical_tunnel(&self, map: &mut GameMap, y1: i32, y2: i32, x: i32) {
        for y in y1.min(y2)..=y1.max(y2) {
            map.tiles.set(Position::new(x, y), true);
        }
    }

    /// Connects two room centers with an L-shaped tunnel.
    ///
    /// Which leg comes first is a coin flip per connection; the two choices
    /// put the bend at a different corner but connect the same cells.
    fn carve_tunnel(&self, map: &mut GameMap, from: Position, to: Position, rng: &mut StdRng) {
        if rng.gen_bool(0.5) {
            self.carve_horizontal_tunnel(map, from.x, to.x, from.y);
            self.carve_vertical_tunnel(map, from.y, to.y, to.x);
        } else {
            self.carve_vertical_tunnel(map, from.y, to.y, from.x);
            self.carve_horizontal_tunnel(map, from.x, to.x, to.y);
        }
    }

    /// Maybe spawns one item at a uniformly random interior cell.
    fn place_room_item(
        &self,
        map: &mut GameMap,
        room: Room,
        config: &GenerationConfig,
        rng: &mut StdRng,
    ) {
        if room.x2 - room.x1 < 2 || room.y2 - room.y1 < 2 {
            return; // no interior to spawn into
        }
        if !rng.gen_bool(config.item_chance) {
            return;
        }

        let x = rng.gen_range(room.x1 + 1..=room.x2 - 1);
        let y = rng.gen_range(room.y1 + 1..=room.y2 - 1);
        let kinds = ItemKind::all();
        let kind = kinds[rng.gen_range(0..kinds.len())];
        map.add_item(Item::new(kind, Position::new(x, y)));
    }
}

impl Generator<(GameMap, Vec<Room>)> for RoomTunnelGenerator {
    /// Generates a dungeon map and its rooms in acceptance order.
    ///
    /// The first accepted room is the designated start room. Zero accepted
    /// rooms yields an all-wall map and an empty room list; callers that
    /// need a start position must check for that before using the map.
    fn generate(
        &self,
        config: &GenerationConfig,
        rng: &mut StdRng,
    ) -> DelveResult<(GameMap, Vec<Room>)> {
        let mut map = GameMap::new(config.map_width, config.map_height);
        let mut rooms: Vec<Room> = Vec::new();

        for _ in 0..config.max_rooms {
            let width = rng.gen_range(config.room_min_size..=config.room_max_size) as i32;
            let height = rng.gen_range(config.room_min_size..=config.room_max_size) as i32;

            let max_x = config.map_width as i32 - width - 1;
            let max_y = config.map_height as i32 - height - 1;
            if max_x < 0 || max_y < 0 {
                continue; // room cannot fit this map at all
            }
            let x = rng.gen_range(0..=max_x);
            let y = rng.gen_range(0..=max_y);

            let candidate = Room::new(x, y, width, height);
            if rooms.iter().any(|other| candidate.intersects(other)) {
                continue; // rejected, attempt consumed
            }

            self.carve_room(&mut map, candidate);
            if let Some(previous) = rooms.last() {
                self.carve_tunnel(&mut map, previous.center(), candidate.center(), rng);
            }
            self.place_room_item(&mut map, candidate, config, rng);
            rooms.push(candidate);
        }

        debug!(
            "generated {} rooms from {} attempts, {} items, {} floor tiles",
            rooms.len(),
            config.max_rooms,
            map.items.len(),
            map.tiles.count_set()
        );

        Ok((map, rooms))
    }

    fn validate(&self, content: &(GameMap, Vec<Room>), _config: &GenerationConfig) -> DelveResult<()> {
        utils::validate_map(&content.0)
    }

    fn generator_type(&self) -> &'static str {
        "RoomTunnelGenerator"
    }
}
