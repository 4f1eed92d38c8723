//! # World Module
//!
//! The dungeon map: a walkability raster, the visibility and exploration
//! masks derived from it, and the entities and items occupying the map.
//!
//! The map owns its occupants. Everything else refers to them through
//! [`EntityId`]/[`ItemId`] handles, never through structural references, so
//! pickup and drop are plain ownership transfers between the map's ground
//! collection and an entity's inventory.

use crate::game::fov;
use crate::{Entity, EntityId, Item, ItemId, Position};
use serde::{Deserialize, Serialize};

/// A width × height boolean raster, stored row-major.
///
/// Used for the three map layers (walkable tiles, explored cells, visible
/// cells) and as the input/output format of the field-of-view engine.
/// Out-of-bounds reads return `false`; out-of-bounds writes are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    width: u32,
    height: u32,
    cells: Vec<bool>,
}

impl Grid {
    /// Creates a grid with every cell cleared.
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, false)
    }

    /// Creates a grid with every cell set to `value`.
    pub fn filled(width: u32, height: u32, value: bool) -> Self {
        Self {
            width,
            height,
            cells: vec![value; (width * height) as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Checks whether a position lies inside the raster.
    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as u32) < self.width && (pos.y as u32) < self.height
    }

    fn index(&self, pos: Position) -> usize {
        pos.y as usize * self.width as usize + pos.x as usize
    }

    /// Reads a cell. Out-of-bounds positions read as `false`.
    pub fn get(&self, pos: Position) -> bool {
        self.in_bounds(pos) && self.cells[self.index(pos)]
    }

    /// Writes a cell. Out-of-bounds positions are ignored.
    pub fn set(&mut self, pos: Position, value: bool) {
        if self.in_bounds(pos) {
            let index = self.index(pos);
            self.cells[index] = value;
        }
    }

    /// Sets every cell to `value`.
    pub fn fill(&mut self, value: bool) {
        self.cells.fill(value);
    }

    /// Counts the set cells.
    pub fn count_set(&self) -> usize {
        self.cells.iter().filter(|&&cell| cell).count()
    }

    /// Sets every cell that is set in `other`.
    ///
    /// Both grids must have the same dimensions.
    pub fn union_with(&mut self, other: &Grid) {
        debug_assert_eq!((self.width, self.height), (other.width, other.height));
        for (cell, &incoming) in self.cells.iter_mut().zip(other.cells.iter()) {
            *cell |= incoming;
        }
    }
}

/// The dungeon map and everything on it.
///
/// Three same-sized layers describe the terrain: `tiles` (true = walkable
/// floor), `visible` (currently in the field of view) and `explored` (ever
/// seen). `explored` only ever grows; `visible` is rebuilt from scratch by
/// every [`GameMap::update_fov`] call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameMap {
    pub width: u32,
    pub height: u32,
    /// Walkable floor cells. Unset cells are wall.
    pub tiles: Grid,
    /// Cells the player has ever seen. Monotonically non-decreasing.
    pub explored: Grid,
    /// Cells inside the current field of view.
    pub visible: Grid,
    /// Entities on the map, in insertion order.
    pub entities: Vec<Entity>,
    /// Ground items, in insertion order. Pickup takes the first match.
    pub items: Vec<Item>,
}

impl GameMap {
    /// Creates an all-wall map with the given dimensions.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            tiles: Grid::new(width, height),
            explored: Grid::new(width, height),
            visible: Grid::new(width, height),
            entities: Vec::new(),
            items: Vec::new(),
        }
    }

    /// Checks whether the position lies inside the map bounds.
    pub fn in_bounds(&self, pos: Position) -> bool {
        self.tiles.in_bounds(pos)
    }

    /// Checks whether an entity could stand on the given cell.
    ///
    /// A cell is walkable when it is in bounds, is floor, and is not occupied
    /// by a blocking entity.
    pub fn is_walkable(&self, pos: Position) -> bool {
        if !self.tiles.get(pos) {
            return false;
        }
        !self
            .entities
            .iter()
            .any(|entity| entity.blocks && entity.position == pos)
    }

    /// Returns the blocking entity occupying the given cell, if any.
    pub fn blocking_entity_at(&self, pos: Position) -> Option<EntityId> {
        self.entities
            .iter()
            .find(|entity| entity.blocks && entity.position == pos)
            .map(|entity| entity.id)
    }

    /// Returns the ids of all ground items at the given cell, in map order.
    pub fn items_at(&self, pos: Position) -> Vec<ItemId> {
        self.items
            .iter()
            .filter(|item| item.position == pos)
            .map(|item| item.id)
            .collect()
    }

    /// Returns the first ground item at the given cell, in map order.
    pub fn first_item_at(&self, pos: Position) -> Option<ItemId> {
        self.items
            .iter()
            .find(|item| item.position == pos)
            .map(|item| item.id)
    }

    /// Adds an entity to the map and returns its id.
    pub fn add_entity(&mut self, entity: Entity) -> EntityId {
        let id = entity.id;
        self.entities.push(entity);
        id
    }

    /// Removes an entity from the map, returning it if it was present.
    pub fn remove_entity(&mut self, id: EntityId) -> Option<Entity> {
        let index = self.entities.iter().position(|entity| entity.id == id)?;
        Some(self.entities.remove(index))
    }

    /// Looks up an entity by id.
    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|entity| entity.id == id)
    }

    /// Looks up an entity by id, mutably.
    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|entity| entity.id == id)
    }

    /// Adds a ground item to the map and returns its id.
    pub fn add_item(&mut self, item: Item) -> ItemId {
        let id = item.id;
        self.items.push(item);
        id
    }

    /// Removes a ground item from the map, returning it if it was present.
    pub fn remove_item(&mut self, id: ItemId) -> Option<Item> {
        let index = self.items.iter().position(|item| item.id == id)?;
        Some(self.items.remove(index))
    }

    /// Looks up a ground item by id.
    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Recomputes the field of view from `origin`.
    ///
    /// Walkable floor is transparent; walls block sight but are lit
    /// themselves. The visible mask is rebuilt wholesale, then merged into
    /// the persistent explored mask.
    pub fn update_fov(&mut self, origin: Position, radius: i32) {
        self.visible = fov::compute(&self.tiles, origin, radius);
        self.explored.union_with(&self.visible);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Entity;

    fn open_map(width: u32, height: u32) -> GameMap {
        let mut map = GameMap::new(width, height);
        map.tiles.fill(true);
        map
    }

    #[test]
    fn test_grid_bounds() {
        let grid = Grid::new(4, 3);
        assert!(grid.in_bounds(Position::new(0, 0)));
        assert!(grid.in_bounds(Position::new(3, 2)));
        assert!(!grid.in_bounds(Position::new(4, 0)));
        assert!(!grid.in_bounds(Position::new(0, 3)));
        assert!(!grid.in_bounds(Position::new(-1, 0)));
        assert!(!grid.get(Position::new(-1, 0)));
    }

    #[test]
    fn test_grid_set_get() {
        let mut grid = Grid::new(4, 4);
        grid.set(Position::new(2, 1), true);
        assert!(grid.get(Position::new(2, 1)));
        assert!(!grid.get(Position::new(1, 2)));
        assert_eq!(grid.count_set(), 1);

        // Out-of-bounds writes are silently dropped.
        grid.set(Position::new(9, 9), true);
        assert_eq!(grid.count_set(), 1);
    }

    #[test]
    fn test_grid_union() {
        let mut a = Grid::new(3, 3);
        let mut b = Grid::new(3, 3);
        a.set(Position::new(0, 0), true);
        b.set(Position::new(2, 2), true);
        a.union_with(&b);
        assert!(a.get(Position::new(0, 0)));
        assert!(a.get(Position::new(2, 2)));
        assert_eq!(a.count_set(), 2);
    }

    #[test]
    fn test_walkability() {
        let mut map = GameMap::new(10, 10);
        map.tiles.set(Position::new(5, 5), true);

        assert!(map.is_walkable(Position::new(5, 5)));
        assert!(!map.is_walkable(Position::new(4, 5))); // wall
        assert!(!map.is_walkable(Position::new(-1, 0))); // out of bounds

        map.add_entity(Entity::rat(Position::new(5, 5)));
        assert!(!map.is_walkable(Position::new(5, 5))); // occupied
    }

    #[test]
    fn test_blocking_entity_lookup() {
        let mut map = open_map(10, 10);
        let rat_id = map.add_entity(Entity::rat(Position::new(3, 3)));

        assert_eq!(map.blocking_entity_at(Position::new(3, 3)), Some(rat_id));
        assert_eq!(map.blocking_entity_at(Position::new(4, 3)), None);
    }

    #[test]
    fn test_entity_add_remove() {
        let mut map = open_map(10, 10);
        let id = map.add_entity(Entity::orc(Position::new(2, 2)));
        assert!(map.entity(id).is_some());

        let removed = map.remove_entity(id).expect("entity should be present");
        assert_eq!(removed.id, id);
        assert!(map.entity(id).is_none());
        assert!(map.remove_entity(id).is_none());
    }

    #[test]
    fn test_items_at_preserves_order() {
        use crate::{Item, ItemKind};

        let mut map = open_map(10, 10);
        let pos = Position::new(4, 4);
        let first = map.add_item(Item::new(ItemKind::Sword, pos));
        let second = map.add_item(Item::new(ItemKind::Shield, pos));
        map.add_item(Item::new(ItemKind::HealthPotion, Position::new(5, 5)));

        assert_eq!(map.items_at(pos), vec![first, second]);
        assert_eq!(map.first_item_at(pos), Some(first));
        assert_eq!(map.first_item_at(Position::new(0, 0)), None);
    }

    #[test]
    fn test_update_fov_merges_into_explored() {
        let mut map = open_map(10, 10);
        map.update_fov(Position::new(5, 5), 2);
        assert!(map.visible.get(Position::new(5, 5)));
        assert!(map.explored.get(Position::new(5, 5)));

        let explored_before = map.explored.count_set();
        map.update_fov(Position::new(1, 1), 2);
        assert!(map.explored.count_set() >= explored_before);
        assert!(map.explored.get(Position::new(5, 5))); // still remembered
    }
}
