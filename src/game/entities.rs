//! # Entities Module
//!
//! Creatures that occupy the map: their stats, modifiers, and inventories.
//!
//! Entities are owned by the [`GameMap`](crate::GameMap) and referenced
//! everywhere else by [`EntityId`]. The stat block keeps base values separate
//! from a sparse modifier table; combat and item effects always read the
//! effective value, which is a pure fold over the two.

use crate::{config, new_entity_id, EntityId, Item, ItemId, Position};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The stats that can carry additive modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatKind {
    MaxHp,
    AttackPower,
    Defense,
    Speed,
}

/// A creature's stat block.
///
/// `current_hp` is clamped to `[0, max_hp]` by [`EntityStats::take_damage`]
/// and [`EntityStats::heal`]. Modifiers are additive deltas keyed by stat;
/// the effective value of a stat is its base plus the modifier sum.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityStats {
    pub max_hp: i32,
    pub current_hp: i32,
    pub attack_power: i32,
    pub defense: i32,
    pub speed: i32,
    pub modifiers: HashMap<StatKind, i32>,
}

impl EntityStats {
    /// Creates a stat block at full health.
    pub fn new(max_hp: i32, attack_power: i32, defense: i32) -> Self {
        Self {
            max_hp,
            current_hp: max_hp,
            attack_power,
            defense,
            speed: 1,
            modifiers: HashMap::new(),
        }
    }

    fn base(&self, kind: StatKind) -> i32 {
        match kind {
            StatKind::MaxHp => self.max_hp,
            StatKind::AttackPower => self.attack_power,
            StatKind::Defense => self.defense,
            StatKind::Speed => self.speed,
        }
    }

    /// Returns the stat's base value plus its accumulated modifiers.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::{EntityStats, StatKind};
    ///
    /// let mut stats = EntityStats::new(30, 5, 2);
    /// stats.add_modifier(StatKind::AttackPower, 2);
    /// assert_eq!(stats.effective(StatKind::AttackPower), 7);
    /// assert_eq!(stats.effective(StatKind::Defense), 2);
    /// ```
    pub fn effective(&self, kind: StatKind) -> i32 {
        self.base(kind) + self.modifiers.get(&kind).copied().unwrap_or(0)
    }

    /// Adds an additive modifier to a stat.
    pub fn add_modifier(&mut self, kind: StatKind, delta: i32) {
        *self.modifiers.entry(kind).or_insert(0) += delta;
    }

    /// Removes up to `delta` from a stat's modifier, clamping at zero and
    /// dropping the entry when it reaches zero.
    pub fn remove_modifier(&mut self, kind: StatKind, delta: i32) {
        if let Some(current) = self.modifiers.get_mut(&kind) {
            *current = (*current - delta).max(0);
            if *current == 0 {
                self.modifiers.remove(&kind);
            }
        }
    }

    /// Reduces current health, clamping at zero.
    pub fn take_damage(&mut self, amount: i32) {
        self.current_hp = (self.current_hp - amount).max(0);
    }

    /// Restores health, clamping at the maximum.
    pub fn heal(&mut self, amount: i32) {
        self.current_hp = (self.current_hp + amount).min(self.max_hp);
    }

    pub fn is_alive(&self) -> bool {
        self.current_hp > 0
    }
}

/// An entity's carried items.
///
/// Capacity defaults to one slot per letter of the alphabet. Adding to a
/// full inventory fails cleanly and hands the item back to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Inventory {
    capacity: usize,
    items: Vec<Item>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::with_capacity(config::INVENTORY_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            items: Vec::new(),
        }
    }

    /// Adds an item, or returns it unchanged when the inventory is full.
    pub fn add(&mut self, item: Item) -> Result<(), Item> {
        if self.is_full() {
            return Err(item);
        }
        self.items.push(item);
        Ok(())
    }

    /// Removes an item by id, returning it if it was held.
    pub fn remove(&mut self, id: ItemId) -> Option<Item> {
        let index = self.items.iter().position(|item| item.id == id)?;
        Some(self.items.remove(index))
    }

    /// Removes and returns the item in the given slot, if occupied.
    pub fn take_at(&mut self, index: usize) -> Option<Item> {
        if index < self.items.len() {
            Some(self.items.remove(index))
        } else {
            None
        }
    }

    /// Returns the item in the given slot, if occupied.
    pub fn get(&self, index: usize) -> Option<&Item> {
        self.items.get(index)
    }

    /// The held items, in pickup order.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= self.capacity
    }
}

impl Default for Inventory {
    fn default() -> Self {
        Self::new()
    }
}

/// A creature on the map.
///
/// The glyph and color triple exist for the renderer; the core never
/// interprets them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub position: Position,
    pub glyph: char,
    pub color: (u8, u8, u8),
    pub name: String,
    /// Blocking entities prevent movement into their cell; walking into one
    /// attacks it instead.
    pub blocks: bool,
    pub stats: EntityStats,
    pub inventory: Inventory,
}

impl Entity {
    pub fn new(
        position: Position,
        glyph: char,
        color: (u8, u8, u8),
        name: impl Into<String>,
        stats: EntityStats,
        blocks: bool,
    ) -> Self {
        Self {
            id: new_entity_id(),
            position,
            glyph,
            color,
            name: name.into(),
            blocks,
            stats,
            inventory: Inventory::new(),
        }
    }

    /// Creates the player character.
    pub fn player(position: Position) -> Self {
        Self::new(
            position,
            '@',
            (255, 255, 0),
            "Adventurer",
            EntityStats::new(30, 5, 2),
            true,
        )
    }

    pub fn rat(position: Position) -> Self {
        Self::new(
            position,
            'r',
            (150, 150, 150),
            "Rat",
            EntityStats::new(5, 2, 0),
            true,
        )
    }

    pub fn orc(position: Position) -> Self {
        Self::new(
            position,
            'O',
            (0, 255, 0),
            "Orc",
            EntityStats::new(10, 4, 1),
            true,
        )
    }

    pub fn troll(position: Position) -> Self {
        Self::new(
            position,
            'T',
            (255, 0, 0),
            "Troll",
            EntityStats::new(20, 6, 2),
            true,
        )
    }

    pub fn is_alive(&self) -> bool {
        self.stats.is_alive()
    }

    /// Euclidean distance to another position.
    pub fn distance_to(&self, other: Position) -> f64 {
        self.position.euclidean_distance(other)
    }
}
