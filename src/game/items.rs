//! # Items Module
//!
//! Ground items and their effect kinds.
//!
//! Item behavior is a tagged variant rather than a trait hierarchy: the four
//! kinds are data, and [`GameState::use_item`](crate::GameState::use_item)
//! dispatches on the kind in one place.

use crate::{new_item_id, ItemId, Position};
use serde::{Deserialize, Serialize};

/// Hit points restored by a health potion.
pub const POTION_HEAL: i32 = 4;

/// Attack-power modifier granted by a sword.
pub const SWORD_ATTACK_BONUS: i32 = 2;

/// Defense modifier granted by a shield.
pub const SHIELD_DEFENSE_BONUS: i32 = 1;

/// Damage dealt by a lightning scroll. Ignores defense.
pub const SCROLL_DAMAGE: i32 = 6;

/// Maximum distance a lightning scroll can reach.
pub const SCROLL_RANGE: f64 = 5.0;

/// The kinds of item that can spawn in the dungeon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    HealthPotion,
    Sword,
    Shield,
    LightningScroll,
}

impl ItemKind {
    /// All spawnable kinds, for uniform selection during generation.
    pub fn all() -> [ItemKind; 4] {
        [
            ItemKind::HealthPotion,
            ItemKind::Sword,
            ItemKind::Shield,
            ItemKind::LightningScroll,
        ]
    }
}

/// An item, either on the ground or inside an inventory.
///
/// `position` is only meaningful while the item lies on the ground; dropping
/// an item rewrites it to the dropper's cell.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub position: Position,
    pub glyph: char,
    pub color: (u8, u8, u8),
    pub name: String,
    pub description: String,
    pub kind: ItemKind,
}

impl Item {
    pub fn new(kind: ItemKind, position: Position) -> Self {
        let (glyph, color, name, description) = match kind {
            ItemKind::HealthPotion => (
                '!',
                (127, 0, 255),
                "Health Potion",
                "Restores 4 health points",
            ),
            ItemKind::Sword => ('/', (0, 191, 255), "Sword", "Increases attack power by 2"),
            ItemKind::Shield => (']', (139, 101, 8), "Shield", "Increases defense by 1"),
            ItemKind::LightningScroll => (
                '?',
                (255, 255, 128),
                "Lightning Scroll",
                "Deals 6 damage to the nearest enemy",
            ),
        };
        Self {
            id: new_item_id(),
            position,
            glyph,
            color,
            name: name.to_string(),
            description: description.to_string(),
            kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_construction() {
        let potion = Item::new(ItemKind::HealthPotion, Position::new(3, 4));
        assert_eq!(potion.glyph, '!');
        assert_eq!(potion.position, Position::new(3, 4));
        assert_eq!(potion.kind, ItemKind::HealthPotion);

        let scroll = Item::new(ItemKind::LightningScroll, Position::origin());
        assert_eq!(scroll.glyph, '?');
        assert_eq!(scroll.name, "Lightning Scroll");
    }

    #[test]
    fn test_all_kinds_distinct() {
        let kinds = ItemKind::all();
        for (i, a) in kinds.iter().enumerate() {
            for b in kinds.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }
}
