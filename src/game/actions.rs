//! # Actions Module
//!
//! Player intents and the typed outcomes of resolving them.
//!
//! The input dispatcher (outside this crate) translates raw key events into
//! [`PlayerAction`] values; the core exposes no notion of key codes. Expected
//! failures — blocked moves, empty pickups, full inventories — are outcome
//! variants, not errors.

use crate::{Direction, EntityId, ItemId, Position};
use serde::{Deserialize, Serialize};

/// An intent produced by the input dispatcher for one player turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerAction {
    /// Step (or attack) in a cardinal direction.
    Move(Direction),
    /// Spend the turn doing nothing.
    Wait,
    /// Pick up the first item at the player's cell.
    PickUp,
    /// Use the item in the given inventory slot.
    UseItem(usize),
    /// Drop the item in the given inventory slot.
    DropItem(usize),
}

/// How a move intent resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveOutcome {
    /// The entity stepped onto the destination cell.
    Moved { from: Position, to: Position },
    /// A blocking entity occupied the destination; a melee attack happened
    /// instead and the actor did not move.
    Attacked {
        target: EntityId,
        damage: i32,
        defeated: bool,
    },
    /// Out of bounds, wall, or otherwise impassable. Nothing changed.
    Blocked,
}

/// How a pickup intent resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PickupOutcome {
    /// The item moved from the ground into the actor's inventory.
    PickedUp(ItemId),
    /// No item at the actor's cell.
    NothingHere,
    /// The inventory is at capacity; the item stays on the ground.
    InventoryFull,
}

/// Whether using an item spent it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemUse {
    /// The effect applied and the item left the inventory.
    Consumed,
    /// The effect did not apply; the item is still held.
    NotConsumed,
}

/// The resolution of one applied [`PlayerAction`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionOutcome {
    Move(MoveOutcome),
    Pickup(PickupOutcome),
    Item(ItemUse),
    Dropped(ItemId),
    Waited,
}
