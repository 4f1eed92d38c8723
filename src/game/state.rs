//! # Game State Module
//!
//! The turn resolution engine and session state.
//!
//! [`GameState`] owns the map and arbitrates every action. Resolution is
//! layered: [`GameState::resolve_move`] is the pure arbitration of a move
//! intent (move, attack, or blocked) and never destroys anything, while
//! [`GameState::apply`] is the engine entry point that also removes defeated
//! entities, tracks statistics, advances the turn, and recomputes the field
//! of view before returning.
//!
//! The whole engine is single-threaded and synchronous: exactly one
//! `GameState` is mutated by exactly one logical thread of control, so one
//! applied action fully settles before the next render can observe anything.

use crate::generation::{utils, GenerationConfig, Generator, RoomTunnelGenerator};
use crate::{
    config, ActionOutcome, DelveError, DelveResult, Direction, Entity, EntityId, GameMap, ItemId,
    ItemKind, ItemUse, MoveOutcome, PickupOutcome, PlayerAction, Position, StatKind, POTION_HEAL,
    SCROLL_DAMAGE, SCROLL_RANGE, SHIELD_DEFENSE_BONUS, SWORD_ATTACK_BONUS,
};
use log::{debug, info};
use serde::{Deserialize, Serialize};

/// Session counters for the HUD and post-game summary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameStatistics {
    /// Steps actually taken (blocked moves do not count)
    pub steps_taken: u64,
    /// Total melee and scroll damage dealt by the player
    pub damage_dealt: u64,
    /// Entities the player has destroyed
    pub enemies_defeated: u32,
    /// Items moved from the ground into the player's inventory
    pub items_collected: u32,
}

impl GameStatistics {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Central game state for one dungeon session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// The dungeon map and its occupants
    pub map: GameMap,
    /// The player entity's id
    pub player_id: EntityId,
    /// Completed turns
    pub turn_number: u64,
    /// Field-of-view radius used for every recomputation
    pub fov_radius: i32,
    /// Session statistics
    pub statistics: GameStatistics,
}

impl GameState {
    /// Generates a dungeon and populates it for a fresh session.
    ///
    /// The player spawns at the center of the first accepted room; each later
    /// room gets a monster at its center, cycling through the bestiary the
    /// way the spawn table always has: every third entity a troll, every
    /// second an orc, rats in between.
    ///
    /// Generation that places zero rooms is a startup failure the caller
    /// must surface, not a playable map.
    pub fn new_game(config: &GenerationConfig) -> DelveResult<Self> {
        let mut rng = utils::create_rng(config);
        let generator = RoomTunnelGenerator::new();
        let (mut map, rooms) = generator.generate(config, &mut rng)?;

        let start = rooms
            .first()
            .ok_or_else(|| {
                DelveError::GenerationFailed("no rooms placed; cannot seed a player".to_string())
            })?
            .center();
        let player_id = map.add_entity(Entity::player(start));

        for room in rooms.iter().skip(1) {
            let center = room.center();
            if map.blocking_entity_at(center).is_some() {
                continue;
            }
            let monster = if map.entities.len() % 3 == 0 {
                Entity::troll(center)
            } else if map.entities.len() % 2 == 0 {
                Entity::orc(center)
            } else {
                Entity::rat(center)
            };
            map.add_entity(monster);
        }

        info!(
            "new game: {} rooms, {} monsters, {} items (seed {})",
            rooms.len(),
            map.entities.len() - 1,
            map.items.len(),
            config.seed
        );

        let mut state = Self {
            map,
            player_id,
            turn_number: 0,
            fov_radius: config::DEFAULT_FOV_RADIUS,
            statistics: GameStatistics::new(),
        };
        state.refresh_fov();
        Ok(state)
    }

    /// Builds a session around a prepared map and player.
    ///
    /// Used by embedders and tests that need full control over the layout.
    pub fn from_map(mut map: GameMap, player: Entity) -> Self {
        let player_id = map.add_entity(player);
        let mut state = Self {
            map,
            player_id,
            turn_number: 0,
            fov_radius: config::DEFAULT_FOV_RADIUS,
            statistics: GameStatistics::new(),
        };
        state.refresh_fov();
        state
    }

    /// The player entity, while it is still on the map.
    pub fn player(&self) -> Option<&Entity> {
        self.map.entity(self.player_id)
    }

    /// The player entity, mutably.
    pub fn player_mut(&mut self) -> Option<&mut Entity> {
        self.map.entity_mut(self.player_id)
    }

    /// Whether the session has ended with the player's death.
    pub fn is_game_over(&self) -> bool {
        self.player().map_or(true, |player| !player.is_alive())
    }

    /// Applies one player action, advancing the world by one turn.
    ///
    /// This is the engine entry point the input dispatcher feeds. On top of
    /// the raw resolution it removes defeated defenders from the map,
    /// updates statistics, bumps the turn counter, and recomputes the field
    /// of view from the player's (possibly new) position.
    pub fn apply(&mut self, action: PlayerAction) -> DelveResult<ActionOutcome> {
        let player_id = self.player_id;
        let outcome = match action {
            PlayerAction::Move(direction) => {
                let resolved = self.resolve_move(player_id, direction.to_delta())?;
                match resolved {
                    MoveOutcome::Moved { .. } => self.statistics.steps_taken += 1,
                    MoveOutcome::Attacked {
                        target,
                        damage,
                        defeated,
                    } => {
                        self.statistics.damage_dealt += damage as u64;
                        if defeated {
                            self.map.remove_entity(target);
                            self.statistics.enemies_defeated += 1;
                        }
                    }
                    MoveOutcome::Blocked => {}
                }
                ActionOutcome::Move(resolved)
            }
            PlayerAction::Wait => ActionOutcome::Waited,
            PlayerAction::PickUp => {
                let resolved = self.pick_up(player_id)?;
                if let PickupOutcome::PickedUp(_) = resolved {
                    self.statistics.items_collected += 1;
                }
                ActionOutcome::Pickup(resolved)
            }
            PlayerAction::UseItem(index) => ActionOutcome::Item(self.use_item(player_id, index)?),
            PlayerAction::DropItem(index) => {
                ActionOutcome::Dropped(self.drop_item(player_id, index)?)
            }
        };

        self.turn_number += 1;
        self.refresh_fov();
        Ok(outcome)
    }

    /// Resolves a move intent for any entity without destroying anything.
    ///
    /// Priority order: out of bounds is a silent no-op; a blocking entity at
    /// the destination is attacked in place; otherwise a walkable cell is
    /// stepped onto; otherwise (a wall) nothing happens. The delta is
    /// normally one of the four cardinal steps but any delta resolves.
    ///
    /// Melee damage is `max(0, attacker effective attack − defender
    /// effective defense)`, bumped to 1 when it would be 0 so a cornered
    /// fighter always chips. A defender reduced to 0 hp is reported as
    /// `defeated` but stays on the map; removal belongs to the caller.
    pub fn resolve_move(&mut self, actor: EntityId, delta: Position) -> DelveResult<MoveOutcome> {
        let (from, attack) = {
            let entity = self.require(actor)?;
            (entity.position, entity.stats.effective(StatKind::AttackPower))
        };
        let dest = from + delta;

        if !self.map.in_bounds(dest) {
            return Ok(MoveOutcome::Blocked);
        }

        if let Some(target_id) = self.map.blocking_entity_at(dest) {
            if target_id != actor {
                let target = self.require_mut(target_id)?;
                let defense = target.stats.effective(StatKind::Defense);
                let mut damage = (attack - defense).max(0);
                if damage == 0 {
                    damage = 1;
                }
                target.stats.take_damage(damage);
                let defeated = !target.is_alive();
                debug!(
                    "{} hits {} for {} damage{}",
                    actor,
                    target_id,
                    damage,
                    if defeated { " (defeated)" } else { "" }
                );
                return Ok(MoveOutcome::Attacked {
                    target: target_id,
                    damage,
                    defeated,
                });
            }
        }

        if self.map.is_walkable(dest) {
            if let Some(entity) = self.map.entity_mut(actor) {
                entity.position = dest;
            }
            return Ok(MoveOutcome::Moved { from, to: dest });
        }

        Ok(MoveOutcome::Blocked)
    }

    /// Takes one normalized step toward a target cell.
    ///
    /// The step goes through [`GameState::resolve_move`], so walking into a
    /// blocker attacks it, exactly as a directional intent would.
    pub fn move_towards(&mut self, actor: EntityId, target: Position) -> DelveResult<MoveOutcome> {
        let from = self.require(actor)?.position;
        let distance = from.chebyshev_distance(target);
        if distance == 0 {
            return Ok(MoveOutcome::Blocked);
        }
        let delta = Position::new(
            ((target.x - from.x) as f64 / distance as f64).round() as i32,
            ((target.y - from.y) as f64 / distance as f64).round() as i32,
        );
        self.resolve_move(actor, delta)
    }

    /// Picks up the first ground item at the actor's cell.
    ///
    /// One item per action, in map order. A full inventory leaves the ground
    /// untouched.
    pub fn pick_up(&mut self, actor: EntityId) -> DelveResult<PickupOutcome> {
        let pos = self.require(actor)?.position;
        let Some(item_id) = self.map.first_item_at(pos) else {
            return Ok(PickupOutcome::NothingHere);
        };
        if self.require(actor)?.inventory.is_full() {
            return Ok(PickupOutcome::InventoryFull);
        }

        let item = self
            .map
            .remove_item(item_id)
            .ok_or_else(|| DelveError::InvalidState(format!("item {item_id} vanished")))?;
        match self.require_mut(actor)?.inventory.add(item) {
            Ok(()) => Ok(PickupOutcome::PickedUp(item_id)),
            Err(item) => {
                self.map.add_item(item);
                Ok(PickupOutcome::InventoryFull)
            }
        }
    }

    /// Uses the item in the actor's inventory slot `index`.
    ///
    /// Using a slot the actor does not hold is an [`DelveError::InvalidAction`]
    /// and mutates nothing. Effects that do not apply (potion at full health,
    /// scroll with no target in range) leave the item in the inventory.
    pub fn use_item(&mut self, actor: EntityId, index: usize) -> DelveResult<ItemUse> {
        let (user_pos, item_id, kind) = {
            let entity = self.require(actor)?;
            let item = entity.inventory.get(index).ok_or_else(|| {
                DelveError::InvalidAction(format!("no item in inventory slot {index}"))
            })?;
            (entity.position, item.id, item.kind)
        };

        let consumed = match kind {
            ItemKind::HealthPotion => {
                let stats = &mut self.require_mut(actor)?.stats;
                if stats.current_hp < stats.max_hp {
                    stats.heal(POTION_HEAL);
                    true
                } else {
                    false
                }
            }
            ItemKind::Sword => {
                self.require_mut(actor)?
                    .stats
                    .add_modifier(StatKind::AttackPower, SWORD_ATTACK_BONUS);
                true
            }
            ItemKind::Shield => {
                self.require_mut(actor)?
                    .stats
                    .add_modifier(StatKind::Defense, SHIELD_DEFENSE_BONUS);
                true
            }
            ItemKind::LightningScroll => match self.nearest_living_target(actor, user_pos) {
                Some(target_id) => {
                    // Scroll damage bypasses defense entirely.
                    let target = self.require_mut(target_id)?;
                    target.stats.take_damage(SCROLL_DAMAGE);
                    let defeated = !target.is_alive();
                    debug!("lightning strikes {} for {}", target_id, SCROLL_DAMAGE);
                    if actor == self.player_id {
                        self.statistics.damage_dealt += SCROLL_DAMAGE as u64;
                    }
                    if defeated {
                        self.map.remove_entity(target_id);
                        if actor == self.player_id {
                            self.statistics.enemies_defeated += 1;
                        }
                    }
                    true
                }
                None => false,
            },
        };

        if consumed {
            self.require_mut(actor)?.inventory.remove(item_id);
            Ok(ItemUse::Consumed)
        } else {
            Ok(ItemUse::NotConsumed)
        }
    }

    /// Drops the item in the actor's inventory slot `index` at its feet.
    ///
    /// Dropping from an empty slot is an [`DelveError::InvalidAction`] and
    /// mutates nothing.
    pub fn drop_item(&mut self, actor: EntityId, index: usize) -> DelveResult<ItemId> {
        let (mut item, pos) = {
            let entity = self.require_mut(actor)?;
            let pos = entity.position;
            let item = entity.inventory.take_at(index).ok_or_else(|| {
                DelveError::InvalidAction(format!("no item in inventory slot {index}"))
            })?;
            (item, pos)
        };
        item.position = pos;
        let id = item.id;
        self.map.add_item(item);
        Ok(id)
    }

    /// Recomputes the field of view from the player's position.
    pub fn refresh_fov(&mut self) {
        if let Some(player) = self.player() {
            let pos = player.position;
            self.map.update_fov(pos, self.fov_radius);
        }
    }

    /// The nearest living entity other than `exclude` within scroll range.
    fn nearest_living_target(&self, exclude: EntityId, from: Position) -> Option<EntityId> {
        let mut best: Option<(EntityId, f64)> = None;
        for entity in &self.map.entities {
            if entity.id == exclude || !entity.is_alive() {
                continue;
            }
            let distance = from.euclidean_distance(entity.position);
            if distance <= SCROLL_RANGE && best.map_or(true, |(_, nearest)| distance < nearest) {
                best = Some((entity.id, distance));
            }
        }
        best.map(|(id, _)| id)
    }

    fn require(&self, id: EntityId) -> DelveResult<&Entity> {
        self.map
            .entity(id)
            .ok_or_else(|| DelveError::InvalidState(format!("unknown entity {id}")))
    }

    fn require_mut(&mut self, id: EntityId) -> DelveResult<&mut Entity> {
        self.map
            .entity_mut(id)
            .ok_or_else(|| DelveError::InvalidState(format!("unknown entity {id}")))
    }

    /// Applies a directional move for the player. Equivalent to
    /// `apply(PlayerAction::Move(direction))`, unwrapped to the move outcome.
    pub fn player_move(&mut self, direction: Direction) -> DelveResult<MoveOutcome> {
        match self.apply(PlayerAction::Move(direction))? {
            ActionOutcome::Move(outcome) => Ok(outcome),
            other => Err(DelveError::InvalidState(format!(
                "move resolved to unexpected outcome {other:?}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EntityStats, Item};

    fn open_map(width: u32, height: u32) -> GameMap {
        let mut map = GameMap::new(width, height);
        map.tiles.fill(true);
        map
    }

    fn state_with_player_at(pos: Position) -> GameState {
        GameState::from_map(open_map(10, 10), Entity::player(pos))
    }

    #[test]
    fn test_move_onto_floor() {
        let mut state = state_with_player_at(Position::new(5, 5));
        let outcome = state
            .resolve_move(state.player_id, Position::new(0, -1))
            .expect("player exists");
        assert_eq!(
            outcome,
            MoveOutcome::Moved {
                from: Position::new(5, 5),
                to: Position::new(5, 4)
            }
        );
        assert_eq!(state.player().map(|p| p.position), Some(Position::new(5, 4)));
    }

    #[test]
    fn test_move_out_of_bounds_is_silent() {
        let mut state = state_with_player_at(Position::new(0, 0));
        let outcome = state
            .resolve_move(state.player_id, Position::new(-1, 0))
            .expect("player exists");
        assert_eq!(outcome, MoveOutcome::Blocked);
        assert_eq!(state.player().map(|p| p.position), Some(Position::origin()));
    }

    #[test]
    fn test_move_into_wall_is_blocked() {
        let mut map = open_map(10, 10);
        map.tiles.set(Position::new(5, 4), false);
        let mut state = GameState::from_map(map, Entity::player(Position::new(5, 5)));

        let outcome = state
            .resolve_move(state.player_id, Position::new(0, -1))
            .expect("player exists");
        assert_eq!(outcome, MoveOutcome::Blocked);
        assert_eq!(state.player().map(|p| p.position), Some(Position::new(5, 5)));
    }

    #[test]
    fn test_zero_delta_does_not_self_attack() {
        let mut state = state_with_player_at(Position::new(5, 5));
        let hp_before = state.player().map(|p| p.stats.current_hp);
        let outcome = state
            .resolve_move(state.player_id, Position::new(0, 0))
            .expect("player exists");
        assert_eq!(outcome, MoveOutcome::Blocked);
        assert_eq!(state.player().map(|p| p.stats.current_hp), hp_before);
    }

    #[test]
    fn test_attack_resolution_and_damage() {
        let mut map = open_map(10, 10);
        let rat_id = map.add_entity(Entity::rat(Position::new(6, 5)));
        let mut state = GameState::from_map(map, Entity::player(Position::new(5, 5)));

        // Player attack 5 vs rat defense 0: 5 damage kills the 5 hp rat.
        let outcome = state
            .resolve_move(state.player_id, Position::new(1, 0))
            .expect("player exists");
        assert_eq!(
            outcome,
            MoveOutcome::Attacked {
                target: rat_id,
                damage: 5,
                defeated: true
            }
        );
        // The resolver reports the kill but does not remove the body.
        assert!(state.map.entity(rat_id).is_some());
        // No movement on an attack turn.
        assert_eq!(state.player().map(|p| p.position), Some(Position::new(5, 5)));
    }

    #[test]
    fn test_minimum_chip_damage() {
        let mut map = open_map(10, 10);
        let golem = Entity::new(
            Position::new(6, 5),
            'G',
            (200, 200, 200),
            "Stone Golem",
            EntityStats::new(10, 1, 7),
            true,
        );
        let golem_id = map.add_entity(golem);
        let mut state = GameState::from_map(map, Entity::player(Position::new(5, 5)));

        // Attack 5 vs defense 7 computes 0; the chip rule lands 1.
        let outcome = state
            .resolve_move(state.player_id, Position::new(1, 0))
            .expect("player exists");
        assert_eq!(
            outcome,
            MoveOutcome::Attacked {
                target: golem_id,
                damage: 1,
                defeated: false
            }
        );
    }

    #[test]
    fn test_apply_removes_defeated_defender() {
        let mut map = open_map(10, 10);
        let rat_id = map.add_entity(Entity::rat(Position::new(6, 5)));
        let mut state = GameState::from_map(map, Entity::player(Position::new(5, 5)));

        state
            .apply(PlayerAction::Move(Direction::East))
            .expect("attack resolves");
        assert!(state.map.entity(rat_id).is_none());
        assert_eq!(state.statistics.enemies_defeated, 1);
        assert_eq!(state.statistics.damage_dealt, 5);
        assert_eq!(state.turn_number, 1);
    }

    #[test]
    fn test_move_towards_steps_and_attacks() {
        let mut map = open_map(10, 10);
        let rat_id = map.add_entity(Entity::rat(Position::new(3, 3)));
        let player_pos = Position::new(6, 3);
        let mut state = GameState::from_map(map, Entity::player(player_pos));

        let outcome = state
            .move_towards(rat_id, player_pos)
            .expect("rat exists");
        assert_eq!(
            outcome,
            MoveOutcome::Moved {
                from: Position::new(3, 3),
                to: Position::new(4, 3)
            }
        );

        // Adjacent now-ish: walk the rat up to the player and it attacks.
        state.move_towards(rat_id, player_pos).expect("rat exists");
        let outcome = state.move_towards(rat_id, player_pos).expect("rat exists");
        assert!(matches!(outcome, MoveOutcome::Attacked { .. }));
    }

    #[test]
    fn test_use_item_not_held_is_invalid_action() {
        let mut state = state_with_player_at(Position::new(5, 5));
        let result = state.use_item(state.player_id, 0);
        assert!(matches!(result, Err(DelveError::InvalidAction(_))));
        let result = state.drop_item(state.player_id, 3);
        assert!(matches!(result, Err(DelveError::InvalidAction(_))));
    }

    #[test]
    fn test_unknown_entity_is_invalid_state() {
        let mut state = state_with_player_at(Position::new(5, 5));
        let ghost = crate::new_entity_id();
        let result = state.resolve_move(ghost, Position::new(1, 0));
        assert!(matches!(result, Err(DelveError::InvalidState(_))));
    }

    #[test]
    fn test_pickup_prefers_first_item_in_map_order() {
        let mut map = open_map(10, 10);
        let pos = Position::new(5, 5);
        let sword_id = map.add_item(Item::new(ItemKind::Sword, pos));
        map.add_item(Item::new(ItemKind::Shield, pos));
        let mut state = GameState::from_map(map, Entity::player(pos));

        let outcome = state.pick_up(state.player_id).expect("player exists");
        assert_eq!(outcome, PickupOutcome::PickedUp(sword_id));
        assert_eq!(state.map.items.len(), 1);
        assert_eq!(state.player().map(|p| p.inventory.len()), Some(1));
    }
}
