//! # Delve
//!
//! Core engine for a terminal roguelike dungeon-crawler.
//!
//! ## Architecture Overview
//!
//! Delve is a library crate: it owns the game model and the algorithms, while
//! rendering and keyboard dispatch live in the embedding application. The core
//! is built from a few cooperating pieces:
//!
//! - **Game State**: turn resolution, spawning, and statistics for one session
//! - **Spatial Grid**: the dungeon map with walkability, visibility, and
//!   exploration rasters plus the entities and items occupying it
//! - **Field of View**: symmetric shadowcasting visibility computation
//! - **Generation System**: procedural room-and-tunnel dungeon layouts
//!
//! A renderer reads [`GameMap`] grids and the entity/item collections each
//! frame; an input dispatcher translates key events into [`PlayerAction`]
//! values and feeds them to [`GameState::apply`]. The core never touches a
//! terminal, a file, or a socket.
//!
//! Everything is single-threaded and synchronous: one resolved player action
//! advances the world by one turn, and the field of view is recomputed before
//! the call returns.

pub mod game;
pub mod generation;

// Core module re-exports
pub use game::*;
pub use generation::*;

/// Core error type for the Delve engine.
#[derive(thiserror::Error, Debug)]
pub enum DelveError {
    /// Game state is invalid
    #[error("Invalid game state: {0}")]
    InvalidState(String),

    /// Action cannot be performed
    #[error("Invalid action: {0}")]
    InvalidAction(String),

    /// Generation failed
    #[error("Generation failed: {0}")]
    GenerationFailed(String),
}

/// Result type used throughout the Delve codebase.
pub type DelveResult<T> = Result<T, DelveError>;

/// Version information for the engine.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Game configuration constants.
pub mod config {
    /// Default dungeon width in tiles
    pub const DEFAULT_MAP_WIDTH: u32 = 80;

    /// Default dungeon height in tiles
    pub const DEFAULT_MAP_HEIGHT: u32 = 43;

    /// Default field-of-view radius in tiles
    pub const DEFAULT_FOV_RADIUS: i32 = 8;

    /// Inventory slots per entity (one per letter of the alphabet)
    pub const INVENTORY_CAPACITY: usize = 26;
}
