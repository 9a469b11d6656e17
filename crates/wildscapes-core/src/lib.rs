//! Wildscapes - a hex tile-stacking habitat game engine
//!
//! This crate provides the core game logic for Wildscapes, including:
//! - Hex coordinates for the radius-3 personal boards
//! - Terrain tokens and the stacking rules
//! - The token bag, supply slots and animal deck
//! - The turn-phase state machine
//! - Environment scoring over connected regions
//!
//! # Architecture
//!
//! The engine is a pure reducer: [`GameState::apply_action`] takes a snapshot
//! and an action and returns the next snapshot. Shuffles are seeded from the
//! state, so replaying the same actions from the same seed reproduces a game.
//! It can be compiled to:
//! - Native Rust for command-line play and tooling
//! - WebAssembly for a browser front end (feature `wasm`)
//!
//! # Modules
//!
//! - [`hex`]: Axial coordinates and the board bound
//! - [`board`]: Terrain, placed tokens and stacking legality
//! - [`bag`]: Token bag and supply slots
//! - [`animals`]: Animal cards, catalog and habitat matching
//! - [`game`]: Game state machine
//! - [`scoring`]: Environment scoring
//! - [`stats`]: Standings and finished-game statistics
//! - [`persistence`]: Profile and game-record storage

pub mod actions;
pub mod animals;
pub mod bag;
pub mod board;
pub mod bot;
pub mod config;
pub mod game;
pub mod hex;
pub mod persistence;
pub mod player;
pub mod scoring;
pub mod stats;
#[cfg(feature = "wasm")]
pub mod wasm;

// Re-export commonly used types
pub use actions::{GameAction, GameEvent};
pub use animals::{catalog, AnimalCard, AnimalDeck, HabitatCell, HabitatKind, PlacedAnimalEmoji};
pub use bag::{SlotId, TokenBag, TokenSlot};
pub use board::{can_place, Board, PlacedToken, StackCheck, Terrain, TerrainToken};
pub use bot::{Bot, BotDifficulty};
pub use config::{EndGameRule, GameConfig};
pub use game::{GameError, GamePhase, GameState, Transition, TurnPhase};
pub use hex::{HexCoord, HexDirection};
pub use persistence::{
    record_finished_game, MemoryStore, PlayerProfile, ProfileStore, RecordedGame, SaveStatus,
    StoreError, UserRecord,
};
pub use player::{PlayerColor, PlayerId, PlayerSeat, PlayerState};
pub use scoring::{score_environment, EnvironmentScore};
pub use stats::{GameMode, GameStats, Rating, Standing};
