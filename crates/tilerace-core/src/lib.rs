//! Tilerace - a turn-based tile-graph board game engine
//!
//! This crate provides the core logic for two game families played on the
//! same kind of board: a ladder/slide/portal race and a Ludo-style token
//! race. It covers:
//! - The tile graph: validated directed boards with slide/portal actions
//! - The turn engine: roll, move, chained action resolution, win detection
//! - Board and roster file formats with precise parse errors
//! - A synchronous event stream for presentation layers
//!
//! # Architecture
//!
//! The engine is presentation-agnostic and fully synchronous: a host
//! (GUI, CLI, bot harness) builds a [`Board`] and a player list, starts a
//! [`GameSession`], and calls [`GameSession::perform_turn`] once per turn.
//! Everything that happens is reported as [`GameEvent`] values, both in
//! the returned outcome and through subscribed observers.
//!
//! # Modules
//!
//! - [`board`]: tiles, actions, and validated board building
//! - [`dice`]: dice state and the pluggable randomness source
//! - [`player`]: players, colors, shapes, and Ludo tokens
//! - [`events`]: the game event enum and observer boundary
//! - [`game`]: the game session and turn engine
//! - [`loader`]: board JSON and roster text formats

pub mod board;
pub mod dice;
pub mod events;
pub mod game;
pub mod loader;
pub mod player;

// Re-export commonly used types
pub use board::{
    Board, BoardMeta, ConfigError, Coordinates, Dimensions, GraphError, Tile, TileAction, TileId,
    START_TILE,
};
pub use dice::{
    Dice, DieValue, OutOfRange, Randomizer, SeededRandomizer, ThreadRandomizer, UNROLLED,
};
pub use events::{GameEvent, GameObserver, ObserverId};
pub use game::{GameError, GameSession, SessionPhase, StateError, TurnOutcome};
pub use loader::{
    parse_board, parse_players, write_board, write_players, ParseError, PlayerRecord,
};
pub use player::{
    Player, PlayerColor, PlayerId, PlayerKind, Token, TokenId, TokenShape, TokenStatus,
    TOKENS_PER_PLAYER,
};
