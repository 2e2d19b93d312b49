//! Game session and turn engine.
//!
//! This module contains `GameSession`: one in-progress game's mutable
//! state, driven turn by turn through [`GameSession::perform_turn`]. A
//! turn runs roll, move, tile-action resolution, win check, and turn
//! advance synchronously, emitting [`GameEvent`]s along the way.

use crate::board::{Board, ConfigError, GraphError, TileId, START_TILE};
use crate::dice::{Dice, DieValue, Randomizer, ThreadRandomizer};
use crate::events::{GameEvent, GameObserver, ObserverId};
use crate::player::{Player, PlayerId, PlayerKind, Token, TokenId, TokenStatus};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Where the session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    /// Ready for the current player's roll
    AwaitingRoll,
    /// Game over
    Finished { winner: PlayerId },
}

/// Caller-contract violations on a live session
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
pub enum StateError {
    #[error("the game is already finished")]
    GameFinished,

    #[error("no player at index {0}")]
    InvalidPlayerIndex(PlayerId),

    #[error("player {player} has no token {token}")]
    InvalidTokenIndex { player: PlayerId, token: TokenId },
}

/// Errors surfaced by [`GameSession::perform_turn`]
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
pub enum GameError {
    #[error(transparent)]
    State(#[from] StateError),

    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// Everything that happened in one completed turn
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnOutcome {
    /// Who took the turn
    pub player: PlayerId,
    /// Faces rolled this turn, in die order
    pub rolls: Vec<DieValue>,
    /// Tile the moved piece settled on after action resolution; `None`
    /// when no piece moved (a Ludo turn with nothing to release or move)
    pub final_tile: Option<TileId>,
    /// Set when this turn won the game
    pub winner: Option<PlayerId>,
    /// Events emitted during the turn, in order
    pub events: Vec<GameEvent>,
}

/// What a single Ludo die does
enum LudoMove {
    /// Put this token onto the start tile
    Release(TokenId),
    /// Advance this token from its current tile
    Advance(TokenId, TileId),
}

/// One in-progress game: board, players, dice, turn pointer, round
/// counter, and the observers watching it.
///
/// Sessions are built once per game and discarded on restart; the board
/// inside is immutable. All game-state mutation flows through
/// [`Self::perform_turn`].
pub struct GameSession {
    /// The immutable board this game is played on
    board: Board,
    /// Players in turn order
    players: Vec<Player>,
    /// The session's dice
    dice: Dice,
    /// Index of the player whose turn it is
    current_player: PlayerId,
    /// Round counter, starting at 1
    round: u32,
    /// Lifecycle phase
    phase: SessionPhase,
    /// Subscribed observers, in subscription order
    observers: Vec<(ObserverId, Box<dyn GameObserver>)>,
    /// Next observer handle to hand out
    next_observer_id: u64,
    /// Source of die faces
    randomizer: Box<dyn Randomizer>,
}

impl fmt::Debug for GameSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameSession")
            .field("board", &self.board.name())
            .field("players", &self.players.len())
            .field("current_player", &self.current_player)
            .field("round", &self.round)
            .field("phase", &self.phase)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl GameSession {
    /// Start a game with the thread RNG rolling the dice.
    ///
    /// All players must belong to the same game family, and every player
    /// starts fresh: race pieces on the start tile, Ludo tokens in the
    /// yard. No session is created if validation fails.
    pub fn new(board: Board, players: Vec<Player>, dice_count: usize) -> Result<Self, ConfigError> {
        Self::with_randomizer(board, players, dice_count, Box::new(ThreadRandomizer))
    }

    /// Start a game rolling dice from a caller-supplied source.
    ///
    /// Pass a seeded randomizer for reproducible games.
    pub fn with_randomizer(
        board: Board,
        mut players: Vec<Player>,
        dice_count: usize,
        randomizer: Box<dyn Randomizer>,
    ) -> Result<Self, ConfigError> {
        if players.is_empty() {
            return Err(ConfigError::NoPlayers);
        }
        let ludo = players[0].is_ludo();
        if players.iter().any(|p| p.is_ludo() != ludo) {
            return Err(ConfigError::MixedPlayerKinds);
        }
        let dice = Dice::new(dice_count)?;

        for player in &mut players {
            player.reset_for_start();
        }

        Ok(Self {
            board,
            players,
            dice,
            current_player: 0,
            round: 1,
            phase: SessionPhase::AwaitingRoll,
            observers: Vec::new(),
            next_observer_id: 0,
            randomizer,
        })
    }

    /// The board this game is played on
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// All players, in turn order
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// Look up a player by index
    pub fn player(&self, index: PlayerId) -> Option<&Player> {
        self.players.get(index)
    }

    /// The player whose turn it is
    pub fn current_player(&self) -> &Player {
        &self.players[self.current_player]
    }

    /// Index of the player whose turn it is
    pub fn current_player_index(&self) -> PlayerId {
        self.current_player
    }

    /// Round counter; starts at 1 and increments when the first player in
    /// turn order begins a new cycle
    pub fn round_number(&self) -> u32 {
        self.round
    }

    /// Lifecycle phase
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// The winning player, once the game is finished
    pub fn winner(&self) -> Option<&Player> {
        match self.phase {
            SessionPhase::Finished { winner } => self.players.get(winner),
            SessionPhase::AwaitingRoll => None,
        }
    }

    /// Whether the game is over
    pub fn is_finished(&self) -> bool {
        matches!(self.phase, SessionPhase::Finished { .. })
    }

    /// The session's dice
    pub fn dice(&self) -> &Dice {
        &self.dice
    }

    /// A Ludo player's token by token number
    pub fn token(&self, player: PlayerId, token: TokenId) -> Result<&Token, StateError> {
        let entry = self
            .players
            .get(player)
            .ok_or(StateError::InvalidPlayerIndex(player))?;
        entry
            .tokens()
            .and_then(|tokens| tokens.iter().find(|t| t.id == token))
            .ok_or(StateError::InvalidTokenIndex { player, token })
    }

    /// Register an observer; events from subsequent turns are pushed to it
    /// synchronously and in order. Returns a handle for
    /// [`Self::unsubscribe`].
    pub fn subscribe<O>(&mut self, observer: O) -> ObserverId
    where
        O: GameObserver + 'static,
    {
        let id = ObserverId(self.next_observer_id);
        self.next_observer_id += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Remove a previously subscribed observer. Returns whether it was
    /// still registered.
    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(observer_id, _)| *observer_id != id);
        self.observers.len() != before
    }

    /// Run one complete turn for the current player: roll the dice, move,
    /// resolve tile actions, check for a win, advance the turn.
    ///
    /// The returned outcome carries the events in emission order; the same
    /// events were already delivered to every subscribed observer. Calling
    /// this after the game finished is a caller error.
    pub fn perform_turn(&mut self) -> Result<TurnOutcome, GameError> {
        if self.is_finished() {
            return Err(StateError::GameFinished.into());
        }

        let player = self.current_player;
        let mut events = Vec::new();

        let rolls = self.dice.roll_all(&mut *self.randomizer).to_vec();
        let total = self.dice.total();
        events.push(GameEvent::DiceRolled {
            player,
            values: rolls.clone(),
            total,
        });

        let final_tile = match self.players[player].current_tile() {
            Some(from) => Some(self.race_move(player, from, total, &mut events)?),
            None => self.ludo_moves(player, &rolls, &mut events)?,
        };

        let winner = self.winner_after_move(player, final_tile);
        if let Some(winner) = winner {
            self.phase = SessionPhase::Finished { winner };
            events.push(GameEvent::GameFinished { winner });
        } else {
            self.advance_turn(&mut events);
        }

        self.notify(&events);

        Ok(TurnOutcome {
            player,
            rolls,
            final_tile,
            winner,
            events,
        })
    }

    /// Move a race piece by the dice total and settle its tile actions.
    /// The piece is only written back once the whole chain resolved.
    fn race_move(
        &mut self,
        player: PlayerId,
        from: TileId,
        steps: u32,
        events: &mut Vec<GameEvent>,
    ) -> Result<TileId, GameError> {
        let landing = self.board.walk(from, steps);
        events.push(GameEvent::PlayerMoved {
            player,
            token: None,
            roll: steps,
            tile: landing,
        });

        let settled = resolve_tile_actions(&self.board, player, None, landing, events)?;
        if let PlayerKind::Race { current_tile } = &mut self.players[player].kind {
            *current_tile = settled;
        }
        Ok(settled)
    }

    /// Apply each die of a Ludo roll in die order: a six releases the
    /// lowest waiting token, otherwise the lowest released token advances;
    /// a die that can do neither is forfeited. A token is only written
    /// once its action chain resolved, as in [`Self::race_move`].
    fn ludo_moves(
        &mut self,
        player: PlayerId,
        rolls: &[DieValue],
        events: &mut Vec<GameEvent>,
    ) -> Result<Option<TileId>, GameError> {
        let terminal = self.terminal_for(player);
        let mut last_settled = None;

        for &die in rolls {
            let choice = match self.players[player].tokens() {
                Some(tokens) => pick_ludo_move(tokens, die),
                None => return Ok(None),
            };

            let moved = match choice {
                Some(LudoMove::Release(token_id)) => {
                    events.push(GameEvent::TokenReleased {
                        player,
                        token: token_id,
                        tile: START_TILE,
                    });
                    let settled = resolve_tile_actions(
                        &self.board,
                        player,
                        Some(token_id),
                        START_TILE,
                        events,
                    )?;
                    self.release_token(player, token_id, settled);
                    Some((token_id, settled))
                }
                Some(LudoMove::Advance(token_id, from)) => {
                    let landing = self.board.walk(from, u32::from(die));
                    events.push(GameEvent::PlayerMoved {
                        player,
                        token: Some(token_id),
                        roll: u32::from(die),
                        tile: landing,
                    });
                    let settled = resolve_tile_actions(
                        &self.board,
                        player,
                        Some(token_id),
                        landing,
                        events,
                    )?;
                    self.place_token(player, token_id, settled);
                    Some((token_id, settled))
                }
                None => None,
            };

            if let Some((token_id, settled)) = moved {
                last_settled = Some(settled);
                if terminal == Some(settled) {
                    self.finish_token(player, token_id);
                    events.push(GameEvent::TokenFinished {
                        player,
                        token: token_id,
                    });
                }
            }
        }

        Ok(last_settled)
    }

    /// Terminal tile that finishes this player's pieces. Currently the
    /// board's shared terminal for both families.
    fn terminal_for(&self, _player: PlayerId) -> Option<TileId> {
        self.board.terminal()
    }

    fn winner_after_move(&self, player: PlayerId, final_tile: Option<TileId>) -> Option<PlayerId> {
        let won = match &self.players[player].kind {
            PlayerKind::Race { .. } => match self.terminal_for(player) {
                Some(terminal) => final_tile == Some(terminal),
                None => false,
            },
            PlayerKind::Ludo { tokens } => tokens.iter().all(Token::is_finished),
        };
        won.then_some(player)
    }

    fn advance_turn(&mut self, events: &mut Vec<GameEvent>) {
        if self.players.len() < 2 {
            return;
        }
        let next = (self.current_player + 1) % self.players.len();
        self.current_player = next;
        events.push(GameEvent::CurrentPlayerChanged { player: next });
        if next == 0 {
            self.round += 1;
            events.push(GameEvent::RoundIncremented { round: self.round });
        }
    }

    fn release_token(&mut self, player: PlayerId, token: TokenId, tile: TileId) {
        if let Some(tokens) = self.players[player].tokens_mut() {
            if let Some(entry) = tokens.iter_mut().find(|t| t.id == token) {
                entry.release(tile);
            }
        }
    }

    fn place_token(&mut self, player: PlayerId, token: TokenId, tile: TileId) {
        if let Some(tokens) = self.players[player].tokens_mut() {
            if let Some(entry) = tokens.iter_mut().find(|t| t.id == token) {
                entry.current_tile = Some(tile);
            }
        }
    }

    fn finish_token(&mut self, player: PlayerId, token: TokenId) {
        if let Some(tokens) = self.players[player].tokens_mut() {
            if let Some(entry) = tokens.iter_mut().find(|t| t.id == token) {
                entry.finish();
            }
        }
    }

    fn notify(&mut self, events: &[GameEvent]) {
        for event in events {
            for (_, observer) in &mut self.observers {
                observer.on_event(event);
            }
        }
    }
}

/// Pick which token a die drives, favoring the lowest token number
fn pick_ludo_move(tokens: &[Token], die: DieValue) -> Option<LudoMove> {
    if die == 6 {
        if let Some(waiting) = tokens.iter().find(|t| t.status == TokenStatus::NotReleased) {
            return Some(LudoMove::Release(waiting.id));
        }
    }
    tokens
        .iter()
        .find(|t| t.is_released())
        .and_then(|t| t.current_tile.map(|tile| LudoMove::Advance(t.id, tile)))
}

/// Apply chained tile actions starting from `landing` until the piece
/// settles on an action-free tile.
///
/// Every relocation fires an event first. The chain is capped at the
/// board's tile count: a longer chain can only be a cycle, and fails
/// instead of looping forever.
fn resolve_tile_actions(
    board: &Board,
    player: PlayerId,
    token: Option<TokenId>,
    landing: TileId,
    events: &mut Vec<GameEvent>,
) -> Result<TileId, GraphError> {
    let cap = board.tile_count();
    let mut current = landing;
    let mut hops = 0;

    loop {
        let action = match board.tile(current).and_then(|t| t.action.clone()) {
            Some(action) => action,
            None => return Ok(current),
        };
        if hops >= cap {
            return Err(GraphError::CyclicActionChain(current));
        }

        let destination = action.destination();
        events.push(GameEvent::TileActionPerformed {
            player,
            token,
            action,
            from: current,
        });
        current = destination;
        hops += 1;
    }
}
