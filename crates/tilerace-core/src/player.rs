//! Players, tokens, and their visual identity.
//!
//! This module contains:
//! - Validated player colors (#RRGGBB) and token shapes
//! - The Ludo token lifecycle (not released / released / finished)
//! - The `Player` struct with its family-specific state

use crate::board::{ConfigError, TileId, START_TILE};
use serde::{Deserialize, Serialize};

/// Player identifier: the player's index in session turn order
pub type PlayerId = usize;

/// Token number within a Ludo player's set (1 through 4)
pub type TokenId = u8;

/// Tokens per Ludo player
pub const TOKENS_PER_PLAYER: usize = 4;

/// Default color cycle for seats without an explicit color
const DEFAULT_PALETTE: [&str; 6] = [
    "#E74C3C", "#3498DB", "#2ECC71", "#F1C40F", "#9B59B6", "#E67E22",
];

/// A validated player color in `#RRGGBB` form
///
/// Stored normalized to uppercase hex; construction rejects anything that
/// is not a `#` followed by exactly six hex digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PlayerColor(String);

impl PlayerColor {
    /// Validate and normalize a `#RRGGBB` string
    pub fn new(hex: &str) -> Result<Self, ConfigError> {
        let digits = match hex.strip_prefix('#') {
            Some(digits) => digits,
            None => return Err(ConfigError::InvalidColor(hex.to_string())),
        };
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ConfigError::InvalidColor(hex.to_string()));
        }
        Ok(Self(format!("#{}", digits.to_ascii_uppercase())))
    }

    /// Default color for a player index, cycling a fixed palette
    pub fn for_player(index: PlayerId) -> Self {
        Self(DEFAULT_PALETTE[index % DEFAULT_PALETTE.len()].to_string())
    }

    /// The normalized `#RRGGBB` string
    pub fn as_hex(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PlayerColor {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<PlayerColor> for String {
    fn from(color: PlayerColor) -> Self {
        color.0
    }
}

/// Visual token shape for UI rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenShape {
    Circle,
    Square,
    Triangle,
    Star,
}

impl TokenShape {
    /// All shapes, in default assignment order
    pub const ALL: [TokenShape; 4] = [
        TokenShape::Circle,
        TokenShape::Square,
        TokenShape::Triangle,
        TokenShape::Star,
    ];

    /// Default shape for a player index, cycling through [`Self::ALL`]
    pub fn for_index(index: PlayerId) -> Self {
        Self::ALL[index % Self::ALL.len()]
    }
}

/// Where a Ludo token is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenStatus {
    /// Waiting in the yard, not on the track yet
    NotReleased,
    /// On the track
    Released,
    /// Reached home; out of play
    Finished,
}

/// One of a Ludo player's four tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Token number, 1 through 4
    pub id: TokenId,
    /// Lifecycle state
    pub status: TokenStatus,
    /// Tile the token stands on; `None` before release and after finishing
    pub current_tile: Option<TileId>,
}

impl Token {
    /// Fresh token waiting in the yard
    pub fn new(id: TokenId) -> Self {
        Self {
            id,
            status: TokenStatus::NotReleased,
            current_tile: None,
        }
    }

    /// Put the token on the track at `tile`
    pub fn release(&mut self, tile: TileId) {
        self.status = TokenStatus::Released;
        self.current_tile = Some(tile);
    }

    /// Take the token off the track for good
    pub fn finish(&mut self) {
        self.status = TokenStatus::Finished;
        self.current_tile = None;
    }

    /// Whether the token is on the track
    pub fn is_released(&self) -> bool {
        self.status == TokenStatus::Released
    }

    /// Whether the token has reached home
    pub fn is_finished(&self) -> bool {
        self.status == TokenStatus::Finished
    }
}

fn fresh_tokens() -> [Token; TOKENS_PER_PLAYER] {
    std::array::from_fn(|i| Token::new(i as TokenId + 1))
}

/// Family-specific player state
///
/// A tagged variant rather than a trait hierarchy: the turn engine pattern
/// matches on the family once per turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerKind {
    /// Ladder-family racer with a single piece on the track
    Race {
        /// Tile the piece stands on
        current_tile: TileId,
    },
    /// Ludo-family player owning four tokens
    Ludo {
        /// The player's tokens, in id order
        tokens: [Token; TOKENS_PER_PLAYER],
    },
}

/// A participant in a game session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Display name, never blank
    pub name: String,
    /// UI color
    pub color: PlayerColor,
    /// UI token shape
    pub shape: TokenShape,
    /// Whether this seat is machine-driven; bots roll exactly like humans
    pub is_bot: bool,
    /// Family-specific state
    pub kind: PlayerKind,
}

impl Player {
    /// Create a ladder-family player standing on the start tile
    pub fn new_race(name: impl Into<String>, color: PlayerColor) -> Result<Self, ConfigError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ConfigError::BlankName);
        }
        Ok(Self {
            name,
            color,
            shape: TokenShape::Circle,
            is_bot: false,
            kind: PlayerKind::Race {
                current_tile: START_TILE,
            },
        })
    }

    /// Create a Ludo-family player with four unreleased tokens
    pub fn new_ludo(name: impl Into<String>, color: PlayerColor) -> Result<Self, ConfigError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ConfigError::BlankName);
        }
        Ok(Self {
            name,
            color,
            shape: TokenShape::Circle,
            is_bot: false,
            kind: PlayerKind::Ludo {
                tokens: fresh_tokens(),
            },
        })
    }

    /// Whether this player plays the Ludo family
    pub fn is_ludo(&self) -> bool {
        matches!(self.kind, PlayerKind::Ludo { .. })
    }

    /// Tile the race piece stands on; `None` for Ludo players
    pub fn current_tile(&self) -> Option<TileId> {
        match &self.kind {
            PlayerKind::Race { current_tile } => Some(*current_tile),
            PlayerKind::Ludo { .. } => None,
        }
    }

    /// A Ludo player's tokens, in id order
    pub fn tokens(&self) -> Option<&[Token; TOKENS_PER_PLAYER]> {
        match &self.kind {
            PlayerKind::Ludo { tokens } => Some(tokens),
            PlayerKind::Race { .. } => None,
        }
    }

    /// Mutable access to a Ludo player's tokens
    pub fn tokens_mut(&mut self) -> Option<&mut [Token; TOKENS_PER_PLAYER]> {
        match &mut self.kind {
            PlayerKind::Ludo { tokens } => Some(tokens),
            PlayerKind::Race { .. } => None,
        }
    }

    /// Put the player back in a fresh start-of-game state
    pub fn reset_for_start(&mut self) {
        match &mut self.kind {
            PlayerKind::Race { current_tile } => *current_tile = START_TILE,
            PlayerKind::Ludo { tokens } => *tokens = fresh_tokens(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_color_normalizes_to_uppercase() {
        let color = PlayerColor::new("#ff00aa").unwrap();
        assert_eq!(color.as_hex(), "#FF00AA");
    }

    #[test]
    fn test_color_rejects_missing_hash() {
        assert!(matches!(
            PlayerColor::new("FF0000"),
            Err(ConfigError::InvalidColor(_))
        ));
    }

    #[test]
    fn test_color_rejects_wrong_length() {
        assert!(PlayerColor::new("#FFF").is_err());
        assert!(PlayerColor::new("#FF00AA00").is_err());
    }

    #[test]
    fn test_color_rejects_non_hex_digits() {
        assert!(PlayerColor::new("#GG0000").is_err());
    }

    #[test]
    fn test_color_serde_validates_on_deserialize() {
        let color: PlayerColor = serde_json::from_str("\"#ff0000\"").unwrap();
        assert_eq!(color.as_hex(), "#FF0000");
        assert!(serde_json::from_str::<PlayerColor>("\"red\"").is_err());
    }

    #[test]
    fn test_palette_cycles_and_is_valid() {
        assert_eq!(PlayerColor::for_player(0), PlayerColor::for_player(6));
        for i in 0..DEFAULT_PALETTE.len() {
            let color = PlayerColor::for_player(i);
            assert!(PlayerColor::new(color.as_hex()).is_ok());
        }
    }

    #[test]
    fn test_shape_for_index_cycles() {
        assert_eq!(TokenShape::for_index(0), TokenShape::Circle);
        assert_eq!(TokenShape::for_index(3), TokenShape::Star);
        assert_eq!(TokenShape::for_index(4), TokenShape::Circle);
    }

    #[test]
    fn test_token_lifecycle() {
        let mut token = Token::new(1);
        assert_eq!(token.status, TokenStatus::NotReleased);
        assert_eq!(token.current_tile, None);

        token.release(START_TILE);
        assert!(token.is_released());
        assert_eq!(token.current_tile, Some(START_TILE));

        token.finish();
        assert!(token.is_finished());
        assert_eq!(token.current_tile, None);
    }

    #[test]
    fn test_new_race_rejects_blank_name() {
        let result = Player::new_race("   ", PlayerColor::for_player(0));
        assert!(matches!(result, Err(ConfigError::BlankName)));
    }

    #[test]
    fn test_new_race_starts_on_start_tile() {
        let player = Player::new_race("Alice", PlayerColor::for_player(0)).unwrap();
        assert_eq!(player.current_tile(), Some(START_TILE));
        assert!(!player.is_ludo());
        assert!(player.tokens().is_none());
    }

    #[test]
    fn test_new_ludo_has_four_fresh_tokens() {
        let player = Player::new_ludo("Bob", PlayerColor::for_player(1)).unwrap();
        let tokens = player.tokens().unwrap();
        let ids: Vec<TokenId> = tokens.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
        assert!(tokens.iter().all(|t| t.status == TokenStatus::NotReleased));
        assert_eq!(player.current_tile(), None);
    }

    #[test]
    fn test_reset_for_start() {
        let mut racer = Player::new_race("Alice", PlayerColor::for_player(0)).unwrap();
        racer.kind = PlayerKind::Race { current_tile: 17 };
        racer.reset_for_start();
        assert_eq!(racer.current_tile(), Some(START_TILE));

        let mut ludo = Player::new_ludo("Bob", PlayerColor::for_player(1)).unwrap();
        ludo.tokens_mut().unwrap()[2].release(START_TILE);
        ludo.reset_for_start();
        assert!(ludo
            .tokens()
            .unwrap()
            .iter()
            .all(|t| t.status == TokenStatus::NotReleased));
    }
}
