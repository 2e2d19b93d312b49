//! Game lifecycle events and the observer boundary.
//!
//! The turn engine reports everything that happens through [`GameEvent`]
//! values: they are returned from `perform_turn` in order and pushed to
//! every subscribed [`GameObserver`] during the call. Presentation code
//! consumes events; it never mutates the session from inside a callback.

use crate::board::{TileAction, TileId};
use crate::dice::DieValue;
use crate::player::{PlayerId, TokenId};
use serde::{Deserialize, Serialize};

/// Something that happened during a turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameEvent {
    /// Dice were rolled
    DiceRolled {
        player: PlayerId,
        values: Vec<DieValue>,
        total: u32,
    },

    /// A piece moved along the successor chain; `tile` is where the roll
    /// landed it, before any tile action fires
    PlayerMoved {
        player: PlayerId,
        token: Option<TokenId>,
        roll: u32,
        tile: TileId,
    },

    /// A slide or portal relocated a piece that landed on `from`
    TileActionPerformed {
        player: PlayerId,
        token: Option<TokenId>,
        action: TileAction,
        from: TileId,
    },

    /// A Ludo token entered the track
    TokenReleased {
        player: PlayerId,
        token: TokenId,
        tile: TileId,
    },

    /// A Ludo token reached home and left the track
    TokenFinished { player: PlayerId, token: TokenId },

    /// The turn passed to another player
    CurrentPlayerChanged { player: PlayerId },

    /// The first player in turn order began a new cycle
    RoundIncremented { round: u32 },

    /// The game ended with a winner
    GameFinished { winner: PlayerId },
}

impl GameEvent {
    /// The player this event is about, when it is about one
    pub fn player(&self) -> Option<PlayerId> {
        match self {
            GameEvent::DiceRolled { player, .. }
            | GameEvent::PlayerMoved { player, .. }
            | GameEvent::TileActionPerformed { player, .. }
            | GameEvent::TokenReleased { player, .. }
            | GameEvent::TokenFinished { player, .. }
            | GameEvent::CurrentPlayerChanged { player } => Some(*player),
            GameEvent::GameFinished { winner } => Some(*winner),
            GameEvent::RoundIncremented { .. } => None,
        }
    }
}

/// Handle returned by `subscribe`, used to unsubscribe later
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(pub(crate) u64);

/// Receiver for game events, notified synchronously and in order
///
/// Implemented for any `FnMut(&GameEvent)` closure, so simple hosts can
/// subscribe a closure directly.
pub trait GameObserver {
    /// Handle one event
    fn on_event(&mut self, event: &GameEvent);
}

impl<F> GameObserver for F
where
    F: FnMut(&GameEvent),
{
    fn on_event(&mut self, event: &GameEvent) {
        self(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_closures_are_observers() {
        let mut seen = Vec::new();
        let mut observer = |event: &GameEvent| seen.push(event.clone());
        observer.on_event(&GameEvent::RoundIncremented { round: 2 });
        assert_eq!(seen, vec![GameEvent::RoundIncremented { round: 2 }]);
    }

    #[test]
    fn test_event_player_helper() {
        let moved = GameEvent::PlayerMoved {
            player: 1,
            token: None,
            roll: 4,
            tile: 4,
        };
        assert_eq!(moved.player(), Some(1));

        let finished = GameEvent::GameFinished { winner: 0 };
        assert_eq!(finished.player(), Some(0));

        let round = GameEvent::RoundIncremented { round: 3 };
        assert_eq!(round.player(), None);
    }

    #[test]
    fn test_events_serialize_with_snake_case_tags() {
        let event = GameEvent::GameFinished { winner: 2 };
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, "{\"game_finished\":{\"winner\":2}}");

        let back: GameEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }
}
