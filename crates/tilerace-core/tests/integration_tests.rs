//! Integration tests for the tilerace game engine.
//!
//! These tests drive complete game flows through the public API: boards
//! and rosters loaded from their file formats, sessions played turn by
//! turn, and events checked end to end.

use std::cell::RefCell;
use std::rc::Rc;
use tilerace_core::*;

/// Die faces scripted in advance, cycling when exhausted
struct FixedRolls {
    faces: Vec<DieValue>,
    next: usize,
}

impl FixedRolls {
    fn new(faces: &[DieValue]) -> Box<Self> {
        Box::new(Self {
            faces: faces.to_vec(),
            next: 0,
        })
    }
}

impl Randomizer for FixedRolls {
    fn next_face(&mut self) -> DieValue {
        let face = self.faces[self.next % self.faces.len()];
        self.next += 1;
        face
    }
}

/// Build a straight board with ids 0..len-1 and the last tile terminal
fn linear_board(len: u32) -> Board {
    let tiles = (0..len)
        .map(|id| {
            if id + 1 < len {
                Tile::with_successor(id, id + 1)
            } else {
                Tile::new(id)
            }
        })
        .collect();
    Board::build(BoardMeta::default(), tiles).unwrap()
}

fn race_players(names: &[&str]) -> Vec<Player> {
    names
        .iter()
        .enumerate()
        .map(|(i, name)| Player::new_race(*name, PlayerColor::for_player(i)).unwrap())
        .collect()
}

/// Subscribe a collector that copies every event the session emits
fn collect_events(session: &mut GameSession) -> Rc<RefCell<Vec<GameEvent>>> {
    let log: Rc<RefCell<Vec<GameEvent>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    session.subscribe(move |event: &GameEvent| sink.borrow_mut().push(event.clone()));
    log
}

#[test]
fn test_slide_returns_player_to_start() {
    // Three tiles; landing on tile 1 slides back to tile 0.
    let board = parse_board(
        r#"{"tiles":[
            {"id":0,"nextTile":1},
            {"id":1,"nextTile":2,"action":{"destinationTileId":0,"description":"back to start"}},
            {"id":2,"nextTile":2}
        ]}"#,
    )
    .unwrap();
    assert_eq!(board.terminal(), Some(2));

    let mut session = GameSession::with_randomizer(
        board,
        race_players(&["Solo"]),
        1,
        FixedRolls::new(&[1]),
    )
    .unwrap();
    let log = collect_events(&mut session);

    let outcome = session.perform_turn().unwrap();

    assert_eq!(outcome.final_tile, Some(0));
    assert_eq!(session.current_player().current_tile(), Some(0));
    assert_eq!(session.round_number(), 1);
    assert_eq!(session.current_player_index(), 0);
    assert!(session.winner().is_none());

    let events = log.borrow();
    assert_eq!(events.len(), 3);
    assert!(matches!(
        events[0],
        GameEvent::DiceRolled { player: 0, total: 1, .. }
    ));
    assert!(matches!(
        events[1],
        GameEvent::PlayerMoved {
            player: 0,
            token: None,
            roll: 1,
            tile: 1,
        }
    ));
    assert!(matches!(
        events[2],
        GameEvent::TileActionPerformed { player: 0, from: 1, .. }
    ));
}

#[test]
fn test_exact_roll_sum_finishes_two_player_game() {
    // Terminal tile id 10; Alice's rolls sum to exactly 10 across turns.
    let mut session = GameSession::with_randomizer(
        linear_board(11),
        race_players(&["Alice", "Bob"]),
        1,
        FixedRolls::new(&[6, 2, 4]),
    )
    .unwrap();
    let log = collect_events(&mut session);

    let first = session.perform_turn().unwrap();
    let second = session.perform_turn().unwrap();
    let winning = session.perform_turn().unwrap();

    assert_eq!(winning.winner, Some(0));
    assert_eq!(winning.final_tile, Some(10));
    assert!(session.is_finished());
    assert_eq!(session.winner().unwrap().name, "Alice");

    let finishes = log
        .borrow()
        .iter()
        .filter(|e| matches!(e, GameEvent::GameFinished { winner: 0 }))
        .count();
    assert_eq!(finishes, 1);

    assert!(matches!(
        session.perform_turn(),
        Err(GameError::State(StateError::GameFinished))
    ));
    // The failed call emits nothing.
    let delivered = first.events.len() + second.events.len() + winning.events.len();
    assert_eq!(log.borrow().len(), delivered);
}

#[test]
fn test_turn_order_and_rounds_across_a_table() {
    let mut session = GameSession::with_randomizer(
        linear_board(100),
        race_players(&["Ann", "Ben", "Cleo"]),
        1,
        FixedRolls::new(&[1]),
    )
    .unwrap();

    assert_eq!(session.round_number(), 1);
    for expected in [1, 2, 0] {
        session.perform_turn().unwrap();
        assert_eq!(session.current_player_index(), expected);
    }
    assert_eq!(session.round_number(), 2);

    for expected in [1, 2, 0] {
        session.perform_turn().unwrap();
        assert_eq!(session.current_player_index(), expected);
    }
    assert_eq!(session.round_number(), 3);
}

#[test]
fn test_standard_ladder_game_runs_to_completion() {
    let board = Board::standard_ladder();
    let terminal = board.terminal().unwrap();

    let mut session = GameSession::with_randomizer(
        board,
        race_players(&["Alice", "Bob"]),
        1,
        Box::new(SeededRandomizer::new(42)),
    )
    .unwrap();
    let log = collect_events(&mut session);

    let mut turns = 0;
    while !session.is_finished() {
        session.perform_turn().unwrap();
        turns += 1;
        assert!(turns < 10_000, "game should finish");
    }

    let winner = session.winner().unwrap();
    assert_eq!(winner.current_tile(), Some(terminal));

    let finishes = log
        .borrow()
        .iter()
        .filter(|e| matches!(e, GameEvent::GameFinished { .. }))
        .count();
    assert_eq!(finishes, 1);
}

#[test]
fn test_ludo_game_from_roster_to_victory() {
    let records = parse_players("name, colorHex\nAlice,#FF0000\nBob,#00FF00").unwrap();
    let players: Vec<Player> = records
        .into_iter()
        .enumerate()
        .map(|(i, record)| record.into_ludo_player(i).unwrap())
        .collect();

    // Two-tile track: Alice releases on a six and finishes with a one;
    // Bob never rolls a six and forfeits every die.
    let faces = [6, 1, 1, 1, 6, 1, 1, 1, 6, 1, 1, 1, 6, 1, 1];
    let mut session =
        GameSession::with_randomizer(linear_board(2), players, 1, FixedRolls::new(&faces))
            .unwrap();
    let log = collect_events(&mut session);

    while !session.is_finished() {
        session.perform_turn().unwrap();
    }

    assert_eq!(session.winner().unwrap().name, "Alice");
    assert!(session
        .player(0)
        .unwrap()
        .tokens()
        .unwrap()
        .iter()
        .all(|t| t.is_finished()));
    assert!(session
        .player(1)
        .unwrap()
        .tokens()
        .unwrap()
        .iter()
        .all(|t| t.status == TokenStatus::NotReleased));

    let events = log.borrow();
    let releases = events
        .iter()
        .filter(|e| matches!(e, GameEvent::TokenReleased { player: 0, .. }))
        .count();
    let token_finishes = events
        .iter()
        .filter(|e| matches!(e, GameEvent::TokenFinished { player: 0, .. }))
        .count();
    assert_eq!(releases, TOKENS_PER_PLAYER);
    assert_eq!(token_finishes, TOKENS_PER_PLAYER);
}

#[test]
fn test_board_survives_write_and_reload() {
    let original = Board::standard_ludo();
    let document = write_board(&original).unwrap();
    let reloaded = parse_board(&document).unwrap();

    assert_eq!(reloaded.tile_count(), original.tile_count());
    assert_eq!(reloaded.terminal(), original.terminal());
    assert_eq!(reloaded.name(), original.name());
}

#[test]
fn test_same_seed_replays_the_same_game() {
    let run = |seed: u64| -> Vec<GameEvent> {
        let mut session = GameSession::with_randomizer(
            Board::standard_ladder(),
            race_players(&["Alice", "Bob"]),
            2,
            Box::new(SeededRandomizer::new(seed)),
        )
        .unwrap();

        let mut events = Vec::new();
        for _ in 0..25 {
            if session.is_finished() {
                break;
            }
            let outcome = session.perform_turn().unwrap();
            events.extend(outcome.events);
        }
        events
    };

    assert_eq!(run(7), run(7));
    assert_ne!(run(7), run(8));
}

#[test]
fn test_unsubscribed_observer_misses_later_turns() {
    let mut session = GameSession::with_randomizer(
        linear_board(60),
        race_players(&["Alice", "Bob"]),
        1,
        FixedRolls::new(&[2]),
    )
    .unwrap();

    let log = collect_events(&mut session);
    let counting: Rc<RefCell<usize>> = Rc::new(RefCell::new(0));
    let counter = Rc::clone(&counting);
    let id = session.subscribe(move |_: &GameEvent| *counter.borrow_mut() += 1);

    session.perform_turn().unwrap();
    let after_first = *counting.borrow();
    assert!(after_first > 0);

    assert!(session.unsubscribe(id));
    session.perform_turn().unwrap();

    assert_eq!(*counting.borrow(), after_first);
    assert!(log.borrow().len() > after_first);
}
