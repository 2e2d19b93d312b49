//! Tile graph representation: tiles, actions, and the validated board.
//!
//! This module contains:
//! - Tile and action types (slides and portals)
//! - Board metadata (name, dimensions, background)
//! - Board building with graph validation
//! - Successor-chain walking with terminal clamping
//! - Ready-to-play standard boards

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;

/// Tile identifier (non-negative, unique within a board)
pub type TileId = u32;

/// The tile every game starts from
pub const START_TILE: TileId = 0;

/// Errors from invalid construction arguments
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
pub enum ConfigError {
    #[error("player name must not be blank")]
    BlankName,

    #[error("'{0}' is not a valid #RRGGBB color")]
    InvalidColor(String),

    #[error("dice count must be at least 1 (got {0})")]
    DiceCount(usize),

    #[error("at least one player is required")]
    NoPlayers,

    #[error("all players in a session must belong to the same game family")]
    MixedPlayerKinds,

    #[error("board dimensions must be positive (got {rows}x{columns})")]
    NonPositiveDimensions { rows: u32, columns: u32 },
}

/// Errors detected while building or traversing a board
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
pub enum GraphError {
    #[error("board has no tiles")]
    EmptyBoard,

    #[error("duplicate tile id {0}")]
    DuplicateTileId(TileId),

    #[error("reference to missing tile {0}")]
    DanglingReference(TileId),

    #[error("tile {0} lists itself as its own successor")]
    SelfSuccessor(TileId),

    #[error("action chain through tile {0} never settles")]
    CyclicActionChain(TileId),
}

/// Grid position of a tile, for presentation layers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Row on the board grid
    pub row: u32,
    /// Column on the board grid
    pub col: u32,
}

impl Coordinates {
    /// Create a grid position
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }
}

/// Board grid size
///
/// Both sides are at least 1; construction and deserialization share the
/// same validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawDimensions", into = "RawDimensions")]
pub struct Dimensions {
    rows: u32,
    columns: u32,
}

/// Unvalidated serde mirror of [`Dimensions`]
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct RawDimensions {
    rows: u32,
    columns: u32,
}

impl Dimensions {
    /// Create a grid size; both sides must be at least 1
    pub fn new(rows: u32, columns: u32) -> Result<Self, ConfigError> {
        if rows == 0 || columns == 0 {
            return Err(ConfigError::NonPositiveDimensions { rows, columns });
        }
        Ok(Self { rows, columns })
    }

    /// Number of rows
    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// Number of columns
    pub fn columns(&self) -> u32 {
        self.columns
    }
}

impl TryFrom<RawDimensions> for Dimensions {
    type Error = ConfigError;

    fn try_from(raw: RawDimensions) -> Result<Self, Self::Error> {
        Self::new(raw.rows, raw.columns)
    }
}

impl From<Dimensions> for RawDimensions {
    fn from(dims: Dimensions) -> Self {
        Self {
            rows: dims.rows,
            columns: dims.columns,
        }
    }
}

/// A rule that relocates a player when they land on a tile
///
/// Slides and portals share the contract "place the piece on the
/// destination tile"; the distinction is presentational.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TileAction {
    /// Ladder up or snake down to another tile
    Slide {
        destination: TileId,
        description: String,
    },
    /// Teleport to another tile
    Portal {
        destination: TileId,
        description: String,
    },
}

impl TileAction {
    /// Create a slide action
    pub fn slide(destination: TileId, description: impl Into<String>) -> Self {
        TileAction::Slide {
            destination,
            description: description.into(),
        }
    }

    /// Create a portal action
    pub fn portal(destination: TileId, description: impl Into<String>) -> Self {
        TileAction::Portal {
            destination,
            description: description.into(),
        }
    }

    /// Where this action places the piece
    pub fn destination(&self) -> TileId {
        match self {
            TileAction::Slide { destination, .. } | TileAction::Portal { destination, .. } => {
                *destination
            }
        }
    }

    /// Human-readable label for this action
    pub fn description(&self) -> &str {
        match self {
            TileAction::Slide { description, .. } | TileAction::Portal { description, .. } => {
                description
            }
        }
    }
}

/// A single tile in the graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    /// Unique id within the board
    pub id: TileId,
    /// Optional grid position
    pub coordinates: Option<Coordinates>,
    /// Next tile along the track; `None` marks a terminal tile
    pub successor: Option<TileId>,
    /// Action triggered by landing here
    pub action: Option<TileAction>,
}

impl Tile {
    /// Create a bare tile: no successor, no coordinates, no action
    pub fn new(id: TileId) -> Self {
        Self {
            id,
            coordinates: None,
            successor: None,
            action: None,
        }
    }

    /// Create a tile that continues to `successor`
    pub fn with_successor(id: TileId, successor: TileId) -> Self {
        Self {
            id,
            coordinates: None,
            successor: Some(successor),
            action: None,
        }
    }

    /// Whether the track ends here
    pub fn is_terminal(&self) -> bool {
        self.successor.is_none()
    }
}

/// Presentational board metadata
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardMeta {
    /// Display name (may be empty)
    pub name: String,
    /// Longer description
    pub description: String,
    /// Grid size, when known
    pub dimensions: Option<Dimensions>,
    /// Background image reference
    pub background: Option<String>,
    /// Tile pattern name
    pub pattern: Option<String>,
}

impl BoardMeta {
    /// Metadata carrying just a display name
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// A validated, immutable tile graph
///
/// Built once per game via [`Board::build`] and never mutated afterwards;
/// a new game gets a freshly built board.
#[derive(Debug, Clone, Serialize)]
pub struct Board {
    /// Presentational metadata
    meta: BoardMeta,
    /// Tiles keyed by id
    tiles: BTreeMap<TileId, Tile>,
    /// End of the successor chain from the start tile, if the chain ends
    terminal: Option<TileId>,
}

impl Board {
    /// Validate a batch of tiles and build a board.
    ///
    /// Checks performed:
    /// - at least one tile
    /// - tile ids are unique
    /// - every successor and action destination resolves within the batch
    ///   (forward references allowed)
    /// - no tile lists itself as its own successor
    /// - the start tile (id 0) exists
    pub fn build(meta: BoardMeta, tiles: Vec<Tile>) -> Result<Self, GraphError> {
        if tiles.is_empty() {
            return Err(GraphError::EmptyBoard);
        }

        let mut map = BTreeMap::new();
        for tile in tiles {
            if tile.successor == Some(tile.id) {
                return Err(GraphError::SelfSuccessor(tile.id));
            }
            let id = tile.id;
            if map.insert(id, tile).is_some() {
                return Err(GraphError::DuplicateTileId(id));
            }
        }

        for tile in map.values() {
            if let Some(successor) = tile.successor {
                if !map.contains_key(&successor) {
                    return Err(GraphError::DanglingReference(successor));
                }
            }
            if let Some(action) = &tile.action {
                if !map.contains_key(&action.destination()) {
                    return Err(GraphError::DanglingReference(action.destination()));
                }
            }
        }

        if !map.contains_key(&START_TILE) {
            return Err(GraphError::DanglingReference(START_TILE));
        }

        let terminal = find_terminal(&map);
        Ok(Self {
            meta,
            tiles: map,
            terminal,
        })
    }

    /// Board metadata
    pub fn meta(&self) -> &BoardMeta {
        &self.meta
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.meta.name
    }

    /// Look up a tile by id
    pub fn tile(&self, id: TileId) -> Option<&Tile> {
        self.tiles.get(&id)
    }

    /// Whether the board contains a tile with this id
    pub fn contains(&self, id: TileId) -> bool {
        self.tiles.contains_key(&id)
    }

    /// All tiles, in id order
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.values()
    }

    /// Number of tiles on the board
    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    /// End of the successor chain from the start tile.
    ///
    /// `None` when the chain loops and never reaches a tile without a
    /// successor; such a board is playable but cannot be won.
    pub fn terminal(&self) -> Option<TileId> {
        self.terminal
    }

    /// Follow the successor chain `steps` hops forward from `from`.
    ///
    /// Stops early at a terminal tile: an overshooting roll lands on the
    /// terminal rather than wrapping or bouncing back.
    pub fn walk(&self, from: TileId, steps: u32) -> TileId {
        let mut current = from;
        for _ in 0..steps {
            match self.tile(current).and_then(|t| t.successor) {
                Some(next) => current = next,
                None => break,
            }
        }
        current
    }

    /// Classic 90-tile ladder board: 10 rows of 9 in a boustrophedon
    /// layout, with ladders carrying pieces up and snakes sliding them back.
    pub fn standard_ladder() -> Self {
        const ROWS: u32 = 10;
        const COLUMNS: u32 = 9;
        const LAST: TileId = ROWS * COLUMNS - 1;

        let jumps: [(TileId, TileId, &str); 12] = [
            (3, 22, "ladder up"),
            (8, 26, "ladder up"),
            (20, 38, "ladder up"),
            (27, 56, "ladder up"),
            (50, 72, "ladder up"),
            (63, 81, "ladder up"),
            (17, 6, "snake down"),
            (34, 12, "snake down"),
            (48, 29, "snake down"),
            (62, 40, "snake down"),
            (74, 53, "snake down"),
            (87, 35, "snake down"),
        ];

        let mut tiles = Vec::with_capacity((ROWS * COLUMNS) as usize);
        for id in 0..=LAST {
            let row = id / COLUMNS;
            // Odd rows run right to left.
            let col = if row % 2 == 0 {
                id % COLUMNS
            } else {
                COLUMNS - 1 - id % COLUMNS
            };

            let mut tile = Tile::new(id);
            tile.coordinates = Some(Coordinates::new(row, col));
            if id < LAST {
                tile.successor = Some(id + 1);
            }
            if let Some((_, destination, description)) =
                jumps.iter().find(|(from, _, _)| *from == id)
            {
                tile.action = Some(TileAction::slide(*destination, *description));
            }
            tiles.push(tile);
        }

        let mut meta = BoardMeta::named("Standard ladder board");
        meta.description = "Ladders carry you up, snakes slide you back.".to_string();
        meta.dimensions = Dimensions::new(ROWS, COLUMNS).ok();
        Self::build(meta, tiles).expect("standard ladder layout is valid")
    }

    /// Shared 52-tile token track for Ludo-family games, ending in a single
    /// home tile.
    pub fn standard_ludo() -> Self {
        const TRACK: u32 = 52;

        let tiles: Vec<Tile> = (0..TRACK)
            .map(|id| {
                if id + 1 < TRACK {
                    Tile::with_successor(id, id + 1)
                } else {
                    Tile::new(id)
                }
            })
            .collect();

        let mut meta = BoardMeta::named("Standard token track");
        meta.description = "Release tokens on a six and race them home.".to_string();
        Self::build(meta, tiles).expect("standard token track is valid")
    }
}

/// Walk the successor chain from the start tile until it ends or loops
fn find_terminal(tiles: &BTreeMap<TileId, Tile>) -> Option<TileId> {
    let mut visited = HashSet::new();
    let mut current = START_TILE;
    loop {
        if !visited.insert(current) {
            // Successor chain loops; no terminal tile exists.
            return None;
        }
        match tiles.get(&current).and_then(|t| t.successor) {
            Some(next) => current = next,
            None => return Some(current),
        }
    }
}
