//! Board and roster file formats.
//!
//! Boards are declarative JSON documents; rosters are two-column
//! `name,colorHex` text. Parsing validates everything up front, so the
//! engine never receives a partially built board or an invalid player
//! record. Unknown board fields are ignored for forward compatibility.

use crate::board::{
    Board, BoardMeta, ConfigError, Coordinates, Dimensions, GraphError, Tile, TileAction, TileId,
};
use crate::player::{Player, PlayerColor, PlayerId, TokenShape};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Column names of the roster format
const ROSTER_HEADER: [&str; 2] = ["name", "colorHex"];

/// Errors from malformed board or roster input
#[derive(Debug, Clone, Error)]
pub enum ParseError {
    #[error("malformed input: {0}")]
    MalformedSyntax(String),

    #[error("missing required field '{0}'")]
    MissingRequiredField(&'static str),

    #[error("duplicate tile id {0}")]
    DuplicateTileId(TileId),

    #[error("reference to missing tile {0}")]
    DanglingReference(TileId),

    #[error("board has no tiles")]
    EmptyBoard,

    #[error("invalid player record on line {line}")]
    InvalidPlayerRecord {
        line: usize,
        #[source]
        source: ConfigError,
    },
}

impl From<GraphError> for ParseError {
    fn from(err: GraphError) -> Self {
        match err {
            GraphError::EmptyBoard => ParseError::EmptyBoard,
            GraphError::DuplicateTileId(id) => ParseError::DuplicateTileId(id),
            GraphError::DanglingReference(id) => ParseError::DanglingReference(id),
            other => ParseError::MalformedSyntax(other.to_string()),
        }
    }
}

/// On-disk board document
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct BoardDoc {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rows: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    columns: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    background: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tiles: Option<Vec<TileDoc>>,
}

/// On-disk tile entry
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct TileDoc {
    id: Option<i64>,
    #[serde(rename = "nextTile", skip_serializing_if = "Option::is_none")]
    next_tile: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    coordinates: Option<[i64; 2]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    action: Option<ActionDoc>,
}

/// On-disk action entry
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct ActionDoc {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    kind: Option<String>,
    #[serde(rename = "destinationTileId")]
    destination_tile_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
}

/// Parse a board document into a validated [`Board`].
///
/// Absent metadata loads as empty. A tile without `nextTile`, or with
/// `nextTile` equal to its own id (the conventional end-of-track marker),
/// is terminal. A missing `action` object means the tile has no action.
pub fn parse_board(input: &str) -> Result<Board, ParseError> {
    let doc: BoardDoc =
        serde_json::from_str(input).map_err(|e| ParseError::MalformedSyntax(e.to_string()))?;

    let mut meta = BoardMeta::named(doc.name.unwrap_or_default());
    meta.description = doc.description.unwrap_or_default();
    meta.background = doc.background;
    meta.pattern = doc.pattern;
    meta.dimensions = dimensions_from(doc.rows, doc.columns)?;

    let tile_docs = doc.tiles.ok_or(ParseError::MissingRequiredField("tiles"))?;
    let mut tiles = Vec::with_capacity(tile_docs.len());
    for tile_doc in tile_docs {
        tiles.push(tile_from(tile_doc)?);
    }

    Board::build(meta, tiles).map_err(ParseError::from)
}

/// Serialize a board into a document [`parse_board`] accepts.
///
/// Terminal tiles are written without `nextTile`; empty metadata is
/// omitted.
pub fn write_board(board: &Board) -> Result<String, ParseError> {
    let meta = board.meta();
    let doc = BoardDoc {
        name: non_empty(meta.name.clone()),
        description: non_empty(meta.description.clone()),
        rows: meta.dimensions.map(|d| i64::from(d.rows())),
        columns: meta.dimensions.map(|d| i64::from(d.columns())),
        background: meta.background.clone(),
        pattern: meta.pattern.clone(),
        tiles: Some(board.tiles().map(tile_doc_from).collect()),
    };
    serde_json::to_string_pretty(&doc).map_err(|e| ParseError::MalformedSyntax(e.to_string()))
}

/// One roster line: a display name and a validated color
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRecord {
    /// Display name
    pub name: String,
    /// Player color
    pub color: PlayerColor,
}

impl PlayerRecord {
    /// Turn this record into a ladder-family player seated at `index`
    pub fn into_race_player(self, index: PlayerId) -> Result<Player, ConfigError> {
        let mut player = Player::new_race(self.name, self.color)?;
        player.shape = TokenShape::for_index(index);
        Ok(player)
    }

    /// Turn this record into a Ludo-family player seated at `index`
    pub fn into_ludo_player(self, index: PlayerId) -> Result<Player, ConfigError> {
        let mut player = Player::new_ludo(self.name, self.color)?;
        player.shape = TokenShape::for_index(index);
        Ok(player)
    }
}

/// Parse a `name,colorHex` roster into player records.
///
/// Blank lines are ignored and the literal header row is skipped rather
/// than parsed as a player. Line numbers in errors are 1-based.
pub fn parse_players(input: &str) -> Result<Vec<PlayerRecord>, ParseError> {
    let mut records = Vec::new();

    for (number, line) in input.lines().enumerate() {
        let line_number = number + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let fields: Vec<&str> = trimmed.split(',').map(str::trim).collect();
        if fields.len() != ROSTER_HEADER.len() {
            return Err(ParseError::MalformedSyntax(format!(
                "line {}: expected {} fields, got {}",
                line_number,
                ROSTER_HEADER.len(),
                fields.len()
            )));
        }
        if fields[0].eq_ignore_ascii_case(ROSTER_HEADER[0])
            && fields[1].eq_ignore_ascii_case(ROSTER_HEADER[1])
        {
            continue;
        }

        if fields[0].is_empty() {
            return Err(ParseError::InvalidPlayerRecord {
                line: line_number,
                source: ConfigError::BlankName,
            });
        }
        let color =
            PlayerColor::new(fields[1]).map_err(|source| ParseError::InvalidPlayerRecord {
                line: line_number,
                source,
            })?;

        records.push(PlayerRecord {
            name: fields[0].to_string(),
            color,
        });
    }

    Ok(records)
}

/// Serialize player records into the roster format, header included
pub fn write_players(records: &[PlayerRecord]) -> String {
    let mut out = String::from("name, colorHex\n");
    for record in records {
        out.push_str(&record.name);
        out.push(',');
        out.push_str(record.color.as_hex());
        out.push('\n');
    }
    out
}

fn dimensions_from(
    rows: Option<i64>,
    columns: Option<i64>,
) -> Result<Option<Dimensions>, ParseError> {
    match (rows, columns) {
        (None, None) => Ok(None),
        (Some(rows), Some(columns)) => {
            let rows = into_u32("rows", rows)?;
            let columns = into_u32("columns", columns)?;
            let dims = Dimensions::new(rows, columns)
                .map_err(|e| ParseError::MalformedSyntax(e.to_string()))?;
            Ok(Some(dims))
        }
        (Some(_), None) => Err(ParseError::MissingRequiredField("columns")),
        (None, Some(_)) => Err(ParseError::MissingRequiredField("rows")),
    }
}

fn tile_from(doc: TileDoc) -> Result<Tile, ParseError> {
    let raw_id = doc.id.ok_or(ParseError::MissingRequiredField("id"))?;
    let id = into_u32("id", raw_id)?;

    let mut tile = Tile::new(id);
    tile.coordinates = match doc.coordinates {
        Some([row, col]) => Some(Coordinates::new(
            into_u32("coordinates", row)?,
            into_u32("coordinates", col)?,
        )),
        None => None,
    };
    // nextTile pointing at the tile itself is the conventional
    // end-of-track marker; normalize it to "no successor".
    tile.successor = match doc.next_tile {
        Some(next) if next == raw_id => None,
        Some(next) => Some(into_u32("nextTile", next)?),
        None => None,
    };
    tile.action = match doc.action {
        Some(action) => Some(action_from(action)?),
        None => None,
    };
    Ok(tile)
}

fn action_from(doc: ActionDoc) -> Result<TileAction, ParseError> {
    let destination = doc
        .destination_tile_id
        .ok_or(ParseError::MissingRequiredField("destinationTileId"))?;
    let destination = into_u32("destinationTileId", destination)?;
    let description = doc.description.unwrap_or_default();

    match doc.kind.as_deref() {
        None | Some("slide") | Some("ladder") => Ok(TileAction::slide(destination, description)),
        Some("portal") => Ok(TileAction::portal(destination, description)),
        Some(other) => Err(ParseError::MalformedSyntax(format!(
            "unknown action type '{}'",
            other
        ))),
    }
}

fn tile_doc_from(tile: &Tile) -> TileDoc {
    TileDoc {
        id: Some(i64::from(tile.id)),
        next_tile: tile.successor.map(i64::from),
        coordinates: tile
            .coordinates
            .map(|c| [i64::from(c.row), i64::from(c.col)]),
        action: tile.action.as_ref().map(|action| {
            let kind = match action {
                TileAction::Slide { .. } => "slide",
                TileAction::Portal { .. } => "portal",
            };
            ActionDoc {
                kind: Some(kind.to_string()),
                destination_tile_id: Some(i64::from(action.destination())),
                description: Some(action.description().to_string()),
            }
        }),
    }
}

fn into_u32(field: &'static str, value: i64) -> Result<u32, ParseError> {
    u32::try_from(value).map_err(|_| {
        ParseError::MalformedSyntax(format!(
            "{} must be a non-negative integer (got {})",
            field, value
        ))
    })
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}
