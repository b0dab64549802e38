use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::acquire_constants::{BOARD_COLS, BOARD_ROWS};

/// A board coordinate, written the way the physical tiles are printed: `6-D`.
///
/// Ordering is row first, then column, which is also "closest to 1-A".
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Tile {
    pub row: usize,
    pub col: usize,
}

#[derive(Debug, PartialEq, Eq, Clone, Error)]
pub enum TileParseError {
    #[error("tile `{0}` is not of the form <column>-<row>, e.g. 6-D")]
    BadFormat(String),
    #[error("tile `{0}` is off the board")]
    OffBoard(String),
}

impl Tile {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    pub fn is_on_board(&self) -> bool {
        self.row < BOARD_ROWS && self.col < BOARD_COLS
    }

    pub fn all() -> impl Iterator<Item = Tile> {
        (0..BOARD_ROWS).flat_map(|row| (0..BOARD_COLS).map(move |col| Tile { row, col }))
    }

    /// Orthogonal neighbours that lie on the board.
    pub fn neighbors(&self) -> impl Iterator<Item = Tile> {
        let Tile { row, col } = *self;
        let candidates = [
            row.checked_sub(1).map(|up| Tile::new(up, col)),
            Some(Tile::new(row + 1, col)),
            col.checked_sub(1).map(|left| Tile::new(row, left)),
            Some(Tile::new(row, col + 1)),
        ];
        candidates
            .into_iter()
            .flatten()
            .filter(|tile| tile.is_on_board())
    }
}

impl From<(usize, usize)> for Tile {
    fn from(value: (usize, usize)) -> Self {
        Self {
            row: value.0,
            col: value.1,
        }
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // row is a letter, col is a number
        // use the ASCII value of 'A' to get the letter
        write!(f, "{}-{}", self.col + 1, (b'A' + self.row as u8) as char)
    }
}

impl FromStr for Tile {
    type Err = TileParseError;

    // accepts "6-D", "6D" and "6d"
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let bad = || TileParseError::BadFormat(s.to_string());

        let letter = trimmed.chars().last().ok_or_else(bad)?;
        if !letter.is_ascii_alphabetic() {
            return Err(bad());
        }
        let number = trimmed[..trimmed.len() - 1].trim_end_matches('-');
        let col: usize = number.parse().map_err(|_| bad())?;
        if col == 0 {
            return Err(TileParseError::OffBoard(s.to_string()));
        }

        let row = (letter.to_ascii_uppercase() as u8 - b'A') as usize;
        let tile = Tile::new(row, col - 1);
        match tile.is_on_board() {
            true => Ok(tile),
            false => Err(TileParseError::OffBoard(s.to_string())),
        }
    }
}

impl TryFrom<String> for Tile {
    type Error = TileParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Tile> for String {
    fn from(tile: Tile) -> Self {
        tile.to_string()
    }
}
