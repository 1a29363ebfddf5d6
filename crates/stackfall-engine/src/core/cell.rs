use serde::{Deserialize, Serialize};

/// Color tag carried by an occupied cell.
///
/// Every piece kind has one color; the board keeps the color of the piece
/// that was locked into a cell so the presentation layer can draw it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum Color {
    Cyan,
    Blue,
    Orange,
    Yellow,
    Green,
    Purple,
    Red,
}

/// A single cell of the board or of a piece shape matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, derive_more::IsVariant)]
pub enum Cell {
    #[default]
    Empty,
    Occupied(Color),
}

impl Cell {
    /// Returns the color of an occupied cell.
    #[must_use]
    pub fn color(self) -> Option<Color> {
        match self {
            Cell::Empty => None,
            Cell::Occupied(color) => Some(color),
        }
    }
}
