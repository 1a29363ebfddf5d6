use serde::{Deserialize, Serialize};

use super::{
    cell::Cell,
    piece::{KickOffset, PieceInstance},
};

/// Location of a piece's top-left bounding-box corner on the board.
///
/// Rows grow downward and columns grow rightward. Either coordinate may be
/// negative while the piece's empty margin hangs outside the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
pub struct Position {
    pub row: i32,
    pub col: i32,
}

impl Position {
    #[must_use]
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    #[must_use]
    pub const fn left(self) -> Self {
        Self::new(self.row, self.col - 1)
    }

    #[must_use]
    pub const fn right(self) -> Self {
        Self::new(self.row, self.col + 1)
    }

    #[must_use]
    pub const fn down(self) -> Self {
        Self::new(self.row + 1, self.col)
    }

    #[must_use]
    pub const fn kicked(self, kick: KickOffset) -> Self {
        Self::new(self.row + kick.row, self.col + kick.col)
    }
}

/// A single row of the board.
#[derive(Debug, Clone, PartialEq, Eq)]
struct BoardRow {
    cells: Vec<Cell>,
}

impl BoardRow {
    fn empty(width: usize) -> Self {
        Self {
            cells: vec![Cell::Empty; width],
        }
    }

    fn is_full(&self) -> bool {
        self.cells.iter().all(|cell| cell.is_occupied())
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::Empty);
    }
}

/// The playfield of locked cells.
///
/// Rows are counted from the top and include the hidden spawn rows, so a
/// 10×20 visible field with two hidden rows is a `Board::new(10, 22)` whose
/// rows `0..2` are hidden. Dimensions never change after construction.
///
/// # Example
///
/// ```
/// use stackfall_engine::{Board, PieceInstance, PieceKind, Position};
///
/// let mut board = Board::new(10, 22);
/// let piece = PieceInstance::new(PieceKind::O);
/// let position = Position::new(19, 4);
///
/// assert!(board.can_place(&piece, position));
/// board.merge(&piece, position);
/// assert!(board.is_occupied(20, 5));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    width: usize,
    rows: Vec<BoardRow>,
}

impl Board {
    /// Creates an empty board of `width` columns and `height` rows.
    ///
    /// # Panics
    ///
    /// Panics if either dimension is zero or does not fit in `i32`.
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        assert!(width > 0 && height > 0, "board must not be empty");
        assert!(
            i32::try_from(width).is_ok() && i32::try_from(height).is_ok(),
            "board dimensions out of range"
        );
        Self {
            width,
            rows: vec![BoardRow::empty(width); height],
        }
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Total number of rows, hidden rows included.
    #[must_use]
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Converts signed coordinates into indices, or `None` when out of bounds.
    fn index(&self, row: i32, col: i32) -> Option<(usize, usize)> {
        let row = usize::try_from(row).ok()?;
        let col = usize::try_from(col).ok()?;
        (row < self.height() && col < self.width).then_some((row, col))
    }

    #[must_use]
    pub fn in_bounds(&self, row: i32, col: i32) -> bool {
        self.index(row, col).is_some()
    }

    /// Returns whether the cell holds a color. Out-of-bounds cells are not occupied.
    #[must_use]
    pub fn is_occupied(&self, row: i32, col: i32) -> bool {
        self.cell(row, col).is_some_and(|cell| cell.is_occupied())
    }

    #[must_use]
    pub fn cell(&self, row: i32, col: i32) -> Option<Cell> {
        let (row, col) = self.index(row, col)?;
        Some(self.rows[row].cells[col])
    }

    /// Iterates over all rows from top to bottom, hidden rows included.
    pub fn rows(&self) -> impl ExactSizeIterator<Item = &[Cell]> {
        self.rows.iter().map(|row| row.cells.as_slice())
    }

    /// Overwrites a single cell.
    ///
    /// Intended for setting up positions; gameplay only writes through
    /// [`Self::merge`].
    ///
    /// # Panics
    ///
    /// Panics if the coordinates are out of bounds.
    pub fn fill_cell(&mut self, row: usize, col: usize, cell: Cell) {
        self.rows[row].cells[col] = cell;
    }

    /// Returns whether every occupied cell of `piece` at `position` is in
    /// bounds and lands on an empty board cell.
    #[must_use]
    pub fn can_place(&self, piece: &PieceInstance, position: Position) -> bool {
        piece.occupied_cells().all(|(dy, dx, _)| {
            let (row, col) = offset(position, dy, dx);
            matches!(self.cell(row, col), Some(Cell::Empty))
        })
    }

    /// Writes every occupied cell of `piece` into the board.
    ///
    /// # Panics
    ///
    /// Panics if the placement is not valid according to [`Self::can_place`].
    /// Callers must check first; reaching this is a logic error.
    pub fn merge(&mut self, piece: &PieceInstance, position: Position) {
        assert!(
            self.can_place(piece, position),
            "merging {} piece at {position:?} overlaps the board or leaves it",
            piece.kind()
        );
        for (dy, dx, color) in piece.occupied_cells() {
            let (row, col) = offset(position, dy, dx);
            if let Some((row, col)) = self.index(row, col) {
                self.rows[row].cells[col] = Cell::Occupied(color);
            }
        }
    }

    /// Removes every full row and returns how many were removed.
    ///
    /// Each removed row is replaced by an empty row at the top: rows above a
    /// removed row move down, rows below it stay where they are. Hidden rows
    /// take part like any other row.
    pub fn clear_full_rows(&mut self) -> usize {
        let mut count = 0;
        for y in (0..self.rows.len()).rev() {
            if self.rows[y].is_full() {
                count += 1;
                continue;
            }
            if count > 0 {
                self.rows.swap(y, y + count);
            }
        }
        for row in &mut self.rows[..count] {
            row.clear();
        }
        count
    }
}

#[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
fn offset(position: Position, dy: usize, dx: usize) -> (i32, i32) {
    // Shape offsets are bounded by the 4×4 matrix.
    (position.row + dy as i32, position.col + dx as i32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Color, PieceKind};

    const WIDTH: usize = 10;
    const HEIGHT: usize = 22;
    const X: Cell = Cell::Occupied(Color::Red);

    fn fill_row(board: &mut Board, row: usize) {
        for col in 0..board.width() {
            board.fill_cell(row, col, X);
        }
    }

    fn snapshot(board: &Board) -> Vec<Vec<Cell>> {
        board.rows().map(<[Cell]>::to_vec).collect()
    }

    #[test]
    fn test_new_board_is_empty() {
        let board = Board::new(WIDTH, HEIGHT);
        assert_eq!(board.width(), WIDTH);
        assert_eq!(board.height(), HEIGHT);
        assert_eq!(board.rows().len(), HEIGHT);
        for row in board.rows() {
            assert_eq!(row.len(), WIDTH);
            assert!(row.iter().all(|cell| cell.is_empty()));
        }
    }

    #[test]
    fn test_in_bounds() {
        let board = Board::new(WIDTH, HEIGHT);
        assert!(board.in_bounds(0, 0));
        assert!(board.in_bounds(21, 9));
        assert!(!board.in_bounds(-1, 0));
        assert!(!board.in_bounds(0, -1));
        assert!(!board.in_bounds(22, 0));
        assert!(!board.in_bounds(0, 10));
    }

    #[test]
    fn test_is_occupied() {
        let mut board = Board::new(WIDTH, HEIGHT);
        board.fill_cell(5, 3, X);
        assert!(board.is_occupied(5, 3));
        assert!(!board.is_occupied(5, 4));
        assert!(!board.is_occupied(-1, 3));
        assert_eq!(board.cell(5, 3), Some(X));
        assert_eq!(board.cell(30, 3), None);
    }

    #[test]
    fn test_can_place_respects_bounds_and_cells() {
        let mut board = Board::new(WIDTH, HEIGHT);
        let piece = PieceInstance::new(PieceKind::I);

        // Row 1 of the matrix holds the four cells.
        assert!(board.can_place(&piece, Position::new(-1, 0)));
        assert!(board.can_place(&piece, Position::new(20, 6)));
        assert!(!board.can_place(&piece, Position::new(21, 0)));
        assert!(!board.can_place(&piece, Position::new(0, 7)));
        assert!(!board.can_place(&piece, Position::new(0, -1)));

        board.fill_cell(1, 3, X);
        assert!(!board.can_place(&piece, Position::new(0, 0)));
        assert!(board.can_place(&piece, Position::new(0, 4)));
    }

    #[test]
    fn test_merge_writes_piece_color() {
        let mut board = Board::new(WIDTH, HEIGHT);
        let piece = PieceInstance::new(PieceKind::T);
        board.merge(&piece, Position::new(20, 0));

        let t = Cell::Occupied(Color::Purple);
        assert_eq!(board.cell(20, 1), Some(t));
        assert_eq!(board.cell(21, 0), Some(t));
        assert_eq!(board.cell(21, 1), Some(t));
        assert_eq!(board.cell(21, 2), Some(t));
        assert_eq!(board.cell(20, 0), Some(Cell::Empty));
    }

    #[test]
    #[should_panic(expected = "overlaps the board or leaves it")]
    fn test_merge_rejects_invalid_placement() {
        let mut board = Board::new(WIDTH, HEIGHT);
        let piece = PieceInstance::new(PieceKind::O);
        board.merge(&piece, Position::new(20, 0));
    }

    #[test]
    fn test_clear_single_row() {
        let mut board = Board::new(WIDTH, HEIGHT);
        // Distinct content above and below the full row.
        board.fill_cell(10, 0, Cell::Occupied(Color::Blue));
        board.fill_cell(0, 9, Cell::Occupied(Color::Green));
        board.fill_cell(20, 4, Cell::Occupied(Color::Cyan));
        fill_row(&mut board, 15);
        let before = snapshot(&board);

        assert_eq!(board.clear_full_rows(), 1);
        let after = snapshot(&board);

        assert_eq!(after.len(), HEIGHT);
        assert!(after[0].iter().all(|cell| cell.is_empty()));
        for row in 0..15 {
            assert_eq!(after[row + 1], before[row], "row {row} should move down");
        }
        for row in 16..HEIGHT {
            assert_eq!(after[row], before[row], "row {row} should stay");
        }
    }

    #[test]
    fn test_clear_multiple_rows() {
        let mut board = Board::new(WIDTH, HEIGHT);
        fill_row(&mut board, 21);
        fill_row(&mut board, 19);
        board.fill_cell(20, 0, X);
        board.fill_cell(18, 1, X);

        assert_eq!(board.clear_full_rows(), 2);

        assert!(board.is_occupied(21, 0));
        assert!(board.is_occupied(20, 1));
        assert_eq!(board.rows().flatten().filter(|c| c.is_occupied()).count(), 2);
    }

    #[test]
    fn test_clear_hidden_row() {
        let mut board = Board::new(WIDTH, HEIGHT);
        fill_row(&mut board, 1);
        board.fill_cell(0, 2, X);

        assert_eq!(board.clear_full_rows(), 1);
        assert!(board.is_occupied(1, 2));
        assert!(!board.is_occupied(0, 2));
    }

    #[test]
    fn test_clear_all_rows() {
        let mut board = Board::new(WIDTH, HEIGHT);
        for row in 0..HEIGHT {
            fill_row(&mut board, row);
        }
        assert_eq!(board.clear_full_rows(), HEIGHT);
        assert_eq!(board, Board::new(WIDTH, HEIGHT));
    }

    #[test]
    fn test_clear_partial_rows_is_noop() {
        let mut board = Board::new(WIDTH, HEIGHT);
        for col in 0..WIDTH - 1 {
            board.fill_cell(21, col, X);
        }
        let before = board.clone();
        assert_eq!(board.clear_full_rows(), 0);
        assert_eq!(board, before);
    }

    #[test]
    fn test_clear_is_idempotent() {
        let mut board = Board::new(WIDTH, HEIGHT);
        fill_row(&mut board, 21);
        board.fill_cell(20, 3, X);
        board.clear_full_rows();
        let once = board.clone();
        assert_eq!(board.clear_full_rows(), 0);
        assert_eq!(board, once);
    }
}
