use std::{fmt, sync::LazyLock};

use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

use super::cell::{Cell, Color};

/// Enum representing the type of piece.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize, derive_more::Display,
)]
#[repr(u8)]
pub enum PieceKind {
    /// I-piece.
    I = 0,
    /// J-piece.
    J = 1,
    /// L-piece.
    L = 2,
    /// O-piece.
    O = 3,
    /// S-piece.
    S = 4,
    /// T-piece.
    T = 5,
    /// Z-piece.
    Z = 6,
}

impl PieceKind {
    /// Number of piece types (7).
    pub const LEN: usize = 7;

    /// All piece kinds, in registry order.
    pub const ALL: [PieceKind; PieceKind::LEN] = [
        PieceKind::I,
        PieceKind::J,
        PieceKind::L,
        PieceKind::O,
        PieceKind::S,
        PieceKind::T,
        PieceKind::Z,
    ];

    /// Color tag written into the board when a piece of this kind locks.
    #[must_use]
    pub const fn color(self) -> Color {
        match self {
            PieceKind::I => Color::Cyan,
            PieceKind::J => Color::Blue,
            PieceKind::L => Color::Orange,
            PieceKind::O => Color::Yellow,
            PieceKind::S => Color::Green,
            PieceKind::T => Color::Purple,
            PieceKind::Z => Color::Red,
        }
    }

    const fn as_usize(self) -> usize {
        self as usize
    }
}

/// Rotation state of a piece.
///
/// Represents one of four rotation states:
///
/// - `0`: spawn orientation
/// - `R`: 90° clockwise
/// - `2`: 180°
/// - `L`: 270° clockwise (90° counterclockwise)
///
/// Rotation operations wrap around modulo 4.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rotation(u8);

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl Rotation {
    pub const SPAWN: Self = Self(0);
    pub const RIGHT: Self = Self(1);
    pub const REVERSE: Self = Self(2);
    pub const LEFT: Self = Self(3);

    #[must_use]
    pub fn rotated_clockwise(self) -> Self {
        Rotation((self.0 + 1) % 4)
    }

    #[must_use]
    pub fn rotated_counterclockwise(self) -> Self {
        Rotation((self.0 + 3) % 4)
    }

    /// Returns the conventional name of the state (`0`, `R`, `2` or `L`).
    #[must_use]
    pub const fn as_char(self) -> char {
        match self.0 {
            0 => '0',
            1 => 'R',
            2 => '2',
            _ => 'L',
        }
    }

    /// Index of the clockwise transition leaving this state.
    ///
    /// Clockwise tables are ordered `0->R, R->2, 2->L, L->0`.
    const fn clockwise_index(self) -> usize {
        self.0 as usize
    }

    /// Index of the counterclockwise transition leaving this state.
    ///
    /// Counterclockwise tables are ordered `0->L, L->2, 2->R, R->0`.
    const fn counterclockwise_index(self) -> usize {
        (4 - self.0 as usize) % 4
    }
}

/// Offset tried after a rotation, in board rows (downward) and columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KickOffset {
    pub row: i32,
    pub col: i32,
}

impl KickOffset {
    pub const ZERO: Self = Self::new(0, 0);

    #[must_use]
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }
}

/// Maximum number of candidates in one kick transition.
pub const MAX_KICKS: usize = 5;

/// Ordered kick candidates of one rotation transition.
pub type KickCandidates = ArrayVec<KickOffset, MAX_KICKS>;

/// Wall-kick offsets for the four transitions in one rotation direction.
///
/// The table itself never changes; the owning [`PieceInstance`] selects the
/// current transition from its [`Rotation`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KickTable {
    transitions: [KickCandidates; 4],
}

impl KickTable {
    fn from_offsets(offsets: [[(i32, i32); MAX_KICKS]; 4]) -> Self {
        Self {
            transitions: offsets.map(|candidates| {
                candidates
                    .into_iter()
                    .map(|(row, col)| KickOffset::new(row, col))
                    .collect()
            }),
        }
    }

    /// Table whose every transition only tries the unmoved position.
    fn identity() -> Self {
        let mut only_zero = KickCandidates::new();
        only_zero.push(KickOffset::ZERO);
        Self {
            transitions: [
                only_zero.clone(),
                only_zero.clone(),
                only_zero.clone(),
                only_zero,
            ],
        }
    }

    /// Returns the candidates of the transition at `index` (modulo 4).
    #[must_use]
    pub fn transition(&self, index: usize) -> &KickCandidates {
        &self.transitions[index % 4]
    }
}

// SRS kick data, `(row, col)` with rows growing downward.
const I_CLOCKWISE: [[(i32, i32); MAX_KICKS]; 4] = [
    [(0, 0), (0, -2), (0, 1), (-2, 1), (1, -2)], // 0->R
    [(0, 0), (0, -1), (0, 2), (-2, -1), (1, 2)], // R->2
    [(0, 0), (0, 2), (0, -1), (-1, 2), (1, -1)], // 2->L
    [(0, 0), (0, -2), (0, 1), (-1, -2), (2, 1)], // L->0
];
const I_COUNTERCLOCKWISE: [[(i32, i32); MAX_KICKS]; 4] = [
    [(0, 0), (0, 2), (0, -1), (-2, -1), (1, 2)], // 0->L
    [(0, 0), (0, 1), (0, -2), (-2, 1), (1, -2)], // L->2
    [(0, 0), (0, -2), (0, 1), (-1, -2), (2, 1)], // 2->R
    [(0, 0), (0, 2), (0, -1), (-1, 2), (2, -1)], // R->0
];
const JLSTZ_CLOCKWISE: [[(i32, i32); MAX_KICKS]; 4] = [
    [(0, 0), (0, -1), (-1, -1), (2, 0), (2, -1)], // 0->R
    [(0, 0), (0, 1), (1, 1), (-2, 0), (-2, 1)],   // R->2
    [(0, 0), (0, 1), (-1, 1), (2, 0), (2, -1)],   // 2->L
    [(0, 0), (0, -1), (1, -1), (-2, 0), (-2, -1)], // L->0
];
const JLSTZ_COUNTERCLOCKWISE: [[(i32, i32); MAX_KICKS]; 4] = [
    [(0, 0), (0, 1), (-1, 1), (2, 0), (2, 1)],    // 0->L
    [(0, 0), (0, -1), (1, -1), (-2, 0), (-2, -1)], // L->2
    [(0, 0), (0, -1), (-1, -1), (2, 0), (2, -1)], // 2->R
    [(0, 0), (0, 1), (1, 1), (2, 0), (2, -1)],    // R->0
];

/// Side length of the largest bounding matrix.
pub const MAX_SHAPE_SIZE: usize = 4;

/// Square cell matrix of a piece in one orientation.
///
/// Only the top-left `size`×`size` corner is meaningful; the rest stays
/// empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Shape {
    size: usize,
    cells: [[Cell; MAX_SHAPE_SIZE]; MAX_SHAPE_SIZE],
}

impl Shape {
    const fn new(size: usize, cells: [[Cell; MAX_SHAPE_SIZE]; MAX_SHAPE_SIZE]) -> Self {
        assert!(size <= MAX_SHAPE_SIZE);
        Self { size, cells }
    }

    /// Side length of the bounding matrix (3 or 4).
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns the cell at `(row, col)`, or [`Cell::Empty`] outside the matrix.
    #[must_use]
    pub fn cell(&self, row: usize, col: usize) -> Cell {
        if row < self.size && col < self.size {
            self.cells[row][col]
        } else {
            Cell::Empty
        }
    }

    /// Iterates over the occupied cells as `(row, col, color)`.
    pub fn occupied_cells(&self) -> impl Iterator<Item = (usize, usize, Color)> + '_ {
        self.cells[..self.size]
            .iter()
            .enumerate()
            .flat_map(move |(row, cells)| {
                cells[..self.size]
                    .iter()
                    .enumerate()
                    .filter_map(move |(col, cell)| cell.color().map(|color| (row, col, color)))
            })
    }

    /// `new[r][c] = old[n-1-c][r]`
    #[must_use]
    fn rotated_clockwise(&self) -> Self {
        let n = self.size;
        let mut cells = [[Cell::Empty; MAX_SHAPE_SIZE]; MAX_SHAPE_SIZE];
        for (r, row) in cells[..n].iter_mut().enumerate() {
            for (c, cell) in row[..n].iter_mut().enumerate() {
                *cell = self.cells[n - 1 - c][r];
            }
        }
        Self { size: n, cells }
    }

    /// `new[r][c] = old[c][n-1-r]`
    #[must_use]
    fn rotated_counterclockwise(&self) -> Self {
        let n = self.size;
        let mut cells = [[Cell::Empty; MAX_SHAPE_SIZE]; MAX_SHAPE_SIZE];
        for (r, row) in cells[..n].iter_mut().enumerate() {
            for (c, cell) in row[..n].iter_mut().enumerate() {
                *cell = self.cells[c][n - 1 - r];
            }
        }
        Self { size: n, cells }
    }
}

const fn spawn_shape(kind: PieceKind) -> Shape {
    const E: Cell = Cell::Empty;
    const EEEE: [Cell; 4] = [E; 4];
    let x = Cell::Occupied(kind.color());
    match kind {
        PieceKind::I => Shape::new(4, [EEEE, [x, x, x, x], EEEE, EEEE]),
        PieceKind::J => Shape::new(3, [[x, E, E, E], [x, x, x, E], EEEE, EEEE]),
        PieceKind::L => Shape::new(3, [[E, E, x, E], [x, x, x, E], EEEE, EEEE]),
        PieceKind::O => Shape::new(4, [EEEE, [E, x, x, E], [E, x, x, E], EEEE]),
        PieceKind::S => Shape::new(3, [[E, x, x, E], [x, x, E, E], EEEE, EEEE]),
        PieceKind::T => Shape::new(3, [[E, x, E, E], [x, x, x, E], EEEE, EEEE]),
        PieceKind::Z => Shape::new(3, [[x, x, E, E], [E, x, x, E], EEEE, EEEE]),
    }
}

/// Immutable piece template.
///
/// Templates are stored in a static registry and never handed out mutably;
/// [`Piece::cloned`] produces the [`PieceInstance`] that actually moves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Piece {
    kind: PieceKind,
    shape: Shape,
    clockwise_kicks: KickTable,
    counterclockwise_kicks: KickTable,
}

static REGISTRY: LazyLock<[Piece; PieceKind::LEN]> =
    LazyLock::new(|| PieceKind::ALL.map(Piece::build));

impl Piece {
    fn build(kind: PieceKind) -> Self {
        let (clockwise_kicks, counterclockwise_kicks) = match kind {
            PieceKind::I => (
                KickTable::from_offsets(I_CLOCKWISE),
                KickTable::from_offsets(I_COUNTERCLOCKWISE),
            ),
            PieceKind::O => (KickTable::identity(), KickTable::identity()),
            PieceKind::J | PieceKind::L | PieceKind::S | PieceKind::T | PieceKind::Z => (
                KickTable::from_offsets(JLSTZ_CLOCKWISE),
                KickTable::from_offsets(JLSTZ_COUNTERCLOCKWISE),
            ),
        };
        Self {
            kind,
            shape: spawn_shape(kind),
            clockwise_kicks,
            counterclockwise_kicks,
        }
    }

    /// Returns the registry template for `kind`.
    #[must_use]
    pub fn get(kind: PieceKind) -> &'static Piece {
        &REGISTRY[kind.as_usize()]
    }

    #[must_use]
    pub fn kind(&self) -> PieceKind {
        self.kind
    }

    /// Shape in spawn orientation.
    #[must_use]
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    #[must_use]
    pub fn clockwise_kicks(&self) -> &KickTable {
        &self.clockwise_kicks
    }

    #[must_use]
    pub fn counterclockwise_kicks(&self) -> &KickTable {
        &self.counterclockwise_kicks
    }

    /// Produces an independent instance in spawn orientation.
    #[must_use]
    pub fn cloned(&self) -> PieceInstance {
        PieceInstance {
            kind: self.kind,
            shape: self.shape,
            rotation: Rotation::SPAWN,
            clockwise_kicks: self.clockwise_kicks.clone(),
            counterclockwise_kicks: self.counterclockwise_kicks.clone(),
        }
    }
}

/// The mutable copy of a [`Piece`] that is currently floating.
///
/// # Example
///
/// ```
/// use stackfall_engine::{PieceInstance, PieceKind, Rotation};
///
/// let mut piece = PieceInstance::new(PieceKind::T);
/// piece.rotate_clockwise();
/// assert_eq!(piece.rotation(), Rotation::RIGHT);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PieceInstance {
    kind: PieceKind,
    shape: Shape,
    rotation: Rotation,
    clockwise_kicks: KickTable,
    counterclockwise_kicks: KickTable,
}

impl PieceInstance {
    /// Clones the registry template of `kind`.
    #[must_use]
    pub fn new(kind: PieceKind) -> Self {
        Piece::get(kind).cloned()
    }

    #[must_use]
    pub fn kind(&self) -> PieceKind {
        self.kind
    }

    #[must_use]
    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    #[must_use]
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.shape.size()
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.shape.size()
    }

    #[must_use]
    pub fn cell(&self, row: usize, col: usize) -> Cell {
        self.shape.cell(row, col)
    }

    pub fn occupied_cells(&self) -> impl Iterator<Item = (usize, usize, Color)> + '_ {
        self.shape.occupied_cells()
    }

    /// Kick candidates for a clockwise rotation from the current state.
    #[must_use]
    pub fn clockwise_kicks(&self) -> &KickCandidates {
        self.clockwise_kicks
            .transition(self.rotation.clockwise_index())
    }

    /// Kick candidates for a counterclockwise rotation from the current state.
    #[must_use]
    pub fn counterclockwise_kicks(&self) -> &KickCandidates {
        self.counterclockwise_kicks
            .transition(self.rotation.counterclockwise_index())
    }

    /// Rotates the shape 90° clockwise and advances the rotation state.
    pub fn rotate_clockwise(&mut self) {
        self.shape = self.shape.rotated_clockwise();
        self.rotation = self.rotation.rotated_clockwise();
    }

    /// Rotates the shape 90° counterclockwise and moves the rotation state back.
    pub fn rotate_counterclockwise(&mut self) {
        self.shape = self.shape.rotated_counterclockwise();
        self.rotation = self.rotation.rotated_counterclockwise();
    }
}
