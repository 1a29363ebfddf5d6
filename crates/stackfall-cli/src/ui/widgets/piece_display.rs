use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Flex, Layout, Rect},
    widgets::{Block as BlockWidget, BlockExt as _, Widget},
};
use stackfall_engine::{PieceInstance, PieceKind};

use super::{BlockDisplay, Tile, cells_to_u16};

/// A single piece in spawn orientation, trimmed to its occupied rows and columns.
#[derive(Debug)]
pub struct PieceDisplay<'a> {
    piece: Option<PieceKind>,
    block: Option<BlockWidget<'a>>,
}

impl<'a> PieceDisplay<'a> {
    pub fn new() -> Self {
        Self {
            piece: None,
            block: None,
        }
    }

    pub fn piece(self, piece: PieceKind) -> Self {
        Self {
            piece: Some(piece),
            ..self
        }
    }

    pub fn block(self, block: BlockWidget<'a>) -> Self {
        Self {
            block: Some(block),
            ..self
        }
    }

    pub fn width(&self) -> u16 {
        4 * BlockDisplay::width() + super::block_horizontal_margin(self.block.as_ref())
    }

    pub fn height(&self) -> u16 {
        2 * BlockDisplay::height() + super::block_vertical_margin(self.block.as_ref())
    }
}

/// Tiles of the piece's occupied bounding box.
pub(super) fn trimmed_tiles(kind: PieceKind) -> Vec<Vec<Tile>> {
    let piece = PieceInstance::new(kind);
    let cells: Vec<_> = piece.occupied_cells().collect();
    let top = cells.iter().map(|(row, _, _)| *row).min().unwrap_or(0);
    let bottom = cells.iter().map(|(row, _, _)| *row).max().unwrap_or(0);
    let left = cells.iter().map(|(_, col, _)| *col).min().unwrap_or(0);
    let right = cells.iter().map(|(_, col, _)| *col).max().unwrap_or(0);

    let mut tiles = vec![vec![Tile::Empty; right - left + 1]; bottom - top + 1];
    for (row, col, color) in cells {
        tiles[row - top][col - left] = Tile::Filled(color);
    }
    tiles
}

impl Widget for PieceDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Widget::render(&self, area, buf);
    }
}

impl Widget for &PieceDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.block.as_ref().render(area, buf);
        let area = self.block.inner_if_some(area);

        let Some(kind) = self.piece else {
            BlockDisplay::from_tile(Tile::Empty, false).render(area, buf);
            return;
        };
        let tiles = trimmed_tiles(kind);
        let rows = cells_to_u16(tiles.len());
        let cols = cells_to_u16(tiles.first().map_or(0, Vec::len));

        let piece_area = area.centered(
            Constraint::Length(cols.saturating_mul(BlockDisplay::width())),
            Constraint::Length(rows.saturating_mul(BlockDisplay::height())),
        );
        let horizontal =
            Layout::horizontal((0..cols).map(|_| Constraint::Length(BlockDisplay::width())))
                .flex(Flex::Center);
        let vertical =
            Layout::vertical((0..rows).map(|_| Constraint::Length(BlockDisplay::height())));

        let grid_rows = piece_area
            .layout_vec(&vertical)
            .into_iter()
            .map(|row| row.layout_vec(&horizontal));
        for (grid_row, row) in grid_rows.zip(tiles) {
            for (grid_cell, tile) in grid_row.into_iter().zip(row) {
                BlockDisplay::from_tile(tile, false).render(grid_cell, buf);
            }
        }
    }
}
