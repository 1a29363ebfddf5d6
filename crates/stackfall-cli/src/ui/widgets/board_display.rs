use std::iter;

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Flex, Layout, Rect},
    widgets::{Block as BlockWidget, BlockExt, Widget},
};
use stackfall_engine::{Board, Color};

use super::{BlockDisplay, Tile, cells_to_u16};

/// The visible part of the board, with the floating piece and its ghost on top.
///
/// Hidden rows are not drawn; a piece inside them is simply cut off.
#[derive(Debug)]
pub struct BoardDisplay<'a> {
    board: &'a Board,
    hidden_rows: usize,
    ghost: Vec<(i32, i32)>,
    floating: Vec<(i32, i32, Color)>,
    block: Option<BlockWidget<'a>>,
}

impl<'a> BoardDisplay<'a> {
    pub fn new(board: &'a Board, hidden_rows: usize) -> Self {
        Self {
            board,
            hidden_rows,
            ghost: vec![],
            floating: vec![],
            block: None,
        }
    }

    pub fn ghost<I>(self, cells: I) -> Self
    where
        I: IntoIterator<Item = (i32, i32)>,
    {
        Self {
            ghost: cells.into_iter().collect(),
            ..self
        }
    }

    pub fn floating<I>(self, cells: I) -> Self
    where
        I: IntoIterator<Item = (i32, i32, Color)>,
    {
        Self {
            floating: cells.into_iter().collect(),
            ..self
        }
    }

    pub fn block(self, block: BlockWidget<'a>) -> Self {
        Self {
            block: Some(block),
            ..self
        }
    }

    fn visible_height(&self) -> usize {
        self.board.height().saturating_sub(self.hidden_rows)
    }

    pub fn width(&self) -> u16 {
        cells_to_u16(self.board.width())
            .saturating_mul(BlockDisplay::width())
            .saturating_add(super::block_horizontal_margin(self.block.as_ref()))
    }

    pub fn height(&self) -> u16 {
        cells_to_u16(self.visible_height())
            .saturating_mul(BlockDisplay::height())
            .saturating_add(super::block_vertical_margin(self.block.as_ref()))
    }

    /// Tiles of the visible rows, top to bottom.
    fn tiles(&self) -> Vec<Vec<Tile>> {
        let mut tiles: Vec<Vec<Tile>> = self
            .board
            .rows()
            .skip(self.hidden_rows)
            .map(|row| row.iter().copied().map(Tile::from).collect())
            .collect();

        for &(row, col) in &self.ghost {
            if let Some(tile) = tile_at(&mut tiles, self.hidden_rows, row, col)
                && *tile == Tile::Empty
            {
                *tile = Tile::Ghost;
            }
        }
        for &(row, col, color) in &self.floating {
            if let Some(tile) = tile_at(&mut tiles, self.hidden_rows, row, col) {
                *tile = Tile::Filled(color);
            }
        }
        tiles
    }
}

fn tile_at(tiles: &mut [Vec<Tile>], hidden_rows: usize, row: i32, col: i32) -> Option<&mut Tile> {
    let row = usize::try_from(row).ok()?.checked_sub(hidden_rows)?;
    let col = usize::try_from(col).ok()?;
    tiles.get_mut(row)?.get_mut(col)
}

impl Widget for BoardDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        Widget::render(&self, area, buf);
    }
}

impl Widget for &BoardDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.block.as_ref().render(area, buf);
        let area = self.block.inner_if_some(area);

        let col_constraints =
            (0..self.board.width()).map(|_| Constraint::Length(BlockDisplay::width()));
        let row_constraints =
            (0..self.visible_height()).map(|_| Constraint::Length(BlockDisplay::height()));
        let horizontal = Layout::horizontal(col_constraints).flex(Flex::Center);
        let vertical = Layout::vertical(row_constraints);

        let grid_cells = area
            .layout_vec(&vertical)
            .into_iter()
            .map(|row| row.layout_vec(&horizontal));

        for (grid_row, row) in iter::zip(grid_cells, self.tiles()) {
            for (grid_cell, tile) in iter::zip(grid_row, row) {
                BlockDisplay::from_tile(tile, true).render(grid_cell, buf);
            }
        }
    }
}
