use ratatui::{
    layout::{Constraint, Layout},
    prelude::{Buffer, Rect},
    widgets::{Block as BlockWidget, BlockExt as _, Widget},
};
use stackfall_engine::{GameState, PieceKind};

use super::{BlockDisplay, PieceDisplay, cells_to_u16, trimmed_tiles};

/// Rows between two previewed pieces.
const GAP: u16 = 1;

/// The configured number of upcoming pieces, next one on top.
///
/// Each piece takes only as many rows as it is tall, so an I piece needs one
/// row where the others need two.
#[derive(Debug)]
pub struct NextPiecesDisplay<'a> {
    pieces: Vec<PieceKind>,
    block: Option<BlockWidget<'a>>,
}

impl<'a> NextPiecesDisplay<'a> {
    pub fn new(game: &GameState) -> Self {
        Self::from_pieces(game.upcoming(game.config().preview_len))
    }

    fn from_pieces<I>(pieces: I) -> Self
    where
        I: IntoIterator<Item = PieceKind>,
    {
        Self {
            pieces: pieces.into_iter().collect(),
            block: None,
        }
    }

    pub fn block(self, block: BlockWidget<'a>) -> Self {
        Self {
            block: Some(block),
            ..self
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    fn piece_height(kind: PieceKind) -> u16 {
        cells_to_u16(trimmed_tiles(kind).len()).saturating_mul(BlockDisplay::height())
    }

    /// Heights of the alternating piece and gap slots, top to bottom.
    fn slot_heights(&self) -> Vec<u16> {
        let mut heights = Vec::with_capacity(self.pieces.len() * 2);
        for (i, kind) in self.pieces.iter().enumerate() {
            if i > 0 {
                heights.push(GAP);
            }
            heights.push(Self::piece_height(*kind));
        }
        heights
    }

    pub fn width(&self) -> u16 {
        4 * BlockDisplay::width() + super::block_horizontal_margin(self.block.as_ref())
    }

    pub fn height(&self) -> u16 {
        self.slot_heights()
            .into_iter()
            .fold(0, u16::saturating_add)
            .saturating_add(super::block_vertical_margin(self.block.as_ref()))
    }
}

impl Widget for NextPiecesDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        Widget::render(&self, area, buf);
    }
}

impl Widget for &NextPiecesDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.block.as_ref().render(area, buf);
        let area = self.block.inner_if_some(area);
        let layout = Layout::vertical(self.slot_heights().into_iter().map(Constraint::Length));
        let slots = area.layout_vec(&layout);

        for (slot, kind) in slots.into_iter().step_by(2).zip(&self.pieces) {
            PieceDisplay::new().piece(*kind).render(slot, buf);
        }
    }
}
