use ratatui::{
    layout::{Constraint, Flex, Layout},
    prelude::{Buffer, Rect},
    text::{Line, Text},
    widgets::{Block, Clear, Padding, Widget},
};
use stackfall_engine::{GameState, GameStatus};

use super::{BoardDisplay, NextPiecesDisplay, PieceDisplay, color, style};

/// Board in the middle, hold slot on the left and the next pieces on the right.
#[derive(Debug)]
pub struct GameDisplay<'a> {
    game: &'a GameState,
    show_ghost: bool,
    horizontal_padding: u16,
    vertical_padding: u16,
}

impl<'a> GameDisplay<'a> {
    pub fn new(game: &'a GameState, show_ghost: bool) -> Self {
        Self {
            game,
            show_ghost,
            horizontal_padding: 1,
            vertical_padding: 0,
        }
    }
}

impl Widget for GameDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        Widget::render(&self, area, buf);
    }
}

impl Widget for &GameDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        let game = self.game;
        let block_padding = Padding::symmetric(self.horizontal_padding, self.vertical_padding);
        let border_style = match game.status() {
            GameStatus::Playing => color::WHITE,
            GameStatus::ToppedOut => color::RED,
        };

        let game_board = {
            let widget = BoardDisplay::new(game.board(), game.config().hidden_rows)
                .floating(game.floating_cells())
                .block(
                    Block::bordered()
                        .border_style(border_style)
                        .style(style::DEFAULT),
                );
            if self.show_ghost && game.status().is_playing() {
                let ghost = game.cells_at(game.ghost_position());
                widget.ghost(ghost.map(|(row, col, _)| (row, col)))
            } else {
                widget
            }
        };
        let hold_panel = {
            let panel = PieceDisplay::new().block(
                Block::bordered()
                    .title(Line::from("HOLD").centered())
                    .padding(block_padding)
                    .border_style(border_style)
                    .style(style::DEFAULT),
            );
            if let Some(piece) = game.held() {
                panel.piece(piece)
            } else {
                panel
            }
        };
        let next_pieces = NextPiecesDisplay::new(game).block(
            Block::bordered()
                .title(Line::from("NEXT").centered())
                .padding(block_padding)
                .border_style(border_style)
                .style(style::DEFAULT),
        );

        let [left_column, center_column, right_column] = Layout::horizontal([
            Constraint::Length(hold_panel.width()),
            Constraint::Length(game_board.width()),
            Constraint::Length(next_pieces.width()),
        ])
        .flex(Flex::Center)
        .spacing(1)
        .areas(area);

        let [hold_area] =
            Layout::vertical([Constraint::Length(hold_panel.height())]).areas(left_column);
        let [board_area] =
            Layout::vertical([Constraint::Length(game_board.height())]).areas(center_column);
        let [next_pieces_area] =
            Layout::vertical([Constraint::Length(next_pieces.height())]).areas(right_column);

        let game_board_width = game_board.width();
        hold_panel.render(hold_area, buf);
        game_board.render(board_area, buf);
        if !next_pieces.is_empty() {
            next_pieces.render(next_pieces_area, buf);
        }

        if game.status().is_topped_out() {
            let block = Block::new().style(style::TOPPED_OUT);
            let text = Text::styled("TOPPED OUT", style::TOPPED_OUT).centered();
            let area =
                board_area.centered(Constraint::Length(game_board_width), Constraint::Length(3));
            let inner = block.inner(area);
            Clear.render(area, buf);
            block.render(area, buf);
            text.render(inner.centered_vertically(Constraint::Length(1)), buf);
        }
    }
}
