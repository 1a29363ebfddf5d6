use crossterm::event::{Event, KeyCode};
use ratatui::{
    Frame,
    layout::{Constraint, Layout},
};
use stackfall_engine::{GameState, PieceSeed};
use tracing::info;

use crate::{
    tui::App,
    ui::widgets::{GameDisplay, KeyBinding, KeyBindingDisplay},
};

const PLAYING_KEYS: &[KeyBinding] = &[
    (&["←", "→"], "Move"),
    (&["↓"], "Soft Drop"),
    (&["↑"], "Hard Drop"),
    (&["Z", "X"], "Rotate"),
    (&["Space"], "Hold"),
    (&["R"], "New Game"),
    (&["Q"], "Quit"),
];

const TOPPED_OUT_KEYS: &[KeyBinding] = &[(&["R"], "New Game"), (&["Q"], "Quit")];

#[derive(Debug)]
pub struct PlayApp {
    game: GameState,
    seed: Option<PieceSeed>,
    is_exiting: bool,
}

impl PlayApp {
    /// With a seed, every new game deals the same piece sequence.
    pub fn new(game: GameState, seed: Option<PieceSeed>) -> Self {
        Self {
            game,
            seed,
            is_exiting: false,
        }
    }

    fn new_game(&mut self) {
        match self.seed {
            Some(seed) => self.game.reset_with_seed(seed),
            None => self.game.reset(),
        }
        info!("new game");
    }
}

impl App for PlayApp {
    fn should_exit(&self) -> bool {
        self.is_exiting
    }

    fn handle_event(&mut self, event: &Event) {
        let Some(key) = event.as_key_press_event() else {
            return;
        };
        let game = &mut self.game;
        match key.code {
            KeyCode::Left => _ = game.left_shift(),
            KeyCode::Right => _ = game.right_shift(),
            KeyCode::Down => _ = game.step_down(),
            KeyCode::Up => _ = game.drop_and_lock(),
            KeyCode::Char('z') => _ = game.rotate_counterclockwise(),
            KeyCode::Char('x') => _ = game.rotate_clockwise(),
            KeyCode::Char(' ') => _ = game.hold(),
            KeyCode::Char('r') => self.new_game(),
            KeyCode::Char('q') | KeyCode::Esc => self.is_exiting = true,
            _ => {}
        }
    }

    fn draw(&self, frame: &mut Frame) {
        let bindings = if self.game.status().is_playing() {
            PLAYING_KEYS
        } else {
            TOPPED_OUT_KEYS
        };

        let [main_area, help_area] =
            Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]).areas(frame.area());
        frame.render_widget(GameDisplay::new(&self.game, true), main_area);
        frame.render_widget(KeyBindingDisplay::new(bindings), help_area);
    }
}
