use tracing::{debug, info, trace};

use crate::{
    Board, Color, ConfigError, GameConfig, KickCandidates, PieceInstance, PieceKind, PieceQueue,
    PieceSeed, Position,
};

/// Whether the game still accepts piece operations.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, derive_more::IsVariant)]
pub enum GameStatus {
    #[default]
    Playing,
    /// The floating piece overlaps the stack, after a spawn or a row collapse.
    /// Piece operations are rejected until [`GameState::reset`].
    ToppedOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Spin {
    Clockwise,
    Counterclockwise,
}

/// A running game: the board, the floating piece and everything around it.
///
/// Every operation either succeeds or leaves the state exactly as it was.
/// While [`GameStatus::Playing`], the floating piece always fits the board.
#[derive(Debug, Clone)]
pub struct GameState {
    config: GameConfig,
    board: Board,
    floating: PieceInstance,
    position: Position,
    held: Option<PieceKind>,
    queue: PieceQueue,
    status: GameStatus,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState {
    /// Starts a game on the default 10×22 board with a random piece sequence.
    #[must_use]
    pub fn new() -> Self {
        Self::build(GameConfig::default(), PieceQueue::new())
    }

    /// Like [`Self::new`], but the piece sequence is determined by `seed`.
    #[must_use]
    pub fn with_seed(seed: PieceSeed) -> Self {
        Self::build(GameConfig::default(), PieceQueue::with_seed(seed))
    }

    /// Starts a game with a custom configuration.
    ///
    /// Without a seed the piece sequence is random.
    pub fn with_config(config: GameConfig, seed: Option<PieceSeed>) -> Result<Self, ConfigError> {
        config.validate()?;
        let queue = seed.map_or_else(PieceQueue::new, PieceQueue::with_seed);
        Ok(Self::build(config, queue))
    }

    /// `config` must already be valid, so the first spawn always fits.
    fn build(config: GameConfig, mut queue: PieceQueue) -> Self {
        let board = Board::new(config.width, config.total_height());
        let floating = PieceInstance::new(queue.next());
        let position = config.spawn;
        debug!(
            kind = %floating.kind(),
            width = config.width,
            height = config.total_height(),
            "new game"
        );
        Self {
            config,
            board,
            floating,
            position,
            held: None,
            queue,
            status: GameStatus::Playing,
        }
    }

    /// Discards the current game and starts over with the same configuration.
    pub fn reset(&mut self) {
        *self = Self::build(self.config.clone(), PieceQueue::new());
    }

    /// Like [`Self::reset`], but the new piece sequence is determined by `seed`.
    pub fn reset_with_seed(&mut self, seed: PieceSeed) {
        *self = Self::build(self.config.clone(), PieceQueue::with_seed(seed));
    }

    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[must_use]
    pub fn floating(&self) -> &PieceInstance {
        &self.floating
    }

    /// Top-left corner of the floating piece's bounding matrix.
    #[must_use]
    pub fn position(&self) -> Position {
        self.position
    }

    #[must_use]
    pub fn held(&self) -> Option<PieceKind> {
        self.held
    }

    /// The next `n` pieces, without consuming them.
    pub fn upcoming(&self, n: usize) -> impl Iterator<Item = PieceKind> + '_ {
        self.queue.peek(n)
    }

    #[must_use]
    pub fn status(&self) -> GameStatus {
        self.status
    }

    /// Returns whether the floating piece fits the board at its position.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.board.can_place(&self.floating, self.position)
    }

    /// Where the floating piece would rest after [`Self::hard_drop`].
    #[must_use]
    pub fn ghost_position(&self) -> Position {
        let mut position = self.position;
        if !self.board.can_place(&self.floating, position) {
            return position;
        }
        while self.board.can_place(&self.floating, position.down()) {
            position = position.down();
        }
        position
    }

    /// Board coordinates of the floating piece's cells.
    pub fn floating_cells(&self) -> impl Iterator<Item = (i32, i32, Color)> + '_ {
        self.cells_at(self.position)
    }

    /// Board coordinates the floating piece would cover at `position`.
    #[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub fn cells_at(&self, position: Position) -> impl Iterator<Item = (i32, i32, Color)> + '_ {
        self.floating.occupied_cells().map(move |(dy, dx, color)| {
            (position.row + dy as i32, position.col + dx as i32, color)
        })
    }

    fn try_move(&mut self, to: Position) -> bool {
        if self.status.is_topped_out() || !self.board.can_place(&self.floating, to) {
            return false;
        }
        self.position = to;
        true
    }

    /// Moves the floating piece one column left.
    pub fn left_shift(&mut self) -> bool {
        self.try_move(self.position.left())
    }

    /// Moves the floating piece one column right.
    pub fn right_shift(&mut self) -> bool {
        self.try_move(self.position.right())
    }

    /// Moves the floating piece one row down.
    pub fn soft_drop(&mut self) -> bool {
        self.try_move(self.position.down())
    }

    /// Drops the floating piece as far as it goes. The piece is not locked.
    pub fn hard_drop(&mut self) {
        while self.soft_drop() {}
    }

    pub fn rotate_clockwise(&mut self) -> bool {
        self.rotate(Spin::Clockwise)
    }

    pub fn rotate_counterclockwise(&mut self) -> bool {
        self.rotate(Spin::Counterclockwise)
    }

    /// Rotates, then keeps the first kick candidate that fits.
    ///
    /// Candidates belong to the transition leaving the pre-rotation state.
    /// When none fits, the inverse rotation restores the piece.
    fn rotate(&mut self, spin: Spin) -> bool {
        if self.status.is_topped_out() {
            return false;
        }

        let kicks: KickCandidates = match spin {
            Spin::Clockwise => self.floating.clockwise_kicks().clone(),
            Spin::Counterclockwise => self.floating.counterclockwise_kicks().clone(),
        };
        match spin {
            Spin::Clockwise => self.floating.rotate_clockwise(),
            Spin::Counterclockwise => self.floating.rotate_counterclockwise(),
        }

        let kicked = kicks
            .iter()
            .map(|kick| self.position.kicked(*kick))
            .find(|position| self.board.can_place(&self.floating, *position));
        if let Some(position) = kicked {
            self.position = position;
            return true;
        }

        match spin {
            Spin::Clockwise => self.floating.rotate_counterclockwise(),
            Spin::Counterclockwise => self.floating.rotate_clockwise(),
        }
        trace!(
            kind = %self.floating.kind(),
            rotation = %self.floating.rotation(),
            ?spin,
            "rotation rejected"
        );
        false
    }

    /// Merges the floating piece into the board and spawns the next one.
    ///
    /// Returns whether the new piece fits. A `false` result means the game is
    /// topped out; so does calling this while already topped out.
    pub fn lock(&mut self) -> bool {
        if self.status.is_topped_out() {
            return false;
        }
        self.board.merge(&self.floating, self.position);
        debug!(
            kind = %self.floating.kind(),
            row = self.position.row,
            col = self.position.col,
            "piece locked"
        );
        let next = self.queue.next();
        self.spawn(next)
    }

    /// Removes full rows and returns how many were removed.
    ///
    /// Rows above a cleared row move down and may land on the floating piece;
    /// that tops the game out just like a failed spawn.
    pub fn clear_lines(&mut self) -> usize {
        let cleared = self.board.clear_full_rows();
        if cleared == 0 {
            return 0;
        }
        debug!(cleared, "lines cleared");
        if self.status.is_playing() && !self.is_consistent() {
            info!(kind = %self.floating.kind(), "topped out by collapsing rows");
            self.status = GameStatus::ToppedOut;
        }
        cleared
    }

    /// Sets the floating piece aside.
    ///
    /// With an empty hold slot the next queued piece comes in; otherwise the
    /// held piece is swapped back. Either way the incoming piece starts at
    /// the spawn position in spawn orientation. Returns whether it fits.
    pub fn hold(&mut self) -> bool {
        if self.status.is_topped_out() {
            return false;
        }
        let current = self.floating.kind();
        let incoming = self
            .held
            .replace(current)
            .unwrap_or_else(|| self.queue.next());
        debug!(held = %current, incoming = %incoming, "hold");
        self.spawn(incoming)
    }

    /// Hard drops, locks and clears. Returns the [`Self::lock`] result.
    pub fn drop_and_lock(&mut self) -> bool {
        self.hard_drop();
        let spawned = self.lock();
        self.clear_lines();
        spawned
    }

    /// Soft drops, or locks and clears when the piece cannot move.
    ///
    /// Returns `false` only when the game is topped out afterwards.
    pub fn step_down(&mut self) -> bool {
        if self.soft_drop() {
            return true;
        }
        let spawned = self.lock();
        self.clear_lines();
        spawned
    }

    fn spawn(&mut self, kind: PieceKind) -> bool {
        self.floating = PieceInstance::new(kind);
        self.position = self.config.spawn;
        if self.is_consistent() {
            trace!(kind = %kind, "piece spawned");
            return true;
        }
        info!(kind = %kind, "topped out");
        self.status = GameStatus::ToppedOut;
        false
    }
}

#[cfg(test)]
mod tests {
    use rand::{Rng as _, SeedableRng as _};
    use rand_pcg::Pcg32;

    use super::*;
    use crate::{Cell, Rotation};

    const X: Cell = Cell::Occupied(Color::Red);

    fn seed() -> PieceSeed {
        "00112233445566778899aabbccddeeff".parse().unwrap()
    }

    fn game_with(kind: PieceKind, position: Position) -> GameState {
        let mut game = GameState::with_seed(seed());
        game.floating = PieceInstance::new(kind);
        game.position = position;
        game
    }

    fn snapshot(board: &Board) -> Vec<Vec<Cell>> {
        board.rows().map(<[Cell]>::to_vec).collect()
    }

    #[test]
    fn test_new_game_starts_at_spawn_on_empty_board() {
        let game = GameState::new();
        assert_eq!(game.position(), Position::new(0, 4));
        assert_eq!(game.board().width(), 10);
        assert_eq!(game.board().height(), 22);
        assert!(game.board().rows().flatten().all(|cell| cell.is_empty()));
        assert!(game.is_consistent());
        assert!(game.status().is_playing());
        assert_eq!(game.held(), None);
        assert_eq!(game.upcoming(5).count(), 5);
    }

    #[test]
    fn test_lock_and_clear_single_row() {
        let mut game = game_with(PieceKind::I, Position::new(20, 0));
        for col in 4..10 {
            game.board.fill_cell(21, col, X);
        }
        game.board.fill_cell(20, 0, X);
        game.board.fill_cell(5, 3, X);
        let before = snapshot(&game.board);

        assert!(game.lock());
        assert_eq!(game.clear_lines(), 1);

        let after = snapshot(&game.board);
        assert!(after[0].iter().all(|cell| cell.is_empty()));
        for row in 0..21 {
            assert_eq!(after[row + 1], before[row], "row {row}");
        }
        assert_eq!(game.clear_lines(), 0);
        assert_eq!(snapshot(&game.board), after);
    }

    #[test]
    fn test_left_shift_stops_at_wall() {
        let mut game = GameState::with_seed(seed());
        while game.left_shift() {}

        let leftmost = game.floating_cells().map(|(_, col, _)| col).min();
        assert_eq!(leftmost, Some(0));

        let position = game.position();
        let board = snapshot(game.board());
        assert!(!game.left_shift());
        assert_eq!(game.position(), position);
        assert_eq!(snapshot(game.board()), board);
    }

    #[test]
    fn test_hold_twice_swaps_back() {
        let mut game = GameState::with_seed(seed());
        let first = game.floating().kind();
        let second = game.upcoming(1).next().unwrap();

        game.rotate_clockwise();
        game.left_shift();
        assert!(game.hold());
        assert_eq!(game.held(), Some(first));
        assert_eq!(game.floating().kind(), second);
        assert_eq!(game.position(), Position::new(0, 4));

        assert!(game.hold());
        assert_eq!(game.held(), Some(second));
        assert_eq!(game.floating().kind(), first);
        assert_eq!(game.floating().rotation(), Rotation::SPAWN);
        assert_eq!(game.position(), Position::new(0, 4));
    }

    #[test]
    fn test_hold_with_empty_slot_draws_from_queue() {
        let mut game = GameState::with_seed(seed());
        let expected: Vec<_> = game.upcoming(3).collect();
        assert!(game.hold());
        assert_eq!(game.floating().kind(), expected[0]);
        assert_eq!(game.upcoming(2).collect::<Vec<_>>(), expected[1..]);
    }

    #[test]
    fn test_wall_kick_off_left_wall() {
        let mut game = game_with(PieceKind::T, Position::new(10, -1));
        game.floating.rotate_clockwise();
        assert!(game.is_consistent());

        assert!(game.rotate_clockwise());
        assert_eq!(game.position(), Position::new(10, 0));
        assert_eq!(game.floating().rotation(), Rotation::REVERSE);
        assert!(game.is_consistent());
    }

    #[test]
    fn test_boxed_in_rotation_reverts() {
        let mut game = game_with(PieceKind::I, Position::new(19, 0));
        for row in 0..22 {
            for col in 0..10 {
                if !(row == 20 && col < 4) {
                    game.board.fill_cell(row, col, X);
                }
            }
        }
        assert!(game.is_consistent());
        let floating = game.floating().clone();

        assert!(!game.rotate_clockwise());
        assert_eq!(game.floating(), &floating);
        assert_eq!(game.position(), Position::new(19, 0));

        assert!(!game.rotate_counterclockwise());
        assert_eq!(game.floating(), &floating);
        assert_eq!(game.position(), Position::new(19, 0));
    }

    #[test]
    fn test_rotate_then_back_restores_piece() {
        for kind in PieceKind::ALL {
            let mut game = game_with(kind, Position::new(8, 3));
            let floating = game.floating().clone();
            assert!(game.rotate_clockwise());
            assert!(game.rotate_counterclockwise());
            assert_eq!(game.floating(), &floating, "{kind}");
            assert_eq!(game.position(), Position::new(8, 3), "{kind}");
        }
    }

    #[test]
    fn test_failed_moves_change_nothing() {
        let mut game = game_with(PieceKind::O, Position::new(19, 5));
        game.board.fill_cell(21, 0, X);
        game.board.fill_cell(20, 5, X);
        let board = snapshot(&game.board);

        assert!(!game.soft_drop());
        assert!(!game.left_shift());
        assert!(game.right_shift());
        assert!(game.right_shift());
        assert!(!game.right_shift());
        assert_eq!(game.position(), Position::new(19, 7));
        assert_eq!(snapshot(&game.board), board);
    }

    #[test]
    fn test_hard_drop_lands_on_ghost() {
        let mut game = GameState::with_seed(seed());
        let ghost = game.ghost_position();
        game.hard_drop();
        assert_eq!(game.position(), ghost);
        assert_eq!(game.ghost_position(), ghost);
        assert!(!game.soft_drop());

        let bottom = game.floating_cells().map(|(row, _, _)| row).max();
        assert_eq!(bottom, Some(21));
    }

    #[test]
    fn test_top_out() {
        let mut game = GameState::with_seed(seed());
        game.hard_drop();
        for col in 0..9 {
            game.board.fill_cell(1, col, X);
        }

        assert!(!game.lock());
        assert!(game.status().is_topped_out());
        assert!(!game.is_consistent());

        let position = game.position();
        assert!(!game.left_shift());
        assert!(!game.soft_drop());
        assert!(!game.rotate_clockwise());
        assert!(!game.hold());
        assert!(!game.lock());
        assert!(!game.step_down());
        assert_eq!(game.position(), position);
        assert_eq!(game.clear_lines(), 0);

        game.reset_with_seed(seed());
        assert!(game.status().is_playing());
        assert!(game.is_consistent());
        assert!(game.board().rows().flatten().all(|cell| cell.is_empty()));
    }

    #[test]
    fn test_row_collapse_onto_floating_piece_tops_out() {
        // T at (0,4) covers (0,5) and (1,4..=6); the cell at (0,4) falls into (1,4).
        let mut game = game_with(PieceKind::T, Position::new(0, 4));
        game.board.fill_cell(0, 4, X);
        for col in 0..10 {
            game.board.fill_cell(10, col, X);
        }
        assert!(game.is_consistent());

        assert_eq!(game.clear_lines(), 1);
        assert!(game.status().is_topped_out());
        assert!(!game.is_consistent());
        assert_eq!(game.board().cell(1, 4), Some(X));

        let board = snapshot(game.board());
        assert!(!game.left_shift());
        assert!(!game.right_shift());
        assert!(!game.soft_drop());
        assert!(!game.rotate_clockwise());
        assert!(!game.rotate_counterclockwise());
        assert!(!game.hold());
        assert!(!game.lock());
        assert!(!game.step_down());
        assert!(!game.drop_and_lock());
        game.hard_drop();
        assert_eq!(game.position(), Position::new(0, 4));
        assert_eq!(game.floating().kind(), PieceKind::T);
        assert_eq!(game.held(), None);
        assert_eq!(snapshot(game.board()), board);
    }

    #[test]
    fn test_step_down_locks_when_resting() {
        let mut game = GameState::with_seed(seed());
        let second = game.upcoming(1).next().unwrap();
        game.hard_drop();
        let resting: Vec<_> = game.floating_cells().collect();

        assert!(game.step_down());
        assert_eq!(game.floating().kind(), second);
        for (row, col, color) in resting {
            assert_eq!(game.board().cell(row, col), Some(Cell::Occupied(color)));
        }
    }

    #[test]
    fn test_seeded_games_match() {
        let mut a = GameState::with_seed(seed());
        let mut b = GameState::with_seed(seed());
        for _ in 0..20 {
            assert_eq!(a.floating().kind(), b.floating().kind());
            assert_eq!(a.drop_and_lock(), b.drop_and_lock());
        }
        assert_eq!(snapshot(a.board()), snapshot(b.board()));
    }

    #[test]
    fn test_with_config_rejects_invalid_config() {
        let config = GameConfig {
            width: 2,
            ..GameConfig::default()
        };
        assert!(GameState::with_config(config, None).is_err());

        let config = GameConfig {
            width: 6,
            visible_height: 8,
            hidden_rows: 1,
            spawn: Position::new(0, 1),
            preview_len: 3,
        };
        let game = GameState::with_config(config, Some(seed())).unwrap();
        assert_eq!(game.board().width(), 6);
        assert_eq!(game.board().height(), 9);
        assert_eq!(game.position(), Position::new(0, 1));
    }

    #[test]
    fn test_random_play_stays_consistent() {
        let mut rng = Pcg32::seed_from_u64(42);
        let mut game = GameState::with_seed(seed());
        for _ in 0..5_000 {
            match rng.random_range(0..9) {
                0 => _ = game.left_shift(),
                1 => _ = game.right_shift(),
                2 => _ = game.soft_drop(),
                3 => game.hard_drop(),
                4 => _ = game.rotate_clockwise(),
                5 => _ = game.rotate_counterclockwise(),
                6 => _ = game.hold(),
                7 => _ = game.step_down(),
                _ => _ = game.drop_and_lock(),
            }
            assert_eq!(game.board().width(), 10);
            assert_eq!(game.board().height(), 22);
            if game.status().is_topped_out() {
                game.reset();
            }
            assert!(game.is_consistent());
        }
    }
}
