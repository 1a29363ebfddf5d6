use serde::{Deserialize, Serialize};

use crate::{PieceInstance, PieceKind, Position};

/// Longest preview the queue can always serve without drawing.
pub const MAX_PREVIEW_LEN: usize = PieceKind::LEN;

/// Largest board, in cells, a config may ask for.
pub const MAX_BOARD_CELLS: usize = 1 << 16;

/// Board and spawn parameters of a game.
///
/// Missing fields take their default when deserialized, so a config file
/// only needs to name what it changes:
///
/// ```
/// use stackfall_engine::GameConfig;
///
/// let config: GameConfig = serde_json::from_str(r#"{ "width": 12 }"#).unwrap();
/// assert_eq!(config.width, 12);
/// assert_eq!(config.total_height(), 22);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct GameConfig {
    /// Number of columns.
    pub width: usize,
    /// Number of rows shown to the player.
    pub visible_height: usize,
    /// Rows above the visible area where pieces spawn.
    pub hidden_rows: usize,
    /// Top-left corner of every newly spawned piece.
    pub spawn: Position,
    /// Number of upcoming pieces a host should display.
    pub preview_len: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: 10,
            visible_height: 20,
            hidden_rows: 2,
            spawn: Position::new(0, 4),
            preview_len: 5,
        }
    }
}

/// Error returned when a [`GameConfig`] cannot describe a playable game.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display("board of {width}x{height} cells is too small, need at least 4x4")]
    BoardTooSmall { width: usize, height: usize },
    #[display("board of {width}x{height} cells is too large")]
    BoardTooLarge { width: usize, height: usize },
    #[display("spawn position ({row}, {col}) leaves no room for the {kind} piece")]
    SpawnOutOfBounds { row: i32, col: i32, kind: PieceKind },
    #[display("preview of {len} pieces exceeds the maximum of 7")]
    PreviewTooLong { len: usize },
}

impl GameConfig {
    /// Number of rows of the board, hidden rows included.
    ///
    /// Saturates instead of overflowing; [`Self::validate`] rejects such configs.
    #[must_use]
    pub fn total_height(&self) -> usize {
        self.visible_height.saturating_add(self.hidden_rows)
    }

    /// Checks that the board is usable and every piece fits at the spawn position.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let width = self.width;
        let height = self.total_height();
        if width < 4 || height < 4 {
            return Err(ConfigError::BoardTooSmall { width, height });
        }
        // A saturated height always overflows here.
        if height
            .checked_mul(width)
            .is_none_or(|cells| cells > MAX_BOARD_CELLS)
        {
            return Err(ConfigError::BoardTooLarge { width, height });
        }

        if let Some(kind) = PieceKind::ALL
            .into_iter()
            .find(|kind| !self.fits_at_spawn(*kind))
        {
            return Err(ConfigError::SpawnOutOfBounds {
                row: self.spawn.row,
                col: self.spawn.col,
                kind,
            });
        }

        if self.preview_len > MAX_PREVIEW_LEN {
            return Err(ConfigError::PreviewTooLong {
                len: self.preview_len,
            });
        }
        Ok(())
    }

    /// Whether a freshly spawned `kind` lies inside an empty board.
    fn fits_at_spawn(&self, kind: PieceKind) -> bool {
        let within = |origin: i32, offset: usize, len: usize| {
            i64::try_from(offset)
                .ok()
                .and_then(|offset| offset.checked_add(i64::from(origin)))
                .and_then(|index| usize::try_from(index).ok())
                .is_some_and(|index| index < len)
        };
        PieceInstance::new(kind)
            .occupied_cells()
            .all(|(dy, dx, _)| {
                within(self.spawn.row, dy, self.total_height())
                    && within(self.spawn.col, dx, self.width)
            })
    }
}
