use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::board::{Board, Gravity, WIN_LENGTH};
use super::Player;
use crate::ai::AiTier;
use crate::error::{ConfigError, MoveError};

/// Gravity flips after every this many completed moves in reversing mode.
pub const REVERSAL_PERIOD: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOutcome {
    Winner(Player),
    Draw,
}

/// Whether gravity stays put or flips periodically during play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GravityMode {
    #[default]
    #[serde(alias = "normal")]
    Fixed,
    #[serde(alias = "inverse")]
    Reversing,
}

impl FromStr for GravityMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fixed" | "normal" => Ok(GravityMode::Fixed),
            "reversing" | "inverse" => Ok(GravityMode::Reversing),
            _ => Err(ConfigError::UnknownValue {
                kind: "gravity mode",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for GravityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            GravityMode::Fixed => "fixed",
            GravityMode::Reversing => "reversing",
        })
    }
}

/// Who controls Yellow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Opponent {
    #[default]
    Human,
    Computer(AiTier),
}

/// Everything needed to start a game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameConfig {
    pub rows: usize,
    pub cols: usize,
    /// Random tokens placed before the first move.
    pub prefill: usize,
    pub gravity_mode: GravityMode,
    pub opponent: Opponent,
    /// Display names for Red and Yellow.
    pub names: [String; 2],
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            rows: 6,
            cols: 7,
            prefill: 0,
            gravity_mode: GravityMode::Fixed,
            opponent: Opponent::Human,
            names: ["Player 1".to_string(), "Player 2".to_string()],
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rows == 0 || self.cols == 0 {
            return Err(ConfigError::Validation(format!(
                "board must be at least 1x1, got {}x{}",
                self.rows, self.cols
            )));
        }
        let cells = self.rows.checked_mul(self.cols).ok_or_else(|| {
            ConfigError::Validation(format!(
                "a {}x{} board has too many cells",
                self.rows, self.cols
            ))
        })?;
        if self.prefill > cells {
            return Err(ConfigError::Validation(format!(
                "prefill {} exceeds the {} cells of a {}x{} board",
                self.prefill, cells, self.rows, self.cols
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    board: Board,
    current_player: Player,
    outcome: Option<GameOutcome>,
    last_move: Option<(usize, usize)>,
    turn_count: u32,
    gravity: Gravity,
    gravity_mode: GravityMode,
    opponent: Opponent,
    names: [String; 2],
}

impl GameState {
    /// Standard empty 6×7 human-vs-human game.
    pub fn initial() -> Self {
        Self::from_position(Board::new(6, 7), Player::Red, Gravity::Down)
    }

    /// Start a game from `config`, prefilling with the thread RNG.
    pub fn new(config: &GameConfig) -> Result<Self, ConfigError> {
        Self::with_rng(config, &mut rand::rng())
    }

    /// Start a game from `config`. Prefilled cells are distinct, chosen
    /// uniformly, and coloured at random; they do not count as moves.
    pub fn with_rng<R: Rng + ?Sized>(config: &GameConfig, rng: &mut R) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::prefilled(config, rng))
    }

    /// Build from an already validated config.
    pub(crate) fn prefilled<R: Rng + ?Sized>(config: &GameConfig, rng: &mut R) -> Self {
        let mut board = Board::new(config.rows, config.cols);
        for index in rand::seq::index::sample(&mut *rng, config.rows * config.cols, config.prefill) {
            let player = if rng.random_bool(0.5) {
                Player::Red
            } else {
                Player::Yellow
            };
            board.set(index / config.cols, index % config.cols, player.to_cell());
        }

        info!(
            rows = config.rows,
            cols = config.cols,
            prefill = config.prefill,
            mode = %config.gravity_mode,
            opponent = ?config.opponent,
            "new game"
        );

        GameState {
            board,
            current_player: Player::Red,
            outcome: None,
            last_move: None,
            turn_count: 0,
            gravity: Gravity::Down,
            gravity_mode: config.gravity_mode,
            opponent: config.opponent,
            names: config.names.clone(),
        }
    }

    /// Resume from an arbitrary position with fixed gravity and no opponent.
    pub fn from_position(board: Board, current_player: Player, gravity: Gravity) -> Self {
        GameState {
            board,
            current_player,
            outcome: None,
            last_move: None,
            turn_count: 0,
            gravity,
            gravity_mode: GravityMode::Fixed,
            opponent: Opponent::Human,
            names: ["Player 1".to_string(), "Player 2".to_string()],
        }
    }

    pub fn with_opponent(mut self, opponent: Opponent) -> Self {
        self.opponent = opponent;
        self
    }

    pub fn with_gravity_mode(mut self, gravity_mode: GravityMode) -> Self {
        self.gravity_mode = gravity_mode;
        self
    }

    /// Get current player
    pub fn current_player(&self) -> Player {
        self.current_player
    }

    /// Get reference to board
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Get game outcome if game is over
    pub fn outcome(&self) -> Option<GameOutcome> {
        self.outcome
    }

    pub fn winner(&self) -> Option<Player> {
        match self.outcome {
            Some(GameOutcome::Winner(player)) => Some(player),
            _ => None,
        }
    }

    /// Check if game is over
    pub fn is_terminal(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn last_move(&self) -> Option<(usize, usize)> {
        self.last_move
    }

    pub fn turn_count(&self) -> u32 {
        self.turn_count
    }

    pub fn gravity(&self) -> Gravity {
        self.gravity
    }

    pub fn gravity_mode(&self) -> GravityMode {
        self.gravity_mode
    }

    pub fn opponent(&self) -> Opponent {
        self.opponent
    }

    pub fn player_name(&self, player: Player) -> &str {
        &self.names[player.index()]
    }

    /// True when the computer controls the side to move.
    pub fn is_ai_turn(&self) -> bool {
        matches!(self.opponent, Opponent::Computer(_))
            && self.current_player == Player::Yellow
            && !self.is_terminal()
    }

    /// Get list of legal columns (entry cell empty), ascending.
    pub fn legal_actions(&self) -> Vec<usize> {
        if self.is_terminal() {
            return Vec::new();
        }
        self.board.legal_columns(self.gravity)
    }

    /// Whether the token at (row, col) completes four in a row. False off
    /// the board.
    pub fn has_win_at(&self, row: usize, col: usize) -> bool {
        self.board.check_win(row, col)
    }

    /// No column can take a token under the current gravity.
    pub fn is_draw(&self) -> bool {
        self.board.is_blocked(self.gravity)
    }

    /// The four cells to highlight after a win.
    pub fn winning_line(&self) -> Option<[(usize, usize); WIN_LENGTH]> {
        self.winner()
            .and_then(|player| self.board.winning_line(player.to_cell()))
    }

    /// Drop the current player's token in `column`, returning the landing
    /// cell. A rejected move leaves the state untouched.
    pub fn apply_move(&mut self, column: usize) -> Result<(usize, usize), MoveError> {
        if column >= self.board.cols() {
            return Err(MoveError::InvalidColumn {
                column,
                cols: self.board.cols(),
            });
        }
        if self.is_terminal() {
            return Err(MoveError::GameOver);
        }

        let player = self.current_player;
        let row = self
            .board
            .drop_piece(column, player.to_cell(), self.gravity)?;
        self.last_move = Some((row, column));
        self.turn_count += 1;
        debug!(player = player.name(), row, column, turn = self.turn_count, "move applied");

        // Flip before detection so the draw check sees the new entry row.
        if self.gravity_mode == GravityMode::Reversing && self.turn_count % REVERSAL_PERIOD == 0 {
            self.gravity = self.gravity.flipped();
            debug!(gravity = ?self.gravity, turn = self.turn_count, "gravity reversed");
        }

        if self.board.check_win(row, column) {
            self.outcome = Some(GameOutcome::Winner(player));
        } else if self.is_draw() {
            self.outcome = Some(GameOutcome::Draw);
        }
        if let Some(outcome) = self.outcome {
            info!(?outcome, turns = self.turn_count, "game over");
        }

        self.current_player = player.other();
        Ok((row, column))
    }
}
