//! Core game logic: variable-size board with switchable gravity, players,
//! and the in-place game state machine.

mod board;
mod player;
mod state;

pub use board::{Board, Cell, Gravity, ScopedPlacement, WIN_LENGTH};
pub use player::Player;
pub use state::{GameConfig, GameOutcome, GameState, GravityMode, Opponent, REVERSAL_PERIOD};
