//! # Gravity Connect Four
//!
//! Connect Four on a variable-size board where gravity can reverse every few
//! turns, played in the terminal against another person or the computer.
//!
//! ## Modules
//!
//! - [`game`] — Board, players, gravity and the move/win/draw state machine
//! - [`ai`] — Computer opponents: random, tactical and alpha-beta minimax
//! - [`session`] — The active game and its RNG, owned by a single driver
//! - [`ui`] — Terminal UI: board view and key handling
//! - [`config`] — TOML configuration loading and validation
//! - [`error`] — Structured error types

pub mod ai;
pub mod config;
pub mod error;
pub mod game;
pub mod session;
pub mod ui;
