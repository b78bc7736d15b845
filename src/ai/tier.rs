use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::ConfigError;
use crate::game::{GameState, Opponent, Player};

use super::minimax::{Minimax, SEARCH_DEPTH};
use super::random::random_column;
use super::tactical::tactical_column;

/// The computer always plays Yellow.
pub const AI_PLAYER: Player = Player::Yellow;

/// Strength of the computer opponent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiTier {
    /// Uniformly random legal column.
    #[default]
    Easy,
    /// Immediate win, else immediate block, else random.
    Medium,
    /// Alpha-beta minimax at [`SEARCH_DEPTH`].
    Hard,
}

impl FromStr for AiTier {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "easy" => Ok(AiTier::Easy),
            "medium" => Ok(AiTier::Medium),
            "hard" => Ok(AiTier::Hard),
            _ => Err(ConfigError::UnknownValue {
                kind: "AI tier",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for AiTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AiTier::Easy => "easy",
            AiTier::Medium => "medium",
            AiTier::Hard => "hard",
        })
    }
}

/// Pick a column for Yellow at the given tier. `None` only when no column
/// is playable.
pub fn choose_move<R: Rng + ?Sized>(state: &GameState, tier: AiTier, rng: &mut R) -> Option<usize> {
    let legal = state.legal_actions();
    let first = *legal.first()?;

    let col = match tier {
        AiTier::Easy => random_column(&legal, rng),
        AiTier::Medium => tactical_column(state, rng),
        AiTier::Hard => Minimax::new(SEARCH_DEPTH).best_move(state).or(Some(first)),
    };
    debug!(%tier, ?col, "computer chose");
    col
}

/// Play the computer's move if it is the computer's turn. Returns the
/// column played; `None` leaves the state untouched.
pub fn request_ai_move<R: Rng + ?Sized>(state: &mut GameState, rng: &mut R) -> Option<usize> {
    let Opponent::Computer(tier) = state.opponent() else {
        return None;
    };
    if !state.is_ai_turn() {
        return None;
    }

    let col = choose_move(state, tier, rng)?;
    match state.apply_move(col) {
        Ok(_) => Some(col),
        Err(err) => {
            warn!(col, %err, "computer move rejected");
            None
        }
    }
}
