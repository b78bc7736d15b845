//! Computer opponent: three strength tiers behind a single selector, from
//! random play through one-ply tactics to alpha-beta minimax.

mod minimax;
mod random;
mod tactical;
mod tier;

pub use minimax::{Heuristic, Minimax, WindowHeuristic, SCORE_BOUND, SEARCH_DEPTH};
pub use random::random_column;
pub use tactical::{completes_four, tactical_column};
pub use tier::{choose_move, request_ai_move, AiTier, AI_PLAYER};
