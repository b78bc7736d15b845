//! The single active game, owned by whoever drives it.
//!
//! A `Session` bundles the game state with the configuration it was built
//! from and the RNG used for prefill and computer moves. All mutation goes
//! through `&mut self`, so the owner is the only writer: a human move and
//! the computer's deferred reply can never interleave.

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

use crate::ai;
use crate::error::{ConfigError, MoveError};
use crate::game::{GameConfig, GameState};

pub struct Session {
    config: GameConfig,
    state: GameState,
    rng: StdRng,
}

impl Session {
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        Self::with_rng(config, StdRng::from_os_rng())
    }

    /// Deterministic session for replays and tests.
    pub fn with_seed(config: GameConfig, seed: u64) -> Result<Self, ConfigError> {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: GameConfig, mut rng: StdRng) -> Result<Self, ConfigError> {
        let state = GameState::with_rng(&config, &mut rng)?;
        Ok(Session { config, state, rng })
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn is_ai_turn(&self) -> bool {
        self.state.is_ai_turn()
    }

    /// Human move. Refused while the computer is to move.
    pub fn play(&mut self, column: usize) -> Result<(usize, usize), MoveError> {
        if self.state.is_ai_turn() {
            return Err(MoveError::OutOfTurn);
        }
        self.state.apply_move(column)
    }

    /// Let the computer move if it is its turn.
    pub fn request_ai_move(&mut self) -> Option<usize> {
        ai::request_ai_move(&mut self.state, &mut self.rng)
    }

    /// Fresh game with the same configuration.
    pub fn rematch(&mut self) {
        info!("rematch");
        self.state = GameState::prefilled(&self.config, &mut self.rng);
    }

    /// Switch to a new configuration and start over. On error the current
    /// game is kept.
    pub fn reconfigure(&mut self, config: GameConfig) -> Result<(), ConfigError> {
        self.state = GameState::with_rng(&config, &mut self.rng)?;
        self.config = config;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::AiTier;
    use crate::game::{GameOutcome, Opponent, Player};

    fn vs_computer(tier: AiTier) -> GameConfig {
        GameConfig {
            opponent: Opponent::Computer(tier),
            ..GameConfig::default()
        }
    }

    #[test]
    fn test_human_and_computer_alternate() {
        let mut session = Session::with_seed(vs_computer(AiTier::Medium), 1).unwrap();
        assert!(!session.is_ai_turn());
        assert_eq!(session.request_ai_move(), None);

        session.play(3).unwrap();
        assert!(session.is_ai_turn());
        assert_eq!(session.play(4), Err(MoveError::OutOfTurn));
        assert_eq!(session.state().turn_count(), 1);

        assert!(session.request_ai_move().is_some());
        assert_eq!(session.state().current_player(), Player::Red);
        assert_eq!(session.state().turn_count(), 2);
    }

    #[test]
    fn test_hot_seat_never_requests_computer() {
        let mut session = Session::with_seed(GameConfig::default(), 2).unwrap();
        session.play(0).unwrap();
        assert!(!session.is_ai_turn());
        assert_eq!(session.request_ai_move(), None);
        session.play(0).unwrap();
        assert_eq!(session.state().turn_count(), 2);
    }

    #[test]
    fn test_rematch_resets_state() {
        let mut session = Session::with_seed(GameConfig::default(), 3).unwrap();
        for col in [0, 1, 0, 1, 0, 1, 0] {
            session.play(col).unwrap();
        }
        assert_eq!(
            session.state().outcome(),
            Some(GameOutcome::Winner(Player::Red))
        );

        session.rematch();
        assert!(!session.state().is_terminal());
        assert_eq!(session.state().turn_count(), 0);
        assert_eq!(session.state().current_player(), Player::Red);
    }

    #[test]
    fn test_same_seed_same_prefill() {
        let config = GameConfig {
            rows: 8,
            cols: 10,
            prefill: 7,
            ..GameConfig::default()
        };
        let a = Session::with_seed(config.clone(), 99).unwrap();
        let b = Session::with_seed(config, 99).unwrap();
        assert_eq!(a.state().board(), b.state().board());
    }

    #[test]
    fn test_reconfigure_keeps_game_on_error() {
        let mut session = Session::with_seed(GameConfig::default(), 4).unwrap();
        session.play(2).unwrap();

        let bad = GameConfig {
            cols: 0,
            ..GameConfig::default()
        };
        assert!(session.reconfigure(bad).is_err());
        assert_eq!(session.state().turn_count(), 1);

        let bigger = GameConfig {
            rows: 7,
            cols: 8,
            ..GameConfig::default()
        };
        session.reconfigure(bigger).unwrap();
        assert_eq!(session.state().board().cols(), 8);
        assert_eq!(session.config().rows, 7);
        assert_eq!(session.state().turn_count(), 0);
    }
}
