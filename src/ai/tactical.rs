use rand::Rng;

use crate::game::{Board, GameState, Gravity, Player};

use super::random::random_column;
use super::tier::AI_PLAYER;

/// Whether dropping `player`'s token in `col` would complete four in a row.
/// The board is left exactly as it was.
pub fn completes_four(board: &mut Board, col: usize, player: Player, gravity: Gravity) -> bool {
    board
        .place_scoped(col, player.to_cell(), gravity)
        .is_some_and(|placed| placed.check_win(placed.row(), placed.col()))
}

/// One-ply lookahead: win if possible, otherwise block the opponent's win,
/// otherwise play at random.
pub fn tactical_column<R: Rng + ?Sized>(state: &GameState, rng: &mut R) -> Option<usize> {
    let legal = state.legal_actions();
    let gravity = state.gravity();
    let mut scratch = state.board().clone();

    for player in [AI_PLAYER, AI_PLAYER.other()] {
        if let Some(&col) = legal
            .iter()
            .find(|&&col| completes_four(&mut scratch, col, player, gravity))
        {
            return Some(col);
        }
    }

    random_column(&legal, rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::GameOutcome;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn yellow_to_move(rows: &[&str]) -> GameState {
        GameState::from_position(Board::from_rows(rows), Player::Yellow, Gravity::Down)
    }

    #[test]
    fn completes_four_leaves_board_untouched() {
        let mut board = Board::from_rows(&["....", "....", "....", "RRR."]);
        let before = board.clone();
        assert!(completes_four(&mut board, 3, Player::Red, Gravity::Down));
        assert!(!completes_four(&mut board, 3, Player::Yellow, Gravity::Down));
        assert!(!completes_four(&mut board, 2, Player::Red, Gravity::Down));
        assert_eq!(board, before);
    }

    #[test]
    fn takes_own_win_before_blocking() {
        let mut state = yellow_to_move(&[
            ".......", ".......", ".......", "......Y", "......Y", //
            "RRR...Y",
        ]);
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(tactical_column(&state, &mut rng), Some(6));

        state.apply_move(6).unwrap();
        assert_eq!(state.outcome(), Some(GameOutcome::Winner(Player::Yellow)));
    }

    #[test]
    fn blocks_opponent_rather_than_chase_gapped_three() {
        // Yellow's Y.YY cannot be completed this move: a token in column 1
        // lands on the bottom row, where it also stops Red's R.RR.
        let state = yellow_to_move(&[
            ".......", ".......", ".......", ".......", //
            "Y.YY...", //
            "R.RR...",
        ]);
        for seed in 0..10 {
            let mut rng = StdRng::seed_from_u64(seed);
            assert_eq!(tactical_column(&state, &mut rng), Some(1));
        }
    }

    #[test]
    fn falls_back_to_random_legal_column() {
        let state = yellow_to_move(&[
            "R.R.R", //
            "Y.Y.Y", //
            "RYRYR",
        ]);
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..20 {
            let col = tactical_column(&state, &mut rng).unwrap();
            assert!(col == 1 || col == 3, "column {col} is not legal");
        }
    }

    #[test]
    fn no_move_when_game_over() {
        let mut state = GameState::initial();
        for col in [0, 0, 1, 1, 2, 2, 3] {
            state.apply_move(col).unwrap();
        }
        assert!(state.is_terminal());
        let mut rng = StdRng::seed_from_u64(6);
        assert_eq!(tactical_column(&state, &mut rng), None);
    }
}
