use crate::game::{Board, Cell, GameState, Gravity, Player, WIN_LENGTH};

use super::tier::AI_PLAYER;

/// Depth used by the hard tier.
pub const SEARCH_DEPTH: u32 = 4;

/// Initial alpha-beta window is `(-SCORE_BOUND, SCORE_BOUND)`.
pub const SCORE_BOUND: i32 = 1000;

/// Trait for evaluating a board position from a player's perspective.
pub trait Heuristic: Send {
    fn evaluate(&self, board: &Board, player: Player) -> i32;
}

/// Scores every 4-cell window: 100 / 10 / 2 for four / three / two of one
/// colour with no opposing token, positive for `player`, negative for the
/// other side. Mixed windows are dead and score nothing.
pub struct WindowHeuristic;

impl WindowHeuristic {
    fn weight(count: usize) -> i32 {
        match count {
            4 => 100,
            3 => 10,
            2 => 2,
            _ => 0,
        }
    }

    fn score_window(window: &[Cell; WIN_LENGTH], own_cell: Cell, opp_cell: Cell) -> i32 {
        let own = window.iter().filter(|&&c| c == own_cell).count();
        let opp = window.iter().filter(|&&c| c == opp_cell).count();
        if own > 0 && opp > 0 {
            return 0;
        }
        Self::weight(own) - Self::weight(opp)
    }
}

impl Heuristic for WindowHeuristic {
    fn evaluate(&self, board: &Board, player: Player) -> i32 {
        let own_cell = player.to_cell();
        let opp_cell = player.other().to_cell();
        board
            .windows()
            .map(|window| Self::score_window(&window, own_cell, opp_cell))
            .sum()
    }
}

/// Facts about the root position that stay fixed for the whole search.
/// Gravity in particular is not re-derived between plies.
#[derive(Debug, Clone, Copy)]
struct Root {
    gravity: Gravity,
    game_over: bool,
}

/// Depth-limited minimax with alpha-beta pruning. The computer maximizes,
/// its opponent minimizes.
pub struct Minimax {
    depth: u32,
    heuristic: Box<dyn Heuristic>,
}

impl Minimax {
    pub fn new(depth: u32) -> Self {
        Minimax {
            depth,
            heuristic: Box::new(WindowHeuristic),
        }
    }

    pub fn with_heuristic(depth: u32, heuristic: Box<dyn Heuristic>) -> Self {
        Minimax { depth, heuristic }
    }

    /// Column the search settles on, if it reaches a decision at all.
    pub fn best_move(&self, state: &GameState) -> Option<usize> {
        self.analyse(state).1
    }

    /// Root score and column for the side to maximize.
    pub fn analyse(&self, state: &GameState) -> (i32, Option<usize>) {
        let root = Root {
            gravity: state.gravity(),
            game_over: state.is_terminal(),
        };
        let mut scratch = state.board().clone();
        self.search(&mut scratch, root, self.depth, true, -SCORE_BOUND, SCORE_BOUND)
    }

    fn search(
        &self,
        board: &mut Board,
        root: Root,
        depth: u32,
        maximizing: bool,
        mut alpha: i32,
        mut beta: i32,
    ) -> (i32, Option<usize>) {
        if depth == 0 || root.game_over {
            return (self.heuristic.evaluate(board, AI_PLAYER), None);
        }

        let (mover, mut best) = if maximizing {
            (AI_PLAYER, -SCORE_BOUND)
        } else {
            (AI_PLAYER.other(), SCORE_BOUND)
        };
        let mut best_col = None;

        for col in 0..board.cols() {
            if !board.is_column_open(col, root.gravity) {
                continue;
            }
            if best_col.is_none() {
                best_col = Some(col);
            }

            let Some(mut placed) = board.place_scoped(col, mover.to_cell(), root.gravity) else {
                continue;
            };
            let (eval, _) = self.search(&mut placed, root, depth - 1, !maximizing, alpha, beta);
            drop(placed);

            if maximizing {
                if eval > best {
                    best = eval;
                    best_col = Some(col);
                }
                alpha = alpha.max(eval);
            } else {
                if eval < best {
                    best = eval;
                    best_col = Some(col);
                }
                beta = beta.min(eval);
            }
            if beta <= alpha {
                break;
            }
        }

        match best_col {
            Some(_) => (best, best_col),
            None => (0, None),
        }
    }
}
