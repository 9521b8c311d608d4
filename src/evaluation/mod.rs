//! Static evaluation for depth cutoffs.
//!
//! Game-terminal nodes never reach an evaluator, they are scored by the board
//! itself. Evaluators only rank positions the search had to stop looking at.

use std::fmt::Debug;

use crate::prelude::*;
use crate::search::canonical::clean;

/// Values are memoized per canonical grid, so an evaluator must not depend
/// on the orientation of the board.
pub trait Evaluator<B: GameBoard>: Debug {
    /// Higher is better for the positive side
    fn evaluate(&self, board: &B) -> f64;

    fn name(&self) -> &str;

    /// True only if `evaluate(board) == frozen_score + f(cleaned grid)` for
    /// some `f`. Boards sharing a cleaned grid then share memoized values,
    /// shifted by their frozen score. Otherwise the frozen score is part of
    /// the memo key and values are stored as evaluated.
    fn frozen_relative(&self) -> bool {
        false
    }
}

/// Frozen towers can no longer change owner, so they count in full.
/// Live towers still count a little to break ties.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrozenMaterial {
    pub live_weight: f64,
}

impl Default for FrozenMaterial {
    fn default() -> Self {
        Self {
            live_weight: LIVE_MATERIAL_WEIGHT,
        }
    }
}

impl FrozenMaterial {
    pub fn new(live_weight: f64) -> Self {
        Self { live_weight }
    }
}

impl<B: GameBoard> Evaluator<B> for FrozenMaterial {
    fn evaluate(&self, board: &B) -> f64 {
        let cleaned = clean(board);
        cleaned.frozen_score as f64 + self.live_weight * cleaned.live_score() as f64
    }

    fn name(&self) -> &str {
        "frozen_material"
    }

    fn frozen_relative(&self) -> bool {
        true
    }
}

/// Wraps a plain function or closure as an [`Evaluator`]
pub struct FnEvaluator<F> {
    name: String,
    eval: F,
}

impl<F> FnEvaluator<F> {
    pub fn new(name: impl Into<String>, eval: F) -> Self {
        Self {
            name: name.into(),
            eval,
        }
    }
}

impl<F> Debug for FnEvaluator<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnEvaluator").field("name", &self.name).finish()
    }
}

impl<B, F> Evaluator<B> for FnEvaluator<F>
where
    B: GameBoard,
    F: Fn(&B) -> f64,
{
    fn evaluate(&self, board: &B) -> f64 {
        (self.eval)(board)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Raw board score, no notion of frozen towers
pub fn raw_score<B: GameBoard>(board: &B) -> f64 {
    board.score() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frozen_material_weights_live_towers() {
        // Two frozen positive towers, one live pair
        let grid = Grid::from_rows(&[[5, 0, 0, 4], [0, 0, 0, 0], [0, 1, -1, 1]]).unwrap();
        let board = Board::from_grid(grid, MAX_HEIGHT).unwrap();
        let eval = FrozenMaterial::default();
        let score = Evaluator::<Board>::evaluate(&eval, &board);
        assert!((score - (2.0 + 0.1 * 1.0)).abs() < 1e-9, "got {score}");
    }

    #[test]
    fn test_settled_board_evaluates_to_score() {
        let grid = Grid::from_rows(&[[5, 0, -1], [0, 0, 0], [-2, 0, 3]]).unwrap();
        let board = Board::from_grid(grid, MAX_HEIGHT).unwrap();
        let score = FrozenMaterial::default().evaluate(&board);
        assert_eq!(score, board.score() as f64);
    }

    #[test]
    fn test_fn_evaluator_is_swappable() {
        let board = Board::new().apply_move(Move::new(0, 2, 0, 3)).unwrap();
        let evaluators: Vec<Box<dyn Evaluator<Board>>> = vec![
            Box::new(FrozenMaterial::new(0.5)),
            Box::new(FnEvaluator::new("raw", raw_score::<Board>)),
            Box::new(FnEvaluator::new("constant", |_: &Board| 42.0)),
        ];
        let scores: Vec<f64> = evaluators.iter().map(|e| e.evaluate(&board)).collect();
        assert_eq!(scores[1], board.score() as f64);
        assert_eq!(scores[2], 42.0);
        assert_eq!(evaluators[2].name(), "constant");
        assert!(evaluators[0].frozen_relative());
        assert!(!evaluators[1].frozen_relative());
    }
}
