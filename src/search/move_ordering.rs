use crate::prelude::*;

/// Moves starting close to the opponent's last action come first.
/// Stable: equally distant moves keep the board's order.
pub fn sort_moves(moves: &mut [Move], focus: Cell) {
    moves.sort_by_key(|mv| mv.from.distance(focus));
}

pub fn order(mut moves: Vec<Move>, focus: Cell) -> Vec<Move> {
    sort_moves(&mut moves, focus);
    moves
}

/// The only cell that held a tower in `previous` and is empty in `current`.
/// `None` when the grids differ in shape or zero or several cells emptied.
pub fn vacated_cell(previous: &Grid, current: &Grid) -> Option<Cell> {
    if previous.rows() != current.rows() || previous.columns() != current.columns() {
        return None;
    }
    let mut vacated = previous
        .iter()
        .zip(current.cells())
        .filter(|&((_, before), &after)| before != 0 && after == 0)
        .map(|((cell, _), _)| cell);
    match (vacated.next(), vacated.next()) {
        (Some(cell), None) => Some(cell),
        _ => None,
    }
}

/// Where the opponent last acted: the board's own record of the last move if
/// it keeps one, else the cell emptied since `previous`, else a random cell.
pub fn focus_cell<B: GameBoard>(board: &B, previous: Option<&Grid>, prng: &mut Prng) -> Cell {
    if let Some(mv) = board.last_move() {
        trace!("Focus from last move {mv}");
        return mv.from;
    }
    if let Some(cell) = previous.and_then(|prev| vacated_cell(prev, board.grid())) {
        trace!("Focus from grid diff {cell}");
        return cell;
    }
    let cell = Cell::new(prng.below(board.rows()), prng.below(board.columns()));
    debug!("No opponent move found, random focus {cell}");
    cell
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_by_chebyshev_distance() {
        let moves = vec![
            Move::new(8, 8, 7, 7),
            Move::new(4, 6, 4, 5),
            Move::new(3, 3, 3, 4),
            Move::new(5, 4, 5, 5),
            Move::new(0, 0, 0, 1),
        ];
        let ordered = order(moves, Cell::new(4, 4));
        let distances: Vec<usize> = ordered
            .iter()
            .map(|mv| mv.from.distance(Cell::new(4, 4)))
            .collect();
        assert_eq!(distances, vec![1, 1, 2, 4, 4]);
        // Ties keep the original order
        assert_eq!(ordered[0], Move::new(3, 3, 3, 4));
        assert_eq!(ordered[1], Move::new(5, 4, 5, 5));
        assert_eq!(ordered[3], Move::new(8, 8, 7, 7));
    }

    #[test]
    fn test_ordering_keeps_every_move() {
        let board = Board::new();
        let mut moves = board.actions();
        let mut ordered = order(moves.clone(), Cell::new(0, 8));
        moves.sort();
        ordered.sort();
        assert_eq!(moves, ordered);
    }

    #[test]
    fn test_vacated_cell_single_change() {
        let before = Board::new();
        let after = before.apply_move(Move::new(3, 1, 2, 1)).unwrap();
        assert_eq!(
            vacated_cell(before.grid(), after.grid()),
            Some(Cell::new(3, 1))
        );

        let twice = after.apply_move(Move::new(0, 2, 0, 3)).unwrap();
        assert_eq!(vacated_cell(before.grid(), twice.grid()), None, "Ambiguous diff");
        assert_eq!(vacated_cell(before.grid(), before.grid()), None);
    }

    #[test]
    fn test_focus_prefers_reported_move() {
        let mut prng = Prng::init(7);
        let board = Board::new().apply_move(Move::new(0, 2, 0, 3)).unwrap();
        assert_eq!(focus_cell(&board, None, &mut prng), Cell::new(0, 2));

        // Decoded boards carry no last move, fall back to the diff
        let decoded = Board::from_percepts(&board.to_percepts()).unwrap();
        let previous = Board::new();
        assert_eq!(
            focus_cell(&decoded, Some(previous.grid()), &mut prng),
            Cell::new(0, 2)
        );

        let random = focus_cell(&decoded, None, &mut prng);
        assert!(random.row() < BOARD_SIZE && random.col() < BOARD_SIZE);
    }
}
