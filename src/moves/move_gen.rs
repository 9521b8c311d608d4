use crate::moves::Direction;
use crate::prelude::*;

/// A move is valid when both cells hold a tower, the cells touch,
/// and the stacked height does not exceed `max_height`.
pub fn is_action_valid(grid: &Grid, max_height: i8, mv: Move) -> bool {
    let (r1, c1, r2, c2) = mv.as_tuple();
    if !grid.contains(r1 as isize, c1 as isize) || !grid.contains(r2 as isize, c2 as isize) {
        return false;
    }
    if !mv.from.is_adjacent(mv.to) {
        return false;
    }
    let (src, dst) = (grid.at(mv.from), grid.at(mv.to));
    can_stack(src, dst, max_height)
}

#[inline(always)]
fn can_stack(src: i8, dst: i8, max_height: i8) -> bool {
    src != 0 && dst != 0 && src.unsigned_abs() + dst.unsigned_abs() <= max_height as u8
}

/// Pushes every valid move of the tower at `from` into `moves`
pub fn generate_tower_actions(grid: &Grid, max_height: i8, from: Cell, moves: &mut Vec<Move>) {
    let src = grid.at(from);
    if src == 0 {
        return;
    }
    for (dr, dc) in Direction::ALL {
        let (row, col) = (from.row() as isize + dr, from.col() as isize + dc);
        if !grid.contains(row, col) {
            continue;
        }
        let to = Cell::new(row as usize, col as usize);
        if can_stack(src, grid.at(to), max_height) {
            moves.push(Move::from_cells(from, to));
        }
    }
}

/// Pushes every valid move on the board into `moves`, towers in row-major order
pub fn generate_actions(grid: &Grid, max_height: i8, moves: &mut Vec<Move>) {
    for (cell, _) in grid.occupied() {
        generate_tower_actions(grid, max_height, cell, moves);
    }
}

/// True when at least one move exists for the tower at `from`
pub fn is_tower_movable(grid: &Grid, max_height: i8, from: Cell) -> bool {
    let src = grid.at(from);
    if src == 0 {
        return false;
    }
    Direction::ALL.iter().any(|&(dr, dc)| {
        let (row, col) = (from.row() as isize + dr, from.col() as isize + dc);
        grid.contains(row, col) && can_stack(src, grid.get(row as usize, col as usize), max_height)
    })
}

/// True when no tower on the board can move
pub fn is_settled(grid: &Grid, max_height: i8) -> bool {
    grid.occupied()
        .all(|(cell, _)| !is_tower_movable(grid, max_height, cell))
}
