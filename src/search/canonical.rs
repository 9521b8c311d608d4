//! Symmetry-aware position keys.
//!
//! A position is keyed by its cleaned grid: frozen towers can never move or
//! be moved onto again, so they are zeroed out and only their signed count is
//! kept. The remaining live grid is reduced to the smallest of its 8 images
//! under the dihedral group of the board.

use crate::prelude::*;

/// The 8 symmetries of a board: `rotations` quarter turns clockwise,
/// followed by an upside-down flip when `reflect` is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symmetry {
    Identity,
    Rotate90,
    Rotate180,
    Rotate270,
    Reflect,
    ReflectRotate90,
    ReflectRotate180,
    ReflectRotate270,
}

impl Symmetry {
    pub const ALL: [Symmetry; NUM_SYMMETRIES] = [
        Symmetry::Identity,
        Symmetry::Rotate90,
        Symmetry::Rotate180,
        Symmetry::Rotate270,
        Symmetry::Reflect,
        Symmetry::ReflectRotate90,
        Symmetry::ReflectRotate180,
        Symmetry::ReflectRotate270,
    ];

    const fn rotations(&self) -> u8 {
        match self {
            Symmetry::Identity | Symmetry::Reflect => 0,
            Symmetry::Rotate90 | Symmetry::ReflectRotate90 => 1,
            Symmetry::Rotate180 | Symmetry::ReflectRotate180 => 2,
            Symmetry::Rotate270 | Symmetry::ReflectRotate270 => 3,
        }
    }

    const fn reflects(&self) -> bool {
        matches!(
            self,
            Symmetry::Reflect
                | Symmetry::ReflectRotate90
                | Symmetry::ReflectRotate180
                | Symmetry::ReflectRotate270
        )
    }

    /// Every reflection is its own inverse, rotations undo each other
    pub const fn inverse(&self) -> Self {
        match self {
            Symmetry::Rotate90 => Symmetry::Rotate270,
            Symmetry::Rotate270 => Symmetry::Rotate90,
            other => *other,
        }
    }

    /// Dimensions of the image of a `rows x columns` grid
    pub const fn image_dims(&self, rows: usize, columns: usize) -> (usize, usize) {
        if self.rotations() % 2 == 1 {
            (columns, rows)
        } else {
            (rows, columns)
        }
    }

    /// Where `(row, col)` of a `rows x columns` grid lands in the image
    pub fn apply_coords(&self, row: usize, col: usize, rows: usize, columns: usize) -> (usize, usize) {
        let (mut r, mut c) = (row, col);
        let (mut h, mut w) = (rows, columns);
        for _ in 0..self.rotations() {
            // Quarter turn clockwise: (r, c) -> (c, h - 1 - r)
            (r, c) = (c, h - 1 - r);
            (h, w) = (w, h);
        }
        if self.reflects() {
            r = h - 1 - r;
        }
        (r, c)
    }

    pub fn apply_cell(&self, cell: Cell, rows: usize, columns: usize) -> Cell {
        let (r, c) = self.apply_coords(cell.row(), cell.col(), rows, columns);
        Cell::new(r, c)
    }

    pub fn apply_move(&self, mv: Move, rows: usize, columns: usize) -> Move {
        Move::from_cells(
            self.apply_cell(mv.from, rows, columns),
            self.apply_cell(mv.to, rows, columns),
        )
    }

    /// Image of `grid`, a pure permutation of its cells
    pub fn apply(&self, grid: &Grid) -> Grid {
        if *self == Symmetry::Identity {
            return grid.clone();
        }
        let (rows, columns) = (grid.rows(), grid.columns());
        let (h, w) = self.image_dims(rows, columns);
        let mut image = Grid::new(h, w);
        for (cell, v) in grid.occupied() {
            let (r, c) = self.apply_coords(cell.row(), cell.col(), rows, columns);
            image.set(r, c, v);
        }
        image
    }
}

/// Board grid with frozen towers zeroed, plus their signed count
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanedGrid {
    pub grid: Grid,
    pub frozen_score: i32,
}

impl CleanedGrid {
    /// Signed count of the towers still in play
    pub fn live_score(&self) -> i32 {
        self.grid.signed_count()
    }
}

/// Zeroes every tower the board reports as immovable.
pub fn clean<B: GameBoard>(board: &B) -> CleanedGrid {
    let mut grid = board.grid().clone();
    let mut frozen_score = 0;
    for tower in board.towers() {
        let (row, col) = (tower.cell.row(), tower.cell.col());
        if !board.is_tower_movable(row, col) {
            grid.set(row, col, 0);
            frozen_score += tower.height.signum() as i32;
        }
    }
    CleanedGrid { grid, frozen_score }
}

/// All 8 images of `grid`, in [`Symmetry::ALL`] order
pub fn canonical_keys(grid: &Grid) -> [Grid; NUM_SYMMETRIES] {
    Symmetry::ALL.map(|sym| sym.apply(grid))
}

/// True if some image of `b` equals `a`
pub fn similar(a: &Grid, b: &Grid) -> bool {
    Symmetry::ALL.iter().any(|sym| sym.apply(b) == *a)
}

/// True if some image of `b`, with every owner swapped, equals `a`
pub fn similar_under_inversion(a: &Grid, b: &Grid) -> bool {
    let inverted = b.inverted();
    similar(a, &inverted)
}

/// Memoization key, the smallest image of a cleaned grid
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct CanonicalKey(Grid);

impl CanonicalKey {
    pub fn grid(&self) -> &Grid {
        &self.0
    }
}

/// Picks the smallest image of `grid` and the symmetry producing it
pub fn canonical_key(grid: &Grid) -> (CanonicalKey, Symmetry) {
    let mut best = (grid.clone(), Symmetry::Identity);
    for sym in Symmetry::ALL.into_iter().skip(1) {
        let image = sym.apply(grid);
        // Ties keep the earlier symmetry
        if image < best.0 {
            best = (image, sym);
        }
    }
    (CanonicalKey(best.0), best.1)
}

/// Everything the transposition table needs to know about a node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeKey {
    pub key: CanonicalKey,
    /// Maps the board onto `key`
    pub symmetry: Symmetry,
    pub frozen_score: i32,
    /// Dimensions of the board, before the symmetry
    pub rows: usize,
    pub columns: usize,
}

impl NodeKey {
    pub fn of<B: GameBoard>(board: &B) -> Self {
        let cleaned = clean(board);
        let (key, symmetry) = canonical_key(&cleaned.grid);
        Self {
            key,
            symmetry,
            frozen_score: cleaned.frozen_score,
            rows: board.rows(),
            columns: board.columns(),
        }
    }

    /// Board coordinates -> key coordinates
    pub fn to_canonical(&self, mv: Move) -> Move {
        self.symmetry.apply_move(mv, self.rows, self.columns)
    }

    /// Key coordinates -> board coordinates
    pub fn from_canonical(&self, mv: Move) -> Move {
        let grid = self.key.grid();
        self.symmetry
            .inverse()
            .apply_move(mv, grid.rows(), grid.columns())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_grid() -> Grid {
        Grid::from_rows(&[[1, -2, 0], [0, 3, -1], [4, 0, 0]]).unwrap()
    }

    #[test]
    fn test_symmetry_closure() {
        let board = Board::new();
        let grid = board.grid();
        let (key, _) = canonical_key(grid);
        for (sym, image) in Symmetry::ALL.iter().zip(canonical_keys(grid)) {
            assert!(similar(grid, &image), "{sym:?} image not similar to original");
            assert!(similar(&image, grid), "original not similar to {sym:?} image");
            assert_eq!(canonical_key(&image).0, key, "{sym:?} image has another key");
        }
        assert!(similar(grid, grid));
    }

    #[test]
    fn test_inverse_undoes_symmetry() {
        let grid = Grid::from_rows(&[[1, 2, 3], [4, 5, 0]]).unwrap();
        for sym in Symmetry::ALL {
            let image = sym.apply(&grid);
            assert_eq!(sym.inverse().apply(&image), grid, "{sym:?}");
            for (cell, v) in grid.iter() {
                let mapped = sym.apply_cell(cell, grid.rows(), grid.columns());
                assert_eq!(image.at(mapped), v, "{sym:?} moved {cell} wrongly");
                let back = sym
                    .inverse()
                    .apply_cell(mapped, image.rows(), image.columns());
                assert_eq!(back, cell);
            }
        }
    }

    #[test]
    fn test_rotation_and_reflection_shapes() {
        let grid = Grid::from_rows(&[[1, 2, 3], [4, 5, 6]]).unwrap();
        let rotated = Symmetry::Rotate90.apply(&grid);
        assert_eq!(rotated, Grid::from_rows(&[[4, 1], [5, 2], [6, 3]]).unwrap());
        let reflected = Symmetry::Reflect.apply(&grid);
        assert_eq!(reflected, Grid::from_rows(&[[4, 5, 6], [1, 2, 3]]).unwrap());
        // All 8 images of an asymmetric grid are distinct
        let images = canonical_keys(&grid);
        for i in 0..images.len() {
            for j in (i + 1)..images.len() {
                assert_ne!(images[i], images[j], "{:?} == {:?}", Symmetry::ALL[i], Symmetry::ALL[j]);
            }
        }
    }

    #[test]
    fn test_similar_under_inversion() {
        let grid = sample_grid();
        let flipped = Symmetry::ReflectRotate90.apply(&grid).inverted();
        assert!(similar_under_inversion(&grid, &flipped));
        assert!(!similar(&grid, &flipped));
        assert!(!similar_under_inversion(&grid, &grid));
    }

    #[test]
    fn test_clean_zeroes_frozen_towers() {
        // (0,0) and (0,1) are 4 and 3 high: stuck. (2,1)/(2,2) can still merge.
        let grid = Grid::from_rows(&[[4, -3, 0], [0, 0, 0], [0, 1, -1]]).unwrap();
        let board = Board::from_grid(grid, MAX_HEIGHT).unwrap();
        let cleaned = clean(&board);
        assert_eq!(cleaned.frozen_score, 0, "One frozen tower each");
        assert_eq!(cleaned.grid, Grid::from_rows(&[[0, 0, 0], [0, 0, 0], [0, 1, -1]]).unwrap());
        assert_eq!(cleaned.frozen_score + cleaned.live_score(), board.score());
    }

    #[test]
    fn test_frozen_score_reconstructs_settled_board() {
        let grid = Grid::from_rows(&[[5, 0, -1], [0, 0, 0], [2, 0, 3]]).unwrap();
        let board = Board::from_grid(grid, MAX_HEIGHT).unwrap();
        assert!(board.is_finished());
        let cleaned = clean(&board);
        assert_eq!(cleaned.grid.tower_count(), 0);
        assert_eq!(cleaned.frozen_score, board.score());
    }

    #[test]
    fn test_node_key_maps_moves_both_ways() {
        let grid = Grid::from_rows(&[[1, -1, 0, 0], [1, 0, 0, 0], [0, 0, -1, 1]]).unwrap();
        let board = Board::from_grid(grid.clone(), MAX_HEIGHT).unwrap();
        let node = NodeKey::of(&board);
        for mv in board.actions() {
            let canonical = node.to_canonical(mv);
            assert_eq!(node.from_canonical(canonical), mv);
            assert_eq!(node.key.grid().at(canonical.from), grid.at(mv.from));
            assert_eq!(node.key.grid().at(canonical.to), grid.at(mv.to));
        }
    }

    #[test]
    fn test_symmetric_boards_share_keys() {
        let board = Board::new().apply_move(Move::new(0, 2, 0, 3)).unwrap();
        let node = NodeKey::of(&board);
        for sym in Symmetry::ALL {
            let image = Board::from_grid(sym.apply(board.grid()), MAX_HEIGHT).unwrap();
            let other = NodeKey::of(&image);
            assert_eq!(other.key, node.key, "{sym:?}");
            assert_eq!(other.frozen_score, node.frozen_score);
        }
    }
}
