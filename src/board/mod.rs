use crate::moves::move_gen;
use crate::prelude::*;

pub mod grid;
pub mod percepts;

/// A tower as reported by [`GameBoard::towers`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tower {
    pub cell: Cell,
    /// Signed height, the sign encodes the owner
    pub height: i8,
}

/// What the search needs from a game engine.
///
/// `apply_move` must not modify `self`: sibling branches of the search
/// each get their own copy of the board.
pub trait GameBoard: Clone {
    fn rows(&self) -> usize;
    fn columns(&self) -> usize;
    fn grid(&self) -> &Grid;

    /// Signed height at `(row, col)`, 0 for an empty cell
    fn cell(&self, row: usize, col: usize) -> i8 {
        self.grid().get(row, col)
    }

    fn is_finished(&self) -> bool;
    /// Authoritative score, positive when the positive side is ahead
    fn score(&self) -> i32;

    fn towers(&self) -> impl Iterator<Item = Tower> + '_;
    fn is_tower_movable(&self, row: usize, col: usize) -> bool;
    fn actions(&self) -> Vec<Move>;
    fn apply_move(&self, mv: Move) -> miette::Result<Self>;

    /// The move that produced this position, when the engine tracks it
    fn last_move(&self) -> Option<Move> {
        None
    }
}

/// The two players, as the referee numbers them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Player {
    Positive,
    Negative,
}

impl Player {
    pub const fn sign(&self) -> i8 {
        match self {
            Player::Positive => 1,
            Player::Negative => -1,
        }
    }

    pub const fn flip(&self) -> Self {
        match self {
            Player::Positive => Player::Negative,
            Player::Negative => Player::Positive,
        }
    }
}

impl TryFrom<i32> for Player {
    type Error = miette::Report;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Player::Positive),
            -1 => Ok(Player::Negative),
            other => miette::bail!("Player must be 1 or -1, got {other}"),
        }
    }
}

impl FromStr for Player {
    type Err = miette::Report;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s
            .trim()
            .parse::<i32>()
            .into_diagnostic()
            .with_context(|| format!("Parsing player '{s}'"))?;
        Player::try_from(value)
    }
}

impl Display for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.sign())
    }
}

/// An Avalam position
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Board {
    grid: Grid,
    max_height: i8,
    last_move: Option<Move>,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// The standard 9x9 starting position
    pub fn new() -> Self {
        let grid = Grid::from_array(&INITIAL_GRID);
        Self {
            grid,
            max_height: MAX_HEIGHT,
            last_move: None,
        }
    }

    pub fn from_grid(grid: Grid, max_height: i8) -> miette::Result<Self> {
        miette::ensure!(max_height > 0, "Max height must be positive, got {max_height}");
        if let Some((cell, v)) = grid
            .occupied()
            .find(|&(_, v)| v.unsigned_abs() > max_height as u8)
        {
            miette::bail!("Tower of height {v} at {cell} exceeds max height {max_height}");
        }
        Ok(Self {
            grid,
            max_height,
            last_move: None,
        })
    }

    #[inline(always)]
    pub fn max_height(&self) -> i8 {
        self.max_height
    }

    pub fn is_action_valid(&self, mv: Move) -> bool {
        move_gen::is_action_valid(&self.grid, self.max_height, mv)
    }

    /// Applies `mv` in place, the moved tower keeps its owner on top
    pub fn play_action(&mut self, mv: Move) -> miette::Result<()> {
        miette::ensure!(self.is_action_valid(mv), "Invalid move {mv} on board:\n{self}");
        let src = self.grid.at(mv.from);
        let dst = self.grid.at(mv.to);
        let height = src.abs() + dst.abs();
        self.grid.set(mv.to.row(), mv.to.col(), src.signum() * height);
        self.grid.set(mv.from.row(), mv.from.col(), 0);
        self.last_move = Some(mv);
        Ok(())
    }

    /// Swaps the owner of every tower
    pub fn invert(&mut self) {
        self.grid = self.grid.inverted();
    }

    /// Board seen from `player`'s side: their towers are positive
    pub fn oriented_for(&self, player: Player) -> Self {
        let mut board = self.clone();
        if player == Player::Negative {
            board.invert();
        }
        board
    }

    /// Number of towers that reached max height, signed
    pub fn full_towers(&self) -> i32 {
        self.grid
            .occupied()
            .filter(|&(_, v)| v.abs() == self.max_height)
            .map(|(_, v)| v.signum() as i32)
            .sum()
    }
}

impl GameBoard for Board {
    #[inline(always)]
    fn rows(&self) -> usize {
        self.grid.rows()
    }

    #[inline(always)]
    fn columns(&self) -> usize {
        self.grid.columns()
    }

    #[inline(always)]
    fn grid(&self) -> &Grid {
        &self.grid
    }

    fn is_finished(&self) -> bool {
        move_gen::is_settled(&self.grid, self.max_height)
    }

    fn score(&self) -> i32 {
        self.grid.signed_count()
    }

    fn towers(&self) -> impl Iterator<Item = Tower> + '_ {
        self.grid
            .occupied()
            .map(|(cell, height)| Tower { cell, height })
    }

    fn is_tower_movable(&self, row: usize, col: usize) -> bool {
        move_gen::is_tower_movable(&self.grid, self.max_height, Cell::new(row, col))
    }

    fn actions(&self) -> Vec<Move> {
        let mut moves = Vec::with_capacity(64);
        move_gen::generate_actions(&self.grid, self.max_height, &mut moves);
        moves
    }

    fn apply_move(&self, mv: Move) -> miette::Result<Self> {
        let mut board = self.clone();
        board.play_action(mv)?;
        Ok(board)
    }

    fn last_move(&self) -> Option<Move> {
        self.last_move
    }
}

impl Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.grid)?;
        writeln!(f, "Score: {}", self.score())
    }
}
