use crate::prelude::*;

pub mod move_gen;
#[cfg(test)]
mod tests;

/// Neighbour offsets, row-major around the source cell
pub struct Direction;
impl Direction {
    pub const ALL: [(isize, isize); 8] = [
        (-1, -1),
        (-1, 0),
        (-1, 1),
        (0, -1),
        (0, 1),
        (1, -1),
        (1, 0),
        (1, 1),
    ];
}

/// Moves the whole tower at `from` on top of the tower at `to`
#[derive(Default, Debug, Hash, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Move {
    pub from: Cell,
    pub to: Cell,
}

impl Move {
    pub const fn new(from_row: usize, from_col: usize, to_row: usize, to_col: usize) -> Self {
        Self {
            from: Cell::new(from_row, from_col),
            to: Cell::new(to_row, to_col),
        }
    }

    #[inline(always)]
    pub const fn from_cells(from: Cell, to: Cell) -> Self {
        Self { from, to }
    }

    /// The referee's `(row1, col1, row2, col2)` representation
    pub const fn as_tuple(&self) -> (usize, usize, usize, usize) {
        (
            self.from.row(),
            self.from.col(),
            self.to.row(),
            self.to.col(),
        )
    }
}

impl From<(usize, usize, usize, usize)> for Move {
    fn from((r1, c1, r2, c2): (usize, usize, usize, usize)) -> Self {
        Self::new(r1, c1, r2, c2)
    }
}

impl Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (r1, c1, r2, c2) = self.as_tuple();
        write!(f, "{r1} {c1} {r2} {c2}")
    }
}

impl FromStr for Move {
    type Err = miette::Report;

    /// Accepts four coordinates separated by whitespace and/or commas,
    /// optionally wrapped in parentheses: `1 4 1 3`, `(1, 4, 1, 3)`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let coords = s
            .trim()
            .trim_start_matches('(')
            .trim_end_matches(')')
            .split(|c: char| c == ',' || c.is_ascii_whitespace())
            .filter(|part| !part.is_empty())
            .map(|part| {
                part.parse::<u8>()
                    .into_diagnostic()
                    .with_context(|| format!("Parsing coordinate '{part}' of move '{s}'"))
            })
            .collect::<miette::Result<Vec<u8>>>()?;

        miette::ensure!(
            coords.len() == 4,
            "A move needs exactly 4 coordinates, got {} in '{s}'",
            coords.len()
        );
        Ok(Self::new(
            coords[0] as usize,
            coords[1] as usize,
            coords[2] as usize,
            coords[3] as usize,
        ))
    }
}
