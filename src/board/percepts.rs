//! Text encoding of the referee's percepts.
//!
//! Rows are separated by `/`, cells by `,`. Each cell is the signed tower
//! value, e.g. the first two rows of the starting position read
//! `0,0,1,-1,0,0,0,0,0/0,1,-1,1,-1,0,0,0,0/...`.
//! An optional trailing `h<N>` segment overrides the max tower height.

use crate::prelude::*;

pub fn parse_percepts(percepts: &str) -> miette::Result<Board> {
    let percepts = percepts.trim();
    miette::ensure!(!percepts.is_empty(), "Empty percepts");

    let mut max_height = MAX_HEIGHT;
    let mut rows = Vec::new();
    for segment in percepts.split('/') {
        let segment = segment.trim();
        if let Some(height) = segment.strip_prefix('h') {
            max_height = height
                .parse::<i8>()
                .into_diagnostic()
                .with_context(|| format!("Parsing max height segment '{segment}'"))?;
            continue;
        }
        rows.push(
            parse_row(segment).with_context(|| format!("Parsing row {} of percepts", rows.len()))?,
        );
    }

    let grid = Grid::from_rows(&rows).context("Building grid from percepts")?;
    Board::from_grid(grid, max_height)
}

fn parse_row(row: &str) -> miette::Result<Vec<i8>> {
    miette::ensure!(!row.is_empty(), "Empty row");
    row.split(',')
        .map(|cell| {
            let cell = cell.trim();
            cell.parse::<i8>()
                .into_diagnostic()
                .with_context(|| format!("Parsing cell '{cell}'"))
        })
        .collect()
}

pub fn to_percepts(board: &Board) -> String {
    let grid = board.grid();
    let mut rows: Vec<String> = (0..grid.rows())
        .map(|row| {
            (0..grid.columns())
                .map(|col| grid.get(row, col).to_string())
                .collect::<Vec<_>>()
                .join(",")
        })
        .collect();
    if board.max_height() != MAX_HEIGHT {
        rows.push(format!("h{}", board.max_height()));
    }
    rows.join("/")
}

impl Board {
    pub fn from_percepts(percepts: &str) -> miette::Result<Self> {
        parse_percepts(percepts)
    }

    pub fn to_percepts(&self) -> String {
        to_percepts(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_percepts_match_initial_board() {
        let board = parse_percepts(START_PERCEPTS).expect("Start percepts parse");
        assert_eq!(board.grid(), Board::new().grid());
        assert_eq!(board.to_percepts(), START_PERCEPTS);
    }

    #[test]
    fn test_custom_max_height() {
        let board = parse_percepts("1,-1/0,2/h3").unwrap();
        assert_eq!(board.max_height(), 3);
        assert_eq!(board.rows(), 2);
        assert_eq!(board.grid().get(1, 1), 2);
        assert_eq!(board.to_percepts(), "1,-1/0,2/h3");
    }

    #[test]
    fn test_rejects_malformed_percepts() {
        assert!(parse_percepts("").is_err());
        assert!(parse_percepts("1,0/1").is_err(), "Ragged rows");
        assert!(parse_percepts("1,x/0,0").is_err(), "Non numeric cell");
        assert!(parse_percepts("6,0/0,1").is_err(), "Tower above max height");
        assert!(parse_percepts("1,,0").is_err(), "Empty cell");
    }

    #[test]
    fn test_rejects_grids_too_wide_for_cells() {
        let wide = vec!["0"; MAX_GRID_DIM + 1].join(",");
        let err = parse_percepts(&format!("{wide}/{wide}")).unwrap_err();
        assert!(err.chain().any(|e| e.to_string().contains("exceeds")), "{err:?}");

        let mut widest = vec!["0"; MAX_GRID_DIM];
        widest[MAX_GRID_DIM - 2] = "1";
        widest[MAX_GRID_DIM - 1] = "-1";
        let board = parse_percepts(&widest.join(",")).unwrap();
        assert_eq!(board.columns(), MAX_GRID_DIM);
        assert_eq!(board.actions().len(), 2, "Last column is still addressable");
    }
}
