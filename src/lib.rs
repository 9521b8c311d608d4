pub mod board;
pub mod comms;
pub mod config;
pub mod evaluation;
pub mod game;
pub mod moves;
pub mod prelude;
pub mod search;
pub mod utils;

pub mod consts {
    pub const BOARD_SIZE: usize = 9;
    pub const NUM_CELLS: usize = BOARD_SIZE * BOARD_SIZE;

    /// Tallest tower a move is allowed to build
    pub const MAX_HEIGHT: i8 = 5;

    /// Number of symmetries of a board (4 rotations, each optionally reflected)
    pub const NUM_SYMMETRIES: usize = 8;

    pub const MAX_PLY: usize = 64;

    /// Weight of live material in the default evaluation
    pub const LIVE_MATERIAL_WEIGHT: f64 = 0.1;

    #[rustfmt::skip]
    pub const INITIAL_GRID: [[i8; BOARD_SIZE]; BOARD_SIZE] = [
        [ 0,  0,  1, -1,  0,  0,  0,  0,  0],
        [ 0,  1, -1,  1, -1,  0,  0,  0,  0],
        [ 0, -1,  1, -1,  1, -1,  1,  0,  0],
        [ 0,  1, -1,  1, -1,  1, -1,  1, -1],
        [ 1, -1,  1, -1,  0, -1,  1, -1,  1],
        [-1,  1, -1,  1, -1,  1, -1,  1,  0],
        [ 0,  0,  1, -1,  1, -1,  1, -1,  0],
        [ 0,  0,  0,  0, -1,  1, -1,  1,  0],
        [ 0,  0,  0,  0,  0, -1,  1,  0,  0],
    ];

    pub const START_PERCEPTS: &str = "0,0,1,-1,0,0,0,0,0/0,1,-1,1,-1,0,0,0,0/0,-1,1,-1,1,-1,1,0,0/0,1,-1,1,-1,1,-1,1,-1/1,-1,1,-1,0,-1,1,-1,1/-1,1,-1,1,-1,1,-1,1,0/0,0,1,-1,1,-1,1,-1,0/0,0,0,0,-1,1,-1,1,0/0,0,0,0,0,-1,1,0,0";
}
