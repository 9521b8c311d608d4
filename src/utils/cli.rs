use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::consts::START_PERCEPTS;

#[derive(Parser, Debug)]
#[command(name = env!("CARGO_PKG_NAME"), version = env!("APP_VERSION"), about = env!("CARGO_PKG_DESCRIPTION"))]
pub struct Cli {
    /// TOML file with search, eval and time settings
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Play against the agent from the given percepts, or the standard start
    Play {
        /// Board as percepts, rows separated by '/'
        #[arg(short, long, default_value = START_PERCEPTS, allow_hyphen_values = true)]
        percepts: String,
        /// Play as the negative side, the agent moves first
        #[arg(long, default_value = "false")]
        second: bool,
        /// Seconds the agent gets per move [default: search to fixed depth]
        #[arg(short, long)]
        time: Option<f64>,
    },

    /// Let two agents play each other
    Selfplay {
        #[arg(short, long, default_value = START_PERCEPTS, allow_hyphen_values = true)]
        percepts: String,
        /// Time credit per side in seconds [default: untimed]
        #[arg(short, long)]
        time: Option<f64>,
        /// Stop after this many steps
        #[arg(short, long)]
        max_steps: Option<u32>,
    },

    /// Choose one move for a position and print it
    Choose {
        /// Board as percepts, rows separated by '/'
        #[arg(allow_hyphen_values = true)]
        percepts: String,
        /// Player to move, 1 or -1
        #[arg(long, default_value = "1", allow_hyphen_values = true)]
        player: String,
        /// Time left in seconds [default: untimed]
        #[arg(short, long)]
        time: Option<f64>,
        /// Override the depth of untimed searches
        #[arg(short, long)]
        depth: Option<u16>,
    },

    /// Run headless, speaking the line protocol on stdin/stdout
    Headless,
}

#[derive(Parser, Debug)]
#[command(name = "game_cmd", no_binary_name = true)]
pub struct GameCommand {
    #[command(subcommand)]
    pub cmd: GameSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum GameSubcommand {
    /// Move a tower: `move r1 c1 r2 c2`
    #[clap(visible_alias = "m")]
    Move {
        from_row: usize,
        from_col: usize,
        to_row: usize,
        to_col: usize,
    },

    /// Print the current board state
    #[clap(visible_alias = "p")]
    Print,

    /// Undo the last move pair
    #[clap(visible_alias = "u")]
    Undo,

    /// Show the move the agent would play
    #[clap(visible_alias = "h")]
    Hint,

    /// Show the current evaluation of the board
    #[clap(visible_alias = "e")]
    Evaluate,

    /// List legal actions
    #[clap(visible_alias = "a")]
    Actions,

    /// Change the agent's untimed search depth
    #[clap(visible_alias = "d")]
    Depth { depth: u16 },

    /// Clear screen
    #[clap(visible_alias = "c")]
    Clear,

    /// Restart game from the starting percepts
    #[clap(visible_alias = "r")]
    Restart,

    /// Quit game
    #[clap(visible_alias = "q")]
    Quit,
}
