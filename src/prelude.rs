pub use crate::board::{
    self, Board, GameBoard, Player, Tower,
    grid::{Cell, Grid, MAX_GRID_DIM},
    percepts,
};
pub use crate::comms::{self, agent::Agent};
pub use crate::config::{AgentConfig, EvalConfig, TimeConfig};
pub use crate::consts::*;
pub use crate::evaluation::{self, Evaluator, FnEvaluator, FrozenMaterial};
pub use crate::moves::{self, Move, move_gen};
pub use crate::search::{
    self, AlphaBetaSearch, Role, SearchConfig, SearchResult, SearchStats,
    canonical::{CanonicalKey, CleanedGrid, NodeKey, Symmetry},
    tt::{ScoreTypes, SearchMemory},
};
pub use crate::utils::{self, cli::*, log::*, prng::*};
pub use miette::{self, Context, IntoDiagnostic, Result};
pub use std::fmt::Display;
pub use std::str::FromStr;
pub use tracing::{Level, debug, error, info, instrument, span, trace, warn};
