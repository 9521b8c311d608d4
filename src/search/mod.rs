pub mod alpha_beta;
pub mod canonical;
pub mod common;
pub mod move_ordering;
pub mod tt;


pub use alpha_beta::AlphaBetaSearch;
pub use common::{Role, SearchConfig, SearchContext, SearchResult, SearchStats};
