use serde::{Deserialize, Serialize};
use tracing::debug_span;

use crate::prelude::*;
use std::{ops::Add, time::Duration};

const CUTOFF_HISTOGRAM_LEN: usize = 16;

/// Which side a node is searched for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// The agent, tries to raise the score
    Max,
    /// The opponent, tries to lower it
    Min,
}

impl Role {
    #[inline(always)]
    pub const fn opponent(&self) -> Self {
        match self {
            Role::Max => Role::Min,
            Role::Min => Role::Max,
        }
    }

    /// Starting value of a node's running best
    #[inline(always)]
    pub const fn worst(&self) -> f64 {
        match self {
            Role::Max => f64::NEG_INFINITY,
            Role::Min => f64::INFINITY,
        }
    }

    /// Strict improvement, equal values never replace the running best
    #[inline(always)]
    pub fn improves(&self, value: f64, best: f64) -> bool {
        match self {
            Role::Max => value > best,
            Role::Min => value < best,
        }
    }
}

/// Common statistics of a search
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchStats {
    pub nodes_searched: u64,
    pub depth_reached: u16,
    pub time_elapsed: Duration,
    pub nps: u64,

    // Where nodes ended
    pub terminal_returns: u64, // Game over, board score returned
    pub horizon_evals: u64,    // Depth cutoff, evaluator called
    pub expanded_nodes: u64,   // Moves generated and searched

    // Transposition table
    pub tt_probes: u64,
    pub tt_hits: u64,         // Entry deep enough
    pub tt_exact_returns: u64, // Returned stored exact value
    pub tt_cutoffs: u64,      // Stored bound closed the window
    pub tt_entries_max: usize,
    pub tt_entries_min: usize,

    // Alpha-beta window
    pub beta_cutoffs: u64,
    pub cutoff_at_move: [u64; CUTOFF_HISTOGRAM_LEN],
}

impl Add for SearchStats {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        let mut cutoff_at_move = [0u64; CUTOFF_HISTOGRAM_LEN];
        for (i, slot) in cutoff_at_move.iter_mut().enumerate() {
            *slot = self.cutoff_at_move[i] + rhs.cutoff_at_move[i];
        }

        let mut combined = Self {
            nodes_searched: self.nodes_searched + rhs.nodes_searched,
            depth_reached: self.depth_reached.max(rhs.depth_reached),
            time_elapsed: self.time_elapsed + rhs.time_elapsed,
            nps: 0,
            terminal_returns: self.terminal_returns + rhs.terminal_returns,
            horizon_evals: self.horizon_evals + rhs.horizon_evals,
            expanded_nodes: self.expanded_nodes + rhs.expanded_nodes,
            tt_probes: self.tt_probes + rhs.tt_probes,
            tt_hits: self.tt_hits + rhs.tt_hits,
            tt_exact_returns: self.tt_exact_returns + rhs.tt_exact_returns,
            tt_cutoffs: self.tt_cutoffs + rhs.tt_cutoffs,
            tt_entries_max: rhs.tt_entries_max,
            tt_entries_min: rhs.tt_entries_min,
            beta_cutoffs: self.beta_cutoffs + rhs.beta_cutoffs,
            cutoff_at_move,
        };
        combined.calculate_nps();
        combined
    }
}

impl SearchStats {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    fn percent(numerator: u64, denominator: u64) -> f64 {
        if denominator == 0 {
            0.0
        } else {
            100.0 * numerator as f64 / denominator as f64
        }
    }

    pub fn calculate_nps(&mut self) {
        let time_ms = self.time_elapsed.as_millis().max(1) as u64;
        self.nps = (self.nodes_searched * 1000) / time_ms;
    }

    pub fn avg_cutoff_index(&self) -> f64 {
        let total_cutoffs: u64 = self.cutoff_at_move.iter().sum();
        if total_cutoffs == 0 {
            0.0
        } else {
            let weighted_sum: u64 = self
                .cutoff_at_move
                .iter()
                .enumerate()
                .map(|(i, &count)| i as u64 * count)
                .sum();
            weighted_sum as f64 / total_cutoffs as f64
        }
    }

    pub fn log_summary(&self) {
        let _span = debug_span!("search_stats").entered();
        debug!("=> SEARCH STATISTICS (depth {})", self.depth_reached);
        debug!(
            "NODES total={} time={:?} nps={}",
            self.nodes_searched, self.time_elapsed, self.nps
        );

        debug!("==> Node Breakdown");
        debug!(
            "  - Terminal:         {:>9} ({:>6.2}%)",
            self.terminal_returns,
            Self::percent(self.terminal_returns, self.nodes_searched)
        );
        debug!(
            "  - Horizon Evals:    {:>9} ({:>6.2}%)",
            self.horizon_evals,
            Self::percent(self.horizon_evals, self.nodes_searched)
        );
        debug!(
            "  - Expanded:         {:>9} ({:>6.2}%)",
            self.expanded_nodes,
            Self::percent(self.expanded_nodes, self.nodes_searched)
        );

        debug!("==> Transposition Tables");
        debug!(
            "  - TT Hits:          {:>9} ({:>6.2}% of probes)",
            self.tt_hits,
            Self::percent(self.tt_hits, self.tt_probes)
        );
        debug!("    - Exact Returns:  {:>9}", self.tt_exact_returns);
        debug!("    - Bound Cutoffs:  {:>9}", self.tt_cutoffs);
        debug!(
            "  - Entries:          max={} min={}",
            self.tt_entries_max, self.tt_entries_min
        );

        let total_cutoffs: u64 = self.cutoff_at_move.iter().sum();
        if total_cutoffs > 0 {
            debug!("==> Move Ordering");
            debug!(
                "  - Beta Cutoffs:     {:>9} ({:>6.2}% of expanded)",
                self.beta_cutoffs,
                Self::percent(self.beta_cutoffs, self.expanded_nodes)
            );
            debug!("  - Avg. Cutoff Index:  {:.2}", self.avg_cutoff_index());

            let histogram: Vec<String> = self
                .cutoff_at_move
                .iter()
                .enumerate()
                .filter(|&(_, &count)| count > 0)
                .map(|(i, count)| format!("{i}:{count}"))
                .collect();
            debug!(
                "  - Cutoff Histogram (move index:count): [{}]",
                histogram.join(", ")
            );
        }
    }

    pub(crate) fn record_cutoff(&mut self, move_index: usize) {
        self.beta_cutoffs += 1;
        let slot = move_index.min(CUTOFF_HISTOGRAM_LEN - 1);
        self.cutoff_at_move[slot] += 1;
    }
}

/// Configuration for search behavior
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// First depth of iterative deepening
    pub min_depth: u16,
    /// Deepest iteration when searching under a time budget
    pub max_depth: u16,
    /// Fixed depth used when no time budget is given
    pub unbounded_depth: u16,
    /// Skip an iteration that is predicted to blow the budget
    pub predict_iteration_cost: bool,
    /// Entries per role table, `None` for unbounded
    pub tt_capacity: Option<usize>,
    pub collect_stats: bool,
    /// Seed of the focus-cell fallback, `None` seeds from the clock
    pub seed: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            min_depth: 1,
            max_depth: MAX_PLY as u16,
            unbounded_depth: 3,
            predict_iteration_cost: true,
            tt_capacity: None,
            collect_stats: true,
            seed: None,
        }
    }
}

impl SearchConfig {
    /// Searches exactly `depth` plies, no time budget involved
    pub fn fixed_depth(depth: u16) -> Self {
        Self {
            min_depth: depth,
            max_depth: depth,
            unbounded_depth: depth,
            ..Default::default()
        }
    }

    pub fn with_seed(self, seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..self
        }
    }
}

/// Result of a search
#[derive(Debug, Default, Clone)]
pub struct SearchResult {
    /// `None` when no iteration completed within the budget,
    /// or the board was already finished
    pub best_move: Option<Move>,
    pub score: f64,
    /// Depth of the deepest completed iteration
    pub depth: u16,
    pub nodes_searched: u64,
    pub time_taken: Duration,
    /// Time of each completed iteration, shallowest first
    pub iteration_times: Vec<Duration>,
}

impl SearchResult {
    /// The iteration that may have run past the budget
    pub fn last_iteration_time(&self) -> Option<Duration> {
        self.iteration_times.last().copied()
    }

    pub fn nps(&self) -> u64 {
        let time_ms = self.time_taken.as_millis().max(1) as u64;
        (self.nodes_searched * 1000) / time_ms
    }
}

/// Holds the distance from the root
#[derive(Clone, Copy, Debug)]
pub struct SearchContext {
    pub ply: usize,
}

impl SearchContext {
    pub fn root() -> Self {
        Self { ply: 0 }
    }

    pub fn new_child(&self) -> Self {
        Self { ply: self.ply + 1 }
    }

    #[inline(always)]
    pub fn is_root(&self) -> bool {
        self.ply == 0
    }
}
