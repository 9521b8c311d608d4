//! MiniMax Search with Alpha-Beta pruning and Iterative Deepening
//! Also implements:
//! - Symmetry-aware transposition tables, one per ply role
//! - Move ordering around the opponent's last action
//! - Iteration cost prediction for the time budget

use std::time::{Duration, Instant};

use tracing::trace_span;

use crate::prelude::*;
use crate::search::canonical::NodeKey;
use crate::search::common::SearchContext;
use crate::search::move_ordering::{focus_cell, sort_moves};
use crate::search::tt::{ScoreTypes, SearchMemory};

/// Growth assumed for the next iteration when only one has run
const DEFAULT_BRANCHING_GROWTH: f64 = 8.0;

pub struct AlphaBetaSearch<B: GameBoard> {
    /// Core search data
    nodes_searched: u64,
    /// Leaves cut off by depth, counting memoized ones
    horizon_nodes: u64,
    focus: Cell,
    /// Search params
    config: SearchConfig,
    /// External deps
    evaluator: Box<dyn Evaluator<B>>,
    /// Transposition tables
    memory: SearchMemory,
    /// Grid left after our last chosen move, diffed to find the opponent's
    previous_grid: Option<Grid>,
    prng: Prng,
    /// Status
    start_time: Instant,
    /// Debug/tuning
    stats: SearchStats,
}

impl<B: GameBoard> std::fmt::Debug for AlphaBetaSearch<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlphaBetaSearch")
            .field("config", &self.config)
            .field("evaluator", &self.evaluator)
            .field("tt_max", &self.memory.len(Role::Max))
            .field("tt_min", &self.memory.len(Role::Min))
            .finish()
    }
}

impl Default for AlphaBetaSearch<Board> {
    fn default() -> Self {
        Self::new(Box::new(FrozenMaterial::default()))
    }
}

impl<B: GameBoard> AlphaBetaSearch<B> {
    pub fn new(evaluator: Box<dyn Evaluator<B>>) -> Self {
        Self::with_config(evaluator, SearchConfig::default())
    }

    pub fn with_config(evaluator: Box<dyn Evaluator<B>>, config: SearchConfig) -> Self {
        let prng = config.seed.map_or_else(Prng::from_clock, Prng::init);
        let memory = SearchMemory::new(config.tt_capacity, evaluator.frozen_relative());
        Self {
            nodes_searched: 0,
            horizon_nodes: 0,
            focus: Cell::default(),
            config,
            evaluator,
            memory,
            previous_grid: None,
            prng,
            start_time: Instant::now(),
            stats: SearchStats::new(),
        }
    }

    /// Memoized values belong to the old evaluator and are dropped
    pub fn set_evaluator(&mut self, evaluator: Box<dyn Evaluator<B>>) {
        debug!("Evaluator changed to {}", evaluator.name());
        self.memory = SearchMemory::new(self.config.tt_capacity, evaluator.frozen_relative());
        self.evaluator = evaluator;
    }

    pub fn evaluator(&self) -> &dyn Evaluator<B> {
        &*self.evaluator
    }

    pub fn config(&self) -> SearchConfig {
        self.config
    }

    pub fn set_config(&mut self, config: SearchConfig) {
        if config.tt_capacity != self.config.tt_capacity {
            self.memory = SearchMemory::new(config.tt_capacity, self.evaluator.frozen_relative());
        }
        self.config = config;
    }

    pub fn memory(&self) -> &SearchMemory {
        &self.memory
    }

    pub fn previous_grid(&self) -> Option<&Grid> {
        self.previous_grid.as_ref()
    }

    /// New game boundary: forget tables and the previous turn
    pub fn reset(&mut self) {
        trace!("Resetting search memory");
        self.memory.reset();
        self.previous_grid = None;
        self.stats = SearchStats::new();
    }

    pub fn get_stats(&mut self) -> SearchStats {
        self.stats.nodes_searched = self.nodes_searched;
        self.stats.time_elapsed = self.start_time.elapsed();
        self.stats.tt_entries_max = self.memory.len(Role::Max);
        self.stats.tt_entries_min = self.memory.len(Role::Min);
        self.stats.calculate_nps();
        self.stats
    }
}

// Main search
impl<B: GameBoard> AlphaBetaSearch<B> {
    /// Picks a move for the positive side of `board`.
    ///
    /// Iterative deepening runs until the deepest useful depth, until an
    /// iteration reached no depth cutoff, or until the budget is spent. The clock is only read between iterations: a started
    /// iteration always completes, so the budget can be overrun by up to one
    /// iteration. Without a budget the search runs to `unbounded_depth`.
    ///
    /// `best_move` is `None` if the budget ran out before the first
    /// iteration, or if the board is already finished.
    pub fn choose_move(
        &mut self,
        board: &B,
        time_budget: Option<Duration>,
    ) -> miette::Result<SearchResult> {
        let span = trace_span!("search_root");
        let _guard = span.enter();

        self.prepare_for_search();

        if board.is_finished() {
            debug!("Board is finished, nothing to play");
            return Ok(SearchResult {
                best_move: None,
                score: board.score() as f64,
                depth: 0,
                nodes_searched: 0,
                time_taken: self.start_time.elapsed(),
                iteration_times: Vec::new(),
            });
        }

        self.focus = focus_cell(board, self.previous_grid.as_ref(), &mut self.prng);

        // Every move removes a tower, so the game cannot last longer than
        // the number of live towers
        let live_towers = crate::search::canonical::clean(board).grid.tower_count() as u16;
        let depth_limit = match time_budget {
            Some(_) => self.config.max_depth,
            None => self.config.unbounded_depth,
        }
        .min(live_towers)
        .max(1);
        let first_depth = self.config.min_depth.clamp(1, depth_limit);

        debug!(
            "Choosing move with depths {first_depth}..={depth_limit}, budget: {time_budget:?}, focus: {}",
            self.focus
        );

        let mut best_move = None;
        let mut best_score = 0.0;
        let mut completed_depth = 0;
        let mut iteration_times: Vec<Duration> = Vec::new();

        'id_loop: for depth in first_depth..=depth_limit {
            if let Some(budget) = time_budget {
                let elapsed = self.start_time.elapsed();
                if elapsed >= budget {
                    debug!("Budget spent after {elapsed:?}, stopping before depth {depth}");
                    break 'id_loop;
                }
                let predicted = match self.config.predict_iteration_cost {
                    true => Self::predict_next_iteration(&iteration_times),
                    false => None,
                };
                if let Some(predicted) = predicted.filter(|&p| elapsed + p > budget) {
                    debug!(
                        "Depth {depth} predicted to take {predicted:?}, only {:?} left",
                        budget - elapsed
                    );
                    break 'id_loop;
                }
            }

            let iteration_start = Instant::now();
            let horizon_before = self.horizon_nodes;
            let (score, mv) = self.alpha_beta(
                board,
                SearchContext::root(),
                depth,
                f64::NEG_INFINITY,
                f64::INFINITY,
                Role::Max,
            )?;
            iteration_times.push(iteration_start.elapsed());

            completed_depth = depth;
            best_move = mv;
            best_score = score;

            debug!(
                "Iterative Deepening depth {depth} done in {:?}: score {score:.2}, move {}, nodes {}",
                iteration_start.elapsed(),
                mv.map(|m| m.to_string()).unwrap_or_else(|| "none".into()),
                self.nodes_searched
            );

            if self.horizon_nodes == horizon_before {
                debug!("Depth {depth} reached no horizon, the tree is solved");
                break 'id_loop;
            }
        }

        if best_move.is_none() {
            warn!("No iteration completed within the budget {time_budget:?}");
        }

        // Remember what the board looks like after our move, the diff with
        // the next board is the opponent's reply
        self.previous_grid = match best_move {
            Some(mv) => Some(board.apply_move(mv)?.grid().clone()),
            None => None,
        };

        if self.config.collect_stats {
            self.stats.depth_reached = completed_depth;
            self.get_stats().log_summary();
        }

        Ok(SearchResult {
            best_move,
            score: best_score,
            depth: completed_depth,
            nodes_searched: self.nodes_searched,
            time_taken: self.start_time.elapsed(),
            iteration_times,
        })
    }

    /// Full-width search to exactly `depth` plies, no time budget
    pub fn search_depth(&mut self, board: &B, depth: u16) -> miette::Result<(f64, Option<Move>)> {
        self.prepare_for_search();
        self.focus = focus_cell(board, self.previous_grid.as_ref(), &mut self.prng);
        self.alpha_beta(
            board,
            SearchContext::root(),
            depth,
            f64::NEG_INFINITY,
            f64::INFINITY,
            Role::Max,
        )
    }

    fn alpha_beta(
        &mut self,
        board: &B,
        context: SearchContext,
        depth: u16,
        mut alpha: f64,
        mut beta: f64,
        role: Role,
    ) -> miette::Result<(f64, Option<Move>)> {
        self.nodes_searched += 1;

        if board.is_finished() {
            if self.config.collect_stats {
                self.stats.terminal_returns += 1;
            }
            return Ok((board.score() as f64, None));
        }

        if depth == 0 {
            self.horizon_nodes += 1;
            if self.config.collect_stats {
                self.stats.horizon_evals += 1;
            }
            let score = self.evaluator.evaluate(board);
            trace!("Returning static eval: {score}");
            return Ok((score, None));
        }

        let node = NodeKey::of(board);
        let horizon_before = self.horizon_nodes;

        // TT Probe
        if self.config.collect_stats {
            self.stats.tt_probes += 1;
        }
        if let Some(hit) = self.memory.probe(&node, depth, role) {
            if self.config.collect_stats {
                self.stats.tt_hits += 1;
            }
            let used = match hit.score_type {
                ScoreTypes::Exact => true,
                // A bound alone says nothing about which root move is best
                _ if context.is_root() => false,
                ScoreTypes::LowerBound => {
                    alpha = alpha.max(hit.value);
                    true
                }
                ScoreTypes::UpperBound => {
                    beta = beta.min(hit.value);
                    true
                }
            };
            if used && hit.horizon_dependent {
                self.horizon_nodes += 1;
            }
            if hit.score_type == ScoreTypes::Exact {
                if self.config.collect_stats {
                    self.stats.tt_exact_returns += 1;
                }
                return Ok((hit.value, hit.best_move));
            }
            if alpha >= beta {
                if self.config.collect_stats {
                    self.stats.tt_cutoffs += 1;
                }
                return Ok((hit.value, hit.best_move));
            }
        }

        let mut legal_moves = board.actions();
        miette::ensure!(
            !legal_moves.is_empty(),
            "Board is not finished but reports no legal moves"
        );
        sort_moves(&mut legal_moves, self.focus);

        if self.config.collect_stats {
            self.stats.expanded_nodes += 1;
        }

        let (window_alpha, window_beta) = (alpha, beta);
        let mut best_score = role.worst();
        let mut best_move = None;

        for (move_index, &mv) in legal_moves.iter().enumerate() {
            let child = board.apply_move(mv)?;
            let (score, _) = self.alpha_beta(
                &child,
                context.new_child(),
                depth - 1,
                alpha,
                beta,
                role.opponent(),
            )?;

            if role.improves(score, best_score) {
                best_score = score;
                best_move = Some(mv);
            }

            match role {
                Role::Max => alpha = alpha.max(best_score),
                Role::Min => beta = beta.min(best_score),
            }

            if alpha >= beta {
                if self.config.collect_stats {
                    self.stats.record_cutoff(move_index);
                }
                break;
            }
        }

        let score_type = if best_score <= window_alpha {
            ScoreTypes::UpperBound
        } else if best_score >= window_beta {
            ScoreTypes::LowerBound
        } else {
            ScoreTypes::Exact
        };
        let horizon_dependent = self.horizon_nodes > horizon_before;
        self.memory.store(
            &node,
            depth,
            best_score,
            score_type,
            best_move,
            horizon_dependent,
            role,
        );

        Ok((best_score, best_move))
    }
}

impl<B: GameBoard> AlphaBetaSearch<B> {
    fn prepare_for_search(&mut self) {
        self.nodes_searched = 0;
        self.horizon_nodes = 0;
        self.stats = SearchStats::new();
        self.start_time = Instant::now();
    }

    /// Next iteration time, extrapolated from the growth of the last two
    fn predict_next_iteration(iteration_times: &[Duration]) -> Option<Duration> {
        let last = *iteration_times.last()?;
        let growth = match iteration_times {
            [.., before, last] if !before.is_zero() => {
                (last.as_secs_f64() / before.as_secs_f64()).max(1.0)
            }
            _ => DEFAULT_BRANCHING_GROWTH,
        };
        Some(last.mul_f64(growth))
    }
}
