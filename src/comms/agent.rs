use std::time::Duration;

use crate::prelude::*;

/// Plays one side of a game through the referee's interface: percepts in,
/// `(r1, c1, r2, c2)` out.
///
/// The search always plays the positive side, boards are inverted for the
/// negative player before searching.
#[derive(Debug)]
pub struct Agent {
    config: AgentConfig,
    search: AlphaBetaSearch<Board>,
    players: Vec<Player>,
    time_credit: Option<f64>,
    last_result: Option<SearchResult>,
}

impl Default for Agent {
    fn default() -> Self {
        Self::new(AgentConfig::default())
    }
}

impl Agent {
    pub fn new(config: AgentConfig) -> Self {
        let search = AlphaBetaSearch::with_config(Box::new(config.evaluator()), config.search);
        Self {
            config,
            search,
            players: vec![Player::Positive, Player::Negative],
            time_credit: None,
            last_result: None,
        }
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: AgentConfig) {
        if config.eval != self.config.eval {
            self.search.set_evaluator(Box::new(config.evaluator()));
        }
        self.search.set_config(config.search);
        self.config = config;
    }

    pub fn search(&self) -> &AlphaBetaSearch<Board> {
        &self.search
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// Starts a new game, earlier positions are forgotten
    pub fn initialize(
        &mut self,
        percepts: Option<&str>,
        players: &[Player],
        time_left: Option<f64>,
    ) -> miette::Result<()> {
        if let Some(percepts) = percepts {
            let board = Board::from_percepts(percepts).context("Initial percepts")?;
            debug!("New game on board:\n{board}");
        }
        self.search.reset();
        self.last_result = None;
        if !players.is_empty() {
            self.players = players.to_vec();
        }
        self.time_credit = time_left;
        info!(
            "Initialized for players {:?}, time credit: {}",
            self.players,
            fmt_time(time_left)
        );
        Ok(())
    }

    /// Picks the action for `player`. `None` when the board is already
    /// finished or the budget allowed no complete search.
    pub fn play(
        &mut self,
        percepts: &str,
        player: Player,
        step: u32,
        time_left: Option<f64>,
    ) -> miette::Result<Option<Move>> {
        let board = Board::from_percepts(percepts).context("Decoding percepts")?;
        debug!(
            "Step {step}, player {player}, time left: {}",
            fmt_time(time_left)
        );
        let result = self.play_board(&board, player, time_left)?;
        info!(
            "Step {step}: played {} (score {:.2}, depth {}, {} nodes in {:?})",
            result
                .best_move
                .map(|mv| mv.to_string())
                .unwrap_or_else(|| "none".into()),
            result.score,
            result.depth,
            result.nodes_searched,
            result.time_taken
        );
        Ok(result.best_move)
    }

    /// Searches `board` for `player`, the board is in the referee's colours
    pub fn play_board(
        &mut self,
        board: &Board,
        player: Player,
        time_left: Option<f64>,
    ) -> miette::Result<SearchResult> {
        if !self.players.contains(&player) {
            warn!("Asked to play {player}, initialized for {:?}", self.players);
        }
        self.time_credit = time_left;
        let budget = self.move_budget(time_left);
        trace!("Move budget: {budget:?}");
        let result = self.think(board, player, budget)?;
        self.last_result = Some(result.clone());
        Ok(result)
    }

    /// Searches `board` for `player` with an explicit budget
    pub fn think(
        &mut self,
        board: &Board,
        player: Player,
        budget: Option<Duration>,
    ) -> miette::Result<SearchResult> {
        let oriented = board.oriented_for(player);
        self.search.choose_move(&oriented, budget)
    }

    /// Static evaluation of `board` from `player`'s side
    pub fn evaluate(&self, board: &Board, player: Player) -> f64 {
        self.search.evaluator().evaluate(&board.oriented_for(player))
    }

    /// Time granted to the next move, `None` for an untimed game
    pub fn move_budget(&self, time_left: Option<f64>) -> Option<Duration> {
        time_left.map(|secs| self.config.time.move_budget(secs))
    }

    pub fn time_credit(&self) -> Option<f64> {
        self.time_credit
    }

    /// Search behind the latest `play`
    pub fn last_result(&self) -> Option<&SearchResult> {
        self.last_result.as_ref()
    }
}

fn fmt_time(time_left: Option<f64>) -> String {
    match time_left {
        Some(secs) => format!("{secs:.2}s"),
        None => "+inf".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quick_agent() -> Agent {
        let mut config = AgentConfig::default();
        config.search = SearchConfig::fixed_depth(1).with_seed(5);
        Agent::new(config)
    }

    #[test]
    fn test_untimed_play_returns_legal_action() {
        let mut agent = quick_agent();
        agent
            .initialize(Some(START_PERCEPTS), &[Player::Positive], None)
            .unwrap();
        let mv = agent
            .play(START_PERCEPTS, Player::Positive, 1, None)
            .unwrap()
            .expect("Start position has moves");
        assert!(Board::new().is_action_valid(mv));
    }

    #[test]
    fn test_negative_player_plays_on_own_towers() {
        let mut agent = quick_agent();
        let percepts = "1,-1,0/0,0,0/0,0,0";
        let mv = agent
            .play(percepts, Player::Negative, 2, None)
            .unwrap()
            .unwrap();
        let board = Board::from_percepts(percepts).unwrap();
        assert!(board.is_action_valid(mv));

        // The negative tower goes on top and keeps the last tower
        let after = board.apply_move(mv).unwrap();
        assert_eq!(after.score(), -1);
    }

    #[test]
    fn test_finished_board_gives_no_action() {
        let mut agent = quick_agent();
        let mv = agent
            .play("5,0,-1/0,0,0/-2,0,3", Player::Positive, 10, Some(30.0))
            .unwrap();
        assert_eq!(mv, None);
    }

    #[test]
    fn test_bad_percepts_are_errors() {
        let mut agent = quick_agent();
        assert!(agent.play("1,2/3", Player::Positive, 1, None).is_err());
        assert!(agent.initialize(Some(""), &[], None).is_err());
    }

    #[test]
    fn test_initialize_resets_memory() {
        let mut agent = quick_agent();
        agent.play(START_PERCEPTS, Player::Positive, 1, None).unwrap();
        assert!(!agent.search().memory().is_empty());
        assert!(agent.search().previous_grid().is_some());

        agent.initialize(None, &[Player::Negative], Some(60.0)).unwrap();
        assert!(agent.search().memory().is_empty());
        assert!(agent.search().previous_grid().is_none());
        assert!(agent.last_result().is_none());
        assert_eq!(agent.players(), &[Player::Negative]);
        assert_eq!(agent.time_credit(), Some(60.0));
    }

    #[test]
    fn test_budget_follows_time_config() {
        let agent = Agent::default();
        assert_eq!(agent.move_budget(None), None);
        let budget = agent.move_budget(Some(100.0)).unwrap();
        assert_eq!(budget, agent.config().time.move_budget(100.0));
    }
}
