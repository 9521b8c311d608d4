//! Human vs agent games in the terminal, and agent vs agent self-play.

use std::io::{BufRead, Write};
use std::time::{Duration, Instant};

use clap::Parser;

use crate::prelude::*;

/// What the loop does after a command
#[derive(Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

#[derive(Debug)]
pub struct Game {
    start: Board,
    board: Board,
    /// Boards before each move, for undo
    history: Vec<Board>,
    to_move: Player,
    human: Player,
    agent: Agent,
    move_time: Option<Duration>,
}

impl Game {
    /// A `move_time` too large for a [`Duration`], such as `inf`, means no
    /// limit, negative ones mean no time at all.
    pub fn new(start: Board, human: Player, agent: Agent, move_time: Option<f64>) -> Self {
        Self {
            board: start.clone(),
            start,
            history: Vec::new(),
            to_move: Player::Positive,
            human,
            agent,
            move_time: move_time.and_then(|secs| Duration::try_from_secs_f64(secs.max(0.0)).ok()),
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn to_move(&self) -> Player {
        self.to_move
    }

    /// Lets the agent move while it is its turn
    pub fn agent_turn<W: Write>(&mut self, out: &mut W) -> miette::Result<()> {
        while self.to_move != self.human && !self.board.is_finished() {
            let result = self.agent.think(&self.board, self.to_move, self.move_time)?;
            let Some(mv) = result.best_move else {
                miette::bail!("Agent found no move on an unfinished board");
            };
            writeln!(
                out,
                "Agent plays {mv} (score {:.2}, depth {}, {:?})",
                result.score, result.depth, result.time_taken
            )
            .into_diagnostic()?;
            self.push_move(mv)?;
        }
        Ok(())
    }

    fn push_move(&mut self, mv: Move) -> miette::Result<()> {
        let next = self.board.apply_move(mv)?;
        self.history.push(std::mem::replace(&mut self.board, next));
        self.to_move = self.to_move.flip();
        Ok(())
    }

    pub fn handle<W: Write>(&mut self, cmd: GameSubcommand, out: &mut W) -> miette::Result<Flow> {
        match cmd {
            GameSubcommand::Move {
                from_row,
                from_col,
                to_row,
                to_col,
            } => {
                let mv = Move::new(from_row, from_col, to_row, to_col);
                if self.board.is_finished() {
                    writeln!(out, "Game is over").into_diagnostic()?;
                } else if !self.board.is_action_valid(mv) {
                    writeln!(out, "Invalid move {mv}").into_diagnostic()?;
                } else {
                    self.push_move(mv)?;
                    self.agent_turn(out)?;
                    self.print(out)?;
                }
            }
            GameSubcommand::Print => self.print(out)?,
            GameSubcommand::Undo => {
                // Back to the human's last turn
                let mut undone = 0;
                while let Some(previous) = self.history.pop() {
                    self.board = previous;
                    self.to_move = self.to_move.flip();
                    undone += 1;
                    if self.to_move == self.human {
                        break;
                    }
                }
                if undone == 0 {
                    writeln!(out, "Nothing to undo").into_diagnostic()?;
                }
                self.print(out)?;
            }
            GameSubcommand::Hint => {
                if self.board.is_finished() {
                    writeln!(out, "Game is over").into_diagnostic()?;
                } else {
                    let result = self.agent.think(&self.board, self.to_move, self.move_time)?;
                    match result.best_move {
                        Some(mv) => writeln!(out, "Hint: {mv} (score {:.2})", result.score),
                        None => writeln!(out, "No hint within the time budget"),
                    }
                    .into_diagnostic()?;
                }
            }
            GameSubcommand::Evaluate => {
                let eval = self.agent.evaluate(&self.board, self.human);
                writeln!(
                    out,
                    "Evaluation for {}: {eval:.2}, score: {}",
                    self.human,
                    self.board.score()
                )
                .into_diagnostic()?;
            }
            GameSubcommand::Actions => {
                let actions: Vec<String> = self
                    .board
                    .actions()
                    .iter()
                    .map(|mv| format!("({mv})"))
                    .collect();
                writeln!(out, "{} actions: {}", actions.len(), actions.join(" "))
                    .into_diagnostic()?;
            }
            GameSubcommand::Depth { depth } => {
                let mut config = *self.agent.config();
                config.search.unbounded_depth = depth;
                config.search.max_depth = config.search.max_depth.max(depth);
                config.validate()?;
                self.agent.set_config(config);
                writeln!(out, "Untimed search depth set to {depth}").into_diagnostic()?;
            }
            GameSubcommand::Clear => utils::clear_screen()?,
            GameSubcommand::Restart => {
                self.board = self.start.clone();
                self.history.clear();
                self.to_move = Player::Positive;
                self.agent.initialize(None, &[self.human.flip()], None)?;
                self.agent_turn(out)?;
                self.print(out)?;
            }
            GameSubcommand::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    fn print<W: Write>(&self, out: &mut W) -> miette::Result<()> {
        write!(out, "{}", self.board).into_diagnostic()?;
        if self.board.is_finished() {
            let score = self.board.score() * self.human.sign() as i32;
            let verdict = match score {
                s if s > 0 => "You win",
                s if s < 0 => "Agent wins",
                _ => "Draw",
            };
            writeln!(out, "Game over: {verdict} ({score})").into_diagnostic()?;
        } else {
            writeln!(out, "To move: {}", self.to_move).into_diagnostic()?;
        }
        Ok(())
    }

    /// Reads commands until `quit` or end of input
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut out: W) -> miette::Result<()> {
        let percepts = self.start.to_percepts();
        self.agent
            .initialize(Some(percepts.as_str()), &[self.human.flip()], None)?;
        self.agent_turn(&mut out)?;
        self.print(&mut out)?;

        for line in input.lines() {
            let line = line.into_diagnostic()?;
            let words = match shell_words::split(&line) {
                Ok(words) if words.is_empty() => continue,
                Ok(words) => words,
                Err(e) => {
                    writeln!(out, "Could not split '{line}': {e}").into_diagnostic()?;
                    continue;
                }
            };
            match GameCommand::try_parse_from(words) {
                Ok(command) => match self.handle(command.cmd, &mut out) {
                    Ok(Flow::Quit) => break,
                    Ok(Flow::Continue) => {}
                    Err(e) => writeln!(out, "Error: {e:?}").into_diagnostic()?,
                },
                Err(e) => writeln!(out, "{e}").into_diagnostic()?,
            }
        }
        Ok(())
    }
}

/// Interactive game on the terminal
pub fn game_loop(
    config: AgentConfig,
    percepts: &str,
    human: Player,
    move_time: Option<f64>,
) -> miette::Result<()> {
    let start = Board::from_percepts(percepts).context("Starting position")?;
    let mut game = Game::new(start, human, Agent::new(config), move_time);
    let stdin = std::io::stdin();
    game.run(stdin.lock(), std::io::stdout())
}

#[derive(Debug, Clone)]
pub struct SelfPlayResult {
    pub board: Board,
    pub steps: u32,
    /// Positive when the first player won
    pub score: i32,
    /// Sides that ran out of time credit
    pub flagged: Vec<Player>,
}

/// Two agents with the same config play each other through percepts, the way
/// a referee drives them. Each side has its own time credit.
pub fn self_play(
    config: AgentConfig,
    percepts: &str,
    time_credit: Option<f64>,
    max_steps: Option<u32>,
) -> miette::Result<SelfPlayResult> {
    let mut board = Board::from_percepts(percepts).context("Starting position")?;
    let mut agents = [Agent::new(config), Agent::new(config)];
    let mut credits = [time_credit, time_credit];
    let players = [Player::Positive, Player::Negative];
    for (agent, player) in agents.iter_mut().zip(players) {
        agent.initialize(Some(percepts), &[player], time_credit)?;
    }

    let mut flagged = Vec::new();
    let mut step = 1;
    while !board.is_finished() && max_steps.is_none_or(|max| step <= max) {
        let side = ((step - 1) % 2) as usize;
        let player = players[side];
        let started = Instant::now();
        let action = agents[side].play(&board.to_percepts(), player, step, credits[side])?;
        if let Some(credit) = credits[side].as_mut() {
            *credit -= started.elapsed().as_secs_f64();
            if *credit < 0.0 && !flagged.contains(&player) {
                warn!("Player {player} ran out of time at step {step}");
                flagged.push(player);
            }
        }

        let Some(mv) = action else {
            miette::bail!("Player {player} returned no action at step {step}");
        };
        board = board.apply_move(mv).with_context(|| format!("Step {step}"))?;
        debug!("Step {step}: {player} played {mv}");
        step += 1;
    }

    let score = board.score();
    info!("Self-play over after {} steps, score {score}", step - 1);
    Ok(SelfPlayResult {
        board,
        steps: step - 1,
        score,
        flagged,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quick_config() -> AgentConfig {
        let mut config = AgentConfig::default();
        config.search = SearchConfig::fixed_depth(1).with_seed(4);
        config
    }

    #[test]
    fn test_self_play_reaches_the_end() {
        let percepts = "1,-1,1/-1,1,-1/0,0,0";
        let result = self_play(quick_config(), percepts, None, None).unwrap();
        assert!(result.board.is_finished());
        assert_eq!(result.score, result.board.score());
        assert!(result.steps >= 1);
        assert!(result.flagged.is_empty());
    }

    #[test]
    fn test_self_play_respects_step_limit() {
        let result = self_play(quick_config(), START_PERCEPTS, Some(600.0), Some(4)).unwrap();
        assert_eq!(result.steps, 4);
        assert_eq!(result.board.towers().count(), 48 - 4);
    }

    #[test]
    fn test_scripted_game_session() {
        let start = Board::new();
        let mut game = Game::new(start.clone(), Player::Positive, Agent::new(quick_config()), None);
        let script = "print\nmove 0 0 0 1\nm 3 1 2 1\nundo\nactions\nquit\nmove 0 2 0 3\n";
        let mut out = Vec::new();
        game.run(script.as_bytes(), &mut out).unwrap();
        let out = String::from_utf8(out).unwrap();

        assert!(out.contains("Invalid move 0 0 0 1"), "{out}");
        assert!(out.contains("Agent plays"), "{out}");
        // Undo went back to the human's turn on the start position
        assert_eq!(game.board(), &start);
        assert_eq!(game.to_move(), Player::Positive);
    }

    #[test]
    fn test_infinite_move_time_is_untimed() {
        let game = Game::new(Board::new(), Player::Positive, Agent::new(quick_config()), Some(f64::INFINITY));
        assert_eq!(game.move_time, None);
        let game = Game::new(Board::new(), Player::Positive, Agent::new(quick_config()), Some(-1.0));
        assert_eq!(game.move_time, Some(Duration::ZERO));
        let game = Game::new(Board::new(), Player::Positive, Agent::new(quick_config()), Some(1.5));
        assert_eq!(game.move_time, Some(Duration::from_millis(1500)));
    }

    #[test]
    fn test_agent_opens_when_human_plays_second() {
        let start = Board::new();
        let mut game = Game::new(start, Player::Negative, Agent::new(quick_config()), None);
        let mut out = Vec::new();
        game.run("quit\n".as_bytes(), &mut out).unwrap();
        assert_eq!(game.to_move(), Player::Negative);
        assert_eq!(game.board().towers().count(), 47);
    }
}
