use avalanche::comms::protocol;
use avalanche::game::{game_loop, self_play};
use avalanche::prelude::*;
use clap::Parser;
use tracing::{Level, span};

fn load_config(cli: &Cli) -> miette::Result<AgentConfig> {
    match &cli.config {
        Some(path) => {
            let config = AgentConfig::load_from_file(path)?;
            info!("Loaded config from {}", path.display());
            Ok(config)
        }
        None => Ok(AgentConfig::default()),
    }
}

fn main() -> miette::Result<()> {
    init();

    let span = span!(Level::DEBUG, "main");
    let _guard = span.enter();

    let cli = Cli::parse();
    let mut config = load_config(&cli)?;

    match cli.command {
        Some(Commands::Play {
            percepts,
            second,
            time,
        }) => {
            let human = if second {
                Player::Negative
            } else {
                Player::Positive
            };
            trace!("Starting game as {human} with percepts {percepts}, time {time:?}");
            game_loop(config, &percepts, human, time)?;
        }
        Some(Commands::Selfplay {
            percepts,
            time,
            max_steps,
        }) => {
            trace!("Self-play from {percepts}, time {time:?}, max steps {max_steps:?}");
            let result = self_play(config, &percepts, time, max_steps)?;
            println!("{}", result.board);
            println!(
                "Final score after {} steps: {} ({})",
                result.steps,
                result.score,
                match result.score {
                    s if s > 0 => "player 1 wins",
                    s if s < 0 => "player -1 wins",
                    _ => "draw",
                }
            );
            for player in result.flagged {
                println!("Player {player} exceeded its time credit");
            }
        }
        Some(Commands::Choose {
            percepts,
            player,
            time,
            depth,
        }) => {
            if let Some(depth) = depth {
                config.search.unbounded_depth = depth;
                config.search.max_depth = config.search.max_depth.max(depth);
                config.validate()?;
            }
            let player: Player = player.parse()?;
            let mut agent = Agent::new(config);
            agent.initialize(Some(percepts.as_str()), &[player], time)?;
            match agent.play(&percepts, player, 1, time)? {
                Some(mv) => println!("action {mv}"),
                None => println!("action none"),
            }
        }
        Some(Commands::Headless) => {
            trace!("Running headless");
            protocol::play(config)?;
        }
        None => {
            println!("Starting default game");
            game_loop(config, START_PERCEPTS, Player::Positive, None)?;
        }
    }
    Ok(())
}
