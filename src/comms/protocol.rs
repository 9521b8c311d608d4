use std::io::{BufRead, Write};

use crate::{
    comms::protocol_parser::{Command, parse_line},
    prelude::*,
};

/// Serves the line protocol on stdin/stdout until `quit` or end of input.
/// Bad percepts and boards the agent cannot play end the session with an
/// error, bad options are only logged.
pub fn play(config: AgentConfig) -> miette::Result<()> {
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    serve(&mut Agent::new(config), stdin.lock(), stdout.lock())
}

pub fn serve<R: BufRead, W: Write>(
    agent: &mut Agent,
    input: R,
    mut output: W,
) -> miette::Result<()> {
    for line in input.lines() {
        let line = line.into_diagnostic().context("Reading protocol input")?;
        match parse_line(&line) {
            Command::Init {
                time_left,
                percepts,
            } => {
                agent
                    .initialize(percepts.as_deref(), &[], time_left)
                    .context("Processing init command")?;
            }
            Command::Play {
                player,
                step,
                time_left,
                percepts,
            } => {
                let action = agent
                    .play(&percepts, player, step, time_left)
                    .with_context(|| format!("Processing play command at step {step}"))?;
                cmd_action(&mut output, action)?;
            }
            Command::NewGame => {
                if let Err(e) = agent.initialize(None, &[], None) {
                    warn!("Error resetting agent: {e:?}");
                }
            }
            Command::SetOption { name, value } => {
                if let Err(e) = cmd_setoption(agent, &name, &value) {
                    warn!("Error setting option: {e:?}");
                }
            }
            Command::Quit => break,
            Command::Unknown(cmd) => {
                if !cmd.trim().is_empty() {
                    info!("Received unknown command: {cmd}");
                }
            }
        }
    }

    Ok(())
}

fn cmd_action<W: Write>(output: &mut W, action: Option<Move>) -> miette::Result<()> {
    match action {
        Some(mv) => writeln!(output, "action {mv}"),
        None => writeln!(output, "action none"),
    }
    .into_diagnostic()?;
    output.flush().into_diagnostic()
}

fn cmd_setoption(agent: &mut Agent, name: &str, value: &str) -> miette::Result<()> {
    let mut config = *agent.config();
    match name {
        "LogLevel" => {
            let level: Level = parse_option(name, value)?;
            set_log_level(level)?;
            info!("Set console log level to {level}");
            return Ok(());
        }
        "LogFile" => {
            let enable = value.to_lowercase() == "true";
            toggle_file_logging(enable)?;
            info!("Set file logging to {enable}");
            return Ok(());
        }
        "Depth" => {
            config.search.unbounded_depth = parse_option(name, value)?;
        }
        "MaxDepth" => {
            config.search.max_depth = parse_option(name, value)?;
        }
        "LiveWeight" => {
            config.eval.live_weight = parse_option(name, value)?;
        }
        "TimeDivisor" => {
            config.time.time_divisor = parse_option(name, value)?;
        }
        "Seed" => {
            config.search.seed = Some(parse_option(name, value)?);
        }
        _ => {
            info!("Unknown option: {name} = {value}");
            return Ok(());
        }
    }
    config.validate()?;
    agent.set_config(config);
    info!("Set {name} to {value}");
    Ok(())
}

fn parse_option<T: FromStr>(name: &str, value: &str) -> miette::Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| miette::miette!("Invalid value '{value}' for option {name}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(agent: &mut Agent, script: &str) -> Vec<String> {
        let mut output = Vec::new();
        serve(agent, script.as_bytes(), &mut output).unwrap();
        String::from_utf8(output)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    fn quick_agent() -> Agent {
        let mut config = AgentConfig::default();
        config.search = SearchConfig::fixed_depth(1).with_seed(2);
        Agent::new(config)
    }

    #[test]
    fn test_session_replies_with_actions() {
        let mut agent = quick_agent();
        let script = format!(
            "init none {START_PERCEPTS}\nplay 1 1 none {START_PERCEPTS}\nplay 1 3 none 5,0,-1/0,0,0/-2,0,3\nquit\nplay 1 1 none {START_PERCEPTS}\n"
        );
        let replies = run(&mut agent, &script);
        assert_eq!(replies.len(), 2, "Nothing is read after quit: {replies:?}");

        let mv: Move = replies[0]
            .strip_prefix("action ")
            .unwrap()
            .parse()
            .unwrap();
        assert!(Board::new().is_action_valid(mv));
        assert_eq!(replies[1], "action none");
    }

    #[test]
    fn test_malformed_percepts_end_the_session() {
        let mut agent = quick_agent();
        let mut output: Vec<u8> = Vec::new();
        let script = format!("hello\nplay 1 1 none 1,2/3\nplay 1 1 none {START_PERCEPTS}\n");
        let err = serve(&mut agent, script.as_bytes(), &mut output).unwrap_err();
        assert!(err.to_string().contains("step 1"), "{err:?}");
        assert!(output.is_empty(), "No reply after the bad board");

        let result = serve(&mut agent, "init none 1,,2\n".as_bytes(), &mut Vec::<u8>::new());
        assert!(result.is_err(), "Bad init percepts are fatal too");
    }

    #[test]
    fn test_bad_log_level_is_rejected() {
        let mut agent = quick_agent();
        assert!(cmd_setoption(&mut agent, "LogLevel", "loud").is_err());
        assert_eq!(*agent.config(), *quick_agent().config());
    }

    #[test]
    fn test_setoption_updates_config() {
        let mut agent = quick_agent();
        run(
            &mut agent,
            "setoption name Depth value 2\nsetoption name LiveWeight value 0.5\nsetoption name Depth value lots\n",
        );
        assert_eq!(agent.config().search.unbounded_depth, 2);
        assert_eq!(agent.config().eval.live_weight, 0.5);
    }
}
