use tracing::trace;

use crate::board::Player;

#[derive(Debug, PartialEq)]
pub enum Command {
    /// "init" cmd, start of a game
    Init {
        time_left: Option<f64>,
        percepts: Option<String>,
    },
    /// "play" cmd, asks for an action
    Play {
        player: Player,
        step: u32,
        time_left: Option<f64>,
        percepts: String,
    },
    /// "newgame" cmd, forget the previous game
    NewGame,
    /// "setoption" cmd, to configure agent options
    SetOption { name: String, value: String },
    /// "quit" cmd, to exit
    Quit,
    /// unknown, unsupported or malformed cmd
    Unknown(String),
}

pub fn parse_line(line: &str) -> Command {
    trace!("Protocol: {line}");
    let parts: Vec<&str> = line.trim().split_ascii_whitespace().collect();
    if parts.is_empty() {
        return Command::Unknown(line.to_string());
    }

    let parsed = match parts[0] {
        "init" => parse_init(&parts[1..]),
        "play" => parse_play(&parts[1..]),
        "newgame" => Some(Command::NewGame),
        "setoption" => Some(parse_setoption(&parts[1..])),
        "quit" => Some(Command::Quit),
        _ => None,
    };
    parsed.unwrap_or_else(|| Command::Unknown(line.to_string()))
}

/// `none` or `inf` for an untimed game, else seconds
fn parse_time(part: &str) -> Option<Option<f64>> {
    match part {
        "none" | "inf" | "+inf" => Some(None),
        secs => secs.parse::<f64>().ok().filter(|t| t.is_finite()).map(Some),
    }
}

// init [time_left] [percepts]
fn parse_init(parts: &[&str]) -> Option<Command> {
    match parts {
        [] => Some(Command::Init {
            time_left: None,
            percepts: None,
        }),
        [time] => match parse_time(time) {
            Some(time_left) => Some(Command::Init {
                time_left,
                percepts: None,
            }),
            None => Some(Command::Init {
                time_left: None,
                percepts: Some(time.to_string()),
            }),
        },
        [time, percepts] => Some(Command::Init {
            time_left: parse_time(time)?,
            percepts: Some(percepts.to_string()),
        }),
        _ => None,
    }
}

// play <player> <step> <time_left> <percepts>
fn parse_play(parts: &[&str]) -> Option<Command> {
    let [player, step, time, percepts] = parts else {
        return None;
    };
    Some(Command::Play {
        player: player.parse().ok()?,
        step: step.parse().ok()?,
        time_left: parse_time(time)?,
        percepts: percepts.to_string(),
    })
}

fn parse_setoption(parts: &[&str]) -> Command {
    // setoption name <name> [value <value>]
    let mut name = String::new();
    let mut value = String::new();
    let mut i = 0;
    while i < parts.len() {
        match parts[i] {
            "name" => {
                i += 1;
                while i < parts.len() && parts[i] != "value" {
                    if !name.is_empty() {
                        name.push(' ');
                    }
                    name.push_str(parts[i]);
                    i += 1;
                }
            }
            "value" => {
                i += 1;
                while i < parts.len() {
                    if !value.is_empty() {
                        value.push(' ');
                    }
                    value.push_str(parts[i]);
                    i += 1;
                }
            }
            _ => i += 1,
        }
    }
    Command::SetOption { name, value }
}
