//! Line-oriented command parsing.
//!
//! Player input is a verb plus an argument tail. Parsing never touches game
//! state; an unrecognized line becomes a [`CommandError`] the session reports
//! back without consuming a turn.

use thiserror::Error;

use crate::room::Direction;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Say something.")]
    Empty,

    #[error("Unrecognized command '{0}'. Try 'help'.")]
    Unknown(String),

    #[error("'{0}' needs a target. ({0} <what>)")]
    MissingArgument(&'static str),
}

/// A parsed player command. Whether it is legal right now (mid-combat,
/// at a shrine, ...) is the session's call, not the parser's.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    // Movement
    Go(Direction),
    Back,

    // Room interaction
    Look,
    Search,
    Disarm,
    Take,
    Drop(String),
    Talk,
    Answer(String),
    Pray,
    Rest,

    // Items and gear
    Use(String),
    Equip(String),
    Unequip(String),

    // Combat
    Attack,
    Skill(String),
    Heal,
    Run,

    // Informational; never consume a turn.
    Status,
    Inventory,
    Quests,
    Skills,
    Help,

    // Meta
    Save(Option<String>),
    Quit,
}

impl Command {
    /// Parse one input line into a command.
    pub fn parse(line: &str) -> Result<Command, CommandError> {
        let line = line.trim();
        if line.is_empty() {
            return Err(CommandError::Empty);
        }
        let (verb, tail) = match line.split_once(char::is_whitespace) {
            Some((verb, tail)) => (verb, tail.trim()),
            None => (line, ""),
        };
        let verb = verb.to_ascii_lowercase();

        // A bare direction is shorthand for `go <direction>`.
        if tail.is_empty() {
            if let Some(direction) = Direction::parse(&verb) {
                return Ok(Command::Go(direction));
            }
        }

        match verb.as_str() {
            "go" | "move" | "walk" => match Direction::parse(tail) {
                Some(direction) => Ok(Command::Go(direction)),
                None => Err(CommandError::MissingArgument("go")),
            },
            "back" | "return" => Ok(Command::Back),

            "look" | "l" => Ok(Command::Look),
            "search" => Ok(Command::Search),
            "disarm" => Ok(Command::Disarm),
            "take" | "get" | "pickup" | "grab" => Ok(Command::Take),
            "drop" => require_tail("drop", tail).map(Command::Drop),
            "talk" | "speak" => Ok(Command::Talk),
            "answer" => require_tail("answer", tail).map(Command::Answer),
            "pray" | "touch" => Ok(Command::Pray),
            "rest" | "sleep" => Ok(Command::Rest),

            "use" | "drink" | "eat" => require_tail("use", tail).map(Command::Use),
            "equip" | "wield" | "wear" => require_tail("equip", tail).map(Command::Equip),
            "unequip" | "remove" | "doff" => require_tail("unequip", tail).map(Command::Unequip),

            "attack" | "fight" | "hit" | "a" => Ok(Command::Attack),
            "skill" | "cast" => require_tail("skill", tail).map(Command::Skill),
            "heal" => Ok(Command::Heal),
            "run" | "flee" => Ok(Command::Run),

            "status" | "stats" => Ok(Command::Status),
            "inventory" | "inv" | "i" => Ok(Command::Inventory),
            "quests" | "journal" => Ok(Command::Quests),
            "skills" => Ok(Command::Skills),
            "help" | "?" => Ok(Command::Help),

            "save" => Ok(Command::Save(
                (!tail.is_empty()).then(|| tail.to_string()),
            )),
            "quit" | "exit" => Ok(Command::Quit),

            _ => Err(CommandError::Unknown(verb)),
        }
    }
}

fn require_tail(verb: &'static str, tail: &str) -> Result<String, CommandError> {
    if tail.is_empty() {
        Err(CommandError::MissingArgument(verb))
    } else {
        Ok(tail.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbs_parse_with_tails() {
        assert_eq!(Command::parse("go north"), Ok(Command::Go(Direction::North)));
        assert_eq!(
            Command::parse("use Healing Potion"),
            Ok(Command::Use("Healing Potion".into()))
        );
        assert_eq!(
            Command::parse("equip iron sword"),
            Ok(Command::Equip("iron sword".into()))
        );
        assert_eq!(Command::parse("answer echo"), Ok(Command::Answer("echo".into())));
    }

    #[test]
    fn bare_directions_are_movement() {
        assert_eq!(Command::parse("n"), Ok(Command::Go(Direction::North)));
        assert_eq!(Command::parse("West"), Ok(Command::Go(Direction::West)));
    }

    #[test]
    fn case_and_whitespace_are_forgiven() {
        assert_eq!(Command::parse("  ATTACK  "), Ok(Command::Attack));
        assert_eq!(Command::parse("Flee"), Ok(Command::Run));
    }

    #[test]
    fn missing_tails_are_reported() {
        assert_eq!(
            Command::parse("use"),
            Err(CommandError::MissingArgument("use"))
        );
        assert_eq!(
            Command::parse("go nowhere"),
            Err(CommandError::MissingArgument("go"))
        );
    }

    #[test]
    fn unknown_and_empty_lines_fail() {
        assert_eq!(Command::parse(""), Err(CommandError::Empty));
        assert_eq!(
            Command::parse("dance"),
            Err(CommandError::Unknown("dance".into()))
        );
    }

    #[test]
    fn save_takes_an_optional_path() {
        assert_eq!(Command::parse("save"), Ok(Command::Save(None)));
        assert_eq!(
            Command::parse("save run.json"),
            Ok(Command::Save(Some("run.json".into())))
        );
    }
}
