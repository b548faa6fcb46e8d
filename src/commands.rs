use std::str::FromStr;

use miette::Diagnostic;
use once_cell::sync::Lazy;
use regex::Regex;

static COMMAND_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(?P<command>\S+)(\s+(?P<args>.*?))?\s*$").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Fish,
    Dismiss,
    Leave,
    Status,
    Collection,
    Shop,
    Buy(String),
    Help,
    Quit,
}

#[derive(Debug, thiserror::Error, Diagnostic, PartialEq, Eq)]
pub enum Error {
    #[error("no command given")]
    #[diagnostic(code(commands::empty))]
    Empty,

    #[error("unknown command {0:?}")]
    #[diagnostic(code(commands::unknown), help("type `help` for a list of commands"))]
    Unknown(String),

    #[error("`{0}` needs an item id, e.g. `buy basic-lure`")]
    #[diagnostic(code(commands::missing_argument))]
    MissingArgument(&'static str),
}

impl FromStr for Command {
    type Err = Error;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let Some(captures) = COMMAND_REGEX.captures(line) else {
            return Err(Error::Empty);
        };

        let command = captures["command"].to_lowercase();
        let args = captures
            .name("args")
            .map(|m| m.as_str())
            .filter(|args| !args.is_empty());

        match command.as_str() {
            "fish" | "cast" | "f" => Ok(Command::Fish),
            "dismiss" | "ok" => Ok(Command::Dismiss),
            "leave" | "cancel" => Ok(Command::Leave),
            "status" | "stats" => Ok(Command::Status),
            "collection" | "codex" => Ok(Command::Collection),
            "shop" => Ok(Command::Shop),
            "buy" => args
                .map(|item| Command::Buy(item.to_lowercase()))
                .ok_or(Error::MissingArgument("buy")),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" | "q" => Ok(Command::Quit),
            _ => Err(Error::Unknown(command)),
        }
    }
}
