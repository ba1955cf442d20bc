use std::{str::FromStr, sync::OnceLock};

use regex::Regex;
use tracing::{instrument, trace};

use crate::{
    cooldowns::{CooldownKind, ParseKindError},
    hangman::Player,
    utils::{ChannelId, UserId},
};

/// What a console line asks for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Start(String),
    Guess(String),
    Remove,
    State,
    CooldownGet(CooldownKind),
    CooldownEdit(CooldownKind, u32),
    Help,
}

/// One parsed console line: `<channel> <[@]user> <name> <!command> [argument]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Line {
    pub channel: ChannelId,
    pub user: Player,
    /// The user id was written with a leading `@`.
    pub is_admin: bool,
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseLineError {
    #[error("expected `<channel> <[@]user> <name> <!command> [argument]`, got '{0}'")]
    NoMatch(String),

    #[error("'{0}' is not a valid id")]
    InvalidId(String),

    #[error("unknown command '{0}'. try `!help`")]
    UnknownCommand(String),

    #[error("`{0}` needs an argument")]
    MissingArgument(&'static str),

    #[error(transparent)]
    InvalidKind(#[from] ParseKindError),

    #[error("'{0}' is not a number of seconds")]
    InvalidSeconds(String),
}

fn line_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(r"^\s*(\d+)\s+(@?)(\d+)\s+(\S+)\s+(!\S+)(?:\s+(.*?))?\s*$")
            .expect("hard-coded regex should be valid")
    })
}

fn parse_id<T: FromStr>(text: &str) -> Result<T, ParseLineError> {
    text.parse()
        .map_err(|_| ParseLineError::InvalidId(text.to_owned()))
}

impl Command {
    fn parse(name: &str, argument: Option<&str>) -> Result<Self, ParseLineError> {
        let command = match name {
            "!s" | "!start" => Self::Start(argument.unwrap_or_default().to_owned()),
            "!g" | "!guess" => Self::Guess(argument.unwrap_or_default().to_owned()),
            "!rm" | "!remove" => Self::Remove,
            "!state" => Self::State,
            "!h" | "!help" => Self::Help,
            "!cd" => {
                let kind = argument.ok_or(ParseLineError::MissingArgument("!cd"))?;
                Self::CooldownGet(kind.parse()?)
            }
            "!cd-edit" => {
                let (kind, seconds) = argument
                    .and_then(|arg| arg.split_once(char::is_whitespace))
                    .ok_or(ParseLineError::MissingArgument("!cd-edit"))?;
                let seconds = seconds.trim();
                let seconds = seconds
                    .parse()
                    .map_err(|_| ParseLineError::InvalidSeconds(seconds.to_owned()))?;

                Self::CooldownEdit(kind.parse()?, seconds)
            }
            _ => return Err(ParseLineError::UnknownCommand(name.to_owned())),
        };

        Ok(command)
    }
}

impl FromStr for Line {
    type Err = ParseLineError;

    #[instrument(name = "parse_line")]
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let caps = line_regex()
            .captures(text)
            .ok_or_else(|| ParseLineError::NoMatch(text.to_owned()))?;
        trace!(?caps);

        let channel: ChannelId = parse_id(&caps[1])?;
        let is_admin = !caps[2].is_empty();
        let user: UserId = parse_id(&caps[3])?;
        let name = &caps[4];
        let argument = caps.get(6).map(|mat| mat.as_str()).filter(|arg| !arg.is_empty());

        let command = Command::parse(&caps[5].to_lowercase(), argument)?;

        Ok(Self {
            channel,
            user: Player::with_default_mention(user, name),
            is_admin,
            command,
        })
    }
}

pub const HELP: &str = "\
commands: `<channel> <[@]user> <name> <!command> [argument]`, `@` marks an admin
`!s ||<phrase>||` starts a game
`!g <letter or phrase>` guesses
`!rm` removes the game (author or admin)
`!state` posts the game again
`!cd <kind>` shows a cooldown, `!cd-edit <kind> <seconds>` changes it (admin)
kinds: `s|start`, `g|guess`, `rm|remove`, `state`";
