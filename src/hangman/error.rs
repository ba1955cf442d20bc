use crate::{
    cooldowns::CooldownKind,
    persist::PersistError,
    utils::{ChannelId, FormatDuration, UserId},
};

use super::PhraseError;

/// Everything a game command can fail with.
///
/// All variants except `Persist` are meant to be shown to the user as-is.
#[derive(Debug, thiserror::Error, thisslime::TracingError)]
pub enum HangmanError {
    #[error("{0}")]
    #[event(level = INFO)]
    InvalidPhrase(#[from] PhraseError),

    #[error("no game running in this channel. start one with `!s ||<phrase>||` first")]
    #[event(level = INFO)]
    NoActiveGame(ChannelId),

    #[error("a game is still running!")]
    #[event(level = INFO)]
    GameRunning(ChannelId),

    #[error("you're not allowed to remove the game (not author of game or admin of server)")]
    #[event(level = WARN)]
    NotAuthorized(UserId),

    #[error("only admins can view or change cooldowns")]
    #[event(level = WARN)]
    AdminOnly(UserId),

    #[error("authors are only allowed to remove the current game!")]
    #[event(level = INFO)]
    AuthorGuess(UserId),

    #[error("guess a letter or the whole phrase")]
    #[event(level = INFO)]
    EmptyGuess(UserId),

    #[error(transparent)]
    Cooldown(#[from] CooldownActiveError),

    #[error(transparent)]
    Persist(#[from] PersistError),
}

#[derive(Debug, Clone, thiserror::Error, thisslime::TracingError)]
#[error("{} still has a cooldown of {}", .user.mention(), .remaining.format_largest())]
#[event(level = INFO)]
pub struct CooldownActiveError {
    #[field(print = Display)]
    kind: CooldownKind,

    #[field(print = Display)]
    user: UserId,

    #[field(print = Display)]
    remaining: chrono::Duration,
}

impl CooldownActiveError {
    pub const fn new(kind: CooldownKind, user: UserId, remaining: chrono::Duration) -> Self {
        Self {
            kind,
            user,
            remaining,
        }
    }

    pub const fn kind(&self) -> CooldownKind {
        self.kind
    }

    pub const fn remaining(&self) -> chrono::Duration {
        self.remaining
    }
}
