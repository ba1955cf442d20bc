//! A line-based front end for [`Hangman`], standing in for a chat client.
//!
//! Each input line names a channel, a user and a command. Each reply is one
//! chat action: posting, editing or deleting a message, or a plain answer.

use std::{
    fmt,
    sync::atomic::{AtomicU64, Ordering},
};

use thisslime::TracingError;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{info, instrument, warn};

use crate::{
    hangman::{GameState, Hangman, HangmanError},
    persist::PersistError,
    store::ChannelLocks,
    utils::{ChannelId, MessageId},
};

mod command;
pub use command::{Command, Line, ParseLineError, HELP};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Reply {
    Post { id: MessageId, content: String },
    Edit { id: MessageId, content: String },
    Delete(MessageId),
    Say(String),
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Post { id, content } => write!(f, "post {id}:\n{content}"),
            Self::Edit { id, content } => write!(f, "edit {id}:\n{content}"),
            Self::Delete(id) => write!(f, "delete {id}"),
            Self::Say(text) => write!(f, "say: {text}"),
        }
    }
}

pub struct Console {
    hangman: Hangman,
    /// Held for a whole command, so a board is attached before anyone else sees the game.
    locks: ChannelLocks,
    next_post: AtomicU64,
}

impl Console {
    pub fn new(hangman: Hangman) -> Self {
        Self {
            hangman,
            locks: ChannelLocks::new(),
            next_post: AtomicU64::new(1),
        }
    }

    pub const fn hangman(&self) -> &Hangman {
        &self.hangman
    }

    fn next_post(&self) -> MessageId {
        MessageId::new(self.next_post.fetch_add(1, Ordering::Relaxed))
    }

    /// Posts `state` as a new message and records it as the game's board.
    /// Returns the post and the board it replaced.
    async fn post_board(
        &self,
        channel: ChannelId,
        state: &GameState,
    ) -> Result<(Reply, Option<MessageId>), HangmanError> {
        let id = self.next_post();
        let old = self.hangman.attach_post(channel, id).await?;

        let post = Reply::Post {
            id,
            content: self.hangman.render(state),
        };
        Ok((post, old))
    }

    /// Runs one parsed line. Only storage failures are returned as errors;
    /// everything else becomes a reply.
    #[instrument(skip_all, fields(channel = %line.channel, user = %line.user, command = ?line.command))]
    pub async fn dispatch(&self, line: Line) -> Result<Vec<Reply>, PersistError> {
        match self.run_command(line).await {
            Ok(replies) => Ok(replies),
            Err(HangmanError::Persist(err)) => Err(err),
            Err(err) => {
                err.trace();
                Ok(vec![Reply::Say(err.to_string())])
            }
        }
    }

    async fn run_command(&self, line: Line) -> Result<Vec<Reply>, HangmanError> {
        let Line {
            channel,
            user,
            is_admin,
            command,
        } = line;

        let _guard = self.locks.lock(channel).await;

        let replies = match command {
            Command::Start(phrase) => {
                let running = self.hangman.start(channel, &user, &phrase).await?;
                let (post, _) = self.post_board(channel, &running.into()).await?;
                vec![post]
            }
            Command::Guess(text) => {
                let outcome = self.hangman.apply_guess(channel, &user, &text).await?;
                let max_guesses = self.hangman.max_guesses();

                if outcome.is_over() {
                    let mut replies = Vec::with_capacity(2);
                    if let Some(id) = outcome.previous.post() {
                        replies.push(Reply::Edit {
                            id,
                            content: outcome.previous.render(max_guesses),
                        });
                    }
                    replies.push(Reply::Post {
                        id: self.next_post(),
                        content: self.hangman.render(&outcome.state),
                    });

                    self.hangman.conclude(channel).await?;
                    replies
                } else if let Some(id) = outcome.state.post() {
                    vec![Reply::Edit {
                        id,
                        content: self.hangman.render(&outcome.state),
                    }]
                } else {
                    let (post, _) = self.post_board(channel, &outcome.state).await?;
                    vec![post]
                }
            }
            Command::Remove => {
                let removed = self.hangman.remove(channel, user.id, is_admin).await?;

                let mut replies = Vec::with_capacity(2);
                if let Some(id) = removed.post() {
                    replies.push(Reply::Delete(id));
                }
                replies.push(Reply::Say("Current game was removed!".to_owned()));
                replies
            }
            Command::State => {
                let state = self.hangman.repost(channel, user.id).await?;
                let (post, old) = self.post_board(channel, &state).await?;

                let mut replies = vec![post];
                if let Some(old) = old {
                    replies.push(Reply::Delete(old));
                }
                replies
            }
            Command::CooldownGet(kind) => {
                if !is_admin {
                    return Err(HangmanError::AdminOnly(user.id));
                }

                let seconds = self.hangman.cooldown(kind, channel).await;
                vec![Reply::Say(format!(
                    "`{kind}` cooldown in this channel is {seconds} seconds"
                ))]
            }
            Command::CooldownEdit(kind, seconds) => {
                if !is_admin {
                    return Err(HangmanError::AdminOnly(user.id));
                }

                self.hangman.set_cooldown(kind, channel, seconds).await?;
                info!(%kind, seconds, "cooldown changed");
                vec![Reply::Say(format!(
                    "`{kind}` cooldown in this channel set to {seconds} seconds"
                ))]
            }
            Command::Help => vec![Reply::Say(HELP.to_owned())],
        };

        Ok(replies)
    }

    /// Parses and runs one raw input line.
    pub async fn handle_line(&self, text: &str) -> Result<Vec<Reply>, PersistError> {
        match text.parse::<Line>() {
            Ok(line) => self.dispatch(line).await,
            Err(err) => {
                warn!(%err, "unparseable line");
                Ok(vec![Reply::Say(err.to_string())])
            }
        }
    }

    /// Reads lines from `input` until it ends, writing every reply to `output`.
    pub async fn run<R, W>(&self, input: R, mut output: W) -> Result<(), crate::errors::Error>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = input.lines();

        while let Some(text) = lines.next_line().await? {
            if text.trim().is_empty() {
                continue;
            }

            for reply in self.handle_line(&text).await? {
                output.write_all(format!("{reply}\n").as_bytes()).await?;
            }
            output.flush().await?;
        }

        info!("input closed");
        Ok(())
    }
}
