use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::Player;
use crate::utils::MessageId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PhraseError {
    #[error("the phrase can't be empty")]
    Empty,

    #[error("the phrase has to be at least {min} characters long")]
    TooShort { min: usize },
}

/// The game in one channel.
///
/// Stored externally tagged, i.e. `{"Running": {...}}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameState {
    Running(Running),
    Solved(Solved),
    Failed(Failed),
}

impl GameState {
    /// Applies one guess. `Solved` and `Failed` ignore guesses.
    pub fn guess(self, input: &str, guesser: &Player, max_guesses: u32) -> Self {
        match self {
            Self::Running(running) => running.guess(input, guesser, max_guesses),
            terminal @ (Self::Solved(_) | Self::Failed(_)) => terminal,
        }
    }

    pub fn phrase(&self) -> &str {
        match self {
            Self::Running(running) => &running.phrase,
            Self::Solved(solved) => &solved.phrase,
            Self::Failed(failed) => &failed.phrase,
        }
    }

    pub const fn post(&self) -> Option<MessageId> {
        match self {
            Self::Running(running) => running.post,
            Self::Solved(solved) => solved.post,
            Self::Failed(failed) => failed.post,
        }
    }

    pub fn set_post(&mut self, post: MessageId) {
        match self {
            Self::Running(running) => running.post = Some(post),
            Self::Solved(solved) => solved.post = Some(post),
            Self::Failed(failed) => failed.post = Some(post),
        }
    }

    pub const fn is_running(&self) -> bool {
        matches!(self, Self::Running(_))
    }

    pub const fn is_over(&self) -> bool {
        !self.is_running()
    }

    pub const fn as_running(&self) -> Option<&Running> {
        match self {
            Self::Running(running) => Some(running),
            _ => None,
        }
    }
}

impl From<Running> for GameState {
    fn from(value: Running) -> Self {
        Self::Running(value)
    }
}

impl From<Solved> for GameState {
    fn from(value: Solved) -> Self {
        Self::Solved(value)
    }
}

impl From<Failed> for GameState {
    fn from(value: Failed) -> Self {
        Self::Failed(value)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RunningRecord")]
pub struct Running {
    phrase: String,
    author: Player,
    unveiled: Vec<bool>,
    wrong_guesses: u32,
    guessed: BTreeSet<char>,
    #[serde(default)]
    post: Option<MessageId>,
}

impl Running {
    /// Starts a game. Characters that aren't letters are shown from the start.
    pub fn new(phrase: impl Into<String>, author: Player) -> Result<Self, PhraseError> {
        let phrase = phrase.into();
        if phrase.is_empty() {
            return Err(PhraseError::Empty);
        }

        let unveiled = phrase.chars().map(|ch| !ch.is_alphabetic()).collect();

        Ok(Self {
            phrase,
            author,
            unveiled,
            wrong_guesses: 0,
            guessed: BTreeSet::new(),
            post: None,
        })
    }

    pub fn phrase(&self) -> &str {
        &self.phrase
    }

    pub const fn author(&self) -> &Player {
        &self.author
    }

    pub fn unveiled(&self) -> &[bool] {
        &self.unveiled
    }

    pub const fn wrong_guesses(&self) -> u32 {
        self.wrong_guesses
    }

    pub const fn guessed(&self) -> &BTreeSet<char> {
        &self.guessed
    }

    pub const fn post(&self) -> Option<MessageId> {
        self.post
    }

    pub fn set_post(&mut self, post: MessageId) {
        self.post = Some(post);
    }

    pub fn is_unveiled(&self) -> bool {
        self.unveiled.iter().all(|shown| *shown)
    }

    /// Whether anyone has guessed anything yet.
    pub fn guessing_started(&self) -> bool {
        self.wrong_guesses > 0 || !self.guessed.is_empty()
    }

    /// Shows the whole phrase.
    pub fn unveil(&mut self) {
        self.unveiled.fill(true);
    }

    /// Shows every letter matching `letter`, ignoring case. Returns whether any matched.
    fn reveal(&mut self, letter: char) -> bool {
        let mut hit = false;

        for (ch, shown) in self.phrase.chars().zip(self.unveiled.iter_mut()) {
            if ch.is_alphabetic() && ch.to_lowercase().eq(letter.to_lowercase()) {
                *shown = true;
                hit = true;
            }
        }

        hit
    }

    /// Applies one guess to this board and returns what the game became.
    ///
    /// The board is left as the guess made it, so a finished game can still be
    /// shown with its last guess.
    pub fn play(&mut self, input: &str, guesser: &Player, max_guesses: u32) -> GameState {
        let input = input.to_lowercase();
        let mut chars = input.chars();

        match (chars.next(), chars.next()) {
            (Some(letter), None) => {
                // a letter that was already tried always costs a guess, hit or not
                if !self.guessed.insert(letter) || !self.reveal(letter) {
                    self.wrong_guesses = self.wrong_guesses.saturating_add(1);
                }
            }
            _ if input == self.phrase.to_lowercase() => {
                return Solved::new(self.phrase.clone(), guesser.clone(), self.post).into();
            }
            _ => self.wrong_guesses = self.wrong_guesses.saturating_add(1),
        }

        if self.wrong_guesses >= max_guesses {
            Failed::new(self.phrase.clone(), self.post).into()
        } else if self.is_unveiled() {
            Solved::new(self.phrase.clone(), guesser.clone(), self.post).into()
        } else {
            self.clone().into()
        }
    }

    fn guess(mut self, input: &str, guesser: &Player, max_guesses: u32) -> GameState {
        self.play(input, guesser, max_guesses)
    }
}

#[derive(Deserialize)]
struct RunningRecord {
    phrase: String,
    author: Player,
    unveiled: Vec<bool>,
    wrong_guesses: u32,
    guessed: BTreeSet<char>,
    #[serde(default)]
    post: Option<MessageId>,
}

impl TryFrom<RunningRecord> for Running {
    type Error = String;

    fn try_from(record: RunningRecord) -> Result<Self, Self::Error> {
        let len = record.phrase.chars().count();
        if record.phrase.is_empty() {
            return Err("running game with an empty phrase".to_owned());
        }
        if record.unveiled.len() != len {
            return Err(format!(
                "unveiled has {} entries for a phrase of {len} characters",
                record.unveiled.len()
            ));
        }

        Ok(Self {
            phrase: record.phrase,
            author: record.author,
            unveiled: record.unveiled,
            wrong_guesses: record.wrong_guesses,
            guessed: record.guessed,
            post: record.post,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Solved {
    phrase: String,
    solver: Player,
    #[serde(default)]
    post: Option<MessageId>,
}

impl Solved {
    pub fn new(phrase: impl Into<String>, solver: Player, post: Option<MessageId>) -> Self {
        Self {
            phrase: phrase.into(),
            solver,
            post,
        }
    }

    pub fn phrase(&self) -> &str {
        &self.phrase
    }

    pub const fn solver(&self) -> &Player {
        &self.solver
    }

    pub const fn post(&self) -> Option<MessageId> {
        self.post
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failed {
    phrase: String,
    #[serde(default)]
    post: Option<MessageId>,
}

impl Failed {
    pub fn new(phrase: impl Into<String>, post: Option<MessageId>) -> Self {
        Self {
            phrase: phrase.into(),
            post,
        }
    }

    pub fn phrase(&self) -> &str {
        &self.phrase
    }

    pub const fn post(&self) -> Option<MessageId> {
        self.post
    }
}
