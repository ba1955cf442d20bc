//! Hangman games, one per channel.
//!
//! [`Hangman`] is what a chat client talks to. It never posts, edits or deletes
//! messages itself: callers render the returned states, post them, and hand the
//! resulting message ids back with [`Hangman::attach_post`].

use std::path::Path;

use tracing::{debug, info, instrument};

use crate::{
    cooldowns::{CooldownDefaults, CooldownKind, CooldownLedger, CooldownStatus},
    persist::PersistError,
    store::{ChannelLocks, StateStore},
    utils::{ChannelId, MessageId, UserId},
};

mod error;
pub use error::{CooldownActiveError, HangmanError};

pub mod gallows;

mod player;
pub use player::Player;

mod render;

mod state;
pub use state::{Failed, GameState, PhraseError, Running, Solved};

pub type Result<T, E = HangmanError> = std::result::Result<T, E>;

/// Allowed wrong guesses unless configured otherwise.
pub const DEFAULT_MAX_GUESSES: u32 = 6;

/// Shortest phrase accepted by [`Hangman::start`], after stripping decoration.
pub const MIN_PHRASE_LEN: usize = 3;

pub const STATES_FILE: &str = "states.json";
pub const COOLDOWNS_FILE: &str = "cooldowns.json";

/// The result of a guess.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GuessOutcome {
    /// The board with this guess applied, with the whole phrase shown if the
    /// guess solved it. It is the one to edit when the game ends.
    pub previous: Running,
    pub state: GameState,
}

impl GuessOutcome {
    pub const fn is_over(&self) -> bool {
        self.state.is_over()
    }
}

#[derive(Debug)]
pub struct Hangman {
    store: StateStore,
    cooldowns: CooldownLedger,
    locks: ChannelLocks,
    max_guesses: u32,
}

impl Hangman {
    pub fn new(store: StateStore, cooldowns: CooldownLedger, max_guesses: u32) -> Self {
        Self {
            store,
            cooldowns,
            locks: ChannelLocks::new(),
            max_guesses,
        }
    }

    /// Loads games and cooldown overrides from `data_dir`.
    #[instrument(skip_all, fields(data_dir = %data_dir.as_ref().display()))]
    pub async fn open(
        data_dir: impl AsRef<Path>,
        defaults: CooldownDefaults,
        max_guesses: u32,
    ) -> Result<Self, PersistError> {
        let data_dir = data_dir.as_ref();
        let store = StateStore::load(data_dir.join(STATES_FILE)).await?;
        let cooldowns = CooldownLedger::load(data_dir.join(COOLDOWNS_FILE), defaults).await?;

        info!(max_guesses, "hangman ready");

        Ok(Self::new(store, cooldowns, max_guesses))
    }

    pub const fn max_guesses(&self) -> u32 {
        self.max_guesses
    }

    pub const fn cooldowns(&self) -> &CooldownLedger {
        &self.cooldowns
    }

    pub fn render(&self, state: &GameState) -> String {
        state.render(self.max_guesses)
    }

    pub async fn peek(&self, channel: ChannelId) -> Option<GameState> {
        self.store.get(channel).await
    }

    async fn running(&self, channel: ChannelId) -> Result<Running> {
        match self.store.get(channel).await {
            Some(GameState::Running(running)) => Ok(running),
            _ => Err(HangmanError::NoActiveGame(channel)),
        }
    }

    /// Refuses while `user` has an active `kind` cooldown in `channel`; drops it once expired.
    async fn ensure_ready(&self, kind: CooldownKind, user: UserId, channel: ChannelId) -> Result<()> {
        match self.cooldowns.check(kind, user, channel).await {
            CooldownStatus::Absent => Ok(()),
            CooldownStatus::Expired => {
                self.cooldowns.remove(kind, user, channel).await;
                Ok(())
            }
            CooldownStatus::Active { remaining } => {
                Err(CooldownActiveError::new(kind, user, remaining).into())
            }
        }
    }

    /// Starts a game with `phrase`, which may be wrapped in spoiler bars.
    #[instrument(skip(self, author, phrase), fields(author = %author))]
    pub async fn start(&self, channel: ChannelId, author: &Player, phrase: &str) -> Result<Running> {
        let _guard = self.locks.lock(channel).await;

        if let Some(GameState::Running(_)) = self.store.get(channel).await {
            return Err(HangmanError::GameRunning(channel));
        }

        self.ensure_ready(CooldownKind::Start, author.id, channel)
            .await?;

        let phrase = strip_decoration(phrase);
        let running = Running::new(phrase, author.clone())?;
        if phrase.chars().count() < MIN_PHRASE_LEN {
            return Err(PhraseError::TooShort {
                min: MIN_PHRASE_LEN,
            }
            .into());
        }

        self.store.set(channel, running.clone().into()).await?;
        self.cooldowns
            .add(CooldownKind::Start, author.id, channel, None)
            .await;

        info!("game started");
        Ok(running)
    }

    /// Applies a guess from `guesser`.
    ///
    /// A finished game stays in the store until [`Hangman::conclude`] is called.
    #[instrument(skip(self, guesser, text), fields(guesser = %guesser))]
    pub async fn apply_guess(
        &self,
        channel: ChannelId,
        guesser: &Player,
        text: &str,
    ) -> Result<GuessOutcome> {
        let _guard = self.locks.lock(channel).await;

        let running = self.running(channel).await?;
        if running.author().id == guesser.id {
            return Err(HangmanError::AuthorGuess(guesser.id));
        }

        let text = text.trim();
        if text.is_empty() {
            return Err(HangmanError::EmptyGuess(guesser.id));
        }

        self.ensure_ready(CooldownKind::Guess, guesser.id, channel)
            .await?;

        let mut previous = running;
        let state = previous.play(text, guesser, self.max_guesses);
        self.store.set(channel, state.clone()).await?;

        let author = previous.author().id;
        match &state {
            GameState::Running(next) => {
                // the author can't pull the game once people are guessing
                if next.guessing_started()
                    && self
                        .cooldowns
                        .check(CooldownKind::Remove, author, channel)
                        .await
                        == CooldownStatus::Absent
                {
                    self.cooldowns
                        .add(CooldownKind::Remove, author, channel, None)
                        .await;
                }
            }
            GameState::Solved(_) | GameState::Failed(_) => {
                if let GameState::Solved(_) = state {
                    previous.unveil();
                }

                self.cooldowns
                    .add(CooldownKind::Start, author, channel, None)
                    .await;
                self.cooldowns
                    .remove(CooldownKind::Remove, author, channel)
                    .await;

                info!(solved = matches!(state, GameState::Solved(_)), "game over");
            }
        }

        self.cooldowns
            .clear_channel(CooldownKind::Guess, channel)
            .await;
        self.cooldowns
            .add(CooldownKind::Guess, guesser.id, channel, None)
            .await;

        debug!(wrong_guesses = ?state.as_running().map(Running::wrong_guesses));

        Ok(GuessOutcome { previous, state })
    }

    /// Removes a running game early. Only its author or an admin may do this.
    #[instrument(skip(self))]
    pub async fn remove(
        &self,
        channel: ChannelId,
        requester: UserId,
        is_admin: bool,
    ) -> Result<Running> {
        let _guard = self.locks.lock(channel).await;

        let running = self.running(channel).await?;

        self.ensure_ready(CooldownKind::Remove, requester, channel)
            .await?;

        if running.author().id != requester && !is_admin {
            return Err(HangmanError::NotAuthorized(requester));
        }

        self.store.delete(channel).await?;
        self.cooldowns
            .remove(CooldownKind::Remove, running.author().id, channel)
            .await;

        info!("game removed");
        Ok(running)
    }

    /// The current game for `user` to post again, subject to the repost cooldown.
    #[instrument(skip(self))]
    pub async fn repost(&self, channel: ChannelId, user: UserId) -> Result<GameState> {
        let _guard = self.locks.lock(channel).await;

        let state = self
            .store
            .get(channel)
            .await
            .ok_or(HangmanError::NoActiveGame(channel))?;

        self.cooldowns
            .admit(CooldownKind::RepostState, user, channel)
            .await
            .map_err(|remaining| {
                CooldownActiveError::new(CooldownKind::RepostState, user, remaining)
            })?;

        Ok(state)
    }

    /// Records the message now showing the game in `channel`.
    /// Returns the message it replaces, if any.
    #[instrument(skip(self))]
    pub async fn attach_post(&self, channel: ChannelId, post: MessageId) -> Result<Option<MessageId>> {
        let _guard = self.locks.lock(channel).await;

        let mut state = self
            .store
            .get(channel)
            .await
            .ok_or(HangmanError::NoActiveGame(channel))?;

        let old = state.post();
        state.set_post(post);
        self.store.set(channel, state).await?;

        Ok(old)
    }

    /// Drops a finished game once its result has been posted. Running games are left alone.
    #[instrument(skip(self))]
    pub async fn conclude(&self, channel: ChannelId) -> Result<Option<GameState>> {
        let _guard = self.locks.lock(channel).await;

        match self.store.get(channel).await {
            Some(state) if state.is_over() => Ok(self.store.delete(channel).await?),
            _ => Ok(None),
        }
    }

    pub async fn cooldown(&self, kind: CooldownKind, channel: ChannelId) -> u32 {
        self.cooldowns.get(kind, channel).await
    }

    pub async fn set_cooldown(
        &self,
        kind: CooldownKind,
        channel: ChannelId,
        seconds: u32,
    ) -> Result<()> {
        Ok(self.cooldowns.set(kind, channel, seconds).await?)
    }
}

/// Trims whitespace and spoiler bars around a phrase.
pub fn strip_decoration(phrase: &str) -> &str {
    phrase.trim_matches(|ch: char| ch.is_whitespace() || ch == '|')
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    const CHANNEL: ChannelId = ChannelId::new(500);

    fn player(id: u64) -> Player {
        Player::with_default_mention(UserId::new(id), format!("player{id}"))
    }

    async fn hangman(dir: &tempfile::TempDir) -> Hangman {
        Hangman::open(dir.path(), CooldownDefaults::default(), 5)
            .await
            .unwrap()
    }

    #[test]
    fn decoration_is_stripped() {
        assert_eq!(strip_decoration(" ||secret phrase|| "), "secret phrase");
        assert_eq!(strip_decoration("|| ab ||"), "ab");
    }

    #[tokio::test]
    async fn start_validates_the_phrase() {
        let dir = tempfile::tempdir().unwrap();
        let hangman = hangman(&dir).await;

        assert!(matches!(
            hangman.start(CHANNEL, &player(1), "||  ||").await,
            Err(HangmanError::InvalidPhrase(PhraseError::Empty))
        ));
        assert!(matches!(
            hangman.start(CHANNEL, &player(1), "||ab||").await,
            Err(HangmanError::InvalidPhrase(PhraseError::TooShort { min: 3 }))
        ));
        assert_eq!(hangman.peek(CHANNEL).await, None);

        // a rejected phrase doesn't cost a start cooldown
        let running = hangman.start(CHANNEL, &player(1), "||cat||").await.unwrap();
        assert_eq!(running.phrase(), "cat");
        assert_eq!(hangman.peek(CHANNEL).await, Some(running.into()));
    }

    #[tokio::test]
    async fn one_running_game_per_channel() {
        let dir = tempfile::tempdir().unwrap();
        let hangman = hangman(&dir).await;

        hangman.start(CHANNEL, &player(1), "first").await.unwrap();
        assert!(matches!(
            hangman.start(CHANNEL, &player(2), "second").await,
            Err(HangmanError::GameRunning(_))
        ));

        hangman
            .start(ChannelId::new(501), &player(2), "elsewhere")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn start_cooldown_applies_to_the_author() {
        let dir = tempfile::tempdir().unwrap();
        let hangman = hangman(&dir).await;

        hangman.start(CHANNEL, &player(1), "first").await.unwrap();
        hangman.remove(CHANNEL, UserId::new(1), false).await.unwrap();

        assert!(matches!(
            hangman.start(CHANNEL, &player(1), "again").await,
            Err(HangmanError::Cooldown(err)) if err.kind() == CooldownKind::Start
        ));
        hangman.start(CHANNEL, &player(2), "someone else").await.unwrap();
    }

    #[tokio::test]
    async fn guessing_needs_a_game() {
        let dir = tempfile::tempdir().unwrap();
        let hangman = hangman(&dir).await;

        assert!(matches!(
            hangman.apply_guess(CHANNEL, &player(2), "a").await,
            Err(HangmanError::NoActiveGame(_))
        ));
    }

    #[tokio::test]
    async fn author_cannot_guess() {
        let dir = tempfile::tempdir().unwrap();
        let hangman = hangman(&dir).await;

        hangman.start(CHANNEL, &player(1), "cat").await.unwrap();
        assert!(matches!(
            hangman.apply_guess(CHANNEL, &player(1), "cat").await,
            Err(HangmanError::AuthorGuess(_))
        ));
        assert!(matches!(
            hangman.apply_guess(CHANNEL, &player(2), "   ").await,
            Err(HangmanError::EmptyGuess(_))
        ));
    }

    #[tokio::test]
    async fn guess_cooldown_resets_for_the_channel() {
        let dir = tempfile::tempdir().unwrap();
        let hangman = hangman(&dir).await;

        hangman.start(CHANNEL, &player(1), "hangman").await.unwrap();
        hangman.apply_guess(CHANNEL, &player(2), "a").await.unwrap();

        assert!(matches!(
            hangman.apply_guess(CHANNEL, &player(2), "n").await,
            Err(HangmanError::Cooldown(err)) if err.kind() == CooldownKind::Guess
        ));

        // someone else guessing lifts player 2's wait
        hangman.apply_guess(CHANNEL, &player(3), "n").await.unwrap();
        let outcome = hangman.apply_guess(CHANNEL, &player(2), "g").await.unwrap();

        let running = outcome.state.as_running().unwrap();
        assert_eq!(running.render_mask(), " _  a  n  g  _  a  n ");
    }

    #[tokio::test]
    async fn finished_games_wait_for_conclude() {
        let dir = tempfile::tempdir().unwrap();
        let hangman = hangman(&dir).await;

        hangman.start(CHANNEL, &player(1), "cat").await.unwrap();
        hangman.attach_post(CHANNEL, MessageId::new(10)).await.unwrap();
        hangman.apply_guess(CHANNEL, &player(2), "c").await.unwrap();

        let outcome = hangman.apply_guess(CHANNEL, &player(3), "CAT").await.unwrap();
        assert!(outcome.is_over());
        assert_eq!(
            outcome.state,
            Solved::new("cat", player(3), Some(MessageId::new(10))).into()
        );
        assert!(outcome.previous.is_unveiled());
        assert_eq!(outcome.previous.post(), Some(MessageId::new(10)));
        assert!(outcome.previous.guessed().contains(&'c'));

        // the author may start again elsewhere only after the start cooldown
        assert!(hangman
            .cooldowns()
            .check(CooldownKind::Start, UserId::new(1), CHANNEL)
            .await
            .is_active());
        assert_eq!(
            hangman
                .cooldowns()
                .check(CooldownKind::Remove, UserId::new(1), CHANNEL)
                .await,
            CooldownStatus::Absent
        );

        assert!(hangman.peek(CHANNEL).await.unwrap().is_over());
        assert!(matches!(
            hangman.apply_guess(CHANNEL, &player(4), "x").await,
            Err(HangmanError::NoActiveGame(_))
        ));

        assert_eq!(
            hangman.conclude(CHANNEL).await.unwrap(),
            Some(outcome.state)
        );
        assert_eq!(hangman.peek(CHANNEL).await, None);
        assert_eq!(hangman.conclude(CHANNEL).await.unwrap(), None);
    }

    #[tokio::test]
    async fn solving_letter_is_on_the_final_board() {
        let dir = tempfile::tempdir().unwrap();
        let hangman = hangman(&dir).await;

        hangman.start(CHANNEL, &player(1), "cat").await.unwrap();
        hangman.apply_guess(CHANNEL, &player(2), "c").await.unwrap();
        hangman.apply_guess(CHANNEL, &player(3), "a").await.unwrap();
        let outcome = hangman.apply_guess(CHANNEL, &player(2), "t").await.unwrap();

        assert!(outcome.is_over());
        assert!(outcome.previous.is_unveiled());
        assert!(outcome.previous.guessed().contains(&'t'));
        assert!(outcome.previous.render(5).contains("~~t~~"));
    }

    #[tokio::test]
    async fn failed_game_keeps_its_mask() {
        let dir = tempfile::tempdir().unwrap();
        let hangman = hangman(&dir).await;
        hangman.start(CHANNEL, &player(1), "cat").await.unwrap();

        let mut outcome = None;
        for (id, letter) in (2..).zip(["x", "y", "z", "q", "w"]) {
            outcome = Some(hangman.apply_guess(CHANNEL, &player(id), letter).await.unwrap());
        }

        let outcome = outcome.unwrap();
        assert_eq!(outcome.state, Failed::new("cat", None).into());
        assert!(!outcome.previous.is_unveiled());

        // the edited board shows the last miss and the whole gallows
        assert_eq!(outcome.previous.wrong_guesses(), 5);
        assert!(outcome.previous.guessed().contains(&'w'));
        assert!(outcome
            .previous
            .render(5)
            .contains(&gallows::stage(5, 5)));
        assert!(hangman.render(&outcome.state).contains("||cat||"));
    }

    #[tokio::test]
    async fn remove_is_for_author_or_admin() {
        let dir = tempfile::tempdir().unwrap();
        let hangman = hangman(&dir).await;

        assert!(matches!(
            hangman.remove(CHANNEL, UserId::new(1), true).await,
            Err(HangmanError::NoActiveGame(_))
        ));

        hangman.start(CHANNEL, &player(1), "cat").await.unwrap();
        assert!(matches!(
            hangman.remove(CHANNEL, UserId::new(2), false).await,
            Err(HangmanError::NotAuthorized(_))
        ));

        let removed = hangman.remove(CHANNEL, UserId::new(2), true).await.unwrap();
        assert_eq!(removed.phrase(), "cat");
        assert_eq!(hangman.peek(CHANNEL).await, None);
    }

    #[tokio::test]
    async fn author_cannot_remove_once_guessing_started() {
        let dir = tempfile::tempdir().unwrap();
        let hangman = hangman(&dir).await;

        hangman.start(CHANNEL, &player(1), "hangman").await.unwrap();
        hangman.apply_guess(CHANNEL, &player(2), "z").await.unwrap();

        assert!(matches!(
            hangman.remove(CHANNEL, UserId::new(1), false).await,
            Err(HangmanError::Cooldown(err)) if err.kind() == CooldownKind::Remove
        ));
        assert!(hangman.peek(CHANNEL).await.is_some());
    }

    #[tokio::test]
    async fn repost_moves_the_post() {
        let dir = tempfile::tempdir().unwrap();
        let hangman = hangman(&dir).await;

        assert!(matches!(
            hangman.repost(CHANNEL, UserId::new(2)).await,
            Err(HangmanError::NoActiveGame(_))
        ));

        hangman.start(CHANNEL, &player(1), "cat").await.unwrap();
        assert_eq!(
            hangman.attach_post(CHANNEL, MessageId::new(1)).await.unwrap(),
            None
        );

        let state = hangman.repost(CHANNEL, UserId::new(2)).await.unwrap();
        assert_eq!(state.post(), Some(MessageId::new(1)));
        assert_eq!(
            hangman.attach_post(CHANNEL, MessageId::new(2)).await.unwrap(),
            Some(MessageId::new(1))
        );
        assert_eq!(
            hangman.peek(CHANNEL).await.unwrap().post(),
            Some(MessageId::new(2))
        );

        assert!(matches!(
            hangman.repost(CHANNEL, UserId::new(2)).await,
            Err(HangmanError::Cooldown(_))
        ));
    }

    #[tokio::test]
    async fn games_survive_restart() {
        let dir = tempfile::tempdir().unwrap();
        {
            let hangman = hangman(&dir).await;
            hangman.start(CHANNEL, &player(1), "restart").await.unwrap();
            hangman.apply_guess(CHANNEL, &player(2), "t").await.unwrap();
            hangman
                .set_cooldown(CooldownKind::Guess, CHANNEL, 0)
                .await
                .unwrap();
        }

        let hangman = hangman(&dir).await;
        let state = hangman.peek(CHANNEL).await.unwrap();
        assert_eq!(state.as_running().unwrap().render_mask(), " _  _  _  t  _  _  t ");
        assert_eq!(hangman.cooldown(CooldownKind::Guess, CHANNEL).await, 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_guesses_are_not_lost() {
        let dir = tempfile::tempdir().unwrap();
        let hangman = Arc::new(hangman(&dir).await);

        hangman
            .start(CHANNEL, &player(1), "abcdefghijklmnop")
            .await
            .unwrap();

        let letters = ["a", "b", "c", "d", "e", "f", "g", "h"];
        let tasks: Vec<_> = (2..)
            .zip(letters)
            .map(|(id, letter)| {
                let hangman = hangman.clone();
                tokio::spawn(async move {
                    hangman.apply_guess(CHANNEL, &player(id), letter).await
                })
            })
            .collect();

        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let state = hangman.peek(CHANNEL).await.unwrap();
        let running = state.as_running().unwrap();
        assert_eq!(running.wrong_guesses(), 0);
        assert_eq!(running.guessed().len(), letters.len());
        assert_eq!(
            running.unveiled().iter().filter(|shown| **shown).count(),
            letters.len()
        );
    }
}
