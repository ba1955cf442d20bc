//! Games by channel, written through to disk on every change.

use std::{collections::BTreeMap, path::PathBuf};

use tokio::sync::Mutex;
use tracing::{info, instrument, trace};

use crate::{
    hangman::GameState,
    persist::{self, PersistError},
    utils::ChannelId,
};

mod locks;
pub use locks::ChannelLocks;

#[derive(Debug)]
pub struct StateStore {
    path: PathBuf,
    states: Mutex<BTreeMap<ChannelId, GameState>>,
}

impl StateStore {
    /// Reads the games saved at `path`.
    ///
    /// A missing or unreadable file starts an empty store. A file that exists but
    /// doesn't decode fails the whole load.
    #[instrument(skip_all, name = "states", fields(path = %path.as_ref().display()))]
    pub async fn load(path: impl AsRef<std::path::Path>) -> Result<Self, PersistError> {
        let path = path.as_ref().to_path_buf();
        let states: BTreeMap<ChannelId, GameState> =
            persist::read_json(&path).await?.unwrap_or_default();

        info!(games = states.len(), "game states loaded");

        Ok(Self {
            path,
            states: Mutex::new(states),
        })
    }

    pub async fn get(&self, channel: ChannelId) -> Option<GameState> {
        self.states.lock().await.get(&channel).cloned()
    }

    #[cfg(test)]
    pub async fn contains(&self, channel: ChannelId) -> bool {
        self.states.lock().await.contains_key(&channel)
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.states.lock().await.len()
    }

    #[cfg(test)]
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Replaces the game in `channel`. Returns once the whole store is on disk;
    /// if writing fails the previous entry is kept.
    #[instrument(skip(self, state))]
    pub async fn set(&self, channel: ChannelId, state: GameState) -> Result<(), PersistError> {
        let mut states = self.states.lock().await;
        let previous = states.insert(channel, state);

        if let Err(err) = persist::write_json(&self.path, &*states).await {
            match previous {
                Some(previous) => states.insert(channel, previous),
                None => states.remove(&channel),
            };
            return Err(err);
        }

        trace!("saved");
        Ok(())
    }

    /// Removes the game in `channel`, returning it.
    #[instrument(skip(self))]
    pub async fn delete(&self, channel: ChannelId) -> Result<Option<GameState>, PersistError> {
        let mut states = self.states.lock().await;
        let Some(removed) = states.remove(&channel) else {
            return Ok(None);
        };

        if let Err(err) = persist::write_json(&self.path, &*states).await {
            states.insert(channel, removed);
            return Err(err);
        }

        trace!("deleted");
        Ok(Some(removed))
    }
}
