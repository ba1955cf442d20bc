//! Per user, per channel rate limiting of game commands.

use std::{
    collections::{BTreeMap, HashMap},
    path::PathBuf,
};

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, trace};

use crate::{
    persist::{self, PersistError},
    utils::{ChannelId, UserId, UtcDateTime},
};

mod cooldown;
pub use cooldown::{Cooldown, CooldownStatus};

mod kind;
pub use kind::{CooldownKind, ParseKindError, UnknownKindError};

/// Built-in durations, used when a channel has no override.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct CooldownDefaults {
    pub start: u32,
    pub guess: u32,
    pub remove: u32,
    pub state: u32,
}

impl CooldownDefaults {
    pub const fn seconds(&self, kind: CooldownKind) -> u32 {
        match kind {
            CooldownKind::Start => self.start,
            CooldownKind::Guess => self.guess,
            CooldownKind::Remove => self.remove,
            CooldownKind::RepostState => self.state,
        }
    }
}

impl Default for CooldownDefaults {
    fn default() -> Self {
        Self {
            start: 30,
            guess: 10,
            remove: 60,
            state: 30,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
struct OverrideRecord {
    #[serde(rename = "type")]
    kind: CooldownKind,
    channel: ChannelId,
    value: u32,
}

type Key = (CooldownKind, UserId, ChannelId);

#[derive(Debug)]
pub struct CooldownLedger {
    path: PathBuf,
    defaults: CooldownDefaults,
    overrides: Mutex<BTreeMap<(CooldownKind, ChannelId), u32>>,
    active: Mutex<HashMap<Key, Cooldown>>,
}

impl CooldownLedger {
    /// Reads configured overrides from `path`. Missing file means no overrides.
    #[instrument(skip_all, name = "cooldowns", fields(path = %path.as_ref().display()))]
    pub async fn load(
        path: impl AsRef<std::path::Path>,
        defaults: CooldownDefaults,
    ) -> Result<Self, PersistError> {
        let path = path.as_ref().to_path_buf();
        let records: Vec<OverrideRecord> = persist::read_json(&path).await?.unwrap_or_default();

        let overrides: BTreeMap<_, _> = records
            .into_iter()
            .map(|record| ((record.kind, record.channel), record.value))
            .collect();

        info!(overrides = overrides.len(), "cooldown config loaded");

        Ok(Self {
            path,
            defaults,
            overrides: Mutex::new(overrides),
            active: Mutex::default(),
        })
    }

    /// The configured duration for `kind` in `channel`. An explicit zero means no cooldown.
    pub async fn get(&self, kind: CooldownKind, channel: ChannelId) -> u32 {
        self.overrides
            .lock()
            .await
            .get(&(kind, channel))
            .copied()
            .unwrap_or_else(|| self.defaults.seconds(kind))
    }

    /// Overrides the duration for `kind` in `channel` and writes the overrides to disk.
    /// The override only takes effect once the write succeeded.
    #[instrument(skip(self))]
    pub async fn set(
        &self,
        kind: CooldownKind,
        channel: ChannelId,
        seconds: u32,
    ) -> Result<(), PersistError> {
        let mut overrides = self.overrides.lock().await;
        let previous = overrides.insert((kind, channel), seconds);

        let records: Vec<OverrideRecord> = overrides
            .iter()
            .map(|(&(kind, channel), &value)| OverrideRecord {
                kind,
                channel,
                value,
            })
            .collect();

        if let Err(err) = persist::write_json(&self.path, &records).await {
            match previous {
                Some(previous) => overrides.insert((kind, channel), previous),
                None => overrides.remove(&(kind, channel)),
            };
            return Err(err);
        }

        info!("cooldown override saved");
        Ok(())
    }

    /// Stamps a fresh cooldown, replacing any existing one for the same key.
    /// Without `seconds` the configured duration for the channel is used.
    pub async fn add(
        &self,
        kind: CooldownKind,
        user: UserId,
        channel: ChannelId,
        seconds: Option<u32>,
    ) {
        self.add_at(kind, user, channel, seconds, Utc::now()).await
    }

    pub async fn add_at(
        &self,
        kind: CooldownKind,
        user: UserId,
        channel: ChannelId,
        seconds: Option<u32>,
        now: UtcDateTime,
    ) {
        let seconds = match seconds {
            Some(seconds) => seconds,
            None => self.get(kind, channel).await,
        };

        trace!(%kind, %user, %channel, seconds, "adding cooldown");

        self.active
            .lock()
            .await
            .insert((kind, user, channel), Cooldown::starting_at(now, seconds));
    }

    pub async fn check(&self, kind: CooldownKind, user: UserId, channel: ChannelId) -> CooldownStatus {
        self.check_at(kind, user, channel, Utc::now()).await
    }

    pub async fn check_at(
        &self,
        kind: CooldownKind,
        user: UserId,
        channel: ChannelId,
        now: UtcDateTime,
    ) -> CooldownStatus {
        let active = self.active.lock().await;
        CooldownStatus::of(active.get(&(kind, user, channel)), now)
    }

    /// Checks and stamps in one step. Expired entries are replaced; an active entry
    /// refuses with the time remaining.
    pub async fn admit(
        &self,
        kind: CooldownKind,
        user: UserId,
        channel: ChannelId,
    ) -> Result<(), Duration> {
        self.admit_at(kind, user, channel, Utc::now()).await
    }

    pub async fn admit_at(
        &self,
        kind: CooldownKind,
        user: UserId,
        channel: ChannelId,
        now: UtcDateTime,
    ) -> Result<(), Duration> {
        let seconds = self.get(kind, channel).await;

        let mut active = self.active.lock().await;
        let key = (kind, user, channel);

        if let CooldownStatus::Active { remaining } = CooldownStatus::of(active.get(&key), now) {
            debug!(%kind, %user, %channel, %remaining, "refused");
            return Err(remaining);
        }

        active.insert(key, Cooldown::starting_at(now, seconds));
        Ok(())
    }

    /// Drops every cooldown of `kind`, in every channel.
    pub async fn clear(&self, kind: CooldownKind) {
        self.active.lock().await.retain(|(k, _, _), _| *k != kind);
    }

    /// Drops every cooldown of `kind` in `channel`.
    pub async fn clear_channel(&self, kind: CooldownKind, channel: ChannelId) {
        self.active
            .lock()
            .await
            .retain(|(k, _, c), _| *k != kind || *c != channel);
    }

    pub async fn remove(
        &self,
        kind: CooldownKind,
        user: UserId,
        channel: ChannelId,
    ) -> Option<Cooldown> {
        self.active.lock().await.remove(&(kind, user, channel))
    }
}
