use std::{collections::HashMap, sync::Arc};

use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

use crate::utils::ChannelId;

/// One mutex per channel, created on first use.
#[derive(Clone, Debug, Default)]
pub struct ChannelLocks(Arc<RwLock<HashMap<ChannelId, Arc<Mutex<()>>>>>);

impl ChannelLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits until no other command holds `channel`.
    pub async fn lock(&self, channel: ChannelId) -> OwnedMutexGuard<()> {
        let existing = self.0.read().await.get(&channel).cloned();

        let mutex = match existing {
            Some(mutex) => mutex,
            None => self.0.write().await.entry(channel).or_default().clone(),
        };

        mutex.lock_owned().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn same_channel_waits() {
        let locks = ChannelLocks::new();
        let guard = locks.lock(ChannelId::new(1)).await;

        let second = tokio::time::timeout(Duration::from_millis(50), locks.lock(ChannelId::new(1)));
        assert!(second.await.is_err());

        drop(guard);
        let _again = locks.lock(ChannelId::new(1)).await;
    }

    #[tokio::test]
    async fn channels_are_independent() {
        let locks = ChannelLocks::new();
        let _one = locks.lock(ChannelId::new(1)).await;

        let two = tokio::time::timeout(Duration::from_millis(50), locks.lock(ChannelId::new(2)));
        assert!(two.await.is_ok());
    }
}
