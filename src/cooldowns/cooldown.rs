use chrono::Duration;

use crate::utils::UtcDateTime;

/// A timed lock on one action of one user in one channel.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Cooldown {
    created: UtcDateTime,
    seconds: u32,
}

impl Cooldown {
    pub const fn starting_at(created: UtcDateTime, seconds: u32) -> Self {
        Self { created, seconds }
    }

    pub fn duration(&self) -> Duration {
        Duration::seconds(i64::from(self.seconds))
    }

    pub fn expired_at(&self, now: UtcDateTime) -> bool {
        now - self.created >= self.duration()
    }

    /// Time left until expiry, never negative.
    pub fn remaining_at(&self, now: UtcDateTime) -> Duration {
        (self.duration() - (now - self.created)).max(Duration::zero())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CooldownStatus {
    /// No entry; the action is allowed.
    Absent,
    /// An entry whose time is up; the action is allowed and the entry should go.
    Expired,
    /// The action must be refused for `remaining`.
    Active { remaining: Duration },
}

impl CooldownStatus {
    pub fn of(cooldown: Option<&Cooldown>, now: UtcDateTime) -> Self {
        match cooldown {
            None => Self::Absent,
            Some(cooldown) if cooldown.expired_at(now) => Self::Expired,
            Some(cooldown) => Self::Active {
                remaining: cooldown.remaining_at(now),
            },
        }
    }

    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Active { .. })
    }
}
