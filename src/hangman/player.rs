use std::fmt;

use serde::{Deserialize, Serialize};

use crate::utils::UserId;

/// A user as they were when they acted. Never refreshed from the platform.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Player {
    pub id: UserId,
    pub name: String,
    pub mention: String,
}

impl Player {
    pub fn new(id: UserId, name: impl Into<String>, mention: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            mention: mention.into(),
        }
    }

    /// A snapshot whose mention is the platform's default `<@id>` form.
    pub fn with_default_mention(id: UserId, name: impl Into<String>) -> Self {
        Self::new(id, name, id.mention())
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.name, self.id)
    }
}
