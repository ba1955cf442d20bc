use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// The rate-limited actions.
///
/// Persisted as a number: `Start` is 0, `Guess` 1, `Remove` 2, `RepostState` 3.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum CooldownKind {
    Start,
    Guess,
    Remove,
    RepostState,
}

impl CooldownKind {
    pub const ALL: [Self; 4] = [Self::Start, Self::Guess, Self::Remove, Self::RepostState];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Guess => "guess",
            Self::Remove => "remove",
            Self::RepostState => "state",
        }
    }
}

impl fmt::Display for CooldownKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<CooldownKind> for u8 {
    fn from(value: CooldownKind) -> Self {
        match value {
            CooldownKind::Start => 0,
            CooldownKind::Guess => 1,
            CooldownKind::Remove => 2,
            CooldownKind::RepostState => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("unknown cooldown type {0}")]
pub struct UnknownKindError(u8);

impl TryFrom<u8> for CooldownKind {
    type Error = UnknownKindError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => Self::Start,
            1 => Self::Guess,
            2 => Self::Remove,
            3 => Self::RepostState,
            _ => return Err(UnknownKindError(value)),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown cooldown type '{0}'. supported: 'rm|remove', 'g|guess', 's|start', 'state'")]
pub struct ParseKindError(String);

impl FromStr for CooldownKind {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "s" | "start" | "start_hangman" => Ok(Self::Start),
            "g" | "guess" => Ok(Self::Guess),
            "rm" | "remove" => Ok(Self::Remove),
            "state" | "repost" => Ok(Self::RepostState),
            _ => Err(ParseKindError(s.to_owned())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::CooldownKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn aliases() {
        assert_eq!("rm".parse::<CooldownKind>().unwrap(), CooldownKind::Remove);
        assert_eq!(" G ".parse::<CooldownKind>().unwrap(), CooldownKind::Guess);
        assert_eq!(
            "start_hangman".parse::<CooldownKind>().unwrap(),
            CooldownKind::Start
        );
        assert!("dance".parse::<CooldownKind>().is_err());
    }

    #[test]
    fn numbers() {
        for kind in CooldownKind::ALL {
            assert_eq!(CooldownKind::try_from(u8::from(kind)).unwrap(), kind);
        }
        assert!(CooldownKind::try_from(4).is_err());
        assert_eq!(serde_json::to_string(&CooldownKind::RepostState).unwrap(), "3");
    }
}
