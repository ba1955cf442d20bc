pub mod format_duration;
pub use format_duration::FormatDuration;

pub mod id;
pub use id::{ChannelId, MessageId, UserId};

pub(crate) type UtcDateTime = chrono::DateTime<chrono::Utc>;
