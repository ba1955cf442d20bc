use thisslime::TracingError;

/// Errors that stop the process.
#[derive(Debug, thiserror::Error, TracingError)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] crate::framework::config::Error),

    #[error(transparent)]
    Persist(#[from] crate::persist::PersistError),

    #[error("console i/o failed: {0}")]
    #[event(level = ERROR)]
    Io(#[from] std::io::Error),
}
