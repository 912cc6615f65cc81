use thiserror::Error;

#[derive(Debug, Error)]
pub enum MainError {
    #[error(transparent)]
    Init(#[from] shared::error::InitializationError),
    #[error("could not build facility source: {0}")]
    Source(#[from] sync_engine::FetchError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Join(#[from] tokio::task::JoinError),
    #[error("facility poller exited before shutdown was requested")]
    PollerExited,
}
