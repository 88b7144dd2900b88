use order_tracker::{ConfigError, DirectoryError};
use thiserror::Error;

/// Top-level failure of the demo application.
#[derive(Debug, Error)]
pub enum SampleError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Directory(#[from] DirectoryError),
    #[error("Kitchen task failed: {0}")]
    Task(String),
    #[error("Tracker stopped before order reached {0}")]
    TrackerStopped(order_tracker::OrderStatus),
}
