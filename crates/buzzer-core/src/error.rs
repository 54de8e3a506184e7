use std::collections::TryReserveError;

use thiserror::Error;

/// Reasons the tone player failed to start
///
/// None of these are fatal: the buzzer is a non-critical peripheral and the
/// caller is free to retry `start()` later.
#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("lifecycle lock not acquired within the timeout")]
    LockTimeout,

    #[error("failed to allocate the request queue: {0}")]
    ResourceExhausted(#[from] TryReserveError),

    #[error("failed to spawn the worker task: {0}")]
    TaskSpawnFailed(#[from] std::io::Error),
}
