use thiserror::Error;

/// Failure taxonomy of the synchronization layer.
///
/// Only `Transport` and `Api` failures are ever surfaced to the user (as
/// an inline view message); decode problems degrade to defaults at the
/// call site, and storage failures are represented by the cache cell's
/// own error type and swallowed.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Decode error: {0}")]
    Decode(String),
}
