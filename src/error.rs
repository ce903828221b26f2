use thiserror::Error;

/// Library error type for load attempts.
///
/// Every variant is terminal for the attempted load: the session reverts
/// to `None` (the two pre-acceptance guards leave it untouched) and the
/// caller must issue a fresh load. Nothing is retried.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The supplied path was empty.
    #[error("empty path")]
    InvalidArgument,

    /// A load is already in flight; the new request was rejected without
    /// disturbing the one in progress.
    #[error("a load is already in flight")]
    AlreadyLoading,

    /// Underlying IO error while reading the source, including a source
    /// that turned out to be zero bytes long.
    #[error("read error: {0}")]
    Read(#[from] std::io::Error),

    /// The first six bytes did not match the GIF87a/GIF89a signature.
    #[error("not a GIF: bad signature")]
    InvalidFormat,

    /// The external decoder rejected the bytes.
    #[error("decode error: {0}")]
    Decode(#[source] anyhow::Error),
}
