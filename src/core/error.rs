use thiserror::Error;

pub type MirrorResult<T> = Result<T, MirrorError>;

#[derive(Error, Debug)]
pub enum MirrorError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    /// The release listing could not be fetched after retries.
    /// Aborts the current repository's pass only.
    #[error("Remote unavailable: {0}")]
    RemoteUnavailable(String),

    /// A single asset or archive fetch exhausted its retries.
    /// The caller removes the whole release directory so a retry starts clean.
    #[error("Download failed: {url}")]
    DownloadFailed { url: String },

    /// Operator-requested cancellation. Propagates to the top after the
    /// in-flight release directory has been cleaned up.
    #[error("Interrupted")]
    Interrupted,
}
