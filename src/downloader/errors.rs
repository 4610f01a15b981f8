// Error types shared by both downloader binaries

use std::fmt;

/// Failure taxonomy for the downloader.
///
/// `Usage` is always fatal. `Metadata` and `Download` are fatal for the
/// single-video binary; the playlist binary converts per-entry occurrences
/// into skips and keeps going.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloaderError {
    /// Bad or missing command-line input
    Usage(String),

    /// Metadata probe or playlist enumeration failed
    Metadata(String),

    /// The download invocation itself failed
    Download(String),
}

impl DownloaderError {
    /// Inner reason without the category prefix, used for skip records.
    pub fn reason(&self) -> &str {
        match self {
            Self::Usage(msg) | Self::Metadata(msg) | Self::Download(msg) => msg,
        }
    }
}

impl fmt::Display for DownloaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Usage(msg) => write!(f, "Usage error: {}", msg),
            Self::Metadata(msg) => write!(f, "Failed to get video info: {}", msg),
            Self::Download(msg) => write!(f, "Download failed: {}", msg),
        }
    }
}

impl std::error::Error for DownloaderError {}
