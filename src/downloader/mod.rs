// Downloader module - request model, format policy, flows

pub mod diagnostics;
pub mod errors;
pub mod format_selector;
pub mod models;
pub mod orchestrator;
pub mod utils;

pub use errors::DownloaderError;
pub use format_selector::Resolution;
pub use models::{
    DownloadConfig, DownloadRequest, PlaylistEntry, PlaylistSummary, SkippedItem, VideoProbe,
};
pub use orchestrator::{download_playlist, download_single};
