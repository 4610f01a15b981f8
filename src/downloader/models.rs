// Data model for the downloader: requests, probe results, playlist records

use std::path::PathBuf;

use serde::Deserialize;

use super::format_selector::Resolution;

/// One download job as resolved from the command line.
///
/// The output directory has already been tilde-expanded by the argument
/// resolver; nothing downstream looks at `~` again.
#[derive(Debug, Clone)]
pub struct DownloadRequest {
    pub url: String,
    pub output_dir: PathBuf,
    /// None means "best available"
    pub resolution: Option<Resolution>,
}

/// Explicit per-invocation configuration handed to the yt-dlp layer.
/// Only recognized options are representable.
#[derive(Debug, Clone)]
pub struct DownloadConfig {
    /// yt-dlp output template, relative to the output directory
    pub output_template: String,
    /// Format selector expression passed to `-f`
    pub format_selector: String,
    /// Suppress the streamed progress display
    pub quiet: bool,
    /// Pass --no-playlist so a video URL carrying a list parameter
    /// stays a single download
    pub no_playlist: bool,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            output_template: "%(title)s.%(ext)s".to_string(),
            format_selector: "bv*+ba/best".to_string(),
            quiet: false,
            no_playlist: true,
        }
    }
}

/// One entry of the probe's `formats` array, reduced to the fields the
/// downloader actually reads.
#[derive(Debug, Clone, Deserialize)]
pub struct MediaFormat {
    #[serde(default)]
    pub format_id: String,
    #[serde(default)]
    pub ext: String,
    pub height: Option<u32>,
    pub vcodec: Option<String>,
    pub acodec: Option<String>,
    pub filesize: Option<u64>,
    pub filesize_approx: Option<u64>,
}

impl MediaFormat {
    /// Exact size when reported, approximate otherwise.
    pub fn effective_size(&self) -> Option<u64> {
        self.filesize.or(self.filesize_approx)
    }

    pub fn has_video(&self) -> bool {
        self.vcodec
            .as_deref()
            .map_or(false, |v| v != "none" && !v.is_empty())
    }

    pub fn is_audio_only(&self) -> bool {
        !self.has_video()
            && self
                .acodec
                .as_deref()
                .map_or(false, |a| a != "none" && !a.is_empty())
    }
}

/// Result of a metadata probe, shaped for the information block the
/// binaries print before asking for confirmation.
#[derive(Debug, Clone)]
pub struct VideoProbe {
    pub title: String,
    pub duration_seconds: f64,
    /// Best-effort size of video stream plus audio stream, when reported
    pub estimated_size: Option<u64>,
    /// Height the download is expected to land on
    pub selected_height: Option<u32>,
    /// Distinct heights offered by the probe, ascending
    pub available_heights: Vec<u32>,
}

/// One video of an enumerated playlist. `index` is 1-based and follows
/// playlist order.
#[derive(Debug, Clone)]
pub struct PlaylistEntry {
    pub index: usize,
    pub title: String,
    pub url: String,
}

/// A playlist entry that failed its probe or its download, with the
/// reason. Skips are kept in the order they were encountered.
#[derive(Debug, Clone)]
pub struct SkippedItem {
    pub entry: PlaylistEntry,
    pub reason: String,
}

/// Outcome of a whole playlist run.
#[derive(Debug, Clone)]
pub struct PlaylistSummary {
    pub total: usize,
    pub succeeded: usize,
    pub skipped: Vec<SkippedItem>,
}
