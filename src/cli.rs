// Command-line argument resolution for the two binaries
//
// clap handles arity and ordering; anything missing or malformed fails
// here, before any network activity. The only transformation applied is
// tilde expansion on the output directory.

use clap::{Args, Parser};

use crate::downloader::errors::DownloaderError;
use crate::downloader::format_selector::Resolution;
use crate::downloader::models::DownloadRequest;
use crate::downloader::utils::expand_tilde;

const RESOLUTION_HELP: &str = "\
Available resolutions:
  1080p - Full HD
  720p  - HD
  480p  - SD
  360p  - Low
  240p  - Lower
  144p  - Lowest";

/// Arguments shared by both binaries.
#[derive(Debug, Args)]
pub struct CommonArgs {
    /// Directory the downloaded files are written to; a leading ~ is
    /// expanded to the home directory
    #[arg(value_name = "output_directory")]
    pub output_directory: String,

    /// Target resolution label; omit to download the best available
    #[arg(value_name = "resolution", value_parser = parse_resolution)]
    pub resolution: Option<Resolution>,

    /// Skip the confirmation prompt
    #[arg(short = 'y', long)]
    pub yes: bool,
}

impl CommonArgs {
    /// Resolve the arguments into a download request.
    pub fn to_request(&self, url: &str) -> Result<DownloadRequest, DownloaderError> {
        Ok(DownloadRequest {
            url: url.to_string(),
            output_dir: expand_tilde(&self.output_directory).map_err(DownloaderError::Usage)?,
            resolution: self.resolution,
        })
    }
}

/// `single_video_downloader <video_url> <output_directory> [resolution]`
#[derive(Debug, Parser)]
#[command(
    name = "single_video_downloader",
    about = "Download a single YouTube video via yt-dlp",
    after_help = RESOLUTION_HELP
)]
pub struct SingleVideoArgs {
    /// URL of the video to download
    #[arg(value_name = "video_url")]
    pub url: String,

    #[command(flatten)]
    pub common: CommonArgs,
}

impl SingleVideoArgs {
    pub fn to_request(&self) -> Result<DownloadRequest, DownloaderError> {
        self.common.to_request(&self.url)
    }
}

/// `playlist_downloader <playlist_url> <output_directory> [resolution]`
#[derive(Debug, Parser)]
#[command(
    name = "playlist_downloader",
    about = "Download every video of a YouTube playlist via yt-dlp",
    after_help = RESOLUTION_HELP
)]
pub struct PlaylistArgs {
    /// URL of the playlist to download
    #[arg(value_name = "playlist_url")]
    pub url: String,

    #[command(flatten)]
    pub common: CommonArgs,
}

impl PlaylistArgs {
    pub fn to_request(&self) -> Result<DownloadRequest, DownloaderError> {
        self.common.to_request(&self.url)
    }
}

fn parse_resolution(s: &str) -> Result<Resolution, String> {
    s.parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_command_definitions_are_consistent() {
        SingleVideoArgs::command().debug_assert();
        PlaylistArgs::command().debug_assert();
    }

    #[test]
    fn test_full_invocation_parses() {
        let args = SingleVideoArgs::try_parse_from([
            "single_video_downloader",
            "https://www.youtube.com/watch?v=abc",
            "/tmp/videos",
            "720p",
        ])
        .unwrap();

        assert_eq!(args.url, "https://www.youtube.com/watch?v=abc");
        assert_eq!(args.common.output_directory, "/tmp/videos");
        assert_eq!(args.common.resolution, Some(Resolution::P720));
        assert!(!args.common.yes);
    }

    #[test]
    fn test_resolution_is_optional() {
        let args = SingleVideoArgs::try_parse_from([
            "single_video_downloader",
            "https://www.youtube.com/watch?v=abc",
            "/tmp/videos",
        ])
        .unwrap();

        assert_eq!(args.common.resolution, None);
    }

    #[test]
    fn test_missing_url_is_rejected() {
        assert!(SingleVideoArgs::try_parse_from(["single_video_downloader"]).is_err());
    }

    #[test]
    fn test_missing_output_directory_is_rejected() {
        let result = PlaylistArgs::try_parse_from([
            "playlist_downloader",
            "https://www.youtube.com/playlist?list=xyz",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_bad_resolution_is_rejected() {
        let result = SingleVideoArgs::try_parse_from([
            "single_video_downloader",
            "https://www.youtube.com/watch?v=abc",
            "/tmp/videos",
            "999p",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_yes_flag() {
        let args = PlaylistArgs::try_parse_from([
            "playlist_downloader",
            "https://www.youtube.com/playlist?list=xyz",
            "/tmp/videos",
            "-y",
        ])
        .unwrap();
        assert!(args.common.yes);
    }

    #[test]
    fn test_tilde_is_expanded_in_request() {
        let args = SingleVideoArgs::try_parse_from([
            "single_video_downloader",
            "https://www.youtube.com/watch?v=abc",
            "~/Downloads/videos",
        ])
        .unwrap();

        let request = args.to_request().unwrap();
        if let Some(home) = dirs::home_dir() {
            assert_eq!(request.output_dir, home.join("Downloads/videos"));
        }
        assert!(!request.output_dir.to_string_lossy().contains('~'));
    }
}
