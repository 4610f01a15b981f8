// yt-dlp subprocess layer: binary discovery, metadata probes, flat
// playlist enumeration, and the download invocation with streamed
// progress.

use std::io::Write;
use std::path::Path;
use std::process::Stdio;

use regex::Regex;
use serde::Deserialize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command as TokioCommand;

use crate::downloader::diagnostics::error_summary;
use crate::downloader::errors::DownloaderError;
use crate::downloader::format_selector::{
    available_heights, closest_height, estimate_size, Resolution,
};
use crate::downloader::models::{DownloadConfig, MediaFormat, PlaylistEntry, VideoProbe};
use crate::downloader::utils::run_output_with_timeout;

/// Socket timeout handed to yt-dlp for metadata requests.
const PROBE_SOCKET_TIMEOUT_SECS: u64 = 15;
/// Socket timeout handed to yt-dlp while downloading.
const DOWNLOAD_SOCKET_TIMEOUT_SECS: u64 = 30;
/// Wall-clock cap on a single metadata probe.
const PROBE_TIMEOUT_SECS: u64 = 90;
/// Wall-clock cap on enumerating a playlist. Flat extraction is cheap but
/// long playlists still take a few round trips.
const ENUMERATE_TIMEOUT_SECS: u64 = 180;

/// Find the yt-dlp executable in common paths.
pub fn find_ytdlp() -> String {
    let common_paths = vec![
        "/opt/homebrew/bin/yt-dlp", // Homebrew on Apple Silicon
        "/usr/local/bin/yt-dlp",    // Homebrew on Intel Mac
        "/usr/bin/yt-dlp",          // System installation
    ];

    for path in common_paths {
        if Path::new(path).exists() {
            return path.to_string();
        }
    }

    // Fall back to `which` so a user-local install still wins over a bare
    // PATH lookup at spawn time
    if let Ok(output) = std::process::Command::new("which").arg("yt-dlp").output() {
        if output.status.success() {
            if let Ok(path) = String::from_utf8(output.stdout) {
                let trimmed = path.trim();
                if !trimmed.is_empty() {
                    return trimmed.to_string();
                }
            }
        }
    }

    "yt-dlp".to_string()
}

#[derive(Debug, Deserialize)]
struct ProbeDocument {
    title: Option<String>,
    duration: Option<f64>,
    #[serde(default)]
    formats: Vec<serde_json::Value>,
}

/// Probe one video without downloading anything.
///
/// Runs `yt-dlp --dump-json` and reduces the result to the fields the
/// information block needs. The resolution only affects which height is
/// reported as selected; it never filters the probe itself.
pub async fn probe_video(
    url: &str,
    resolution: Option<Resolution>,
) -> Result<VideoProbe, DownloaderError> {
    let ytdlp = find_ytdlp();
    let args = vec![
        "--dump-json".to_string(),
        "--no-playlist".to_string(),
        "--no-warnings".to_string(),
        "--socket-timeout".to_string(),
        PROBE_SOCKET_TIMEOUT_SECS.to_string(),
        url.to_string(),
    ];

    log::debug!("[probe] {} {}", ytdlp, args.join(" "));

    let output = run_output_with_timeout(&ytdlp, args, PROBE_TIMEOUT_SECS)
        .await
        .map_err(|e| DownloaderError::Metadata(error_summary(&e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(DownloaderError::Metadata(error_summary(&stderr)));
    }

    parse_probe(&output.stdout, resolution)
}

fn parse_probe(
    stdout: &[u8],
    resolution: Option<Resolution>,
) -> Result<VideoProbe, DownloaderError> {
    let doc: ProbeDocument = serde_json::from_slice(stdout)
        .map_err(|e| DownloaderError::Metadata(format!("invalid JSON from yt-dlp: {}", e)))?;

    // Entries that do not fit the expected shape are dropped rather than
    // failing the whole probe; storyboards and some live formats omit
    // fields or report odd types
    let formats: Vec<MediaFormat> = doc
        .formats
        .into_iter()
        .filter_map(|value| serde_json::from_value(value).ok())
        .collect();

    if formats.is_empty() {
        return Err(DownloaderError::Metadata(
            "No formats available for this video".to_string(),
        ));
    }

    let heights = available_heights(&formats);
    let selected = match resolution {
        Some(res) => closest_height(&heights, res.height()),
        None => heights.last().copied(),
    };

    Ok(VideoProbe {
        title: doc.title.unwrap_or_else(|| "Unknown Title".to_string()),
        duration_seconds: doc.duration.unwrap_or(0.0),
        estimated_size: estimate_size(&formats, selected),
        selected_height: selected,
        available_heights: heights,
    })
}

#[derive(Debug, Deserialize)]
struct FlatEntry {
    id: Option<String>,
    title: Option<String>,
    url: Option<String>,
    playlist_title: Option<String>,
}

/// Enumerate a playlist without resolving the individual videos.
///
/// `yt-dlp -j --flat-playlist` prints one JSON object per entry per line.
/// Returns the playlist title and the entries in playlist order.
pub async fn enumerate_playlist(
    url: &str,
) -> Result<(String, Vec<PlaylistEntry>), DownloaderError> {
    let ytdlp = find_ytdlp();
    let args = vec![
        "-j".to_string(),
        "--flat-playlist".to_string(),
        "--no-warnings".to_string(),
        "--socket-timeout".to_string(),
        PROBE_SOCKET_TIMEOUT_SECS.to_string(),
        url.to_string(),
    ];

    log::debug!("[playlist] {} {}", ytdlp, args.join(" "));

    let output = run_output_with_timeout(&ytdlp, args, ENUMERATE_TIMEOUT_SECS)
        .await
        .map_err(|e| DownloaderError::Metadata(error_summary(&e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(DownloaderError::Metadata(error_summary(&stderr)));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    Ok(parse_flat_entries(&stdout))
}

fn parse_flat_entries(stdout: &str) -> (String, Vec<PlaylistEntry>) {
    let mut playlist_title = String::new();
    let mut entries = Vec::new();

    for line in stdout.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let flat: FlatEntry = match serde_json::from_str(line) {
            Ok(flat) => flat,
            Err(e) => {
                log::warn!("[playlist] skipping unparsable entry line: {}", e);
                continue;
            }
        };

        if playlist_title.is_empty() {
            if let Some(title) = flat.playlist_title {
                playlist_title = title;
            }
        }

        // Flat entries usually carry a direct url; fall back to building a
        // watch URL from the id
        let url = match (flat.url, flat.id) {
            (Some(url), _) if !url.is_empty() => url,
            (_, Some(id)) if !id.is_empty() => {
                format!("https://www.youtube.com/watch?v={}", id)
            }
            _ => continue,
        };

        entries.push(PlaylistEntry {
            index: entries.len() + 1,
            title: flat.title.unwrap_or_else(|| "Unknown Title".to_string()),
            url,
        });
    }

    if playlist_title.is_empty() {
        playlist_title = "Unknown Playlist".to_string();
    }
    (playlist_title, entries)
}

/// Parse a yt-dlp progress line into a status string for the single-line
/// display. Lines that carry no displayable progress return None.
///
/// Typical input:
/// `[download]  42.3% of ~ 120.53MiB at  1.24MiB/s ETA 01:32`
fn parse_ytdlp_progress(line: &str) -> Option<String> {
    lazy_static::lazy_static! {
        static ref PROGRESS_RE: Regex = Regex::new(
            r"\[download\]\s+(\d+\.?\d*)%\s+of\s+~?\s*(\d+\.?\d*\s*\w+)(?:\s+at\s+(\S+))?(?:\s+ETA\s+(\S+))?"
        ).unwrap();
        static ref DEST_RE: Regex = Regex::new(r"\[download\]\s+Destination:\s+(.+)").unwrap();
        static ref MERGE_RE: Regex = Regex::new(r"\[Merger\]\s+Merging formats").unwrap();
        static ref ALREADY_RE: Regex = Regex::new(r"has already been downloaded").unwrap();
    }

    if let Some(caps) = PROGRESS_RE.captures(line) {
        let percent = caps.get(1).map(|m| m.as_str()).unwrap_or("0");
        let size = caps.get(2).map(|m| m.as_str().trim()).unwrap_or("?");
        let mut status = format!("Progress: {}% of {}", percent, size);
        if let Some(speed) = caps.get(3) {
            status.push_str(&format!(" at {}", speed.as_str()));
        }
        if let Some(eta) = caps.get(4) {
            status.push_str(&format!(" ETA {}", eta.as_str()));
        }
        return Some(status);
    }

    if let Some(caps) = DEST_RE.captures(line) {
        let dest = caps.get(1).map(|m| m.as_str()).unwrap_or("");
        let filename = Path::new(dest)
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| dest.to_string());
        return Some(format!("Downloading: {}", filename));
    }

    if MERGE_RE.is_match(line) {
        return Some("Merging video and audio...".to_string());
    }

    if ALREADY_RE.is_match(line) {
        return Some("File already downloaded".to_string());
    }

    None
}

/// Run one download, streaming progress to stdout unless the config says
/// quiet. Progress lines are rewritten in place with a carriage return.
pub async fn download(
    url: &str,
    output_dir: &Path,
    config: &DownloadConfig,
) -> Result<(), DownloaderError> {
    let ytdlp = find_ytdlp();
    let mut args = vec![
        "-f".to_string(),
        config.format_selector.clone(),
        "-P".to_string(),
        output_dir.to_string_lossy().to_string(),
        "-o".to_string(),
        config.output_template.clone(),
        "--newline".to_string(),
        "--no-warnings".to_string(),
        "--merge-output-format".to_string(),
        "mp4".to_string(),
        "--socket-timeout".to_string(),
        DOWNLOAD_SOCKET_TIMEOUT_SECS.to_string(),
    ];
    if config.no_playlist {
        args.push("--no-playlist".to_string());
    }
    args.push(url.to_string());

    log::debug!("[download] {} {}", ytdlp, args.join(" "));

    let mut child = TokioCommand::new(&ytdlp)
        .args(&args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| {
            DownloaderError::Download(error_summary(&format!(
                "Failed to start {}: {}",
                ytdlp, e
            )))
        })?;

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| DownloaderError::Download("Failed to capture stdout".to_string()))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| DownloaderError::Download("Failed to capture stderr".to_string()))?;

    // Collect stderr on the side; it only matters if the exit status is
    // non-zero
    let stderr_task = tokio::spawn(async move {
        let mut collected = String::new();
        let mut lines = BufReader::new(stderr).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            collected.push_str(&line);
            collected.push('\n');
        }
        collected
    });

    let mut lines = BufReader::new(stdout).lines();
    let mut wrote_progress = false;
    while let Ok(Some(line)) = lines.next_line().await {
        if config.quiet {
            continue;
        }
        if let Some(status) = parse_ytdlp_progress(&line) {
            // Pad so a shorter status fully overwrites the previous one
            print!("\r{:<70}", status);
            let _ = std::io::stdout().flush();
            wrote_progress = true;
        }
    }
    if wrote_progress {
        println!();
    }

    let status = child
        .wait()
        .await
        .map_err(|e| DownloaderError::Download(format!("Process error: {}", e)))?;
    let stderr_output = stderr_task.await.unwrap_or_default();

    if status.success() {
        return Ok(());
    }
    Err(DownloaderError::Download(error_summary(&stderr_output)))
}
