// Single-video and playlist download flows
//
// Both flows probe first, print what is about to happen, ask for
// confirmation, then download. The playlist flow never aborts on a
// per-entry failure; the entry becomes a skip record and the run
// continues.

use std::io::Write;
use std::path::Path;

use super::errors::DownloaderError;
use super::format_selector;
use super::models::{
    DownloadConfig, DownloadRequest, PlaylistEntry, PlaylistSummary, SkippedItem, VideoProbe,
};
use super::utils::{confirm, format_duration_minutes, format_size, timestamp_suffix};
use crate::ytdlp;

/// Download one video: probe, show the information block, confirm,
/// download. Every failure here is fatal.
pub async fn download_single(
    request: &DownloadRequest,
    assume_yes: bool,
) -> Result<(), DownloaderError> {
    let probe = ytdlp::probe_video(&request.url, request.resolution).await?;
    print_video_info(&probe);

    if !confirmed(assume_yes)? {
        println!("Download cancelled by user.");
        return Ok(());
    }

    prepare_output_dir(&request.output_dir)?;
    let config = build_config(request);

    println!("\nStarting download...");
    ytdlp::download(&request.url, &request.output_dir, &config).await?;
    println!(
        "\nDownload completed! File saved in: {}",
        request.output_dir.display()
    );
    Ok(())
}

/// Download a playlist entry by entry.
///
/// Enumeration failure is fatal. Per-entry probe and download failures
/// become `SkippedItem`s; the returned summary always covers the whole
/// playlist.
pub async fn download_playlist(
    request: &DownloadRequest,
    assume_yes: bool,
) -> Result<PlaylistSummary, DownloaderError> {
    let (playlist_title, entries) = ytdlp::enumerate_playlist(&request.url).await?;
    if entries.is_empty() {
        return Err(DownloaderError::Metadata(
            "No videos found in playlist".to_string(),
        ));
    }
    let total = entries.len();

    println!("\nAnalyzing playlist videos...");
    let mut analysis = PlaylistAnalysis::default();
    for entry in &entries {
        let outcome = ytdlp::probe_video(&entry.url, request.resolution).await;
        if outcome.is_ok() {
            print!("\rAnalyzed {}/{} videos...", entry.index, total);
            let _ = std::io::stdout().flush();
        } else if let Err(err) = &outcome {
            println!("\nSkipping video '{}': {}", entry.title, err.reason());
        }
        analysis.absorb(entry, outcome);
    }
    println!("\nPlaylist analysis completed.");

    print_playlist_info(&playlist_title, &analysis);

    if !confirmed(assume_yes)? {
        println!("Download cancelled by user.");
        return Ok(PlaylistSummary {
            total,
            succeeded: 0,
            skipped: analysis.skipped,
        });
    }

    prepare_output_dir(&request.output_dir)?;
    let config = build_config(request);

    println!("\nStarting download...");
    let mut succeeded = 0usize;
    let mut skipped = analysis.skipped;
    for (entry, _) in &analysis.analyzed {
        println!("\n[{}/{}] {}", entry.index, total, entry.title);
        let outcome = ytdlp::download(&entry.url, &request.output_dir, &config).await;
        if let Err(err) = &outcome {
            println!("Skipping video '{}': {}", entry.title, err.reason());
        }
        absorb_download_outcome(entry, outcome, &mut succeeded, &mut skipped);
    }

    println!(
        "\nDownload completed! Files saved in: {}",
        request.output_dir.display()
    );
    let summary = PlaylistSummary {
        total,
        succeeded,
        skipped,
    };
    print_summary(&summary);
    Ok(summary)
}

/// Accumulated state of the analysis pass.
#[derive(Debug, Default)]
struct PlaylistAnalysis {
    analyzed: Vec<(PlaylistEntry, VideoProbe)>,
    skipped: Vec<SkippedItem>,
    total_duration_seconds: f64,
    total_size: u64,
    any_size_known: bool,
}

impl PlaylistAnalysis {
    /// Fold one probe outcome in. A failure never stops the pass, it
    /// only grows the skip list.
    fn absorb(&mut self, entry: &PlaylistEntry, outcome: Result<VideoProbe, DownloaderError>) {
        match outcome {
            Ok(probe) => {
                self.total_duration_seconds += probe.duration_seconds;
                if let Some(size) = probe.estimated_size {
                    self.total_size += size;
                    self.any_size_known = true;
                }
                self.analyzed.push((entry.clone(), probe));
            }
            Err(err) => {
                self.skipped.push(SkippedItem {
                    entry: entry.clone(),
                    reason: err.reason().to_string(),
                });
            }
        }
    }
}

/// Fold one download outcome into the running totals.
fn absorb_download_outcome(
    entry: &PlaylistEntry,
    outcome: Result<(), DownloaderError>,
    succeeded: &mut usize,
    skipped: &mut Vec<SkippedItem>,
) {
    match outcome {
        Ok(()) => *succeeded += 1,
        Err(err) => {
            skipped.push(SkippedItem {
                entry: entry.clone(),
                reason: err.reason().to_string(),
            });
        }
    }
}

fn confirmed(assume_yes: bool) -> Result<bool, DownloaderError> {
    if assume_yes {
        return Ok(true);
    }
    confirm("Do you want to continue with the download?")
        .map_err(|e| DownloaderError::Usage(format!("could not read confirmation: {}", e)))
}

fn prepare_output_dir(dir: &Path) -> Result<(), DownloaderError> {
    std::fs::create_dir_all(dir)
        .map_err(|e| DownloaderError::Download(format!("could not create {}: {}", dir.display(), e)))
}

/// Per-invocation config: a timestamped output template plus the resolved
/// format selector. One timestamp covers the whole run so playlist files
/// sort together.
fn build_config(request: &DownloadRequest) -> DownloadConfig {
    DownloadConfig {
        output_template: format!("%(title)s_{}.%(ext)s", timestamp_suffix()),
        format_selector: format_selector::format_spec(request.resolution),
        quiet: false,
        no_playlist: true,
    }
}

fn print_video_info(probe: &VideoProbe) {
    println!("\nVideo Information:");
    println!("Title: {}", probe.title);
    if let Some(height) = probe.selected_height {
        println!("Selected Resolution: {}p", height);
    }
    if !probe.available_heights.is_empty() {
        let labels: Vec<String> = probe
            .available_heights
            .iter()
            .map(|h| format!("{}p", h))
            .collect();
        println!("Available Resolutions: {}", labels.join(", "));
    }
    println!(
        "Duration: {}",
        format_duration_minutes(probe.duration_seconds)
    );
    match probe.estimated_size {
        Some(size) => println!("Estimated size: {}", format_size(size)),
        None => println!("Estimated size: Unknown"),
    }
}

fn print_playlist_info(title: &str, analysis: &PlaylistAnalysis) {
    println!("\nPlaylist Information:");
    println!("Title: {}", title);
    println!("Available videos: {}", analysis.analyzed.len());
    println!("Skipped videos: {}", analysis.skipped.len());
    println!(
        "Total duration: {}",
        format_duration_minutes(analysis.total_duration_seconds)
    );
    if analysis.any_size_known {
        println!("Estimated total size: {}", format_size(analysis.total_size));
    } else {
        println!("Estimated total size: Unknown");
    }
    if !analysis.skipped.is_empty() {
        println!("\nSkipped Videos:");
        for item in &analysis.skipped {
            println!("- {}: {}", item.entry.title, item.reason);
        }
    }
}

fn print_summary(summary: &PlaylistSummary) {
    println!("\nPlaylist download summary:");
    println!("Total videos: {}", summary.total);
    println!("Downloaded: {}", summary.succeeded);
    println!("Skipped: {}", summary.skipped.len());
    if !summary.skipped.is_empty() {
        println!("\nSkipped Videos:");
        for item in &summary.skipped {
            println!("- {}: {}", item.entry.title, item.reason);
        }
    }
}
