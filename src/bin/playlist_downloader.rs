// Download every video of a YouTube playlist.
//
//   playlist_downloader <playlist_url> <output_directory> [resolution]
//
// Individual entries that fail are skipped and reported; the process
// still exits zero as long as the playlist itself could be read.

use anyhow::Result;
use clap::Parser;

use ytgrab::cli::PlaylistArgs;
use ytgrab::downloader::orchestrator;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let args = PlaylistArgs::parse();
    let request = args.to_request()?;

    log::debug!(
        "playlist download: url={} dir={} resolution={:?}",
        request.url,
        request.output_dir.display(),
        request.resolution
    );

    let summary = orchestrator::download_playlist(&request, args.common.yes).await?;
    log::debug!(
        "playlist finished: {} total, {} downloaded, {} skipped",
        summary.total,
        summary.succeeded,
        summary.skipped.len()
    );
    Ok(())
}
