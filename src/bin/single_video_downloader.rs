// Download a single YouTube video.
//
//   single_video_downloader <video_url> <output_directory> [resolution]

use anyhow::Result;
use clap::Parser;

use ytgrab::cli::SingleVideoArgs;
use ytgrab::downloader::orchestrator;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let args = SingleVideoArgs::parse();
    let request = args.to_request()?;

    log::debug!(
        "single download: url={} dir={} resolution={:?}",
        request.url,
        request.output_dir.display(),
        request.resolution
    );

    orchestrator::download_single(&request, args.common.yes).await?;
    Ok(())
}
