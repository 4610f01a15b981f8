// Library surface shared by the single-video and playlist binaries

pub mod cli;
pub mod downloader;
pub mod ytdlp;

pub use downloader::errors::DownloaderError;
