// Classification of yt-dlp failures into human-readable skip reasons

/// Why a probe or download failed, as far as stderr lets us tell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    /// Video is private and requires permission from the uploader
    PrivateVideo,
    /// Video requires sign-in age verification
    AgeRestricted,
    /// Video was removed, terminated, or never existed
    VideoUnavailable,
    /// Video is blocked in the current region
    GeoBlocked,
    /// YouTube is throttling requests (HTTP 429)
    RateLimited,
    /// No format matches the requested selector
    FormatUnavailable,
    /// The URL is not something yt-dlp can handle
    UnsupportedUrl,
    /// yt-dlp itself could not be started
    ToolNotFound,
    /// The output file could not be written
    WriteFailed,
    /// Connection problems or timeouts
    NetworkTimeout,
    /// Anything we could not classify
    Unknown,
}

impl FailureReason {
    /// Short description used in skip records and summaries.
    pub fn description(&self) -> &'static str {
        match self {
            Self::PrivateVideo => "Private video",
            Self::AgeRestricted => "Age-restricted video",
            Self::VideoUnavailable => "Video unavailable",
            Self::GeoBlocked => "Video is not available in your country",
            Self::RateLimited => "Rate limited by YouTube (HTTP 429)",
            Self::FormatUnavailable => "Requested format is not available",
            Self::UnsupportedUrl => "Unsupported or invalid URL",
            Self::ToolNotFound => "yt-dlp executable not found",
            Self::WriteFailed => "Could not write the output file",
            Self::NetworkTimeout => "Network timeout",
            Self::Unknown => "Unknown error",
        }
    }
}

/// Analyze an error message and classify it.
/// Returns None only for empty input. Order matters: the most specific
/// patterns are checked first.
pub fn diagnose_error(error: &str) -> Option<FailureReason> {
    let error_lower = error.to_lowercase();

    if error_lower.trim().is_empty() {
        return None;
    }

    // Private videos
    if error_lower.contains("private video")
        || error_lower.contains("video is private")
        || error_lower.contains("sign in if you've been granted access")
    {
        return Some(FailureReason::PrivateVideo);
    }

    // Age verification
    if error_lower.contains("age-restricted")
        || error_lower.contains("age restricted")
        || error_lower.contains("sign in to confirm your age")
    {
        return Some(FailureReason::AgeRestricted);
    }

    // Removed or deleted content
    if error_lower.contains("video unavailable")
        || error_lower.contains("video is unavailable")
        || error_lower.contains("has been removed")
        || error_lower.contains("no longer available")
        || error_lower.contains("account associated with this video has been terminated")
    {
        return Some(FailureReason::VideoUnavailable);
    }

    // Region locks
    if error_lower.contains("not available in your country")
        || error_lower.contains("blocked it in your country")
        || error_lower.contains("geo restriction")
        || error_lower.contains("geo-restricted")
    {
        return Some(FailureReason::GeoBlocked);
    }

    // Throttling
    if error_lower.contains("429")
        || error_lower.contains("rate limit")
        || error_lower.contains("too many requests")
    {
        return Some(FailureReason::RateLimited);
    }

    // Selector matched nothing
    if error_lower.contains("requested format is not available")
        || error_lower.contains("no video formats found")
        || error_lower.contains("format is not available")
    {
        return Some(FailureReason::FormatUnavailable);
    }

    // Not a resolvable media URL
    if error_lower.contains("unsupported url")
        || error_lower.contains("is not a valid url")
        || error_lower.contains("invalid url")
    {
        return Some(FailureReason::UnsupportedUrl);
    }

    // Spawn failures surface as OS strings, not yt-dlp output
    if error_lower.contains("no such file or directory")
        || error_lower.contains("command not found")
        || error_lower.contains("executable not found")
    {
        return Some(FailureReason::ToolNotFound);
    }

    // Filesystem side
    if error_lower.contains("no space left")
        || error_lower.contains("permission denied")
        || error_lower.contains("read-only file system")
        || error_lower.contains("unable to open for writing")
    {
        return Some(FailureReason::WriteFailed);
    }

    // Network layer, checked last because many messages mention timeouts
    // alongside a more specific cause
    if error_lower.contains("timed out")
        || error_lower.contains("timeout")
        || error_lower.contains("connection refused")
        || error_lower.contains("connection reset")
        || error_lower.contains("network is unreachable")
        || error_lower.contains("unable to connect")
    {
        return Some(FailureReason::NetworkTimeout);
    }

    Some(FailureReason::Unknown)
}

/// Condense raw yt-dlp stderr into a single skip reason line.
///
/// Classified failures get the canonical description. Unclassified output
/// falls back to the last `ERROR:` line yt-dlp printed, then to a trimmed
/// slice of the raw text.
pub fn error_summary(stderr: &str) -> String {
    match diagnose_error(stderr) {
        Some(FailureReason::Unknown) => {}
        Some(reason) => return reason.description().to_string(),
        None => return "Unknown error".to_string(),
    }

    if let Some(line) = last_error_line(stderr) {
        return line;
    }

    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        return "Unknown error".to_string();
    }
    let mut summary: String = trimmed.chars().take(200).collect();
    if trimmed.chars().count() > 200 {
        summary.push_str("...");
    }
    summary
}

/// Last `ERROR:` line in stderr, with the prefix stripped.
fn last_error_line(stderr: &str) -> Option<String> {
    stderr
        .lines()
        .rev()
        .map(str::trim)
        .find(|line| line.starts_with("ERROR:"))
        .map(|line| line.trim_start_matches("ERROR:").trim().to_string())
        .filter(|line| !line.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_private_video_detection() {
        let error = "ERROR: [youtube] abc123: Private video. Sign in if you've been granted access to this video";
        assert_eq!(diagnose_error(error), Some(FailureReason::PrivateVideo));
    }

    #[test]
    fn test_age_restriction_detection() {
        let error = "ERROR: [youtube] xyz789: Sign in to confirm your age. This video may be inappropriate for some users.";
        assert_eq!(diagnose_error(error), Some(FailureReason::AgeRestricted));
    }

    #[test]
    fn test_unavailable_detection() {
        let error = "ERROR: [youtube] qqq111: Video unavailable. This video has been removed by the uploader";
        assert_eq!(diagnose_error(error), Some(FailureReason::VideoUnavailable));
    }

    #[test]
    fn test_geo_block_detection() {
        let error = "ERROR: [youtube] aaa222: Video unavailable. The uploader has not made this video available in your country";
        // Unavailable is checked first; the generic phrase wins here
        assert_eq!(diagnose_error(error), Some(FailureReason::VideoUnavailable));

        let error = "ERROR: The uploader has not made this video available in your country";
        assert_eq!(diagnose_error(error), Some(FailureReason::GeoBlocked));
    }

    #[test]
    fn test_rate_limit_detection() {
        let error = "ERROR: unable to download video data: HTTP Error 429: Too Many Requests";
        assert_eq!(diagnose_error(error), Some(FailureReason::RateLimited));
    }

    #[test]
    fn test_format_unavailable_detection() {
        let error = "ERROR: [youtube] abc123: Requested format is not available. Use --list-formats for a list of available formats";
        assert_eq!(diagnose_error(error), Some(FailureReason::FormatUnavailable));
    }

    #[test]
    fn test_unsupported_url_detection() {
        let error = "ERROR: Unsupported URL: https://example.com/not-a-video";
        assert_eq!(diagnose_error(error), Some(FailureReason::UnsupportedUrl));
    }

    #[test]
    fn test_tool_not_found_detection() {
        let error = "Failed to start yt-dlp: No such file or directory (os error 2)";
        assert_eq!(diagnose_error(error), Some(FailureReason::ToolNotFound));
    }

    #[test]
    fn test_write_failure_detection() {
        let error = "ERROR: unable to open for writing: [Errno 28] No space left on device";
        assert_eq!(diagnose_error(error), Some(FailureReason::WriteFailed));
    }

    #[test]
    fn test_timeout_detection() {
        let error = "ERROR: Unable to download API page: The read operation timed out";
        assert_eq!(diagnose_error(error), Some(FailureReason::NetworkTimeout));
    }

    #[test]
    fn test_unknown_error() {
        let error = "Some completely unexpected error message";
        assert_eq!(diagnose_error(error), Some(FailureReason::Unknown));
    }

    #[test]
    fn test_empty_error() {
        assert_eq!(diagnose_error(""), None);
        assert_eq!(diagnose_error("   \n  "), None);
    }

    #[test]
    fn test_summary_uses_description_for_classified_errors() {
        let stderr = "WARNING: something minor\nERROR: [youtube] abc: Private video";
        assert_eq!(error_summary(stderr), "Private video");
    }

    #[test]
    fn test_summary_falls_back_to_last_error_line() {
        let stderr = "WARNING: first thing\nERROR: something odd happened\nERROR: a second odd thing";
        assert_eq!(error_summary(stderr), "a second odd thing");
    }

    #[test]
    fn test_summary_truncates_raw_output() {
        let stderr = "x".repeat(300);
        let summary = error_summary(&stderr);
        assert!(summary.ends_with("..."));
        assert_eq!(summary.chars().count(), 203);
    }

    #[test]
    fn test_summary_of_empty_stderr() {
        assert_eq!(error_summary(""), "Unknown error");
    }

    #[test]
    fn test_descriptions_are_nonempty() {
        let reasons = [
            FailureReason::PrivateVideo,
            FailureReason::AgeRestricted,
            FailureReason::VideoUnavailable,
            FailureReason::GeoBlocked,
            FailureReason::RateLimited,
            FailureReason::FormatUnavailable,
            FailureReason::UnsupportedUrl,
            FailureReason::ToolNotFound,
            FailureReason::WriteFailed,
            FailureReason::NetworkTimeout,
            FailureReason::Unknown,
        ];
        for reason in reasons {
            assert!(!reason.description().is_empty());
        }
    }
}
