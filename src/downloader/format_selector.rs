// Resolution labels and yt-dlp format selection
//
// Everything in this module is pure. Label to expression, available
// heights to expected height, probed formats to a size estimate.

use std::fmt;
use std::str::FromStr;

use super::models::MediaFormat;

/// Resolution labels accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Resolution {
    P144,
    P240,
    P360,
    P480,
    P720,
    P1080,
}

impl Resolution {
    pub const ALL: [Resolution; 6] = [
        Resolution::P144,
        Resolution::P240,
        Resolution::P360,
        Resolution::P480,
        Resolution::P720,
        Resolution::P1080,
    ];

    /// Frame height in pixels.
    pub fn height(self) -> u32 {
        match self {
            Self::P144 => 144,
            Self::P240 => 240,
            Self::P360 => 360,
            Self::P480 => 480,
            Self::P720 => 720,
            Self::P1080 => 1080,
        }
    }

    /// Label as written on the command line, e.g. "720p".
    pub fn label(self) -> &'static str {
        match self {
            Self::P144 => "144p",
            Self::P240 => "240p",
            Self::P360 => "360p",
            Self::P480 => "480p",
            Self::P720 => "720p",
            Self::P1080 => "1080p",
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Resolution {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "144p" => Ok(Self::P144),
            "240p" => Ok(Self::P240),
            "360p" => Ok(Self::P360),
            "480p" => Ok(Self::P480),
            "720p" => Ok(Self::P720),
            "1080p" => Ok(Self::P1080),
            other => Err(format!(
                "unknown resolution '{}' (expected one of: 1080p, 720p, 480p, 360p, 240p, 144p)",
                other
            )),
        }
    }
}

/// Build the yt-dlp `-f` expression for an optional resolution label.
///
/// With a label of height H the expression prefers the exact-height video
/// stream paired with the best audio stream, then the best combined stream
/// at or below H, then the best available overall. Without a label it asks
/// for the best available outright.
pub fn format_spec(resolution: Option<Resolution>) -> String {
    match resolution {
        Some(res) => {
            let h = res.height();
            format!("bv*[height={}]+ba/b[height<={}]/bv*+ba/best", h, h)
        }
        None => "bv*+ba/best".to_string(),
    }
}

/// Height a download is expected to land on: the largest available height
/// at or below the target, else the smallest available one.
pub fn closest_height(available: &[u32], target: u32) -> Option<u32> {
    let mut heights = available.to_vec();
    heights.sort_unstable();
    heights
        .iter()
        .rev()
        .find(|&&h| h <= target)
        .copied()
        .or_else(|| heights.first().copied())
}

/// Distinct heights offered by the probed formats, ascending.
pub fn available_heights(formats: &[MediaFormat]) -> Vec<u32> {
    let mut heights: Vec<u32> = formats
        .iter()
        .filter(|f| f.has_video())
        .filter_map(|f| f.height)
        .filter(|&h| h > 0)
        .collect();
    heights.sort_unstable();
    heights.dedup();
    heights
}

/// Estimated download size at the selected height: the largest video
/// stream at that height plus the largest audio-only stream. None when
/// the probe reports no usable sizes.
pub fn estimate_size(formats: &[MediaFormat], selected_height: Option<u32>) -> Option<u64> {
    let video_size = selected_height.and_then(|h| {
        formats
            .iter()
            .filter(|f| f.has_video() && f.height == Some(h))
            .filter_map(|f| f.effective_size())
            .max()
    });
    let audio_size = formats
        .iter()
        .filter(|f| f.is_audio_only())
        .filter_map(|f| f.effective_size())
        .max();

    match (video_size, audio_size) {
        (None, None) => None,
        (video, audio) => Some(video.unwrap_or(0) + audio.unwrap_or(0)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_video_format(id: &str, height: u32, size: Option<u64>) -> MediaFormat {
        MediaFormat {
            format_id: id.to_string(),
            ext: "mp4".to_string(),
            height: Some(height),
            vcodec: Some("avc1.640028".to_string()),
            acodec: Some("none".to_string()),
            filesize: size,
            filesize_approx: None,
        }
    }

    fn make_audio_format(id: &str, size: Option<u64>) -> MediaFormat {
        MediaFormat {
            format_id: id.to_string(),
            ext: "m4a".to_string(),
            height: None,
            vcodec: Some("none".to_string()),
            acodec: Some("mp4a.40.2".to_string()),
            filesize: size,
            filesize_approx: None,
        }
    }

    #[test]
    fn test_format_spec_for_every_label() {
        for res in Resolution::ALL {
            let spec = format_spec(Some(res));
            assert!(!spec.is_empty());
            assert!(spec.contains(&format!("height={}", res.height())));
            assert!(spec.ends_with("/bv*+ba/best"));
        }
    }

    #[test]
    fn test_format_spec_without_label_is_best() {
        assert_eq!(format_spec(None), "bv*+ba/best");
    }

    #[test]
    fn test_format_spec_720_is_deterministic() {
        let spec = format_spec(Some(Resolution::P720));
        assert_eq!(spec, "bv*[height=720]+ba/b[height<=720]/bv*+ba/best");
        assert_eq!(spec, format_spec(Some(Resolution::P720)));
    }

    #[test]
    fn test_resolution_label_round_trip() {
        for res in Resolution::ALL {
            assert_eq!(res.label().parse::<Resolution>(), Ok(res));
        }
    }

    #[test]
    fn test_resolution_rejects_unknown_labels() {
        assert!("999p".parse::<Resolution>().is_err());
        assert!("720".parse::<Resolution>().is_err());
        assert!("best".parse::<Resolution>().is_err());
        assert!("".parse::<Resolution>().is_err());
    }

    #[test]
    fn test_closest_height_exact_match() {
        assert_eq!(closest_height(&[360, 720, 1080], 720), Some(720));
    }

    #[test]
    fn test_closest_height_rounds_down() {
        assert_eq!(closest_height(&[360, 480, 1080], 720), Some(480));
    }

    #[test]
    fn test_closest_height_below_everything_takes_smallest() {
        assert_eq!(closest_height(&[360, 480], 144), Some(360));
    }

    #[test]
    fn test_closest_height_of_nothing() {
        assert_eq!(closest_height(&[], 720), None);
    }

    #[test]
    fn test_available_heights_sorted_and_deduped() {
        let formats = vec![
            make_video_format("137", 1080, None),
            make_video_format("136", 720, None),
            make_video_format("298", 720, None),
            make_audio_format("140", None),
        ];
        assert_eq!(available_heights(&formats), vec![720, 1080]);
    }

    #[test]
    fn test_estimate_size_adds_video_and_audio() {
        let formats = vec![
            make_video_format("136", 720, Some(50_000_000)),
            make_video_format("298", 720, Some(80_000_000)),
            make_video_format("137", 1080, Some(120_000_000)),
            make_audio_format("140", Some(5_000_000)),
        ];
        assert_eq!(estimate_size(&formats, Some(720)), Some(85_000_000));
    }

    #[test]
    fn test_estimate_size_with_audio_only_sizes() {
        let formats = vec![
            make_video_format("136", 720, None),
            make_audio_format("140", Some(5_000_000)),
        ];
        assert_eq!(estimate_size(&formats, Some(720)), Some(5_000_000));
    }

    #[test]
    fn test_estimate_size_unknown_when_nothing_reported() {
        let formats = vec![
            make_video_format("136", 720, None),
            make_audio_format("140", None),
        ];
        assert_eq!(estimate_size(&formats, Some(720)), None);
        assert_eq!(estimate_size(&[], None), None);
    }

    #[test]
    fn test_estimate_size_prefers_approx_when_exact_missing() {
        let mut video = make_video_format("136", 720, None);
        video.filesize_approx = Some(44_000_000);
        assert_eq!(estimate_size(&[video], Some(720)), Some(44_000_000));
    }
}
