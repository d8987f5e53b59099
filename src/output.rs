use std::sync::LazyLock;

use regex::Regex;

use crate::{CaptionFormat, VideoId};

/// Number of WebVTT header lines dropped before cue parsing starts
const HEADER_LINES: usize = 3;

static CUE_TIMING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{2}:\d{2}:\d{2}\.\d{3}\s*-->\s*\d{2}:\d{2}:\d{2}\.\d{3}").unwrap());

/// Render a WebVTT document as a single line of plain text.
///
/// The first three lines are always skipped (`WEBVTT`, `Kind:`, `Language:` on
/// Invidious output), so running this twice over the same text is not a no-op.
pub fn to_plain_text(document: &str) -> String {
    document
        .split('\n')
        .skip(HEADER_LINES)
        .filter(|line| !CUE_TIMING.is_match(line))
        .map(|line| line.replace("&nbsp;", " ").trim().to_string())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Render a caption document for display in the given format
pub fn render(document: &str, format: CaptionFormat) -> String {
    match format {
        CaptionFormat::Vtt => document.to_string(),
        CaptionFormat::Txt => to_plain_text(document),
    }
}

/// File name a rendered caption is saved under
pub fn download_file_name(video_id: &VideoId, format: CaptionFormat) -> String {
    format!("{video_id}.{}", format.extension())
}
