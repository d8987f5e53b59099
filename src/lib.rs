pub mod clipboard;
pub mod config;
pub mod controller;
pub mod error;
pub mod invidious;
pub mod output;
pub mod session;
pub mod shell;

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

pub use error::{Error, Result};

/// Instance used until the directory has been fetched
pub const DEFAULT_INSTANCE: &str = "invidious.einfachzocken.eu";

static BARE_ID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[-_a-zA-Z0-9]{11}$").unwrap());

static URL_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^.*(youtu\.be/|v/|u/\w+/|embed/|\?v=|&v=)([^#&?]*).*").unwrap());

/// One deployment of the Invidious API, identified by hostname
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Instance(String);

impl Instance {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Instance(name.trim().trim_end_matches('/').to_string())
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    /// Origin that request paths are appended to. Bare hostnames are reached over https.
    pub fn origin(&self) -> String {
        if self.0.contains("://") {
            self.0.clone()
        } else {
            format!("https://{}", self.0)
        }
    }
}

impl Default for Instance {
    fn default() -> Self {
        Instance::new(DEFAULT_INSTANCE)
    }
}

impl std::fmt::Display for Instance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An 11-character YouTube video ID
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VideoId(String);

impl VideoId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for VideoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A subtitle track offered by an instance for one video
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionTrack {
    pub label: String,
    pub language_code: String,
    /// Path relative to the instance origin
    pub url: String,
}

/// How a fetched caption document is displayed and saved
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CaptionFormat {
    /// Plain text with cue timings stripped
    #[default]
    Txt,
    /// Raw WebVTT markup
    Vtt,
}

impl CaptionFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            CaptionFormat::Txt => "txt",
            CaptionFormat::Vtt => "vtt",
        }
    }
}

impl std::fmt::Display for CaptionFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

impl std::str::FromStr for CaptionFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "txt" | "text" => Ok(CaptionFormat::Txt),
            "vtt" => Ok(CaptionFormat::Vtt),
            other => Err(format!("unknown format: {other} (expected txt or vtt)")),
        }
    }
}

/// Extract video ID from a bare ID or one of the common YouTube URL shapes
pub fn extract_video_id(input: &str) -> Option<VideoId> {
    let input = input.trim();

    if BARE_ID.is_match(input) {
        return Some(VideoId(input.to_string()));
    }

    let caps = URL_ID.captures(input)?;
    let id = caps.get(2)?.as_str();
    if id.len() == 11 {
        Some(VideoId(id.to_string()))
    } else {
        None
    }
}
