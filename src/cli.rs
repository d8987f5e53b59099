use clap::Parser;
use std::path::PathBuf;

use subgrab::CaptionFormat;

#[derive(Parser)]
#[command(
    name = "subgrab",
    about = "YouTube subtitle grabber via Invidious",
    version
)]
pub struct Cli {
    /// YouTube video URL or video ID (reads from stdin if omitted)
    pub url: Option<String>,

    /// Invidious instance hostname
    #[arg(short, long)]
    pub instance: Option<String>,

    /// Caption language code to fetch
    #[arg(short, long)]
    pub lang: Option<String>,

    /// Output format: txt (plain text) or vtt (raw WebVTT)
    #[arg(short, long, value_enum)]
    pub format: Option<CaptionFormat>,

    /// Write output to file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Save as <videoId>.<format> in DIR (current directory if no DIR given)
    #[arg(short, long, num_args = 0..=1, default_missing_value = ".")]
    pub download: Option<PathBuf>,

    /// Copy the result to the clipboard
    #[arg(short, long)]
    pub copy: bool,

    /// List available caption tracks and exit
    #[arg(long)]
    pub list: bool,

    /// List usable Invidious instances and exit
    #[arg(long)]
    pub instances: bool,

    /// Start an interactive session
    #[arg(long)]
    pub interactive: bool,

    /// Show instance, track and output details
    #[arg(short, long)]
    pub verbose: bool,
}
