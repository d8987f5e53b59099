use thiserror::Error;

/// Errors surfaced by a subtitle session. The `Display` text is what the user sees.
#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid video URL")]
    InvalidVideoReference(String),

    #[error("error listing captions, check the video URL or try a different instance")]
    CatalogUnavailable(#[source] reqwest::Error),

    #[error("error fetching subtitles, try changing instance")]
    CaptionUnavailable(#[source] reqwest::Error),

    #[error("could not load the instance directory")]
    DirectoryUnavailable(#[source] reqwest::Error),

    #[error("failed to copy to clipboard: {0}")]
    ClipboardWriteFailed(String),

    #[error("no caption list yet, search for a video first")]
    NoCatalog,

    #[error("no caption track selected")]
    NoTrackSelected,

    #[error("no caption track matches {0}")]
    UnknownTrack(String),

    #[error("no subtitles fetched yet")]
    NothingToShow,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
