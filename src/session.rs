//! Subtitle session state machine.
//!
//! `Session` holds everything the user sees and only changes through the
//! transitions below. Network work is handed out as request values tagged with
//! a [`Ticket`]; results come back through `complete_*`, which drop anything
//! issued before the latest search, fetch or reset.

use log::{debug, info};

use crate::error::{Error, Result};
use crate::output;
use crate::{CaptionFormat, CaptionTrack, Instance, VideoId};

/// Coarse state of a session, derived from its fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Searching,
    CatalogReady,
    Fetching,
    CaptionReady,
    Error,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Phase::Idle => "idle",
            Phase::Searching => "searching",
            Phase::CatalogReady => "catalog ready",
            Phase::Fetching => "fetching",
            Phase::CaptionReady => "caption ready",
            Phase::Error => "error",
        };
        write!(f, "{name}")
    }
}

/// Version tag of an outstanding request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

/// Catalog lookup the caller should perform
#[derive(Debug, Clone)]
pub struct CatalogRequest {
    pub ticket: Ticket,
    pub instance: Instance,
    pub video_id: VideoId,
}

/// Caption download the caller should perform
#[derive(Debug, Clone)]
pub struct CaptionRequest {
    pub ticket: Ticket,
    pub instance: Instance,
    pub path: String,
}

#[derive(Debug, Default)]
pub struct Session {
    instances: Vec<Instance>,
    instance: Instance,
    input: String,
    video_id: Option<VideoId>,
    search_loading: bool,
    get_loading: bool,
    catalog: Option<Vec<CaptionTrack>>,
    selected: Option<usize>,
    document: Option<String>,
    format: CaptionFormat,
    notice: Option<String>,
    failed: bool,
    search_version: u64,
    fetch_version: u64,
}

impl Session {
    pub fn new(instance: Instance) -> Self {
        Self {
            instances: vec![instance.clone()],
            instance,
            ..Self::default()
        }
    }

    pub fn phase(&self) -> Phase {
        if self.get_loading {
            Phase::Fetching
        } else if self.search_loading {
            Phase::Searching
        } else if self.failed {
            Phase::Error
        } else if self.document.is_some() {
            Phase::CaptionReady
        } else if self.catalog.is_some() {
            Phase::CatalogReady
        } else {
            Phase::Idle
        }
    }

    pub fn instances(&self) -> &[Instance] {
        &self.instances
    }

    pub fn instance(&self) -> &Instance {
        &self.instance
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn video_id(&self) -> Option<&VideoId> {
        self.video_id.as_ref()
    }

    pub fn is_searching(&self) -> bool {
        self.search_loading
    }

    pub fn is_fetching(&self) -> bool {
        self.get_loading
    }

    pub fn catalog(&self) -> Option<&[CaptionTrack]> {
        self.catalog.as_deref()
    }

    pub fn selected_track(&self) -> Option<&CaptionTrack> {
        let index = self.selected?;
        self.catalog.as_ref()?.get(index)
    }

    pub fn document(&self) -> Option<&str> {
        self.document.as_deref()
    }

    pub fn format(&self) -> CaptionFormat {
        self.format
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Replace the selectable instances; the current one always stays selectable
    pub fn set_instances(&mut self, mut instances: Vec<Instance>) {
        if !instances.contains(&self.instance) {
            instances.insert(0, self.instance.clone());
        }
        debug!("Instance list now has {} entries", instances.len());
        self.instances = instances;
    }

    /// Switch instance; a catalog listed under another instance is dropped
    pub fn select_instance(&mut self, instance: Instance) {
        if instance == self.instance {
            return;
        }
        info!("Instance changed: {} -> {instance}", self.instance);
        self.instance = instance;
        self.reset();
    }

    pub fn set_input(&mut self, input: impl Into<String>) {
        self.input = input.into();
    }

    pub fn search_input(&mut self, input: impl Into<String>) -> Result<CatalogRequest> {
        self.set_input(input);
        self.search()
    }

    /// Start listing captions for the current input
    pub fn search(&mut self) -> Result<CatalogRequest> {
        self.reset();

        let Some(video_id) = crate::extract_video_id(&self.input) else {
            let err = Error::InvalidVideoReference(self.input.clone());
            self.notice = Some(err.to_string());
            return Err(err);
        };

        info!("Searching captions for {video_id} on {}", self.instance);
        self.video_id = Some(video_id.clone());
        self.search_loading = true;

        Ok(CatalogRequest {
            ticket: Ticket(self.search_version),
            instance: self.instance.clone(),
            video_id,
        })
    }

    /// Apply a catalog result.
    ///
    /// Returns `Ok(false)` if the request was superseded and nothing changed. A
    /// failure is recorded as the notice and handed back.
    pub fn complete_search(&mut self, ticket: Ticket, result: Result<Vec<CaptionTrack>>) -> Result<bool> {
        if ticket != Ticket(self.search_version) {
            debug!("Dropping stale catalog response {ticket:?}");
            return Ok(false);
        }

        self.search_loading = false;
        match result {
            Ok(tracks) => {
                info!("Catalog ready with {} tracks", tracks.len());
                self.catalog = Some(tracks);
                Ok(true)
            }
            Err(err) => {
                info!("Catalog failed: {err}");
                self.notice = Some(err.to_string());
                self.failed = true;
                Err(err)
            }
        }
    }

    /// Select a track by its position in the catalog.
    ///
    /// Picking a different track drops the document of the previous one and
    /// makes a fetch still in flight for it stale.
    pub fn select_track(&mut self, index: usize) -> Result<&CaptionTrack> {
        let catalog = self.catalog_for_selection()?;
        if index >= catalog.len() {
            return Err(Error::UnknownTrack(format!("#{}", index + 1)));
        }
        if self.selected != Some(index) {
            if self.get_loading {
                debug!("Track changed while fetching, dropping fetch {}", self.fetch_version);
                self.fetch_version += 1;
                self.get_loading = false;
            }
            self.document = None;
        }
        self.selected = Some(index);
        self.selected_track().ok_or(Error::NoTrackSelected)
    }

    /// Select the first track with the given language code
    pub fn select_language(&mut self, code: &str) -> Result<&CaptionTrack> {
        let index = self
            .catalog_for_selection()?
            .iter()
            .position(|t| t.language_code == code)
            .ok_or_else(|| Error::UnknownTrack(code.to_string()))?;
        self.select_track(index)
    }

    fn catalog_for_selection(&self) -> Result<&[CaptionTrack]> {
        if self.search_loading {
            return Err(Error::NoCatalog);
        }
        self.catalog.as_deref().ok_or(Error::NoCatalog)
    }

    /// Start fetching the selected track
    pub fn fetch(&mut self) -> Result<CaptionRequest> {
        let path = self.selected_track().ok_or(Error::NoTrackSelected)?.url.clone();

        self.fetch_version += 1;
        self.get_loading = true;
        info!("Fetching caption {path} from {}", self.instance);

        Ok(CaptionRequest {
            ticket: Ticket(self.fetch_version),
            instance: self.instance.clone(),
            path,
        })
    }

    /// Apply a caption result, with the same stale rule as [`Session::complete_search`]
    pub fn complete_fetch(&mut self, ticket: Ticket, result: Result<String>) -> Result<bool> {
        if ticket != Ticket(self.fetch_version) {
            debug!("Dropping stale caption response {ticket:?}");
            return Ok(false);
        }

        self.get_loading = false;
        match result {
            Ok(document) => {
                self.document = Some(document);
                self.notice = None;
                self.failed = false;
                Ok(true)
            }
            Err(err) => {
                info!("Caption fetch failed: {err}");
                self.notice = Some(err.to_string());
                self.failed = true;
                Err(err)
            }
        }
    }

    pub fn set_format(&mut self, format: CaptionFormat) {
        debug!("Display format: {format}");
        self.format = format;
    }

    /// The fetched caption rendered in the current format
    pub fn display(&self) -> Option<String> {
        self.document.as_deref().map(|doc| output::render(doc, self.format))
    }

    pub fn download_name(&self) -> Option<String> {
        self.document.as_ref()?;
        let video_id = self.video_id.as_ref()?;
        Some(output::download_file_name(video_id, self.format))
    }

    /// Clear everything derived from the last search; outstanding requests become stale
    pub fn reset(&mut self) {
        self.video_id = None;
        self.catalog = None;
        self.selected = None;
        self.document = None;
        self.notice = None;
        self.failed = false;
        self.search_loading = false;
        self.get_loading = false;
        self.search_version += 1;
        self.fetch_version += 1;
    }

    pub fn reset_all(&mut self) {
        self.input.clear();
        self.reset();
    }
}
