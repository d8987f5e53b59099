use std::path::{Path, PathBuf};

use copypasta::ClipboardProvider;
use log::{debug, info, warn};

use crate::error::{Error, Result};
use crate::invidious::InvidiousClient;
use crate::session::Session;
use crate::{CaptionTrack, Instance, clipboard};

/// Drives a [`Session`] against an Invidious client, one request at a time
pub struct Controller {
    client: InvidiousClient,
    session: Session,
    /// Clipboard used by `copy`; the system clipboard is opened on demand when unset
    clipboard: Option<Box<dyn ClipboardProvider>>,
}

impl Controller {
    pub fn new(client: InvidiousClient, instance: Instance) -> Self {
        Self {
            client,
            session: Session::new(instance),
            clipboard: None,
        }
    }

    pub fn with_clipboard(mut self, clipboard: Box<dyn ClipboardProvider>) -> Self {
        self.clipboard = Some(clipboard);
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    /// Refresh the selectable instances; on failure the current list is kept
    pub async fn load_instances(&mut self) -> &[Instance] {
        match self.client.list_instances().await {
            Ok(instances) if !instances.is_empty() => self.session.set_instances(instances),
            Ok(_) => warn!("Instance directory listed no usable instances"),
            Err(e) => warn!("Keeping current instance list: {e} ({e:?})"),
        }
        self.session.instances()
    }

    /// Look up the caption tracks for a video URL or ID on the current instance
    pub async fn search(&mut self, input: &str) -> Result<&[CaptionTrack]> {
        let req = self.session.search_input(input)?;
        let result = self.client.list_captions(&req.instance, &req.video_id).await;
        if !self.session.complete_search(req.ticket, result)? {
            debug!("Catalog for {} superseded", req.video_id);
        }
        self.session.catalog().ok_or(Error::NoCatalog)
    }

    /// Fetch the selected track; returns the rendered caption
    pub async fn fetch(&mut self) -> Result<String> {
        let req = self.session.fetch()?;
        let result = self.client.fetch_caption(&req.instance, &req.path).await;
        if !self.session.complete_fetch(req.ticket, result)? {
            debug!("Caption {} superseded", req.path);
        }
        self.session.display().ok_or(Error::NothingToShow)
    }

    /// Copy the rendered caption to the clipboard
    pub fn copy(&mut self) -> Result<()> {
        let text = self.session.display().ok_or(Error::NothingToShow)?;
        match self.clipboard.as_deref_mut() {
            Some(provider) => clipboard::copy_with(provider, &text)?,
            None => clipboard::copy(&text)?,
        }
        info!("Copied {} bytes to clipboard", text.len());
        Ok(())
    }

    /// Save the rendered caption as `<videoId>.<format>` inside `dir`
    pub fn download(&self, dir: &Path) -> Result<PathBuf> {
        let text = self.session.display().ok_or(Error::NothingToShow)?;
        let name = self.session.download_name().ok_or(Error::NothingToShow)?;
        let path = dir.join(name);
        std::fs::write(&path, text)?;
        info!("Saved caption to {}", path.display());
        Ok(path)
    }
}
