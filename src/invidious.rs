use log::debug;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::{CaptionTrack, Instance, VideoId};

/// Public directory of Invidious instances
pub const DIRECTORY_URL: &str = "https://api.invidious.io/instances.json";

const USER_AGENT: &str = concat!("subgrab/", env!("CARGO_PKG_VERSION"));

/// Transport an instance is reachable over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstanceType {
    Https,
    I2p,
    Onion,
    #[serde(other)]
    Other,
}

/// Per-instance properties listed in the directory
#[derive(Debug, Clone, Deserialize)]
pub struct InstanceProperties {
    #[serde(rename = "type")]
    pub kind: InstanceType,
    #[serde(default)]
    pub cors: Option<bool>,
    #[serde(default)]
    pub api: Option<bool>,
}

impl InstanceProperties {
    /// Usable from a client: https, CORS enabled, API enabled
    pub fn is_acceptable(&self) -> bool {
        self.kind == InstanceType::Https && self.cors == Some(true) && self.api == Some(true)
    }
}

pub type DirectoryEntry = (String, InstanceProperties);

#[derive(Debug, Deserialize)]
struct CaptionsResponse {
    captions: Vec<CaptionTrack>,
}

/// Keep only the directory entries a client can talk to, in directory order
pub fn filter_instances(entries: Vec<DirectoryEntry>) -> Vec<Instance> {
    entries
        .into_iter()
        .filter(|(_, props)| props.is_acceptable())
        .map(|(name, _)| Instance::new(name))
        .collect()
}

/// Client for the Invidious directory and captions endpoints
#[derive(Debug, Clone)]
pub struct InvidiousClient {
    http: reqwest::Client,
    directory_url: String,
}

impl Default for InvidiousClient {
    fn default() -> Self {
        Self::new(DIRECTORY_URL)
    }
}

impl InvidiousClient {
    pub fn new(directory_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), directory_url)
    }

    pub fn with_client(http: reqwest::Client, directory_url: impl Into<String>) -> Self {
        Self {
            http,
            directory_url: directory_url.into(),
        }
    }

    pub fn directory_url(&self) -> &str {
        &self.directory_url
    }

    /// Fetch the instance directory and keep the usable instances
    pub async fn list_instances(&self) -> Result<Vec<Instance>> {
        debug!("Fetching instance directory: {}", self.directory_url);

        let entries: Vec<DirectoryEntry> = self
            .get(&self.directory_url)
            .await
            .and_then(|resp| resp.error_for_status())
            .map_err(Error::DirectoryUnavailable)?
            .json()
            .await
            .map_err(Error::DirectoryUnavailable)?;

        let total = entries.len();
        let instances = filter_instances(entries);
        debug!("Directory listed {total} instances, {} usable", instances.len());
        Ok(instances)
    }

    /// List the caption tracks an instance offers for a video
    pub async fn list_captions(&self, instance: &Instance, video_id: &VideoId) -> Result<Vec<CaptionTrack>> {
        let url = format!("{}/api/v1/captions/{video_id}", instance.origin());
        debug!("Listing captions: {url}");

        let resp: CaptionsResponse = self
            .get(&url)
            .await
            .and_then(|resp| resp.error_for_status())
            .map_err(Error::CatalogUnavailable)?
            .json()
            .await
            .map_err(Error::CatalogUnavailable)?;

        debug!("Instance {instance} offers {} caption tracks", resp.captions.len());
        Ok(resp.captions)
    }

    /// Fetch a caption document by the path a catalog entry points to
    pub async fn fetch_caption(&self, instance: &Instance, path: &str) -> Result<String> {
        let url = format!("{}{path}", instance.origin());
        debug!("Fetching caption: {url}");

        let text = self
            .get(&url)
            .await
            .and_then(|resp| resp.error_for_status())
            .map_err(Error::CaptionUnavailable)?
            .text()
            .await
            .map_err(Error::CaptionUnavailable)?;

        debug!("Fetched {} bytes of captions", text.len());
        Ok(text)
    }

    async fn get(&self, url: &str) -> reqwest::Result<reqwest::Response> {
        self.http.get(url).header("User-Agent", USER_AGENT).send().await
    }
}
