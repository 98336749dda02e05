//! Data models for Derpi Fetcher
//!
//! A search result travels through the pipeline as a [`SearchItem`]: the
//! record exactly as the API returned it. Workers decode the handful of
//! fields they need into an [`ImageRecord`] and keep the raw bytes for the
//! metadata sidecar.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

/// One search result, kept as the raw JSON record
#[derive(Debug, Clone)]
pub struct SearchItem {
    raw: Box<RawValue>,
}

impl SearchItem {
    pub fn from_raw(raw: Box<RawValue>) -> Self {
        Self { raw }
    }

    /// Parse a single JSON record
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        Ok(Self::from_raw(RawValue::from_string(json.to_owned())?))
    }

    /// The record bytes exactly as received
    pub fn raw_json(&self) -> &str {
        self.raw.get()
    }

    /// Decode the fields needed to download this image
    pub fn record(&self) -> Result<ImageRecord, serde_json::Error> {
        serde_json::from_str(self.raw.get())
    }
}

/// The subset of an image record used by the downloader
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecord {
    /// Image identifier
    pub id: u64,
    /// Available renditions of the image
    pub representations: Representations,
    /// Tag names, including `artist:` tags
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Representations {
    /// URL of the full-size rendition
    pub full: String,
}

/// Body of a search response
///
/// A body with `images` missing or `null` decodes as an empty page.
#[derive(Debug, Deserialize)]
pub(crate) struct SearchPage {
    #[serde(default)]
    images: Option<Vec<Box<RawValue>>>,
}

impl SearchPage {
    /// Records in response order
    pub fn into_images(self) -> Vec<Box<RawValue>> {
        self.images.unwrap_or_default()
    }
}

/// Everything a worker needs to persist one image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTask {
    /// Image identifier
    pub id: u64,
    /// Artifact URL
    pub url: String,
    /// Directory holding the artifact and its sidecar
    pub directory: PathBuf,
    /// Final artifact path, `<directory>/<id><ext>`
    pub file_path: PathBuf,
    /// Metadata sidecar path, `<directory>/<id>.json`
    pub sidecar_path: PathBuf,
}
