use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use reqwest::Url;
use thiserror::Error;

use super::model::{FeatureCollection, RawFeature};

// ---------------------------------------------------------------------------
// Feed sources and errors
// ---------------------------------------------------------------------------

/// Where the feature feed comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedSource {
    /// Static JSON file on disk.
    Path(PathBuf),
    /// ArcGIS-style feature layer `query` endpoint.
    ArcGis(String),
}

impl fmt::Display for FeedSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedSource::Path(path) => write!(f, "{}", path.display()),
            FeedSource::ArcGis(url) => write!(f, "{url}"),
        }
    }
}

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("reading feed file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid feed URL {url}: {message}")]
    InvalidUrl { url: String, message: String },
    #[error("fetching feed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("feed request to {url} returned HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("parsing feed JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("feed loader stopped without a result")]
    Disconnected,
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Parse a feed document (`{ "features": [...] }`).
pub fn parse_feed(text: &str) -> Result<Vec<RawFeature>, FeedError> {
    let doc: FeatureCollection = serde_json::from_str(text)?;
    Ok(doc.features)
}

/// Read and parse the feed, blocking the calling thread.
pub fn read_feed(source: &FeedSource) -> Result<Vec<RawFeature>, FeedError> {
    match source {
        FeedSource::Path(path) => read_file(path),
        FeedSource::ArcGis(url) => fetch_arcgis(url),
    }
}

fn read_file(path: &Path) -> Result<Vec<RawFeature>, FeedError> {
    let text = std::fs::read_to_string(path).map_err(|source| FeedError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_feed(&text)
}

/// Query URL returning every feature with all attributes as Esri JSON.
/// Parameters already present on `base` win.
pub fn arcgis_query_url(base: &str) -> Result<Url, FeedError> {
    let mut url = Url::parse(base).map_err(|e| FeedError::InvalidUrl {
        url: base.to_string(),
        message: e.to_string(),
    })?;
    let defaults = [("where", "1=1"), ("outFields", "*"), ("f", "json")];
    let missing: Vec<(&str, &str)> = defaults
        .into_iter()
        .filter(|(key, _)| !url.query_pairs().any(|(k, _)| k == *key))
        .collect();
    if !missing.is_empty() {
        url.query_pairs_mut().extend_pairs(missing);
    }
    Ok(url)
}

fn fetch_arcgis(base: &str) -> Result<Vec<RawFeature>, FeedError> {
    let url = arcgis_query_url(base)?;
    log::debug!("GET {url}");
    let response = reqwest::blocking::get(url.clone())?;
    let status = response.status();
    if !status.is_success() {
        return Err(FeedError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }
    let text = response.text()?;
    parse_feed(&text)
}

// ---------------------------------------------------------------------------
// Background fetch
// ---------------------------------------------------------------------------

/// A feed load running on its own thread.
pub struct FeedFetch {
    rx: Receiver<Result<Vec<RawFeature>, FeedError>>,
}

impl FeedFetch {
    /// Start loading `source`. `notify` runs on the worker once the result is sent.
    pub fn spawn<F>(source: FeedSource, notify: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let result = read_feed(&source);
            // The receiver is gone when the session was replaced; nothing to do.
            let _ = tx.send(result);
            notify();
        });
        Self { rx }
    }

    /// Non-blocking check for the result.
    pub fn poll(&self) -> Option<Result<Vec<RawFeature>, FeedError>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(FeedError::Disconnected)),
        }
    }
}
