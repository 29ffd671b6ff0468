//! Listing data store access.
//!
//! The snapshot is read exactly once per run: one request, no retry, no
//! pagination. Both stores deliver the records in the order the store
//! keeps them (newest upload first).

use crate::models::RawListing;
use futures::future::BoxFuture;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that end a run before any listing is shown.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("data store returned HTTP {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("payload is not a list of listings: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Accepted payload shapes. Records stay untyped until [`decode_listings`]
/// converts them one by one.
#[derive(Deserialize)]
#[serde(untagged)]
enum Payload {
    Bare(Vec<serde_json::Value>),
    Wrapped { listings: Vec<serde_json::Value> },
}

/// Decode a JSON payload into listings.
///
/// Only a payload that is not a list of records is an error. A record
/// that is not a JSON object is skipped with a warning.
pub fn decode_listings(bytes: &[u8]) -> Result<Vec<RawListing>, FetchError> {
    let records = match serde_json::from_slice::<Payload>(bytes)? {
        Payload::Bare(records) => records,
        Payload::Wrapped { listings } => listings,
    };

    let total = records.len();
    let listings: Vec<RawListing> = records
        .into_iter()
        .enumerate()
        .filter_map(|(i, record)| match serde_json::from_value(record) {
            Ok(listing) => Some(listing),
            Err(e) => {
                warn!("Skipping record {}: {}", i, e);
                None
            }
        })
        .collect();

    if listings.len() < total {
        debug!("Decoded {} of {} records", listings.len(), total);
    }

    Ok(listings)
}

/// A source of listing snapshots.
pub trait ListingStore: Send + Sync {
    /// Where the snapshot comes from, for logs and report metadata.
    fn describe(&self) -> String;

    /// Read the full snapshot.
    fn fetch_all(&self) -> BoxFuture<'_, Result<Vec<RawListing>, FetchError>>;
}

/// Store reachable over HTTP(S), answering a GET with the JSON payload.
pub struct HttpStore {
    url: String,
    client: reqwest::Client,
}

impl HttpStore {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: reqwest::Client::new(),
        }
    }
}

impl ListingStore for HttpStore {
    fn describe(&self) -> String {
        self.url.clone()
    }

    fn fetch_all(&self) -> BoxFuture<'_, Result<Vec<RawListing>, FetchError>> {
        Box::pin(async move {
            info!("Fetching listings from {}", self.url);

            let request_error = |source| FetchError::Request {
                url: self.url.clone(),
                source,
            };

            let response = self
                .client
                .get(&self.url)
                .header(reqwest::header::ACCEPT, "application/json")
                .send()
                .await
                .map_err(request_error)?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(FetchError::Status { status, body });
            }

            let bytes = response.bytes().await.map_err(request_error)?;
            debug!("Received {} bytes", bytes.len());

            decode_listings(&bytes)
        })
    }
}

/// Store backed by a JSON file on disk.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ListingStore for FileStore {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn fetch_all(&self) -> BoxFuture<'_, Result<Vec<RawListing>, FetchError>> {
        Box::pin(async move {
            info!("Reading listings from {}", self.path.display());

            let bytes = tokio::fs::read(&self.path)
                .await
                .map_err(|source| FetchError::Io {
                    path: self.path.clone(),
                    source,
                })?;

            decode_listings(&bytes)
        })
    }
}

/// Pick the store for a location: HTTP(S) URLs go over the network,
/// anything else is a file path.
pub fn open_store(location: &str) -> Box<dyn ListingStore> {
    if location.starts_with("http://") || location.starts_with("https://") {
        Box::new(HttpStore::new(location))
    } else {
        Box::new(FileStore::new(location))
    }
}

/// Fetch the snapshot once, with a spinner on the terminal while waiting.
pub async fn load_snapshot(
    store: &dyn ListingStore,
    show_progress: bool,
) -> Result<Vec<RawListing>, FetchError> {
    let spinner = if show_progress {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(format!("Loading listings from {}", store.describe()));
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    } else {
        None
    };

    let result = store.fetch_all().await;

    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    if let Ok(ref listings) = result {
        info!("Loaded {} listings", listings.len());
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawPrice;
    use std::io::Write;

    #[test]
    fn test_decode_bare_and_wrapped() {
        let bare = br#"[{"id": "a", "price": 10}]"#;
        let wrapped = br#"{"listings": [{"id": "a"}, {"id": "b"}]}"#;

        let listings = decode_listings(bare).unwrap();
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].price, Some(RawPrice::Amount(10.0)));

        assert_eq!(decode_listings(wrapped).unwrap().len(), 2);
    }

    #[test]
    fn test_decode_keeps_loosely_typed_records() {
        let payload = br#"[
            {"id": "a", "name": "Cafe", "state": "Ohio", "price": "$90,000"},
            {"id": "b", "name": 42, "state": "Ohio"},
            "not a record",
            {"id": "c", "uploadedAt": [1, 2]}
        ]"#;

        let listings = decode_listings(payload).unwrap();
        let ids: Vec<&str> = listings.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(listings[1].name, None);
        assert_eq!(listings[1].region(), Some("Ohio"));
    }

    #[test]
    fn test_decode_rejects_other_shapes() {
        assert!(matches!(
            decode_listings(b"{\"items\": []}"),
            Err(FetchError::Decode(_))
        ));
        assert!(decode_listings(b"not json").is_err());
    }

    #[test]
    fn test_open_store_dispatch() {
        assert_eq!(
            open_store("https://example.com/listings.json").describe(),
            "https://example.com/listings.json"
        );
        assert_eq!(open_store("fixtures/listings.json").describe(), "fixtures/listings.json");
    }

    #[test]
    fn test_file_store_reads_snapshot() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"id": "1", "name": "Cafe"}}, {{"id": "2", "state": "Ohio"}}]"#
        )
        .unwrap();

        let store = FileStore::new(file.path());
        let listings = tokio_test::block_on(store.fetch_all()).unwrap();

        assert_eq!(listings.len(), 2);
        assert_eq!(listings[0].name(), "Cafe");
        assert_eq!(listings[1].region(), Some("Ohio"));
    }

    #[test]
    fn test_file_store_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("missing.json"));

        let err = tokio_test::block_on(store.fetch_all()).unwrap_err();
        assert!(matches!(err, FetchError::Io { .. }));
        assert!(err.to_string().contains("missing.json"));
    }

    #[test]
    fn test_load_snapshot_without_progress() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"listings": [{{"id": "1"}}]}}"#).unwrap();

        let store = open_store(&file.path().display().to_string());
        let listings = tokio_test::block_on(load_snapshot(store.as_ref(), false)).unwrap();
        assert_eq!(listings.len(), 1);
    }

    #[test]
    fn test_bundled_fixture_decodes() {
        let bytes = std::fs::read(concat!(env!("CARGO_MANIFEST_DIR"), "/fixtures/listings.json"))
            .unwrap();
        let listings = decode_listings(&bytes).unwrap();
        assert!(!listings.is_empty());
    }
}
