//! HTTP access to the release catalog and archive downloads.

use crate::catalog::{CatalogChannel, Release, ReleaseCatalog};
use goswap_core::{Error, Result};
use reqwest::blocking::{Client, Response};
use std::io::{self, Read};
use std::time::Duration;
use tracing::debug;

/// Source of archive byte streams.
pub trait ArchiveFetcher {
    fn fetch(&self, url: &str) -> Result<Box<dyn Read + Send>>;
}

/// Blocking HTTP client serving both the catalog and archive downloads.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    catalog_url: String,
}

impl HttpClient {
    /// Create a client; `timeout` bounds each request including its body.
    pub fn new(catalog_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("goswap/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Network {
                message: format!("Failed to create HTTP client: {}", e),
                url: None,
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            catalog_url: catalog_url.into(),
        })
    }

    /// Catalog URL for a channel.
    pub fn catalog_url(&self, channel: CatalogChannel) -> String {
        match channel {
            CatalogChannel::Stable => self.catalog_url.clone(),
            CatalogChannel::All => {
                let separator = if self.catalog_url.contains('?') { '&' } else { '?' };
                format!("{}{}include=all", self.catalog_url, separator)
            }
        }
    }

    fn get(&self, url: &str) -> Result<Response> {
        debug!("GET {}", url);
        let response = self.client.get(url).send().map_err(|e| Error::Network {
            message: format!("Failed to fetch {}: {}", url, e),
            url: Some(url.to_string()),
            source: Some(Box::new(e)),
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::network(format!("HTTP {} for {}", status, url), url));
        }

        Ok(response)
    }
}

impl ReleaseCatalog for HttpClient {
    fn releases(&self, channel: CatalogChannel) -> Result<Vec<Release>> {
        let url = self.catalog_url(channel);
        let body = self.get(&url)?.text().map_err(|e| Error::Network {
            message: format!("Failed to read release catalog: {}", e),
            url: Some(url.clone()),
            source: Some(Box::new(e)),
        })?;

        let releases: Vec<Release> = serde_json::from_str(&body).map_err(|e| Error::Network {
            message: format!("Failed to parse release catalog: {}", e),
            url: Some(url.clone()),
            source: Some(Box::new(e)),
        })?;

        debug!("Catalog {} lists {} releases", url, releases.len());
        Ok(releases)
    }
}

impl ArchiveFetcher for HttpClient {
    fn fetch(&self, url: &str) -> Result<Box<dyn Read + Send>> {
        Ok(Box::new(self.get(url)?))
    }
}

/// An archive body that remembers the first read failure.
///
/// Extraction wraps whatever its reader returns as an archive or file error;
/// this keeps the transport failure around so it can be reported as a
/// network error instead.
pub struct NetworkStream<R> {
    inner: R,
    url: String,
    failure: Option<io::Error>,
}

impl<R: Read> NetworkStream<R> {
    pub fn new(inner: R, url: impl Into<String>) -> Self {
        Self {
            inner,
            url: url.into(),
            failure: None,
        }
    }

    /// The first read failure as [`Error::Network`], if any occurred.
    pub fn into_error(self) -> Option<Error> {
        let url = self.url;
        self.failure.map(|e| Error::Network {
            message: format!("Download of {} failed: {}", url, e),
            url: Some(url),
            source: Some(Box::new(e)),
        })
    }
}

impl<R: Read> Read for NetworkStream<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.inner.read(buf) {
            Err(e) if e.kind() != io::ErrorKind::Interrupted => {
                let reported = io::Error::new(e.kind(), e.to_string());
                if self.failure.is_none() {
                    self.failure = Some(e);
                }
                Err(reported)
            }
            other => other,
        }
    }
}

/// Join the download base URL and an archive filename.
pub fn download_url(base: &str, filename: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), filename)
}
