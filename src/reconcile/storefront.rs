//! Storefront fetch collaborator used to fill missing catalog fields.
//!
//! Rate limited to 2 requests per second to stay polite with the
//! upstream store.

use anyhow::Result;
use reqwest::blocking::Client;
use serde::Deserialize;
use std::sync::Mutex;
use std::time::{Duration, Instant};

const RATE_LIMIT_INTERVAL: Duration = Duration::from_millis(500); // 2 req/sec

/// Catalog fields returned by the storefront for one item. Any subset may
/// be absent; the merge only splices in what came back.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FetchedFields {
    pub title: Option<String>,
    pub genres: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    pub price: Option<f64>,
    pub developer: Option<String>,
    /// Release date string in whatever shape the store page had.
    pub release_date: Option<String>,
}

/// The external fetch collaborator, injectable so reconciliation tests
/// run against a deterministic stub.
#[cfg_attr(test, mockall::automock)]
pub trait StorefrontFetcher: Send + Sync {
    /// Fetch catalog fields for the lookup URL derived for one item.
    fn fetch(&self, url: &str) -> Result<FetchedFields>;
}

/// HTTP implementation of the fetch collaborator. The configured base URL
/// points at the scraping service that resolves a store page into a
/// [`FetchedFields`] JSON document.
pub struct HttpStorefrontFetcher {
    client: Client,
    last_request: Mutex<Instant>,
}

impl HttpStorefrontFetcher {
    pub fn new(timeout_sec: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_sec))
            .build()?;

        Ok(Self {
            client,
            last_request: Mutex::new(Instant::now() - RATE_LIMIT_INTERVAL),
        })
    }

    fn rate_limit(&self) {
        let mut last = self.last_request.lock().unwrap();
        let elapsed = last.elapsed();
        if elapsed < RATE_LIMIT_INTERVAL {
            std::thread::sleep(RATE_LIMIT_INTERVAL - elapsed);
        }
        *last = Instant::now();
    }
}

impl StorefrontFetcher for HttpStorefrontFetcher {
    fn fetch(&self, url: &str) -> Result<FetchedFields> {
        self.rate_limit();

        let response = self.client.get(url).send()?;
        if !response.status().is_success() {
            anyhow::bail!("storefront request failed with status {}", response.status());
        }

        let fields: FetchedFields = response.json()?;
        Ok(fields)
    }
}

/// Fetcher used when reconciliation fetches are disabled. Every fetch
/// returns an empty field set, so incomplete rows stay incomplete.
pub struct NullStorefrontFetcher;

impl StorefrontFetcher for NullStorefrontFetcher {
    fn fetch(&self, _url: &str) -> Result<FetchedFields> {
        Ok(FetchedFields::default())
    }
}
