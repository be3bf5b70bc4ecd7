//! Price object sources.
//!
//! A source knows how to turn a calendar day into an object key and how to
//! fetch that object's raw body. Decoding happens in the loader.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use chrono::NaiveDate;
use ledger_core::error::{LedgerError, Result};
use ledger_core::keys::object_key;
use ledger_core::settings::PriceStoreConfig;
use reqwest::{Client, Url};

/// One day-keyed object store.
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Object key for `day`.
    fn key_for(&self, day: NaiveDate) -> String;

    /// Fetch the raw body stored under `key`.
    async fn fetch(&self, key: &str) -> Result<Vec<u8>>;
}

/// Build the source described by `config`.
pub fn from_config(config: &PriceStoreConfig) -> Result<Arc<dyn PriceSource>> {
    match config {
        PriceStoreConfig::Directory { root, suffix } => Ok(Arc::new(DirectorySource::new(
            root.clone(),
            suffix.clone(),
        ))),
        PriceStoreConfig::Http {
            base_url,
            token,
            suffix,
        } => Ok(Arc::new(HttpSource::try_new(
            base_url.clone(),
            token.clone(),
            suffix.clone(),
        )?)),
    }
}

// ── DirectorySource ───────────────────────────────────────────────────────────

/// Objects stored as plain files under one directory.
pub struct DirectorySource {
    root: PathBuf,
    suffix: String,
}

impl DirectorySource {
    pub fn new(root: PathBuf, suffix: String) -> Self {
        Self { root, suffix }
    }
}

#[async_trait]
impl PriceSource for DirectorySource {
    fn key_for(&self, day: NaiveDate) -> String {
        object_key(day, &self.suffix)
    }

    async fn fetch(&self, key: &str) -> Result<Vec<u8>> {
        let path = self.root.join(key);
        tokio::fs::read(&path)
            .await
            .map_err(|source| LedgerError::FileRead { path, source })
    }
}

// ── HttpSource ────────────────────────────────────────────────────────────────

/// Objects served over HTTP at `<base_url>/<key>`.
pub struct HttpSource {
    client: Client,
    base_url: Url,
    token: Option<String>,
    suffix: String,
}

impl HttpSource {
    /// Create a source rooted at `base_url`. A trailing slash is added to the
    /// base path so that keys are appended rather than replacing the last
    /// path segment.
    pub fn try_new(mut base_url: Url, token: Option<String>, suffix: String) -> Result<Self> {
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        let client = Client::builder()
            .build()
            .context("failed to build the HTTP client")?;
        Ok(Self {
            client,
            base_url,
            token,
            suffix,
        })
    }

    /// Full URL of the object stored under `key`.
    pub fn url_for(&self, key: &str) -> Result<Url> {
        Ok(self
            .base_url
            .join(key)
            .with_context(|| format!("invalid object key {key}"))?)
    }
}

#[async_trait]
impl PriceSource for HttpSource {
    fn key_for(&self, day: NaiveDate) -> String {
        object_key(day, &self.suffix)
    }

    async fn fetch(&self, key: &str) -> Result<Vec<u8>> {
        let url = self.url_for(key)?;
        let mut request = self.client.get(url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let body = request
            .send()
            .await
            .context("failed to call")?
            .error_for_status()
            .context("request failed")?
            .bytes()
            .await
            .context("failed to read the response body")?;

        Ok(body.to_vec())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
