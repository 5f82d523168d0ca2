// src/services/content.rs

//! Content route provider: published slugs per locale.

use std::path::Path;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Config, ContentItem, Locale, published_slugs};

/// Supplies the distinct published slugs of a locale.
#[async_trait]
pub trait ContentRouteProvider: Send + Sync {
    async fn slugs_for(&self, locale: &Locale) -> Result<Vec<String>>;
}

/// Content items held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryContentStore {
    items: Vec<ContentItem>,
}

impl MemoryContentStore {
    pub fn new(items: Vec<ContentItem>) -> Self {
        Self { items }
    }
}

#[async_trait]
impl ContentRouteProvider for MemoryContentStore {
    async fn slugs_for(&self, locale: &Locale) -> Result<Vec<String>> {
        Ok(published_slugs(&self.items, locale.as_str()))
    }
}

/// Content items read from a JSON array file.
///
/// The file is read once when the store is opened; every query of the
/// run sees the same snapshot.
#[derive(Debug, Clone)]
pub struct JsonContentStore {
    inner: MemoryContentStore,
}

impl JsonContentStore {
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let items: Vec<ContentItem> = serde_json::from_slice(&bytes)?;
        log::info!("Loaded {} content item(s) from {}", items.len(), path.display());
        Ok(Self {
            inner: MemoryContentStore::new(items),
        })
    }
}

#[async_trait]
impl ContentRouteProvider for JsonContentStore {
    async fn slugs_for(&self, locale: &Locale) -> Result<Vec<String>> {
        self.inner.slugs_for(locale).await
    }
}

/// No content store configured: no detail routes.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoContent;

#[async_trait]
impl ContentRouteProvider for NoContent {
    async fn slugs_for(&self, _locale: &Locale) -> Result<Vec<String>> {
        Ok(Vec::new())
    }
}

/// Open the store named by `content.store_file`, if any.
pub async fn open_content_store(config: &Config) -> Result<Box<dyn ContentRouteProvider>> {
    match config.store_path() {
        Some(path) => Ok(Box::new(JsonContentStore::open(path).await?)),
        None => {
            log::info!("No content store configured; exporting fixed routes only");
            Ok(Box::new(NoContent))
        }
    }
}
