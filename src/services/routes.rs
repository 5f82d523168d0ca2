// src/services/routes.rs

//! Route source: which locales and fixed routes to export.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::error::{AppError, Result};
use crate::models::{Config, Locale, RouteManifest};

/// Supplies the ordered locales and fixed routes of an export run.
#[async_trait]
pub trait RouteSource: Send + Sync {
    async fn load(&self) -> Result<RouteManifest>;
}

/// An in-memory manifest is its own source.
#[async_trait]
impl RouteSource for RouteManifest {
    async fn load(&self) -> Result<RouteManifest> {
        self.clone().normalize()
    }
}

/// Reads `{ "cultures": [...], "paths": [...] }` from a JSON file.
///
/// A missing file is not an error: the run falls back to one locale and
/// the root route.
pub struct ManifestRouteSource {
    path: PathBuf,
    fallback: Locale,
}

impl ManifestRouteSource {
    pub fn new(path: impl Into<PathBuf>, fallback: Locale) -> Self {
        Self {
            path: path.into(),
            fallback,
        }
    }

    /// Manifest path from the config. The fallback locale is the
    /// default-locale override when one is set, so the redirect target
    /// is always exported.
    pub fn from_config(config: &Config) -> Result<Self> {
        let fallback = config
            .export
            .default_locale
            .as_deref()
            .unwrap_or(&config.export.fallback_locale);
        Ok(Self::new(config.manifest_path(), Locale::parse(fallback)?))
    }
}

#[async_trait]
impl RouteSource for ManifestRouteSource {
    async fn load(&self) -> Result<RouteManifest> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!(
                    "No route manifest at {}; exporting '/' for {} only",
                    self.path.display(),
                    self.fallback
                );
                return Ok(RouteManifest::fallback(self.fallback.clone()));
            }
            Err(e) => return Err(AppError::Io(e)),
        };

        let manifest: RouteManifest = serde_json::from_slice(&bytes)?;
        let manifest = manifest.normalize()?;
        log::info!(
            "Loaded manifest {}: {} culture(s), {} path(s)",
            self.path.display(),
            manifest.cultures.len(),
            manifest.paths.len()
        );
        Ok(manifest)
    }
}
