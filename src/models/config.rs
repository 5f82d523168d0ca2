//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::{Locale, Route};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Dynamic server location and lifecycle
    #[serde(default)]
    pub server: ServerConfig,

    /// Export directories, locales and deployment sub-path
    #[serde(default)]
    pub export: ExportConfig,

    /// Static asset mirroring
    #[serde(default)]
    pub assets: AssetConfig,

    /// Content store used for detail routes
    #[serde(default)]
    pub content: ContentConfig,

    /// HTTP client behavior
    #[serde(default)]
    pub http: HttpConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Fold environment-provided values into the configuration.
    ///
    /// Called once at process start; nothing downstream reads the
    /// environment again.
    pub fn apply_overrides(&mut self, overrides: EnvOverrides) {
        if let Some(base_path) = overrides.base_path {
            self.export.base_path = base_path;
        }
        if let Some(locale) = overrides.default_locale {
            self.export.default_locale = Some(locale);
        }
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.server.base_url)
            .map_err(|e| AppError::validation(format!("server.base_url: {e}")))?;
        if self.server.command.as_ref().is_some_and(|c| c.is_empty()) {
            return Err(AppError::validation("server.command must not be empty"));
        }
        if self.server.ready_timeout_secs == 0 {
            return Err(AppError::validation("server.ready_timeout_secs must be > 0"));
        }
        if self.http.user_agent.trim().is_empty() {
            return Err(AppError::validation("http.user_agent is empty"));
        }
        if self.http.timeout_secs == 0 {
            return Err(AppError::validation("http.timeout_secs must be > 0"));
        }
        if self.http.max_concurrent == 0 {
            return Err(AppError::validation("http.max_concurrent must be > 0"));
        }
        Locale::parse(self.export.fallback_locale.as_str())?;
        if let Some(locale) = &self.export.default_locale {
            Locale::parse(locale.as_str())?;
        }
        let mount = self.assets.mount.trim_matches('/');
        if mount.is_empty() || mount.split('/').any(|s| s.is_empty() || s == "..") {
            return Err(AppError::validation(format!(
                "assets.mount '{}' is not a relative directory name",
                self.assets.mount
            )));
        }
        Route::parse(self.content.detail_prefix.as_str())?;
        Ok(())
    }

    /// Path of the route manifest.
    pub fn manifest_path(&self) -> PathBuf {
        self.export.content_root.join(&self.export.manifest_file)
    }

    /// Directory holding the static assets to mirror.
    pub fn asset_source(&self) -> PathBuf {
        self.export.content_root.join(&self.assets.source_dir)
    }

    /// Root of the exported tree.
    pub fn output_dir(&self) -> PathBuf {
        self.export.content_root.join(&self.export.output_dir)
    }

    /// JSON content store, if one is configured.
    pub fn store_path(&self) -> Option<PathBuf> {
        self.content
            .store_file
            .as_ref()
            .map(|file| self.export.content_root.join(file))
    }

    /// Deployment sub-path with a leading slash and no trailing slash,
    /// or the empty string.
    pub fn base_path(&self) -> String {
        normalize_base_path(&self.export.base_path)
    }
}

/// Values read from the process environment at start-up.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvOverrides {
    /// `BASE_PATH`: deployment sub-path
    pub base_path: Option<String>,
    /// `DEFAULT_CULTURE`: locale the root entry page redirects to
    pub default_locale: Option<String>,
}

impl EnvOverrides {
    /// Read overrides from the current process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read overrides through an arbitrary lookup function.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            base_path: lookup("BASE_PATH"),
            default_locale: lookup("DEFAULT_CULTURE").filter(|v| !v.trim().is_empty()),
        }
    }
}

/// Dynamic server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Base URL the server listens on
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// Command that hosts the server for the duration of the export
    #[serde(default)]
    pub command: Option<Vec<String>>,

    /// How long to wait for the server to accept connections
    #[serde(default = "defaults::ready_timeout")]
    pub ready_timeout_secs: u64,

    /// Interval between readiness probes in milliseconds
    #[serde(default = "defaults::ready_poll")]
    pub ready_poll_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::base_url(),
            command: None,
            ready_timeout_secs: defaults::ready_timeout(),
            ready_poll_ms: defaults::ready_poll(),
        }
    }
}

/// Export output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Directory the manifest and asset paths are relative to
    #[serde(default = "defaults::content_root")]
    pub content_root: PathBuf,

    /// Root of the exported tree, relative to `content_root`
    #[serde(default = "defaults::output_dir")]
    pub output_dir: PathBuf,

    /// Route manifest file name, relative to `content_root`
    #[serde(default = "defaults::manifest_file")]
    pub manifest_file: PathBuf,

    /// Locale exported when no manifest exists
    #[serde(default = "defaults::fallback_locale")]
    pub fallback_locale: String,

    /// Locale the root entry page redirects to (first manifest locale if unset)
    #[serde(default)]
    pub default_locale: Option<String>,

    /// Sub-path the exported site is served from (e.g. "/HybridWeb")
    #[serde(default)]
    pub base_path: String,

    /// Fail a page when a base path is set but nothing was rewritten
    #[serde(default)]
    pub strict_rewrite: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            content_root: defaults::content_root(),
            output_dir: defaults::output_dir(),
            manifest_file: defaults::manifest_file(),
            fallback_locale: defaults::fallback_locale(),
            default_locale: None,
            base_path: String::new(),
            strict_rewrite: false,
        }
    }
}

/// Static asset settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetConfig {
    /// Asset directory, relative to `content_root`
    #[serde(default = "defaults::asset_dir")]
    pub source_dir: PathBuf,

    /// URL mount point and destination directory name
    #[serde(default = "defaults::asset_mount")]
    pub mount: String,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            source_dir: defaults::asset_dir(),
            mount: defaults::asset_mount(),
        }
    }
}

/// Content store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentConfig {
    /// JSON file listing content items, relative to `content_root`
    #[serde(default)]
    pub store_file: Option<PathBuf>,

    /// Route prefix of detail pages; the slug is appended
    #[serde(default = "defaults::detail_prefix")]
    pub detail_prefix: String,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            store_file: None,
            detail_prefix: defaults::detail_prefix(),
        }
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Number of pages fetched at once
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            max_concurrent: defaults::max_concurrent(),
        }
    }
}

fn normalize_base_path(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() || trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

mod defaults {
    use std::path::PathBuf;

    // Server defaults
    pub fn base_url() -> String {
        "http://localhost:5055".into()
    }
    pub fn ready_timeout() -> u64 {
        30
    }
    pub fn ready_poll() -> u64 {
        200
    }

    // Export defaults
    pub fn content_root() -> PathBuf {
        PathBuf::from(".")
    }
    pub fn output_dir() -> PathBuf {
        PathBuf::from("../dist-static")
    }
    pub fn manifest_file() -> PathBuf {
        PathBuf::from("export-routes.json")
    }
    pub fn fallback_locale() -> String {
        "zh-TW".into()
    }

    // Asset defaults
    pub fn asset_dir() -> PathBuf {
        PathBuf::from("wwwroot")
    }
    pub fn asset_mount() -> String {
        "wwwroot".into()
    }

    // Content defaults
    pub fn detail_prefix() -> String {
        "/News/Detail".into()
    }

    // HTTP defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; site-exporter/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn max_concurrent() -> usize {
        1
    }
}
