//! Locales, routes and the export work unit.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Opaque locale identifier such as `zh-TW`.
///
/// Locales become directory names in the export tree, so separators and
/// parent references are rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Locale(String);

impl Locale {
    pub fn parse(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(AppError::validation("locale must not be empty"));
        }
        if value.contains(['/', '\\']) || value == "." || value == ".." {
            return Err(AppError::validation(format!(
                "locale '{value}' cannot be used as a directory name"
            )));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Locale {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(value)
    }
}

impl From<Locale> for String {
    fn from(locale: Locale) -> Self {
        locale.0
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Server-relative route, always starting with `/`.
///
/// Beyond the leading slash the string is kept as written; a malformed
/// route surfaces when the server is asked for it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Route(String);

impl Route {
    pub fn parse(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        if !value.starts_with('/') {
            return Err(AppError::invalid_route(value, "must start with '/'"));
        }
        Ok(Self(value))
    }

    /// The site root.
    pub fn root() -> Self {
        Self("/".to_string())
    }

    /// Detail route for a content slug: `{prefix}/{slug}`.
    pub fn content(prefix: &Route, slug: &str) -> Self {
        Self(format!("{}/{}", prefix.0.trim_end_matches('/'), slug))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Non-empty `/`-separated segments of the whole route, query text
    /// included; `/` has none.
    pub fn segments(&self) -> Vec<&str> {
        self.0.split('/').filter(|s| !s.is_empty()).collect()
    }
}

impl TryFrom<String> for Route {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(value)
    }
}

impl From<Route> for String {
    fn from(route: Route) -> Self {
        route.0
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where a route came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteKind {
    /// Declared in the manifest
    Fixed,
    /// Derived from a published content item
    Content,
}

/// One page to fetch and write.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ExportTarget {
    pub locale: Locale,
    pub route: Route,
    pub kind: RouteKind,
}

/// Locales and fixed routes to export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteManifest {
    pub cultures: Vec<Locale>,
    pub paths: Vec<Route>,
}

impl RouteManifest {
    /// Single locale, root route only.
    pub fn fallback(locale: Locale) -> Self {
        Self {
            cultures: vec![locale],
            paths: vec![Route::root()],
        }
    }

    /// Check the locale set is usable and drop repeated locales.
    pub fn normalize(mut self) -> Result<Self> {
        if self.cultures.is_empty() {
            return Err(AppError::validation("manifest lists no cultures"));
        }

        let mut seen = std::collections::HashSet::new();
        self.cultures.retain(|locale| {
            let fresh = seen.insert(locale.clone());
            if !fresh {
                log::warn!("Duplicate culture '{}' in manifest ignored", locale);
            }
            fresh
        });
        Ok(self)
    }
}
