//! Storage abstractions for the exported tree.
//!
//! ## Directory Structure
//!
//! ```text
//! {export_root}/
//! ├── index.html            # Redirect to ./{default_locale}/
//! ├── {locale}/
//! │   ├── index.html        # Route "/"
//! │   └── News/
//! │       └── Detail/
//! │           └── {slug}/
//! │               └── index.html
//! └── wwwroot/              # Mirrored static assets
//! ```

pub mod local;

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;

use crate::error::{AppError, Result};
use crate::models::{Locale, Route};

// Re-export for convenience
pub use local::LocalStorage;

/// Name of the document written for every route.
pub const INDEX_FILE: &str = "index.html";

/// Trait for export output backends.
#[async_trait]
pub trait ExportStorage: Send + Sync {
    /// Create the export root if needed.
    async fn prepare(&self) -> Result<()>;

    /// Persist a page, replacing any earlier copy. Returns the written path.
    async fn write_page(&self, locale: &Locale, route: &Route, content: &str) -> Result<PathBuf>;

    /// Copy every file under `source` into `{root}/{mount}`, overwriting.
    /// Returns the number of files copied.
    async fn mirror_assets(&self, source: &Path, mount: &str) -> Result<usize>;

    /// Write the top-level entry page redirecting to `default_locale`.
    async fn write_root_redirect(&self, default_locale: &Locale) -> Result<PathBuf>;
}

/// Output location of a page, relative to the export root.
///
/// `/` maps to `{locale}/index.html`; any other route maps to
/// `{locale}/{segments...}/index.html`, where the segments are the route
/// text between its outer slashes, query string included. Segments that
/// would leave the locale directory are rejected.
pub fn relative_output_path(locale: &Locale, route: &Route) -> Result<PathBuf> {
    let mut path = PathBuf::from(locale.as_str());
    for segment in route.segments() {
        let mut components = Path::new(segment).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => path.push(segment),
            _ => {
                return Err(AppError::invalid_route(
                    route.as_str(),
                    format!("segment '{segment}' cannot be used as a directory"),
                ));
            }
        }
    }
    path.push(INDEX_FILE);
    Ok(path)
}

/// Markup of the root entry page.
///
/// The target is relative so the export works under any sub-path.
pub fn root_redirect_html(default_locale: &Locale) -> String {
    let redirect = format!("./{default_locale}/");
    format!(
        "<!doctype html><meta charset='utf-8'>\
         <meta http-equiv='refresh' content='0; url={redirect}'>\
         <link rel='canonical' href='{redirect}'>"
    )
}
