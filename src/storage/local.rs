//! Local filesystem storage implementation.
//!
//! Writes pages, mirrored assets and the root entry page under one
//! export root. Every write replaces what a previous run left at the same
//! location, so re-running an export converges on the same tree.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use walkdir::WalkDir;

use crate::error::Result;
use crate::models::{Locale, Route};
use crate::storage::{ExportStorage, INDEX_FILE, relative_output_path, root_redirect_html};

/// Local filesystem storage backend.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root_dir: PathBuf,
}

impl LocalStorage {
    /// Create a new LocalStorage rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root_dir
    }

    /// Absolute output file for a page.
    pub fn output_path(&self, locale: &Locale, route: &Route) -> Result<PathBuf> {
        Ok(self.root_dir.join(relative_output_path(locale, route)?))
    }

    /// Ensure parent directory exists.
    async fn ensure_dir(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        self.ensure_dir(path).await?;

        let tmp = path.with_extension("html.tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, path).await?;
        Ok(())
    }
}

#[async_trait]
impl ExportStorage for LocalStorage {
    async fn prepare(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.root_dir).await?;
        Ok(())
    }

    async fn write_page(&self, locale: &Locale, route: &Route, content: &str) -> Result<PathBuf> {
        let path = self.output_path(locale, route)?;
        self.write_bytes(&path, content.as_bytes()).await?;
        log::info!("-> {}", path.display());
        Ok(path)
    }

    async fn mirror_assets(&self, source: &Path, mount: &str) -> Result<usize> {
        let source = source.to_path_buf();
        let destination = self.root_dir.join(mount.trim_matches('/'));

        let copied = tokio::task::spawn_blocking(move || copy_tree(&source, &destination)).await??;
        log::info!(
            "Assets -> {} ({} file(s))",
            self.root_dir.join(mount.trim_matches('/')).display(),
            copied
        );
        Ok(copied)
    }

    async fn write_root_redirect(&self, default_locale: &Locale) -> Result<PathBuf> {
        let path = self.root_dir.join(INDEX_FILE);
        self.write_bytes(&path, root_redirect_html(default_locale).as_bytes())
            .await?;
        log::info!("Root redirect -> ./{}/", default_locale);
        Ok(path)
    }
}

/// Recursively copy files from `source` into `destination`.
///
/// Additive: files already in `destination` but absent from `source`
/// stay. A missing `source` copies nothing.
fn copy_tree(source: &Path, destination: &Path) -> io::Result<usize> {
    if !source.exists() {
        log::info!("No asset directory at {}; skipping", source.display());
        return Ok(0);
    }
    fs::create_dir_all(destination)?;

    let mut copied = 0;
    for entry in WalkDir::new(source) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|e| io::Error::other(e.to_string()))?;
        let target = destination.join(relative);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(entry.path(), &target)?;
        copied += 1;
    }
    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn locale(s: &str) -> Locale {
        Locale::parse(s).unwrap()
    }

    #[tokio::test]
    async fn test_write_page_creates_dirs_and_overwrites() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path().join("dist"));
        let route = Route::parse("/News/Detail/site-launched").unwrap();

        let path = storage.write_page(&locale("zh-TW"), &route, "one").await.unwrap();
        assert_eq!(
            path,
            tmp.path()
                .join("dist/zh-TW/News/Detail/site-launched/index.html")
        );
        storage.write_page(&locale("zh-TW"), &route, "two").await.unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "two");
        assert!(!path.with_extension("html.tmp").exists());
    }

    #[tokio::test]
    async fn test_root_route_writes_locale_index() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());

        let path = storage
            .write_page(&locale("en-US"), &Route::root(), "<p>home</p>")
            .await
            .unwrap();
        assert_eq!(path, tmp.path().join("en-US/index.html"));
    }

    #[tokio::test]
    async fn test_mirror_assets_nested_and_overwrite() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("wwwroot");
        std::fs::create_dir_all(src.join("css/vendor")).unwrap();
        std::fs::write(src.join("favicon.ico"), b"ico").unwrap();
        std::fs::write(src.join("css/site.css"), b"body{}").unwrap();
        std::fs::write(src.join("css/vendor/x.css"), b"x").unwrap();

        let storage = LocalStorage::new(tmp.path().join("dist"));
        assert_eq!(storage.mirror_assets(&src, "wwwroot").await.unwrap(), 3);

        let dst = tmp.path().join("dist/wwwroot");
        assert_eq!(std::fs::read(dst.join("css/vendor/x.css")).unwrap(), b"x");

        std::fs::write(src.join("css/site.css"), b"body{color:red}").unwrap();
        std::fs::write(dst.join("stale.txt"), b"old").unwrap();
        storage.mirror_assets(&src, "wwwroot").await.unwrap();

        assert_eq!(
            std::fs::read(dst.join("css/site.css")).unwrap(),
            b"body{color:red}"
        );
        assert!(dst.join("stale.txt").exists());
    }

    #[tokio::test]
    async fn test_mirror_missing_source_is_noop() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path().join("dist"));

        let copied = storage
            .mirror_assets(&tmp.path().join("nope"), "wwwroot")
            .await
            .unwrap();
        assert_eq!(copied, 0);
        assert!(!tmp.path().join("dist/wwwroot").exists());
    }

    #[tokio::test]
    async fn test_root_redirect_written() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());

        let path = storage.write_root_redirect(&locale("en-US")).await.unwrap();
        let html = std::fs::read_to_string(path).unwrap();
        assert!(html.contains("url=./en-US/"));
        assert!(html.contains("href='./en-US/'"));
    }
}
