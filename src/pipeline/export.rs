// src/pipeline/export.rs

//! Static export pipeline.
//!
//! Phases run strictly in order:
//!
//! ```text
//! Idle -> RoutesLoaded -> { per locale: FixedExported -> ContentExported }
//!      -> AssetsMirrored -> RootWritten -> Done
//!
//! any phase -> Failed
//! ```
//!
//! Any fetch or I/O failure moves the run to `Failed` where it happened.
//! Nothing is cleaned up; a re-run overwrites every target it writes.

use std::fmt;
use std::path::PathBuf;

use chrono::Utc;
use futures::stream::{self, StreamExt};

use crate::error::{AppError, Result};
use crate::models::{Config, ExportReport, ExportTarget, Locale, Route, RouteKind};
use crate::pipeline::plan::plan_locale;
use crate::services::{
    ContentRouteProvider, MarkupRewriter, PageFetcher, RouteSource, ServerHandle, SiteServer,
};
use crate::storage::ExportStorage;

/// Position of a run in the export sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportPhase {
    Idle,
    RoutesLoaded,
    FixedExported(Locale),
    ContentExported(Locale),
    AssetsMirrored,
    RootWritten,
    Done,
    Failed,
}

impl fmt::Display for ExportPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportPhase::Idle => f.write_str("idle"),
            ExportPhase::RoutesLoaded => f.write_str("routes loaded"),
            ExportPhase::FixedExported(locale) => write!(f, "fixed routes exported ({locale})"),
            ExportPhase::ContentExported(locale) => write!(f, "content routes exported ({locale})"),
            ExportPhase::AssetsMirrored => f.write_str("assets mirrored"),
            ExportPhase::RootWritten => f.write_str("root written"),
            ExportPhase::Done => f.write_str("done"),
            ExportPhase::Failed => f.write_str("failed"),
        }
    }
}

/// Run-wide settings, fixed before the run starts.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Prefix of content detail routes
    pub detail_prefix: Route,
    /// Redirect target of the root entry page; first locale when unset
    pub default_locale: Option<Locale>,
    /// Static asset directory to mirror
    pub asset_source: PathBuf,
    /// Directory name of the mirrored assets under the export root
    pub asset_mount: String,
    /// Pages fetched at once
    pub max_concurrent: usize,
}

impl ExportOptions {
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            detail_prefix: Route::parse(config.content.detail_prefix.as_str())?,
            default_locale: config
                .export
                .default_locale
                .as_deref()
                .map(Locale::parse)
                .transpose()?,
            asset_source: config.asset_source(),
            asset_mount: config.assets.mount.clone(),
            max_concurrent: config.http.max_concurrent,
        })
    }
}

/// Collaborators of one export run.
pub struct ExportContext<'a> {
    pub routes: &'a dyn RouteSource,
    pub content: &'a dyn ContentRouteProvider,
    pub fetcher: &'a dyn PageFetcher,
    pub rewriter: &'a dyn MarkupRewriter,
    pub storage: &'a dyn ExportStorage,
    pub options: ExportOptions,
}

/// Export every locale and route from the server behind `handle`.
pub async fn run_export(ctx: &ExportContext<'_>, handle: &ServerHandle) -> Result<ExportReport> {
    let mut phase = ExportPhase::Idle;
    log::info!("Export starting from {}", handle.base_url());

    match export_all(ctx, handle.base_url(), &mut phase).await {
        Ok(report) => Ok(report),
        Err(e) => {
            let last = fail(&mut phase);
            log::error!("Export failed after phase '{}': {}", last, e);
            Err(e)
        }
    }
}

/// Start `server`, export from it, then stop it whatever the outcome.
///
/// An export error wins over a stop error; the stop error is only logged
/// in that case.
pub async fn run_hosted(ctx: &ExportContext<'_>, server: &dyn SiteServer) -> Result<ExportReport> {
    let handle = server.start().await?;
    let result = run_export(ctx, &handle).await;
    let stopped = server.stop(handle).await;

    match (result, stopped) {
        (Ok(report), Ok(())) => Ok(report),
        (Ok(_), Err(stop_err)) => Err(stop_err),
        (Err(e), Ok(())) => Err(e),
        (Err(e), Err(stop_err)) => {
            log::error!("Stopping the server also failed: {}", stop_err);
            Err(e)
        }
    }
}

fn advance(phase: &mut ExportPhase, next: ExportPhase) {
    log::debug!("Phase: {} -> {}", phase, next);
    *phase = next;
}

/// Move to `Failed`, returning the phase the run had reached.
fn fail(phase: &mut ExportPhase) -> ExportPhase {
    let last = std::mem::replace(phase, ExportPhase::Failed);
    log::debug!("Phase: {} -> {}", last, phase);
    last
}

async fn export_all(
    ctx: &ExportContext<'_>,
    base_url: &str,
    phase: &mut ExportPhase,
) -> Result<ExportReport> {
    let start_time = Utc::now();
    ctx.storage.prepare().await?;

    let manifest = ctx.routes.load().await?.normalize()?;
    let default_locale = resolve_default_locale(&manifest.cultures, ctx.options.default_locale.as_ref())?;
    advance(phase, ExportPhase::RoutesLoaded);

    let mut fixed_pages = 0;
    let mut content_pages = 0;

    for locale in &manifest.cultures {
        log::info!("Exporting locale {}", locale);

        let slugs = ctx.content.slugs_for(locale).await?;
        let (fixed, content): (Vec<_>, Vec<_>) =
            plan_locale(locale, &manifest.paths, &slugs, &ctx.options.detail_prefix)?
                .into_iter()
                .partition(|target| target.kind == RouteKind::Fixed);

        fixed_pages += export_targets(ctx, base_url, fixed).await?;
        advance(phase, ExportPhase::FixedExported(locale.clone()));

        content_pages += export_targets(ctx, base_url, content).await?;
        advance(phase, ExportPhase::ContentExported(locale.clone()));
    }

    let assets_copied = ctx
        .storage
        .mirror_assets(&ctx.options.asset_source, &ctx.options.asset_mount)
        .await?;
    advance(phase, ExportPhase::AssetsMirrored);

    ctx.storage.write_root_redirect(&default_locale).await?;
    advance(phase, ExportPhase::RootWritten);

    let report = ExportReport {
        start_time,
        end_time: Utc::now(),
        locales: manifest.cultures,
        default_locale,
        fixed_pages,
        content_pages,
        assets_copied,
    };
    advance(phase, ExportPhase::Done);

    log::info!(
        "Export done: {} page(s) ({} fixed, {} content) in {} locale(s), {} asset(s), {:.1}s",
        report.pages_written(),
        report.fixed_pages,
        report.content_pages,
        report.locales.len(),
        report.assets_copied,
        report.elapsed_secs()
    );
    Ok(report)
}

/// Override when given, otherwise the first locale.
fn resolve_default_locale(cultures: &[Locale], configured: Option<&Locale>) -> Result<Locale> {
    if let Some(locale) = configured {
        if !cultures.contains(locale) {
            log::warn!(
                "Default locale {} is not exported; the root redirect will point at a missing page",
                locale
            );
        }
        return Ok(locale.clone());
    }
    cultures
        .first()
        .cloned()
        .ok_or_else(|| AppError::validation("no locales to export"))
}

/// Fetch, rewrite and write a batch of targets through a bounded pool.
///
/// Returns at the first failure; targets not yet started are never
/// fetched.
async fn export_targets(
    ctx: &ExportContext<'_>,
    base_url: &str,
    targets: Vec<ExportTarget>,
) -> Result<usize> {
    let concurrency = ctx.options.max_concurrent.max(1);
    let mut results = stream::iter(targets)
        .map(|target| async move { export_target(ctx, base_url, &target).await })
        .buffer_unordered(concurrency);

    let mut written = 0;
    while let Some(result) = results.next().await {
        result?;
        written += 1;
    }
    Ok(written)
}

async fn export_target(ctx: &ExportContext<'_>, base_url: &str, target: &ExportTarget) -> Result<()> {
    let markup = ctx
        .fetcher
        .fetch(base_url, &target.route, &target.locale)
        .await?;
    let markup = ctx.rewriter.rewrite(markup, target)?;
    ctx.storage
        .write_page(&target.locale, &target.route, &markup)
        .await?;
    Ok(())
}
