// src/pipeline/plan.rs

//! Export target planning.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{AppError, Result};
use crate::models::{ExportTarget, Locale, Route, RouteKind};
use crate::storage::relative_output_path;

/// Every target of one locale: fixed routes in manifest order, then one
/// detail route per slug.
///
/// Repeats of the same route collapse into one target. Two different
/// routes are an error when they land on the same output file, or when
/// one's file sits where the other needs a directory (`/` and
/// `/index.html`).
pub fn plan_locale(
    locale: &Locale,
    fixed: &[Route],
    slugs: &[String],
    detail_prefix: &Route,
) -> Result<Vec<ExportTarget>> {
    let candidates = fixed
        .iter()
        .cloned()
        .map(|route| (route, RouteKind::Fixed))
        .chain(
            slugs
                .iter()
                .map(|slug| (Route::content(detail_prefix, slug), RouteKind::Content)),
        );

    let mut files: HashMap<PathBuf, Route> = HashMap::new();
    let mut dirs: HashMap<PathBuf, Route> = HashMap::new();
    let mut targets = Vec::new();

    for (route, kind) in candidates {
        let output = relative_output_path(locale, &route)?;
        if let Some(existing) = files.get(&output) {
            if *existing == route {
                log::debug!("Skipping repeated route {} ({})", route, locale);
                continue;
            }
            return Err(collision(locale, existing, &route));
        }
        if let Some(existing) = dirs.get(&output) {
            return Err(collision(locale, existing, &route));
        }
        let ancestors: Vec<&Path> = output.ancestors().skip(1).collect();
        if let Some(existing) = ancestors.iter().find_map(|dir| files.get(*dir)) {
            return Err(collision(locale, existing, &route));
        }

        for dir in ancestors {
            dirs.entry(dir.to_path_buf()).or_insert_with(|| route.clone());
        }
        files.insert(output, route.clone());
        targets.push(ExportTarget {
            locale: locale.clone(),
            route,
            kind,
        });
    }

    Ok(targets)
}

fn collision(locale: &Locale, first: &Route, second: &Route) -> AppError {
    AppError::OutputCollision {
        locale: locale.to_string(),
        first: first.to_string(),
        second: second.to_string(),
    }
}
