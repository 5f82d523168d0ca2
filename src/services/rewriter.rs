// src/services/rewriter.rs

//! Markup rewriter for sub-path deployments.
//!
//! This is literal token substitution, not HTML parsing. With base path
//! `B`, locale `L` and asset mount `M` the exact tokens are:
//!
//! ```text
//! <base href="/L/">   ->  <base href="B/L/">
//! href="/M/           ->  href="B/M/
//! src="/M/            ->  src="B/M/
//! ```
//!
//! Markup that spells these references differently is left untouched.

use crate::error::{AppError, Result};
use crate::models::{Config, ExportTarget};

/// Post-processes fetched markup before it is written.
pub trait MarkupRewriter: Send + Sync {
    fn rewrite(&self, markup: String, target: &ExportTarget) -> Result<String>;
}

/// Rewritten markup and how many references changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    pub markup: String,
    pub substitutions: usize,
}

/// Prefix locale base references and asset references with `base_path`.
///
/// `base_path` must already be normalized (leading slash, no trailing
/// slash) or empty; empty returns the markup unchanged.
pub fn adjust_base_path(markup: String, base_path: &str, locale: &str, asset_mount: &str) -> Rewrite {
    if base_path.is_empty() {
        return Rewrite {
            markup,
            substitutions: 0,
        };
    }

    let mount = asset_mount.trim_matches('/');
    let replacements = [
        (
            format!("<base href=\"/{locale}/\">"),
            format!("<base href=\"{base_path}/{locale}/\">"),
        ),
        (
            format!("href=\"/{mount}/"),
            format!("href=\"{base_path}/{mount}/"),
        ),
        (
            format!("src=\"/{mount}/"),
            format!("src=\"{base_path}/{mount}/"),
        ),
    ];

    let mut markup = markup;
    let mut substitutions = 0;
    for (from, to) in &replacements {
        let count = markup.matches(from.as_str()).count();
        if count > 0 {
            markup = markup.replace(from.as_str(), to);
            substitutions += count;
        }
    }

    Rewrite {
        markup,
        substitutions,
    }
}

/// Rewriter driven by the configured deployment sub-path.
#[derive(Debug, Clone)]
pub struct BasePathRewriter {
    base_path: String,
    asset_mount: String,
    strict: bool,
}

impl BasePathRewriter {
    pub fn new(base_path: impl Into<String>, asset_mount: impl Into<String>, strict: bool) -> Self {
        Self {
            base_path: base_path.into(),
            asset_mount: asset_mount.into(),
            strict,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.base_path(),
            config.assets.mount.clone(),
            config.export.strict_rewrite,
        )
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }
}

impl MarkupRewriter for BasePathRewriter {
    fn rewrite(&self, markup: String, target: &ExportTarget) -> Result<String> {
        let rewrite = adjust_base_path(
            markup,
            &self.base_path,
            target.locale.as_str(),
            &self.asset_mount,
        );

        if !self.base_path.is_empty() && rewrite.substitutions == 0 {
            if self.strict {
                return Err(AppError::RewriteMismatch {
                    locale: target.locale.to_string(),
                    route: target.route.to_string(),
                });
            }
            log::warn!(
                "Base path {} set but nothing rewritten in {} ({})",
                self.base_path,
                target.route,
                target.locale
            );
        } else if rewrite.substitutions > 0 {
            log::debug!(
                "Rewrote {} reference(s) in {} ({})",
                rewrite.substitutions,
                target.route,
                target.locale
            );
        }

        Ok(rewrite.markup)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Locale, Route, RouteKind};

    const PAGE: &str = concat!(
        "<html><head><base href=\"/en-US/\">",
        "<link rel=\"stylesheet\" href=\"/wwwroot/css/site.css\">",
        "<script src=\"/wwwroot/js/site.js\"></script></head>",
        "<body><a href=\"News\">News</a></body></html>",
    );

    fn target(locale: &str) -> ExportTarget {
        ExportTarget {
            locale: Locale::parse(locale).unwrap(),
            route: Route::root(),
            kind: RouteKind::Fixed,
        }
    }

    #[test]
    fn test_empty_base_path_is_identity() {
        let rewrite = adjust_base_path(PAGE.to_string(), "", "en-US", "wwwroot");
        assert_eq!(rewrite.markup, PAGE);
        assert_eq!(rewrite.substitutions, 0);
    }

    #[test]
    fn test_prefixes_base_and_assets() {
        let rewrite = adjust_base_path(PAGE.to_string(), "/app", "en-US", "wwwroot");
        assert_eq!(rewrite.substitutions, 3);
        assert!(rewrite.markup.contains("<base href=\"/app/en-US/\">"));
        assert!(rewrite.markup.contains("href=\"/app/wwwroot/css/site.css\""));
        assert!(rewrite.markup.contains("src=\"/app/wwwroot/js/site.js\""));
        assert!(rewrite.markup.contains("<a href=\"News\">"));
    }

    #[test]
    fn test_other_locale_base_untouched() {
        let rewrite = adjust_base_path(PAGE.to_string(), "/app", "zh-TW", "wwwroot");
        assert!(rewrite.markup.contains("<base href=\"/en-US/\">"));
        assert_eq!(rewrite.substitutions, 2);
    }

    #[test]
    fn test_rewrite_is_not_reapplied() {
        let once = adjust_base_path(PAGE.to_string(), "/app", "en-US", "wwwroot");
        let twice = adjust_base_path(once.markup.clone(), "/app", "en-US", "wwwroot");
        assert_eq!(twice.markup, once.markup);
        assert_eq!(twice.substitutions, 0);
    }

    #[test]
    fn test_mismatch_warns_by_default() {
        let rewriter = BasePathRewriter::new("/app", "wwwroot", false);
        let out = rewriter
            .rewrite("<p>plain</p>".to_string(), &target("en-US"))
            .unwrap();
        assert_eq!(out, "<p>plain</p>");
    }

    #[test]
    fn test_mismatch_fails_in_strict_mode() {
        let rewriter = BasePathRewriter::new("/app", "wwwroot", true);
        let err = rewriter
            .rewrite("<p>plain</p>".to_string(), &target("en-US"))
            .unwrap_err();
        assert!(matches!(err, AppError::RewriteMismatch { .. }));

        let empty = BasePathRewriter::new("", "wwwroot", true);
        assert!(empty.rewrite("<p>plain</p>".to_string(), &target("en-US")).is_ok());
    }
}
