//! Export run summary.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::Locale;

/// Counters for a finished export run.
#[derive(Debug, Clone, Serialize)]
pub struct ExportReport {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub locales: Vec<Locale>,
    pub default_locale: Locale,
    pub fixed_pages: usize,
    pub content_pages: usize,
    pub assets_copied: usize,
}

impl ExportReport {
    pub fn pages_written(&self) -> usize {
        self.fixed_pages + self.content_pages
    }

    pub fn elapsed_secs(&self) -> f64 {
        (self.end_time - self.start_time).num_milliseconds() as f64 / 1000.0
    }
}
