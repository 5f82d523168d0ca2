// src/models/mod.rs

//! Domain models for the exporter.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod content;
mod report;
mod route;

// Re-export all public types
pub use config::{AssetConfig, Config, ContentConfig, EnvOverrides, ExportConfig, HttpConfig, ServerConfig};
pub use content::{ContentItem, published_slugs};
pub use report::ExportReport;
pub use route::{ExportTarget, Locale, Route, RouteKind, RouteManifest};
