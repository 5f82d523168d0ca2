//! Service layer for the exporter.
//!
//! This module contains the collaborators the export pipeline drives:
//! - Route discovery (`RouteSource`, `ContentRouteProvider`)
//! - Page fetching (`PageFetcher`)
//! - Markup post-processing (`MarkupRewriter`)
//! - Dynamic server lifecycle (`SiteServer`)

pub mod content;
pub mod fetcher;
pub mod rewriter;
pub mod routes;
pub mod server;

pub use content::{
    ContentRouteProvider, JsonContentStore, MemoryContentStore, NoContent, open_content_store,
};
pub use fetcher::{HttpPageFetcher, PageFetcher};
pub use rewriter::{BasePathRewriter, MarkupRewriter, Rewrite, adjust_base_path};
pub use routes::{ManifestRouteSource, RouteSource};
pub use server::{CommandServer, ExternalServer, Readiness, ServerHandle, SiteServer};
