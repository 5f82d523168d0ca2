//! Pipeline entry points for export operations.
//!
//! - `plan_locale`: Expand a locale's fixed and content routes into targets
//! - `run_export`: Fetch, rewrite and write every target, then finish the tree
//! - `run_hosted`: `run_export` between starting and stopping the server

pub mod export;
pub mod plan;

pub use export::{ExportContext, ExportOptions, ExportPhase, run_export, run_hosted};
pub use plan::plan_locale;
