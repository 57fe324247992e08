//! # Rapport
//!
//! A data-driven report pagination engine.
//!
//! A report is described twice: once as a declarative JSON configuration
//! (sections, pages, layout trees of data-bound widgets) and once as raw
//! tabular data. Rapport joins the two deterministically into a hierarchical
//! document model — sections that own derived data slices, physical pages
//! with global numbering, and realized widget components — ready for a
//! rendering layer to draw.
//!
//! The engine's one hard problem is pagination of data-bound widgets: when a
//! table's data exceeds its per-page chunk size, the declared page is
//! expanded into one physical page per chunk, every split page sharing the
//! bound content tree and every component on it seeing only its chunk window.
//!
//! ## Architecture
//!
//! ```text
//! Input (JSON config + records)
//!       ↓
//!   [model]    — Configuration document: sections, pages, layout, slice specs
//!       ↓
//!   [data]     — Slice pipeline: insert → transform → filter, chunk views
//!       ↓
//!   [section]  — Declared pages expand into physical page templates
//!       ↓
//!   [report]   — Cover synthesis, period, global page numbering
//! ```
//!
//! Rendering (pixels, styling, interaction) is an external collaborator: the
//! crate exposes the fully-derived model and stops there.

pub mod data;
pub mod error;
pub mod layout;
pub mod model;
pub mod operator;
pub mod page;
pub mod report;
pub mod section;
pub mod widget;

pub use error::ReportError;
pub use report::{MenuEntry, Report};

use serde_json::Value;

/// Build a report from decoded configuration and data values.
///
/// This is the primary entry point. The configuration must be a JSON object
/// and the data a JSON array of flat records.
pub fn build(config: Value, data: Value) -> Result<Report, ReportError> {
    Report::from_values(config, data)
}

/// Build a report from raw JSON text.
pub fn build_json(config: &str, data: &str) -> Result<Report, ReportError> {
    Report::from_json(config, data)
}
