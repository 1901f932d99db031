//! # Pageflow
//!
//! A page-native pagination engine for structured documents.
//!
//! A rich-text editor holds its document as one continuous tree, but the
//! user expects to see fixed-size pages, like a word processor. Pageflow
//! keeps the tree partitioned into explicit page containers and repairs the
//! partition after every edit: blocks that overflow a page are pushed to the
//! next one (split at a line or list item boundary where possible), content
//! is pulled back when room opens up, and trailing empty pages go away.
//!
//! Heights are never predicted. The engine reads them back from whatever
//! renders the tree, through [`measure::MeasurementProvider`], and every
//! change it makes is an ordinary transaction tagged as a layout write.
//!
//! ## Architecture
//!
//! ```text
//! Input (JSON/API)
//!       ↓
//!   [model]      — Document → Page → Block tree, positions
//!       ↓
//!   [transform]  — Atomic transactions, origin tags, position mapping
//!       ↓
//!   [session]    — Editor surface, frame loop, change notifications
//!       ↓
//!   [layout]     — Overflow detection, push / pull / cleanup, page count
//!       ↑
//!   [measure]    — Rendered geometry (headless renderer included)
//! ```

pub mod config;
pub mod error;
pub mod layout;
pub mod measure;
pub mod model;
pub mod schedule;
pub mod session;
pub mod text;
pub mod transform;

pub use config::LayoutConfig;
pub use error::{Error, TransformError};
pub use layout::{Paginator, ReflowReport};
pub use model::{Block, Document, Page};
pub use session::Session;

use measure::headless::{HeadlessMetrics, HeadlessRenderer};

/// A settled document together with what it took to get there.
#[derive(Debug, Clone)]
pub struct Paginated {
    pub document: Document,
    /// Totals over every pass that ran.
    pub report: ReflowReport,
}

/// Paginate a document with the headless renderer and default metrics.
///
/// This is the batch entry point: it runs passes until none is pending and
/// returns the resulting paged document.
pub fn paginate(document: Document, config: LayoutConfig) -> Paginated {
    paginate_with(document, config, HeadlessMetrics::default())
}

/// Like [`paginate`], with explicit text metrics.
pub fn paginate_with(
    document: Document,
    config: LayoutConfig,
    metrics: HeadlessMetrics,
) -> Paginated {
    let renderer = HeadlessRenderer::new(config.clone(), metrics);
    let mut session = Session::new(document, renderer, config);

    let mut report = ReflowReport::default();
    for pass in session.settle() {
        report.mutations += pass.mutations;
        report.pushes += pass.pushes;
        report.pulls += pass.pulls;
        report.removed_pages += pass.removed_pages;
        report.cap_hit |= pass.cap_hit;
    }
    report.page_count = session.document().page_count();

    log::info!(
        "paginated into {} pages ({} mutations{})",
        report.page_count,
        report.mutations,
        if report.cap_hit { ", capped" } else { "" }
    );
    Paginated {
        document: session.into_document(),
        report,
    }
}

/// Paginate a document described as JSON. Accepts the paged shape and the
/// legacy flat shape.
pub fn paginate_json(json: &str, config: LayoutConfig) -> Result<Paginated, Error> {
    let document = Document::from_json(json)?;
    Ok(paginate(document, config))
}
