//! # Reflow Engine
//!
//! This is the heart of pageflow.
//!
//! The document is edited as one continuous structured tree, but it has to
//! render as discrete pages of fixed size. Nothing knows in advance how tall
//! a block is; the only source of truth is the rendered geometry. So the
//! engine works after the fact, against measurements of the committed tree:
//!
//! 1. **Push.** Find the first page with a block ending below the body. Move
//!    the blocks after it to the next page, then split the crossing block if
//!    it is a paragraph or a list, otherwise move it whole. Re-measure and
//!    start over from the first page after every mutation.
//! 2. **Pull.** For each pair of neighbouring pages, move the first block of
//!    the later page back if it now fits at the end of the earlier one.
//! 3. **Cleanup.** Drop trailing pages left empty. The first page stays.
//! 4. Publish the page count.
//!
//! Every mutation is a layout-tagged transaction dispatched through the
//! editor, so the engine never reacts to its own writes. A pass issues at
//! most `max_moves` mutations; pathological content that keeps changing
//! height as it moves is stopped by that cap and left valid but imperfect.

pub mod bounds;
pub mod overflow;
pub mod page_break;
pub mod page_count;

use serde::Serialize;

use crate::config::LayoutConfig;
use crate::measure::MeasurementProvider;
use crate::model::{BlockPos, Document, NodePos};
use crate::schedule::FrameScheduler;
use crate::session::EditorSurface;
use crate::transform::{Origin, Transaction};

use bounds::{BodyBounds, ChromeHeights};
use overflow::{find_overflow, Overflow};
use page_break::{
    break_transaction, cleanup_transaction, decide_break, pull_back, BreakContext,
    BreakDecision, SplitKey,
};
use page_count::PageCountReporter;

/// What one reflow pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReflowReport {
    /// Transactions dispatched, across all phases.
    pub mutations: usize,
    pub pushes: usize,
    pub pulls: usize,
    pub removed_pages: usize,
    /// The pass stopped because `max_moves` was reached with work left.
    pub cap_hit: bool,
    /// Page count published at the end of the pass.
    pub page_count: usize,
    /// The pass refused to start because another one was running.
    pub skipped: bool,
}

/// Internal counters. Never shown to end users.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostics {
    pub passes: u64,
    pub mutations: u64,
    pub cap_hits: u64,
    pub ignored_layout_changes: u64,
    pub skipped_reentrant: u64,
    pub rejected_transactions: u64,
}

/// One engine instance per document. Owns every guard the loop needs.
#[derive(Debug)]
pub struct Paginator {
    config: LayoutConfig,
    chrome: ChromeHeights,
    scheduler: FrameScheduler,
    reporter: PageCountReporter,
    diagnostics: Diagnostics,
    attached: bool,
    /// Set for the duration of a pass. A run that finds it set is skipped
    /// and counted in [`Diagnostics::skipped_reentrant`].
    running: bool,
    last_split: Option<SplitKey>,
}

impl Paginator {
    pub fn new(config: LayoutConfig) -> Self {
        Self {
            chrome: ChromeHeights::from_config(&config),
            scheduler: FrameScheduler::new(config.frames_before_reflow),
            reporter: PageCountReporter::new(),
            diagnostics: Diagnostics::default(),
            attached: true,
            running: false,
            last_split: None,
            config,
        }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn page_count(&self) -> usize {
        self.reporter.count()
    }

    pub fn reporter_mut(&mut self) -> &mut PageCountReporter {
        &mut self.reporter
    }

    pub fn is_pending(&self) -> bool {
        self.scheduler.is_pending()
    }

    /// Usable body height under the current header/footer heights.
    pub fn body_height(&self) -> f64 {
        self.chrome.body_height(&self.config)
    }

    /// The editor committed a transaction. Schedules a pass unless the
    /// transaction came from this engine or the engine is detached.
    pub fn on_document_changed(&mut self, origin: Origin) -> bool {
        if !self.attached {
            return false;
        }
        if origin == Origin::Layout {
            self.diagnostics.ignored_layout_changes += 1;
            return false;
        }
        self.request_reflow()
    }

    /// Schedule a pass regardless of what changed.
    pub fn request_reflow(&mut self) -> bool {
        if !self.attached {
            return false;
        }
        self.scheduler.request();
        true
    }

    /// Header and footer measured themselves. Body bounds follow from the
    /// next pass on; a change of height schedules one.
    pub fn report_chrome_heights(&mut self, header: f64, footer: f64) {
        let chrome = ChromeHeights::new(header, footer);
        if chrome != self.chrome {
            log::debug!(
                "chrome heights {:?} -> {:?}, body height {:.1}",
                self.chrome,
                chrome,
                chrome.body_height(&self.config)
            );
            self.chrome = chrome;
            self.request_reflow();
        }
    }

    /// Advance one rendering frame; runs the pending pass once it is due.
    pub fn on_frame(
        &mut self,
        editor: &mut dyn EditorSurface,
        provider: &mut dyn MeasurementProvider,
    ) -> Option<ReflowReport> {
        if !self.scheduler.tick() {
            return None;
        }
        Some(self.run(editor, provider))
    }

    /// Stop listening for changes and drop any pending pass.
    pub fn detach(&mut self) {
        self.attached = false;
        if self.scheduler.cancel() {
            log::debug!("pending reflow cancelled on detach");
        }
    }

    /// Run one full pass now: push, pull, cleanup, publish.
    pub fn run(
        &mut self,
        editor: &mut dyn EditorSurface,
        provider: &mut dyn MeasurementProvider,
    ) -> ReflowReport {
        if self.running {
            self.diagnostics.skipped_reentrant += 1;
            return ReflowReport {
                skipped: true,
                page_count: self.page_count(),
                ..Default::default()
            };
        }
        self.running = true;
        let report = self.reflow(editor, provider);
        self.running = false;

        self.diagnostics.passes += 1;
        self.diagnostics.mutations += report.mutations as u64;
        if report.cap_hit {
            self.diagnostics.cap_hits += 1;
            log::warn!(
                "reflow stopped after {} mutations with overflow left ({} pages)",
                report.mutations,
                report.page_count
            );
        }
        report
    }

    fn reflow(
        &mut self,
        editor: &mut dyn EditorSurface,
        provider: &mut dyn MeasurementProvider,
    ) -> ReflowReport {
        let mut report = ReflowReport::default();
        provider.sync(editor.document());

        // Push: one mutation at a time, re-measured from the first page
        while let Some((tx, split)) = self.next_push(editor.document(), &*provider) {
            if report.mutations >= self.config.max_moves {
                report.cap_hit = true;
                break;
            }
            if !self.commit(editor, provider, tx, &mut report) {
                break;
            }
            if split.is_some() {
                self.last_split = split;
            }
            report.pushes += 1;
        }

        // Pull: reclaim room opened up by deletions
        if !report.cap_hit {
            while let Some(tx) = self.next_pull(editor.document(), &*provider) {
                if report.mutations >= self.config.max_moves {
                    report.cap_hit = true;
                    break;
                }
                if !self.commit(editor, provider, tx, &mut report) {
                    break;
                }
                report.pulls += 1;
            }
        }

        // Cleanup: trailing empty pages
        if let Some(tx) = cleanup_transaction(editor.document()) {
            if report.mutations >= self.config.max_moves {
                report.cap_hit = true;
            } else {
                let before = editor.document().page_count();
                if self.commit(editor, provider, tx, &mut report) {
                    report.removed_pages = before - editor.document().page_count();
                }
            }
        }

        report.page_count = editor.document().page_count().max(1);
        self.reporter.publish(report.page_count);
        log::info!(
            "reflow: {} mutations ({} push, {} pull, {} removed), {} pages",
            report.mutations,
            report.pushes,
            report.pulls,
            report.removed_pages,
            report.page_count
        );
        report
    }

    /// The next push-phase transaction, and the paragraph split it performs
    /// if any.
    fn next_push(
        &self,
        doc: &Document,
        provider: &dyn MeasurementProvider,
    ) -> Option<(Transaction, Option<SplitKey>)> {
        for (index, page) in doc.pages.iter().enumerate() {
            let bounds = BodyBounds::resolve(provider, index, &self.config, self.chrome);
            match find_overflow(page, index, provider, bounds, self.config.overflow_epsilon) {
                Overflow::None => continue,
                Overflow::Degenerate => {
                    log::debug!("page {} holds a single block taller than its body", index);
                    continue;
                }
                Overflow::At(overflow_index) => {
                    let ctx = BreakContext {
                        doc,
                        provider,
                        page: index,
                        bounds,
                        epsilon: self.config.overflow_epsilon,
                        snap_window: self.config.snap_window,
                        last_split: self.last_split,
                    };
                    let decision = decide_break(&ctx, overflow_index);
                    log::debug!(
                        "page {} overflows at block {}: {:?}",
                        index,
                        overflow_index,
                        decision
                    );
                    let split = match decision {
                        BreakDecision::SplitParagraph { offset } => Some(SplitKey {
                            pos: BlockPos::new(index, page.blocks.len() - 1),
                            offset,
                            doc_size: doc.size(),
                        }),
                        _ => None,
                    };
                    return Some((break_transaction(doc, index, &decision), split));
                }
            }
        }
        None
    }

    /// The next pull-phase transaction: the first block of some page that
    /// fits at the end of the page before it.
    fn next_pull(&self, doc: &Document, provider: &dyn MeasurementProvider) -> Option<Transaction> {
        for index in 0..doc.page_count().saturating_sub(1) {
            if doc.pages[index + 1].blocks.is_empty() {
                continue;
            }
            let candidate = NodePos::Block(BlockPos::new(index + 1, 0));
            let Some(rect) = provider.measure(candidate) else {
                continue;
            };
            let bounds = BodyBounds::resolve(provider, index, &self.config, self.chrome);

            let content_bottom = match doc.pages[index].blocks.len() {
                0 => bounds.top,
                n => {
                    let last = NodePos::Block(BlockPos::new(index, n - 1));
                    match provider.measure(last) {
                        Some(r) => r.bottom + provider.margins(last).bottom,
                        None => continue,
                    }
                }
            };
            let needed = provider.margins(candidate).top + rect.height();

            if content_bottom + needed <= bounds.bottom - self.config.pull_buffer {
                log::debug!(
                    "pulling first block of page {} back ({:.1}px into {:.1}px)",
                    index + 1,
                    needed,
                    bounds.bottom - content_bottom
                );
                return Some(pull_back(doc, index));
            }
        }
        None
    }

    /// Dispatch a layout transaction and re-measure. Returns false if the
    /// editor rejected it.
    fn commit(
        &mut self,
        editor: &mut dyn EditorSurface,
        provider: &mut dyn MeasurementProvider,
        tx: Transaction,
        report: &mut ReflowReport,
    ) -> bool {
        debug_assert_eq!(tx.origin, Origin::Layout);
        match editor.dispatch(tx) {
            Ok(_) => {
                report.mutations += 1;
                provider.sync(editor.document());
                true
            }
            Err(e) => {
                self.diagnostics.rejected_transactions += 1;
                log::warn!("layout transaction rejected: {}", e);
                false
            }
        }
    }
}
