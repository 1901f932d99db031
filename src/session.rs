//! # Session
//!
//! The host loop around the engine. A [`Session`] owns the editor (the only
//! writer of the document), the measurement provider and the [`Paginator`],
//! and drives them the way a UI thread would: apply an edit, let frames pass,
//! run the pass that comes due, repeat.
//!
//! Everything runs on the caller's thread, one call at a time, so two passes
//! can never interleave and a pass always sees a committed tree.

use crate::config::LayoutConfig;
use crate::error::TransformError;
use crate::layout::bounds::ChromeHeights;
use crate::layout::{Paginator, ReflowReport};
use crate::measure::headless::HeadlessRenderer;
use crate::measure::MeasurementProvider;
use crate::model::Document;
use crate::transform::{Mapping, Origin, Transaction};

/// The editing surface as seen by the engine.
pub trait EditorSurface {
    /// The committed document.
    fn document(&self) -> &Document;

    /// Apply a transaction atomically and commit the result.
    fn dispatch(&mut self, tx: Transaction) -> Result<Mapping, TransformError>;
}

/// A minimal editing surface: holds the document and records the origin of
/// every committed transaction until someone collects them.
#[derive(Debug, Clone, Default)]
pub struct Editor {
    doc: Document,
    changes: Vec<Origin>,
}

impl Editor {
    pub fn new(doc: Document) -> Self {
        Self {
            doc,
            changes: Vec::new(),
        }
    }

    pub fn into_document(self) -> Document {
        self.doc
    }

    /// Origins of transactions committed since the last call.
    pub fn take_changes(&mut self) -> Vec<Origin> {
        std::mem::take(&mut self.changes)
    }
}

impl EditorSurface for Editor {
    fn document(&self) -> &Document {
        &self.doc
    }

    fn dispatch(&mut self, tx: Transaction) -> Result<Mapping, TransformError> {
        let (doc, mapping) = tx.apply(&self.doc)?;
        self.doc = doc;
        self.changes.push(tx.origin);
        Ok(mapping)
    }
}

/// Upper bound on frames [`Session::settle`] will advance.
const MAX_SETTLE_FRAMES: usize = 64;

/// Editor, measurement and engine wired together.
#[derive(Debug)]
pub struct Session<M: MeasurementProvider> {
    editor: Editor,
    provider: M,
    paginator: Paginator,
}

impl<M: MeasurementProvider> Session<M> {
    /// Open a session on a loaded document. The first pass is scheduled
    /// right away, as for any change.
    pub fn new(doc: Document, provider: M, config: LayoutConfig) -> Self {
        let mut paginator = Paginator::new(config);
        paginator.request_reflow();
        Self {
            editor: Editor::new(doc),
            provider,
            paginator,
        }
    }

    pub fn document(&self) -> &Document {
        self.editor.document()
    }

    pub fn into_document(self) -> Document {
        self.editor.into_document()
    }

    pub fn paginator(&self) -> &Paginator {
        &self.paginator
    }

    pub fn paginator_mut(&mut self) -> &mut Paginator {
        &mut self.paginator
    }

    pub fn page_count(&self) -> usize {
        self.paginator.page_count()
    }

    /// Apply an edit and notify the engine.
    pub fn edit(&mut self, tx: Transaction) -> Result<Mapping, TransformError> {
        let mapping = self.editor.dispatch(tx)?;
        self.notify();
        Ok(mapping)
    }

    /// Let one rendering frame pass. Returns the report of the pass that
    /// ran in it, if one came due.
    pub fn advance_frame(&mut self) -> Option<ReflowReport> {
        self.provider.sync(self.editor.document());
        let report = self
            .paginator
            .on_frame(&mut self.editor, &mut self.provider);
        self.notify();
        report
    }

    /// Advance frames until no pass is pending. Returns the reports of the
    /// passes that ran.
    pub fn settle(&mut self) -> Vec<ReflowReport> {
        let mut reports = Vec::new();
        for _ in 0..MAX_SETTLE_FRAMES {
            if !self.paginator.is_pending() {
                break;
            }
            reports.extend(self.advance_frame());
        }
        reports
    }

    /// Run a pass immediately, bypassing the frame schedule.
    pub fn reflow_now(&mut self) -> ReflowReport {
        let report = self.paginator.run(&mut self.editor, &mut self.provider);
        self.notify();
        report
    }

    /// Header and footer reported new heights.
    ///
    /// Only the engine is told. This is the entry point for providers that
    /// render the header and footer themselves and already measure them at
    /// the new size; a headless session changes them with
    /// [`Session::set_chrome`] instead.
    pub fn report_chrome_heights(&mut self, header: f64, footer: f64) {
        self.paginator.report_chrome_heights(header, footer);
    }

    /// Tear down: stop listening and drop any pending pass.
    pub fn close(&mut self) {
        self.paginator.detach();
    }

    /// Forward every committed change to the engine.
    fn notify(&mut self) {
        for origin in self.editor.take_changes() {
            self.paginator.on_document_changed(origin);
        }
    }
}

impl Session<HeadlessRenderer> {
    /// Change header/footer heights on both sides: the headless backend
    /// renders the regions and the engine is told about them.
    pub fn set_chrome(&mut self, chrome: ChromeHeights) {
        self.provider.set_chrome(chrome);
        self.paginator
            .report_chrome_heights(chrome.header, chrome.footer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Edges, PageSize};
    use crate::measure::headless::HeadlessMetrics;
    use crate::measure::{Rect, VerticalMargins, VerticalPadding};
    use crate::model::{Block, BlockPos, NodePos};

    fn session(doc: Document) -> Session<HeadlessRenderer> {
        let config = LayoutConfig::default();
        let provider = HeadlessRenderer::new(config.clone(), HeadlessMetrics::default());
        Session::new(doc, provider, config)
    }

    #[test]
    fn editor_records_origins() {
        let mut editor = Editor::new(Document::new());
        editor
            .dispatch(Transaction::user().insert_blocks(0, 0, vec![Block::paragraph("a")]))
            .unwrap();
        editor
            .dispatch(Transaction::layout().delete_blocks(0, 0, 1))
            .unwrap();
        assert_eq!(editor.take_changes(), vec![Origin::User, Origin::Layout]);
        assert!(editor.take_changes().is_empty());
    }

    #[test]
    fn rejected_edit_changes_nothing() {
        let mut s = session(Document::new());
        s.settle();
        let err = s.edit(Transaction::user().delete_blocks(3, 0, 1)).unwrap_err();
        assert!(matches!(err, TransformError::PageOutOfRange { .. }));
        assert!(!s.paginator().is_pending());
    }

    #[test]
    fn edits_schedule_and_layout_writes_do_not() {
        let mut s = session(Document::new());
        assert_eq!(s.settle().len(), 1);
        s.edit(Transaction::user().insert_blocks(0, 0, vec![Block::paragraph("a")]))
            .unwrap();
        assert!(s.paginator().is_pending());
        assert!(s.advance_frame().is_none());
        assert!(s.advance_frame().is_some());
        assert!(!s.paginator().is_pending());
    }

    /// Stands in for a host renderer that draws its own footer: blocks come
    /// from the headless layout, the footer height from the host.
    #[derive(Debug)]
    struct HostFooter {
        inner: HeadlessRenderer,
    }

    impl MeasurementProvider for HostFooter {
        fn sync(&mut self, doc: &Document) {
            self.inner.sync(doc);
        }
        fn measure(&self, node: NodePos) -> Option<Rect> {
            self.inner.measure(node)
        }
        fn margins(&self, node: NodePos) -> VerticalMargins {
            self.inner.margins(node)
        }
        fn page_padding(&self, page: usize) -> Option<VerticalPadding> {
            self.inner.page_padding(page)
        }
        fn text_offset_at(&self, block: BlockPos, y: f64) -> Option<usize> {
            self.inner.text_offset_at(block, y)
        }
    }

    #[test]
    fn reported_footer_height_reflows() {
        // 900px body, 300px tables: three per page
        let config = LayoutConfig {
            size: PageSize::Custom {
                width: 500.0,
                height: 1000.0,
            },
            padding: Edges::uniform(50.0),
            ..Default::default()
        };
        let metrics = HeadlessMetrics {
            line_height: 50.0,
            block_spacing: 0.0,
            cell_padding: 0.0,
            ..Default::default()
        };
        let table = Block::table((0..6).map(|i| vec![format!("r{}", i)]).collect());
        let provider = HostFooter {
            inner: HeadlessRenderer::new(config.clone(), metrics),
        };
        let mut s = Session::new(Document::from_blocks(vec![table; 6]), provider, config);
        s.settle();
        assert_eq!(s.page_count(), 2);

        s.report_chrome_heights(0.0, 300.0);
        assert!(s.paginator().is_pending());
        s.settle();
        assert_eq!(s.page_count(), 3);
        assert_eq!(s.paginator().body_height(), 600.0);
    }

    #[test]
    fn closed_session_ignores_edits() {
        let mut s = session(Document::new());
        s.close();
        s.edit(Transaction::user().insert_blocks(0, 0, vec![Block::paragraph("a")]))
            .unwrap();
        assert!(s.settle().is_empty());
    }
}
