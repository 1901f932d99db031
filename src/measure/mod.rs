//! # Measurement
//!
//! Geometry is only knowable after render. The engine never computes heights
//! itself; it asks a [`MeasurementProvider`] about the *committed* tree.
//!
//! The contract is deliberately narrow so it can sit on top of a browser DOM
//! (bounding client rects, computed padding, caret-from-point) or on a
//! headless layout such as [`headless::HeadlessRenderer`].
//!
//! All coordinates share one vertical space: pages are stacked top to bottom
//! and `y` grows downward.

pub mod headless;

use crate::model::{BlockPos, Document, NodePos};

/// A rendered bounding box.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub top: f64,
    pub bottom: f64,
    pub left: f64,
    pub right: f64,
}

impl Rect {
    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }
}

/// Vertical margins of a rendered block.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct VerticalMargins {
    pub top: f64,
    pub bottom: f64,
}

/// Vertical padding of a rendered page.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct VerticalPadding {
    pub top: f64,
    pub bottom: f64,
}

impl VerticalPadding {
    /// Padding that measures as zero is what an unstyled, not yet painted
    /// page reports.
    pub fn is_zero(&self) -> bool {
        self.top <= 0.0 && self.bottom <= 0.0
    }
}

/// Read-only view of the rendered document.
pub trait MeasurementProvider {
    /// Bring the rendering up to date with `doc`.
    ///
    /// Called once the tree is committed and before any query about it: at
    /// the start of a reflow pass and after every transaction the engine
    /// applies. A DOM backend waits for layout here; a headless backend
    /// recomputes its geometry.
    fn sync(&mut self, doc: &Document);

    /// Bounding box of a page, block or list item. `None` if the node is
    /// not rendered (yet).
    fn measure(&self, node: NodePos) -> Option<Rect>;

    /// Vertical margins around a block. Used to predict whether a block
    /// would fit when appended to another page.
    fn margins(&self, _node: NodePos) -> VerticalMargins {
        VerticalMargins::default()
    }

    /// Computed padding of a page, or `None` if unavailable.
    fn page_padding(&self, page: usize) -> Option<VerticalPadding>;

    /// Hit-test: the character offset inside the paragraph at `block` of
    /// the line rendered at height `y`, taken at the paragraph's left edge.
    /// `None` when `y` is outside the paragraph or the block holds no text.
    fn text_offset_at(&self, block: BlockPos, y: f64) -> Option<usize>;
}
